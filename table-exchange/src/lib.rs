//! The table-exchange crate
//! Round-trips one tabular dataset through a PostgreSQL table and an Azure
//! Data Lake Storage path.

/// Module responsible for remote-file write and read against Azure object
/// storage.
///
/// This module provides functionality to interact with Azure's storage
/// infrastructure: resolving the account configuration from the environment,
/// building the store client, and transferring the staged file's bytes.
pub mod azure_store;

/// Module for dataset construction and CSV staging.
///
/// The `dataset` module builds the fixed sample `RecordBatch`, compares
/// datasets independent of row order, and serializes a batch to and from a
/// headered CSV staging file.
pub mod dataset;

/// Module for error handling and custom error types.
pub mod error;

/// Module for rebuilding Arrow record batches from PostgreSQL rows.
pub mod from_pg;

/// Module for remote-table write and read against PostgreSQL.
///
/// The `sql_table` module manages the connection pool, creates the
/// destination schema and table, and moves a `RecordBatch` into and out of a
/// named table.
pub mod sql_table;

/// Module for converting Arrow record batches to PostgreSQL parameters.
pub mod to_pg;
