//! Example pipeline: build a five-row dataset, write it to a Postgres table
//! and an Azure Data Lake Storage path, then read both copies back and check
//! them against the original.
//!
//! Required environment (a `.env` file in the working directory is loaded):
//! - `DATABASE_URL` - Postgres connection URI
//! - `AZURE_ENDPOINT` - Data Lake Gen2 endpoint of the storage account

use std::env;
use std::io::Cursor;
use std::path::PathBuf;

use log::{debug, info};
use object_store::path::Path;

use table_exchange::azure_store::{download, get_azure_config, get_object_store, upload_file};
use table_exchange::dataset::{
    dataset_schema,
    datasets_match,
    read_csv,
    sample_dataset,
    shape,
    write_csv,
};
use table_exchange::sql_table::{
    create_client_session,
    database_url,
    ensure_table,
    read_table,
    TableRef,
    TableWriter,
};

/// Schema and table for the SQL leg of the example.
const SQL_SCHEMA: &str = "examples";
const SQL_TABLE: &str = "example_table";

/// Object path prefix for the storage leg, relative to the container root.
const REMOTE_BASE_PATH: &str = "dev/uv_example";
const FILE_NAME: &str = "example_data.csv";

fn staging_dir() -> PathBuf {
    env::var("STAGING_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("table-exchange"))
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Fail on missing configuration before any I/O is attempted.
    let db_url = database_url()?;
    let azure_config = get_azure_config()?;

    // 1. Create the example dataset.
    let batch = sample_dataset()?;
    let (rows, columns) = shape(&batch);
    info!("Created dataset with shape ({}, {})", rows, columns);

    // 2. Write the dataset to the SQL table.
    let table = TableRef::new(SQL_SCHEMA, SQL_TABLE);
    let client = create_client_session(&db_url).await?;
    ensure_table(&client, &table, &batch.schema(), Some("id")).await?;
    let writer = TableWriter::new(&client, &table).await?;
    let affected = writer.write(&batch).await?;
    info!("Written to {} ({} rows inserted)", table.qualified(), affected);

    // 3. Stage the dataset to a local CSV file and upload it.
    let local_path = staging_dir().join(FILE_NAME);
    write_csv(&local_path, &batch)?;
    debug!("Staged file at {}", local_path.display());

    let store = get_object_store(&azure_config)?;
    let remote_path = Path::from(format!("{}/{}", REMOTE_BASE_PATH, FILE_NAME));
    upload_file(&store, &local_path, &remote_path).await?;
    info!("Written to {}/{}", azure_config.endpoint, remote_path);

    // 4. Read the dataset back from the SQL table.
    let sql_batch = read_table(&client, &table, dataset_schema()).await?;
    let (rows, columns) = shape(&sql_batch);
    info!("Read from SQL - shape ({}, {})", rows, columns);
    if !datasets_match(&batch, &sql_batch)? {
        return Err(anyhow::anyhow!(
            "dataset read back from {} does not match the original",
            table.qualified()
        ));
    }

    // 5. Read the dataset back from object storage.
    let file_bytes = download(&store, &remote_path).await?;
    let adls_batch = read_csv(Cursor::new(file_bytes), dataset_schema())?;
    let (rows, columns) = shape(&adls_batch);
    info!("Read from ADLS - shape ({}, {})", rows, columns);
    if !datasets_match(&batch, &adls_batch)? {
        return Err(anyhow::anyhow!(
            "dataset read back from {} does not match the original",
            remote_path
        ));
    }

    info!("Example completed successfully");
    Ok(())
}
