//! Remote-file write and read against Azure Data Lake Storage.
//!
//! The store client comes from `object_store`'s Azure builder; credentials
//! and auth flow are resolved by the builder's environment lookup. Uploads
//! send the staged file's bytes verbatim and downloads return the identical
//! byte sequence for the caller to parse.

use std::env;
use std::path::Path as FsPath;
use std::time::Duration;

use bytes::Bytes;
use lazy_static::lazy_static;
use log::debug;
use object_store::azure::{MicrosoftAzure, MicrosoftAzureBuilder};
use object_store::path::Path;
use object_store::{ClientOptions, ObjectStore, PutPayload};
use regex::Regex;
use url::Url;

lazy_static! {
    /// Host pattern for a Data Lake Gen2 endpoint. The account name is the
    /// first label; `blob.core.windows.net` hosts do not match on purpose,
    /// the hierarchical-namespace API lives on the `dfs` host only.
    static ref DFS_HOST_REGEX: Regex =
        Regex::new(r"^([a-z0-9]{3,24})\.dfs\.core\.windows\.net$").unwrap();
}

/// Storage-account settings resolved from the environment.
#[derive(Clone, Debug)]
pub struct AzureConfig {
    /// Storage account name, extracted from the endpoint host.
    pub account: String,
    /// Full endpoint URL, e.g. `https://account.dfs.core.windows.net`.
    pub endpoint: String,
    /// Container (filesystem) name under the account.
    pub container: String,
}

/// Retrieve Azure storage configuration from environment variables.
///
/// `AZURE_ENDPOINT` is required and validated before any network call;
/// `AZURE_CONTAINER_NAME` defaults to `dev`.
pub fn get_azure_config() -> Result<AzureConfig, anyhow::Error> {
    let endpoint = env::var("AZURE_ENDPOINT").map_err(|_| {
        anyhow::anyhow!(
            "Environment variable 'AZURE_ENDPOINT' is not set. \
             Please set it to your Azure Data Lake Storage URL \
             (e.g., https://yourstorageaccount.dfs.core.windows.net)"
        )
    })?;
    let account = validate_endpoint(&endpoint)?;
    let container = env::var("AZURE_CONTAINER_NAME").unwrap_or_else(|_| "dev".to_string());

    Ok(AzureConfig {
        account,
        endpoint,
        container,
    })
}

/// Checks that an endpoint URL points at a Data Lake Gen2 host.
///
/// # Returns
/// The storage account name extracted from the host on success.
pub fn validate_endpoint(endpoint: &str) -> Result<String, anyhow::Error> {
    let url = Url::parse(endpoint)
        .map_err(|e| anyhow::anyhow!("Invalid AZURE_ENDPOINT '{}': {}", endpoint, e))?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("AZURE_ENDPOINT '{}' has no host", endpoint))?;

    match DFS_HOST_REGEX.captures(host) {
        Some(captures) => Ok(captures[1].to_string()),
        None => Err(anyhow::anyhow!(
            "AZURE_ENDPOINT '{}' is not a Data Lake Gen2 endpoint; expected \
             https://<account>.dfs.core.windows.net (blob.core.windows.net \
             endpoints are not supported)",
            endpoint
        )),
    }
}

/// Initialize and configure the Azure object store client.
pub fn get_object_store(config: &AzureConfig) -> Result<MicrosoftAzure, anyhow::Error> {
    let client_options = ClientOptions::new().with_timeout(Duration::from_secs(1000));

    let store = MicrosoftAzureBuilder::from_env()
        .with_account(&config.account)
        .with_container_name(&config.container)
        .with_endpoint(config.endpoint.clone())
        .with_client_options(client_options)
        .build()?;
    debug!("Store created for account {}", config.account);
    Ok(store)
}

/// Uploads a local file's bytes verbatim to the given object path.
pub async fn upload_file(
    store: &MicrosoftAzure,
    local_path: &FsPath,
    remote_path: &Path,
) -> Result<(), anyhow::Error> {
    let contents = tokio::fs::read(local_path).await?;
    debug!("Uploading {} bytes to {}", contents.len(), remote_path);
    store.put(remote_path, PutPayload::from(contents)).await?;
    Ok(())
}

/// Downloads the exact byte sequence stored at the given object path.
pub async fn download(store: &MicrosoftAzure, remote_path: &Path) -> Result<Bytes, anyhow::Error> {
    let content = store.get(remote_path).await?;
    let file_contents = content.bytes().await?;
    debug!("Downloaded {} bytes from {}", file_contents.len(), remote_path);
    Ok(file_contents)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dfs_endpoint_yields_account_name() {
        let account = validate_endpoint("https://mystorageacct.dfs.core.windows.net").unwrap();
        assert_eq!(account, "mystorageacct");
    }

    #[test]
    fn blob_endpoint_is_rejected() {
        let result = validate_endpoint("https://mystorageacct.blob.core.windows.net");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("not a Data Lake Gen2 endpoint"));
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(validate_endpoint("not a url").is_err());
        assert!(validate_endpoint("https:///missing-host").is_err());
    }

    // The environment steps below are sequential on purpose: this is the only
    // test that touches the AZURE_* variables.
    #[test]
    fn missing_endpoint_is_a_configuration_error() {
        env::remove_var("AZURE_ENDPOINT");
        env::remove_var("AZURE_CONTAINER_NAME");

        let result = get_azure_config();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("AZURE_ENDPOINT"));

        env::set_var("AZURE_ENDPOINT", "https://mystorageacct.dfs.core.windows.net");
        let config = get_azure_config().unwrap();
        assert_eq!(config.account, "mystorageacct");
        assert_eq!(config.container, "dev");

        env::remove_var("AZURE_ENDPOINT");
    }
}
