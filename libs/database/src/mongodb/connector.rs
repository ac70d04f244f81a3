use mongodb::{Client, bson::doc, options::ClientOptions};
use std::time::Duration;
use tracing::{info, instrument};

use super::MongoConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryConfig, retry_with_backoff};

/// Build client options from `config` without touching the network.
pub async fn client_options(config: &MongoConfig) -> DatabaseResult<ClientOptions> {
    let mut options = ClientOptions::parse(&config.url)
        .await
        .map_err(|e| DatabaseError::ConfigError(format!("invalid MongoDB url: {e}")))?;

    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let Some(app_name) = &config.app_name {
        options.app_name = Some(app_name.clone());
    }

    Ok(options)
}

/// Connect and verify the deployment answers a `ping`.
#[instrument(skip(config), fields(url = %config.redacted_url(), database = %config.database))]
pub async fn connect_from_config(config: &MongoConfig) -> DatabaseResult<Client> {
    let client = Client::with_options(client_options(config).await?)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!("Connected to MongoDB");
    Ok(client)
}

/// [`connect_from_config`] wrapped in exponential backoff.
///
/// `None` uses [`RetryConfig::default`].
pub async fn connect_from_config_with_retry(
    config: &MongoConfig,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<Client> {
    retry_with_backoff(
        || connect_from_config(config),
        retry_config.unwrap_or_default(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_options_apply_config() {
        let config = MongoConfig::new("mongodb://localhost:27017", "catalog")
            .with_app_name("catalog-api")
            .with_pool_size(20, 2);

        let options = client_options(&config).await.unwrap();
        assert_eq!(options.max_pool_size, Some(20));
        assert_eq!(options.min_pool_size, Some(2));
        assert_eq!(options.app_name.as_deref(), Some("catalog-api"));
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_client_options_reject_bad_url() {
        let config = MongoConfig::new("postgres://localhost:5432", "catalog");
        let err = client_options(&config).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ConfigError(_)));
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_connect_from_config() {
        let url = std::env::var("MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let config = MongoConfig::new(url, "catalog_test");
        assert!(connect_from_config(&config).await.is_ok());
    }
}
