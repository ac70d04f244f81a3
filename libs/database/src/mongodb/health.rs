use mongodb::{Client, bson::doc};
use tracing::instrument;

use crate::common::{DatabaseError, DatabaseResult};

/// `ping` the deployment, mapping failure to [`DatabaseError::HealthCheckFailed`].
///
/// Suited to readiness probes that aggregate several checks.
#[instrument(skip(client), level = "debug")]
pub async fn check_health(client: &Client) -> DatabaseResult<()> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_check_health() {
        let client = Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap();
        assert!(check_health(&client).await.is_ok());
    }
}
