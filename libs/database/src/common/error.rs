/// Error type for connection bootstrap and health probing.
///
/// Query-level failures stay with the domain crates, which classify them
/// into their own error enums.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Driver error surfaced while building or verifying a client
    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Connection failed after retries
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Health check failed
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
