//! Error type and retry policy shared by every connector

pub mod error;
pub mod retry;

pub use error::{DatabaseError, DatabaseResult};
pub use retry::{Backoff, RetryConfig, retry_with_backoff};
