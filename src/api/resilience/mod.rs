//! Retry policy and request logging for SharePoint API calls

pub mod logging;
pub mod retry;

pub use logging::{ApiLogger, OperationContext};
pub use retry::{RETRY_STATUSES, RetryConfig, RetryPolicy, RetryableError};
