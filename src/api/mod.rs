//! Authenticated transport for the SharePoint REST API
//!
//! Tenant discovery and app-only tokens live in [`auth`], request composition
//! and per-verb headers in [`client`], retries and request logging in
//! [`resilience`].

pub mod auth;
pub mod client;
pub mod constants;
pub mod resilience;

pub use auth::{AccessToken, ClientCredentials, TokenManager};
pub use client::SharePointClient;
pub use resilience::{ApiLogger, OperationContext, RetryConfig, RetryPolicy, RetryableError};
