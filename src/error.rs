//! Error types for SharePoint operations

use reqwest::{Method, StatusCode};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SharePointError>;

/// Errors surfaced by the SharePoint client and the list item mapper
#[derive(Debug, Error)]
pub enum SharePointError {
    /// An HTTP exchange with SharePoint (or the token service) failed
    #[error("SharePoint {method} request failed : {source}")]
    Request {
        method: Method,
        #[source]
        source: RequestFailure,
    },

    /// A list item was used in a way its construction does not allow
    #[error("{0}")]
    ListItem(String),

    /// A value outside of a fixed enumeration was supplied
    #[error("{0}")]
    InvalidValue(String),
}

/// The underlying reason a request failed
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("{status} : {body}")]
    Status { status: StatusCode, body: String },

    #[error("tenant realm not found: {0}")]
    Realm(String),

    #[error("token response invalid: {0}")]
    Token(String),

    #[error("unexpected response body: {0}")]
    Body(String),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl SharePointError {
    pub fn request(method: Method, source: impl Into<RequestFailure>) -> Self {
        Self::Request {
            method,
            source: source.into(),
        }
    }

    pub fn list_item(msg: impl Into<String>) -> Self {
        Self::ListItem(msg.into())
    }

    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }

    /// HTTP status of a failed request, when the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Request {
                source: RequestFailure::Status { status, .. },
                ..
            } => Some(*status),
            Self::Request {
                source: RequestFailure::Transport(err),
                ..
            } => err.status(),
            _ => None,
        }
    }
}
