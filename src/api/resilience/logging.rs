//! Structured logging with correlation tracking for SharePoint requests
//!
//! Every request gets a correlation id that is also sent to SharePoint as
//! `client-request-id`, so log lines here can be matched with the server's
//! ULS entries.

use log::{debug, info, warn};
use reqwest::header::HeaderMap;
use serde_json::{Map, Value, json};
use std::time::{Duration, Instant};

const REDACTED: &str = "[REDACTED]";

/// Structured logger for HTTP exchanges
#[derive(Debug, Clone)]
pub struct ApiLogger {
    request_logging: bool,
}

/// Context for a single request with correlation tracking
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub correlation_id: String,
    pub method: String,
    pub url: String,
    pub start_time: Instant,
}

impl Default for ApiLogger {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ApiLogger {
    pub fn new(request_logging: bool) -> Self {
        Self { request_logging }
    }

    /// Start tracking a request, minting a fresh correlation id
    pub fn start_operation(&self, method: &str, url: &str) -> OperationContext {
        OperationContext {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            method: method.to_string(),
            url: url.to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn log_request(&self, context: &OperationContext, attempt: u32, headers: &HeaderMap) {
        if !self.request_logging || !log::log_enabled!(log::Level::Debug) {
            return;
        }

        let log_data = json!({
            "event": "http_request",
            "correlation_id": context.correlation_id,
            "method": context.method,
            "url": context.url,
            "attempt": attempt,
            "headers": sanitize_headers(headers),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("HTTP Request: {}", log_data);
    }

    pub fn log_response(&self, context: &OperationContext, status_code: u16) {
        if !self.request_logging {
            return;
        }

        let log_data = json!({
            "event": "http_response",
            "correlation_id": context.correlation_id,
            "method": context.method,
            "url": context.url,
            "status_code": status_code,
            "duration_ms": context.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if status_code >= 400 {
            warn!("HTTP Response (Error): {}", log_data);
        } else {
            debug!("HTTP Response: {}", log_data);
        }
    }

    pub fn log_failure(&self, context: &OperationContext, error: &str) {
        let log_data = json!({
            "event": "http_failure",
            "correlation_id": context.correlation_id,
            "method": context.method,
            "url": context.url,
            "error": error,
            "duration_ms": context.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        warn!("HTTP Failure: {}", log_data);
    }

    pub fn log_token_refresh(&self, tenant_id: &str, expires_on: i64) {
        info!(
            "{}",
            json!({
                "event": "token_acquired",
                "tenant_id": tenant_id,
                "expires_on": expires_on,
                "timestamp": chrono::Utc::now().to_rfc3339()
            })
        );
    }
}

impl OperationContext {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Copy headers into a JSON object, masking credentials and digests
pub fn sanitize_headers(headers: &HeaderMap) -> Value {
    let mut sanitized = Map::new();

    for (name, value) in headers {
        let key = name.as_str().to_lowercase();
        let shown = if is_sensitive(&key) {
            REDACTED.to_string()
        } else {
            value.to_str().unwrap_or("<binary>").to_string()
        };
        sanitized.insert(name.as_str().to_string(), Value::String(shown));
    }

    Value::Object(sanitized)
}

fn is_sensitive(header: &str) -> bool {
    header.contains("authorization")
        || header.contains("digest")
        || header.contains("token")
        || header.contains("secret")
        || header.contains("cookie")
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, HeaderValue};

    #[test]
    fn test_sanitize_masks_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert("X-RequestDigest", HeaderValue::from_static("0x1234"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let sanitized = sanitize_headers(&headers);

        assert_eq!(sanitized["authorization"], REDACTED);
        assert_eq!(sanitized["x-requestdigest"], REDACTED);
        assert_eq!(sanitized["accept"], "application/json");
    }

    #[test]
    fn test_each_operation_gets_its_own_correlation_id() {
        let logger = ApiLogger::default();
        let first = logger.start_operation("GET", "https://contoso/_api/web");
        let second = logger.start_operation("GET", "https://contoso/_api/web");

        assert_ne!(first.correlation_id, second.correlation_id);
        assert_eq!(first.method, "GET");
    }
}
