use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, IF_MATCH};
use reqwest::{Method, Response, Url};
use serde_json::Value;

use super::auth::{self, ClientCredentials, TokenManager};
use super::constants::{self, headers};
use super::resilience::{ApiLogger, RetryPolicy};
use crate::config::SharePointConfig;
use crate::error::{RequestFailure, Result, SharePointError};

/// Authenticated transport for one SharePoint site
///
/// Resolves relative endpoints against the site URL, keeps the app-only token
/// fresh, attaches the per-verb headers SharePoint requires, and retries
/// transient failures.
#[derive(Debug)]
pub struct SharePointClient {
    site_url: String,
    site_host: String,
    http: reqwest::Client,
    tokens: TokenManager,
    retry_policy: RetryPolicy,
    logger: ApiLogger,
}

impl SharePointClient {
    /// Discover the tenant behind the site and build a client for it
    pub async fn connect(config: SharePointConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let tenant_id = auth::get_tenant_id(&http, &config.site_url).await?;
        debug!("Resolved tenant {} for {}", tenant_id, config.site_url);

        Self::from_parts(config, http, tenant_id)
    }

    /// Build a client for a site whose tenant id is already known
    pub fn with_tenant(config: SharePointConfig, tenant_id: impl Into<String>) -> Result<Self> {
        let http = build_http_client(&config)?;
        Self::from_parts(config, http, tenant_id.into())
    }

    fn from_parts(config: SharePointConfig, http: reqwest::Client, tenant_id: String) -> Result<Self> {
        let site_host = Url::parse(&config.site_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .ok_or_else(|| SharePointError::invalid_value(format!("site URL has no host: {}", config.site_url)))?;

        let tokens = TokenManager::new(
            http.clone(),
            config.accounts_url.clone(),
            site_host.clone(),
            tenant_id,
            ClientCredentials {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            },
        );

        Ok(Self {
            site_url: config.site_url.trim_end_matches('/').to_string(),
            site_host,
            http,
            tokens,
            retry_policy: RetryPolicy::new(config.retry),
            logger: ApiLogger::default(),
        })
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn site_host(&self) -> &str {
        &self.site_host
    }

    pub fn tenant_id(&self) -> &str {
        self.tokens.tenant_id()
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Convert a relative path such as `_api/web/lists` to a full URL under the site
    pub fn api_endpoint(&self, url: &str) -> String {
        if let Ok(parsed) = Url::parse(url) {
            if matches!(parsed.scheme(), "http" | "https") {
                return url.to_string();
            }
        }

        format!("{}/{}", self.site_url, url.trim_start_matches('/'))
    }

    /// Site context information, including the current form digest
    pub async fn context_info(&self) -> Result<Value> {
        let url = self.api_endpoint(constants::CONTEXT_INFO_PATH);
        let authorization = self.tokens.ensure_valid_token().await?;
        let request_headers = default_headers(&authorization)?;

        let response = self.execute(Method::POST, url, request_headers, None).await?;
        read_json(Method::POST, response).await
    }

    /// Anti-forgery token required on mutating requests
    pub async fn form_digest(&self) -> Result<String> {
        let info = self.context_info().await?;
        let info = unwrap_verbose(info);
        let digest = info
            .get("FormDigestValue")
            .or_else(|| info.pointer("/GetContextWebInformation/FormDigestValue"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SharePointError::request(
                    Method::POST,
                    RequestFailure::Body("context info has no FormDigestValue".to_string()),
                )
            })?;

        Ok(digest.to_string())
    }

    /// Send a request to SharePoint.
    ///
    /// Caller headers are layered over the defaults; the verb-specific headers
    /// are applied last. Non-2xx responses become [`SharePointError::Request`].
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        extra_headers: Option<HeaderMap>,
        body: Option<&Value>,
    ) -> Result<Response> {
        let url = self.api_endpoint(url);
        let authorization = self.tokens.ensure_valid_token().await?;

        let mut request_headers = default_headers(&authorization)?;
        if let Some(extra) = extra_headers {
            request_headers.extend(extra);
        }
        self.apply_method_headers(&method, &mut request_headers).await?;

        self.execute(method, url, request_headers, body).await
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        self.send(Method::GET, url, None, None).await
    }

    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Response> {
        self.send(Method::POST, url, None, body).await
    }

    pub async fn patch(&self, url: &str, body: Option<&Value>) -> Result<Response> {
        self.send(Method::PATCH, url, None, body).await
    }

    pub async fn put(&self, url: &str, body: Option<&Value>) -> Result<Response> {
        self.send(Method::PUT, url, None, body).await
    }

    pub async fn delete(&self, url: &str) -> Result<Response> {
        self.send(Method::DELETE, url, None, None).await
    }

    /// GET and parse the JSON body
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.get(url).await?;
        read_json(Method::GET, response).await
    }

    /// Send and parse the JSON body; an empty body yields `null`
    pub async fn send_json(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Value> {
        let response = self.send(method.clone(), url, None, body).await?;
        read_json(method, response).await
    }

    async fn apply_method_headers(&self, method: &Method, request_headers: &mut HeaderMap) -> Result<()> {
        match *method {
            Method::POST => {
                let digest = self.form_digest().await?;
                request_headers.insert(CONTENT_TYPE, HeaderValue::from_static(headers::ODATA_VERBOSE));
                request_headers.insert(ACCEPT, HeaderValue::from_static(headers::ODATA_VERBOSE));
                request_headers.insert(header_name(headers::X_REQUEST_DIGEST), header_value(&digest)?);
            }
            Method::DELETE => {
                let digest = self.form_digest().await?;
                request_headers.insert(
                    header_name(headers::X_HTTP_METHOD),
                    HeaderValue::from_static(headers::METHOD_DELETE),
                );
                request_headers.insert(IF_MATCH, HeaderValue::from_static(headers::IF_MATCH_ANY));
                request_headers.insert(header_name(headers::X_REQUEST_DIGEST), header_value(&digest)?);
            }
            Method::PATCH => {
                request_headers.insert(
                    header_name(headers::X_HTTP_METHOD),
                    HeaderValue::from_static(headers::METHOD_MERGE),
                );
                request_headers.insert(IF_MATCH, HeaderValue::from_static(headers::IF_MATCH_ANY));
            }
            _ => {}
        }

        Ok(())
    }

    async fn execute(
        &self,
        method: Method,
        url: String,
        mut request_headers: HeaderMap,
        body: Option<&Value>,
    ) -> Result<Response> {
        let context = self.logger.start_operation(method.as_str(), &url);
        request_headers.insert(
            header_name(headers::CLIENT_REQUEST_ID),
            header_value(&context.correlation_id)?,
        );

        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| SharePointError::request(method.clone(), e))?;

        let result = self
            .retry_policy
            .execute(|attempt| {
                self.logger.log_request(&context, attempt, &request_headers);

                let mut request = self
                    .http
                    .request(method.clone(), &url)
                    .headers(request_headers.clone());
                if let Some(bytes) = &payload {
                    request = request.body(bytes.clone());
                }
                request.send()
            })
            .await;

        let response = match result {
            Ok(response) => response,
            Err(error) => {
                self.logger.log_failure(&context, &error.to_string());
                return Err(SharePointError::request(method, error));
            }
        };

        let status = response.status();
        self.logger.log_response(&context, status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SharePointError::request(method, RequestFailure::Status { status, body }));
        }

        Ok(response)
    }
}

fn build_http_client(config: &SharePointConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| SharePointError::request(Method::GET, e))
}

fn default_headers(authorization: &str) -> Result<HeaderMap> {
    let mut request_headers = HeaderMap::new();
    request_headers.insert(ACCEPT, HeaderValue::from_static(headers::ACCEPT_NOMETADATA));
    request_headers.insert(CONTENT_TYPE, HeaderValue::from_static(headers::CONTENT_TYPE_JSON));
    request_headers.insert(AUTHORIZATION, header_value(authorization)?);
    Ok(request_headers)
}

fn header_name(name: &'static str) -> HeaderName {
    HeaderName::from_static(name)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| SharePointError::invalid_value(format!("invalid header value: {}", e)))
}

/// Parse a response body as JSON; empty bodies (204) map to `null`
pub async fn read_json(method: Method, response: Response) -> Result<Value> {
    let text = response
        .text()
        .await
        .map_err(|e| SharePointError::request(method.clone(), e))?;

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| SharePointError::request(method, e))
}

/// Strip the `{"d": ...}` envelope of verbose OData responses
pub fn unwrap_verbose(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("d") => {
            map.remove("d").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Pull the `value` array out of a collection response
pub fn collection(method: Method, body: Value) -> Result<Vec<Value>> {
    match unwrap_verbose(body) {
        Value::Object(mut map) => match map.remove("value").or_else(|| map.remove("results")) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(SharePointError::request(
                method,
                RequestFailure::Body(format!("collection value is not an array: {}", other)),
            )),
            None => Err(SharePointError::request(
                method,
                RequestFailure::Body("response has no value collection".to_string()),
            )),
        },
        other => Err(SharePointError::request(
            method,
            RequestFailure::Body(format!("expected an object, got {}", other)),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_verbose() {
        assert_eq!(unwrap_verbose(json!({"d": {"Id": 1}})), json!({"Id": 1}));
        assert_eq!(unwrap_verbose(json!({"Id": 1})), json!({"Id": 1}));
        assert_eq!(
            unwrap_verbose(json!({"d": 1, "other": 2})),
            json!({"d": 1, "other": 2})
        );
    }

    #[test]
    fn test_collection_reads_value_array() {
        let items = collection(Method::GET, json!({"value": [{"Id": 1}, {"Id": 2}]})).unwrap();
        assert_eq!(items.len(), 2);

        let verbose = collection(Method::GET, json!({"d": {"results": [{"Id": 1}]}})).unwrap();
        assert_eq!(verbose, vec![json!({"Id": 1})]);
    }

    #[test]
    fn test_collection_without_value_fails() {
        assert!(collection(Method::GET, json!({"Title": "x"})).is_err());
        assert!(collection(Method::GET, json!([1, 2])).is_err());
    }

    #[test]
    fn test_api_endpoint_resolves_relative_paths() {
        let config = SharePointConfig::new("https://contoso.sharepoint.com/sites/team/", "id", "secret");
        let client = SharePointClient::with_tenant(config, "tenant").unwrap();

        assert_eq!(
            client.api_endpoint("_api/site"),
            "https://contoso.sharepoint.com/sites/team/_api/site"
        );
        assert_eq!(
            client.api_endpoint("/_api/web/lists"),
            "https://contoso.sharepoint.com/sites/team/_api/web/lists"
        );
        assert_eq!(
            client.api_endpoint("https://other.sharepoint.com/_api/site"),
            "https://other.sharepoint.com/_api/site"
        );
        assert_eq!(client.site_host(), "contoso.sharepoint.com");
        assert_eq!(client.tenant_id(), "tenant");
    }
}
