use log::{debug, info};
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::{Method, Url};
use serde::{Deserialize, Deserializer};
use tokio::sync::RwLock;

use super::constants;
use super::resilience::ApiLogger;
use crate::error::{RequestFailure, Result, SharePointError};

/// Bearer token issued by the ACS token service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccessToken {
    pub token_type: String,
    pub access_token: String,
    /// Unix timestamp (seconds) after which the token is rejected
    #[serde(deserialize_with = "epoch_seconds")]
    pub expires_on: i64,
}

impl AccessToken {
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_on
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }

    /// Value for the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

// ACS sends `expires_on` as a quoted number
fn epoch_seconds<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Epoch {
        Number(i64),
        Text(String),
    }

    match Epoch::deserialize(deserializer)? {
        Epoch::Number(value) => Ok(value),
        Epoch::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Extract the realm from a `WWW-Authenticate` challenge such as
/// `Bearer realm="<tenant>",client_id="...",trusted_issuers="..."`
pub fn parse_realm(challenge: &str) -> Option<String> {
    challenge
        .split(',')
        .map(|part| {
            let part = part.trim();
            match part.split_once(' ') {
                Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
                _ => part,
            }
        })
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("realm"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|realm| !realm.is_empty())
}

/// URL of the realm probe on the same origin as the site
pub fn realm_probe_url(site_url: &str) -> Result<String> {
    let url = Url::parse(site_url).map_err(|e| {
        SharePointError::request(Method::GET, RequestFailure::Realm(format!("invalid site URL {}: {}", site_url, e)))
    })?;

    Ok(format!(
        "{}{}",
        url.origin().ascii_serialization(),
        constants::REALM_PROBE_PATH
    ))
}

/// Discover the tenant id backing a site by provoking an authentication challenge
pub async fn get_tenant_id(http: &reqwest::Client, site_url: &str) -> Result<String> {
    let url = realm_probe_url(site_url)?;
    debug!("Probing {} for tenant realm", url);

    let response = http
        .get(&url)
        .header(AUTHORIZATION, "Bearer")
        .send()
        .await
        .map_err(|e| SharePointError::request(Method::GET, e))?;

    let challenge = response
        .headers()
        .get(WWW_AUTHENTICATE)
        .ok_or_else(|| {
            SharePointError::request(
                Method::GET,
                RequestFailure::Realm(format!("no WWW-Authenticate header from {}", url)),
            )
        })?
        .to_str()
        .map_err(|e| SharePointError::request(Method::GET, RequestFailure::Realm(e.to_string())))?;

    parse_realm(challenge).ok_or_else(|| {
        SharePointError::request(
            Method::GET,
            RequestFailure::Realm(format!("malformed challenge: {}", challenge)),
        )
    })
}

/// Client credentials for an app registered against the tenant
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Acquires and caches the app-only token for one site
#[derive(Debug)]
pub struct TokenManager {
    http: reqwest::Client,
    accounts_url: String,
    site_host: String,
    tenant_id: String,
    credentials: ClientCredentials,
    token: RwLock<Option<AccessToken>>,
    logger: ApiLogger,
}

impl TokenManager {
    pub fn new(
        http: reqwest::Client,
        accounts_url: impl Into<String>,
        site_host: impl Into<String>,
        tenant_id: impl Into<String>,
        credentials: ClientCredentials,
    ) -> Self {
        Self {
            http,
            accounts_url: accounts_url.into(),
            site_host: site_host.into(),
            tenant_id: tenant_id.into(),
            credentials,
            token: RwLock::new(None),
            logger: ApiLogger::default(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Exchange the client credentials for a fresh token
    pub async fn acquire_token(&self) -> Result<AccessToken> {
        let url = constants::token_endpoint(&self.accounts_url, &self.tenant_id);
        let resource = format!(
            "{}/{}@{}",
            constants::SHAREPOINT_PRINCIPAL,
            self.site_host,
            self.tenant_id
        );
        let client_id = format!("{}@{}", self.credentials.client_id, self.tenant_id);

        info!("Requesting app-only token for {} from {}", self.site_host, url);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("resource", resource.as_str()),
                ("client_id", client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SharePointError::request(Method::POST, e))?;

        let status = response.status();
        debug!("Token request status: {}", status);

        let body = response
            .text()
            .await
            .map_err(|e| SharePointError::request(Method::POST, e))?;

        if !status.is_success() {
            return Err(SharePointError::request(
                Method::POST,
                RequestFailure::Status { status, body },
            ));
        }

        let token: AccessToken = serde_json::from_str(&body)
            .map_err(|e| SharePointError::request(Method::POST, RequestFailure::Token(e.to_string())))?;

        self.logger.log_token_refresh(&self.tenant_id, token.expires_on);
        Ok(token)
    }

    /// Authorization header value, re-acquiring the token when absent or expired
    pub async fn ensure_valid_token(&self) -> Result<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if !token.is_expired() {
                return Ok(token.authorization());
            }
        }

        let mut cached = self.token.write().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.authorization());
            }
            debug!("Cached token expired at {}", token.expires_on);
        }

        let token = self.acquire_token().await?;
        let authorization = token.authorization();
        *cached = Some(token);

        Ok(authorization)
    }

    /// Snapshot of the cached token, if any
    pub async fn current_token(&self) -> Option<AccessToken> {
        self.token.read().await.clone()
    }
}
