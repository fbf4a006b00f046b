//! Site-level accessors over the SharePoint REST API

use log::debug;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

use crate::api::client::collection;
use crate::api::constants::endpoints;
use crate::api::SharePointClient;
use crate::config::SharePointConfig;
use crate::error::{Result, SharePointError};
use crate::list::SpList;

/// A SharePoint site addressed through one authenticated client
#[derive(Debug, Clone)]
pub struct Site {
    client: Arc<SharePointClient>,
}

impl Site {
    pub fn new(client: Arc<SharePointClient>) -> Self {
        Self { client }
    }

    /// Discover the tenant and authenticate against the configured site
    pub async fn connect(config: SharePointConfig) -> Result<Self> {
        let client = SharePointClient::connect(config).await?;
        Ok(Self::new(Arc::new(client)))
    }

    pub fn client(&self) -> &Arc<SharePointClient> {
        &self.client
    }

    pub async fn info(&self) -> Result<Value> {
        self.client.get_json(endpoints::SITE).await
    }

    pub async fn web(&self) -> Result<Value> {
        self.client.get_json(endpoints::WEB).await
    }

    pub async fn context_info(&self) -> Result<Value> {
        self.client.context_info().await
    }

    pub async fn content_types(&self) -> Result<Vec<Value>> {
        self.collection(endpoints::CONTENT_TYPES).await
    }

    pub async fn event_receivers(&self) -> Result<Vec<Value>> {
        self.collection(endpoints::EVENT_RECEIVERS).await
    }

    pub async fn features(&self) -> Result<Vec<Value>> {
        self.collection(endpoints::FEATURES).await
    }

    pub async fn fields(&self) -> Result<Vec<Value>> {
        self.collection(endpoints::FIELDS).await
    }

    pub async fn lists(&self) -> Result<Vec<Value>> {
        self.collection(endpoints::LISTS).await
    }

    pub async fn site_users(&self) -> Result<Vec<Value>> {
        self.collection(endpoints::SITE_USERS).await
    }

    pub async fn groups(&self) -> Result<Vec<Value>> {
        self.collection(endpoints::SITE_GROUPS).await
    }

    pub async fn role_assignments(&self) -> Result<Vec<Value>> {
        self.collection(endpoints::ROLE_ASSIGNMENTS).await
    }

    /// Open a list by title, fetching its details
    pub async fn list(&self, title: &str) -> Result<SpList> {
        SpList::open(self.client.clone(), title).await
    }

    /// First row whose `column` equals `value`.
    ///
    /// Rows come from `rows` when non-empty, otherwise from the collection at `url`.
    pub async fn first_or_none(
        &self,
        column: &str,
        value: &Value,
        rows: Option<&[Value]>,
        url: Option<&str>,
    ) -> Result<Option<Value>> {
        let fetched;
        let rows = match (rows, url) {
            (Some(rows), _) if !rows.is_empty() => rows,
            (_, Some(url)) => {
                fetched = self.collection(url).await?;
                fetched.as_slice()
            }
            _ => {
                return Err(SharePointError::invalid_value(
                    "either rows or url must be provided",
                ));
            }
        };

        Ok(rows.iter().find(|row| row.get(column) == Some(value)).cloned())
    }

    /// Email address of a site user by SharePoint user id
    pub async fn email_for_user_id(&self, user_id: i64) -> Result<Option<String>> {
        let user = self
            .first_or_none("Id", &Value::from(user_id), None, Some(endpoints::SITE_USERS))
            .await?;

        Ok(user
            .as_ref()
            .and_then(|user| user.get("Email"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// SharePoint user id of a site user by email address
    pub async fn user_id_for_email(&self, email: &str) -> Result<Option<i64>> {
        let user = self
            .first_or_none("Email", &Value::from(email), None, Some(endpoints::SITE_USERS))
            .await?;

        Ok(user.as_ref().and_then(|user| user.get("Id")).and_then(Value::as_i64))
    }

    async fn collection(&self, endpoint: &str) -> Result<Vec<Value>> {
        debug!("Fetching collection {}", endpoint);
        let body = self.client.get_json(endpoint).await?;
        collection(Method::GET, body)
    }
}
