//! List-level accessors and persistence for list items

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Method;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::api::SharePointClient;
use crate::api::client::{collection, read_json, unwrap_verbose};
use crate::api::constants;
use crate::error::{RequestFailure, Result, SharePointError};
use crate::field::FieldType;
use crate::item::{AttributeMap, ListItem, ListItemStore};

/// A SharePoint list addressed by title
#[derive(Debug, Clone)]
pub struct SpList {
    client: Arc<SharePointClient>,
    title: String,
    base_url: String,
    item_type: String,
}

impl SpList {
    /// Fetch the list details and cache its item entity type
    pub async fn open(client: Arc<SharePointClient>, title: &str) -> Result<Self> {
        let base_url = constants::list_endpoint(title);
        let details = unwrap_verbose(client.get_json(&base_url).await?);

        let item_type = details
            .get("ListItemEntityTypeFullName")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SharePointError::request(
                    Method::GET,
                    RequestFailure::Body(format!(
                        "list '{}' details have no ListItemEntityTypeFullName",
                        title
                    )),
                )
            })?
            .to_string();

        debug!("Opened list '{}' with item type {}", title, item_type);

        Ok(Self {
            client,
            title: title.to_string(),
            base_url,
            item_type,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    pub async fn fields(&self) -> Result<Vec<Value>> {
        let body = self.client.get_json(&format!("{}/fields", self.base_url)).await?;
        collection(Method::GET, body)
    }

    pub async fn list_details(&self) -> Result<Value> {
        self.client.get_json(&self.base_url).await
    }

    pub async fn get_field(&self, field_title: &str) -> Result<Value> {
        let url = format!(
            "{}/fields/GetByTitle('{}')",
            self.base_url,
            constants::odata_literal(field_title)
        );
        self.client.get_json(&url).await
    }

    pub async fn get_list_records(&self, row_limit: u32) -> Result<Vec<Value>> {
        let url = format!("{}/items?$top={}", self.base_url, row_limit);
        let body = self.client.get_json(&url).await?;
        collection(Method::GET, body)
    }

    /// Fetch up to the default row limit and bind each record to this list
    pub async fn items(&self, attribute_map: Arc<AttributeMap>) -> Result<Vec<ListItem>> {
        let records = self.get_list_records(constants::DEFAULT_ROW_LIMIT).await?;
        let store: Arc<dyn ListItemStore> = Arc::new(self.clone());

        Ok(records
            .iter()
            .filter_map(Value::as_object)
            .map(|record| {
                ListItem::from_sharepoint_record(record, store.clone(), attribute_map.clone())
            })
            .collect())
    }

    /// Create a field from a raw `FieldTypeKind` code; unknown codes are rejected before any request
    pub async fn create_field_with_code(
        &self,
        name: &str,
        code: i32,
        required: bool,
        unique: bool,
        static_name: Option<&str>,
    ) -> Result<Value> {
        let kind = FieldType::try_from(code)?;
        self.create_field(name, kind, required, unique, static_name).await
    }

    pub async fn create_field(
        &self,
        name: &str,
        kind: FieldType,
        required: bool,
        unique: bool,
        static_name: Option<&str>,
    ) -> Result<Value> {
        let body = json!({
            "__metadata": {"type": "SP.Field"},
            "Title": name,
            "FieldTypeKind": kind.code(),
            "Required": required,
            "EnforceUniqueValues": unique,
            "StaticName": static_name,
        });

        info!("Creating {} field '{}' on list '{}'", kind, name, self.title);
        let response = self
            .client
            .post(&format!("{}/Fields", self.base_url), Some(&body))
            .await?;
        Ok(unwrap_verbose(read_json(Method::POST, response).await?))
    }

    pub async fn add_list_item(&self, payload: &Value) -> Result<Value> {
        let response = self
            .client
            .post(&format!("{}/items", self.base_url), Some(payload))
            .await?;
        Ok(unwrap_verbose(read_json(Method::POST, response).await?))
    }

    pub async fn update_list_item(&self, id: i64, payload: &Value) -> Result<()> {
        let url = constants::list_item_endpoint(&self.base_url, id);
        self.client.patch(&url, Some(payload)).await?;
        Ok(())
    }

    pub async fn delete_list_item(&self, id: i64) -> Result<()> {
        let url = constants::list_item_endpoint(&self.base_url, id);
        self.client.delete(&url).await?;
        Ok(())
    }
}

#[async_trait]
impl ListItemStore for SpList {
    fn item_type(&self) -> &str {
        &self.item_type
    }

    async fn add_list_item(&self, payload: Value) -> Result<Value> {
        SpList::add_list_item(self, &payload).await
    }

    async fn update_list_item(&self, id: i64, payload: Value) -> Result<()> {
        SpList::update_list_item(self, id, &payload).await
    }

    async fn delete_list_item(&self, id: i64) -> Result<()> {
        SpList::delete_list_item(self, id).await
    }
}
