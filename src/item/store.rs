use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Persistence operations a list item needs from the list that owns it
#[async_trait]
pub trait ListItemStore: Send + Sync {
    /// `ListItemEntityTypeFullName` of the list, e.g. `SP.Data.TasksListItem`
    fn item_type(&self) -> &str;

    /// Insert a record and return it as created by SharePoint
    async fn add_list_item(&self, payload: Value) -> Result<Value>;

    async fn update_list_item(&self, id: i64, payload: Value) -> Result<()>;

    async fn delete_list_item(&self, id: i64) -> Result<()>;
}
