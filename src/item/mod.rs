//! Mapping between SharePoint list records and local attribute names

pub mod attribute_map;
pub mod list_item;
pub mod store;

pub use attribute_map::{AttributeMap, AttributeMapping};
pub use list_item::{ListItem, SaveOutcome, Snapshot, UploadFormat};
pub use store::ListItemStore;
