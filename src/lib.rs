//! Client for the SharePoint REST API with app-only authentication and a
//! change-tracking list item mapper.

pub mod api;
pub mod config;
pub mod error;
pub mod field;
pub mod item;
pub mod list;
pub mod site;

pub use api::{RetryConfig, SharePointClient};
pub use config::SharePointConfig;
pub use error::{RequestFailure, Result, SharePointError};
pub use field::FieldType;
pub use item::{AttributeMap, AttributeMapping, ListItem, ListItemStore, SaveOutcome, UploadFormat};
pub use list::SpList;
pub use site::Site;
