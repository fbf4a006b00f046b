use log::debug;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::attribute_map::AttributeMap;
use super::store::ListItemStore;
use crate::api::constants;
use crate::error::{Result, SharePointError};

static NULL: Value = Value::Null;

/// Shape of the payload built for SharePoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    /// Insert payload: everything but `Id`, plus entity type metadata
    New,
    /// Only output-included attributes that differ from the snapshot
    Change,
    /// Every mapped attribute
    All,
}

impl FromStr for UploadFormat {
    type Err = SharePointError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "new" => Ok(UploadFormat::New),
            "change" => Ok(UploadFormat::Change),
            "all" => Ok(UploadFormat::All),
            _ => Err(SharePointError::invalid_value(
                "record_type parameter not valid, must be 'change', 'new', or 'all'",
            )),
        }
    }
}

/// Result of [`ListItem::save`]
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// A new record was created; holds the record SharePoint returned
    Inserted(Value),
    Updated,
    /// Nothing differed from the snapshot, so no request was sent
    Unchanged,
}

/// Attribute values captured when an existing record was loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    values: Arc<BTreeMap<String, Value>>,
}

impl Snapshot {
    fn capture(values: &BTreeMap<String, Value>) -> Self {
        Self {
            values: Arc::new(values.clone()),
        }
    }

    /// Recorded value of an attribute; attributes absent at load time read as `null`
    pub fn get(&self, class_name: &str) -> &Value {
        self.values.get(&class_name.to_lowercase()).unwrap_or(&NULL)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}

/// One SharePoint list record mapped onto local attribute names
#[derive(Clone)]
pub struct ListItem {
    values: BTreeMap<String, Value>,
    original: Option<Snapshot>,
    attribute_map: Option<Arc<AttributeMap>>,
    store: Option<Arc<dyn ListItemStore>>,
}

impl ListItem {
    /// Map an existing SharePoint record through `attribute_map`.
    ///
    /// Every mapped attribute is populated (missing fields become `null`). When
    /// the record carries an id, a snapshot is taken for change tracking.
    pub fn from_sharepoint_record(
        record: &Map<String, Value>,
        store: Arc<dyn ListItemStore>,
        attribute_map: Arc<AttributeMap>,
    ) -> Self {
        let mut values = BTreeMap::new();
        for mapping in attribute_map.iter() {
            let value = record.get(mapping.sharepoint_name()).cloned().unwrap_or(Value::Null);
            values.insert(mapping.class_name().to_string(), value);
        }

        if !attribute_map.maps_id() {
            values.insert(
                "id".to_string(),
                record.get("Id").cloned().unwrap_or(Value::Null),
            );
        }

        let mut item = Self {
            values,
            original: None,
            attribute_map: Some(attribute_map),
            store: Some(store),
        };

        if item.id().is_some() {
            item.original = Some(Snapshot::capture(&item.values));
        }

        item
    }

    /// Build an item straight from attribute values (keys are lower-cased).
    ///
    /// The owning list and attribute map must be given together or not at all;
    /// without them the item cannot be saved.
    pub fn from_dict(
        data: &Map<String, Value>,
        store: Option<Arc<dyn ListItemStore>>,
        attribute_map: Option<Arc<AttributeMap>>,
    ) -> Result<Self> {
        if store.is_some() != attribute_map.is_some() {
            return Err(SharePointError::list_item(
                "a list item needs both an owning list and an attribute map, or neither",
            ));
        }

        let values = data
            .iter()
            .map(|(key, value)| (key.to_lowercase(), value.clone()))
            .collect();

        Ok(Self {
            values,
            original: None,
            attribute_map,
            store,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(&name.to_lowercase())
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_lowercase(), value.into());
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    fn id_key(&self) -> &str {
        self.attribute_map
            .as_deref()
            .map(AttributeMap::id_class_name)
            .unwrap_or("id")
    }

    /// SharePoint id, or `None` for records not yet persisted
    pub fn id(&self) -> Option<i64> {
        self.values.get(self.id_key()).and_then(as_id)
    }

    pub fn set_id(&mut self, id: Option<i64>) {
        let key = self.id_key().to_string();
        self.values.insert(key, id.map(Value::from).unwrap_or(Value::Null));
    }

    pub fn original(&self) -> Option<&Snapshot> {
        self.original.as_ref()
    }

    pub fn attribute_map(&self) -> Option<&AttributeMap> {
        self.attribute_map.as_deref()
    }

    pub fn is_detached(&self) -> bool {
        self.store.is_none()
    }

    fn value_of(&self, class_name: &str) -> &Value {
        self.values.get(class_name).unwrap_or(&NULL)
    }

    /// Output-included attributes that differ from the snapshot, keyed by SharePoint name
    pub fn record_changes(&self) -> Map<String, Value> {
        let Some(attribute_map) = self.attribute_map.as_deref() else {
            return Map::new();
        };

        attribute_map
            .iter()
            .filter(|mapping| {
                mapping.include_in_output() && self.property_has_changed(mapping.class_name())
            })
            .map(|mapping| {
                (
                    mapping.sharepoint_name().to_string(),
                    self.value_of(mapping.class_name()).clone(),
                )
            })
            .collect()
    }

    /// Whether a mapped attribute differs from the snapshot; always true without one
    pub fn property_has_changed(&self, class_name: &str) -> bool {
        let Some(original) = &self.original else {
            return true;
        };

        let class_name = class_name.to_lowercase();
        match self.attribute_map.as_deref() {
            Some(map) if map.contains(&class_name) => {
                self.value_of(&class_name) != original.get(&class_name)
            }
            _ => false,
        }
    }

    /// Whether the full projection differs from the snapshot's projection
    pub fn has_changed(&self) -> bool {
        match &self.original {
            Some(original) => self.project(original.values()) != self.project(&self.values),
            None => true,
        }
    }

    fn project(&self, values: &BTreeMap<String, Value>) -> Map<String, Value> {
        let Some(attribute_map) = self.attribute_map.as_deref() else {
            return Map::new();
        };

        attribute_map
            .iter()
            .map(|mapping| {
                (
                    mapping.sharepoint_name().to_string(),
                    values.get(mapping.class_name()).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
    }

    fn require_store(&self) -> Result<&Arc<dyn ListItemStore>> {
        self.store.as_ref().ok_or_else(|| {
            SharePointError::list_item(
                "list item has no owning list; build it with a list and attribute map to save or delete it",
            )
        })
    }

    /// Build the JSON payload SharePoint expects for `format`
    pub fn to_upload_format(&self, format: UploadFormat) -> Result<Map<String, Value>> {
        match format {
            UploadFormat::Change => Ok(self.record_changes()),
            UploadFormat::All => Ok(self.project(&self.values)),
            UploadFormat::New => {
                let item_type = self.require_store()?.item_type().to_string();

                let mut record = self.project(&self.values);
                record.retain(|name, _| !name.eq_ignore_ascii_case("id"));
                record
                    .entry("Title")
                    .or_insert_with(|| Value::from(constants::DEFAULT_TITLE));
                record.insert("__metadata".to_string(), json!({ "type": item_type }));

                Ok(record)
            }
        }
    }

    /// Persist the item: insert when it has no id, otherwise update.
    ///
    /// Updates send only changed fields unless `force` is set, in which case
    /// every mapped attribute is sent.
    pub async fn save(&self, force: bool) -> Result<SaveOutcome> {
        let store = self.require_store()?;

        let Some(id) = self.id() else {
            let payload = self.to_upload_format(UploadFormat::New)?;
            debug!("Inserting new {} record", store.item_type());
            let created = store.add_list_item(Value::Object(payload)).await?;
            return Ok(SaveOutcome::Inserted(created));
        };

        let format = if force {
            UploadFormat::All
        } else {
            UploadFormat::Change
        };
        let payload = self.to_upload_format(format)?;

        if payload.is_empty() {
            debug!("Item {} unchanged, skipping update", id);
            return Ok(SaveOutcome::Unchanged);
        }

        store.update_list_item(id, Value::Object(payload)).await?;
        Ok(SaveOutcome::Updated)
    }

    /// Delete the record from its list; the local item is left untouched
    pub async fn delete(&self) -> Result<()> {
        let store = self.require_store()?;
        let id = self
            .id()
            .ok_or_else(|| SharePointError::list_item("cannot delete a list item without an id"))?;

        store.delete_list_item(id).await
    }

    /// Copy ready to be inserted as a new record
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.set_id(None);
        copy.original = None;
        copy
    }
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|id| id.fract() == 0.0 && id.is_finite())
                .map(|id| id as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

impl fmt::Debug for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListItem")
            .field("values", &self.values)
            .field("original", &self.original)
            .field("attribute_map", &self.attribute_map)
            .field("item_type", &self.store.as_ref().map(|store| store.item_type()))
            .finish()
    }
}

impl fmt::Display for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", json!(self.values))
    }
}
