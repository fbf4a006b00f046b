use serde::{Deserialize, Serialize};

/// Correspondence between a local attribute and a SharePoint internal field name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MappingSpec")]
pub struct AttributeMapping {
    class_name: String,
    sharepoint_name: String,
    include_in_output: bool,
}

// Deserialization goes through `new` so class names are always case-folded
#[derive(Deserialize)]
struct MappingSpec {
    class_name: String,
    sharepoint_name: String,
    #[serde(default = "default_include")]
    include_in_output: bool,
}

fn default_include() -> bool {
    true
}

impl From<MappingSpec> for AttributeMapping {
    fn from(spec: MappingSpec) -> Self {
        Self::new(spec.class_name, spec.sharepoint_name, spec.include_in_output)
    }
}

impl AttributeMapping {
    pub fn new(
        class_name: impl Into<String>,
        sharepoint_name: impl Into<String>,
        include_in_output: bool,
    ) -> Self {
        Self {
            class_name: class_name.into().to_lowercase(),
            sharepoint_name: sharepoint_name.into(),
            include_in_output,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn sharepoint_name(&self) -> &str {
        &self.sharepoint_name
    }

    pub fn include_in_output(&self) -> bool {
        self.include_in_output
    }

    /// Whether this entry maps SharePoint's item id field
    pub fn is_id(&self) -> bool {
        self.sharepoint_name.eq_ignore_ascii_case("id")
    }
}

/// Ordered set of attribute mappings keyed by class name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AttributeMapping>", into = "Vec<AttributeMapping>")]
pub struct AttributeMap {
    entries: Vec<AttributeMapping>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(
        mut self,
        class_name: impl Into<String>,
        sharepoint_name: impl Into<String>,
        include_in_output: bool,
    ) -> Self {
        self.insert(AttributeMapping::new(class_name, sharepoint_name, include_in_output));
        self
    }

    /// Insert a mapping, replacing any entry with the same class name in place
    pub fn insert(&mut self, mapping: AttributeMapping) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.class_name == mapping.class_name)
        {
            Some(existing) => *existing = mapping,
            None => self.entries.push(mapping),
        }
    }

    pub fn get(&self, class_name: &str) -> Option<&AttributeMapping> {
        let class_name = class_name.to_lowercase();
        self.entries.iter().find(|mapping| mapping.class_name == class_name)
    }

    pub fn by_sharepoint_name(&self, sharepoint_name: &str) -> Option<&AttributeMapping> {
        self.entries
            .iter()
            .find(|mapping| mapping.sharepoint_name == sharepoint_name)
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.get(class_name).is_some()
    }

    /// Attribute holding the item id: the one mapped to SharePoint's `Id`, else `id`
    pub fn id_class_name(&self) -> &str {
        self.entries
            .iter()
            .find(|mapping| mapping.is_id())
            .map(AttributeMapping::class_name)
            .unwrap_or("id")
    }

    pub fn maps_id(&self) -> bool {
        self.entries.iter().any(AttributeMapping::is_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeMapping> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<AttributeMapping>> for AttributeMap {
    fn from(mappings: Vec<AttributeMapping>) -> Self {
        mappings.into_iter().collect()
    }
}

impl From<AttributeMap> for Vec<AttributeMapping> {
    fn from(map: AttributeMap) -> Self {
        map.entries
    }
}

impl FromIterator<AttributeMapping> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = AttributeMapping>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        for mapping in iter {
            map.insert(mapping);
        }
        map
    }
}

impl<C, S> FromIterator<(C, S, bool)> for AttributeMap
where
    C: Into<String>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, S, bool)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(class_name, sharepoint_name, include)| {
                AttributeMapping::new(class_name, sharepoint_name, include)
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = &'a AttributeMapping;
    type IntoIter = std::slice::Iter<'a, AttributeMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
