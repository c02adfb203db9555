use serde::{Deserialize, Deserializer, Serialize};

use crate::element::Preview;
use crate::error::{MarkupError, MarkupResult};

/// One catalog entry, e.g. "button". Keyed by `component_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    #[serde(rename = "type")]
    pub component_type: String,
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// A titled group of example items. Display order is sequence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `None` when the source has no items sequence; rendered as nothing.
    #[serde(
        default,
        deserialize_with = "lenient_items",
        skip_serializing_if = "Option::is_none"
    )]
    pub items: Option<Vec<Item>>,
}

/// A single example: preview plus label, with optional source snippet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub preview: Preview,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Anything other than a sequence becomes `None` so one bad variant cannot fail the file.
fn lenient_items<'de, D>(deserializer: D) -> Result<Option<Vec<Item>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        Some(serde_yaml::Value::Sequence(seq)) => seq
            .into_iter()
            .map(serde_yaml::from_value)
            .collect::<Result<Vec<Item>, _>>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

impl ComponentDescriptor {
    pub fn new(component_type: impl Into<String>, id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            id: id.into(),
            title: title.into(),
            description: None,
            variants: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Total number of items across well-formed variants.
    pub fn item_count(&self) -> usize {
        self.variants
            .iter()
            .filter_map(|v| v.items.as_ref())
            .map(Vec::len)
            .sum()
    }
}

impl Variant {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            items: Some(Vec::new()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.get_or_insert_with(Vec::new).push(item);
        self
    }
}

impl Item {
    pub fn new(preview: impl Into<Preview>, label: impl Into<String>) -> Self {
        Self {
            preview: preview.into(),
            label: label.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Parse a catalog file: either one descriptor mapping or a sequence of them.
pub fn parse_catalog(yaml: &str) -> MarkupResult<Vec<ComponentDescriptor>> {
    if yaml.trim().is_empty() {
        return Err(MarkupError::ValidationError(
            "empty catalog file".to_string(),
        ));
    }

    let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
    match value {
        serde_yaml::Value::Sequence(_) => Ok(serde_yaml::from_value(value)?),
        serde_yaml::Value::Mapping(_) => Ok(vec![serde_yaml::from_value(value)?]),
        serde_yaml::Value::Null => Err(MarkupError::ValidationError(
            "empty catalog file".to_string(),
        )),
        _ => Err(MarkupError::ValidationError(
            "catalog file must be a descriptor mapping or a sequence of descriptors".to_string(),
        )),
    }
}
