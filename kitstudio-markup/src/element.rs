use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured description of one element, compiled to markup by [`crate::compile`].
///
/// Content sources are honored in priority order `html` → `text` → `children`;
/// only the first one present is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    /// Required at compile time. Kept optional so a missing tag degrades instead of
    /// failing the whole catalog file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "className"
    )]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inserted verbatim. Trusted input only: this bypasses HTML escaping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ElementSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, AttrValue>>,
    /// Inline styles; camelCase keys are emitted as kebab-case properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<BTreeMap<String, String>>,
    /// Re-parents the compiled element inside this spec.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapper: Option<Box<ElementSpec>>,
}

/// Attribute value: a boolean toggles a bare attribute, a string is emitted quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Flag(bool),
    Text(String),
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Flag(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    pub fn class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles
            .get_or_insert_with(BTreeMap::new)
            .insert(property.into(), value.into());
        self
    }

    pub fn wrapped_in(mut self, wrapper: ElementSpec) -> Self {
        self.wrapper = Some(Box::new(wrapper));
        self
    }
}

/// An item preview: raw markup, or a spec compiled on render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Preview {
    Markup(String),
    Element(ElementSpec),
}

impl From<&str> for Preview {
    fn from(v: &str) -> Self {
        Preview::Markup(v.to_string())
    }
}

impl From<ElementSpec> for Preview {
    fn from(v: ElementSpec) -> Self {
        Preview::Element(v)
    }
}
