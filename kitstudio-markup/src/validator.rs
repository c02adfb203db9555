use crate::catalog::ComponentDescriptor;
use crate::element::{ElementSpec, Preview};
use crate::error::{MarkupError, MarkupResult};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const MAX_NESTING_DEPTH: usize = 32;

fn component_type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").unwrap())
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9-]*$").unwrap())
}

/// Validate a descriptor before it is registered.
///
/// Rendering never calls this; the compiler degrades on bad input instead.
pub fn validate_descriptor(descriptor: &ComponentDescriptor) -> MarkupResult<()> {
    if !component_type_regex().is_match(&descriptor.component_type) {
        return Err(MarkupError::InvalidComponentType {
            component_type: descriptor.component_type.clone(),
        });
    }

    if descriptor.id.trim().is_empty() {
        return Err(MarkupError::ValidationError(format!(
            "Component '{}' has an empty id",
            descriptor.component_type
        )));
    }

    if descriptor.title.trim().is_empty() {
        return Err(MarkupError::ValidationError(format!(
            "Component '{}' has an empty title",
            descriptor.component_type
        )));
    }

    let mut seen = HashSet::new();
    for variant in &descriptor.variants {
        if !seen.insert(variant.title.as_str()) {
            return Err(MarkupError::DuplicateVariant {
                component_type: descriptor.component_type.clone(),
                title: variant.title.clone(),
            });
        }

        let items = variant.items.as_ref().ok_or_else(|| MarkupError::MissingVariantItems {
            variant: variant.title.clone(),
        })?;

        for item in items {
            if let Preview::Element(spec) = &item.preview {
                validate_element(spec, 0)?;
            }
        }
    }

    Ok(())
}

/// Validate an element spec tree
pub fn validate_element(spec: &ElementSpec, depth: usize) -> MarkupResult<()> {
    if depth > MAX_NESTING_DEPTH {
        return Err(MarkupError::MaxNestingDepthExceeded {
            max_depth: MAX_NESTING_DEPTH,
        });
    }

    let tag = match spec.tag.as_deref() {
        Some(tag) => tag,
        None => {
            return Err(MarkupError::MalformedSpec {
                reason: "element spec is missing 'tag'".to_string(),
            })
        }
    };

    if !tag_regex().is_match(tag) {
        return Err(MarkupError::InvalidTag { tag: tag.to_string() });
    }

    if let Some(attributes) = &spec.attributes {
        for name in attributes.keys() {
            validate_attribute_name(tag, name)?;
        }
    }

    if let Some(children) = &spec.children {
        for child in children {
            validate_element(child, depth + 1)?;
        }
    }

    if let Some(wrapper) = &spec.wrapper {
        validate_element(wrapper, depth + 1)?;
    }

    Ok(())
}

/// Attribute names must be safe to write unquoted into a start tag.
pub(crate) fn validate_attribute_name(tag: &str, name: &str) -> MarkupResult<()> {
    let invalid = |reason: &str| MarkupError::InvalidAttribute {
        tag: tag.to_string(),
        attribute: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("attribute name is empty"));
    }

    if name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '/'))
    {
        return Err(invalid("attribute name contains a forbidden character"));
    }

    if name.to_ascii_lowercase().starts_with("on") {
        return Err(invalid("inline event handlers are not allowed"));
    }

    Ok(())
}
