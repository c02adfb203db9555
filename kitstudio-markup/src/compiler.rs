//! Structured element specs to markup strings.
//!
//! [`escape_html`] is the only escaping boundary. `html` content bypasses it and
//! must come from trusted catalog data.

use crate::element::{AttrValue, ElementSpec, Preview};
use crate::error::MarkupError;
use crate::validator::validate_attribute_name;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::OnceLock;

/// Compile a preview. Raw markup is returned unchanged.
pub fn compile(preview: &Preview) -> String {
    match preview {
        Preview::Markup(markup) => markup.clone(),
        Preview::Element(spec) => compile_element(spec),
    }
}

/// Compile one element spec and its subtree.
///
/// A spec without a tag is logged and compiles to an empty string.
pub fn compile_element(spec: &ElementSpec) -> String {
    let Some(tag) = spec.tag.as_deref().filter(|t| !t.is_empty()) else {
        let err = MarkupError::MalformedSpec {
            reason: "element spec is missing 'tag'".to_string(),
        };
        tracing::warn!(error = %err, "skipping element");
        return String::new();
    };

    let attrs = build_attrs(tag, spec);
    let content = resolve_content(spec);

    let mut out = String::with_capacity(tag.len() * 2 + attrs.len() + content.len() + 5);
    // Writing into a String never fails.
    let _ = write!(out, "<{} {}>{}</{}>", tag, attrs, content, tag);

    match &spec.wrapper {
        Some(wrapper) => {
            let mut outer = (**wrapper).clone();
            outer.html = Some(out);
            compile_element(&outer)
        }
        None => out,
    }
}

fn resolve_content(spec: &ElementSpec) -> String {
    if let Some(html) = &spec.html {
        return html.clone();
    }
    if let Some(text) = &spec.text {
        return escape_html(text);
    }
    spec.children
        .as_ref()
        .map(|children| children.iter().map(compile_element).collect())
        .unwrap_or_default()
}

/// Build the attribute string: class, then inline style, then explicit attributes.
fn build_attrs(tag: &str, spec: &ElementSpec) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(class) = spec.class_name.as_deref().filter(|c| !c.is_empty()) {
        parts.push(format!("class=\"{}\"", escape_html(class)));
    }

    if let Some(styles) = spec.styles.as_ref().filter(|s| !s.is_empty()) {
        parts.push(format!("style=\"{}\"", escape_html(&styles_to_css(styles))));
    }

    if let Some(attributes) = &spec.attributes {
        for (name, value) in attributes {
            if let Err(err) = validate_attribute_name(tag, name) {
                let err = MarkupError::MalformedSpec {
                    reason: err.to_string(),
                };
                tracing::warn!(error = %err, "dropping attribute");
                continue;
            }
            match value {
                AttrValue::Flag(true) => parts.push(name.clone()),
                AttrValue::Flag(false) => {}
                AttrValue::Text(v) => parts.push(format!("{}=\"{}\"", name, escape_html(v))),
            }
        }
    }

    parts.join(" ")
}

/// `{fontSize: "12px", color: "red"}` → `color: red; font-size: 12px`
pub fn styles_to_css(styles: &BTreeMap<String, String>) -> String {
    styles
        .iter()
        .map(|(k, v)| format!("{}: {}", kebab_case(k), v))
        .collect::<Vec<_>>()
        .join("; ")
}

fn uppercase_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Z]").unwrap())
}

/// camelCase → kebab-case. Already-kebab keys pass through.
pub fn kebab_case(key: &str) -> String {
    uppercase_regex()
        .replace_all(key, |caps: &regex::Captures| {
            format!("-{}", caps[0].to_ascii_lowercase())
        })
        .into_owned()
}

/// Escape text for use in element content or a quoted attribute value.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
