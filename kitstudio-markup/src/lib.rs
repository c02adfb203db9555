//! # KitStudio Markup
//!
//! Catalog data model and markup compiler for the KitStudio component library.
//!
//! ## Features
//! - Catalog descriptors (component → variants → items) loaded from YAML
//! - Element specs compiled to HTML with a single escaping boundary
//! - Item, variant and showcase renderers that degrade instead of failing
//! - Descriptor validation for authoring tools
//!
//! ## Example
//! ```ignore
//! use kitstudio_markup::{compile_element, ElementSpec};
//!
//! let spec = ElementSpec::new("button").class("btn btn-primary").text("Save");
//! assert_eq!(
//!     compile_element(&spec),
//!     r#"<button class="btn btn-primary">Save</button>"#
//! );
//! ```
//!
//! ## Example: catalog file
//! ```ignore
//! use kitstudio_markup::{parse_catalog, render_descriptor};
//!
//! let yaml = r#"
//! type: chip
//! id: chip-demo
//! title: Chips
//! variants:
//!   - title: Colors
//!     items:
//!       - preview: '<span class="chip">Default</span>'
//!         label: Default
//! "#;
//!
//! let descriptors = parse_catalog(yaml).expect("Failed to parse catalog");
//! let html = render_descriptor(&descriptors[0]);
//! ```

pub mod catalog;
pub mod compiler;
pub mod element;
pub mod error;
pub mod render;
pub mod validator;

pub use catalog::{parse_catalog, ComponentDescriptor, Item, Variant};
pub use compiler::{compile, compile_element, escape_html};
pub use element::{AttrValue, ElementSpec, Preview};
pub use error::{MarkupError, MarkupResult};
pub use render::{render_descriptor, render_item, render_variant};
pub use validator::validate_descriptor;

/// Parse a catalog file and validate every descriptor in it.
pub fn parse_and_validate(yaml: &str) -> MarkupResult<Vec<ComponentDescriptor>> {
    let descriptors = parse_catalog(yaml)?;
    for descriptor in &descriptors {
        validate_descriptor(descriptor)?;
    }
    Ok(descriptors)
}

/// Read, parse and validate one catalog file. Returns the number of descriptors.
pub fn validate_file(path: impl AsRef<std::path::Path>) -> MarkupResult<usize> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_and_validate(&content)?.len())
}

/// `catalog-validate` exit status: 0 when every file passed, 1 otherwise.
pub fn validation_exit_code<T>(results: &[MarkupResult<T>]) -> i32 {
    if results.iter().all(Result::is_ok) {
        0
    } else {
        1
    }
}
