//! Catalog item, variant and showcase markup built on the compiler.

use crate::catalog::{ComponentDescriptor, Item, Variant};
use crate::compiler::{compile, escape_html};
use crate::error::MarkupError;

/// Preview block plus label block; the code snippet follows when present.
pub fn render_item(item: &Item) -> String {
    let mut out = String::from("<div class=\"component-item\">");
    out.push_str("<div class=\"component-preview\">");
    out.push_str(&compile(&item.preview));
    out.push_str("</div><div class=\"component-label\">");
    out.push_str(&escape_html(&item.label));
    out.push_str("</div>");
    if let Some(code) = &item.code {
        out.push_str("<pre class=\"component-code\"><code>");
        out.push_str(&escape_html(code));
        out.push_str("</code></pre>");
    }
    out.push_str("</div>");
    out
}

/// A titled section with every item in order. Empty if the variant has no items sequence.
pub fn render_variant(variant: &Variant) -> String {
    render_variant_with(variant, "variant-grid", render_item)
}

/// Same section shell as [`render_variant`] with a custom grid class and item layout.
pub fn render_variant_with<F>(variant: &Variant, grid_class: &str, render: F) -> String
where
    F: FnMut(&Item) -> String,
{
    let Some(items) = &variant.items else {
        let err = MarkupError::MissingVariantItems {
            variant: variant.title.clone(),
        };
        tracing::warn!(error = %err, "skipping variant");
        return String::new();
    };

    let body: String = items.iter().map(render).collect();

    let mut out = String::from("<section class=\"component-variant\">");
    out.push_str("<h3 class=\"variant-title\">");
    out.push_str(&escape_html(&variant.title));
    out.push_str("</h3>");
    if let Some(description) = &variant.description {
        out.push_str("<p class=\"variant-description\">");
        out.push_str(&escape_html(description));
        out.push_str("</p>");
    }
    out.push_str("<div class=\"");
    out.push_str(&escape_html(grid_class));
    out.push_str("\">");
    out.push_str(&body);
    out.push_str("</div></section>");
    out
}

/// Opening of a showcase container with its header. Close with `</div>`.
pub fn render_showcase_open(descriptor: &ComponentDescriptor) -> String {
    let mut out = format!(
        "<div class=\"component-showcase\" data-component=\"{}\" id=\"{}\">",
        escape_html(&descriptor.component_type),
        escape_html(&descriptor.id)
    );
    out.push_str("<header class=\"component-header\"><h2 class=\"component-title\">");
    out.push_str(&escape_html(&descriptor.title));
    out.push_str("</h2>");
    if let Some(description) = &descriptor.description {
        out.push_str("<p class=\"component-description\">");
        out.push_str(&escape_html(description));
        out.push_str("</p>");
    }
    out.push_str("</header>");
    out
}

/// Generic showcase: header followed by every variant in order.
pub fn render_descriptor(descriptor: &ComponentDescriptor) -> String {
    let mut out = render_showcase_open(descriptor);
    for variant in &descriptor.variants {
        out.push_str(&render_variant(variant));
    }
    out.push_str("</div>");
    out
}
