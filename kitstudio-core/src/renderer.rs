//! Renderer contract and the built-in renderer kinds.

use crate::page::{Page, PageElement};
use kitstudio_markup::render::{render_showcase_open, render_variant_with};
use kitstudio_markup::{compile, escape_html, render_descriptor, ComponentDescriptor, Item};
use std::fmt;
use std::sync::Arc;

/// Id of the shared modal element injected by [`ModalRenderer`].
pub const SHARED_MODAL_ID: &str = "kit-modal";

/// Anything that turns a descriptor into markup.
pub trait Renderer: Send + Sync + fmt::Debug {
    fn render(&self, descriptor: &ComponentDescriptor) -> String;

    /// Key under which the rendered markup is memoized.
    fn cache_key(&self, descriptor: &ComponentDescriptor) -> String {
        default_cache_key(descriptor)
    }

    /// Runs once per successful mount, after the markup is injected at `mount`.
    fn after_render(&self, _page: &mut Page, _mount: &[usize], _descriptor: &ComponentDescriptor) {}
}

pub type RendererHandle = Arc<dyn Renderer>;

/// `{type}-{id}`
pub fn default_cache_key(descriptor: &ComponentDescriptor) -> String {
    format!("{}-{}", descriptor.component_type, descriptor.id)
}

/// Built-in renderer kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    Generic,
    Modal,
    Icon,
}

impl RendererKind {
    pub const ALL: [RendererKind; 3] = [RendererKind::Generic, RendererKind::Modal, RendererKind::Icon];

    /// Registry key the kind is registered under by default.
    pub fn key(self) -> &'static str {
        match self {
            RendererKind::Generic => "generic",
            RendererKind::Modal => "modal",
            RendererKind::Icon => "icon",
        }
    }

    pub fn handle(self) -> RendererHandle {
        match self {
            RendererKind::Generic => Arc::new(GenericRenderer),
            RendererKind::Modal => Arc::new(ModalRenderer),
            RendererKind::Icon => Arc::new(IconRenderer),
        }
    }
}

/// Header plus one item grid per variant.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericRenderer;

impl Renderer for GenericRenderer {
    fn render(&self, descriptor: &ComponentDescriptor) -> String {
        render_descriptor(descriptor)
    }
}

/// Items get an "open" trigger wired to one shared modal element.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModalRenderer;

impl ModalRenderer {
    /// Id of the `n`th trigger (1-based) rendered for a descriptor.
    pub fn trigger_id(descriptor: &ComponentDescriptor, n: usize) -> String {
        format!("{}-open-{}", descriptor.id, n)
    }

    fn render_modal_item(trigger_id: &str, item: &Item) -> String {
        let label = escape_html(&item.label);
        let mut out = String::from("<div class=\"component-item modal-demo\">");
        out.push_str("<div class=\"component-preview\">");
        out.push_str(&compile(&item.preview));
        out.push_str("</div>");
        out.push_str(&format!(
            "<button type=\"button\" class=\"modal-trigger\" id=\"{}\" data-action=\"modal-open\" data-target=\"{}\" data-modal-title=\"{}\">Open {}</button>",
            escape_html(trigger_id),
            SHARED_MODAL_ID,
            label,
            label
        ));
        out.push_str("<div class=\"component-label\">");
        out.push_str(&label);
        out.push_str("</div></div>");
        out
    }

    /// The shared dialog shell, hidden until a trigger opens it.
    pub fn modal_element() -> PageElement {
        PageElement::new("div")
            .with_attr("id", SHARED_MODAL_ID)
            .with_attr("class", "modal")
            .with_attr("data-widget", "modal")
            .with_attr("role", "dialog")
            .with_attr("aria-modal", "true")
            .with_attr("hidden", "")
            .with_child(
                PageElement::new("div")
                    .with_attr("class", "modal-dialog")
                    .with_child(PageElement::new("h2").with_attr("class", "modal-title"))
                    .with_child(PageElement::new("div").with_attr("class", "modal-body"))
                    .with_child(
                        PageElement::new("button")
                            .with_attr("type", "button")
                            .with_attr("id", format!("{}-close", SHARED_MODAL_ID))
                            .with_attr("class", "modal-close")
                            .with_attr("data-action", "modal-close")
                            .with_text("Close"),
                    ),
            )
    }
}

impl Renderer for ModalRenderer {
    fn render(&self, descriptor: &ComponentDescriptor) -> String {
        let mut out = render_showcase_open(descriptor);
        let mut n = 0;
        for variant in &descriptor.variants {
            out.push_str(&render_variant_with(variant, "variant-grid", |item| {
                n += 1;
                Self::render_modal_item(&Self::trigger_id(descriptor, n), item)
            }));
        }
        out.push_str("</div>");
        out
    }

    fn cache_key(&self, descriptor: &ComponentDescriptor) -> String {
        format!("{}@modal", default_cache_key(descriptor))
    }

    fn after_render(&self, page: &mut Page, _mount: &[usize], _descriptor: &ComponentDescriptor) {
        if page.find_by_id(SHARED_MODAL_ID).is_some() {
            return;
        }
        tracing::debug!(id = SHARED_MODAL_ID, "injecting shared modal");
        page.append_to_body(Self::modal_element());
    }
}

/// Icons laid out as a dense grid of glyph + name cells.
#[derive(Debug, Default, Clone, Copy)]
pub struct IconRenderer;

impl IconRenderer {
    fn render_icon_cell(item: &Item) -> String {
        format!(
            "<div class=\"icon-cell\"><div class=\"icon-glyph\">{}</div><span class=\"icon-name\">{}</span></div>",
            compile(&item.preview),
            escape_html(&item.label)
        )
    }
}

impl Renderer for IconRenderer {
    fn render(&self, descriptor: &ComponentDescriptor) -> String {
        let mut out = render_showcase_open(descriptor);
        for variant in &descriptor.variants {
            out.push_str(&render_variant_with(variant, "icon-grid", Self::render_icon_cell));
        }
        out.push_str("</div>");
        out
    }

    fn cache_key(&self, descriptor: &ComponentDescriptor) -> String {
        format!("{}@icon", default_cache_key(descriptor))
    }
}
