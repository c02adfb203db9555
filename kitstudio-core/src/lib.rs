//! # KitStudio Core
//!
//! Renders the component catalog into pages that declare where components go.
//!
//! A page marks a mount point with `component-type` (plus optional `data-source`
//! and `loading-text`). [`Studio::mount_page`] resolves a renderer for each mount
//! point, renders its descriptor (memoized in the [`RenderCache`]), and injects the
//! markup. Mount points render concurrently and fail independently.
//!
//! ## Example
//! ```ignore
//! use kitstudio_core::{Page, StudioConfig, Studio};
//!
//! let config = StudioConfig::load(None)?;
//! let studio = Studio::from_config(&config);
//! studio.store().load_dir(&config.catalog_dir).await?;
//!
//! let mut page = Page::parse(r#"<main><section component-type="button"/></main>"#)?;
//! let summary = studio.mount_page(&mut page).await;
//! println!("{}", page.to_html());
//! ```

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod mount;
pub mod page;
pub mod registry;
pub mod renderer;
pub mod store;
pub mod widgets;

pub use app::{render_page_file, RenderedPage};
pub use cache::{CacheEntry, RenderCache};
pub use config::StudioConfig;
pub use error::{StudioError, StudioResult};
pub use mount::{scan_mount_points, MountPoint, MountReport, MountState, MountSummary, Rendered, Studio};
pub use page::{parse_fragment, NodePath, Page, PageElement, PageNode};
pub use registry::{RendererRegistry, GENERIC_RENDERER};
pub use renderer::{
    GenericRenderer, IconRenderer, ModalRenderer, Renderer, RendererHandle, RendererKind,
};
pub use store::DescriptorStore;
pub use widgets::{apply_patches, ActionDispatcher, Change, EventKind, Patch, WidgetEvent, WidgetKind};
