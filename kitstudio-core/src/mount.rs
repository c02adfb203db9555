//! Mount orchestrator: finds declarative mount points in a page and fills them.
//!
//! Mount point lifecycle:
//! - `Pending` → `Loading`: placeholder injected
//! - `Loading` → `Mounted`: markup injected, `after_render` run once
//! - `Loading` → `Failed`: inline error injected
//!
//! Every mount point renders in its own task; one failure never touches another.

use kitstudio_markup::{escape_html, ComponentDescriptor};
use std::sync::Arc;

use crate::cache::RenderCache;
use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::page::{NodePath, Page};
use crate::registry::RendererRegistry;
use crate::renderer::RendererHandle;
use crate::store::DescriptorStore;

/// Required marker: the component type to render.
pub const ATTR_COMPONENT_TYPE: &str = "component-type";
/// Optional: descriptor to render. Defaults to the component type.
pub const ATTR_DATA_SOURCE: &str = "data-source";
/// Optional: placeholder text while loading.
pub const ATTR_LOADING_TEXT: &str = "loading-text";

pub const DEFAULT_LOADING_TEXT: &str = "Loading...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountState {
    Pending,
    Loading,
    Mounted,
    Failed(String),
}

/// One declarative mount point found in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    pub path: NodePath,
    pub component_type: String,
    pub data_source: String,
    pub loading_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MountReport {
    pub component_type: String,
    pub data_source: String,
    pub state: MountState,
    /// Markup came from the render cache.
    pub cached: bool,
}

/// Outcome of one mount pass, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountSummary {
    pub reports: Vec<MountReport>,
}

impl MountSummary {
    pub fn mounted(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.state == MountState::Mounted)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.state, MountState::Failed(_)))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// A renderer's output for one (type, source) pair.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub renderer: RendererHandle,
    pub descriptor: Arc<ComponentDescriptor>,
    pub markup: String,
    pub cached: bool,
}

/// Owns the registry, cache and descriptor store shared by every mount.
#[derive(Debug, Clone)]
pub struct Studio {
    registry: Arc<RendererRegistry>,
    cache: Arc<RenderCache>,
    store: Arc<DescriptorStore>,
    loading_text: String,
}

impl Studio {
    pub fn new(registry: Arc<RendererRegistry>, store: Arc<DescriptorStore>) -> Self {
        Self {
            registry,
            cache: Arc::new(RenderCache::new()),
            store,
            loading_text: DEFAULT_LOADING_TEXT.to_string(),
        }
    }

    /// Built-in renderers and a store backed by the configured catalog directory.
    pub fn from_config(config: &StudioConfig) -> Self {
        Self::new(
            Arc::new(RendererRegistry::with_builtins()),
            Arc::new(DescriptorStore::with_catalog_dir(&config.catalog_dir)),
        )
        .with_loading_text(config.loading_text.clone())
    }

    pub fn with_cache(mut self, cache: Arc<RenderCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = text.into();
        self
    }

    pub fn registry(&self) -> &Arc<RendererRegistry> {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<RenderCache> {
        &self.cache
    }

    pub fn store(&self) -> &Arc<DescriptorStore> {
        &self.store
    }

    /// Resolve the renderer, then serve from cache or render and memoize.
    pub async fn render_component(
        &self,
        component_type: &str,
        source_id: &str,
    ) -> StudioResult<Rendered> {
        let renderer = self.registry.resolve(component_type)?;
        let descriptor = self.store.fetch(source_id).await?;
        let key = renderer.cache_key(&descriptor);

        if let Some(markup) = self.cache.get(&key) {
            tracing::debug!(%key, "render cache hit");
            return Ok(Rendered {
                renderer,
                descriptor,
                markup,
                cached: true,
            });
        }

        let markup = renderer.render(&descriptor);
        self.cache.put(key, markup.clone());
        Ok(Rendered {
            renderer,
            descriptor,
            markup,
            cached: false,
        })
    }

    /// Fill every mount point in `page`. Mount points render concurrently.
    pub async fn mount_page(&self, page: &mut Page) -> MountSummary {
        let points = scan_mount_points(page);
        let mut states = vec![MountState::Pending; points.len()];

        for (point, state) in points.iter().zip(states.iter_mut()) {
            let text = point.loading_text.as_deref().unwrap_or(&self.loading_text);
            if let Some(el) = page.element_mut(&point.path) {
                el.set_inner_markup(loading_markup(text));
                *state = MountState::Loading;
            }
        }

        let handles: Vec<_> = points
            .iter()
            .map(|point| {
                let studio = self.clone();
                let component_type = point.component_type.clone();
                let data_source = point.data_source.clone();
                tokio::spawn(async move {
                    studio
                        .render_component(&component_type, &data_source)
                        .await
                })
            })
            .collect();

        let mut summary = MountSummary::default();
        for ((point, handle), state) in points.iter().zip(handles).zip(states) {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(StudioError::TaskFailed(join_err.to_string())),
            };

            let (state, cached) = match (state, outcome) {
                (MountState::Loading, Ok(rendered)) => {
                    if let Some(el) = page.element_mut(&point.path) {
                        el.set_inner_markup(rendered.markup);
                    }
                    rendered
                        .renderer
                        .after_render(page, &point.path, &rendered.descriptor);
                    tracing::debug!(
                        component_type = %point.component_type,
                        data_source = %point.data_source,
                        cached = rendered.cached,
                        "mounted"
                    );
                    (MountState::Mounted, rendered.cached)
                }
                (MountState::Loading, Err(err)) => {
                    tracing::warn!(
                        component_type = %point.component_type,
                        data_source = %point.data_source,
                        error = %err,
                        "mount failed"
                    );
                    if let Some(el) = page.element_mut(&point.path) {
                        el.set_inner_markup(error_markup(&point.component_type, &err));
                    }
                    (MountState::Failed(err.to_string()), false)
                }
                (state, _) => (state, false),
            };

            summary.reports.push(MountReport {
                component_type: point.component_type.clone(),
                data_source: point.data_source.clone(),
                state,
                cached,
            });
        }

        tracing::info!(
            mounted = summary.mounted(),
            failed = summary.failed(),
            "mount pass complete"
        );
        summary
    }

    /// Clear the cache and mount a fresh copy of `template`.
    pub async fn reload(&self, template: &Page) -> (Page, MountSummary) {
        self.cache.clear();
        let mut page = template.clone();
        let summary = self.mount_page(&mut page).await;
        (page, summary)
    }
}

/// Outermost elements carrying a non-empty `component-type`, in document order.
pub fn scan_mount_points(page: &Page) -> Vec<MountPoint> {
    let paths = page.find_all(|el| {
        el.attr(ATTR_COMPONENT_TYPE)
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    });

    let mut points: Vec<MountPoint> = Vec::new();
    for path in paths {
        if points.iter().any(|p| path.starts_with(&p.path)) {
            continue;
        }
        let Some(el) = page.element(&path) else {
            continue;
        };
        let component_type = el.attr(ATTR_COMPONENT_TYPE).unwrap_or_default().trim().to_string();
        let data_source = el
            .attr(ATTR_DATA_SOURCE)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(component_type.as_str())
            .to_string();
        let loading_text = el.attr(ATTR_LOADING_TEXT).map(str::to_string);
        points.push(MountPoint {
            path,
            component_type,
            data_source,
            loading_text,
        });
    }
    points
}

fn loading_markup(text: &str) -> String {
    format!("<div class=\"mount-loading\">{}</div>", escape_html(text))
}

fn error_markup(component_type: &str, err: &StudioError) -> String {
    format!(
        "<div class=\"mount-error\" role=\"alert\">Failed to load {}: {}</div>",
        escape_html(component_type),
        escape_html(&err.to_string())
    )
}
