//! Component type → renderer dispatch table.

use dashmap::DashMap;

use crate::error::{StudioError, StudioResult};
use crate::renderer::{RendererHandle, RendererKind};

/// Key of the fallback renderer used when a type has no exact registration.
pub const GENERIC_RENDERER: &str = "generic";

#[derive(Debug, Default)]
pub struct RendererRegistry {
    renderers: DashMap<String, RendererHandle>,
}

impl RendererRegistry {
    /// Create an empty registry. Nothing resolves until a renderer is registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the generic, modal and icon renderers under their default keys.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for kind in RendererKind::ALL {
            registry.register(kind.key(), kind.handle());
        }
        registry
    }

    /// Register a renderer for a component type. Replaces any previous registration.
    pub fn register(&self, component_type: impl Into<String>, renderer: RendererHandle) {
        let component_type = component_type.into();
        if self
            .renderers
            .insert(component_type.clone(), renderer)
            .is_some()
        {
            tracing::debug!(%component_type, "renderer replaced");
        }
    }

    /// Exact match, else the generic fallback.
    pub fn resolve(&self, component_type: &str) -> StudioResult<RendererHandle> {
        if let Some(renderer) = self.renderers.get(component_type) {
            return Ok(renderer.value().clone());
        }
        self.renderers
            .get(GENERIC_RENDERER)
            .map(|r| r.value().clone())
            .ok_or_else(|| StudioError::RendererNotFound {
                component_type: component_type.to_string(),
            })
    }

    /// Registered type keys, sorted. Diagnostics only.
    pub fn list_registered(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.renderers.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}
