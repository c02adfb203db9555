//! Registered component descriptors, keyed by component type.
//!
//! Data modules register descriptors up front; the orchestrator only reads. A store
//! with a catalog directory also loads `{source}.yaml` on first request.

use dashmap::DashMap;
use kitstudio_markup::{parse_catalog, ComponentDescriptor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{StudioError, StudioResult};

const CATALOG_EXTENSIONS: &[&str] = &["yaml", "yml"];

#[derive(Debug, Default)]
pub struct DescriptorStore {
    descriptors: DashMap<String, Arc<ComponentDescriptor>>,
    catalog_dir: Option<PathBuf>,
}

impl DescriptorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that falls back to `{dir}/{source}.yaml` for unknown sources.
    pub fn with_catalog_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            descriptors: DashMap::new(),
            catalog_dir: Some(dir.into()),
        }
    }

    pub fn catalog_dir(&self) -> Option<&Path> {
        self.catalog_dir.as_deref()
    }

    /// Register a descriptor under its component type. Last write wins.
    pub fn register(&self, descriptor: ComponentDescriptor) -> Arc<ComponentDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.descriptors
            .insert(descriptor.component_type.clone(), descriptor.clone());
        descriptor
    }

    pub fn get(&self, source_id: &str) -> Option<Arc<ComponentDescriptor>> {
        self.descriptors.get(source_id).map(|d| d.value().clone())
    }

    /// Registered source ids, sorted.
    pub fn sources(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.descriptors.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Registered descriptor, else the matching catalog file when a directory is set.
    pub async fn fetch(&self, source_id: &str) -> StudioResult<Arc<ComponentDescriptor>> {
        if let Some(descriptor) = self.get(source_id) {
            return Ok(descriptor);
        }

        let missing = || StudioError::MountSourceMissing {
            source_id: source_id.to_string(),
        };

        let Some(dir) = &self.catalog_dir else {
            return Err(missing());
        };
        if !is_plain_source_id(source_id) {
            return Err(missing());
        }

        for ext in CATALOG_EXTENSIONS {
            let path = dir.join(format!("{}.{}", source_id, ext));
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    let loaded = self.register_all(&content)?;
                    tracing::debug!(path = %path.display(), loaded, "catalog file loaded on demand");
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        self.get(source_id).ok_or_else(missing)
    }

    /// Load one catalog file. Returns the number of descriptors registered.
    pub async fn load_file(&self, path: impl AsRef<Path>) -> StudioResult<usize> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        self.register_all(&content)
    }

    /// Load every `*.yaml`/`*.yml` file in `dir`, in file name order.
    ///
    /// A file that fails to read or parse is logged and skipped; mounts that need it
    /// fail on their own. Returns the number of descriptors registered.
    pub async fn load_dir(&self, dir: impl AsRef<Path>) -> StudioResult<usize> {
        let mut entries = tokio::fs::read_dir(dir.as_ref()).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_catalog = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| CATALOG_EXTENSIONS.contains(&e))
                .unwrap_or(false);
            if is_catalog {
                paths.push(path);
            }
        }
        paths.sort();

        let mut total = 0;
        for path in paths {
            match self.load_file(&path).await {
                Ok(count) => {
                    tracing::debug!(path = %path.display(), count, "catalog file loaded");
                    total += count;
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping catalog file");
                }
            }
        }
        tracing::info!(dir = %dir.as_ref().display(), total, "catalog loaded");
        Ok(total)
    }

    fn register_all(&self, yaml: &str) -> StudioResult<usize> {
        let descriptors = parse_catalog(yaml)?;
        let count = descriptors.len();
        for descriptor in descriptors {
            self.register(descriptor);
        }
        Ok(count)
    }
}

/// Source ids map to file names; anything path-like is rejected.
fn is_plain_source_id(source_id: &str) -> bool {
    !source_id.is_empty()
        && !source_id.contains("..")
        && !source_id.contains(['/', '\\'])
}
