use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;
use tracing::warn;

use crate::error::Result;
use crate::registry::ModelRegistry;

/// Shared, reloadable reference to the current [`ModelRegistry`].
///
/// Readers take a snapshot and keep using it for as long as they like; a
/// reload publishes a whole new registry with a single pointer swap, so a
/// snapshot is never observed half-updated.
#[derive(Debug)]
pub struct RegistryHandle {
    current: ArcSwap<ModelRegistry>,
}

impl RegistryHandle {
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            current: ArcSwap::from_pointee(registry),
        }
    }

    /// The registry as of now.
    pub fn snapshot(&self) -> Arc<ModelRegistry> {
        self.current.load_full()
    }

    /// Publish `registry` and return the one it replaced.
    pub fn replace(&self, registry: ModelRegistry) -> Arc<ModelRegistry> {
        let next = Arc::new(registry);
        info!(
            aliases = next.len(),
            model_names = next.model_name_count(),
            "model registry replaced"
        );
        self.current.swap(next)
    }

    /// Load `source` and publish it. On failure the current registry stays
    /// in place.
    pub fn reload_from_str(&self, source: &str) -> Result<()> {
        match ModelRegistry::load(source) {
            Ok(registry) => {
                self.replace(registry);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "model registry reload rejected");
                Err(err)
            }
        }
    }

    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<()> {
        match ModelRegistry::load_from_path(path) {
            Ok(registry) => {
                self.replace(registry);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "model registry reload rejected");
                Err(err)
            }
        }
    }
}

impl From<ModelRegistry> for RegistryHandle {
    fn from(registry: ModelRegistry) -> Self {
        Self::new(registry)
    }
}
