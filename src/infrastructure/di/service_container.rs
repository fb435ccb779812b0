//! Service container for dependency injection
//!
//! Wires services to the settings and the filesystem boundary.

use std::sync::Arc;

use crate::application::services::{AnalysisService, TreeService};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding settings and the I/O boundary; hands out services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
        }
    }

    pub fn analysis_service(&self) -> AnalysisService {
        AnalysisService::new(Arc::clone(&self.fs), self.settings.limits.clone())
    }

    pub fn tree_service(&self) -> TreeService {
        TreeService::new(self.settings.tree.clone())
    }
}
