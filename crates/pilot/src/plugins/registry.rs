//! Plugin Registry - concurrency-safe collection of analyzers.
//!
//! Mutations take the write lock; lookups and [`PluginRegistry::run_analysis`]
//! take the read lock, so analysis can overlap other reads but never a
//! mutation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::diagnose::Issue;
use crate::errors::PluginError;

use super::example::ExampleDetector;
use super::{AnalysisTarget, Analyzer};

/// Names accepted by [`PluginRegistry::install_by_name`].
pub const BUILTIN_PLUGINS: &[&str] = &[ExampleDetector::NAME];

/// Registry of analyzers keyed by unique name.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<HashMap<String, Arc<dyn Analyzer>>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Analyzer>>> {
        self.plugins.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Analyzer>>> {
        self.plugins.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an analyzer. Fails if the name is taken.
    pub fn register(&self, plugin: Arc<dyn Analyzer>) -> Result<(), PluginError> {
        let mut plugins = self.write();
        let name = plugin.name().to_string();
        if plugins.contains_key(&name) {
            return Err(PluginError::AlreadyRegistered(name));
        }

        info!(plugin = %name, version = plugin.version(), "Registered plugin");
        plugins.insert(name, plugin);
        Ok(())
    }

    /// Remove an analyzer. Fails if the name is not registered.
    pub fn unregister(&self, name: &str) -> Result<(), PluginError> {
        let mut plugins = self.write();
        if plugins.remove(name).is_none() {
            return Err(PluginError::NotFound(name.to_string()));
        }

        info!(plugin = %name, "Unregistered plugin");
        Ok(())
    }

    /// Get an analyzer by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Analyzer>, PluginError> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| PluginError::NotFound(name.to_string()))
    }

    /// All registered analyzers.
    pub fn list(&self) -> Vec<Arc<dyn Analyzer>> {
        self.read().values().cloned().collect()
    }

    /// Names of all registered analyzers.
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Remove every analyzer.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Run every analyzer against a resource.
    ///
    /// Failing analyzers are logged and skipped. Results are concatenated in
    /// map iteration order, which is not stable across runs.
    pub fn run_analysis(&self, target: &AnalysisTarget<'_>) -> Vec<Issue> {
        let plugins = self.read();
        let mut all_issues = Vec::new();

        for plugin in plugins.values() {
            match plugin.analyze(target) {
                Ok(issues) => {
                    debug!(plugin = plugin.name(), count = issues.len(), "Plugin analysis complete");
                    all_issues.extend(issues);
                }
                Err(e) => {
                    warn!(plugin = plugin.name(), error = %e, "Plugin analysis failed");
                }
            }
        }

        all_issues
    }

    /// Alias for [`register`](Self::register).
    pub fn install(&self, plugin: Arc<dyn Analyzer>) -> Result<(), PluginError> {
        self.register(plugin)
    }

    /// Install a built-in analyzer by name.
    pub fn install_by_name(&self, name: &str) -> Result<(), PluginError> {
        let plugin: Arc<dyn Analyzer> = match name {
            ExampleDetector::NAME | "example" => Arc::new(ExampleDetector::new()),
            _ => {
                return Err(PluginError::UnknownPlugin {
                    name: name.to_string(),
                    available: BUILTIN_PLUGINS.join(", "),
                })
            }
        };
        self.install(plugin)
    }

    /// Alias for [`unregister`](Self::unregister).
    pub fn uninstall(&self, name: &str) -> Result<(), PluginError> {
        self.unregister(name)
    }
}
