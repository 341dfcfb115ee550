//! Extension analyzers.
//!
//! Analyzers contribute extra issues to diagnostic reports. They are registered
//! explicitly with a [`PluginRegistry`]; the built-in catalog can install them
//! by name.

pub mod example;
pub mod registry;

use crate::diagnose::Issue;
use crate::errors::PluginError;
use crate::k8s::{PodDetail, PodSummary};

pub use example::ExampleDetector;
pub use registry::{PluginRegistry, BUILTIN_PLUGINS};

/// The resource handed to analyzers.
#[derive(Debug, Clone, Copy)]
pub enum AnalysisTarget<'a> {
    /// A single inspected pod
    Pod(&'a PodDetail),
    /// A scanned namespace (`None` for all namespaces)
    Namespace {
        namespace: Option<&'a str>,
        pods: &'a [PodSummary],
    },
}

/// Capability every analyzer provides.
///
/// Analyzers run under the registry's read lock and must not call back into
/// the registry's mutating methods.
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn description(&self) -> &str;

    /// Inspect a resource and report issues.
    fn analyze(&self, target: &AnalysisTarget<'_>) -> Result<Vec<Issue>, PluginError>;
}
