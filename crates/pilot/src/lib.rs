//! AI-assisted Kubernetes operations.
//!
//! `pilot` turns natural-language intent into reviewable `kubectl` plans,
//! scores live pod state into diagnostic reports, and screens every generated
//! command through an inline policy gate before it is previewed or applied.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use pilot::ai::MockProvider;
//! use pilot::plan::{Planner, RecordingExecutor};
//! use pilot::policy::PolicyGate;
//!
//! # async fn run() -> pilot::errors::PilotResult<()> {
//! let planner = Planner::new(Arc::new(MockProvider::new()), PolicyGate::new(true), "default", true);
//! let plan = planner.generate("restart the api pods").await?;
//! let result = plan.execute(&RecordingExecutor::new()).await;
//! assert!(result.executed.iter().all(|c| c.starts_with("[DRY-RUN]")));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`ai::AiProvider`] is the boundary to the language model backends
//! - [`k8s::ResourceQuery`] is the read-only view of the cluster
//! - [`plan::Planner`] builds and screens plans
//! - [`diagnose::DiagnosticsEngine`] scores pods and suggests remediations
//! - [`policy::PolicyGate`] accepts or rejects command text
//! - [`plugins::PluginRegistry`] holds extra analyzers for diagnostics
//! - [`explain::Explainer`] answers questions about logs, events and concepts

pub mod ai;
pub mod config;
pub mod diagnose;
pub mod display;
pub mod errors;
pub mod explain;
pub mod k8s;
pub mod logging;
pub mod plan;
pub mod plugins;
pub mod policy;

pub use config::PilotConfig;
pub use errors::{AiError, PilotError, PilotResult, PluginError};
