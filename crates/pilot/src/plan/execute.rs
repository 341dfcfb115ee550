//! Command execution seam.
//!
//! Plans hand approved commands to a [`CommandExecutor`]. The shipped
//! [`RecordingExecutor`] only records what it was given.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::info;

use crate::errors::PilotResult;

/// Runs a single command line.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, command: &str) -> PilotResult<()>;
}

/// Outcome of executing a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Commands run or previewed, in plan order
    pub executed: Vec<String>,
    pub errors: Vec<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Executor that records commands without invoking them.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    recorded: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far, in order.
    pub fn recorded(&self) -> Vec<String> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run(&self, command: &str) -> PilotResult<()> {
        info!(command = %command, "Recorded command (not executed)");
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.to_string());
        Ok(())
    }
}
