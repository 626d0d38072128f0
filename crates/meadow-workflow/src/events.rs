//! Workflow events and notifiers.
//!
//! Events let a front end follow a run without polling: render progress,
//! keep a history, or forward them elsewhere.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{Step, StepStatus};

/// Events emitted while a workflow or maintenance command runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
  WorkflowStarted { execution_id: String },

  StepStarted { execution_id: String, step: Step },

  /// A step reached a terminal status.
  StepFinished {
    execution_id: String,
    step: Step,
    status: StepStatus,
  },

  WorkflowCompleted { execution_id: String },

  WorkflowFailed { execution_id: String, error: String },
}

/// Receives workflow events.
pub trait WorkflowNotifier: Send + Sync {
  fn notify(&self, event: WorkflowEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl WorkflowNotifier for NoopNotifier {
  fn notify(&self, _event: WorkflowEvent) {}
}

/// Sends events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded so a slow consumer never stalls a step. A run emits a few
  // dozen events at most.
  sender: mpsc::UnboundedSender<WorkflowEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<WorkflowEvent>) -> Self {
    Self { sender }
  }
}

impl WorkflowNotifier for ChannelNotifier {
  fn notify(&self, event: WorkflowEvent) {
    // The receiver may be gone.
    let _ = self.sender.send(event);
  }
}
