//! Workflow error types.
//!
//! The `Display` of every variant is the message shown to the user.

use std::path::PathBuf;
use std::time::Duration;

use meadow_host_interaction::InteractionError;
use meadow_runtime::WaitError;
use meadow_task::TaskError;
use thiserror::Error;

use crate::Step;

#[derive(Debug, Error)]
pub enum WorkflowError {
  /// The step's tool could not be launched.
  #[error("{step} could not be started: {reason}")]
  StartFailed { step: Step, reason: String },

  /// The step's tool ran and exited non-zero.
  #[error("{} (exit code {exit_code})", step.failure_message())]
  ToolReportedFailure { step: Step, exit_code: i32 },

  #[error("{step} timed out after {} seconds", timeout.as_secs())]
  TimedOut { step: Step, timeout: Duration },

  /// The user declined or dismissed a prompt.
  #[error("{}", step.user_cancelled_message())]
  CancelledByUser { step: Step },

  /// The caller's cancellation token fired.
  #[error("The operation was cancelled during '{step}'.")]
  CancelledByCaller { step: Step },

  /// An expected value was not found in the tool output.
  #[error("{step} finished but its output did not contain {what}")]
  ExtractionMissing { step: Step, what: &'static str },

  /// The user supplied a value the workflow cannot use.
  #[error("{step}: {message}")]
  InvalidInput { step: Step, message: String },

  /// A stale artifact exists but could not be removed.
  #[error("failed to remove stale build output '{}': {source}", path.display())]
  Cleanup {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("{step}: {source}")]
  Interaction {
    step: Step,
    #[source]
    source: InteractionError,
  },

  #[error("{step}: {source}")]
  Wait {
    step: Step,
    #[source]
    source: WaitError,
  },

  #[error("{step}: {source}")]
  Task {
    step: Step,
    #[source]
    source: TaskError,
  },
}

impl WorkflowError {
  /// The step the error belongs to.
  pub fn step(&self) -> Step {
    match self {
      WorkflowError::StartFailed { step, .. }
      | WorkflowError::ToolReportedFailure { step, .. }
      | WorkflowError::TimedOut { step, .. }
      | WorkflowError::CancelledByUser { step }
      | WorkflowError::CancelledByCaller { step }
      | WorkflowError::ExtractionMissing { step, .. }
      | WorkflowError::InvalidInput { step, .. }
      | WorkflowError::Interaction { step, .. }
      | WorkflowError::Wait { step, .. }
      | WorkflowError::Task { step, .. } => *step,
      WorkflowError::Cleanup { .. } => Step::ResetBuild,
    }
  }

  /// Whether the run ended because someone asked it to.
  pub fn is_cancellation(&self) -> bool {
    matches!(
      self,
      WorkflowError::CancelledByUser { .. } | WorkflowError::CancelledByCaller { .. }
    )
  }
}
