//! Task error types.

use thiserror::Error;

/// Errors raised while building a task's arguments.
#[derive(Debug, Error)]
pub enum ArgsError {
  /// A required annotation was never attached to the handle.
  #[error("missing required annotation '{kind}'")]
  MissingAnnotation { kind: &'static str },

  /// An argument template could not be rendered.
  #[error("invalid argument template '{template}': {message}")]
  Template { template: String, message: String },
}

/// Errors reported by a [`ProcessLauncher`](crate::ProcessLauncher).
#[derive(Debug, Error)]
pub enum LaunchError {
  /// The operating system refused to spawn the program.
  #[error("failed to spawn '{program}': {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The launcher declined the request.
  #[error("launch rejected: {message}")]
  Rejected { message: String },

  /// `stop` was called for a task the launcher does not know about.
  #[error("task '{task_id}' is not running")]
  NotRunning { task_id: String },
}

impl LaunchError {
  pub fn rejected(message: impl Into<String>) -> Self {
    Self::Rejected {
      message: message.into(),
    }
  }
}

/// Errors that can occur while driving a task handle.
#[derive(Debug, Error)]
pub enum TaskError {
  /// Handles are single use; the task already left `NotStarted`.
  #[error("task '{task}' was already started (state: {state})")]
  AlreadyStarted { task: String, state: String },

  /// Argument construction failed before launch.
  #[error("could not build arguments for task '{task}': {source}")]
  Arguments {
    task: String,
    #[source]
    source: ArgsError,
  },

  /// The launcher could not start the process.
  #[error("could not start task '{task}': {source}")]
  Launch {
    task: String,
    #[source]
    source: LaunchError,
  },

  /// The wait for a terminal state was cancelled.
  #[error("wait for task '{task}' was cancelled")]
  WaitCancelled { task: String },

  /// The state channel closed before a terminal state was observed.
  #[error("lost track of task '{task}'")]
  StateLost { task: String },
}
