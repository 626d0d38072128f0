use std::fmt;

/// Lifecycle state of a task handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
  NotStarted,
  Starting,
  Running,
  Finished { exit_code: i32 },
  Failed { reason: String },
}

impl TaskState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, TaskState::Finished { .. } | TaskState::Failed { .. })
  }

  /// The terminal state, if this is one.
  pub fn terminal(&self) -> Option<TerminalState> {
    match self {
      TaskState::Finished { exit_code } => Some(TerminalState::Finished {
        exit_code: *exit_code,
      }),
      TaskState::Failed { reason } => Some(TerminalState::Failed {
        reason: reason.clone(),
      }),
      _ => None,
    }
  }
}

impl fmt::Display for TaskState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TaskState::NotStarted => write!(f, "not started"),
      TaskState::Starting => write!(f, "starting"),
      TaskState::Running => write!(f, "running"),
      TaskState::Finished { exit_code } => write!(f, "finished (exit code {})", exit_code),
      TaskState::Failed { reason } => write!(f, "failed: {}", reason),
    }
  }
}

/// How a task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalState {
  /// The process exited. Zero means success by convention.
  Finished { exit_code: i32 },
  /// The task never ran to completion (launch failure or lost exit status).
  Failed { reason: String },
}
