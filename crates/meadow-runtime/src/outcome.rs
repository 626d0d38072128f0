use std::fmt;

/// How one interactive wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
  /// The task could not be launched.
  StartFailed { reason: String },
  /// The task exited. Zero means success by convention.
  Finished { exit_code: i32 },
  /// The timeout elapsed first.
  TimedOut,
  /// The human dismissed the prompt.
  CancelledByUser,
  /// The caller's cancellation token fired.
  CancelledByCaller,
}

impl RunOutcome {
  /// Whether the task finished with exit code zero.
  pub fn is_success(&self) -> bool {
    matches!(self, RunOutcome::Finished { exit_code: 0 })
  }
}

impl fmt::Display for RunOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RunOutcome::StartFailed { reason } => write!(f, "start failed: {}", reason),
      RunOutcome::Finished { exit_code } => write!(f, "finished with exit code {}", exit_code),
      RunOutcome::TimedOut => write!(f, "timed out"),
      RunOutcome::CancelledByUser => write!(f, "cancelled by user"),
      RunOutcome::CancelledByCaller => write!(f, "cancelled by caller"),
    }
  }
}
