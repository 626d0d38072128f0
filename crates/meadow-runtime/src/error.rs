//! Runtime error types.

use meadow_host_interaction::InteractionError;

/// Failures of an interactive wait that are not a [`RunOutcome`](crate::RunOutcome).
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
  /// The cancel-only prompt resolved with something other than "cancel".
  #[error("prompt for task '{task}' resolved without being cancelled")]
  UnexpectedPromptResponse { task: String },

  /// The interaction capability failed.
  #[error("interaction failed while waiting for task '{task}': {source}")]
  Interaction {
    task: String,
    #[source]
    source: InteractionError,
  },
}
