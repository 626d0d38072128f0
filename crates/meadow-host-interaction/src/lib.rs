//! Meadow Host Interaction
//!
//! Interaction capability used by the deployment workflow to talk to a
//! human: confirmations, input forms and message boxes.
//!
//! Every prompt takes a [`CancellationToken`]. The two ways a prompt can end
//! without an answer are kept apart:
//!
//! - the human dismissed it → `Ok(PromptResponse::Cancelled)`
//! - the token fired → `Err(InteractionError::Cancelled)`

mod console;
mod types;

pub use console::ConsoleInteraction;
pub use types::{
  Choice, InputField, InputKind, InputValues, MessageIntent, PromptOptions, PromptResponse,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while prompting.
#[derive(Debug, Error)]
pub enum InteractionError {
  /// The governing cancellation token fired before the human answered.
  #[error("prompt cancelled")]
  Cancelled,

  /// The prompt definition cannot be shown (e.g. a choice without options).
  #[error("invalid prompt: {message}")]
  InvalidPrompt { message: String },

  /// Reading or writing the interaction channel failed.
  #[error("interaction i/o failed: {0}")]
  Io(#[from] std::io::Error),
}

/// Prompts a human.
#[async_trait]
pub trait Interaction: Send + Sync {
  /// Ask a yes/no question. `Completed(true)` means the primary action.
  async fn prompt_confirmation(
    &self,
    title: &str,
    message: &str,
    options: PromptOptions,
    cancel: CancellationToken,
  ) -> Result<PromptResponse<bool>, InteractionError>;

  /// Ask for one value per field.
  async fn prompt_inputs(
    &self,
    title: &str,
    message: &str,
    fields: &[InputField],
    options: PromptOptions,
    cancel: CancellationToken,
  ) -> Result<PromptResponse<InputValues>, InteractionError>;

  /// Show a message. Without a primary button the only way to resolve it
  /// is to dismiss it, which yields `Cancelled`.
  async fn prompt_message_box(
    &self,
    title: &str,
    message: &str,
    options: PromptOptions,
    cancel: CancellationToken,
  ) -> Result<PromptResponse<bool>, InteractionError>;
}
