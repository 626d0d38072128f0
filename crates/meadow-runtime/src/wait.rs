use std::time::Duration;

use meadow_host_interaction::{Interaction, InteractionError, PromptOptions, PromptResponse};
use meadow_task::{ProcessLauncher, TaskError, TaskHandle, TerminalState};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::{RunOutcome, WaitError};

/// Title and body of the cancel-only prompt shown while a task runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPrompt {
  pub title: String,
  pub message: String,
}

impl WaitPrompt {
  pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      message: message.into(),
    }
  }
}

/// Which branch of the race resolved first.
enum First {
  Caller,
  Deadline,
  Task(Result<TerminalState, TaskError>),
  Prompt(Result<PromptResponse<bool>, InteractionError>),
}

/// Starts a task and waits for it while a human may cancel.
pub struct InteractiveWait<'a> {
  launcher: &'a dyn ProcessLauncher,
  interaction: &'a dyn Interaction,
}

impl<'a> InteractiveWait<'a> {
  pub fn new(launcher: &'a dyn ProcessLauncher, interaction: &'a dyn Interaction) -> Self {
    Self {
      launcher,
      interaction,
    }
  }

  /// Run `task` to one [`RunOutcome`].
  ///
  /// The prompt and the task wait share one signal that fires on caller
  /// cancellation or when `timeout` elapses. Whichever branch resolves first
  /// decides the outcome; the other is cancelled and awaited before this
  /// returns. Ties are broken in the order caller, deadline, task, prompt.
  ///
  /// Any outcome other than `Finished` asks the launcher to stop the process.
  #[instrument(
    name = "interactive_wait",
    skip(self, task, prompt, cancel),
    fields(
      task_id = %task.id(),
      task = %task.name(),
      timeout_ms = timeout.as_millis() as u64,
    )
  )]
  pub async fn run(
    &self,
    task: &TaskHandle,
    prompt: &WaitPrompt,
    timeout: Duration,
    cancel: &CancellationToken,
  ) -> Result<RunOutcome, WaitError> {
    if let Err(e) = task.start(self.launcher).await {
      warn!(error = %e, "task could not be started");
      return Ok(RunOutcome::StartFailed {
        reason: start_failure_reason(e),
      });
    }

    let bounded = cancel.child_token();
    let prompt_cancel = bounded.child_token();
    let task_cancel = bounded.child_token();

    let prompt_fut = self.interaction.prompt_message_box(
      &prompt.title,
      &prompt.message,
      PromptOptions::cancel_only(),
      prompt_cancel.clone(),
    );
    let task_fut = task.wait_terminal(&task_cancel);
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(prompt_fut, task_fut, deadline);

    let first = tokio::select! {
      biased;
      _ = cancel.cancelled() => First::Caller,
      _ = &mut deadline => First::Deadline,
      terminal = &mut task_fut => First::Task(terminal),
      response = &mut prompt_fut => First::Prompt(response),
    };

    let result = match first {
      First::Caller | First::Deadline => {
        bounded.cancel();
        let _ = prompt_fut.await;
        let _ = task_fut.await;
        if cancel.is_cancelled() {
          Ok(RunOutcome::CancelledByCaller)
        } else {
          Ok(RunOutcome::TimedOut)
        }
      }
      First::Task(terminal) => {
        prompt_cancel.cancel();
        let _ = prompt_fut.await;
        match terminal {
          Ok(TerminalState::Finished { exit_code }) => Ok(RunOutcome::Finished { exit_code }),
          Ok(TerminalState::Failed { reason }) => Ok(RunOutcome::StartFailed { reason }),
          Err(_) if cancel.is_cancelled() => Ok(RunOutcome::CancelledByCaller),
          Err(e) => Ok(RunOutcome::StartFailed {
            reason: e.to_string(),
          }),
        }
      }
      First::Prompt(response) => {
        task_cancel.cancel();
        let _ = task_fut.await;
        match response {
          Ok(PromptResponse::Cancelled) => Ok(RunOutcome::CancelledByUser),
          Ok(PromptResponse::Completed(_)) => Err(WaitError::UnexpectedPromptResponse {
            task: task.name().to_string(),
          }),
          Err(InteractionError::Cancelled) if cancel.is_cancelled() => {
            Ok(RunOutcome::CancelledByCaller)
          }
          Err(source) => Err(WaitError::Interaction {
            task: task.name().to_string(),
            source,
          }),
        }
      }
    };

    if !matches!(result, Ok(RunOutcome::Finished { .. })) {
      self.stop(task).await;
    }

    match &result {
      Ok(outcome) => info!(outcome = %outcome, "interactive_wait_finished"),
      Err(e) => warn!(error = %e, "interactive_wait_failed"),
    }
    result
  }

  async fn stop(&self, task: &TaskHandle) {
    if task.state().is_terminal() {
      return;
    }
    if let Err(e) = self.launcher.stop(task.id()).await {
      warn!(error = %e, "failed to stop task process");
    }
  }
}

/// Prefer the launcher's own message over the task-level wrapper.
fn start_failure_reason(error: TaskError) -> String {
  match error {
    TaskError::Launch { source, .. } => source.to_string(),
    TaskError::Arguments { source, .. } => source.to_string(),
    other => other.to_string(),
  }
}
