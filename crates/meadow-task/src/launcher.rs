//! Process launcher capability.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::LaunchError;
use crate::state::TaskState;

/// Everything a launcher needs to start one task.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
  /// Unique id of the handle being started (also its log key).
  pub task_id: String,
  /// Human-readable task name.
  pub task_name: String,
  pub program: String,
  pub args: Vec<String>,
  pub working_dir: PathBuf,
}

/// Launches external processes on behalf of task handles.
///
/// `launch` returns once the process has been started. The exit code is
/// reported later through `reporter`, from whatever task supervises the
/// process.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
  async fn launch(&self, request: LaunchRequest, reporter: ExitReporter)
  -> Result<(), LaunchError>;

  /// Ask a launched process to terminate.
  ///
  /// The task still reports its exit through its reporter.
  async fn stop(&self, task_id: &str) -> Result<(), LaunchError>;
}

/// Single-use channel for reporting a task's exit code.
///
/// Reports arriving after the task already reached a terminal state are
/// ignored. Dropping the reporter without reporting marks the task failed so
/// that waiters are never left hanging.
pub struct ExitReporter {
  task: String,
  state: Option<Arc<watch::Sender<TaskState>>>,
}

impl ExitReporter {
  pub(crate) fn new(task: String, state: Arc<watch::Sender<TaskState>>) -> Self {
    Self {
      task,
      state: Some(state),
    }
  }

  /// Report that the process exited with `exit_code`.
  pub fn finished(mut self, exit_code: i32) {
    let Some(state) = self.state.take() else {
      return;
    };

    let applied = state.send_if_modified(|s| {
      if s.is_terminal() {
        false
      } else {
        *s = TaskState::Finished { exit_code };
        true
      }
    });

    if applied {
      info!(task = %self.task, exit_code, "task_finished");
    } else {
      warn!(task = %self.task, exit_code, "exit reported after terminal state, ignored");
    }
  }

  /// Name of the task this reporter belongs to.
  pub fn task(&self) -> &str {
    &self.task
  }
}

impl Drop for ExitReporter {
  fn drop(&mut self) {
    let Some(state) = self.state.take() else {
      return;
    };

    let applied = state.send_if_modified(|s| {
      if s.is_terminal() {
        false
      } else {
        *s = TaskState::Failed {
          reason: "exit status was never reported".to_string(),
        };
        true
      }
    });

    if applied {
      warn!(task = %self.task, "exit reporter dropped without a report");
    }
  }
}
