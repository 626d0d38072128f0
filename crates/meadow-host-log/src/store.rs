use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::watch;
use tracing::trace;

use crate::{LineStream, LogLine, LogSource};

#[derive(Debug, Clone, Copy, Default)]
struct Progress {
  len: usize,
  closed: bool,
}

struct TaskLog {
  lines: RwLock<Vec<String>>,
  progress: watch::Sender<Progress>,
}

impl TaskLog {
  fn new() -> Self {
    let (progress, _) = watch::channel(Progress::default());
    Self {
      lines: RwLock::new(Vec::new()),
      progress,
    }
  }

  fn line(&self, index: usize) -> Option<String> {
    self
      .lines
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(index)
      .cloned()
  }
}

/// In-memory log store keyed by task id.
///
/// Logs are created on first access from either side, so a reader that
/// subscribes before the task starts still sees every line.
#[derive(Default)]
pub struct InMemoryLogStore {
  logs: Mutex<HashMap<String, Arc<TaskLog>>>,
}

impl InMemoryLogStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn log(&self, task_id: &str) -> Arc<TaskLog> {
    let mut logs = self.logs.lock().unwrap_or_else(PoisonError::into_inner);
    logs
      .entry(task_id.to_string())
      .or_insert_with(|| Arc::new(TaskLog::new()))
      .clone()
  }

  /// Get a writer for a task's log.
  pub fn writer(&self, task_id: &str) -> LogWriter {
    LogWriter {
      task_id: task_id.to_string(),
      log: self.log(task_id),
    }
  }

  /// Copy of the lines written so far.
  pub fn snapshot(&self, task_id: &str) -> Vec<String> {
    self
      .log(task_id)
      .lines
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// Whether a task's log has been closed.
  pub fn is_closed(&self, task_id: &str) -> bool {
    self.log(task_id).progress.borrow().closed
  }
}

impl LogSource for InMemoryLogStore {
  fn lines(&self, task_id: &str) -> LineStream {
    let log = self.log(task_id);
    let rx = log.progress.subscribe();

    Box::pin(futures::stream::unfold(
      (log, rx, 0usize),
      |(log, mut rx, next)| async move {
        loop {
          let progress = *rx.borrow_and_update();
          if next < progress.len {
            let content = log.line(next)?;
            let line = LogLine {
              number: next + 1,
              content,
            };
            return Some((line, (log, rx, next + 1)));
          }
          if progress.closed {
            return None;
          }
          if rx.changed().await.is_err() {
            return None;
          }
        }
      },
    ))
  }
}

/// Append handle for one task's log.
///
/// The log is closed when the writer is closed or dropped.
pub struct LogWriter {
  task_id: String,
  log: Arc<TaskLog>,
}

impl LogWriter {
  /// Append a line. Lines written after the log was closed are discarded.
  pub fn append(&self, content: impl Into<String>) {
    if self.log.progress.borrow().closed {
      return;
    }

    let content = content.into();
    trace!(task_id = %self.task_id, line = %content, "log_line");

    let len = {
      let mut lines = self.log.lines.write().unwrap_or_else(PoisonError::into_inner);
      lines.push(content);
      lines.len()
    };
    self.log.progress.send_modify(|p| p.len = len);
  }

  /// Close the log; readers end after the last line.
  pub fn close(self) {
    drop(self);
  }

  pub fn task_id(&self) -> &str {
    &self.task_id
  }
}

impl Drop for LogWriter {
  fn drop(&mut self) {
    self.log.progress.send_modify(|p| p.closed = true);
  }
}
