//! Meadow Host Log
//!
//! Log capability for task execution. Every launched task writes its output
//! lines into a per-task, append-only log. Consumers read a log as a lazy
//! [`LineStream`] that always starts from the first line:
//!
//! - while the task is running the stream waits for further lines,
//! - once the log is closed (the task finished) the stream ends after the
//!   last line.
//!
//! The [`LogSource`] trait is the read side used by output extraction.
//! [`InMemoryLogStore`] implements it and hands out [`LogWriter`]s to
//! process launchers.

mod store;

pub use store::{InMemoryLogStore, LogWriter};

use std::pin::Pin;

use futures::Stream;

/// A single line of task output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
  /// 1-based line number within the task's log.
  pub number: usize,
  /// Line content without the trailing newline.
  pub content: String,
}

/// A boxed stream of log lines.
pub type LineStream = Pin<Box<dyn Stream<Item = LogLine> + Send>>;

/// Read access to task logs.
pub trait LogSource: Send + Sync {
  /// Stream all lines of a task's log, starting from the first line.
  ///
  /// Calling this again always replays from the beginning.
  fn lines(&self, task_id: &str) -> LineStream;
}
