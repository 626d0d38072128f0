//! Meadow Extract
//!
//! Best-effort scraping of structured values out of tool output.
//!
//! The Meadow CLI has no machine-readable output for the commands the
//! deployment workflow relies on, so values are pulled out of its text
//! output with small pattern rules. The rules live in their own crate so they
//! can be revised independently of the workflow when the CLI's output
//! changes.
//!
//! Rules are "extract if present": a rule that saw nothing returns `None`
//! and the caller decides whether that is an error.

mod rules;

pub use rules::{DelimitedPairs, IdNamePairs, IdToken, LabeledValue};

use futures::StreamExt;
use meadow_host_log::LineStream;
use tracing::debug;

/// A pattern applied line by line to harvest a value.
pub trait ExtractionRule {
  type Value;

  /// Feed one line of output.
  fn observe(&mut self, line: &str);

  /// The extracted value, if any line matched.
  fn finish(self) -> Option<Self::Value>;
}

/// Apply `rule` to every line of `lines` until the stream ends.
pub async fn extract<R: ExtractionRule>(mut rule: R, mut lines: LineStream) -> Option<R::Value> {
  let mut seen = 0usize;
  while let Some(line) = lines.next().await {
    rule.observe(&line.content);
    seen += 1;
  }
  debug!(lines = seen, "extraction finished");
  rule.finish()
}

/// Apply `rule` to an in-memory sequence of lines.
pub fn extract_lines<R, I, S>(mut rule: R, lines: I) -> Option<R::Value>
where
  R: ExtractionRule,
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  for line in lines {
    rule.observe(line.as_ref());
  }
  rule.finish()
}

#[cfg(test)]
mod tests {
  use meadow_host_log::{InMemoryLogStore, LogSource};

  use super::*;

  #[tokio::test]
  async fn test_extract_from_closed_log() {
    let store = InMemoryLogStore::new();
    let writer = store.writer("upload");
    writer.append("Uploading package...");
    writer.append("Package Id: abc-123");
    writer.close();

    let value = extract(LabeledValue::new("Package Id:"), store.lines("upload")).await;
    assert_eq!(value.as_deref(), Some("abc-123"));
  }

  #[tokio::test]
  async fn test_extract_missing_value() {
    let store = InMemoryLogStore::new();
    store.writer("upload").append("Upload failed");

    let value = extract(LabeledValue::new("Package Id:"), store.lines("upload")).await;
    assert!(value.is_none());
  }
}
