use crate::ExtractionRule;

/// Which whitespace-delimited token of the left part is the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdToken {
  /// The token right before the separator.
  Last,
  /// A fixed, zero-based position.
  Index(usize),
}

/// Identifier/display-name pairs in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdNamePairs {
  entries: Vec<(String, String)>,
}

impl IdNamePairs {
  /// Insert or replace; a replaced entry keeps its position.
  fn upsert(&mut self, id: String, name: String) {
    match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
      Some(entry) => entry.1 = name,
      None => self.entries.push((id, name)),
    }
  }

  pub fn get(&self, id: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|(existing, _)| existing == id)
      .map(|(_, name)| name.as_str())
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|(id, name)| (id.as_str(), name.as_str()))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Splits lines containing `separator` into an identifier (a token of the
/// left part) and a display name (the trimmed right part).
///
/// ```text
/// get 4f2a | North Lab   →   ("4f2a", "North Lab")
/// ```
///
/// Later lines with an identifier already seen replace its name.
#[derive(Debug, Clone)]
pub struct DelimitedPairs {
  separator: String,
  id_token: IdToken,
  pairs: IdNamePairs,
}

impl DelimitedPairs {
  pub fn new(separator: impl Into<String>) -> Self {
    Self {
      separator: separator.into(),
      id_token: IdToken::Last,
      pairs: IdNamePairs::default(),
    }
  }

  pub fn with_id_token(mut self, id_token: IdToken) -> Self {
    self.id_token = id_token;
    self
  }
}

impl ExtractionRule for DelimitedPairs {
  type Value = IdNamePairs;

  fn observe(&mut self, line: &str) {
    if self.separator.is_empty() {
      return;
    }
    let Some((left, right)) = line.split_once(self.separator.as_str()) else {
      return;
    };

    let mut tokens = left.split_whitespace();
    let id = match self.id_token {
      IdToken::Last => tokens.last(),
      IdToken::Index(i) => tokens.nth(i),
    };

    if let Some(id) = id {
      self.pairs.upsert(id.to_string(), right.trim().to_string());
    }
  }

  fn finish(self) -> Option<IdNamePairs> {
    if self.pairs.is_empty() {
      None
    } else {
      Some(self.pairs)
    }
  }
}

/// Takes the trimmed text after `label` on lines containing it.
///
/// ```text
/// Package Id: abc-123   →   "abc-123"
/// ```
///
/// The last non-empty occurrence wins.
#[derive(Debug, Clone)]
pub struct LabeledValue {
  label: String,
  value: Option<String>,
}

impl LabeledValue {
  pub fn new(label: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      value: None,
    }
  }
}

impl ExtractionRule for LabeledValue {
  type Value = String;

  fn observe(&mut self, line: &str) {
    if self.label.is_empty() {
      return;
    }
    if let Some((_, rest)) = line.split_once(self.label.as_str()) {
      let rest = rest.trim();
      if !rest.is_empty() {
        self.value = Some(rest.to_string());
      }
    }
  }

  fn finish(self) -> Option<String> {
    self.value
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::extract_lines;

  #[test]
  fn test_pairs_from_listing() {
    let pairs = extract_lines(
      DelimitedPairs::new("|"),
      ["get 4f2a | North Lab", "get 9c10 | South Lab"],
    )
    .unwrap();

    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs.get("4f2a"), Some("North Lab"));
    assert_eq!(pairs.get("9c10"), Some("South Lab"));
  }

  #[test]
  fn test_pairs_skip_unrelated_lines() {
    let pairs = extract_lines(
      DelimitedPairs::new("|"),
      [
        "Retrieving collections...",
        "  1. 4f2a | North Lab",
        "",
        "Done.",
      ],
    )
    .unwrap();
    let collected: Vec<_> = pairs.iter().collect();
    assert_eq!(collected, vec![("4f2a", "North Lab")]);
  }

  #[test]
  fn test_pairs_duplicate_id_last_wins_keeps_order() {
    let pairs = extract_lines(
      DelimitedPairs::new("|"),
      ["a 1 | One", "a 2 | Two", "a 1 | Uno"],
    )
    .unwrap();
    let collected: Vec<_> = pairs.iter().collect();
    assert_eq!(collected, vec![("1", "Uno"), ("2", "Two")]);
  }

  #[test]
  fn test_pairs_fixed_token_position() {
    let pairs = extract_lines(
      DelimitedPairs::new("|").with_id_token(IdToken::Index(2)),
      ["- id 77ab extra | Lab", "too short | Ignored"],
    )
    .unwrap();
    let collected: Vec<_> = pairs.iter().collect();
    assert_eq!(collected, vec![("77ab", "Lab")]);
  }

  #[test]
  fn test_pairs_absent() {
    assert!(extract_lines(DelimitedPairs::new("|"), ["no collections"]).is_none());
    assert!(extract_lines(DelimitedPairs::new("|"), [" | name only"]).is_none());
  }

  #[test]
  fn test_labeled_value() {
    let value = extract_lines(
      LabeledValue::new("Package Id:"),
      ["Uploading...", "Package Id: abc-123", "Done"],
    );
    assert_eq!(value.as_deref(), Some("abc-123"));
  }

  #[test]
  fn test_labeled_value_last_wins() {
    let value = extract_lines(
      LabeledValue::new("Package Id:"),
      ["Package Id: first", "Package Id:   ", "Package Id: second  "],
    );
    assert_eq!(value.as_deref(), Some("second"));
  }

  #[test]
  fn test_labeled_value_absent() {
    assert!(extract_lines(LabeledValue::new("Package Id:"), ["Upload failed"]).is_none());
    assert!(extract_lines(LabeledValue::new("Package Id:"), ["Package Id:"]).is_none());
  }
}
