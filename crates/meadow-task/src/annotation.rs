//! Typed, late-bound task parameters.

use std::any::{Any, TypeId};
use std::fmt;

use crate::error::ArgsError;

/// A typed payload that can be attached to a task handle.
///
/// `KIND` names the annotation in error messages and logs.
pub trait Annotation: Any + Send + Sync + fmt::Debug {
  const KIND: &'static str;
}

struct Entry {
  type_id: TypeId,
  kind: &'static str,
  value: Box<dyn Any + Send + Sync>,
}

/// Append-only annotation store for one task handle.
///
/// Several values of the same kind may be attached; reads return the most
/// recent one. Values are never removed, only superseded.
#[derive(Default)]
pub struct Annotations {
  entries: Vec<Entry>,
}

impl Annotations {
  pub fn new() -> Self {
    Self::default()
  }

  /// Attach a value. It supersedes earlier values of the same kind.
  pub fn attach<A: Annotation>(&mut self, value: A) {
    self.entries.push(Entry {
      type_id: TypeId::of::<A>(),
      kind: A::KIND,
      value: Box::new(value),
    });
  }

  /// The most recently attached value of kind `A`.
  pub fn latest<A: Annotation>(&self) -> Option<&A> {
    self
      .entries
      .iter()
      .rev()
      .find(|e| e.type_id == TypeId::of::<A>())
      .and_then(|e| e.value.downcast_ref::<A>())
  }

  /// Like [`latest`](Self::latest), but a missing value is an error.
  pub fn require<A: Annotation>(&self) -> Result<&A, ArgsError> {
    self
      .latest::<A>()
      .ok_or(ArgsError::MissingAnnotation { kind: A::KIND })
  }

  /// Number of values of kind `A` ever attached.
  pub fn count<A: Annotation>(&self) -> usize {
    self
      .entries
      .iter()
      .filter(|e| e.type_id == TypeId::of::<A>())
      .count()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl fmt::Debug for Annotations {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list()
      .entries(self.entries.iter().map(|e| e.kind))
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, PartialEq)]
  struct Name(&'static str);

  impl Annotation for Name {
    const KIND: &'static str = "name";
  }

  #[derive(Debug, PartialEq)]
  struct Target(u32);

  impl Annotation for Target {
    const KIND: &'static str = "target";
  }

  #[test]
  fn test_latest_value_wins() {
    let mut annotations = Annotations::new();
    annotations.attach(Name("first"));
    annotations.attach(Target(7));
    annotations.attach(Name("second"));

    assert_eq!(annotations.latest::<Name>(), Some(&Name("second")));
    assert_eq!(annotations.latest::<Target>(), Some(&Target(7)));
    assert_eq!(annotations.count::<Name>(), 2);
    assert_eq!(annotations.len(), 3);
  }

  #[test]
  fn test_require_names_missing_kind() {
    let mut annotations = Annotations::new();
    annotations.attach(Name("only"));

    let err = annotations.require::<Target>().unwrap_err();
    assert!(matches!(err, ArgsError::MissingAnnotation { kind: "target" }));
    assert_eq!(err.to_string(), "missing required annotation 'target'");
  }

  #[test]
  fn test_debug_lists_kinds() {
    let mut annotations = Annotations::new();
    annotations.attach(Name("x"));
    annotations.attach(Target(1));
    assert_eq!(format!("{:?}", annotations), r#"["name", "target"]"#);
  }
}
