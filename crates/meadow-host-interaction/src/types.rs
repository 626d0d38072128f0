/// Outcome of a prompt the human answered or dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse<T> {
  /// The human dismissed the prompt.
  Cancelled,
  /// The human answered.
  Completed(T),
}

impl<T> PromptResponse<T> {
  pub fn is_cancelled(&self) -> bool {
    matches!(self, PromptResponse::Cancelled)
  }

  pub fn into_value(self) -> Option<T> {
    match self {
      PromptResponse::Cancelled => None,
      PromptResponse::Completed(value) => Some(value),
    }
  }
}

/// Visual intent of a prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageIntent {
  #[default]
  None,
  Information,
  Confirmation,
  Warning,
  Error,
}

/// Button labels and intent for a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptOptions {
  /// Label of the primary action. `None` hides it.
  pub primary_button: Option<String>,
  /// Label of the dismiss action (defaults to "Cancel").
  pub secondary_button: Option<String>,
  pub intent: MessageIntent,
}

impl PromptOptions {
  /// Options for a confirmation with the given primary action.
  pub fn confirm(primary: impl Into<String>) -> Self {
    Self {
      primary_button: Some(primary.into()),
      secondary_button: Some("Cancel".to_string()),
      intent: MessageIntent::Confirmation,
    }
  }

  /// Options whose only affordance is dismissing the prompt.
  pub fn cancel_only() -> Self {
    Self {
      primary_button: None,
      secondary_button: Some("Cancel".to_string()),
      intent: MessageIntent::Information,
    }
  }

  pub fn secondary_label(&self) -> &str {
    self.secondary_button.as_deref().unwrap_or("Cancel")
  }
}

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
  pub value: String,
  pub label: String,
}

impl Choice {
  pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
    Self {
      value: value.into(),
      label: label.into(),
    }
  }
}

/// Kind of value an input field accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
  Text { placeholder: Option<String> },
  Choice { options: Vec<Choice> },
}

/// A field of an input prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
  pub label: String,
  pub kind: InputKind,
  pub required: bool,
}

impl InputField {
  pub fn text(label: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      kind: InputKind::Text { placeholder: None },
      required: false,
    }
  }

  pub fn choice(label: impl Into<String>, options: Vec<Choice>) -> Self {
    Self {
      label: label.into(),
      kind: InputKind::Choice { options },
      required: false,
    }
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }

  pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
    if let InputKind::Text { placeholder: p } = &mut self.kind {
      *p = Some(placeholder.into());
    }
    self
  }
}

/// Values entered for an input prompt, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputValues {
  values: Vec<(String, String)>,
}

impl InputValues {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
    self.values.push((label.into(), value.into()));
  }

  /// Value entered for the field with `label`.
  pub fn get(&self, label: &str) -> Option<&str> {
    self
      .values
      .iter()
      .find(|(l, _)| l == label)
      .map(|(_, v)| v.as_str())
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

impl<L: Into<String>, V: Into<String>> FromIterator<(L, V)> for InputValues {
  fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
    let mut values = Self::new();
    for (label, value) in iter {
      values.push(label, value);
    }
    values
  }
}
