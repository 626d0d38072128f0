//! Line-oriented terminal interaction.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::types::{InputField, InputKind, InputValues, PromptOptions, PromptResponse};
use crate::{Interaction, InteractionError};

/// Prompts on a text terminal: questions go to the writer, answers are read
/// line by line from the reader.
///
/// When the reader reaches end of input, confirmations and input forms count
/// as dismissed. Message boxes instead stay open until their token fires, so
/// a non-interactive run is never cancelled by a closed stdin.
pub struct ConsoleInteraction<R, W> {
  input: Mutex<Lines<BufReader<R>>>,
  output: Mutex<W>,
}

impl ConsoleInteraction<tokio::io::Stdin, tokio::io::Stderr> {
  /// Interaction over the process's stdin and stderr.
  pub fn stdio() -> Self {
    Self::new(tokio::io::stdin(), tokio::io::stderr())
  }
}

impl<R, W> ConsoleInteraction<R, W>
where
  R: AsyncRead + Unpin + Send,
  W: AsyncWrite + Unpin + Send,
{
  pub fn new(reader: R, writer: W) -> Self {
    Self {
      input: Mutex::new(BufReader::new(reader).lines()),
      output: Mutex::new(writer),
    }
  }

  /// Give back the writer, e.g. to inspect what was shown.
  pub fn into_writer(self) -> W {
    self.output.into_inner()
  }

  async fn write(&self, text: &str) -> Result<(), InteractionError> {
    let mut output = self.output.lock().await;
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
  }

  /// Read one line. `Ok(None)` means end of input.
  async fn read_line(&self, cancel: &CancellationToken) -> Result<Option<String>, InteractionError> {
    tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(InteractionError::Cancelled),
      line = async {
        let mut input = self.input.lock().await;
        input.next_line().await
      } => Ok(line?),
    }
  }

  async fn header(&self, title: &str, message: &str) -> Result<(), InteractionError> {
    self.write(&format!("\n== {} ==\n{}\n", title, message)).await
  }

  async fn read_field(
    &self,
    field: &InputField,
    cancel: &CancellationToken,
  ) -> Result<Option<String>, InteractionError> {
    if let InputKind::Choice { options } = &field.kind {
      if options.is_empty() {
        return Err(InteractionError::InvalidPrompt {
          message: format!("choice field '{}' has no options", field.label),
        });
      }
    }

    loop {
      match &field.kind {
        InputKind::Text { placeholder } => {
          let hint = placeholder
            .as_deref()
            .map(|p| format!(" ({})", p))
            .unwrap_or_default();
          self.write(&format!("{}{}: ", field.label, hint)).await?;
        }
        InputKind::Choice { options } => {
          let mut listing = format!("{}:\n", field.label);
          for (i, option) in options.iter().enumerate() {
            listing.push_str(&format!("  {}) {}\n", i + 1, option.label));
          }
          listing.push_str("> ");
          self.write(&listing).await?;
        }
      }

      let Some(line) = self.read_line(cancel).await? else {
        return Ok(None);
      };
      let answer = line.trim();

      if answer.is_empty() {
        if field.required {
          self.write("A value is required.\n").await?;
          continue;
        }
        return Ok(Some(String::new()));
      }

      match &field.kind {
        InputKind::Text { .. } => return Ok(Some(answer.to_string())),
        InputKind::Choice { options } => {
          let picked = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i))
            .or_else(|| options.iter().find(|o| o.value == answer));
          match picked {
            Some(option) => return Ok(Some(option.value.clone())),
            None => self.write("Not a valid choice.\n").await?,
          }
        }
      }
    }
  }
}

#[async_trait]
impl<R, W> Interaction for ConsoleInteraction<R, W>
where
  R: AsyncRead + Unpin + Send,
  W: AsyncWrite + Unpin + Send,
{
  async fn prompt_confirmation(
    &self,
    title: &str,
    message: &str,
    options: PromptOptions,
    cancel: CancellationToken,
  ) -> Result<PromptResponse<bool>, InteractionError> {
    self.header(title, message).await?;
    let primary = options.primary_button.as_deref().unwrap_or("OK");
    self
      .write(&format!(
        "{} [y] / {} [n]: ",
        primary,
        options.secondary_label()
      ))
      .await?;

    let answer = self.read_line(&cancel).await?;
    let confirmed = answer
      .map(|a| {
        let a = a.trim().to_lowercase();
        a == "y" || a == "yes" || a == primary.to_lowercase()
      })
      .unwrap_or(false);

    debug!(title, confirmed, "confirmation answered");
    if confirmed {
      Ok(PromptResponse::Completed(true))
    } else {
      Ok(PromptResponse::Cancelled)
    }
  }

  async fn prompt_inputs(
    &self,
    title: &str,
    message: &str,
    fields: &[InputField],
    _options: PromptOptions,
    cancel: CancellationToken,
  ) -> Result<PromptResponse<InputValues>, InteractionError> {
    self.header(title, message).await?;

    let mut values = InputValues::new();
    for field in fields {
      match self.read_field(field, &cancel).await? {
        Some(value) => values.push(field.label.clone(), value),
        None => return Ok(PromptResponse::Cancelled),
      }
    }

    Ok(PromptResponse::Completed(values))
  }

  async fn prompt_message_box(
    &self,
    title: &str,
    message: &str,
    options: PromptOptions,
    cancel: CancellationToken,
  ) -> Result<PromptResponse<bool>, InteractionError> {
    self.header(title, message).await?;
    let hint = match options.primary_button.as_deref() {
      Some(primary) => format!(
        "Type 'ok' to {}, or press Enter to {}.\n",
        primary,
        options.secondary_label()
      ),
      None => format!("Press Enter to {}.\n", options.secondary_label()),
    };
    self.write(&hint).await?;

    match self.read_line(&cancel).await? {
      Some(line) => {
        let accepted =
          options.primary_button.is_some() && line.trim().eq_ignore_ascii_case("ok");
        if accepted {
          Ok(PromptResponse::Completed(true))
        } else {
          Ok(PromptResponse::Cancelled)
        }
      }
      None => {
        cancel.cancelled().await;
        Err(InteractionError::Cancelled)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;
  use crate::types::Choice;

  fn console(input: &'static str) -> ConsoleInteraction<&'static [u8], Vec<u8>> {
    ConsoleInteraction::new(input.as_bytes(), Vec::new())
  }

  #[tokio::test]
  async fn test_confirmation_yes_and_no() {
    let yes = console("y\n");
    let response = yes
      .prompt_confirmation(
        "Install",
        "Install now?",
        PromptOptions::confirm("Install"),
        CancellationToken::new(),
      )
      .await
      .unwrap();
    assert_eq!(response, PromptResponse::Completed(true));

    let no = console("n\n");
    let response = no
      .prompt_confirmation(
        "Install",
        "Install now?",
        PromptOptions::confirm("Install"),
        CancellationToken::new(),
      )
      .await
      .unwrap();
    assert_eq!(response, PromptResponse::Cancelled);
  }

  #[tokio::test]
  async fn test_confirmation_at_end_of_input_is_declined() {
    let console = console("");
    let response = console
      .prompt_confirmation(
        "Login",
        "Log in?",
        PromptOptions::confirm("Login"),
        CancellationToken::new(),
      )
      .await
      .unwrap();
    assert!(response.is_cancelled());
  }

  #[tokio::test]
  async fn test_inputs_choice_by_number_and_text() {
    let console = console("7\n2\n\ndemo\n");
    let fields = vec![
      InputField::choice(
        "Collection",
        vec![Choice::new("4f2a", "North Lab"), Choice::new("9c10", "South Lab")],
      )
      .required(),
      InputField::text("Package name").required(),
    ];

    let response = console
      .prompt_inputs(
        "Deploy",
        "Choose a target",
        &fields,
        PromptOptions::default(),
        CancellationToken::new(),
      )
      .await
      .unwrap();

    let values = response.into_value().unwrap();
    assert_eq!(values.get("Collection"), Some("9c10"));
    assert_eq!(values.get("Package name"), Some("demo"));

    let shown = String::from_utf8(console.into_writer()).unwrap();
    assert!(shown.contains("1) North Lab"));
    assert!(shown.contains("Not a valid choice."));
    assert!(shown.contains("A value is required."));
  }

  #[tokio::test]
  async fn test_inputs_reject_empty_choice() {
    let console = console("x\n");
    let fields = vec![InputField::choice("Collection", vec![])];
    let err = console
      .prompt_inputs(
        "Deploy",
        "Choose",
        &fields,
        PromptOptions::default(),
        CancellationToken::new(),
      )
      .await
      .unwrap_err();
    assert!(matches!(err, InteractionError::InvalidPrompt { .. }));
  }

  #[tokio::test]
  async fn test_message_box_enter_dismisses() {
    let console = console("\n");
    let response = console
      .prompt_message_box(
        "Building",
        "Building package...",
        PromptOptions::cancel_only(),
        CancellationToken::new(),
      )
      .await
      .unwrap();
    assert_eq!(response, PromptResponse::Cancelled);
  }

  #[tokio::test]
  async fn test_message_box_without_primary_never_completes() {
    let console = console("ok\n");
    let response = console
      .prompt_message_box(
        "Building",
        "Building package...",
        PromptOptions::cancel_only(),
        CancellationToken::new(),
      )
      .await
      .unwrap();
    assert!(response.is_cancelled());
  }

  #[tokio::test]
  async fn test_message_box_waits_for_token_at_end_of_input() {
    let console = console("");
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
      tokio::time::sleep(Duration::from_millis(10)).await;
      trigger.cancel();
    });

    let err = console
      .prompt_message_box("Building", "...", PromptOptions::cancel_only(), cancel)
      .await
      .unwrap_err();
    assert!(matches!(err, InteractionError::Cancelled));
  }

  #[tokio::test]
  async fn test_token_cancels_pending_read() {
    let (reader, _keep_open) = tokio::io::duplex(64);
    let console = ConsoleInteraction::new(reader, Vec::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = console
      .prompt_confirmation("Install", "?", PromptOptions::confirm("Install"), cancel)
      .await
      .unwrap_err();
    assert!(matches!(err, InteractionError::Cancelled));
  }
}
