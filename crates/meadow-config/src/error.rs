use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a [`DeployConfig`](crate::DeployConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file '{}': {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file '{}': {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid config value '{field}': {message}")]
  Invalid { field: String, message: String },
}

impl ConfigError {
  pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Invalid {
      field: field.into(),
      message: message.into(),
    }
  }
}
