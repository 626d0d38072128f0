use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Commands, ConfigError, Extraction, StaleArtifacts, Timeouts};

/// Directory under the home directory holding the user config.
pub const CONFIG_DIR_NAME: &str = ".meadow-deploy";

/// File name of the user config.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Top-level deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
  /// Directory every task runs in and stale artifacts are resolved against.
  pub working_dir: PathBuf,
  pub commands: Commands,
  pub timeouts: Timeouts,
  pub stale_artifacts: StaleArtifacts,
  pub extraction: Extraction,
}

impl Default for DeployConfig {
  fn default() -> Self {
    Self {
      working_dir: PathBuf::from("."),
      commands: Commands::default(),
      timeouts: Timeouts::default(),
      stale_artifacts: StaleArtifacts::default(),
      extraction: Extraction::default(),
    }
  }
}

impl DeployConfig {
  /// Parse and validate a JSON config.
  pub fn from_json(json: &str, path: &Path) -> Result<Self, ConfigError> {
    let config: DeployConfig = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    config.validate()?;
    Ok(config)
  }

  /// Load and validate the config file at `path`.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&json, path)
  }

  /// Pick the config for this invocation.
  ///
  /// An explicit path must exist. Otherwise the user config under `home` is
  /// used when present, and the defaults when not.
  pub fn resolve(explicit: Option<&Path>, home: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = explicit {
      return Self::load(path);
    }

    match home.map(Self::user_config_path) {
      Some(path) if path.is_file() => Self::load(&path),
      _ => Ok(Self::default()),
    }
  }

  /// `<home>/.meadow-deploy/config.json`
  pub fn user_config_path(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.working_dir.as_os_str().is_empty() {
      return Err(ConfigError::invalid("working_dir", "must not be empty"));
    }
    self.commands.validate()?;
    self.timeouts.validate()?;
    self.extraction.validate()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  #[test]
  fn test_empty_object_is_default() {
    let config = DeployConfig::from_json("{}", Path::new("config.json")).unwrap();
    assert_eq!(config, DeployConfig::default());
  }

  #[test]
  fn test_default_timeouts() {
    let timeouts = DeployConfig::default().timeouts;
    assert_eq!(timeouts.check_tool(), Duration::from_secs(60));
    assert_eq!(timeouts.install_tool(), Duration::from_secs(60));
    assert_eq!(timeouts.login(), Duration::from_secs(300));
    assert_eq!(timeouts.build(), Duration::from_secs(600));
    assert_eq!(timeouts.publish(), Duration::from_secs(600));
  }

  #[test]
  fn test_partial_override_keeps_other_defaults() {
    let json = r#"{
      "working_dir": "firmware",
      "timeouts": { "login_secs": 900 },
      "commands": { "logout": { "program": "meadow", "args": ["logout"] } }
    }"#;

    let config = DeployConfig::from_json(json, Path::new("config.json")).unwrap();

    assert_eq!(config.working_dir, PathBuf::from("firmware"));
    assert_eq!(config.timeouts.login_secs, 900);
    assert_eq!(config.timeouts.build_secs, 600);
    assert_eq!(config.commands.logout.program, "meadow");
    assert_eq!(config.commands.login, Commands::default().login);
  }

  #[test]
  fn test_unknown_field_rejected() {
    let err = DeployConfig::from_json(r#"{ "workdir": "." }"#, Path::new("x.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }

  #[test]
  fn test_zero_timeout_rejected() {
    let json = r#"{ "timeouts": { "upload_secs": 0 } }"#;
    let err = DeployConfig::from_json(json, Path::new("config.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "timeouts.upload_secs"));
  }

  #[test]
  fn test_empty_separator_rejected() {
    let json = r#"{ "extraction": { "collection_separator": "" } }"#;
    let err = DeployConfig::from_json(json, Path::new("config.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
  }

  #[test]
  fn test_resolve_explicit_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let err = DeployConfig::resolve(Some(&missing), None).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
  }

  #[test]
  fn test_resolve_user_config() {
    let home = tempfile::tempdir().unwrap();
    let path = DeployConfig::user_config_path(home.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{ "working_dir": "app" }"#).unwrap();

    let config = DeployConfig::resolve(None, Some(home.path())).unwrap();
    assert_eq!(config.working_dir, PathBuf::from("app"));
  }

  #[test]
  fn test_resolve_falls_back_to_defaults() {
    let home = tempfile::tempdir().unwrap();
    let config = DeployConfig::resolve(None, Some(home.path())).unwrap();
    assert_eq!(config, DeployConfig::default());

    assert_eq!(DeployConfig::resolve(None, None).unwrap(), DeployConfig::default());
  }
}
