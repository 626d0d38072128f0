use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Per-step timeouts in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
  pub check_tool_secs: u64,
  pub install_tool_secs: u64,
  pub check_login_secs: u64,
  pub login_secs: u64,
  pub list_collections_secs: u64,
  pub build_secs: u64,
  pub upload_secs: u64,
  pub publish_secs: u64,
  /// Uninstall and logout.
  pub maintenance_secs: u64,
}

impl Default for Timeouts {
  fn default() -> Self {
    Self {
      check_tool_secs: 60,
      install_tool_secs: 60,
      check_login_secs: 60,
      login_secs: 5 * 60,
      list_collections_secs: 60,
      build_secs: 10 * 60,
      upload_secs: 10 * 60,
      publish_secs: 10 * 60,
      maintenance_secs: 60,
    }
  }
}

impl Timeouts {
  pub fn check_tool(&self) -> Duration {
    Duration::from_secs(self.check_tool_secs)
  }

  pub fn install_tool(&self) -> Duration {
    Duration::from_secs(self.install_tool_secs)
  }

  pub fn check_login(&self) -> Duration {
    Duration::from_secs(self.check_login_secs)
  }

  pub fn login(&self) -> Duration {
    Duration::from_secs(self.login_secs)
  }

  pub fn list_collections(&self) -> Duration {
    Duration::from_secs(self.list_collections_secs)
  }

  pub fn build(&self) -> Duration {
    Duration::from_secs(self.build_secs)
  }

  pub fn upload(&self) -> Duration {
    Duration::from_secs(self.upload_secs)
  }

  pub fn publish(&self) -> Duration {
    Duration::from_secs(self.publish_secs)
  }

  pub fn maintenance(&self) -> Duration {
    Duration::from_secs(self.maintenance_secs)
  }

  pub(crate) fn validate(&self) -> Result<(), ConfigError> {
    let all = [
      ("check_tool_secs", self.check_tool_secs),
      ("install_tool_secs", self.install_tool_secs),
      ("check_login_secs", self.check_login_secs),
      ("login_secs", self.login_secs),
      ("list_collections_secs", self.list_collections_secs),
      ("build_secs", self.build_secs),
      ("upload_secs", self.upload_secs),
      ("publish_secs", self.publish_secs),
      ("maintenance_secs", self.maintenance_secs),
    ];
    match all.iter().find(|(_, secs)| *secs == 0) {
      Some((name, _)) => Err(ConfigError::invalid(
        format!("timeouts.{}", name),
        "timeout must be at least one second",
      )),
      None => Ok(()),
    }
  }
}

/// Build outputs removed before packaging, relative to the working directory.
///
/// Missing entries are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaleArtifacts {
  pub directories: Vec<String>,
  pub files: Vec<String>,
}

impl Default for StaleArtifacts {
  fn default() -> Self {
    Self {
      directories: vec!["bin".to_string(), "obj".to_string(), "mpak".to_string()],
      files: Vec::new(),
    }
  }
}

/// How values are scraped from tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Extraction {
  /// Separates the collection id from its name in the listing output.
  pub collection_separator: String,
  /// Zero-based token of the text before the separator holding the id.
  /// `None` takes the last token.
  pub collection_id_token: Option<usize>,
  /// Label preceding the package id in the upload output.
  pub package_id_label: String,
}

impl Default for Extraction {
  fn default() -> Self {
    Self {
      collection_separator: "|".to_string(),
      collection_id_token: None,
      package_id_label: "Package Id:".to_string(),
    }
  }
}

impl Extraction {
  pub(crate) fn validate(&self) -> Result<(), ConfigError> {
    if self.collection_separator.is_empty() {
      return Err(ConfigError::invalid(
        "extraction.collection_separator",
        "separator must not be empty",
      ));
    }
    if self.package_id_label.trim().is_empty() {
      return Err(ConfigError::invalid(
        "extraction.package_id_label",
        "label must not be empty",
      ));
    }
    Ok(())
  }
}
