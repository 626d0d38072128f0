use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Step;

/// Single-task commands offered next to the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceCommand {
  /// Remove the locally installed Meadow CLI.
  UninstallTool,
  /// Sign out of Meadow Cloud.
  Logout,
}

impl MaintenanceCommand {
  pub fn step(&self) -> Step {
    match self {
      MaintenanceCommand::UninstallTool => Step::UninstallTool,
      MaintenanceCommand::Logout => Step::Logout,
    }
  }
}

impl fmt::Display for MaintenanceCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.step(), f)
  }
}
