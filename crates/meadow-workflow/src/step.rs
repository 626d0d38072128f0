use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of the deployment plan or a maintenance command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
  CheckTool,
  InstallTool,
  CheckLogin,
  Login,
  ListCollections,
  ChooseTarget,
  ResetBuild,
  Build,
  Upload,
  Publish,
  UninstallTool,
  Logout,
}

impl Step {
  /// The deployment plan in execution order.
  pub const DEPLOY_PLAN: [Step; 10] = [
    Step::CheckTool,
    Step::InstallTool,
    Step::CheckLogin,
    Step::Login,
    Step::ListCollections,
    Step::ChooseTarget,
    Step::ResetBuild,
    Step::Build,
    Step::Upload,
    Step::Publish,
  ];

  /// Stable identifier used in events and task names.
  pub fn id(&self) -> &'static str {
    match self {
      Step::CheckTool => "meadow-cli-check",
      Step::InstallTool => "meadow-cli-install",
      Step::CheckLogin => "meadow-cli-login-check",
      Step::Login => "meadow-login",
      Step::ListCollections => "meadow-collection-list",
      Step::ChooseTarget => "choose-target",
      Step::ResetBuild => "reset-build",
      Step::Build => "meadow-package-create",
      Step::Upload => "meadow-package-upload",
      Step::Publish => "meadow-package-publish",
      Step::UninstallTool => "meadow-cli-uninstall",
      Step::Logout => "meadow-cli-logout",
    }
  }

  /// Human readable name.
  pub fn title(&self) -> &'static str {
    match self {
      Step::CheckTool => "Check Meadow CLI",
      Step::InstallTool => "Install Meadow CLI",
      Step::CheckLogin => "Check Meadow Cloud login",
      Step::Login => "Login to Meadow Cloud",
      Step::ListCollections => "List collections",
      Step::ChooseTarget => "Choose deployment target",
      Step::ResetBuild => "Reset build",
      Step::Build => "Build package",
      Step::Upload => "Upload package",
      Step::Publish => "Publish package",
      Step::UninstallTool => "Uninstall Meadow CLI",
      Step::Logout => "Logout from Meadow Cloud",
    }
  }

  /// Body of the cancel-only prompt shown while the step's task runs.
  pub fn progress_message(&self) -> &'static str {
    match self {
      Step::CheckTool => "Checking whether the Meadow CLI is installed...",
      Step::InstallTool => "Installing the Meadow CLI...",
      Step::CheckLogin => "Checking the Meadow Cloud login...",
      Step::Login => "Complete the login in your browser.",
      Step::ListCollections => "Retrieving Meadow Cloud collections...",
      Step::ChooseTarget => "Waiting for the deployment target...",
      Step::ResetBuild => "Removing stale build output...",
      Step::Build => "Building the application package...",
      Step::Upload => "Uploading the application package...",
      Step::Publish => "Publishing the package to the collection...",
      Step::UninstallTool => "Uninstalling the Meadow CLI...",
      Step::Logout => "Logging out from Meadow Cloud...",
    }
  }

  /// Message for a tool that exited with a non-zero code.
  pub fn failure_message(&self) -> &'static str {
    match self {
      Step::CheckTool => "Failed to check for the Meadow CLI.",
      Step::InstallTool => {
        "Failed to install the Meadow CLI. Please check the logs for more details."
      }
      Step::CheckLogin => "Failed to check the Meadow Cloud login.",
      Step::Login => "Failed to login to Meadow Cloud. Please check the logs for more details.",
      Step::ListCollections => "Failed to list the Meadow Cloud collections.",
      Step::ChooseTarget => "Failed to choose a deployment target.",
      Step::ResetBuild => "Failed to remove stale build output.",
      Step::Build => "Failed to build the application package.",
      Step::Upload => "Failed to upload the application package.",
      Step::Publish => "Failed to publish the application package.",
      Step::UninstallTool => "Failed to uninstall the Meadow CLI.",
      Step::Logout => "Failed to logout from Meadow Cloud.",
    }
  }

  /// Message for a step the user cancelled.
  pub fn user_cancelled_message(&self) -> &'static str {
    match self {
      Step::InstallTool => "User canceled the installation of the Meadow CLI.",
      Step::Login => "User canceled the login operation.",
      Step::ChooseTarget => "User canceled the deployment.",
      _ => "User canceled the operation.",
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.title())
  }
}

/// Progress of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
  Pending,
  Running,
  Succeeded,
  Skipped,
  Failed,
  CancelledByUser,
  CancelledByCaller,
  TimedOut,
}

impl StepStatus {
  pub fn is_terminal(&self) -> bool {
    !matches!(self, StepStatus::Pending | StepStatus::Running)
  }

  /// Whether the workflow may move on to the next step.
  pub fn advances(&self) -> bool {
    matches!(self, StepStatus::Succeeded | StepStatus::Skipped)
  }
}

impl fmt::Display for StepStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      StepStatus::Pending => "pending",
      StepStatus::Running => "running",
      StepStatus::Succeeded => "succeeded",
      StepStatus::Skipped => "skipped",
      StepStatus::Failed => "failed",
      StepStatus::CancelledByUser => "cancelled by user",
      StepStatus::CancelledByCaller => "cancelled by caller",
      StepStatus::TimedOut => "timed out",
    };
    f.write_str(s)
  }
}

/// A step and where it got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
  pub step: Step,
  pub status: StepStatus,
}
