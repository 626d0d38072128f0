use std::time::Duration;

use meadow_config::{CommandDef, DeployConfig};
use meadow_task::TaskSpec;

use crate::Step;
use crate::annotations::{TemplateContext, task_spec};

/// A tool-running step: its task template and how long it may take.
#[derive(Clone)]
pub(crate) struct Tool {
  pub step: Step,
  pub spec: TaskSpec,
  pub timeout: Duration,
}

/// Every tool the workflow and the maintenance commands run.
///
/// Built once from the config; each run instantiates fresh handles.
#[derive(Clone)]
pub(crate) struct DeployTasks {
  pub check_tool: Tool,
  pub install_tool: Tool,
  pub check_login: Tool,
  pub login: Tool,
  pub list_collections: Tool,
  pub build: Tool,
  pub upload: Tool,
  pub publish: Tool,
  pub uninstall_tool: Tool,
  pub logout: Tool,
}

impl DeployTasks {
  pub fn from_config(config: &DeployConfig) -> Self {
    let commands = &config.commands;
    let timeouts = &config.timeouts;
    let dir = config.working_dir.as_path();
    let tool = |step: Step, command: &CommandDef, context: TemplateContext, timeout: Duration| Tool {
      step,
      spec: task_spec(step.id(), command, dir, context),
      timeout,
    };

    use TemplateContext::{Empty, Package, Publish};
    Self {
      check_tool: tool(Step::CheckTool, &commands.check_tool, Empty, timeouts.check_tool()),
      install_tool: tool(
        Step::InstallTool,
        &commands.install_tool,
        Empty,
        timeouts.install_tool(),
      ),
      check_login: tool(Step::CheckLogin, &commands.check_login, Empty, timeouts.check_login()),
      login: tool(Step::Login, &commands.login, Empty, timeouts.login()),
      list_collections: tool(
        Step::ListCollections,
        &commands.list_collections,
        Empty,
        timeouts.list_collections(),
      ),
      build: tool(Step::Build, &commands.build, Package, timeouts.build()),
      upload: tool(Step::Upload, &commands.upload, Package, timeouts.upload()),
      publish: tool(Step::Publish, &commands.publish, Publish, timeouts.publish()),
      uninstall_tool: tool(
        Step::UninstallTool,
        &commands.uninstall_tool,
        Empty,
        timeouts.maintenance(),
      ),
      logout: tool(Step::Logout, &commands.logout, Empty, timeouts.maintenance()),
    }
  }
}
