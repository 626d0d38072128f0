use std::path::Path;
use std::sync::Arc;

use meadow_config::DeployConfig;
use meadow_extract::{DelimitedPairs, ExtractionRule, IdNamePairs, IdToken, LabeledValue, extract};
use meadow_host_fs::Filesystem;
use meadow_host_interaction::{
  Choice, InputField, Interaction, InteractionError, PromptOptions, PromptResponse,
};
use meadow_host_log::LogSource;
use meadow_runtime::{InteractiveWait, RunOutcome, WaitPrompt};
use meadow_task::{Annotation, ProcessLauncher, TaskHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::annotations::{PackageName, PublishTarget};
use crate::events::{NoopNotifier, WorkflowEvent, WorkflowNotifier};
use crate::tasks::{DeployTasks, Tool};
use crate::{DeploymentReport, MaintenanceCommand, Step, StepStatus, WorkflowError, WorkflowState};

/// Field label of the collection choice.
pub const COLLECTION_FIELD: &str = "Collection";

/// Field label of the package name.
pub const PACKAGE_NAME_FIELD: &str = "Package name";

/// Text of a confirmation guarding an optional step.
struct Confirm {
  title: &'static str,
  message: &'static str,
  button: &'static str,
}

const INSTALL_CONFIRM: Confirm = Confirm {
  title: "Install Meadow CLI",
  message: "The Meadow CLI is not installed. Do you want to install it now?",
  button: "Install",
};

const LOGIN_CONFIRM: Confirm = Confirm {
  title: "Login to Meadow Cloud",
  message: "You must be logged in to deploy firmware to the cloud. Do you want to log in now?",
  button: "Login",
};

/// The user's choice of where to publish and under which name.
struct Target {
  collection_id: String,
  package_name: String,
}

/// Deploys the application package to a Meadow Cloud collection.
///
/// Collaborators are passed in explicitly. Each call to [`run`](Self::run)
/// builds fresh task handles and a fresh [`WorkflowState`], so a failed run
/// can simply be re-invoked.
///
/// Generic over `N: WorkflowNotifier`. Use [`DeploymentWorkflow::new`] to
/// discard events or [`DeploymentWorkflow::with_notifier`] to observe them.
pub struct DeploymentWorkflow<N: WorkflowNotifier = NoopNotifier> {
  config: DeployConfig,
  tasks: DeployTasks,
  launcher: Arc<dyn ProcessLauncher>,
  interaction: Arc<dyn Interaction>,
  logs: Arc<dyn LogSource>,
  fs: Arc<dyn Filesystem>,
  notifier: N,
}

impl DeploymentWorkflow<NoopNotifier> {
  pub fn new(
    config: DeployConfig,
    launcher: Arc<dyn ProcessLauncher>,
    interaction: Arc<dyn Interaction>,
    logs: Arc<dyn LogSource>,
    fs: Arc<dyn Filesystem>,
  ) -> Self {
    Self::with_notifier(config, launcher, interaction, logs, fs, NoopNotifier)
  }
}

impl<N: WorkflowNotifier> DeploymentWorkflow<N> {
  pub fn with_notifier(
    config: DeployConfig,
    launcher: Arc<dyn ProcessLauncher>,
    interaction: Arc<dyn Interaction>,
    logs: Arc<dyn LogSource>,
    fs: Arc<dyn Filesystem>,
    notifier: N,
  ) -> Self {
    Self {
      tasks: DeployTasks::from_config(&config),
      config,
      launcher,
      interaction,
      logs,
      fs,
      notifier,
    }
  }

  pub fn config(&self) -> &DeployConfig {
    &self.config
  }

  /// Run the whole deployment plan.
  ///
  /// Stops at the first step that neither succeeds nor is skipped. The
  /// error's `Display` is the message for the user.
  #[instrument(name = "deployment_workflow", skip(self, cancel))]
  pub async fn run(&self, cancel: CancellationToken) -> Result<DeploymentReport, WorkflowError> {
    let mut state = WorkflowState::new(&Step::DEPLOY_PLAN);
    self.started(&state);

    let result = self.deploy(&mut state, &cancel).await;
    self.ended(&state, &result);
    result
  }

  /// Run one maintenance command through the interactive wait.
  #[instrument(name = "maintenance_command", skip(self, command, cancel), fields(command = %command))]
  pub async fn run_maintenance(
    &self,
    command: MaintenanceCommand,
    cancel: CancellationToken,
  ) -> Result<(), WorkflowError> {
    let tool = match command {
      MaintenanceCommand::UninstallTool => &self.tasks.uninstall_tool,
      MaintenanceCommand::Logout => &self.tasks.logout,
    };
    let mut state = WorkflowState::new(&[tool.step]);
    self.started(&state);

    let result = match self.begin(&mut state, tool.step, &cancel) {
      Ok(()) => {
        let outcome = self.run_required(tool, &tool.spec.instantiate(), &cancel).await;
        self.settle(&mut state, tool.step, outcome)
      }
      Err(e) => Err(e),
    };

    self.ended(&state, &result);
    result
  }

  async fn deploy(
    &self,
    state: &mut WorkflowState,
    cancel: &CancellationToken,
  ) -> Result<DeploymentReport, WorkflowError> {
    self
      .ensure(state, cancel, &self.tasks.check_tool, &self.tasks.install_tool, &INSTALL_CONFIRM)
      .await?;
    self
      .ensure(state, cancel, &self.tasks.check_login, &self.tasks.login, &LOGIN_CONFIRM)
      .await?;

    self.begin(state, Step::ListCollections, cancel)?;
    let outcome = self.list_collections(cancel).await;
    let collections = self.settle(state, Step::ListCollections, outcome)?;
    state.collections = Some(collections.clone());

    self.begin(state, Step::ChooseTarget, cancel)?;
    let outcome = self.choose_target(&collections, cancel).await;
    let target = self.settle(state, Step::ChooseTarget, outcome)?;
    state.collection_id = Some(target.collection_id.clone());
    state.package_name = Some(target.package_name.clone());

    self.begin(state, Step::ResetBuild, cancel)?;
    let outcome = self.reset_build().await;
    self.settle(state, Step::ResetBuild, outcome)?;

    self.begin(state, Step::Build, cancel)?;
    let outcome = self
      .run_annotated(&self.tasks.build, PackageName(target.package_name.clone()), cancel)
      .await;
    self.settle(state, Step::Build, outcome)?;

    self.begin(state, Step::Upload, cancel)?;
    let outcome = self.upload(&target.package_name, cancel).await;
    let package_id = self.settle(state, Step::Upload, outcome)?;
    state.package_id = Some(package_id.clone());

    self.begin(state, Step::Publish, cancel)?;
    let publish_target = PublishTarget {
      package_id: package_id.clone(),
      collection_id: target.collection_id.clone(),
    };
    let outcome = self
      .run_annotated(&self.tasks.publish, publish_target, cancel)
      .await;
    self.settle(state, Step::Publish, outcome)?;

    let collection_name = state
      .collection_name()
      .unwrap_or(target.collection_id.as_str())
      .to_string();

    Ok(DeploymentReport {
      execution_id: state.execution_id().to_string(),
      package_name: target.package_name,
      package_id,
      collection_id: target.collection_id,
      collection_name,
      steps: state.records().to_vec(),
    })
  }

  /// Check a prerequisite; when missing, confirm and run the action.
  ///
  /// The action is skipped when the check exits zero.
  async fn ensure(
    &self,
    state: &mut WorkflowState,
    cancel: &CancellationToken,
    check: &Tool,
    action: &Tool,
    confirm: &Confirm,
  ) -> Result<(), WorkflowError> {
    self.begin(state, check.step, cancel)?;
    let outcome = self.run_tool(check, &check.spec.instantiate(), cancel).await;
    let exit_code = self.settle(state, check.step, outcome)?;

    if exit_code == 0 {
      self.finish(state, action.step, StepStatus::Skipped);
      return Ok(());
    }

    info!(step = %check.step, exit_code, "prerequisite_missing");
    self.begin(state, action.step, cancel)?;
    let outcome = self.confirm_and_run(action, confirm, cancel).await;
    self.settle(state, action.step, outcome).map(|_| ())
  }

  async fn confirm_and_run(
    &self,
    action: &Tool,
    confirm: &Confirm,
    cancel: &CancellationToken,
  ) -> Result<TaskHandle, WorkflowError> {
    let response = self
      .interaction
      .prompt_confirmation(
        confirm.title,
        confirm.message,
        PromptOptions::confirm(confirm.button),
        cancel.child_token(),
      )
      .await;

    match response {
      Ok(PromptResponse::Completed(true)) => {}
      Ok(_) => return Err(WorkflowError::CancelledByUser { step: action.step }),
      Err(e) => return Err(interaction_error(action.step, e, cancel)),
    }

    let handle = action.spec.instantiate();
    self.run_required(action, &handle, cancel).await?;
    Ok(handle)
  }

  async fn list_collections(&self, cancel: &CancellationToken) -> Result<IdNamePairs, WorkflowError> {
    let tool = &self.tasks.list_collections;
    let handle = tool.spec.instantiate();
    self.run_required(tool, &handle, cancel).await?;

    let settings = &self.config.extraction;
    let mut rule = DelimitedPairs::new(settings.collection_separator.as_str());
    if let Some(index) = settings.collection_id_token {
      rule = rule.with_id_token(IdToken::Index(index));
    }

    let collections = self.harvest(tool.step, rule, &handle, cancel).await?;
    let collections = collections.ok_or(WorkflowError::ExtractionMissing {
      step: tool.step,
      what: "any collections",
    })?;
    info!(count = collections.len(), "collections_listed");
    Ok(collections)
  }

  async fn choose_target(
    &self,
    collections: &IdNamePairs,
    cancel: &CancellationToken,
  ) -> Result<Target, WorkflowError> {
    let step = Step::ChooseTarget;
    let choices = collections
      .iter()
      .map(|(id, name)| Choice::new(id, name))
      .collect();
    let fields = [
      InputField::choice(COLLECTION_FIELD, choices).required(),
      InputField::text(PACKAGE_NAME_FIELD)
        .with_placeholder("my-app")
        .required(),
    ];

    let response = self
      .interaction
      .prompt_inputs(
        "Deploy to Meadow Cloud",
        "Choose the collection to publish to and name the package.",
        &fields,
        PromptOptions::confirm("Deploy"),
        cancel.child_token(),
      )
      .await;

    let values = match response {
      Ok(PromptResponse::Completed(values)) => values,
      Ok(PromptResponse::Cancelled) => return Err(WorkflowError::CancelledByUser { step }),
      Err(e) => return Err(interaction_error(step, e, cancel)),
    };

    let collection_id = non_empty(values.get(COLLECTION_FIELD)).ok_or_else(|| {
      WorkflowError::InvalidInput {
        step,
        message: "no collection was selected".to_string(),
      }
    })?;
    if collections.get(collection_id).is_none() {
      return Err(WorkflowError::InvalidInput {
        step,
        message: format!("'{}' is not one of the listed collections", collection_id),
      });
    }

    let package_name = non_empty(values.get(PACKAGE_NAME_FIELD)).ok_or_else(|| {
      WorkflowError::InvalidInput {
        step,
        message: "a package name is required".to_string(),
      }
    })?;

    info!(collection_id, package_name, "target_chosen");
    Ok(Target {
      collection_id: collection_id.to_string(),
      package_name: package_name.to_string(),
    })
  }

  /// Remove stale build output. Absent entries are skipped.
  async fn reset_build(&self) -> Result<(), WorkflowError> {
    let stale = &self.config.stale_artifacts;

    for dir in &stale.directories {
      let path = Path::new(dir);
      let exists = self.fs.dir_exists(path).await.map_err(|e| cleanup_error(path, e))?;
      if exists {
        self
          .fs
          .remove_dir_all(path)
          .await
          .map_err(|e| cleanup_error(path, e))?;
        info!(path = %dir, "stale_directory_removed");
      } else {
        debug!(path = %dir, "stale directory absent");
      }
    }

    for file in &stale.files {
      let path = Path::new(file);
      let exists = self.fs.file_exists(path).await.map_err(|e| cleanup_error(path, e))?;
      if exists {
        self
          .fs
          .remove_file(path)
          .await
          .map_err(|e| cleanup_error(path, e))?;
        info!(path = %file, "stale_file_removed");
      } else {
        debug!(path = %file, "stale file absent");
      }
    }

    Ok(())
  }

  async fn upload(&self, package_name: &str, cancel: &CancellationToken) -> Result<String, WorkflowError> {
    let tool = &self.tasks.upload;
    let handle = self
      .run_annotated(tool, PackageName(package_name.to_string()), cancel)
      .await?;

    let rule = LabeledValue::new(self.config.extraction.package_id_label.as_str());
    let package_id = self.harvest(tool.step, rule, &handle, cancel).await?;
    let package_id = package_id.ok_or(WorkflowError::ExtractionMissing {
      step: tool.step,
      what: "a package id",
    })?;
    info!(package_id = %package_id, "package_uploaded");
    Ok(package_id)
  }

  /// Instantiate `tool`, attach `annotation` and run it to a zero exit.
  async fn run_annotated<A: Annotation>(
    &self,
    tool: &Tool,
    annotation: A,
    cancel: &CancellationToken,
  ) -> Result<TaskHandle, WorkflowError> {
    let handle = tool.spec.instantiate();
    handle
      .annotate(annotation)
      .map_err(|source| WorkflowError::Task {
        step: tool.step,
        source,
      })?;
    self.run_required(tool, &handle, cancel).await?;
    Ok(handle)
  }

  /// Run a tool that must exit zero.
  async fn run_required(
    &self,
    tool: &Tool,
    handle: &TaskHandle,
    cancel: &CancellationToken,
  ) -> Result<(), WorkflowError> {
    match self.run_tool(tool, handle, cancel).await? {
      0 => Ok(()),
      exit_code => Err(WorkflowError::ToolReportedFailure {
        step: tool.step,
        exit_code,
      }),
    }
  }

  /// Run a tool through the interactive wait and return its exit code.
  async fn run_tool(
    &self,
    tool: &Tool,
    handle: &TaskHandle,
    cancel: &CancellationToken,
  ) -> Result<i32, WorkflowError> {
    let step = tool.step;
    let prompt = WaitPrompt::new(step.title(), step.progress_message());
    let wait = InteractiveWait::new(self.launcher.as_ref(), self.interaction.as_ref());

    match wait.run(handle, &prompt, tool.timeout, cancel).await {
      Ok(RunOutcome::Finished { exit_code }) => Ok(exit_code),
      Ok(RunOutcome::StartFailed { reason }) => Err(WorkflowError::StartFailed { step, reason }),
      Ok(RunOutcome::TimedOut) => Err(WorkflowError::TimedOut {
        step,
        timeout: tool.timeout,
      }),
      Ok(RunOutcome::CancelledByUser) => Err(WorkflowError::CancelledByUser { step }),
      Ok(RunOutcome::CancelledByCaller) => Err(WorkflowError::CancelledByCaller { step }),
      Err(source) => {
        error!(step = %step, error = %source, "interactive wait failed");
        Err(WorkflowError::Wait { step, source })
      }
    }
  }

  /// Apply `rule` to a finished task's output.
  async fn harvest<R: ExtractionRule>(
    &self,
    step: Step,
    rule: R,
    handle: &TaskHandle,
    cancel: &CancellationToken,
  ) -> Result<Option<R::Value>, WorkflowError> {
    let lines = self.logs.lines(handle.id());
    tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(WorkflowError::CancelledByCaller { step }),
      value = extract(rule, lines) => Ok(value),
    }
  }

  /// Mark `step` running, or cancelled when the caller already gave up.
  fn begin(
    &self,
    state: &mut WorkflowState,
    step: Step,
    cancel: &CancellationToken,
  ) -> Result<(), WorkflowError> {
    if cancel.is_cancelled() {
      self.finish(state, step, StepStatus::CancelledByCaller);
      return Err(WorkflowError::CancelledByCaller { step });
    }

    state.set(step, StepStatus::Running);
    info!(step = %step, "step_started");
    self.notifier.notify(WorkflowEvent::StepStarted {
      execution_id: state.execution_id().to_string(),
      step,
    });
    Ok(())
  }

  /// Record a step's result and pass it through.
  fn settle<T>(
    &self,
    state: &mut WorkflowState,
    step: Step,
    result: Result<T, WorkflowError>,
  ) -> Result<T, WorkflowError> {
    let status = match &result {
      Ok(_) => StepStatus::Succeeded,
      Err(WorkflowError::TimedOut { .. }) => StepStatus::TimedOut,
      Err(WorkflowError::CancelledByUser { .. }) => StepStatus::CancelledByUser,
      Err(WorkflowError::CancelledByCaller { .. }) => StepStatus::CancelledByCaller,
      Err(_) => StepStatus::Failed,
    };
    self.finish(state, step, status);
    result
  }

  fn finish(&self, state: &mut WorkflowState, step: Step, status: StepStatus) {
    state.set(step, status);
    if status.advances() {
      info!(step = %step, status = %status, "step_finished");
    } else {
      warn!(step = %step, status = %status, "step_finished");
    }
    self.notifier.notify(WorkflowEvent::StepFinished {
      execution_id: state.execution_id().to_string(),
      step,
      status,
    });
  }

  fn started(&self, state: &WorkflowState) {
    info!(execution_id = %state.execution_id(), "workflow_started");
    self.notifier.notify(WorkflowEvent::WorkflowStarted {
      execution_id: state.execution_id().to_string(),
    });
  }

  fn ended<T>(&self, state: &WorkflowState, result: &Result<T, WorkflowError>) {
    let execution_id = state.execution_id().to_string();
    match result {
      Ok(_) => {
        info!(execution_id = %execution_id, "workflow_completed");
        self
          .notifier
          .notify(WorkflowEvent::WorkflowCompleted { execution_id });
      }
      Err(e) => {
        if e.is_cancellation() {
          warn!(execution_id = %execution_id, step = %e.step(), error = %e, "workflow_cancelled");
        } else {
          error!(execution_id = %execution_id, step = %e.step(), error = %e, "workflow_failed");
        }
        self.notifier.notify(WorkflowEvent::WorkflowFailed {
          execution_id,
          error: e.to_string(),
        });
      }
    }
  }
}

fn interaction_error(step: Step, error: InteractionError, cancel: &CancellationToken) -> WorkflowError {
  match error {
    InteractionError::Cancelled if cancel.is_cancelled() => WorkflowError::CancelledByCaller { step },
    source => WorkflowError::Interaction { step, source },
  }
}

fn cleanup_error(path: &Path, source: std::io::Error) -> WorkflowError {
  WorkflowError::Cleanup {
    path: path.to_path_buf(),
    source,
  }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
  value.map(str::trim).filter(|v| !v.is_empty())
}
