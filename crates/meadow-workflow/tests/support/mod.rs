//! Scripted collaborators for workflow tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use meadow_config::DeployConfig;
use meadow_host_fs::Filesystem;
use meadow_host_interaction::{
  InputField, InputValues, Interaction, InteractionError, PromptOptions, PromptResponse,
};
use meadow_host_log::InMemoryLogStore;
use meadow_task::{ExitReporter, LaunchError, LaunchRequest, ProcessLauncher};
use meadow_workflow::{DeploymentWorkflow, WorkflowNotifier};
use tokio_util::sync::CancellationToken;

/// What a scripted tool does when launched.
#[derive(Debug, Clone)]
pub enum Script {
  /// Print `output` and exit with `exit_code`.
  Exit { exit_code: i32, output: Vec<String> },
  /// Keep running until stopped.
  Hang,
  /// Refuse to launch.
  Refuse(String),
}

impl Script {
  pub fn exit(exit_code: i32) -> Self {
    Script::Exit {
      exit_code,
      output: Vec::new(),
    }
  }

  pub fn output(lines: &[&str]) -> Self {
    Script::Exit {
      exit_code: 0,
      output: lines.iter().map(|l| l.to_string()).collect(),
    }
  }
}

/// Launcher that plays scripts keyed by task name. Unscripted tasks exit 0
/// without output.
pub struct ScriptedLauncher {
  logs: Arc<InMemoryLogStore>,
  scripts: Mutex<HashMap<String, Script>>,
  launched: Mutex<Vec<LaunchRequest>>,
  hanging: Mutex<HashMap<String, ExitReporter>>,
}

impl ScriptedLauncher {
  pub fn new(logs: Arc<InMemoryLogStore>) -> Self {
    Self {
      logs,
      scripts: Mutex::new(HashMap::new()),
      launched: Mutex::new(Vec::new()),
      hanging: Mutex::new(HashMap::new()),
    }
  }

  pub fn script(&self, task: &str, script: Script) {
    self.scripts.lock().unwrap().insert(task.to_string(), script);
  }

  /// Names of launched tasks in launch order.
  pub fn launched(&self) -> Vec<String> {
    self
      .launched
      .lock()
      .unwrap()
      .iter()
      .map(|r| r.task_name.clone())
      .collect()
  }

  pub fn request(&self, task: &str) -> Option<LaunchRequest> {
    self
      .launched
      .lock()
      .unwrap()
      .iter()
      .find(|r| r.task_name == task)
      .cloned()
  }

  pub fn requests(&self) -> Vec<LaunchRequest> {
    self.launched.lock().unwrap().clone()
  }
}

#[async_trait]
impl ProcessLauncher for ScriptedLauncher {
  async fn launch(
    &self,
    request: LaunchRequest,
    reporter: ExitReporter,
  ) -> Result<(), LaunchError> {
    let script = self
      .scripts
      .lock()
      .unwrap()
      .get(&request.task_name)
      .cloned()
      .unwrap_or(Script::exit(0));

    if let Script::Refuse(message) = &script {
      return Err(LaunchError::rejected(message.clone()));
    }
    self.launched.lock().unwrap().push(request.clone());

    match script {
      Script::Exit { exit_code, output } => {
        let writer = self.logs.writer(&request.task_id);
        for line in output {
          writer.append(line);
        }
        writer.close();
        reporter.finished(exit_code);
      }
      Script::Hang => {
        self
          .hanging
          .lock()
          .unwrap()
          .insert(request.task_id, reporter);
      }
      Script::Refuse(_) => unreachable!(),
    }
    Ok(())
  }

  async fn stop(&self, task_id: &str) -> Result<(), LaunchError> {
    match self.hanging.lock().unwrap().remove(task_id) {
      Some(reporter) => {
        self.logs.writer(task_id).close();
        reporter.finished(-1);
        Ok(())
      }
      None => Err(LaunchError::NotRunning {
        task_id: task_id.to_string(),
      }),
    }
  }
}

/// A human who answers from a script. Progress prompts are never dismissed.
#[derive(Default)]
pub struct ScriptedHuman {
  confirmations: Mutex<VecDeque<PromptResponse<bool>>>,
  inputs: Mutex<Option<PromptResponse<InputValues>>>,
  confirm_titles: Mutex<Vec<String>>,
  input_fields: Mutex<Vec<InputField>>,
}

impl ScriptedHuman {
  /// Accepts every confirmation and picks `collection_id` / `package_name`.
  pub fn choosing(collection_id: &str, package_name: &str) -> Self {
    let human = Self::default();
    human.answer_inputs(collection_id, package_name);
    human
  }

  pub fn answer_inputs(&self, collection_id: &str, package_name: &str) {
    let mut values = InputValues::new();
    values.push(meadow_workflow::COLLECTION_FIELD, collection_id);
    values.push(meadow_workflow::PACKAGE_NAME_FIELD, package_name);
    *self.inputs.lock().unwrap() = Some(PromptResponse::Completed(values));
  }

  pub fn dismiss_inputs(&self) {
    *self.inputs.lock().unwrap() = Some(PromptResponse::Cancelled);
  }

  pub fn queue_confirmation(&self, response: PromptResponse<bool>) {
    self.confirmations.lock().unwrap().push_back(response);
  }

  pub fn confirm_titles(&self) -> Vec<String> {
    self.confirm_titles.lock().unwrap().clone()
  }

  pub fn input_fields(&self) -> Vec<InputField> {
    self.input_fields.lock().unwrap().clone()
  }
}

#[async_trait]
impl Interaction for ScriptedHuman {
  async fn prompt_confirmation(
    &self,
    title: &str,
    _message: &str,
    _options: PromptOptions,
    _cancel: CancellationToken,
  ) -> Result<PromptResponse<bool>, InteractionError> {
    self.confirm_titles.lock().unwrap().push(title.to_string());
    Ok(
      self
        .confirmations
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or(PromptResponse::Completed(true)),
    )
  }

  async fn prompt_inputs(
    &self,
    _title: &str,
    _message: &str,
    fields: &[InputField],
    _options: PromptOptions,
    _cancel: CancellationToken,
  ) -> Result<PromptResponse<InputValues>, InteractionError> {
    self.input_fields.lock().unwrap().extend(fields.iter().cloned());
    Ok(
      self
        .inputs
        .lock()
        .unwrap()
        .clone()
        .unwrap_or(PromptResponse::Cancelled),
    )
  }

  async fn prompt_message_box(
    &self,
    _title: &str,
    _message: &str,
    _options: PromptOptions,
    cancel: CancellationToken,
  ) -> Result<PromptResponse<bool>, InteractionError> {
    cancel.cancelled().await;
    Err(InteractionError::Cancelled)
  }
}

/// In-memory directory and file set.
#[derive(Default)]
pub struct FakeFs {
  dirs: Mutex<HashSet<PathBuf>>,
  files: Mutex<HashSet<PathBuf>>,
  protected: Mutex<HashSet<PathBuf>>,
  removed: Mutex<Vec<PathBuf>>,
}

impl FakeFs {
  pub fn with_dirs(dirs: &[&str]) -> Self {
    let fs = Self::default();
    fs.dirs.lock().unwrap().extend(dirs.iter().map(PathBuf::from));
    fs
  }

  pub fn add_file(&self, path: &str) {
    self.files.lock().unwrap().insert(PathBuf::from(path));
  }

  /// Deleting `path` fails with permission denied.
  pub fn protect(&self, path: &str) {
    self.protected.lock().unwrap().insert(PathBuf::from(path));
  }

  pub fn removed(&self) -> Vec<PathBuf> {
    self.removed.lock().unwrap().clone()
  }

  fn remove(&self, set: &Mutex<HashSet<PathBuf>>, path: &Path) -> io::Result<()> {
    if self.protected.lock().unwrap().contains(path) {
      return Err(io::Error::new(io::ErrorKind::PermissionDenied, "access denied"));
    }
    if !set.lock().unwrap().remove(path) {
      return Err(io::Error::new(io::ErrorKind::NotFound, "not found"));
    }
    self.removed.lock().unwrap().push(path.to_path_buf());
    Ok(())
  }
}

#[async_trait]
impl Filesystem for FakeFs {
  async fn dir_exists(&self, path: &Path) -> io::Result<bool> {
    Ok(self.dirs.lock().unwrap().contains(path))
  }

  async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
    self.remove(&self.dirs, path)
  }

  async fn file_exists(&self, path: &Path) -> io::Result<bool> {
    Ok(self.files.lock().unwrap().contains(path))
  }

  async fn remove_file(&self, path: &Path) -> io::Result<()> {
    self.remove(&self.files, path)
  }
}

/// Collaborators of one workflow under test.
pub struct Harness {
  pub logs: Arc<InMemoryLogStore>,
  pub launcher: Arc<ScriptedLauncher>,
  pub human: Arc<ScriptedHuman>,
  pub fs: Arc<FakeFs>,
}

impl Harness {
  pub fn new(human: ScriptedHuman, fs: FakeFs) -> Self {
    let logs = Arc::new(InMemoryLogStore::new());
    Self {
      launcher: Arc::new(ScriptedLauncher::new(logs.clone())),
      logs,
      human: Arc::new(human),
      fs: Arc::new(fs),
    }
  }

  /// Scripts a run where everything is already installed and logged in.
  pub fn ready(human: ScriptedHuman) -> Self {
    let harness = Self::new(human, FakeFs::with_dirs(&["bin"]));
    harness.launcher.script(
      "meadow-collection-list",
      Script::output(&[
        "Retrieving collections...",
        "get 4f2a | North Lab",
        "get 9c10 | South Lab",
      ]),
    );
    harness.launcher.script(
      "meadow-package-upload",
      Script::output(&["Uploading package...", "Package Id: abc-123"]),
    );
    harness
  }

  pub fn workflow(&self) -> DeploymentWorkflow {
    DeploymentWorkflow::new(
      DeployConfig::default(),
      self.launcher.clone(),
      self.human.clone(),
      self.logs.clone(),
      self.fs.clone(),
    )
  }

  pub fn workflow_with<N: WorkflowNotifier>(&self, notifier: N) -> DeploymentWorkflow<N> {
    DeploymentWorkflow::with_notifier(
      DeployConfig::default(),
      self.launcher.clone(),
      self.human.clone(),
      self.logs.clone(),
      self.fs.clone(),
      notifier,
    )
  }
}
