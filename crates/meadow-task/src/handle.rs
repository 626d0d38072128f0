//! Task specs and handles.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::annotation::{Annotation, Annotations};
use crate::error::{ArgsError, TaskError};
use crate::launcher::{ExitReporter, LaunchRequest, ProcessLauncher};
use crate::state::{TaskState, TerminalState};

/// Builds a task's arguments from its annotations at start time.
pub type ArgsBuilder = Arc<dyn Fn(&Annotations) -> Result<Vec<String>, ArgsError> + Send + Sync>;

/// Reusable description of a tool invocation.
#[derive(Clone)]
pub struct TaskSpec {
  name: String,
  program: String,
  working_dir: PathBuf,
  args: ArgsBuilder,
}

impl TaskSpec {
  /// Create a spec with no arguments.
  pub fn new(
    name: impl Into<String>,
    program: impl Into<String>,
    working_dir: impl Into<PathBuf>,
  ) -> Self {
    Self {
      name: name.into(),
      program: program.into(),
      working_dir: working_dir.into(),
      args: Arc::new(|_| Ok(Vec::new())),
    }
  }

  /// Use a fixed argument list.
  pub fn with_args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    self.args = Arc::new(move |_| Ok(args.clone()));
    self
  }

  /// Build arguments from annotations when the task starts.
  pub fn with_args_builder<F>(mut self, builder: F) -> Self
  where
    F: Fn(&Annotations) -> Result<Vec<String>, ArgsError> + Send + Sync + 'static,
  {
    self.args = Arc::new(builder);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  pub fn working_dir(&self) -> &Path {
    &self.working_dir
  }

  /// Create a fresh handle for one run.
  pub fn instantiate(&self) -> TaskHandle {
    let (state, _) = watch::channel(TaskState::NotStarted);
    TaskHandle {
      inner: Arc::new(HandleInner {
        id: uuid::Uuid::new_v4().to_string(),
        spec: self.clone(),
        annotations: Mutex::new(Annotations::new()),
        state: Arc::new(state),
      }),
    }
  }
}

impl fmt::Debug for TaskSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TaskSpec")
      .field("name", &self.name)
      .field("program", &self.program)
      .field("working_dir", &self.working_dir)
      .finish_non_exhaustive()
  }
}

struct HandleInner {
  id: String,
  spec: TaskSpec,
  annotations: Mutex<Annotations>,
  state: Arc<watch::Sender<TaskState>>,
}

/// A single-use reference to one external process.
///
/// Cloning is cheap; clones observe the same task.
#[derive(Clone)]
pub struct TaskHandle {
  inner: Arc<HandleInner>,
}

impl TaskHandle {
  /// Unique id of this handle.
  pub fn id(&self) -> &str {
    &self.inner.id
  }

  pub fn name(&self) -> &str {
    &self.inner.spec.name
  }

  pub fn spec(&self) -> &TaskSpec {
    &self.inner.spec
  }

  /// Current lifecycle state.
  pub fn state(&self) -> TaskState {
    self.inner.state.borrow().clone()
  }

  /// Number of callers currently waiting for a terminal state.
  pub fn waiter_count(&self) -> usize {
    self.inner.state.receiver_count()
  }

  /// Attach an annotation. Only allowed before the task is started.
  pub fn annotate<A: Annotation>(&self, value: A) -> Result<(), TaskError> {
    let mut annotations = self
      .inner
      .annotations
      .lock()
      .unwrap_or_else(PoisonError::into_inner);

    let state = self.state();
    if state != TaskState::NotStarted {
      return Err(TaskError::AlreadyStarted {
        task: self.name().to_string(),
        state: state.to_string(),
      });
    }

    annotations.attach(value);
    Ok(())
  }

  /// Clone of the latest annotation of kind `A`.
  pub fn annotation<A: Annotation + Clone>(&self) -> Option<A> {
    self
      .inner
      .annotations
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .latest::<A>()
      .cloned()
  }

  /// Start the task through `launcher`.
  #[instrument(
    name = "task_start",
    skip(self, launcher),
    fields(task_id = %self.id(), task = %self.name())
  )]
  pub async fn start(&self, launcher: &dyn ProcessLauncher) -> Result<(), TaskError> {
    let claimed = self.inner.state.send_if_modified(|s| {
      if *s == TaskState::NotStarted {
        *s = TaskState::Starting;
        true
      } else {
        false
      }
    });
    if !claimed {
      return Err(TaskError::AlreadyStarted {
        task: self.name().to_string(),
        state: self.state().to_string(),
      });
    }

    let args = {
      let annotations = self
        .inner
        .annotations
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
      (self.inner.spec.args)(&*annotations)
    };

    let args = match args {
      Ok(args) => args,
      Err(source) => {
        error!(error = %source, "task arguments could not be built");
        self.fail(source.to_string());
        return Err(TaskError::Arguments {
          task: self.name().to_string(),
          source,
        });
      }
    };

    let request = LaunchRequest {
      task_id: self.id().to_string(),
      task_name: self.name().to_string(),
      program: self.inner.spec.program.clone(),
      args,
      working_dir: self.inner.spec.working_dir.clone(),
    };
    let reporter = ExitReporter::new(self.name().to_string(), self.inner.state.clone());

    info!(
      program = %request.program,
      args = ?request.args,
      working_dir = %request.working_dir.display(),
      "task_starting"
    );

    match launcher.launch(request, reporter).await {
      Ok(()) => {
        self.inner.state.send_if_modified(|s| {
          if *s == TaskState::Starting {
            *s = TaskState::Running;
            true
          } else {
            false
          }
        });
        info!(state = %self.state(), "task_started");
        Ok(())
      }
      Err(source) => {
        error!(error = %source, "task launch failed");
        self.fail(source.to_string());
        Err(TaskError::Launch {
          task: self.name().to_string(),
          source,
        })
      }
    }
  }

  /// Wait until the task reaches a terminal state or `cancel` fires.
  pub async fn wait_terminal(
    &self,
    cancel: &CancellationToken,
  ) -> Result<TerminalState, TaskError> {
    let mut rx = self.inner.state.subscribe();

    tokio::select! {
      biased;
      _ = cancel.cancelled() => Err(TaskError::WaitCancelled {
        task: self.name().to_string(),
      }),
      state = rx.wait_for(TaskState::is_terminal) => {
        let terminal = state.ok().and_then(|s| s.terminal());
        terminal.ok_or_else(|| TaskError::StateLost {
          task: self.name().to_string(),
        })
      }
    }
  }

  /// Mark a start failure. A reported exit code is never overwritten.
  fn fail(&self, reason: String) {
    self.inner.state.send_if_modified(|s| {
      if matches!(s, TaskState::Finished { .. }) {
        false
      } else {
        *s = TaskState::Failed { reason };
        true
      }
    });
  }
}

impl fmt::Debug for TaskHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TaskHandle")
      .field("id", &self.inner.id)
      .field("name", &self.inner.spec.name)
      .field("state", &*self.inner.state.borrow())
      .finish()
  }
}
