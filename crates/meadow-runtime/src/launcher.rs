use std::collections::HashMap;
use std::io;
use std::pin::pin;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use meadow_host_log::{InMemoryLogStore, LogWriter};
use meadow_task::{ExitReporter, LaunchError, LaunchRequest, ProcessLauncher};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Exit code reported when the process ended without one (killed by a signal).
const NO_EXIT_CODE: i32 = -1;

/// How long output may keep arriving after the process exited.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(1);

type Running = Arc<Mutex<HashMap<String, CancellationToken>>>;

/// Launches tasks as child processes.
///
/// Stdout and stderr are streamed line by line into the log store under the
/// task id. The log is closed before the exit code is reported, so a reader
/// that starts after the task finished always sees the complete output.
pub struct CommandLauncher {
  logs: Arc<InMemoryLogStore>,
  running: Running,
}

impl CommandLauncher {
  pub fn new(logs: Arc<InMemoryLogStore>) -> Self {
    Self {
      logs,
      running: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  /// The store receiving process output.
  pub fn logs(&self) -> &Arc<InMemoryLogStore> {
    &self.logs
  }
}

#[async_trait]
impl ProcessLauncher for CommandLauncher {
  async fn launch(&self, request: LaunchRequest, reporter: ExitReporter) -> Result<(), LaunchError> {
    let mut command = Command::new(&request.program);
    command
      .args(&request.args)
      .current_dir(&request.working_dir)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true);

    let child = command.spawn().map_err(|source| LaunchError::Spawn {
      program: request.program.clone(),
      source,
    })?;

    info!(
      task_id = %request.task_id,
      task = %request.task_name,
      pid = child.id(),
      "process_spawned"
    );

    let stop = CancellationToken::new();
    self
      .running
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(request.task_id.clone(), stop.clone());

    let writer = self.logs.writer(&request.task_id);
    tokio::spawn(supervise(
      child,
      writer,
      stop,
      reporter,
      self.running.clone(),
      request.task_id,
    ));

    Ok(())
  }

  async fn stop(&self, task_id: &str) -> Result<(), LaunchError> {
    let running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
    match running.get(task_id) {
      Some(stop) => {
        stop.cancel();
        Ok(())
      }
      None => Err(LaunchError::NotRunning {
        task_id: task_id.to_string(),
      }),
    }
  }
}

async fn supervise(
  mut child: Child,
  writer: LogWriter,
  stop: CancellationToken,
  reporter: ExitReporter,
  running: Running,
  task_id: String,
) {
  let stdout = child.stdout.take();
  let stderr = child.stderr.take();

  let status = {
    let mut wait = pin!(async {
      tokio::select! {
        status = child.wait() => status,
        _ = stop.cancelled() => {
          info!(task_id = %task_id, "stopping process");
          if let Err(e) = child.start_kill() {
            warn!(task_id = %task_id, error = %e, "failed to kill process");
          }
          child.wait().await
        }
      }
    });

    let mut pumps = pin!(async {
      tokio::join!(
        pump(stdout, &writer, reporter.task()),
        pump(stderr, &writer, reporter.task()),
      );
    });

    let first = tokio::select! {
      status = &mut wait => First::Exited(status),
      () = &mut pumps => First::Drained,
    };

    // Descendants may keep the pipes open after the process itself exited.
    match first {
      First::Exited(status) => {
        if tokio::time::timeout(OUTPUT_DRAIN_GRACE, &mut pumps).await.is_err() {
          warn!(task_id = %task_id, "output still open after exit, detaching");
        }
        status
      }
      First::Drained => wait.await,
    }
  };

  running
    .lock()
    .unwrap_or_else(PoisonError::into_inner)
    .remove(&task_id);
  writer.close();

  let exit_code = match status {
    Ok(status) => status.code().unwrap_or(NO_EXIT_CODE),
    Err(e) => {
      warn!(task_id = %task_id, error = %e, "failed to wait for process");
      NO_EXIT_CODE
    }
  };
  reporter.finished(exit_code);
}

enum First {
  Exited(io::Result<ExitStatus>),
  Drained,
}

/// Appends output lines to the log. Bytes that are not UTF-8 are replaced.
async fn pump<R>(reader: Option<R>, writer: &LogWriter, task: &str)
where
  R: AsyncRead + Unpin,
{
  let Some(reader) = reader else {
    return;
  };

  let mut reader = BufReader::new(reader);
  let mut buf = Vec::new();
  loop {
    buf.clear();
    match reader.read_until(b'\n', &mut buf).await {
      Ok(0) => break,
      Ok(_) => {
        let line = String::from_utf8_lossy(trim_line_ending(&buf)).into_owned();
        debug!(task, line = %line, "output");
        writer.append(line);
      }
      Err(e) => {
        warn!(task, error = %e, "failed to read process output");
        break;
      }
    }
  }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
  let line = line.strip_suffix(b"\n").unwrap_or(line);
  line.strip_suffix(b"\r").unwrap_or(line)
}
