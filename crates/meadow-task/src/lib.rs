//! Meadow Task
//!
//! Task handles for external command-line tools.
//!
//! A [`TaskSpec`] describes a tool invocation (program, working directory and
//! an argument builder). Each workflow run calls [`TaskSpec::instantiate`] to
//! get a fresh, single-use [`TaskHandle`]:
//!
//! ```text
//! NotStarted ──start()──▶ Starting ──launch ok──▶ Running ──exit──▶ Finished(code)
//!                             │
//!                             └──launch/args error──▶ Failed(reason)
//! ```
//!
//! Late-bound parameters are attached to a handle as typed [`Annotation`]s
//! before it starts. The argument builder reads them when `start` is called
//! and fails with [`ArgsError::MissingAnnotation`] when one is absent.
//!
//! Launching is delegated to a [`ProcessLauncher`], which reports the exit
//! code through the single-use [`ExitReporter`] it is handed.

mod annotation;
mod error;
mod handle;
mod launcher;
mod state;

pub use annotation::{Annotation, Annotations};
pub use error::{ArgsError, LaunchError, TaskError};
pub use handle::{ArgsBuilder, TaskHandle, TaskSpec};
pub use launcher::{ExitReporter, LaunchRequest, ProcessLauncher};
pub use state::{TaskState, TerminalState};
