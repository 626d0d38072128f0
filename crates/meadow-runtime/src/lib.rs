//! Meadow Runtime
//!
//! Runs external tasks while keeping a human in the loop.
//!
//! [`InteractiveWait`] starts a [`TaskHandle`](meadow_task::TaskHandle) and
//! races its completion against a cancel-only prompt, under a timeout derived
//! from the caller's cancellation token:
//!
//! ```text
//!            caller token
//!                 │ child
//!                 ▼
//!          bounded signal ◀── timeout elapsed
//!            │ child    │ child
//!            ▼          ▼
//!      prompt branch   task branch
//! ```
//!
//! Exactly one [`RunOutcome`] is produced per call, and the losing branch is
//! always cancelled and awaited before returning.
//!
//! [`CommandLauncher`] is the production
//! [`ProcessLauncher`](meadow_task::ProcessLauncher): it spawns tokio child
//! processes and streams their output into an
//! [`InMemoryLogStore`](meadow_host_log::InMemoryLogStore).

mod error;
mod launcher;
mod outcome;
mod wait;

pub use error::WaitError;
pub use launcher::CommandLauncher;
pub use outcome::RunOutcome;
pub use wait::{InteractiveWait, WaitPrompt};
