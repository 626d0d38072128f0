//! Meadow Config
//!
//! Serializable configuration for the deployment workflow: which commands
//! each task runs, how long each step may take, which build artifacts are
//! stale, and how values are scraped from tool output.
//!
//! Every field has a default that drives the Meadow CLI through
//! `dotnet tool run meadow`, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "working_dir": "./firmware",
//!   "timeouts": { "login_secs": 600 },
//!   "commands": {
//!     "build": { "program": "dotnet", "args": ["tool", "run", "meadow", "cloud", "package", "create", "--name", "{{ package_name }}"] }
//!   }
//! }
//! ```
//!
//! Command arguments are templates rendered when the task starts; see the
//! workflow crate for the variables available to each task.

mod command;
mod deploy;
mod error;
mod settings;

pub use command::{CommandDef, Commands};
pub use deploy::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, DeployConfig};
pub use error::ConfigError;
pub use settings::{Extraction, StaleArtifacts, Timeouts};
