//! Meadow Workflow
//!
//! The deployment workflow: a fixed, linear plan with conditional skips that
//! publishes an application package to a Meadow Cloud collection.
//!
//! ```text
//! CheckTool ─exit 0─▶ (InstallTool skipped)
//!     └─non-zero─▶ confirm ─▶ InstallTool
//! CheckLogin ─exit 0─▶ (Login skipped)
//!     └─non-zero─▶ confirm ─▶ Login
//! ListCollections ─▶ ChooseTarget ─▶ ResetBuild ─▶ Build ─▶ Upload ─▶ Publish
//! ```
//!
//! Every tool runs through [`meadow_runtime::InteractiveWait`], so each step
//! can end because the tool exited, the user cancelled, the caller cancelled
//! or the step's timeout elapsed. Only `Succeeded` and `Skipped` advance; any
//! other status ends the run with a [`WorkflowError`] whose `Display` is the
//! message for the user. Failed steps are never retried within a run.
//!
//! Values scraped from one tool's output parameterize later tools through
//! annotations on their task handles:
//!
//! - Build and Upload read [`PackageName`].
//! - Publish reads [`PublishTarget`] (package id from the upload output plus
//!   the chosen collection).

mod annotations;
mod error;
mod events;
mod maintenance;
mod state;
mod step;
mod tasks;
mod workflow;

pub use annotations::{PackageName, PublishTarget};
pub use error::WorkflowError;
pub use events::{ChannelNotifier, NoopNotifier, WorkflowEvent, WorkflowNotifier};
pub use maintenance::MaintenanceCommand;
pub use state::{DeploymentReport, WorkflowState};
pub use step::{Step, StepRecord, StepStatus};
pub use workflow::{COLLECTION_FIELD, DeploymentWorkflow, PACKAGE_NAME_FIELD};
