mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use meadow_config::DeployConfig;
use meadow_host_fs::LocalFilesystem;
use meadow_host_interaction::ConsoleInteraction;
use meadow_host_log::InMemoryLogStore;
use meadow_runtime::CommandLauncher;
use meadow_workflow::{DeploymentWorkflow, MaintenanceCommand};

/// meadow-deploy - publish Meadow applications to Meadow Cloud
#[derive(Parser)]
#[command(name = "meadow-deploy")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to a JSON config file (default: ~/.meadow-deploy/config.json if present)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Project directory the Meadow CLI runs in (overrides the config)
  #[arg(long, global = true)]
  working_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build, upload and publish the application package
  Deploy {
    /// Print the deployment report as JSON
    #[arg(long)]
    json: bool,
  },

  /// Uninstall the local Meadow CLI tool
  Uninstall,

  /// Logout from Meadow Cloud
  Logout,
}

fn main() -> Result<()> {
  logging::init();
  let cli = Cli::parse();

  let home = dirs::home_dir();
  let mut config = DeployConfig::resolve(cli.config.as_deref(), home.as_deref())
    .context("failed to load configuration")?;
  if let Some(dir) = cli.working_dir {
    config.working_dir = dir;
  }

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run(cli.command, config).await })
}

async fn run(command: Commands, config: DeployConfig) -> Result<()> {
  let cancel = CancellationToken::new();
  tokio::spawn({
    let cancel = cancel.clone();
    async move {
      if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received, cancelling");
        cancel.cancel();
      }
    }
  });

  let logs = Arc::new(InMemoryLogStore::new());
  let launcher = Arc::new(CommandLauncher::new(logs.clone()));
  let interaction = Arc::new(ConsoleInteraction::stdio());
  let fs = Arc::new(LocalFilesystem::new(config.working_dir.clone()));
  let workflow = DeploymentWorkflow::new(config, launcher, interaction, logs, fs);

  match command {
    Commands::Deploy { json } => {
      let report = workflow.run(cancel).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
      } else {
        println!("{}", report.message());
      }
    }
    Commands::Uninstall => {
      workflow
        .run_maintenance(MaintenanceCommand::UninstallTool, cancel)
        .await?;
      println!("The Meadow CLI was uninstalled.");
    }
    Commands::Logout => {
      workflow
        .run_maintenance(MaintenanceCommand::Logout, cancel)
        .await?;
      println!("Logged out from Meadow Cloud.");
    }
  }

  Ok(())
}
