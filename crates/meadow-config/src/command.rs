use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Program plus argument templates for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDef {
  pub program: String,
  #[serde(default)]
  pub args: Vec<String>,
}

impl CommandDef {
  pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      program: program.into(),
      args: args.into_iter().map(Into::into).collect(),
    }
  }

  /// `dotnet tool <args>`
  fn dotnet_tool(args: &[&str]) -> Self {
    Self::new("dotnet", ["tool"].iter().chain(args).copied())
  }

  /// `dotnet tool run meadow <args>`
  fn meadow(args: &[&str]) -> Self {
    Self::new(
      "dotnet",
      ["tool", "run", "meadow"].iter().chain(args).copied(),
    )
  }
}

const CLI_PACKAGE: &str = "WildernessLabs.Meadow.Cli";

/// Commands for every task the workflow and maintenance commands run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Commands {
  pub check_tool: CommandDef,
  pub install_tool: CommandDef,
  pub check_login: CommandDef,
  pub login: CommandDef,
  pub list_collections: CommandDef,
  pub build: CommandDef,
  pub upload: CommandDef,
  pub publish: CommandDef,
  pub uninstall_tool: CommandDef,
  pub logout: CommandDef,
}

impl Default for Commands {
  fn default() -> Self {
    Self {
      check_tool: CommandDef::meadow(&[]),
      install_tool: CommandDef::dotnet_tool(&["install", "--local", CLI_PACKAGE, "--prerelease"]),
      check_login: CommandDef::meadow(&["cloud", "collection", "list"]),
      login: CommandDef::meadow(&["login"]),
      list_collections: CommandDef::meadow(&["cloud", "collection", "list"]),
      build: CommandDef::meadow(&["cloud", "package", "create", "--name", "{{ package_name }}"]),
      upload: CommandDef::meadow(&["cloud", "package", "upload", "mpak/{{ package_name }}.mpak"]),
      publish: CommandDef::meadow(&[
        "cloud",
        "package",
        "publish",
        "{{ package_id }}",
        "--collectionId",
        "{{ collection_id }}",
      ]),
      uninstall_tool: CommandDef::dotnet_tool(&["uninstall", "--local", CLI_PACKAGE]),
      logout: CommandDef::meadow(&["logout"]),
    }
  }
}

impl Commands {
  /// All commands with their config field names.
  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CommandDef)> {
    [
      ("check_tool", &self.check_tool),
      ("install_tool", &self.install_tool),
      ("check_login", &self.check_login),
      ("login", &self.login),
      ("list_collections", &self.list_collections),
      ("build", &self.build),
      ("upload", &self.upload),
      ("publish", &self.publish),
      ("uninstall_tool", &self.uninstall_tool),
      ("logout", &self.logout),
    ]
    .into_iter()
  }

  pub(crate) fn validate(&self) -> Result<(), ConfigError> {
    for (name, command) in self.iter() {
      if command.program.trim().is_empty() {
        return Err(ConfigError::invalid(
          format!("commands.{}.program", name),
          "program must not be empty",
        ));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_commands_drive_meadow_cli() {
    let commands = Commands::default();

    assert_eq!(commands.check_tool.program, "dotnet");
    assert_eq!(commands.check_tool.args, vec!["tool", "run", "meadow"]);
    assert_eq!(
      commands.install_tool.args,
      vec!["tool", "install", "--local", "WildernessLabs.Meadow.Cli", "--prerelease"]
    );
    assert_eq!(
      commands.check_login.args,
      vec!["tool", "run", "meadow", "cloud", "collection", "list"]
    );
    assert_eq!(commands.logout.args, vec!["tool", "run", "meadow", "logout"]);
  }

  #[test]
  fn test_parameterized_commands_use_templates() {
    let commands = Commands::default();

    assert!(commands.build.args.iter().any(|a| a == "{{ package_name }}"));
    assert!(commands.publish.args.iter().any(|a| a == "{{ package_id }}"));
    assert!(commands.publish.args.iter().any(|a| a == "{{ collection_id }}"));
  }

  #[test]
  fn test_empty_program_is_invalid() {
    let mut commands = Commands::default();
    commands.upload.program = "  ".to_string();

    let err = commands.validate().unwrap_err();
    assert!(err.to_string().contains("commands.upload.program"));
  }
}
