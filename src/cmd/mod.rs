//! CLI command implementations.
//!
//! Flags are checked in precedence order; each submodule owns one mode:
//!
//! | Module    | Mode                                     |
//! |-----------|------------------------------------------|
//! | `phase`   | `--list`, `--status`                     |
//! | `project` | `--derive-name`                          |
//! | `run`     | `--resume` (the pipeline itself)         |

pub mod phase;
pub mod project;
pub mod run;

pub use phase::{cmd_list, cmd_status};
pub use project::cmd_derive_name;
pub use run::cmd_run;

use anyhow::{Context, Result};
use std::process::ExitCode;

use discovery::config::{CliOverrides, Config};
use discovery::ui;
use discovery::workspace::resolve_root;

use super::Cli;

/// A problem with the arguments; reported on stderr with exit code 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub Vec<String>);

impl UsageError {
    pub fn new(lines: &[&str]) -> Self {
        Self(lines.iter().map(|line| line.to_string()).collect())
    }

    pub fn report(&self) -> ExitCode {
        ui::usage_error(&self.0);
        ExitCode::FAILURE
    }
}

pub async fn dispatch(cli: &Cli) -> Result<ExitCode> {
    if cli.list {
        return Ok(cmd_list());
    }

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let root = resolve_root(&cwd);
    let config = Config::load(
        &root,
        &CliOverrides {
            prompts_dir: cli.prompts_dir.clone(),
        },
    )?;
    tracing::debug!(root = %config.root.display(), agent = %config.agent_cmd, "resolved configuration");

    if cli.derive_name {
        return cmd_derive_name(&config, cli.description.as_deref()).await;
    }
    if cli.status {
        return Ok(cmd_status(&config, cli.project.as_deref()));
    }
    cmd_run(cli, &config).await
}
