//! Project naming command.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::process::ExitCode;

use discovery::agent::ClaudeCli;
use discovery::config::Config;
use discovery::naming::NameDeriver;
use discovery::ui;

use super::UsageError;

/// Print the project identifier derived from a description.
///
/// The description is prompted for when not given and stdin is a terminal.
pub async fn cmd_derive_name(config: &Config, description: Option<&str>) -> Result<ExitCode> {
    let description = match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => d.to_string(),
        None if std::io::stdin().is_terminal() => ask_description()?,
        None => {
            return Ok(UsageError::new(&[
                "--description is required with --derive-name",
                "Example: discovery --derive-name -d \"A mobile app for tracking expenses\"",
            ])
            .report());
        }
    };

    let deriver = NameDeriver::new(ClaudeCli::for_query(config), config.name_timeout);
    let spinner = ui::spinner("Deriving project name...");
    let name = deriver.derive(&description).await;
    spinner.finish_and_clear();

    println!("{}", name);
    Ok(ExitCode::SUCCESS)
}

fn ask_description() -> Result<String> {
    println!("Describe what you want to explore or build:");
    println!("(e.g., 'A mobile app for tracking personal expenses')");
    dialoguer::Input::<String>::new()
        .with_prompt("Description")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("Please enter a description.")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("Failed to read description")
}
