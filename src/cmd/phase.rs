//! Phase listing and status commands.

use std::process::ExitCode;

use discovery::config::Config;
use discovery::phase::{PhaseRegistry, RunState};
use discovery::ui;
use discovery::workspace::Workspace;

use super::UsageError;

pub fn cmd_list() -> ExitCode {
    ui::print_phase_table(&PhaseRegistry::discovery());
    ExitCode::SUCCESS
}

pub fn cmd_status(config: &Config, project: Option<&str>) -> ExitCode {
    let Some(project) = project else {
        return UsageError::new(&[
            "--project is required with --status",
            "Example: discovery --status --project myproject",
        ])
        .report();
    };

    let registry = PhaseRegistry::discovery();
    let workspace = Workspace::new(&config.root, project);
    ui::print_status(&registry, &workspace);

    match RunState::derive(&registry, &workspace) {
        RunState::NotStarted => {
            println!("Not started. Phase 1 (interview) runs via the /discovery command.");
        }
        RunState::Pending(phase) => {
            println!(
                "Next: discovery --project {} --resume {}",
                workspace.project(),
                phase.name
            );
        }
        RunState::Completed(_) => println!("All phases complete."),
    }
    println!();
    ExitCode::SUCCESS
}
