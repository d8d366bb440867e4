//! Terminal output for the discovery pipeline.
//!
//! Everything the user reads goes through here; diagnostics go through
//! `tracing` instead.

pub mod icons;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::orchestrator::{PhaseOutcome, RunSummary};
use crate::phase::{Phase, PhaseRegistry};
use crate::workspace::{PhaseStatus, Workspace};
use icons::{CHAT, CHECK, CROSS, FOLDER, RUNNING, SKIP, SPARKLE, WARN};

const RULE_WIDTH: usize = 60;

fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

/// Print the `--list` phase table.
pub fn print_phase_table(registry: &PhaseRegistry) {
    println!();
    println!("{}", style("Discovery Pipeline Phases:").bold());
    println!("{}", "-".repeat(50));
    for phase in registry.all() {
        println!("  {}. {} ({})", phase.number, phase.title(), phase.mode_label());
        println!("     Output: {}", phase.output);
        if !phase.inputs.is_empty() {
            println!("     Inputs: {}", phase.inputs.join(", "));
        }
        println!();
    }
}

/// Print per-phase artifact status for one project.
pub fn print_status(registry: &PhaseRegistry, workspace: &Workspace) {
    println!();
    println!(
        "{} {}",
        style("Project:").bold(),
        style(workspace.project()).cyan()
    );
    println!("{}{}", FOLDER, workspace.output_dir().display());
    println!();
    for phase in registry.all() {
        let status = match workspace.phase_status(phase) {
            PhaseStatus::Completed => format!("{}", style("completed").green()),
            PhaseStatus::Pending => format!("{}", style("pending").dim()),
        };
        println!(
            "  {}. {:<15} {:<18} {}",
            phase.number, phase.name, phase.output, status
        );
    }
    println!();
}

/// Banner shown as the runner reaches a phase.
pub fn phase_header(phase: &Phase) {
    println!();
    println!("{}", rule('#'));
    println!("# PHASE {}: {}", phase.number, phase.name.to_uppercase());
    println!("{}", rule('#'));
}

pub fn phase_skipped(phase: &Phase) {
    println!(
        "{}Phase '{}' already completed. Skipping.",
        SKIP, phase.name
    );
}

/// Announce that the agent is about to take over for `phase`.
pub fn phase_starting(phase: &Phase, workspace: &Workspace) {
    let mode = if phase.interactive {
        "Interactive"
    } else {
        "Autonomous"
    };
    println!();
    println!("{}", rule('='));
    println!(
        "{}Phase {}: {} ({})",
        if phase.interactive { CHAT } else { RUNNING },
        phase.number,
        style(phase.name.to_uppercase()).bold(),
        mode
    );
    println!("Output: {}", workspace.artifact_path(&phase.output).display());
    println!("{}", rule('='));
    if phase.interactive {
        println!();
        println!("Starting interactive session...");
        println!("Answer the questions. The session ends when all requirements are gathered.");
    } else {
        println!();
        println!("Running autonomous phase... This may take a few minutes.");
    }
    println!();
}

pub fn output_missing(phase: &Phase, workspace: &Workspace) {
    println!();
    println!(
        "{}{}",
        WARN,
        style(format!(
            "Warning: Phase '{}' completed but output not found.",
            phase.name
        ))
        .yellow()
    );
    println!(
        "Expected: {}",
        workspace.artifact_path(&phase.output).display()
    );
    println!("You may need to manually save the output and resume.");
}

/// Report a halted pipeline on stderr.
pub fn pipeline_halted(message: &str, resume_command: Option<&str>) {
    eprintln!();
    eprintln!("{}{}", CROSS, style(message).red());
    if let Some(cmd) = resume_command {
        eprintln!("Pipeline halted. Resume with:");
        eprintln!("  {}", style(cmd).cyan());
    }
}

/// Print a usage problem on stderr.
pub fn usage_error(lines: &[String]) {
    if let Some((first, rest)) = lines.split_first() {
        eprintln!("{} {}", style("Error:").red().bold(), first);
        for line in rest {
            eprintln!("{}", line);
        }
    }
}

/// End-of-run report: per-phase outcome and artifact presence.
pub fn print_summary(summary: &RunSummary, workspace: &Workspace) {
    println!();
    println!("{}", rule('='));
    println!("{}DISCOVERY PIPELINE COMPLETE", SPARKLE);
    println!("{}", rule('='));
    println!();
    println!("All artifacts saved to: {}", workspace.output_dir().display());
    println!();

    let executed: Vec<_> = summary
        .outcomes
        .iter()
        .filter(|(_, outcome)| *outcome != PhaseOutcome::Skipped)
        .map(|(name, _)| name.as_str())
        .collect();
    if !executed.is_empty() {
        println!("Phases run: {}", executed.join(", "));
        println!();
    }

    println!("Files created:");
    for (artifact, present) in &summary.artifacts {
        if *present {
            println!("  {}{}", CHECK, artifact);
        } else {
            println!("  {}{} {}", CROSS, artifact, style("MISSING").red());
        }
    }
    println!();
}

/// Spinner for short waits with no output of their own.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
