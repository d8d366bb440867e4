//! Pipeline run command.

use anyhow::Result;
use std::process::ExitCode;

use discovery::agent::ClaudeCli;
use discovery::config::Config;
use discovery::orchestrator::PipelineRunner;
use discovery::phase::PhaseRegistry;
use discovery::prompt::{PromptBuilder, PromptLibrary};
use discovery::ui;
use discovery::workspace::Workspace;

use super::super::Cli;
use super::UsageError;

/// Validated arguments for a pipeline run.
#[derive(Debug, PartialEq, Eq)]
pub struct RunArgs<'a> {
    pub project: &'a str,
    pub resume: &'a str,
    pub description: Option<&'a str>,
}

/// Check run arguments before any side effects.
///
/// Phase 1 is interactive and normally launched via the `/discovery` entry
/// point, so a bare invocation without `--resume` is rejected.
pub fn validate<'a>(
    registry: &PhaseRegistry,
    project: Option<&'a str>,
    resume: Option<&'a str>,
    description: Option<&'a str>,
) -> Result<RunArgs<'a>, UsageError> {
    let Some(resume) = resume else {
        return Err(UsageError::new(&[
            "Phase 1 (interview) is interactive. Start it with the /discovery command.",
            "",
            "After Phase 1, use: --resume research --project <name>",
        ]));
    };

    let Some(project) = project else {
        return Err(UsageError::new(&[
            "--project is required when using --resume",
            "Example: discovery --resume research --project myproject",
        ]));
    };

    if let Err(e) = registry.by_name(resume) {
        return Err(UsageError(vec![e.to_string()]));
    }

    Ok(RunArgs {
        project,
        resume,
        description,
    })
}

pub async fn cmd_run(cli: &Cli, config: &Config) -> Result<ExitCode> {
    let registry = PhaseRegistry::discovery();
    let args = match validate(
        &registry,
        cli.project.as_deref(),
        cli.resume.as_deref(),
        cli.description.as_deref(),
    ) {
        Ok(args) => args,
        Err(usage) => return Ok(usage.report()),
    };

    let workspace = Workspace::new(&config.root, args.project);
    println!(
        "{}Project: {}",
        ui::icons::FOLDER,
        console::style(workspace.project()).bold()
    );
    println!("Output:  {}", workspace.output_dir().display());

    let runner = PipelineRunner::new(
        registry,
        ClaudeCli::new(config),
        PromptBuilder::new(PromptLibrary::new(config.prompts_dir.clone())),
        config.allowed_tools.clone(),
    );

    match runner.run(&workspace, args.resume, args.description).await {
        Ok(summary) => {
            tracing::info!(executed = summary.executed(), "pipeline finished");
            ui::print_summary(&summary, &workspace);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "pipeline halted");
            ui::pipeline_halted(&e.to_string(), e.resume_command());
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}
