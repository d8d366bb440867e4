use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use discovery::logging::init_logging;

mod cmd;

#[derive(Parser, Debug)]
#[command(name = "discovery")]
#[command(
    version,
    about = "Discovery-to-PRD pipeline orchestrator",
    after_help = "Examples:
  discovery --list
  discovery --resume research --project expense-tracker
  discovery --status --project expense-tracker
  discovery --derive-name -d \"A mobile app for tracking expenses\""
)]
pub struct Cli {
    /// Project name (sanitized into the workspace directory name)
    #[arg(short, long)]
    pub project: Option<String>,

    /// Free-text description of what to explore or build
    #[arg(short, long)]
    pub description: Option<String>,

    /// Phase to resume from
    #[arg(short, long)]
    pub resume: Option<String>,

    /// List all phases
    #[arg(short, long)]
    pub list: bool,

    /// Show which phase artifacts exist for --project
    #[arg(short, long)]
    pub status: bool,

    /// Print a project name derived from --description and exit
    #[arg(long)]
    pub derive_name: bool,

    /// Directory holding the phase instruction files
    #[arg(long)]
    pub prompts_dir: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cmd::dispatch(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", console::style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
