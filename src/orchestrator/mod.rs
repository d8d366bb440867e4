pub mod runner;

pub use runner::{PhaseOutcome, PipelineRunner, RunSummary, resume_command};
