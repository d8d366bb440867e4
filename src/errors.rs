//! Typed error hierarchy for the discovery orchestrator.
//!
//! Three enums cover the three layers:
//! - `PipelineError`: resume validation, prompt assembly and phase execution failures
//! - `AgentError`: spawning or waiting on the external agent process
//! - `RegistryError`: an inconsistent phase table at construction time

use std::path::PathBuf;
use thiserror::Error;

/// Errors that halt a pipeline invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unknown phase: {name}\nValid phases: {}", valid.join(", "))]
    UnknownPhase { name: String, valid: Vec<String> },

    #[error("Instructions for phase '{phase}' not found: {}", path.display())]
    MissingInstructions {
        phase: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Missing inputs for phase '{phase}': {}\nRun earlier phases first or check: {}",
        missing.join(", "),
        dir.display()
    )]
    MissingInputArtifacts {
        phase: String,
        missing: Vec<String>,
        dir: PathBuf,
    },

    #[error("Phase '{phase}' failed with exit code {exit_code}")]
    PhaseExecutionFailed {
        phase: String,
        exit_code: i32,
        resume_command: String,
    },

    #[error("Could not start the agent for phase '{phase}': {source}")]
    AgentUnavailable {
        phase: String,
        resume_command: String,
        #[source]
        source: AgentError,
    },

    #[error("Failed to prepare workspace {}: {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read artifact {}: {source}", path.display())]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Process exit code the CLI reports for this failure.
    ///
    /// A failed phase propagates its own exit code; codes a process cannot
    /// return (zero, negative, above 255) collapse to 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::PhaseExecutionFailed { exit_code, .. } => u8::try_from(*exit_code)
                .ok()
                .filter(|code| *code != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }

    /// The command that re-enters the pipeline at the failing phase, if any.
    pub fn resume_command(&self) -> Option<&str> {
        match self {
            PipelineError::PhaseExecutionFailed { resume_command, .. }
            | PipelineError::AgentUnavailable { resume_command, .. } => Some(resume_command),
            _ => None,
        }
    }
}

/// Errors from invoking the external agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Agent I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Agent did not finish within {secs}s")]
    Timeout { secs: u64 },
}

/// Construction-time violations of the phase table invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Phase registry is empty")]
    Empty,

    #[error("Duplicate phase name '{0}'")]
    DuplicateName(String),

    #[error("Phase '{phase}' is numbered {number}, which does not follow {previous}")]
    OutOfOrder {
        phase: String,
        number: u32,
        previous: u32,
    },

    #[error("Phase '{phase}' requires '{input}', which no earlier phase produces")]
    UnproducedInput { phase: String, input: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_phase_lists_valid_names() {
        let err = PipelineError::UnknownPhase {
            name: "bogus".into(),
            valid: vec!["interview".into(), "research".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Unknown phase: bogus"));
        assert!(msg.contains("interview, research"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn missing_inputs_lists_every_artifact() {
        let err = PipelineError::MissingInputArtifacts {
            phase: "synthesis".into(),
            missing: vec!["01-interview.md".into(), "02-research.md".into()],
            dir: PathBuf::from("/tmp/docs/discovery/demo"),
        };
        let msg = err.to_string();
        assert!(msg.contains("01-interview.md, 02-research.md"));
        assert!(msg.contains("Run earlier phases first"));
        assert!(err.resume_command().is_none());
    }

    #[test]
    fn phase_failure_propagates_exit_code() {
        let err = PipelineError::PhaseExecutionFailed {
            phase: "research".into(),
            exit_code: 3,
            resume_command: "discovery --project demo --resume research".into(),
        };
        assert_eq!(err.exit_code(), 3);
        assert_eq!(
            err.resume_command(),
            Some("discovery --project demo --resume research")
        );
    }

    #[test]
    fn unrepresentable_exit_codes_collapse_to_one() {
        for code in [-1, 0, 256, 1000] {
            let err = PipelineError::PhaseExecutionFailed {
                phase: "review".into(),
                exit_code: code,
                resume_command: String::new(),
            };
            assert_eq!(err.exit_code(), 1, "exit code {code}");
        }
    }

    #[test]
    fn agent_unavailable_carries_spawn_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "claude not found");
        let err = PipelineError::AgentUnavailable {
            phase: "research".into(),
            resume_command: "discovery --project demo --resume research".into(),
            source: AgentError::Spawn {
                command: "claude".into(),
                source: io_err,
            },
        };
        match &err {
            PipelineError::AgentUnavailable {
                source: AgentError::Spawn { source, .. },
                ..
            } => assert_eq!(source.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected AgentUnavailable(Spawn)"),
        }
        assert_eq!(err.exit_code(), 1);
        assert!(err.resume_command().is_some());
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&AgentError::Timeout { secs: 30 });
        assert_std_error(&RegistryError::Empty);
        assert_std_error(&PipelineError::UnknownPhase {
            name: "x".into(),
            valid: vec![],
        });
    }
}
