//! Phase definitions for the discovery pipeline.
//!
//! This module provides:
//! - `Phase`, the immutable descriptor of one pipeline step
//! - `PhaseRegistry`, the ordered phase table the runner is driven by
//! - `RunState`, pipeline progress derived from artifacts on disk

use crate::errors::{PipelineError, RegistryError};
use crate::workspace::{PhaseStatus, Workspace};

/// Represents a single pipeline phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    /// Position in the pipeline (1-based, strictly ascending)
    pub number: u32,
    /// Unique name, also the value accepted by `--resume`
    pub name: String,
    /// Artifact file written on success; its presence marks the phase complete
    pub output: String,
    /// Instruction file name, resolved against the prompts directory
    pub instructions: String,
    /// Artifacts that must exist before this phase may run, in prompt order
    pub inputs: Vec<String>,
    /// Whether the agent takes over the terminal
    pub interactive: bool,
}

impl Phase {
    /// Create a phase whose agent session takes over the terminal.
    pub fn interactive(
        number: u32,
        name: &str,
        output: &str,
        instructions: &str,
        inputs: &[&str],
    ) -> Self {
        Self {
            number,
            name: name.to_string(),
            output: output.to_string(),
            instructions: instructions.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            interactive: true,
        }
    }

    /// Create a phase that runs headless.
    pub fn autonomous(
        number: u32,
        name: &str,
        output: &str,
        instructions: &str,
        inputs: &[&str],
    ) -> Self {
        Self {
            interactive: false,
            ..Self::interactive(number, name, output, instructions, inputs)
        }
    }

    /// Name with the first letter capitalised, for headings.
    pub fn title(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn mode_label(&self) -> &'static str {
        if self.interactive {
            "INTERACTIVE"
        } else {
            "AUTONOMOUS"
        }
    }
}

/// The ordered, immutable set of phases a pipeline run walks.
#[derive(Debug, Clone)]
pub struct PhaseRegistry {
    phases: Vec<Phase>,
}

impl PhaseRegistry {
    /// Build a registry, checking that names are unique, numbers ascend and
    /// every input is produced by an earlier phase.
    pub fn new(phases: Vec<Phase>) -> Result<Self, RegistryError> {
        if phases.is_empty() {
            return Err(RegistryError::Empty);
        }

        for (idx, phase) in phases.iter().enumerate() {
            let earlier = &phases[..idx];
            if earlier.iter().any(|p| p.name == phase.name) {
                return Err(RegistryError::DuplicateName(phase.name.clone()));
            }
            if let Some(previous) = earlier.last() {
                if phase.number <= previous.number {
                    return Err(RegistryError::OutOfOrder {
                        phase: phase.name.clone(),
                        number: phase.number,
                        previous: previous.number,
                    });
                }
            }
            if let Some(input) = phase
                .inputs
                .iter()
                .find(|input| !earlier.iter().any(|p| &p.output == *input))
            {
                return Err(RegistryError::UnproducedInput {
                    phase: phase.name.clone(),
                    input: input.clone(),
                });
            }
        }

        Ok(Self { phases })
    }

    /// The five-phase discovery-to-PRD pipeline.
    pub fn discovery() -> Self {
        Self {
            phases: default_phases(),
        }
    }

    pub fn all(&self) -> &[Phase] {
        &self.phases
    }

    pub fn get(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn first(&self) -> Option<&Phase> {
        self.phases.first()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.name == name)
    }

    /// Look up a phase by name.
    pub fn by_name(&self, name: &str) -> Result<&Phase, PipelineError> {
        self.phases
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| self.unknown_phase(name))
    }

    /// The named phase and every phase after it.
    pub fn phases_from(&self, name: &str) -> Result<&[Phase], PipelineError> {
        let start = self.position(name).ok_or_else(|| self.unknown_phase(name))?;
        Ok(&self.phases[start..])
    }

    pub fn names(&self) -> Vec<String> {
        self.phases.iter().map(|p| p.name.clone()).collect()
    }

    fn unknown_phase(&self, name: &str) -> PipelineError {
        PipelineError::UnknownPhase {
            name: name.to_string(),
            valid: self.names(),
        }
    }
}

fn default_phases() -> Vec<Phase> {
    vec![
        Phase::interactive(1, "interview", "01-interview.md", "PHASE_1_INTERVIEW.md", &[]),
        Phase::autonomous(
            2,
            "research",
            "02-research.md",
            "PHASE_2_RESEARCH.md",
            &["01-interview.md"],
        ),
        Phase::autonomous(
            3,
            "synthesis",
            "03-prd-draft.md",
            "PHASE_3_SYNTHESIS.md",
            &["01-interview.md", "02-research.md"],
        ),
        Phase::autonomous(
            4,
            "review",
            "04-prd-review.md",
            "PHASE_4_REVIEW.md",
            &["03-prd-draft.md", "01-interview.md", "02-research.md"],
        ),
        Phase::autonomous(
            5,
            "consolidation",
            "05-prd-final.md",
            "PHASE_5_CONSOLIDATION.md",
            &["03-prd-draft.md", "04-prd-review.md"],
        ),
    ]
}

/// Pipeline progress, reconstructed from which artifacts exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState<'a> {
    /// No phase has produced its artifact yet
    NotStarted,
    /// Some artifacts exist; this is the first phase still missing its output
    Pending(&'a Phase),
    /// Every phase has produced its artifact; carries the last phase
    Completed(&'a Phase),
}

impl<'a> RunState<'a> {
    pub fn derive(registry: &'a PhaseRegistry, workspace: &Workspace) -> Self {
        let statuses: Vec<_> = registry
            .all()
            .iter()
            .map(|p| (p, workspace.phase_status(p)))
            .collect();

        if statuses.iter().all(|(_, s)| *s == PhaseStatus::Pending) {
            return RunState::NotStarted;
        }
        match statuses.iter().find(|(_, s)| *s == PhaseStatus::Pending) {
            Some((phase, _)) => RunState::Pending(*phase),
            None => match registry.all().last() {
                Some(last) => RunState::Completed(last),
                None => RunState::NotStarted,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    // =========================================
    // Default registry tests
    // =========================================

    #[test]
    fn test_discovery_registry_order_and_outputs() {
        let registry = PhaseRegistry::discovery();
        let outputs: Vec<_> = registry.all().iter().map(|p| p.output.as_str()).collect();
        assert_eq!(
            outputs,
            vec![
                "01-interview.md",
                "02-research.md",
                "03-prd-draft.md",
                "04-prd-review.md",
                "05-prd-final.md"
            ]
        );
        assert_eq!(
            registry.names(),
            vec!["interview", "research", "synthesis", "review", "consolidation"]
        );
    }

    #[test]
    fn test_discovery_registry_passes_validation() {
        let validated = PhaseRegistry::new(PhaseRegistry::discovery().all().to_vec());
        assert!(validated.is_ok());
    }

    #[test]
    fn test_only_interview_is_interactive() {
        let registry = PhaseRegistry::discovery();
        let interactive: Vec<_> = registry
            .all()
            .iter()
            .filter(|p| p.interactive)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(interactive, vec!["interview"]);
    }

    #[test]
    fn test_review_inputs_keep_declared_order() {
        let registry = PhaseRegistry::discovery();
        let review = registry.by_name("review").unwrap();
        assert_eq!(
            review.inputs,
            vec!["03-prd-draft.md", "01-interview.md", "02-research.md"]
        );
    }

    #[test]
    fn test_by_name_unknown_phase() {
        let registry = PhaseRegistry::discovery();
        match registry.by_name("deploy") {
            Err(PipelineError::UnknownPhase { name, valid }) => {
                assert_eq!(name, "deploy");
                assert_eq!(valid.len(), 5);
            }
            other => panic!("Expected UnknownPhase, got {other:?}"),
        }
    }

    #[test]
    fn test_index_lookup_and_phases_from() {
        let registry = PhaseRegistry::discovery();
        assert_eq!(registry.get(2).unwrap().name, "synthesis");
        assert!(registry.get(5).is_none());

        let rest = registry.phases_from("review").unwrap();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].name, "review");
        assert_eq!(rest[1].name, "consolidation");
        assert!(registry.phases_from("nope").is_err());
    }

    #[test]
    fn test_title_and_mode_label() {
        let registry = PhaseRegistry::discovery();
        let first = registry.first().unwrap();
        assert_eq!(first.title(), "Interview");
        assert_eq!(first.mode_label(), "INTERACTIVE");
        assert_eq!(registry.get(1).unwrap().mode_label(), "AUTONOMOUS");
    }

    // =========================================
    // Registry validation tests
    // =========================================

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(PhaseRegistry::new(vec![]).unwrap_err(), RegistryError::Empty);
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let err = PhaseRegistry::new(vec![
            Phase::autonomous(1, "a", "a.md", "A.md", &[]),
            Phase::autonomous(2, "a", "b.md", "B.md", &[]),
        ])
        .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("a".into()));
    }

    #[test]
    fn test_new_rejects_non_ascending_numbers() {
        let err = PhaseRegistry::new(vec![
            Phase::autonomous(2, "a", "a.md", "A.md", &[]),
            Phase::autonomous(2, "b", "b.md", "B.md", &[]),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistryError::OutOfOrder { number: 2, .. }));
    }

    #[test]
    fn test_new_rejects_forward_dependencies() {
        let err = PhaseRegistry::new(vec![
            Phase::autonomous(1, "a", "a.md", "A.md", &["b.md"]),
            Phase::autonomous(2, "b", "b.md", "B.md", &[]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnproducedInput {
                phase: "a".into(),
                input: "b.md".into()
            }
        );
    }

    // =========================================
    // RunState tests
    // =========================================

    #[test]
    fn test_run_state_follows_artifacts() {
        let dir = tempdir().unwrap();
        let registry = PhaseRegistry::discovery();
        let ws = Workspace::new(dir.path(), "demo");

        assert_eq!(RunState::derive(&registry, &ws), RunState::NotStarted);

        ws.ensure_dir().unwrap();
        fs::write(ws.artifact_path("01-interview.md"), "i").unwrap();
        match RunState::derive(&registry, &ws) {
            RunState::Pending(phase) => assert_eq!(phase.name, "research"),
            other => panic!("Expected Pending, got {other:?}"),
        }

        for phase in registry.all() {
            fs::write(ws.artifact_path(&phase.output), "x").unwrap();
        }
        match RunState::derive(&registry, &ws) {
            RunState::Completed(phase) => assert_eq!(phase.name, "consolidation"),
            other => panic!("Expected Completed, got {other:?}"),
        }
    }
}
