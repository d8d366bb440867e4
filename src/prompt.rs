//! Prompt assembly for pipeline phases.
//!
//! Each phase receives one self-contained markdown document:
//!
//! ```text
//! # Discovery Pipeline - Phase N: Name
//! ## Project / ## Output File
//! ## User Description        (first phase, when a description is given)
//! ---
//! ## Input Documents         (one fenced section per input artifact)
//! ---
//! ## Phase Instructions      (content of the phase's instruction file)
//! ```

use std::path::PathBuf;

use crate::errors::PipelineError;
use crate::phase::Phase;
use crate::workspace::Workspace;

/// Resolves phase instruction references against a directory.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    dir: PathBuf,
}

impl PromptLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, phase: &Phase) -> PathBuf {
        self.dir.join(&phase.instructions)
    }

    /// Read the instructions for `phase`.
    pub fn load(&self, phase: &Phase) -> Result<String, PipelineError> {
        let path = self.path_for(phase);
        std::fs::read_to_string(&path).map_err(|source| PipelineError::MissingInstructions {
            phase: phase.name.clone(),
            path,
            source,
        })
    }
}

/// Builds the document handed to the agent for one phase.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    library: PromptLibrary,
}

impl PromptBuilder {
    pub fn new(library: PromptLibrary) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &PromptLibrary {
        &self.library
    }

    /// Assemble the prompt for `phase`.
    ///
    /// `inputs` are embedded in the order given. `description` is rendered
    /// whenever present; callers pass it only for the first phase.
    pub fn build(
        &self,
        phase: &Phase,
        workspace: &Workspace,
        inputs: &[PathBuf],
        description: Option<&str>,
    ) -> Result<String, PipelineError> {
        let instructions = self.library.load(phase)?;
        let output_file = workspace.artifact_path(&phase.output);

        let mut parts: Vec<String> = vec![
            format!(
                "# Discovery Pipeline - Phase {}: {}",
                phase.number,
                phase.title()
            ),
            format!("\n## Project: {}", workspace.project()),
            format!("\n## Output File: {}", output_file.display()),
            String::new(),
            "IMPORTANT: When you complete this phase, save your output to the file above."
                .to_string(),
            String::new(),
        ];

        if let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) {
            parts.push("## User Description\n".to_string());
            parts.push(format!("The user wants to explore/build: {}", description));
            parts.push(String::new());
        }

        parts.push("---".to_string());
        parts.push(String::new());

        if !inputs.is_empty() {
            parts.push("## Input Documents\n".to_string());
            for path in inputs {
                let content = std::fs::read_to_string(path).map_err(|source| {
                    PipelineError::ArtifactRead {
                        path: path.clone(),
                        source,
                    }
                })?;
                let label = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                parts.push(format!("### {}\n", label));
                parts.push("```markdown".to_string());
                parts.push(content);
                parts.push("```\n".to_string());
            }
            parts.push("---\n".to_string());
        }

        parts.push("## Phase Instructions\n".to_string());
        parts.push(instructions);

        Ok(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::PhaseRegistry;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn setup() -> (TempDir, PromptBuilder, Workspace) {
        let dir = tempdir().unwrap();
        let prompts = dir.path().join("prompts");
        fs::create_dir_all(&prompts).unwrap();
        for phase in PhaseRegistry::discovery().all() {
            fs::write(
                prompts.join(&phase.instructions),
                format!("Do the {} work.", phase.name),
            )
            .unwrap();
        }
        let ws = Workspace::new(dir.path(), "demo");
        ws.ensure_dir().unwrap();
        (dir, PromptBuilder::new(PromptLibrary::new(prompts)), ws)
    }

    #[test]
    fn test_header_names_phase_and_output() {
        let (_dir, builder, ws) = setup();
        let registry = PhaseRegistry::discovery();
        let research = registry.by_name("research").unwrap();
        fs::write(ws.artifact_path("01-interview.md"), "interview notes").unwrap();

        let prompt = builder
            .build(research, &ws, &[ws.artifact_path("01-interview.md")], None)
            .unwrap();

        assert!(prompt.starts_with("# Discovery Pipeline - Phase 2: Research"));
        assert!(prompt.contains("## Project: demo"));
        assert!(prompt.contains(&format!(
            "## Output File: {}",
            ws.artifact_path("02-research.md").display()
        )));
        assert!(prompt.ends_with("## Phase Instructions\n\nDo the research work."));
    }

    #[test]
    fn test_inputs_embedded_in_given_order() {
        let (_dir, builder, ws) = setup();
        let registry = PhaseRegistry::discovery();
        let review = registry.by_name("review").unwrap();
        for (name, body) in [
            ("01-interview.md", "INTERVIEW BODY"),
            ("02-research.md", "RESEARCH BODY"),
            ("03-prd-draft.md", "DRAFT BODY"),
        ] {
            fs::write(ws.artifact_path(name), body).unwrap();
        }
        let inputs: Vec<_> = review.inputs.iter().map(|i| ws.artifact_path(i)).collect();

        let prompt = builder.build(review, &ws, &inputs, None).unwrap();

        let draft = prompt.find("### 03-prd-draft.md").unwrap();
        let interview = prompt.find("### 01-interview.md").unwrap();
        let research = prompt.find("### 02-research.md").unwrap();
        let instructions = prompt.find("## Phase Instructions").unwrap();
        assert!(draft < interview && interview < research && research < instructions);
        assert!(prompt.contains("```markdown\nDRAFT BODY\n```"));
    }

    #[test]
    fn test_description_rendered_when_given() {
        let (_dir, builder, ws) = setup();
        let registry = PhaseRegistry::discovery();
        let interview = registry.first().unwrap();

        let prompt = builder
            .build(interview, &ws, &[], Some("A mobile app for tracking expenses"))
            .unwrap();
        assert!(prompt.contains("## User Description"));
        assert!(prompt.contains("The user wants to explore/build: A mobile app for tracking expenses"));
        assert!(!prompt.contains("## Input Documents"));

        let without = builder.build(interview, &ws, &[], Some("   ")).unwrap();
        assert!(!without.contains("## User Description"));
    }

    #[test]
    fn test_missing_instructions_is_fatal() {
        let (dir, _builder, ws) = setup();
        let builder = PromptBuilder::new(PromptLibrary::new(dir.path().join("nowhere")));
        let registry = PhaseRegistry::discovery();

        match builder.build(registry.first().unwrap(), &ws, &[], None) {
            Err(PipelineError::MissingInstructions { phase, path, .. }) => {
                assert_eq!(phase, "interview");
                assert!(path.ends_with("PHASE_1_INTERVIEW.md"));
            }
            other => panic!("Expected MissingInstructions, got {other:?}"),
        }
    }

    #[test]
    fn test_vanished_input_is_read_error() {
        let (_dir, builder, ws) = setup();
        let registry = PhaseRegistry::discovery();
        let research = registry.by_name("research").unwrap();

        let result = builder.build(research, &ws, &[ws.artifact_path("01-interview.md")], None);
        assert!(matches!(result, Err(PipelineError::ArtifactRead { .. })));
    }
}
