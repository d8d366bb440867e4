//! Project root discovery and per-project artifact directories.
//!
//! Every pipeline run writes into a single workspace:
//!
//! ```text
//! <root>/
//! ├── .claude/                 # root marker
//! └── docs/discovery/<project>/
//!     ├── 01-interview.md
//!     ├── 02-research.md
//!     └── ...
//! ```
//!
//! Artifact presence is the only progress record, so this module is also
//! where completion status is read back.

use std::path::{Path, PathBuf};

use crate::errors::PipelineError;
use crate::phase::Phase;

/// Directory whose presence marks the project root.
pub const ROOT_MARKER: &str = ".claude";

/// Identifier used when a project name sanitizes to nothing usable.
pub const FALLBACK_PROJECT_NAME: &str = "discovery-project";

/// Upper bound on the sanitized project name, in characters.
pub const MAX_PROJECT_NAME_LEN: usize = 50;

/// Walk upward from `start` until a directory containing [`ROOT_MARKER`] is
/// found. Falls back to `start` itself.
pub fn resolve_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(ROOT_MARKER).is_dir())
        .unwrap_or(start)
        .to_path_buf()
}

/// Reduce untrusted input to a safe directory-name token.
///
/// Separators become hyphens, `..` sequences are removed, anything that is
/// not alphanumeric or a hyphen becomes a hyphen, hyphen runs collapse, and
/// the result is trimmed and capped at [`MAX_PROJECT_NAME_LEN`] characters.
/// Input with no alphanumeric content yields [`FALLBACK_PROJECT_NAME`].
pub fn sanitize_project_name(name: &str) -> String {
    let name = name.replace(['/', '\\'], "-").replace("..", "");

    let mut cleaned = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_alphanumeric() || c == '-' { c } else { '-' };
        if c == '-' && cleaned.ends_with('-') {
            continue;
        }
        cleaned.push(c);
    }

    let truncated: String = cleaned
        .trim_matches('-')
        .chars()
        .take(MAX_PROJECT_NAME_LEN)
        .collect();
    let result = truncated.trim_end_matches('-');

    if result.is_empty() || !result.chars().any(char::is_alphanumeric) {
        return FALLBACK_PROJECT_NAME.to_string();
    }
    result.to_string()
}

/// Completion status of one phase, read from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    Completed,
    Pending,
}

/// The artifact directory of one project.
#[derive(Debug, Clone)]
pub struct Workspace {
    project: String,
    dir: PathBuf,
}

impl Workspace {
    /// Open the workspace for `project` under `root`. The name is sanitized;
    /// nothing is created on disk.
    pub fn new(root: &Path, project: &str) -> Self {
        let project = sanitize_project_name(project);
        let dir = root.join("docs").join("discovery").join(&project);
        Self {
            project,
            dir,
        }
    }

    /// Sanitized project identifier.
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn output_dir(&self) -> &Path {
        &self.dir
    }

    /// Create the artifact directory and its parents. Idempotent.
    pub fn ensure_dir(&self) -> Result<(), PipelineError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| PipelineError::Workspace {
            path: self.dir.clone(),
            source,
        })
    }

    pub fn artifact_path(&self, artifact: &str) -> PathBuf {
        self.dir.join(artifact)
    }

    pub fn has_artifact(&self, artifact: &str) -> bool {
        self.artifact_path(artifact).exists()
    }

    pub fn phase_status(&self, phase: &Phase) -> PhaseStatus {
        if self.has_artifact(&phase.output) {
            PhaseStatus::Completed
        } else {
            PhaseStatus::Pending
        }
    }

    /// Declared inputs of `phase` that are not on disk, in declared order.
    pub fn missing_inputs(&self, phase: &Phase) -> Vec<String> {
        phase
            .inputs
            .iter()
            .filter(|input| !self.has_artifact(input))
            .cloned()
            .collect()
    }
}
