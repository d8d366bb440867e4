//! Project-name derivation from a free-text description.
//!
//! The agent is asked for a short kebab-case name first. Any failure
//! (timeout, spawn error, non-zero exit, empty or unusable answer) falls back
//! to a local keyword heuristic, so derivation always yields a name.

use std::time::Duration;

use crate::agent::AgentInvoker;
use crate::errors::AgentError;
use crate::workspace::{FALLBACK_PROJECT_NAME, sanitize_project_name};

/// Words dropped by the local heuristic.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "for", "to", "of", "and", "or", "with", "in", "on", "at", "my", "i", "we",
    "our", "your", "their", "this", "that", "it", "is", "are", "want", "need", "would", "like",
    "idea", "plan", "project", "think", "create", "build", "make", "develop", "design",
    "implement", "add", "get",
];

/// Number of keywords the local heuristic keeps.
const MAX_KEYWORDS: usize = 4;

/// The instruction sent to the agent when asking for a name.
pub fn naming_prompt(description: &str) -> String {
    format!(
        r#"Given this project description, output ONLY a short kebab-case project name (2-4 words, lowercase, hyphens).
No explanation, just the name.

Description: {description}

Examples:
- "A mobile app for tracking expenses" -> "expense-tracker-app"
- "Website for selling handmade jewelry" -> "jewelry-store"
- "CLI tool for managing docker containers" -> "docker-manager-cli"

Output only the project name:"#
    )
}

/// Deterministic name from the first few meaningful words of `description`.
pub fn fallback_name(description: &str) -> String {
    let keywords: Vec<String> = description
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().all(char::is_alphanumeric))
        .filter(|word| !STOP_WORDS.contains(word))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect();
    sanitize_project_name(&keywords.join("-"))
}

/// Turn raw agent output into a usable name, if it holds one.
fn accept_agent_name(output: &str) -> Option<String> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return None;
    }
    let name = sanitize_project_name(&trimmed.to_lowercase());
    (name != FALLBACK_PROJECT_NAME).then_some(name)
}

/// Derives project identifiers, preferring the agent's suggestion.
pub struct NameDeriver<A> {
    agent: A,
    timeout: Duration,
}

impl<A: AgentInvoker> NameDeriver<A> {
    pub fn new(agent: A, timeout: Duration) -> Self {
        Self { agent, timeout }
    }

    /// Derive a project name. Never fails.
    pub async fn derive(&self, description: &str) -> String {
        match self.ask_agent(description).await {
            Ok(Some(name)) => {
                tracing::debug!(%name, "agent suggested project name");
                name
            }
            Ok(None) => {
                tracing::debug!("agent gave no usable name, using keyword fallback");
                fallback_name(description)
            }
            Err(e) => {
                tracing::debug!(error = %e, "name derivation via agent failed, using keyword fallback");
                fallback_name(description)
            }
        }
    }

    async fn ask_agent(&self, description: &str) -> Result<Option<String>, AgentError> {
        let prompt = naming_prompt(description);
        let output = tokio::time::timeout(self.timeout, self.agent.invoke_autonomous(&prompt, &[]))
            .await
            .map_err(|_| AgentError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        if !output.success() {
            tracing::debug!(exit_code = output.exit_code, "naming agent exited non-zero");
            return Ok(None);
        }
        Ok(accept_agent_name(&output.stdout))
    }
}
