//! Configuration for the discovery orchestrator.
//!
//! Settings are layered: `.claude/discovery.toml` → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [agent]
//! command = "claude"
//! permission_mode = "bypassPermissions"
//! allowed_tools = ["Read(*)", "Write(*)", "WebSearch"]
//! name_timeout_secs = 30
//!
//! [paths]
//! prompts_dir = ".claude/scripts/discovery_agent/prompts"
//! ```
//!
//! Relative paths are resolved against the project root.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::workspace::ROOT_MARKER;

/// Tools the agent may use without prompting during discovery phases.
pub const DEFAULT_ALLOWED_TOOLS: &[&str] = &[
    "Read(*)",
    "Write(*)",
    "Edit(*)",
    "WebSearch",
    "WebFetch",
    "Glob(*)",
    "Grep(*)",
];

/// Instruction directory, relative to the project root.
pub const DEFAULT_PROMPTS_DIR: &str = ".claude/scripts/discovery_agent/prompts";

/// File name of the optional config file inside [`ROOT_MARKER`].
pub const CONFIG_FILE: &str = "discovery.toml";

/// Agent invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSection {
    /// Agent CLI command (default: "claude")
    #[serde(default)]
    pub command: Option<String>,
    /// Permission mode granted to headless phases
    #[serde(default = "default_permission_mode")]
    pub permission_mode: String,
    /// Override the allowed-tools list for every phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    /// Bound on the project-name derivation call
    #[serde(default = "default_name_timeout_secs")]
    pub name_timeout_secs: u64,
}

fn default_permission_mode() -> String {
    "bypassPermissions".to_string()
}

fn default_name_timeout_secs() -> u64 {
    30
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            command: None,
            permission_mode: default_permission_mode(),
            allowed_tools: None,
            name_timeout_secs: default_name_timeout_secs(),
        }
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsSection {
    /// Directory holding the per-phase instruction files
    #[serde(default)]
    pub prompts_dir: Option<PathBuf>,
}

/// The complete discovery.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoveryToml {
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub paths: PathsSection,
}

impl DiscoveryToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse discovery.toml")
    }

    /// Load `<root>/.claude/discovery.toml`, or defaults when it is absent.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let path = root.join(ROOT_MARKER).join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Overrides taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub prompts_dir: Option<PathBuf>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub agent_cmd: String,
    pub permission_mode: String,
    pub allowed_tools: Vec<String>,
    pub name_timeout: Duration,
    pub prompts_dir: PathBuf,
}

impl Config {
    /// Resolve configuration for the project rooted at `root`, reading the
    /// process environment.
    pub fn load(root: &Path, cli: &CliOverrides) -> Result<Self> {
        let toml = DiscoveryToml::load_or_default(root)?;
        Ok(Self::resolve(root, toml, cli, |key| std::env::var(key).ok()))
    }

    /// Merge file settings, environment lookups and CLI overrides.
    pub fn resolve(
        root: &Path,
        toml: DiscoveryToml,
        cli: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let agent_cmd = env("CLAUDE_CMD")
            .filter(|cmd| !cmd.trim().is_empty())
            .or(toml.agent.command)
            .unwrap_or_else(|| "claude".to_string());

        let allowed_tools = toml.agent.allowed_tools.unwrap_or_else(|| {
            DEFAULT_ALLOWED_TOOLS
                .iter()
                .map(|tool| tool.to_string())
                .collect()
        });

        let prompts_dir = cli
            .prompts_dir
            .clone()
            .or_else(|| env("DISCOVERY_PROMPTS_DIR").map(PathBuf::from))
            .or(toml.paths.prompts_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPTS_DIR));

        Self {
            root: root.to_path_buf(),
            agent_cmd,
            permission_mode: toml.agent.permission_mode,
            allowed_tools,
            name_timeout: Duration::from_secs(toml.agent.name_timeout_secs),
            prompts_dir: root.join(prompts_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::resolve(
            dir.path(),
            DiscoveryToml::load_or_default(dir.path()).unwrap(),
            &CliOverrides::default(),
            no_env,
        );

        assert_eq!(config.agent_cmd, "claude");
        assert_eq!(config.permission_mode, "bypassPermissions");
        assert_eq!(config.allowed_tools.len(), DEFAULT_ALLOWED_TOOLS.len());
        assert_eq!(config.name_timeout, Duration::from_secs(30));
        assert_eq!(config.prompts_dir, dir.path().join(DEFAULT_PROMPTS_DIR));
    }

    #[test]
    fn test_parse_full_file() {
        let toml = DiscoveryToml::parse(
            r#"
            [agent]
            command = "my-claude"
            permission_mode = "acceptEdits"
            allowed_tools = ["Read(*)"]
            name_timeout_secs = 5

            [paths]
            prompts_dir = "prompts"
            "#,
        )
        .unwrap();

        let config = Config::resolve(
            Path::new("/proj"),
            toml,
            &CliOverrides::default(),
            no_env,
        );
        assert_eq!(config.agent_cmd, "my-claude");
        assert_eq!(config.permission_mode, "acceptEdits");
        assert_eq!(config.allowed_tools, vec!["Read(*)".to_string()]);
        assert_eq!(config.name_timeout, Duration::from_secs(5));
        assert_eq!(config.prompts_dir, PathBuf::from("/proj/prompts"));
    }

    #[test]
    fn test_parse_rejects_malformed_toml() {
        assert!(DiscoveryToml::parse("[agent\ncommand = ").is_err());
    }

    #[test]
    fn test_load_or_default_reads_marker_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(ROOT_MARKER)).unwrap();
        fs::write(
            dir.path().join(ROOT_MARKER).join(CONFIG_FILE),
            "[agent]\ncommand = \"from-file\"\n",
        )
        .unwrap();

        let toml = DiscoveryToml::load_or_default(dir.path()).unwrap();
        assert_eq!(toml.agent.command.as_deref(), Some("from-file"));
        assert_eq!(toml.agent.name_timeout_secs, 30);
    }

    #[test]
    fn test_environment_overrides_file_and_cli_overrides_environment() {
        let toml = DiscoveryToml::parse(
            "[agent]\ncommand = \"from-file\"\n[paths]\nprompts_dir = \"file-prompts\"\n",
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            ("CLAUDE_CMD", "from-env"),
            ("DISCOVERY_PROMPTS_DIR", "env-prompts"),
        ]
        .into_iter()
        .collect();
        let cli = CliOverrides {
            prompts_dir: Some(PathBuf::from("/abs/cli-prompts")),
        };

        let config = Config::resolve(Path::new("/proj"), toml, &cli, |key| {
            env.get(key).map(|v| v.to_string())
        });
        assert_eq!(config.agent_cmd, "from-env");
        assert_eq!(config.prompts_dir, PathBuf::from("/abs/cli-prompts"));
    }

    #[test]
    fn test_blank_env_command_is_ignored() {
        let config = Config::resolve(
            Path::new("/proj"),
            DiscoveryToml::default(),
            &CliOverrides::default(),
            |key| (key == "CLAUDE_CMD").then(|| "  ".to_string()),
        );
        assert_eq!(config.agent_cmd, "claude");
    }
}
