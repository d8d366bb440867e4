//! The external agent a phase is delegated to.
//!
//! `AgentInvoker` is the seam between the pipeline and the agent process.
//! Real implementation: `ClaudeCli`. Tests drive the runner with scripted
//! doubles instead of spawning processes.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::ChildStdin;
use tokio::process::Command;

use crate::config::Config;
use crate::errors::AgentError;

/// Result of a headless agent invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutput {
    pub exit_code: i32,
    /// Captured output, lossily decoded; empty when streamed to the terminal
    pub stdout: String,
}

impl AgentOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Abstraction over agent execution for testability.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Hand the terminal to the agent with `prompt` as its opening message.
    /// Returns the session's exit code.
    async fn invoke_interactive(
        &self,
        prompt: &str,
        allowed_tools: &[String],
    ) -> Result<i32, AgentError>;

    /// Run the agent headless with `prompt` on stdin.
    async fn invoke_autonomous(
        &self,
        prompt: &str,
        allowed_tools: &[String],
    ) -> Result<AgentOutput, AgentError>;
}

/// Runs the `claude` CLI as a child process in the project root.
#[derive(Debug, Clone)]
pub struct ClaudeCli {
    command: String,
    working_dir: PathBuf,
    permission_mode: Option<String>,
    echo_output: bool,
}

impl ClaudeCli {
    /// Agent for pipeline phases: headless runs may edit unattended and
    /// their output is streamed to the terminal.
    pub fn new(config: &Config) -> Self {
        Self {
            command: config.agent_cmd.clone(),
            working_dir: config.root.clone(),
            permission_mode: Some(config.permission_mode.clone()),
            echo_output: true,
        }
    }

    /// Agent for short metadata queries: no edit permission, output only
    /// captured.
    pub fn for_query(config: &Config) -> Self {
        Self {
            permission_mode: None,
            echo_output: false,
            ..Self::new(config)
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.current_dir(&self.working_dir);
        cmd.kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> AgentError {
        AgentError::Spawn {
            command: self.command.clone(),
            source,
        }
    }
}

/// Write the prompt and close stdin.
///
/// An agent may exit without reading all of its input; the broken pipe is
/// ignored so its exit status is still reported.
async fn feed_prompt(mut stdin: ChildStdin, prompt: &str) -> std::io::Result<()> {
    let result = match stdin.write_all(prompt.as_bytes()).await {
        Ok(()) => stdin.shutdown().await,
        Err(e) => Err(e),
    };
    match result {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            tracing::debug!("agent closed stdin before reading the whole prompt");
            Ok(())
        }
        other => other,
    }
}

/// Exit code of a finished child; signal termination reports -1.
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[async_trait]
impl AgentInvoker for ClaudeCli {
    async fn invoke_interactive(
        &self,
        prompt: &str,
        allowed_tools: &[String],
    ) -> Result<i32, AgentError> {
        let mut cmd = self.base_command();
        if !allowed_tools.is_empty() {
            cmd.arg("--allowedTools").arg(allowed_tools.join(","));
        }
        cmd.arg(prompt);
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        tracing::debug!(command = %self.command, "starting interactive agent session");
        let status = cmd.status().await.map_err(|e| self.spawn_error(e))?;
        Ok(exit_code(status))
    }

    async fn invoke_autonomous(
        &self,
        prompt: &str,
        allowed_tools: &[String],
    ) -> Result<AgentOutput, AgentError> {
        let mut cmd = self.base_command();
        cmd.arg("-p");
        if let Some(mode) = &self.permission_mode {
            cmd.arg("--permission-mode").arg(mode);
        }
        if !allowed_tools.is_empty() {
            cmd.arg("--allowedTools").arg(allowed_tools.join(","));
        }
        // Phase runs stream straight to the terminal; only queries are captured.
        let (stdout, stderr) = if self.echo_output {
            (Stdio::inherit(), Stdio::inherit())
        } else {
            (Stdio::piped(), Stdio::null())
        };
        cmd.stdin(Stdio::piped()).stdout(stdout).stderr(stderr);

        tracing::debug!(
            command = %self.command,
            prompt_chars = prompt.len(),
            "starting headless agent"
        );
        let mut child = cmd.spawn().map_err(|e| self.spawn_error(e))?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let write = async {
            match stdin {
                Some(stdin) => feed_prompt(stdin, prompt).await,
                None => Ok(()),
            }
        };
        let read = async {
            let mut captured = Vec::new();
            if let Some(mut out) = stdout {
                out.read_to_end(&mut captured).await?;
            }
            Ok::<_, std::io::Error>(captured)
        };
        let (written, captured) = tokio::join!(write, read);
        written?;
        let captured = captured?;

        let status = child.wait().await?;
        Ok(AgentOutput {
            exit_code: exit_code(status),
            stdout: String::from_utf8_lossy(&captured).into_owned(),
        })
    }
}
