use crate::agent::AgentInvoker;
use crate::errors::PipelineError;
use crate::phase::{Phase, PhaseRegistry};
use crate::prompt::PromptBuilder;
use crate::ui;
use crate::workspace::Workspace;

/// What happened to one phase during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// Output already existed; nothing was invoked
    Skipped,
    /// The agent exited cleanly and the output artifact exists
    Completed,
    /// The agent exited cleanly but left no output artifact
    OutputNotProduced,
}

/// Result of a pipeline run that reached the last phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Outcome of every phase from the resume point on, in order
    pub outcomes: Vec<(String, PhaseOutcome)>,
    /// Every registry artifact and whether it exists at the end of the run
    pub artifacts: Vec<(String, bool)>,
}

impl RunSummary {
    pub fn executed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome != PhaseOutcome::Skipped)
            .count()
    }
}

/// The command that re-enters the pipeline at `phase`.
pub fn resume_command(project: &str, phase: &str) -> String {
    format!("discovery --project {} --resume {}", project, phase)
}

/// Walks the phase registry, delegating each pending phase to the agent.
///
/// Progress lives only in the workspace: a phase whose output artifact exists
/// is complete, so re-running after any interruption picks up where the
/// artifacts leave off.
pub struct PipelineRunner<A> {
    registry: PhaseRegistry,
    agent: A,
    prompts: PromptBuilder,
    allowed_tools: Vec<String>,
}

impl<A: AgentInvoker> PipelineRunner<A> {
    pub fn new(
        registry: PhaseRegistry,
        agent: A,
        prompts: PromptBuilder,
        allowed_tools: Vec<String>,
    ) -> Self {
        Self {
            registry,
            agent,
            prompts,
            allowed_tools,
        }
    }

    pub fn registry(&self) -> &PhaseRegistry {
        &self.registry
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// Run every phase from `resume_from` to the end.
    ///
    /// Halts on the first missing dependency, missing instruction file or
    /// failed agent session. `description` reaches only the registry's first
    /// phase.
    pub async fn run(
        &self,
        workspace: &Workspace,
        resume_from: &str,
        description: Option<&str>,
    ) -> Result<RunSummary, PipelineError> {
        let phases = self.registry.phases_from(resume_from)?;
        tracing::info!(
            project = workspace.project(),
            resume_from,
            phases = phases.len(),
            "starting pipeline"
        );

        let mut outcomes = Vec::with_capacity(phases.len());
        for phase in phases {
            ui::phase_header(phase);

            if workspace.has_artifact(&phase.output) {
                tracing::debug!(phase = %phase.name, "output present, skipping");
                ui::phase_skipped(phase);
                outcomes.push((phase.name.clone(), PhaseOutcome::Skipped));
                continue;
            }

            let outcome = self.execute(phase, workspace, description).await?;
            outcomes.push((phase.name.clone(), outcome));
        }

        let artifacts = self
            .registry
            .all()
            .iter()
            .map(|p| (p.output.clone(), workspace.has_artifact(&p.output)))
            .collect();

        Ok(RunSummary {
            outcomes,
            artifacts,
        })
    }

    async fn execute(
        &self,
        phase: &Phase,
        workspace: &Workspace,
        description: Option<&str>,
    ) -> Result<PhaseOutcome, PipelineError> {
        let missing = workspace.missing_inputs(phase);
        if !missing.is_empty() {
            return Err(PipelineError::MissingInputArtifacts {
                phase: phase.name.clone(),
                missing,
                dir: workspace.output_dir().to_path_buf(),
            });
        }

        let is_first = self
            .registry
            .first()
            .is_some_and(|first| first.name == phase.name);
        let inputs: Vec<_> = phase
            .inputs
            .iter()
            .map(|input| workspace.artifact_path(input))
            .collect();
        let prompt = self.prompts.build(
            phase,
            workspace,
            &inputs,
            description.filter(|_| is_first),
        )?;
        workspace.ensure_dir()?;

        ui::phase_starting(phase, workspace);
        tracing::info!(
            phase = %phase.name,
            interactive = phase.interactive,
            prompt_chars = prompt.len(),
            "invoking agent"
        );

        let invocation = if phase.interactive {
            self.agent
                .invoke_interactive(&prompt, &self.allowed_tools)
                .await
        } else {
            self.agent
                .invoke_autonomous(&prompt, &self.allowed_tools)
                .await
                .map(|output| output.exit_code)
        };
        let exit_code = invocation.map_err(|source| PipelineError::AgentUnavailable {
            phase: phase.name.clone(),
            resume_command: resume_command(workspace.project(), &phase.name),
            source,
        })?;

        if exit_code != 0 {
            tracing::warn!(phase = %phase.name, exit_code, "agent exited non-zero");
            return Err(PipelineError::PhaseExecutionFailed {
                phase: phase.name.clone(),
                exit_code,
                resume_command: resume_command(workspace.project(), &phase.name),
            });
        }

        if workspace.has_artifact(&phase.output) {
            tracing::info!(phase = %phase.name, "phase completed");
            Ok(PhaseOutcome::Completed)
        } else {
            tracing::warn!(phase = %phase.name, output = %phase.output, "agent exited cleanly without writing output");
            ui::output_missing(phase, workspace);
            Ok(PhaseOutcome::OutputNotProduced)
        }
    }
}
