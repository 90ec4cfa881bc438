//! Sequential stage orchestration
//!
//! Runs the requested stages as an explicit fold over the fixed role
//! order. Each stage sees only the outputs of stages that completed
//! before it; a stage failure aborts the remainder of the run once its
//! retry budget is spent.

use super::stages::{self, AgentRole, StageOutput};
use super::synthesizer::{self, SynthesizedReport};
use crate::context::AgentContext;
use crate::error::{AnalysisError, Result};
use crate::metrics::METRICS;
use crate::reasoning::ReasoningClient;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Retry budget for an individual stage. The default of zero retries
/// fails the whole run on the first stage error.
#[derive(Debug, Clone, Copy)]
pub struct StagePolicy {
    pub max_retries: usize,
}

impl Default for StagePolicy {
    fn default() -> Self {
        Self { max_retries: 0 }
    }
}

/// One completed stage
#[derive(Debug, Clone, Serialize)]
pub struct AgentResult {
    pub agent: AgentRole,
    pub output: StageOutput,
    pub duration_ms: u64,
}

/// One completed multi-agent invocation
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub results: Vec<AgentResult>,
    pub report: SynthesizedReport,
    pub total_duration_ms: u64,
}

pub struct AgentOrchestrator {
    reasoning: Arc<ReasoningClient>,
    policy: StagePolicy,
}

impl AgentOrchestrator {
    pub fn new(reasoning: Arc<ReasoningClient>, policy: StagePolicy) -> Self {
        Self { reasoning, policy }
    }

    /// Normalize a requested subset into the fixed role order,
    /// dropping duplicates. `None` requests the full chain.
    pub fn normalize_stages(requested: Option<&[AgentRole]>) -> Vec<AgentRole> {
        match requested {
            None => AgentRole::ORDER.to_vec(),
            Some(subset) => AgentRole::ORDER
                .iter()
                .copied()
                .filter(|role| subset.contains(role))
                .collect(),
        }
    }

    /// Run the requested stages in order and synthesize the results.
    pub async fn run(
        &self,
        ctx: &AgentContext,
        requested: Option<&[AgentRole]>,
    ) -> Result<PipelineRun> {
        let run_id = Uuid::new_v4();
        let stages = Self::normalize_stages(requested);
        let started = Instant::now();

        info!(run_id = %run_id, stages = ?stages, "starting agent pipeline");

        let mut results: Vec<AgentResult> = Vec::with_capacity(stages.len());

        for role in stages {
            let stage_started = Instant::now();
            let output = self.run_stage_with_retry(run_id, role, ctx, &results).await?;
            let duration_ms = stage_started.elapsed().as_millis() as u64;

            METRICS.record_stage(role.as_str(), stage_started.elapsed().as_secs_f64());
            info!(run_id = %run_id, stage = %role, duration_ms, "stage complete");

            results.push(AgentResult {
                agent: role,
                output,
                duration_ms,
            });
        }

        let report = synthesizer::synthesize(&results);
        let total_duration_ms = started.elapsed().as_millis() as u64;

        METRICS.record_pipeline(true, started.elapsed().as_secs_f64());
        info!(run_id = %run_id, total_duration_ms, "pipeline complete");

        Ok(PipelineRun {
            run_id,
            results,
            report,
            total_duration_ms,
        })
    }

    async fn run_stage_with_retry(
        &self,
        run_id: Uuid,
        role: AgentRole,
        ctx: &AgentContext,
        completed: &[AgentResult],
    ) -> Result<StageOutput> {
        let mut attempt = 0;
        loop {
            match self.run_stage(role, ctx, completed).await {
                Ok(output) => return Ok(output),
                Err(e) if attempt < self.policy.max_retries => {
                    attempt += 1;
                    warn!(
                        run_id = %run_id,
                        stage = %role,
                        attempt,
                        "stage failed, retrying: {}",
                        e
                    );
                }
                Err(e) => {
                    METRICS.record_stage_failure(role.as_str());
                    METRICS.record_pipeline(false, 0.0);
                    return Err(AnalysisError::Upstream(format!(
                        "{} stage failed: {}",
                        role, e
                    )));
                }
            }
        }
    }

    /// Execute one stage: build its prompt from the context and the
    /// outputs of strictly earlier stages, call the backend, and parse
    /// the response into the stage's typed output.
    async fn run_stage(
        &self,
        role: AgentRole,
        ctx: &AgentContext,
        completed: &[AgentResult],
    ) -> std::result::Result<StageOutput, StageError> {
        let research = find_output(completed, |o| match o {
            StageOutput::Research(r) => Some(r),
            _ => None,
        });
        let analysis = find_output(completed, |o| match o {
            StageOutput::Analysis(a) => Some(a),
            _ => None,
        });
        let strategy = find_output(completed, |o| match o {
            StageOutput::Strategy(s) => Some(s),
            _ => None,
        });

        let system = stages::system_prompt(role, &ctx.case_type, &ctx.province);
        let user = stages::user_prompt(role, ctx, research, analysis, strategy);

        let value = self.reasoning.prompt_json(&system, &user).await?;
        StageOutput::parse(role, value).map_err(|e| StageError::Malformed(e.to_string()))
    }
}

fn find_output<'a, T>(
    completed: &'a [AgentResult],
    select: impl Fn(&'a StageOutput) -> Option<&'a T>,
) -> Option<&'a T> {
    completed.iter().find_map(|r| select(&r.output))
}

// Keeps the distinction between a backend failure and a shape failure
// visible in logs and error messages.
#[derive(Debug, thiserror::Error)]
enum StageError {
    #[error(transparent)]
    Backend(#[from] crate::reasoning::ReasoningError),
    #[error("malformed stage output: {0}")]
    Malformed(String),
}
