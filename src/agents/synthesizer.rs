//! Synthesis of stage outputs into one final report
//!
//! A pure fold over the completed stage results. Every field has a safe
//! default so a partial run (a subset of stages requested) still yields
//! a coherent report.

use super::orchestrator::AgentResult;
use super::stages::{
    ActionItem, KeyArgument, PrecedentRef, PrimaryStrategy, RequiredDocument, RiskFactor,
    StageOutput, StatuteRef, StrengthFactor, WeaknessFactor,
};
use serde::{Deserialize, Serialize};

/// Merit score reported when the analyst stage did not run
const DEFAULT_MERIT_SCORE: u8 = 50;
/// Action items surfaced as immediate next steps
const NEXT_STEP_COUNT: usize = 5;

/// Final report assembled from whichever stages completed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedReport {
    pub merit_score: u8,
    pub success_probability: String,
    pub confidence: String,
    pub relevant_laws: Vec<StatuteRef>,
    pub precedents: Vec<PrecedentRef>,
    pub key_issues: Vec<String>,
    pub strengths: Vec<StrengthFactor>,
    pub weaknesses: Vec<WeaknessFactor>,
    pub evidence_gaps: Vec<String>,
    pub risk_factors: Vec<RiskFactor>,
    pub primary_strategy: Option<PrimaryStrategy>,
    pub action_plan: Vec<ActionItem>,
    pub negotiation_strategy: Option<super::stages::NegotiationStrategy>,
    pub required_documents: Vec<RequiredDocument>,
    pub key_arguments: Vec<KeyArgument>,
    pub filing_instructions: Option<super::stages::FilingInstructions>,
    pub summary: String,
    pub next_steps: Vec<ActionItem>,
}

/// Fold the completed stage results into the final report.
pub fn synthesize(results: &[AgentResult]) -> SynthesizedReport {
    let mut report = SynthesizedReport {
        merit_score: DEFAULT_MERIT_SCORE,
        success_probability: "Unknown".to_string(),
        confidence: "medium".to_string(),
        relevant_laws: vec![],
        precedents: vec![],
        key_issues: vec![],
        strengths: vec![],
        weaknesses: vec![],
        evidence_gaps: vec![],
        risk_factors: vec![],
        primary_strategy: None,
        action_plan: vec![],
        negotiation_strategy: None,
        required_documents: vec![],
        key_arguments: vec![],
        filing_instructions: None,
        summary: String::new(),
        next_steps: vec![],
    };

    let mut summaries = Vec::new();

    for result in results {
        if !result.output.summary().is_empty() {
            summaries.push(result.output.summary().to_string());
        }

        match &result.output {
            StageOutput::Research(r) => {
                report.relevant_laws = r.relevant_statutes.clone();
                report.precedents = r.key_precedents.clone();
                report.key_issues = r.key_issues.clone();
            }
            StageOutput::Analysis(a) => {
                if let Some(score) = a.merit_score {
                    report.merit_score = score.clamp(0.0, 100.0).round() as u8;
                }
                if let Some(probability) = &a.success_probability {
                    report.success_probability = probability.clone();
                }
                if let Some(confidence) = &a.confidence {
                    report.confidence = confidence.clone();
                }
                report.strengths = a.strengths.clone();
                report.weaknesses = a.weaknesses.clone();
                report.risk_factors = a.risk_factors.clone();
                if let Some(assessment) = &a.evidence_assessment {
                    report.evidence_gaps = assessment.gaps.clone();
                }
            }
            StageOutput::Strategy(s) => {
                report.primary_strategy = s.primary_strategy.clone();
                report.action_plan = s.action_plan.clone();
                report.negotiation_strategy = s.negotiation_strategy.clone();
            }
            StageOutput::Drafting(d) => {
                report.required_documents = d.required_documents.clone();
                report.key_arguments = d.key_arguments.clone();
                report.filing_instructions = d.filing_instructions.clone();
            }
        }
    }

    report.summary = summaries.join("\n\n");
    report.next_steps = report
        .action_plan
        .iter()
        .take(NEXT_STEP_COUNT)
        .cloned()
        .collect();

    report
}
