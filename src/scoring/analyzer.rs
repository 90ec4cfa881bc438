//! Model-assisted merit analysis
//!
//! Sends the case context, evidence digest, and top precedents to the
//! reasoning backend under a strict structured-output contract. Any
//! failure here is recovered by the caller with the deterministic
//! strategy; this module never masks a failure as a result.

use super::models::{AnalysisResult, OutcomePrediction};
use crate::context::CaseContext;
use crate::precedent::Precedent;
use crate::reasoning::{ReasoningClient, ReasoningError};
use serde::Deserialize;
use serde_json::json;

/// Precedents included in the prompt
const PROMPT_PRECEDENTS: usize = 5;

const SYSTEM_PROMPT: &str = "You are a legal case analyst specializing in Canadian law. \
Analyze the case and similar precedents to provide:\n\
1. Merit score (0-100) based on legal strength\n\
2. Confidence level (0-1) in your assessment\n\
3. Outcome prediction (favorable/unfavorable/uncertain)\n\
4. Key strengths and weaknesses\n\
5. Actionable recommendations\n\n\
Base analysis on:\n\
- Quality and relevance of evidence\n\
- Applicable case law precedents\n\
- Legal elements required for the claim type\n\
- Jurisdiction-specific considerations\n\n\
IMPORTANT: This is educational analysis, not legal advice.";

/// Structured assessment returned by the backend. All fields required;
/// the schema forbids extras.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ModelAssessment {
    merit_score: f64,
    confidence: f64,
    outcome_prediction: OutcomePrediction,
    strengths: Vec<String>,
    weaknesses: Vec<String>,
    recommendations: Vec<String>,
    legal_basis: String,
}

fn output_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "meritScore": { "type": "number", "minimum": 0, "maximum": 100 },
            "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
            "outcomePrediction": { "type": "string", "enum": ["favorable", "unfavorable", "uncertain"] },
            "strengths": { "type": "array", "items": { "type": "string" } },
            "weaknesses": { "type": "array", "items": { "type": "string" } },
            "recommendations": { "type": "array", "items": { "type": "string" } },
            "legalBasis": { "type": "string" }
        },
        "required": [
            "meritScore", "confidence", "outcomePrediction",
            "strengths", "weaknesses", "recommendations", "legalBasis"
        ],
        "additionalProperties": false
    })
}

fn user_prompt(ctx: &CaseContext, precedents: &[Precedent]) -> String {
    let venue = ctx
        .case
        .venue
        .map(|v| serde_json::to_string(&v).unwrap_or_default().replace('"', ""))
        .unwrap_or_else(|| "General".to_string());

    let evidence_lines = ctx
        .digest()
        .iter()
        .enumerate()
        .map(|(i, e)| match &e.description {
            Some(d) => format!("{}. {}: {}", i + 1, e.name, d),
            None => format!("{}. {}", i + 1, e.name),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let precedent_lines = precedents
        .iter()
        .take(PROMPT_PRECEDENTS)
        .enumerate()
        .map(|(i, p)| format!("{}. {} ({}) - {}", i + 1, p.title, p.citation, p.court))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze this case:\n\n\
         CASE TYPE: {}\n\
         PROVINCE: {}\n\
         DESCRIPTION: {}\n\n\
         EVIDENCE ({} items):\n{}\n\n\
         SIMILAR PRECEDENTS:\n{}\n\n\
         Provide structured JSON analysis.",
        venue,
        ctx.case.province.as_deref().unwrap_or("ON"),
        ctx.case
            .description
            .as_deref()
            .unwrap_or("No description provided"),
        ctx.evidence_count(),
        evidence_lines,
        precedent_lines,
    )
}

/// Run the model-assisted analysis. The returned result carries the
/// retrieved precedents so persistence and responses see one record.
pub async fn analyze(
    reasoning: &ReasoningClient,
    ctx: &CaseContext,
    precedents: &[Precedent],
) -> Result<AnalysisResult, ReasoningError> {
    let arguments = reasoning
        .structured_call(
            SYSTEM_PROMPT,
            &user_prompt(ctx, precedents),
            "provide_analysis",
            output_schema(),
        )
        .await?;

    let assessment: ModelAssessment = serde_json::from_value(arguments)
        .map_err(|e| ReasoningError::InvalidResponse(e.to_string()))?;

    Ok(AnalysisResult {
        merit_score: assessment.merit_score.clamp(0.0, 100.0).round() as u8,
        confidence: assessment.confidence.clamp(0.0, 1.0) as f32,
        outcome_prediction: assessment.outcome_prediction,
        strengths: assessment.strengths,
        weaknesses: assessment.weaknesses,
        recommendations: assessment.recommendations,
        legal_basis: assessment.legal_basis,
        similar_cases: precedents.to_vec(),
    })
}
