//! Deterministic fallback scoring
//!
//! The guaranteed-available floor of the scoring engine: a pure formula
//! over evidence count, precedent count, description quality, and venue.
//! This strategy never fails.

use super::models::{AnalysisResult, OutcomePrediction};
use crate::context::CaseContext;
use crate::precedent::Precedent;

const BASE_SCORE: u32 = 40;
const EVIDENCE_POINTS: u32 = 5;
const EVIDENCE_CAP: u32 = 25;
const PRECEDENT_POINTS: u32 = 3;
const PRECEDENT_CAP: u32 = 15;
const DESCRIPTION_BONUS: u32 = 10;
const DESCRIPTION_MIN_LEN: usize = 200;
const VENUE_BONUS: u32 = 5;
const SCORE_CAP: u32 = 95;

const EVIDENCE_CONFIDENCE_THRESHOLD: usize = 3;

/// Compute the deterministic merit score
pub fn score(ctx: &CaseContext, precedent_count: usize) -> u8 {
    let mut score = BASE_SCORE;

    score += (ctx.evidence_count() as u32 * EVIDENCE_POINTS).min(EVIDENCE_CAP);
    score += (precedent_count as u32 * PRECEDENT_POINTS).min(PRECEDENT_CAP);

    if ctx.case.description_len() > DESCRIPTION_MIN_LEN {
        score += DESCRIPTION_BONUS;
    }

    if ctx.case.venue.map(|v| v.is_accessible()).unwrap_or(false) {
        score += VENUE_BONUS;
    }

    score.min(SCORE_CAP) as u8
}

/// Confidence is a step function of evidence count
pub fn confidence(evidence_count: usize) -> f32 {
    if evidence_count >= EVIDENCE_CONFIDENCE_THRESHOLD {
        0.75
    } else {
        0.5
    }
}

/// Build the full deterministic assessment, including the template
/// narrative fields keyed off evidence and precedent counts.
pub fn assess(ctx: &CaseContext, precedents: Vec<Precedent>) -> AnalysisResult {
    let merit_score = score(ctx, precedents.len());
    let evidence_count = ctx.evidence_count();

    let strengths = if evidence_count > 0 {
        vec![format!(
            "{} pieces of supporting evidence uploaded",
            evidence_count
        )]
    } else {
        vec!["Case details provided".to_string()]
    };

    let weaknesses = if evidence_count < EVIDENCE_CONFIDENCE_THRESHOLD {
        vec!["Limited documentary evidence".to_string()]
    } else {
        vec![]
    };

    let recommendations = vec![
        "Review similar cases for applicable precedents".to_string(),
        "Ensure all relevant documentation is uploaded".to_string(),
        "Consider timeline requirements for your jurisdiction".to_string(),
    ];

    let legal_basis = format!(
        "Analysis based on {} similar cases from the precedent index.",
        precedents.len()
    );

    AnalysisResult {
        merit_score,
        confidence: confidence(evidence_count),
        outcome_prediction: OutcomePrediction::from_score(merit_score),
        strengths,
        weaknesses,
        recommendations,
        legal_basis,
        similar_cases: precedents,
    }
}
