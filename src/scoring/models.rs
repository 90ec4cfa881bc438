//! Data models for merit scoring

use crate::precedent::Precedent;
use serde::{Deserialize, Serialize};

/// Score at or above which the outcome is predicted favorable
pub const FAVORABLE_THRESHOLD: u8 = 65;
/// Score below which the outcome is predicted unfavorable
pub const UNFAVORABLE_THRESHOLD: u8 = 45;

/// Predicted case outcome, always derivable from the merit score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomePrediction {
    Favorable,
    Unfavorable,
    Uncertain,
}

impl OutcomePrediction {
    /// Threshold rule: favorable iff score >= 65, unfavorable iff
    /// score < 45, uncertain otherwise.
    pub fn from_score(score: u8) -> Self {
        if score >= FAVORABLE_THRESHOLD {
            OutcomePrediction::Favorable
        } else if score < UNFAVORABLE_THRESHOLD {
            OutcomePrediction::Unfavorable
        } else {
            OutcomePrediction::Uncertain
        }
    }
}

/// A merit assessment. Immutable once persisted; later runs supersede
/// rather than mutate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Merit score in [0, 100]
    pub merit_score: u8,
    /// Confidence in [0.0, 1.0]
    pub confidence: f32,
    pub outcome_prediction: OutcomePrediction,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub legal_basis: String,
    #[serde(default)]
    pub similar_cases: Vec<Precedent>,
}
