//! Merit scoring engine
//!
//! Two interchangeable strategies selected by availability: a
//! model-assisted analyzer when the reasoning backend is configured and
//! at least one precedent was retrieved, and a deterministic formula as
//! the guaranteed-available floor.

pub mod analyzer;
pub mod deterministic;
pub mod models;
pub mod staleness;

pub use models::{AnalysisResult, OutcomePrediction};
pub use staleness::{CacheDecision, StalenessGate};

use crate::context::CaseContext;
use crate::precedent::Precedent;
use crate::reasoning::ReasoningClient;
use std::sync::Arc;
use tracing::warn;

pub struct ScoringEngine {
    reasoning: Arc<ReasoningClient>,
}

impl ScoringEngine {
    pub fn new(reasoning: Arc<ReasoningClient>) -> Self {
        Self { reasoning }
    }

    /// Produce a merit assessment. Never fails: any model-assisted
    /// failure falls back to the deterministic strategy.
    pub async fn score(&self, ctx: &CaseContext, precedents: Vec<Precedent>) -> AnalysisResult {
        if self.reasoning.is_configured() && !precedents.is_empty() {
            match analyzer::analyze(&self.reasoning, ctx, &precedents).await {
                Ok(result) => return result,
                Err(e) => {
                    warn!("model-assisted analysis failed, using deterministic fallback: {}", e);
                }
            }
        }

        deterministic::assess(ctx, precedents)
    }
}
