//! Persistence gateway capability interfaces
//!
//! The analysis core delegates all storage to these traits; any storage
//! technology satisfying them is acceptable. Analyses are append-only:
//! a fresh computation always creates a new row, never an overwrite.

pub mod memory;

pub use memory::InMemoryStore;

use crate::agents::SynthesizedReport;
use crate::context::{CaseRecord, EvidenceItem};
use crate::error::Result;
use crate::precedent::Precedent;
use crate::scoring::AnalysisResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted analysis row with its creation timestamp, used for
/// staleness decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: Uuid,
    pub case_id: Uuid,
    pub user_id: Uuid,
    pub result: AnalysisResult,
    pub created_at: DateTime<Utc>,
}

/// Read side: case records and their evidence, owned by the
/// case-management subsystem.
#[async_trait]
pub trait CaseStore: Send + Sync {
    /// Load a case visible to the given caller. A case owned by another
    /// user is indistinguishable from a missing one.
    async fn load_case(&self, case_id: Uuid, user_id: Uuid) -> Result<Option<CaseRecord>>;

    async fn load_evidence(&self, case_id: Uuid) -> Result<Vec<EvidenceItem>>;
}

/// Write side: analysis persistence and cache lookups.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn save_analysis(
        &self,
        case_id: Uuid,
        user_id: Uuid,
        result: &AnalysisResult,
    ) -> Result<Uuid>;

    async fn save_precedents(&self, analysis_id: Uuid, precedents: &[Precedent]) -> Result<()>;

    /// Most recent analysis for a case, if any.
    async fn load_latest_analysis(
        &self,
        case_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<StoredAnalysis>>;

    /// Write back the merit score to the case record. The only field of
    /// the case this core ever writes.
    async fn update_case_merit_score(&self, case_id: Uuid, score: u8) -> Result<()>;

    async fn save_pipeline_run(&self, case_id: Uuid, report: &SynthesizedReport) -> Result<()>;
}
