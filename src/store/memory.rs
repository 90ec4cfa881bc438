//! In-memory persistence gateway backed by DashMap
//!
//! Default wiring for local runs and tests. Production deployments plug
//! a database-backed implementation into the same traits.

use super::{CaseStore, PersistenceGateway, StoredAnalysis};
use crate::agents::SynthesizedReport;
use crate::context::{CaseRecord, EvidenceItem};
use crate::error::Result;
use crate::precedent::Precedent;
use crate::scoring::AnalysisResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    cases: DashMap<Uuid, CaseRecord>,
    evidence: DashMap<Uuid, Vec<EvidenceItem>>,
    analyses: DashMap<Uuid, Vec<StoredAnalysis>>,
    precedents: DashMap<Uuid, Vec<Precedent>>,
    pipeline_runs: DashMap<Uuid, Vec<SynthesizedReport>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a case record
    pub fn insert_case(&self, case: CaseRecord) {
        self.cases.insert(case.id, case);
    }

    /// Seed evidence for a case
    pub fn insert_evidence(&self, item: EvidenceItem) {
        self.evidence.entry(item.case_id).or_default().push(item);
    }

    /// Seed an analysis with an explicit timestamp. Lets tests construct
    /// entries of arbitrary age.
    pub fn insert_analysis_at(
        &self,
        case_id: Uuid,
        user_id: Uuid,
        result: AnalysisResult,
        created_at: DateTime<Utc>,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.analyses.entry(case_id).or_default().push(StoredAnalysis {
            id,
            case_id,
            user_id,
            result,
            created_at,
        });
        id
    }

    pub fn precedents_for(&self, analysis_id: Uuid) -> Vec<Precedent> {
        self.precedents
            .get(&analysis_id)
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn pipeline_runs_for(&self, case_id: Uuid) -> Vec<SynthesizedReport> {
        self.pipeline_runs
            .get(&case_id)
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn analysis_count(&self, case_id: Uuid) -> usize {
        self.analyses.get(&case_id).map(|a| a.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CaseStore for InMemoryStore {
    async fn load_case(&self, case_id: Uuid, user_id: Uuid) -> Result<Option<CaseRecord>> {
        Ok(self
            .cases
            .get(&case_id)
            .filter(|c| c.user_id == user_id)
            .map(|c| c.clone()))
    }

    async fn load_evidence(&self, case_id: Uuid) -> Result<Vec<EvidenceItem>> {
        Ok(self
            .evidence
            .get(&case_id)
            .map(|e| e.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryStore {
    async fn save_analysis(
        &self,
        case_id: Uuid,
        user_id: Uuid,
        result: &AnalysisResult,
    ) -> Result<Uuid> {
        Ok(self.insert_analysis_at(case_id, user_id, result.clone(), Utc::now()))
    }

    async fn save_precedents(&self, analysis_id: Uuid, precedents: &[Precedent]) -> Result<()> {
        self.precedents.insert(analysis_id, precedents.to_vec());
        Ok(())
    }

    async fn load_latest_analysis(
        &self,
        case_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<StoredAnalysis>> {
        Ok(self.analyses.get(&case_id).and_then(|rows| {
            rows.iter()
                .filter(|a| a.user_id == user_id)
                .max_by_key(|a| a.created_at)
                .cloned()
        }))
    }

    async fn update_case_merit_score(&self, case_id: Uuid, score: u8) -> Result<()> {
        if let Some(mut case) = self.cases.get_mut(&case_id) {
            case.merit_score = Some(score);
        }
        Ok(())
    }

    async fn save_pipeline_run(&self, case_id: Uuid, report: &SynthesizedReport) -> Result<()> {
        self.pipeline_runs
            .entry(case_id)
            .or_default()
            .push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::OutcomePrediction;
    use chrono::Duration;

    fn result(score: u8) -> AnalysisResult {
        AnalysisResult {
            merit_score: score,
            confidence: 0.5,
            outcome_prediction: OutcomePrediction::from_score(score),
            strengths: vec![],
            weaknesses: vec![],
            recommendations: vec![],
            legal_basis: String::new(),
            similar_cases: vec![],
        }
    }

    #[tokio::test]
    async fn test_latest_analysis_is_newest() {
        let store = InMemoryStore::new();
        let case_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let old = Utc::now() - Duration::hours(30);
        store.insert_analysis_at(case_id, user_id, result(40), old);
        store.insert_analysis_at(case_id, user_id, result(70), Utc::now());

        let latest = store
            .load_latest_analysis(case_id, user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.result.merit_score, 70);
    }

    #[tokio::test]
    async fn test_analyses_are_append_only() {
        let store = InMemoryStore::new();
        let case_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        store.save_analysis(case_id, user_id, &result(40)).await.unwrap();
        store.save_analysis(case_id, user_id, &result(60)).await.unwrap();

        assert_eq!(store.analysis_count(case_id), 2);
    }

    #[tokio::test]
    async fn test_case_visibility_is_per_user() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let case = CaseRecord {
            id: Uuid::new_v4(),
            user_id: owner,
            venue: None,
            province: None,
            description: None,
            merit_score: None,
        };
        let case_id = case.id;
        store.insert_case(case);

        assert!(store.load_case(case_id, owner).await.unwrap().is_some());
        assert!(store.load_case(case_id, other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_merit_score_write_back() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();
        let case = CaseRecord {
            id: Uuid::new_v4(),
            user_id,
            venue: None,
            province: None,
            description: None,
            merit_score: None,
        };
        let case_id = case.id;
        store.insert_case(case);

        store.update_case_merit_score(case_id, 89).await.unwrap();
        let case = store.load_case(case_id, user_id).await.unwrap().unwrap();
        assert_eq!(case.merit_score, Some(89));
    }
}
