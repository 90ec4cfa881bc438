//! Context gatherer
//!
//! Assembles case records and evidence metadata into the normalized
//! contexts consumed by the scoring and multi-agent pipelines.
//! Side-effect-free: only reads from the stores.

use super::models::{AgentContext, CaseContext, EvidenceDigest};
use crate::error::{AnalysisError, Result};
use crate::store::{CaseStore, PersistenceGateway};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub struct ContextGatherer {
    cases: Arc<dyn CaseStore>,
    gateway: Arc<dyn PersistenceGateway>,
}

impl ContextGatherer {
    pub fn new(cases: Arc<dyn CaseStore>, gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { cases, gateway }
    }

    /// Context for the precedent-scoring path. Fails with NotFound when
    /// the case does not exist or is not visible to the caller.
    pub async fn gather(&self, case_id: Uuid, user_id: Uuid) -> Result<CaseContext> {
        let case = self
            .cases
            .load_case(case_id, user_id)
            .await?
            .ok_or_else(|| AnalysisError::NotFound("case".to_string()))?;

        let evidence = self.cases.load_evidence(case_id).await?;

        debug!(
            case_id = %case_id,
            evidence_count = evidence.len(),
            "gathered scoring context"
        );

        Ok(CaseContext { case, evidence })
    }

    /// Context for the multi-agent path. Evidence and the most recent
    /// prior analysis are attached only when the request references a
    /// stored case; a referenced-but-unknown case is NotFound.
    pub async fn gather_for_agents(
        &self,
        case_id: Option<Uuid>,
        user_id: Uuid,
        details: serde_json::Value,
        case_type: String,
        province: String,
    ) -> Result<AgentContext> {
        let mut evidence: Vec<EvidenceDigest> = Vec::new();
        let mut existing_analysis = None;

        if let Some(case_id) = case_id {
            self.cases
                .load_case(case_id, user_id)
                .await?
                .ok_or_else(|| AnalysisError::NotFound("case".to_string()))?;

            evidence = self
                .cases
                .load_evidence(case_id)
                .await?
                .iter()
                .map(EvidenceDigest::from_item)
                .collect();

            existing_analysis = self
                .gateway
                .load_latest_analysis(case_id, user_id)
                .await?
                .map(|stored| serde_json::to_value(&stored.result))
                .transpose()
                .map_err(|e| AnalysisError::Internal(e.to_string()))?;
        }

        debug!(
            evidence_count = evidence.len(),
            has_prior = existing_analysis.is_some(),
            "gathered agent context"
        );

        Ok(AgentContext {
            details,
            case_type,
            province,
            evidence,
            existing_analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::models::{CaseRecord, EvidenceItem, Venue};
    use crate::store::InMemoryStore;
    use chrono::Utc;

    fn seeded_store() -> (Arc<InMemoryStore>, Uuid, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let user_id = Uuid::new_v4();
        let case = CaseRecord {
            id: Uuid::new_v4(),
            user_id,
            venue: Some(Venue::Ltb),
            province: Some("ON".to_string()),
            description: Some("Landlord failed to repair".to_string()),
            merit_score: None,
        };
        let case_id = case.id;
        store.insert_case(case);
        store.insert_evidence(EvidenceItem {
            id: Uuid::new_v4(),
            case_id,
            label: "photos.zip".to_string(),
            description: Some("Photos of water damage".to_string()),
            extracted_text: None,
            tags: vec!["repair".to_string()],
            uploaded_at: Utc::now(),
        });
        (store, case_id, user_id)
    }

    #[tokio::test]
    async fn test_gather_loads_case_and_evidence() {
        let (store, case_id, user_id) = seeded_store();
        let gatherer = ContextGatherer::new(store.clone(), store);

        let ctx = gatherer.gather(case_id, user_id).await.unwrap();
        assert_eq!(ctx.case.id, case_id);
        assert_eq!(ctx.evidence_count(), 1);
        assert_eq!(ctx.digest()[0].name, "photos.zip");
    }

    #[tokio::test]
    async fn test_gather_unknown_case_is_not_found() {
        let (store, _, user_id) = seeded_store();
        let gatherer = ContextGatherer::new(store.clone(), store);

        let err = gatherer.gather(Uuid::new_v4(), user_id).await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_gather_foreign_case_is_not_found() {
        let (store, case_id, _) = seeded_store();
        let gatherer = ContextGatherer::new(store.clone(), store);

        let err = gatherer.gather(case_id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_agent_context_without_case() {
        let (store, _, user_id) = seeded_store();
        let gatherer = ContextGatherer::new(store.clone(), store);

        let ctx = gatherer
            .gather_for_agents(
                None,
                user_id,
                serde_json::json!({"summary": "dispute"}),
                "LTB".to_string(),
                "ON".to_string(),
            )
            .await
            .unwrap();

        assert!(ctx.evidence.is_empty());
        assert!(ctx.existing_analysis.is_none());
    }

    #[tokio::test]
    async fn test_agent_context_with_case_attaches_evidence() {
        let (store, case_id, user_id) = seeded_store();
        let gatherer = ContextGatherer::new(store.clone(), store);

        let ctx = gatherer
            .gather_for_agents(
                Some(case_id),
                user_id,
                serde_json::json!({}),
                "LTB".to_string(),
                "ON".to_string(),
            )
            .await
            .unwrap();

        assert_eq!(ctx.evidence.len(), 1);
    }
}
