//! Data models for case context

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of the OCR excerpt carried into agent prompts
const OCR_PREVIEW_LEN: usize = 300;

/// Venue / category of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Venue {
    Ltb,
    Hrto,
    SmallClaims,
    Family,
    Criminal,
    Labour,
}

impl Venue {
    /// Fixed keyword set used to seed precedent searches
    pub fn search_keywords(&self) -> &'static str {
        match self {
            Venue::Ltb => "landlord tenant residential tenancy eviction maintenance",
            Venue::Hrto => "human rights discrimination employment harassment",
            Venue::SmallClaims => "small claims damages contract breach",
            Venue::Family => "family custody support divorce separation",
            Venue::Criminal => "criminal offence charge",
            Venue::Labour => "employment termination wrongful dismissal",
        }
    }

    /// Venues that receive the accessibility bonus in deterministic scoring
    pub fn is_accessible(&self) -> bool {
        matches!(self, Venue::Ltb | Venue::SmallClaims)
    }
}

/// A case record, owned by the case-management subsystem.
/// This core reads it and writes back only the merit score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub venue: Option<Venue>,
    pub province: Option<String>,
    pub description: Option<String>,
    pub merit_score: Option<u8>,
}

impl CaseRecord {
    pub fn description_len(&self) -> usize {
        self.description.as_deref().map(str::len).unwrap_or(0)
    }
}

/// A piece of evidence attached to a case. Read-only to this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: Uuid,
    pub case_id: Uuid,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Extracted text excerpt, e.g. from OCR
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Truncated evidence entry fed to downstream stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceDigest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_preview: Option<String>,
}

impl EvidenceDigest {
    pub fn from_item(item: &EvidenceItem) -> Self {
        Self {
            name: item.label.clone(),
            description: item.description.clone(),
            tags: item.tags.clone(),
            ocr_preview: item
                .extracted_text
                .as_deref()
                .map(|t| t.chars().take(OCR_PREVIEW_LEN).collect()),
        }
    }
}

/// Normalized context for the precedent-scoring path
#[derive(Debug, Clone)]
pub struct CaseContext {
    pub case: CaseRecord,
    pub evidence: Vec<EvidenceItem>,
}

impl CaseContext {
    pub fn evidence_count(&self) -> usize {
        self.evidence.len()
    }

    pub fn digest(&self) -> Vec<EvidenceDigest> {
        self.evidence.iter().map(EvidenceDigest::from_item).collect()
    }
}

/// Normalized context for the multi-agent path.
/// `details` comes straight from the request; evidence and the prior
/// analysis are attached when the request references a stored case.
#[derive(Debug, Clone, Serialize)]
pub struct AgentContext {
    pub details: serde_json::Value,
    pub case_type: String,
    pub province: String,
    pub evidence: Vec<EvidenceDigest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_analysis: Option<serde_json::Value>,
}
