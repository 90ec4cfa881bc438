//! Cache/staleness decisions for prior analyses
//!
//! A prior analysis may be served only when the caller accepts cached
//! results (`force_refresh == false`) and the entry is younger than the
//! staleness window. Entries are never mutated; a fresh computation
//! always creates a new row.

use crate::error::Result;
use crate::store::{PersistenceGateway, StoredAnalysis};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

/// Outcome of a cache lookup
#[derive(Debug)]
pub enum CacheDecision {
    /// Reusable prior analysis within the window
    Hit(StoredAnalysis),
    /// No reusable entry; compute fresh
    Compute,
}

pub struct StalenessGate {
    window: Duration,
}

impl StalenessGate {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Whether an entry created at `created_at` is still fresh at `now`
    pub fn is_fresh(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - created_at < self.window
    }

    /// Look up the most recent prior analysis and decide whether it can
    /// be returned in place of a fresh computation.
    pub async fn check(
        &self,
        gateway: &dyn PersistenceGateway,
        case_id: Uuid,
        user_id: Uuid,
        force_refresh: bool,
    ) -> Result<CacheDecision> {
        if force_refresh {
            return Ok(CacheDecision::Compute);
        }

        match gateway.load_latest_analysis(case_id, user_id).await? {
            Some(entry) if self.is_fresh(entry.created_at, Utc::now()) => {
                debug!(case_id = %case_id, "returning cached analysis");
                Ok(CacheDecision::Hit(entry))
            }
            _ => Ok(CacheDecision::Compute),
        }
    }
}
