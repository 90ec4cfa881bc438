//! Precedent index client
//!
//! Searches the external legal-precedent index. Precedent search is
//! best-effort, not a hard dependency: any transport error or non-success
//! response yields an empty result set, never a request failure.

use super::models::Precedent;
use super::query;
use crate::config::PrecedentConfig;
use crate::context::CaseContext;
use crate::error::{AnalysisError, Result};
use crate::metrics::METRICS;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub struct PrecedentSearchClient {
    http: Client,
    config: PrecedentConfig,
}

#[derive(Debug, Deserialize)]
struct BrowseResponse {
    #[serde(default)]
    cases: Vec<BrowseCase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrowseCase {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    citation: Option<String>,
    #[serde(default)]
    database_id: Option<String>,
    #[serde(default)]
    court: Option<String>,
    #[serde(default)]
    decision_date: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

impl PrecedentSearchClient {
    pub fn new(config: PrecedentConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AnalysisError::Internal(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Whether an access credential is available. When false the scoring
    /// handler answers in degraded mode instead of searching.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Search the index for precedents relevant to the case. Returns an
    /// empty vec on any failure.
    pub async fn search(&self, ctx: &CaseContext) -> Vec<Precedent> {
        let search_query = query::build_search_query(ctx);
        let jurisdiction = query::jurisdiction_code(ctx.case.province.as_deref());

        let prefix: String = search_query.chars().take(50).collect();
        debug!(jurisdiction, query_prefix = %prefix, "searching precedent index");

        match self.try_search(&search_query, jurisdiction).await {
            Ok(precedents) => {
                METRICS.record_index_search(true, precedents.len());
                debug!(found = precedents.len(), "precedent search completed");
                precedents
            }
            Err(e) => {
                METRICS.record_index_search(false, 0);
                warn!("precedent search failed, continuing without precedents: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_search(&self, search_query: &str, jurisdiction: &str) -> Result<Vec<Precedent>> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| AnalysisError::Upstream("precedent index not configured".into()))?;

        let url = format!("{}/caseBrowse/{}/en/", self.config.api_url, jurisdiction);

        let mut attempt = 0;
        let body: BrowseResponse = loop {
            attempt += 1;

            let result = self
                .http
                .get(&url)
                .query(&[
                    ("api_key", api_key.expose_secret().as_str()),
                    ("resultCount", &self.config.max_results.to_string()),
                    ("search", search_query),
                ])
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        break response
                            .json()
                            .await
                            .map_err(|e| AnalysisError::Upstream(e.to_string()))?;
                    }
                    // 4xx is not transient, fail immediately
                    if status.is_client_error() || attempt > self.config.retry_attempts {
                        return Err(AnalysisError::Upstream(format!(
                            "precedent index returned {}",
                            status
                        )));
                    }
                    warn!(attempt, status = %status, "precedent search retrying");
                }
                Err(e) => {
                    if attempt > self.config.retry_attempts {
                        return Err(AnalysisError::Upstream(e.to_string()));
                    }
                    warn!(attempt, "precedent search transport error, retrying: {}", e);
                }
            }

            tokio::time::sleep(self.backoff(attempt)).await;
        };

        Ok(body
            .cases
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let database_id = c.database_id.unwrap_or_default();
                Precedent {
                    title: c.title.unwrap_or_else(|| "Untitled Case".to_string()),
                    citation: c
                        .citation
                        .or_else(|| Some(database_id.clone()).filter(|s| !s.is_empty()))
                        .unwrap_or_else(|| "N/A".to_string()),
                    court: c.court.unwrap_or_else(|| "Unknown Court".to_string()),
                    date: c.decision_date.unwrap_or_else(|| "Unknown".to_string()),
                    url: c.url.unwrap_or_else(|| {
                        format!("https://www.canlii.org/en/{}/{}", jurisdiction, database_id)
                    }),
                    summary: c.summary.unwrap_or_default(),
                    relevance: Precedent::relevance_for_position(i),
                }
            })
            .take(self.config.max_results)
            .collect())
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let multiplier = 2_u32.pow(attempt.saturating_sub(1) as u32);
        self.config.retry_backoff().saturating_mul(multiplier)
    }
}
