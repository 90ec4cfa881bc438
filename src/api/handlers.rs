//! HTTP handlers for the analysis endpoints

use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

use crate::agents::{AgentOrchestrator, AgentRole};
use crate::api::models::{
    error_response, AnalyzeCaseRequest, AnalyzeCaseResponse, ApiError, MultiAgentRequest,
    MultiAgentResponse,
};
use crate::auth::TokenVerifier;
use crate::context::ContextGatherer;
use crate::error::{AnalysisError, FieldIssue};
use crate::metrics::METRICS;
use crate::precedent::PrecedentSearchClient;
use crate::scoring::{CacheDecision, ScoringEngine, StalenessGate};
use crate::store::PersistenceGateway;

type HandlerError = (StatusCode, Json<ApiError>);

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub verifier: TokenVerifier,
    pub gatherer: Arc<ContextGatherer>,
    pub precedents: Arc<PrecedentSearchClient>,
    pub scoring: Arc<ScoringEngine>,
    pub staleness: Arc<StalenessGate>,
    pub orchestrator: Arc<AgentOrchestrator>,
    pub gateway: Arc<dyn PersistenceGateway>,
    pub max_persisted_precedents: usize,
}

fn auth_header(headers: &HeaderMap) -> Option<&str> {
    headers.get("authorization").and_then(|v| v.to_str().ok())
}

/// Map a body-deserialization rejection to the 400 issue-list shape
/// instead of axum's default 422.
fn invalid_body(rejection: JsonRejection) -> HandlerError {
    error_response(AnalysisError::Validation(vec![body_issue(
        &rejection.body_text(),
    )]))
}

/// Pull the offending field out of the deserializer's path-annotated
/// message; unlocatable failures are reported against the body itself.
fn body_issue(text: &str) -> FieldIssue {
    let detail = text
        .rsplit_once("target type: ")
        .map(|(_, d)| d)
        .unwrap_or(text);

    if let Some(idx) = detail.find("missing field `") {
        let rest = &detail[idx + "missing field `".len()..];
        if let Some(field) = rest.split('`').next() {
            return FieldIssue::new(field, detail);
        }
    }

    let field = detail
        .split(':')
        .next()
        .map(str::trim)
        .filter(|f| {
            !f.is_empty()
                && f.chars()
                    .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'))
        })
        .unwrap_or("body");

    FieldIssue::new(field, detail)
}

/// Score a case against the precedent index
///
/// POST /api/v1/analysis/case-law
pub async fn analyze_case_law(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AnalyzeCaseRequest>, JsonRejection>,
) -> Result<Json<AnalyzeCaseResponse>, HandlerError> {
    let start = Instant::now();

    let user_id = state
        .verifier
        .verify(auth_header(&headers))
        .map_err(error_response)?;

    let Json(request) = payload.map_err(invalid_body)?;

    info!(case_id = %request.case_id, force_refresh = request.force_refresh, "scoring request");

    match state
        .staleness
        .check(
            state.gateway.as_ref(),
            request.case_id,
            user_id,
            request.force_refresh,
        )
        .await
        .map_err(error_response)?
    {
        CacheDecision::Hit(entry) => {
            METRICS.record_scoring("cached");
            METRICS
                .scoring_request_duration
                .observe(start.elapsed().as_secs_f64());
            return Ok(Json(AnalyzeCaseResponse::cached(entry.result)));
        }
        CacheDecision::Compute => {}
    }

    if !state.precedents.is_configured() {
        METRICS.record_scoring("degraded");
        METRICS.index_degraded.inc();
        return Ok(Json(AnalyzeCaseResponse::degraded()));
    }

    let ctx = state
        .gatherer
        .gather(request.case_id, user_id)
        .await
        .map_err(|e| {
            METRICS.record_scoring("error");
            error_response(e)
        })?;

    let precedents = state.precedents.search(&ctx).await;
    let precedents_found = precedents.len();

    let result = state.scoring.score(&ctx, precedents).await;

    let persisted = persist_analysis(&state, request.case_id, user_id, &result).await;
    if let Err(e) = persisted {
        METRICS.record_scoring("error");
        error!(case_id = %request.case_id, "failed to persist analysis: {}", e);
        return Err(error_response(e));
    }

    METRICS.record_scoring("fresh");
    METRICS
        .scoring_request_duration
        .observe(start.elapsed().as_secs_f64());

    Ok(Json(AnalyzeCaseResponse::fresh(result, precedents_found)))
}

async fn persist_analysis(
    state: &AppState,
    case_id: Uuid,
    user_id: Uuid,
    result: &crate::scoring::AnalysisResult,
) -> crate::error::Result<()> {
    let analysis_id = state.gateway.save_analysis(case_id, user_id, result).await?;

    let top: Vec<_> = result
        .similar_cases
        .iter()
        .take(state.max_persisted_precedents)
        .cloned()
        .collect();
    if !top.is_empty() {
        state.gateway.save_precedents(analysis_id, &top).await?;
    }

    state
        .gateway
        .update_case_merit_score(case_id, result.merit_score)
        .await
}

fn validate_multi_agent(request: &MultiAgentRequest) -> Result<Option<Vec<AgentRole>>, AnalysisError> {
    let mut issues = Vec::new();

    if request.case_type.trim().is_empty() {
        issues.push(FieldIssue::new("caseType", "must not be empty"));
    }
    if request.province.trim().is_empty() {
        issues.push(FieldIssue::new("province", "must not be empty"));
    }

    let roles = match &request.agents {
        None => None,
        Some(names) => {
            let mut roles = Vec::with_capacity(names.len());
            for name in names {
                match AgentRole::parse(name) {
                    Some(role) => roles.push(role),
                    None => issues.push(FieldIssue::new("agents", format!("unknown agent '{}'", name))),
                }
            }
            Some(roles)
        }
    };

    if issues.is_empty() {
        Ok(roles)
    } else {
        Err(AnalysisError::Validation(issues))
    }
}

/// Run the multi-agent analysis pipeline
///
/// POST /api/v1/analysis/agents
pub async fn run_agent_pipeline(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<MultiAgentRequest>, JsonRejection>,
) -> Result<Json<MultiAgentResponse>, HandlerError> {
    let user_id = state
        .verifier
        .verify(auth_header(&headers))
        .map_err(error_response)?;

    let Json(request) = payload.map_err(invalid_body)?;
    let roles = validate_multi_agent(&request).map_err(error_response)?;

    info!(
        case_type = %request.case_type,
        province = %request.province,
        has_case = request.case_id.is_some(),
        "agent pipeline request"
    );

    let ctx = state
        .gatherer
        .gather_for_agents(
            request.case_id,
            user_id,
            request.case_details.clone(),
            request.case_type.clone(),
            request.province.clone(),
        )
        .await
        .map_err(error_response)?;

    let run = state
        .orchestrator
        .run(&ctx, roles.as_deref())
        .await
        .map_err(error_response)?;

    if let Some(case_id) = request.case_id {
        state
            .gateway
            .save_pipeline_run(case_id, &run.report)
            .await
            .map_err(error_response)?;
    }

    Ok(Json(MultiAgentResponse::from_run(request.case_id, run)))
}

/// Liveness probe
///
/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Prometheus metrics export
///
/// GET /metrics
pub async fn metrics() -> Result<String, HandlerError> {
    METRICS.export().map_err(|e| {
        error!("metrics export failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(
                crate::api::models::error_codes::INTERNAL_ERROR,
                "metrics export failed",
            )),
        )
    })
}
