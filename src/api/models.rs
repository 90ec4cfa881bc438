//! API request/response models and the wire error shape

use crate::agents::{AgentRole, PipelineRun, StageOutput, SynthesizedReport};
use crate::error::{AnalysisError, FieldIssue};
use crate::scoring::AnalysisResult;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable error codes returned to clients
pub mod error_codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Wire error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldIssue>>,
}

impl ApiError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }
}

/// Map a domain error to its HTTP status and wire body. Internal and
/// upstream messages are not leaked to clients.
pub fn error_response(err: AnalysisError) -> (StatusCode, Json<ApiError>) {
    match err {
        AnalysisError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new(error_codes::UNAUTHORIZED, "Unauthorized")),
        ),
        AnalysisError::Validation(issues) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                code: error_codes::VALIDATION_ERROR.to_string(),
                message: "Invalid request".to_string(),
                details: Some(issues),
            }),
        ),
        AnalysisError::NotFound(what) => (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                error_codes::NOT_FOUND,
                format!("{} not found", what),
            )),
        ),
        AnalysisError::Upstream(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(
                error_codes::UPSTREAM_ERROR,
                "Upstream service error",
            )),
        ),
        AnalysisError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(
                error_codes::INTERNAL_ERROR,
                "Internal server error",
            )),
        ),
    }
}

// ---------------------------------------------------------------------------
// Precedent scoring endpoint

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCaseRequest {
    pub case_id: Uuid,
    #[serde(default)]
    pub force_refresh: bool,
}

/// Scoring response. The degraded variant is a deliberate 200: the
/// client falls back to its local assessment rather than treating a
/// missing index credential as a failure.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalyzeCaseResponse {
    #[serde(rename_all = "camelCase")]
    Ready {
        success: bool,
        analysis: AnalysisResult,
        cached: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        precedents_found: Option<usize>,
    },
    #[serde(rename_all = "camelCase")]
    Degraded {
        success: bool,
        error: String,
        fallback: bool,
        message: String,
    },
}

impl AnalyzeCaseResponse {
    pub fn cached(analysis: AnalysisResult) -> Self {
        AnalyzeCaseResponse::Ready {
            success: true,
            analysis,
            cached: true,
            precedents_found: None,
        }
    }

    pub fn fresh(analysis: AnalysisResult, precedents_found: usize) -> Self {
        AnalyzeCaseResponse::Ready {
            success: true,
            analysis,
            cached: false,
            precedents_found: Some(precedents_found),
        }
    }

    pub fn degraded() -> Self {
        AnalyzeCaseResponse::Degraded {
            success: false,
            error: "Precedent index not configured".to_string(),
            fallback: true,
            message: "Precedent-based analysis is not available. \
                      Please contact support to enable this feature."
                .to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Multi-agent endpoint

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiAgentRequest {
    #[serde(default)]
    pub case_id: Option<Uuid>,
    pub case_details: serde_json::Value,
    pub case_type: String,
    pub province: String,
    #[serde(default)]
    pub agents: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResultBody {
    pub agent: AgentRole,
    pub output: StageOutput,
    pub duration: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiAgentResponse {
    pub success: bool,
    pub case_id: String,
    pub agents: Vec<AgentResultBody>,
    pub final_analysis: SynthesizedReport,
    pub total_duration: u64,
}

impl MultiAgentResponse {
    pub fn from_run(case_id: Option<Uuid>, run: PipelineRun) -> Self {
        Self {
            success: true,
            case_id: case_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "no-case".to_string()),
            agents: run
                .results
                .into_iter()
                .map(|r| AgentResultBody {
                    agent: r.agent,
                    output: r.output,
                    duration: r.duration_ms,
                })
                .collect(),
            final_analysis: run.report,
            total_duration: run.total_duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::OutcomePrediction;

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            merit_score: 70,
            confidence: 0.75,
            outcome_prediction: OutcomePrediction::Favorable,
            strengths: vec![],
            weaknesses: vec![],
            recommendations: vec![],
            legal_basis: String::new(),
            similar_cases: vec![],
        }
    }

    #[test]
    fn test_degraded_shape() {
        let body = serde_json::to_value(AnalyzeCaseResponse::degraded()).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["fallback"], true);
        assert!(body["error"].is_string());
        assert!(body["message"].is_string());
    }

    #[test]
    fn test_cached_response_omits_precedent_count() {
        let body = serde_json::to_value(AnalyzeCaseResponse::cached(analysis())).unwrap();
        assert_eq!(body["cached"], true);
        assert!(body.get("precedentsFound").is_none());
    }

    #[test]
    fn test_fresh_response_includes_precedent_count() {
        let body = serde_json::to_value(AnalyzeCaseResponse::fresh(analysis(), 7)).unwrap();
        assert_eq!(body["cached"], false);
        assert_eq!(body["precedentsFound"], 7);
    }

    #[test]
    fn test_request_defaults() {
        let req: AnalyzeCaseRequest = serde_json::from_value(serde_json::json!({
            "caseId": Uuid::new_v4().to_string(),
        }))
        .unwrap();
        assert!(!req.force_refresh);
    }

    #[test]
    fn test_error_response_hides_internals() {
        let (status, body) =
            error_response(AnalysisError::Internal("db password wrong".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.0.message.contains("password"));
    }

    #[test]
    fn test_validation_error_carries_details() {
        let (status, body) = error_response(AnalysisError::invalid("caseType", "required"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0.details.as_ref().unwrap()[0].field, "caseType");
    }
}
