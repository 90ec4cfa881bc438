//! End-to-end scenarios for the multi-agent endpoint, driven through
//! the real router with a mocked reasoning backend. Stage responses are
//! matched on the role-specific system prompt.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Duration;
use mockito::{Matcher, Server, ServerGuard};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use case_analysis::agents::{AgentOrchestrator, StagePolicy};
use case_analysis::api::{build_router, AppState};
use case_analysis::auth::TokenVerifier;
use case_analysis::config::{AuthConfig, PrecedentConfig, ReasoningConfig, ServerConfig};
use case_analysis::context::{CaseRecord, ContextGatherer, Venue};
use case_analysis::precedent::PrecedentSearchClient;
use case_analysis::reasoning::ReasoningClient;
use case_analysis::scoring::{ScoringEngine, StalenessGate};
use case_analysis::store::InMemoryStore;

fn verifier() -> TokenVerifier {
    TokenVerifier::new(&AuthConfig {
        shared_secret: Some(SecretString::new("test-secret".to_string())),
    })
}

fn app(store: Arc<InMemoryStore>, backend_url: &str) -> Router {
    let reasoning = Arc::new(
        ReasoningClient::new(ReasoningConfig {
            api_url: backend_url.to_string(),
            api_key: Some(SecretString::new("backend-key".to_string())),
            retry_attempts: 0,
            ..ReasoningConfig::default()
        })
        .unwrap(),
    );
    let state = AppState {
        verifier: verifier(),
        gatherer: Arc::new(ContextGatherer::new(store.clone(), store.clone())),
        precedents: Arc::new(PrecedentSearchClient::new(PrecedentConfig::default()).unwrap()),
        scoring: Arc::new(ScoringEngine::new(reasoning.clone())),
        staleness: Arc::new(StalenessGate::new(Duration::hours(24))),
        orchestrator: Arc::new(AgentOrchestrator::new(reasoning, StagePolicy::default())),
        gateway: store,
        max_persisted_precedents: 5,
    };
    build_router(state, &ServerConfig::default())
}

async fn post_agents(router: Router, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/analysis/agents")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let response = router
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

fn chat_content(content: &str) -> String {
    json!({
        "choices": [{ "message": { "content": content } }]
    })
    .to_string()
}

/// Mount a stage mock keyed on the role-specific system prompt phrase.
async fn mock_stage(server: &mut ServerGuard, phrase: &str, content: String) -> mockito::Mock {
    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex(phrase.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_content(&content))
        .create_async()
        .await
}

fn research_json() -> String {
    json!({
        "relevantStatutes": [
            { "name": "RTA 2006", "sections": ["s.20"], "application": "repair duty" }
        ],
        "keyPrecedents": [
            { "citation": "2023 ONLTB 1234", "court": "LTB", "outcome": "tenant won", "relevance": "same facts" }
        ],
        "proceduralRequirements": [],
        "keyIssues": ["maintenance obligation"],
        "researchSummary": "Strong statutory basis."
    })
    .to_string()
}

fn analysis_json() -> String {
    json!({
        "meritScore": 72,
        "confidence": "high",
        "successProbability": "70%",
        "strengths": [{ "factor": "documented damage", "impact": "high", "evidence": "photos" }],
        "weaknesses": [],
        "evidenceAssessment": { "quality": "adequate", "gaps": ["no lease copy"], "recommendations": [] },
        "riskFactors": [],
        "analysisSummary": "Favourable on the merits."
    })
    .to_string()
}

fn strategy_json() -> String {
    json!({
        "primaryStrategy": {
            "approach": "file T6",
            "rationale": "clear breach",
            "timeline": "2 months",
            "estimatedCost": "$53"
        },
        "alternativeStrategies": [],
        "actionPlan": (1..=6).map(|i| json!({
            "step": i,
            "action": format!("action {}", i),
            "deadline": "soon",
            "priority": "high",
            "resources": "none"
        })).collect::<Vec<_>>(),
        "negotiationStrategy": { "leverage": ["rent abatement"], "targets": "50% abatement", "walkAwayPoint": "hearing" },
        "contingencyPlans": [],
        "strategySummary": "File and negotiate."
    })
    .to_string()
}

fn drafting_json() -> String {
    json!({
        "requiredDocuments": [
            { "name": "T6 Application", "form": "T6", "deadline": "1 year", "priority": "high", "description": "maintenance application" }
        ],
        "documentOutlines": [],
        "keyArguments": [
            { "argument": "breach of s.20", "support": "photos", "anticipatedResponse": "tenant caused damage" }
        ],
        "filingInstructions": { "where": "LTB", "how": "online", "fees": "$53", "copies": "2" },
        "draftingSummary": "Prepare the T6."
    })
    .to_string()
}

#[tokio::test]
async fn test_full_chain_runs_in_order_and_synthesizes() {
    let mut server = Server::new_async().await;
    mock_stage(&mut server, "legal research specialist", research_json()).await;
    mock_stage(&mut server, "legal case analyst", analysis_json()).await;
    mock_stage(&mut server, "legal strategist", strategy_json()).await;
    mock_stage(&mut server, "legal document drafter", drafting_json()).await;

    let store = Arc::new(InMemoryStore::new());
    let router = app(store, &server.url());
    let token = verifier().mint(Uuid::new_v4()).unwrap();

    let (status, body) = post_agents(
        router,
        Some(&token),
        json!({
            "caseDetails": { "summary": "landlord refused repairs" },
            "caseType": "LTB",
            "province": "ON",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["caseId"], "no-case");

    let agents = body["agents"].as_array().unwrap();
    let order: Vec<&str> = agents.iter().map(|a| a["agent"].as_str().unwrap()).collect();
    assert_eq!(order, vec!["researcher", "analyst", "strategist", "drafter"]);

    let report = &body["finalAnalysis"];
    assert_eq!(report["meritScore"], 72);
    assert_eq!(report["confidence"], "high");
    assert_eq!(report["successProbability"], "70%");
    assert_eq!(report["relevantLaws"][0]["name"], "RTA 2006");
    assert_eq!(report["evidenceGaps"][0], "no lease copy");
    assert_eq!(report["primaryStrategy"]["approach"], "file T6");
    assert_eq!(report["requiredDocuments"][0]["form"], "T6");
    // next steps are capped at the first five action items
    assert_eq!(report["nextSteps"].as_array().unwrap().len(), 5);
    assert!(report["summary"].as_str().unwrap().contains("Strong statutory basis."));
    assert!(body["totalDuration"].is_number());
}

#[tokio::test]
async fn test_subset_is_normalized_into_fixed_order() {
    let mut server = Server::new_async().await;
    mock_stage(&mut server, "legal research specialist", research_json()).await;
    let drafter = mock_stage(&mut server, "legal document drafter", drafting_json()).await;

    let store = Arc::new(InMemoryStore::new());
    let router = app(store, &server.url());
    let token = verifier().mint(Uuid::new_v4()).unwrap();

    let (status, body) = post_agents(
        router,
        Some(&token),
        json!({
            "caseDetails": {},
            "caseType": "LTB",
            "province": "ON",
            "agents": ["drafter", "researcher"],
        }),
    )
    .await;

    drafter.assert_async().await;
    assert_eq!(status, StatusCode::OK);

    let agents = body["agents"].as_array().unwrap();
    let order: Vec<&str> = agents.iter().map(|a| a["agent"].as_str().unwrap()).collect();
    assert_eq!(order, vec!["researcher", "drafter"]);

    // analyst never ran, so the report keeps its defaults
    assert_eq!(body["finalAnalysis"]["meritScore"], 50);
    assert_eq!(body["finalAnalysis"]["successProbability"], "Unknown");
}

#[tokio::test]
async fn test_fenced_json_response_is_extracted() {
    let mut server = Server::new_async().await;
    let fenced = format!("Here are my findings:\n```json\n{}\n```\nLet me know.", research_json());
    mock_stage(&mut server, "legal research specialist", fenced).await;

    let store = Arc::new(InMemoryStore::new());
    let router = app(store, &server.url());
    let token = verifier().mint(Uuid::new_v4()).unwrap();

    let (status, body) = post_agents(
        router,
        Some(&token),
        json!({
            "caseDetails": {},
            "caseType": "LTB",
            "province": "ON",
            "agents": ["researcher"],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agents"][0]["output"]["relevantStatutes"][0]["name"], "RTA 2006");
}

#[tokio::test]
async fn test_stage_failure_aborts_the_run() {
    let mut server = Server::new_async().await;
    mock_stage(&mut server, "legal research specialist", research_json()).await;
    server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("legal case analyst".to_string()))
        .with_status(500)
        .create_async()
        .await;
    let drafter = mock_stage(&mut server, "legal document drafter", drafting_json()).await;

    let store = Arc::new(InMemoryStore::new());
    let router = app(store, &server.url());
    let token = verifier().mint(Uuid::new_v4()).unwrap();

    let (status, body) = post_agents(
        router,
        Some(&token),
        json!({
            "caseDetails": {},
            "caseType": "LTB",
            "province": "ON",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "UPSTREAM_ERROR");
    // later stages never run
    assert!(!drafter.matched_async().await);
}

#[tokio::test]
async fn test_unknown_agent_name_is_rejected() {
    let server = Server::new_async().await;
    let store = Arc::new(InMemoryStore::new());
    let router = app(store, &server.url());
    let token = verifier().mint(Uuid::new_v4()).unwrap();

    let (status, body) = post_agents(
        router,
        Some(&token),
        json!({
            "caseDetails": {},
            "caseType": "LTB",
            "province": "ON",
            "agents": ["judge"],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"][0]["field"], "agents");
}

#[tokio::test]
async fn test_missing_case_details_is_field_level_validation_error() {
    let server = Server::new_async().await;
    let store = Arc::new(InMemoryStore::new());
    let router = app(store, &server.url());
    let token = verifier().mint(Uuid::new_v4()).unwrap();

    let (status, body) = post_agents(
        router,
        Some(&token),
        json!({ "caseType": "LTB", "province": "ON" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"][0]["field"], "caseDetails");
}

#[tokio::test]
async fn test_blank_case_type_is_rejected() {
    let server = Server::new_async().await;
    let store = Arc::new(InMemoryStore::new());
    let router = app(store, &server.url());
    let token = verifier().mint(Uuid::new_v4()).unwrap();

    let (status, body) = post_agents(
        router,
        Some(&token),
        json!({
            "caseDetails": {},
            "caseType": "",
            "province": "ON",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_referenced_case_persists_the_run() {
    let mut server = Server::new_async().await;
    mock_stage(&mut server, "legal research specialist", research_json()).await;

    let store = Arc::new(InMemoryStore::new());
    let user_id = Uuid::new_v4();
    let case = CaseRecord {
        id: Uuid::new_v4(),
        user_id,
        venue: Some(Venue::Ltb),
        province: Some("ON".to_string()),
        description: Some("repair dispute".to_string()),
        merit_score: None,
    };
    let case_id = case.id;
    store.insert_case(case);

    let router = app(store.clone(), &server.url());
    let token = verifier().mint(user_id).unwrap();

    let (status, body) = post_agents(
        router,
        Some(&token),
        json!({
            "caseId": case_id,
            "caseDetails": {},
            "caseType": "LTB",
            "province": "ON",
            "agents": ["researcher"],
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["caseId"], case_id.to_string());
    assert_eq!(store.pipeline_runs_for(case_id).len(), 1);
}

#[tokio::test]
async fn test_unknown_case_reference_is_not_found() {
    let server = Server::new_async().await;
    let store = Arc::new(InMemoryStore::new());
    let router = app(store, &server.url());
    let token = verifier().mint(Uuid::new_v4()).unwrap();

    let (status, body) = post_agents(
        router,
        Some(&token),
        json!({
            "caseId": Uuid::new_v4(),
            "caseDetails": {},
            "caseType": "LTB",
            "province": "ON",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_missing_credential_is_unauthorized() {
    let server = Server::new_async().await;
    let store = Arc::new(InMemoryStore::new());
    let router = app(store, &server.url());

    let (status, _) = post_agents(
        router,
        None,
        json!({ "caseDetails": {}, "caseType": "LTB", "province": "ON" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
