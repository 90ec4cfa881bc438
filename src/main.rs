use anyhow::Context;
use case_analysis::agents::{AgentOrchestrator, StagePolicy};
use case_analysis::api::{build_router, AppState};
use case_analysis::auth::TokenVerifier;
use case_analysis::config::Config;
use case_analysis::context::ContextGatherer;
use case_analysis::precedent::PrecedentSearchClient;
use case_analysis::reasoning::ReasoningClient;
use case_analysis::scoring::{ScoringEngine, StalenessGate};
use case_analysis::store::InMemoryStore;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::load().context("failed to load configuration")?;

    let store = Arc::new(InMemoryStore::new());
    let reasoning = Arc::new(
        ReasoningClient::new(config.reasoning.clone()).context("reasoning client init failed")?,
    );

    let state = AppState {
        verifier: TokenVerifier::new(&config.auth),
        gatherer: Arc::new(ContextGatherer::new(store.clone(), store.clone())),
        precedents: Arc::new(
            PrecedentSearchClient::new(config.precedent.clone())
                .context("precedent client init failed")?,
        ),
        scoring: Arc::new(ScoringEngine::new(reasoning.clone())),
        staleness: Arc::new(StalenessGate::new(config.analysis.staleness_window())),
        orchestrator: Arc::new(AgentOrchestrator::new(
            reasoning,
            StagePolicy {
                max_retries: config.analysis.stage_retries,
            },
        )),
        gateway: store,
        max_persisted_precedents: config.analysis.max_persisted_precedents,
    };

    let router = build_router(state, &config.server);

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(addr = %addr, "case analysis service listening");

    axum::serve(listener, router)
        .await
        .context("server error")?;

    Ok(())
}
