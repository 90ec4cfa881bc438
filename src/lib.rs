//! Legal case analysis pipeline
//!
//! Two analysis paths over stored cases: precedent-backed merit scoring
//! with a 24-hour reuse window and a deterministic fallback, and a
//! four-stage multi-agent pipeline with final synthesis.

pub mod agents;
pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod precedent;
pub mod reasoning;
pub mod scoring;
pub mod store;

pub use config::Config;
pub use error::{AnalysisError, Result};
