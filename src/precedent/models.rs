//! Data models for precedent search

use serde::{Deserialize, Serialize};

/// Relevance assigned to the first retrieved precedent
pub const TOP_RELEVANCE: i32 = 100;
/// Relevance decrease per retrieval position
pub const RELEVANCE_STEP: i32 = 5;

/// A prior decided matter retrieved from the external precedent index.
/// Ephemeral per request unless persisted alongside an analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Precedent {
    pub title: String,
    pub citation: String,
    pub court: String,
    pub date: String,
    pub url: String,
    #[serde(default)]
    pub summary: String,
    /// Monotonically decreasing by retrieval position
    pub relevance: i32,
}

impl Precedent {
    /// Relevance derived from retrieval order: first result scores 100,
    /// decreasing by a fixed step per position.
    pub fn relevance_for_position(position: usize) -> i32 {
        TOP_RELEVANCE - (position as i32) * RELEVANCE_STEP
    }
}
