//! Multi-agent case analysis pipeline
//!
//! Four specialist stages run in a fixed dependency order, each feeding
//! the next, with a final synthesis pass over whatever completed.

pub mod orchestrator;
pub mod stages;
pub mod synthesizer;

pub use orchestrator::{AgentOrchestrator, AgentResult, PipelineRun, StagePolicy};
pub use stages::{AgentRole, StageOutput};
pub use synthesizer::{synthesize, SynthesizedReport};
