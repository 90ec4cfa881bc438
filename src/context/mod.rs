//! Case context gathering for the analysis pipelines

pub mod gatherer;
pub mod models;

pub use gatherer::ContextGatherer;
pub use models::*;
