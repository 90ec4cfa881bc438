//! HTTP API for case analysis

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::AppState;
pub use models::error_codes;
pub use routes::build_router;
