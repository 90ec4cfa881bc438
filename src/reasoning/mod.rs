//! Client for the generative reasoning backend

pub mod client;
pub mod extract;

pub use client::{ReasoningClient, ReasoningError};
