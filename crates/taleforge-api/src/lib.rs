//! Taleforge API — HTTP transport adapter.
//!
//! Thin axum layer over the job orchestrator and query services: request
//! and response mapping, session-cookie issuance, and error-to-status
//! translation.

pub mod error;
pub mod routes;
pub mod state;
