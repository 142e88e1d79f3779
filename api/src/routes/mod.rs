//! API route definitions.
//!
//! This module organizes all HTTP routes for the fitreport API server.

mod health;
mod submit;

pub use health::{health_routes, Features, HealthResponse};
pub use submit::{submit_routes, SubmitResponse};
