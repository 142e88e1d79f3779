//! Fitreport Shared Library
//!
//! This crate contains the metrics engine, data models, report rendering and
//! the persistence and notification collaborators used by the fitreport
//! server and CLI.
//!
//! # Modules
//!
//! - [`models`] - Measurement input and derived metrics record
//! - [`engine`] - Validation and metrics computation
//! - [`report`] - Plain-text report rendering
//! - [`storage`] - Report persistence
//! - [`notify`] - Report delivery
//!
//! # Example
//!
//! ```
//! use shared::engine::MetricsEngine;
//! use shared::models::MeasurementInput;
//! use shared::report::render_report;
//!
//! let input = MeasurementInput::new("Alex", "male", 180.0, 160.0, 85.0, 38.0);
//! let record = MetricsEngine::new().compute(input).unwrap();
//!
//! assert_eq!(record.metrics.bmi, 22.4);
//! assert!(render_report(&record).contains("Body Fat Percentage: 22.62%"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod engine;
pub mod models;
pub mod notify;
pub mod report;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
