//! Data models for fitreport.
//!
//! This module contains the measurement input submitted by callers and the
//! derived metrics record.

pub mod measurement;
pub mod record;

pub use measurement::{MeasurementInput, Sex, EMAIL_PATTERN};
pub use record::{BmiCategory, Metrics, MetricsRecord};
