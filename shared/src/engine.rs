//! Metrics engine.
//!
//! Turns a [`MeasurementInput`] into a validated, rounded [`MetricsRecord`].
//! The engine performs no I/O; the only ambient input is the instant of
//! computation, supplied by an injected [`Clock`].

use crate::models::{BmiCategory, MeasurementInput, Metrics, MetricsRecord, Sex};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

/// Pounds to kilograms.
pub const KG_PER_LB: f64 = 0.453_592;

/// Errors produced while validating a submission.
///
/// Every variant is a client-side failure detected before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("Missing required fields: {0}")]
    MissingField(&'static str),

    /// The email address does not look like `local@domain.tld`.
    #[error("Email address is not valid")]
    InvalidEmail,

    /// Sex is neither `male` nor `female`.
    #[error("Sex must be 'male' or 'female'")]
    InvalidSex,

    /// A measurement is zero, negative, not finite, or so extreme that a
    /// derived metric overflows.
    #[error("All measurements must be positive numbers within range ({0} is not)")]
    InvalidMeasurement(&'static str),

    /// Waist does not exceed neck, so the body fat formula has no value.
    #[error("Waist must be larger than neck to estimate body fat")]
    UndefinedBodyFat,
}

impl ValidationError {
    /// Stable machine-readable code for the error kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidSex => "invalid_sex",
            Self::InvalidMeasurement(_) => "invalid_measurement",
            Self::UndefinedBodyFat => "undefined_body_fat",
        }
    }
}

/// Whether a deployment requires an email address on each submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmailPolicy {
    /// Email may be omitted; it is still checked when present.
    #[default]
    Optional,
    /// Email must be present.
    Required,
}

/// Source of the computation instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Computes metrics records from measurement submissions.
///
/// The engine holds no mutable state and can be shared across request
/// handlers freely.
///
/// # Example
///
/// ```
/// use shared::engine::MetricsEngine;
/// use shared::models::{BmiCategory, MeasurementInput};
///
/// let engine = MetricsEngine::new();
/// let input = MeasurementInput::new("Alex", "male", 180.0, 160.0, 85.0, 38.0);
/// let record = engine.compute(input).unwrap();
///
/// assert_eq!(record.weight_kg, 72.57);
/// assert_eq!(record.metrics.bmi_category, BmiCategory::Normal);
/// ```
#[derive(Clone)]
pub struct MetricsEngine {
    clock: Arc<dyn Clock>,
    email_policy: EmailPolicy,
}

impl MetricsEngine {
    /// Creates an engine using the system clock and optional email.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            email_policy: EmailPolicy::Optional,
        }
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the email policy.
    #[must_use]
    pub fn with_email_policy(mut self, policy: EmailPolicy) -> Self {
        self.email_policy = policy;
        self
    }

    /// Returns the configured email policy.
    #[must_use]
    pub fn email_policy(&self) -> EmailPolicy {
        self.email_policy
    }

    /// Validates the input and computes its metrics at the clock's current instant.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`ValidationError`] in this order: missing
    /// field, invalid email, invalid sex, invalid measurement, undefined body fat.
    pub fn compute(&self, input: MeasurementInput) -> Result<MetricsRecord, ValidationError> {
        self.compute_at(input, self.clock.now())
    }

    /// Validates the input and computes its metrics at the given instant.
    ///
    /// # Errors
    ///
    /// See [`MetricsEngine::compute`].
    pub fn compute_at(
        &self,
        input: MeasurementInput,
        timestamp: DateTime<Utc>,
    ) -> Result<MetricsRecord, ValidationError> {
        let valid = self.validate(&input)?;
        derive(valid, timestamp)
    }

    fn validate(&self, input: &MeasurementInput) -> Result<ValidInput, ValidationError> {
        let input = input.normalized();

        let name = input.name.clone().ok_or(ValidationError::MissingField("name"))?;
        if self.email_policy == EmailPolicy::Required && input.email.is_none() {
            return Err(ValidationError::MissingField("email"));
        }
        let sex = input.sex.as_deref().ok_or(ValidationError::MissingField("sex"))?;
        let height_cm = input
            .height_cm
            .ok_or(ValidationError::MissingField("height_cm"))?;
        let weight_lbs = input
            .weight_lbs
            .ok_or(ValidationError::MissingField("weight_lbs"))?;
        let waist_cm = input
            .waist_cm
            .ok_or(ValidationError::MissingField("waist_cm"))?;
        let neck_cm = input.neck_cm.ok_or(ValidationError::MissingField("neck_cm"))?;

        if let Err(errors) = input.validate() {
            if errors.field_errors().contains_key("email") {
                return Err(ValidationError::InvalidEmail);
            }
        }

        let sex = Sex::parse(sex).ok_or(ValidationError::InvalidSex)?;

        for (field, value) in [
            ("height_cm", height_cm),
            ("weight_lbs", weight_lbs),
            ("waist_cm", waist_cm),
            ("neck_cm", neck_cm),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValidationError::InvalidMeasurement(field));
            }
        }

        if sex == Sex::Male && waist_cm <= neck_cm {
            return Err(ValidationError::UndefinedBodyFat);
        }

        Ok(ValidInput {
            name,
            email: input.email,
            sex,
            height_cm,
            weight_lbs,
            waist_cm,
            neck_cm,
        })
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsEngine")
            .field("email_policy", &self.email_policy)
            .finish_non_exhaustive()
    }
}

struct ValidInput {
    name: String,
    email: Option<String>,
    sex: Sex,
    height_cm: f64,
    weight_lbs: f64,
    waist_cm: f64,
    neck_cm: f64,
}

/// Computes the derived metrics, rejecting inputs whose results leave the
/// finite range.
fn derive(
    input: ValidInput,
    timestamp: DateTime<Utc>,
) -> Result<MetricsRecord, ValidationError> {
    let weight_kg = input.weight_lbs * KG_PER_LB;
    let height_m = input.height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    let waist_height_ratio = input.waist_cm / input.height_cm;

    let body_fat_percentage = match input.sex {
        Sex::Male => Some(round2(navy_body_fat(
            input.waist_cm,
            input.neck_cm,
            input.height_cm,
        ))),
        Sex::Female => None,
    };

    let metrics = Metrics {
        bmi: round2(bmi),
        bmi_category: BmiCategory::from_bmi(bmi),
        waist_height_ratio: round2(waist_height_ratio),
        body_fat_percentage,
    };
    let weight_kg = round2(weight_kg);

    // Checked after rounding: scaling by 100 can overflow on its own.
    for (field, value) in [
        ("weight_lbs", weight_kg),
        ("height_cm", metrics.bmi),
        ("waist_cm", metrics.waist_height_ratio),
        ("height_cm", metrics.body_fat_percentage.unwrap_or_default()),
    ] {
        if !value.is_finite() {
            return Err(ValidationError::InvalidMeasurement(field));
        }
    }

    Ok(MetricsRecord {
        name: input.name,
        email: input.email,
        sex: input.sex,
        height_cm: input.height_cm,
        weight_lbs: input.weight_lbs,
        weight_kg,
        waist_cm: input.waist_cm,
        neck_cm: input.neck_cm,
        metrics,
        timestamp,
    })
}

/// US Navy body fat estimate for males. Requires `waist_cm > neck_cm`.
#[must_use]
pub fn navy_body_fat(waist_cm: f64, neck_cm: f64, height_cm: f64) -> f64 {
    86.010 * (waist_cm - neck_cm).log10() - 70.041 * height_cm.log10() + 36.76
}

/// Rounds to two decimals, halves away from zero.
///
/// # Examples
///
/// ```
/// use shared::engine::round2;
///
/// assert_eq!(round2(22.404), 22.4);
/// assert_eq!(round2(-1.005_1), -1.01);
/// ```
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
