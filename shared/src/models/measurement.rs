//! Measurement input model.
//!
//! Defines the `MeasurementInput` payload submitted by a user and the `Sex`
//! enumeration it is normalized into.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

/// Pattern an email address must match: `local@domain.tld`, no whitespace.
pub static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Biological sex used to select formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Male; body fat percentage is computed.
    Male,
    /// Female; body fat percentage is not defined.
    Female,
}

impl Sex {
    /// Parses a sex value case-insensitively, ignoring surrounding whitespace.
    ///
    /// Returns `None` for anything other than `male` or `female`.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::models::Sex;
    ///
    /// assert_eq!(Sex::parse("MALE"), Some(Sex::Male));
    /// assert_eq!(Sex::parse(" Female "), Some(Sex::Female));
    /// assert_eq!(Sex::parse("other"), None);
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
        }
    }
}

/// A body measurement submission as received from a caller.
///
/// Every field is optional at the type level so that a missing value is
/// reported as a missing field rather than a decode failure.
///
/// # Example
///
/// ```
/// use shared::models::MeasurementInput;
///
/// let input = MeasurementInput::new("Alex", "male", 180.0, 160.0, 85.0, 38.0)
///     .with_email("alex@example.com");
///
/// assert_eq!(input.name.as_deref(), Some("Alex"));
/// assert_eq!(input.height_cm, Some(180.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct MeasurementInput {
    /// Display name of the person measured.
    #[serde(default)]
    pub name: Option<String>,

    /// Contact address, required only when the deployment asks for it.
    #[serde(default)]
    #[validate(regex(path = *EMAIL_PATTERN))]
    pub email: Option<String>,

    /// Sex as free text, normalized during validation.
    #[serde(default)]
    pub sex: Option<String>,

    /// Height in centimeters.
    #[serde(default)]
    pub height_cm: Option<f64>,

    /// Weight in pounds.
    #[serde(default)]
    pub weight_lbs: Option<f64>,

    /// Waist circumference in centimeters.
    #[serde(default)]
    pub waist_cm: Option<f64>,

    /// Neck circumference in centimeters.
    #[serde(default)]
    pub neck_cm: Option<f64>,
}

impl MeasurementInput {
    /// Creates a complete input without an email address.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        sex: impl Into<String>,
        height_cm: f64,
        weight_lbs: f64,
        waist_cm: f64,
        neck_cm: f64,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: None,
            sex: Some(sex.into()),
            height_cm: Some(height_cm),
            weight_lbs: Some(weight_lbs),
            waist_cm: Some(waist_cm),
            neck_cm: Some(neck_cm),
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns a copy with text fields trimmed and blank text treated as absent.
    #[must_use]
    pub fn normalized(&self) -> Self {
        fn clean(value: Option<&String>) -> Option<String> {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            name: clean(self.name.as_ref()),
            email: clean(self.email.as_ref()),
            sex: clean(self.sex.as_ref()),
            ..self.clone()
        }
    }
}
