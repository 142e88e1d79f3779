//! Metrics record model.
//!
//! Defines the derived `MetricsRecord` produced by the metrics engine and the
//! `Metrics` sub-object exposed to API callers.

use super::measurement::Sex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// BMI classification band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BmiCategory {
    /// BMI below 18.5.
    Underweight,
    /// BMI from 18.5 up to (not including) 25.
    Normal,
    /// BMI from 25 up to (not including) 30.
    Overweight,
    /// BMI of 30 or above.
    Obese,
}

impl BmiCategory {
    /// Classifies a BMI value. Each band includes its lower bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::models::BmiCategory;
    ///
    /// assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
    /// assert_eq!(BmiCategory::from_bmi(30.0), BmiCategory::Obese);
    /// ```
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Underweight => write!(f, "Underweight"),
            Self::Normal => write!(f, "Normal"),
            Self::Overweight => write!(f, "Overweight"),
            Self::Obese => write!(f, "Obese"),
        }
    }
}

/// Derived fitness metrics, all rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Body mass index.
    pub bmi: f64,
    /// Classification of the unrounded BMI.
    pub bmi_category: BmiCategory,
    /// Waist circumference divided by height.
    pub waist_height_ratio: f64,
    /// US Navy body fat estimate; `None` (serialized as `null`) for females.
    pub body_fat_percentage: Option<f64>,
}

/// A validated submission together with its derived metrics.
///
/// Records are immutable once computed; the persistence collaborator stores
/// them as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Name of the person measured.
    pub name: String,

    /// Contact address, when supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Normalized sex.
    pub sex: Sex,

    /// Height in centimeters, as submitted.
    pub height_cm: f64,

    /// Weight in pounds, as submitted.
    pub weight_lbs: f64,

    /// Weight converted to kilograms.
    pub weight_kg: f64,

    /// Waist circumference in centimeters, as submitted.
    pub waist_cm: f64,

    /// Neck circumference in centimeters, as submitted.
    pub neck_cm: f64,

    /// Derived metrics.
    pub metrics: Metrics,

    /// Instant the record was computed.
    pub timestamp: DateTime<Utc>,
}
