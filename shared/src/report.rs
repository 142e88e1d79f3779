//! Plain-text report rendering.
//!
//! Formats a [`MetricsRecord`] into the fixed-layout report stored on disk and
//! sent to the notification collaborator.

use crate::models::MetricsRecord;
use std::fmt;

const RULE: &str = "========================================";
const SECTION_RULE: &str = "----------------------------------------";

/// Display adapter rendering a record as the fixed-layout report.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a>(pub &'a MetricsRecord);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;
        let metrics = &record.metrics;

        writeln!(f, "{RULE}")?;
        writeln!(f, "        BODY MEASUREMENT REPORT")?;
        writeln!(f, "{RULE}")?;
        writeln!(f)?;
        writeln!(f, "Name:   {}", record.name)?;
        if let Some(ref email) = record.email {
            writeln!(f, "Email:  {email}")?;
        }
        writeln!(f, "Sex:    {}", record.sex)?;
        writeln!(f)?;

        writeln!(f, "{SECTION_RULE}")?;
        writeln!(f, "MEASUREMENTS")?;
        writeln!(f, "{SECTION_RULE}")?;
        writeln!(f, "Height:  {} cm", record.height_cm)?;
        writeln!(
            f,
            "Weight:  {} lbs ({:.2} kg)",
            record.weight_lbs, record.weight_kg
        )?;
        writeln!(f, "Waist:   {} cm", record.waist_cm)?;
        writeln!(f, "Neck:    {} cm", record.neck_cm)?;
        writeln!(f)?;

        writeln!(f, "{SECTION_RULE}")?;
        writeln!(f, "COMPUTED METRICS")?;
        writeln!(f, "{SECTION_RULE}")?;
        writeln!(f, "BMI:                 {:.2}", metrics.bmi)?;
        writeln!(f, "BMI Category:        {}", metrics.bmi_category)?;
        writeln!(f, "Waist-to-Height:     {:.2}", metrics.waist_height_ratio)?;
        match metrics.body_fat_percentage {
            Some(body_fat) => writeln!(f, "Body Fat Percentage: {body_fat:.2}%")?,
            None => writeln!(f, "Body Fat Percentage: N/A")?,
        }
        writeln!(f)?;

        writeln!(
            f,
            "Generated: {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f, "{RULE}")
    }
}

/// Renders the human-readable report for a record.
///
/// Derived values are printed with exactly two decimals; submitted
/// measurements are printed as given.
///
/// # Example
///
/// ```
/// use shared::engine::MetricsEngine;
/// use shared::models::MeasurementInput;
/// use shared::report::render_report;
///
/// let record = MetricsEngine::new()
///     .compute(MeasurementInput::new("Alex", "male", 180.0, 160.0, 85.0, 38.0))
///     .unwrap();
/// let report = render_report(&record);
///
/// assert!(report.contains("BMI:                 22.40"));
/// assert!(report.contains("Sex:    Male"));
/// ```
#[must_use]
pub fn render_report(record: &MetricsRecord) -> String {
    Report(record).to_string()
}

/// Subject line used when the report is delivered.
#[must_use]
pub fn report_subject(record: &MetricsRecord) -> String {
    format!("Body measurement report for {}", record.name)
}
