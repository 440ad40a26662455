#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Weekly observation, forecast, and risk assessment types.
//!
//! These are the plain data types shared by the forecasting core, the
//! artifact loaders, and the HTTP server. They carry no behavior beyond
//! simple accessors so that every crate agrees on a single vocabulary.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Number of trailing weekly observations fed to the model for one
/// inference.
pub const SEQUENCE_LENGTH: usize = 12;

/// Days between the last observation and the forecasted week.
pub const FORECAST_HORIZON_DAYS: u64 = 7;

/// One week of surveillance data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyObservation {
    /// Week the observation was reported for.
    pub date: NaiveDate,
    /// New cases reported during the week.
    pub new_cases: f64,
    /// Patients hospitalized, when reported.
    pub hosp_patients: Option<f64>,
    /// Share of tests that came back positive (0-1), when reported.
    pub positive_rate: Option<f64>,
}

/// A single forecasted weekly case count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Week the forecast applies to.
    pub date: NaiveDate,
    /// Forecasted case count. Never negative.
    pub value: f64,
    /// Inverse-scaled model output before clamping. May be negative.
    pub raw_value: f64,
}

/// A dated value on a chart series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Qualitative outbreak risk.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
)]
pub enum RiskLevel {
    /// Average weekly cases below 50,000.
    Low,
    /// Average weekly cases below 200,000.
    Moderate,
    /// Everything above.
    High,
}

impl RiskLevel {
    /// Returns the display color paired with this level.
    #[must_use]
    pub const fn color(self) -> RiskColor {
        match self {
            Self::Low => RiskColor::Green,
            Self::Moderate => RiskColor::Yellow,
            Self::High => RiskColor::Red,
        }
    }
}

/// Dashboard color for a [`RiskLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskColor {
    Green,
    Yellow,
    Red,
}

/// Risk level derived from the current and predicted case counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Risk level.
    pub level: RiskLevel,
    /// Color paired 1:1 with `level`.
    pub color: RiskColor,
    /// Average of the current and predicted values, unrounded.
    pub score: f64,
}

/// Direction of change between the current and predicted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Trend {
    /// More than 10% growth.
    Increasing,
    /// More than 10% decline.
    Decreasing,
    /// Within +/-10%, inclusive.
    Stable,
}

/// User-declared policy parameters for a custom prediction.
///
/// No range checks are applied: values outside the expected ranges scale
/// linearly into negative or greater-than-one factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyParameters {
    /// Government response stringency, expected 0-100.
    pub stringency_index: f64,
    /// Mobility change as a signed percent.
    pub mobility: f64,
    /// Share of the population vaccinated, expected 0-100.
    pub vaccination_rate: f64,
}

/// The individual and combined multipliers applied by a custom prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentFactors {
    pub stringency: f64,
    pub mobility: f64,
    pub vaccination: f64,
    /// Weighted blend of the three factors.
    pub combined: f64,
}

/// Result of adjusting a declared baseline by policy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedForecast {
    /// Adjusted case count. Never negative.
    pub value: f64,
    /// Factors that produced `value`.
    pub factors: AdjustmentFactors,
}
