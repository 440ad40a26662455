#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the ViralCast server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the forecasting types to allow independent evolution of the API
//! contract. Field names are `snake_case` except for the custom prediction
//! request, which the dashboard sends in `camelCase`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use viralcast_forecast_models::{
    AdjustmentFactors, Forecast, PolicyParameters, RiskAssessment, SeriesPoint, Trend,
    WeeklyObservation,
};

/// Display format of the `date` field in [`ApiCurrentStats`].
pub const STATS_DATE_FORMAT: &str = "%b %d, %Y";

/// A dated value on a chart. Dates serialize as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl From<&WeeklyObservation> for ApiPoint {
    fn from(obs: &WeeklyObservation) -> Self {
        Self {
            date: obs.date,
            value: obs.new_cases,
        }
    }
}

impl From<Forecast> for ApiPoint {
    fn from(forecast: Forecast) -> Self {
        Self {
            date: forecast.date,
            value: forecast.value,
        }
    }
}

impl From<SeriesPoint> for ApiPoint {
    fn from(point: SeriesPoint) -> Self {
        Self {
            date: point.date,
            value: point.value,
        }
    }
}

/// Latest weekly figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCurrentStats {
    /// New cases in the latest week.
    pub weekly_cases: f64,
    /// Hospitalized patients, 0 when unreported.
    pub hospitalizations: f64,
    /// Test positivity rate, 0 when unreported.
    pub positive_rate: f64,
    /// Latest week, e.g. `"Jan 05, 2025"`.
    pub date: String,
    /// Currently dominant variant.
    pub variant: String,
}

impl ApiCurrentStats {
    #[must_use]
    pub fn from_observation(obs: &WeeklyObservation, variant: &str) -> Self {
        Self {
            weekly_cases: obs.new_cases,
            hospitalizations: obs.hosp_patients.unwrap_or(0.0),
            positive_rate: obs.positive_rate.unwrap_or(0.0),
            date: obs.date.format(STATS_DATE_FORMAT).to_string(),
            variant: variant.to_string(),
        }
    }
}

/// Recent weekly case counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHistorical {
    pub historical: Vec<ApiPoint>,
}

/// Forecast with its chart context and risk labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPrediction {
    /// Forecasted points (currently always one week).
    pub predictions: Vec<ApiPoint>,
    /// Points leading up to the forecast.
    pub historical: Vec<ApiPoint>,
    pub risk_assessment: RiskAssessment,
    pub trend: Trend,
    /// Case count the forecast is compared against.
    pub current_cases: f64,
    /// Forecasted case count.
    pub predicted_cases: f64,
}

/// Custom prediction: a policy-adjusted forecast for a declared baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCustomPrediction {
    #[serde(flatten)]
    pub prediction: ApiPrediction,
    /// Policy factors that produced `predicted_cases`.
    pub factors: AdjustmentFactors,
    /// Location echoed from the request.
    pub location: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
    /// Whether the forecasting model loaded at startup.
    pub model_loaded: bool,
    /// Whether the weekly dataset loaded at startup.
    pub data_loaded: bool,
}

/// Error body returned with every non-200 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

/// Body of `POST /api/predict-custom`.
///
/// Missing fields take fixed defaults. Numeric fields also accept numeric
/// strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomPredictionRequest {
    /// Free-form location label.
    #[serde(default = "default_location")]
    pub location: String,
    /// Declared case count for the previous week.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub previous_week_cases: f64,
    /// Stringency index, expected 0-100.
    #[serde(default = "default_stringency_index", deserialize_with = "lenient_f64")]
    pub stringency_index: f64,
    /// Mobility change as a signed percent.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub mobility: f64,
    /// Vaccination rate, expected 0-100.
    #[serde(default = "default_vaccination_rate", deserialize_with = "lenient_f64")]
    pub vaccination_rate: f64,
    /// Accepted for dashboard compatibility; not used.
    #[serde(default)]
    pub population_density: Option<serde_json::Value>,
}

impl CustomPredictionRequest {
    /// The policy inputs of this request.
    #[must_use]
    pub const fn policy(&self) -> PolicyParameters {
        PolicyParameters {
            stringency_index: self.stringency_index,
            mobility: self.mobility,
            vaccination_rate: self.vaccination_rate,
        }
    }
}

fn default_location() -> String {
    "Unknown".to_string()
}

const fn default_stringency_index() -> f64 {
    50.0
}

const fn default_vaccination_rate() -> f64 {
    50.0
}

/// Reads a JSON number or a string holding one.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(v) => Ok(v),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("could not convert {s:?} to a number"))),
    }
}
