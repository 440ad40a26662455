#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Case forecasting, risk classification, and policy adjustment.
//!
//! The model and scaler are opaque collaborators reached through the
//! [`SequenceModel`] and [`Scaler`] traits, so everything here is pure
//! arithmetic over their outputs:
//!
//! - [`engine`] turns the trailing window of weekly cases into one
//!   forecast a week ahead.
//! - [`classify`] labels a (current, predicted) pair with a risk level and
//!   a trend direction.
//! - [`adjust`] scales a user-declared baseline by fixed policy weights,
//!   independent of the model.

pub mod adjust;
pub mod classify;
pub mod engine;

pub use adjust::{adjust_forecast, adjustment_factors, custom_forecast_date, synthetic_history};
pub use classify::{classify_risk, classify_trend};
pub use engine::{forecast, sequence_window};

/// Errors that can occur while producing a forecast.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    /// Fewer weekly observations exist than the model's input window.
    #[error("Insufficient history: need {required} weeks, have {available}")]
    InsufficientHistory {
        /// Window length the model expects.
        required: usize,
        /// Observations actually available.
        available: usize,
    },

    /// The series holds no observations at all.
    #[error("No observations available")]
    EmptySeries,

    /// A startup artifact failed to load.
    #[error("Artifact unavailable: {artifact} not loaded")]
    ArtifactUnavailable {
        /// Which artifact is missing (`"model"`, `"scaler"`, `"data"`).
        artifact: &'static str,
    },

    /// The model failed to produce a usable output.
    #[error("Inference error: {message}")]
    Inference {
        /// Description of what went wrong.
        message: String,
    },

    /// The forecast date could not be represented.
    #[error("Forecast date out of range")]
    DateOutOfRange,
}

/// A fitted, invertible affine transform between raw case counts and the
/// model's input range.
pub trait Scaler: Send + Sync {
    /// Maps a raw value into the scaled range.
    fn transform(&self, value: f64) -> f64;

    /// Maps a scaled value back to the raw range.
    fn inverse_transform(&self, value: f64) -> f64;
}

/// A trained sequence-to-one regression model.
pub trait SequenceModel: Send + Sync {
    /// Predicts the next scaled value from a window of scaled values.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Inference`] if the window has the wrong
    /// shape or the model cannot be evaluated.
    fn predict(&self, window: &[f64]) -> Result<f64, ForecastError>;
}
