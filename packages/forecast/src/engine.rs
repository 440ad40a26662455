//! One-week-ahead forecasting from the trailing window of weekly cases.

use chrono::Days;
use viralcast_forecast_models::{
    FORECAST_HORIZON_DAYS, Forecast, SEQUENCE_LENGTH, WeeklyObservation,
};

use crate::{ForecastError, Scaler, SequenceModel};

/// Returns the raw case counts of the last [`SEQUENCE_LENGTH`] observations,
/// oldest first.
///
/// # Errors
///
/// Returns [`ForecastError::InsufficientHistory`] if fewer observations
/// exist than the window needs.
pub fn sequence_window(observations: &[WeeklyObservation]) -> Result<Vec<f64>, ForecastError> {
    let available = observations.len();
    if available < SEQUENCE_LENGTH {
        return Err(ForecastError::InsufficientHistory {
            required: SEQUENCE_LENGTH,
            available,
        });
    }

    Ok(observations[available - SEQUENCE_LENGTH..]
        .iter()
        .map(|obs| obs.new_cases)
        .collect())
}

/// Forecasts the case count for the week after the last observation.
///
/// The window is scaled, passed to the model as one sequence, and the
/// model's output is scaled back. [`Forecast::value`] is clamped at zero;
/// [`Forecast::raw_value`] keeps the unclamped output.
///
/// # Errors
///
/// * [`ForecastError::InsufficientHistory`] if the series is shorter than
///   the window.
/// * [`ForecastError::Inference`] if the model fails or yields a
///   non-finite value.
/// * [`ForecastError::DateOutOfRange`] if the forecast date overflows.
pub fn forecast(
    observations: &[WeeklyObservation],
    scaler: &dyn Scaler,
    model: &dyn SequenceModel,
) -> Result<Forecast, ForecastError> {
    let window = sequence_window(observations)?;
    let last = observations.last().ok_or(ForecastError::EmptySeries)?;

    let scaled: Vec<f64> = window.iter().map(|v| scaler.transform(*v)).collect();
    let predicted_scaled = model.predict(&scaled)?;
    let predicted = scaler.inverse_transform(predicted_scaled);

    if !predicted.is_finite() {
        return Err(ForecastError::Inference {
            message: format!("model produced non-finite value {predicted}"),
        });
    }

    log::debug!(
        "Forecast from window ending {}: scaled={predicted_scaled} raw={predicted}",
        last.date
    );

    let date = last
        .date
        .checked_add_days(Days::new(FORECAST_HORIZON_DAYS))
        .ok_or(ForecastError::DateOutOfRange)?;

    Ok(Forecast {
        date,
        value: predicted.max(0.0),
        raw_value: predicted,
    })
}
