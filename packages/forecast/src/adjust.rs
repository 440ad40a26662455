//! Policy-driven adjustment of a user-declared weekly case count.
//!
//! The adjustment is a fixed linear blend of three policy factors applied
//! to the caller's baseline. It never consults the trained model, so the
//! same inputs always produce the same output.

use chrono::{Days, NaiveDate};
use viralcast_forecast_models::{
    AdjustedForecast, AdjustmentFactors, FORECAST_HORIZON_DAYS, PolicyParameters, SeriesPoint,
};

/// Weight of the stringency factor in the combined factor.
pub const STRINGENCY_WEIGHT: f64 = 0.3;

/// Weight of the mobility factor in the combined factor.
pub const MOBILITY_WEIGHT: f64 = 0.4;

/// Weight of the vaccination factor in the combined factor.
pub const VACCINATION_WEIGHT: f64 = 0.3;

/// Divisor that maps a 0-100 policy input onto a 0-0.5 swing.
const FACTOR_SPAN: f64 = 200.0;

/// Number of synthetic weeks shown before a custom prediction.
pub const SYNTHETIC_HISTORY_WEEKS: u64 = 4;

/// Computes the individual and combined factors for `params`.
#[must_use]
pub fn adjustment_factors(params: &PolicyParameters) -> AdjustmentFactors {
    let stringency = 1.0 - params.stringency_index / FACTOR_SPAN;
    let mobility = 1.0 + params.mobility / FACTOR_SPAN;
    let vaccination = 1.0 - params.vaccination_rate / FACTOR_SPAN;

    let combined = stringency * STRINGENCY_WEIGHT
        + mobility * MOBILITY_WEIGHT
        + vaccination * VACCINATION_WEIGHT;

    AdjustmentFactors {
        stringency,
        mobility,
        vaccination,
        combined,
    }
}

/// Scales `previous_week_cases` by the combined policy factor.
///
/// Out-of-range policy inputs are accepted as-is; only the final value is
/// clamped at zero.
#[must_use]
pub fn adjust_forecast(previous_week_cases: f64, params: &PolicyParameters) -> AdjustedForecast {
    let factors = adjustment_factors(params);

    AdjustedForecast {
        value: (previous_week_cases * factors.combined).max(0.0),
        factors,
    }
}

/// Builds the illustrative lead-in series shown with a custom prediction.
///
/// Four weekly points ending one week before `today`, rising from 80% to
/// 110% of `previous_week_cases`. The values are fabricated from the
/// declared baseline, not read from any dataset.
#[must_use]
pub fn synthetic_history(previous_week_cases: f64, today: NaiveDate) -> Vec<SeriesPoint> {
    (0..SYNTHETIC_HISTORY_WEEKS)
        .filter_map(|i| {
            let date = today.checked_sub_days(Days::new(7 * (SYNTHETIC_HISTORY_WEEKS - i)))?;
            #[allow(clippy::cast_precision_loss)]
            let value = previous_week_cases * (0.8 + (i as f64) * 0.1);
            Some(SeriesPoint { date, value })
        })
        .collect()
}

/// Date of the forecast produced by a custom prediction made on `today`.
#[must_use]
pub fn custom_forecast_date(today: NaiveDate) -> Option<NaiveDate> {
    today.checked_add_days(Days::new(FORECAST_HORIZON_DAYS))
}
