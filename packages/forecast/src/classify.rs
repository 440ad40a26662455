//! Risk level and trend direction from a (current, predicted) pair.

use viralcast_forecast_models::{RiskAssessment, RiskLevel, Trend};

/// Average weekly cases below which risk is [`RiskLevel::Low`].
pub const LOW_RISK_CEILING: f64 = 50_000.0;

/// Average weekly cases below which risk is [`RiskLevel::Moderate`].
pub const MODERATE_RISK_CEILING: f64 = 200_000.0;

/// Percent change beyond which a trend is no longer [`Trend::Stable`].
pub const TREND_THRESHOLD_PERCENT: f64 = 10.0;

/// Classifies outbreak risk from the average of `current` and `predicted`.
///
/// Thresholds are strict: an average of exactly 50,000 is `Moderate` and
/// exactly 200,000 is `High`.
#[must_use]
pub fn classify_risk(current: f64, predicted: f64) -> RiskAssessment {
    let score = (current + predicted) / 2.0;

    let level = if score < LOW_RISK_CEILING {
        RiskLevel::Low
    } else if score < MODERATE_RISK_CEILING {
        RiskLevel::Moderate
    } else {
        RiskLevel::High
    };

    RiskAssessment {
        level,
        color: level.color(),
        score,
    }
}

/// Classifies the direction of change from `current` to `predicted`.
///
/// A change of exactly +/-10% is still `Stable`. A zero `current` has no
/// defined percent change and is reported as `Stable`.
#[must_use]
pub fn classify_trend(current: f64, predicted: f64) -> Trend {
    if current == 0.0 {
        return Trend::Stable;
    }

    let change_percent = (predicted - current) / current * 100.0;

    if change_percent > TREND_THRESHOLD_PERCENT {
        Trend::Increasing
    } else if change_percent < -TREND_THRESHOLD_PERCENT {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
mod tests {
    use viralcast_forecast_models::RiskColor;

    use super::*;

    #[test]
    fn low_risk_below_fifty_thousand() {
        let risk = classify_risk(10_000.0, 10_000.0);
        assert_eq!(risk.level, RiskLevel::Low);
        assert_eq!(risk.color, RiskColor::Green);
        assert!((risk.score - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn moderate_risk_below_two_hundred_thousand() {
        let risk = classify_risk(100_000.0, 100_000.0);
        assert_eq!(risk.level, RiskLevel::Moderate);
        assert_eq!(risk.color, RiskColor::Yellow);
    }

    #[test]
    fn high_risk_above_two_hundred_thousand() {
        let risk = classify_risk(500_000.0, 500_000.0);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.color, RiskColor::Red);
    }

    #[test]
    fn risk_thresholds_are_strict() {
        assert_eq!(classify_risk(50_000.0, 50_000.0).level, RiskLevel::Moderate);
        assert_eq!(classify_risk(200_000.0, 200_000.0).level, RiskLevel::High);
    }

    #[test]
    fn score_is_unrounded_average() {
        let risk = classify_risk(1.0, 2.0);
        assert!((risk.score - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn trend_increasing_above_ten_percent() {
        assert_eq!(classify_trend(100.0, 111.0), Trend::Increasing);
    }

    #[test]
    fn trend_decreasing_below_minus_ten_percent() {
        assert_eq!(classify_trend(100.0, 89.0), Trend::Decreasing);
    }

    #[test]
    fn trend_stable_within_band() {
        assert_eq!(classify_trend(100.0, 95.0), Trend::Stable);
        assert_eq!(classify_trend(100.0, 110.0), Trend::Stable);
        assert_eq!(classify_trend(100.0, 90.0), Trend::Stable);
    }

    #[test]
    fn trend_from_zero_is_stable() {
        assert_eq!(classify_trend(0.0, 0.0), Trend::Stable);
        assert_eq!(classify_trend(0.0, 500.0), Trend::Stable);
    }
}
