//! Min-max scaler restored from a JSON export of a fitted scaler.

use std::path::Path;

use serde::Deserialize;
use viralcast_forecast::Scaler;

use crate::ArtifactError;

/// Serialized form of a fitted min-max scaler.
#[derive(Debug, Clone, Deserialize)]
pub struct MinMaxScalerParams {
    /// Smallest raw value seen during fitting.
    pub data_min: f64,
    /// Largest raw value seen during fitting.
    pub data_max: f64,
    /// Target range of the scaled values.
    #[serde(default = "default_feature_range")]
    pub feature_range: [f64; 2],
}

const fn default_feature_range() -> [f64; 2] {
    [0.0, 1.0]
}

/// Affine scaler mapping `[data_min, data_max]` onto `feature_range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    scale: f64,
    min: f64,
}

impl MinMaxScaler {
    /// Builds a scaler from fitted bounds.
    ///
    /// A zero-width data range scales by one, leaving values shifted but
    /// unstretched.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::InvalidScaler`] if any bound is non-finite,
    /// `data_max < data_min`, or the feature range is empty.
    pub fn from_params(params: &MinMaxScalerParams) -> Result<Self, ArtifactError> {
        let [lo, hi] = params.feature_range;

        if ![params.data_min, params.data_max, lo, hi]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ArtifactError::InvalidScaler {
                message: "scaler bounds must be finite".to_string(),
            });
        }
        if params.data_max < params.data_min {
            return Err(ArtifactError::InvalidScaler {
                message: format!(
                    "data_max {} is below data_min {}",
                    params.data_max, params.data_min
                ),
            });
        }
        if hi <= lo {
            return Err(ArtifactError::InvalidScaler {
                message: format!("feature range [{lo}, {hi}] is empty"),
            });
        }

        let data_range = params.data_max - params.data_min;
        let scale = if data_range == 0.0 {
            1.0
        } else {
            (hi - lo) / data_range
        };

        Ok(Self {
            scale,
            min: params.data_min.mul_add(-scale, lo),
        })
    }

    /// Loads a scaler from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] if the file cannot be read, is not valid
    /// JSON, or describes an invalid scaler.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let contents = std::fs::read_to_string(path)?;
        let params: MinMaxScalerParams = serde_json::from_str(&contents)?;
        Self::from_params(&params)
    }
}

impl Scaler for MinMaxScaler {
    fn transform(&self, value: f64) -> f64 {
        value.mul_add(self.scale, self.min)
    }

    fn inverse_transform(&self, value: f64) -> f64 {
        (value - self.min) / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(data_min: f64, data_max: f64) -> MinMaxScalerParams {
        MinMaxScalerParams {
            data_min,
            data_max,
            feature_range: default_feature_range(),
        }
    }

    #[test]
    fn maps_bounds_onto_unit_range() {
        let scaler = MinMaxScaler::from_params(&params(1_000.0, 301_000.0)).unwrap();
        assert!(scaler.transform(1_000.0).abs() < 1e-12);
        assert!((scaler.transform(301_000.0) - 1.0).abs() < 1e-12);
        assert!((scaler.transform(151_000.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn round_trips_a_window() {
        let scaler = MinMaxScaler::from_params(&params(1_000.0, 301_000.0)).unwrap();
        let window = [
            12_000.0, 18_500.0, 25_250.0, 40_000.0, 75_300.0, 120_000.0, 180_400.0, 260_000.0,
            299_999.0, 150_000.0, 90_000.0, 0.0,
        ];
        for raw in window {
            let back = scaler.inverse_transform(scaler.transform(raw));
            assert!((back - raw).abs() < 1e-6, "{raw} came back as {back}");
        }
    }

    #[test]
    fn honors_custom_feature_range() {
        let scaler = MinMaxScaler::from_params(&MinMaxScalerParams {
            data_min: 0.0,
            data_max: 10.0,
            feature_range: [-1.0, 1.0],
        })
        .unwrap();
        assert!((scaler.transform(0.0) + 1.0).abs() < 1e-12);
        assert!(scaler.transform(5.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_range_scales_by_one() {
        let scaler = MinMaxScaler::from_params(&params(42.0, 42.0)).unwrap();
        assert!(scaler.transform(42.0).abs() < 1e-12);
        assert!((scaler.inverse_transform(1.0) - 43.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = MinMaxScaler::from_params(&params(10.0, 1.0)).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidScaler { .. }));
    }

    #[test]
    fn rejects_non_finite_bounds() {
        let err = MinMaxScaler::from_params(&params(f64::NAN, 1.0)).unwrap_err();
        assert!(matches!(err, ArtifactError::InvalidScaler { .. }));
    }

    #[test]
    fn parses_json_export() {
        let params: MinMaxScalerParams =
            serde_json::from_str(r#"{"data_min": 0.0, "data_max": 200.0}"#).unwrap();
        let scaler = MinMaxScaler::from_params(&params).unwrap();
        assert!((scaler.transform(50.0) - 0.25).abs() < 1e-12);
    }
}
