#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Loading of the trained model, fitted scaler, and weekly dataset.
//!
//! The three artifacts are loaded once at startup into an [`Artifacts`]
//! bundle that is then shared read-only with every request handler. Each
//! artifact loads independently: a failure leaves its slot empty and the
//! server keeps running in degraded mode, with the affected endpoints
//! reporting [`ForecastError::ArtifactUnavailable`].

pub mod dataset;
pub mod model;
pub mod scaler;

use std::path::{Path, PathBuf};

use viralcast_forecast::{ForecastError, Scaler, SequenceModel};
use viralcast_forecast_models::Forecast;

pub use dataset::WeeklySeries;
pub use model::{LstmForecaster, LstmNetwork, LstmNetworkConfig};
pub use scaler::{MinMaxScaler, MinMaxScalerParams};

/// LSTM hyper-parameters, relative to the asset base directory.
pub const MODEL_CONFIG_FILE: &str = "models/lstm_model.json";
/// LSTM weight record, relative to the asset base directory.
pub const MODEL_WEIGHTS_FILE: &str = "models/lstm_model.mpk";
/// Fitted scaler export, relative to the asset base directory.
pub const SCALER_FILE: &str = "models/weekly_scaler.json";
/// Weekly dataset, relative to the asset base directory.
pub const DATA_FILE: &str = "output/weekly_data.csv";

/// Errors that can occur while loading artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// An artifact file does not exist.
    #[error("Artifact not found at {}", path.display())]
    NotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The scaler export describes an unusable transform.
    #[error("Invalid scaler: {message}")]
    InvalidScaler {
        /// Description of what went wrong.
        message: String,
    },

    /// The dataset violates ordering or value constraints.
    #[error("Invalid dataset: {message}")]
    InvalidDataset {
        /// Description of what went wrong.
        message: String,
    },

    /// The model could not be restored.
    #[error("Model error: {message}")]
    Model {
        /// Description of what went wrong.
        message: String,
    },
}

/// Locations of every artifact file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    /// Directory the relative artifact paths were resolved against.
    pub base: PathBuf,
    pub model_config: PathBuf,
    pub model_weights: PathBuf,
    pub scaler: PathBuf,
    pub data: PathBuf,
}

impl AssetPaths {
    /// Artifact paths under `base`, without checking that they exist.
    #[must_use]
    pub fn in_dir(base: &Path) -> Self {
        Self {
            base: base.to_path_buf(),
            model_config: base.join(MODEL_CONFIG_FILE),
            model_weights: base.join(MODEL_WEIGHTS_FILE),
            scaler: base.join(SCALER_FILE),
            data: base.join(DATA_FILE),
        }
    }

    /// Picks the asset base directory.
    ///
    /// Uses `assets_dir` when it holds the model config (a self-contained
    /// deployment), otherwise falls back to its parent (running from a
    /// checkout where the server sits one level below the assets). Relative
    /// paths such as `.` are made absolute against the working directory
    /// before the parent is taken.
    #[must_use]
    pub fn resolve(assets_dir: &Path) -> Self {
        let local = Self::in_dir(assets_dir);
        if local.model_config.exists() {
            log::info!(
                "Using self-contained assets in {} (production mode)",
                assets_dir.display()
            );
            return local;
        }

        let parent = std::path::absolute(assets_dir)
            .ok()
            .and_then(|dir| dir.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| assets_dir.join(".."));

        log::warn!(
            "Assets not found in {}, trying parent directory {} (development mode)",
            assets_dir.display(),
            parent.display()
        );
        Self::in_dir(&parent)
    }
}

/// The model, scaler, and dataset, each present only if it loaded.
#[derive(Default)]
pub struct Artifacts {
    model: Option<Box<dyn SequenceModel>>,
    scaler: Option<Box<dyn Scaler>>,
    series: Option<WeeklySeries>,
}

impl Artifacts {
    /// Bundles already-constructed artifacts.
    #[must_use]
    pub fn new(
        model: Option<Box<dyn SequenceModel>>,
        scaler: Option<Box<dyn Scaler>>,
        series: Option<WeeklySeries>,
    ) -> Self {
        Self {
            model,
            scaler,
            series,
        }
    }

    /// Loads every artifact under `paths`, logging progress and leaving
    /// failed artifacts empty.
    #[must_use]
    pub fn load(paths: &AssetPaths) -> Self {
        log_directory_contents(&paths.base);

        log::info!("[1/3] Loading LSTM model from: {}", paths.model_config.display());
        let model = load_artifact("model", &paths.model_config, || {
            LstmForecaster::load(&paths.model_config, &paths.model_weights)
        })
        .map(|m| Box::new(m) as Box<dyn SequenceModel>);

        log::info!("[2/3] Loading scaler from: {}", paths.scaler.display());
        let scaler = load_artifact("scaler", &paths.scaler, || MinMaxScaler::load(&paths.scaler))
            .map(|s| Box::new(s) as Box<dyn Scaler>);

        log::info!("[3/3] Loading weekly data from: {}", paths.data.display());
        let series = load_artifact("weekly data", &paths.data, || WeeklySeries::load(&paths.data));

        let artifacts = Self::new(model, scaler, series);
        artifacts.log_summary();
        artifacts
    }

    /// Whether the model loaded.
    #[must_use]
    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Whether the dataset loaded.
    #[must_use]
    pub fn data_loaded(&self) -> bool {
        self.series.is_some()
    }

    /// Whether every artifact loaded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.model.is_some() && self.scaler.is_some() && self.series.is_some()
    }

    /// # Errors
    ///
    /// Returns [`ForecastError::ArtifactUnavailable`] if the model did not
    /// load.
    pub fn model(&self) -> Result<&dyn SequenceModel, ForecastError> {
        self.model
            .as_deref()
            .ok_or(ForecastError::ArtifactUnavailable { artifact: "model" })
    }

    /// # Errors
    ///
    /// Returns [`ForecastError::ArtifactUnavailable`] if the scaler did not
    /// load.
    pub fn scaler(&self) -> Result<&dyn Scaler, ForecastError> {
        self.scaler
            .as_deref()
            .ok_or(ForecastError::ArtifactUnavailable { artifact: "scaler" })
    }

    /// # Errors
    ///
    /// Returns [`ForecastError::ArtifactUnavailable`] if the dataset did not
    /// load.
    pub fn series(&self) -> Result<&WeeklySeries, ForecastError> {
        self.series
            .as_ref()
            .ok_or(ForecastError::ArtifactUnavailable { artifact: "data" })
    }

    /// Forecasts the week after the last observation in the dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError`] if an artifact is missing or the forecast
    /// fails.
    pub fn forecast(&self) -> Result<Forecast, ForecastError> {
        let series = self.series()?;
        viralcast_forecast::forecast(series.observations(), self.scaler()?, self.model()?)
    }

    fn log_summary(&self) {
        if !self.is_ready() {
            log::error!(
                "Artifact loading incomplete (model={}, scaler={}, data={}); prediction endpoints will return errors",
                self.model.is_some(),
                self.scaler.is_some(),
                self.series.is_some()
            );
            return;
        }

        log::info!("All artifacts loaded");
        if let Some(series) = &self.series {
            if let Some((first, last)) = series.date_range() {
                log::info!("Data range: {first} to {last} ({} weeks)", series.len());
            }
            if let Some(latest) = series.latest() {
                log::info!("Latest cases: {:.0}", latest.new_cases);
            }
        }
    }
}

/// Loads one artifact, logging instead of propagating failures.
fn load_artifact<T>(
    label: &str,
    path: &Path,
    load: impl FnOnce() -> Result<T, ArtifactError>,
) -> Option<T> {
    let exists = path.exists();
    log::info!("      File exists: {exists}");

    let result = if exists {
        load()
    } else {
        if let Some(dir) = path.parent() {
            log_directory_contents(dir);
        }
        Err(ArtifactError::NotFound {
            path: path.to_path_buf(),
        })
    };

    match result {
        Ok(value) => {
            log::info!("Loaded {label}");
            Some(value)
        }
        Err(e) => {
            log::error!("Failed to load {label}: {e}");
            None
        }
    }
}

/// Lists `dir` to help diagnose misplaced artifacts.
fn log_directory_contents(dir: &Path) {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            log::info!("Contents of {}:", dir.display());
            for entry in entries.flatten() {
                log::info!("  - {}", entry.file_name().to_string_lossy());
            }
        }
        Err(e) => log::warn!("Cannot list {}: {e}", dir.display()),
    }
}
