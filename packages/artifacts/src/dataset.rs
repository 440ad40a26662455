//! Historical weekly case series loaded from CSV.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use viralcast_forecast_models::WeeklyObservation;

use crate::ArtifactError;

/// One CSV row. Columns not named here are ignored.
#[derive(Debug, Deserialize)]
struct WeeklyRow {
    date: String,
    new_cases: f64,
    #[serde(default)]
    hosp_patients: Option<f64>,
    #[serde(default)]
    positive_rate: Option<f64>,
}

/// Read-only weekly series, ascending by date with no duplicate weeks.
#[derive(Debug, Clone)]
pub struct WeeklySeries {
    observations: Vec<WeeklyObservation>,
}

impl WeeklySeries {
    /// Wraps already-parsed observations after validating their order.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::InvalidDataset`] if dates are not strictly
    /// ascending or a case count is negative or non-finite.
    pub fn from_observations(observations: Vec<WeeklyObservation>) -> Result<Self, ArtifactError> {
        if let Some(obs) = observations
            .iter()
            .find(|obs| !obs.new_cases.is_finite() || obs.new_cases < 0.0)
        {
            return Err(ArtifactError::InvalidDataset {
                message: format!("invalid new_cases {} on {}", obs.new_cases, obs.date),
            });
        }

        if let Some(pair) = observations.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(ArtifactError::InvalidDataset {
                message: format!(
                    "dates must be strictly ascending: {} follows {}",
                    pair[1].date, pair[0].date
                ),
            });
        }

        Ok(Self { observations })
    }

    /// Parses a CSV with a header row containing at least `date` and
    /// `new_cases`.
    ///
    /// Blank `hosp_patients` and `positive_rate` cells become `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] if a row fails to parse or the series is
    /// out of order.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut observations = Vec::new();
        for result in reader.deserialize::<WeeklyRow>() {
            let row = result?;
            let date = parse_date(&row.date).ok_or_else(|| ArtifactError::InvalidDataset {
                message: format!("unparseable date {:?}", row.date),
            })?;
            observations.push(WeeklyObservation {
                date,
                new_cases: row.new_cases,
                hosp_patients: row.hosp_patients.filter(|v| v.is_finite()),
                positive_rate: row.positive_rate.filter(|v| v.is_finite()),
            });
        }

        Self::from_observations(observations)
    }

    /// Loads the series from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] if the file cannot be opened or parsed.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// All observations, oldest first.
    #[must_use]
    pub fn observations(&self) -> &[WeeklyObservation] {
        &self.observations
    }

    /// Number of weeks in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series holds no weeks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Most recent observation.
    #[must_use]
    pub fn latest(&self) -> Option<&WeeklyObservation> {
        self.observations.last()
    }

    /// Up to `n` most recent observations, oldest first.
    #[must_use]
    pub fn tail(&self, n: usize) -> &[WeeklyObservation] {
        let start = self.observations.len().saturating_sub(n);
        &self.observations[start..]
    }

    /// First and last observed dates.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.observations.first()?.date, self.observations.last()?.date))
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time of day.
fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}
