//! HTTP handler functions for the ViralCast API.
//!
//! Every failure is reported as HTTP 500 with an `{"error": ...}` body;
//! there is no separate client-error path, even for malformed input.

use std::fmt::Display;

use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use viralcast_artifacts::{Artifacts, WeeklySeries};
use viralcast_forecast::{
    ForecastError, adjust_forecast, classify_risk, classify_trend, custom_forecast_date,
    synthetic_history,
};
use viralcast_forecast_models::SEQUENCE_LENGTH;
use viralcast_server_models::{
    ApiCurrentStats, ApiCustomPrediction, ApiError, ApiHealth, ApiHistorical, ApiPoint,
    ApiPrediction, CustomPredictionRequest,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        status: "healthy".to_string(),
        model_loaded: state.artifacts.model_loaded(),
        data_loaded: state.artifacts.data_loaded(),
    })
}

/// `GET /api/current-stats`
///
/// Returns the figures of the most recent week in the dataset.
pub async fn current_stats(state: web::Data<AppState>) -> HttpResponse {
    let result = state.artifacts.series().and_then(|series| {
        series
            .latest()
            .map(|latest| ApiCurrentStats::from_observation(latest, &state.variant))
            .ok_or(ForecastError::EmptySeries)
    });

    match result {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => internal_error("Failed to read current stats", &e),
    }
}

/// `GET /api/historical`
///
/// Returns up to the last twelve weekly case counts.
pub async fn historical(state: web::Data<AppState>) -> HttpResponse {
    match state.artifacts.series() {
        Ok(series) => HttpResponse::Ok().json(ApiHistorical {
            historical: recent_points(series),
        }),
        Err(e) => internal_error("Failed to read historical data", &e),
    }
}

/// `GET /api/predict`
///
/// Forecasts the week after the dataset ends and labels its risk and
/// trend against the latest observed week.
pub async fn predict(state: web::Data<AppState>) -> HttpResponse {
    match build_prediction(&state.artifacts) {
        Ok(prediction) => HttpResponse::Ok().json(prediction),
        Err(e) => internal_error("Prediction error", &e),
    }
}

/// `POST /api/predict-custom`
///
/// Adjusts a declared previous-week case count by policy parameters. The
/// body is decoded here rather than by an extractor so that malformed
/// input is reported like any other failure.
pub async fn predict_custom(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let request: CustomPredictionRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return internal_error("Invalid custom prediction request", &e),
    };

    match build_custom_prediction(&state.artifacts, &request, Local::now().date_naive()) {
        Ok(prediction) => HttpResponse::Ok().json(prediction),
        Err(e) => internal_error("Custom prediction error", &e),
    }
}

fn build_prediction(artifacts: &Artifacts) -> Result<ApiPrediction, ForecastError> {
    let series = artifacts.series()?;
    let current_cases = series.latest().ok_or(ForecastError::EmptySeries)?.new_cases;
    let forecast = artifacts.forecast()?;

    // Only the charted point is clamped; the labels and `predicted_cases`
    // follow the model's raw output
    let risk_assessment = classify_risk(current_cases, forecast.raw_value);
    let trend = classify_trend(current_cases, forecast.raw_value);

    log::info!(
        "Forecast for {}: {:.0} cases, risk={} ({}), trend={trend}",
        forecast.date,
        forecast.raw_value,
        risk_assessment.level,
        risk_assessment.color
    );

    Ok(ApiPrediction {
        predictions: vec![forecast.into()],
        historical: recent_points(series),
        risk_assessment,
        trend,
        current_cases,
        predicted_cases: forecast.raw_value,
    })
}

fn build_custom_prediction(
    artifacts: &Artifacts,
    request: &CustomPredictionRequest,
    today: NaiveDate,
) -> Result<ApiCustomPrediction, ForecastError> {
    log::info!(
        "Custom prediction request for {}: cases={:.0} stringency={} mobility={}% vaccination={}%",
        request.location,
        request.previous_week_cases,
        request.stringency_index,
        request.mobility,
        request.vaccination_rate
    );

    // Reported for comparison only; the adjusted value never depends on it
    let baseline = artifacts.forecast()?;

    let current_cases = request.previous_week_cases;
    let adjusted = adjust_forecast(current_cases, &request.policy());
    let date = custom_forecast_date(today).ok_or(ForecastError::DateOutOfRange)?;

    log::info!(
        "Factors: stringency={:.2} mobility={:.2} vaccination={:.2} combined={:.2}",
        adjusted.factors.stringency,
        adjusted.factors.mobility,
        adjusted.factors.vaccination,
        adjusted.factors.combined
    );
    log::info!(
        "Predicted cases: {:.0} (model baseline {:.0})",
        adjusted.value,
        baseline.value
    );

    Ok(ApiCustomPrediction {
        prediction: ApiPrediction {
            predictions: vec![ApiPoint {
                date,
                value: adjusted.value,
            }],
            historical: synthetic_history(current_cases, today)
                .into_iter()
                .map(ApiPoint::from)
                .collect(),
            risk_assessment: classify_risk(current_cases, adjusted.value),
            trend: classify_trend(current_cases, adjusted.value),
            current_cases,
            predicted_cases: adjusted.value,
        },
        factors: adjusted.factors,
        location: request.location.clone(),
    })
}

fn recent_points(series: &WeeklySeries) -> Vec<ApiPoint> {
    series.tail(SEQUENCE_LENGTH).iter().map(ApiPoint::from).collect()
}

fn internal_error(context: &str, e: &dyn Display) -> HttpResponse {
    log::error!("{context}: {e}");
    HttpResponse::InternalServerError().json(ApiError {
        error: e.to_string(),
    })
}
