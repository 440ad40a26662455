use actix_web::{App, http::StatusCode, test, web};
use chrono::{Days, NaiveDate};
use serde_json::{Value, json};
use viralcast_artifacts::{Artifacts, WeeklySeries};
use viralcast_forecast::{ForecastError, Scaler, SequenceModel};
use viralcast_forecast_models::WeeklyObservation;
use viralcast_server::{AppState, configure_api};

/// Scales by 1/1000 so the mock model works in small numbers.
struct Thousandths;

impl Scaler for Thousandths {
    fn transform(&self, value: f64) -> f64 {
        value / 1000.0
    }

    fn inverse_transform(&self, value: f64) -> f64 {
        value * 1000.0
    }
}

/// Predicts the last scaled value plus a fixed step.
struct LastPlus(f64);

impl SequenceModel for LastPlus {
    fn predict(&self, window: &[f64]) -> Result<f64, ForecastError> {
        Ok(window.last().copied().unwrap_or_default() + self.0)
    }
}

fn weekly_series(weeks: u64, cases: f64) -> WeeklySeries {
    let start = NaiveDate::from_ymd_opt(2024, 10, 6).unwrap();
    let observations = (0..weeks)
        .map(|i| WeeklyObservation {
            date: start + Days::new(7 * i),
            new_cases: cases + i as f64,
            hosp_patients: Some(3_200.0),
            positive_rate: None,
        })
        .collect();
    WeeklySeries::from_observations(observations).unwrap()
}

fn loaded_state(step: f64) -> AppState {
    AppState {
        artifacts: Artifacts::new(
            Some(Box::new(LastPlus(step))),
            Some(Box::new(Thousandths)),
            Some(weekly_series(20, 100_000.0)),
        ),
        variant: "PQ.2".to_string(),
    }
}

fn degraded_state() -> AppState {
    AppState {
        artifacts: Artifacts::default(),
        variant: "PQ.2".to_string(),
    }
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_api),
        )
        .await
    };
}

#[actix_web::test]
async fn health_reports_loaded_artifacts() {
    let app = app!(loaded_state(0.0));
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!({"status": "healthy", "model_loaded": true, "data_loaded": true})
    );
}

#[actix_web::test]
async fn health_is_ok_in_degraded_mode() {
    let app = app!(degraded_state());
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["model_loaded"], false);
    assert_eq!(body["data_loaded"], false);
}

#[actix_web::test]
async fn current_stats_describe_latest_week() {
    let app = app!(loaded_state(0.0));
    let req = test::TestRequest::get().uri("/api/current-stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    // 20 weeks from 2024-10-06 ends on 2025-02-16
    assert_eq!(body["date"], "Feb 16, 2025");
    assert_eq!(body["weekly_cases"], 100_019.0);
    assert_eq!(body["hospitalizations"], 3_200.0);
    assert_eq!(body["positive_rate"], 0.0);
    assert_eq!(body["variant"], "PQ.2");
}

#[actix_web::test]
async fn historical_returns_last_twelve_weeks() {
    let app = app!(loaded_state(0.0));
    let req = test::TestRequest::get().uri("/api/historical").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let points = body["historical"].as_array().unwrap();
    assert_eq!(points.len(), 12);
    assert_eq!(points[0]["date"], "2024-12-01");
    assert_eq!(points[11]["date"], "2025-02-16");
    assert_eq!(points[11]["value"], 100_019.0);
}

#[actix_web::test]
async fn predict_forecasts_one_week_ahead() {
    let app = app!(loaded_state(50.0));
    let req = test::TestRequest::get().uri("/api/predict").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let predictions = body["predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0]["date"], "2025-02-23");

    let predicted = body["predicted_cases"].as_f64().unwrap();
    assert!((predicted - 150_019.0).abs() < 1e-6);
    assert_eq!(body["current_cases"], 100_019.0);
    assert_eq!(body["historical"].as_array().unwrap().len(), 12);
    assert_eq!(body["trend"], "Increasing");
    assert_eq!(body["risk_assessment"]["level"], "Moderate");
    assert_eq!(body["risk_assessment"]["color"], "yellow");
}

#[actix_web::test]
async fn predict_clamps_only_the_charted_forecast() {
    let app = app!(loaded_state(-500.0));
    let req = test::TestRequest::get().uri("/api/predict").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    // (100.019 - 500) * 1000
    let predicted = body["predicted_cases"].as_f64().unwrap();
    assert!((predicted + 399_981.0).abs() < 1e-6);
    assert_eq!(body["predictions"][0]["value"], 0.0);
    assert_eq!(body["trend"], "Decreasing");

    let score = body["risk_assessment"]["score"].as_f64().unwrap();
    assert!((score + 149_981.0).abs() < 1e-6);
    assert_eq!(body["risk_assessment"]["level"], "Low");
}

#[actix_web::test]
async fn predict_fails_in_degraded_mode() {
    let app = app!(degraded_state());
    for uri in ["/api/predict", "/api/current-stats", "/api/historical"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");

        let body: Value = test::read_body_json(resp).await;
        assert!(!body["error"].as_str().unwrap().is_empty(), "{uri}");
    }
}

#[actix_web::test]
async fn predict_fails_with_short_history() {
    let state = AppState {
        artifacts: Artifacts::new(
            Some(Box::new(LastPlus(0.0))),
            Some(Box::new(Thousandths)),
            Some(weekly_series(8, 1_000.0)),
        ),
        variant: "PQ.2".to_string(),
    };
    let app = app!(state);
    let req = test::TestRequest::get().uri("/api/predict").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn predict_custom_applies_policy_factors() {
    let app = app!(loaded_state(0.0));
    let req = test::TestRequest::post()
        .uri("/api/predict-custom")
        .set_json(json!({
            "location": "Kigali",
            "previousWeekCases": 1000,
            "stringencyIndex": 100,
            "mobility": 0,
            "vaccinationRate": 100,
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let predicted = body["predicted_cases"].as_f64().unwrap();
    assert!((predicted - 700.0).abs() < 1e-9);
    assert!((body["factors"]["combined"].as_f64().unwrap() - 0.7).abs() < 1e-9);
    assert_eq!(body["current_cases"], 1000.0);
    assert_eq!(body["trend"], "Decreasing");
    assert_eq!(body["risk_assessment"]["level"], "Low");
    assert_eq!(body["location"], "Kigali");

    let historical = body["historical"].as_array().unwrap();
    assert_eq!(historical.len(), 4);
    let values: Vec<f64> = historical
        .iter()
        .map(|p| p["value"].as_f64().unwrap())
        .collect();
    for (actual, expected) in values.iter().zip([800.0, 900.0, 1000.0, 1100.0]) {
        assert!((actual - expected).abs() < 1e-9);
    }
}

#[actix_web::test]
async fn predict_custom_uses_defaults_for_missing_fields() {
    let app = app!(loaded_state(0.0));
    let req = test::TestRequest::post()
        .uri("/api/predict-custom")
        .set_json(json!({"previousWeekCases": "2000"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    // Defaults 50/0/50 give factors 0.75, 1.0, 0.75 and combined 0.85
    let predicted = body["predicted_cases"].as_f64().unwrap();
    assert!((predicted - 1700.0).abs() < 1e-9);
    assert_eq!(body["location"], "Unknown");
}

#[actix_web::test]
async fn predict_custom_rejects_malformed_body() {
    let app = app!(loaded_state(0.0));
    for payload in ["not json", r#"{"mobility": "lots"}"#, ""] {
        let req = test::TestRequest::post()
            .uri("/api/predict-custom")
            .insert_header(("content-type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "{payload:?}"
        );

        let body: Value = test::read_body_json(resp).await;
        assert!(!body["error"].as_str().unwrap().is_empty());
    }
}

#[actix_web::test]
async fn predict_custom_fails_without_model() {
    let app = app!(degraded_state());
    let req = test::TestRequest::post()
        .uri("/api/predict-custom")
        .set_json(json!({"previousWeekCases": 1000}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
