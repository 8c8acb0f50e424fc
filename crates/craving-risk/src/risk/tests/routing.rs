use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::risk::router::risk_router;
use crate::risk::{RiskConfig, RiskService};

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn memory_router() -> axum::Router {
    let (service, _) = build_service();
    risk_router(Arc::new(service))
}

#[tokio::test]
async fn out_of_range_answers_return_unprocessable() {
    let response = memory_router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/risk/screenings",
            json!({ "instrument": "audit_c", "category": "alcohol", "responses": [9, 0, 0] }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("AUDIT-C"));
}

#[tokio::test]
async fn valid_screening_is_created_with_its_band() {
    let response = memory_router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/risk/screenings",
            json!({ "instrument": "sds", "category": " Gambling ", "responses": [2, 2, 2, 1, 0] }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["band"], "high");
    assert_eq!(body["category"], "gambling");
    assert_eq!(body["skipped"], false);
}

#[tokio::test]
async fn skip_is_recorded_as_low() {
    let response = memory_router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/risk/screenings/skip",
            json!({ "instrument": "audit_c", "category": "alcohol" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["skipped"], true);
    assert_eq!(body["band"], "low");
    assert_eq!(body["responses"], json!([]));
}

#[tokio::test]
async fn first_screening_is_due() {
    let response = memory_router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/risk/screenings/gambling/due")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body, json!({ "category": "gambling", "due": true }));
}

#[tokio::test]
async fn logging_an_event_returns_the_assessment() {
    let response = memory_router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/risk/events",
            json!({
                "event": {
                    "timestamp": Utc::now().timestamp_millis() - 60_000,
                    "event_type": "went_with_urge",
                    "intensity": 6
                },
                "red_flags": { "status": "checked", "flags": {
                    "morning_use": false,
                    "withdrawal": true,
                    "blackout": false,
                    "failed_cut_down": false
                } }
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["urges_7d"], 1);
    assert_eq!(body["nudge_tier"], "firm");
    assert_eq!(body["rule_triggered"], "withdrawal_symptoms");
}

#[tokio::test]
async fn assessment_without_flags_is_not_collected() {
    let response = memory_router()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/risk/assessments",
            json!({}),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["nudge_tier"], "none");
    assert_eq!(body["red_flags"], json!({ "status": "not_collected" }));
    assert!(body.get("rule_triggered").is_none());
}

#[tokio::test]
async fn claim_without_assessment_shows_nothing() {
    let response = memory_router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/risk/nudges/claim")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body, json!({ "shown": false }));
}

#[tokio::test]
async fn store_outage_maps_to_server_error() {
    let store = Arc::new(UnavailableStore);
    let service = RiskService::new(store.clone(), store.clone(), store, RiskConfig::default());
    let response = risk_router(Arc::new(service))
        .oneshot(json_request(
            Method::POST,
            "/api/v1/risk/assessments",
            json!({}),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("database offline"));
}

#[tokio::test]
async fn out_of_scale_intensity_is_unprocessable() {
    let (service, store) = build_service();
    let response = risk_router(Arc::new(service))
        .oneshot(json_request(
            Method::POST,
            "/api/v1/risk/events",
            json!({
                "event": {
                    "timestamp": Utc::now().timestamp_millis(),
                    "event_type": "bypassed_urge",
                    "intensity": 200
                }
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("intensity 200"));
    assert!(store.events.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn questionnaire_follows_the_category() {
    let response = memory_router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/risk/screenings/Alcohol/questions")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["category"], "alcohol");
    assert_eq!(body["instrument"], "audit_c");
    assert_eq!(body["questions"].as_array().expect("questions").len(), 3);
    assert_eq!(body["red_flags"].as_array().expect("red flags").len(), 4);

    let response = memory_router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/risk/screenings/gambling/questions")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    let body = read_json_body(response).await;
    assert_eq!(body["instrument"], "sds");
    assert_eq!(body["questions"].as_array().expect("questions").len(), 5);
    assert_eq!(body["questions"][0]["scores"], json!([0, 1, 2, 3]));
}
