use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{Category, RedFlagCheck, ScreeningInstrument, UrgeEvent};
use super::escalation::NudgeContent;
use super::repository::{AssessmentStore, EventStore, RepositoryError, ScreeningStore};
use super::screening::{instrument_for, questions_for, red_flag_questions, ScreeningQuestion};
use super::service::{RiskService, RiskServiceError};

#[derive(Debug, Serialize, Deserialize)]
pub struct LogEventRequest {
    pub event: UrgeEvent,
    #[serde(default)]
    pub red_flags: RedFlagCheck,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScreeningRequest {
    pub instrument: ScreeningInstrument,
    pub category: Category,
    pub responses: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkipScreeningRequest {
    pub instrument: ScreeningInstrument,
    pub category: Category,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AssessRequest {
    #[serde(default)]
    pub red_flags: RedFlagCheck,
}

/// Questionnaire for one category plus the red-flag mini-check.
#[derive(Debug, Serialize)]
pub struct QuestionnaireResponse {
    pub category: Category,
    pub instrument: ScreeningInstrument,
    pub questions: Vec<ScreeningQuestion>,
    pub red_flags: Vec<ScreeningQuestion>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NudgeClaimResponse {
    pub shown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<NudgeContent>,
}

/// Router builder exposing the risk service over HTTP.
pub fn risk_router<E, S, A>(service: Arc<RiskService<E, S, A>>) -> Router
where
    E: EventStore + 'static,
    S: ScreeningStore + 'static,
    A: AssessmentStore + 'static,
{
    Router::new()
        .route("/api/v1/risk/events", post(log_event_handler::<E, S, A>))
        .route(
            "/api/v1/risk/screenings",
            post(record_screening_handler::<E, S, A>),
        )
        .route(
            "/api/v1/risk/screenings/skip",
            post(skip_screening_handler::<E, S, A>),
        )
        .route(
            "/api/v1/risk/screenings/:category/due",
            get(screening_due_handler::<E, S, A>),
        )
        .route(
            "/api/v1/risk/screenings/:category/questions",
            get(questionnaire_handler),
        )
        .route("/api/v1/risk/assessments", post(assess_handler::<E, S, A>))
        .route(
            "/api/v1/risk/nudges/claim",
            post(claim_nudge_handler::<E, S, A>),
        )
        .with_state(service)
}

pub(crate) async fn log_event_handler<E, S, A>(
    State(service): State<Arc<RiskService<E, S, A>>>,
    axum::Json(request): axum::Json<LogEventRequest>,
) -> Response
where
    E: EventStore + 'static,
    S: ScreeningStore + 'static,
    A: AssessmentStore + 'static,
{
    match service.log_event(request.event, request.red_flags, Utc::now()) {
        Ok(assessment) => (StatusCode::CREATED, axum::Json(assessment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_screening_handler<E, S, A>(
    State(service): State<Arc<RiskService<E, S, A>>>,
    axum::Json(request): axum::Json<ScreeningRequest>,
) -> Response
where
    E: EventStore + 'static,
    S: ScreeningStore + 'static,
    A: AssessmentStore + 'static,
{
    let ScreeningRequest {
        instrument,
        category,
        responses,
    } = request;

    match service.record_screening(instrument, category, responses, Utc::now()) {
        Ok(result) => (StatusCode::CREATED, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn skip_screening_handler<E, S, A>(
    State(service): State<Arc<RiskService<E, S, A>>>,
    axum::Json(request): axum::Json<SkipScreeningRequest>,
) -> Response
where
    E: EventStore + 'static,
    S: ScreeningStore + 'static,
    A: AssessmentStore + 'static,
{
    match service.skip_screening(request.instrument, request.category, Utc::now()) {
        Ok(result) => (StatusCode::CREATED, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn screening_due_handler<E, S, A>(
    State(service): State<Arc<RiskService<E, S, A>>>,
    Path(category): Path<String>,
) -> Response
where
    E: EventStore + 'static,
    S: ScreeningStore + 'static,
    A: AssessmentStore + 'static,
{
    let category = Category::new(category);
    match service.screening_due(&category, Utc::now()) {
        Ok(due) => {
            let payload = json!({
                "category": category,
                "due": due,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn questionnaire_handler(Path(category): Path<String>) -> Response {
    let category = Category::new(category);
    let instrument = instrument_for(&category);
    let payload = QuestionnaireResponse {
        questions: questions_for(instrument, &category),
        red_flags: red_flag_questions(&category),
        instrument,
        category,
    };
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn assess_handler<E, S, A>(
    State(service): State<Arc<RiskService<E, S, A>>>,
    axum::Json(request): axum::Json<AssessRequest>,
) -> Response
where
    E: EventStore + 'static,
    S: ScreeningStore + 'static,
    A: AssessmentStore + 'static,
{
    match service.assess(request.red_flags, Utc::now()) {
        Ok(assessment) => (StatusCode::CREATED, axum::Json(assessment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn claim_nudge_handler<E, S, A>(
    State(service): State<Arc<RiskService<E, S, A>>>,
) -> Response
where
    E: EventStore + 'static,
    S: ScreeningStore + 'static,
    A: AssessmentStore + 'static,
{
    match service.claim_nudge(Utc::now()) {
        Ok(content) => {
            let payload = NudgeClaimResponse {
                shown: content.is_some(),
                content,
            };
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: RiskServiceError) -> Response {
    let status = match &error {
        RiskServiceError::InvalidEvent(_) | RiskServiceError::Screening(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RiskServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        RiskServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        RiskServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
