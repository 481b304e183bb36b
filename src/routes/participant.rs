use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        common::ActionResponse,
        participant::{
            NameCheckRequest, NameCheckResponse, ParticipantStatusResponse, PressBuzzerResponse,
            RegisterTeamRequest, RegisterTeamResponse,
        },
    },
    error::AppError,
    services::{buzzer_service, participant_service},
    state::SharedState,
};

const PARTICIPANT_TOKEN_HEADER: &str = "x-participant-token";

/// Participant endpoints: name check, registration, status, press, logout.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/team/validate-name", post(validate_name))
        .route("/team/register", post(register))
        .route("/team/status", get(status))
        .route("/team/buzzer/press", post(press))
        .route("/team/logout", post(logout))
}

fn participant_token(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(PARTICIPANT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
}

/// Check a team name against the registration rules without reserving it.
#[utoipa::path(
    post,
    path = "/team/validate-name",
    tag = "participant",
    request_body = NameCheckRequest,
    responses((status = 200, description = "Name check result", body = NameCheckResponse))
)]
pub async fn validate_name(
    State(state): State<SharedState>,
    Json(payload): Json<NameCheckRequest>,
) -> Json<NameCheckResponse> {
    Json(participant_service::check_team_name(&state, payload).await)
}

/// Register a new team and receive the participant token.
#[utoipa::path(
    post,
    path = "/team/register",
    tag = "participant",
    request_body = RegisterTeamRequest,
    responses(
        (status = 200, description = "Team registered", body = RegisterTeamResponse),
        (status = 400, description = "Name rejected")
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterTeamRequest>,
) -> Result<Json<RegisterTeamResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        participant_service::register_team(&state, payload).await?,
    ))
}

/// Probe the competition state as seen by the presented participant token.
#[utoipa::path(
    get,
    path = "/team/status",
    tag = "participant",
    params(("X-Participant-Token" = Option<String>, Header, description = "Participant token issued by /team/register")),
    responses((status = 200, description = "Participant status", body = ParticipantStatusResponse))
)]
pub async fn status(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Json<ParticipantStatusResponse> {
    let participant_id = participant_token(&headers);
    Json(participant_service::participant_status(&state, participant_id).await)
}

/// Commit a buzzer press for the authenticated participant.
#[utoipa::path(
    post,
    path = "/team/buzzer/press",
    tag = "participant",
    params(("X-Participant-Token" = String, Header, description = "Participant token issued by /team/register")),
    responses(
        (status = 200, description = "Press committed", body = PressBuzzerResponse),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Globally locked or already pressed")
    )
)]
pub async fn press(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<PressBuzzerResponse>, AppError> {
    let participant_id = participant_token(&headers)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;
    Ok(Json(
        buzzer_service::press_buzzer(&state, participant_id).await?,
    ))
}

/// Leave the competition. Succeeds even when the token is stale or absent.
#[utoipa::path(
    post,
    path = "/team/logout",
    tag = "participant",
    params(("X-Participant-Token" = Option<String>, Header, description = "Participant token issued by /team/register")),
    responses((status = 200, description = "Logged out", body = ActionResponse))
)]
pub async fn logout(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Json<ActionResponse> {
    let participant_id = participant_token(&headers);
    Json(participant_service::logout_participant(&state, participant_id).await)
}
