use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        common::ActionResponse,
        host::{
            ChangePasswordRequest, HostLoginRequest, HostLoginResponse, HostStatusResponse,
            UnlockTeamRequest,
        },
    },
    error::AppError,
    services::{buzzer_service, host_service},
    state::SharedState,
};

const HOST_TOKEN_HEADER: &str = "x-host-token";

/// Host endpoints. Login and the status probe are open; every other route
/// requires a live host token.
pub fn router(state: SharedState) -> Router<SharedState> {
    let guarded = Router::<SharedState>::new()
        .route("/host/password", post(change_password))
        .route("/host/buzzer/unlock", post(unlock_all))
        .route("/host/buzzer/lock", post(lock_all))
        .route("/host/buzzer/unlock-team", post(unlock_team))
        .route("/host/buzzer/clear", post(clear_presses))
        .route("/host/logs/clear", post(clear_logs))
        .route("/host/logout", post(host_logout))
        .route_layer(middleware::from_fn_with_state(state, require_host_token));

    Router::<SharedState>::new()
        .route("/host/login", post(login))
        .route("/host/status", get(host_status))
        .merge(guarded)
}

async fn require_host_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(HOST_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing host token header `X-Host-Token`".into())
        })?;

    if state.host_tokens().contains_key(provided) {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid host token".into()))
    }
}

fn host_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(HOST_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
}

/// Exchange the host password for an opaque token.
#[utoipa::path(
    post,
    path = "/host/login",
    tag = "host",
    request_body = HostLoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = HostLoginResponse),
        (status = 401, description = "Incorrect password")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<HostLoginRequest>,
) -> Result<Json<HostLoginResponse>, AppError> {
    Ok(Json(host_service::authenticate(&state, payload).await?))
}

/// Probe the competition state as seen by the presented host token.
#[utoipa::path(
    get,
    path = "/host/status",
    tag = "host",
    params(("X-Host-Token" = Option<String>, Header, description = "Host token issued by /host/login")),
    responses((status = 200, description = "Host status", body = HostStatusResponse))
)]
pub async fn host_status(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Json<HostStatusResponse> {
    let token = host_token(&headers);
    Json(host_service::host_status(&state, token.as_deref()).await)
}

/// Rotate the host password.
#[utoipa::path(
    post,
    path = "/host/password",
    tag = "host",
    params(("X-Host-Token" = String, Header, description = "Host token issued by /host/login")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ActionResponse),
        (status = 400, description = "New password too short"),
        (status = 401, description = "Current password incorrect")
    )
)]
pub async fn change_password(
    State(state): State<SharedState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(host_service::change_password(&state, payload).await?))
}

/// Open the global gate and rearm every buzzer.
#[utoipa::path(
    post,
    path = "/host/buzzer/unlock",
    tag = "host",
    params(("X-Host-Token" = String, Header, description = "Host token issued by /host/login")),
    responses((status = 200, description = "Buzzer unlocked", body = ActionResponse))
)]
pub async fn unlock_all(State(state): State<SharedState>) -> Json<ActionResponse> {
    Json(buzzer_service::unlock_all(&state).await)
}

/// Close the global gate.
#[utoipa::path(
    post,
    path = "/host/buzzer/lock",
    tag = "host",
    params(("X-Host-Token" = String, Header, description = "Host token issued by /host/login")),
    responses((status = 200, description = "Buzzer locked", body = ActionResponse))
)]
pub async fn lock_all(State(state): State<SharedState>) -> Json<ActionResponse> {
    Json(buzzer_service::lock_all(&state).await)
}

/// Rearm a single team's buzzer by name.
#[utoipa::path(
    post,
    path = "/host/buzzer/unlock-team",
    tag = "host",
    params(("X-Host-Token" = String, Header, description = "Host token issued by /host/login")),
    request_body = UnlockTeamRequest,
    responses(
        (status = 200, description = "Team buzzer unlocked", body = ActionResponse),
        (status = 400, description = "Team name missing"),
        (status = 404, description = "No such team")
    )
)]
pub async fn unlock_team(
    State(state): State<SharedState>,
    Json(payload): Json<UnlockTeamRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(buzzer_service::unlock_team(&state, payload).await?))
}

/// Rearm every buzzer without touching the global gate.
#[utoipa::path(
    post,
    path = "/host/buzzer/clear",
    tag = "host",
    params(("X-Host-Token" = String, Header, description = "Host token issued by /host/login")),
    responses((status = 200, description = "Presses cleared", body = ActionResponse))
)]
pub async fn clear_presses(State(state): State<SharedState>) -> Json<ActionResponse> {
    Json(buzzer_service::clear_presses(&state).await)
}

/// Truncate the activity log.
#[utoipa::path(
    post,
    path = "/host/logs/clear",
    tag = "host",
    params(("X-Host-Token" = String, Header, description = "Host token issued by /host/login")),
    responses(
        (status = 200, description = "Logs cleared", body = ActionResponse),
        (status = 500, description = "Log file truncation failed")
    )
)]
pub async fn clear_logs(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(host_service::clear_logs(&state).await?))
}

/// Revoke the presented host token.
#[utoipa::path(
    post,
    path = "/host/logout",
    tag = "host",
    params(("X-Host-Token" = String, Header, description = "Host token issued by /host/login")),
    responses((status = 200, description = "Logged out", body = ActionResponse))
)]
pub async fn host_logout(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<ActionResponse>, AppError> {
    let token = host_token(&headers).ok_or_else(|| {
        AppError::Unauthorized("missing host token header `X-Host-Token`".into())
    })?;
    Ok(Json(host_service::logout(&state, &token).await))
}
