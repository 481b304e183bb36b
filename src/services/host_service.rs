//! Host authentication, credential rotation, token lifecycle, and the host
//! status projection.

use std::time::SystemTime;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        common::ActionResponse,
        host::{ChangePasswordRequest, HostLoginRequest, HostLoginResponse, HostStatusResponse},
    },
    error::ServiceError,
    services::activity_service,
    state::{SharedState, activity::Severity},
};

/// Number of activity entries served by the host status probe.
const HOST_STATUS_LOG_LIMIT: usize = 20;

/// Exchange the host password for a fresh opaque token. Several hosts may
/// hold live tokens at the same time.
pub async fn authenticate(
    state: &SharedState,
    request: HostLoginRequest,
) -> Result<HostLoginResponse, ServiceError> {
    let matches = {
        let password = state.host_password().read().await;
        constant_time_eq(password.as_bytes(), request.password.as_bytes())
    };

    if !matches {
        warn!("host authentication failed");
        activity_service::record(state, Severity::Error, "Failed host authentication attempt")
            .await;
        return Err(ServiceError::Unauthorized("Incorrect password".into()));
    }

    let token = Uuid::new_v4().simple().to_string();
    state.host_tokens().insert(token.clone(), SystemTime::now());

    info!("host authenticated");
    activity_service::record(state, Severity::Success, "Host authenticated successfully").await;

    Ok(HostLoginResponse {
        token,
        message: "Authentication successful".to_string(),
    })
}

/// Rotate the host password. Already-issued host tokens stay valid; the new
/// password applies to future logins only.
pub async fn change_password(
    state: &SharedState,
    request: ChangePasswordRequest,
) -> Result<ActionResponse, ServiceError> {
    {
        let mut password = state.host_password().write().await;
        if !constant_time_eq(password.as_bytes(), request.current_password.as_bytes()) {
            return Err(ServiceError::Unauthorized(
                "Current password is incorrect".into(),
            ));
        }
        *password = request.new_password;
    }

    info!("host password changed");
    activity_service::record(
        state,
        Severity::Success,
        "Host password changed successfully",
    )
    .await;
    Ok(ActionResponse::new("Password changed successfully"))
}

/// Status probe serving the host dashboard. A missing or unknown token
/// answers `authenticated: false` rather than an error.
pub async fn host_status(state: &SharedState, token: Option<&str>) -> HostStatusResponse {
    let authenticated = token.is_some_and(|token| state.host_tokens().contains_key(token));
    if !authenticated {
        return HostStatusResponse::unauthenticated();
    }

    let logs = state.activity().recent(HOST_STATUS_LOG_LIMIT).await;
    let session = state.session().read().await;
    HostStatusResponse::snapshot(&session, &logs)
}

/// Truncate the activity log file and buffer, then record who did it.
pub async fn clear_logs(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    state.activity().clear().await?;

    info!("activity log cleared");
    activity_service::record(state, Severity::Info, "Log cleared by host").await;
    Ok(ActionResponse::new("Logs cleared"))
}

/// Revoke the presented host token. The log entry is written only when the
/// token was actually live.
pub async fn logout(state: &SharedState, token: &str) -> ActionResponse {
    if let Some((_, issued_at)) = state.host_tokens().remove(token) {
        if let Ok(session_age) = issued_at.elapsed() {
            info!(session_secs = session_age.as_secs(), "host logged out");
        }
        activity_service::record(state, Severity::Info, "Host logged out").await;
    }
    ActionResponse::new("Logged out")
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
