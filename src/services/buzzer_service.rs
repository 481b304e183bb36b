//! Buzzer press handling and the host-side gate transitions. Each operation
//! runs its whole check-then-mutate sequence inside one session write lock,
//! then logs and broadcasts after the lock is dropped.

use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{common::ActionResponse, host::UnlockTeamRequest, participant::PressBuzzerResponse},
    error::ServiceError,
    services::{activity_service, sse_events},
    state::{SharedState, activity::Severity, session::PressError},
};

/// Commit a buzzer press for the authenticated participant, returning the
/// assigned rank.
pub async fn press_buzzer(
    state: &SharedState,
    participant_id: Uuid,
) -> Result<PressBuzzerResponse, ServiceError> {
    let (team_name, outcome) = {
        let mut session = state.session().write().await;
        let team_name = session
            .participant(participant_id)
            .map(|participant| participant.team_name.clone())
            .ok_or(PressError::UnknownParticipant)?;
        let outcome = session.press(participant_id)?;
        (team_name, outcome)
    };

    info!(team_name = %team_name, rank = outcome.rank, "buzzer pressed");
    activity_service::record(
        state,
        Severity::Success,
        format!(
            "Team \"{team_name}\" pressed the buzzer (Rank #{})!",
            outcome.rank
        ),
    )
    .await;
    sse_events::broadcast_buzzer_pressed(state, &team_name, outcome);

    let message = format!(
        "Buzzer pressed! You are #{}! Your buzzer is now locked.",
        outcome.rank
    );
    Ok(PressBuzzerResponse::new(message, outcome))
}

/// Open the global gate and rearm every buzzer.
pub async fn unlock_all(state: &SharedState) -> ActionResponse {
    {
        let mut session = state.session().write().await;
        session.unlock_all();
    }

    info!("buzzer unlocked for all teams");
    activity_service::record(
        state,
        Severity::Success,
        "Buzzer unlocked for all participants by host",
    )
    .await;
    sse_events::broadcast_buzzer_unlocked(state);
    ActionResponse::new("Buzzer unlocked for everyone")
}

/// Close the global gate. Individual press state is left untouched.
pub async fn lock_all(state: &SharedState) -> ActionResponse {
    {
        let mut session = state.session().write().await;
        session.lock();
    }

    info!("buzzer locked for all teams");
    activity_service::record(state, Severity::Info, "Buzzer locked by host").await;
    sse_events::broadcast_buzzer_locked(state);
    ActionResponse::new("Buzzer locked")
}

/// Rearm one team's buzzer, identified case-insensitively by name.
pub async fn unlock_team(
    state: &SharedState,
    request: UnlockTeamRequest,
) -> Result<ActionResponse, ServiceError> {
    let team_name = request.team_name.trim();
    if team_name.is_empty() {
        return Err(ServiceError::InvalidInput("Team name is required".into()));
    }

    let canonical = {
        let mut session = state.session().write().await;
        session.unlock_team(team_name)
    }
    .ok_or_else(|| ServiceError::NotFound("Participant not found".into()))?;

    info!(team_name = %canonical, "buzzer unlocked for one team");
    activity_service::record(
        state,
        Severity::Info,
        format!("Buzzer unlocked for team \"{canonical}\" by host"),
    )
    .await;
    sse_events::broadcast_participant_buzzer_unlocked(state, &canonical);
    Ok(ActionResponse::new(format!(
        "Buzzer unlocked for {canonical}"
    )))
}

/// Rearm every buzzer without touching the global gate.
pub async fn clear_presses(state: &SharedState) -> ActionResponse {
    {
        let mut session = state.session().write().await;
        session.clear_presses();
    }

    info!("all buzzer presses cleared");
    activity_service::record(state, Severity::Info, "All buzzer presses cleared by host").await;
    sse_events::broadcast_buzzer_cleared(state);
    ActionResponse::new("All buzzer presses cleared")
}
