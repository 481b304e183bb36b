//! Business logic powering the participant REST routes: name checks,
//! registration, status projection, and the two removal paths (explicit
//! logout and stream-disconnect cleanup).

use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{
        common::ActionResponse,
        participant::{
            NameCheckRequest, NameCheckResponse, ParticipantStatusResponse, RegisterTeamRequest,
            RegisterTeamResponse,
        },
    },
    error::ServiceError,
    services::{activity_service, sse_events},
    state::{SharedState, activity::Severity, session::NameError},
};

/// Pre-submission name check. Read-only: the name is not reserved, so the
/// same rules are re-applied atomically inside [`register_team`].
pub async fn check_team_name(state: &SharedState, request: NameCheckRequest) -> NameCheckResponse {
    let session = state.session().read().await;
    match session.validate_name(&request.team_name) {
        Ok(_) => NameCheckResponse {
            valid: true,
            message: "Team name is available".to_string(),
        },
        // The check endpoint spells out the matching rule; register keeps the
        // shorter message.
        Err(NameError::Taken) => NameCheckResponse {
            valid: false,
            message: "Team name already exists (case-insensitive)".to_string(),
        },
        Err(err) => NameCheckResponse {
            valid: false,
            message: err.to_string(),
        },
    }
}

/// Register a new team and announce it to every connected client.
pub async fn register_team(
    state: &SharedState,
    request: RegisterTeamRequest,
) -> Result<RegisterTeamResponse, ServiceError> {
    let (participant, participant_count) = {
        let mut session = state.session().write().await;
        let participant = session.register(&request.team_name)?;
        let participant_count = session.participant_count();
        (participant, participant_count)
    };

    info!(team_name = %participant.team_name, "team registered");
    activity_service::record(
        state,
        Severity::Success,
        format!("Team \"{}\" joined the competition", participant.team_name),
    )
    .await;
    sse_events::broadcast_participant_joined(state, &participant.team_name, participant_count);

    let message = format!("Welcome, {}!", participant.team_name);
    Ok(RegisterTeamResponse {
        participant_id: participant.id,
        team_name: participant.team_name,
        message,
    })
}

/// Status probe serving the participant dashboard. A missing or unknown token
/// answers `authenticated: false` rather than an error.
pub async fn participant_status(
    state: &SharedState,
    participant_id: Option<Uuid>,
) -> ParticipantStatusResponse {
    let Some(id) = participant_id else {
        return ParticipantStatusResponse::unauthenticated();
    };

    let session = state.session().read().await;
    match session.participant(id) {
        Some(participant) => ParticipantStatusResponse::for_participant(&session, participant),
        None => ParticipantStatusResponse::unauthenticated(),
    }
}

/// Explicit participant logout. Idempotent: an unknown or absent token still
/// succeeds so a stale client can always clear its local session.
pub async fn logout_participant(
    state: &SharedState,
    participant_id: Option<Uuid>,
) -> ActionResponse {
    if let Some(id) = participant_id {
        remove_participant(state, id, "left the competition").await;
    }
    ActionResponse::new("Logged out")
}

/// Cleanup when a participant-bound SSE stream ends. Racing an explicit
/// logout is harmless because removal is idempotent.
pub async fn handle_disconnect(state: &SharedState, participant_id: Uuid) {
    remove_participant(state, participant_id, "disconnected").await;
}

async fn remove_participant(state: &SharedState, id: Uuid, reason: &str) {
    let removed = {
        let mut session = state.session().write().await;
        session
            .remove(id)
            .map(|participant| (participant, session.participant_count()))
    };

    // Log and broadcast only when this call actually removed someone.
    let Some((participant, participant_count)) = removed else {
        return;
    };

    info!(team_name = %participant.team_name, reason, "participant removed");
    activity_service::record(
        state,
        Severity::Info,
        format!("Team \"{}\" {reason}", participant.team_name),
    )
    .await;
    sse_events::broadcast_participant_left(state, &participant.team_name, participant_count);
}
