use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        host::LogEntryDto,
        sse::{
            BuzzerPressedEvent, ParticipantBuzzerUnlockedEvent, ParticipantJoinedEvent,
            ParticipantLeftEvent, ServerEvent,
        },
    },
    state::{SharedState, session::PressOutcome},
};

const EVENT_PARTICIPANT_JOINED: &str = "participant_joined";
const EVENT_PARTICIPANT_LEFT: &str = "participant_left";
const EVENT_BUZZER_PRESSED: &str = "buzzer_pressed";
const EVENT_BUZZER_LOCKED: &str = "buzzer_locked";
const EVENT_BUZZER_UNLOCKED: &str = "buzzer_unlocked";
const EVENT_BUZZER_CLEARED: &str = "buzzer_cleared";
const EVENT_PARTICIPANT_BUZZER_UNLOCKED: &str = "participant_buzzer_unlocked";
const EVENT_LOG_UPDATE: &str = "log_update";

/// Broadcast that a new team joined the roster.
pub fn broadcast_participant_joined(
    state: &SharedState,
    team_name: &str,
    participant_count: usize,
) {
    let payload = ParticipantJoinedEvent {
        team_name: team_name.to_string(),
        participant_count,
    };
    send_public_event(state, EVENT_PARTICIPANT_JOINED, &payload);
}

/// Broadcast that a team left the roster, by logout or disconnect.
pub fn broadcast_participant_left(state: &SharedState, team_name: &str, participant_count: usize) {
    let payload = ParticipantLeftEvent {
        team_name: team_name.to_string(),
        participant_count,
    };
    send_public_event(state, EVENT_PARTICIPANT_LEFT, &payload);
}

/// Broadcast a committed press together with its assigned rank.
pub fn broadcast_buzzer_pressed(state: &SharedState, team_name: &str, outcome: PressOutcome) {
    let payload = BuzzerPressedEvent::new(team_name, outcome);
    send_public_event(state, EVENT_BUZZER_PRESSED, &payload);
}

/// Broadcast that the host closed the global gate.
pub fn broadcast_buzzer_locked(state: &SharedState) {
    send_public_event(state, EVENT_BUZZER_LOCKED, &serde_json::json!({}));
}

/// Broadcast that the host opened the global gate and rearmed every buzzer.
pub fn broadcast_buzzer_unlocked(state: &SharedState) {
    send_public_event(state, EVENT_BUZZER_UNLOCKED, &serde_json::json!({}));
}

/// Broadcast that the host cleared every press without touching the gate.
pub fn broadcast_buzzer_cleared(state: &SharedState) {
    send_public_event(state, EVENT_BUZZER_CLEARED, &serde_json::json!({}));
}

/// Broadcast that the host re-armed a single team's buzzer.
pub fn broadcast_participant_buzzer_unlocked(state: &SharedState, team_name: &str) {
    let payload = ParticipantBuzzerUnlockedEvent {
        team_name: team_name.to_string(),
    };
    send_public_event(state, EVENT_PARTICIPANT_BUZZER_UNLOCKED, &payload);
}

/// Push a fresh activity entry onto the host-only stream.
pub fn broadcast_log_update(state: &SharedState, entry: &LogEntryDto) {
    send_host_event(state, EVENT_LOG_UPDATE, entry);
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}

fn send_host_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.host_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize host SSE payload"),
    }
}
