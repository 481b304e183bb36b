use serde::Serialize;
use utoipa::ToSchema;

use crate::{dto::format_system_time, state::session::PressOutcome};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Build an event from an already-rendered data payload.
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a new team registers.
pub struct ParticipantJoinedEvent {
    pub team_name: String,
    /// Roster size after the join.
    pub participant_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a team leaves, whether by explicit logout or disconnect.
pub struct ParticipantLeftEvent {
    pub team_name: String,
    /// Roster size after the departure.
    pub participant_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a press is committed, carrying the assigned rank.
pub struct BuzzerPressedEvent {
    pub team_name: String,
    pub rank: usize,
    pub pressed_at: String,
}

impl BuzzerPressedEvent {
    /// Build the broadcast payload for a committed press.
    pub fn new(team_name: impl Into<String>, outcome: PressOutcome) -> Self {
        Self {
            team_name: team_name.into(),
            rank: outcome.rank,
            pressed_at: format_system_time(outcome.pressed_at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the host re-arms a single team's buzzer.
pub struct ParticipantBuzzerUnlockedEvent {
    pub team_name: String,
}
