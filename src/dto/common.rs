use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::format_system_time,
    state::session::{Participant, RankedPress},
};

/// One row of the derived press ranking served to every client.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct RankingEntry {
    pub team_name: String,
    pub buzzer_time: String,
    pub rank: usize,
}

impl From<RankedPress> for RankingEntry {
    fn from(press: RankedPress) -> Self {
        Self {
            team_name: press.team_name,
            buzzer_time: format_system_time(press.buzzer_time),
            rank: press.rank,
        }
    }
}

/// Participant projection shared with other participants.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ParticipantSummary {
    pub team_name: String,
    pub buzzer_pressed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buzzer_time: Option<String>,
}

impl From<&Participant> for ParticipantSummary {
    fn from(participant: &Participant) -> Self {
        Self {
            team_name: participant.team_name.clone(),
            buzzer_pressed: participant.pressed(),
            buzzer_time: participant.buzzer_time.map(format_system_time),
        }
    }
}

/// Participant projection for the host view, which also sees join times.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct HostParticipantSummary {
    pub team_name: String,
    pub join_time: String,
    pub buzzer_pressed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buzzer_time: Option<String>,
}

impl From<&Participant> for HostParticipantSummary {
    fn from(participant: &Participant) -> Self {
        Self {
            team_name: participant.team_name.clone(),
            join_time: format_system_time(participant.join_time),
            buzzer_pressed: participant.pressed(),
            buzzer_time: participant.buzzer_time.map(format_system_time),
        }
    }
}

/// Generic action acknowledgement used by participant and host endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

impl ActionResponse {
    /// Wrap a human-readable confirmation message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
