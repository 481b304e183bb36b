//! DTO definitions used by the participant-facing REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        common::{ParticipantSummary, RankingEntry},
        format_system_time,
        validation::validate_team_name,
    },
    state::session::{BuzzerSession, Participant, PressOutcome},
};

/// Payload for the pre-submission team-name check.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NameCheckRequest {
    pub team_name: String,
}

/// Outcome of a team-name check. Always served with HTTP 200; rejected names
/// carry `valid: false` plus the reason.
#[derive(Debug, Serialize, ToSchema)]
pub struct NameCheckResponse {
    pub valid: bool,
    pub message: String,
}

/// Payload used to register a new team.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterTeamRequest {
    pub team_name: String,
}

impl Validate for RegisterTeamRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_team_name(&self.team_name) {
            errors.add("team_name", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Response confirming a successful registration. The `participant_id` doubles
/// as the caller's token for subsequent requests.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterTeamResponse {
    pub participant_id: Uuid,
    pub team_name: String,
    pub message: String,
}

/// Response for a committed buzzer press.
#[derive(Debug, Serialize, ToSchema)]
pub struct PressBuzzerResponse {
    pub message: String,
    /// 1-based position among all committed presses this round.
    pub rank: usize,
    pub pressed_at: String,
}

impl PressBuzzerResponse {
    /// Build the acknowledgement for a committed press.
    pub fn new(message: String, outcome: PressOutcome) -> Self {
        Self {
            message,
            rank: outcome.rank,
            pressed_at: format_system_time(outcome.pressed_at),
        }
    }
}

/// Probe response describing the competition as seen by one participant.
/// All fields beyond `authenticated` are absent when the probe carries no
/// valid participant token.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buzzer_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buzzer_pressed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buzzer_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rankings: Option<Vec<RankingEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<ParticipantSummary>>,
}

impl ParticipantStatusResponse {
    /// Probe answer when no valid participant token was presented.
    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            team_name: None,
            buzzer_locked: None,
            buzzer_pressed: None,
            buzzer_time: None,
            rankings: None,
            participants: None,
        }
    }

    /// Snapshot the session from one registered participant's point of view.
    pub fn for_participant(session: &BuzzerSession, participant: &Participant) -> Self {
        Self {
            authenticated: true,
            team_name: Some(participant.team_name.clone()),
            buzzer_locked: Some(session.is_locked()),
            buzzer_pressed: Some(participant.pressed()),
            buzzer_time: participant.buzzer_time.map(format_system_time),
            rankings: Some(
                session
                    .rankings()
                    .into_iter()
                    .map(RankingEntry::from)
                    .collect(),
            ),
            participants: Some(session.participants().map(ParticipantSummary::from).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterTeamRequest {
            team_name: "Quiz Wizards".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty = RegisterTeamRequest {
            team_name: "   ".to_string(),
        };
        assert!(empty.validate().is_err());

        let long = RegisterTeamRequest {
            team_name: "x".repeat(51),
        };
        assert!(long.validate().is_err());
    }
}
