//! DTO definitions used by the host REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{
        common::{HostParticipantSummary, RankingEntry},
        format_system_time,
    },
    state::{activity::LogEntry, session::BuzzerSession},
};

/// Credentials supplied when authenticating as the competition host.
#[derive(Debug, Deserialize, ToSchema)]
pub struct HostLoginRequest {
    pub password: String,
}

/// Token handed to a successfully authenticated host; subsequent host calls
/// present it in the `X-Host-Token` header.
#[derive(Debug, Serialize, ToSchema)]
pub struct HostLoginResponse {
    pub token: String,
    pub message: String,
}

/// Payload for rotating the host password.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 6, message = "New password must be at least 6 characters"))]
    pub new_password: String,
}

/// Names the team whose buzzer should be re-armed.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UnlockTeamRequest {
    pub team_name: String,
}

/// Activity log entry rendered for the host status view and the log stream.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct LogEntryDto {
    pub timestamp: String,
    pub message: String,
    pub severity: String,
}

impl From<&LogEntry> for LogEntryDto {
    fn from(entry: &LogEntry) -> Self {
        Self {
            timestamp: format_system_time(entry.timestamp),
            message: entry.message.clone(),
            severity: entry.severity.as_str().to_string(),
        }
    }
}

/// Probe response describing the competition as seen by the host. All fields
/// beyond `authenticated` are absent when the probe carries no valid token.
#[derive(Debug, Serialize, ToSchema)]
pub struct HostStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buzzer_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<HostParticipantSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rankings: Option<Vec<RankingEntry>>,
    /// Most recent activity entries, oldest first, at most 20.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<LogEntryDto>>,
}

impl HostStatusResponse {
    /// Probe answer when no valid host token was presented.
    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            buzzer_locked: None,
            participants: None,
            rankings: None,
            logs: None,
        }
    }

    /// Snapshot the session and recent activity for an authenticated host.
    pub fn snapshot(session: &BuzzerSession, logs: &[LogEntry]) -> Self {
        Self {
            authenticated: true,
            buzzer_locked: Some(session.is_locked()),
            participants: Some(
                session
                    .participants()
                    .map(HostParticipantSummary::from)
                    .collect(),
            ),
            rankings: Some(
                session
                    .rankings()
                    .into_iter()
                    .map(RankingEntry::from)
                    .collect(),
            ),
            logs: Some(logs.iter().map(LogEntryDto::from).collect()),
        }
    }
}
