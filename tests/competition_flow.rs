use quickbuzz_back::config::AppConfig;
use quickbuzz_back::dto::host::{ChangePasswordRequest, HostLoginRequest, UnlockTeamRequest};
use quickbuzz_back::dto::participant::{NameCheckRequest, RegisterTeamRequest};
use quickbuzz_back::error::ServiceError;
use quickbuzz_back::services::{buzzer_service, host_service, participant_service, sse_service};
use quickbuzz_back::state::activity::ActivityLog;
use quickbuzz_back::state::{AppState, SharedState};
use tempfile::TempDir;

const TEST_PASSWORD: &str = "quickbuzz@2025";

async fn fresh_state(dir: &TempDir) -> SharedState {
    let config = AppConfig {
        host_password: TEST_PASSWORD.to_string(),
        activity_log_path: dir.path().join("activity.log"),
    };
    let activity = ActivityLog::open(config.activity_log_path.clone())
        .await
        .expect("activity log should open");
    AppState::new(config, activity)
}

/// End-to-end integration test for a complete competition flow
#[tokio::test]
async fn test_full_competition_flow() {
    let dir = TempDir::new().expect("temp dir");
    let state = fresh_state(&dir).await;

    // 1. Pre-submission name check
    let check = participant_service::check_team_name(
        &state,
        NameCheckRequest {
            team_name: "Quiz Wizards".to_string(),
        },
    )
    .await;
    assert!(check.valid);
    assert_eq!(check.message, "Team name is available");

    // 2. Register the first team
    let wizards = participant_service::register_team(
        &state,
        RegisterTeamRequest {
            team_name: "  Quiz Wizards  ".to_string(),
        },
    )
    .await
    .expect("registration should succeed");
    assert_eq!(wizards.team_name, "Quiz Wizards");
    assert_eq!(wizards.message, "Welcome, Quiz Wizards!");

    // 3. Case-insensitive duplicates are rejected
    let dup = participant_service::register_team(
        &state,
        RegisterTeamRequest {
            team_name: "quiz wizards".to_string(),
        },
    )
    .await
    .expect_err("duplicate name should be rejected");
    assert!(matches!(dup, ServiceError::InvalidInput(_)));

    let check = participant_service::check_team_name(
        &state,
        NameCheckRequest {
            team_name: "QUIZ WIZARDS".to_string(),
        },
    )
    .await;
    assert!(!check.valid);
    assert_eq!(check.message, "Team name already exists (case-insensitive)");

    // 4. Pressing while the gate is locked fails without mutating state
    let locked = buzzer_service::press_buzzer(&state, wizards.participant_id)
        .await
        .expect_err("gate starts locked");
    assert!(matches!(locked, ServiceError::InvalidState(_)));
    assert!(locked.to_string().contains("globally locked"));

    // 5. Host authentication
    let bad_login = host_service::authenticate(
        &state,
        HostLoginRequest {
            password: "nope".to_string(),
        },
    )
    .await
    .expect_err("wrong password should fail");
    assert!(matches!(bad_login, ServiceError::Unauthorized(_)));

    let login = host_service::authenticate(
        &state,
        HostLoginRequest {
            password: TEST_PASSWORD.to_string(),
        },
    )
    .await
    .expect("correct password should succeed");
    assert!(!login.token.is_empty());

    let status = host_service::host_status(&state, Some(&login.token)).await;
    assert!(status.authenticated);
    assert_eq!(status.buzzer_locked, Some(true));

    // 6. Unlock and press
    buzzer_service::unlock_all(&state).await;
    let press = buzzer_service::press_buzzer(&state, wizards.participant_id)
        .await
        .expect("press should succeed once unlocked");
    assert_eq!(press.rank, 1);
    assert_eq!(
        press.message,
        "Buzzer pressed! You are #1! Your buzzer is now locked."
    );

    // 7. A second team presses and ranks second
    let rivals = participant_service::register_team(
        &state,
        RegisterTeamRequest {
            team_name: "Rivals".to_string(),
        },
    )
    .await
    .expect("second registration should succeed");
    let second = buzzer_service::press_buzzer(&state, rivals.participant_id)
        .await
        .expect("second press should succeed");
    assert_eq!(second.rank, 2);

    // 8. Pressing twice is rejected
    let again = buzzer_service::press_buzzer(&state, wizards.participant_id)
        .await
        .expect_err("double press should fail");
    assert!(matches!(again, ServiceError::InvalidState(_)));
    assert!(again.to_string().contains("already pressed"));

    // 9. Participant status reflects both presses with dense ranks
    let status =
        participant_service::participant_status(&state, Some(wizards.participant_id)).await;
    assert!(status.authenticated);
    assert_eq!(status.buzzer_pressed, Some(true));
    let rankings = status.rankings.expect("rankings should be present");
    assert_eq!(rankings.len(), 2);
    assert_eq!(rankings[0].team_name, "Quiz Wizards");
    assert_eq!(rankings[0].rank, 1);
    assert_eq!(rankings[1].team_name, "Rivals");
    assert_eq!(rankings[1].rank, 2);

    // 10. Single-team unlock matches case-insensitively
    let unlock = buzzer_service::unlock_team(
        &state,
        UnlockTeamRequest {
            team_name: "quiz wizards".to_string(),
        },
    )
    .await
    .expect("unlock-team should succeed");
    assert_eq!(unlock.message, "Buzzer unlocked for Quiz Wizards");

    let status =
        participant_service::participant_status(&state, Some(wizards.participant_id)).await;
    assert_eq!(status.buzzer_pressed, Some(false));
    assert_eq!(
        status.rankings.expect("rankings should be present").len(),
        1
    );

    // 11. Unknown and empty unlock targets are rejected
    let missing = buzzer_service::unlock_team(
        &state,
        UnlockTeamRequest {
            team_name: "Ghosts".to_string(),
        },
    )
    .await
    .expect_err("unknown team should fail");
    assert!(matches!(missing, ServiceError::NotFound(_)));

    let empty = buzzer_service::unlock_team(
        &state,
        UnlockTeamRequest {
            team_name: "   ".to_string(),
        },
    )
    .await
    .expect_err("empty team name should fail");
    assert!(matches!(empty, ServiceError::InvalidInput(_)));

    // 12. Clearing presses rearms everyone but keeps the gate open
    buzzer_service::clear_presses(&state).await;
    let status = participant_service::participant_status(&state, Some(rivals.participant_id)).await;
    assert_eq!(status.buzzer_locked, Some(false));
    assert_eq!(status.buzzer_pressed, Some(false));
    assert!(
        status
            .rankings
            .expect("rankings should be present")
            .is_empty()
    );

    // 13. Host sees the activity trail, capped at 20 entries
    let status = host_service::host_status(&state, Some(&login.token)).await;
    let logs = status.logs.expect("logs should be present");
    assert!(logs.len() <= 20);
    assert!(
        logs.iter()
            .any(|entry| entry.message == "Team \"Quiz Wizards\" joined the competition")
    );

    // 14. Logout removes the participant; a second logout is a no-op
    participant_service::logout_participant(&state, Some(wizards.participant_id)).await;
    let status =
        participant_service::participant_status(&state, Some(wizards.participant_id)).await;
    assert!(!status.authenticated);
    participant_service::logout_participant(&state, Some(wizards.participant_id)).await;

    // 15. Host logout revokes the token
    host_service::logout(&state, &login.token).await;
    let status = host_service::host_status(&state, Some(&login.token)).await;
    assert!(!status.authenticated);
}

/// Two concurrent presses must resolve to distinct ranks 1 and 2.
#[tokio::test]
async fn test_concurrent_presses_get_distinct_ranks() {
    let dir = TempDir::new().expect("temp dir");
    let state = fresh_state(&dir).await;

    let alpha = participant_service::register_team(
        &state,
        RegisterTeamRequest {
            team_name: "Alpha".to_string(),
        },
    )
    .await
    .expect("register Alpha");
    let beta = participant_service::register_team(
        &state,
        RegisterTeamRequest {
            team_name: "Beta".to_string(),
        },
    )
    .await
    .expect("register Beta");

    buzzer_service::unlock_all(&state).await;

    let state_a = state.clone();
    let alpha_id = alpha.participant_id;
    let task_a = tokio::spawn(async move { buzzer_service::press_buzzer(&state_a, alpha_id).await });
    let state_b = state.clone();
    let beta_id = beta.participant_id;
    let task_b = tokio::spawn(async move { buzzer_service::press_buzzer(&state_b, beta_id).await });

    let press_a = task_a.await.expect("task a").expect("press a");
    let press_b = task_b.await.expect("task b").expect("press b");

    let mut ranks = vec![press_a.rank, press_b.rank];
    ranks.sort_unstable();
    assert_eq!(ranks, vec![1, 2]);
}

/// Password rotation: the old password stops working, the new one logs in.
#[tokio::test]
async fn test_password_change_flow() {
    let dir = TempDir::new().expect("temp dir");
    let state = fresh_state(&dir).await;

    let wrong = host_service::change_password(
        &state,
        ChangePasswordRequest {
            current_password: "guess".to_string(),
            new_password: "longenough".to_string(),
        },
    )
    .await
    .expect_err("wrong current password should fail");
    assert!(matches!(wrong, ServiceError::Unauthorized(_)));

    host_service::change_password(
        &state,
        ChangePasswordRequest {
            current_password: TEST_PASSWORD.to_string(),
            new_password: "fresh-secret".to_string(),
        },
    )
    .await
    .expect("password change should succeed");

    let old = host_service::authenticate(
        &state,
        HostLoginRequest {
            password: TEST_PASSWORD.to_string(),
        },
    )
    .await
    .expect_err("old password should stop working");
    assert!(matches!(old, ServiceError::Unauthorized(_)));

    host_service::authenticate(
        &state,
        HostLoginRequest {
            password: "fresh-secret".to_string(),
        },
    )
    .await
    .expect("new password should log in");
}

/// Public subscribers observe the join, unlock, and press events in order.
#[tokio::test]
async fn test_broadcasts_reach_public_subscribers() {
    let dir = TempDir::new().expect("temp dir");
    let state = fresh_state(&dir).await;

    let mut receiver = sse_service::subscribe_public(&state);

    let team = participant_service::register_team(
        &state,
        RegisterTeamRequest {
            team_name: "Spectated".to_string(),
        },
    )
    .await
    .expect("register");
    buzzer_service::unlock_all(&state).await;
    buzzer_service::press_buzzer(&state, team.participant_id)
        .await
        .expect("press");

    let joined = receiver.recv().await.expect("joined event");
    assert_eq!(joined.event.as_deref(), Some("participant_joined"));
    let payload: serde_json::Value =
        serde_json::from_str(&joined.data).expect("joined payload should be JSON");
    assert_eq!(payload["team_name"], "Spectated");
    assert_eq!(payload["participant_count"], 1);

    let unlocked = receiver.recv().await.expect("unlocked event");
    assert_eq!(unlocked.event.as_deref(), Some("buzzer_unlocked"));

    let pressed = receiver.recv().await.expect("pressed event");
    assert_eq!(pressed.event.as_deref(), Some("buzzer_pressed"));
    let payload: serde_json::Value =
        serde_json::from_str(&pressed.data).expect("pressed payload should be JSON");
    assert_eq!(payload["rank"], 1);

    // The host-only log feed never reaches public subscribers.
    host_service::logout(&state, "unknown-token").await;
    assert!(
        receiver.try_recv().is_err(),
        "no further public events expected"
    );
}

/// Removing the same participant twice — an explicit logout racing the
/// disconnect cleanup — announces and logs the departure exactly once.
#[tokio::test]
async fn test_repeated_removal_broadcasts_one_departure() {
    let dir = TempDir::new().expect("temp dir");
    let state = fresh_state(&dir).await;

    let team = participant_service::register_team(
        &state,
        RegisterTeamRequest {
            team_name: "One Shot".to_string(),
        },
    )
    .await
    .expect("register");

    let mut receiver = sse_service::subscribe_public(&state);

    participant_service::logout_participant(&state, Some(team.participant_id)).await;
    participant_service::logout_participant(&state, Some(team.participant_id)).await;
    participant_service::handle_disconnect(&state, team.participant_id).await;

    let mut left_events = 0;
    while let Ok(event) = receiver.try_recv() {
        if event.event.as_deref() == Some("participant_left") {
            left_events += 1;
        }
    }
    assert_eq!(left_events, 1, "departure must be announced exactly once");

    let logs = state.activity().recent(20).await;
    assert_eq!(
        logs.iter()
            .filter(|entry| entry.message == "Team \"One Shot\" left the competition")
            .count(),
        1
    );
    assert!(
        logs.iter()
            .all(|entry| entry.message != "Team \"One Shot\" disconnected"),
        "disconnect cleanup after logout must not log a departure"
    );
}

/// The host stream requires a live token and carries the log feed.
#[tokio::test]
async fn test_host_stream_gated_by_token() {
    let dir = TempDir::new().expect("temp dir");
    let state = fresh_state(&dir).await;

    let denied = sse_service::subscribe_host(&state, "bogus");
    assert!(matches!(denied, Err(ServiceError::Unauthorized(_))));

    let login = host_service::authenticate(
        &state,
        HostLoginRequest {
            password: TEST_PASSWORD.to_string(),
        },
    )
    .await
    .expect("login");
    let mut receiver = sse_service::subscribe_host(&state, &login.token).expect("subscribe");

    buzzer_service::lock_all(&state).await;

    let update = receiver.recv().await.expect("log update event");
    assert_eq!(update.event.as_deref(), Some("log_update"));
    let payload: serde_json::Value =
        serde_json::from_str(&update.data).expect("log payload should be JSON");
    assert_eq!(payload["message"], "Buzzer locked by host");
    assert_eq!(payload["severity"], "info");
}
