//! In-memory buzzer session: the participant roster, the global gate, and the
//! press-ordering rules. Every compound check-then-mutate lives in a method on
//! [`BuzzerSession`] so callers holding the state lock get one indivisible
//! operation per call.

use std::time::SystemTime;

use indexmap::IndexMap;
use thiserror::Error;
use uuid::Uuid;

/// Upper bound on team name length, counted in characters after trimming.
pub const TEAM_NAME_MAX_LEN: usize = 50;

/// A registered team and its buzzer state.
#[derive(Debug, Clone)]
pub struct Participant {
    /// Opaque identifier allocated at registration, never reused.
    pub id: Uuid,
    /// Display name, unique case-insensitively across the roster.
    pub team_name: String,
    /// When the team registered.
    pub join_time: SystemTime,
    /// When the team's current press was committed, if any.
    pub buzzer_time: Option<SystemTime>,
    /// Position of the press in global commit order; set and cleared together
    /// with `buzzer_time`.
    press_seq: Option<u64>,
}

impl Participant {
    fn new(team_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            team_name,
            join_time: SystemTime::now(),
            buzzer_time: None,
            press_seq: None,
        }
    }

    /// Whether this participant's buzzer is currently pressed (individually locked).
    pub fn pressed(&self) -> bool {
        self.buzzer_time.is_some()
    }

    fn reset_press(&mut self) {
        self.buzzer_time = None;
        self.press_seq = None;
    }
}

/// Why a team name was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name is empty once surrounding whitespace is trimmed.
    #[error("Team name cannot be empty")]
    Empty,
    /// The name exceeds [`TEAM_NAME_MAX_LEN`] characters.
    #[error("Team name must be {TEAM_NAME_MAX_LEN} characters or less")]
    TooLong,
    /// Another registered team already uses the name (ignoring case).
    #[error("Team name already exists")]
    Taken,
}

/// Why a press attempt was refused. No state changes when any of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PressError {
    /// The presented id does not belong to a registered participant.
    #[error("Not authenticated")]
    UnknownParticipant,
    /// The host has not opened the round.
    #[error("Buzzer is globally locked")]
    GloballyLocked,
    /// This participant already holds a committed press.
    #[error("Your buzzer is locked - you already pressed it")]
    AlreadyPressed,
}

/// Result of a committed press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressOutcome {
    /// 1-based position among currently pressed participants.
    pub rank: usize,
    /// Timestamp captured at the commit moment.
    pub pressed_at: SystemTime,
}

/// One entry of the derived ranking, ordered by press commit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedPress {
    /// Team that pressed.
    pub team_name: String,
    /// When the press was committed.
    pub buzzer_time: SystemTime,
    /// 1-based rank, dense from 1 with no gaps.
    pub rank: usize,
}

/// Shared buzzer competition state: the roster plus the global gate.
///
/// A fresh session starts locked with an empty roster. The press sequence
/// counter only ever grows, so two presses commit in a strict total order
/// even when their wall-clock timestamps collide.
#[derive(Debug)]
pub struct BuzzerSession {
    participants: IndexMap<Uuid, Participant>,
    locked: bool,
    next_press_seq: u64,
}

impl Default for BuzzerSession {
    fn default() -> Self {
        Self {
            participants: IndexMap::new(),
            locked: true,
            next_press_seq: 0,
        }
    }
}

impl BuzzerSession {
    /// Create an empty session with the global gate locked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the global gate currently rejects all presses.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Number of registered participants.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Look up a participant by id.
    pub fn participant(&self, id: Uuid) -> Option<&Participant> {
        self.participants.get(&id)
    }

    /// Iterate participants in join order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    /// Check a raw team name against the registration rules, returning the
    /// trimmed name on success. Read-only: the name is not reserved, so
    /// [`BuzzerSession::register`] re-applies the same rules atomically.
    pub fn validate_name(&self, raw_name: &str) -> Result<String, NameError> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.chars().count() > TEAM_NAME_MAX_LEN {
            return Err(NameError::TooLong);
        }
        let needle = name.to_lowercase();
        if self
            .participants
            .values()
            .any(|participant| participant.team_name.to_lowercase() == needle)
        {
            return Err(NameError::Taken);
        }
        Ok(name.to_string())
    }

    /// Register a new team, returning the created record. The participant
    /// starts armed; the global gate is untouched.
    pub fn register(&mut self, raw_name: &str) -> Result<Participant, NameError> {
        let team_name = self.validate_name(raw_name)?;
        let participant = Participant::new(team_name);
        self.participants
            .insert(participant.id, participant.clone());
        Ok(participant)
    }

    /// Remove a participant, returning the removed record. Removing an absent
    /// id is a no-op so logout and disconnect cleanup can race safely.
    pub fn remove(&mut self, id: Uuid) -> Option<Participant> {
        self.participants.shift_remove(&id)
    }

    /// Commit a press for `id`. The precondition checks and the assignment of
    /// timestamp and sequence number happen in one call under the caller's
    /// lock, which is what makes simultaneous presses resolve to distinct
    /// ranks.
    pub fn press(&mut self, id: Uuid) -> Result<PressOutcome, PressError> {
        let locked = self.locked;
        let seq = self.next_press_seq;

        let participant = self
            .participants
            .get_mut(&id)
            .ok_or(PressError::UnknownParticipant)?;
        if locked {
            return Err(PressError::GloballyLocked);
        }
        if participant.pressed() {
            return Err(PressError::AlreadyPressed);
        }

        let pressed_at = SystemTime::now();
        participant.buzzer_time = Some(pressed_at);
        participant.press_seq = Some(seq);
        self.next_press_seq += 1;

        // This press holds the greatest sequence number, so its rank is the
        // pressed-participant count after insertion.
        let rank = self.pressed_count();
        Ok(PressOutcome { rank, pressed_at })
    }

    /// Open the global gate and rearm every participant.
    pub fn unlock_all(&mut self) {
        self.locked = false;
        for participant in self.participants.values_mut() {
            participant.reset_press();
        }
    }

    /// Close the global gate. Individual press state is left untouched.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Rearm every participant without touching the global gate.
    pub fn clear_presses(&mut self) {
        for participant in self.participants.values_mut() {
            participant.reset_press();
        }
    }

    /// Rearm the team matching `team_name` (case-insensitive), returning its
    /// canonical name, or `None` when no such team is registered.
    pub fn unlock_team(&mut self, team_name: &str) -> Option<String> {
        let needle = team_name.to_lowercase();
        let participant = self
            .participants
            .values_mut()
            .find(|participant| participant.team_name.to_lowercase() == needle)?;
        participant.reset_press();
        Some(participant.team_name.clone())
    }

    /// Derive the current ranking: every pressed participant in press commit
    /// order, ranks dense from 1. Recomputed on each call so host resets are
    /// reflected immediately.
    pub fn rankings(&self) -> Vec<RankedPress> {
        let mut pressed: Vec<(u64, SystemTime, &str)> = self
            .participants
            .values()
            .filter_map(|participant| {
                let seq = participant.press_seq?;
                let time = participant.buzzer_time?;
                Some((seq, time, participant.team_name.as_str()))
            })
            .collect();
        pressed.sort_by_key(|(seq, _, _)| *seq);

        pressed
            .into_iter()
            .enumerate()
            .map(|(index, (_, buzzer_time, team_name))| RankedPress {
                team_name: team_name.to_string(),
                buzzer_time,
                rank: index + 1,
            })
            .collect()
    }

    fn pressed_count(&self) -> usize {
        self.participants
            .values()
            .filter(|participant| participant.pressed())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_teams(names: &[&str]) -> (BuzzerSession, Vec<Uuid>) {
        let mut session = BuzzerSession::new();
        let ids = names
            .iter()
            .map(|name| session.register(name).unwrap().id)
            .collect();
        (session, ids)
    }

    #[test]
    fn fresh_session_is_locked_and_empty() {
        let session = BuzzerSession::new();
        assert!(session.is_locked());
        assert_eq!(session.participant_count(), 0);
        assert!(session.rankings().is_empty());
    }

    #[test]
    fn register_trims_and_arms_the_new_team() {
        let mut session = BuzzerSession::new();
        let participant = session.register("  Alpha  ").unwrap();
        assert_eq!(participant.team_name, "Alpha");
        assert!(!participant.pressed());
        assert!(participant.buzzer_time.is_none());
        assert_eq!(session.participant_count(), 1);
    }

    #[test]
    fn duplicate_name_rejected_case_insensitively() {
        let (mut session, _) = session_with_teams(&["Alpha"]);
        assert_eq!(session.register("alpha").unwrap_err(), NameError::Taken);
        assert_eq!(session.register("ALPHA").unwrap_err(), NameError::Taken);
        assert_eq!(session.participant_count(), 1);
    }

    #[test]
    fn blank_and_oversized_names_rejected() {
        let mut session = BuzzerSession::new();
        assert_eq!(session.register("").unwrap_err(), NameError::Empty);
        assert_eq!(session.register("   ").unwrap_err(), NameError::Empty);

        let too_long = "x".repeat(TEAM_NAME_MAX_LEN + 1);
        assert_eq!(session.register(&too_long).unwrap_err(), NameError::TooLong);

        let max_len = "x".repeat(TEAM_NAME_MAX_LEN);
        assert!(session.register(&max_len).is_ok());
    }

    #[test]
    fn name_is_free_again_after_removal() {
        let (mut session, ids) = session_with_teams(&["Alpha"]);
        session.remove(ids[0]);
        assert!(session.register("alpha").is_ok());
    }

    #[test]
    fn removal_is_idempotent() {
        let (mut session, ids) = session_with_teams(&["Alpha"]);
        assert!(session.remove(ids[0]).is_some());
        assert!(session.remove(ids[0]).is_none());
        assert_eq!(session.participant_count(), 0);
    }

    #[test]
    fn press_while_locked_is_rejected_without_mutation() {
        let (mut session, ids) = session_with_teams(&["Alpha"]);
        assert_eq!(
            session.press(ids[0]).unwrap_err(),
            PressError::GloballyLocked
        );
        let participant = session.participant(ids[0]).unwrap();
        assert!(!participant.pressed());
        assert!(session.rankings().is_empty());
    }

    #[test]
    fn unknown_id_is_rejected_before_the_gate_check() {
        let (mut session, _) = session_with_teams(&["Alpha"]);
        // Still locked: an unregistered id must read as unauthenticated, not
        // as a gate rejection.
        assert_eq!(
            session.press(Uuid::new_v4()).unwrap_err(),
            PressError::UnknownParticipant
        );
    }

    #[test]
    fn presses_receive_sequential_ranks() {
        let (mut session, ids) = session_with_teams(&["Alpha", "Beta", "Gamma"]);
        session.unlock_all();

        assert_eq!(session.press(ids[0]).unwrap().rank, 1);
        assert_eq!(session.press(ids[1]).unwrap().rank, 2);
        assert_eq!(session.press(ids[2]).unwrap().rank, 3);

        let rankings = session.rankings();
        let names: Vec<&str> = rankings
            .iter()
            .map(|entry| entry.team_name.as_str())
            .collect();
        assert_eq!(names, ["Alpha", "Beta", "Gamma"]);
        let ranks: Vec<usize> = rankings.iter().map(|entry| entry.rank).collect();
        assert_eq!(ranks, [1, 2, 3]);
    }

    #[test]
    fn second_press_is_rejected_and_keeps_the_first() {
        let (mut session, ids) = session_with_teams(&["Alpha"]);
        session.unlock_all();

        let first = session.press(ids[0]).unwrap();
        assert_eq!(
            session.press(ids[0]).unwrap_err(),
            PressError::AlreadyPressed
        );

        let participant = session.participant(ids[0]).unwrap();
        assert_eq!(participant.buzzer_time, Some(first.pressed_at));
        assert_eq!(session.rankings().len(), 1);
        assert_eq!(session.rankings()[0].rank, 1);
    }

    #[test]
    fn unlock_all_rearms_everyone_and_opens_the_gate() {
        let (mut session, ids) = session_with_teams(&["Alpha", "Beta"]);
        session.unlock_all();
        session.press(ids[0]).unwrap();
        session.press(ids[1]).unwrap();
        session.lock();

        session.unlock_all();

        assert!(!session.is_locked());
        for id in &ids {
            let participant = session.participant(*id).unwrap();
            assert!(!participant.pressed());
            assert!(participant.buzzer_time.is_none());
        }
        assert!(session.rankings().is_empty());
    }

    #[test]
    fn lock_keeps_existing_presses() {
        let (mut session, ids) = session_with_teams(&["Alpha"]);
        session.unlock_all();
        session.press(ids[0]).unwrap();

        session.lock();

        assert!(session.is_locked());
        assert!(session.participant(ids[0]).unwrap().pressed());
        assert_eq!(session.rankings().len(), 1);
    }

    #[test]
    fn clear_presses_rearms_without_touching_the_gate() {
        let (mut session, ids) = session_with_teams(&["Alpha"]);
        session.unlock_all();
        session.press(ids[0]).unwrap();

        session.clear_presses();

        assert!(!session.is_locked());
        assert!(!session.participant(ids[0]).unwrap().pressed());
        assert!(session.rankings().is_empty());

        session.lock();
        session.clear_presses();
        assert!(session.is_locked());
    }

    #[test]
    fn unlock_team_rearms_only_the_named_team() {
        let (mut session, ids) = session_with_teams(&["Alpha", "Beta"]);
        session.unlock_all();
        session.press(ids[0]).unwrap();
        session.press(ids[1]).unwrap();

        let unlocked = session.unlock_team("ALPHA");
        assert_eq!(unlocked.as_deref(), Some("Alpha"));

        assert!(!session.participant(ids[0]).unwrap().pressed());
        assert!(session.participant(ids[1]).unwrap().pressed());

        // Beta moves up to rank 1 once Alpha's press is gone.
        let rankings = session.rankings();
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].team_name, "Beta");
        assert_eq!(rankings[0].rank, 1);
    }

    #[test]
    fn unlock_team_unknown_name_is_reported() {
        let (mut session, _) = session_with_teams(&["Alpha"]);
        assert!(session.unlock_team("Nobody").is_none());
    }

    #[test]
    fn repress_after_individual_unlock_joins_the_back_of_the_queue() {
        let (mut session, ids) = session_with_teams(&["Alpha", "Beta"]);
        session.unlock_all();
        session.press(ids[0]).unwrap();
        session.press(ids[1]).unwrap();

        session.unlock_team("Alpha");
        let outcome = session.press(ids[0]).unwrap();
        assert_eq!(outcome.rank, 2);

        let names: Vec<String> = session
            .rankings()
            .into_iter()
            .map(|entry| entry.team_name)
            .collect();
        assert_eq!(names, ["Beta", "Alpha"]);
    }

    #[test]
    fn ranks_stay_dense_for_any_pressed_subset() {
        let (mut session, ids) = session_with_teams(&["Alpha", "Beta", "Gamma", "Delta"]);
        session.unlock_all();
        for id in &ids {
            session.press(*id).unwrap();
        }

        session.unlock_team("Beta");
        session.remove(ids[2]);

        let rankings = session.rankings();
        let ranks: Vec<usize> = rankings.iter().map(|entry| entry.rank).collect();
        assert_eq!(ranks, [1, 2]);
        let names: Vec<&str> = rankings
            .iter()
            .map(|entry| entry.team_name.as_str())
            .collect();
        assert_eq!(names, ["Alpha", "Delta"]);
    }

    #[test]
    fn rankings_follow_commit_order_for_identical_timestamps() {
        // SystemTime has finite resolution; the sequence number must keep the
        // order strict even when two presses land on the same tick.
        let (mut session, ids) = session_with_teams(&["Alpha", "Beta"]);
        session.unlock_all();
        let first = session.press(ids[0]).unwrap();
        let second = session.press(ids[1]).unwrap();

        assert_eq!(first.rank, 1);
        assert_eq!(second.rank, 2);
        let rankings = session.rankings();
        assert_eq!(rankings[0].team_name, "Alpha");
        assert_eq!(rankings[1].team_name, "Beta");
    }
}
