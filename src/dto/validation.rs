//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::session::TEAM_NAME_MAX_LEN;

/// Validates that a team name is non-empty after trimming and no longer than
/// [`TEAM_NAME_MAX_LEN`] characters.
///
/// # Examples
///
/// ```ignore
/// validate_team_name("Quiz Wizards") // Ok
/// validate_team_name("   ")          // Err - empty after trimming
/// ```
pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("team_name_empty");
        err.message = Some("Team name cannot be empty".into());
        return Err(err);
    }

    if trimmed.chars().count() > TEAM_NAME_MAX_LEN {
        let mut err = ValidationError::new("team_name_length");
        err.message =
            Some(format!("Team name must be {TEAM_NAME_MAX_LEN} characters or less").into());
        return Err(err);
    }

    Ok(())
}
