//! Couples activity recording with the host log stream so every mutation
//! reports through one helper.

use crate::{
    dto::host::LogEntryDto,
    services::sse_events,
    state::{SharedState, activity::Severity},
};

/// Append an entry to the activity log and push it to the host stream.
///
/// The log itself swallows file-append failures, so from the caller's point
/// of view recording activity never fails a triggering operation.
pub async fn record(state: &SharedState, severity: Severity, message: impl Into<String>) {
    let entry = state.activity().append(severity, message).await;
    sse_events::broadcast_log_update(state, &LogEntryDto::from(&entry));
}
