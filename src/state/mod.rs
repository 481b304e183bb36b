pub mod activity;
pub mod session;
mod sse;

use std::{sync::Arc, time::SystemTime};

use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::{
    config::AppConfig,
    state::{activity::ActivityLog, session::BuzzerSession},
};

pub use self::sse::SseHub;
use self::sse::SseState;

/// Cheaply clonable handle on the process-wide application state.
pub type SharedState = Arc<AppState>;

/// Central application state holding the buzzer session, the activity feed,
/// the broadcast hubs, and host credentials. One instance is constructed at
/// startup and injected into every route and service; tests build their own.
pub struct AppState {
    session: RwLock<BuzzerSession>,
    activity: ActivityLog,
    sse: SseState,
    host_password: RwLock<String>,
    host_tokens: DashMap<String, SystemTime>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The buzzer session starts empty with the global gate locked; the host
    /// password starts at its configured value.
    pub fn new(config: AppConfig, activity: ActivityLog) -> SharedState {
        Arc::new(Self {
            session: RwLock::new(BuzzerSession::new()),
            activity,
            sse: SseState::new(16, 16),
            host_password: RwLock::new(config.host_password),
            host_tokens: DashMap::new(),
        })
    }

    /// Lock guarding every roster and gate mutation. All compound
    /// check-then-mutate sequences run as single [`BuzzerSession`] methods
    /// under the write half, which serializes them.
    pub fn session(&self) -> &RwLock<BuzzerSession> {
        &self.session
    }

    /// Activity feed shared by services and the host status view.
    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        self.sse.public()
    }

    /// Broadcast hub used for the host-only SSE stream.
    pub fn host_sse(&self) -> &SseHub {
        self.sse.host()
    }

    /// Current host password slot; rewritten by the change-password operation.
    pub fn host_password(&self) -> &RwLock<String> {
        &self.host_password
    }

    /// Registry of live host tokens keyed by token string, valued by the
    /// moment each was issued.
    pub fn host_tokens(&self) -> &DashMap<String, SystemTime> {
        &self.host_tokens
    }
}
