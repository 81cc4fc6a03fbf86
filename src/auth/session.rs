//! In-memory login sessions keyed by an opaque bearer token.
//!
//! Each session carries the per-login context: the last dashboard inputs,
//! the last analysis and the running pomodoro, if any.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::analysis::inputs::LifeInputs;
use crate::analysis::pipeline::AnalysisResults;
use crate::study::pomodoro::Pomodoro;

/// Per-login context.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub last_inputs: Option<LifeInputs>,
    pub last_analysis: Option<AnalysisResults>,
    pub pomodoro: Option<Pomodoro>,
    last_seen: Instant,
}

impl Session {
    fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            last_inputs: None,
            last_analysis: None,
            pomodoro: None,
            last_seen: Instant::now(),
        }
    }
}

/// Token → session map shared by all handlers.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// Open a session for `user_id` and return its token.
    pub async fn create(&self, user_id: Uuid) -> Uuid {
        let token = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(token, Session::new(user_id));
        token
    }

    /// Resolve a token to its user, refreshing the idle clock.
    ///
    /// Expired sessions are dropped and resolve to `None`.
    pub async fn touch(&self, token: Uuid) -> Option<Uuid> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&token)?;
        if session.last_seen.elapsed() > self.idle_timeout {
            sessions.remove(&token);
            return None;
        }
        session.last_seen = Instant::now();
        Some(session.user_id)
    }

    /// Run `f` against the session's context.
    pub async fn with_session<R>(&self, token: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(&token).map(f)
    }

    /// Clone of the session's context.
    pub async fn snapshot(&self, token: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&token).cloned()
    }

    pub async fn remove(&self, token: Uuid) -> bool {
        self.sessions.write().await.remove(&token).is_some()
    }

    /// Drop every session idle past the timeout. Returns how many went.
    pub async fn prune_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_seen.elapsed() <= self.idle_timeout);
        before - sessions.len()
    }
}
