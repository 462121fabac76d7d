//! Per-browsing-session state kept between requests

use auth::session::SessionState;
use std::collections::{HashMap, hash_map::Entry};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Registry entry
#[derive(Debug)]
struct SessionEntry {
    /// Latest state of the session
    state: SessionState,
    /// Last request seen for the session
    last_seen: Instant,
}

/// In-memory browsing sessions, keyed by session id
///
/// Only ids issued by the registry are honoured; an unknown id starts a
/// new session with a new id. A session is kept once it is authenticated
/// or changed through [`SessionRegistry::update`]; sessions idle for
/// longer than `idle_timeout` are dropped.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    /// Idle time after which a session ends
    idle_timeout: Duration,
    /// Live sessions
    entries: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
}

impl SessionRegistry {
    /// Create a new session registry
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Load the session for `id` and bring it up to date with `restore`
    ///
    /// Absent or unknown ids start from a fresh session. The result is kept
    /// when the session was already known or `restore` authenticated it.
    pub async fn resolve<F>(&self, id: Option<Uuid>, restore: F) -> SessionState
    where
        F: FnOnce(SessionState) -> SessionState,
    {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.last_seen) < self.idle_timeout);
        if entries.len() < before {
            debug!("Dropped {} idle sessions", before - entries.len());
        }

        let known = id.and_then(|id| entries.get(&id).map(|entry| entry.state.clone()));
        let is_known = known.is_some();
        let session = restore(known.unwrap_or_default());

        if is_known || session.is_authenticated() {
            entries.insert(
                session.session_id(),
                SessionEntry {
                    state: session.clone(),
                    last_seen: now,
                },
            );
        }

        session
    }

    /// Apply `change` to the live state of `session`
    ///
    /// `session` is the copy a handler received; `change` runs on whatever
    /// the registry holds now, so fields it does not touch keep their live
    /// values. Returns `None` when `session` was authenticated but has
    /// ended since.
    pub async fn update<T, F>(
        &self,
        session: &SessionState,
        change: F,
    ) -> Option<(SessionState, T)>
    where
        F: FnOnce(&mut SessionState) -> T,
    {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = match entries.entry(session.session_id()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(_) if session.is_authenticated() => {
                debug!("Session {} ended before update", session.session_id());
                return None;
            }
            Entry::Vacant(entry) => entry.insert(SessionEntry {
                state: session.clone(),
                last_seen: now,
            }),
        };

        let result = change(&mut entry.state);
        entry.last_seen = now;
        Some((entry.state.clone(), result))
    }

    /// Latest stored state for `id`
    pub async fn get(&self, id: Uuid) -> Option<SessionState> {
        let entries = self.entries.lock().await;
        entries.get(&id).map(|entry| entry.state.clone())
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
