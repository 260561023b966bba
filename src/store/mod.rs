//! The session store: authoritative owner of every live session.
//!
//! All mutations pass through here. Each session sits behind its own
//! `tokio::sync::Mutex` so two concurrent requests against the same session
//! can never interleave partial writes; a `watch` channel per session carries
//! the version stamp to sync subscribers.
//!
//! Lock order is registry before session mutex, never the reverse.
//! Per-session operations hold the registry read lock across the mutex
//! section so a concurrent delete cannot slip in between lookup and mutation;
//! create, leave and the sweeper take the write lock.

mod codes;
mod round;
mod session;
mod sweep;

pub use sweep::spawn_idle_sweeper;

use crate::config::Config;
use crate::content::ContentSource;
use crate::error::{EngineError, EngineResult};
use crate::types::{Session, SessionId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};

pub struct SessionStore {
    registry: RwLock<Registry>,
    content: Box<dyn ContentSource>,
    config: Config,
}

#[derive(Default)]
struct Registry {
    sessions: HashMap<SessionId, SessionSlot>,
    /// Join code → session id. Must always agree with `sessions`; both maps
    /// are only ever updated under the same write guard.
    codes: HashMap<String, SessionId>,
}

/// A live session plus its update channel. The registry holds the only
/// long-lived reference to the sender, so removing the slot closes every
/// subscriber's receiver.
struct SessionSlot {
    session: Arc<Mutex<Session>>,
    updates: watch::Sender<u64>,
}

impl SessionStore {
    pub fn new(content: Box<dyn ContentSource>, config: Config) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            content,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full snapshot of a session, or None if it doesn't exist.
    pub async fn snapshot(&self, session_id: &str) -> Option<Session> {
        let registry = self.registry.read().await;
        let slot = registry.sessions.get(session_id)?;
        // Bind the clone so the session guard drops before the registry guard.
        let session = slot.session.lock().await.clone();
        Some(session)
    }

    /// Resolve a join code (case-insensitive) to a session snapshot.
    pub async fn snapshot_by_code(&self, code: &str) -> Option<Session> {
        let code = code.trim().to_uppercase();
        let registry = self.registry.read().await;
        let session_id = registry.codes.get(&code)?;
        let slot = registry.sessions.get(session_id)?;
        let session = slot.session.lock().await.clone();
        Some(session)
    }

    /// Subscribe to a session's version stamp. The receiver's channel closes
    /// when the session is deleted.
    pub async fn subscribe(&self, session_id: &str) -> Option<watch::Receiver<u64>> {
        let registry = self.registry.read().await;
        let slot = registry.sessions.get(session_id)?;
        Some(slot.updates.subscribe())
    }

    /// Run a mutation against one session under its mutex, then bump the
    /// version stamp, publish it, and return the updated snapshot. The
    /// closure's error aborts the mutation with nothing published.
    pub(crate) async fn mutate<F>(&self, session_id: &str, apply: F) -> EngineResult<Session>
    where
        F: FnOnce(&mut Session) -> EngineResult<()>,
    {
        let registry = self.registry.read().await;
        let slot = registry
            .sessions
            .get(session_id)
            .ok_or_else(|| EngineError::NotFound(format!("unknown session {session_id}")))?;

        let mut session = slot.session.lock().await;
        apply(&mut session)?;
        session.touch();
        slot.updates.send_replace(session.version);
        Ok(session.clone())
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.registry.read().await.sessions.len()
    }
}
