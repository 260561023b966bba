//! Idle cleanup: presence decay and session TTL.

use super::SessionStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Spawn the background task that periodically sweeps all sessions.
pub fn spawn_idle_sweeper(store: Arc<SessionStore>) {
    let interval = store.config().sweep_interval;
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            store.sweep_idle().await;
        }
    });
}

impl SessionStore {
    /// One sweep pass. First flip `connected` off for players silent past
    /// the presence timeout, then delete sessions idle past the TTL.
    ///
    /// A session is only touched when a flag actually flips; an unconditional
    /// touch would reset the idle clock and keep dead sessions alive forever.
    pub async fn sweep_idle(&self) {
        let now = Utc::now();

        {
            let registry = self.registry.read().await;
            for slot in registry.sessions.values() {
                let mut session = slot.session.lock().await;
                let mut changed = false;
                for player in &mut session.players {
                    if player.connected
                        && elapsed(player.last_seen, now) >= self.config.presence_timeout
                    {
                        player.connected = false;
                        changed = true;
                    }
                }
                if changed {
                    session.touch();
                    slot.updates.send_replace(session.version);
                }
            }
        }

        let mut registry = self.registry.write().await;
        let mut expired = Vec::new();
        for (id, slot) in &registry.sessions {
            let session = slot.session.lock().await;
            if elapsed(session.updated_at, now) >= self.config.idle_ttl {
                expired.push((id.clone(), session.code.clone()));
            }
        }
        for (id, code) in expired {
            registry.sessions.remove(&id);
            registry.codes.remove(&code);
            tracing::info!(session = %id, code = %code, "Session expired after idle TTL");
        }
    }
}

/// Wall-clock age of a timestamp; future timestamps count as zero.
fn elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    now.signed_duration_since(since)
        .to_std()
        .unwrap_or(Duration::ZERO)
}
