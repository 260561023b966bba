//! Live session feed.
//!
//! Each subscriber gets a newline-delimited JSON stream: a full snapshot
//! immediately, another after every change (bursts coalesce to the latest
//! state), and a terminal `session-ended` record once the session is gone.
//! Dropping the response body is the only unsubscribe path; it cancels the
//! loop and releases the watch receiver.

use crate::protocol::SyncEvent;
use crate::store::SessionStore;
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Idle gap after which a blank line is written so half-dead connections
/// surface as write errors instead of lingering.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(25);

/// Stream of NDJSON lines for one session. `updates` must come from
/// [`SessionStore::subscribe`] for the same session id.
pub fn session_stream(
    store: Arc<SessionStore>,
    session_id: String,
    mut updates: watch::Receiver<u64>,
) -> impl Stream<Item = Result<String, Infallible>> {
    async_stream::stream! {
        tracing::debug!(session = %session_id, "Sync subscriber connected");
        let mut last_sent: Option<u64> = None;

        loop {
            match store.snapshot(&session_id).await {
                Some(session) => {
                    // Redeliver only when the stamp moved; a wakeup for a
                    // version we already sent is dropped here.
                    if last_sent != Some(session.version) {
                        last_sent = Some(session.version);
                        yield Ok(ndjson_line(&SyncEvent::Sync { session }));
                    }
                }
                None => {
                    yield Ok(ndjson_line(&SyncEvent::SessionEnded));
                    break;
                }
            }

            let closed = loop {
                tokio::select! {
                    changed = updates.changed() => break changed.is_err(),
                    _ = tokio::time::sleep(KEEP_ALIVE_INTERVAL) => {
                        yield Ok("\n".to_string());
                    }
                }
            };
            if closed {
                // Sender dropped: the session slot was removed.
                yield Ok(ndjson_line(&SyncEvent::SessionEnded));
                break;
            }
        }

        tracing::debug!(session = %session_id, "Sync subscriber closed");
    }
}

fn ndjson_line(event: &SyncEvent) -> String {
    match serde_json::to_string(event) {
        Ok(json) => json + "\n",
        Err(e) => {
            tracing::error!("sync event failed to serialize: {e}");
            "\n".to_string()
        }
    }
}
