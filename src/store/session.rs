//! Session lifecycle: create, join, rejoin, leave, game selection, settings.

use super::{SessionSlot, SessionStore};
use crate::error::{EngineError, EngineResult};
use crate::types::{
    GameType, Player, Session, SessionState, SettingsPatch, AVATAR_PALETTE,
};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

impl SessionStore {
    /// Create a new session with the given host. Always succeeds unless the
    /// code space is exhausted.
    pub async fn create(&self, host_name: &str) -> EngineResult<Session> {
        let name = self.valid_name(host_name)?;
        let mut registry = self.registry.write().await;

        let code = registry.free_code()?;
        let host = Player::new(name, AVATAR_PALETTE[0].to_string(), true);
        let session = Session::new(code.clone(), host);
        let (updates, _) = watch::channel(session.version);

        tracing::info!(session = %session.id, code = %code, "Session created");
        registry.codes.insert(code, session.id.clone());
        registry.sessions.insert(
            session.id.clone(),
            SessionSlot {
                session: Arc::new(Mutex::new(session.clone())),
                updates,
            },
        );
        Ok(session)
    }

    /// Join a session by code. The new player is appended to the player list,
    /// so callers find them at the end of the returned snapshot.
    pub async fn join(&self, code: &str, player_name: &str) -> EngineResult<Session> {
        let name = self.valid_name(player_name)?;
        let code = code.trim().to_uppercase();

        let registry = self.registry.read().await;
        let session_id = registry
            .codes
            .get(&code)
            .ok_or_else(|| EngineError::NotFound(format!("unknown join code {code}")))?;
        let slot = registry
            .sessions
            .get(session_id)
            .ok_or_else(|| EngineError::Internal("join code maps to a dead session".to_string()))?;

        let mut session = slot.session.lock().await;
        if session.state != SessionState::Lobby && !session.settings.allow_drop_in {
            return Err(EngineError::JoinRejected(
                "session has already started".to_string(),
            ));
        }
        if session.is_full() {
            return Err(EngineError::JoinRejected("session is full".to_string()));
        }

        let avatar = pick_avatar(&session);
        session.add_player(Player::new(name, avatar, false));
        session.touch();
        slot.updates.send_replace(session.version);
        Ok(session.clone())
    }

    /// Reconnect an existing player. This never adds players; unknown ids fail.
    pub async fn rejoin(&self, session_id: &str, player_id: &str) -> EngineResult<Session> {
        self.mutate(session_id, |session| {
            let player = session
                .player_mut(player_id)
                .ok_or_else(|| EngineError::NotFound(format!("unknown player {player_id}")))?;
            player.connected = true;
            player.last_seen = Utc::now();
            Ok(())
        })
        .await
    }

    /// Remove a player. Transfers the host flag if needed; deletes the whole
    /// session (and frees its code) when the last player leaves, in which
    /// case None is returned.
    pub async fn leave(&self, session_id: &str, player_id: &str) -> EngineResult<Option<Session>> {
        let mut registry = self.registry.write().await;
        {
            let slot = registry
                .sessions
                .get(session_id)
                .ok_or_else(|| EngineError::NotFound(format!("unknown session {session_id}")))?;

            let mut session = slot.session.lock().await;
            session
                .remove_player(player_id)
                .ok_or_else(|| EngineError::NotFound(format!("unknown player {player_id}")))?;

            if !session.players.is_empty() {
                session.touch();
                slot.updates.send_replace(session.version);
                return Ok(Some(session.clone()));
            }
        }

        // Last player left. Dropping the slot drops the watch sender, which
        // is what tells subscribers the session ended.
        if let Some(slot) = registry.sessions.remove(session_id) {
            let code = slot.session.lock().await.code.clone();
            registry.codes.remove(&code);
            tracing::info!(session = %session_id, code = %code, "Session deleted, last player left");
        }
        Ok(None)
    }

    /// Pick a game for the session. Valid whenever no round is underway;
    /// resets scores and the round counter for the new game.
    pub async fn select_game(&self, session_id: &str, game_type: GameType) -> EngineResult<Session> {
        self.mutate(session_id, |session| {
            match session.state {
                SessionState::Lobby
                | SessionState::Selecting
                | SessionState::Instructions
                | SessionState::GameEnd
                | SessionState::Celebration => {}
                SessionState::Playing | SessionState::RoundEnd => {
                    return Err(EngineError::ActionFailed(
                        "cannot pick a game while one is in progress".to_string(),
                    ));
                }
            }
            session.game_type = Some(game_type);
            session.state = SessionState::Instructions;
            session.current_round = 0;
            session.round = None;
            session.reset_scores();
            Ok(())
        })
        .await
    }

    /// Advance past a finished game: `game-end → celebration → selecting`.
    pub async fn next_game(&self, session_id: &str) -> EngineResult<Session> {
        self.mutate(session_id, |session| {
            session.state = match session.state {
                SessionState::GameEnd => SessionState::Celebration,
                SessionState::Celebration => {
                    session.game_type = None;
                    session.current_round = 0;
                    session.round = None;
                    SessionState::Selecting
                }
                _ => {
                    return Err(EngineError::ActionFailed(
                        "no finished game to advance from".to_string(),
                    ));
                }
            };
            Ok(())
        })
        .await
    }

    /// Merge a partial settings update. Round-count and timer changes apply
    /// to subsequent rounds only; the current round keeps its timer.
    pub async fn update_settings(
        &self,
        session_id: &str,
        patch: &SettingsPatch,
    ) -> EngineResult<Session> {
        if let Some(total_rounds) = patch.total_rounds {
            if !matches!(total_rounds, 3 | 5 | 7) {
                return Err(EngineError::InvalidRequest(
                    "totalRounds must be 3, 5 or 7".to_string(),
                ));
            }
        }
        if let Some(secs) = patch.time_limit_secs {
            if !(10..=600).contains(&secs) {
                return Err(EngineError::InvalidRequest(
                    "timeLimitSecs must be between 10 and 600".to_string(),
                ));
            }
        }
        self.mutate(session_id, |session| {
            session.settings.merge(patch);
            Ok(())
        })
        .await
    }

    fn valid_name(&self, raw: &str) -> EngineResult<String> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidRequest(
                "name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > self.config.max_name_chars {
            return Err(EngineError::InvalidRequest(format!(
                "name longer than {} characters",
                self.config.max_name_chars
            )));
        }
        Ok(name.to_string())
    }
}

/// First unused avatar from the palette, or a random one if every entry is
/// taken (possible only if the palette shrinks below the player cap).
fn pick_avatar(session: &Session) -> String {
    let used: Vec<&str> = session.players.iter().map(|p| p.avatar.as_str()).collect();
    match AVATAR_PALETTE.iter().copied().find(|a| !used.contains(a)) {
        Some(avatar) => avatar.to_string(),
        None => {
            let mut rng = rand::rng();
            AVATAR_PALETTE[rng.random_range(0..AVATAR_PALETTE.len())].to_string()
        }
    }
}
