//! Round operations: start, phase transitions, submissions, votes, scoring.

use super::SessionStore;
use crate::error::{EngineError, EngineResult};
use crate::scoring::score_round;
use crate::types::{
    GameType, PlayerId, RoundData, RoundPhase, Session, SessionState, Submission,
};
use chrono::Utc;

/// Upper bound on emoji per submission.
const MAX_EMOJI_ITEMS: usize = 16;
/// Upper bound on strokes per drawing.
const MAX_STROKES: usize = 256;

impl SessionStore {
    /// Start the next round: pick a prompt for the active difficulty, replace
    /// the round data wholesale and advance the round counter.
    pub async fn start_round(&self, session_id: &str) -> EngineResult<Session> {
        self.mutate(session_id, |session| {
            let game = require_game(session)?;
            match session.state {
                SessionState::Instructions | SessionState::RoundEnd => {}
                SessionState::Playing if session.round.is_none() => {}
                _ => {
                    return Err(EngineError::ActionFailed(
                        "cannot start a round now".to_string(),
                    ));
                }
            }
            if session.current_round >= session.settings.total_rounds {
                return Err(EngineError::ActionFailed(
                    "all rounds have been played".to_string(),
                ));
            }

            let content = self.content.round_content(game, session.settings.difficulty);
            session.current_round += 1;
            let mut round = RoundData::new(
                session.current_round,
                RoundPhase::Prompt,
                session.settings.time_limit_secs,
            );
            round.prompt = Some(content.prompt);
            round.category = content.category;
            session.round = Some(round);
            session.state = SessionState::Playing;
            Ok(())
        })
        .await
    }

    /// Explicit phase transition. Phases only move forward (repeating the
    /// current phase is a no-op retry that restarts its timer), and timers
    /// are advisory, so a transition arriving long after expiry still works.
    pub async fn change_phase(&self, session_id: &str, phase: RoundPhase) -> EngineResult<Session> {
        self.mutate(session_id, |session| {
            let game = require_game(session)?;
            if !matches!(
                session.state,
                SessionState::Instructions | SessionState::Playing
            ) {
                return Err(EngineError::ActionFailed(
                    "no round in progress".to_string(),
                ));
            }
            if phase == RoundPhase::Scoring {
                return Err(EngineError::ActionFailed(
                    "scoring is entered by ending the round".to_string(),
                ));
            }
            if phase == RoundPhase::Voting && !game.uses_voting() {
                return Err(EngineError::ActionFailed(format!(
                    "{} has no voting phase",
                    game.title()
                )));
            }

            match session.round.as_mut() {
                None => {
                    // A phase update may arrive before an explicit round
                    // start; create the round data it refers to.
                    if session.current_round == 0 {
                        session.current_round = 1;
                    }
                    session.round = Some(RoundData::new(
                        session.current_round,
                        phase,
                        session.settings.time_limit_secs,
                    ));
                    session.state = SessionState::Playing;
                }
                Some(round) => {
                    if round.scored {
                        return Err(EngineError::ActionFailed(
                            "round is already scored".to_string(),
                        ));
                    }
                    if phase_rank(phase) < phase_rank(round.phase) {
                        return Err(EngineError::ActionFailed(
                            "round phases only move forward".to_string(),
                        ));
                    }
                    round.phase = phase;
                    round.timer_started_at = Utc::now();
                }
            }

            advance_if_all_submitted(session);
            Ok(())
        })
        .await
    }

    /// Record a submission. Resubmitting overwrites until the round is
    /// scored, so a client retrying a write that already landed (even one
    /// that auto-advanced the phase) gets a success, not a refusal. Once
    /// every connected player has submitted, the round advances on its own
    /// to voting (voting games) or reveal.
    pub async fn submit(
        &self,
        session_id: &str,
        player_id: &str,
        submission: Submission,
    ) -> EngineResult<Session> {
        self.mutate(session_id, |session| {
            let game = require_game(session)?;
            if session.player(player_id).is_none() {
                return Err(EngineError::NotFound(format!(
                    "unknown player {player_id}"
                )));
            }
            self.valid_submission(game, &submission)?;

            let round = session
                .round
                .as_mut()
                .ok_or_else(|| EngineError::ActionFailed("no round in progress".to_string()))?;
            if round.scored {
                return Err(EngineError::ActionFailed(
                    "round is already scored".to_string(),
                ));
            }

            round.submissions.insert(player_id.to_string(), submission);
            mark_active(session, player_id);
            advance_if_all_submitted(session);
            Ok(())
        })
        .await
    }

    /// Record a vote for another player. Votes open with the voting phase
    /// and close only when the round is scored; re-voting overwrites, so a
    /// retried vote after the all-voted advance still succeeds. Once every
    /// connected player has voted, the round advances to reveal.
    pub async fn vote(
        &self,
        session_id: &str,
        voter_id: &str,
        target_id: &str,
    ) -> EngineResult<Session> {
        self.mutate(session_id, |session| {
            let game = require_game(session)?;
            if !game.uses_voting() {
                return Err(EngineError::ActionFailed(format!(
                    "{} has no voting phase",
                    game.title()
                )));
            }
            if session.player(voter_id).is_none() {
                return Err(EngineError::NotFound(format!("unknown player {voter_id}")));
            }
            if session.player(target_id).is_none() {
                return Err(EngineError::InvalidRequest(
                    "unknown vote target".to_string(),
                ));
            }
            if voter_id == target_id {
                return Err(EngineError::InvalidRequest(
                    "cannot vote for yourself".to_string(),
                ));
            }

            let round = session
                .round
                .as_mut()
                .ok_or_else(|| EngineError::ActionFailed("no round in progress".to_string()))?;
            if round.scored {
                return Err(EngineError::ActionFailed(
                    "round is already scored".to_string(),
                ));
            }
            if phase_rank(round.phase) < phase_rank(RoundPhase::Voting) {
                return Err(EngineError::ActionFailed("voting is not open".to_string()));
            }

            round.votes.insert(voter_id.to_string(), target_id.to_string());
            mark_active(session, voter_id);
            advance_if_all_voted(session);
            Ok(())
        })
        .await
    }

    /// Close and score the round: compute the point delta from the round
    /// data, apply it, and move the session to `round-end` or `game-end`.
    /// Scoring a round twice fails, so retried calls cannot double-count.
    pub async fn end_round(&self, session_id: &str) -> EngineResult<Session> {
        self.mutate(session_id, |session| {
            let game = require_game(session)?;
            let players: Vec<PlayerId> = session.players.iter().map(|p| p.id.clone()).collect();

            // Compute first, apply second. The computation only reads.
            let outcome = {
                let round = session
                    .round
                    .as_ref()
                    .ok_or_else(|| EngineError::ActionFailed("no round to end".to_string()))?;
                if round.scored {
                    return Err(EngineError::ActionFailed(
                        "round is already scored".to_string(),
                    ));
                }
                score_round(game, round, &players, self.config.normalization)
            };

            for (player_id, delta) in &outcome.points {
                if let Some(player) = session.player_mut(player_id) {
                    player.score += *delta;
                }
            }
            if let Some(round) = session.round.as_mut() {
                round.scored = true;
                round.phase = RoundPhase::Scoring;
            }
            session.state = if session.current_round >= session.settings.total_rounds {
                SessionState::GameEnd
            } else {
                SessionState::RoundEnd
            };
            tracing::debug!(
                session = %session.id,
                round = session.current_round,
                state = ?session.state,
                "Round scored"
            );
            Ok(())
        })
        .await
    }

    fn valid_submission(&self, game: GameType, submission: &Submission) -> EngineResult<()> {
        if submission.kind() != game.submission_kind() {
            return Err(EngineError::InvalidRequest(format!(
                "{} takes {:?} submissions",
                game.title(),
                game.submission_kind()
            )));
        }
        match submission {
            Submission::Text { text } => {
                if text.chars().count() > self.config.max_submission_chars {
                    return Err(EngineError::InvalidRequest(format!(
                        "submission longer than {} characters",
                        self.config.max_submission_chars
                    )));
                }
            }
            Submission::Emoji { emojis } => {
                if emojis.len() > MAX_EMOJI_ITEMS {
                    return Err(EngineError::InvalidRequest(format!(
                        "more than {MAX_EMOJI_ITEMS} emoji"
                    )));
                }
            }
            Submission::Drawing { strokes } => {
                if strokes.len() > MAX_STROKES {
                    return Err(EngineError::InvalidRequest(format!(
                        "more than {MAX_STROKES} strokes"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn require_game(session: &Session) -> EngineResult<GameType> {
    session
        .game_type
        .ok_or_else(|| EngineError::ActionFailed("no game selected".to_string()))
}

fn phase_rank(phase: RoundPhase) -> u8 {
    match phase {
        RoundPhase::Prompt => 0,
        RoundPhase::Input => 1,
        RoundPhase::Voting => 2,
        RoundPhase::Reveal => 3,
        RoundPhase::Scoring => 4,
    }
}

/// Any action by a player proves they are alive.
fn mark_active(session: &mut Session, player_id: &str) {
    if let Some(player) = session.player_mut(player_id) {
        player.connected = true;
        player.last_seen = Utc::now();
    }
}

/// During input, once every connected player has submitted, move on without
/// waiting for the timer.
fn advance_if_all_submitted(session: &mut Session) {
    let Some(game) = session.game_type else { return };
    let Some(round) = session.round.as_mut() else { return };
    if round.phase != RoundPhase::Input {
        return;
    }
    let mut connected = session.players.iter().filter(|p| p.connected).peekable();
    if connected.peek().is_none() {
        return;
    }
    if connected.all(|p| round.submissions.contains_key(&p.id)) {
        round.phase = if game.uses_voting() {
            RoundPhase::Voting
        } else {
            RoundPhase::Reveal
        };
        round.timer_started_at = Utc::now();
    }
}

/// During voting, once every connected player has voted, move to reveal.
fn advance_if_all_voted(session: &mut Session) {
    let Some(round) = session.round.as_mut() else { return };
    if round.phase != RoundPhase::Voting {
        return;
    }
    let mut connected = session.players.iter().filter(|p| p.connected).peekable();
    if connected.peek().is_none() {
        return;
    }
    if connected.all(|p| round.votes.contains_key(&p.id)) {
        round.phase = RoundPhase::Reveal;
        round.timer_started_at = Utc::now();
    }
}
