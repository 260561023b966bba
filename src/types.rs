use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque ID types for type safety
pub type SessionId = String;
pub type PlayerId = String;

/// Hard cap on players per session.
pub const MAX_PLAYERS: usize = 6;

/// Fixed avatar palette; joins pick the first unused entry and fall back to a
/// random one if the palette is somehow exhausted.
pub const AVATAR_PALETTE: &[&str] = &["🦊", "🐼", "🐸", "🦁", "🐙", "🦄", "🐯", "🐨"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    Lobby,
    Selecting,
    Instructions,
    Playing,
    RoundEnd,
    GameEnd,
    Celebration,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RoundPhase {
    Prompt,
    Input,
    Voting,
    Reveal,
    Scoring,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    /// Convergence: everyone tries to give the same answer.
    MindMeld,
    /// Divergence: an answer only scores if nobody else gave it.
    OddOneOut,
    /// Convergence on an emoji sequence instead of text.
    EmojiSync,
    /// Drawing challenge, winners picked by vote.
    QuickDraw,
    /// Short opinion answers, winners picked by vote.
    HotTakes,
}

/// Which payload shape a game expects in submissions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Text,
    Emoji,
    Drawing,
}

impl GameType {
    pub const ALL: [GameType; 5] = [
        GameType::MindMeld,
        GameType::OddOneOut,
        GameType::EmojiSync,
        GameType::QuickDraw,
        GameType::HotTakes,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            GameType::MindMeld => "Mind Meld",
            GameType::OddOneOut => "Odd One Out",
            GameType::EmojiSync => "Emoji Sync",
            GameType::QuickDraw => "Quick Draw",
            GameType::HotTakes => "Hot Takes",
        }
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            GameType::MindMeld => {
                "Match answers with as many players as you can. Everyone matching is a perfect meld!"
            }
            GameType::OddOneOut => "Give an answer nobody else gives. Duplicates are eliminated.",
            GameType::EmojiSync => "Pick the same emoji as the other players. Order matters.",
            GameType::QuickDraw => "Draw the prompt, then vote for your favorite sketch.",
            GameType::HotTakes => "Answer the prompt, then vote for the best take.",
        }
    }

    /// Voting games insert a `voting` phase between input and scoring;
    /// the rest go straight to `reveal` and score automatically.
    pub fn uses_voting(&self) -> bool {
        matches!(self, GameType::QuickDraw | GameType::HotTakes)
    }

    pub fn submission_kind(&self) -> SubmissionKind {
        match self {
            GameType::MindMeld | GameType::OddOneOut | GameType::HotTakes => SubmissionKind::Text,
            GameType::EmojiSync => SubmissionKind::Emoji,
            GameType::QuickDraw => SubmissionKind::Drawing,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub difficulty: Difficulty,
    /// Rounds per game; must be 3, 5 or 7.
    pub total_rounds: u32,
    pub time_limit_secs: u32,
    /// Whether players may join after the session has left the lobby.
    pub allow_drop_in: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            total_rounds: 5,
            time_limit_secs: 60,
            allow_drop_in: false,
        }
    }
}

/// Partial settings update; only the present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub difficulty: Option<Difficulty>,
    pub total_rounds: Option<u32>,
    pub time_limit_secs: Option<u32>,
    pub allow_drop_in: Option<bool>,
}

impl GameSettings {
    /// Merge a patch into the settings. Validation happens at the store
    /// boundary before this is called.
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(difficulty) = patch.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(total_rounds) = patch.total_rounds {
            self.total_rounds = total_rounds;
        }
        if let Some(time_limit_secs) = patch.time_limit_secs {
            self.time_limit_secs = time_limit_secs;
        }
        if let Some(allow_drop_in) = patch.allow_drop_in {
            self.allow_drop_in = allow_drop_in;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub avatar: String,
    pub score: u32,
    pub is_host: bool,
    pub connected: bool,
    pub last_seen: DateTime<Utc>,
}

impl Player {
    pub fn new(name: String, avatar: String, is_host: bool) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            name,
            avatar,
            score: 0,
            is_host,
            connected: true,
            last_seen: Utc::now(),
        }
    }
}

/// One stroke of a drawing submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub points: Vec<[f32; 2]>,
}

/// A player's answer for the current round. The payload shape is game-specific,
/// so this is a tagged union rather than one record with optional fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Submission {
    Text { text: String },
    Emoji { emojis: Vec<String> },
    Drawing { strokes: Vec<Stroke> },
}

impl Submission {
    pub fn kind(&self) -> SubmissionKind {
        match self {
            Submission::Text { .. } => SubmissionKind::Text,
            Submission::Emoji { .. } => SubmissionKind::Emoji,
            Submission::Drawing { .. } => SubmissionKind::Drawing,
        }
    }

    /// Empty submissions never join a scoring group and never score.
    pub fn is_empty(&self) -> bool {
        match self {
            Submission::Text { text } => text.trim().is_empty(),
            Submission::Emoji { emojis } => emojis.iter().all(|e| e.trim().is_empty()),
            Submission::Drawing { strokes } => strokes.iter().all(|s| s.points.is_empty()),
        }
    }
}

/// Per-round state. Replaced wholesale when a new round starts, never reused.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundData {
    pub round: u32,
    pub phase: RoundPhase,
    pub prompt: Option<String>,
    pub category: Option<String>,
    /// Latest submission per player; resubmitting overwrites.
    pub submissions: HashMap<PlayerId, Submission>,
    /// Latest vote per voter (voter id → voted-for player id).
    pub votes: HashMap<PlayerId, PlayerId>,
    /// Advisory timer: the engine stores it but never schedules transitions.
    pub timer_secs: u32,
    pub timer_started_at: DateTime<Utc>,
    /// Set once scores have been applied, so a retried end-round cannot
    /// double-count.
    pub scored: bool,
}

impl RoundData {
    pub fn new(round: u32, phase: RoundPhase, timer_secs: u32) -> Self {
        Self {
            round,
            phase,
            prompt: None,
            category: None,
            submissions: HashMap::new(),
            votes: HashMap::new(),
            timer_secs,
            timer_started_at: Utc::now(),
            scored: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    /// 4-character join code, stored uppercase.
    pub code: String,
    pub host_id: PlayerId,
    /// Insertion order is display order.
    pub players: Vec<Player>,
    pub game_type: Option<GameType>,
    pub state: SessionState,
    pub settings: GameSettings,
    pub current_round: u32,
    pub round: Option<RoundData>,
    /// Strictly increasing mutation counter; published to sync subscribers.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(code: String, host: Player) -> Self {
        let now = Utc::now();
        Self {
            id: ulid::Ulid::new().to_string(),
            code,
            host_id: host.id.clone(),
            players: vec![host],
            game_type: None,
            state: SessionState::Lobby,
            settings: GameSettings::default(),
            current_round: 0,
            round: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the observable stamp. Every client-visible mutation ends here.
    /// `updated_at` never moves backwards even if the wall clock does.
    pub fn touch(&mut self) {
        self.version += 1;
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.push(player);
    }

    /// Remove a player, transferring the host flag to the new first player if
    /// the host left. Returns the removed player, or None if unknown.
    pub fn remove_player(&mut self, player_id: &str) -> Option<Player> {
        let idx = self.players.iter().position(|p| p.id == player_id)?;
        let removed = self.players.remove(idx);

        if removed.is_host {
            if let Some(next) = self.players.first_mut() {
                next.is_host = true;
                self.host_id = next.id.clone();
            }
        }
        Some(removed)
    }

    /// Reset every player's score to zero (a new game is starting).
    pub fn reset_scores(&mut self) {
        for player in &mut self.players {
            player.score = 0;
        }
    }
}
