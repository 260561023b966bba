//! Wire protocol: action requests and sync events.

use crate::types::{GameType, RoundPhase, Session, SettingsPatch, Submission, SubmissionKind};
use serde::{Deserialize, Serialize};

/// A session action. The `action` field selects the operation; each variant
/// carries exactly the fields that operation needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ActionRequest {
    Create {
        host_name: String,
    },
    Join {
        code: String,
        player_name: String,
    },
    Rejoin {
        session_id: String,
        player_id: String,
    },
    Leave {
        session_id: String,
        player_id: String,
    },
    SelectGame {
        session_id: String,
        game_type: GameType,
    },
    StartRound {
        session_id: String,
    },
    Submit {
        session_id: String,
        player_id: String,
        submission: Submission,
    },
    Vote {
        session_id: String,
        player_id: String,
        target_id: String,
    },
    ChangePhase {
        session_id: String,
        phase: RoundPhase,
    },
    EndRound {
        session_id: String,
    },
    NextGame {
        session_id: String,
    },
    UpdateSettings {
        session_id: String,
        #[serde(default)]
        settings: SettingsPatch,
    },
}

/// One record on the live-update feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SyncEvent {
    /// Full session snapshot; sent on subscribe and after every change.
    Sync { session: Session },
    /// Terminal record: the session was deleted.
    SessionEnded,
}

/// Catalog entry describing one playable game.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub game_type: GameType,
    pub title: String,
    pub instructions: String,
    pub submission_kind: SubmissionKind,
    pub uses_voting: bool,
}

impl From<GameType> for GameInfo {
    fn from(game_type: GameType) -> Self {
        Self {
            game_type,
            title: game_type.title().to_string(),
            instructions: game_type.instructions().to_string(),
            submission_kind: game_type.submission_kind(),
            uses_voting: game_type.uses_voting(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_deserialize_from_kebab_case_tags() {
        let request: ActionRequest =
            serde_json::from_str(r#"{"action":"create","hostName":"Ana"}"#).unwrap();
        assert!(matches!(request, ActionRequest::Create { ref host_name } if host_name == "Ana"));

        let request: ActionRequest = serde_json::from_str(
            r#"{"action":"select-game","sessionId":"s1","gameType":"mind-meld"}"#,
        )
        .unwrap();
        assert!(matches!(
            request,
            ActionRequest::SelectGame {
                game_type: GameType::MindMeld,
                ..
            }
        ));

        let request: ActionRequest = serde_json::from_str(
            r#"{"action":"submit","sessionId":"s1","playerId":"p1","submission":{"kind":"text","text":"cat"}}"#,
        )
        .unwrap();
        assert!(matches!(request, ActionRequest::Submit { .. }));
    }

    #[test]
    fn test_unknown_actions_fail_to_parse() {
        assert!(serde_json::from_str::<ActionRequest>(r#"{"action":"explode"}"#).is_err());
        assert!(serde_json::from_str::<ActionRequest>(r#"{"hostName":"Ana"}"#).is_err());
    }

    #[test]
    fn test_sync_events_carry_kebab_case_discriminators() {
        let json = serde_json::to_string(&SyncEvent::SessionEnded).unwrap();
        assert_eq!(json, r#"{"type":"session-ended"}"#);
    }
}
