//! Round scoring.
//!
//! Pure functions from a closed round's data to per-player point deltas.
//! Nothing in here mutates session state, so re-running a computation on the
//! same input reproduces identical results. Callers rely on that for
//! idempotent retries.

use crate::types::{GameType, PlayerId, RoundData, Submission};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How free-text answers are canonicalized before comparison.
///
/// Case folding, trimming and whitespace collapsing always apply; the
/// punctuation-insensitive policy additionally drops ASCII punctuation.
/// Diacritics pass through under both policies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizationPolicy {
    #[default]
    Strict,
    PunctuationInsensitive,
}

/// Canonical form of a free-text answer under the given policy.
pub fn normalize(text: &str, policy: NormalizationPolicy) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = match policy {
        NormalizationPolicy::Strict => lowered,
        NormalizationPolicy::PunctuationInsensitive => lowered
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect(),
    };
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Grouping key for a submission, or None if it can never join a group
/// (empty content, or a drawing; drawings only score by vote).
fn group_key(submission: &Submission, policy: NormalizationPolicy) -> Option<String> {
    match submission {
        Submission::Text { text } => {
            let key = normalize(text, policy);
            (!key.is_empty()).then_some(key)
        }
        Submission::Emoji { emojis } => {
            // Sequences compare exactly, in order. A separator keeps entry
            // boundaries in the key, so ["ab","c"] and ["a","bc"] stay
            // distinct.
            let key = emojis
                .iter()
                .map(|e| e.trim())
                .filter(|e| !e.is_empty())
                .collect::<Vec<_>>()
                .join("\u{1f}");
            (!key.is_empty()).then_some(key)
        }
        Submission::Drawing { .. } => None,
    }
}

/// Outcome of scoring one round: the delta to apply per player, plus the
/// game-specific breakdown for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundScore {
    pub points: HashMap<PlayerId, u32>,
    pub details: ScoreDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScoreDetails {
    /// Matching-group games: who converged on what.
    Matching {
        groups: Vec<AnswerGroup>,
        /// Every participating player landed in a single group of at
        /// least three participants (a perfect meld).
        perfect: bool,
    },
    /// Uniqueness games: who survived, who was eliminated.
    Uniqueness {
        unique: Vec<PlayerId>,
        eliminated: Vec<PlayerId>,
    },
    /// Voting games: votes received per player.
    VoteTally { tallies: HashMap<PlayerId, u32> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerGroup {
    pub answer: String,
    pub players: Vec<PlayerId>,
}

/// Score a completed round. `players` is the session's current player list;
/// everyone in it gets a delta entry (zero when they earned nothing).
pub fn score_round(
    game: GameType,
    round: &RoundData,
    players: &[PlayerId],
    policy: NormalizationPolicy,
) -> RoundScore {
    match game {
        GameType::MindMeld | GameType::EmojiSync => score_matching_groups(round, players, policy),
        GameType::OddOneOut => score_uniqueness(round, players, policy),
        GameType::QuickDraw | GameType::HotTakes => score_vote_tally(round, players),
    }
}

/// Group players by normalized answer. Groups of two or more score the group
/// size per member; singletons score zero; empty submissions never group.
fn score_matching_groups(
    round: &RoundData,
    players: &[PlayerId],
    policy: NormalizationPolicy,
) -> RoundScore {
    let mut grouped: HashMap<String, Vec<PlayerId>> = HashMap::new();
    for (player_id, submission) in &round.submissions {
        if let Some(key) = group_key(submission, policy) {
            grouped.entry(key).or_default().push(player_id.clone());
        }
    }

    let participants: usize = grouped.values().map(|members| members.len()).sum();
    let perfect = grouped.len() == 1 && participants >= 3;

    let mut points: HashMap<PlayerId, u32> =
        players.iter().map(|id| (id.clone(), 0)).collect();
    for members in grouped.values() {
        let award = if members.len() >= 2 {
            members.len() as u32
        } else {
            0
        };
        for player_id in members {
            points.insert(player_id.clone(), award);
        }
    }

    let mut groups: Vec<AnswerGroup> = grouped
        .into_iter()
        .map(|(answer, mut members)| {
            members.sort();
            AnswerGroup {
                answer,
                players: members,
            }
        })
        .collect();
    groups.sort_by(|a, b| a.answer.cmp(&b.answer));

    RoundScore {
        points,
        details: ScoreDetails::Matching { groups, perfect },
    }
}

/// An answer occurring exactly once scores one point; duplicated, empty or
/// missing answers are eliminated.
fn score_uniqueness(
    round: &RoundData,
    players: &[PlayerId],
    policy: NormalizationPolicy,
) -> RoundScore {
    let mut occurrences: HashMap<String, u32> = HashMap::new();
    for submission in round.submissions.values() {
        if let Some(key) = group_key(submission, policy) {
            *occurrences.entry(key).or_insert(0) += 1;
        }
    }

    let mut points = HashMap::new();
    let mut unique = Vec::new();
    let mut eliminated = Vec::new();

    // Score current players plus anyone who submitted and then left.
    let mut all: Vec<PlayerId> = players.to_vec();
    all.extend(
        round
            .submissions
            .keys()
            .filter(|id| !players.contains(id))
            .cloned(),
    );

    for player_id in &all {
        let key = round
            .submissions
            .get(player_id)
            .and_then(|s| group_key(s, policy));
        match key {
            Some(key) if occurrences.get(&key) == Some(&1) => {
                points.insert(player_id.clone(), 1);
                unique.push(player_id.clone());
            }
            _ => {
                points.insert(player_id.clone(), 0);
                eliminated.push(player_id.clone());
            }
        }
    }

    unique.sort();
    eliminated.sort();

    RoundScore {
        points,
        details: ScoreDetails::Uniqueness { unique, eliminated },
    }
}

/// One point per vote received. This is the shape voting games share.
fn score_vote_tally(round: &RoundData, players: &[PlayerId]) -> RoundScore {
    let mut tallies: HashMap<PlayerId, u32> = HashMap::new();
    for target in round.votes.values() {
        *tallies.entry(target.clone()).or_insert(0) += 1;
    }

    let mut points: HashMap<PlayerId, u32> =
        players.iter().map(|id| (id.clone(), 0)).collect();
    for (player_id, count) in &tallies {
        points.insert(player_id.clone(), *count);
    }

    RoundScore {
        points,
        details: ScoreDetails::VoteTally { tallies },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoundPhase;

    fn round_with_texts(entries: &[(&str, &str)]) -> RoundData {
        let mut round = RoundData::new(1, RoundPhase::Input, 60);
        for (player, text) in entries {
            round.submissions.insert(
                player.to_string(),
                Submission::Text {
                    text: text.to_string(),
                },
            );
        }
        round
    }

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_normalize_folds_case_and_collapses_whitespace() {
        let policy = NormalizationPolicy::Strict;
        assert_eq!(normalize("  Cat ", policy), "cat");
        assert_eq!(normalize("red   panda", policy), "red panda");
        assert_eq!(normalize("It's FINE", policy), "it's fine");
    }

    #[test]
    fn test_punctuation_insensitive_strips_ascii_punctuation() {
        let policy = NormalizationPolicy::PunctuationInsensitive;
        assert_eq!(normalize("It's fine!", policy), "its fine");
        // Strict keeps it, so the two policies really differ.
        assert_ne!(
            normalize("It's fine!", NormalizationPolicy::Strict),
            normalize("its fine", NormalizationPolicy::Strict)
        );
    }

    #[test]
    fn test_matching_groups_cat_cat_dog() {
        let round = round_with_texts(&[("A", "cat"), ("B", "Cat "), ("C", "dog")]);
        let score = score_round(
            GameType::MindMeld,
            &round,
            &ids(&["A", "B", "C"]),
            NormalizationPolicy::Strict,
        );

        assert_eq!(score.points.get("A"), Some(&2));
        assert_eq!(score.points.get("B"), Some(&2));
        assert_eq!(score.points.get("C"), Some(&0));

        match score.details {
            ScoreDetails::Matching { ref groups, perfect } => {
                assert!(!perfect);
                assert_eq!(groups.len(), 2);
                let cat = groups.iter().find(|g| g.answer == "cat").unwrap();
                assert_eq!(cat.players, ids(&["A", "B"]));
            }
            _ => panic!("expected matching details"),
        }
    }

    #[test]
    fn test_perfect_meld_needs_three_participants_in_one_group() {
        let round = round_with_texts(&[("A", "cat"), ("B", "CAT"), ("C", " cat ")]);
        let score = score_round(
            GameType::MindMeld,
            &round,
            &ids(&["A", "B", "C"]),
            NormalizationPolicy::Strict,
        );
        assert!(matches!(
            score.details,
            ScoreDetails::Matching { perfect: true, .. }
        ));
        assert_eq!(score.points.get("A"), Some(&3));
    }

    #[test]
    fn test_two_matching_players_are_not_a_perfect_meld() {
        let round = round_with_texts(&[("A", "cat"), ("B", "cat")]);
        let score = score_round(
            GameType::MindMeld,
            &round,
            &ids(&["A", "B"]),
            NormalizationPolicy::Strict,
        );
        assert!(matches!(
            score.details,
            ScoreDetails::Matching { perfect: false, .. }
        ));
    }

    #[test]
    fn test_empty_submission_does_not_block_a_perfect_meld_but_does_not_join() {
        // Two matching players plus one empty: one group of two, two
        // participants, so no perfect meld and no points for the empty hand.
        let round = round_with_texts(&[("A", "cat"), ("B", "cat"), ("C", "   ")]);
        let score = score_round(
            GameType::MindMeld,
            &round,
            &ids(&["A", "B", "C"]),
            NormalizationPolicy::Strict,
        );
        assert_eq!(score.points.get("A"), Some(&2));
        assert_eq!(score.points.get("C"), Some(&0));
        assert!(matches!(
            score.details,
            ScoreDetails::Matching { perfect: false, .. }
        ));
    }

    #[test]
    fn test_uniqueness_red_red_blue_empty() {
        let round = round_with_texts(&[("A", "red"), ("B", "red"), ("C", "blue"), ("D", "")]);
        let score = score_round(
            GameType::OddOneOut,
            &round,
            &ids(&["A", "B", "C", "D"]),
            NormalizationPolicy::Strict,
        );

        assert_eq!(score.points.get("A"), Some(&0));
        assert_eq!(score.points.get("B"), Some(&0));
        assert_eq!(score.points.get("C"), Some(&1));
        assert_eq!(score.points.get("D"), Some(&0));

        match score.details {
            ScoreDetails::Uniqueness {
                ref unique,
                ref eliminated,
            } => {
                assert_eq!(unique, &ids(&["C"]));
                assert_eq!(eliminated, &ids(&["A", "B", "D"]));
            }
            _ => panic!("expected uniqueness details"),
        }
    }

    #[test]
    fn test_uniqueness_eliminates_players_who_never_submitted() {
        let round = round_with_texts(&[("A", "red")]);
        let score = score_round(
            GameType::OddOneOut,
            &round,
            &ids(&["A", "B"]),
            NormalizationPolicy::Strict,
        );
        assert_eq!(score.points.get("A"), Some(&1));
        assert_eq!(score.points.get("B"), Some(&0));
        assert!(matches!(
            score.details,
            ScoreDetails::Uniqueness { ref eliminated, .. } if eliminated == &ids(&["B"])
        ));
    }

    #[test]
    fn test_emoji_sequences_match_exactly_and_in_order() {
        let mut round = RoundData::new(1, RoundPhase::Input, 60);
        round.submissions.insert(
            "A".to_string(),
            Submission::Emoji {
                emojis: vec!["🔥".to_string(), "😀".to_string()],
            },
        );
        round.submissions.insert(
            "B".to_string(),
            Submission::Emoji {
                emojis: vec!["🔥".to_string(), "😀".to_string()],
            },
        );
        round.submissions.insert(
            "C".to_string(),
            Submission::Emoji {
                emojis: vec!["😀".to_string(), "🔥".to_string()],
            },
        );

        let score = score_round(
            GameType::EmojiSync,
            &round,
            &ids(&["A", "B", "C"]),
            NormalizationPolicy::Strict,
        );
        assert_eq!(score.points.get("A"), Some(&2));
        assert_eq!(score.points.get("B"), Some(&2));
        assert_eq!(score.points.get("C"), Some(&0));
    }

    #[test]
    fn test_emoji_entry_boundaries_are_part_of_the_key() {
        // Both sequences flatten to the same characters; the split point
        // differs, so they must not land in one group.
        let mut round = RoundData::new(1, RoundPhase::Input, 60);
        round.submissions.insert(
            "A".to_string(),
            Submission::Emoji {
                emojis: vec!["🔥😀".to_string(), "🎉".to_string()],
            },
        );
        round.submissions.insert(
            "B".to_string(),
            Submission::Emoji {
                emojis: vec!["🔥".to_string(), "😀🎉".to_string()],
            },
        );

        let score = score_round(
            GameType::EmojiSync,
            &round,
            &ids(&["A", "B"]),
            NormalizationPolicy::Strict,
        );
        assert_eq!(score.points.get("A"), Some(&0));
        assert_eq!(score.points.get("B"), Some(&0));
    }

    #[test]
    fn test_vote_tally_awards_one_point_per_vote_received() {
        let mut round = RoundData::new(1, RoundPhase::Voting, 60);
        round.votes.insert("A".to_string(), "C".to_string());
        round.votes.insert("B".to_string(), "C".to_string());
        round.votes.insert("C".to_string(), "A".to_string());

        let score = score_round(
            GameType::HotTakes,
            &round,
            &ids(&["A", "B", "C"]),
            NormalizationPolicy::Strict,
        );
        assert_eq!(score.points.get("C"), Some(&2));
        assert_eq!(score.points.get("A"), Some(&1));
        assert_eq!(score.points.get("B"), Some(&0));
    }

    #[test]
    fn test_drawings_never_join_matching_groups() {
        assert_eq!(
            group_key(
                &Submission::Drawing { strokes: vec![] },
                NormalizationPolicy::Strict
            ),
            None
        );
    }

    #[test]
    fn test_scoring_is_pure_and_deterministic() {
        let round = round_with_texts(&[("A", "cat"), ("B", "cat"), ("C", "dog")]);
        let before = round.clone();
        let players = ids(&["A", "B", "C"]);

        let first = score_round(
            GameType::MindMeld,
            &round,
            &players,
            NormalizationPolicy::Strict,
        );
        let second = score_round(
            GameType::MindMeld,
            &round,
            &players,
            NormalizationPolicy::Strict,
        );

        assert_eq!(first, second);
        assert_eq!(round, before);
    }
}
