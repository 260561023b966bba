//! Round prompts for each game and difficulty.
//!
//! Content is an injected collaborator so tests can pin a prompt instead of
//! getting a random one. The built-in source serves from static tables and
//! never fails.

use crate::types::{Difficulty, GameType};
use rand::Rng;

/// Prompt text plus an optional category label for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundContent {
    pub prompt: String,
    pub category: Option<String>,
}

/// Source of round prompts. Synchronous and infallible.
pub trait ContentSource: Send + Sync {
    fn round_content(&self, game: GameType, difficulty: Difficulty) -> RoundContent;
}

/// Serves prompts from the built-in tables below.
#[derive(Debug, Default)]
pub struct BuiltinContent;

impl ContentSource for BuiltinContent {
    fn round_content(&self, game: GameType, difficulty: Difficulty) -> RoundContent {
        let table = prompt_table(game, difficulty);
        let mut rng = rand::rng();
        let (prompt, category) = table[rng.random_range(0..table.len())];
        RoundContent {
            prompt: prompt.to_string(),
            category: category.map(str::to_string),
        }
    }
}

type PromptRow = (&'static str, Option<&'static str>);

fn prompt_table(game: GameType, difficulty: Difficulty) -> &'static [PromptRow] {
    use Difficulty::*;
    use GameType::*;
    match (game, difficulty) {
        (MindMeld, Easy) => &[
            ("Name a pizza topping", Some("Food")),
            ("Name a pet animal", Some("Animals")),
            ("Name a color of the rainbow", Some("Colors")),
            ("Name a fruit", Some("Food")),
            ("Name something you find at the beach", Some("Places")),
        ],
        (MindMeld, Medium) => &[
            ("Name a superhero", Some("Pop culture")),
            ("Name a board game", Some("Games")),
            ("Name a breakfast food", Some("Food")),
            ("Name something in a toolbox", Some("Everyday")),
            ("Name a musical instrument", Some("Music")),
        ],
        (MindMeld, Hard) => &[
            ("Name a chemical element", Some("Science")),
            ("Name a capital city in South America", Some("Geography")),
            ("Name a Shakespeare play", Some("Books")),
            ("Name a constellation", Some("Science")),
            ("Name a currency that is not the euro or dollar", Some("World")),
        ],
        (OddOneOut, Easy) => &[
            ("Name an animal with four legs", Some("Animals")),
            ("Name an ice cream flavor", Some("Food")),
            ("Name something red", Some("Colors")),
            ("Name a sport", Some("Sports")),
            ("Name a farm animal", Some("Animals")),
        ],
        (OddOneOut, Medium) => &[
            ("Name a country in Europe", Some("Geography")),
            ("Name a kitchen utensil", Some("Everyday")),
            ("Name a movie villain", Some("Pop culture")),
            ("Name a job that needs a uniform", Some("Work")),
            ("Name something that flies", None),
        ],
        (OddOneOut, Hard) => &[
            ("Name a prime number under 100", Some("Numbers")),
            ("Name a mythological creature", Some("Myths")),
            ("Name an Olympic discipline", Some("Sports")),
            ("Name a sea that is not the Mediterranean", Some("Geography")),
            ("Name a unit of measurement", Some("Science")),
        ],
        (EmojiSync, Easy) => &[
            ("Describe a birthday party in two emoji", None),
            ("Pick one emoji for Monday morning", None),
            ("Describe summer vacation in two emoji", None),
            ("Pick one emoji for your favorite food", None),
        ],
        (EmojiSync, Medium) => &[
            ("Describe a horror movie in three emoji", None),
            ("Describe your last week in three emoji", None),
            ("Describe a wedding in three emoji", None),
            ("Describe rush hour in two emoji", None),
        ],
        (EmojiSync, Hard) => &[
            ("Describe the plot of Romeo and Juliet in four emoji", None),
            ("Describe the internet in three emoji", None),
            ("Describe time travel in four emoji", None),
            ("Describe an awkward silence in three emoji", None),
        ],
        (QuickDraw, Easy) => &[
            ("Draw a cat wearing a hat", None),
            ("Draw your breakfast", None),
            ("Draw a house on a hill", None),
            ("Draw a robot dancing", None),
        ],
        (QuickDraw, Medium) => &[
            ("Draw your favorite movie scene", None),
            ("Draw a dragon at the dentist", None),
            ("Draw the last thing you bought", None),
            ("Draw a penguin on vacation", None),
        ],
        (QuickDraw, Hard) => &[
            ("Draw the feeling of déjà vu", None),
            ("Draw Monday as a creature", None),
            ("Draw the sound of an alarm clock", None),
            ("Draw gravity taking a day off", None),
        ],
        (HotTakes, Easy) => &[
            ("Pineapple on pizza: give your verdict", None),
            ("What is the best day of the week?", None),
            ("Cats or dogs, and why?", None),
            ("What is the most overrated snack?", None),
        ],
        (HotTakes, Medium) => &[
            ("What movie does everyone love but you?", None),
            ("What should be banned from open-plan offices?", None),
            ("What is the most useless superpower?", None),
            ("What food combination should be illegal?", None),
        ],
        (HotTakes, Hard) => &[
            ("Defend the least popular opinion you actually hold", None),
            ("What invention made the world worse?", None),
            ("What tradition deserves to be retired?", None),
            ("What would you rename the moon?", None),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_game_and_difficulty_has_prompts() {
        for game in GameType::ALL {
            for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
                let table = prompt_table(game, difficulty);
                assert!(!table.is_empty(), "{game:?}/{difficulty:?} has no prompts");
                for (prompt, _) in table {
                    assert!(!prompt.trim().is_empty());
                }
            }
        }
    }

    #[test]
    fn test_builtin_source_serves_from_the_table() {
        let source = BuiltinContent;
        let content = source.round_content(GameType::MindMeld, Difficulty::Easy);
        assert!(prompt_table(GameType::MindMeld, Difficulty::Easy)
            .iter()
            .any(|(p, _)| *p == content.prompt));
    }
}
