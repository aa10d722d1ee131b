//! Built-in experimental stimuli and battery files
//!
//! Every stimulus shares the same topology: player 1 chooses `Out` (ending the
//! game at state 2) or `In` (handing the move to player 2 at state 3), and
//! player 2 then chooses `Left` (state 4) or `Right` (state 5). Stimuli differ
//! only in their payoffs.

use std::{fmt, fs::File, io::BufReader, path::Path};

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use super::{Game, GameConfig, Player};
use crate::{Error, Result};

/// Build the canonical Out/In → Left/Right sharing game.
///
/// Each argument is the `(player 1, player 2)` payoff at that outcome.
///
/// # Examples
///
/// ```
/// use levelk::game::{Game, sharing_game};
///
/// let config = sharing_game((5.0, 5.0), (10.0, 10.0), (0.0, 0.0));
/// let game = Game::from_config("common_interest", &config)?;
/// assert_eq!(game.depth(), Some(2));
/// # Ok::<(), levelk::Error>(())
/// ```
pub fn sharing_game(out: (f64, f64), left: (f64, f64), right: (f64, f64)) -> GameConfig {
    GameConfig::new(1)
        .with_decision(1, Player::One, [("Out", 2), ("In", 3)])
        .with_decision(3, Player::Two, [("Left", 4), ("Right", 5)])
        .with_reward(2, out.0, out.1)
        .with_reward(4, left.0, left.1)
        .with_reward(5, right.0, right.1)
}

/// A game configuration together with its stimulus name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedGame {
    pub name: String,
    pub config: GameConfig,
}

impl NamedGame {
    pub fn new(name: impl Into<String>, config: GameConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Validate and build the game.
    pub fn build(&self) -> Result<Game> {
        Game::from_config(&self.name, &self.config)
    }
}

/// Ordered collection of named games used as one experiment's stimuli.
///
/// Serialized as a JSON object mapping game name to [`GameConfig`]; entry
/// order is preserved in both directions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Battery {
    games: Vec<NamedGame>,
}

const EXP1: &[(&str, (f64, f64), (f64, f64), (f64, f64))] = &[
    ("common_interest", (5.0, 5.0), (10.0, 10.0), (0.0, 0.0)),
    ("safe_shot", (0.0, 0.0), (5.0, 10.0), (10.0, 5.0)),
    ("strategic_dummy", (2.0, 2.0), (7.0, 7.0), (7.0, 7.0)),
    ("near_dictator", (10.0, 3.0), (7.0, 5.0), (5.0, 7.0)),
    ("costly_punish", (5.0, 10.0), (10.0, 5.0), (3.0, 3.0)),
    ("free_punish", (5.0, 10.0), (10.0, 5.0), (3.0, 5.0)),
    ("rational_punish", (5.0, 10.0), (3.0, 5.0), (10.0, 3.0)),
    ("costly_help", (5.0, 5.0), (10.0, 5.0), (3.0, 10.0)),
    ("free_help", (10.0, 5.0), (10.0, 10.0), (5.0, 5.0)),
    ("free_help_test", (10.0, 5.0), (10.0, 10.0), (10.0, 5.0)),
    ("trust_game", (5.0, 3.0), (10.0, 5.0), (3.0, 10.0)),
];

const EXP3: &[(&str, (f64, f64), (f64, f64), (f64, f64))] = &[
    ("common_interest_A", (5.0, 5.0), (10.0, 10.0), (10.0, 10.0)),
    ("common_interest_B", (0.0, 0.0), (10.0, 10.0), (0.0, 0.0)),
    ("safe_shot_A", (0.0, 0.0), (5.0, 10.0), (5.0, 10.0)),
    ("strategic_dummy_A", (8.0, 8.0), (7.0, 7.0), (7.0, 7.0)),
    ("strategic_dummy_B", (2.0, 2.0), (3.0, 3.0), (7.0, 7.0)),
    ("near_dictator_B", (10.0, 3.0), (15.0, 10.0), (5.0, 7.0)),
    ("rational_punish_A", (10.0, 15.0), (3.0, 5.0), (10.0, 3.0)),
    ("rational_punish_B", (2.0, 7.0), (3.0, 5.0), (10.0, 3.0)),
    ("costly_help_B", (3.0, 3.0), (10.0, 5.0), (3.0, 10.0)),
    ("costly_help_A", (5.0, 5.0), (3.0, 10.0), (3.0, 10.0)),
];

impl Battery {
    /// Names accepted by [`Battery::builtin`].
    pub const BUILTIN: [&'static str; 2] = ["exp1", "exp3"];

    pub fn new() -> Self {
        Self::default()
    }

    /// One of the built-in experiment batteries (`exp1`, `exp3`).
    pub fn builtin(name: &str) -> Result<Self> {
        let table = match name.trim().to_ascii_lowercase().as_str() {
            "exp1" | "training" => EXP1,
            "exp3" | "test" => EXP3,
            _ => {
                return Err(Error::UnknownGame {
                    name: name.to_string(),
                });
            }
        };
        Ok(table
            .iter()
            .map(|&(name, out, left, right)| NamedGame::new(name, sharing_game(out, left, right)))
            .collect())
    }

    /// Append a game, replacing any earlier game with the same name.
    pub fn push(&mut self, game: NamedGame) {
        if let Some(existing) = self.games.iter_mut().find(|g| g.name == game.name) {
            *existing = game;
        } else {
            self.games.push(game);
        }
    }

    pub fn get(&self, name: &str) -> Option<&NamedGame> {
        self.games.iter().find(|g| g.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedGame> {
        self.games.iter()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Build every game, failing on the first malformed configuration.
    pub fn build(&self) -> Result<Vec<Game>> {
        self.games.iter().map(NamedGame::build).collect()
    }

    /// Load a battery from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open battery {path:?}"),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Write the battery as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create battery {path:?}"),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

impl FromIterator<NamedGame> for Battery {
    fn from_iter<I: IntoIterator<Item = NamedGame>>(iter: I) -> Self {
        let mut battery = Battery::new();
        for game in iter {
            battery.push(game);
        }
        battery
    }
}

impl Serialize for Battery {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.games.len()))?;
        for game in &self.games {
            map.serialize_entry(&game.name, &game.config)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Battery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct BatteryVisitor;

        impl<'de> Visitor<'de> for BatteryVisitor {
            type Value = Battery;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from game name to game configuration")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Battery, A::Error> {
                let mut battery = Battery::new();
                while let Some((name, config)) = access.next_entry::<String, GameConfig>()? {
                    battery.push(NamedGame::new(name, config));
                }
                Ok(battery)
            }
        }

        deserializer.deserialize_map(BatteryVisitor)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_builtin_batteries_are_valid() {
        for name in Battery::BUILTIN {
            let battery = Battery::builtin(name).unwrap();
            let games = battery.build().unwrap();
            assert_eq!(games.len(), battery.len());
            assert!(games.iter().all(|g| g.depth() == Some(2)));
        }
        assert_eq!(Battery::builtin("exp1").unwrap().len(), 11);
        assert_eq!(Battery::builtin("exp3").unwrap().len(), 10);
        assert!(Battery::builtin("exp2").is_err());
    }

    #[test]
    fn test_json_preserves_order() {
        let battery = Battery::builtin("exp3").unwrap();
        let json = serde_json::to_string(&battery).unwrap();
        let parsed: Battery = serde_json::from_str(&json).unwrap();
        let names: Vec<&str> = parsed.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"common_interest_A"));
        assert_eq!(names.last(), Some(&"costly_help_A"));
        assert_eq!(parsed, battery);
    }

    #[test]
    fn test_file_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("battery.json");
        let battery = Battery::builtin("exp1").unwrap();
        battery.save(&path).expect("Failed to save");
        let loaded = Battery::load(&path).expect("Failed to load");
        assert_eq!(loaded.get("trust_game"), battery.get("trust_game"));
    }

    #[test]
    fn test_push_replaces_same_name() {
        let mut battery = Battery::new();
        battery.push(NamedGame::new(
            "g",
            sharing_game((1.0, 1.0), (2.0, 2.0), (3.0, 3.0)),
        ));
        battery.push(NamedGame::new(
            "g",
            sharing_game((4.0, 4.0), (2.0, 2.0), (3.0, 3.0)),
        ));
        assert_eq!(battery.len(), 1);
    }
}
