//! Player identity and per-player storage

use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// One of the two players of a sharing game.
///
/// Player one moves first in every stimulus; player two responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Player {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl Player {
    /// Both players, in turn order.
    pub const BOTH: [Player; 2] = [Player::One, Player::Two];

    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Zero-based slot used by [`PerPlayer`].
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// Suffix used in parameter names (`beta_player1`).
    pub fn label(self) -> &'static str {
        match self {
            Player::One => "player1",
            Player::Two => "player2",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => f.write_str("1"),
            Player::Two => f.write_str("2"),
        }
    }
}

impl FromStr for Player {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "p1" | "one" | "player1" => Ok(Player::One),
            "2" | "p2" | "two" | "player2" => Ok(Player::Two),
            _ => Err(crate::Error::InvalidParameter {
                name: "player".to_string(),
                reason: format!("'{s}' is not a player (expected 1 or 2)"),
            }),
        }
    }
}

/// One value per player, indexed by [`Player`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerPlayer<T> {
    values: [T; 2],
}

impl<T> PerPlayer<T> {
    pub fn new(one: T, two: T) -> Self {
        Self { values: [one, two] }
    }

    /// Build from a function of the player.
    pub fn from_fn(mut f: impl FnMut(Player) -> T) -> Self {
        Self::new(f(Player::One), f(Player::Two))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Player, &T)> {
        Player::BOTH.into_iter().zip(self.values.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerPlayer<U> {
        PerPlayer::new(f(&self.values[0]), f(&self.values[1]))
    }
}

impl<T: Clone> PerPlayer<T> {
    /// Same value for both players.
    pub fn splat(value: T) -> Self {
        Self::new(value.clone(), value)
    }
}

impl<T> Index<Player> for PerPlayer<T> {
    type Output = T;

    fn index(&self, player: Player) -> &T {
        &self.values[player.index()]
    }
}

impl<T> IndexMut<Player> for PerPlayer<T> {
    fn index_mut(&mut self, player: Player) -> &mut T {
        &mut self.values[player.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involution() {
        for player in Player::BOTH {
            assert_ne!(player, player.opponent());
            assert_eq!(player, player.opponent().opponent());
        }
    }

    #[test]
    fn test_player_parsing() {
        assert_eq!("1".parse::<Player>().unwrap(), Player::One);
        assert_eq!("P2".parse::<Player>().unwrap(), Player::Two);
        assert!("3".parse::<Player>().is_err());
    }

    #[test]
    fn test_player_serializes_as_wire_key() {
        assert_eq!(serde_json::to_string(&Player::One).unwrap(), "\"1\"");
        let parsed: Player = serde_json::from_str("\"2\"").unwrap();
        assert_eq!(parsed, Player::Two);
    }

    #[test]
    fn test_per_player_indexing() {
        let mut betas = PerPlayer::new(0.5, 1.0);
        assert_eq!(betas[Player::One], 0.5);
        betas[Player::Two] = 2.0;
        assert_eq!(betas[Player::Two], 2.0);
        let doubled = betas.map(|b| b * 2.0);
        assert_eq!(doubled[Player::One], 1.0);
    }
}
