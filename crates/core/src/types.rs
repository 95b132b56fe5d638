use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    pub struct RoomId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::North, Direction::South, Direction::East, Direction::West];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SessionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|direction| direction.as_str() == normalized)
            .ok_or_else(|| SessionError::InvalidDirection { direction: normalized })
    }
}

/// Where a session sits in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    Menu,
    Playing,
    GameOver { won: bool },
}

impl SessionPhase {
    pub fn is_game_over(self) -> bool {
        matches!(self, Self::GameOver { .. })
    }
}

/// A single player action, as issued by a frontend and recorded in journals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    StartNewGame,
    ReturnToMenu,
    Move { direction: String },
    PickupItem,
    SetPlayerName { name: String },
}

/// Recoverable command failures. The display text doubles as the player-facing status line.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("You are in an unknown area.")]
    UnknownRoom { room: String },

    #[error("You can't go that way.")]
    InvalidDirection { direction: String },

    #[error("There is nothing here to pick up.")]
    NothingToPickUp,

    #[error("You already picked up the {item}.")]
    AlreadyCollected { item: String },

    #[error("There is no adventure in progress. Start a new game first.")]
    NotInProgress,
}
