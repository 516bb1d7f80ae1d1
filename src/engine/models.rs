//! Core engine data types shared by the board, scheduler, AI and session.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Cell owner / participant identifier. `Unclaimed` is the sentinel for cells nobody owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Unclaimed,
    Green,
    Red,
    Blue,
    Yellow,
}

impl Player {
    /// Participants in seat order. A session with K players uses the first K.
    pub const SEATS: [Player; MAX_PLAYERS] = [Player::Green, Player::Red, Player::Blue, Player::Yellow];

    pub fn display_name(self) -> &'static str {
        match self {
            Player::Unclaimed => "None",
            Player::Green => "Green",
            Player::Red => "Red",
            Player::Blue => "Blue",
            Player::Yellow => "Yellow",
        }
    }

    pub fn is_claimed(self) -> bool {
        self != Player::Unclaimed
    }

    /// Single-character board glyph used by the terminal renderer.
    pub fn glyph(self) -> char {
        match self {
            Player::Unclaimed => '.',
            Player::Green => 'G',
            Player::Red => 'R',
            Player::Blue => 'B',
            Player::Yellow => 'Y',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Who controls a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerKind {
    Human,
    Ai,
}

/// Session mode: all humans (pass-and-play) or one AI opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerType {
    Human,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Cosmetic pause before the AI commits its move.
    pub fn thinking_time(self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_millis(300),
            Difficulty::Medium => Duration::from_millis(500),
            Difficulty::Hard => Duration::from_millis(700),
            Difficulty::Expert => Duration::from_millis(1000),
        }
    }

    pub fn search_depth(self) -> usize {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Expert => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "expert" => Ok(Difficulty::Expert),
            other => Err(format!("unknown difficulty '{other}' (expected easy|medium|hard|expert)")),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    WaitingForInput,
    ResolvingChainReaction,
    AiThinking,
    Paused,
    Over,
}

/// Board coordinate, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Value + owner of one cell, without the fixed neighbor count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellState {
    pub value: u32,
    pub owner: Player,
}

/// A cell's state after a wave touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub pos: Pos,
    pub value: u32,
    pub owner: Player,
    pub exploded: bool,
}

/// Everything needed to construct a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub rows: usize,
    pub columns: usize,
    /// One entry per active seat, in turn order.
    pub seats: Vec<PlayerKind>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SessionConfig {
    /// Maps the session mode to seat kinds. In AI mode the Red seat is the computer.
    pub fn new(
        rows: usize,
        columns: usize,
        player_type: PlayerType,
        number_of_players: usize,
        difficulty: Difficulty,
    ) -> Self {
        let seats = (0..number_of_players)
            .map(|i| match player_type {
                PlayerType::Ai if i == 1 => PlayerKind::Ai,
                _ => PlayerKind::Human,
            })
            .collect();
        Self {
            rows,
            columns,
            seats,
            difficulty,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn player_type(&self) -> PlayerType {
        if self.seats.contains(&PlayerKind::Ai) {
            PlayerType::Ai
        } else {
            PlayerType::Human
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.rows < 1 || self.columns < 1 {
            return Err(EngineError::InvalidDimensions {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.seats.len()) {
            return Err(EngineError::InvalidPlayerCount(self.seats.len()));
        }
        Ok(())
    }
}

/// Final result of a finished game, handed to the statistics collaborator once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: Option<Player>,
    pub player_type: PlayerType,
    pub board_size: usize,
    pub duration: Duration,
    pub moves: u32,
    pub difficulty: Difficulty,
}

/// Handle for a scheduled AI continuation. Only the ticket issued for the
/// current generation and move is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiTicket {
    pub generation: u64,
    pub move_number: u32,
    pub player: Player,
}

/// Notifications for the presentation layer, drained from the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    WaveResolved {
        generation: u64,
        wave: usize,
        changes: Vec<CellChange>,
    },
    TurnChanged {
        player: Player,
    },
    AiThinkingStarted {
        player: Player,
    },
    AiThinkingStopped {
        player: Player,
    },
    MoveUndone {
        player: Player,
        cells: usize,
    },
    SessionReset {
        generation: u64,
        rows: usize,
        columns: usize,
    },
    GameOver {
        outcome: GameOutcome,
    },
}
