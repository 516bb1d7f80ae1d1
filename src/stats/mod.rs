//! Lifetime play statistics and achievement unlocking.
//!
//! Fed one `GameOutcome` per finished game by whoever owns the session. Only
//! games against the AI count towards wins, losses and streaks.

pub mod achievements;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;
use crate::engine::models::{Difficulty, GameOutcome, Player, PlayerType};
use achievements::*;

pub const SPEED_DEMON_LIMIT: Duration = Duration::from_secs(30);
pub const BIG_BOARD_CELLS: usize = 100;
pub const CONSISTENT_MIN_GAMES: u32 = 20;
pub const CONSISTENT_WIN_RATE: f64 = 75.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    pub total_games_played: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    pub total_draws: u32,
    pub win_streak: u32,
    pub best_win_streak: u32,
    pub total_moves_played: u64,
    pub fastest_win_ms: Option<u64>,
    /// Cell count of the largest board won.
    pub largest_board_conquered: usize,
    pub easy_wins: u32,
    pub medium_wins: u32,
    pub hard_wins: u32,
    pub expert_wins: u32,
    pub unlocked_achievement_ids: Vec<String>,
}

impl Statistics {
    /// Percentage of all recorded games won.
    pub fn win_rate(&self) -> f64 {
        if self.total_games_played == 0 {
            return 0.0;
        }
        self.total_wins as f64 / self.total_games_played as f64 * 100.0
    }

    pub fn wins_at(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy_wins,
            Difficulty::Medium => self.medium_wins,
            Difficulty::Hard => self.hard_wins,
            Difficulty::Expert => self.expert_wins,
        }
    }

    pub fn fastest_win(&self) -> Option<Duration> {
        self.fastest_win_ms.map(Duration::from_millis)
    }

    /// `m:ss`, or `None` before the first win.
    pub fn formatted_fastest_win(&self) -> Option<String> {
        let secs = self.fastest_win()?.as_secs();
        Some(format!("{}:{:02}", secs / 60, secs % 60))
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked_achievement_ids.iter().any(|a| a == id)
    }

    /// Fold one finished game into the totals. `local` is the seat played on
    /// this device. Returns achievements unlocked by this game.
    pub fn record_game_result(&mut self, outcome: &GameOutcome, local: Player) -> Vec<&'static Achievement> {
        if outcome.board_size == 0 {
            tracing::warn!(?outcome, "ignoring invalid game result");
            return Vec::new();
        }

        let mut unlocked = Vec::new();
        self.total_games_played += 1;
        self.total_moves_played += u64::from(outcome.moves);

        if outcome.player_type == PlayerType::Ai {
            match outcome.winner {
                Some(winner) if winner == local => {
                    self.record_win(outcome, &mut unlocked);
                }
                None => {
                    self.total_draws += 1;
                    self.win_streak = 0;
                }
                Some(_) => {
                    self.total_losses += 1;
                    self.win_streak = 0;
                }
            }
        }

        if self.total_games_played >= 100 {
            self.unlock(DEDICATED, &mut unlocked);
        }
        if self.largest_board_conquered >= BIG_BOARD_CELLS {
            self.unlock(BIG_BOARD_MASTER, &mut unlocked);
        }
        if self.total_games_played >= CONSISTENT_MIN_GAMES && self.win_rate() >= CONSISTENT_WIN_RATE {
            self.unlock(CONSISTENT, &mut unlocked);
        }

        if !unlocked.is_empty() {
            tracing::info!(
                achievements = ?unlocked.iter().map(|a| a.id).collect::<Vec<_>>(),
                "achievements unlocked"
            );
        }
        unlocked
    }

    fn record_win(&mut self, outcome: &GameOutcome, unlocked: &mut Vec<&'static Achievement>) {
        self.total_wins += 1;
        self.win_streak += 1;
        self.best_win_streak = self.best_win_streak.max(self.win_streak);

        let duration_ms = outcome.duration.as_millis() as u64;
        if duration_ms > 0 && self.fastest_win_ms.map_or(true, |best| duration_ms < best) {
            self.fastest_win_ms = Some(duration_ms);
        }
        if !outcome.duration.is_zero() && outcome.duration < SPEED_DEMON_LIMIT {
            self.unlock(SPEED_DEMON, unlocked);
        }
        self.largest_board_conquered = self.largest_board_conquered.max(outcome.board_size);

        match outcome.difficulty {
            Difficulty::Easy => self.easy_wins += 1,
            Difficulty::Medium => self.medium_wins += 1,
            Difficulty::Hard => self.hard_wins += 1,
            Difficulty::Expert => self.expert_wins += 1,
        }

        let thresholds = [
            (self.total_wins >= 1, FIRST_VICTORY),
            (self.total_wins >= 10, TEN_WINS),
            (self.total_wins >= 50, FIFTY_WINS),
            (self.total_wins >= 100, CENTURION),
            (self.win_streak >= 5, ON_FIRE),
            (self.win_streak >= 10, UNSTOPPABLE),
            (self.expert_wins >= 1, EXPERT_SLAYER),
            (self.expert_wins >= 10, MASTER_TACTICIAN),
        ];
        for (reached, id) in thresholds {
            if reached {
                self.unlock(id, unlocked);
            }
        }
    }

    fn unlock(&mut self, id: &str, unlocked: &mut Vec<&'static Achievement>) {
        if self.is_unlocked(id) {
            return;
        }
        if let Some(a) = achievement(id) {
            self.unlocked_achievement_ids.push(a.id.to_string());
            unlocked.push(a);
        }
    }

    /// Zero every counter. Unlocked achievements stay unlocked.
    pub fn reset(&mut self) {
        let ids = std::mem::take(&mut self.unlocked_achievement_ids);
        *self = Self {
            unlocked_achievement_ids: ids,
            ..Self::default()
        };
    }
}

/// JSON file persistence for `Statistics`.
#[derive(Debug, Clone)]
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields fresh statistics.
    pub fn load(&self) -> Result<Statistics, EngineError> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "no statistics file, starting fresh");
            return Ok(Statistics::default());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| EngineError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, stats: &Statistics) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(stats)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| EngineError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, json).map_err(|source| EngineError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
