//! Bot-vs-bot arena runner. Games run headless (no session, no delays) and in
//! parallel; each game's RNG is seeded from `base_seed + game_index`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::engine::board::Board;
use crate::engine::bot_strategy::BotStrategy;
use crate::engine::chain::resolve_quiet;
use crate::engine::error::EngineError;
use crate::engine::history::CellJournal;
use crate::engine::models::*;
use crate::engine::turns::{Advance, TurnScheduler};

#[derive(Debug, Clone)]
pub struct ArenaConfig {
    pub rows: usize,
    pub columns: usize,
    pub num_games: usize,
    pub base_seed: u64,
    /// Rotate seat order each game so no strategy always moves first.
    pub alternate_seats: bool,
    /// Games still running after this many turns are scored as draws.
    pub max_moves: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            rows: 6,
            columns: 6,
            num_games: 100,
            base_seed: 42,
            alternate_seats: true,
            max_moves: 2_000,
        }
    }
}

/// Aggregated results from an arena run.
pub struct ArenaResult {
    pub num_games: usize,
    /// Strategy names in the order they were entered.
    pub names: Vec<String>,
    pub wins: HashMap<String, usize>,
    pub draws: usize,
    /// Cells owned at game end, per game.
    pub total_scores: HashMap<String, Vec<f64>>,
    pub game_durations_ms: Vec<f64>,
    pub game_moves: Vec<u32>,
    /// Games stopped by `max_moves`.
    pub capped: usize,
}

impl ArenaResult {
    pub fn win_rate(&self, name: &str) -> f64 {
        *self.wins.get(name).unwrap_or(&0) as f64 / self.num_games.max(1) as f64
    }

    pub fn avg_score(&self, name: &str) -> f64 {
        match self.total_scores.get(name) {
            Some(s) if !s.is_empty() => s.iter().sum::<f64>() / s.len() as f64,
            _ => 0.0,
        }
    }

    pub fn score_stddev(&self, name: &str) -> f64 {
        let scores = match self.total_scores.get(name) {
            Some(s) if s.len() >= 2 => s,
            _ => return 0.0,
        };
        let avg = self.avg_score(name);
        let variance = scores.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / (scores.len() - 1) as f64;
        variance.sqrt()
    }

    /// Wilson score interval for the win rate.
    pub fn confidence_interval_95(&self, name: &str) -> (f64, f64) {
        let n = self.num_games;
        if n == 0 {
            return (0.0, 0.0);
        }
        let p = self.win_rate(name);
        let z = 1.96_f64;
        let denom = 1.0 + z * z / n as f64;
        let center = (p + z * z / (2.0 * n as f64)) / denom;
        let margin = z * ((p * (1.0 - p) + z * z / (4.0 * n as f64)) / n as f64).sqrt() / denom;
        ((center - margin).max(0.0), (center + margin).min(1.0))
    }

    pub fn avg_moves(&self) -> f64 {
        if self.game_moves.is_empty() {
            return 0.0;
        }
        self.game_moves.iter().map(|&m| m as f64).sum::<f64>() / self.game_moves.len() as f64
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Arena Results ({} games)", self.num_games)];
        lines.push("=".repeat(60));
        for name in &self.names {
            let (ci_lo, ci_hi) = self.confidence_interval_95(name);
            lines.push(format!(
                "  {:>12}: {:3} wins ({:5.1}%)  [95% CI: {:.1}%-{:.1}%]  cells={:5.1} +/- {:4.1}",
                name,
                self.wins.get(name).copied().unwrap_or(0),
                self.win_rate(name) * 100.0,
                ci_lo * 100.0,
                ci_hi * 100.0,
                self.avg_score(name),
                self.score_stddev(name),
            ));
        }
        lines.push(format!("  {:>12}: {}", "Draws", self.draws));
        if self.capped > 0 {
            lines.push(format!("  {:>12}: {}", "Move-capped", self.capped));
        }
        if !self.game_durations_ms.is_empty() {
            let avg_ms = self.game_durations_ms.iter().sum::<f64>() / self.game_durations_ms.len() as f64;
            let total_s = self.game_durations_ms.iter().sum::<f64>() / 1000.0;
            lines.push(format!(
                "  Avg game: {:.0}ms, {:.1} moves  |  Total: {:.1}s",
                avg_ms,
                self.avg_moves(),
                total_s
            ));
        }
        lines.join("\n")
    }
}

struct GameRecord {
    seats: Vec<usize>,
    winner_seat: Option<usize>,
    scores: Vec<usize>,
    moves: u32,
    capped: bool,
    duration_ms: f64,
}

/// Run `config.num_games` between the given strategies (one seat each, 2..=4).
pub fn run_arena(
    strategies: &[(String, Box<dyn BotStrategy>)],
    config: &ArenaConfig,
    progress_callback: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> Result<ArenaResult, EngineError> {
    let num_players = strategies.len();
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&num_players) {
        return Err(EngineError::InvalidPlayerCount(num_players));
    }
    let template = Board::new(config.rows, config.columns)?;
    let names: Vec<String> = strategies.iter().map(|(n, _)| n.clone()).collect();

    let completed = AtomicUsize::new(0);
    let records: Vec<GameRecord> = (0..config.num_games)
        .into_par_iter()
        .map(|game_idx| {
            let seats: Vec<usize> = if config.alternate_seats {
                (0..num_players).map(|i| (i + game_idx) % num_players).collect()
            } else {
                (0..num_players).collect()
            };
            let seat_strategies: Vec<&dyn BotStrategy> = seats.iter().map(|&s| strategies[s].1.as_ref()).collect();

            let t0 = Instant::now();
            let seed = config.base_seed.wrapping_add(game_idx as u64);
            let (winner_seat, scores, moves, capped) =
                play_one_game(&template, &seat_strategies, seed, config.max_moves);
            let record = GameRecord {
                seats,
                winner_seat,
                scores,
                moves,
                capped,
                duration_ms: t0.elapsed().as_secs_f64() * 1000.0,
            };

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = progress_callback {
                cb(done, config.num_games);
            }
            record
        })
        .collect();

    let mut result = ArenaResult {
        num_games: config.num_games,
        wins: names.iter().map(|n| (n.clone(), 0)).collect(),
        total_scores: names.iter().map(|n| (n.clone(), Vec::new())).collect(),
        names,
        draws: 0,
        game_durations_ms: Vec::with_capacity(records.len()),
        game_moves: Vec::with_capacity(records.len()),
        capped: 0,
    };

    for record in records {
        result.game_durations_ms.push(record.duration_ms);
        result.game_moves.push(record.moves);
        if record.capped {
            result.capped += 1;
        }
        for (seat, &strategy_idx) in record.seats.iter().enumerate() {
            let name = &result.names[strategy_idx];
            if let Some(scores) = result.total_scores.get_mut(name) {
                scores.push(record.scores[seat] as f64);
            }
        }
        match record.winner_seat {
            Some(seat) => {
                let name = &result.names[record.seats[seat]];
                if let Some(w) = result.wins.get_mut(name) {
                    *w += 1;
                }
            }
            None => result.draws += 1,
        }
    }

    Ok(result)
}

/// Play one game to completion. Returns (winning seat, cells per seat, turns taken, capped).
fn play_one_game(
    template: &Board,
    seat_strategies: &[&dyn BotStrategy],
    seed: u64,
    max_moves: u32,
) -> (Option<usize>, Vec<usize>, u32, bool) {
    let mut board = template.clone();
    let mut turns = TurnScheduler::new(&vec![PlayerKind::Ai; seat_strategies.len()]);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut moves = 0;
    let mut over = false;

    while moves < max_moves {
        let player = turns.active_player();
        let seat = turns.players().iter().position(|&p| p == player).unwrap_or(0);
        match seat_strategies[seat].choose_move(&board, player, &mut rng) {
            Some(pos) if board.is_playable(pos, player) => {
                let mut journal = CellJournal::for_board(&board);
                resolve_quiet(&mut board, pos, player, &mut journal);
            }
            other => {
                tracing::debug!(%player, ?other, "arena seat passed");
            }
        }
        moves += 1;
        if turns.advance(&board) == Advance::Over {
            over = true;
            break;
        }
    }

    let players = turns.players();
    let scores = players.iter().map(|&p| board.score(p)).collect();
    let winner_seat = if over {
        turns.winner(&board).and_then(|w| players.iter().position(|&p| p == w))
    } else {
        tracing::warn!(seed, moves, "arena game hit move cap");
        None
    };
    (winner_seat, scores, moves, !over)
}
