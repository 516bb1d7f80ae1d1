//! Bot strategy trait and the three AI tiers.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::engine::board::Board;
use crate::engine::evaluator::greedy_score;
use crate::engine::minimax::{minimax_search, MinimaxParams};
use crate::engine::models::{Player, Pos};

/// A bot strategy picks the cell to bump for `me`, or `None` to pass.
///
/// Strategies only read the board; any simulation happens on private copies.
pub trait BotStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn choose_move(&self, board: &Board, me: Player, rng: &mut dyn RngCore) -> Option<Pos>;
}

/// Picks a uniformly random valid cell.
pub struct RandomStrategy;

impl BotStrategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&self, board: &Board, me: Player, rng: &mut dyn RngCore) -> Option<Pos> {
        board.valid_moves(me).choose(rng).copied()
    }
}

/// Scores every valid cell with the reachability heuristic and picks among the best.
pub struct GreedyStrategy {
    /// Chance of narrowing the best set to its highest-valued cells before picking.
    pub fortify_chance: f64,
}

impl GreedyStrategy {
    pub fn new() -> Self {
        Self { fortify_chance: 0.0 }
    }

    pub fn with_fortify(fortify_chance: f64) -> Self {
        Self {
            fortify_chance: fortify_chance.clamp(0.0, 1.0),
        }
    }

    /// All candidates sharing the top greedy score, row-major.
    pub fn best_candidates(board: &Board, me: Player) -> (Vec<Pos>, i64) {
        let mut best = Vec::new();
        let mut best_score = i64::MIN;
        for pos in board.valid_moves(me) {
            let score = greedy_score(board, pos, me);
            if score > best_score {
                best_score = score;
                best.clear();
                best.push(pos);
            } else if score == best_score {
                best.push(pos);
            }
        }
        (best, best_score)
    }
}

impl Default for GreedyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl BotStrategy for GreedyStrategy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn choose_move(&self, board: &Board, me: Player, rng: &mut dyn RngCore) -> Option<Pos> {
        let (mut best, score) = Self::best_candidates(board, me);
        if best.is_empty() {
            return None;
        }
        if self.fortify_chance > 0.0 && rng.gen_bool(self.fortify_chance) {
            let top = best
                .iter()
                .filter_map(|&p| board.get(p).map(|c| c.value))
                .max()
                .unwrap_or(0);
            best.retain(|&p| board.get(p).is_some_and(|c| c.value == top));
        }
        let choice = best.choose(rng).copied();
        tracing::debug!(player = %me, score, ties = best.len(), ?choice, "greedy move");
        choice
    }
}

/// Wraps the minimax search as a BotStrategy.
pub struct MinimaxStrategy {
    pub params: MinimaxParams,
}

impl MinimaxStrategy {
    pub fn new(params: MinimaxParams) -> Self {
        Self { params }
    }
}

impl BotStrategy for MinimaxStrategy {
    fn name(&self) -> &str {
        "minimax"
    }

    fn choose_move(&self, board: &Board, me: Player, _rng: &mut dyn RngCore) -> Option<Pos> {
        minimax_search(board, me, &self.params).best
    }
}
