//! Depth-limited minimax with alpha-beta bounds for the hard and expert tiers.
//!
//! Every ply simulates a move by the searching player; opponent replies are not
//! modeled. Moves are simulated on a private board copy per root candidate and
//! reverted through a `CellJournal` at each inner ply, so the caller's board is
//! never touched and root candidates can be searched in parallel.

use std::time::Instant;

use rayon::prelude::*;

use crate::engine::board::Board;
use crate::engine::chain::resolve_quiet;
use crate::engine::evaluator::{evaluate, greedy_score};
use crate::engine::history::CellJournal;
use crate::engine::models::{Player, Pos};

/// Minimax search parameters.
#[derive(Debug, Clone)]
pub struct MinimaxParams {
    /// Plies searched, counting the root move.
    pub depth: usize,
    /// Candidates kept per ply after greedy ordering. 0 keeps all of them.
    pub max_branching: usize,
    /// Upper bound on `candidates^depth` before an uncapped search narrows its
    /// branching. 0 disables the bound.
    pub node_budget: usize,
}

/// Default `node_budget`: full search up to 6x6 at depth 4, 10x10 at depth 3.
pub const DEFAULT_NODE_BUDGET: usize = 2_000_000;

impl Default for MinimaxParams {
    fn default() -> Self {
        Self {
            depth: 3,
            max_branching: 0,
            node_budget: DEFAULT_NODE_BUDGET,
        }
    }
}

impl MinimaxParams {
    /// Branching used for a search whose root has `candidates` legal moves.
    /// An explicit `max_branching` wins; otherwise every candidate is kept
    /// unless `candidates^depth` would exceed the node budget.
    pub fn effective_branching(&self, candidates: usize) -> usize {
        if self.max_branching > 0 || self.node_budget == 0 {
            return self.max_branching;
        }
        let depth = self.depth.max(1) as u32;
        if within_budget(candidates, depth, self.node_budget) {
            return 0;
        }
        let mut width = (self.node_budget as f64).powf(1.0 / depth as f64).floor() as usize;
        while width > 1 && !within_budget(width, depth, self.node_budget) {
            width -= 1;
        }
        while within_budget(width + 1, depth, self.node_budget) {
            width += 1;
        }
        width.max(1)
    }
}

fn within_budget(width: usize, depth: u32, budget: usize) -> bool {
    (width as u64).checked_pow(depth).map_or(false, |n| n <= budget as u64)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best: Option<Pos>,
    pub score: i64,
    pub nodes: usize,
}

/// Pick the root move with the best achievable evaluation for `me`.
/// Ties go to the earliest candidate.
pub fn minimax_search(board: &Board, me: Player, params: &MinimaxParams) -> SearchResult {
    let t0 = Instant::now();
    let branching = params.effective_branching(board.valid_moves(me).len());
    if branching != params.max_branching {
        tracing::debug!(player = %me, branching, budget = params.node_budget, "narrowing search to node budget");
    }
    let params = &MinimaxParams {
        max_branching: branching,
        ..params.clone()
    };
    let candidates = ordered_candidates(board, me, params.max_branching);
    match candidates.len() {
        0 => {
            return SearchResult {
                best: None,
                score: evaluate(board, me),
                nodes: 0,
            }
        }
        1 if params.depth <= 1 => {
            let mut work = board.clone();
            let mut journal = CellJournal::for_board(&work);
            resolve_quiet(&mut work, candidates[0], me, &mut journal);
            return SearchResult {
                best: Some(candidates[0]),
                score: evaluate(&work, me),
                nodes: 1,
            };
        }
        _ => {}
    }

    let depth = params.depth.max(1);
    let results: Vec<(Pos, i64, usize)> = candidates
        .par_iter()
        .map(|&pos| {
            let mut work = board.clone();
            let mut journal = CellJournal::for_board(&work);
            resolve_quiet(&mut work, pos, me, &mut journal);
            let mut nodes = 1;
            let score = alpha_beta(&mut work, me, depth - 1, i64::MIN, i64::MAX, params, &mut nodes);
            (pos, score, nodes)
        })
        .collect();

    let nodes = results.iter().map(|&(_, _, n)| n).sum();
    let mut best: Option<(Pos, i64)> = None;
    for &(pos, score, _) in &results {
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((pos, score));
        }
    }

    let (best_pos, best_score) = match best {
        Some((p, s)) => (Some(p), s),
        None => (None, evaluate(board, me)),
    };
    tracing::debug!(
        player = %me,
        depth,
        candidates = candidates.len(),
        nodes,
        score = best_score,
        elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
        "minimax search finished"
    );
    SearchResult {
        best: best_pos,
        score: best_score,
        nodes,
    }
}

fn alpha_beta(
    board: &mut Board,
    me: Player,
    depth: usize,
    mut alpha: i64,
    beta: i64,
    params: &MinimaxParams,
    nodes: &mut usize,
) -> i64 {
    if depth == 0 || board.sole_owner().is_some() {
        return evaluate(board, me);
    }
    let candidates = ordered_candidates(board, me, params.max_branching);
    if candidates.is_empty() {
        return evaluate(board, me);
    }

    let mut journal = CellJournal::for_board(board);
    let mut best = i64::MIN;
    for pos in candidates {
        *nodes += 1;
        resolve_quiet(board, pos, me, &mut journal);
        let score = alpha_beta(board, me, depth - 1, alpha, beta, params, nodes);
        journal.rollback(board);

        best = best.max(score);
        alpha = alpha.max(score);
        if beta <= alpha {
            break;
        }
    }
    best
}

/// Legal moves for `me`, row-major; when capped, ordered by greedy score first.
pub fn ordered_candidates(board: &Board, me: Player, max_branching: usize) -> Vec<Pos> {
    let moves = board.valid_moves(me);
    if max_branching == 0 || moves.len() <= max_branching {
        return moves;
    }
    let mut scored: Vec<(Pos, i64)> = moves.into_iter().map(|p| (p, greedy_score(board, p, me))).collect();
    // stable: equal scores keep row-major order
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(max_branching);
    scored.into_iter().map(|(p, _)| p).collect()
}
