//! Static scoring used by the AI tiers: the greedy candidate heuristic and the
//! board evaluation at minimax leaves.

use crate::engine::board::Board;
use crate::engine::models::{Player, Pos};

pub const REACH_OWN_OR_FREE: i64 = 1;
pub const REACH_OPPONENT: i64 = 10;
pub const STRONGER_NEIGHBOR_PENALTY: i64 = 50;
pub const WEAKER_OPPONENT_BONUS: i64 = 10;

pub const VALUE_WEIGHT: i64 = 10;
pub const CORNER_BONUS: i64 = 20;
pub const PRIMED_BONUS: i64 = 30;

/// Every cell a bump at `start` could reach through a chain of explosions.
///
/// A cell that would not explode is included but stops the fill; one that
/// would explode continues into its neighbors. Iterative, so large boards
/// cannot exhaust the stack.
pub fn reachable_set(board: &Board, start: Pos) -> Vec<Pos> {
    let mut visited = vec![false; board.len()];
    let mut stack = vec![start];
    let mut reached = Vec::new();

    while let Some(pos) = stack.pop() {
        let Some(cell) = board.get(pos) else { continue };
        let idx = board.index(pos);
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        reached.push(pos);
        if cell.would_explode() {
            stack.extend(board.neighbors(pos));
        }
    }

    reached
}

/// Greedy score of bumping `candidate` for `me`.
pub fn greedy_score(board: &Board, candidate: Pos, me: Player) -> i64 {
    let Some(cand) = board.get(candidate) else {
        return i64::MIN;
    };

    let mut score = 0;
    for pos in reachable_set(board, candidate) {
        let Some(cell) = board.get(pos) else { continue };
        score += if cell.owner == Player::Unclaimed || cell.owner == me {
            REACH_OWN_OR_FREE
        } else {
            REACH_OPPONENT
        };
    }

    for pos in board.neighbors(candidate) {
        let Some(n) = board.get(pos) else { continue };
        if n.owner == me {
            continue;
        }
        if n.value > cand.value {
            score -= STRONGER_NEIGHBOR_PENALTY;
        } else if n.owner.is_claimed() {
            score += WEAKER_OPPONENT_BONUS;
        }
    }

    score
}

/// Board evaluation from `me`'s point of view.
pub fn evaluate(board: &Board, me: Player) -> i64 {
    let mut total = 0;
    for (pos, cell) in board.cells() {
        let value = cell.value as i64;
        if cell.owner == me {
            total += value * VALUE_WEIGHT;
            if board.is_corner(pos) {
                total += CORNER_BONUS;
            }
            if cell.value == cell.neighbor_count() {
                total += PRIMED_BONUS;
            }
        } else if cell.owner.is_claimed() {
            total -= value * VALUE_WEIGHT;
        }
    }
    total
}
