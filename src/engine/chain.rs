//! Chain-reaction resolution: breadth-first, wave-by-wave explosion propagation.
//!
//! A bump adds one to a cell and hands it to the acting player. A cell whose
//! value then exceeds its neighbor count explodes: it drops back to 1 and each
//! neighbor is queued for the *next* wave. Cells bumped twice in the same wave
//! accumulate sequentially in queue order.

use crate::engine::board::Board;
use crate::engine::history::CellJournal;
use crate::engine::models::{CellChange, Player, Pos};

/// Hard stop for a single move's resolution.
pub const MAX_WAVES: usize = 10_000;

/// One resolved wave, reported to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wave {
    pub index: usize,
    /// Final state of every cell this wave touched, in first-touch order.
    pub changes: Vec<CellChange>,
}

impl Wave {
    pub fn explosions(&self) -> usize {
        self.changes.iter().filter(|c| c.exploded).count()
    }
}

/// Apply a single bump. Returns `Some(true)` if the cell exploded, queuing its
/// neighbors into `next`; `None` if `pos` is off the board.
pub fn bump(board: &mut Board, pos: Pos, acting: Player, next: &mut Vec<Pos>) -> Option<bool> {
    let cell = board.get_mut(pos)?;
    cell.value += 1;
    cell.owner = acting;
    if cell.value > cell.neighbor_count() {
        cell.value = 1;
        next.extend(board.neighbors(pos));
        Some(true)
    } else {
        Some(false)
    }
}

/// Resolution of one move, started from a single tapped cell.
#[derive(Debug, Clone)]
pub struct ChainReaction {
    acting: Player,
    pending: Vec<Pos>,
    waves: usize,
    truncated: bool,
}

impl ChainReaction {
    pub fn new(origin: Pos, acting: Player) -> Self {
        Self {
            acting,
            pending: vec![origin],
            waves: 0,
            truncated: false,
        }
    }

    pub fn acting(&self) -> Player {
        self.acting
    }

    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn waves(&self) -> usize {
        self.waves
    }

    /// True if resolution was cut short by the wave cap.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Process the current wave. Returns `None` once the board is stable.
    pub fn step(&mut self, board: &mut Board, journal: &mut CellJournal) -> Option<Wave> {
        if self.pending.is_empty() {
            return None;
        }
        let current = std::mem::take(&mut self.pending);
        let mut changes: Vec<CellChange> = Vec::with_capacity(current.len());

        for pos in current {
            debug_assert!(board.contains(pos), "bump outside board at {pos}");
            journal.record(board, pos);
            let Some(exploded) = bump(board, pos, self.acting, &mut self.pending) else {
                continue;
            };
            let Some(cell) = board.get(pos) else { continue };
            match changes.iter_mut().find(|c| c.pos == pos) {
                Some(change) => {
                    change.value = cell.value;
                    change.owner = cell.owner;
                    change.exploded |= exploded;
                }
                None => changes.push(CellChange {
                    pos,
                    value: cell.value,
                    owner: cell.owner,
                    exploded,
                }),
            }
        }

        let wave = Wave {
            index: self.waves,
            changes,
        };
        self.waves += 1;
        self.check_termination(board);
        Some(wave)
    }

    /// Drive the reaction to quiescence, returning every wave.
    pub fn resolve(mut self, board: &mut Board, journal: &mut CellJournal) -> (Vec<Wave>, bool) {
        let mut waves = Vec::new();
        while let Some(wave) = self.step(board, journal) {
            waves.push(wave);
        }
        (waves, self.truncated)
    }

    fn check_termination(&mut self, board: &Board) {
        if self.pending.is_empty() {
            return;
        }
        if decided_runaway(board, self.acting, self.pending.len()) {
            self.pending.clear();
            return;
        }
        if self.waves >= MAX_WAVES {
            tracing::warn!(
                waves = self.waves,
                pending = self.pending.len(),
                player = %self.acting,
                "chain reaction hit wave cap"
            );
            self.pending.clear();
            self.truncated = true;
        }
    }
}

/// The chain can never settle and the mover already owns every cell.
///
/// Charge on the board plus queued bumps is conserved by explosions, so once it
/// exceeds the board's capacity no stable state exists. Chains that can settle
/// always run to a wave without explosions.
fn decided_runaway(board: &Board, acting: Player, queued: usize) -> bool {
    board.sole_owner() == Some(acting) && board.total_value() + queued as u64 > board.capacity()
}

/// Allocation-light resolution for search: journals every touched cell, no wave records.
/// Returns the number of waves processed.
pub fn resolve_quiet(board: &mut Board, origin: Pos, acting: Player, journal: &mut CellJournal) -> usize {
    let mut pending = vec![origin];
    let mut next = Vec::new();
    let mut waves = 0;
    while !pending.is_empty() && waves < MAX_WAVES {
        for &pos in &pending {
            journal.record(board, pos);
            bump(board, pos, acting, &mut next);
        }
        waves += 1;
        pending.clear();
        std::mem::swap(&mut pending, &mut next);
        if !pending.is_empty() && decided_runaway(board, acting, pending.len()) {
            break;
        }
    }
    waves
}
