//! Undo bookkeeping: a first-touch journal of cell states and the bounded
//! per-session history of completed moves.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::engine::board::Board;
use crate::engine::models::{CellState, Player, Pos};

pub const UNDO_CAPACITY: usize = 10;

/// Records the state of every cell the first time it is touched, so that
/// rolling back restores the board exactly regardless of how many waves hit a cell.
#[derive(Debug, Clone, Default)]
pub struct CellJournal {
    seen: Vec<bool>,
    entries: Vec<(Pos, CellState)>,
}

impl CellJournal {
    pub fn for_board(board: &Board) -> Self {
        Self {
            seen: vec![false; board.len()],
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, board: &Board, pos: Pos) {
        let Some(cell) = board.get(pos) else { return };
        let idx = board.index(pos);
        if idx >= self.seen.len() {
            self.seen.resize(board.len(), false);
        }
        if !self.seen[idx] {
            self.seen[idx] = true;
            self.entries.push((pos, cell.state()));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(Pos, CellState)] {
        &self.entries
    }

    /// Restore every journaled cell and clear the journal for reuse.
    pub fn rollback(&mut self, board: &mut Board) {
        for (pos, state) in self.entries.drain(..).rev() {
            board.restore(pos, state);
            let idx = board.index(pos);
            if let Some(flag) = self.seen.get_mut(idx) {
                *flag = false;
            }
        }
    }

    pub fn into_entries(self) -> Vec<(Pos, CellState)> {
        self.entries
    }
}

/// Everything needed to invert one completed move, including its chain reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoRecord {
    pub mover: Player,
    pub origin: Pos,
    pub move_number: u32,
    /// Prior state of every touched cell.
    pub cells: Vec<(Pos, CellState)>,
}

impl UndoRecord {
    pub fn apply(&self, board: &mut Board) {
        for &(pos, state) in &self.cells {
            board.restore(pos, state);
        }
    }
}

/// Ring of the most recent completed moves; the oldest is dropped at capacity.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    records: VecDeque<UndoRecord>,
    capacity: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::with_capacity(UNDO_CAPACITY)
    }
}

impl UndoHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: UndoRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn last(&self) -> Option<&UndoRecord> {
        self.records.back()
    }

    pub fn pop(&mut self) -> Option<UndoRecord> {
        self.records.pop_back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: u32) -> UndoRecord {
        UndoRecord {
            mover: Player::Green,
            origin: Pos::new(0, 0),
            move_number: n,
            cells: vec![],
        }
    }

    #[test]
    fn test_history_drops_oldest_at_capacity() {
        let mut history = UndoHistory::default();
        for n in 1..=12 {
            history.push(record(n));
        }
        assert_eq!(history.len(), UNDO_CAPACITY);
        assert_eq!(history.pop().unwrap().move_number, 12);
        let mut oldest = 0;
        while let Some(r) = history.pop() {
            oldest = r.move_number;
        }
        assert_eq!(oldest, 3);
    }

    #[test]
    fn test_journal_keeps_first_touch_only() {
        let mut board = Board::new(2, 2).unwrap();
        let pos = Pos::new(0, 0);
        let mut journal = CellJournal::for_board(&board);
        journal.record(&board, pos);
        board.set_cell(pos, 2, Player::Red).unwrap();
        journal.record(&board, pos);
        assert_eq!(journal.len(), 1);
        assert_eq!(journal.entries()[0].1, CellState { value: 1, owner: Player::Unclaimed });

        journal.rollback(&mut board);
        assert_eq!(board.get(pos).unwrap().value, 1);
        assert!(journal.is_empty());

        // journal is reusable after rollback
        journal.record(&board, pos);
        assert_eq!(journal.len(), 1);
    }

    #[test]
    fn test_record_roundtrip_json() {
        let r = UndoRecord {
            mover: Player::Blue,
            origin: Pos::new(1, 2),
            move_number: 4,
            cells: vec![(Pos::new(1, 2), CellState { value: 3, owner: Player::Blue })],
        };
        let json = serde_json::to_string(&r).unwrap();
        let back: UndoRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
