//! Rectangular dice grid with 4-connected adjacency.
//!
//! Cells are stored row-major. Each cell's neighbor count is computed once at
//! construction; a cell "explodes" when its value exceeds that count.

use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;
use crate::engine::models::{CellState, Player, Pos};

/// One board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub value: u32,
    pub owner: Player,
    neighbor_count: u8,
}

impl Cell {
    /// Highest value setup may place: one past the neighbor count, an overloaded cell.
    pub fn max_value(&self) -> u32 {
        self.neighbor_count() + 1
    }

    fn check_value(&self, pos: Pos, value: u32) -> Result<(), EngineError> {
        if value == 0 {
            return Err(EngineError::ZeroValue);
        }
        if value > self.max_value() {
            return Err(EngineError::ValueTooLarge {
                row: pos.row,
                col: pos.col,
                value,
                max: self.max_value(),
            });
        }
        Ok(())
    }

    fn new(neighbor_count: u8) -> Self {
        Self {
            value: 1,
            owner: Player::Unclaimed,
            neighbor_count,
        }
    }

    pub fn neighbor_count(&self) -> u32 {
        self.neighbor_count as u32
    }

    /// A cell whose value exceeds its neighbor count is mid-explosion and cannot be tapped.
    pub fn is_overloaded(&self) -> bool {
        self.value > self.neighbor_count()
    }

    /// Bumping this cell once would make it explode.
    pub fn would_explode(&self) -> bool {
        self.value + 1 > self.neighbor_count()
    }

    /// `player` may tap this cell: unclaimed or already theirs, and not overloaded.
    pub fn is_playable_by(&self, player: Player) -> bool {
        (self.owner == Player::Unclaimed || self.owner == player) && !self.is_overloaded()
    }

    pub fn state(&self) -> CellState {
        CellState {
            value: self.value,
            owner: self.owner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

/// Serializable board contents (neighbor counts are derived, not stored).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub rows: usize,
    pub columns: usize,
    /// Row-major cell states.
    pub cells: Vec<CellState>,
}

impl Board {
    pub fn new(rows: usize, columns: usize) -> Result<Self, EngineError> {
        if rows < 1 || columns < 1 {
            return Err(EngineError::InvalidDimensions { rows, columns });
        }
        let mut cells = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for col in 0..columns {
                cells.push(Cell::new(count_neighbors(rows, columns, row, col)));
            }
        }
        Ok(Self { rows, columns, cells })
    }

    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self, EngineError> {
        let mut board = Self::new(snapshot.rows, snapshot.columns)?;
        if snapshot.cells.len() != board.cells.len() {
            return Err(EngineError::SnapshotSize {
                expected: board.cells.len(),
                got: snapshot.cells.len(),
            });
        }
        let columns = board.columns;
        for (i, (cell, state)) in board.cells.iter_mut().zip(&snapshot.cells).enumerate() {
            cell.check_value(Pos::new(i / columns, i % columns), state.value)?;
            cell.value = state.value;
            cell.owner = state.owner;
        }
        Ok(board)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            rows: self.rows,
            columns: self.columns,
            cells: self.cells.iter().map(Cell::state).collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.columns
    }

    /// Row-major index, used by per-cell bitsets.
    pub fn index(&self, pos: Pos) -> usize {
        pos.row * self.columns + pos.col
    }

    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        if self.contains(pos) {
            self.cells.get(self.index(pos))
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        if self.contains(pos) {
            let idx = self.index(pos);
            self.cells.get_mut(idx)
        } else {
            None
        }
    }

    /// Overwrite a cell's value and owner. Used for setup and for undo restoration.
    pub fn set_cell(&mut self, pos: Pos, value: u32, owner: Player) -> Result<(), EngineError> {
        let (rows, columns) = (self.rows, self.columns);
        let cell = self.get_mut(pos).ok_or(EngineError::OutOfBounds {
            row: pos.row,
            col: pos.col,
            rows,
            columns,
        })?;
        cell.check_value(pos, value)?;
        cell.value = value;
        cell.owner = owner;
        Ok(())
    }

    /// Restore a previously captured state. Out-of-range positions are ignored.
    pub(crate) fn restore(&mut self, pos: Pos, state: CellState) {
        if let Some(cell) = self.get_mut(pos) {
            cell.value = state.value;
            cell.owner = state.owner;
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        let columns = self.columns;
        (0..self.cells.len()).map(move |i| Pos::new(i / columns, i % columns))
    }

    pub fn cells(&self) -> impl Iterator<Item = (Pos, &Cell)> + '_ {
        self.positions().zip(self.cells.iter())
    }

    /// In-bounds 4-connected neighbors in the order left, right, up, down.
    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> {
        let Pos { row, col } = pos;
        [
            (col > 0).then(|| Pos::new(row, col - 1)),
            (col + 1 < self.columns).then(|| Pos::new(row, col + 1)),
            (row > 0).then(|| Pos::new(row - 1, col)),
            (row + 1 < self.rows).then(|| Pos::new(row + 1, col)),
        ]
        .into_iter()
        .flatten()
    }

    pub fn neighbor_count(&self, pos: Pos) -> Option<u32> {
        self.get(pos).map(Cell::neighbor_count)
    }

    pub fn is_corner(&self, pos: Pos) -> bool {
        (pos.row == 0 || pos.row + 1 == self.rows) && (pos.col == 0 || pos.col + 1 == self.columns)
    }

    pub fn score(&self, player: Player) -> usize {
        self.cells.iter().filter(|c| c.owner == player).count()
    }

    pub fn is_playable(&self, pos: Pos, player: Player) -> bool {
        self.get(pos).is_some_and(|c| c.is_playable_by(player))
    }

    pub fn has_valid_moves(&self, player: Player) -> bool {
        self.cells.iter().any(|c| c.is_playable_by(player))
    }

    pub fn valid_moves(&self, player: Player) -> Vec<Pos> {
        self.cells()
            .filter(|(_, c)| c.is_playable_by(player))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Sum of all cell values. Explosions conserve it; each tap adds one.
    pub fn total_value(&self) -> u64 {
        self.cells.iter().map(|c| c.value as u64).sum()
    }

    /// Largest total a board with no overloaded cell can hold.
    pub fn capacity(&self) -> u64 {
        self.cells.iter().map(|c| c.neighbor_count as u64).sum()
    }

    /// The player owning every cell, if there is one.
    pub fn sole_owner(&self) -> Option<Player> {
        let first = self.cells.first()?.owner;
        if first.is_claimed() && self.cells.iter().all(|c| c.owner == first) {
            Some(first)
        } else {
            None
        }
    }
}

fn count_neighbors(rows: usize, columns: usize, row: usize, col: usize) -> u8 {
    let mut n = 0;
    if col > 0 {
        n += 1;
    }
    if col + 1 < columns {
        n += 1;
    }
    if row > 0 {
        n += 1;
    }
    if row + 1 < rows {
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(Board::new(0, 3).is_err());
        assert!(Board::new(3, 0).is_err());
        assert!(Board::new(1, 1).is_ok());
    }

    #[test]
    fn test_neighbor_counts_match_edges() {
        for (rows, columns) in [(3, 3), (3, 7), (5, 4), (20, 20)] {
            let board = Board::new(rows, columns).unwrap();
            for (pos, cell) in board.cells() {
                let mut expected = 4;
                if pos.row == 0 { expected -= 1; }
                if pos.row == rows - 1 { expected -= 1; }
                if pos.col == 0 { expected -= 1; }
                if pos.col == columns - 1 { expected -= 1; }
                assert_eq!(cell.neighbor_count(), expected, "{rows}x{columns} at {pos}");
                assert_eq!(board.neighbors(pos).count() as u32, expected);
            }
        }
    }

    #[test]
    fn test_corner_edge_interior_counts() {
        let board = Board::new(3, 3).unwrap();
        assert_eq!(board.neighbor_count(Pos::new(0, 0)), Some(2));
        assert_eq!(board.neighbor_count(Pos::new(0, 1)), Some(3));
        assert_eq!(board.neighbor_count(Pos::new(1, 1)), Some(4));
        assert_eq!(board.neighbor_count(Pos::new(3, 3)), None);
    }

    #[test]
    fn test_neighbor_order_left_right_up_down() {
        let board = Board::new(3, 3).unwrap();
        let n: Vec<Pos> = board.neighbors(Pos::new(1, 1)).collect();
        assert_eq!(n, vec![Pos::new(1, 0), Pos::new(1, 2), Pos::new(0, 1), Pos::new(2, 1)]);

        let n: Vec<Pos> = board.neighbors(Pos::new(0, 0)).collect();
        assert_eq!(n, vec![Pos::new(0, 1), Pos::new(1, 0)]);
    }

    #[test]
    fn test_fresh_board_all_unclaimed_value_one() {
        let board = Board::new(4, 5).unwrap();
        assert_eq!(board.len(), 20);
        assert!(board.cells().all(|(_, c)| c.value == 1 && c.owner == Player::Unclaimed));
        assert_eq!(board.sole_owner(), None);
    }

    #[test]
    fn test_score_counts_owned_cells() {
        let mut board = Board::new(3, 3).unwrap();
        for pos in [Pos::new(0, 0), Pos::new(0, 1), Pos::new(2, 2), Pos::new(1, 1)] {
            board.set_cell(pos, 1, Player::Green).unwrap();
        }
        assert_eq!(board.score(Player::Green), 4);
        assert_eq!(board.score(Player::Red), 0);
    }

    #[test]
    fn test_playability_rules() {
        let mut board = Board::new(2, 2).unwrap();
        board.set_cell(Pos::new(0, 0), 2, Player::Green).unwrap();
        board.set_cell(Pos::new(0, 1), 3, Player::Green).unwrap();
        assert!(board.is_playable(Pos::new(0, 0), Player::Green));
        assert!(!board.is_playable(Pos::new(0, 0), Player::Red));
        // overloaded cell cannot be tapped even by its owner
        assert!(!board.is_playable(Pos::new(0, 1), Player::Green));
        assert!(board.is_playable(Pos::new(1, 1), Player::Red));
        assert!(!board.is_playable(Pos::new(5, 5), Player::Red));
    }

    #[test]
    fn test_set_cell_validation() {
        let mut board = Board::new(2, 2).unwrap();
        assert!(matches!(board.set_cell(Pos::new(0, 0), 0, Player::Green), Err(EngineError::ZeroValue)));
        assert!(matches!(
            board.set_cell(Pos::new(2, 0), 1, Player::Green),
            Err(EngineError::OutOfBounds { row: 2, .. })
        ));
        // a corner holds at most 3; a further neighbor bump would then explode it
        board.set_cell(Pos::new(0, 0), 3, Player::Green).unwrap();
        assert!(matches!(
            board.set_cell(Pos::new(0, 0), u32::MAX, Player::Green),
            Err(EngineError::ValueTooLarge { value: u32::MAX, max: 3, .. })
        ));
        assert_eq!(board.get(Pos::new(0, 0)).unwrap().value, 3);
    }

    #[test]
    fn test_snapshot_rejects_oversized_value() {
        let mut snap = Board::new(1, 3).unwrap().snapshot();
        snap.cells[1].value = 4;
        assert!(matches!(
            Board::from_snapshot(&snap),
            Err(EngineError::ValueTooLarge { row: 0, col: 1, max: 3, .. })
        ));
        snap.cells[1].value = 3;
        assert!(Board::from_snapshot(&snap).is_ok());
    }

    #[test]
    fn test_snapshot_restores_exactly() {
        let mut board = Board::new(3, 4).unwrap();
        board.set_cell(Pos::new(1, 2), 3, Player::Blue).unwrap();
        let snap = board.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: BoardSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(Board::from_snapshot(&back).unwrap(), board);
    }

    #[test]
    fn test_snapshot_size_mismatch() {
        let snap = BoardSnapshot { rows: 2, columns: 2, cells: vec![] };
        assert!(matches!(Board::from_snapshot(&snap), Err(EngineError::SnapshotSize { expected: 4, got: 0 })));
    }

    #[test]
    fn test_sole_owner() {
        let mut board = Board::new(2, 2).unwrap();
        for pos in board.positions().collect::<Vec<_>>() {
            board.set_cell(pos, 1, Player::Yellow).unwrap();
        }
        assert_eq!(board.sole_owner(), Some(Player::Yellow));
        board.set_cell(Pos::new(1, 1), 1, Player::Unclaimed).unwrap();
        assert_eq!(board.sole_owner(), None);
    }

    #[test]
    fn test_corners() {
        let board = Board::new(3, 4).unwrap();
        assert!(board.is_corner(Pos::new(0, 0)));
        assert!(board.is_corner(Pos::new(2, 3)));
        assert!(!board.is_corner(Pos::new(0, 1)));
    }
}
