//! Turn order, move legality and end-of-game detection.

use crate::engine::board::Board;
use crate::engine::models::{Player, PlayerKind, Pos, TurnState};

/// Result of handing the turn on after a move settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Next mover found; `ai` tells whether the engine must play for them.
    Next { player: Player, ai: bool },
    Over,
}

#[derive(Debug, Clone)]
pub struct TurnScheduler {
    players: Vec<Player>,
    kinds: Vec<PlayerKind>,
    active: usize,
    state: TurnState,
}

impl TurnScheduler {
    /// Seats are assigned from `Player::SEATS` in order; the first seat moves first.
    pub fn new(kinds: &[PlayerKind]) -> Self {
        let players = Player::SEATS.iter().copied().take(kinds.len()).collect();
        Self {
            players,
            kinds: kinds.to_vec(),
            active: 0,
            state: TurnState::WaitingForInput,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn active_player(&self) -> Player {
        self.players[self.active]
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: TurnState) {
        self.state = state;
    }

    pub fn kind_of(&self, player: Player) -> Option<PlayerKind> {
        self.seat_of(player).map(|i| self.kinds[i])
    }

    pub fn is_ai(&self, player: Player) -> bool {
        self.kind_of(player) == Some(PlayerKind::Ai)
    }

    fn seat_of(&self, player: Player) -> Option<usize> {
        self.players.iter().position(|&p| p == player)
    }

    /// Make `player` the mover again (undo). Ignored for non-participants.
    pub(crate) fn set_active(&mut self, player: Player) {
        if let Some(i) = self.seat_of(player) {
            self.active = i;
        }
    }

    /// The state a fresh turn for the active player starts in.
    pub(crate) fn turn_start_state(&self) -> TurnState {
        if self.is_ai(self.active_player()) {
            TurnState::AiThinking
        } else {
            TurnState::WaitingForInput
        }
    }

    pub fn is_valid_move(&self, board: &Board, pos: Pos, player: Player) -> bool {
        self.state == TurnState::WaitingForInput && board.is_playable(pos, player)
    }

    pub fn has_valid_moves(&self, board: &Board, player: Player) -> bool {
        board.has_valid_moves(player)
    }

    /// Hand the turn to the next player in seat order who can move, starting
    /// just after the current mover. The current mover is considered last.
    pub fn advance(&mut self, board: &Board) -> Advance {
        if board.sole_owner().is_some() {
            self.state = TurnState::Over;
            return Advance::Over;
        }
        let n = self.players.len();
        for offset in 1..=n {
            let idx = (self.active + offset) % n;
            let player = self.players[idx];
            if board.has_valid_moves(player) {
                if offset > 1 {
                    tracing::debug!(%player, skipped = offset - 1, "skipped players without moves");
                }
                self.active = idx;
                let ai = self.kinds[idx] == PlayerKind::Ai;
                self.state = if ai {
                    TurnState::AiThinking
                } else {
                    TurnState::WaitingForInput
                };
                return Advance::Next { player, ai };
            }
        }
        self.state = TurnState::Over;
        Advance::Over
    }

    pub fn is_game_over(&self, board: &Board) -> bool {
        board.sole_owner().is_some() || !self.players.iter().any(|&p| board.has_valid_moves(p))
    }

    /// Defined only once the game is over. `None` on a tie for the top score.
    pub fn winner(&self, board: &Board) -> Option<Player> {
        if !self.is_game_over(board) {
            return None;
        }
        if let Some(owner) = board.sole_owner() {
            return Some(owner);
        }
        let scores: Vec<(Player, usize)> = self.players.iter().map(|&p| (p, board.score(p))).collect();
        let max = scores.iter().map(|&(_, s)| s).max()?;
        let mut top = scores.iter().filter(|&&(_, s)| s == max);
        match (top.next(), top.next()) {
            (Some(&(player, _)), None) => Some(player),
            _ => None,
        }
    }
}
