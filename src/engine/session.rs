//! GameSession: the one object the presentation layer talks to.
//!
//! Owns the board, turn scheduler, AI strategy and undo history. Commands are
//! no-ops when illegal; queries are cheap reads. Notifications accumulate in an
//! event queue drained by the caller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::engine::board::{Board, BoardSnapshot};
use crate::engine::bot_profiles::{BotProfile, BotProfilesFile};
use crate::engine::bot_strategy::BotStrategy;
use crate::engine::chain::ChainReaction;
use crate::engine::error::EngineError;
use crate::engine::history::{CellJournal, UndoHistory, UndoRecord};
use crate::engine::models::*;
use crate::engine::turns::{Advance, TurnScheduler};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Wall clock that excludes paused intervals and stops at game over.
#[derive(Debug, Clone)]
struct SessionClock {
    started: Instant,
    paused_at: Option<Instant>,
    paused_total: Duration,
    stopped_at: Option<Instant>,
}

impl SessionClock {
    fn start() -> Self {
        Self {
            started: Instant::now(),
            paused_at: None,
            paused_total: Duration::ZERO,
            stopped_at: None,
        }
    }

    fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Instant::now());
        }
    }

    fn resume(&mut self) {
        if let Some(at) = self.paused_at.take() {
            self.paused_total += at.elapsed();
        }
    }

    fn stop(&mut self) {
        self.resume();
        self.stopped_at.get_or_insert_with(Instant::now);
    }

    fn elapsed(&self) -> Duration {
        let end = self.stopped_at.or(self.paused_at).unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.started).saturating_sub(self.paused_total)
    }
}

/// Read-only picture of a session, for renderers and the async driver.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub generation: u64,
    pub board: BoardSnapshot,
    pub players: Vec<Player>,
    pub active_player: Player,
    pub state: TurnState,
    pub scores: Vec<(Player, usize)>,
    pub total_moves: u32,
    pub elapsed: Duration,
    pub game_over: bool,
    pub winner: Option<Player>,
    pub can_undo: bool,
}

pub struct GameSession {
    config: SessionConfig,
    profiles: BotProfilesFile,
    profile: BotProfile,
    strategy: Box<dyn BotStrategy>,
    rng: StdRng,
    generation: u64,
    board: Board,
    turns: TurnScheduler,
    history: UndoHistory,
    total_moves: u32,
    clock: SessionClock,
    pending_ai: Option<AiTicket>,
    outcome: Option<GameOutcome>,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Create a session with the built-in difficulty profiles.
    pub fn new(config: SessionConfig) -> Result<Self, EngineError> {
        Self::with_profiles(config, BotProfilesFile::default())
    }

    pub fn with_profiles(config: SessionConfig, profiles: BotProfilesFile) -> Result<Self, EngineError> {
        config.validate()?;
        let board = Board::new(config.rows, config.columns)?;
        let profile = profiles.resolve(config.difficulty);
        let strategy = profile.build_strategy(config.difficulty);
        let mut session = Self {
            rng: make_rng(config.seed),
            turns: TurnScheduler::new(&config.seats),
            config,
            profiles,
            profile,
            strategy,
            generation: next_generation(),
            board,
            history: UndoHistory::default(),
            total_moves: 0,
            clock: SessionClock::start(),
            pending_ai: None,
            outcome: None,
            events: Vec::new(),
        };
        tracing::info!(
            generation = session.generation,
            rows = session.config.rows,
            columns = session.config.columns,
            players = session.config.seats.len(),
            difficulty = %session.config.difficulty,
            strategy = session.strategy.name(),
            "session created"
        );
        session.start_first_turn();
        Ok(session)
    }

    /// Discard all state and start over with `config`. The previous generation's
    /// scheduled continuations become stale.
    pub fn reset(&mut self, config: SessionConfig) -> Result<(), EngineError> {
        config.validate()?;
        self.board = Board::new(config.rows, config.columns)?;
        self.turns = TurnScheduler::new(&config.seats);
        self.profile = self.profiles.resolve(config.difficulty);
        self.strategy = self.profile.build_strategy(config.difficulty);
        self.rng = make_rng(config.seed);
        self.config = config;
        self.generation = next_generation();
        self.history.clear();
        self.total_moves = 0;
        self.clock = SessionClock::start();
        self.pending_ai = None;
        self.outcome = None;
        self.events.clear();
        self.events.push(GameEvent::SessionReset {
            generation: self.generation,
            rows: self.config.rows,
            columns: self.config.columns,
        });
        tracing::info!(
            generation = self.generation,
            rows = self.config.rows,
            columns = self.config.columns,
            players = self.config.seats.len(),
            "session reset"
        );
        self.start_first_turn();
        Ok(())
    }

    /// Reset using the session-mode shorthand, keeping the current seed.
    pub fn reset_with(
        &mut self,
        rows: usize,
        columns: usize,
        player_type: PlayerType,
        number_of_players: usize,
        difficulty: Difficulty,
    ) -> Result<(), EngineError> {
        let mut config = SessionConfig::new(rows, columns, player_type, number_of_players, difficulty);
        config.seed = self.config.seed;
        self.reset(config)
    }

    fn start_first_turn(&mut self) {
        let first = self.turns.active_player();
        self.turns.set_state(self.turns.turn_start_state());
        self.events.push(GameEvent::TurnChanged { player: first });
        if self.turns.state() == TurnState::AiThinking {
            self.begin_ai_turn(first);
        }
    }

    // ------------------------------------------------------------------ //
    //  Commands
    // ------------------------------------------------------------------ //

    /// Tap a cell for the active player. Returns false (and changes nothing) if illegal.
    pub fn increment(&mut self, pos: Pos) -> bool {
        let player = self.turns.active_player();
        if !self.turns.is_valid_move(&self.board, pos, player) {
            tracing::debug!(%pos, %player, state = ?self.turns.state(), "move rejected");
            return false;
        }
        self.play_move(pos, player);
        true
    }

    /// Revert the most recent move. Only while waiting for a human, and never
    /// into an AI player's turn.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            tracing::debug!(state = ?self.turns.state(), "undo rejected");
            return false;
        }
        let Some(record) = self.history.pop() else {
            return false;
        };
        record.apply(&mut self.board);
        self.turns.set_active(record.mover);
        self.turns.set_state(TurnState::WaitingForInput);
        self.total_moves = self.total_moves.saturating_sub(1);
        tracing::debug!(player = %record.mover, cells = record.cells.len(), "move undone");
        self.events.push(GameEvent::MoveUndone {
            player: record.mover,
            cells: record.cells.len(),
        });
        self.events.push(GameEvent::TurnChanged { player: record.mover });
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.turns.state() != TurnState::WaitingForInput {
            return false;
        }
        self.turns.set_state(TurnState::Paused);
        self.clock.pause();
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.turns.state() != TurnState::Paused {
            return false;
        }
        self.turns.set_state(TurnState::WaitingForInput);
        self.clock.resume();
        true
    }

    /// Setup hook for puzzles and tests: overwrite one cell. Clears undo history
    /// and ends the game if the new position is terminal.
    pub fn setup_cell(&mut self, pos: Pos, value: u32, owner: Player) -> Result<(), EngineError> {
        self.board.set_cell(pos, value, owner)?;
        self.history.clear();
        if self.turns.state() != TurnState::Over && self.turns.is_game_over(&self.board) {
            self.finish();
        }
        Ok(())
    }

    // ------------------------------------------------------------------ //
    //  AI turns
    // ------------------------------------------------------------------ //

    /// The continuation the caller must schedule, if an AI is to move.
    pub fn pending_ai_turn(&self) -> Option<AiTicket> {
        self.pending_ai.filter(|_| self.turns.state() == TurnState::AiThinking)
    }

    /// Cosmetic delay before an AI move.
    pub fn thinking_time(&self) -> Duration {
        self.profile.thinking_time(self.config.difficulty)
    }

    /// Play the AI move for `ticket`. Stale tickets (other generation, other
    /// move, or no longer thinking) are ignored.
    pub fn run_ai_turn(&mut self, ticket: AiTicket) -> bool {
        if self.pending_ai != Some(ticket) || self.turns.state() != TurnState::AiThinking {
            tracing::debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "stale ai continuation ignored"
            );
            return false;
        }
        self.pending_ai = None;
        let player = ticket.player;
        let t0 = Instant::now();
        let choice = self.strategy.choose_move(&self.board, player, &mut self.rng);
        tracing::debug!(
            %player,
            strategy = self.strategy.name(),
            ?choice,
            elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
            "ai chose move"
        );
        self.events.push(GameEvent::AiThinkingStopped { player });

        match choice {
            Some(pos) if self.board.is_playable(pos, player) => self.play_move(pos, player),
            _ => {
                tracing::info!(%player, "ai has no move, passing");
                self.advance_turn();
            }
        }
        true
    }

    /// Run the pending AI turn immediately, skipping the thinking delay.
    pub fn play_pending_ai(&mut self) -> bool {
        match self.pending_ai_turn() {
            Some(ticket) => self.run_ai_turn(ticket),
            None => false,
        }
    }

    // ------------------------------------------------------------------ //
    //  Queries
    // ------------------------------------------------------------------ //

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    pub fn score(&self, player: Player) -> usize {
        self.board.score(player)
    }

    pub fn scores(&self) -> Vec<(Player, usize)> {
        self.turns.players().iter().map(|&p| (p, self.board.score(p))).collect()
    }

    pub fn players(&self) -> &[Player] {
        self.turns.players()
    }

    pub fn active_player(&self) -> Player {
        self.turns.active_player()
    }

    pub fn state(&self) -> TurnState {
        self.turns.state()
    }

    pub fn is_ai(&self, player: Player) -> bool {
        self.turns.is_ai(player)
    }

    pub fn is_valid_move(&self, pos: Pos) -> bool {
        self.turns.is_valid_move(&self.board, pos, self.turns.active_player())
    }

    pub fn is_game_over(&self) -> bool {
        self.turns.state() == TurnState::Over || self.turns.is_game_over(&self.board)
    }

    pub fn winner(&self) -> Option<Player> {
        if self.is_game_over() {
            self.turns.winner(&self.board)
        } else {
            None
        }
    }

    pub fn total_moves(&self) -> u32 {
        self.total_moves
    }

    pub fn elapsed_time(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.config.difficulty
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.turns.state() == TurnState::WaitingForInput
            && self.history.last().is_some_and(|r| !self.turns.is_ai(r.mover))
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            generation: self.generation,
            board: self.board.snapshot(),
            players: self.turns.players().to_vec(),
            active_player: self.turns.active_player(),
            state: self.turns.state(),
            scores: self.scores(),
            total_moves: self.total_moves,
            elapsed: self.elapsed_time(),
            game_over: self.is_game_over(),
            winner: self.winner(),
            can_undo: self.can_undo(),
        }
    }

    // ------------------------------------------------------------------ //
    //  Internals
    // ------------------------------------------------------------------ //

    fn play_move(&mut self, pos: Pos, player: Player) {
        self.turns.set_state(TurnState::ResolvingChainReaction);
        let mut journal = CellJournal::for_board(&self.board);
        let (waves, truncated) = ChainReaction::new(pos, player).resolve(&mut self.board, &mut journal);
        let wave_count = waves.len();
        for wave in waves {
            self.events.push(GameEvent::WaveResolved {
                generation: self.generation,
                wave: wave.index,
                changes: wave.changes,
            });
        }

        self.total_moves += 1;
        let touched = journal.len();
        self.history.push(UndoRecord {
            mover: player,
            origin: pos,
            move_number: self.total_moves,
            cells: journal.into_entries(),
        });
        tracing::debug!(
            %player,
            %pos,
            waves = wave_count,
            touched,
            truncated,
            move_number = self.total_moves,
            "move resolved"
        );
        self.advance_turn();
    }

    fn advance_turn(&mut self) {
        match self.turns.advance(&self.board) {
            Advance::Over => self.finish(),
            Advance::Next { player, ai } => {
                self.events.push(GameEvent::TurnChanged { player });
                if ai {
                    self.begin_ai_turn(player);
                }
            }
        }
    }

    fn begin_ai_turn(&mut self, player: Player) {
        let ticket = AiTicket {
            generation: self.generation,
            move_number: self.total_moves,
            player,
        };
        self.pending_ai = Some(ticket);
        self.events.push(GameEvent::AiThinkingStarted { player });
    }

    fn finish(&mut self) {
        self.turns.set_state(TurnState::Over);
        self.pending_ai = None;
        self.clock.stop();
        if self.outcome.is_some() {
            return;
        }
        let winner = self.turns.winner(&self.board);
        let outcome = GameOutcome {
            winner,
            player_type: self.config.player_type(),
            board_size: self.config.rows * self.config.columns,
            duration: self.clock.elapsed(),
            moves: self.total_moves,
            difficulty: self.config.difficulty,
        };
        tracing::info!(
            generation = self.generation,
            winner = ?winner,
            moves = self.total_moves,
            duration_ms = outcome.duration.as_millis() as u64,
            "game over"
        );
        self.outcome = Some(outcome.clone());
        self.events.push(GameEvent::GameOver { outcome });
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
