//! End-to-end session scenarios through the public `GameSession` API.

use dicesplitter_engine::engine::board::{Board, BoardSnapshot};
use dicesplitter_engine::engine::history::UndoRecord;
use dicesplitter_engine::engine::models::*;
use dicesplitter_engine::engine::session::GameSession;

fn humans(rows: usize, columns: usize, players: usize) -> GameSession {
    GameSession::new(SessionConfig::new(rows, columns, PlayerType::Human, players, Difficulty::Easy)).unwrap()
}

#[test]
fn neighbor_counts_follow_edges() {
    for rows in 3..=7 {
        for columns in 3..=7 {
            let board = Board::new(rows, columns).unwrap();
            for pos in board.positions() {
                let mut expected = 4;
                if pos.row == 0 {
                    expected -= 1;
                }
                if pos.row == rows - 1 {
                    expected -= 1;
                }
                if pos.col == 0 {
                    expected -= 1;
                }
                if pos.col == columns - 1 {
                    expected -= 1;
                }
                assert_eq!(board.neighbor_count(pos), Some(expected), "{rows}x{columns} at {pos}");
                assert_eq!(board.neighbors(pos).count() as u32, expected);
            }
        }
    }
}

#[test]
fn tap_center_of_three_by_three() {
    let mut s = humans(3, 3, 2);
    let center = Pos::new(1, 1);
    assert!(s.increment(center));
    let cell = s.board().get(center).unwrap();
    assert_eq!(cell.value, 2);
    assert_eq!(cell.owner, Player::Green);
    assert_eq!(s.active_player(), Player::Red);
    assert_eq!(s.state(), TurnState::WaitingForInput);
    assert_eq!(s.total_moves(), 1);
}

#[test]
fn tied_overloaded_two_by_two_is_a_draw() {
    let mut s = humans(2, 2, 2);
    s.setup_cell(Pos::new(0, 0), 3, Player::Green).unwrap();
    s.setup_cell(Pos::new(0, 1), 3, Player::Green).unwrap();
    s.setup_cell(Pos::new(1, 0), 3, Player::Red).unwrap();
    s.setup_cell(Pos::new(1, 1), 3, Player::Red).unwrap();
    assert!(s.is_game_over());
    assert_eq!(s.winner(), None);
    assert!(!s.increment(Pos::new(0, 0)));
}

#[test]
fn score_counts_owned_cells() {
    let mut s = humans(3, 3, 2);
    for pos in [Pos::new(0, 0), Pos::new(0, 2), Pos::new(2, 0), Pos::new(1, 1)] {
        s.setup_cell(pos, 1, Player::Green).unwrap();
    }
    assert_eq!(s.score(Player::Green), 4);
    assert_eq!(s.score(Player::Red), 0);
}

#[test]
fn reset_rebuilds_board_and_players() {
    let mut s = humans(3, 3, 2);
    s.increment(Pos::new(0, 0));
    s.increment(Pos::new(2, 2));
    s.reset_with(4, 4, PlayerType::Ai, 3, Difficulty::Hard).unwrap();

    let board = s.board();
    assert_eq!((board.rows(), board.columns()), (4, 4));
    assert!(board.cells().all(|(_, c)| c.value == 1 && c.owner == Player::Unclaimed));
    assert_eq!(s.players().len(), 3);
    assert_eq!(s.active_player(), s.players()[0]);
    assert_eq!(s.state(), TurnState::WaitingForInput);
    assert_eq!(s.total_moves(), 0);
    assert!(!s.can_undo());
}

#[test]
fn explosion_bumps_exactly_the_neighbors() {
    let mut s = humans(3, 3, 2);
    s.setup_cell(Pos::new(0, 0), 2, Player::Green).unwrap();
    s.drain_events();
    assert!(s.increment(Pos::new(0, 0)));

    let waves: Vec<Vec<CellChange>> = s
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::WaveResolved { changes, .. } => Some(changes),
            _ => None,
        })
        .collect();
    assert_eq!(waves.len(), 2);
    assert_eq!(waves[0].len(), 1);
    assert!(waves[0][0].exploded);
    let mut touched: Vec<Pos> = waves[1].iter().map(|c| c.pos).collect();
    touched.sort();
    assert_eq!(touched, vec![Pos::new(0, 1), Pos::new(1, 0)]);

    let board = s.board();
    assert_eq!(board.get(Pos::new(0, 0)).unwrap().value, 1);
    assert_eq!(board.get(Pos::new(0, 0)).unwrap().owner, Player::Green);
    assert_eq!(board.get(Pos::new(0, 1)).unwrap().value, 2);
    assert_eq!(board.get(Pos::new(1, 0)).unwrap().owner, Player::Green);
    assert_eq!(board.get(Pos::new(1, 1)).unwrap().value, 1);
}

#[test]
fn undo_reverses_a_chain_reaction() {
    let mut s = humans(3, 3, 2);
    // Red primes a corner; Green's cascade will run through it.
    s.setup_cell(Pos::new(0, 0), 2, Player::Green).unwrap();
    s.setup_cell(Pos::new(0, 1), 3, Player::Red).unwrap();
    s.setup_cell(Pos::new(1, 0), 2, Player::Red).unwrap();
    let before = s.board_snapshot();

    assert!(s.increment(Pos::new(0, 0)));
    assert_ne!(s.board_snapshot(), before);
    assert_eq!(s.active_player(), Player::Red);

    assert!(s.undo());
    assert_eq!(s.board_snapshot(), before);
    assert_eq!(s.active_player(), Player::Green);
    assert_eq!(s.total_moves(), 0);
    assert!(!s.undo());
}

#[test]
fn undo_after_skip_returns_turn_to_the_mover() {
    let mut s = humans(2, 2, 3);
    s.setup_cell(Pos::new(0, 0), 1, Player::Green).unwrap();
    s.setup_cell(Pos::new(0, 1), 1, Player::Blue).unwrap();
    s.setup_cell(Pos::new(1, 0), 1, Player::Blue).unwrap();
    let before = s.board_snapshot();

    // Green takes the last free cell, leaving Red with nothing to tap.
    assert!(s.increment(Pos::new(1, 1)));
    assert!(!s.board().has_valid_moves(Player::Red));
    assert!(!s.is_game_over());
    assert_eq!(s.active_player(), Player::Blue);

    assert!(s.undo());
    assert_eq!(s.active_player(), Player::Green);
    assert_eq!(s.board_snapshot(), before);
    assert_eq!(s.state(), TurnState::WaitingForInput);
    assert_eq!(s.total_moves(), 0);
}

#[test]
fn undo_history_is_bounded() {
    let mut s = humans(5, 5, 2);
    let moves = [
        (0, 0),
        (4, 4),
        (0, 2),
        (4, 2),
        (2, 0),
        (2, 4),
        (1, 1),
        (3, 3),
        (1, 3),
        (3, 1),
        (2, 2),
        (0, 4),
    ];
    for (r, c) in moves {
        assert!(s.increment(Pos::new(r, c)), "move {r},{c}");
    }
    assert_eq!(s.history().len(), 10);
    let mut undone = 0;
    while s.undo() {
        undone += 1;
    }
    assert_eq!(undone, 10);
    assert_eq!(s.total_moves(), 2);
}

#[test]
fn undo_snapshot_roundtrips_through_json() {
    let mut s = humans(3, 3, 2);
    s.setup_cell(Pos::new(0, 0), 2, Player::Green).unwrap();
    s.setup_cell(Pos::new(0, 1), 3, Player::Green).unwrap();
    let before = s.board_snapshot();
    s.increment(Pos::new(0, 0));

    let record = s.history().last().unwrap().clone();
    let json = serde_json::to_string(&record).unwrap();
    let restored: UndoRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, record);

    let after_json = serde_json::to_string(&s.board_snapshot()).unwrap();
    let after: BoardSnapshot = serde_json::from_str(&after_json).unwrap();
    let mut board = Board::from_snapshot(&after).unwrap();
    restored.apply(&mut board);
    assert_eq!(serde_json::to_vec(&board.snapshot()).unwrap(), serde_json::to_vec(&before).unwrap());
}

#[test]
fn illegal_commands_are_noops() {
    let mut s = humans(3, 3, 2);
    s.increment(Pos::new(1, 1));
    let snapshot = s.board_snapshot();
    // Red cannot tap Green's cell; off-board is rejected too.
    assert!(!s.increment(Pos::new(1, 1)));
    assert!(!s.increment(Pos::new(9, 9)));
    assert_eq!(s.board_snapshot(), snapshot);
    assert_eq!(s.active_player(), Player::Red);
}

#[test]
fn full_ai_game_finishes_with_outcome() {
    let config = SessionConfig {
        rows: 4,
        columns: 4,
        seats: vec![PlayerKind::Ai, PlayerKind::Ai],
        difficulty: Difficulty::Medium,
        seed: Some(17),
    };
    let mut s = GameSession::new(config).unwrap();
    let mut turns = 0;
    while s.play_pending_ai() {
        turns += 1;
        assert!(turns < 5_000, "game did not finish");
    }
    assert!(s.is_game_over());
    let outcome = s.outcome().cloned().unwrap();
    assert_eq!(outcome.board_size, 16);
    assert_eq!(outcome.moves, s.total_moves());
    assert_eq!(outcome.winner, s.winner());

    let game_over_events = s
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::GameOver { .. }))
        .count();
    assert_eq!(game_over_events, 1);
}

#[test]
fn human_versus_ai_alternates() {
    let mut s = GameSession::new(
        SessionConfig::new(5, 5, PlayerType::Ai, 2, Difficulty::Hard).with_seed(3),
    )
    .unwrap();
    assert!(s.increment(Pos::new(2, 2)));
    assert_eq!(s.state(), TurnState::AiThinking);
    assert!(s.play_pending_ai());
    assert_eq!(s.active_player(), Player::Green);
    assert_eq!(s.score(Player::Red), 1);
    assert_eq!(s.total_moves(), 2);
}

#[test]
fn pause_freezes_play_and_elapsed_time_survives() {
    let mut s = humans(3, 3, 2);
    assert!(s.pause());
    assert!(!s.undo());
    assert!(!s.increment(Pos::new(0, 0)));
    let paused_at = s.elapsed_time();
    std::thread::sleep(std::time::Duration::from_millis(20));
    assert_eq!(s.elapsed_time(), paused_at);
    assert!(s.resume());
    assert!(s.increment(Pos::new(0, 0)));
}
