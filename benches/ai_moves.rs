//! Criterion benchmarks for the AI move-selection hot paths.
//!
//! Run with:
//!     cargo bench --bench ai_moves

use criterion::{black_box, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::SeedableRng;

use dicesplitter_engine::engine::board::Board;
use dicesplitter_engine::engine::bot_strategy::{BotStrategy, GreedyStrategy, RandomStrategy};
use dicesplitter_engine::engine::chain::resolve_quiet;
use dicesplitter_engine::engine::history::CellJournal;
use dicesplitter_engine::engine::minimax::{minimax_search, MinimaxParams};
use dicesplitter_engine::engine::models::{Player, Pos};

struct Fixture {
    label: String,
    board: Board,
}

/// Mid-game positions reached by seeded random play.
fn build_fixtures() -> Vec<Fixture> {
    let mut fixtures = Vec::new();
    for &(size, moves) in &[(5usize, 12usize), (8, 40), (12, 90)] {
        let Ok(mut board) = Board::new(size, size) else { continue };
        let mut rng = StdRng::seed_from_u64(size as u64);
        let players = [Player::Green, Player::Red];
        for i in 0..moves {
            let me = players[i % 2];
            let Some(pos) = RandomStrategy.choose_move(&board, me, &mut rng) else { break };
            let mut journal = CellJournal::for_board(&board);
            resolve_quiet(&mut board, pos, me, &mut journal);
            if board.sole_owner().is_some() {
                break;
            }
        }
        fixtures.push(Fixture {
            label: format!("{}x{}_{}moves", size, size, moves),
            board,
        });
    }
    fixtures
}

fn bench_greedy(c: &mut Criterion) {
    let fixtures = build_fixtures();
    let mut group = c.benchmark_group("greedy_choose");
    for fixture in &fixtures {
        group.bench_with_input(BenchmarkId::new("medium", &fixture.label), &fixture.board, |b, board| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| GreedyStrategy::new().choose_move(black_box(board), Player::Red, &mut rng));
        });
    }
    group.finish();
}

fn bench_minimax(c: &mut Criterion) {
    let fixtures = build_fixtures();
    let mut group = c.benchmark_group("minimax_search");
    group.sample_size(10);
    for fixture in &fixtures {
        for (tier, depth) in [("hard", 3), ("expert", 4)] {
            let params = MinimaxParams {
                depth,
                ..MinimaxParams::default()
            };
            group.bench_with_input(BenchmarkId::new(tier, &fixture.label), &fixture.board, |b, board| {
                b.iter(|| minimax_search(black_box(board), Player::Red, &params));
            });
        }
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let fixtures = build_fixtures();
    let mut group = c.benchmark_group("resolve_and_rollback");
    for fixture in &fixtures {
        let moves = fixture.board.valid_moves(Player::Red);
        let Some(&pos) = moves.first() else { continue };
        group.bench_with_input(BenchmarkId::new("bump", &fixture.label), &pos, |b, &pos: &Pos| {
            let mut board = fixture.board.clone();
            let mut journal = CellJournal::for_board(&board);
            b.iter(|| {
                resolve_quiet(&mut board, pos, Player::Red, &mut journal);
                journal.rollback(&mut board);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_greedy, bench_minimax, bench_resolve);
criterion_main!(benches);
