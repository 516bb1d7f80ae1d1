//! Terminal DiceSplitter.
//!
//! Commands on stdin: `<row> <col>` to bump a cell, `u` undo, `p` pause/resume,
//! `n` new game, `q` quit.

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

use dicesplitter_engine::engine::bot_profiles::{load_default_profiles, load_profiles};
use dicesplitter_engine::engine::driver::{self, DriverConfig, SessionHandle};
use dicesplitter_engine::engine::models::{Difficulty, GameEvent, Player, PlayerType, Pos, SessionConfig, TurnState};
use dicesplitter_engine::engine::session::{GameSession, SessionView};
use dicesplitter_engine::stats::StatsStore;

#[derive(Parser)]
#[command(name = "dicesplitter", about = "Play DiceSplitter in the terminal")]
struct Cli {
    /// Board rows
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(3..=20))]
    rows: u16,

    /// Board columns
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(3..=20))]
    columns: u16,

    /// Number of players (2-4)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(2..=4))]
    players: u8,

    /// Play against the computer (it takes the Red seat)
    #[arg(long)]
    ai: bool,

    /// AI difficulty: easy, medium, hard, expert
    #[arg(long, default_value = "medium")]
    difficulty: Difficulty,

    /// Seed for reproducible AI play
    #[arg(long)]
    seed: Option<u64>,

    /// Path to bot_profiles.toml (default: auto-discover)
    #[arg(long, env = "DICESPLITTER_PROFILES")]
    profiles: Option<PathBuf>,

    /// Statistics file; results are recorded when set
    #[arg(long, env = "DICESPLITTER_STATS")]
    stats: Option<PathBuf>,

    /// Per-wave animation delay in milliseconds
    #[arg(long, default_value_t = 250)]
    wave_delay_ms: u64,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        let player_type = if self.ai { PlayerType::Ai } else { PlayerType::Human };
        let mut config = SessionConfig::new(
            self.rows as usize,
            self.columns as usize,
            player_type,
            self.players as usize,
            self.difficulty,
        );
        config.seed = self.seed;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let profiles = match cli.profiles {
        Some(ref path) => load_profiles(path).map_err(|e| format!("Failed to load profiles: {}", e))?,
        None => load_default_profiles(),
    };
    let session = GameSession::with_profiles(cli.session_config(), profiles)?;
    let config = DriverConfig {
        wave_delay: std::time::Duration::from_millis(cli.wave_delay_ms),
        ..DriverConfig::default()
    };
    let (handle, mut events, task) = driver::spawn(session, config);

    let store = cli.stats.clone().map(StatsStore::new);
    let render_handle = handle.clone();
    let renderer = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                GameEvent::GameOver { outcome } => {
                    if let Ok(view) = render_handle.view().await {
                        println!("{}", render(&view));
                    }
                    match outcome.winner {
                        Some(p) => println!("Game over: {} wins in {} moves.", p, outcome.moves),
                        None => println!("Game over: draw after {} moves.", outcome.moves),
                    }
                    if let Some(store) = &store {
                        record_stats(store, &outcome);
                    }
                    println!("Type `n` for a new game or `q` to quit.");
                }
                GameEvent::TurnChanged { .. } | GameEvent::SessionReset { .. } => {
                    if let Ok(view) = render_handle.view().await {
                        if view.state != TurnState::Over {
                            println!("{}", render(&view));
                        }
                    }
                }
                GameEvent::AiThinkingStarted { player } => println!("{} is thinking...", player),
                GameEvent::MoveUndone { player, .. } => println!("Undid {}'s move.", player),
                _ => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "q" | "quit" => break,
            "u" | "undo" => {
                if !handle.undo().await? {
                    println!("Nothing to undo.");
                }
            }
            "p" | "pause" => toggle_pause(&handle).await?,
            "n" | "new" => handle.reset(cli.session_config()).await?,
            other => match parse_pos(other) {
                Some(pos) => {
                    if !handle.increment(pos).await? {
                        println!("Can't play {} right now.", pos);
                    }
                }
                None => println!("Unknown command `{}`. Use `<row> <col>`, u, p, n or q.", other),
            },
        }
    }

    handle.shutdown().await;
    let session = task.await?;
    renderer.await?;
    tracing::info!(moves = session.total_moves(), "bye");
    Ok(())
}

async fn toggle_pause(handle: &SessionHandle) -> Result<(), Box<dyn std::error::Error>> {
    let view = handle.view().await?;
    if view.state == TurnState::Paused {
        handle.resume().await?;
        println!("Resumed.");
        println!("{}", render(&handle.view().await?));
    } else if handle.pause().await? {
        println!("Paused. Type `p` to resume.");
    } else {
        println!("Can't pause now.");
    }
    Ok(())
}

fn record_stats(store: &StatsStore, outcome: &dicesplitter_engine::engine::models::GameOutcome) {
    let mut stats = match store.load() {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!(path = %store.path().display(), error = %e, "failed to load statistics");
            return;
        }
    };
    for a in stats.record_game_result(outcome, Player::Green) {
        println!("Achievement unlocked: {} ({})", a.name, a.description);
    }
    if let Err(e) = store.save(&stats) {
        tracing::warn!(path = %store.path().display(), error = %e, "failed to save statistics");
    }
}

fn parse_pos(input: &str) -> Option<Pos> {
    let mut parts = input.split(|c: char| c.is_whitespace() || c == ',').filter(|s| !s.is_empty());
    let row = parts.next()?.parse().ok()?;
    let col = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Pos::new(row, col))
}

fn render(view: &SessionView) -> String {
    let mut out = String::new();
    out.push_str("    ");
    for col in 0..view.board.columns {
        out.push_str(&format!("{:>3}", col));
    }
    out.push('\n');
    for row in 0..view.board.rows {
        out.push_str(&format!("{:>3} ", row));
        for col in 0..view.board.columns {
            let cell = view.board.cells[row * view.board.columns + col];
            out.push_str(&format!(" {}{}", cell.owner.glyph(), cell.value));
        }
        out.push('\n');
    }
    let scores: Vec<String> = view.scores.iter().map(|(p, s)| format!("{}={}", p, s)).collect();
    out.push_str(&format!(
        "Scores: {}  |  Moves: {}  |  Time: {}s\n",
        scores.join(" "),
        view.total_moves,
        view.elapsed.as_secs()
    ));
    if view.state == TurnState::WaitingForInput {
        out.push_str(&format!("{} to move", view.active_player));
    } else {
        out.push_str(&format!("{} ({:?})", view.active_player, view.state));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pos() {
        assert_eq!(parse_pos("2 3"), Some(Pos::new(2, 3)));
        assert_eq!(parse_pos("2,3"), Some(Pos::new(2, 3)));
        assert_eq!(parse_pos("2"), None);
        assert_eq!(parse_pos("a b"), None);
        assert_eq!(parse_pos("1 2 3"), None);
    }
}
