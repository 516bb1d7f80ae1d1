//! Arena CLI: run bot-vs-bot experiments from the command line.
//!
//! Usage:
//!   cargo run --release --bin arena -- --games 100 --p1 expert --p2 medium
//!   cargo run --release --bin arena -- --games 50 --p1 hard --p1-depth 2 --p1-branching 0 --p2 hard
//!   cargo run --release --bin arena -- --rows 8 --columns 8 --p1 easy --p2 easy --p3 medium

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use dicesplitter_engine::engine::arena::{run_arena, ArenaConfig};
use dicesplitter_engine::engine::bot_profiles::{load_default_profiles, load_profiles, BotProfile, BotProfilesFile};
use dicesplitter_engine::engine::bot_strategy::BotStrategy;
use dicesplitter_engine::engine::models::Difficulty;

#[derive(Parser)]
#[command(name = "arena", about = "Run bot-vs-bot arena experiments for DiceSplitter")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Board rows
    #[arg(long, default_value = "6")]
    rows: usize,

    /// Board columns
    #[arg(long, default_value = "6")]
    columns: usize,

    /// Turns after which a game is scored as a draw
    #[arg(long, default_value = "2000")]
    max_moves: u32,

    /// Alternate seat positions between games
    #[arg(long, default_value = "true")]
    alternate_seats: bool,

    /// Path to bot_profiles.toml
    #[arg(long, env = "DICESPLITTER_PROFILES")]
    profiles: Option<PathBuf>,

    // --- Player 1 ---
    /// P1 difficulty tier
    #[arg(long, default_value = "hard")]
    p1: Difficulty,

    /// P1 minimax depth override
    #[arg(long)]
    p1_depth: Option<usize>,

    /// P1 minimax branching cap override (0 = all)
    #[arg(long)]
    p1_branching: Option<usize>,

    /// P1 greedy fortify chance override
    #[arg(long)]
    p1_fortify: Option<f64>,

    // --- Player 2 ---
    /// P2 difficulty tier
    #[arg(long, default_value = "medium")]
    p2: Difficulty,

    /// P2 minimax depth override
    #[arg(long)]
    p2_depth: Option<usize>,

    /// P2 minimax branching cap override (0 = all)
    #[arg(long)]
    p2_branching: Option<usize>,

    /// P2 greedy fortify chance override
    #[arg(long)]
    p2_fortify: Option<f64>,

    // --- Optional extra seats ---
    /// P3 difficulty tier (enables a third seat)
    #[arg(long)]
    p3: Option<Difficulty>,

    /// P4 difficulty tier (requires --p3)
    #[arg(long, requires = "p3")]
    p4: Option<Difficulty>,
}

struct PlayerConfig {
    name: String,
    difficulty: Difficulty,
    profile: BotProfile,
}

fn build_player_config(
    label: &str,
    difficulty: Difficulty,
    depth: Option<usize>,
    branching: Option<usize>,
    fortify: Option<f64>,
    profiles: &BotProfilesFile,
) -> PlayerConfig {
    let mut profile = profiles.resolve(difficulty);

    // CLI overrides on top of profile
    if let Some(v) = depth { profile.search_depth = Some(v); }
    if let Some(v) = branching { profile.max_branching = Some(v); }
    if let Some(v) = fortify { profile.fortify_chance = Some(v); }

    PlayerConfig {
        name: format!("{}:{}", label, difficulty),
        difficulty,
        profile,
    }
}

fn print_config(config: &PlayerConfig) {
    let params = config.profile.to_minimax_params(config.difficulty);
    eprintln!(
        "  {}: strategy={:?}, depth={}, branching={}, node_budget={}, fortify={}",
        config.name,
        config.profile.strategy,
        params.depth,
        params.max_branching,
        params.node_budget,
        config.profile.fortify_chance.unwrap_or(0.0),
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load profiles
    let profiles = match &cli.profiles {
        Some(path) => load_profiles(path).unwrap_or_else(|e| {
            eprintln!("Error loading profiles: {}", e);
            std::process::exit(1);
        }),
        None => load_default_profiles(),
    };

    // Build player configs
    let mut configs = vec![
        build_player_config("p1", cli.p1, cli.p1_depth, cli.p1_branching, cli.p1_fortify, &profiles),
        build_player_config("p2", cli.p2, cli.p2_depth, cli.p2_branching, cli.p2_fortify, &profiles),
    ];
    if let Some(d) = cli.p3 {
        configs.push(build_player_config("p3", d, None, None, None, &profiles));
    }
    if let Some(d) = cli.p4 {
        configs.push(build_player_config("p4", d, None, None, None, &profiles));
    }

    // Print configuration
    eprintln!(
        "Arena: {} games on {}x{}, seed={}, alternate_seats={}",
        cli.games, cli.rows, cli.columns, cli.seed, cli.alternate_seats
    );
    for config in &configs {
        print_config(config);
    }
    eprintln!();

    // Build strategies
    let strategies: Vec<(String, Box<dyn BotStrategy>)> = configs
        .iter()
        .map(|c| (c.name.clone(), c.profile.build_strategy(c.difficulty)))
        .collect();

    let total = cli.games;
    let progress_cb = move |done: usize, _total: usize| {
        eprint!("\r  [{}/{}] games completed", done, total);
    };

    let arena_config = ArenaConfig {
        rows: cli.rows,
        columns: cli.columns,
        num_games: cli.games,
        base_seed: cli.seed,
        alternate_seats: cli.alternate_seats,
        max_moves: cli.max_moves,
    };
    let result = run_arena(&strategies, &arena_config, Some(&progress_cb))?;

    eprintln!("\r                                    "); // clear progress line
    println!("{}", result.summary());
    Ok(())
}
