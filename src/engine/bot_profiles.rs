//! Difficulty profiles: which strategy each tier plays and how long it "thinks".
//! Loaded from TOML at runtime for the CLI and arena; built-ins otherwise.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::engine::bot_strategy::{BotStrategy, GreedyStrategy, MinimaxStrategy, RandomStrategy};
use crate::engine::error::EngineError;
use crate::engine::minimax::MinimaxParams;
use crate::engine::models::Difficulty;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Random,
    Greedy,
    Minimax,
}

/// One tier's configuration. Unset fields fall back to the tier's built-in value.
#[derive(Debug, Deserialize, Clone)]
pub struct BotProfile {
    pub description: Option<String>,
    pub strategy: StrategyKind,
    pub thinking_ms: Option<u64>,
    pub search_depth: Option<usize>,
    /// Minimax candidates kept per ply (0 = all).
    pub max_branching: Option<usize>,
    /// Bound on `candidates^depth` before an uncapped search narrows (0 = none).
    pub node_budget: Option<usize>,
    /// Greedy fortify bias, 0.0..=1.0.
    pub fortify_chance: Option<f64>,
}

impl BotProfile {
    pub fn builtin(difficulty: Difficulty) -> Self {
        let strategy = match difficulty {
            Difficulty::Easy => StrategyKind::Random,
            Difficulty::Medium => StrategyKind::Greedy,
            Difficulty::Hard | Difficulty::Expert => StrategyKind::Minimax,
        };
        Self {
            description: None,
            strategy,
            thinking_ms: Some(difficulty.thinking_time().as_millis() as u64),
            search_depth: Some(difficulty.search_depth()),
            max_branching: None,
            node_budget: None,
            fortify_chance: None,
        }
    }

    pub fn thinking_time(&self, difficulty: Difficulty) -> Duration {
        self.thinking_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| difficulty.thinking_time())
    }

    pub fn to_minimax_params(&self, difficulty: Difficulty) -> MinimaxParams {
        let d = MinimaxParams::default();
        MinimaxParams {
            depth: self.search_depth.unwrap_or_else(|| difficulty.search_depth()).max(1),
            max_branching: self.max_branching.unwrap_or(d.max_branching),
            node_budget: self.node_budget.unwrap_or(d.node_budget),
        }
    }

    pub fn build_strategy(&self, difficulty: Difficulty) -> Box<dyn BotStrategy> {
        match self.strategy {
            StrategyKind::Random => Box::new(RandomStrategy),
            StrategyKind::Greedy => Box::new(GreedyStrategy::with_fortify(self.fortify_chance.unwrap_or(0.0))),
            StrategyKind::Minimax => Box::new(MinimaxStrategy::new(self.to_minimax_params(difficulty))),
        }
    }
}

/// Top-level TOML file structure: `[profiles.<tier>]` tables.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotProfilesFile {
    #[serde(default)]
    pub profiles: HashMap<String, BotProfile>,
}

impl BotProfilesFile {
    /// The profile for `difficulty`, or the built-in one if the file omits it.
    pub fn resolve(&self, difficulty: Difficulty) -> BotProfile {
        self.profiles
            .get(difficulty.as_str())
            .cloned()
            .unwrap_or_else(|| BotProfile::builtin(difficulty))
    }
}

/// Load profiles from a TOML file at the given path.
pub fn load_profiles(path: &Path) -> Result<BotProfilesFile, EngineError> {
    let content = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| EngineError::ProfileParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Try to load profiles from well-known paths, returning built-ins if none found.
pub fn load_default_profiles() -> BotProfilesFile {
    let candidates = ["bot_profiles.toml", "../bot_profiles.toml"];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_profiles(p) {
                Ok(profiles) => {
                    tracing::info!(path = %p.display(), count = profiles.profiles.len(), "loaded bot profiles");
                    return profiles;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load bot profiles");
                }
            }
        }
    }
    tracing::info!("no bot_profiles.toml found, using built-in defaults");
    BotProfilesFile::default()
}
