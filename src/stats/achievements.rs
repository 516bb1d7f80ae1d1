//! Achievement catalog.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const FIRST_VICTORY: &str = "first_victory";
pub const TEN_WINS: &str = "ten_wins";
pub const FIFTY_WINS: &str = "fifty_wins";
pub const CENTURION: &str = "centurion";
pub const ON_FIRE: &str = "on_fire";
pub const UNSTOPPABLE: &str = "unstoppable";
pub const SPEED_DEMON: &str = "speed_demon";
pub const EXPERT_SLAYER: &str = "expert_slayer";
pub const MASTER_TACTICIAN: &str = "master_tactician";
pub const BIG_BOARD_MASTER: &str = "big_board_master";
pub const DEDICATED: &str = "dedicated";
pub const CONSISTENT: &str = "consistent";

fn entry(id: &'static str, name: &'static str, description: &'static str, icon: &'static str) -> Achievement {
    Achievement {
        id,
        name,
        description,
        icon,
    }
}

/// Every achievement in display order.
pub static ACHIEVEMENTS: Lazy<Vec<Achievement>> = Lazy::new(|| {
    vec![
        entry(FIRST_VICTORY, "First Victory", "Win your first game", "trophy"),
        entry(TEN_WINS, "Getting Good", "Win 10 games", "star.fill"),
        entry(FIFTY_WINS, "Veteran", "Win 50 games", "medal.fill"),
        entry(CENTURION, "Centurion", "Win 100 games", "crown.fill"),
        entry(ON_FIRE, "On Fire", "Win 5 games in a row", "flame.fill"),
        entry(UNSTOPPABLE, "Unstoppable", "Win 10 games in a row", "bolt.fill"),
        entry(SPEED_DEMON, "Speed Demon", "Win a game in under 30 seconds", "hare.fill"),
        entry(EXPERT_SLAYER, "Expert Slayer", "Beat the Expert AI", "brain"),
        entry(MASTER_TACTICIAN, "Master Tactician", "Beat Expert AI 10 times", "chess.king.fill"),
        entry(
            BIG_BOARD_MASTER,
            "Big Board Master",
            "Win on a 10x10 or larger board",
            "square.grid.3x3.fill",
        ),
        entry(DEDICATED, "Dedicated Player", "Play 100 games", "heart.fill"),
        entry(
            CONSISTENT,
            "Consistent Winner",
            "Maintain 75% win rate over 20 games",
            "chart.line.uptrend.xyaxis",
        ),
    ]
});

pub static ACHIEVEMENT_LOOKUP: Lazy<HashMap<&'static str, &'static Achievement>> =
    Lazy::new(|| ACHIEVEMENTS.iter().map(|a| (a.id, a)).collect());

pub fn achievement(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENT_LOOKUP.get(id).copied()
}
