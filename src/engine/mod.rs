pub mod models;
pub mod error;
pub mod board;
pub mod chain;
pub mod history;
pub mod turns;
pub mod evaluator;
pub mod minimax;
pub mod bot_strategy;
pub mod bot_profiles;
pub mod session;
pub mod driver;
pub mod arena;
