pub mod engine;
pub mod stats;
