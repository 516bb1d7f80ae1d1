//! Engine error type. Only construction and I/O paths return errors;
//! gameplay commands are no-ops when illegal.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    #[error("invalid board dimensions {rows}x{columns}: both must be at least 1")]
    InvalidDimensions { rows: usize, columns: usize },

    #[error("invalid player count {0}: expected 2..=4")]
    InvalidPlayerCount(usize),

    #[error("position ({row}, {col}) is outside a {rows}x{columns} board")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        columns: usize,
    },

    #[error("cell value must be at least 1")]
    ZeroValue,

    #[error("value {value} at ({row}, {col}) exceeds the cell maximum {max}")]
    ValueTooLarge { row: usize, col: usize, value: u32, max: u32 },

    #[error("snapshot has {got} cells, expected {expected}")]
    SnapshotSize { expected: usize, got: usize },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse profiles {}: {source}", path.display())]
    ProfileParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid statistics json: {0}")]
    StatsJson(#[from] serde_json::Error),

    #[error("session driver has shut down")]
    DriverClosed,
}
