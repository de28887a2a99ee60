//! Error types for the engine.
//!
//! Rejected moves and empty-history undos are ordinary outcomes and are
//! reported through return values, not through these types.

use std::io;

/// Invalid engine configuration. Initialization does not proceed.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("grid size must be at least 2, got {0}")]
    GridTooSmall(usize),
    #[error("grid size must be at most {max}, got {size}")]
    GridTooLarge { size: usize, max: usize },
    #[error("target tile must be a power of two >= 4, got {0}")]
    InvalidTarget(u32),
    #[error("undo depth must be at most {max}, got {depth}")]
    UndoDepthTooLarge { depth: usize, max: usize },
    #[error("io error reading config: {0}")]
    Io(#[from] io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A grid built from caller-supplied cells violated a grid invariant.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("grid size must be between 2 and {max}, got {size}")]
    Size { size: usize, max: usize },
    #[error("row {row} has {len} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("expected {expected} cells for the grid, got {actual}")]
    CellCount { expected: usize, actual: usize },
    #[error("cell {index} holds {value}, which is neither empty nor a power of two >= 2")]
    InvalidTile { index: usize, value: u32 },
}

/// Umbrella error for engine construction.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("grid is {actual}x{actual} but the configuration asks for {expected}x{expected}")]
    SizeMismatch { expected: usize, actual: usize },
}
