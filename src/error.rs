use thiserror::Error;

use crate::types::Vec2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze template has no cells")]
    EmptyGrid,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell code {code} at ({x},{y})")]
    UnknownCell { code: u8, x: usize, y: usize },
    #[error("spawn ({},{}) is outside the maze", .0.x, .0.y)]
    SpawnOutOfBounds(Vec2),
    #[error("spawn ({},{}) is on a wall", .0.x, .0.y)]
    SpawnOnWall(Vec2),
    #[error("no level templates supplied")]
    NoTemplates,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
