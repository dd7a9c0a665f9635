//! Error types for the core crate
//!
//! Catalog errors abort initialization; snapshot errors are fatal for the
//! single load/save that raised them. Illegal placements are not errors and
//! never show up here.

use thiserror::Error;

/// Failure to build the piece catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("cannot read shape file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("shape {origin} has no filled cells")]
    EmptyShape { origin: String },

    #[error("shape {origin} is {width} columns wide (board is narrower)")]
    TooWide { origin: String, width: usize },

    #[error("shape {origin} is {height} rows tall (too tall for a rotation)")]
    TooTall { origin: String, height: usize },

    #[error("shape {origin}: line {line} has a different width")]
    RaggedShape { origin: String, line: usize },

    #[error("shape {origin}: line {line} contains {found:?}, expected '0' or '1'")]
    InvalidCell {
        origin: String,
        line: usize,
        found: char,
    },

    #[error("piece {piece} has no rotations")]
    NoRotations { piece: String },

    #[error("catalog contains no pieces")]
    Empty,
}

/// Failure to read or write a board/context snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot header missing")]
    MissingHeader,

    #[error("malformed snapshot header: {0:?}")]
    BadHeader(String),

    #[error("snapshot is {width}x{height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    #[error("snapshot has {found} rows, expected {expected}")]
    RowCount { found: usize, expected: usize },

    #[error("snapshot row {line} is {found} cells wide, expected {expected}")]
    RowWidth {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("snapshot row {line} contains {found:?}, expected '0' or '1'")]
    InvalidCell { line: usize, found: char },

    #[error("unknown piece {0:?} in context snapshot")]
    UnknownPiece(String),
}
