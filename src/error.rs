//! Error types for loading project data and building the reference index.
//!
//! Sparse table slots, unknown opcodes and the ambiguous equipment slot are
//! not errors and never surface here. Anything that does surface aborts the
//! whole build.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XrefError {
    /// A database or map file could not be read.
    #[error("failed to read {path:?}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A database or map file is not valid JSON for its table.
    #[error("failed to parse {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The per-map side-load failed.
    #[error("failed to load map {map_id:03}")]
    MapLoad {
        map_id: u32,
        #[source]
        source: Box<XrefError>,
    },

    /// An in-memory map source has no entry for the requested id.
    #[error("map {0:03} not found")]
    MapNotFound(u32),
}

impl XrefError {
    pub fn map_load(map_id: u32, source: XrefError) -> Self {
        XrefError::MapLoad {
            map_id,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, XrefError>;
