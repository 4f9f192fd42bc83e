#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! File-system side of the dashboard.
//!
//! Reads `GeoJSON` files, discovers map layers and candidate folders, and
//! resolves layer styles. The normalization core never touches the disk;
//! everything it consumes is loaded here first.

pub mod candidates;
pub mod discover;
pub mod geojson_io;
pub mod styles;

pub use candidates::{Candidate, discover_candidates};
pub use discover::{LayerInfo, base_identifier, discover_layers, layer_matches_base};
pub use geojson_io::{read_geojson, try_read_geojson};
pub use styles::LayerStyles;

/// Errors from layer and candidate discovery.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    /// I/O error reading a directory or file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A file is not valid JSON.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// Path to the file.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A candidate manifest is not valid TOML.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Directory does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The missing directory.
        path: String,
    },
}
