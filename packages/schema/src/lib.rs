#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `GeoJSON` normalization for vote files.
//!
//! Vote files are exported by different tools with different property
//! names, number formats and coordinate conventions. This crate turns any
//! of them into [`CanonicalRecord`]s:
//!
//! - [`sanitize`] parses text and locale-ambiguous numbers,
//! - [`aliases`] maps property spellings onto canonical fields,
//! - [`coords`] finds and repairs coordinate pairs,
//! - [`normalize`] ties them together per feature and per collection.
//!
//! Everything here is pure and synchronous; file access lives in
//! `localiza_layers`.

pub mod aliases;
pub mod coords;
pub mod normalize;
pub mod sanitize;

pub use aliases::AliasTable;
pub use localiza_schema_models::{CanonicalField, CanonicalRecord, LatLon, RepairConfig};
pub use normalize::{NormalizedCollection, Normalizer, normalize_collection, normalize_feature};

/// Errors raised while configuring the normalizer.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// TOML parsing failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// An alias table is structurally valid TOML but semantically wrong.
    #[error("Alias table error: {message}")]
    AliasTable {
        /// Description of what went wrong.
        message: String,
    },
}

/// Why a single feature was skipped.
///
/// Returned per feature by [`Normalizer::normalize_feature`]; the collection
/// normalizer records these instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    /// The feature is not a JSON object.
    #[error("feature #{index} is not an object")]
    FeatureNotObject {
        /// Position of the feature in its collection.
        index: usize,
    },

    /// `properties` is present but not an object.
    #[error("feature #{index} has non-object properties")]
    PropertiesNotObject {
        /// Position of the feature in its collection.
        index: usize,
    },

    /// `geometry` is present but not a usable geometry object.
    #[error("feature #{index} has malformed geometry: {message}")]
    MalformedGeometry {
        /// Position of the feature in its collection.
        index: usize,
        /// Description of what went wrong.
        message: String,
    },
}
