#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tabular analytics over normalized vote files.
//!
//! Builds a [`VoteTable`](localiza_analytics_models::VoteTable) from
//! normalized records, then filters it by attributes or by a drawn polygon,
//! aggregates it for charts and headline figures, and exports it as CSV.
//! Everything except [`export::export_csv`] is pure and in-memory.

pub mod aggregate;
pub mod bounds;
pub mod export;
pub mod filter;
pub mod selection;
pub mod table;

use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
