#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Vote table and aggregate result types.
//!
//! A [`VoteTable`] is the tabular form of a normalized vote file: one
//! [`VoteRow`] per polling place (or municipality) with the UI-facing
//! derived columns already computed. Filters, selections and aggregations
//! in `localiza_analytics` consume and produce these types.

use std::collections::BTreeSet;

use localiza_schema_models::LatLon;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One row of a vote table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRow {
    /// Feature identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Municipality.
    pub municipality: String,
    /// District.
    pub district: String,
    /// Neighborhood.
    pub neighborhood: String,
    /// Street address.
    pub address: String,
    /// Polling place, falling back to the name when the name was taken from
    /// the polling-place property.
    pub polling_place: String,
    /// District or neighborhood, depending on which the table populates.
    pub neighborhood_or_district: String,
    /// Municipality label as written in the source file.
    pub display_municipality: String,
    /// Polling-place label as written in the source file.
    pub display_polling_place: String,
    /// Vote count, always `>= 0`.
    pub vote_count: f64,
    /// Validated coordinates.
    pub coordinates: Option<LatLon>,
    /// Original property bag.
    pub raw_properties: serde_json::Map<String, serde_json::Value>,
    /// Original geometry.
    pub raw_geometry: serde_json::Value,
}

/// Which source column feeds [`VoteRow::neighborhood_or_district`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NeighborhoodSource {
    /// At least one row has a district.
    District,
    /// No row has a district.
    #[default]
    Neighborhood,
}

/// A normalized vote file in tabular form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTable {
    /// Rows in input order.
    pub rows: Vec<VoteRow>,
    /// Column used for [`VoteRow::neighborhood_or_district`].
    pub neighborhood_source: NeighborhoodSource,
}

impl VoteTable {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keeps the rows matching `predicate`, preserving order.
    #[must_use]
    pub fn retain_rows(&self, predicate: impl Fn(&VoteRow) -> bool) -> Self {
        Self {
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
            neighborhood_source: self.neighborhood_source,
        }
    }
}

/// Options for building a [`VoteTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOptions {
    /// Drop rows without coordinates (needed for map rendering).
    #[serde(default = "default_require_coordinates")]
    pub require_coordinates: bool,
}

const fn default_require_coordinates() -> bool {
    true
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            require_coordinates: default_require_coordinates(),
        }
    }
}

/// Attribute filter over a [`VoteTable`].
///
/// Empty sets and absent bounds place no constraint. Vote bounds are
/// inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteFilter {
    /// Accepted municipality labels.
    #[serde(default)]
    pub municipalities: BTreeSet<String>,
    /// Accepted polling-place labels.
    #[serde(default)]
    pub polling_places: BTreeSet<String>,
    /// Accepted neighborhood-or-district labels.
    #[serde(default)]
    pub neighborhoods: BTreeSet<String>,
    /// Minimum vote count.
    #[serde(default)]
    pub min_votes: Option<f64>,
    /// Maximum vote count.
    #[serde(default)]
    pub max_votes: Option<f64>,
}

impl VoteFilter {
    /// Whether the filter constrains anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.municipalities.is_empty()
            && self.polling_places.is_empty()
            && self.neighborhoods.is_empty()
            && self.min_votes.is_none()
            && self.max_votes.is_none()
    }
}

/// How polygon selections test containment.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContainmentMode {
    /// Exact point-in-polygon.
    #[default]
    Exact,
    /// Axis-aligned bounding box of the polygon.
    BoundingBox,
}

/// Column to group rows by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GroupKey {
    /// [`VoteRow::display_polling_place`], the label exports print.
    PollingPlace,
    /// [`VoteRow::neighborhood_or_district`].
    Neighborhood,
    /// [`VoteRow::display_municipality`].
    Municipality,
}

/// Votes summed for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotal {
    /// Group label.
    pub key: String,
    /// Sum of vote counts.
    pub votes: f64,
}

/// One bar of the votes-per-point histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    /// Bin label (`"0-10"`, `"11-30"`, ..., `"1000+"`).
    pub label: String,
    /// Number of rows in the bin.
    pub points: usize,
}

/// One step of a Pareto curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParetoPoint {
    /// 1-based rank of the place.
    pub rank: usize,
    /// Share of places up to this rank, in `[0, 1]`.
    pub place_share: f64,
    /// Share of votes up to this rank, in `[0, 1]`.
    pub vote_share: f64,
}

/// Cumulative vote share with places ranked by votes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParetoCurve {
    /// Curve points, one per place.
    pub points: Vec<ParetoPoint>,
    /// Number of places that together reach 80% of the votes.
    pub places_for_80_percent: Option<usize>,
}

/// What the rows of a vote file represent.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SummaryMode {
    /// One row per polling place.
    #[default]
    PollingPlace,
    /// One row per municipality.
    Municipality,
}

impl SummaryMode {
    /// Municipality files are named `votos_<id>_municipios.geojson`.
    #[must_use]
    pub fn for_votes_file(stem: &str) -> Self {
        if stem.to_lowercase().contains("municipios") {
            Self::Municipality
        } else {
            Self::PollingPlace
        }
    }

    /// Column the headline figures are grouped by.
    #[must_use]
    pub const fn group_key(self) -> GroupKey {
        match self {
            Self::PollingPlace => GroupKey::PollingPlace,
            Self::Municipality => GroupKey::Municipality,
        }
    }
}

/// Headline figures for a filtered table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// What the rows represent.
    pub mode: SummaryMode,
    /// Sum of vote counts.
    pub total_votes: f64,
    /// Number of rows.
    pub points: usize,
    /// Group with the most votes.
    pub top: Option<GroupTotal>,
}
