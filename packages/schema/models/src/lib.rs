#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical vote record types and raw `GeoJSON` geometry tags.
//!
//! Every vote file, whatever its export tool or property naming, is
//! normalized into [`CanonicalRecord`]s. The raw property bag and
//! geometry are carried along untouched for consumers (map popups,
//! display labels) that need the original field names.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Latitude bound (inclusive) for WGS84 decimal degrees.
pub const MAX_LATITUDE: f64 = 90.0;

/// Longitude bound (inclusive) for WGS84 decimal degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// Record kind used for vote files.
pub const VOTES_KIND: &str = "votacao";

/// One of the fixed attribute names the normalizer produces regardless of
/// how the source file spells its properties.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CanonicalField {
    /// Feature identifier (`id`, `fid`, `OBJECTID`, ...).
    Id,
    /// Display name of the feature.
    Name,
    /// Municipality (`município`).
    Municipality,
    /// District (`distrito`).
    District,
    /// Neighborhood (`bairro`).
    Neighborhood,
    /// Street address (`endereço`).
    Address,
    /// Polling place (`local de votação`).
    PollingPlace,
    /// Number of votes.
    VoteCount,
    /// Latitude declared as a property.
    Latitude,
    /// Longitude declared as a property.
    Longitude,
}

impl CanonicalField {
    /// Every canonical field, in resolution order.
    pub const ALL: &[Self] = &[
        Self::Id,
        Self::Name,
        Self::Municipality,
        Self::District,
        Self::Neighborhood,
        Self::Address,
        Self::PollingPlace,
        Self::VoteCount,
        Self::Latitude,
        Self::Longitude,
    ];
}

/// `GeoJSON` geometry type tag, matched case-insensitively.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
pub enum GeometryKind {
    /// `Point`
    Point,
    /// `MultiPoint`
    MultiPoint,
    /// `LineString`
    LineString,
    /// `MultiLineString`
    MultiLineString,
    /// `Polygon`
    Polygon,
    /// `MultiPolygon`
    MultiPolygon,
    /// `GeometryCollection`
    GeometryCollection,
    /// Any other tag.
    Unknown,
}

impl GeometryKind {
    /// Parses a `GeoJSON` `type` value, ignoring case.
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "point" => Self::Point,
            "multipoint" => Self::MultiPoint,
            "linestring" => Self::LineString,
            "multilinestring" => Self::MultiLineString,
            "polygon" => Self::Polygon,
            "multipolygon" => Self::MultiPolygon,
            "geometrycollection" => Self::GeometryCollection,
            _ => Self::Unknown,
        }
    }

    /// Reads the `type` member of a geometry object.
    #[must_use]
    pub fn of(geometry: &serde_json::Value) -> Self {
        geometry
            .get("type")
            .and_then(serde_json::Value::as_str)
            .map_or(Self::Unknown, Self::from_type_name)
    }

    /// Collapses single and multi variants into a rendering family.
    #[must_use]
    pub const fn family(self) -> GeometryFamily {
        match self {
            Self::Point | Self::MultiPoint => GeometryFamily::Point,
            Self::LineString | Self::MultiLineString => GeometryFamily::Line,
            Self::Polygon | Self::MultiPolygon => GeometryFamily::Polygon,
            Self::GeometryCollection | Self::Unknown => GeometryFamily::Unknown,
        }
    }

    /// Whether this is a `Polygon` or `MultiPolygon`.
    #[must_use]
    pub const fn is_areal(self) -> bool {
        matches!(self, Self::Polygon | Self::MultiPolygon)
    }
}

/// Rendering family of a geometry, used to pick layer styles.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GeometryFamily {
    /// Points and multi-points.
    Point,
    /// Line strings.
    Line,
    /// Polygons and multi-polygons.
    Polygon,
    /// Collections or unrecognized tags.
    Unknown,
}

/// A validated WGS84 coordinate pair.
///
/// Construction goes through [`LatLon::new`], so a value of this type is
/// always within `[-90, 90]` x `[-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    lat: f64,
    lon: f64,
}

impl LatLon {
    /// Returns `None` unless both axes are finite and within WGS84 bounds.
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if lat.is_finite()
            && lon.is_finite()
            && (-MAX_LATITUDE..=MAX_LATITUDE).contains(&lat)
            && (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&lon)
        {
            Some(Self { lat, lon })
        } else {
            None
        }
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.lon
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Smallest box covering every `[lon, lat]` pair, or `None` when empty.
    #[must_use]
    pub fn from_lon_lat_pairs(pairs: &[[f64; 2]]) -> Option<Self> {
        let (first, rest) = pairs.split_first()?;
        let init = Self::new(first[0], first[1], first[0], first[1]);
        Some(rest.iter().fold(init, |b, [lon, lat]| Self {
            west: b.west.min(*lon),
            south: b.south.min(*lat),
            east: b.east.max(*lon),
            north: b.north.max(*lat),
        }))
    }

    /// Whether the point lies inside or on the edge of the box.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lon)
    }

    /// Largest absolute latitude inside the box.
    #[must_use]
    pub fn lat_magnitude(&self) -> f64 {
        self.south.abs().max(self.north.abs())
    }

    /// Largest absolute longitude inside the box.
    #[must_use]
    pub fn lon_magnitude(&self) -> f64 {
        self.west.abs().max(self.east.abs())
    }

    /// Midpoint as `(lat, lon)`.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// South-west and north-east corners as `[[lat, lon], [lat, lon]]`,
    /// the shape map viewers expect for fitting bounds.
    #[must_use]
    pub const fn corners(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }
}

/// Tuning for the coordinate repair engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Maximum number of divisions by ten applied per axis.
    #[serde(default = "default_max_divisions")]
    pub max_divisions: u32,
    /// Where the data is expected to lie. Lets the engine resolve swaps
    /// and scale errors that are still valid WGS84 but implausible.
    #[serde(default)]
    pub region: Option<BoundingBox>,
}

const fn default_max_divisions() -> u32 {
    12
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_divisions: default_max_divisions(),
            region: None,
        }
    }
}

/// The normalized view of one input feature.
///
/// Text fields are sanitized (never `"nan"`/`"none"`/`"null"`, empty when
/// absent). Coordinates are either a validated pair or absent, never
/// half-populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    /// Semantic source tag (e.g. `"votacao"`).
    pub kind: String,
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
    /// Polling place.
    pub polling_place: String,
    /// Vote count, always `>= 0`.
    pub vote_count: f64,
    /// Repaired and validated coordinates.
    pub coordinates: Option<LatLon>,
    /// Feature identifier.
    pub id: String,
    /// Whether `name` was overridden from a forced property.
    pub name_forced: bool,
    /// Original property bag.
    pub raw_properties: serde_json::Map<String, serde_json::Value>,
    /// Original geometry (`Null` when the feature had none).
    pub raw_geometry: serde_json::Value,
}

impl CanonicalRecord {
    /// Latitude, if the record has valid coordinates.
    #[must_use]
    pub fn lat(&self) -> Option<f64> {
        self.coordinates.map(|c| c.lat())
    }

    /// Longitude, if the record has valid coordinates.
    #[must_use]
    pub fn lon(&self) -> Option<f64> {
        self.coordinates.map(|c| c.lon())
    }
}
