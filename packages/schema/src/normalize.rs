//! Feature and collection normalization.

use localiza_schema_models::{CanonicalField, CanonicalRecord, RepairConfig};
use serde_json::{Map, Value};

use crate::NormalizationError;
use crate::aliases::{self, AliasTable};
use crate::coords::resolve_coordinates;
use crate::sanitize::{parse_count, sanitize_text};

/// Raw property injected with the normalized count when a file spells its
/// vote column differently, so popups can rely on one key.
const RAW_VOTES_KEY: &str = "QT_VOTOS";

/// Output of [`Normalizer::normalize_collection`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedCollection {
    /// One record per well-formed feature, in input order.
    pub records: Vec<CanonicalRecord>,
    /// Features that were skipped, in input order.
    pub skipped: Vec<NormalizationError>,
}

impl NormalizedCollection {
    /// Records with valid coordinates, i.e. the ones a map can place.
    pub fn mappable(&self) -> impl Iterator<Item = &CanonicalRecord> {
        self.records.iter().filter(|r| r.coordinates.is_some())
    }

    /// Number of records produced.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Turns raw `GeoJSON` features into [`CanonicalRecord`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    aliases: AliasTable,
    repair: RepairConfig,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(AliasTable::builtin().clone(), RepairConfig::default())
    }
}

impl Normalizer {
    /// Creates a normalizer resolving properties with `aliases` and
    /// repairing coordinates with `repair`.
    #[must_use]
    pub const fn new(aliases: AliasTable, repair: RepairConfig) -> Self {
        Self { aliases, repair }
    }

    /// Alias table in use.
    #[must_use]
    pub const fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Normalizes one feature.
    ///
    /// `index` is only used to label errors. When `force_name_field` is
    /// given and that exact property holds non-empty text, it replaces the
    /// alias-resolved name.
    ///
    /// # Errors
    ///
    /// Returns a [`NormalizationError`] if the feature is not an object, or
    /// its `properties` or `geometry` member has the wrong shape. Missing
    /// or `null` members are treated as empty.
    pub fn normalize_feature(
        &self,
        feature: &Value,
        index: usize,
        kind: &str,
        force_name_field: Option<&str>,
    ) -> Result<CanonicalRecord, NormalizationError> {
        let Some(feature) = feature.as_object() else {
            return Err(NormalizationError::FeatureNotObject { index });
        };

        let mut properties = match feature.get("properties") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(props)) => props.clone(),
            Some(_) => return Err(NormalizationError::PropertiesNotObject { index }),
        };
        let geometry = feature.get("geometry").cloned().unwrap_or(Value::Null);
        check_geometry(&geometry, index)?;

        let text = |field| sanitize_text(self.aliases.pick(&properties, field));

        let mut name = text(CanonicalField::Name);
        let municipality = text(CanonicalField::Municipality);
        let district = text(CanonicalField::District);
        let neighborhood = text(CanonicalField::Neighborhood);
        let address = text(CanonicalField::Address);
        let polling_place = text(CanonicalField::PollingPlace);
        let id = text(CanonicalField::Id);

        let raw_votes = self.aliases.pick(&properties, CanonicalField::VoteCount);
        let vote_count = parse_count(raw_votes);
        let has_votes = raw_votes.is_some_and(|v| !v.is_null());

        let mut name_forced = false;
        if let Some(field) = force_name_field {
            let forced = sanitize_text(aliases::pick(&properties, &[field]));
            if !forced.is_empty() {
                name = forced;
                name_forced = true;
            }
        }

        let coordinates = resolve_coordinates(&properties, &geometry, &self.aliases, &self.repair);

        if has_votes && !properties.contains_key(RAW_VOTES_KEY) {
            properties.insert(RAW_VOTES_KEY.to_string(), Value::from(vote_count));
        }

        Ok(CanonicalRecord {
            kind: sanitize_text(Some(&Value::from(kind))),
            name,
            municipality,
            district,
            neighborhood,
            address,
            polling_place,
            vote_count,
            coordinates,
            id,
            name_forced,
            raw_properties: properties,
            raw_geometry: geometry,
        })
    }

    /// Normalizes every feature of a `FeatureCollection`, skipping the
    /// malformed ones.
    ///
    /// A collection without a `features` array yields an empty result.
    #[must_use]
    pub fn normalize_collection(
        &self,
        collection: &Value,
        kind: &str,
        force_name_field: Option<&str>,
    ) -> NormalizedCollection {
        let features = match collection.get("features") {
            Some(Value::Array(features)) => features.as_slice(),
            None | Some(Value::Null) => &[],
            Some(_) => {
                log::warn!("Ignoring {kind} collection: `features` is not an array");
                &[]
            }
        };

        let mut out = NormalizedCollection::default();
        for (index, feature) in features.iter().enumerate() {
            match self.normalize_feature(feature, index, kind, force_name_field) {
                Ok(record) => out.records.push(record),
                Err(e) => {
                    log::debug!("Skipping feature: {e}");
                    out.skipped.push(e);
                }
            }
        }

        log::info!(
            "Normalized {} {kind} features ({} skipped, {} without coordinates)",
            out.records.len(),
            out.skipped.len(),
            out.records.len() - out.mappable().count(),
        );
        out
    }
}

fn check_geometry(geometry: &Value, index: usize) -> Result<(), NormalizationError> {
    let malformed = |message: &str| NormalizationError::MalformedGeometry {
        index,
        message: message.to_string(),
    };

    let Value::Object(geometry) = geometry else {
        return if geometry.is_null() {
            Ok(())
        } else {
            Err(malformed("geometry is not an object"))
        };
    };

    if let Some(tag) = geometry.get("type")
        && !tag.is_string()
    {
        return Err(malformed("`type` is not a string"));
    }
    match geometry.get("coordinates") {
        None | Some(Value::Null | Value::Array(_)) => Ok(()),
        Some(_) => Err(malformed("`coordinates` is not an array")),
    }
}

/// Normalizes one feature with the built-in aliases and default repair
/// settings.
///
/// # Errors
///
/// See [`Normalizer::normalize_feature`].
pub fn normalize_feature(
    feature: &Value,
    kind: &str,
    force_name_field: Option<&str>,
) -> Result<CanonicalRecord, NormalizationError> {
    Normalizer::default().normalize_feature(feature, 0, kind, force_name_field)
}

/// Normalizes a collection with the built-in aliases and default repair
/// settings.
#[must_use]
pub fn normalize_collection(
    collection: &Value,
    kind: &str,
    force_name_field: Option<&str>,
) -> NormalizedCollection {
    Normalizer::default().normalize_collection(collection, kind, force_name_field)
}
