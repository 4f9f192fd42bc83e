//! Normalized records to vote table.

use localiza_analytics_models::{NeighborhoodSource, TableOptions, VoteRow, VoteTable};
use localiza_schema::Normalizer;
use localiza_schema::sanitize::sanitize_text;
use localiza_schema_models::{CanonicalRecord, VOTES_KIND};
use serde_json::Value;

/// Property vote files use for the polling-place name. Its value, when
/// present, replaces the alias-resolved name.
pub const POLLING_PLACE_NAME_FIELD: &str = "local_votacao";

/// Raw municipality label preferred for display.
const RAW_MUNICIPALITY_KEY: &str = "NM_MUNICIPIO";

/// Raw polling-place label preferred for display.
const RAW_POLLING_PLACE_KEY: &str = "NM_LOCAL_VOTACAO";

/// Builds a vote table from normalized records.
///
/// The neighborhood-or-district column is decided once for the whole
/// table, over every record including the ones later dropped for missing
/// coordinates: district when any record has one, neighborhood otherwise.
#[must_use]
pub fn to_table(records: &[CanonicalRecord], options: TableOptions) -> VoteTable {
    let neighborhood_source = if records.iter().any(|r| !r.district.is_empty()) {
        NeighborhoodSource::District
    } else {
        NeighborhoodSource::Neighborhood
    };

    let rows = records
        .iter()
        .filter(|r| !options.require_coordinates || r.coordinates.is_some())
        .map(|r| to_row(r, neighborhood_source))
        .collect();

    VoteTable {
        rows,
        neighborhood_source,
    }
}

fn to_row(record: &CanonicalRecord, neighborhood_source: NeighborhoodSource) -> VoteRow {
    let polling_place = if record.name_forced {
        record.name.clone()
    } else {
        record.polling_place.clone()
    };
    let neighborhood_or_district = match neighborhood_source {
        NeighborhoodSource::District => record.district.clone(),
        NeighborhoodSource::Neighborhood => record.neighborhood.clone(),
    };
    let display_municipality = raw_label(record, RAW_MUNICIPALITY_KEY, &record.municipality);
    let display_polling_place = raw_label(record, RAW_POLLING_PLACE_KEY, &polling_place);
    let vote_count = if record.vote_count.is_finite() && record.vote_count > 0.0 {
        record.vote_count
    } else {
        0.0
    };

    VoteRow {
        id: record.id.clone(),
        name: record.name.clone(),
        municipality: record.municipality.clone(),
        district: record.district.clone(),
        neighborhood: record.neighborhood.clone(),
        address: record.address.clone(),
        polling_place,
        neighborhood_or_district,
        display_municipality,
        display_polling_place,
        vote_count,
        coordinates: record.coordinates,
        raw_properties: record.raw_properties.clone(),
        raw_geometry: record.raw_geometry.clone(),
    }
}

fn raw_label(record: &CanonicalRecord, key: &str, fallback: &str) -> String {
    let raw = sanitize_text(record.raw_properties.get(key));
    if raw.is_empty() {
        fallback.to_string()
    } else {
        raw
    }
}

/// Normalizes a votes `FeatureCollection` and builds its table.
#[must_use]
pub fn load_votes_table(
    collection: &Value,
    normalizer: &Normalizer,
    options: TableOptions,
) -> VoteTable {
    let normalized =
        normalizer.normalize_collection(collection, VOTES_KIND, Some(POLLING_PLACE_NAME_FIELD));
    let table = to_table(&normalized.records, options);
    log::debug!(
        "Built vote table with {} rows from {} records",
        table.len(),
        normalized.len()
    );
    table
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use localiza_analytics_models::{GroupKey, SummaryMode, VoteFilter};
    use localiza_schema::normalize_collection;
    use serde_json::json;

    use super::*;
    use crate::aggregate::top_n;
    use crate::export::write_csv;
    use crate::filter::apply_filter;

    fn collection() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "properties": {
                        "local_votacao": "EEF Centro",
                        "nome": "Secao 12",
                        "NM_MUNICIPIO": "FORTALEZA",
                        "municipio": "Fortaleza",
                        "bairro": "Centro",
                        "QT_VOTOS": "1.250",
                    },
                    "geometry": {"type": "Point", "coordinates": [-38.52, -3.73]},
                },
                {
                    "properties": {
                        "nome": "Escola B",
                        "municipio": "Caucaia",
                        "distrito": "Jurema",
                        "QT_VOTOS": 40,
                    },
                    "geometry": {"type": "Point", "coordinates": [-38.65, -3.74]},
                },
                {
                    "properties": {"nome": "Sem coordenadas", "QT_VOTOS": 7},
                    "geometry": null,
                },
            ],
        })
    }

    #[test]
    fn rows_without_coordinates_are_dropped_by_default() {
        let table = load_votes_table(&collection(), &Normalizer::default(), TableOptions::default());
        assert_eq!(table.len(), 2);

        let all = load_votes_table(
            &collection(),
            &Normalizer::default(),
            TableOptions {
                require_coordinates: false,
            },
        );
        assert_eq!(all.len(), 3);
        assert!(all.rows[2].coordinates.is_none());
    }

    #[test]
    fn district_column_wins_table_wide() {
        let table = load_votes_table(&collection(), &Normalizer::default(), TableOptions::default());
        assert_eq!(table.neighborhood_source, NeighborhoodSource::District);
        assert_eq!(table.rows[0].neighborhood_or_district, "");
        assert_eq!(table.rows[1].neighborhood_or_district, "Jurema");
    }

    #[test]
    fn neighborhood_column_used_without_districts() {
        let records = normalize_collection(
            &json!({"features": [{"properties": {"bairro": "Centro", "lat": -3.7, "lon": -38.5}}]}),
            VOTES_KIND,
            None,
        );
        let table = to_table(&records.records, TableOptions::default());
        assert_eq!(table.neighborhood_source, NeighborhoodSource::Neighborhood);
        assert_eq!(table.rows[0].neighborhood_or_district, "Centro");
    }

    #[test]
    fn forced_name_feeds_polling_place() {
        let table = load_votes_table(&collection(), &Normalizer::default(), TableOptions::default());
        let first = &table.rows[0];
        assert_eq!(first.name, "EEF Centro");
        assert_eq!(first.polling_place, "EEF Centro");
        assert_eq!(first.display_polling_place, "EEF Centro");
        assert!((first.vote_count - 1250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn display_columns_prefer_raw_labels() {
        let table = load_votes_table(&collection(), &Normalizer::default(), TableOptions::default());
        assert_eq!(table.rows[0].display_municipality, "FORTALEZA");
        assert_eq!(table.rows[1].display_municipality, "Caucaia");
    }

    #[test]
    fn raw_polling_place_label_is_used_everywhere() {
        let fc = json!({"features": [{
            "properties": {
                "local_votacao": "EEF Centro",
                "NM_LOCAL_VOTACAO": "ESCOLA CENTRO",
                "QT_VOTOS": 10,
            },
            "geometry": {"type": "Point", "coordinates": [-38.52, -3.73]},
        }]});
        let table = load_votes_table(&fc, &Normalizer::default(), TableOptions::default());

        let top = top_n(&table.rows, GroupKey::PollingPlace, 5);
        assert_eq!(top[0].key, "ESCOLA CENTRO");

        let filter = VoteFilter {
            polling_places: BTreeSet::from(["ESCOLA CENTRO".to_string()]),
            ..VoteFilter::default()
        };
        assert_eq!(apply_filter(&table, &filter).len(), 1);

        let mut csv = Vec::new();
        write_csv(&table.rows, SummaryMode::PollingPlace, &mut csv).unwrap();
        assert!(String::from_utf8(csv).unwrap().contains("\nESCOLA CENTRO,,10\n"));
    }

    #[test]
    fn empty_input_is_a_well_formed_empty_table() {
        let table = to_table(&[], TableOptions::default());
        assert!(table.is_empty());
        assert_eq!(table.neighborhood_source, NeighborhoodSource::Neighborhood);
    }
}
