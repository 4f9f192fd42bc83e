//! Coordinate lookup and repair.
//!
//! Third-party exports get coordinates wrong in two recurring ways: the
//! axes are swapped, or a fixed-point value lost its decimal point
//! (`-37397117` for `-3.7397117`). The engine applies a short, fixed
//! sequence of reversible transforms and only gives up on a pair when
//! none of them yields valid WGS84.

use localiza_schema_models::{
    BoundingBox, CanonicalField, GeometryKind, LatLon, MAX_LATITUDE, MAX_LONGITUDE, RepairConfig,
};
use serde_json::{Map, Value};

use crate::aliases::AliasTable;
use crate::sanitize::parse_number;

/// Divides `value` by ten while its magnitude exceeds `limit`, at most
/// `max_divisions` times.
///
/// The result may still be out of range; callers validate afterwards.
#[must_use]
pub fn rescale_to_range(value: f64, limit: f64, max_divisions: u32) -> f64 {
    let mut v = value;
    let mut divisions = 0;
    while v.abs() > limit && divisions < max_divisions {
        v /= 10.0;
        divisions += 1;
    }
    v
}

/// Repairs a raw `(lat, lon)` pair.
///
/// 1. Scale repair on each axis (latitude against 90, longitude against
///    180).
/// 2. If exactly one axis is still out of range, swap the axes and scale
///    repair again.
/// 3. Validate against WGS84 bounds.
///
/// When the config carries a region, identity, swapped, rescaled and
/// swapped-plus-rescaled candidates are tried first and the first one
/// inside the region wins; otherwise the steps above apply.
#[must_use]
pub fn repair(lat: f64, lon: f64, config: &RepairConfig) -> Option<LatLon> {
    if let Some(region) = &config.region
        && let Some(fixed) = repair_within_region(lat, lon, region, config.max_divisions)
    {
        return Some(fixed);
    }
    repair_global(lat, lon, config.max_divisions)
}

fn repair_global(lat: f64, lon: f64, max_divisions: u32) -> Option<LatLon> {
    let mut lat = rescale_to_range(lat, MAX_LATITUDE, max_divisions);
    let mut lon = rescale_to_range(lon, MAX_LONGITUDE, max_divisions);

    let lat_out = lat.abs() > MAX_LATITUDE;
    let lon_out = lon.abs() > MAX_LONGITUDE;
    if lat_out != lon_out {
        std::mem::swap(&mut lat, &mut lon);
        lat = rescale_to_range(lat, MAX_LATITUDE, max_divisions);
        lon = rescale_to_range(lon, MAX_LONGITUDE, max_divisions);
    }

    LatLon::new(lat, lon)
}

fn repair_within_region(
    lat: f64,
    lon: f64,
    region: &BoundingBox,
    max_divisions: u32,
) -> Option<LatLon> {
    let rescale = |a: f64, b: f64| {
        (
            rescale_to_range(a, region.lat_magnitude(), max_divisions),
            rescale_to_range(b, region.lon_magnitude(), max_divisions),
        )
    };

    [(lat, lon), (lon, lat), rescale(lat, lon), rescale(lon, lat)]
        .into_iter()
        .find(|(la, lo)| region.contains(*la, *lo))
        .and_then(|(la, lo)| LatLon::new(la, lo))
}

/// Looks up an unrepaired `(lat, lon)` pair.
///
/// Latitude/longitude properties win when both parse; otherwise a `Point`
/// geometry is read in `GeoJSON` `[lon, lat]` order.
#[must_use]
pub fn lookup_raw_pair(
    properties: &Map<String, Value>,
    geometry: &Value,
    aliases: &AliasTable,
) -> Option<(f64, f64)> {
    let lat = parse_number(aliases.pick(properties, CanonicalField::Latitude));
    let lon = parse_number(aliases.pick(properties, CanonicalField::Longitude));
    if let (Some(lat), Some(lon)) = (lat, lon) {
        return Some((lat, lon));
    }

    if GeometryKind::of(geometry) != GeometryKind::Point {
        return None;
    }
    let coords = geometry.get("coordinates")?.as_array()?;
    if coords.len() < 2 {
        return None;
    }
    let lon = parse_number(coords.first())?;
    let lat = parse_number(coords.get(1))?;
    Some((lat, lon))
}

/// Looks up and repairs the coordinates of one feature.
#[must_use]
pub fn resolve_coordinates(
    properties: &Map<String, Value>,
    geometry: &Value,
    aliases: &AliasTable,
    config: &RepairConfig,
) -> Option<LatLon> {
    let (lat, lon) = lookup_raw_pair(properties, geometry, aliases)?;
    let repaired = repair(lat, lon, config);
    if repaired.is_none() {
        log::debug!("Discarding unrecoverable coordinates ({lat}, {lon})");
    }
    repaired
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// Roughly the state of Ceará.
    const CEARA: BoundingBox = BoundingBox::new(-41.5, -8.0, -37.0, -2.5);

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn props(value: &Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn rescale_stops_once_in_range() {
        assert!(approx(rescale_to_range(-37_397_117.0, 90.0, 12), -37.397_117));
        assert!(approx(rescale_to_range(-385_234_567.0, 180.0, 12), -38.523_456_7));
        assert!(approx(rescale_to_range(45.0, 90.0, 12), 45.0));
    }

    #[test]
    fn rescale_gives_up_after_max_divisions() {
        let v = rescale_to_range(1e20, 90.0, 12);
        assert!(v > 90.0);
        assert!((v - 1e8).abs() < 1.0);
    }

    #[test]
    fn valid_pairs_are_untouched() {
        let fixed = repair(-3.73, -38.52, &RepairConfig::default()).unwrap();
        assert!(approx(fixed.lat(), -3.73));
        assert!(approx(fixed.lon(), -38.52));
    }

    #[test]
    fn axis_still_out_after_rescale_is_swapped() {
        // Twelve divisions bring 95e12 down to 95: too big for a latitude,
        // fine for a longitude.
        let fixed = repair(95e12, -38.5, &RepairConfig::default()).unwrap();
        assert!(approx(fixed.lat(), -38.5));
        assert!((fixed.lon() - 95.0).abs() < 1e-6);
    }

    #[test]
    fn in_range_pairs_are_not_swapped_without_a_region() {
        let fixed = repair(-38.5, -3.7, &RepairConfig::default()).unwrap();
        assert!(approx(fixed.lat(), -38.5));
        assert!(approx(fixed.lon(), -3.7));
    }

    #[test]
    fn scaled_integers_are_rescaled() {
        let fixed = repair(-37_397_117.0, -385_234_567.0, &RepairConfig::default()).unwrap();
        assert!(approx(fixed.lat(), -37.397_117));
        assert!(approx(fixed.lon(), -38.523_456_7));
    }

    #[test]
    fn hopeless_pairs_are_rejected_whole() {
        assert!(repair(1e20, 1e20, &RepairConfig::default()).is_none());
        assert!(repair(f64::NAN, -38.5, &RepairConfig::default()).is_none());
    }

    #[test]
    fn region_resolves_in_range_swaps() {
        let config = RepairConfig {
            region: Some(CEARA),
            ..RepairConfig::default()
        };
        let fixed = repair(-38.5, -3.7, &config).unwrap();
        assert!(approx(fixed.lat(), -3.7));
        assert!(approx(fixed.lon(), -38.5));
    }

    #[test]
    fn region_resolves_fixed_point_latitude() {
        let config = RepairConfig {
            region: Some(CEARA),
            ..RepairConfig::default()
        };
        let fixed = repair(-37_397_117.0, -38.52, &config).unwrap();
        assert!(approx(fixed.lat(), -3.739_711_7));
        assert!(approx(fixed.lon(), -38.52));
    }

    #[test]
    fn region_miss_falls_back_to_global_rules() {
        let config = RepairConfig {
            region: Some(CEARA),
            ..RepairConfig::default()
        };
        let fixed = repair(48.85, 2.35, &config).unwrap();
        assert!(approx(fixed.lat(), 48.85));
        assert!(approx(fixed.lon(), 2.35));
    }

    #[test]
    fn properties_take_precedence_over_geometry() {
        let p = props(&json!({"Latitude": "-3,73", "LNG": "-38,52"}));
        let geometry = json!({"type": "Point", "coordinates": [-40.0, -5.0]});
        let (lat, lon) = lookup_raw_pair(&p, &geometry, AliasTable::builtin()).unwrap();
        assert!(approx(lat, -3.73));
        assert!(approx(lon, -38.52));
    }

    #[test]
    fn point_geometry_is_read_lon_lat() {
        let p = props(&json!({"lat": "x"}));
        let geometry = json!({"type": "Point", "coordinates": [-38.52, -3.73]});
        let (lat, lon) = lookup_raw_pair(&p, &geometry, AliasTable::builtin()).unwrap();
        assert!(approx(lat, -3.73));
        assert!(approx(lon, -38.52));
    }

    #[test]
    fn non_point_geometry_yields_nothing() {
        let geometry = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]],
        });
        assert!(lookup_raw_pair(&Map::new(), &geometry, AliasTable::builtin()).is_none());
        assert!(lookup_raw_pair(&Map::new(), &Value::Null, AliasTable::builtin()).is_none());
    }

    #[test]
    fn short_point_coordinates_yield_nothing() {
        let geometry = json!({"type": "Point", "coordinates": [-38.52]});
        assert!(lookup_raw_pair(&Map::new(), &geometry, AliasTable::builtin()).is_none());
    }
}
