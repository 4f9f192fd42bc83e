//! Polygon selection.
//!
//! A selection is a drawn `Polygon` or `MultiPolygon` (usually wrapped in
//! a `Feature`). Exact mode parses it with `geojson` and tests each row
//! with `geo`'s `Contains`; bounding-box mode keeps every row inside the
//! polygon's axis-aligned box. The two differ for concave shapes, so the
//! mode is always chosen by the caller.

use geo::{Contains, MultiPolygon, Point};
use geojson::GeoJson;
use localiza_analytics_models::{ContainmentMode, VoteTable};
use localiza_schema_models::GeometryKind;
use serde_json::Value;

use crate::bounds::geometry_bounds;

/// Keeps the rows inside `selection`.
///
/// The table comes back unchanged when it is empty, when there is no
/// selection, or when the selection is not a polygon. Rows without
/// coordinates are always outside. In [`ContainmentMode::Exact`], a
/// polygon that cannot be built falls back to its bounding box.
#[must_use]
pub fn filter_within_polygon(
    table: &VoteTable,
    selection: Option<&Value>,
    mode: ContainmentMode,
) -> VoteTable {
    let Some(selection) = selection else {
        return table.clone();
    };
    if table.is_empty() {
        return table.clone();
    }

    let geometry = selection.get("geometry").unwrap_or(selection);
    let kind = GeometryKind::of(geometry);
    if !kind.is_areal() {
        return table.clone();
    }

    let filtered = match mode {
        ContainmentMode::BoundingBox => filter_within_bounds(table, geometry),
        ContainmentMode::Exact => to_multi_polygon(geometry, kind).map_or_else(
            || {
                log::warn!("Selection polygon could not be built; using its bounding box");
                filter_within_bounds(table, geometry)
            },
            |polygon| {
                table.retain_rows(|row| {
                    row.coordinates
                        .is_some_and(|c| polygon.contains(&Point::new(c.lon(), c.lat())))
                })
            },
        ),
    };

    log::debug!(
        "Selection ({mode}) kept {} of {} rows",
        filtered.len(),
        table.len()
    );
    filtered
}

fn filter_within_bounds(table: &VoteTable, geometry: &Value) -> VoteTable {
    let Some(bounds) = geometry_bounds(geometry) else {
        return table.clone();
    };
    table.retain_rows(|row| {
        row.coordinates
            .is_some_and(|c| bounds.contains(c.lat(), c.lon()))
    })
}

/// Whether `value` is an array nested `depth` levels above positions of
/// at least two numbers.
fn is_well_formed(value: &Value, depth: usize) -> bool {
    let Some(items) = value.as_array() else {
        return false;
    };
    if depth == 0 {
        return items.len() >= 2 && items.iter().all(Value::is_number);
    }
    items.iter().all(|item| is_well_formed(item, depth - 1))
}

fn to_multi_polygon(geometry: &Value, kind: GeometryKind) -> Option<MultiPolygon<f64>> {
    // The geo-types conversion indexes positions without checking them.
    let depth = if kind == GeometryKind::MultiPolygon { 3 } else { 2 };
    if !is_well_formed(geometry.get("coordinates")?, depth) {
        return None;
    }

    // `geojson` only accepts the canonical type spelling.
    let mut geometry = geometry.clone();
    if let Some(object) = geometry.as_object_mut() {
        object.insert("type".to_string(), Value::from(kind.as_ref()));
    }

    let geojson: GeoJson = geometry.to_string().parse().ok()?;
    let GeoJson::Geometry(geom) = geojson else {
        return None;
    };
    let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}
