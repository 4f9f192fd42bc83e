//! Coordinate flattening and map bounds.

use localiza_schema_models::BoundingBox;
use serde_json::Value;

/// Flattens any nesting of `GeoJSON` coordinate arrays into `[lon, lat]`
/// positions.
///
/// A position is an array of at least two numbers; extra members such as
/// altitude are ignored. Anything that is neither a position nor an array
/// contributes nothing.
#[must_use]
pub fn flatten_coords(coords: &Value) -> Vec<[f64; 2]> {
    let mut out = Vec::new();
    collect_positions(coords, &mut out);
    out
}

fn collect_positions(value: &Value, out: &mut Vec<[f64; 2]>) {
    let Value::Array(items) = value else {
        return;
    };

    if items.len() >= 2 && items.iter().all(Value::is_number) {
        if let (Some(lon), Some(lat)) = (items[0].as_f64(), items[1].as_f64()) {
            out.push([lon, lat]);
        }
        return;
    }

    for item in items {
        collect_positions(item, out);
    }
}

/// Bounding box of one geometry's coordinates.
#[must_use]
pub fn geometry_bounds(geometry: &Value) -> Option<BoundingBox> {
    let coords = geometry.get("coordinates")?;
    BoundingBox::from_lon_lat_pairs(&flatten_coords(coords))
}

/// Bounding box of every feature in a `FeatureCollection`, used to fit
/// the map view. `None` when no feature has coordinates.
#[must_use]
pub fn bounds_center(collection: &Value) -> Option<BoundingBox> {
    let features = collection.get("features")?.as_array()?;
    let pairs: Vec<[f64; 2]> = features
        .iter()
        .filter_map(|f| f.get("geometry")?.get("coordinates"))
        .flat_map(flatten_coords)
        .collect();
    BoundingBox::from_lon_lat_pairs(&pairs)
}
