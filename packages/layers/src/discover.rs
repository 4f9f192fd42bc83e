//! Map layer discovery.
//!
//! Every `.geojson` file in a folder is a layer. Layers whose names start
//! with one of [`BASE_SCOPED_PREFIXES`] belong to one votes base (for
//! example `locais_fortaleza`) and are only shown alongside it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use localiza_schema_models::{GeometryFamily, GeometryKind};
use serde::Serialize;
use serde_json::Value;

use crate::geojson_io::{is_empty_geojson, read_geojson};

/// File extension of layer files.
pub const LAYER_EXTENSION: &str = "geojson";

/// Votes file prefix.
pub const VOTES_PREFIX: &str = "votos_";

/// Suffix of votes files aggregated per municipality.
pub const MUNICIPALITIES_SUFFIX: &str = "_municipios";

/// Layer name prefixes tied to a specific votes base.
pub const BASE_SCOPED_PREFIXES: &[&str] = &[
    "votos_",
    "locais_",
    "distritos_",
    "bairros_",
    "zonas_",
    "lider_",
];

/// A discovered layer file and its parsed content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInfo {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name without extension.
    pub stem: String,
    /// File name with extension.
    pub filename: String,
    /// Number of features in the collection.
    pub feature_count: usize,
    /// Geometry type of the first feature.
    pub geometry_kind: Option<GeometryKind>,
    /// Parsed file content.
    pub geojson: Value,
}

impl LayerInfo {
    /// Rendering family of the layer, from its first feature.
    #[must_use]
    pub fn family(&self) -> GeometryFamily {
        self.geometry_kind
            .map_or(GeometryFamily::Unknown, GeometryKind::family)
    }
}

/// Lists the layers in `dir`, sorted by file name.
///
/// Files named in `exclude`, unreadable files and empty files are skipped.
/// A missing directory yields no layers.
#[must_use]
pub fn discover_layers(dir: &Path, exclude: &BTreeSet<String>) -> Vec<LayerInfo> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        log::debug!("No layer directory at {}", dir.display());
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == LAYER_EXTENSION))
        .collect();
    paths.sort();

    let mut layers = Vec::new();
    for path in paths {
        let (Some(stem), Some(filename)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.file_name().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        if exclude.contains(filename) {
            continue;
        }

        let geojson = read_geojson(&path);
        if is_empty_geojson(&geojson) {
            continue;
        }

        let features = geojson.get("features").and_then(Value::as_array);
        let feature_count = features.map_or(0, Vec::len);
        let geometry_kind = features
            .and_then(|f| f.first())
            .and_then(|f| f.get("geometry"))
            .filter(|g| !g.is_null())
            .map(GeometryKind::of);

        layers.push(LayerInfo {
            stem: stem.to_string(),
            filename: filename.to_string(),
            path,
            feature_count,
            geometry_kind,
            geojson,
        });
    }

    log::debug!("Discovered {} layers in {}", layers.len(), dir.display());
    layers
}

/// Base identifier of a votes file: `votos_fortaleza` and
/// `votos_fortaleza_municipios` both give `fortaleza`.
///
/// `None` for files that don't follow the `votos_` naming.
#[must_use]
pub fn base_identifier(votes_stem: &str) -> Option<String> {
    let stem = votes_stem.to_lowercase();
    if !stem.starts_with(VOTES_PREFIX) {
        return None;
    }
    let id = stem
        .replace(VOTES_PREFIX, "")
        .replace(MUNICIPALITIES_SUFFIX, "");
    (!id.is_empty()).then_some(id)
}

/// Whether `layer` should be shown next to the votes base `base`.
///
/// Layers without a base-scoped prefix are always shown, as is everything
/// when there is no base.
#[must_use]
pub fn layer_matches_base(layer: &LayerInfo, base: Option<&str>) -> bool {
    let Some(base) = base else {
        return true;
    };
    let name = layer.stem.to_lowercase();
    if !BASE_SCOPED_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return true;
    }
    name.contains(base) || layer.filename.to_lowercase().contains(base)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("localiza_discover_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn layer(stem: &str) -> LayerInfo {
        LayerInfo {
            path: PathBuf::from(format!("{stem}.geojson")),
            stem: stem.to_string(),
            filename: format!("{stem}.geojson"),
            feature_count: 0,
            geometry_kind: None,
            geojson: json!({}),
        }
    }

    #[test]
    fn discovers_sorted_layers_with_metadata() {
        let dir = scratch_dir("layers");
        std::fs::write(
            dir.join("b_bairros.geojson"),
            json!({"features": [
                {"geometry": {"type": "Polygon", "coordinates": []}},
                {"geometry": {"type": "Polygon", "coordinates": []}},
            ]})
            .to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.join("a_locais.geojson"),
            json!({"features": [{"geometry": {"type": "point", "coordinates": [0, 0]}}]}).to_string(),
        )
        .unwrap();
        std::fs::write(dir.join("votos_x.geojson"), json!({"features": []}).to_string()).unwrap();
        std::fs::write(dir.join("broken.geojson"), "nope").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let exclude = BTreeSet::from(["votos_x.geojson".to_string()]);
        let layers = discover_layers(&dir, &exclude);
        let stems: Vec<&str> = layers.iter().map(|l| l.stem.as_str()).collect();
        assert_eq!(stems, ["a_locais", "b_bairros"]);
        assert_eq!(layers[0].geometry_kind, Some(GeometryKind::Point));
        assert_eq!(layers[0].family(), GeometryFamily::Point);
        assert_eq!(layers[1].feature_count, 2);
        assert_eq!(layers[1].family(), GeometryFamily::Polygon);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_has_no_layers() {
        let dir = std::env::temp_dir().join("localiza_discover_does_not_exist");
        assert!(discover_layers(&dir, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn base_identifier_strips_prefix_and_suffix() {
        assert_eq!(base_identifier("votos_Fortaleza"), Some("fortaleza".to_string()));
        assert_eq!(
            base_identifier("votos_fortaleza_municipios"),
            Some("fortaleza".to_string())
        );
        assert_eq!(base_identifier("limites"), None);
        assert_eq!(base_identifier("votos_"), None);
    }

    #[test]
    fn scoped_layers_follow_the_base() {
        let base = Some("fortaleza");
        assert!(layer_matches_base(&layer("locais_fortaleza"), base));
        assert!(!layer_matches_base(&layer("locais_sobral"), base));
        assert!(layer_matches_base(&layer("limites_ce"), base));
        assert!(layer_matches_base(&layer("locais_sobral"), None));
    }
}
