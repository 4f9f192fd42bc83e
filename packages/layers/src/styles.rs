//! Layer styles.
//!
//! Styles are plain JSON objects handed to the map renderer. A style file
//! looks like:
//!
//! ```json
//! {
//!   "defaults": { "polygon": { "weight": 1 } },
//!   "layers": { "bairros_fortaleza": { "color": "#c53030" } }
//! }
//! ```
//!
//! and a layer's style is the built-in default for its geometry family,
//! overridden key by key by `defaults[family]`, then by `layers[stem]`.

use std::collections::BTreeMap;
use std::path::Path;

use localiza_schema_models::GeometryFamily;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A style: renderer option name -> value.
pub type Style = Map<String, Value>;

/// Parsed style file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerStyles {
    /// Per geometry family (`point`, `line`, `polygon`).
    #[serde(default)]
    pub defaults: BTreeMap<String, Style>,
    /// Per layer stem.
    #[serde(default)]
    pub layers: BTreeMap<String, Style>,
}

impl LayerStyles {
    /// Loads a style file. A missing or invalid file yields empty styles.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            log::debug!("No layer style file at {}", path.display());
            return Self::default();
        };
        match serde_json::from_str(&contents) {
            Ok(styles) => styles,
            Err(e) => {
                log::warn!("Failed to parse layer styles {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Resolves the style of layer `stem` with geometry `family`.
    ///
    /// The stem is looked up as given, then lowercased.
    #[must_use]
    pub fn resolve(&self, stem: &str, family: GeometryFamily) -> Style {
        let mut style = default_style(family);
        if let Some(defaults) = self.defaults.get(family.as_ref()) {
            merge(&mut style, defaults);
        }
        if let Some(layer) = self
            .layers
            .get(stem)
            .or_else(|| self.layers.get(&stem.to_lowercase()))
        {
            merge(&mut style, layer);
        }
        style
    }
}

fn merge(base: &mut Style, overrides: &Style) {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
}

/// Built-in style for a geometry family. Unknown geometries are drawn as
/// points.
#[must_use]
pub fn default_style(family: GeometryFamily) -> Style {
    let style = match family {
        GeometryFamily::Polygon => json!({
            "fillColor": "#2b6cb0",
            "fillOpacity": 0.15,
            "color": "#2b6cb0",
            "weight": 2,
        }),
        GeometryFamily::Line => json!({
            "color": "#2b6cb0",
            "weight": 3,
            "opacity": 0.9,
        }),
        GeometryFamily::Point | GeometryFamily::Unknown => json!({
            "mode": "circle",
            "radius": 6,
            "color": "#2b6cb0",
            "fillColor": "#2b6cb0",
            "fillOpacity": 0.85,
        }),
    };
    match style {
        Value::Object(map) => map,
        _ => Style::new(),
    }
}
