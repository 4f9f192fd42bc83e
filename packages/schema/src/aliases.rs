//! Property alias resolution.
//!
//! Maps each [`CanonicalField`] to an ordered list of property spellings
//! seen in the wild (accented and unaccented, upper and lower case, GIS
//! export abbreviations). The built-in table lives in
//! `aliases/default.toml` and is embedded at compile time; deployments can
//! layer their own TOML on top with [`AliasTable::with_overrides`].

use std::collections::BTreeMap;
use std::str::FromStr as _;
use std::sync::LazyLock;

use localiza_schema_models::CanonicalField;
use serde_json::{Map, Value};

use crate::SchemaError;

/// Alias table embedded at compile time.
const DEFAULT_ALIASES_TOML: &str = include_str!("../aliases/default.toml");

static BUILTIN: LazyLock<AliasTable> = LazyLock::new(|| {
    AliasTable::from_toml(DEFAULT_ALIASES_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse aliases/default.toml: {e}"))
});

/// Canonical field -> ordered candidate property keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<CanonicalField, Vec<String>>,
}

impl AliasTable {
    /// The built-in table.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `aliases/default.toml` is malformed (covered
    /// by this module's tests).
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Parses a table from TOML of the form `field = ["Key", "KEY", ...]`,
    /// where `field` is a snake-case [`CanonicalField`] name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Toml`] if the TOML is malformed, or
    /// [`SchemaError::AliasTable`] if it names an unknown field.
    pub fn from_toml(toml_str: &str) -> Result<Self, SchemaError> {
        let raw: BTreeMap<String, Vec<String>> = toml::from_str(toml_str)?;
        let mut entries = BTreeMap::new();

        for (name, keys) in raw {
            let field =
                CanonicalField::from_str(&name).map_err(|_| SchemaError::AliasTable {
                    message: format!("unknown canonical field `{name}`"),
                })?;
            entries.insert(field, keys);
        }

        Ok(Self { entries })
    }

    /// Replaces this table's alias list for every field `overrides` defines.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Self) -> Self {
        self.entries.extend(overrides.entries);
        self
    }

    /// Candidate keys for `field`, in priority order.
    #[must_use]
    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.entries.get(&field).map_or(&[], Vec::as_slice)
    }

    /// Resolves `field` against a property bag.
    #[must_use]
    pub fn pick<'a>(
        &self,
        properties: &'a Map<String, Value>,
        field: CanonicalField,
    ) -> Option<&'a Value> {
        pick(properties, self.aliases(field))
    }
}

/// Returns the value of the first alias present in `properties`.
///
/// For each alias in order, an exact key match is tried before a
/// case-insensitive scan of every key, so an earlier alias always beats a
/// later one. Keys not named by any alias are never inspected.
#[must_use]
pub fn pick<'a, S: AsRef<str>>(
    properties: &'a Map<String, Value>,
    aliases: &[S],
) -> Option<&'a Value> {
    for alias in aliases {
        let alias = alias.as_ref();
        if let Some(value) = properties.get(alias) {
            return Some(value);
        }

        let wanted = alias.to_lowercase();
        if let Some((_, value)) = properties
            .iter()
            .find(|(key, _)| key.to_lowercase() == wanted)
        {
            return Some(value);
        }
    }
    None
}
