//! Candidate folder discovery.
//!
//! A candidate is a sub-folder of the candidates directory holding at
//! least one `votos_*.geojson` file. An optional `candidato.toml` sets the
//! display title, subtitle and bounds file; without it the title comes
//! from the folder name and `limites.geojson` is used for bounds when
//! present.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::LayerError;
use crate::discover::{LAYER_EXTENSION, VOTES_PREFIX};

/// Optional per-candidate manifest file.
pub const MANIFEST_FILE: &str = "candidato.toml";

/// Bounds file picked up when the manifest names none.
pub const DEFAULT_BOUNDS_FILE: &str = "limites.geojson";

const DEFAULT_SUBTITLE: &str = "Mapa de votos por local de votação";

/// A candidate and its vote files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Folder name.
    pub key: String,
    /// Display title.
    pub title: String,
    /// Display subtitle.
    pub subtitle: String,
    /// Folder path.
    pub folder: PathBuf,
    /// `votos_*.geojson` files, sorted.
    pub votes_files: Vec<PathBuf>,
    /// File used to fit the map view, if any.
    pub bounds_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateManifest {
    title: Option<String>,
    subtitle: Option<String>,
    bounds_file: Option<String>,
}

/// Turns a folder name into a title: `joao_da_silva` -> `Joao Da Silva`.
#[must_use]
pub fn title_from_key(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lists the candidates under `dir`, sorted by key.
///
/// # Errors
///
/// Returns [`LayerError::DirectoryNotFound`] if `dir` does not exist,
/// [`LayerError::Io`] if it cannot be listed, or [`LayerError::Toml`] if
/// a candidate manifest is malformed.
pub fn discover_candidates(dir: &Path) -> Result<Vec<Candidate>, LayerError> {
    if !dir.is_dir() {
        return Err(LayerError::DirectoryNotFound {
            path: dir.display().to_string(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| LayerError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        let folder = entry.path();
        if !folder.is_dir() {
            continue;
        }
        if let Some(candidate) = load_candidate(&folder)? {
            candidates.push(candidate);
        }
    }

    candidates.sort_by(|a, b| a.key.cmp(&b.key));
    log::info!("Found {} candidates in {}", candidates.len(), dir.display());
    Ok(candidates)
}

fn load_candidate(folder: &Path) -> Result<Option<Candidate>, LayerError> {
    let Some(key) = folder.file_name().and_then(|s| s.to_str()) else {
        return Ok(None);
    };

    let votes_files = votes_files(folder)?;
    if votes_files.is_empty() {
        log::debug!("Skipping {}: no vote files", folder.display());
        return Ok(None);
    }

    let manifest = read_manifest(folder)?;
    let bounds_file = manifest
        .bounds_file
        .map(|name| folder.join(name))
        .or_else(|| Some(folder.join(DEFAULT_BOUNDS_FILE)))
        .filter(|path| path.is_file());

    Ok(Some(Candidate {
        key: key.to_string(),
        title: manifest.title.unwrap_or_else(|| title_from_key(key)),
        subtitle: manifest
            .subtitle
            .unwrap_or_else(|| DEFAULT_SUBTITLE.to_string()),
        folder: folder.to_path_buf(),
        votes_files,
        bounds_file,
    }))
}

fn votes_files(folder: &Path) -> Result<Vec<PathBuf>, LayerError> {
    let entries = std::fs::read_dir(folder).map_err(|e| LayerError::Io {
        path: folder.display().to_string(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path.extension().is_some_and(|e| e == LAYER_EXTENSION)
                && path
                    .file_name()
                    .and_then(|s| s.to_str())
                    .is_some_and(|name| name.starts_with(VOTES_PREFIX))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn read_manifest(folder: &Path) -> Result<CandidateManifest, LayerError> {
    let path = folder.join(MANIFEST_FILE);
    let Ok(contents) = std::fs::read_to_string(&path) else {
        return Ok(CandidateManifest::default());
    };
    Ok(toml::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("localiza_candidates_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(path: &Path) {
        std::fs::write(path, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
    }

    #[test]
    fn title_is_derived_from_folder_name() {
        assert_eq!(title_from_key("candidato_teste"), "Candidato Teste");
        assert_eq!(title_from_key("maria-das_dores"), "Maria Das Dores");
        assert_eq!(title_from_key("__"), "");
    }

    #[test]
    fn folders_with_vote_files_become_candidates() {
        let dir = scratch_dir("discover");

        let teste = dir.join("candidato_teste");
        std::fs::create_dir_all(&teste).unwrap();
        touch(&teste.join("votos_fortaleza.geojson"));
        touch(&teste.join("votos_municipios.geojson"));
        touch(&teste.join("limites.geojson"));
        touch(&teste.join("locais_fortaleza.geojson"));

        let empty = dir.join("sem_votos");
        std::fs::create_dir_all(&empty).unwrap();
        touch(&empty.join("limites.geojson"));

        let custom = dir.join("ana");
        std::fs::create_dir_all(&custom).unwrap();
        touch(&custom.join("votos_sobral.geojson"));
        std::fs::write(
            custom.join(MANIFEST_FILE),
            "title = \"Ana Souza\"\nbounds_file = \"missing.geojson\"\n",
        )
        .unwrap();

        let candidates = discover_candidates(&dir).unwrap();
        let keys: Vec<&str> = candidates.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["ana", "candidato_teste"]);

        let ana = &candidates[0];
        assert_eq!(ana.title, "Ana Souza");
        assert_eq!(ana.subtitle, DEFAULT_SUBTITLE);
        assert!(ana.bounds_file.is_none());

        let teste = &candidates[1];
        assert_eq!(teste.title, "Candidato Teste");
        assert_eq!(teste.votes_files.len(), 2);
        assert!(teste.votes_files[0].ends_with("votos_fortaleza.geojson"));
        assert!(
            teste
                .bounds_file
                .as_ref()
                .is_some_and(|p| p.ends_with("limites.geojson"))
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let dir = scratch_dir("bad_manifest");
        let folder = dir.join("x");
        std::fs::create_dir_all(&folder).unwrap();
        touch(&folder.join("votos_x.geojson"));
        std::fs::write(folder.join(MANIFEST_FILE), "title = ").unwrap();

        assert!(matches!(
            discover_candidates(&dir),
            Err(LayerError::Toml(_))
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join("localiza_candidates_missing");
        assert!(matches!(
            discover_candidates(&dir),
            Err(LayerError::DirectoryNotFound { .. })
        ));
    }
}
