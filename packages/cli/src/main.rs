#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Headless front end for the vote dashboard.
//!
//! ```text
//! localiza candidates
//! localiza layers [dir] [--base votos_fortaleza]
//! localiza summary <votes-file> [--municipality ..] [--place ..] [--neighborhood ..]
//!                  [--min-votes N] [--max-votes N] [--selection polygon.geojson]
//!                  [--containment exact|bounding_box] [--top N] [--bounds file] [--json]
//! localiza export <votes-file> [out.csv] [filters]
//! ```
//!
//! Settings are read from `localiza.toml` in the working directory, or
//! from the file given with `--config`.

mod config;
mod report;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use localiza_analytics::export::{export_csv, export_file_name};
use localiza_analytics::filter::apply_filter;
use localiza_analytics::selection::filter_within_polygon;
use localiza_analytics::table::load_votes_table;
use localiza_analytics_models::{
    ContainmentMode, SummaryMode, TableOptions, VoteFilter, VoteTable,
};
use localiza_layers::{
    LayerStyles, base_identifier, discover_candidates, discover_layers, layer_matches_base,
    try_read_geojson,
};
use serde_json::Value;

use crate::config::AppConfig;
use crate::report::Report;

#[derive(Parser)]
#[command(name = "localiza", about = "Explore polling-place vote maps")]
struct Cli {
    /// Config file (defaults to `localiza.toml` when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List candidate folders and their vote files
    Candidates,
    /// List the map layers in a folder with their resolved styles
    Layers {
        /// Layer folder (defaults to the common data folder)
        dir: Option<PathBuf>,
        /// Votes file stem whose scoped layers should be shown
        #[arg(long)]
        base: Option<String>,
    },
    /// Print the dashboard summary for a votes file
    Summary {
        /// Votes `GeoJSON` file
        votes_file: PathBuf,
        #[command(flatten)]
        filters: FilterArgs,
        /// Number of entries in the ranking sections
        #[arg(long, default_value = "13")]
        top: usize,
        /// File used to compute the map bounds (defaults to the votes file)
        #[arg(long)]
        bounds: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export the filtered rows as CSV
    Export {
        /// Votes `GeoJSON` file
        votes_file: PathBuf,
        /// Output file (defaults to `localizavotos_<stem>.csv`)
        out: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Debug, Default, Args)]
struct FilterArgs {
    /// Keep only these municipalities (repeatable)
    #[arg(long = "municipality")]
    municipalities: Vec<String>,
    /// Keep only these polling places (repeatable)
    #[arg(long = "place")]
    places: Vec<String>,
    /// Keep only these neighborhoods or districts (repeatable)
    #[arg(long = "neighborhood")]
    neighborhoods: Vec<String>,
    /// Minimum votes per row
    #[arg(long)]
    min_votes: Option<f64>,
    /// Maximum votes per row
    #[arg(long)]
    max_votes: Option<f64>,
    /// `GeoJSON` polygon to restrict the rows to
    #[arg(long)]
    selection: Option<PathBuf>,
    /// Polygon containment test (overrides the config)
    #[arg(long, value_parser = parse_containment)]
    containment: Option<ContainmentMode>,
}

impl FilterArgs {
    fn to_vote_filter(&self) -> VoteFilter {
        VoteFilter {
            municipalities: self.municipalities.iter().cloned().collect(),
            polling_places: self.places.iter().cloned().collect(),
            neighborhoods: self.neighborhoods.iter().cloned().collect(),
            min_votes: self.min_votes,
            max_votes: self.max_votes,
        }
    }
}

fn parse_containment(s: &str) -> Result<ContainmentMode, String> {
    s.parse::<ContainmentMode>()
        .map_err(|e| format!("{e}: expected `exact` or `bounding_box`"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Candidates => {
            let candidates = discover_candidates(&config.candidates_dir)?;
            if candidates.is_empty() {
                println!("No candidates found in {}.", config.candidates_dir.display());
                return Ok(());
            }
            for candidate in &candidates {
                println!("{} ({})", candidate.title, candidate.key);
                println!("  {}", candidate.subtitle);
                for file in &candidate.votes_files {
                    println!("  - {}", file.display());
                }
                if let Some(bounds) = &candidate.bounds_file {
                    println!("  bounds: {}", bounds.display());
                }
            }
        }
        Commands::Layers { dir, base } => {
            let dir = dir.unwrap_or_else(|| config.common_data_dir.clone());
            let base = base.as_deref().and_then(base_identifier);
            let styles = LayerStyles::load(&config.styles_file);

            let layers = discover_layers(&dir, &BTreeSet::new());
            let shown: Vec<_> = layers
                .iter()
                .filter(|layer| layer_matches_base(layer, base.as_deref()))
                .collect();
            if shown.is_empty() {
                println!("No layers found in {}.", dir.display());
                return Ok(());
            }

            println!("{:<40} {:>8}  {:<8} STYLE", "LAYER", "FEATURES", "FAMILY");
            for layer in shown {
                let style = styles.resolve(&layer.stem, layer.family());
                println!(
                    "{:<40} {:>8}  {:<8} {}",
                    layer.stem,
                    layer.feature_count,
                    layer.family(),
                    Value::Object(style)
                );
            }
        }
        Commands::Summary {
            votes_file,
            filters,
            top,
            bounds,
            json,
        } => {
            let (collection, table) = load_table(&config, &votes_file, &filters)?;
            let stem = file_stem(&votes_file);
            let mode = SummaryMode::for_votes_file(&stem);

            let bounds_source = match bounds {
                Some(path) => try_read_geojson(&path)?,
                None => collection,
            };
            let report = Report::build(&stem, &table, mode, top, &bounds_source);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
        }
        Commands::Export {
            votes_file,
            out,
            filters,
        } => {
            let (_, table) = load_table(&config, &votes_file, &filters)?;
            let stem = file_stem(&votes_file);
            let out = out.unwrap_or_else(|| PathBuf::from(export_file_name(&stem)));

            export_csv(&table.rows, SummaryMode::for_votes_file(&stem), &out)?;
            println!("Wrote {} rows to {}", table.len(), out.display());
        }
    }

    Ok(())
}

/// Reads, normalizes and filters a votes file. Returns the raw collection
/// alongside the filtered table.
fn load_table(
    config: &AppConfig,
    votes_file: &Path,
    filters: &FilterArgs,
) -> Result<(Value, VoteTable), Box<dyn std::error::Error>> {
    let collection = try_read_geojson(votes_file)?;
    let normalizer = config.normalizer()?;
    let table = load_votes_table(&collection, &normalizer, TableOptions::default());
    let table = apply_filter(&table, &filters.to_vote_filter());

    let table = match &filters.selection {
        Some(path) => {
            let selection = selection_geometry(try_read_geojson(path)?);
            let mode = filters.containment.unwrap_or(config.containment);
            filter_within_polygon(&table, selection.as_ref(), mode)
        }
        None => table,
    };

    log::info!("{} rows after filters", table.len());
    Ok((collection, table))
}

/// Picks the selection shape out of a loaded file: the first feature of a
/// `FeatureCollection`, or the file itself.
fn selection_geometry(value: Value) -> Option<Value> {
    match value.get("features") {
        Some(Value::Array(features)) => features.first().cloned(),
        Some(_) => None,
        None => Some(value),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn filter_args_become_a_vote_filter() {
        let cli = Cli::parse_from([
            "localiza",
            "summary",
            "votos_fortaleza.geojson",
            "--municipality",
            "Fortaleza",
            "--municipality",
            "Caucaia",
            "--place",
            "Escola A",
            "--min-votes",
            "10",
            "--containment",
            "bounding_box",
        ]);
        let Commands::Summary { filters, top, .. } = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(top, 13);
        assert_eq!(filters.containment, Some(ContainmentMode::BoundingBox));

        let filter = filters.to_vote_filter();
        assert_eq!(
            filter.municipalities,
            BTreeSet::from(["Caucaia".to_string(), "Fortaleza".to_string()])
        );
        assert_eq!(filter.polling_places.len(), 1);
        assert!(filter.neighborhoods.is_empty());
        assert_eq!(filter.min_votes, Some(10.0));
        assert_eq!(filter.max_votes, None);
    }

    #[test]
    fn no_filter_args_is_an_empty_filter() {
        assert!(FilterArgs::default().to_vote_filter().is_empty());
    }

    #[test]
    fn unknown_containment_is_rejected() {
        assert!(
            Cli::try_parse_from([
                "localiza",
                "export",
                "votos_x.geojson",
                "--containment",
                "fuzzy",
            ])
            .is_err()
        );
    }

    #[test]
    fn selection_uses_first_feature_of_a_collection() {
        let polygon = json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]});
        let collection = json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "geometry": polygon.clone()}],
        });
        assert_eq!(
            selection_geometry(collection),
            Some(json!({"type": "Feature", "geometry": polygon.clone()}))
        );
        assert_eq!(selection_geometry(polygon.clone()), Some(polygon));
        assert_eq!(
            selection_geometry(json!({"type": "FeatureCollection", "features": []})),
            None
        );
    }

    #[test]
    fn file_stem_drops_directory_and_extension() {
        assert_eq!(
            file_stem(Path::new("candidatos/ana/votos_sobral_municipios.geojson")),
            "votos_sobral_municipios"
        );
    }
}
