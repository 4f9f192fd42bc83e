//! Summary report for one votes file.

use std::fmt::Write as _;

use localiza_analytics::aggregate::{
    bottom_n, circle_radius, histogram, pareto, summarize, top_n,
};
use localiza_analytics::bounds::bounds_center;
use localiza_analytics::filter::{distinct_values, vote_range};
use localiza_analytics_models::{
    GroupKey, GroupTotal, HistogramBin, Summary, SummaryMode, VoteRow, VoteTable,
};
use serde::Serialize;
use serde_json::Value;

/// Everything the dashboard shows for a filtered votes file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Votes file stem.
    pub source: String,
    /// Headline figures.
    pub summary: Summary,
    /// Whole-number vote range of the rows.
    pub vote_range: Option<(i64, i64)>,
    /// Groups with the most votes, by the mode's key.
    pub top: Vec<GroupTotal>,
    /// Groups with the fewest votes, by the mode's key.
    pub bottom: Vec<GroupTotal>,
    /// Neighborhoods or districts with the most votes (polling-place files
    /// only).
    pub top_neighborhoods: Vec<GroupTotal>,
    /// Rows per vote band.
    pub histogram: Vec<HistogramBin>,
    /// Polling places needed to reach 80% of the votes.
    pub places_for_80_percent: Option<usize>,
    /// South-west and north-east corners of the map view.
    pub bounds: Option<[[f64; 2]; 2]>,
    /// Center of the map view as `(lat, lon)`.
    pub center: Option<(f64, f64)>,
    /// Values offered by the filter selectors.
    pub filter_options: FilterOptions,
    /// One circle per mapped row.
    pub markers: Vec<Marker>,
}

/// Distinct labels for each filter selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Municipality labels.
    pub municipalities: Vec<String>,
    /// Polling-place labels.
    pub polling_places: Vec<String>,
    /// Neighborhood-or-district labels.
    pub neighborhoods: Vec<String>,
}

impl FilterOptions {
    fn from_rows(rows: &[VoteRow]) -> Self {
        Self {
            municipalities: distinct_values(rows, GroupKey::Municipality),
            polling_places: distinct_values(rows, GroupKey::PollingPlace),
            neighborhoods: distinct_values(rows, GroupKey::Neighborhood),
        }
    }
}

/// A vote-sized map circle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Popup label.
    pub label: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Vote count.
    pub votes: f64,
    /// Circle radius in meters.
    pub radius: f64,
}

fn markers(rows: &[VoteRow], mode: SummaryMode) -> Vec<Marker> {
    rows.iter()
        .filter_map(|row| {
            let c = row.coordinates?;
            let label = match mode {
                SummaryMode::PollingPlace => &row.display_polling_place,
                SummaryMode::Municipality => &row.display_municipality,
            };
            Some(Marker {
                label: label.clone(),
                lat: c.lat(),
                lon: c.lon(),
                votes: row.vote_count,
                radius: circle_radius(row.vote_count),
            })
        })
        .collect()
}

impl Report {
    /// Builds the report. `bounds_source` is the collection the map view is
    /// fitted to.
    #[must_use]
    pub fn build(
        source: &str,
        table: &VoteTable,
        mode: SummaryMode,
        top: usize,
        bounds_source: &Value,
    ) -> Self {
        let rows = &table.rows;
        let key = mode.group_key();
        let bounds = bounds_center(bounds_source);

        let (top_neighborhoods, places_for_80_percent) = match mode {
            SummaryMode::PollingPlace => (
                top_n(rows, GroupKey::Neighborhood, top),
                pareto(rows).places_for_80_percent,
            ),
            SummaryMode::Municipality => (Vec::new(), None),
        };

        Self {
            source: source.to_string(),
            summary: summarize(rows, mode),
            vote_range: vote_range(rows),
            top: top_n(rows, key, top),
            bottom: bottom_n(rows, key, top),
            top_neighborhoods,
            histogram: histogram(rows),
            places_for_80_percent,
            bounds: bounds.map(|b| b.corners()),
            center: bounds.map(|b| b.center()),
            filter_options: FilterOptions::from_rows(rows),
            markers: markers(rows, mode),
        }
    }

    /// Plain-text rendering.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let s = &self.summary;
        let (points_label, top_label) = match s.mode {
            SummaryMode::PollingPlace => ("Pontos mapeados", "Top local"),
            SummaryMode::Municipality => ("Municípios", "Município destaque"),
        };

        let _ = writeln!(out, "{}", self.source);
        let _ = writeln!(out, "  Votos no filtro: {}", format_votes(s.total_votes));
        let _ = writeln!(out, "  {points_label}: {}", format_votes(usize_to_f64(s.points)));
        match &s.top {
            Some(top) => {
                let _ = writeln!(
                    out,
                    "  {top_label}: {} ({})",
                    top.key,
                    format_votes(top.votes)
                );
            }
            None => {
                let _ = writeln!(out, "  {top_label}: Sem dados");
            }
        }
        if let Some((min, max)) = self.vote_range {
            let _ = writeln!(out, "  Faixa de votos: {min} - {max}");
        }
        if let Some(n) = self.places_for_80_percent {
            let _ = writeln!(out, "  Locais para 80% dos votos: {n}");
        }
        if let (Some(bounds), Some((lat, lon))) = (self.bounds, self.center) {
            let _ = writeln!(
                out,
                "  Limites: {:?} centro ({lat:.6}, {lon:.6})",
                bounds
            );
        }

        render_group(&mut out, "Mais votados", &self.top);
        render_group(&mut out, "Menos votados", &self.bottom);
        render_group(&mut out, "Bairros/Distritos", &self.top_neighborhoods);

        let _ = writeln!(out, "\nDistribuição por faixa de votos");
        for bin in &self.histogram {
            let _ = writeln!(out, "  {:<10} {}", bin.label, bin.points);
        }
        out
    }
}

fn render_group(out: &mut String, title: &str, totals: &[GroupTotal]) {
    if totals.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}");
    for total in totals {
        let _ = writeln!(out, "  {:>10}  {}", format_votes(total.votes), total.key);
    }
}

#[allow(clippy::cast_precision_loss)]
const fn usize_to_f64(n: usize) -> f64 {
    n as f64
}

/// Formats a vote count with `.` as the thousands separator, rounding to
/// whole votes: `1234567.0` -> `"1.234.567"`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_votes(votes: f64) -> String {
    let whole = votes.round() as i64;
    let digits = whole.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
