//! Group totals, histogram, Pareto curve and headline figures.

use std::collections::BTreeMap;

use localiza_analytics_models::{
    GroupKey, GroupTotal, HistogramBin, ParetoCurve, ParetoPoint, Summary, SummaryMode, VoteRow,
};

/// Upper bounds (inclusive) of every histogram bin but the last.
const HISTOGRAM_UPPER_BOUNDS: [f64; 7] = [10.0, 30.0, 60.0, 100.0, 200.0, 500.0, 1000.0];

/// Histogram bin labels, in bin order.
pub const HISTOGRAM_LABELS: [&str; 8] = [
    "0-10", "11-30", "31-60", "61-100", "101-200", "201-500", "501-1000", "1000+",
];

/// Cumulative vote share the Pareto summary reports a place count for.
const PARETO_THRESHOLD: f64 = 0.8;

/// Base circle radius, in meters, for vote-sized map markers.
const CIRCLE_BASE_RADIUS: f64 = 180.0;

/// Radius growth per square root of a vote.
const CIRCLE_RADIUS_SCALE: f64 = 32.0;

/// The label a row is grouped under for `key`.
#[must_use]
pub fn key_of(row: &VoteRow, key: GroupKey) -> &str {
    match key {
        GroupKey::PollingPlace => &row.display_polling_place,
        GroupKey::Neighborhood => &row.neighborhood_or_district,
        GroupKey::Municipality => &row.display_municipality,
    }
}

/// Sums votes per group, highest first.
///
/// Rows with a blank label are left out. Ties are ordered by label.
#[must_use]
pub fn group_totals(rows: &[VoteRow], key: GroupKey) -> Vec<GroupTotal> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        let label = key_of(row, key).trim();
        if label.is_empty() {
            continue;
        }
        *sums.entry(label).or_default() += row.vote_count;
    }

    let mut totals: Vec<GroupTotal> = sums
        .into_iter()
        .map(|(key, votes)| GroupTotal {
            key: key.to_string(),
            votes,
        })
        .collect();
    totals.sort_by(|a, b| b.votes.total_cmp(&a.votes).then_with(|| a.key.cmp(&b.key)));
    totals
}

/// The `n` groups with the most votes.
#[must_use]
pub fn top_n(rows: &[VoteRow], key: GroupKey, n: usize) -> Vec<GroupTotal> {
    let mut totals = group_totals(rows, key);
    totals.truncate(n);
    totals
}

/// The `n` groups with the fewest votes, fewest first.
///
/// Ties are ordered by label.
#[must_use]
pub fn bottom_n(rows: &[VoteRow], key: GroupKey, n: usize) -> Vec<GroupTotal> {
    let mut totals = group_totals(rows, key);
    totals.sort_by(|a, b| a.votes.total_cmp(&b.votes).then_with(|| a.key.cmp(&b.key)));
    totals.truncate(n);
    totals
}

/// Counts rows per vote band (`0-10`, `11-30`, ..., `1000+`).
///
/// Every band is present, including empty ones.
#[must_use]
pub fn histogram(rows: &[VoteRow]) -> Vec<HistogramBin> {
    let mut counts = [0_usize; HISTOGRAM_LABELS.len()];
    for row in rows {
        let bin = HISTOGRAM_UPPER_BOUNDS
            .iter()
            .position(|upper| row.vote_count <= *upper)
            .unwrap_or(HISTOGRAM_LABELS.len() - 1);
        counts[bin] += 1;
    }

    HISTOGRAM_LABELS
        .iter()
        .zip(counts)
        .map(|(label, points)| HistogramBin {
            label: (*label).to_string(),
            points,
        })
        .collect()
}

/// Cumulative vote share by polling place, places ranked by votes.
///
/// Empty when the rows carry no votes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pareto(rows: &[VoteRow]) -> ParetoCurve {
    let totals = group_totals(rows, GroupKey::PollingPlace);
    let total: f64 = totals.iter().map(|t| t.votes).sum();
    if total <= 0.0 {
        return ParetoCurve::default();
    }

    let places = totals.len() as f64;
    let mut cumulative = 0.0;
    let points: Vec<ParetoPoint> = totals
        .iter()
        .enumerate()
        .map(|(i, t)| {
            cumulative += t.votes;
            ParetoPoint {
                rank: i + 1,
                place_share: (i + 1) as f64 / places,
                vote_share: cumulative / total,
            }
        })
        .collect();

    let places_for_80_percent = points
        .iter()
        .find(|p| p.vote_share >= PARETO_THRESHOLD - f64::EPSILON)
        .map(|p| p.rank);

    ParetoCurve {
        points,
        places_for_80_percent,
    }
}

/// Headline figures for a (filtered) table.
#[must_use]
pub fn summarize(rows: &[VoteRow], mode: SummaryMode) -> Summary {
    Summary {
        mode,
        total_votes: rows.iter().map(|r| r.vote_count).sum(),
        points: rows.len(),
        top: group_totals(rows, mode.group_key()).into_iter().next(),
    }
}

/// Marker radius for a vote count: `180 + sqrt(votes) * 32`.
#[must_use]
pub fn circle_radius(votes: f64) -> f64 {
    CIRCLE_BASE_RADIUS + votes.max(0.0).sqrt() * CIRCLE_RADIUS_SCALE
}
