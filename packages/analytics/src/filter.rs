//! Attribute filters and filter option lists.

use std::collections::BTreeSet;

use localiza_analytics_models::{GroupKey, VoteFilter, VoteRow, VoteTable};

use crate::aggregate::key_of;

/// Whether `row` passes every constraint of `filter`.
#[must_use]
pub fn matches(row: &VoteRow, filter: &VoteFilter) -> bool {
    let accepts = |set: &BTreeSet<String>, key| set.is_empty() || set.contains(key_of(row, key));

    accepts(&filter.municipalities, GroupKey::Municipality)
        && accepts(&filter.polling_places, GroupKey::PollingPlace)
        && accepts(&filter.neighborhoods, GroupKey::Neighborhood)
        && filter.min_votes.is_none_or(|min| row.vote_count >= min)
        && filter.max_votes.is_none_or(|max| row.vote_count <= max)
}

/// Keeps the rows matching `filter`.
#[must_use]
pub fn apply_filter(table: &VoteTable, filter: &VoteFilter) -> VoteTable {
    if filter.is_empty() {
        return table.clone();
    }
    let filtered = table.retain_rows(|row| matches(row, filter));
    log::debug!("Filter kept {} of {} rows", filtered.len(), table.len());
    filtered
}

/// Whole-number `(min, max)` of the vote counts, for range sliders.
///
/// The bounds are widened to whole numbers so every row stays inside.
/// `None` when there are no rows.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn vote_range(rows: &[VoteRow]) -> Option<(i64, i64)> {
    let mut votes = rows.iter().map(|r| r.vote_count);
    let first = votes.next()?;
    let (min, max) = votes.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    Some((min.floor() as i64, max.ceil() as i64))
}

/// Sorted, de-duplicated, non-blank labels of `key`, for selection lists.
#[must_use]
pub fn distinct_values(rows: &[VoteRow], key: GroupKey) -> Vec<String> {
    rows.iter()
        .map(|row| key_of(row, key).trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use localiza_analytics_models::NeighborhoodSource;

    use super::*;
    use crate::aggregate::tests::row;

    fn table() -> VoteTable {
        VoteTable {
            rows: vec![
                row("Escola A", "Fortaleza", "Centro", 500.0),
                row("Escola B", "Fortaleza", "Meireles", 300.0),
                row("Escola C", "Caucaia", "Jurema", 50.5),
            ],
            neighborhood_source: NeighborhoodSource::Neighborhood,
        }
    }

    fn names(table: &VoteTable) -> Vec<&str> {
        table.rows.iter().map(|r| r.polling_place.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert_eq!(apply_filter(&table(), &VoteFilter::default()), table());
    }

    #[test]
    fn sets_are_ored_within_and_anded_across() {
        let filter = VoteFilter {
            municipalities: BTreeSet::from(["Fortaleza".to_string(), "Caucaia".to_string()]),
            neighborhoods: BTreeSet::from(["Centro".to_string(), "Jurema".to_string()]),
            ..VoteFilter::default()
        };
        assert_eq!(names(&apply_filter(&table(), &filter)), ["Escola A", "Escola C"]);
    }

    #[test]
    fn vote_bounds_are_inclusive() {
        let filter = VoteFilter {
            min_votes: Some(300.0),
            max_votes: Some(500.0),
            ..VoteFilter::default()
        };
        assert_eq!(names(&apply_filter(&table(), &filter)), ["Escola A", "Escola B"]);
    }

    #[test]
    fn polling_place_filter() {
        let filter = VoteFilter {
            polling_places: BTreeSet::from(["Escola B".to_string()]),
            ..VoteFilter::default()
        };
        assert_eq!(names(&apply_filter(&table(), &filter)), ["Escola B"]);
    }

    #[test]
    fn vote_range_widens_to_whole_numbers() {
        assert_eq!(vote_range(&table().rows), Some((50, 500)));
        assert_eq!(vote_range(&[row("x", "", "", 12.5)]), Some((12, 13)));
        assert_eq!(vote_range(&[]), None);
    }

    #[test]
    fn distinct_values_are_sorted_and_unique() {
        assert_eq!(
            distinct_values(&table().rows, GroupKey::Municipality),
            ["Caucaia", "Fortaleza"]
        );
    }
}
