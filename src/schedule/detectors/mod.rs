//! Issue detectors. Each one is a pure function over a [`MatchIndex`] and
//! knows nothing about the others; [`run_all`] simply concatenates them.

pub mod distribution;
pub mod overlap;
pub mod overload;
pub mod rest;
pub mod validity;
pub mod venue;

use chrono::NaiveDate;

use crate::config::AnalyzerConfig;
use super::index::MatchIndex;
use super::types::{Match, ScheduleIssue, TeamRef};

pub use distribution::detect_day_distribution;
pub use overlap::detect_overlapping_matches;
pub use overload::detect_team_overload;
pub use rest::detect_rest_time;
pub use validity::detect_invalid_dates;
pub use venue::detect_venue_conflicts;

/// Runs every detector and concatenates their issues in a fixed order
pub fn run_all(index: &MatchIndex<'_>, config: &AnalyzerConfig, today: NaiveDate) -> Vec<ScheduleIssue> {
    let mut issues = Vec::new();
    issues.extend(detect_team_overload(index));
    issues.extend(detect_venue_conflicts(index));
    issues.extend(detect_rest_time(index, config.min_rest_minutes));
    issues.extend(detect_day_distribution(index, config.distribution_threshold));
    issues.extend(detect_overlapping_matches(index));
    issues.extend(detect_invalid_dates(index.matches(), today));
    issues
}

/// A match whose times are well formed, with the parsed window
#[derive(Debug, Clone, Copy)]
pub(crate) struct Timed<'a> {
    pub m: &'a Match,
    pub start: u32,
    pub end: u32,
}

/// Keeps only matches with a valid window, sorted by (start, end, id)
pub(crate) fn sorted_by_start<'a>(matches: &[&'a Match]) -> Vec<Timed<'a>> {
    let mut timed: Vec<Timed<'a>> = matches
        .iter()
        .filter_map(|&m| m.window().map(|(start, end)| Timed { m, start, end }))
        .collect();
    timed.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(a.end.cmp(&b.end))
            .then_with(|| a.m.id.cmp(&b.m.id))
    });
    timed
}

/// Every pair (earlier, later, overlap minutes) in a start-sorted list whose
/// intervals overlap, not only adjacent ones
pub(crate) fn overlapping_pairs<'a>(sorted: &[Timed<'a>]) -> Vec<(Timed<'a>, Timed<'a>, u32)> {
    let mut pairs = Vec::new();
    for (i, earlier) in sorted.iter().enumerate() {
        for later in &sorted[i + 1..] {
            if later.start >= earlier.end {
                break;
            }
            let overlap = earlier.end.min(later.end) - later.start;
            pairs.push((*earlier, *later, overlap));
        }
    }
    pairs
}

/// Distinct teams of the given matches, in first-seen order
pub(crate) fn teams_of(matches: &[&Match]) -> Vec<TeamRef> {
    let mut teams: Vec<TeamRef> = Vec::new();
    for m in matches {
        for team in m.teams() {
            if !team.is_missing() && !teams.iter().any(|t| t.id == team.id) {
                teams.push(team.clone());
            }
        }
    }
    teams
}

pub(crate) fn ids_of(matches: &[&Match]) -> Vec<String> {
    matches.iter().map(|m| m.id.clone()).collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::fixture;
    use super::*;

    #[test]
    fn sorted_by_start_drops_malformed() {
        let a = fixture("a", "2024-06-01", "12:00", "13:00", "x", "y");
        let b = fixture("b", "2024-06-01", "09:00", "10:00", "x", "z");
        let bad = fixture("c", "2024-06-01", "9am", "10:00", "x", "w");
        let refs = vec![&a, &b, &bad];

        let sorted = sorted_by_start(&refs);
        let ids: Vec<&str> = sorted.iter().map(|t| t.m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn finds_non_adjacent_overlaps() {
        let long = fixture("long", "2024-06-01", "10:00", "14:00", "a", "b");
        let short = fixture("short", "2024-06-01", "11:00", "12:00", "c", "d");
        let late = fixture("late", "2024-06-01", "13:00", "14:00", "e", "f");
        let refs = vec![&long, &short, &late];
        let sorted = sorted_by_start(&refs);

        let pairs: Vec<(&str, &str, u32)> = overlapping_pairs(&sorted)
            .iter()
            .map(|(a, b, o)| (a.m.id.as_str(), b.m.id.as_str(), *o))
            .collect();
        assert_eq!(pairs, vec![("long", "short", 60), ("long", "late", 60)]);
    }

    #[test]
    fn back_to_back_is_not_overlap() {
        let a = fixture("a", "2024-06-01", "10:00", "11:00", "a", "b");
        let b = fixture("b", "2024-06-01", "11:00", "12:00", "c", "d");
        let refs = vec![&a, &b];
        assert!(overlapping_pairs(&sorted_by_start(&refs)).is_empty());
    }

    #[test]
    fn run_all_on_empty_is_empty() {
        let index = MatchIndex::build(&[], Default::default());
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(run_all(&index, &AnalyzerConfig::default(), today).is_empty());
    }
}
