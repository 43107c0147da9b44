use std::collections::BTreeSet;

use crate::schedule::index::{teams_on_day, MatchIndex};
use crate::schedule::slot_utils::minutes_to_time_string;
use crate::schedule::types::{IssueDetails, ScheduleIssue, Severity};

use super::{overlapping_pairs, sorted_by_start, teams_of};

/// Critical issue when a team is booked into two matches whose windows overlap.
/// A pair is reported once even if the two matches share both teams.
pub fn detect_overlapping_matches(index: &MatchIndex<'_>) -> Vec<ScheduleIssue> {
    let mut issues = Vec::new();

    for (day, day_matches) in index.by_day() {
        let mut reported: BTreeSet<(String, String)> = BTreeSet::new();

        for (team_id, team_matches) in teams_on_day(day_matches) {
            let sorted = sorted_by_start(&team_matches);

            for (earlier, later, overlap) in overlapping_pairs(&sorted) {
                let pair = (earlier.m.id.clone(), later.m.id.clone());
                if !reported.insert(pair) {
                    continue;
                }

                let team = earlier
                    .m
                    .teams()
                    .into_iter()
                    .find(|t| t.id == team_id)
                    .cloned()
                    .unwrap_or_else(|| earlier.m.team_one.clone());

                issues.push(ScheduleIssue {
                    description: format!(
                        "{} is booked into overlapping matches on {}: {} ({}-{}) and {} ({}-{})",
                        team.label(),
                        day,
                        earlier.m.matchup(),
                        minutes_to_time_string(earlier.start),
                        minutes_to_time_string(earlier.end),
                        later.m.matchup(),
                        minutes_to_time_string(later.start),
                        minutes_to_time_string(later.end)
                    ),
                    recommendation: format!(
                        "Reschedule {} so it starts after {}",
                        later.m.matchup(),
                        minutes_to_time_string(earlier.end)
                    ),
                    affected_matches: vec![earlier.m.id.clone(), later.m.id.clone()],
                    affected_teams: teams_of(&[earlier.m, later.m]),
                    severity: Severity::Critical,
                    auto_fixable: true,
                    details: IssueDetails::OverlappingMatches {
                        team,
                        day: day.clone(),
                        overlap_minutes: overlap,
                    },
                });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::detectors::test_support::fixture;
    use crate::schedule::types::DayGrouping;

    #[test]
    fn team_in_two_places_at_once() {
        let matches = vec![
            fixture("1", "2024-06-01", "10:00", "12:00", "a", "b"),
            fixture("2", "2024-06-01", "11:00", "13:00", "a", "c"),
        ];
        let index = MatchIndex::build(&matches, DayGrouping::CalendarDate);
        let issues = detect_overlapping_matches(&index);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].affected_matches, vec!["1", "2"]);
        match &issues[0].details {
            IssueDetails::OverlappingMatches {
                team,
                overlap_minutes,
                ..
            } => {
                assert_eq!(team.id, "a");
                assert_eq!(*overlap_minutes, 60);
            }
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn rematch_reported_once() {
        let matches = vec![
            fixture("1", "2024-06-01", "10:00", "12:00", "a", "b"),
            fixture("2", "2024-06-01", "11:00", "13:00", "b", "a"),
        ];
        let index = MatchIndex::build(&matches, DayGrouping::CalendarDate);
        assert_eq!(detect_overlapping_matches(&index).len(), 1);
    }

    #[test]
    fn unrelated_teams_may_overlap() {
        let matches = vec![
            fixture("1", "2024-06-01", "10:00", "12:00", "a", "b"),
            fixture("2", "2024-06-01", "10:00", "12:00", "c", "d"),
        ];
        let index = MatchIndex::build(&matches, DayGrouping::CalendarDate);
        assert!(detect_overlapping_matches(&index).is_empty());
    }

    #[test]
    fn sequential_matches_do_not_overlap() {
        let matches = vec![
            fixture("1", "2024-06-01", "10:00", "11:00", "a", "b"),
            fixture("2", "2024-06-01", "11:00", "12:00", "a", "c"),
        ];
        let index = MatchIndex::build(&matches, DayGrouping::CalendarDate);
        assert!(detect_overlapping_matches(&index).is_empty());
    }
}
