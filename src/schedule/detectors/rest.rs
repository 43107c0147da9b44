use std::collections::BTreeMap;

use crate::schedule::index::MatchIndex;
use crate::schedule::slot_utils::{format_gap, minutes_to_time_string, MINUTES_PER_DAY};
use crate::schedule::types::{DayKey, IssueDetails, Match, ScheduleIssue, Severity};

use super::sorted_by_start;

/// High issue when a team's consecutive same-day matches leave less than
/// `min_rest_minutes` between the end of one and the start of the next.
/// A gap of exactly `min_rest_minutes` is fine.
pub fn detect_rest_time(index: &MatchIndex<'_>, min_rest_minutes: u32) -> Vec<ScheduleIssue> {
    let mut issues = Vec::new();

    for (team_id, team_matches) in index.by_team() {
        let mut per_day: BTreeMap<DayKey, Vec<&Match>> = BTreeMap::new();
        for &m in team_matches {
            if let Some(day) = index.day_of(m) {
                per_day.entry(day).or_default().push(m);
            }
        }

        for (day, day_matches) in per_day {
            let sorted = sorted_by_start(&day_matches);

            for pair in sorted.windows(2) {
                let (earlier, later) = (pair[0], pair[1]);
                let gap = i64::from(later.start) - i64::from(earlier.end);
                if gap >= i64::from(min_rest_minutes) {
                    continue;
                }

                let team = earlier
                    .m
                    .teams()
                    .into_iter()
                    .find(|t| t.id == *team_id)
                    .cloned()
                    .unwrap_or_else(|| earlier.m.team_one.clone());

                let rest = if gap > 0 {
                    format!("only {} of rest", format_gap(gap))
                } else {
                    "no rest".to_string()
                };
                let earliest_start = earlier.end + min_rest_minutes;
                let recommendation = if earliest_start < MINUTES_PER_DAY {
                    format!(
                        "Start {} at {} or later",
                        later.m.matchup(),
                        minutes_to_time_string(earliest_start)
                    )
                } else {
                    format!("Move {} to another day", later.m.matchup())
                };

                issues.push(ScheduleIssue {
                    description: format!(
                        "{} has {} between {} (ends {}) and {} (starts {}) on {}; at least {} required",
                        team.label(),
                        rest,
                        earlier.m.matchup(),
                        minutes_to_time_string(earlier.end),
                        later.m.matchup(),
                        minutes_to_time_string(later.start),
                        day,
                        format_gap(i64::from(min_rest_minutes))
                    ),
                    recommendation,
                    affected_matches: vec![earlier.m.id.clone(), later.m.id.clone()],
                    affected_teams: vec![team.clone()],
                    severity: Severity::High,
                    auto_fixable: true,
                    details: IssueDetails::RestTime {
                        team,
                        day: day.clone(),
                        gap_minutes: gap,
                        required_minutes: min_rest_minutes,
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

    fn rest_issues(matches: &[crate::schedule::types::Match]) -> Vec<ScheduleIssue> {
        let index = MatchIndex::build(matches, DayGrouping::CalendarDate);
        detect_rest_time(&index, 180)
    }

    #[test]
    fn short_gap_fires() {
        let issues = rest_issues(&[
            fixture("1", "2024-06-01", "10:00", "11:00", "a", "b"),
            fixture("2", "2024-06-01", "11:30", "12:30", "a", "c"),
        ]);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].affected_matches, vec!["1", "2"]);
        assert!(issues[0].description.contains("30 min"));
        assert!(issues[0].recommendation.contains("14:00"));
        match &issues[0].details {
            IssueDetails::RestTime { gap_minutes, .. } => assert_eq!(*gap_minutes, 30),
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn exactly_three_hours_does_not_fire() {
        let issues = rest_issues(&[
            fixture("1", "2024-06-01", "10:00", "11:00", "a", "b"),
            fixture("2", "2024-06-01", "14:00", "15:00", "a", "c"),
        ]);
        assert!(issues.is_empty());
    }

    #[test]
    fn one_minute_short_fires() {
        let issues = rest_issues(&[
            fixture("1", "2024-06-01", "10:00", "11:00", "a", "b"),
            fixture("2", "2024-06-01", "13:59", "15:00", "a", "c"),
        ]);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn overlapping_matches_have_no_rest() {
        let issues = rest_issues(&[
            fixture("1", "2024-06-01", "10:00", "12:00", "a", "b"),
            fixture("2", "2024-06-01", "11:00", "13:00", "c", "a"),
        ]);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.contains("no rest"));
    }

    #[test]
    fn unsorted_input_is_ordered_by_start() {
        let issues = rest_issues(&[
            fixture("late", "2024-06-01", "12:00", "13:00", "a", "b"),
            fixture("early", "2024-06-01", "09:00", "10:00", "a", "c"),
        ]);
        assert_eq!(issues[0].affected_matches, vec!["early", "late"]);
    }

    #[test]
    fn placeholder_team_gets_no_rest_issue() {
        let issues = rest_issues(&[
            fixture("1", "2024-06-01", "10:00", "11:00", "a", " "),
            fixture("2", "2024-06-01", "11:30", "12:30", "b", " "),
        ]);
        assert!(issues.is_empty());
    }

    #[test]
    fn other_days_of_the_team_are_separate() {
        let issues = rest_issues(&[
            fixture("1", "2024-06-01", "22:00", "23:00", "a", "b"),
            fixture("2", "2024-06-02", "08:00", "09:00", "a", "c"),
        ]);
        assert!(issues.is_empty());
    }

    #[test]
    fn late_evening_recommends_another_day() {
        let issues = rest_issues(&[
            fixture("1", "2024-06-01", "20:00", "22:00", "a", "b"),
            fixture("2", "2024-06-01", "22:30", "23:30", "a", "c"),
        ]);
        assert!(issues[0].recommendation.contains("another day"));
    }
}
