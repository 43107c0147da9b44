use std::collections::BTreeMap;

use crate::schedule::index::MatchIndex;
use crate::schedule::slot_utils::minutes_to_time_string;
use crate::schedule::types::{DayKey, IssueDetails, Match, ScheduleIssue, Severity};

use super::{overlapping_pairs, sorted_by_start, teams_of};

/// Critical issue for every pair of matches whose time windows overlap at the same venue on the same day
pub fn detect_venue_conflicts(index: &MatchIndex<'_>) -> Vec<ScheduleIssue> {
    let mut issues = Vec::new();

    for (venue, venue_matches) in index.by_venue() {
        let mut per_day: BTreeMap<DayKey, Vec<&Match>> = BTreeMap::new();
        for &m in venue_matches {
            if let Some(day) = index.day_of(m) {
                per_day.entry(day).or_default().push(m);
            }
        }

        for (day, day_matches) in per_day {
            let sorted = sorted_by_start(&day_matches);
            for (earlier, later, overlap) in overlapping_pairs(&sorted) {
                issues.push(ScheduleIssue {
                    description: format!(
                        "{} ({}-{}) and {} ({}-{}) overlap at {} on {}",
                        earlier.m.matchup(),
                        minutes_to_time_string(earlier.start),
                        minutes_to_time_string(earlier.end),
                        later.m.matchup(),
                        minutes_to_time_string(later.start),
                        minutes_to_time_string(later.end),
                        venue,
                        day
                    ),
                    recommendation: format!(
                        "Reassign {} to a free slot at {} or to another venue",
                        later.m.matchup(),
                        venue
                    ),
                    affected_matches: vec![earlier.m.id.clone(), later.m.id.clone()],
                    affected_teams: teams_of(&[earlier.m, later.m]),
                    severity: Severity::Critical,
                    auto_fixable: true,
                    details: IssueDetails::VenueConflict {
                        venue: venue.clone(),
                        day: day.clone(),
                        overlap_minutes: overlap,
                    },
                });
            }
        }
    }

    issues
}
