use crate::schedule::index::{teams_on_day, MatchIndex};
use crate::schedule::types::{IssueDetails, ScheduleIssue, Severity};

use super::ids_of;

/// One issue per team per day when a team has more than one match that day.
/// Critical above two matches, medium at exactly two.
pub fn detect_team_overload(index: &MatchIndex<'_>) -> Vec<ScheduleIssue> {
    let mut issues = Vec::new();

    for (day, day_matches) in index.by_day() {
        for (team_id, team_matches) in teams_on_day(day_matches) {
            if team_matches.len() < 2 {
                continue;
            }

            let first = team_matches[0];
            let team = first
                .teams()
                .into_iter()
                .find(|t| t.id == team_id)
                .cloned()
                .unwrap_or_else(|| first.team_one.clone());

            let count = team_matches.len();
            let severity = if count > 2 {
                Severity::Critical
            } else {
                Severity::Medium
            };

            issues.push(ScheduleIssue {
                description: format!(
                    "{} is scheduled for {} matches on {}",
                    team.label(),
                    count,
                    day
                ),
                recommendation: format!(
                    "Move {} of {}'s matches on {} to a day where neither team plays",
                    if count > 2 { "some" } else { "one" },
                    team.label(),
                    day
                ),
                affected_matches: ids_of(&team_matches),
                affected_teams: vec![team.clone()],
                severity,
                auto_fixable: true,
                details: IssueDetails::TeamOverload {
                    team,
                    day: day.clone(),
                    match_count: count,
                },
            });
        }
    }

    issues
}
