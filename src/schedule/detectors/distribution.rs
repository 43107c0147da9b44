use crate::schedule::index::MatchIndex;
use crate::schedule::types::{DayKey, IssueDetails, ScheduleIssue, Severity};

use super::{ids_of, teams_of};

/// Flags days carrying more than `threshold` matches above the per-day mean.
/// Needs at least two days; the least-occupied other day is named as the move target.
pub fn detect_day_distribution(index: &MatchIndex<'_>, threshold: f64) -> Vec<ScheduleIssue> {
    let by_day = index.by_day();
    if by_day.len() < 2 {
        return Vec::new();
    }

    let total: usize = by_day.values().map(Vec::len).sum();
    let mean = total as f64 / by_day.len() as f64;
    let mut issues = Vec::new();

    for (day, day_matches) in by_day {
        let count = day_matches.len();
        let over = count as f64 - mean;
        if over <= threshold {
            continue;
        }

        let excess = over.ceil() as usize;
        let target_day: Option<DayKey> = by_day
            .iter()
            .filter(|(other, _)| *other != day)
            .min_by_key(|(_, matches)| matches.len())
            .map(|(other, _)| other.clone());

        let severity = if excess > 2 {
            Severity::High
        } else {
            Severity::Medium
        };

        let recommendation = match &target_day {
            Some(target) => format!(
                "Move {} match{} from {} to {}",
                excess,
                if excess == 1 { "" } else { "es" },
                day,
                target
            ),
            None => format!("Spread the matches on {} across other days", day),
        };

        issues.push(ScheduleIssue {
            description: format!(
                "{} has {} matches while the average is {:.1} per day",
                day, count, mean
            ),
            recommendation,
            affected_matches: ids_of(day_matches),
            affected_teams: teams_of(day_matches),
            severity,
            auto_fixable: target_day.is_some(),
            details: IssueDetails::DayDistribution {
                day: day.clone(),
                match_count: count,
                average: mean,
                excess,
                target_day,
            },
        });
    }

    issues
}
