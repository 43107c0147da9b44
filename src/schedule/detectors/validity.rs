use chrono::NaiveDate;

use crate::schedule::types::{IssueDetails, Match, ScheduleIssue, Severity, ValidityProblem};

/// Per-match sanity checks: dates, time formats, time ranges and team references.
/// `today` is passed in so the check stays deterministic.
pub fn detect_invalid_dates(matches: &[Match], today: NaiveDate) -> Vec<ScheduleIssue> {
    let mut issues = Vec::new();

    for m in matches {
        match m.calendar_date() {
            None => issues.push(invalid(
                m,
                ValidityProblem::UnparseableDate,
                Severity::Medium,
                format!("{} has an unreadable date \"{}\"", m.matchup(), m.date),
                "Enter the match date as YYYY-MM-DD".to_string(),
            )),
            Some(date) if date < today && !m.completed => issues.push(invalid(
                m,
                ValidityProblem::PastDate,
                Severity::Medium,
                format!(
                    "{} is dated {} which is in the past, but no result is recorded",
                    m.matchup(),
                    date.format("%Y-%m-%d")
                ),
                "Record the result or reschedule the match to an upcoming date".to_string(),
            )),
            Some(_) => {}
        }

        let start = m.start_minutes();
        let end = m.end_minutes();
        if start.is_none() {
            issues.push(invalid(
                m,
                ValidityProblem::MalformedStart,
                Severity::Medium,
                format!("{} has an invalid start time \"{}\"", m.matchup(), m.start_time),
                "Use the HH:MM format for the start time".to_string(),
            ));
        }
        if end.is_none() {
            issues.push(invalid(
                m,
                ValidityProblem::MalformedEnd,
                Severity::Medium,
                format!("{} has an invalid end time \"{}\"", m.matchup(), m.end_time),
                "Use the HH:MM format for the end time".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                issues.push(invalid(
                    m,
                    ValidityProblem::EndNotAfterStart,
                    Severity::High,
                    format!(
                        "{} ends at {} which is not after its start at {}",
                        m.matchup(),
                        m.end_time.trim(),
                        m.start_time.trim()
                    ),
                    "Set an end time later than the start time".to_string(),
                ));
            }
        }

        if m.team_one.is_missing() || m.team_two.is_missing() {
            issues.push(invalid(
                m,
                ValidityProblem::MissingTeam,
                Severity::Medium,
                format!("Match {} is missing a team reference", m.id),
                "Assign both teams before publishing the schedule".to_string(),
            ));
        } else if m.team_one.id == m.team_two.id {
            issues.push(invalid(
                m,
                ValidityProblem::SameTeam,
                Severity::High,
                format!("Match {} lists {} on both sides", m.id, m.team_one.label()),
                "Pick two different teams for the match".to_string(),
            ));
        }
    }

    issues
}

fn invalid(
    m: &Match,
    problem: ValidityProblem,
    severity: Severity,
    description: String,
    recommendation: String,
) -> ScheduleIssue {
    ScheduleIssue {
        details: IssueDetails::InvalidDate { problem },
        severity,
        description,
        affected_matches: vec![m.id.clone()],
        affected_teams: m
            .teams()
            .into_iter()
            .filter(|t| !t.is_missing())
            .cloned()
            .collect(),
        recommendation,
        auto_fixable: false,
    }
}
