use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;

use crate::error::Result;
use crate::schedule::{AnalysisResult, FixOutcome, ScheduleIssue, Severity};

fn severity_marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "!!!",
        Severity::High => "!!",
        Severity::Medium => "!",
        Severity::Low => "-",
    }
}

fn render_issue(out: &mut String, number: usize, issue: &ScheduleIssue) {
    let day = issue
        .day()
        .map(|d| format!(" on {}", d))
        .unwrap_or_default();
    let _ = writeln!(
        out,
        "{:>3}. {} [{}] {}{}",
        number,
        severity_marker(issue.severity),
        issue.severity,
        issue.kind(),
        day
    );
    let _ = writeln!(out, "     {}", issue.description);
    let _ = writeln!(out, "     Matches: {}", issue.affected_matches.join(", "));
    let _ = writeln!(
        out,
        "     Fix: {}{}",
        issue.recommendation,
        if issue.auto_fixable { " (auto-fixable)" } else { "" }
    );
}

/// Plain-text report. Issues are numbered from 1 in result order; `fix` takes the same numbers.
pub fn render_report(result: &AnalysisResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "** Schedule Analysis **");
    let _ = writeln!(out, "Score: {}/100", result.score);
    let _ = writeln!(out, "{}", result.summary);
    let _ = writeln!(out, "Matches analyzed: {}", result.total_matches);

    if !result.has_issues {
        return out;
    }

    let by_severity: Vec<String> = result
        .counts_by_severity
        .iter()
        .rev()
        .map(|(severity, count)| format!("{} {}", count, severity))
        .collect();
    let _ = writeln!(out, "Issues: {} ({})", result.issues.len(), by_severity.join(", "));
    let _ = writeln!(out, "Auto-fixable: {}", result.auto_fixable_count);

    if !result.affected_days.is_empty() {
        let days: Vec<String> = result.affected_days.iter().map(|d| d.to_string()).collect();
        let _ = writeln!(out, "Affected days: {}", days.join(", "));
    }
    if !result.affected_teams.is_empty() {
        let teams: Vec<&str> = result.affected_teams.iter().map(|t| t.label()).collect();
        let _ = writeln!(out, "Affected teams: {}", teams.join(", "));
    }

    let _ = writeln!(out);
    for (i, issue) in result.issues.iter().enumerate() {
        render_issue(&mut out, i + 1, issue);
    }
    out
}

/// Prints the report to stdout
pub fn print_analysis(result: &AnalysisResult) {
    print!("{}", render_report(result));
}

/// Writes the report to a file
pub fn write_report_to_file(result: &AnalysisResult, filename: &str) -> Result<()> {
    let mut file = File::create(filename)?;
    file.write_all(render_report(result).as_bytes())?;
    Ok(())
}

pub fn render_fix_outcome(outcome: &FixOutcome) -> String {
    match outcome {
        FixOutcome::Move { action } => {
            let mut line = format!(
                "Move match {} to {}, {}-{}",
                action.match_id, action.target_day, action.new_start, action.new_end
            );
            if let Some(venue) = &action.new_venue {
                let _ = write!(line, " at {}", venue);
            }
            line
        }
        FixOutcome::Unresolvable { reason } => format!("No automatic fix: {}", reason),
    }
}

pub fn print_fix_outcome(outcome: &FixOutcome) {
    println!("{}", render_fix_outcome(outcome));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Analyzer, DayKey, FixAction, FixKind};
    use crate::schedule::detectors::test_support::{at_venue, fixture};
    use chrono::NaiveDate;

    #[test]
    fn clean_report_has_no_issue_section() {
        let analyzer = Analyzer::default().as_of(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let report = render_report(&analyzer.analyze(&[]));

        assert!(report.contains("Score: 100/100"));
        assert!(report.contains("optimized"));
        assert!(!report.contains("Issues:"));
    }

    #[test]
    fn report_numbers_issues_in_order() {
        let matches = vec![
            at_venue(fixture("1", "2024-06-01", "10:00", "11:00", "a", "b"), "Field 1"),
            at_venue(fixture("2", "2024-06-01", "10:30", "11:30", "c", "d"), "Field 1"),
        ];
        let analyzer = Analyzer::default().as_of(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let report = render_report(&analyzer.analyze(&matches));

        assert!(report.contains("Score: 80/100"));
        assert!(report.contains("Issues: 1 (1 critical)"));
        assert!(report.contains("  1. !!! [critical] venue_conflict on 2024-06-01"));
        assert!(report.contains("Matches: 1, 2"));
        assert!(report.contains("Affected teams: Team A, Team B, Team C, Team D"));
    }

    #[test]
    fn fix_outcome_lines() {
        let action = FixAction {
            match_id: "7".to_string(),
            kind: FixKind::ReassignSlot,
            from_day: None,
            target_day: DayKey::MatchDay("R2".to_string()),
            new_start: "14:00".to_string(),
            new_end: "15:00".to_string(),
            new_venue: Some("Field 2".to_string()),
        };
        assert_eq!(
            render_fix_outcome(&FixOutcome::Move { action }),
            "Move match 7 to match day R2, 14:00-15:00 at Field 2"
        );
        assert_eq!(
            render_fix_outcome(&FixOutcome::unresolvable("no free day")),
            "No automatic fix: no free day"
        );
    }
}
