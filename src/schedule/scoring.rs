use std::collections::{BTreeMap, BTreeSet};

use crate::config::SeverityPenalties;
use super::types::{AnalysisResult, HealthTier, ScheduleIssue, Severity};

/// Health score in [0, 100]: 100 minus per-severity penalties, with the total penalty capped at 100.
///
/// The match count does not enter the formula: an issue-free schedule scores 100
/// whether it holds no matches or many.
pub fn score(issues: &[ScheduleIssue], _total_matches: usize, penalties: &SeverityPenalties) -> u8 {
    let penalty: u32 = issues
        .iter()
        .map(|i| penalties.for_severity(i.severity))
        .fold(0u32, u32::saturating_add)
        .min(100);
    (100 - penalty) as u8
}

pub fn tier(score: u8, issue_count: usize) -> HealthTier {
    match (issue_count, score) {
        (0, _) => HealthTier::Optimized,
        (_, s) if s >= 80 => HealthTier::Good,
        (_, s) if s >= 60 => HealthTier::NeedsAttention,
        (_, s) if s >= 40 => HealthTier::Serious,
        _ => HealthTier::Reconsider,
    }
}

pub fn summarize(score: u8, issue_count: usize) -> String {
    match tier(score, issue_count) {
        HealthTier::Optimized => "Schedule is optimized: no conflicts detected".to_string(),
        HealthTier::Good => format!(
            "Schedule is in good shape with minor issues ({} found)",
            issue_count
        ),
        HealthTier::NeedsAttention => {
            format!("Schedule needs attention: {} issues found", issue_count)
        }
        HealthTier::Serious => format!(
            "Schedule has serious issues: {} problems should be resolved",
            issue_count
        ),
        HealthTier::Reconsider => format!(
            "Schedule needs a full reconsideration: {} issues found",
            issue_count
        ),
    }
}

/// Builds the full result from detector output. Issues are ordered most severe first;
/// the sort is stable so detector order is kept within a severity.
pub fn build_result(
    mut issues: Vec<ScheduleIssue>,
    total_matches: usize,
    penalties: &SeverityPenalties,
) -> AnalysisResult {
    issues.sort_by(|a, b| b.severity.cmp(&a.severity));

    let score = score(&issues, total_matches, penalties);
    let mut counts_by_type = BTreeMap::new();
    let mut counts_by_severity = BTreeMap::new();
    let mut affected_teams = BTreeSet::new();
    let mut affected_days = BTreeSet::new();

    for issue in &issues {
        *counts_by_type.entry(issue.kind()).or_insert(0) += 1;
        *counts_by_severity.entry(issue.severity).or_insert(0) += 1;
        affected_teams.extend(issue.affected_teams.iter().cloned());
        if let Some(day) = issue.day() {
            affected_days.insert(day.clone());
        }
    }

    AnalysisResult {
        score,
        tier: tier(score, issues.len()),
        summary: summarize(score, issues.len()),
        has_issues: !issues.is_empty(),
        total_matches,
        auto_fixable_count: issues.iter().filter(|i| i.auto_fixable).count(),
        counts_by_type,
        counts_by_severity,
        affected_teams,
        affected_days,
        issues,
    }
}

/// Narrows a result to the issues of one severity.
///
/// The issue list and everything derived from it (flags, counts, affected sets) are
/// recomputed. Score, tier, summary and match count keep describing the whole schedule.
pub fn filter_by_severity(result: &AnalysisResult, severity: Severity) -> AnalysisResult {
    let issues: Vec<ScheduleIssue> = result.issues_with_severity(severity).cloned().collect();
    let narrowed = build_result(issues, result.total_matches, &SeverityPenalties::default());

    AnalysisResult {
        score: result.score,
        tier: result.tier,
        summary: result.summary.clone(),
        ..narrowed
    }
}
