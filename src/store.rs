//! Fix application. The analyzer never mutates matches itself; a store
//! applies a chosen fix and the caller re-runs analysis afterwards.

use tracing::{info, warn};

use crate::schedule::fixes::apply_fix_action;
use crate::schedule::types::{FixAction, Match, ScheduleIssue};

pub trait MatchStore {
    fn matches(&self) -> &[Match];

    /// Applies `action` as the remedy for `issue`. Returns true on success.
    fn apply_fix(&mut self, issue: &ScheduleIssue, action: &FixAction) -> bool;
}

/// Keeps the match snapshot in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    matches: Vec<Match>,
}

impl InMemoryStore {
    pub fn new(matches: Vec<Match>) -> Self {
        Self { matches }
    }
}

impl MatchStore for InMemoryStore {
    fn matches(&self) -> &[Match] {
        &self.matches
    }

    fn apply_fix(&mut self, issue: &ScheduleIssue, action: &FixAction) -> bool {
        // Verify the action belongs to the issue it claims to fix
        if !issue.involves_match(&action.match_id) {
            warn!(
                match_id = %action.match_id,
                kind = %issue.kind(),
                "fix does not target a match of the issue"
            );
            return false;
        }

        let applied = apply_fix_action(&mut self.matches, action);
        if applied {
            info!(
                match_id = %action.match_id,
                target_day = %action.target_day,
                start = %action.new_start,
                end = %action.new_end,
                "fix applied"
            );
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::analyzer::Analyzer;
    use crate::schedule::detectors::test_support::fixture;
    use crate::schedule::types::{DayKey, FixKind, IssueKind};
    use chrono::NaiveDate;

    #[test]
    fn applying_a_fix_clears_the_issue_on_reanalysis() {
        let analyzer = Analyzer::default().as_of(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let mut store = InMemoryStore::new(vec![
            fixture("1", "2024-06-01", "10:00", "11:00", "a", "b"),
            fixture("2", "2024-06-01", "11:30", "12:30", "a", "c"),
            fixture("3", "2024-06-02", "10:00", "11:00", "d", "e"),
        ]);

        let before = analyzer.analyze(store.matches());
        let overload = before
            .issues_of_kind(IssueKind::TeamOverload)
            .next()
            .unwrap()
            .clone();
        let action = analyzer
            .suggest_fix(store.matches(), &overload)
            .action()
            .cloned()
            .expect("day two is free for teams a and c");

        assert!(store.apply_fix(&overload, &action));
        let after = analyzer.analyze(store.matches());
        assert!(!after.has_issues, "remaining issues: {:?}", after.issues);
        assert!(after.score > before.score);
    }

    #[test]
    fn rejects_action_for_other_match() {
        let mut store = InMemoryStore::new(vec![
            fixture("1", "2024-06-01", "10:00", "11:00", "a", "b"),
            fixture("2", "2024-06-01", "11:30", "12:30", "a", "c"),
            fixture("9", "2024-06-03", "10:00", "11:00", "x", "y"),
        ]);
        let analyzer = Analyzer::default().as_of(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let issue = analyzer
            .analyze(store.matches())
            .issues_of_kind(IssueKind::RestTime)
            .next()
            .unwrap()
            .clone();

        let action = FixAction {
            match_id: "9".to_string(),
            kind: FixKind::MoveDay,
            from_day: None,
            target_day: DayKey::Date(NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()),
            new_start: "10:00".to_string(),
            new_end: "11:00".to_string(),
            new_venue: None,
        };
        assert!(!store.apply_fix(&issue, &action));
        assert_eq!(store.matches()[2].date, "2024-06-03");
    }
}
