use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::config::AnalyzerConfig;
use super::detectors::run_all;
use super::fixes::{suggest_fix, NoSlots, SlotProvider};
use super::index::MatchIndex;
use super::scoring::build_result;
use super::types::{AnalysisResult, DayKey, FixOutcome, Match, ScheduleIssue};

/// Runs the detectors over a match snapshot and builds the result.
///
/// Nothing is cached between calls: every analysis starts from the matches it is given.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
    today: Option<NaiveDate>,
    known_days: Vec<DayKey>,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            today: None,
            known_days: Vec::new(),
        }
    }

    /// Pins "today" for the past-date check; otherwise the local date is read per analysis
    pub fn as_of(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Days of the tournament that count even without fixtures (distribution targets, fix targets)
    pub fn with_known_days<I>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = DayKey>,
    {
        self.known_days.extend(days);
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn index<'a>(&self, matches: &'a [Match]) -> MatchIndex<'a> {
        MatchIndex::build(matches, self.config.day_grouping).with_known_days(self.known_days.iter().cloned())
    }

    pub fn analyze(&self, matches: &[Match]) -> AnalysisResult {
        let index = self.index(matches);
        let issues = run_all(&index, &self.config, self.today());
        let result = build_result(issues, matches.len(), &self.config.penalties);

        debug!(
            matches = matches.len(),
            days = index.by_day().len(),
            issues = result.issues.len(),
            score = result.score,
            "schedule analyzed"
        );
        result
    }

    pub fn suggest_fix(&self, matches: &[Match], issue: &ScheduleIssue) -> FixOutcome {
        self.suggest_fix_with(matches, issue, &NoSlots)
    }

    /// Like [`Analyzer::suggest_fix`], with a slot store for venue and overlap issues
    pub fn suggest_fix_with(&self, matches: &[Match], issue: &ScheduleIssue, slots: &dyn SlotProvider) -> FixOutcome {
        let index = self.index(matches);
        suggest_fix(&index, issue, self.config.min_rest_minutes, slots)
    }
}

/// Analyzes with the default configuration and today's date
pub fn analyze(matches: &[Match]) -> AnalysisResult {
    Analyzer::default().analyze(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::detectors::test_support::fixture;
    use crate::schedule::types::{DayGrouping, HealthTier, IssueKind};

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn empty_list_is_clean() {
        let result = Analyzer::default().as_of(june(1)).analyze(&[]);
        assert!(result.issues.is_empty());
        assert_eq!(result.score, 100);
        assert!(!result.has_issues);
        assert_eq!(result.tier, HealthTier::Optimized);
    }

    #[test]
    fn analysis_is_idempotent() {
        let matches = vec![
            fixture("1", "2024-06-01", "10:00", "11:00", "a", "b"),
            fixture("2", "2024-06-01", "11:30", "12:30", "a", "c"),
            fixture("3", "2024-06-02", "bad", "12:30", "d", "e"),
        ];
        let analyzer = Analyzer::default().as_of(june(1));
        assert_eq!(analyzer.analyze(&matches), analyzer.analyze(&matches));
    }

    #[test]
    fn grouping_mode_applies_to_every_detector() {
        let mut first = fixture("1", "2024-06-01", "10:00", "11:00", "a", "b");
        first.match_day_id = Some("R1".to_string());
        let mut second = fixture("2", "2024-06-02", "11:00", "12:00", "a", "c");
        second.match_day_id = Some("R1".to_string());
        let matches = vec![first, second];

        let by_date = Analyzer::default().as_of(june(1)).analyze(&matches);
        assert!(!by_date.has_issues);

        let config = AnalyzerConfig {
            day_grouping: DayGrouping::MatchDay,
            ..AnalyzerConfig::default()
        };
        let by_round = Analyzer::new(config).as_of(june(1)).analyze(&matches);
        assert_eq!(by_round.counts_by_type.get(&IssueKind::TeamOverload), Some(&1));
        assert_eq!(by_round.counts_by_type.get(&IssueKind::RestTime), Some(&1));
        assert!(by_round
            .affected_days
            .contains(&DayKey::MatchDay("R1".to_string())));
    }

    #[test]
    fn result_round_trips_through_json() {
        let mut first = fixture("1", "2024-06-01", "10:00", "11:00", "a", "b");
        first.venue = Some("Field 1".to_string());
        first.match_day_id = Some("2024-06-01".to_string());
        let mut second = fixture("2", "2024-06-02", "10:30", "11:30", "a", "c");
        second.venue = Some("Field 1".to_string());
        second.match_day_id = Some("2024-06-01".to_string());
        let matches = vec![first, second];

        let config = AnalyzerConfig {
            day_grouping: DayGrouping::MatchDay,
            ..AnalyzerConfig::default()
        };
        let result = Analyzer::new(config).as_of(june(1)).analyze(&matches);
        assert!(result
            .affected_days
            .contains(&DayKey::MatchDay("2024-06-01".to_string())));

        let json = serde_json::to_string(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn known_days_become_fix_targets() {
        let matches = vec![
            fixture("1", "2024-06-01", "10:00", "11:00", "a", "b"),
            fixture("2", "2024-06-01", "15:00", "16:00", "a", "c"),
        ];
        let analyzer = Analyzer::default()
            .as_of(june(1))
            .with_known_days([DayKey::Date(june(8))]);
        let result = analyzer.analyze(&matches);
        let overload = result.issues_of_kind(IssueKind::TeamOverload).next().unwrap();

        let outcome = analyzer.suggest_fix(&matches, overload);
        let action = outcome.action().expect("a free day exists");
        assert_eq!(action.target_day, DayKey::Date(june(8)));
    }

    #[test]
    fn custom_rest_threshold() {
        let matches = vec![
            fixture("1", "2024-06-01", "10:00", "11:00", "a", "b"),
            fixture("2", "2024-06-01", "13:00", "14:00", "a", "c"),
        ];
        let relaxed = AnalyzerConfig {
            min_rest_minutes: 120,
            ..AnalyzerConfig::default()
        };
        let result = Analyzer::new(relaxed).as_of(june(1)).analyze(&matches);
        assert_eq!(result.issues_of_kind(IssueKind::RestTime).count(), 0);
        assert_eq!(result.issues_of_kind(IssueKind::TeamOverload).count(), 1);
    }
}
