use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::slot_utils::{parse_match_date, parse_time_to_minutes};

/// Minimal team identity as referenced by a match
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl TeamRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Blank or whitespace-only ids stand for "no team"
    pub fn is_missing(&self) -> bool {
        self.id.trim().is_empty()
    }

    /// Display name, falling back to the id when no name was supplied
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// A scheduled or completed fixture.
///
/// Dates and times are kept exactly as received so that malformed values can be
/// reported as issues instead of being rejected at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub round: Option<String>,
    #[serde(default)]
    pub match_day_id: Option<String>,
    pub team_one: TeamRef,
    pub team_two: TeamRef,
    #[serde(default)]
    pub completed: bool,
}

impl Match {
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_match_date(&self.date)
    }

    pub fn start_minutes(&self) -> Option<u32> {
        parse_time_to_minutes(&self.start_time)
    }

    pub fn end_minutes(&self) -> Option<u32> {
        parse_time_to_minutes(&self.end_time)
    }

    /// Start/end in minutes, only when both parse and end is after start
    pub fn window(&self) -> Option<(u32, u32)> {
        let start = self.start_minutes()?;
        let end = self.end_minutes()?;
        (end > start).then_some((start, end))
    }

    pub fn teams(&self) -> [&TeamRef; 2] {
        [&self.team_one, &self.team_two]
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.team_one.id == team_id || self.team_two.id == team_id
    }

    pub fn shares_team(&self, other: &Match) -> bool {
        self.teams()
            .iter()
            .any(|t| !t.is_missing() && other.involves(&t.id))
    }

    /// Trimmed venue name; blank venues count as no venue
    pub fn venue_name(&self) -> Option<&str> {
        self.venue
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn matchup(&self) -> String {
        format!("{} vs {}", self.team_one.label(), self.team_two.label())
    }
}

/// Identity of a "day" for grouping purposes.
/// Serialized with an explicit kind so a date-like match-day id stays a match-day id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DayKey {
    Date(NaiveDate),
    MatchDay(String),
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayKey::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DayKey::MatchDay(id) => write!(f, "match day {}", id),
        }
    }
}

/// Which attribute of a match decides what "the same day" means.
/// One mode is used for a whole analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayGrouping {
    #[default]
    CalendarDate,
    MatchDay,
}

impl DayGrouping {
    /// Day key of a match, or None when the match carries no usable day
    pub fn key_for(self, m: &Match) -> Option<DayKey> {
        match self {
            DayGrouping::CalendarDate => m.calendar_date().map(DayKey::Date),
            DayGrouping::MatchDay => m
                .match_day_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| DayKey::MatchDay(id.to_string())),
        }
    }

    /// Reads a day written as plain text (a date or a match-day id) under this mode
    pub fn parse_day(self, raw: &str) -> Option<DayKey> {
        match self {
            DayGrouping::CalendarDate => parse_match_date(raw).map(DayKey::Date),
            DayGrouping::MatchDay => {
                let id = raw.trim();
                (!id.is_empty()).then(|| DayKey::MatchDay(id.to_string()))
            }
        }
    }
}

/// Ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    TeamOverload,
    VenueConflict,
    RestTime,
    DayDistribution,
    InvalidDate,
    OverlappingMatches,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::TeamOverload => "team_overload",
            IssueKind::VenueConflict => "venue_conflict",
            IssueKind::RestTime => "rest_time",
            IssueKind::DayDistribution => "day_distribution",
            IssueKind::InvalidDate => "invalid_date",
            IssueKind::OverlappingMatches => "overlapping_matches",
        };
        f.write_str(name)
    }
}

/// What the validity detector found wrong with a single match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityProblem {
    UnparseableDate,
    PastDate,
    MalformedStart,
    MalformedEnd,
    EndNotAfterStart,
    MissingTeam,
    SameTeam,
}

/// Type-specific payload of an issue, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum IssueDetails {
    TeamOverload {
        team: TeamRef,
        day: DayKey,
        match_count: usize,
    },
    VenueConflict {
        venue: String,
        day: DayKey,
        overlap_minutes: u32,
    },
    RestTime {
        team: TeamRef,
        day: DayKey,
        gap_minutes: i64,
        required_minutes: u32,
    },
    DayDistribution {
        day: DayKey,
        match_count: usize,
        average: f64,
        excess: usize,
        target_day: Option<DayKey>,
    },
    InvalidDate {
        problem: ValidityProblem,
    },
    OverlappingMatches {
        team: TeamRef,
        day: DayKey,
        overlap_minutes: u32,
    },
}

impl IssueDetails {
    pub fn kind(&self) -> IssueKind {
        match self {
            IssueDetails::TeamOverload { .. } => IssueKind::TeamOverload,
            IssueDetails::VenueConflict { .. } => IssueKind::VenueConflict,
            IssueDetails::RestTime { .. } => IssueKind::RestTime,
            IssueDetails::DayDistribution { .. } => IssueKind::DayDistribution,
            IssueDetails::InvalidDate { .. } => IssueKind::InvalidDate,
            IssueDetails::OverlappingMatches { .. } => IssueKind::OverlappingMatches,
        }
    }

    pub fn day(&self) -> Option<&DayKey> {
        match self {
            IssueDetails::TeamOverload { day, .. }
            | IssueDetails::VenueConflict { day, .. }
            | IssueDetails::RestTime { day, .. }
            | IssueDetails::DayDistribution { day, .. }
            | IssueDetails::OverlappingMatches { day, .. } => Some(day),
            IssueDetails::InvalidDate { .. } => None,
        }
    }
}

/// A detected scheduling problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleIssue {
    #[serde(flatten)]
    pub details: IssueDetails,
    pub severity: Severity,
    pub description: String,
    /// Match ids, in the order they are implicated
    pub affected_matches: Vec<String>,
    #[serde(default)]
    pub affected_teams: Vec<TeamRef>,
    pub recommendation: String,
    pub auto_fixable: bool,
}

impl ScheduleIssue {
    pub fn kind(&self) -> IssueKind {
        self.details.kind()
    }

    pub fn day(&self) -> Option<&DayKey> {
        self.details.day()
    }

    pub fn involves_match(&self, match_id: &str) -> bool {
        self.affected_matches.iter().any(|id| id == match_id)
    }
}

/// Tiered health label derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthTier {
    Optimized,
    Good,
    NeedsAttention,
    Serious,
    Reconsider,
}

/// Output of one full analysis pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub issues: Vec<ScheduleIssue>,
    pub score: u8,
    pub tier: HealthTier,
    pub summary: String,
    pub has_issues: bool,
    pub total_matches: usize,
    pub counts_by_type: BTreeMap<IssueKind, usize>,
    pub counts_by_severity: BTreeMap<Severity, usize>,
    pub affected_teams: BTreeSet<TeamRef>,
    pub affected_days: BTreeSet<DayKey>,
    pub auto_fixable_count: usize,
}

impl AnalysisResult {
    pub fn issues_with_severity(&self, severity: Severity) -> impl Iterator<Item = &ScheduleIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn issues_of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &ScheduleIssue> {
        self.issues.iter().filter(move |i| i.kind() == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    /// Same times, different day
    MoveDay,
    /// Same day, later start
    ShiftTime,
    /// Slot supplied by a caller's slot store
    ReassignSlot,
}

/// A concrete move instruction for one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixAction {
    pub match_id: String,
    pub kind: FixKind,
    pub from_day: Option<DayKey>,
    pub target_day: DayKey,
    pub new_start: String,
    pub new_end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_venue: Option<String>,
}

/// Result of asking the fix engine for a remediation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FixOutcome {
    Move { action: FixAction },
    Unresolvable { reason: String },
}

impl FixOutcome {
    pub fn unresolvable(reason: impl Into<String>) -> Self {
        FixOutcome::Unresolvable {
            reason: reason.into(),
        }
    }

    pub fn action(&self) -> Option<&FixAction> {
        match self {
            FixOutcome::Move { action } => Some(action),
            FixOutcome::Unresolvable { .. } => None,
        }
    }
}
