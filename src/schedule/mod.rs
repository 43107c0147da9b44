pub mod types;
pub mod slot_utils;
pub mod index;
pub mod detectors;
pub mod scoring;
pub mod fixes;
pub mod analyzer;

pub use types::{
    AnalysisResult, DayGrouping, DayKey, FixAction, FixKind, FixOutcome, HealthTier, IssueDetails,
    IssueKind, Match, ScheduleIssue, Severity, TeamRef, ValidityProblem,
};
pub use index::MatchIndex;
pub use fixes::{apply_fix_action, NoSlots, OpenSlots, Slot, SlotProvider};
pub use analyzer::{analyze, Analyzer};
