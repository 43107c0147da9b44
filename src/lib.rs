//! Conflict analysis for football tournament schedules: detects overloaded teams,
//! double-booked venues, short rest, lopsided days and invalid fixtures, scores the
//! schedule's health and suggests conflict-free moves.

pub mod config;
pub mod display;
pub mod error;
pub mod parser;
pub mod schedule;
pub mod store;
pub mod web;

pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, Result};
pub use schedule::{analyze, Analyzer, AnalysisResult, FixOutcome, Match, ScheduleIssue};
pub use store::{InMemoryStore, MatchStore};
