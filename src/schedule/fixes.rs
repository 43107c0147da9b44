use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::index::MatchIndex;
use super::slot_utils::{minutes_to_time_string, parse_time_to_minutes, MINUTES_PER_DAY};
use super::types::{
    DayKey, FixAction, FixKind, FixOutcome, IssueDetails, Match, ScheduleIssue, TeamRef,
};

/// A slot offered by the caller's slot store as a possible new home for a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// A date or a match-day id, read under the analysis's day grouping
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub venue: Option<String>,
}

/// Source of candidate slots for venue-conflict and overlap fixes.
/// Slot reassignment depends on the caller's slot model, so the engine only
/// verifies what the provider offers.
pub trait SlotProvider {
    /// Candidate slots for `m`, in order of preference
    fn candidate_slots(&self, m: &Match) -> Vec<Slot>;
}

/// Offers nothing; slot-based fixes come back unresolvable
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSlots;

impl SlotProvider for NoSlots {
    fn candidate_slots(&self, _m: &Match) -> Vec<Slot> {
        Vec::new()
    }
}

/// The same list of open slots offered to every match
#[derive(Debug, Clone, Default)]
pub struct OpenSlots(pub Vec<Slot>);

impl SlotProvider for OpenSlots {
    fn candidate_slots(&self, _m: &Match) -> Vec<Slot> {
        self.0.clone()
    }
}

/// Where a match would end up after a fix
struct Placement<'p> {
    day: &'p DayKey,
    window: Option<(u32, u32)>,
    venue: Option<&'p str>,
}

/// Reason the placement would create a conflict, or None when it is safe.
///
/// Moving to another day is rejected if either team already plays there.
/// Staying on the same day requires the minimum rest against the teams' other
/// matches. In both cases the venue must be free for the new window.
fn placement_conflict(
    index: &MatchIndex<'_>,
    moving: &Match,
    placement: &Placement<'_>,
    min_rest: u32,
) -> Option<String> {
    let changes_day = index.day_of(moving).as_ref() != Some(placement.day);

    for other in index.matches_on(placement.day) {
        if other.id == moving.id {
            continue;
        }

        if let Some(team) = shared_team(moving, other) {
            if changes_day {
                return Some(format!("{} already plays on {}", team.label(), placement.day));
            }
            if let (Some((start, end)), Some((other_start, other_end))) = (placement.window, other.window()) {
                let gap = if start >= other_end {
                    start - other_end
                } else if other_start >= end {
                    other_start - end
                } else {
                    return Some(format!("{} would overlap {}", moving.matchup(), other.matchup()));
                };
                if gap < min_rest {
                    return Some(format!(
                        "{} would get too little rest next to {}",
                        team.label(),
                        other.matchup()
                    ));
                }
            }
        }

        if let (Some(venue), Some(other_venue)) = (placement.venue, other.venue_name()) {
            if venue == other_venue {
                if let (Some((start, end)), Some((other_start, other_end))) = (placement.window, other.window()) {
                    if start < other_end && other_start < end {
                        return Some(format!("{} is busy with {}", venue, other.matchup()));
                    }
                }
            }
        }
    }

    None
}

fn shared_team<'m>(moving: &'m Match, other: &Match) -> Option<&'m TeamRef> {
    moving
        .teams()
        .into_iter()
        .find(|t| !t.is_missing() && other.involves(&t.id))
}

fn affected<'a>(index: &MatchIndex<'a>, issue: &ScheduleIssue) -> Vec<&'a Match> {
    issue
        .affected_matches
        .iter()
        .filter_map(|id| index.find(id))
        .collect()
}

/// Latest start first; unreadable starts go last. Completed matches never move.
fn movable_latest_first<'a>(matches: impl IntoIterator<Item = &'a Match>) -> Vec<&'a Match> {
    let mut movable: Vec<&Match> = matches.into_iter().filter(|m| !m.completed).collect();
    movable.sort_by(|a, b| b.start_minutes().cmp(&a.start_minutes()));
    movable
}

fn move_day(m: &Match, from: &DayKey, target: &DayKey) -> FixOutcome {
    FixOutcome::Move {
        action: FixAction {
            match_id: m.id.clone(),
            kind: FixKind::MoveDay,
            from_day: Some(from.clone()),
            target_day: target.clone(),
            new_start: m.start_time.trim().to_string(),
            new_end: m.end_time.trim().to_string(),
            new_venue: None,
        },
    }
}

/// Computes one remediation for `issue` that introduces no new conflict
pub fn suggest_fix(
    index: &MatchIndex<'_>,
    issue: &ScheduleIssue,
    min_rest: u32,
    slots: &dyn SlotProvider,
) -> FixOutcome {
    if !issue.auto_fixable {
        return FixOutcome::unresolvable(format!(
            "{} issues need manual resolution",
            issue.kind()
        ));
    }

    let outcome = match &issue.details {
        IssueDetails::TeamOverload { team, day, .. } => fix_team_overload(index, issue, team, day),
        IssueDetails::RestTime { day, .. } => fix_rest_time(index, issue, day, min_rest),
        IssueDetails::DayDistribution {
            day, target_day, ..
        } => fix_day_distribution(index, day, target_day.as_ref()),
        IssueDetails::VenueConflict { .. } | IssueDetails::OverlappingMatches { .. } => {
            reassign_slot(index, issue, min_rest, slots)
        }
        IssueDetails::InvalidDate { .. } => {
            FixOutcome::unresolvable("invalid dates and times must be corrected manually")
        }
    };

    debug!(kind = %issue.kind(), ?outcome, "fix suggestion computed");
    outcome
}

fn fix_team_overload(index: &MatchIndex<'_>, issue: &ScheduleIssue, team: &TeamRef, day: &DayKey) -> FixOutcome {
    let candidates = movable_latest_first(
        affected(index, issue)
            .into_iter()
            .filter(|m| m.involves(&team.id)),
    );

    for m in candidates {
        for target in index.days().filter(|d| *d != day) {
            let placement = Placement {
                day: target,
                window: m.window(),
                venue: m.venue_name(),
            };
            // Team fixtures on the target day already rule it out, so rest does not matter here
            if placement_conflict(index, m, &placement, 0).is_none() {
                return move_day(m, day, target);
            }
        }
    }

    FixOutcome::unresolvable(format!(
        "no day found where both teams of one of {}'s matches are free",
        team.label()
    ))
}

fn fix_rest_time(index: &MatchIndex<'_>, issue: &ScheduleIssue, day: &DayKey, min_rest: u32) -> FixOutcome {
    let matches = affected(index, issue);
    let (earlier, later) = match matches.as_slice() {
        [earlier, later, ..] => (*earlier, *later),
        _ => return FixOutcome::unresolvable("the matches of this issue no longer exist"),
    };
    if later.completed {
        return FixOutcome::unresolvable(format!("{} is already completed", later.matchup()));
    }

    let (Some((_, earlier_end)), Some((later_start, later_end))) = (earlier.window(), later.window()) else {
        return FixOutcome::unresolvable("match times are not well formed");
    };

    let new_start = earlier_end + min_rest;
    let new_end = new_start + (later_end - later_start);
    if new_end >= MINUTES_PER_DAY {
        return FixOutcome::unresolvable(format!(
            "shifting {} would run past midnight",
            later.matchup()
        ));
    }

    let placement = Placement {
        day,
        window: Some((new_start, new_end)),
        venue: later.venue_name(),
    };
    if let Some(reason) = placement_conflict(index, later, &placement, min_rest) {
        return FixOutcome::unresolvable(format!(
            "shifting {} to {} is not safe: {}",
            later.matchup(),
            minutes_to_time_string(new_start),
            reason
        ));
    }

    FixOutcome::Move {
        action: FixAction {
            match_id: later.id.clone(),
            kind: FixKind::ShiftTime,
            from_day: Some(day.clone()),
            target_day: day.clone(),
            new_start: minutes_to_time_string(new_start),
            new_end: minutes_to_time_string(new_end),
            new_venue: None,
        },
    }
}

fn fix_day_distribution(index: &MatchIndex<'_>, day: &DayKey, target: Option<&DayKey>) -> FixOutcome {
    let Some(target) = target else {
        return FixOutcome::unresolvable("no other day is available");
    };

    for m in movable_latest_first(index.matches_on(day).iter().copied()) {
        let placement = Placement {
            day: target,
            window: m.window(),
            venue: m.venue_name(),
        };
        if placement_conflict(index, m, &placement, 0).is_none() {
            return move_day(m, day, target);
        }
    }

    FixOutcome::unresolvable(format!(
        "every match on {} collides with a fixture on {}",
        day, target
    ))
}

fn reassign_slot(
    index: &MatchIndex<'_>,
    issue: &ScheduleIssue,
    min_rest: u32,
    slots: &dyn SlotProvider,
) -> FixOutcome {
    // The later match of the pair moves first
    for m in affected(index, issue).into_iter().rev().filter(|m| !m.completed) {
        for slot in slots.candidate_slots(m) {
            let Some(slot_day) = index.grouping().parse_day(&slot.day) else {
                debug!(day = %slot.day, "skipping slot with an unreadable day");
                continue;
            };
            let (Some(start), Some(end)) = (
                parse_time_to_minutes(&slot.start_time),
                parse_time_to_minutes(&slot.end_time),
            ) else {
                continue;
            };
            if end <= start {
                continue;
            }

            let slot_venue = slot
                .venue
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty());
            let placement = Placement {
                day: &slot_day,
                window: Some((start, end)),
                venue: slot_venue.or(m.venue_name()),
            };
            if placement_conflict(index, m, &placement, min_rest).is_some() {
                continue;
            }

            return FixOutcome::Move {
                action: FixAction {
                    match_id: m.id.clone(),
                    kind: FixKind::ReassignSlot,
                    from_day: index.day_of(m),
                    target_day: slot_day,
                    new_start: minutes_to_time_string(start),
                    new_end: minutes_to_time_string(end),
                    new_venue: slot_venue.map(str::to_string),
                },
            };
        }
    }

    FixOutcome::unresolvable("no free slot offered by the slot store resolves this conflict")
}

/// Applies a move to the match with the action's id.
/// Returns false when no such match exists.
pub fn apply_fix_action(matches: &mut [Match], action: &FixAction) -> bool {
    let Some(m) = matches.iter_mut().find(|m| m.id == action.match_id) else {
        warn!(match_id = %action.match_id, "attempted to apply a fix to an unknown match");
        return false;
    };

    match &action.target_day {
        DayKey::Date(date) => m.date = date.format("%Y-%m-%d").to_string(),
        DayKey::MatchDay(id) => m.match_day_id = Some(id.clone()),
    }
    m.start_time = action.new_start.clone();
    m.end_time = action.new_end.clone();
    if let Some(venue) = &action.new_venue {
        m.venue = Some(venue.clone());
    }
    true
}
