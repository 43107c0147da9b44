use std::collections::BTreeMap;

use super::types::{DayGrouping, DayKey, Match};

/// Groups matches by day key. Matches without a usable day under `grouping` are left out.
pub fn group_by_day(matches: &[Match], grouping: DayGrouping) -> BTreeMap<DayKey, Vec<&Match>> {
    let mut by_day: BTreeMap<DayKey, Vec<&Match>> = BTreeMap::new();
    for m in matches {
        if let Some(day) = grouping.key_for(m) {
            by_day.entry(day).or_default().push(m);
        }
    }
    by_day
}

/// Groups matches by team id; every match lands in both of its teams' lists
pub fn group_by_team(matches: &[Match]) -> BTreeMap<String, Vec<&Match>> {
    let mut by_team: BTreeMap<String, Vec<&Match>> = BTreeMap::new();
    for m in matches {
        push_for_teams(&mut by_team, m);
    }
    by_team
}

/// Groups matches by venue name; matches without a venue are excluded
pub fn group_by_venue(matches: &[Match]) -> BTreeMap<String, Vec<&Match>> {
    let mut by_venue: BTreeMap<String, Vec<&Match>> = BTreeMap::new();
    for m in matches {
        if let Some(venue) = m.venue_name() {
            by_venue.entry(venue.to_string()).or_default().push(m);
        }
    }
    by_venue
}

/// Groups an already day-filtered list by team id
pub fn teams_on_day<'a>(day_matches: &[&'a Match]) -> BTreeMap<String, Vec<&'a Match>> {
    let mut by_team: BTreeMap<String, Vec<&'a Match>> = BTreeMap::new();
    for m in day_matches {
        push_for_teams(&mut by_team, m);
    }
    by_team
}

fn push_for_teams<'a>(by_team: &mut BTreeMap<String, Vec<&'a Match>>, m: &'a Match) {
    for (i, team) in m.teams().iter().enumerate() {
        // Missing ids belong to no team; a team listed on both sides counts once
        if team.is_missing() || (i == 1 && team.id == m.team_one.id) {
            continue;
        }
        by_team.entry(team.id.clone()).or_default().push(m);
    }
}

/// Lookup structures built once per analysis from a match snapshot
#[derive(Debug, Clone)]
pub struct MatchIndex<'a> {
    matches: &'a [Match],
    grouping: DayGrouping,
    by_day: BTreeMap<DayKey, Vec<&'a Match>>,
    by_team: BTreeMap<String, Vec<&'a Match>>,
    by_venue: BTreeMap<String, Vec<&'a Match>>,
}

impl<'a> MatchIndex<'a> {
    pub fn build(matches: &'a [Match], grouping: DayGrouping) -> Self {
        Self {
            matches,
            grouping,
            by_day: group_by_day(matches, grouping),
            by_team: group_by_team(matches),
            by_venue: group_by_venue(matches),
        }
    }

    /// Registers days that exist in the tournament even when nothing is scheduled on them
    pub fn with_known_days<I>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = DayKey>,
    {
        for day in days {
            self.by_day.entry(day).or_default();
        }
        self
    }

    pub fn matches(&self) -> &'a [Match] {
        self.matches
    }

    pub fn grouping(&self) -> DayGrouping {
        self.grouping
    }

    pub fn by_day(&self) -> &BTreeMap<DayKey, Vec<&'a Match>> {
        &self.by_day
    }

    pub fn by_team(&self) -> &BTreeMap<String, Vec<&'a Match>> {
        &self.by_team
    }

    pub fn by_venue(&self) -> &BTreeMap<String, Vec<&'a Match>> {
        &self.by_venue
    }

    pub fn days(&self) -> impl Iterator<Item = &DayKey> {
        self.by_day.keys()
    }

    pub fn day_of(&self, m: &Match) -> Option<DayKey> {
        self.grouping.key_for(m)
    }

    pub fn matches_on(&self, day: &DayKey) -> &[&'a Match] {
        self.by_day.get(day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, match_id: &str) -> Option<&'a Match> {
        self.matches.iter().find(|m| m.id == match_id)
    }
}
