//! Standings calculator: per-team aggregation and tie-break ranking.
//!
//! [`compute_standings`] is a pure function over a team roster and a slice
//! of matches. Rows live in an arena indexed by [`TeamId`], each qualifying
//! match is folded into the two rows it touches, and the result is sorted
//! with a stable sort so that teams which remain tied after every key keep
//! their discovery order.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{Match, Outcome, Team, TeamId};

/// One line of the classification table.
///
/// Invariants: `points == 3 * wins + draws`,
/// `played == wins + draws + losses` and
/// `goal_difference == goals_for - goals_against`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingsRow {
    /// Team the row belongs to.
    pub team_id: TeamId,
    /// Team display name.
    pub team_name: String,
    /// Matches played.
    pub played: u32,
    /// League points.
    pub points: u32,
    /// Matches won.
    pub wins: u32,
    /// Matches drawn.
    pub draws: u32,
    /// Matches lost.
    pub losses: u32,
    /// Goals scored.
    pub goals_for: u32,
    /// Goals conceded.
    pub goals_against: u32,
    /// `goals_for - goals_against`.
    pub goal_difference: i64,
}

impl StandingsRow {
    /// Creates an all-zero row.
    #[must_use]
    pub fn empty(team_id: TeamId, team_name: impl Into<String>) -> Self {
        Self {
            team_id,
            team_name: team_name.into(),
            played: 0,
            points: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
        }
    }

    /// Folds one result, given as goals scored and conceded, into the row.
    ///
    /// Counters saturate at `u32::MAX` instead of overflowing.
    pub fn record_result(&mut self, own: u32, opponent: u32) {
        let outcome = Outcome::from_goals(own, opponent);
        self.played = self.played.saturating_add(1);
        self.points = self.points.saturating_add(outcome.points());
        match outcome {
            Outcome::Win => self.wins = self.wins.saturating_add(1),
            Outcome::Draw => self.draws = self.draws.saturating_add(1),
            Outcome::Loss => self.losses = self.losses.saturating_add(1),
        }
        self.goals_for = self.goals_for.saturating_add(own);
        self.goals_against = self.goals_against.saturating_add(opponent);
        self.goal_difference = i64::from(self.goals_for) - i64::from(self.goals_against);
    }

    /// Table order between two rows: `Less` means `self` ranks higher.
    ///
    /// Keys, all descending: points, wins, goal difference, goals for.
    #[must_use]
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        other
            .points
            .cmp(&self.points)
            .then_with(|| other.wins.cmp(&self.wins))
            .then_with(|| other.goal_difference.cmp(&self.goal_difference))
            .then_with(|| other.goals_for.cmp(&self.goals_for))
    }
}

/// Returns `true` if `m` counts toward a table as of `as_of`, optionally
/// restricted to the calendar year `year`.
#[must_use]
pub fn qualifies(m: &Match, as_of: NaiveDate, year: Option<i32>) -> bool {
    m.date <= as_of && year.is_none_or(|y| m.date.year() == y)
}

/// Computes the ranked table for `teams` from `matches`.
///
/// Every roster team gets a row, zero-stat when it has no qualifying
/// match. Teams referenced by a qualifying match but missing from the
/// roster are appended after it in discovery order with an empty name. A
/// match id that appears more than once is counted once.
#[must_use]
pub fn compute_standings(
    teams: &[Team],
    matches: &[Match],
    as_of: NaiveDate,
    year: Option<i32>,
) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = teams
        .iter()
        .map(|t| StandingsRow::empty(t.id, t.name.clone()))
        .collect();
    let mut index: HashMap<TeamId, usize> = HashMap::with_capacity(rows.len());
    for (slot, row) in rows.iter().enumerate() {
        index.entry(row.team_id).or_insert(slot);
    }

    let mut seen = HashSet::with_capacity(matches.len());
    for m in matches.iter().filter(|m| qualifies(m, as_of, year)) {
        if !seen.insert(m.id) {
            tracing::debug!(match_id = %m.id, "duplicate match ignored");
            continue;
        }
        for team in [m.home_team_id, m.away_team_id] {
            let Some((own, opponent)) = m.score_for(team) else {
                continue;
            };
            let slot = *index.entry(team).or_insert_with(|| {
                tracing::warn!(team_id = %team, match_id = %m.id, "team missing from roster");
                rows.push(StandingsRow::empty(team, String::new()));
                rows.len() - 1
            });
            if let Some(row) = rows.get_mut(slot) {
                row.record_result(own, opponent);
            }
        }
    }

    rows.sort_by(StandingsRow::ranking_cmp);
    rows
}

/// 1-based position of `team` in a ranked table, `0` when absent.
#[must_use]
pub fn position_of(table: &[StandingsRow], team: TeamId) -> usize {
    table
        .iter()
        .position(|row| row.team_id == team)
        .map_or(0, |idx| idx + 1)
}
