//! Persisted standings snapshots and the derived history series.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{StandingsRow, TeamId};

/// Unique key of a snapshot row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SnapshotKey {
    /// Team the snapshot belongs to.
    pub team_id: TeamId,
    /// Competition year.
    pub year: i32,
    /// Date the table was computed as of.
    pub as_of_date: NaiveDate,
}

/// One team's standings line for one competition year as of one date.
///
/// At most one snapshot exists per [`SnapshotKey`]; writers upsert by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Team the snapshot belongs to.
    pub team_id: TeamId,
    /// Competition year.
    pub year: i32,
    /// Date the table was computed as of.
    pub as_of_date: NaiveDate,
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

impl Snapshot {
    /// Builds the snapshot for a computed row.
    #[must_use]
    pub fn from_row(row: &StandingsRow, year: i32, as_of_date: NaiveDate) -> Self {
        Self {
            team_id: row.team_id,
            year,
            as_of_date,
            played: row.played,
            points: row.points,
            wins: row.wins,
            draws: row.draws,
            losses: row.losses,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_difference: row.goal_difference,
        }
    }

    /// Returns the unique key of this snapshot.
    #[must_use]
    pub const fn key(&self) -> SnapshotKey {
        SnapshotKey {
            team_id: self.team_id,
            year: self.year,
            as_of_date: self.as_of_date,
        }
    }

    /// Share of the maximum available points, see [`efficiency_percent`].
    #[must_use]
    pub fn efficiency_percent(&self) -> Option<f64> {
        efficiency_percent(self.points, self.played)
    }
}

/// `points / (played * 3) * 100`, rounded to two decimals.
///
/// Undefined for a team that has not played yet, which is reported as
/// `None` rather than NaN.
#[must_use]
pub fn efficiency_percent(points: u32, played: u32) -> Option<f64> {
    if played == 0 {
        return None;
    }
    let ratio = f64::from(points) / (f64::from(played) * 3.0) * 100.0;
    Some((ratio * 100.0).round() / 100.0)
}

/// One point of a team's historical series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Snapshot date.
    pub date: NaiveDate,
    /// 1-based table position on that date, `0` when the team is absent.
    pub position: usize,
    /// Points on that date.
    pub points: u32,
    /// Matches played on that date.
    pub played: u32,
    /// Efficiency on that date, `None` before the first match.
    pub efficiency_percent: Option<f64>,
}

/// Which matches count when re-deriving a historical position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankScope {
    /// Every match up to the snapshot date, across year boundaries.
    #[default]
    AllYears,
    /// Only matches from the snapshot's own competition year.
    SnapshotYear,
}

impl RankScope {
    /// Year filter to hand to the calculator for a snapshot of `year`.
    #[must_use]
    pub const fn year_filter(self, year: i32) -> Option<i32> {
        match self {
            Self::AllYears => None,
            Self::SnapshotYear => Some(year),
        }
    }
}

impl FromStr for RankScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all_years" | "all" => Ok(Self::AllYears),
            "snapshot_year" | "year" => Ok(Self::SnapshotYear),
            other => Err(format!("unknown rank scope: {other}")),
        }
    }
}

impl fmt::Display for RankScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllYears => f.write_str("all_years"),
            Self::SnapshotYear => f.write_str("snapshot_year"),
        }
    }
}
