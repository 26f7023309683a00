//! Database row models for matches and snapshots.
//!
//! Counters are stored as `BIGINT` and decoded into the unsigned domain
//! types here, so a corrupted negative value surfaces as a persistence
//! error instead of wrapping.

use chrono::NaiveDate;

use crate::domain::{Match, MatchId, Snapshot, Team, TeamId};
use crate::error::StandingsError;

/// A row from the `teams` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamRow {
    /// Primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Self::new(TeamId::new(row.id), row.name)
    }
}

/// A row from the `matches` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchRow {
    /// Primary key.
    pub id: i64,
    /// Date the match was played on.
    pub match_date: NaiveDate,
    /// Home team foreign key.
    pub home_team_id: i64,
    /// Away team foreign key.
    pub away_team_id: i64,
    /// Home goals.
    pub home_goals: i64,
    /// Away goals.
    pub away_goals: i64,
    /// Optional stadium name.
    pub venue: Option<String>,
}

impl TryFrom<MatchRow> for Match {
    type Error = StandingsError;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MatchId::new(row.id),
            date: row.match_date,
            home_team_id: TeamId::new(row.home_team_id),
            away_team_id: TeamId::new(row.away_team_id),
            home_goals: counter(row.home_goals, "home_goals")?,
            away_goals: counter(row.away_goals, "away_goals")?,
            venue: row.venue,
        })
    }
}

/// A row from the `standings_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    /// Team foreign key.
    pub team_id: i64,
    /// Competition year.
    pub year: i32,
    /// Date the table was computed as of.
    pub as_of_date: NaiveDate,
    /// Matches played.
    pub played: i64,
    /// League points.
    pub points: i64,
    /// Matches won.
    pub wins: i64,
    /// Matches drawn.
    pub draws: i64,
    /// Matches lost.
    pub losses: i64,
    /// Goals scored.
    pub goals_for: i64,
    /// Goals conceded.
    pub goals_against: i64,
    /// Goal difference.
    pub goal_difference: i64,
}

impl TryFrom<SnapshotRow> for Snapshot {
    type Error = StandingsError;

    fn try_from(row: SnapshotRow) -> Result<Self, Self::Error> {
        Ok(Self {
            team_id: TeamId::new(row.team_id),
            year: row.year,
            as_of_date: row.as_of_date,
            played: counter(row.played, "played")?,
            points: counter(row.points, "points")?,
            wins: counter(row.wins, "wins")?,
            draws: counter(row.draws, "draws")?,
            losses: counter(row.losses, "losses")?,
            goals_for: counter(row.goals_for, "goals_for")?,
            goals_against: counter(row.goals_against, "goals_against")?,
            goal_difference: row.goal_difference,
        })
    }
}

/// Decodes a non-negative `BIGINT` column.
fn counter(value: i64, column: &str) -> Result<u32, StandingsError> {
    u32::try_from(value).map_err(|_| {
        StandingsError::PersistenceError(format!("column {column} out of range: {value}"))
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(2025, 3, 1) else {
            panic!("valid date");
        };
        date
    }

    #[test]
    fn match_row_decodes() {
        let row = MatchRow {
            id: 11,
            match_date: day(),
            home_team_id: 1,
            away_team_id: 2,
            home_goals: 3,
            away_goals: 1,
            venue: Some("Ressacada".to_string()),
        };
        let Ok(m) = Match::try_from(row) else {
            panic!("row should decode");
        };
        assert_eq!(m.id, MatchId::new(11));
        assert_eq!((m.home_goals, m.away_goals), (3, 1));
    }

    #[test]
    fn negative_counter_is_a_persistence_error() {
        let row = SnapshotRow {
            team_id: 1,
            year: 2025,
            as_of_date: day(),
            played: -1,
            points: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
        };
        assert!(matches!(
            Snapshot::try_from(row),
            Err(StandingsError::PersistenceError(_))
        ));
    }
}
