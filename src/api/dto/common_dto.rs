//! Shared DTO types used across multiple endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::StandingsRow;
use crate::domain::snapshot::efficiency_percent;

/// One ranked line of a standings table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StandingsRowDto {
    /// 1-based table position.
    pub position: usize,
    /// Team identifier.
    pub team_id: i64,
    /// Team display name.
    pub team_name: String,
    /// Games played.
    pub played: u32,
    /// Points (3 per win, 1 per draw).
    pub points: u32,
    /// Games won.
    pub wins: u32,
    /// Games drawn.
    pub draws: u32,
    /// Games lost.
    pub losses: u32,
    /// Goals scored.
    pub goals_for: u32,
    /// Goals conceded.
    pub goals_against: u32,
    /// `goals_for - goals_against`.
    pub goal_difference: i64,
    /// Points won as a percentage of points available; `null` before the
    /// first game.
    pub efficiency_percent: Option<f64>,
}

impl StandingsRowDto {
    /// Converts an ordered table, numbering positions from 1.
    #[must_use]
    pub fn table(rows: &[StandingsRow]) -> Vec<Self> {
        rows.iter()
            .zip(1..)
            .map(|(row, position)| Self {
                position,
                team_id: row.team_id.get(),
                team_name: row.team_name.clone(),
                played: row.played,
                points: row.points,
                wins: row.wins,
                draws: row.draws,
                losses: row.losses,
                goals_for: row.goals_for,
                goals_against: row.goals_against,
                goal_difference: row.goal_difference,
                efficiency_percent: efficiency_percent(row.points, row.played),
            })
            .collect()
    }
}
