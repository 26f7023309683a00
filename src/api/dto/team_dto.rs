//! Team roster and history DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{HistoryEntry, Team};

/// A roster entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamDto {
    /// Team identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
}

impl From<Team> for TeamDto {
    fn from(team: Team) -> Self {
        Self {
            id: team.id.get(),
            name: team.name,
        }
    }
}

/// Response body for `GET /teams`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamListResponse {
    /// Teams ordered by id.
    pub data: Vec<TeamDto>,
}

/// Query parameters for `GET /teams/{id}/history`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Competition year of the snapshots.
    pub year: i32,
}

/// One dated point of a team's history.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryEntryDto {
    /// Snapshot date.
    pub date: NaiveDate,
    /// Table position on that date; 0 if the team was not ranked.
    pub position: usize,
    /// Points on that date.
    pub points: u32,
    /// Games played on that date.
    pub played: u32,
    /// Points won as a percentage of points available.
    pub efficiency_percent: Option<f64>,
}

impl From<HistoryEntry> for HistoryEntryDto {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            date: entry.date,
            position: entry.position,
            points: entry.points,
            played: entry.played,
            efficiency_percent: entry.efficiency_percent,
        }
    }
}

/// Response body for `GET /teams/{id}/history`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeamHistoryResponse {
    /// Team identifier.
    pub team_id: i64,
    /// Competition year.
    pub year: i32,
    /// Entries ordered by date.
    pub entries: Vec<HistoryEntryDto>,
}
