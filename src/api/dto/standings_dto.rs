//! Standings table DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::StandingsRowDto;
use crate::service::StandingsTable;

/// Query parameters for `GET /standings`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct StandingsQuery {
    /// Competition year. Defaults to the current year.
    pub year: Option<i32>,
    /// As-of date (`YYYY-MM-DD`). Defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

/// Response body for `GET /standings`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StandingsResponse {
    /// Competition year.
    pub year: i32,
    /// Matches after this date are not counted.
    pub as_of_date: NaiveDate,
    /// Server computation timestamp.
    pub computed_at: DateTime<Utc>,
    /// Rows in table order.
    pub standings: Vec<StandingsRowDto>,
}

impl From<StandingsTable> for StandingsResponse {
    fn from(table: StandingsTable) -> Self {
        Self {
            year: table.year,
            as_of_date: table.as_of_date,
            computed_at: table.computed_at,
            standings: StandingsRowDto::table(&table.rows),
        }
    }
}
