//! Standings table handler.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, Utc};

use crate::api::dto::{StandingsQuery, StandingsResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, StandingsError};
use crate::persistence::LeagueStore;

/// `GET /standings`: Live table for a year as of a date.
///
/// # Errors
///
/// Returns [`StandingsError::PersistenceError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/standings",
    tag = "Standings",
    summary = "Get standings",
    description = "Computes the table from every match of `year` dated on or before `date`. Teams without matches are listed with zero counters.",
    params(StandingsQuery),
    responses(
        (status = 200, description = "Ranked table", body = StandingsResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn get_standings<S: LeagueStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<StandingsQuery>,
) -> Result<Json<StandingsResponse>, StandingsError> {
    let as_of = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let year = query.year.unwrap_or_else(|| Utc::now().year());

    let table = state.league_service.standings(year, as_of).await?;
    Ok(Json(StandingsResponse::from(table)))
}

/// Standings routes.
pub fn routes<S: LeagueStore>() -> Router<AppState<S>> {
    Router::new().route("/standings", get(get_standings::<S>))
}
