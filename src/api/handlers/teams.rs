//! Roster and team history handlers.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    HistoryEntryDto, HistoryQuery, TeamDto, TeamHistoryResponse, TeamListResponse,
};
use crate::app_state::AppState;
use crate::domain::TeamId;
use crate::error::{ErrorResponse, StandingsError};
use crate::persistence::LeagueStore;

/// `GET /teams`: List the roster.
///
/// # Errors
///
/// Returns [`StandingsError::PersistenceError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    tag = "Teams",
    summary = "List teams",
    responses(
        (status = 200, description = "Roster ordered by id", body = TeamListResponse),
    )
)]
pub async fn list_teams<S: LeagueStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<TeamListResponse>, StandingsError> {
    let data = state
        .league_service
        .list_teams()
        .await?
        .into_iter()
        .map(TeamDto::from)
        .collect();
    Ok(Json(TeamListResponse { data }))
}

/// `GET /teams/:id/history`: Dated position and points series.
///
/// # Errors
///
/// Returns [`StandingsError::TeamNotFound`] if the team is not on the
/// roster.
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}/history",
    tag = "Teams",
    summary = "Get team history",
    description = "Returns one entry per stored snapshot of the team in `year`, ordered by date. An empty list means no snapshots.",
    params(
        ("id" = i64, Path, description = "Team id"),
        HistoryQuery,
    ),
    responses(
        (status = 200, description = "History series", body = TeamHistoryResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
    )
)]
pub async fn team_history<S: LeagueStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<TeamHistoryResponse>, StandingsError> {
    let entries = state
        .league_service
        .history(TeamId::new(id), query.year)
        .await?
        .into_iter()
        .map(HistoryEntryDto::from)
        .collect();

    Ok(Json(TeamHistoryResponse {
        team_id: id,
        year: query.year,
        entries,
    }))
}

/// Team routes.
pub fn routes<S: LeagueStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/teams", get(list_teams::<S>))
        .route("/teams/{id}/history", get(team_history::<S>))
}
