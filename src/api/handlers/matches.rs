//! Match CRUD handlers: create, list, get, update, delete.
//!
//! Every write records the standings snapshots for the dates it touches
//! before responding.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    MatchDto, MatchListQuery, MatchListResponse, MatchRequest, RecordedMatchResponse,
};
use crate::app_state::AppState;
use crate::domain::{MatchId, NewMatch};
use crate::error::{ErrorResponse, StandingsError};
use crate::persistence::{LeagueStore, MatchFilter};

/// `POST /matches`: Record a new match result.
///
/// # Errors
///
/// Returns [`StandingsError::InvalidRequest`] or
/// [`StandingsError::UnknownTeam`] for a bad payload.
#[utoipa::path(
    post,
    path = "/api/v1/matches",
    tag = "Matches",
    summary = "Create a match",
    description = "Stores the match and records a standings snapshot for every team as of the match date. The response echoes that table.",
    request_body = MatchRequest,
    responses(
        (status = 201, description = "Match created", body = RecordedMatchResponse),
        (status = 400, description = "Invalid match or unknown team", body = ErrorResponse),
        (status = 500, description = "Storage failure, nothing written", body = ErrorResponse),
    )
)]
pub async fn create_match<S: LeagueStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<MatchRequest>,
) -> Result<impl IntoResponse, StandingsError> {
    let recorded = state
        .league_service
        .create_match(NewMatch::from(req))
        .await?;
    Ok((StatusCode::CREATED, Json(RecordedMatchResponse::from(recorded))))
}

/// `GET /matches`: List matches.
///
/// # Errors
///
/// Returns [`StandingsError::PersistenceError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/matches",
    tag = "Matches",
    summary = "List matches",
    description = "Returns matches newest first (by date, then id), optionally filtered by year, date range and team.",
    params(MatchListQuery),
    responses(
        (status = 200, description = "Match list", body = MatchListResponse),
    )
)]
pub async fn list_matches<S: LeagueStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<MatchListQuery>,
) -> Result<Json<MatchListResponse>, StandingsError> {
    let filter = MatchFilter::from(query);
    let teams = state.league_service.list_teams().await?;
    let mut matches = state.league_service.list_matches(&filter).await?;
    matches.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let data: Vec<MatchDto> = matches
        .into_iter()
        .map(|m| MatchDto::with_roster(m, &teams))
        .collect();

    Ok(Json(MatchListResponse {
        total: data.len(),
        data,
    }))
}

/// `GET /matches/:id`: Get one match.
///
/// # Errors
///
/// Returns [`StandingsError::MatchNotFound`] if the match does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/matches/{id}",
    tag = "Matches",
    summary = "Get a match",
    params(
        ("id" = i64, Path, description = "Match id"),
    ),
    responses(
        (status = 200, description = "Match", body = MatchDto),
        (status = 404, description = "Match not found", body = ErrorResponse),
    )
)]
pub async fn get_match<S: LeagueStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<MatchDto>, StandingsError> {
    let found = state.league_service.get_match(MatchId::new(id)).await?;
    let teams = state.league_service.list_teams().await?;
    Ok(Json(MatchDto::with_roster(found, &teams)))
}

/// `PUT /matches/:id`: Overwrite a match.
///
/// # Errors
///
/// Returns [`StandingsError::MatchNotFound`] if the match does not exist,
/// or a validation error for a bad payload.
#[utoipa::path(
    put,
    path = "/api/v1/matches/{id}",
    tag = "Matches",
    summary = "Update a match",
    description = "Replaces the match and re-records the standings for its previous and new date.",
    params(
        ("id" = i64, Path, description = "Match id"),
    ),
    request_body = MatchRequest,
    responses(
        (status = 200, description = "Match updated", body = RecordedMatchResponse),
        (status = 400, description = "Invalid match or unknown team", body = ErrorResponse),
        (status = 404, description = "Match not found", body = ErrorResponse),
    )
)]
pub async fn update_match<S: LeagueStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<RecordedMatchResponse>, StandingsError> {
    let recorded = state
        .league_service
        .update_match(MatchId::new(id), NewMatch::from(req))
        .await?;
    Ok(Json(RecordedMatchResponse::from(recorded)))
}

/// `DELETE /matches/:id`: Remove a match.
///
/// # Errors
///
/// Returns [`StandingsError::MatchNotFound`] if the match does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/matches/{id}",
    tag = "Matches",
    summary = "Delete a match",
    description = "Removes the match and re-records the standings for its date.",
    params(
        ("id" = i64, Path, description = "Match id"),
    ),
    responses(
        (status = 204, description = "Match deleted"),
        (status = 404, description = "Match not found", body = ErrorResponse),
    )
)]
pub async fn delete_match<S: LeagueStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StandingsError> {
    state.league_service.delete_match(MatchId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Match management routes.
pub fn routes<S: LeagueStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/matches", get(list_matches::<S>).post(create_match::<S>))
        .route(
            "/matches/{id}",
            get(get_match::<S>)
                .put(update_match::<S>)
                .delete(delete_match::<S>),
        )
}
