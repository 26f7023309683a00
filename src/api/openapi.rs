//! OpenAPI document for the REST API.

use utoipa::OpenApi;

use crate::api::dto::{
    HistoryEntryDto, MatchDto, MatchListResponse, MatchRequest, RecordedMatchResponse,
    StandingsResponse, StandingsRowDto, TeamDto, TeamHistoryResponse, TeamListResponse,
};
use crate::api::handlers::{matches, standings, system, teams};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "league-standings",
        description = "League standings with per-date historical snapshots"
    ),
    paths(
        standings::get_standings,
        matches::create_match,
        matches::list_matches,
        matches::get_match,
        matches::update_match,
        matches::delete_match,
        teams::list_teams,
        teams::team_history,
        system::health_handler,
    ),
    components(schemas(
        StandingsResponse,
        StandingsRowDto,
        MatchRequest,
        MatchDto,
        MatchListResponse,
        RecordedMatchResponse,
        TeamDto,
        TeamListResponse,
        HistoryEntryDto,
        TeamHistoryResponse,
        system::HealthResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Standings", description = "League tables"),
        (name = "Matches", description = "Match results"),
        (name = "Teams", description = "Roster and position history"),
        (name = "System", description = "Service status"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/v1/standings",
            "/api/v1/matches",
            "/api/v1/matches/{id}",
            "/api/v1/teams",
            "/api/v1/teams/{id}/history",
            "/health",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
