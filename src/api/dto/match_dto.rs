//! Match DTOs for create, update, get and list operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::StandingsRowDto;
use crate::domain::{Match, NewMatch, Team, TeamId};
use crate::persistence::MatchFilter;
use crate::service::RecordedMatch;

/// Request body for `POST /matches` and `PUT /matches/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MatchRequest {
    /// Match date (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Home side.
    pub home_team_id: i64,
    /// Away side.
    pub away_team_id: i64,
    /// Goals scored by the home side.
    pub home_goals: u32,
    /// Goals scored by the away side.
    pub away_goals: u32,
    /// Optional venue name (max 128 chars).
    #[serde(default)]
    pub venue: Option<String>,
}

impl From<MatchRequest> for NewMatch {
    fn from(req: MatchRequest) -> Self {
        Self {
            date: req.date,
            home_team_id: TeamId::new(req.home_team_id),
            away_team_id: TeamId::new(req.away_team_id),
            home_goals: req.home_goals,
            away_goals: req.away_goals,
            venue: req.venue.filter(|v| !v.trim().is_empty()),
        }
    }
}

/// A stored match.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchDto {
    /// Match identifier.
    pub id: i64,
    /// Match date.
    pub date: NaiveDate,
    /// Home side.
    pub home_team_id: i64,
    /// Home side display name.
    pub home_team_name: String,
    /// Away side.
    pub away_team_id: i64,
    /// Away side display name.
    pub away_team_name: String,
    /// Goals scored by the home side.
    pub home_goals: u32,
    /// Goals scored by the away side.
    pub away_goals: u32,
    /// Venue, if recorded.
    pub venue: Option<String>,
}

impl MatchDto {
    /// Builds the DTO, resolving team names with `name_of`. Teams it
    /// cannot resolve get an empty name.
    #[must_use]
    pub fn named<'a>(m: Match, name_of: impl Fn(TeamId) -> Option<&'a str>) -> Self {
        let name = |id| name_of(id).unwrap_or_default().to_string();
        Self {
            id: m.id.get(),
            date: m.date,
            home_team_id: m.home_team_id.get(),
            home_team_name: name(m.home_team_id),
            away_team_id: m.away_team_id.get(),
            away_team_name: name(m.away_team_id),
            home_goals: m.home_goals,
            away_goals: m.away_goals,
            venue: m.venue,
        }
    }

    /// Builds the DTO with names from the roster.
    #[must_use]
    pub fn with_roster(m: Match, teams: &[Team]) -> Self {
        Self::named(m, |id| teams.iter().find(|t| t.id == id).map(|t| t.name.as_str()))
    }
}

/// Query parameters for `GET /matches`. All filters are optional.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct MatchListQuery {
    /// Calendar year of the match date.
    pub year: Option<i32>,
    /// Earliest match date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest match date, inclusive.
    pub until: Option<NaiveDate>,
    /// Team playing on either side.
    pub team_id: Option<i64>,
}

impl From<MatchListQuery> for MatchFilter {
    fn from(q: MatchListQuery) -> Self {
        Self {
            year: q.year,
            from: q.from,
            until: q.until,
            team_id: q.team_id.map(TeamId::new),
        }
    }
}

/// Response body for `GET /matches`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchListResponse {
    /// Matches, newest first.
    pub data: Vec<MatchDto>,
    /// Number of matches returned.
    pub total: usize,
}

/// Response body for match writes: the match and the table recorded for
/// its date.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordedMatchResponse {
    /// The stored match.
    #[serde(rename = "match")]
    pub match_: MatchDto,
    /// Standings as of the match date, in table order.
    pub standings: Vec<StandingsRowDto>,
}

impl From<RecordedMatch> for RecordedMatchResponse {
    fn from(recorded: RecordedMatch) -> Self {
        let rows = &recorded.standings;
        let match_ = MatchDto::named(recorded.stored, |id| {
            rows.iter()
                .find(|r| r.team_id == id)
                .map(|r| r.team_name.as_str())
        });
        Self {
            standings: StandingsRowDto::table(rows),
            match_,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn request_maps_to_new_match() {
        let raw = r#"{"date":"2025-03-01","home_team_id":1,"away_team_id":2,"home_goals":3,"away_goals":1,"venue":"  "}"#;
        let Ok(req) = serde_json::from_str::<MatchRequest>(raw) else {
            panic!("request should parse");
        };
        let new = NewMatch::from(req);
        assert_eq!(new.home_team_id, TeamId::new(1));
        assert_eq!((new.home_goals, new.away_goals), (3, 1));
        assert_eq!(new.venue, None);
    }

    #[test]
    fn negative_goals_are_rejected() {
        let raw = r#"{"date":"2025-03-01","home_team_id":1,"away_team_id":2,"home_goals":-1,"away_goals":0}"#;
        assert!(serde_json::from_str::<MatchRequest>(raw).is_err());
    }

    #[test]
    fn match_key_is_renamed() {
        let Some(date) = NaiveDate::from_ymd_opt(2025, 3, 1) else {
            panic!("valid date");
        };
        let recorded = RecordedMatch {
            stored: NewMatch {
                date,
                home_team_id: TeamId::new(1),
                away_team_id: TeamId::new(2),
                home_goals: 0,
                away_goals: 0,
                venue: None,
            }
            .with_id(crate::domain::MatchId::new(7)),
            standings: Vec::new(),
        };
        let Ok(json) = serde_json::to_value(RecordedMatchResponse::from(recorded)) else {
            panic!("serialization failed");
        };
        assert_eq!(json["match"]["id"], 7);
        assert_eq!(json["match"]["date"], "2025-03-01");
        assert_eq!(json["match"]["home_team_name"], "");
    }

    #[test]
    fn names_come_from_the_roster() {
        let Some(date) = NaiveDate::from_ymd_opt(2025, 3, 1) else {
            panic!("valid date");
        };
        let stored = NewMatch {
            date,
            home_team_id: TeamId::new(2),
            away_team_id: TeamId::new(1),
            home_goals: 2,
            away_goals: 2,
            venue: None,
        }
        .with_id(crate::domain::MatchId::new(3));
        let teams = [
            Team::new(TeamId::new(1), "Avaí FC"),
            Team::new(TeamId::new(2), "Fluminense"),
        ];

        let dto = MatchDto::with_roster(stored, &teams);
        assert_eq!(dto.home_team_name, "Fluminense");
        assert_eq!(dto.away_team_name, "Avaí FC");
    }
}
