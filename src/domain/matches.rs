//! Played matches and per-team outcome classification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{MatchId, TeamId};
use crate::error::StandingsError;

/// Maximum venue length accepted on create / update.
pub const MAX_VENUE_LEN: usize = 128;

/// Maximum goals one side may be credited with in a single match.
pub const MAX_GOALS: u32 = 999;

/// Result of a match from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The team scored more goals than its opponent.
    Win,
    /// Both teams scored the same number of goals.
    Draw,
    /// The team scored fewer goals than its opponent.
    Loss,
}

impl Outcome {
    /// Classifies a result from the goals scored by a team and its opponent.
    #[must_use]
    pub const fn from_goals(own: u32, opponent: u32) -> Self {
        if own > opponent {
            Self::Win
        } else if own == opponent {
            Self::Draw
        } else {
            Self::Loss
        }
    }

    /// League points awarded for this outcome (3 / 1 / 0).
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Win => 3,
            Self::Draw => 1,
            Self::Loss => 0,
        }
    }
}

/// A completed fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Match identifier.
    pub id: MatchId,
    /// Calendar date the match was played on.
    pub date: NaiveDate,
    /// Home side.
    pub home_team_id: TeamId,
    /// Away side. Always differs from `home_team_id`.
    pub away_team_id: TeamId,
    /// Goals scored by the home side.
    pub home_goals: u32,
    /// Goals scored by the away side.
    pub away_goals: u32,
    /// Optional stadium name.
    pub venue: Option<String>,
}

impl Match {
    /// Returns `true` if `team` played in this match.
    #[must_use]
    pub fn involves(&self, team: TeamId) -> bool {
        self.home_team_id == team || self.away_team_id == team
    }

    /// Goals scored and conceded by `team`, or `None` if it did not play.
    #[must_use]
    pub fn score_for(&self, team: TeamId) -> Option<(u32, u32)> {
        if team == self.home_team_id {
            Some((self.home_goals, self.away_goals))
        } else if team == self.away_team_id {
            Some((self.away_goals, self.home_goals))
        } else {
            None
        }
    }
}

/// Match payload for create and update, before an identifier is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatch {
    /// Calendar date the match was played on.
    pub date: NaiveDate,
    /// Home side.
    pub home_team_id: TeamId,
    /// Away side.
    pub away_team_id: TeamId,
    /// Goals scored by the home side.
    pub home_goals: u32,
    /// Goals scored by the away side.
    pub away_goals: u32,
    /// Optional stadium name.
    pub venue: Option<String>,
}

impl NewMatch {
    /// Checks the invariants that do not need the roster.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::InvalidRequest`] when both sides are the
    /// same team, either goal count exceeds [`MAX_GOALS`], or the venue
    /// exceeds [`MAX_VENUE_LEN`] characters.
    pub fn validate(&self) -> Result<(), StandingsError> {
        if self.home_team_id == self.away_team_id {
            return Err(StandingsError::InvalidRequest(format!(
                "home and away team must differ (both {})",
                self.home_team_id
            )));
        }
        if self.home_goals > MAX_GOALS || self.away_goals > MAX_GOALS {
            return Err(StandingsError::InvalidRequest(format!(
                "goals must be at most {MAX_GOALS}"
            )));
        }
        if let Some(venue) = &self.venue
            && venue.chars().count() > MAX_VENUE_LEN
        {
            return Err(StandingsError::InvalidRequest(format!(
                "venue must be at most {MAX_VENUE_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Attaches an identifier, producing a stored [`Match`].
    #[must_use]
    pub fn with_id(self, id: MatchId) -> Match {
        Match {
            id,
            date: self.date,
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            home_goals: self.home_goals,
            away_goals: self.away_goals,
            venue: self.venue,
        }
    }
}
