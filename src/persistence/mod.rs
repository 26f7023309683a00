//! Persistence layer: roster, match log and standings snapshots.
//!
//! Provides the [`LeagueStore`] and [`LeagueTransaction`] traits through
//! which the service reads matches and teams and writes matches and
//! snapshots. Writes always go through a transaction so that a match
//! mutation and every snapshot it triggers commit together; dropping a
//! transaction without calling [`LeagueTransaction::commit`] rolls it back.
//!
//! Two implementations are provided: [`postgres::PgLeagueStore`] over
//! `sqlx::PgPool`, and [`memory::MemoryLeagueStore`] for tests and
//! database-less runs.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};

use crate::domain::{Match, MatchId, NewMatch, Snapshot, Team, TeamId};
use crate::error::StandingsError;

pub use memory::MemoryLeagueStore;
pub use postgres::PgLeagueStore;

/// Optional constraints for match listings. Unset fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchFilter {
    /// Calendar year of the match date.
    pub year: Option<i32>,
    /// Earliest match date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest match date, inclusive.
    pub until: Option<NaiveDate>,
    /// Team playing on either side.
    pub team_id: Option<TeamId>,
}

impl MatchFilter {
    /// Matches of `year` played on or before `until`.
    #[must_use]
    pub const fn year_until(year: Option<i32>, until: NaiveDate) -> Self {
        Self {
            year,
            from: None,
            until: Some(until),
            team_id: None,
        }
    }

    /// Returns `true` if `m` satisfies every set constraint.
    #[must_use]
    pub fn accepts(&self, m: &Match) -> bool {
        self.year.is_none_or(|y| m.date.year() == y)
            && self.from.is_none_or(|from| m.date >= from)
            && self.until.is_none_or(|until| m.date <= until)
            && self.team_id.is_none_or(|team| m.involves(team))
    }
}

/// Read access to the league data plus the entry point for writes.
#[async_trait]
pub trait LeagueStore: Debug + Send + Sync + 'static {
    /// Transaction handle produced by [`LeagueStore::begin`].
    type Tx: LeagueTransaction;

    /// Opens a write transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] if the backend cannot
    /// start a transaction.
    async fn begin(&self) -> Result<Self::Tx, StandingsError>;

    /// Returns the full roster, including teams without matches, in
    /// ascending id order.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn list_teams(&self) -> Result<Vec<Team>, StandingsError>;

    /// Returns matches accepted by `filter`, ordered by date then id.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>, StandingsError>;

    /// Looks a match up by id.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn get_match(&self, id: MatchId) -> Result<Option<Match>, StandingsError>;

    /// Returns the snapshots of one team for one year, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn query_snapshots(
        &self,
        team_id: TeamId,
        year: i32,
    ) -> Result<Vec<Snapshot>, StandingsError>;
}

/// A unit of work over the league data. All writes are invisible to other
/// readers until [`LeagueTransaction::commit`] succeeds.
#[async_trait]
pub trait LeagueTransaction: Debug + Send {
    /// Returns the roster as seen by this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn list_teams(&mut self) -> Result<Vec<Team>, StandingsError>;

    /// Returns matches accepted by `filter` as seen by this transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn list_matches(&mut self, filter: &MatchFilter) -> Result<Vec<Match>, StandingsError>;

    /// Looks a match up by id, locking it for the rest of the transaction
    /// where the backend supports row locks.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn get_match(&mut self, id: MatchId) -> Result<Option<Match>, StandingsError>;

    /// Stores a new match and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn insert_match(&mut self, new: &NewMatch) -> Result<Match, StandingsError>;

    /// Overwrites a match. Returns `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn update_match(
        &mut self,
        id: MatchId,
        new: &NewMatch,
    ) -> Result<Option<Match>, StandingsError>;

    /// Deletes a match and returns what was deleted, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn delete_match(&mut self, id: MatchId) -> Result<Option<Match>, StandingsError>;

    /// Inserts the snapshot, or overwrites every numeric field of the one
    /// already stored under the same key.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn upsert_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), StandingsError>;

    /// Distinct snapshot dates of `year` on or after `from`, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn snapshot_dates(
        &mut self,
        year: i32,
        from: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StandingsError>;

    /// Serializes snapshot recording for competition `year` until this
    /// transaction ends. Called before the matches of `year` are read for
    /// recording, so a concurrent writer's committed match is always seen.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on backend failure.
    async fn lock_year(&mut self, year: i32) -> Result<(), StandingsError>;

    /// Makes every write of this transaction durable.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] if the commit fails, in
    /// which case nothing was written.
    async fn commit(self) -> Result<(), StandingsError>;
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn on(y: i32, m: u32, d: u32) -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
            panic!("valid date");
        };
        date
    }

    fn sample() -> Match {
        Match {
            id: MatchId::new(1),
            date: on(2025, 3, 1),
            home_team_id: TeamId::new(1),
            away_team_id: TeamId::new(2),
            home_goals: 1,
            away_goals: 0,
            venue: None,
        }
    }

    #[test]
    fn default_filter_accepts_everything() {
        assert!(MatchFilter::default().accepts(&sample()));
    }

    #[test]
    fn filter_constraints_combine() {
        let m = sample();
        let by_team = MatchFilter {
            team_id: Some(TeamId::new(2)),
            ..MatchFilter::default()
        };
        assert!(by_team.accepts(&m));

        let other_team = MatchFilter {
            team_id: Some(TeamId::new(3)),
            ..MatchFilter::default()
        };
        assert!(!other_team.accepts(&m));

        let range = MatchFilter {
            from: Some(on(2025, 3, 1)),
            until: Some(on(2025, 3, 31)),
            ..MatchFilter::default()
        };
        assert!(range.accepts(&m));

        assert!(MatchFilter::year_until(Some(2025), on(2025, 3, 1)).accepts(&m));
        assert!(!MatchFilter::year_until(Some(2025), on(2025, 2, 28)).accepts(&m));
        assert!(!MatchFilter::year_until(Some(2024), on(2025, 12, 31)).accepts(&m));
    }
}
