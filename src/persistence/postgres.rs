//! PostgreSQL implementation of the persistence layer.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{PgExecutor, Postgres, Transaction};

use super::models::{MatchRow, SnapshotRow, TeamRow};
use super::{LeagueStore, LeagueTransaction, MatchFilter};
use crate::config::ServiceConfig;
use crate::domain::{Match, MatchId, NewMatch, Snapshot, Team, TeamId};
use crate::error::StandingsError;

const MATCH_COLUMNS: &str =
    "id, match_date, home_team_id, away_team_id, home_goals, away_goals, venue";

/// First key of the advisory locks taken by [`LeagueTransaction::lock_year`];
/// the second key is the year.
const SNAPSHOT_LOCK_CLASS: i32 = 0x5354;

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgLeagueStore {
    pool: PgPool,
}

impl PgLeagueStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool sized according to `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] if the database cannot
    /// be reached within the configured timeout.
    pub async fn connect(config: &ServiceConfig) -> Result<Self, StandingsError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StandingsError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StandingsError::PersistenceError(e.to_string()))
    }
}

/// An open PostgreSQL transaction. Rolled back on drop unless committed.
#[derive(Debug)]
pub struct PgLeagueTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LeagueStore for PgLeagueStore {
    type Tx = PgLeagueTransaction;

    async fn begin(&self) -> Result<Self::Tx, StandingsError> {
        let tx = self.pool.begin().await?;
        Ok(PgLeagueTransaction { tx })
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StandingsError> {
        fetch_teams(&self.pool).await
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>, StandingsError> {
        fetch_matches(&self.pool, filter).await
    }

    async fn get_match(&self, id: MatchId) -> Result<Option<Match>, StandingsError> {
        let sql = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1");
        sqlx::query_as::<_, MatchRow>(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?
            .map(Match::try_from)
            .transpose()
    }

    async fn query_snapshots(
        &self,
        team_id: TeamId,
        year: i32,
    ) -> Result<Vec<Snapshot>, StandingsError> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            "SELECT team_id, year, as_of_date, played, points, wins, draws, losses, \
             goals_for, goals_against, goal_difference \
             FROM standings_snapshots WHERE team_id = $1 AND year = $2 ORDER BY as_of_date",
        )
        .bind(team_id.get())
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Snapshot::try_from).collect()
    }
}

#[async_trait]
impl LeagueTransaction for PgLeagueTransaction {
    async fn list_teams(&mut self) -> Result<Vec<Team>, StandingsError> {
        fetch_teams(&mut *self.tx).await
    }

    async fn list_matches(&mut self, filter: &MatchFilter) -> Result<Vec<Match>, StandingsError> {
        fetch_matches(&mut *self.tx, filter).await
    }

    async fn get_match(&mut self, id: MatchId) -> Result<Option<Match>, StandingsError> {
        let sql = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, MatchRow>(&sql)
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await?
            .map(Match::try_from)
            .transpose()
    }

    async fn insert_match(&mut self, new: &NewMatch) -> Result<Match, StandingsError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO matches (match_date, home_team_id, away_team_id, home_goals, away_goals, venue) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(new.date)
        .bind(new.home_team_id.get())
        .bind(new.away_team_id.get())
        .bind(i64::from(new.home_goals))
        .bind(i64::from(new.away_goals))
        .bind(new.venue.as_deref())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(new.clone().with_id(MatchId::new(id)))
    }

    async fn update_match(
        &mut self,
        id: MatchId,
        new: &NewMatch,
    ) -> Result<Option<Match>, StandingsError> {
        let updated = sqlx::query_scalar::<_, i64>(
            "UPDATE matches SET match_date = $1, home_team_id = $2, away_team_id = $3, \
             home_goals = $4, away_goals = $5, venue = $6, updated_at = NOW() \
             WHERE id = $7 RETURNING id",
        )
        .bind(new.date)
        .bind(new.home_team_id.get())
        .bind(new.away_team_id.get())
        .bind(i64::from(new.home_goals))
        .bind(i64::from(new.away_goals))
        .bind(new.venue.as_deref())
        .bind(id.get())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(updated.map(|_| new.clone().with_id(id)))
    }

    async fn delete_match(&mut self, id: MatchId) -> Result<Option<Match>, StandingsError> {
        let sql = format!("DELETE FROM matches WHERE id = $1 RETURNING {MATCH_COLUMNS}");
        sqlx::query_as::<_, MatchRow>(&sql)
            .bind(id.get())
            .fetch_optional(&mut *self.tx)
            .await?
            .map(Match::try_from)
            .transpose()
    }

    async fn upsert_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), StandingsError> {
        sqlx::query(
            "INSERT INTO standings_snapshots \
             (team_id, year, as_of_date, played, points, wins, draws, losses, \
              goals_for, goals_against, goal_difference) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (team_id, year, as_of_date) DO UPDATE SET \
             played = EXCLUDED.played, points = EXCLUDED.points, wins = EXCLUDED.wins, \
             draws = EXCLUDED.draws, losses = EXCLUDED.losses, \
             goals_for = EXCLUDED.goals_for, goals_against = EXCLUDED.goals_against, \
             goal_difference = EXCLUDED.goal_difference, updated_at = NOW()",
        )
        .bind(snapshot.team_id.get())
        .bind(snapshot.year)
        .bind(snapshot.as_of_date)
        .bind(i64::from(snapshot.played))
        .bind(i64::from(snapshot.points))
        .bind(i64::from(snapshot.wins))
        .bind(i64::from(snapshot.draws))
        .bind(i64::from(snapshot.losses))
        .bind(i64::from(snapshot.goals_for))
        .bind(i64::from(snapshot.goals_against))
        .bind(snapshot.goal_difference)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn snapshot_dates(
        &mut self,
        year: i32,
        from: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StandingsError> {
        let dates = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT DISTINCT as_of_date FROM standings_snapshots \
             WHERE year = $1 AND as_of_date >= $2 ORDER BY as_of_date",
        )
        .bind(year)
        .bind(from)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(dates)
    }

    async fn lock_year(&mut self, year: i32) -> Result<(), StandingsError> {
        // Released automatically at commit or rollback.
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(SNAPSHOT_LOCK_CLASS)
            .bind(year)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), StandingsError> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Loads the roster in id order.
async fn fetch_teams<'e, E>(executor: E) -> Result<Vec<Team>, StandingsError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, TeamRow>("SELECT id, name FROM teams ORDER BY id")
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(Team::from).collect())
}

/// Loads matches accepted by `filter`. Unset filter fields bind as `NULL`
/// and disable their predicate.
async fn fetch_matches<'e, E>(
    executor: E,
    filter: &MatchFilter,
) -> Result<Vec<Match>, StandingsError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT {MATCH_COLUMNS} FROM matches \
         WHERE ($1::INT IS NULL OR EXTRACT(YEAR FROM match_date)::INT = $1) \
         AND ($2::DATE IS NULL OR match_date >= $2) \
         AND ($3::DATE IS NULL OR match_date <= $3) \
         AND ($4::BIGINT IS NULL OR home_team_id = $4 OR away_team_id = $4) \
         ORDER BY match_date, id"
    );
    let rows = sqlx::query_as::<_, MatchRow>(&sql)
        .bind(filter.year)
        .bind(filter.from)
        .bind(filter.until)
        .bind(filter.team_id.map(TeamId::get))
        .fetch_all(executor)
        .await?;

    rows.into_iter().map(Match::try_from).collect()
}
