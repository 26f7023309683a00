//! League service: match lifecycle, standings queries and history.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::recorder;
use crate::config::RecomputePolicy;
use crate::domain::{
    HistoryEntry, Match, MatchId, NewMatch, RankScope, StandingsRow, Team, TeamId,
    compute_standings,
};
use crate::error::StandingsError;
use crate::persistence::{LeagueStore, LeagueTransaction, MatchFilter};

/// A ranked table together with the scope it was computed for.
#[derive(Debug, Clone)]
pub struct StandingsTable {
    /// Competition year the table is restricted to.
    pub year: i32,
    /// Matches after this date are ignored.
    pub as_of_date: NaiveDate,
    /// When the table was computed.
    pub computed_at: DateTime<Utc>,
    /// Rows in table order.
    pub rows: Vec<StandingsRow>,
}

/// A match write together with the table recorded for its date.
#[derive(Debug, Clone)]
pub struct RecordedMatch {
    /// The match as stored (or as it was before deletion).
    pub stored: Match,
    /// Table recorded for the match date.
    pub standings: Vec<StandingsRow>,
}

/// Orchestration layer for the league.
///
/// Owns a reference to the [`LeagueStore`]. Every mutation follows the
/// same pattern: open a transaction → validate → mutate the match →
/// record snapshots for the affected dates → commit. Any failure drops
/// the transaction, which rolls everything back.
#[derive(Debug)]
pub struct LeagueService<S> {
    store: Arc<S>,
    rank_scope: RankScope,
    recompute: RecomputePolicy,
}

impl<S: LeagueStore> LeagueService<S> {
    /// Creates a new `LeagueService`.
    #[must_use]
    pub fn new(store: Arc<S>, rank_scope: RankScope, recompute: RecomputePolicy) -> Self {
        Self {
            store,
            rank_scope,
            recompute,
        }
    }

    /// Returns a reference to the inner store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the full roster.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on storage failure.
    pub async fn list_teams(&self) -> Result<Vec<Team>, StandingsError> {
        self.store.list_teams().await
    }

    /// Returns the matches accepted by `filter`, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on storage failure.
    pub async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>, StandingsError> {
        self.store.list_matches(filter).await
    }

    /// Returns one match.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::MatchNotFound`] if it does not exist.
    pub async fn get_match(&self, id: MatchId) -> Result<Match, StandingsError> {
        self.store
            .get_match(id)
            .await?
            .ok_or(StandingsError::MatchNotFound(id))
    }

    /// Computes the live table for `year` as of `as_of`. Nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::PersistenceError`] on storage failure.
    pub async fn standings(
        &self,
        year: i32,
        as_of: NaiveDate,
    ) -> Result<StandingsTable, StandingsError> {
        let teams = self.store.list_teams().await?;
        let matches = self
            .store
            .list_matches(&MatchFilter::year_until(Some(year), as_of))
            .await?;
        let rows = compute_standings(&teams, &matches, as_of, Some(year));

        Ok(StandingsTable {
            year,
            as_of_date: as_of,
            computed_at: Utc::now(),
            rows,
        })
    }

    /// Returns the dated position / points series of a team for `year`.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::TeamNotFound`] if the team is not on the
    /// roster, or a persistence error on storage failure.
    pub async fn history(
        &self,
        team_id: TeamId,
        year: i32,
    ) -> Result<Vec<HistoryEntry>, StandingsError> {
        let teams = self.store.list_teams().await?;
        if !teams.iter().any(|t| t.id == team_id) {
            return Err(StandingsError::TeamNotFound(team_id));
        }

        let snapshots = self.store.query_snapshots(team_id, year).await?;
        let Some(last) = snapshots.last().map(|s| s.as_of_date) else {
            return Ok(Vec::new());
        };
        let matches = self
            .store
            .list_matches(&MatchFilter::year_until(
                self.rank_scope.year_filter(year),
                last,
            ))
            .await?;

        Ok(recorder::reconstruct_history(
            team_id,
            &snapshots,
            &teams,
            &matches,
            self.rank_scope,
        ))
    }

    /// Stores a new match and records the table for its date.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::InvalidRequest`] or
    /// [`StandingsError::UnknownTeam`] for a bad payload, or a persistence
    /// error, in which case nothing was written.
    pub async fn create_match(&self, new: NewMatch) -> Result<RecordedMatch, StandingsError> {
        let mut tx = self.store.begin().await?;
        ensure_known_teams(&mut tx, &new).await?;

        let stored = tx.insert_match(&new).await?;
        let standings = self
            .record_affected(&mut tx, &[stored.date], stored.date)
            .await?;
        tx.commit().await?;

        tracing::info!(match_id = %stored.id, date = %stored.date, "match created");
        Ok(RecordedMatch { stored, standings })
    }

    /// Overwrites a match and records the tables for its old and new date.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::MatchNotFound`] if it does not exist,
    /// a validation error for a bad payload, or a persistence error.
    pub async fn update_match(
        &self,
        id: MatchId,
        new: NewMatch,
    ) -> Result<RecordedMatch, StandingsError> {
        let mut tx = self.store.begin().await?;
        ensure_known_teams(&mut tx, &new).await?;

        let previous = tx
            .get_match(id)
            .await?
            .ok_or(StandingsError::MatchNotFound(id))?;
        let stored = tx
            .update_match(id, &new)
            .await?
            .ok_or(StandingsError::MatchNotFound(id))?;
        let standings = self
            .record_affected(&mut tx, &[previous.date, stored.date], stored.date)
            .await?;
        tx.commit().await?;

        tracing::info!(
            match_id = %id,
            previous_date = %previous.date,
            date = %stored.date,
            "match updated"
        );
        Ok(RecordedMatch { stored, standings })
    }

    /// Deletes a match and records the post-deletion table for its date.
    ///
    /// # Errors
    ///
    /// Returns [`StandingsError::MatchNotFound`] if it does not exist, or a
    /// persistence error.
    pub async fn delete_match(&self, id: MatchId) -> Result<RecordedMatch, StandingsError> {
        let mut tx = self.store.begin().await?;
        let stored = tx
            .delete_match(id)
            .await?
            .ok_or(StandingsError::MatchNotFound(id))?;
        let standings = self
            .record_affected(&mut tx, &[stored.date], stored.date)
            .await?;
        tx.commit().await?;

        tracing::info!(match_id = %id, date = %stored.date, "match deleted");
        Ok(RecordedMatch { stored, standings })
    }

    /// Records every date a write touched and returns the table for
    /// `primary`. Under [`RecomputePolicy::Cascade`] the already stored
    /// snapshot dates that follow an affected date in the same year are
    /// recomputed as well.
    async fn record_affected(
        &self,
        tx: &mut S::Tx,
        affected: &[NaiveDate],
        primary: NaiveDate,
    ) -> Result<Vec<StandingsRow>, StandingsError> {
        let mut dates: BTreeSet<NaiveDate> = affected.iter().copied().collect();
        // Always ascending, across every writer.
        let years: BTreeSet<i32> = dates.iter().map(Datelike::year).collect();
        for year in years {
            tx.lock_year(year).await?;
        }
        if self.recompute == RecomputePolicy::Cascade {
            for date in affected {
                dates.extend(tx.snapshot_dates(date.year(), *date).await?);
            }
        }

        let mut primary_table = Vec::new();
        for date in dates {
            let table = recorder::record_date(tx, date).await?;
            if date == primary {
                primary_table = table;
            }
        }
        Ok(primary_table)
    }
}

/// Rejects payloads that break match invariants or name teams that are
/// not on the roster.
async fn ensure_known_teams<T: LeagueTransaction>(
    tx: &mut T,
    new: &NewMatch,
) -> Result<(), StandingsError> {
    new.validate()?;
    let teams = tx.list_teams().await?;
    for id in [new.home_team_id, new.away_team_id] {
        if !teams.iter().any(|t| t.id == id) {
            return Err(StandingsError::UnknownTeam(id));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::Snapshot;
    use crate::persistence::MemoryLeagueStore;
    use crate::persistence::memory::MemoryTransaction;

    fn on(m: u32, d: u32) -> NaiveDate {
        let Some(date) = NaiveDate::from_ymd_opt(2025, m, d) else {
            panic!("valid date");
        };
        date
    }

    fn roster() -> Vec<Team> {
        vec![
            Team::new(TeamId::new(1), "A"),
            Team::new(TeamId::new(2), "B"),
            Team::new(TeamId::new(3), "C"),
        ]
    }

    fn new_match(date: NaiveDate, home: i64, away: i64, hg: u32, ag: u32) -> NewMatch {
        NewMatch {
            date,
            home_team_id: TeamId::new(home),
            away_team_id: TeamId::new(away),
            home_goals: hg,
            away_goals: ag,
            venue: None,
        }
    }

    fn make_service(policy: RecomputePolicy) -> LeagueService<MemoryLeagueStore> {
        let store = Arc::new(MemoryLeagueStore::new(roster()));
        LeagueService::new(store, RankScope::AllYears, policy)
    }

    fn row(table: &[StandingsRow], id: i64) -> &StandingsRow {
        let Some(row) = table.iter().find(|r| r.team_id == TeamId::new(id)) else {
            panic!("team {id} missing");
        };
        row
    }

    async fn snapshot_points(
        service: &LeagueService<impl LeagueStore>,
        team: i64,
    ) -> Vec<(NaiveDate, u32)> {
        let Ok(series) = service
            .store()
            .query_snapshots(TeamId::new(team), 2025)
            .await
        else {
            panic!("query failed");
        };
        series.iter().map(|s| (s.as_of_date, s.points)).collect()
    }

    #[tokio::test]
    async fn create_match_records_and_echoes_table() {
        let service = make_service(RecomputePolicy::AffectedDate);
        let Ok(recorded) = service
            .create_match(new_match(on(3, 1), 1, 2, 3, 1))
            .await
        else {
            panic!("create failed");
        };

        assert_eq!(recorded.stored.id, MatchId::new(1));
        let a = row(&recorded.standings, 1);
        assert_eq!((a.played, a.points, a.goal_difference), (1, 3, 2));
        let b = row(&recorded.standings, 2);
        assert_eq!((b.losses, b.goals_for, b.goals_against), (1, 1, 3));
        assert_eq!(snapshot_points(&service, 1).await, vec![(on(3, 1), 3)]);
    }

    #[tokio::test]
    async fn create_rejects_unknown_team_without_writing() {
        let service = make_service(RecomputePolicy::AffectedDate);
        let result = service.create_match(new_match(on(3, 1), 1, 42, 0, 0)).await;
        assert!(matches!(result, Err(StandingsError::UnknownTeam(id)) if id == TeamId::new(42)));

        let same_side = service.create_match(new_match(on(3, 1), 1, 1, 0, 0)).await;
        assert!(matches!(same_side, Err(StandingsError::InvalidRequest(_))));

        let Ok(all) = service.list_matches(&MatchFilter::default()).await else {
            panic!("list failed");
        };
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn delete_only_match_resets_table_for_that_date() {
        let service = make_service(RecomputePolicy::AffectedDate);
        let Ok(recorded) = service
            .create_match(new_match(on(3, 1), 1, 2, 3, 1))
            .await
        else {
            panic!("create failed");
        };

        let Ok(deleted) = service.delete_match(recorded.stored.id).await else {
            panic!("delete failed");
        };
        for r in &deleted.standings {
            assert_eq!((r.played, r.points, r.goals_for, r.goal_difference), (0, 0, 0, 0));
        }
        assert_eq!(snapshot_points(&service, 1).await, vec![(on(3, 1), 0)]);

        let missing = service.delete_match(recorded.stored.id).await;
        assert!(matches!(missing, Err(StandingsError::MatchNotFound(_))));
    }

    #[tokio::test]
    async fn update_moving_a_match_recomputes_both_dates() {
        let service = make_service(RecomputePolicy::AffectedDate);
        let Ok(recorded) = service.create_match(new_match(on(3, 1), 1, 2, 1, 0)).await else {
            panic!("create failed");
        };

        let moved = new_match(on(3, 8), 1, 2, 0, 2);
        let Ok(updated) = service.update_match(recorded.stored.id, moved).await else {
            panic!("update failed");
        };
        assert_eq!(row(&updated.standings, 2).points, 3);
        assert_eq!(
            snapshot_points(&service, 1).await,
            vec![(on(3, 1), 0), (on(3, 8), 0)]
        );
        assert_eq!(
            snapshot_points(&service, 2).await,
            vec![(on(3, 1), 0), (on(3, 8), 3)]
        );
    }

    #[tokio::test]
    async fn cascade_recomputes_later_snapshots() {
        let service = make_service(RecomputePolicy::Cascade);
        let _ = service.create_match(new_match(on(3, 8), 2, 3, 0, 0)).await;
        let _ = service.create_match(new_match(on(3, 1), 1, 2, 2, 0)).await;

        // The 3-08 snapshot must include the earlier win added afterwards.
        assert_eq!(
            snapshot_points(&service, 1).await,
            vec![(on(3, 1), 3), (on(3, 8), 3)]
        );

        let service = make_service(RecomputePolicy::AffectedDate);
        let _ = service.create_match(new_match(on(3, 8), 2, 3, 0, 0)).await;
        let _ = service.create_match(new_match(on(3, 1), 1, 2, 2, 0)).await;
        assert_eq!(
            snapshot_points(&service, 1).await,
            vec![(on(3, 1), 3), (on(3, 8), 0)]
        );
    }

    #[tokio::test]
    async fn standings_and_history_read_back() {
        let service = make_service(RecomputePolicy::Cascade);
        let _ = service.create_match(new_match(on(3, 1), 1, 2, 3, 1)).await;
        let _ = service.create_match(new_match(on(3, 8), 3, 1, 2, 0)).await;

        let Ok(table) = service.standings(2025, on(3, 1)).await else {
            panic!("standings failed");
        };
        assert_eq!(table.year, 2025);
        assert_eq!(table.rows.first().map(|r| r.team_id), Some(TeamId::new(1)));

        let Ok(history) = service.history(TeamId::new(1), 2025).await else {
            panic!("history failed");
        };
        let series: Vec<(NaiveDate, usize, u32, u32)> = history
            .iter()
            .map(|e| (e.date, e.position, e.points, e.played))
            .collect();
        assert_eq!(series, vec![(on(3, 1), 1, 3, 1), (on(3, 8), 2, 3, 2)]);
        assert_eq!(history.last().and_then(|e| e.efficiency_percent), Some(50.0));

        let Ok(idle) = service.history(TeamId::new(2), 2024).await else {
            panic!("history failed");
        };
        assert!(idle.is_empty());

        let unknown = service.history(TeamId::new(99), 2025).await;
        assert!(matches!(unknown, Err(StandingsError::TeamNotFound(_))));
    }

    /// Memory store wrapper that logs lock and read calls and can fail the
    /// snapshot upsert for one team.
    #[derive(Debug)]
    struct ObservedStore {
        inner: MemoryLeagueStore,
        failing_team: Option<TeamId>,
        log: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl ObservedStore {
        fn new(inner: MemoryLeagueStore, failing_team: Option<TeamId>) -> Self {
            Self {
                inner,
                failing_team,
                log: Arc::default(),
            }
        }

        fn take_log(&self) -> Vec<String> {
            self.log
                .lock()
                .map(|mut log| std::mem::take(&mut *log))
                .unwrap_or_default()
        }
    }

    #[derive(Debug)]
    struct ObservedTransaction {
        inner: MemoryTransaction,
        failing_team: Option<TeamId>,
        log: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl ObservedTransaction {
        fn note(&self, entry: String) {
            if let Ok(mut log) = self.log.lock() {
                log.push(entry);
            }
        }
    }

    #[async_trait]
    impl LeagueStore for ObservedStore {
        type Tx = ObservedTransaction;

        async fn begin(&self) -> Result<Self::Tx, StandingsError> {
            Ok(ObservedTransaction {
                inner: self.inner.begin().await?,
                failing_team: self.failing_team,
                log: Arc::clone(&self.log),
            })
        }

        async fn list_teams(&self) -> Result<Vec<Team>, StandingsError> {
            self.inner.list_teams().await
        }

        async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>, StandingsError> {
            self.inner.list_matches(filter).await
        }

        async fn get_match(&self, id: MatchId) -> Result<Option<Match>, StandingsError> {
            LeagueStore::get_match(&self.inner, id).await
        }

        async fn query_snapshots(
            &self,
            team_id: TeamId,
            year: i32,
        ) -> Result<Vec<Snapshot>, StandingsError> {
            self.inner.query_snapshots(team_id, year).await
        }
    }

    #[async_trait]
    impl LeagueTransaction for ObservedTransaction {
        async fn list_teams(&mut self) -> Result<Vec<Team>, StandingsError> {
            self.inner.list_teams().await
        }

        async fn list_matches(
            &mut self,
            filter: &MatchFilter,
        ) -> Result<Vec<Match>, StandingsError> {
            self.note("matches".to_string());
            self.inner.list_matches(filter).await
        }

        async fn get_match(&mut self, id: MatchId) -> Result<Option<Match>, StandingsError> {
            LeagueTransaction::get_match(&mut self.inner, id).await
        }

        async fn insert_match(&mut self, new: &NewMatch) -> Result<Match, StandingsError> {
            self.inner.insert_match(new).await
        }

        async fn update_match(
            &mut self,
            id: MatchId,
            new: &NewMatch,
        ) -> Result<Option<Match>, StandingsError> {
            self.inner.update_match(id, new).await
        }

        async fn delete_match(&mut self, id: MatchId) -> Result<Option<Match>, StandingsError> {
            self.inner.delete_match(id).await
        }

        async fn upsert_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), StandingsError> {
            if Some(snapshot.team_id) == self.failing_team {
                return Err(StandingsError::PersistenceError("disk full".to_string()));
            }
            self.inner.upsert_snapshot(snapshot).await
        }

        async fn snapshot_dates(
            &mut self,
            year: i32,
            from: NaiveDate,
        ) -> Result<Vec<NaiveDate>, StandingsError> {
            self.inner.snapshot_dates(year, from).await
        }

        async fn lock_year(&mut self, year: i32) -> Result<(), StandingsError> {
            self.note(format!("lock {year}"));
            self.inner.lock_year(year).await
        }

        async fn commit(self) -> Result<(), StandingsError> {
            self.inner.commit().await
        }
    }

    #[tokio::test]
    async fn failed_upsert_rolls_back_match_and_snapshots() {
        let inner = MemoryLeagueStore::new(roster());
        let observed = Arc::new(ObservedStore::new(inner.clone(), Some(TeamId::new(3))));
        let service = LeagueService::new(observed, RankScope::AllYears, RecomputePolicy::Cascade);

        let result = service.create_match(new_match(on(3, 1), 1, 2, 3, 1)).await;
        assert!(matches!(result, Err(StandingsError::PersistenceError(_))));

        assert_eq!(inner.snapshot_count().await, 0);
        let Ok(all) = inner.list_matches(&MatchFilter::default()).await else {
            panic!("list failed");
        };
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn years_are_locked_in_order_before_matches_are_read() {
        let observed = Arc::new(ObservedStore::new(MemoryLeagueStore::new(roster()), None));
        let service = LeagueService::new(
            Arc::clone(&observed),
            RankScope::AllYears,
            RecomputePolicy::Cascade,
        );
        let Ok(recorded) = service.create_match(new_match(on(3, 1), 1, 2, 1, 0)).await else {
            panic!("create failed");
        };
        let log = observed.take_log();
        assert_eq!(log.first().map(String::as_str), Some("lock 2025"));

        let Some(december) = NaiveDate::from_ymd_opt(2024, 12, 1) else {
            panic!("valid date");
        };
        let moved = new_match(december, 1, 2, 1, 0);
        assert!(service.update_match(recorded.stored.id, moved).await.is_ok());

        let log = observed.take_log();
        let Some(first_read) = log.iter().position(|e| e == "matches") else {
            panic!("recording must read matches");
        };
        let before_read: Vec<&str> = log.iter().take(first_read).map(String::as_str).collect();
        assert_eq!(before_read.first(), Some(&"lock 2024"));
        assert!(before_read.contains(&"lock 2025"));
    }

    #[tokio::test]
    async fn oversized_goal_counts_are_rejected() {
        let service = make_service(RecomputePolicy::Cascade);
        let huge = new_match(on(3, 1), 1, 2, u32::MAX, 0);
        let first = service.create_match(huge.clone()).await;
        assert!(matches!(first, Err(StandingsError::InvalidRequest(_))));
        let second = service.create_match(huge).await;
        assert!(matches!(second, Err(StandingsError::InvalidRequest(_))));

        let Ok(table) = service.standings(2025, on(3, 1)).await else {
            panic!("standings failed");
        };
        assert!(table.rows.iter().all(|r| r.played == 0));
    }

    #[tokio::test]
    async fn oversized_stored_scores_do_not_break_reads() {
        let store = Arc::new(MemoryLeagueStore::new(roster()));
        let Ok(mut tx) = store.begin().await else {
            panic!("begin failed");
        };
        for _ in 0..2 {
            let inserted = tx.insert_match(&new_match(on(3, 1), 1, 2, u32::MAX, 0)).await;
            assert!(inserted.is_ok());
        }
        assert!(tx.commit().await.is_ok());

        let service = LeagueService::new(store, RankScope::AllYears, RecomputePolicy::Cascade);
        let Ok(table) = service.standings(2025, on(3, 1)).await else {
            panic!("standings failed");
        };
        assert_eq!(row(&table.rows, 1).goals_for, u32::MAX);
        assert!(service.create_match(new_match(on(3, 1), 1, 3, 1, 0)).await.is_ok());
    }
}
