//! In-memory implementation of the persistence layer.
//!
//! [`MemoryLeagueStore`] keeps all league data behind one
//! [`tokio::sync::Mutex`]. A transaction takes the lock for its whole
//! lifetime and works on a staged copy of the data; [`commit`] swaps the
//! copy in, and dropping the transaction discards it. Writers are
//! therefore fully serialized, which gives the same isolation for the
//! snapshot upsert that a database unique key does.
//!
//! [`commit`]: LeagueTransaction::commit

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{LeagueStore, LeagueTransaction, MatchFilter};
use crate::domain::{Match, MatchId, NewMatch, Snapshot, SnapshotKey, Team, TeamId};
use crate::error::StandingsError;

/// Everything the store holds.
#[derive(Debug, Clone, Default)]
struct LeagueData {
    teams: Vec<Team>,
    matches: BTreeMap<MatchId, Match>,
    snapshots: BTreeMap<SnapshotKey, Snapshot>,
    last_match_id: i64,
}

impl LeagueData {
    fn matches(&self, filter: &MatchFilter) -> Vec<Match> {
        let mut found: Vec<Match> = self
            .matches
            .values()
            .filter(|m| filter.accepts(m))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        found
    }
}

/// Process-local store for tests and database-less runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryLeagueStore {
    data: Arc<Mutex<LeagueData>>,
}

impl MemoryLeagueStore {
    /// Creates a store with the given roster and no matches.
    #[must_use]
    pub fn new(mut teams: Vec<Team>) -> Self {
        teams.sort_by_key(|t| t.id);
        Self {
            data: Arc::new(Mutex::new(LeagueData {
                teams,
                ..LeagueData::default()
            })),
        }
    }

    /// Creates a store seeded with [`default_roster`].
    #[must_use]
    pub fn with_default_roster() -> Self {
        Self::new(default_roster())
    }

    /// Number of snapshot rows currently committed.
    pub async fn snapshot_count(&self) -> usize {
        self.data.lock().await.snapshots.len()
    }
}

/// Staged unit of work holding the store lock until commit or drop.
#[derive(Debug)]
pub struct MemoryTransaction {
    guard: OwnedMutexGuard<LeagueData>,
    staged: LeagueData,
}

#[async_trait]
impl LeagueStore for MemoryLeagueStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, StandingsError> {
        let guard = Arc::clone(&self.data).lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTransaction { guard, staged })
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StandingsError> {
        Ok(self.data.lock().await.teams.clone())
    }

    async fn list_matches(&self, filter: &MatchFilter) -> Result<Vec<Match>, StandingsError> {
        Ok(self.data.lock().await.matches(filter))
    }

    async fn get_match(&self, id: MatchId) -> Result<Option<Match>, StandingsError> {
        Ok(self.data.lock().await.matches.get(&id).cloned())
    }

    async fn query_snapshots(
        &self,
        team_id: TeamId,
        year: i32,
    ) -> Result<Vec<Snapshot>, StandingsError> {
        let data = self.data.lock().await;
        Ok(data
            .snapshots
            .values()
            .filter(|s| s.team_id == team_id && s.year == year)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LeagueTransaction for MemoryTransaction {
    async fn list_teams(&mut self) -> Result<Vec<Team>, StandingsError> {
        Ok(self.staged.teams.clone())
    }

    async fn list_matches(&mut self, filter: &MatchFilter) -> Result<Vec<Match>, StandingsError> {
        Ok(self.staged.matches(filter))
    }

    async fn get_match(&mut self, id: MatchId) -> Result<Option<Match>, StandingsError> {
        Ok(self.staged.matches.get(&id).cloned())
    }

    async fn insert_match(&mut self, new: &NewMatch) -> Result<Match, StandingsError> {
        self.staged.last_match_id += 1;
        let stored = new.clone().with_id(MatchId::new(self.staged.last_match_id));
        self.staged.matches.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_match(
        &mut self,
        id: MatchId,
        new: &NewMatch,
    ) -> Result<Option<Match>, StandingsError> {
        let Some(slot) = self.staged.matches.get_mut(&id) else {
            return Ok(None);
        };
        *slot = new.clone().with_id(id);
        Ok(Some(slot.clone()))
    }

    async fn delete_match(&mut self, id: MatchId) -> Result<Option<Match>, StandingsError> {
        Ok(self.staged.matches.remove(&id))
    }

    async fn upsert_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), StandingsError> {
        self.staged
            .snapshots
            .insert(snapshot.key(), snapshot.clone());
        Ok(())
    }

    async fn snapshot_dates(
        &mut self,
        year: i32,
        from: NaiveDate,
    ) -> Result<Vec<NaiveDate>, StandingsError> {
        let mut dates: Vec<NaiveDate> = self
            .staged
            .snapshots
            .keys()
            .filter(|k| k.year == year && k.as_of_date >= from)
            .map(|k| k.as_of_date)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }

    async fn lock_year(&mut self, _year: i32) -> Result<(), StandingsError> {
        // The store lock is already held for the whole transaction.
        Ok(())
    }

    async fn commit(self) -> Result<(), StandingsError> {
        let Self { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }
}

/// The twenty-club roster the schema migration seeds.
#[must_use]
pub fn default_roster() -> Vec<Team> {
    [
        "Avaí FC",
        "Fluminense",
        "São Paulo",
        "Coritiba FC",
        "Atlético-GO",
        "Atlético-MG",
        "Fortaleza",
        "Juventude",
        "Palmeiras",
        "Botafogo",
        "Goiás",
        "Cuiabá-MT",
        "América-MG",
        "Corinthians",
        "Athletico-PR",
        "RB Bragantino",
        "Santos",
        "Flamengo",
        "Ceará SC",
        "Internacional",
    ]
    .into_iter()
    .zip(1_i64..)
    .map(|(name, id)| Team::new(TeamId::new(id), name))
    .collect()
}
