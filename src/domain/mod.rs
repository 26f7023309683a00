//! Domain layer: core types, the standings calculator and snapshots.
//!
//! This module contains the server-side domain model: team and match
//! identity, outcome classification, the pure standings aggregation and
//! the persisted snapshot shape with its derived history series.

pub mod ids;
pub mod matches;
pub mod snapshot;
pub mod standings;
pub mod team;

pub use ids::{MatchId, TeamId};
pub use matches::{Match, NewMatch, Outcome};
pub use snapshot::{HistoryEntry, RankScope, Snapshot, SnapshotKey};
pub use standings::{StandingsRow, compute_standings, position_of};
pub use team::Team;
