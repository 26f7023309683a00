//! Service layer: business logic orchestration.
//!
//! [`LeagueService`] runs every match write inside one store transaction
//! and uses the [`recorder`] to persist the standings snapshots the write
//! affects.

pub mod league_service;
pub mod recorder;

pub use league_service::{LeagueService, RecordedMatch, StandingsTable};
