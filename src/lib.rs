//! # league-standings
//!
//! League standings engine with per-date historical snapshots, served
//! over a REST API.
//!
//! Every recorded, corrected or deleted match result recomputes the table
//! as of the match date and persists one snapshot row per team inside
//! the same transaction as the match write. Historical positions are
//! re-derived from those snapshots.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── LeagueService (service/)
//!     ├── Snapshot recorder (service/recorder)
//!     │
//!     ├── compute_standings (domain/)
//!     │
//!     └── LeagueStore: PostgreSQL | in-memory (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
