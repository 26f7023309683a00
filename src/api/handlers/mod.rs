//! REST endpoint handlers organized by resource.

pub mod matches;
pub mod standings;
pub mod system;
pub mod teams;

use axum::Router;

use crate::app_state::AppState;
use crate::persistence::LeagueStore;

/// Composes all resource routes under `/api/v1`.
pub fn routes<S: LeagueStore>() -> Router<AppState<S>> {
    Router::new()
        .merge(standings::routes())
        .merge(matches::routes())
        .merge(teams::routes())
}
