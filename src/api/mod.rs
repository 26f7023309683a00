//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; `/health` sits at
//! the root.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;
use crate::persistence::LeagueStore;

pub use openapi::ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router<S: LeagueStore>() -> Router<AppState<S>> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
