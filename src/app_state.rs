//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::LeagueService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug)]
pub struct AppState<S> {
    /// League service for all business logic.
    pub league_service: Arc<LeagueService<S>>,
}

impl<S> AppState<S> {
    /// Wraps a service for sharing across handlers.
    #[must_use]
    pub fn new(league_service: LeagueService<S>) -> Self {
        Self {
            league_service: Arc::new(league_service),
        }
    }
}

// Derived `Clone` would require `S: Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            league_service: Arc::clone(&self.league_service),
        }
    }
}
