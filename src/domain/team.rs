//! Roster entry.

use serde::{Deserialize, Serialize};

use super::TeamId;

/// A team taking part in the competition.
///
/// Owned by the roster collaborator; the standings engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Stable team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
}

impl Team {
    /// Creates a roster entry.
    #[must_use]
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
