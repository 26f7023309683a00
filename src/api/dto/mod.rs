//! Data Transfer Objects for REST request/response serialization.
//!
//! Identifiers travel as plain JSON integers and dates as `YYYY-MM-DD`
//! strings.

pub mod common_dto;
pub mod match_dto;
pub mod standings_dto;
pub mod team_dto;

pub use common_dto::*;
pub use match_dto::*;
pub use standings_dto::*;
pub use team_dto::*;
