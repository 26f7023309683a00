//! Snapshot recorder: persists the table for an affected date and
//! re-derives historical positions from stored snapshots.
//!
//! [`record_date`] is the atomic unit of the write path. It takes the
//! caller's open transaction, so the match mutation that triggered it and
//! every snapshot upsert commit or roll back together.

use chrono::{Datelike, NaiveDate};

use crate::domain::{
    HistoryEntry, Match, RankScope, Snapshot, StandingsRow, Team, TeamId, compute_standings,
    position_of,
};
use crate::error::StandingsError;
use crate::persistence::{LeagueTransaction, MatchFilter};

/// Records the table for the date of `m`, scoped to that date's year.
///
/// The match itself need not exist any more: after a delete this writes
/// the post-deletion table for the date the match used to occupy.
///
/// # Errors
///
/// Propagates the first storage error. The transaction is left
/// uncommitted and must be dropped by the caller.
pub async fn record<T: LeagueTransaction>(
    tx: &mut T,
    m: &Match,
) -> Result<Vec<StandingsRow>, StandingsError> {
    record_date(tx, m.date).await
}

/// Computes the table for `year(as_of)` as of `as_of` and upserts one
/// snapshot per row under `(team, year, as_of)`. Returns the ranked table.
///
/// The year lock is taken before the matches are read, so two writers
/// recording the same year run one after the other and the later one
/// sees the earlier one's match.
///
/// # Errors
///
/// Propagates the first storage error; a failed upsert is logged with
/// the team, date and the values that were being written.
pub async fn record_date<T: LeagueTransaction>(
    tx: &mut T,
    as_of: NaiveDate,
) -> Result<Vec<StandingsRow>, StandingsError> {
    let year = as_of.year();
    tx.lock_year(year).await?;
    let teams = tx.list_teams().await?;
    let matches = tx
        .list_matches(&MatchFilter::year_until(Some(year), as_of))
        .await?;
    let table = compute_standings(&teams, &matches, as_of, Some(year));

    for row in &table {
        let snapshot = Snapshot::from_row(row, year, as_of);
        if let Err(err) = tx.upsert_snapshot(&snapshot).await {
            tracing::error!(
                team_id = %row.team_id,
                %as_of,
                year,
                played = row.played,
                points = row.points,
                wins = row.wins,
                draws = row.draws,
                losses = row.losses,
                goals_for = row.goals_for,
                goals_against = row.goals_against,
                error = %err,
                "snapshot upsert failed"
            );
            return Err(err);
        }
    }

    tracing::debug!(%as_of, year, rows = table.len(), "standings snapshot recorded");
    Ok(table)
}

/// Builds a team's history series from its snapshots.
///
/// Points and games come from each snapshot; the position is recomputed
/// from `matches` as of the snapshot date, restricted to the snapshot's
/// year only under [`RankScope::SnapshotYear`]. A team missing from the
/// recomputed table gets position `0`.
#[must_use]
pub fn reconstruct_history(
    team_id: TeamId,
    snapshots: &[Snapshot],
    teams: &[Team],
    matches: &[Match],
    scope: RankScope,
) -> Vec<HistoryEntry> {
    snapshots
        .iter()
        .map(|snapshot| {
            let table = compute_standings(
                teams,
                matches,
                snapshot.as_of_date,
                scope.year_filter(snapshot.year),
            );
            HistoryEntry {
                date: snapshot.as_of_date,
                position: position_of(&table, team_id),
                points: snapshot.points,
                played: snapshot.played,
                efficiency_percent: snapshot.efficiency_percent(),
            }
        })
        .collect()
}
