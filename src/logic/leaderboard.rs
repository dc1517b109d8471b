//! Leaderboard aggregation at tournament close.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::models::{Leaderboards, PlayerId, PlayerRecord, GLOBAL_BOARD};
use crate::store::{RecordStore, StoreError};
use serde::Serialize;
use std::io;

/// Result of [`Engine::close`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CloseOutcome {
    /// This call computed and stored the leaderboards.
    Closed(Leaderboards),
    /// The tournament was already closed; nothing was written.
    AlreadyClosed(Leaderboards),
}

impl CloseOutcome {
    pub fn leaderboards(&self) -> &Leaderboards {
        match self {
            CloseOutcome::Closed(boards) | CloseOutcome::AlreadyClosed(boards) => boards,
        }
    }
}

/// Rank `records` by score, highest first; equal scores keep their given order.
/// The first `global_len` ids form the global board, and every country present
/// gets a board of its first `local_len` ids.
pub fn compute_leaderboards<'a>(
    records: impl IntoIterator<Item = &'a PlayerRecord>,
    global_len: usize,
    local_len: usize,
) -> Leaderboards {
    let mut ranked: Vec<&PlayerRecord> = records.into_iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));

    let mut boards = Leaderboards::new();
    boards.insert(
        GLOBAL_BOARD.to_string(),
        ranked.iter().take(global_len).map(|r| r.player_id).collect(),
    );
    for record in &ranked {
        if record.country == GLOBAL_BOARD {
            continue;
        }
        let board = boards.entry(record.country.clone()).or_default();
        if board.len() < local_len {
            board.push(record.player_id);
        }
    }
    boards
}

/// One CSV row of an exported leaderboard.
#[derive(Debug, Serialize)]
struct LeaderboardRow {
    rank: usize,
    player_id: PlayerId,
}

/// Write a leaderboard as `rank,player_id` CSV (ranks start at 1).
pub fn write_leaderboard_csv<W: io::Write>(board: &[PlayerId], writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for (i, player_id) in board.iter().enumerate() {
        out.serialize(LeaderboardRow {
            rank: i + 1,
            player_id: *player_id,
        })?;
    }
    out.flush()?;
    Ok(())
}

impl<S: RecordStore> Engine<S> {
    /// Close the tournament: aggregate every group into leaderboards and store them
    /// together with the completed flag in one conditional write.
    ///
    /// Closing an already closed tournament returns its stored leaderboards and
    /// writes nothing.
    pub fn close(&self, tournament_id: &str) -> Result<CloseOutcome, EngineError> {
        let attempts = self.config.max_write_retries.max(1);
        for _ in 0..attempts {
            let current = self.load_tournament(tournament_id)?;
            if current.value.completed {
                log::info!("Results had already been calculated for tournament {tournament_id}");
                return Ok(CloseOutcome::AlreadyClosed(current.value.leaderboards));
            }

            let groups = self.store.groups(tournament_id)?;
            let boards = compute_leaderboards(
                groups.iter().flat_map(|g| g.players.iter()),
                self.config.global_leaderboard_len,
                self.config.local_leaderboard_len,
            );

            let mut closed = current.value;
            closed.leaderboards = boards.clone();
            closed.completed = true;
            match self.store.update_tournament(current.version, closed) {
                Ok(_) => {
                    log::info!(
                        "Results are calculated for tournament {tournament_id}: {} groups, {} leaderboards",
                        groups.len(),
                        boards.len()
                    );
                    return Ok(CloseOutcome::Closed(boards));
                }
                Err(StoreError::Conflict { key }) => {
                    log::debug!("Close of {key} raced another writer, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(EngineError::Conflict {
            key: format!("tournament {tournament_id}"),
            attempts,
        })
    }

    /// Stored leaderboard of a closed tournament for a country code or `"ALL"`.
    pub fn leaderboard(&self, tournament_id: &str, country: &str) -> Result<Vec<PlayerId>, EngineError> {
        let tournament = self.tournament(tournament_id)?;
        if !tournament.completed {
            return Err(EngineError::NotCompleted(tournament.id));
        }
        tournament
            .leaderboard(country)
            .map(<[PlayerId]>::to_vec)
            .ok_or_else(|| EngineError::CountryNotFound(country.to_string()))
    }
}
