//! Tournament record and leaderboards.

use crate::models::player::PlayerId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tournament identifier: the UTC date the tournament runs on, `YYYY-MM-DD`.
pub type TournamentId = String;

/// Key of the leaderboard spanning every country.
pub const GLOBAL_BOARD: &str = "ALL";

/// Leaderboards by country code (or [`GLOBAL_BOARD`]), player ids by descending score.
pub type Leaderboards = BTreeMap<String, Vec<PlayerId>>;

/// Id of the tournament held on `date`.
pub fn tournament_id_for(date: NaiveDate) -> TournamentId {
    date.format("%Y-%m-%d").to_string()
}

/// A daily tournament.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    /// Set once, at close, together with `leaderboards`.
    pub completed: bool,
    #[serde(default)]
    pub leaderboards: Leaderboards,
}

impl Tournament {
    /// An open tournament with no leaderboards yet.
    pub fn new(id: impl Into<TournamentId>) -> Self {
        Self {
            id: id.into(),
            completed: false,
            leaderboards: Leaderboards::new(),
        }
    }

    pub fn leaderboard(&self, country: &str) -> Option<&[PlayerId]> {
        self.leaderboards.get(country).map(Vec::as_slice)
    }
}
