//! Player profile and per-tournament participation.

use crate::models::group::GroupId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a player.
pub type PlayerId = Uuid;

/// A player's membership in one tournament.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub group_id: GroupId,
    pub reward_claimed: bool,
}

impl Participation {
    pub fn new(group_id: GroupId) -> Self {
        Self {
            group_id,
            reward_claimed: false,
        }
    }
}

/// A player profile.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub level: u32,
    pub coins: u64,
    /// Country code, used for the per-country leaderboards.
    pub country: String,
    /// At most one entry per tournament; entries are never removed.
    #[serde(default)]
    pub tournaments: HashMap<TournamentId, Participation>,
}

impl Player {
    /// Create a new player with a fresh id and no tournament history.
    pub fn new(username: impl Into<String>, country: impl Into<String>, level: u32, coins: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            level,
            coins,
            country: country.into(),
            tournaments: HashMap::new(),
        }
    }

    pub fn participation(&self, tournament_id: &str) -> Option<&Participation> {
        self.tournaments.get(tournament_id)
    }

    pub fn has_entered(&self, tournament_id: &str) -> bool {
        self.tournaments.contains_key(tournament_id)
    }
}
