//! Groups: capacity-bounded buckets of players within one tournament.

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential group number within a tournament, starting at 0.
pub type GroupId = u32;

/// Composite key of a group. Ordering is by tournament, then group id.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct GroupKey {
    pub tournament_id: TournamentId,
    pub group_id: GroupId,
}

impl GroupKey {
    pub fn new(tournament_id: impl Into<TournamentId>, group_id: GroupId) -> Self {
        Self {
            tournament_id: tournament_id.into(),
            group_id,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {}/{}", self.tournament_id, self.group_id)
    }
}

/// One player's standing inside a group.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub score: u32,
    pub country: String,
}

impl PlayerRecord {
    pub fn new(player_id: PlayerId, country: impl Into<String>) -> Self {
        Self {
            player_id,
            score: 0,
            country: country.into(),
        }
    }
}

/// A group of one tournament. Records keep their insertion order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub tournament_id: TournamentId,
    pub group_id: GroupId,
    #[serde(default)]
    pub players: Vec<PlayerRecord>,
}

impl Group {
    /// A freshly created group holding a single player.
    pub fn with_player(tournament_id: impl Into<TournamentId>, group_id: GroupId, record: PlayerRecord) -> Self {
        Self {
            tournament_id: tournament_id.into(),
            group_id,
            players: vec![record],
        }
    }

    pub fn key(&self) -> GroupKey {
        GroupKey::new(self.tournament_id.clone(), self.group_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn has_room(&self, capacity: usize) -> bool {
        self.players.len() < capacity
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|r| r.player_id == player_id)
    }

    pub fn record(&self, player_id: PlayerId) -> Option<&PlayerRecord> {
        self.players.iter().find(|r| r.player_id == player_id)
    }

    /// Records ranked by score, highest first. Equal scores keep insertion order.
    pub fn standings(&self) -> Vec<PlayerRecord> {
        let mut ranked = self.players.clone();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}
