//! Record store client: versioned get / put / conditional update over players,
//! tournaments and groups.
//!
//! Every record carries a [`Version`] that changes on each write. Conditional
//! writes name the version they were derived from and fail with
//! [`StoreError::Conflict`] when another writer got there first. The store is the
//! only point of coordination between concurrent requests.

mod memory;

pub use memory::MemoryStore;

use crate::models::{Group, GroupKey, Player, PlayerId, Tournament};
use thiserror::Error;

/// Record version token.
pub type Version = u64;

/// A record together with the version it was read at.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Versioned<T> {
    pub version: Version,
    pub value: T,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum StoreError {
    /// A conditional write lost to a concurrent writer (or the record already exists).
    #[error("conditional write on {key} lost to a concurrent writer")]
    Conflict { key: String },
    #[error("{key} not found")]
    NotFound { key: String },
    /// Store unreachable or failing.
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait RecordStore: Send + Sync {
    fn get_player(&self, id: PlayerId) -> StoreResult<Option<Versioned<Player>>>;
    /// Unconditional overwrite.
    fn put_player(&self, player: Player) -> StoreResult<Version>;
    /// Replace the player if its current version is `expected`.
    fn update_player(&self, expected: Version, player: Player) -> StoreResult<Version>;
    fn list_players(&self) -> StoreResult<Vec<Player>>;

    fn get_tournament(&self, id: &str) -> StoreResult<Option<Versioned<Tournament>>>;
    /// Create the tournament; `Conflict` if it already exists.
    fn insert_tournament(&self, tournament: Tournament) -> StoreResult<Version>;
    fn update_tournament(&self, expected: Version, tournament: Tournament) -> StoreResult<Version>;
    fn list_tournaments(&self) -> StoreResult<Vec<Tournament>>;

    fn get_group(&self, key: &GroupKey) -> StoreResult<Option<Versioned<Group>>>;
    /// Highest-numbered group of the tournament.
    fn last_group(&self, tournament_id: &str) -> StoreResult<Option<Versioned<Group>>>;
    /// All groups of the tournament in group id order.
    fn groups(&self, tournament_id: &str) -> StoreResult<Vec<Group>>;
    /// Create the group; `Conflict` if a group with the same key exists.
    fn insert_group(&self, group: Group) -> StoreResult<Version>;
    fn update_group(&self, expected: Version, group: Group) -> StoreResult<Version>;
    /// Atomically add `delta` to one player's score inside a group and return the
    /// new score. `NotFound` if the group or the player's record is missing.
    fn increment_score(&self, key: &GroupKey, player_id: PlayerId, delta: u32) -> StoreResult<u32>;
}
