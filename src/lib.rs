//! Daily tournament engine: library with models, record store and business logic.
//!
//! Players enter a tournament and are seated in capacity-bounded groups; progress
//! events raise their group score; at close every group is aggregated into global
//! and per-country leaderboards, and players claim rewards by their rank in their
//! own group.

pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod logic;
pub mod models;
pub mod store;

pub use config::{EngineConfig, EntryRules, RewardTable};
pub use engine::Engine;
pub use error::{EngineError, ErrorKind};
pub use logic::{
    check_entry, compute_leaderboards, reward_tier, write_leaderboard_csv, CloseOutcome, Ineligible,
};
pub use models::{
    tournament_id_for, Group, GroupId, GroupKey, Leaderboards, Participation, Player, PlayerId,
    PlayerRecord, Tournament, TournamentId, GLOBAL_BOARD,
};
pub use store::{MemoryStore, RecordStore, StoreError, StoreResult, Version, Versioned};
