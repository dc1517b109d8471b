//! Engine configuration: entry rules, capacities, leaderboard sizes and reward tiers.

use serde::Deserialize;
use std::path::Path;

/// Rules the eligibility gate enforces on tournament entry.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct EntryRules {
    /// Coins deducted on entry; players with fewer are rejected.
    pub cost: u64,
    pub min_level: u32,
    /// Entries close at this UTC hour.
    pub deadline_hour: u32,
}

impl Default for EntryRules {
    fn default() -> Self {
        Self {
            cost: 500,
            min_level: 10,
            deadline_hour: 12,
        }
    }
}

/// Coin rewards by rank within a player's group.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct RewardTable {
    pub first: u64,
    pub second: u64,
    pub third: u64,
    /// Paid to ranks 3 through `last_paid_rank`.
    pub default: u64,
    pub last_paid_rank: usize,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            first: 5000,
            second: 4000,
            third: 3000,
            default: 1000,
            last_paid_rank: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub username_min_length: usize,
    pub start_level: u32,
    pub start_coins: u64,
    pub progress_level_reward: u32,
    pub progress_coin_reward: u64,
    /// Score added to the player's group record per progress event.
    pub progress_score_reward: u32,
    pub entry: EntryRules,
    pub group_max_capacity: usize,
    pub global_leaderboard_len: usize,
    pub local_leaderboard_len: usize,
    pub rewards: RewardTable,
    /// Attempts per conditional write before a conflict is surfaced.
    pub max_write_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            username_min_length: 3,
            start_level: 1,
            start_coins: 3000,
            progress_level_reward: 1,
            progress_coin_reward: 100,
            progress_score_reward: 1,
            entry: EntryRules::default(),
            group_max_capacity: 35,
            global_leaderboard_len: 1000,
            local_leaderboard_len: 1000,
            rewards: RewardTable::default(),
            max_write_retries: 8,
        }
    }
}

/// Failure to load a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl EngineConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
