//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tournament_engine::{
    Engine, EngineConfig, Group, GroupKey, MemoryStore, Player, PlayerId, RecordStore, StoreError,
    StoreResult, Tournament, Version, Versioned,
};

pub const TOURNAMENT: &str = "2024-05-01";

/// A time on the tournament day, before the entry deadline.
pub fn morning() -> DateTime<Utc> {
    at_hour(9)
}

pub fn at_hour(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
}

pub fn engine() -> Engine<MemoryStore> {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> Engine<MemoryStore> {
    Engine::new(MemoryStore::new(), config)
}

/// Config with a small group capacity and a generous retry budget.
pub fn small_groups(capacity: usize) -> EngineConfig {
    EngineConfig {
        group_max_capacity: capacity,
        max_write_retries: 10_000,
        ..EngineConfig::default()
    }
}

/// Store a player who passes every entry rule.
pub fn eligible_player<S: RecordStore>(engine: &Engine<S>, name: &str, country: &str) -> PlayerId {
    let player = Player::new(name, country, 20, 3000);
    let id = player.id;
    engine.store().put_player(player).unwrap();
    id
}

/// Open the tournament and enter `n` players in order, alternating countries.
pub fn entered_players(engine: &Engine<MemoryStore>, n: usize) -> Vec<PlayerId> {
    engine.open_tournament(TOURNAMENT).unwrap();
    (0..n)
        .map(|i| {
            let country = if i % 2 == 0 { "TR" } else { "US" };
            let id = eligible_player(engine, &format!("player{i}"), country);
            engine.enter_at(TOURNAMENT, id, morning()).unwrap();
            id
        })
        .collect()
}

/// Set a player's score inside their group of [`TOURNAMENT`].
pub fn set_score(engine: &Engine<MemoryStore>, player_id: PlayerId, score: u32) {
    let group_id = engine
        .player(player_id)
        .unwrap()
        .participation(TOURNAMENT)
        .unwrap()
        .group_id;
    let key = GroupKey::new(TOURNAMENT, group_id);
    let current = engine
        .group(TOURNAMENT, group_id)
        .unwrap()
        .record(player_id)
        .unwrap()
        .score;
    engine
        .store()
        .increment_score(&key, player_id, score - current)
        .unwrap();
}

/// Memory store whose writes can be made to fail on demand.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    /// Conditional group writes lose every race.
    pub group_conflicts: AtomicBool,
    /// Group writes fail as if the store were down.
    pub groups_down: AtomicBool,
    /// Conditional player writes lose every race.
    pub player_conflicts: AtomicBool,
}

impl FaultyStore {
    fn group_fault(&self, key: GroupKey) -> StoreResult<()> {
        if self.groups_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        if self.group_conflicts.load(Ordering::SeqCst) {
            return Err(StoreError::Conflict { key: key.to_string() });
        }
        Ok(())
    }
}

impl RecordStore for FaultyStore {
    fn get_player(&self, id: PlayerId) -> StoreResult<Option<Versioned<Player>>> {
        self.inner.get_player(id)
    }

    fn put_player(&self, player: Player) -> StoreResult<Version> {
        self.inner.put_player(player)
    }

    fn update_player(&self, expected: Version, player: Player) -> StoreResult<Version> {
        if self.player_conflicts.load(Ordering::SeqCst) {
            return Err(StoreError::Conflict {
                key: format!("player {}", player.id),
            });
        }
        self.inner.update_player(expected, player)
    }

    fn list_players(&self) -> StoreResult<Vec<Player>> {
        self.inner.list_players()
    }

    fn get_tournament(&self, id: &str) -> StoreResult<Option<Versioned<Tournament>>> {
        self.inner.get_tournament(id)
    }

    fn insert_tournament(&self, tournament: Tournament) -> StoreResult<Version> {
        self.inner.insert_tournament(tournament)
    }

    fn update_tournament(&self, expected: Version, tournament: Tournament) -> StoreResult<Version> {
        self.inner.update_tournament(expected, tournament)
    }

    fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        self.inner.list_tournaments()
    }

    fn get_group(&self, key: &GroupKey) -> StoreResult<Option<Versioned<Group>>> {
        self.inner.get_group(key)
    }

    fn last_group(&self, tournament_id: &str) -> StoreResult<Option<Versioned<Group>>> {
        self.inner.last_group(tournament_id)
    }

    fn groups(&self, tournament_id: &str) -> StoreResult<Vec<Group>> {
        self.inner.groups(tournament_id)
    }

    fn insert_group(&self, group: Group) -> StoreResult<Version> {
        self.group_fault(group.key())?;
        self.inner.insert_group(group)
    }

    fn update_group(&self, expected: Version, group: Group) -> StoreResult<Version> {
        self.group_fault(group.key())?;
        self.inner.update_group(expected, group)
    }

    fn increment_score(&self, key: &GroupKey, player_id: PlayerId, delta: u32) -> StoreResult<u32> {
        self.inner.increment_score(key, player_id, delta)
    }
}
