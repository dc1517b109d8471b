//! In-process record store backed by locked maps.

use crate::models::{Group, GroupId, GroupKey, Player, PlayerId, Tournament, TournamentId};
use crate::store::{RecordStore, StoreError, StoreResult, Version, Versioned};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory [`RecordStore`]. Each collection sits behind its own lock,
/// so a conditional write is atomic with respect to every other write on that collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    players: RwLock<HashMap<PlayerId, Versioned<Player>>>,
    tournaments: RwLock<HashMap<TournamentId, Versioned<Tournament>>>,
    groups: RwLock<BTreeMap<GroupKey, Versioned<Group>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Unavailable("lock error".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Unavailable("lock error".to_string()))
}

/// Replace `slot` if it is still at `expected`, bumping the version.
fn swap<T>(slot: Option<&mut Versioned<T>>, expected: Version, value: T, key: String) -> StoreResult<Version> {
    match slot {
        None => Err(StoreError::NotFound { key }),
        Some(current) if current.version != expected => Err(StoreError::Conflict { key }),
        Some(current) => {
            current.version += 1;
            current.value = value;
            Ok(current.version)
        }
    }
}

fn group_range(tournament_id: &str) -> std::ops::RangeInclusive<GroupKey> {
    GroupKey::new(tournament_id, 0)..=GroupKey::new(tournament_id, GroupId::MAX)
}

impl RecordStore for MemoryStore {
    fn get_player(&self, id: PlayerId) -> StoreResult<Option<Versioned<Player>>> {
        Ok(read(&self.players)?.get(&id).cloned())
    }

    fn put_player(&self, player: Player) -> StoreResult<Version> {
        let mut players = write(&self.players)?;
        let version = players.get(&player.id).map_or(1, |p| p.version + 1);
        players.insert(player.id, Versioned { version, value: player });
        Ok(version)
    }

    fn update_player(&self, expected: Version, player: Player) -> StoreResult<Version> {
        let mut players = write(&self.players)?;
        let key = format!("player {}", player.id);
        swap(players.get_mut(&player.id), expected, player, key)
    }

    fn list_players(&self) -> StoreResult<Vec<Player>> {
        Ok(read(&self.players)?.values().map(|p| p.value.clone()).collect())
    }

    fn get_tournament(&self, id: &str) -> StoreResult<Option<Versioned<Tournament>>> {
        Ok(read(&self.tournaments)?.get(id).cloned())
    }

    fn insert_tournament(&self, tournament: Tournament) -> StoreResult<Version> {
        let mut tournaments = write(&self.tournaments)?;
        if tournaments.contains_key(&tournament.id) {
            return Err(StoreError::Conflict {
                key: format!("tournament {}", tournament.id),
            });
        }
        tournaments.insert(tournament.id.clone(), Versioned { version: 1, value: tournament });
        Ok(1)
    }

    fn update_tournament(&self, expected: Version, tournament: Tournament) -> StoreResult<Version> {
        let mut tournaments = write(&self.tournaments)?;
        let key = format!("tournament {}", tournament.id);
        swap(tournaments.get_mut(&tournament.id), expected, tournament, key)
    }

    fn list_tournaments(&self) -> StoreResult<Vec<Tournament>> {
        let mut all: Vec<Tournament> = read(&self.tournaments)?
            .values()
            .map(|t| t.value.clone())
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    fn get_group(&self, key: &GroupKey) -> StoreResult<Option<Versioned<Group>>> {
        Ok(read(&self.groups)?.get(key).cloned())
    }

    fn last_group(&self, tournament_id: &str) -> StoreResult<Option<Versioned<Group>>> {
        Ok(read(&self.groups)?
            .range(group_range(tournament_id))
            .next_back()
            .map(|(_, g)| g.clone()))
    }

    fn groups(&self, tournament_id: &str) -> StoreResult<Vec<Group>> {
        Ok(read(&self.groups)?
            .range(group_range(tournament_id))
            .map(|(_, g)| g.value.clone())
            .collect())
    }

    fn insert_group(&self, group: Group) -> StoreResult<Version> {
        let mut groups = write(&self.groups)?;
        let key = group.key();
        if groups.contains_key(&key) {
            return Err(StoreError::Conflict { key: key.to_string() });
        }
        groups.insert(key, Versioned { version: 1, value: group });
        Ok(1)
    }

    fn update_group(&self, expected: Version, group: Group) -> StoreResult<Version> {
        let mut groups = write(&self.groups)?;
        let key = group.key();
        let name = key.to_string();
        swap(groups.get_mut(&key), expected, group, name)
    }

    fn increment_score(&self, key: &GroupKey, player_id: PlayerId, delta: u32) -> StoreResult<u32> {
        let mut groups = write(&self.groups)?;
        let group = groups
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound { key: key.to_string() })?;
        let record = group
            .value
            .players
            .iter_mut()
            .find(|r| r.player_id == player_id)
            .ok_or_else(|| StoreError::NotFound {
                key: format!("player {player_id} in {key}"),
            })?;
        record.score = record.score.saturating_add(delta);
        let score = record.score;
        group.version += 1;
        Ok(score)
    }
}
