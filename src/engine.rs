//! The engine facade: a record store plus configuration. Tournament operations
//! live in [`crate::logic`]; this module holds the directory lookups the request
//! layer needs around them.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::{Group, GroupId, GroupKey, Player, PlayerId, Tournament, GLOBAL_BOARD};
use crate::store::{RecordStore, StoreError, Versioned};

pub struct Engine<S> {
    pub(crate) store: S,
    pub(crate) config: EngineConfig,
}

impl<S: RecordStore> Engine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Sign up a player at the starting level and balance.
    pub fn create_player(&self, username: &str, country: &str) -> Result<Player, EngineError> {
        let username = username.trim();
        if username.chars().count() < self.config.username_min_length {
            return Err(EngineError::InvalidUsername {
                min: self.config.username_min_length,
            });
        }
        let country = country.trim().to_ascii_uppercase();
        if country.is_empty() || country == GLOBAL_BOARD {
            return Err(EngineError::InvalidCountry(country));
        }
        let player = Player::new(username, country, self.config.start_level, self.config.start_coins);
        self.store.put_player(player.clone())?;
        log::info!("Created player {} ({})", player.id, player.username);
        Ok(player)
    }

    pub fn player(&self, id: PlayerId) -> Result<Player, EngineError> {
        Ok(self.load_player(id)?.value)
    }

    pub fn players(&self) -> Result<Vec<Player>, EngineError> {
        Ok(self.store.list_players()?)
    }

    /// Create the tournament if it does not exist yet. Returns whether it was created.
    pub fn open_tournament(&self, id: &str) -> Result<bool, EngineError> {
        match self.store.insert_tournament(Tournament::new(id)) {
            Ok(_) => {
                log::info!("Opened tournament {id}");
                Ok(true)
            }
            Err(StoreError::Conflict { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn tournament(&self, id: &str) -> Result<Tournament, EngineError> {
        Ok(self.load_tournament(id)?.value)
    }

    pub fn tournaments(&self) -> Result<Vec<Tournament>, EngineError> {
        Ok(self.store.list_tournaments()?)
    }

    pub fn group(&self, tournament_id: &str, group_id: GroupId) -> Result<Group, EngineError> {
        Ok(self.load_group(tournament_id, group_id)?.value)
    }

    /// All groups of a tournament in group id order.
    pub fn groups(&self, tournament_id: &str) -> Result<Vec<Group>, EngineError> {
        Ok(self.store.groups(tournament_id)?)
    }

    pub(crate) fn load_player(&self, id: PlayerId) -> Result<Versioned<Player>, EngineError> {
        self.store
            .get_player(id)?
            .ok_or(EngineError::PlayerNotFound(id))
    }

    pub(crate) fn load_tournament(&self, id: &str) -> Result<Versioned<Tournament>, EngineError> {
        self.store
            .get_tournament(id)?
            .ok_or_else(|| EngineError::TournamentNotFound(id.to_string()))
    }

    pub(crate) fn load_group(&self, tournament_id: &str, group_id: GroupId) -> Result<Versioned<Group>, EngineError> {
        self.store
            .get_group(&GroupKey::new(tournament_id, group_id))?
            .ok_or_else(|| EngineError::GroupNotFound {
                tournament_id: tournament_id.to_string(),
                group_id,
            })
    }

    /// Apply `change` to the latest player record with a conditional write,
    /// re-reading on conflict. `change` sees the fresh record on each attempt; it
    /// may refuse by returning an error, or return `false` to leave the record as
    /// it is. Returns the resulting record.
    pub(crate) fn update_player_with<F>(&self, id: PlayerId, mut change: F) -> Result<Player, EngineError>
    where
        F: FnMut(&mut Player) -> Result<bool, EngineError>,
    {
        let attempts = self.config.max_write_retries.max(1);
        for attempt in 1..=attempts {
            let current = self.load_player(id)?;
            let mut player = current.value;
            if !change(&mut player)? {
                return Ok(player);
            }
            match self.store.update_player(current.version, player.clone()) {
                Ok(_) => return Ok(player),
                Err(StoreError::Conflict { key }) => {
                    log::debug!("Conflict on {key} (attempt {attempt}/{attempts}), retrying");
                    std::thread::yield_now();
                }
                Err(e) => return Err(e.into()),
            }
        }
        log::warn!("Giving up on player {id} after {attempts} conflicting writes");
        Err(EngineError::Conflict {
            key: format!("player {id}"),
            attempts,
        })
    }
}
