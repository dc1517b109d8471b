//! Score tracking for progress events (e.g. a completed game level).

use crate::engine::Engine;
use crate::error::EngineError;
use crate::models::{GroupKey, PlayerId};
use crate::store::{RecordStore, StoreError};

impl<S: RecordStore> Engine<S> {
    /// Apply one progress event for `player_id` during `tournament_id`.
    ///
    /// The level and coin reward is always granted. If the player entered the
    /// tournament and it is still open, their score in their group is raised as
    /// well; the new score is returned in that case.
    pub fn record_progress(&self, player_id: PlayerId, tournament_id: &str) -> Result<Option<u32>, EngineError> {
        let level_reward = self.config.progress_level_reward;
        let coin_reward = self.config.progress_coin_reward;
        let player = self.update_player_with(player_id, |player| {
            player.level = player.level.saturating_add(level_reward);
            player.coins = player.coins.saturating_add(coin_reward);
            Ok(true)
        })?;

        let Some(participation) = player.participation(tournament_id).copied() else {
            return Ok(None);
        };
        match self.store.get_tournament(tournament_id)? {
            Some(t) if t.value.completed => return Ok(None),
            Some(_) => {}
            None => {
                log::error!("Player {player_id} participates in tournament {tournament_id}, which is missing");
                return Err(EngineError::Integrity(format!(
                    "player {player_id} participates in missing tournament {tournament_id}"
                )));
            }
        }

        let key = GroupKey::new(tournament_id, participation.group_id);
        match self
            .store
            .increment_score(&key, player_id, self.config.progress_score_reward)
        {
            Ok(score) => Ok(Some(score)),
            Err(StoreError::NotFound { key: missing }) => {
                log::error!("Player {player_id} participates in {key} but {missing} is missing");
                Err(EngineError::Integrity(format!(
                    "player {player_id} participates in {key} but {missing} is missing"
                )))
            }
            Err(e) => Err(e.into()),
        }
    }
}
