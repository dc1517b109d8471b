//! Rewards by rank within the player's own group.
//!
//! Ranking is group-local rather than global so that every group produces winners,
//! however strong the other groups were.

use crate::config::RewardTable;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::models::{PlayerId, PlayerRecord};
use crate::store::RecordStore;

/// Coins paid for a 0-based `rank` within a group.
pub fn reward_tier(rank: usize, table: &RewardTable) -> u64 {
    match rank {
        0 => table.first,
        1 => table.second,
        2 => table.third,
        r if r <= table.last_paid_rank => table.default,
        _ => 0,
    }
}

impl<S: RecordStore> Engine<S> {
    /// The player's group in `tournament_id`, ranked by score (ties keep entry order).
    pub fn group_standings(&self, tournament_id: &str, player_id: PlayerId) -> Result<Vec<PlayerRecord>, EngineError> {
        let player = self.player(player_id)?;
        let participation = player
            .participation(tournament_id)
            .ok_or_else(|| EngineError::NotEntered(tournament_id.to_string()))?;
        let group = self
            .load_group(tournament_id, participation.group_id)
            .map_err(|e| match e {
                EngineError::GroupNotFound { .. } => {
                    log::error!("Player {player_id} participates in a missing group: {e}");
                    EngineError::Integrity(format!("player {player_id} participates in a missing group: {e}"))
                }
                other => other,
            })?;
        Ok(group.value.standings())
    }

    /// Claim the player's reward for a closed tournament and credit it to their
    /// balance. Returns the amount, which is zero past the last paid rank; the claim
    /// is recorded either way and cannot be repeated.
    pub fn claim_reward(&self, tournament_id: &str, player_id: PlayerId) -> Result<u64, EngineError> {
        let tournament = self.tournament(tournament_id)?;
        if !tournament.completed {
            return Err(EngineError::NotCompleted(tournament.id));
        }
        let player = self.player(player_id)?;
        match player.participation(tournament_id) {
            None => return Err(EngineError::NotEntered(tournament.id)),
            Some(p) if p.reward_claimed => return Err(EngineError::AlreadyClaimed(tournament.id)),
            Some(_) => {}
        }

        let standings = self.group_standings(tournament_id, player_id)?;
        let rank = standings
            .iter()
            .position(|r| r.player_id == player_id)
            .ok_or_else(|| {
                log::error!("Player {player_id} is missing from their group in tournament {tournament_id}");
                EngineError::Integrity(format!(
                    "player {player_id} is missing from their group in tournament {tournament_id}"
                ))
            })?;
        let amount = reward_tier(rank, &self.config.rewards);

        self.update_player_with(player_id, |player| {
            let participation = player
                .tournaments
                .get_mut(tournament_id)
                .ok_or_else(|| EngineError::NotEntered(tournament_id.to_string()))?;
            if participation.reward_claimed {
                return Err(EngineError::AlreadyClaimed(tournament_id.to_string()));
            }
            participation.reward_claimed = true;
            player.coins = player.coins.saturating_add(amount);
            Ok(true)
        })?;
        log::info!("Player {player_id} claimed {amount} coins for tournament {tournament_id} (rank {rank})");
        Ok(amount)
    }
}
