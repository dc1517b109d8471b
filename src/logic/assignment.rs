//! Group assignment: seat an entering player in the tournament's tail group, or
//! open the next group when the tail is full.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::logic::eligibility::{check_entry, Ineligible};
use crate::models::{Group, GroupId, GroupKey, Participation, PlayerId, PlayerRecord, Tournament};
use crate::store::{RecordStore, StoreError};
use chrono::{DateTime, Utc};

/// Outcome of a seat reservation.
struct Seat {
    group_id: GroupId,
    /// False when an earlier entry of the same player already held the seat.
    created: bool,
}

impl<S: RecordStore> Engine<S> {
    /// Enter `player_id` into `tournament_id` now. See [`Engine::enter_at`].
    pub fn enter(&self, tournament_id: &str, player_id: PlayerId) -> Result<GroupId, EngineError> {
        self.enter_at(tournament_id, player_id, Utc::now())
    }

    /// Enter `player_id` into `tournament_id` as of `now`, returning the assigned group.
    ///
    /// The group write comes first and is the source of truth; the participation
    /// record and the entry fee follow. If the player write is refused (the player
    /// entered concurrently, or no longer passes the gate) or keeps conflicting,
    /// a seat this call created is given back before the error is returned.
    pub fn enter_at(
        &self,
        tournament_id: &str,
        player_id: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<GroupId, EngineError> {
        let tournament = self.load_tournament(tournament_id)?.value;
        let player = self.load_player(player_id)?.value;
        check_entry(&player, &tournament, now, &self.config.entry)?;

        let record = PlayerRecord::new(player.id, player.country);
        let seat = self.reserve_seat(tournament_id, record.clone())?;
        let group_id = seat.group_id;

        match self.record_participation(&tournament, player_id, group_id, now) {
            Ok(()) => {
                // A concurrent entry sharing this seat may have released it meanwhile.
                self.confirm_seat(tournament_id, group_id, record)?;
                log::info!("Player {player_id} entered tournament {tournament_id} in group {group_id}");
                Ok(group_id)
            }
            Err(err @ (EngineError::Ineligible(_) | EngineError::Conflict { .. })) if seat.created => {
                if let Err(release_err) = self.release_seat(tournament_id, group_id, record) {
                    log::error!(
                        "Player {player_id} keeps a seat in group {tournament_id}/{group_id} without participation: {release_err}"
                    );
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Append `record` to the tail group if it has room, otherwise create the next
    /// group. Each attempt is a single conditional write; a lost race re-reads the
    /// tail and decides again.
    fn reserve_seat(&self, tournament_id: &str, record: PlayerRecord) -> Result<Seat, EngineError> {
        let capacity = self.config.group_max_capacity;
        let attempts = self.config.max_write_retries.max(1);
        for attempt in 1..=attempts {
            let written = match self.store.last_group(tournament_id)? {
                // A replayed entry finds its own seat.
                Some(tail) if tail.value.contains(record.player_id) => {
                    return Ok(Seat {
                        group_id: tail.value.group_id,
                        created: false,
                    });
                }
                Some(tail) if tail.value.has_room(capacity) => {
                    let mut group = tail.value;
                    let group_id = group.group_id;
                    group.players.push(record.clone());
                    self.store.update_group(tail.version, group).map(|_| group_id)
                }
                Some(tail) => {
                    let group_id = tail.value.group_id + 1;
                    let group = Group::with_player(tournament_id, group_id, record.clone());
                    self.store.insert_group(group).map(|_| group_id)
                }
                None => {
                    let group = Group::with_player(tournament_id, 0, record.clone());
                    self.store.insert_group(group).map(|_| 0)
                }
            };
            match written {
                Ok(group_id) => {
                    return Ok(Seat {
                        group_id,
                        created: true,
                    });
                }
                Err(StoreError::Conflict { key }) => {
                    log::debug!("Seat reservation lost on {key} (attempt {attempt}/{attempts}), retrying");
                    std::thread::yield_now();
                }
                Err(e) => return Err(e.into()),
            }
        }
        log::warn!(
            "Giving up seating player {} in tournament {tournament_id} after {attempts} conflicts",
            record.player_id
        );
        Err(EngineError::Conflict {
            key: format!("groups of tournament {tournament_id}"),
            attempts,
        })
    }

    /// Record the participation and charge the entry fee. Idempotent: a record for
    /// the same group is accepted as already written.
    fn record_participation(
        &self,
        tournament: &Tournament,
        player_id: PlayerId,
        group_id: GroupId,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let rules = &self.config.entry;
        self.update_player_with(player_id, |player| {
            if let Some(existing) = player.participation(&tournament.id) {
                if existing.group_id == group_id {
                    return Ok(false);
                }
                return Err(Ineligible::AlreadyEntered.into());
            }
            check_entry(player, tournament, now, rules)?;
            player
                .tournaments
                .insert(tournament.id.clone(), Participation::new(group_id));
            player.coins -= rules.cost;
            Ok(true)
        })?;
        Ok(())
    }

    /// Give back a seat whose participation write failed. A participation for this
    /// group written by a concurrent entry keeps the seat; one that lands while the
    /// seat is being removed puts it back.
    fn release_seat(&self, tournament_id: &str, group_id: GroupId, record: PlayerRecord) -> Result<(), EngineError> {
        let player_id = record.player_id;
        if self.participates_in(tournament_id, player_id, group_id)? {
            return Ok(());
        }
        let key = GroupKey::new(tournament_id, group_id);
        let attempts = self.config.max_write_retries.max(1);
        for _ in 0..attempts {
            let Some(current) = self.store.get_group(&key)? else {
                return Ok(());
            };
            if !current.value.contains(player_id) {
                return Ok(());
            }
            let mut group = current.value;
            group.players.retain(|r| r.player_id != player_id);
            match self.store.update_group(current.version, group) {
                Ok(_) => {
                    log::warn!("Released seat of player {player_id} in {key}");
                    if self.participates_in(tournament_id, player_id, group_id)? {
                        return self.confirm_seat(tournament_id, group_id, record);
                    }
                    return Ok(());
                }
                Err(StoreError::Conflict { .. }) => std::thread::yield_now(),
                Err(e) => return Err(e.into()),
            }
        }
        Err(EngineError::Conflict {
            key: key.to_string(),
            attempts,
        })
    }

    fn participates_in(&self, tournament_id: &str, player_id: PlayerId, group_id: GroupId) -> Result<bool, EngineError> {
        let player = self.load_player(player_id)?.value;
        Ok(player
            .participation(tournament_id)
            .is_some_and(|p| p.group_id == group_id))
    }

    /// Make sure the group named by a recorded participation holds the player,
    /// putting the seat back if it was released. A group refilled to capacity in
    /// the meantime cannot take it back, which is an integrity error.
    fn confirm_seat(&self, tournament_id: &str, group_id: GroupId, record: PlayerRecord) -> Result<(), EngineError> {
        let capacity = self.config.group_max_capacity;
        let attempts = self.config.max_write_retries.max(1);
        for _ in 0..attempts {
            let current = self.load_group(tournament_id, group_id)?;
            if current.value.contains(record.player_id) {
                return Ok(());
            }
            let key = current.value.key();
            if !current.value.has_room(capacity) {
                log::error!(
                    "Player {} participates in {key} but has no seat and the group is full",
                    record.player_id
                );
                return Err(EngineError::Integrity(format!(
                    "player {} participates in {key} but has no seat and the group is full",
                    record.player_id
                )));
            }
            let mut group = current.value;
            group.players.push(record.clone());
            match self.store.update_group(current.version, group) {
                Ok(_) => {
                    log::warn!("Restored seat of player {} in {key}", record.player_id);
                    return Ok(());
                }
                Err(StoreError::Conflict { .. }) => std::thread::yield_now(),
                Err(e) => return Err(e.into()),
            }
        }
        Err(EngineError::Conflict {
            key: GroupKey::new(tournament_id, group_id).to_string(),
            attempts,
        })
    }
}
