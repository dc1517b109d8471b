//! Eligibility gate for tournament entry.

use crate::config::EntryRules;
use crate::models::{Player, Tournament};
use chrono::{DateTime, Timelike, Utc};
use thiserror::Error;

/// Why a player may not enter a tournament.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Ineligible {
    #[error("tournament ended")]
    TournamentEnded,
    #[error("already entered")]
    AlreadyEntered,
    #[error("insufficient funds: entry costs {cost} coins, player has {coins}")]
    InsufficientFunds { coins: u64, cost: u64 },
    #[error("level too low: level {level}, minimum is {min}")]
    LevelTooLow { level: u32, min: u32 },
    #[error("deadline passed: entries close at {deadline}:00 UTC")]
    DeadlinePassed { deadline: u32 },
}

/// Decide whether `player` may enter `tournament` at `now`.
///
/// Rules are checked in a fixed order and the first failure wins:
/// 1. the tournament is still open,
/// 2. the player has not entered it already,
/// 3. the player can pay the entry cost,
/// 4. the player has reached the minimum level,
/// 5. the entry deadline (UTC hour) has not passed.
pub fn check_entry(
    player: &Player,
    tournament: &Tournament,
    now: DateTime<Utc>,
    rules: &EntryRules,
) -> Result<(), Ineligible> {
    if tournament.completed {
        return Err(Ineligible::TournamentEnded);
    }
    if player.has_entered(&tournament.id) {
        return Err(Ineligible::AlreadyEntered);
    }
    if player.coins < rules.cost {
        return Err(Ineligible::InsufficientFunds {
            coins: player.coins,
            cost: rules.cost,
        });
    }
    if player.level < rules.min_level {
        return Err(Ineligible::LevelTooLow {
            level: player.level,
            min: rules.min_level,
        });
    }
    if now.hour() >= rules.deadline_hour {
        return Err(Ineligible::DeadlinePassed {
            deadline: rules.deadline_hour,
        });
    }
    Ok(())
}
