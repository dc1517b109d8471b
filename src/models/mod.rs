//! Data structures: players, tournaments, groups.

mod group;
mod player;
mod tournament;

pub use group::{Group, GroupId, GroupKey, PlayerRecord};
pub use player::{Participation, Player, PlayerId};
pub use tournament::{tournament_id_for, Leaderboards, Tournament, TournamentId, GLOBAL_BOARD};
