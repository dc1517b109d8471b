//! Tournament business logic: eligibility, group assignment, scoring,
//! leaderboards and rewards.

mod assignment;
mod eligibility;
mod leaderboard;
mod progress;
mod reward;

pub use eligibility::{check_entry, Ineligible};
pub use leaderboard::{compute_leaderboards, write_leaderboard_csv, CloseOutcome};
pub use reward::reward_tier;
