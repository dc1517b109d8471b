//! Demo data: random players entered into a tournament with random progress.

use crate::engine::Engine;
use crate::error::EngineError;
use crate::models::Player;
use crate::store::RecordStore;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Meadow", "Aron", "Briana", "Jax", "Ayleen", "Zayn", "Vera", "Easton", "Sawyer", "Wilder",
    "Mikayla", "Devin", "Larry", "Kieran", "Morgan", "Miguel", "Juliana", "Cohen", "Parker",
];
const LAST_NAMES: &[&str] = &[
    "Prince", "Hood", "Burke", "Church", "Cortez", "Reed", "Estrada", "Owen", "Trejo", "Jordan",
    "Walls", "Bauer", "Winters", "Ho", "Lim", "Wang", "Patel", "Howard",
];
const COUNTRIES: &[&str] = &["TR", "US"];

/// Most progress events a demo player makes.
const MAX_DEMO_PROGRESS: usize = 5;

fn random_username<R: Rng>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Player");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("One");
    format!("{first}{last}#{}", rng.gen_range(0..100))
}

/// Create `count` random players eligible to enter, enter each one into
/// `tournament_id` as of `entered_at`, and record a few progress events for them.
/// Returns the created players as stored after seeding.
pub fn seed_demo<S: RecordStore, R: Rng>(
    engine: &Engine<S>,
    tournament_id: &str,
    count: usize,
    entered_at: DateTime<Utc>,
    rng: &mut R,
) -> Result<Vec<Player>, EngineError> {
    let rules = &engine.config().entry;
    engine.open_tournament(tournament_id)?;

    let mut seeded = Vec::with_capacity(count);
    for _ in 0..count {
        let country = COUNTRIES.choose(rng).copied().unwrap_or("US");
        let level = rng.gen_range(rules.min_level..rules.min_level + 90);
        let coins = rng.gen_range(10..100u64) * 100 + rules.cost;
        let player = Player::new(random_username(rng), country, level, coins);
        let id = player.id;
        engine.store().put_player(player)?;

        engine.enter_at(tournament_id, id, entered_at)?;
        for _ in 0..rng.gen_range(0..=MAX_DEMO_PROGRESS) {
            engine.record_progress(id, tournament_id)?;
        }
        seeded.push(engine.player(id)?);
    }
    log::info!("Seeded {count} demo players into tournament {tournament_id}");
    Ok(seeded)
}
