//! Leaderboard aggregation and tournament close.

mod common;

use common::{engine, engine_with, entered_players, morning, set_score, small_groups, TOURNAMENT};
use std::collections::HashMap;
use tournament_engine::{
    compute_leaderboards, write_leaderboard_csv, CloseOutcome, EngineConfig, EngineError, Ineligible,
    PlayerRecord, RecordStore, GLOBAL_BOARD,
};
use uuid::Uuid;

fn record(score: u32, country: &str) -> PlayerRecord {
    PlayerRecord {
        player_id: Uuid::new_v4(),
        score,
        country: country.to_string(),
    }
}

#[test]
fn boards_sort_by_score_and_keep_ties_in_order() {
    let records = vec![
        record(10, "TR"),
        record(30, "US"),
        record(10, "US"),
        record(30, "TR"),
        record(20, "TR"),
    ];
    let ids: Vec<_> = records.iter().map(|r| r.player_id).collect();

    let boards = compute_leaderboards(&records, 1000, 1000);

    assert_eq!(boards[GLOBAL_BOARD], vec![ids[1], ids[3], ids[4], ids[0], ids[2]]);
    assert_eq!(boards["TR"], vec![ids[3], ids[4], ids[0]]);
    assert_eq!(boards["US"], vec![ids[1], ids[2]]);
    assert_eq!(boards.len(), 3);
}

#[test]
fn boards_are_truncated() {
    let records: Vec<_> = (0..10).map(|i| record(i, if i % 2 == 0 { "TR" } else { "US" })).collect();

    let boards = compute_leaderboards(&records, 3, 2);

    assert_eq!(boards[GLOBAL_BOARD].len(), 3);
    assert_eq!(boards[GLOBAL_BOARD][0], records[9].player_id);
    assert_eq!(boards["TR"], vec![records[8].player_id, records[6].player_id]);
    assert_eq!(boards["US"], vec![records[9].player_id, records[7].player_id]);
}

#[test]
fn no_records_give_an_empty_global_board_only() {
    let boards = compute_leaderboards(&Vec::<PlayerRecord>::new(), 10, 10);
    assert_eq!(boards.len(), 1);
    assert!(boards[GLOBAL_BOARD].is_empty());
}

#[test]
fn closing_an_empty_tournament_is_not_an_error() {
    let engine = engine();
    engine.open_tournament(TOURNAMENT).unwrap();

    let outcome = engine.close(TOURNAMENT).unwrap();

    assert!(matches!(outcome, CloseOutcome::Closed(_)));
    assert_eq!(outcome.leaderboards().len(), 1);
    assert!(outcome.leaderboards()[GLOBAL_BOARD].is_empty());
    assert!(engine.tournament(TOURNAMENT).unwrap().completed);
}

#[test]
fn close_merges_every_group() {
    let engine = engine_with(small_groups(3));
    let ids = entered_players(&engine, 8);
    let scores = [5, 1, 9, 3, 7, 7, 2, 8];
    for (id, score) in ids.iter().zip(scores) {
        set_score(&engine, *id, score);
    }
    assert_eq!(engine.groups(TOURNAMENT).unwrap().len(), 3);

    let outcome = engine.close(TOURNAMENT).unwrap();

    let boards = outcome.leaderboards();
    assert_eq!(
        boards[GLOBAL_BOARD],
        vec![ids[2], ids[7], ids[4], ids[5], ids[0], ids[3], ids[6], ids[1]]
    );
    // Even indices are TR, odd are US.
    assert_eq!(boards["TR"], vec![ids[2], ids[4], ids[0], ids[6]]);
    assert_eq!(boards["US"], vec![ids[7], ids[5], ids[3], ids[1]]);

    let stored = engine.tournament(TOURNAMENT).unwrap();
    assert!(stored.completed);
    assert_eq!(&stored.leaderboards, boards);
}

#[test]
fn global_board_is_ordered_and_bounded() {
    let config = EngineConfig {
        global_leaderboard_len: 5,
        local_leaderboard_len: 2,
        ..small_groups(4)
    };
    let engine = engine_with(config);
    let ids = entered_players(&engine, 12);
    for (i, id) in ids.iter().enumerate() {
        set_score(&engine, *id, (i as u32 * 7) % 11);
    }

    engine.close(TOURNAMENT).unwrap();

    let scores: HashMap<_, _> = engine
        .groups(TOURNAMENT)
        .unwrap()
        .into_iter()
        .flat_map(|g| g.players)
        .map(|r| (r.player_id, r.score))
        .collect();
    let board = engine.leaderboard(TOURNAMENT, GLOBAL_BOARD).unwrap();
    assert_eq!(board.len(), 5);
    assert!(board.windows(2).all(|w| scores[&w[0]] >= scores[&w[1]]));
    assert_eq!(engine.leaderboard(TOURNAMENT, "TR").unwrap().len(), 2);
}

#[test]
fn closing_twice_changes_nothing() {
    let engine = engine();
    let ids = entered_players(&engine, 4);
    set_score(&engine, ids[3], 4);

    let first = engine.close(TOURNAMENT).unwrap();
    let version = engine.store().get_tournament(TOURNAMENT).unwrap().unwrap().version;
    let group_version = engine
        .store()
        .get_group(&tournament_engine::GroupKey::new(TOURNAMENT, 0))
        .unwrap()
        .unwrap()
        .version;

    let second = engine.close(TOURNAMENT).unwrap();

    assert!(matches!(second, CloseOutcome::AlreadyClosed(_)));
    assert_eq!(first.leaderboards(), second.leaderboards());
    assert_eq!(
        engine.store().get_tournament(TOURNAMENT).unwrap().unwrap().version,
        version
    );
    assert_eq!(
        engine
            .store()
            .get_group(&tournament_engine::GroupKey::new(TOURNAMENT, 0))
            .unwrap()
            .unwrap()
            .version,
        group_version
    );
}

#[test]
fn closed_tournament_refuses_entries() {
    let engine = engine();
    entered_players(&engine, 1);
    engine.close(TOURNAMENT).unwrap();
    let late = common::eligible_player(&engine, "late", "TR");

    assert!(matches!(
        engine.enter_at(TOURNAMENT, late, morning()),
        Err(EngineError::Ineligible(Ineligible::TournamentEnded))
    ));
}

#[test]
fn closing_an_unknown_tournament_is_not_found() {
    let engine = engine();
    assert!(matches!(
        engine.close("1999-01-01"),
        Err(EngineError::TournamentNotFound(_))
    ));
}

#[test]
fn leaderboard_lookup_needs_a_closed_tournament_and_a_known_country() {
    let engine = engine();
    entered_players(&engine, 2);

    assert!(matches!(
        engine.leaderboard(TOURNAMENT, GLOBAL_BOARD),
        Err(EngineError::NotCompleted(_))
    ));

    engine.close(TOURNAMENT).unwrap();
    assert_eq!(engine.leaderboard(TOURNAMENT, GLOBAL_BOARD).unwrap().len(), 2);
    assert!(matches!(
        engine.leaderboard(TOURNAMENT, "DE"),
        Err(EngineError::CountryNotFound(c)) if c == "DE"
    ));
}

#[test]
fn leaderboard_exports_as_csv() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let mut out = Vec::new();

    write_leaderboard_csv(&[a, b], &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, format!("rank,player_id\n1,{a}\n2,{b}\n"));
}
