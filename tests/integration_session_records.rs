// Full result-record flow: a session played to game over against a real
// sqlite history database, then read back through the history queries.

use keyfall::curve::{GameVariant, Tier};
use keyfall::history::HistoryDb;
use keyfall::rng::SeededRandom;
use keyfall::session::{GamePhase, GameSession};
use tempfile::tempdir;

fn play_to_game_over(variant: GameVariant, tier: Tier, db: HistoryDb) {
    let mut session = GameSession::new(
        variant,
        tier,
        Box::new(SeededRandom::new(5)),
        Box::new(db),
    );
    session.start();

    // let everything escape
    let mut now_ms = 0u64;
    while session.phase() != GamePhase::GameOver {
        now_ms += 100;
        session.tick(now_ms);
        assert!(now_ms < 600_000, "session must end on its own");
    }
}

#[test]
fn completed_session_lands_in_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.db");

    play_to_game_over(
        GameVariant::Wordfall,
        Tier::Medium,
        HistoryDb::with_path(&path).unwrap(),
    );

    let db = HistoryDb::with_path(&path).unwrap();
    let entries = db.recent(10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, "wordfall");
    assert_eq!(entries[0].difficulty, "medium");
    assert_eq!(entries[0].score, 0);
    assert!(entries[0].time_spent > 0);
}

#[test]
fn best_score_tracks_each_game_separately() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.db");

    play_to_game_over(
        GameVariant::Wordfall,
        Tier::Hard,
        HistoryDb::with_path(&path).unwrap(),
    );
    play_to_game_over(
        GameVariant::Blockstack,
        Tier::Hard,
        HistoryDb::with_path(&path).unwrap(),
    );

    let db = HistoryDb::with_path(&path).unwrap();
    assert_eq!(db.totals().unwrap().sessions, 2);
    assert_eq!(db.best_score("wordfall", "hard").unwrap(), Some(0));
    assert_eq!(db.best_score("balloons", "hard").unwrap(), None);
}

#[test]
fn exported_csv_matches_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.db");

    play_to_game_over(
        GameVariant::Balloons,
        Tier::Easy,
        HistoryDb::with_path(&path).unwrap(),
    );

    let db = HistoryDb::with_path(&path).unwrap();
    let csv_path = dir.path().join("out.csv");
    db.export_csv(&csv_path).unwrap();

    let contents = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(contents.lines().count(), 2, "header plus one session");
    assert!(contents.contains("balloons"));
}
