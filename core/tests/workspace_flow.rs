// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scenario management, snapshots and archives

use anyhow::Result;
use tacboard_core::archiver::{archive_snapshot, find_archive, read_snapshot_archive};
use tacboard_core::{
    DrawingKind, EngineConfig, MemoryStore, NormalizedPoint, Player, PlayerId, Roster, TacticsEngine,
};

fn squad() -> Roster {
    (1..=5)
        .map(|n| Player::new(format!("p{}", n), format!("Player {}", n)).with_shirt_number(n))
        .collect()
}

#[test]
fn test_duplicate_is_independent() {
    let mut engine = TacticsEngine::new(squad(), MemoryStore::new(), EngineConfig::default());
    let source = engine.active_scenario_id();
    engine.drop_player(&PlayerId::from("p1"), NormalizedPoint::new(0.5, 0.5));

    let copy = engine.duplicate_scenario(&source).unwrap();
    assert_eq!(engine.active_scenario_id(), copy);
    assert_eq!(engine.active_scenario().name, "Startelf");
    engine.drop_player(&PlayerId::from("p1"), NormalizedPoint::new(0.1, 0.1));

    let original = engine.board_state(&source).unwrap().placement(&PlayerId::from("p1")).unwrap();
    assert_eq!(original.point, NormalizedPoint::new(0.5, 0.5));
    assert!(engine.duplicate_scenario(&tacboard_core::ScenarioId::new()).is_none());
}

#[test]
fn test_last_active_from_store_wins_over_first() {
    let mut engine = TacticsEngine::new(squad(), MemoryStore::new(), EngineConfig::default());
    engine.active_scenario_id();
    let second = engine.create_scenario("Second");
    let snapshot = {
        let mut snapshot = engine.snapshot();
        snapshot.active = None;
        snapshot
    };

    let store = MemoryStore::with_last_active(second);
    let mut restored = TacticsEngine::from_snapshot(snapshot, squad(), store, EngineConfig::default());
    assert_eq!(restored.active_scenario_id(), second);
}

#[test]
fn test_archive_roundtrip_restores_engine() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut engine = TacticsEngine::new(squad(), MemoryStore::new(), EngineConfig::default());
    engine.drop_player(&PlayerId::from("p2"), NormalizedPoint::new(0.3, 0.6));
    engine.toggle_excluded(&PlayerId::from("p5"));
    engine.add_neutral_marker(NormalizedPoint::new(0.5, 0.5), "Ball");
    engine.set_tool(DrawingKind::Line);
    engine.begin_drawing(NormalizedPoint::new(0.1, 0.1));
    engine.update_drawing(NormalizedPoint::new(0.9, 0.9));
    engine.finish_drawing();
    let active = engine.active_scenario_id();

    let path = archive_snapshot(&engine.snapshot(), dir.path(), "workspace")?;
    assert_eq!(find_archive(dir.path(), "workspace"), Some(path.clone()));

    let snapshot = read_snapshot_archive(&path)?;
    assert_eq!(snapshot, engine.snapshot());

    let mut restored =
        TacticsEngine::from_snapshot(snapshot, squad(), MemoryStore::new(), EngineConfig::default());
    assert_eq!(restored.active_scenario_id(), active);
    let board = restored.active_board();
    assert_eq!(board.placements.len(), 1);
    assert_eq!(board.excluded_player_ids, vec![PlayerId::from("p5")]);
    assert_eq!(board.neutral_markers.len(), 1);
    assert_eq!(board.drawings.len(), 1);
    Ok(())
}

#[test]
fn test_expired_temporaries_dropped_on_restore() {
    let config = EngineConfig {
        temporary_drawing_lifetime_ms: 0,
        ..EngineConfig::default()
    };
    let mut engine = TacticsEngine::new(squad(), MemoryStore::new(), config.clone());
    engine.set_temporary_mode(true);
    engine.set_tool(DrawingKind::Mark);
    engine.begin_drawing(NormalizedPoint::new(0.4, 0.4));
    engine.finish_drawing().unwrap();
    engine.set_temporary_mode(false);
    engine.begin_drawing(NormalizedPoint::new(0.6, 0.6));
    let kept = engine.finish_drawing().unwrap();

    let mut restored = TacticsEngine::from_snapshot(engine.snapshot(), squad(), MemoryStore::new(), config);
    let drawings = &restored.active_board().drawings;
    assert_eq!(drawings.len(), 1);
    assert_eq!(drawings[0].id, kept);
}

#[test]
fn test_repair_on_restore() {
    let mut engine = TacticsEngine::new(squad(), MemoryStore::new(), EngineConfig::default());
    engine.drop_player(&PlayerId::from("p1"), NormalizedPoint::new(0.5, 0.5));

    let mut snapshot = engine.snapshot();
    let board = &mut snapshot.boards[0];
    board.bench_player_ids.push(PlayerId::from("p1"));
    board.excluded_player_ids.push(PlayerId::from("p2"));
    board.opponent_markers.pop();
    let orphan = tacboard_core::BoardState::new(tacboard_core::ScenarioId::new(), &squad());
    snapshot.boards.push(orphan);

    let mut restored = TacticsEngine::from_snapshot(snapshot, squad(), MemoryStore::new(), EngineConfig::default());
    assert_eq!(restored.snapshot().boards.len(), 1);
    let board = restored.active_board();
    assert!(!board.bench_player_ids.contains(&PlayerId::from("p1")));
    assert!(!board.bench_player_ids.contains(&PlayerId::from("p2")));
    assert_eq!(board.opponent_markers.len(), 11);
}
