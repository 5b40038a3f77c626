// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end board editing through the engine

use tacboard_core::{
    DrawingKind, EngineConfig, Membership, MemoryStore, NormalizedPoint, Player, PlayerId, Position,
    Roster, TacticsEngine, Zone,
};

fn squad() -> Roster {
    vec![
        Player::new("p1", "Keeper").with_shirt_number(1).with_position(Position::Goalkeeper),
        Player::new("p2", "Left back").with_shirt_number(3).with_position(Position::Defender),
        Player::new("p3", "Holding").with_shirt_number(6).with_position(Position::Midfielder),
        Player::new("p4", "Nine").with_shirt_number(9).with_position(Position::Forward),
    ]
    .into_iter()
    .collect()
}

fn p(x: f64, y: f64) -> NormalizedPoint {
    NormalizedPoint::new(x, y)
}

#[test]
fn test_lineup_session() {
    let store = MemoryStore::new();
    let mut engine = TacticsEngine::new(squad(), store.clone(), EngineConfig::default());
    let p1 = PlayerId::from("p1");
    let p2 = PlayerId::from("p2");
    let p3 = PlayerId::from("p3");

    // Two players dropped onto nearly the same spot
    assert_eq!(engine.drop_player(&p1, p(0.5, 0.5)), p(0.5, 0.5));
    let displaced = engine.drop_player(&p2, p(0.52, 0.51));
    assert!(displaced.distance(&p(0.5, 0.5)) >= 0.07);

    // Re-dropping keeps the placement identity and role
    let before = engine.active_board().placement(&p1).cloned().unwrap();
    assert!(engine.update_role(&p1, "Libero"));
    assert!(engine.update_zone(&p1, Some(Zone::Defense)));
    engine.drop_player(&p1, p(0.5, 0.85));
    let after = engine.active_board().placement(&p1).cloned().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.role.as_str(), "Libero");
    assert_eq!(after.zone, Some(Zone::Defense));

    // Exclusion and return
    engine.toggle_excluded(&p3);
    assert_eq!(engine.active_board().membership(&p3), Membership::Excluded);
    engine.drop_player(&p3, p(0.2, 0.2));
    assert_eq!(engine.active_board().membership(&p3), Membership::Placed);
    engine.toggle_excluded(&p3);
    engine.toggle_excluded(&p3);
    assert_eq!(engine.active_board().membership(&p3), Membership::Bench);

    // Every mutation reached the store
    let id = engine.active_scenario_id();
    let saved = store.board(&id).unwrap();
    assert_eq!(&saved, engine.active_board());
}

#[test]
fn test_drawing_tools() {
    let mut engine = TacticsEngine::new(squad(), MemoryStore::new(), EngineConfig::default());
    assert_eq!(engine.tool(), DrawingKind::Arrow);
    assert_eq!(engine.color(), "#FFD60A");

    engine.begin_drawing(p(0.2, 0.8));
    engine.update_drawing(p(0.4, 0.6));
    let arrow = engine.finish_drawing().unwrap();

    engine.set_tool(DrawingKind::Mark);
    engine.begin_drawing(p(0.3, 0.3));
    engine.update_drawing(p(0.35, 0.3));
    let mark = engine.finish_drawing().unwrap();

    let board = engine.active_board();
    assert_eq!(board.drawing(&arrow).unwrap().points.len(), 2);
    assert_eq!(board.drawing(&mark).unwrap().points, vec![p(0.35, 0.3)]);

    assert_eq!(engine.delete_all_drawings(), 2);
    assert_eq!(engine.delete_all_drawings(), 0);
}

#[test]
fn test_reset_layout_keeps_metadata() {
    let mut engine = TacticsEngine::new(squad(), MemoryStore::new(), EngineConfig::default());
    let id = engine.active_scenario_id();
    engine.drop_player(&PlayerId::from("p4"), p(0.5, 0.2));
    engine.toggle_excluded(&PlayerId::from("p2"));
    engine.toggle_show_zones();
    engine.move_opponent_marker(3, p(0.9, 0.9));
    engine.begin_drawing(p(0.1, 0.1));
    engine.update_drawing(p(0.2, 0.2));
    engine.finish_drawing();
    assert!(engine.rename_scenario(&id, "Pressing"));

    assert!(engine.reset_layout(&id));
    let board = engine.active_board().clone();
    assert!(board.placements.is_empty());
    assert!(board.excluded_player_ids.is_empty());
    assert!(board.drawings.is_empty());
    assert_eq!(board.bench_player_ids.len(), 4);
    assert_eq!(board.opponent_markers.len(), 11);

    let scenario = engine.active_scenario();
    assert_eq!(scenario.name, "Pressing");
    assert!(scenario.show_zones);
}
