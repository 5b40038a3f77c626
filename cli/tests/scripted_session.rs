// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted session: parsed commands against a live engine

use tacboard_cli::render::render_pitch;
use tacboard_cli::{demo_roster, parse_command, resolve_drawing, resolve_player, Command};
use tacboard_core::{EngineConfig, MemoryStore, TacticsEngine};

#[test]
fn test_scripted_lineup() -> anyhow::Result<()> {
    let mut engine = TacticsEngine::new(demo_roster(), MemoryStore::new(), EngineConfig::default());

    let script = ["drop 1 0.5 0.95", "drop #9 0.5 0.3", "drop 10 0.51 0.31", "tool mark", "draw 0.7 0.2"];
    for line in script {
        match parse_command(line)?.expect("command") {
            Command::Drop { player, point } => {
                let id = resolve_player(engine.roster(), &player).expect("player");
                engine.drop_player(&id, point);
            }
            Command::Tool(tool) => engine.set_tool(tool),
            Command::Draw(points) => {
                engine.begin_drawing(points[0]);
                engine.finish_drawing().expect("mark");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    assert_eq!(engine.placements().len(), 3);
    let scenario = engine.active_scenario().clone();
    let board = engine.active_board().clone();
    let prefix = board.drawings[0].id.to_string()[..6].to_string();
    assert_eq!(resolve_drawing(&board, &prefix)?, board.drawings[0].id);

    let pitch = render_pitch(&board, &scenario, engine.roster());
    assert!(pitch.contains('1'));
    assert!(pitch.contains('9'));
    assert!(pitch.contains("10"));
    assert!(pitch.contains('x'));
    Ok(())
}
