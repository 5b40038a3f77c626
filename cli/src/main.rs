// SPDX-License-Identifier: MIT OR Apache-2.0

//! tacboard CLI - headless front end for the board engine
//!
//! Reads one command per line from stdin and prints the pitch after each
//! change. Useful for scripting and for poking at the engine without a UI.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use tacboard_cli::render;
use tacboard_cli::{
    demo_roster, parse_command, resolve_drawing, resolve_player, Command, ScenarioCommand, SelectTarget,
    HELP,
};
use tacboard_core::archiver::{archive_snapshot, find_archive, read_snapshot_archive};
use tacboard_core::config::{default_config_path, load_config};
use tacboard_core::scenario::ScenarioFlag;
use tacboard_core::{
    DrawingId, EngineConfig, MemoryStore, PlayerId, Roster, SharedEngine, TacticsEngine,
};
use tokio::io::AsyncBufReadExt;
use tokio::signal;
use tracing_subscriber::EnvFilter;

const ARCHIVE_NAME: &str = "workspace";

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(
    name = "tacboard-cli",
    about = "Tactical formation board command-line interface",
    version
)]
struct Args {
    /// Engine config file (TOML); defaults to the user config directory
    #[clap(long)]
    config: Option<PathBuf>,

    /// Roster file (JSON array of players)
    #[clap(long)]
    roster: Option<PathBuf>,

    /// Directory holding the workspace archive
    #[clap(long)]
    archive: Option<PathBuf>,

    /// Enable debug logging
    #[clap(long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_roster(path: Option<&Path>) -> Result<Roster> {
    let Some(path) = path else {
        return Ok(demo_roster());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster file: {}", path.display()))?;
    Roster::from_json_str(&json).with_context(|| format!("Failed to parse roster file: {}", path.display()))
}

fn build_engine(args: &Args, config: EngineConfig, roster: Roster) -> Result<TacticsEngine> {
    let store = MemoryStore::new();
    let archived = args.archive.as_deref().and_then(|dir| find_archive(dir, ARCHIVE_NAME));
    match archived {
        Some(path) => {
            let snapshot = read_snapshot_archive(&path)?;
            tracing::info!("Loaded workspace from {}", path.display());
            Ok(TacticsEngine::from_snapshot(snapshot, roster, store, config))
        }
        None => Ok(TacticsEngine::new(roster, store, config)),
    }
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config_path = match args.config.clone() {
        Some(path) => path,
        None => default_config_path()?,
    };
    let config = load_config(&config_path)?;
    let roster = load_roster(args.roster.as_deref())?;
    let engine = SharedEngine::new(build_engine(&args, config, roster)?);

    run_repl(engine, args.archive).await
}

/// Read commands until `quit`, EOF or Ctrl+C
async fn run_repl(engine: SharedEngine, archive: Option<PathBuf>) -> Result<()> {
    print_board(&engine);
    println!("Type 'help' for commands.");

    let mut stdin_lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                println!("\nReceived Ctrl+C, shutting down...");
                break;
            }

            result = stdin_lines.next_line() => {
                let line = match result {
                    Ok(Some(line)) => line,
                    Ok(None) => break, // EOF
                    Err(e) => {
                        eprintln!("Error reading input: {}", e);
                        continue;
                    }
                };

                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                };

                match command {
                    Command::Quit => break,
                    Command::Save => {
                        if let Err(e) = save_archive(&engine, archive.as_deref()) {
                            eprintln!("Failed to save: {:#}", e);
                        }
                    }
                    command => {
                        let redraw = match execute(&engine, command) {
                            Ok(redraw) => redraw,
                            Err(e) => {
                                eprintln!("{}", e);
                                continue;
                            }
                        };
                        if redraw {
                            print_board(&engine);
                        }
                    }
                }
            }
        }
    }

    save_archive(&engine, archive.as_deref())
}

fn save_archive(engine: &SharedEngine, dir: Option<&Path>) -> Result<()> {
    let Some(dir) = dir else {
        println!("No --archive directory given, nothing saved.");
        return Ok(());
    };
    let snapshot = engine.lock().snapshot();
    let path = archive_snapshot(&snapshot, dir, ARCHIVE_NAME)?;
    println!("Saved workspace to {}", path.display());
    Ok(())
}

fn player(engine: &TacticsEngine, reference: &str) -> Result<PlayerId> {
    resolve_player(engine.roster(), reference).ok_or_else(|| anyhow!("Unknown player '{}'", reference))
}

fn drawing(engine: &mut TacticsEngine, prefix: &str) -> Result<DrawingId> {
    resolve_drawing(engine.active_board(), prefix)
}

/// Apply a command; returns whether the pitch should be redrawn
fn execute(shared: &SharedEngine, command: Command) -> Result<bool> {
    let mut engine = shared.lock();
    match command {
        Command::Help => {
            println!("{}", HELP);
            return Ok(false);
        }
        Command::Players => {
            print_players(&mut engine);
            return Ok(false);
        }
        Command::Show => {}
        Command::Export => {
            let board = engine.active_board();
            println!("{}", serde_json::to_string_pretty(board)?);
            return Ok(false);
        }
        Command::Drop { player: reference, point } => {
            let id = player(&engine, &reference)?;
            let landed = engine.drop_player(&id, point);
            if landed != point {
                println!("Spot taken, placed at ({:.2}, {:.2})", landed.x(), landed.y());
            }
        }
        Command::Move { player: reference, point } => {
            let id = player(&engine, &reference)?;
            if engine.move_player(&id, point).is_none() {
                return Err(anyhow!("{} is not on the pitch", reference));
            }
        }
        Command::Bench(reference) => {
            let id = player(&engine, &reference)?;
            engine.send_to_bench(&id);
        }
        Command::Exclude(reference) => {
            let id = player(&engine, &reference)?;
            engine.toggle_excluded(&id);
        }
        Command::Role { player: reference, role } => {
            let id = player(&engine, &reference)?;
            if !engine.update_role(&id, &role) {
                return Err(anyhow!("{} is not on the pitch", reference));
            }
        }
        Command::Zone { player: reference, zone } => {
            let id = player(&engine, &reference)?;
            if !engine.update_zone(&id, zone) {
                return Err(anyhow!("{} is not on the pitch", reference));
            }
        }
        Command::Tool(tool) => {
            engine.set_tool(tool);
            return Ok(false);
        }
        Command::Temp(enabled) => {
            engine.set_temporary_mode(enabled);
            return Ok(false);
        }
        Command::Draw(points) => {
            let mut points = points.into_iter();
            if let Some(start) = points.next() {
                engine.begin_drawing(start);
            }
            for point in points {
                engine.update_drawing(point);
            }
            match engine.finish_drawing() {
                Some(id) => println!("Drawing {}", id),
                None => return Err(anyhow!("Incomplete drawing for tool {:?}", engine.tool())),
            }
        }
        Command::Persist(prefix) => {
            let id = drawing(&mut engine, &prefix)?;
            engine.persist_temporary_drawing(&id);
        }
        Command::ToggleTemp(prefix) => {
            let id = drawing(&mut engine, &prefix)?;
            engine.toggle_temporary(&id);
        }
        Command::Erase(prefix) => {
            let id = drawing(&mut engine, &prefix)?;
            engine.delete_drawing(&id);
        }
        Command::EraseAll => {
            engine.delete_all_drawings();
        }
        Command::Select { target, additive } => {
            match target {
                SelectTarget::Player(reference) => {
                    let id = player(&engine, &reference)?;
                    engine.select_player(&id, additive);
                }
                SelectTarget::Drawing(prefix) => {
                    let id = drawing(&mut engine, &prefix)?;
                    engine.select_drawing(&id, additive);
                }
            }
            print_selection(&engine);
            return Ok(false);
        }
        Command::ClearSelection => {
            engine.clear_selection();
            return Ok(false);
        }
        Command::DeleteSelection => engine.delete_selection(),
        Command::Scenario(command) => return scenario_command(&mut engine, command),
        Command::Flag(flag) => {
            match flag {
                ScenarioFlag::ShowOpponent => engine.toggle_show_opponent(),
                ScenarioFlag::ShowZones => engine.toggle_show_zones(),
                ScenarioFlag::ShowLines => engine.toggle_show_lines(),
                ScenarioFlag::DrawingsVisible => engine.toggle_drawings_visible(),
            };
        }
        Command::Opponent(mode) => {
            engine.set_opponent_mode(mode);
        }
        Command::Save | Command::Quit => return Ok(false),
    }
    Ok(true)
}

fn scenario_command(engine: &mut TacticsEngine, command: ScenarioCommand) -> Result<bool> {
    let active = engine.active_scenario_id();
    match command {
        ScenarioCommand::List => {
            for (index, scenario) in engine.scenarios().iter().enumerate() {
                let marker = if scenario.id == active { '>' } else { ' ' };
                println!(
                    "{} {}. {} (updated {})",
                    marker,
                    index + 1,
                    scenario.name,
                    scenario.updated_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
            return Ok(false);
        }
        ScenarioCommand::New(name) => {
            engine.create_scenario(&name);
        }
        ScenarioCommand::Duplicate => {
            engine.duplicate_scenario(&active);
        }
        ScenarioCommand::Rename(name) => {
            engine.rename_scenario(&active, &name);
        }
        ScenarioCommand::Delete => {
            engine.delete_scenario(&active);
        }
        ScenarioCommand::Reset => {
            engine.reset_layout(&active);
        }
        ScenarioCommand::Use(n) => {
            let id = engine
                .scenarios()
                .get(n - 1)
                .map(|s| s.id)
                .ok_or_else(|| anyhow!("No scenario number {}", n))?;
            engine.select_scenario(&id);
        }
    }
    Ok(true)
}

fn print_board(shared: &SharedEngine) {
    let mut engine = shared.lock();
    let scenario = engine.active_scenario().clone();
    let lifetime = engine.config().temporary_drawing_lifetime();
    let board = engine.active_board().clone();

    println!(
        "\nScenario: {}  opponent: {:?}  zones: {}  lines: {}  drawings: {}",
        scenario.name,
        board.opponent_mode,
        scenario.show_zones,
        scenario.show_lines,
        scenario.drawings_visible
    );
    println!("{}", render::render_pitch(&board, &scenario, engine.roster()));
    if !board.drawings.is_empty() {
        println!("Drawings:");
        print!("{}", render::render_drawings(&board, Utc::now(), lifetime));
    }
}

fn print_players(engine: &mut TacticsEngine) {
    let placements = engine.placements();
    println!("On the pitch:");
    for placement in &placements {
        let name = engine
            .roster()
            .get(&placement.player_id)
            .map(|p| p.name.as_str())
            .unwrap_or("?");
        let zone = placement.zone.map(|z| format!(" {:?}", z)).unwrap_or_default();
        println!(
            "  {} {} [{}]{} ({:.2}, {:.2})",
            placement.player_id,
            name,
            placement.role,
            zone,
            placement.point.x(),
            placement.point.y()
        );
    }

    println!("Bench:");
    for player in engine.bench_players() {
        println!("  {} {} #{}", player.id, player.name, shirt(player.shirt_number));
    }

    let excluded = engine.excluded_players();
    if !excluded.is_empty() {
        println!("Not available:");
        for player in excluded {
            println!("  {} {} #{}", player.id, player.name, shirt(player.shirt_number));
        }
    }
}

fn shirt(number: Option<u8>) -> String {
    number.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_selection(engine: &TacticsEngine) {
    let selection = engine.selection();
    if selection.is_empty() {
        println!("Nothing selected");
        return;
    }
    for id in selection.players() {
        println!("  player {}", id);
    }
    for id in selection.drawings() {
        println!("  drawing {}", id);
    }
}
