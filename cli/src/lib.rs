// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line-oriented command parsing for the tacboard REPL

pub mod render;

use anyhow::{anyhow, bail, Result};
use tacboard_core::scenario::ScenarioFlag;
use tacboard_core::{
    BoardState, DrawingId, DrawingKind, NormalizedPoint, OpponentMode, Player, PlayerId, Position,
    Roster, Zone,
};

/// What a `select` command targets
#[derive(Debug, Clone, PartialEq)]
pub enum SelectTarget {
    Player(String),
    Drawing(String),
}

/// Scenario sub-commands
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioCommand {
    List,
    New(String),
    Duplicate,
    Rename(String),
    Delete,
    Reset,
    /// 1-based position in the scenario list
    Use(usize),
}

/// A parsed REPL line. Player and drawing references stay unresolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Players,
    Show,
    Export,
    Drop { player: String, point: NormalizedPoint },
    Move { player: String, point: NormalizedPoint },
    Bench(String),
    Exclude(String),
    Role { player: String, role: String },
    Zone { player: String, zone: Option<Zone> },
    Tool(DrawingKind),
    Temp(bool),
    Draw(Vec<NormalizedPoint>),
    Persist(String),
    ToggleTemp(String),
    Erase(String),
    EraseAll,
    Select { target: SelectTarget, additive: bool },
    ClearSelection,
    DeleteSelection,
    Scenario(ScenarioCommand),
    Flag(ScenarioFlag),
    Opponent(OpponentMode),
    Save,
    Quit,
}

pub const HELP: &str = "\
players | show | export
drop <player> <x> <y> | move <player> <x> <y>
bench <player> | exclude <player>
role <player> <name> | zone <player> <defense|midfield|attack|none>
tool <line|arrow|mark> | temp <on|off> | draw <x> <y> [<x2> <y2>]
persist <drawing> | toggle-temp <drawing> | erase <drawing> | erase-all
select player|drawing <id> [add] | clear-selection | delete-selection
scenario list|new <name>|dup|rename <name>|delete|reset|use <n>
flag opponent|zones|lines|drawings | opponent hidden|markers|formation
save | quit";

fn coordinate(token: Option<&&str>) -> Result<f64> {
    let token = token.ok_or_else(|| anyhow!("Missing coordinate"))?;
    token
        .parse::<f64>()
        .map_err(|_| anyhow!("Invalid coordinate '{}'", token))
}

fn point(tokens: &[&str], at: usize) -> Result<NormalizedPoint> {
    let x = coordinate(tokens.get(at))?;
    let y = coordinate(tokens.get(at + 1))?;
    Ok(NormalizedPoint::new(x, y))
}

fn argument(tokens: &[&str], at: usize, what: &str) -> Result<String> {
    tokens
        .get(at)
        .map(|t| t.to_string())
        .ok_or_else(|| anyhow!("Missing {}", what))
}

fn rest(tokens: &[&str], from: usize, what: &str) -> Result<String> {
    let joined = tokens.get(from..).unwrap_or_default().join(" ");
    if joined.is_empty() {
        bail!("Missing {}", what);
    }
    Ok(joined)
}

/// Parse one input line. Empty lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(None);
    };

    let command = match head.to_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "players" => Command::Players,
        "show" => Command::Show,
        "export" => Command::Export,
        "drop" => Command::Drop {
            player: argument(&tokens, 1, "player")?,
            point: point(&tokens, 2)?,
        },
        "move" => Command::Move {
            player: argument(&tokens, 1, "player")?,
            point: point(&tokens, 2)?,
        },
        "bench" => Command::Bench(argument(&tokens, 1, "player")?),
        "exclude" => Command::Exclude(argument(&tokens, 1, "player")?),
        "role" => Command::Role {
            player: argument(&tokens, 1, "player")?,
            role: rest(&tokens, 2, "role name")?,
        },
        "zone" => {
            let player = argument(&tokens, 1, "player")?;
            let name = argument(&tokens, 2, "zone")?;
            let zone = match name.to_lowercase().as_str() {
                "none" => None,
                other => Some(Zone::parse(other).ok_or_else(|| anyhow!("Unknown zone '{}'", name))?),
            };
            Command::Zone { player, zone }
        }
        "tool" => {
            let name = argument(&tokens, 1, "tool")?;
            Command::Tool(DrawingKind::parse(&name).ok_or_else(|| anyhow!("Unknown tool '{}'", name))?)
        }
        "temp" => match tokens.get(1).copied() {
            Some("on") => Command::Temp(true),
            Some("off") => Command::Temp(false),
            _ => bail!("Usage: temp <on|off>"),
        },
        "draw" => {
            let mut points = vec![point(&tokens, 1)?];
            if tokens.len() > 3 {
                points.push(point(&tokens, 3)?);
            }
            Command::Draw(points)
        }
        "persist" => Command::Persist(argument(&tokens, 1, "drawing")?),
        "toggle-temp" => Command::ToggleTemp(argument(&tokens, 1, "drawing")?),
        "erase" => Command::Erase(argument(&tokens, 1, "drawing")?),
        "erase-all" => Command::EraseAll,
        "select" => {
            let id = argument(&tokens, 2, "id")?;
            let target = match tokens.get(1).copied() {
                Some("player") => SelectTarget::Player(id),
                Some("drawing") => SelectTarget::Drawing(id),
                _ => bail!("Usage: select player|drawing <id> [add]"),
            };
            let additive = tokens.get(3) == Some(&"add");
            Command::Select { target, additive }
        }
        "clear-selection" => Command::ClearSelection,
        "delete-selection" => Command::DeleteSelection,
        "scenario" => Command::Scenario(parse_scenario(&tokens)?),
        "flag" => Command::Flag(match tokens.get(1).copied() {
            Some("opponent") => ScenarioFlag::ShowOpponent,
            Some("zones") => ScenarioFlag::ShowZones,
            Some("lines") => ScenarioFlag::ShowLines,
            Some("drawings") => ScenarioFlag::DrawingsVisible,
            _ => bail!("Usage: flag opponent|zones|lines|drawings"),
        }),
        "opponent" => Command::Opponent(match tokens.get(1).copied() {
            Some("hidden") => OpponentMode::Hidden,
            Some("markers") => OpponentMode::Markers,
            Some("formation") => OpponentMode::Formation,
            _ => bail!("Usage: opponent hidden|markers|formation"),
        }),
        "save" => Command::Save,
        "quit" | "exit" => Command::Quit,
        other => bail!("Unknown command '{}', try 'help'", other),
    };
    Ok(Some(command))
}

fn parse_scenario(tokens: &[&str]) -> Result<ScenarioCommand> {
    let command = match tokens.get(1).copied() {
        Some("list") | None => ScenarioCommand::List,
        Some("new") => ScenarioCommand::New(tokens.get(2..).unwrap_or_default().join(" ")),
        Some("dup") => ScenarioCommand::Duplicate,
        Some("rename") => ScenarioCommand::Rename(rest(tokens, 2, "scenario name")?),
        Some("delete") => ScenarioCommand::Delete,
        Some("reset") => ScenarioCommand::Reset,
        Some("use") => {
            let n = argument(tokens, 2, "scenario number")?;
            match n.parse::<usize>() {
                Ok(n) if n > 0 => ScenarioCommand::Use(n),
                _ => bail!("Invalid scenario number '{}'", n),
            }
        }
        Some(other) => bail!("Unknown scenario command '{}'", other),
    };
    Ok(command)
}

/// Look a player up by id, falling back to shirt number
pub fn resolve_player(roster: &Roster, reference: &str) -> Option<PlayerId> {
    let id = PlayerId::from(reference);
    if roster.contains(&id) {
        return Some(id);
    }
    let number = reference.trim_start_matches('#').parse::<u8>().ok()?;
    roster.find_by_shirt_number(number).map(|p| p.id.clone())
}

/// Resolve a drawing by a unique prefix of its id
pub fn resolve_drawing(board: &BoardState, prefix: &str) -> Result<DrawingId> {
    let prefix = prefix.to_lowercase();
    let mut matches = board
        .drawings
        .iter()
        .filter(|d| d.id.to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(drawing), None) => Ok(drawing.id),
        (None, _) => bail!("No drawing matches '{}'", prefix),
        (Some(_), Some(_)) => bail!("Drawing prefix '{}' is ambiguous", prefix),
    }
}

/// Squad used when no roster file is given
pub fn demo_roster() -> Roster {
    const SQUAD: [(&str, u8, Position); 16] = [
        ("Keller", 1, Position::Goalkeeper),
        ("Brandt", 2, Position::Defender),
        ("Vogel", 3, Position::Defender),
        ("Hoffmann", 4, Position::Defender),
        ("Schulz", 5, Position::Defender),
        ("Wagner", 6, Position::Midfielder),
        ("Becker", 7, Position::Midfielder),
        ("Richter", 8, Position::Midfielder),
        ("Krause", 9, Position::Forward),
        ("Lang", 10, Position::Midfielder),
        ("Neumann", 11, Position::Forward),
        ("Wolf", 12, Position::Goalkeeper),
        ("Braun", 13, Position::Defender),
        ("Zimmer", 14, Position::Midfielder),
        ("Hartmann", 15, Position::Midfielder),
        ("Peters", 16, Position::Forward),
    ];

    SQUAD
        .iter()
        .map(|&(name, number, position)| {
            Player::new(format!("demo-{}", number), name)
                .with_shirt_number(number)
                .with_position(position)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tacboard_core::ScenarioId;

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_drop_and_move() {
        assert_eq!(
            parse("drop 9 0.5 0.25"),
            Command::Drop {
                player: "9".to_string(),
                point: NormalizedPoint::new(0.5, 0.25)
            }
        );
        assert!(matches!(parse("move p1 2 -1"), Command::Move { point, .. } if point == NormalizedPoint::new(1.0, 0.0)));
        assert!(parse_command("drop 9 0.5").is_err());
        assert!(parse_command("drop 9 a b").is_err());
    }

    #[test]
    fn test_parse_drawing_commands() {
        assert_eq!(parse("tool mark"), Command::Tool(DrawingKind::Mark));
        assert!(parse_command("tool circle").is_err());
        assert_eq!(parse("temp on"), Command::Temp(true));
        assert_eq!(parse("draw 0.1 0.2"), Command::Draw(vec![NormalizedPoint::new(0.1, 0.2)]));
        assert!(matches!(parse("draw 0.1 0.2 0.3 0.4"), Command::Draw(points) if points.len() == 2));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse("zone 4 none"), Command::Zone { player: "4".to_string(), zone: None });
        assert_eq!(parse("role 6 Box to box"), Command::Role { player: "6".to_string(), role: "Box to box".to_string() });
        assert_eq!(parse("scenario new"), Command::Scenario(ScenarioCommand::New(String::new())));
        assert_eq!(parse("scenario use 2"), Command::Scenario(ScenarioCommand::Use(2)));
        assert!(parse_command("scenario use 0").is_err());
        assert_eq!(parse("flag zones"), Command::Flag(ScenarioFlag::ShowZones));
        assert_eq!(
            parse("select drawing ab12 add"),
            Command::Select { target: SelectTarget::Drawing("ab12".to_string()), additive: true }
        );
        assert!(parse_command("jump").is_err());
    }

    #[test]
    fn test_resolve_player() {
        let roster = demo_roster();
        assert_eq!(roster.len(), 16);
        assert_eq!(resolve_player(&roster, "demo-3"), Some(PlayerId::from("demo-3")));
        assert_eq!(resolve_player(&roster, "#9"), Some(PlayerId::from("demo-9")));
        assert_eq!(resolve_player(&roster, "99"), None);
        assert_eq!(resolve_player(&roster, "nobody"), None);
    }

    #[test]
    fn test_resolve_drawing_prefix() {
        let mut board = BoardState::new(ScenarioId::new(), &Roster::default());
        assert!(resolve_drawing(&board, "a").is_err());

        let draft = tacboard_core::DraftDrawing::new(DrawingKind::Mark, NormalizedPoint::center());
        let drawing = draft.finish("#fff", false, chrono::Utc::now()).unwrap();
        let id = drawing.id;
        board.drawings.push(drawing);

        let full = id.to_string();
        assert_eq!(resolve_drawing(&board, &full[..8]).unwrap(), id);
        assert_eq!(resolve_drawing(&board, &full.to_uppercase()).unwrap(), id);
    }
}
