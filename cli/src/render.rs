// SPDX-License-Identifier: MIT OR Apache-2.0

//! ASCII pitch rendering for the CLI.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tacboard_core::{BoardState, DrawingKind, NormalizedPoint, OpponentMode, Roster, Scenario};

/// Playable cells across the pitch
pub const PITCH_WIDTH: usize = 41;
/// Playable cells down the pitch
pub const PITCH_HEIGHT: usize = 21;

fn cell(point: &NormalizedPoint) -> (usize, usize) {
    let col = (point.x() * (PITCH_WIDTH - 1) as f64).round() as usize;
    let row = (point.y() * (PITCH_HEIGHT - 1) as f64).round() as usize;
    (col.min(PITCH_WIDTH - 1), row.min(PITCH_HEIGHT - 1))
}

fn put(grid: &mut [Vec<char>], point: &NormalizedPoint, label: &str) {
    let (col, row) = cell(point);
    // Labels that would run off the right edge are shifted left
    let start = col.min(PITCH_WIDTH.saturating_sub(label.chars().count()));
    for (offset, ch) in label.chars().enumerate() {
        if let Some(slot) = grid[row].get_mut(start + offset) {
            *slot = ch;
        }
    }
}

/// Render the board of a scenario as ASCII art.
///
/// Placed players show their shirt number (or `P` without one), opponent
/// markers `o`, neutral markers `*` and marks `x`.
pub fn render_pitch(board: &BoardState, scenario: &Scenario, roster: &Roster) -> String {
    let mut grid = vec![vec![' '; PITCH_WIDTH]; PITCH_HEIGHT];

    // Halfway line
    for slot in grid[PITCH_HEIGHT / 2].iter_mut() {
        *slot = '-';
    }

    if scenario.drawings_visible {
        for drawing in board.drawings.iter().filter(|d| d.kind == DrawingKind::Mark) {
            if let Some(point) = drawing.points.first() {
                put(&mut grid, point, "x");
            }
        }
    }

    for marker in &board.neutral_markers {
        put(&mut grid, &marker.point, "*");
    }

    if scenario.show_opponent && board.opponent_mode != OpponentMode::Hidden {
        for marker in &board.opponent_markers {
            put(&mut grid, &marker.point, "o");
        }
    }

    for placement in &board.placements {
        let label = roster
            .get(&placement.player_id)
            .and_then(|p| p.shirt_number)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "P".to_string());
        put(&mut grid, &placement.point, &label);
    }

    let border = format!("+{}+", "=".repeat(PITCH_WIDTH));
    let mut output = String::new();
    output.push_str(&border);
    output.push('\n');
    for row in grid {
        output.push('|');
        output.extend(row);
        output.push('|');
        output.push('\n');
    }
    output.push_str(&border);
    output.push('\n');
    output
}

/// One line per drawing: short id, kind, points and remaining opacity
pub fn render_drawings(board: &BoardState, now: DateTime<Utc>, lifetime: Duration) -> String {
    let mut output = String::new();
    for drawing in &board.drawings {
        let id = drawing.id.to_string();
        let points: Vec<String> = drawing
            .points
            .iter()
            .map(|p| format!("({:.2}, {:.2})", p.x(), p.y()))
            .collect();
        output.push_str(&format!(
            "  {} {:?} {} {}",
            &id[..8],
            drawing.kind,
            points.join(" -> "),
            drawing.color
        ));
        if drawing.is_temporary {
            output.push_str(&format!(" temporary, opacity {:.2}", drawing.fade_opacity(now, lifetime)));
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tacboard_core::{DraftDrawing, Player, ScenarioId};

    fn board_with_players() -> (BoardState, Scenario, Roster) {
        let roster: Roster = vec![
            Player::new("a", "A").with_shirt_number(10),
            Player::new("b", "B"),
        ]
        .into_iter()
        .collect();
        let scenario = Scenario::new("Test");
        let board = BoardState::new(ScenarioId::new(), &roster);
        (board, scenario, roster)
    }

    #[test]
    fn test_render_empty_pitch() {
        let (board, scenario, roster) = board_with_players();
        let output = render_pitch(&board, &scenario, &roster);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), PITCH_HEIGHT + 2);
        assert!(lines.iter().all(|l| l.chars().count() == PITCH_WIDTH + 2));
        // Opponent hidden by default
        assert!(!output.contains('o'));
    }

    #[test]
    fn test_render_tokens() {
        let (mut board, mut scenario, roster) = board_with_players();
        board.placements.push(tacboard_core::Placement {
            id: tacboard_core::PlacementId::new(),
            player_id: "a".into(),
            point: NormalizedPoint::new(1.0, 0.0),
            zone: None,
            role: tacboard_core::TacticalRole::unassigned(),
        });
        board.add_neutral_marker(NormalizedPoint::new(0.25, 0.75), "Cone");
        board.opponent_mode = OpponentMode::Markers;
        scenario.show_opponent = true;

        let output = render_pitch(&board, &scenario, &roster);
        let first_row = output.lines().nth(1).unwrap();
        assert!(first_row.ends_with("10|"));
        assert!(output.contains('*'));
        assert!(output.contains('o'));
    }

    #[test]
    fn test_render_drawings_opacity() {
        let (mut board, _, _) = board_with_players();
        let now = Utc::now();
        let drawing = DraftDrawing::new(DrawingKind::Mark, NormalizedPoint::center())
            .finish("#FFD60A", true, now)
            .unwrap();
        board.drawings.push(drawing);

        let listing = render_drawings(&board, now, Duration::from_secs(3));
        assert!(listing.contains("Mark"));
        assert!(listing.contains("opacity 1.00"));
    }
}
