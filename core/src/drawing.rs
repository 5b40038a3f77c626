// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tactical drawings and the in-progress draft

use crate::geometry::NormalizedPoint;
use crate::DrawingId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of annotation, also used as the current drawing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingKind {
    Line,
    #[default]
    Arrow,
    Mark,
}

impl DrawingKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "line" => Some(DrawingKind::Line),
            "arrow" => Some(DrawingKind::Arrow),
            "mark" => Some(DrawingKind::Mark),
            _ => None,
        }
    }

    /// Number of points a finished drawing of this kind carries
    pub fn point_count(&self) -> usize {
        match self {
            DrawingKind::Mark => 1,
            DrawingKind::Line | DrawingKind::Arrow => 2,
        }
    }
}

/// A committed annotation on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub id: DrawingId,
    pub kind: DrawingKind,
    pub points: Vec<NormalizedPoint>,
    pub color: String,
    pub is_temporary: bool,
    pub created_at: DateTime<Utc>,
}

impl Drawing {
    /// Opacity for rendering: temporary drawings fade from 1 to 0 over `lifetime`
    pub fn fade_opacity(&self, now: DateTime<Utc>, lifetime: Duration) -> f64 {
        if !self.is_temporary {
            return 1.0;
        }
        let lifetime_ms = lifetime.as_millis() as f64;
        if lifetime_ms <= 0.0 {
            return 0.0;
        }
        let elapsed_ms = (now - self.created_at).num_milliseconds() as f64;
        1.0 - (elapsed_ms / lifetime_ms).clamp(0.0, 1.0)
    }

    /// Whether a temporary drawing has outlived `lifetime` at `now`
    pub fn is_expired(&self, now: DateTime<Utc>, lifetime: Duration) -> bool {
        if !self.is_temporary {
            return false;
        }
        let lifetime_ms = lifetime.as_millis().min(i64::MAX as u128) as i64;
        now - self.created_at >= chrono::Duration::milliseconds(lifetime_ms)
    }
}

/// Points collected from live pointer input
#[derive(Debug, Clone, PartialEq)]
pub struct DraftDrawing {
    kind: DrawingKind,
    points: Vec<NormalizedPoint>,
}

impl DraftDrawing {
    pub fn new(kind: DrawingKind, start: NormalizedPoint) -> Self {
        Self {
            kind,
            points: vec![start],
        }
    }

    /// Build a draft from raw points, e.g. when replaying recorded input
    pub fn with_points(kind: DrawingKind, points: Vec<NormalizedPoint>) -> Self {
        Self { kind, points }
    }

    pub fn kind(&self) -> DrawingKind {
        self.kind
    }

    pub fn points(&self) -> &[NormalizedPoint] {
        &self.points
    }

    /// Follow the cursor: marks move, lines stretch from their fixed start
    pub fn update(&mut self, point: NormalizedPoint) {
        match self.kind {
            DrawingKind::Mark => {
                self.points.clear();
                self.points.push(point);
            }
            DrawingKind::Line | DrawingKind::Arrow => {
                self.points.truncate(1);
                self.points.push(point);
            }
        }
    }

    /// Turn the draft into a drawing, or `None` if it is incomplete
    pub fn finish(self, color: &str, is_temporary: bool, now: DateTime<Utc>) -> Option<Drawing> {
        let points = match self.kind {
            DrawingKind::Mark if self.points.len() == 1 => self.points,
            DrawingKind::Mark => return None,
            DrawingKind::Line | DrawingKind::Arrow if self.points.len() >= 2 => {
                let first = self.points[0];
                let last = self.points[self.points.len() - 1];
                vec![first, last]
            }
            DrawingKind::Line | DrawingKind::Arrow => return None,
        };

        Some(Drawing {
            id: DrawingId::new(),
            kind: self.kind,
            points,
            color: color.to_string(),
            is_temporary,
            created_at: now,
        })
    }
}

/// Idle/active state machine around a single draft
#[derive(Debug, Clone, Default)]
pub struct Draft {
    active: Option<DraftDrawing>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new draft, replacing any unfinished one
    pub fn begin(&mut self, tool: DrawingKind, point: NormalizedPoint) {
        self.active = Some(DraftDrawing::new(tool, point));
    }

    /// Install a prepared draft
    pub fn restore(&mut self, draft: DraftDrawing) {
        self.active = Some(draft);
    }

    /// Ignored while idle
    pub fn update(&mut self, point: NormalizedPoint) {
        if let Some(draft) = self.active.as_mut() {
            draft.update(point);
        }
    }

    /// Finish the draft. The draft is cleared whether or not it was valid.
    pub fn finish(&mut self, color: &str, is_temporary: bool, now: DateTime<Utc>) -> Option<Drawing> {
        let draft = self.active.take()?;
        let kind = draft.kind();
        let drawing = draft.finish(color, is_temporary, now);
        if drawing.is_none() {
            tracing::debug!(?kind, "Discarded incomplete draft");
        }
        drawing
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn current(&self) -> Option<&DraftDrawing> {
        self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> NormalizedPoint {
        NormalizedPoint::new(x, y)
    }

    #[test]
    fn test_mark_validity() {
        let now = Utc::now();
        assert!(DraftDrawing::with_points(DrawingKind::Mark, vec![]).finish("#fff", false, now).is_none());
        assert!(DraftDrawing::with_points(DrawingKind::Mark, vec![p(0.1, 0.1), p(0.2, 0.2)])
            .finish("#fff", false, now)
            .is_none());

        let mark = DraftDrawing::with_points(DrawingKind::Mark, vec![p(0.1, 0.1)])
            .finish("#fff", false, now)
            .unwrap();
        assert_eq!(mark.kind, DrawingKind::Mark);
        assert_eq!(mark.points, vec![p(0.1, 0.1)]);
    }

    #[test]
    fn test_line_needs_two_points() {
        let now = Utc::now();
        for kind in [DrawingKind::Line, DrawingKind::Arrow] {
            assert!(DraftDrawing::new(kind, p(0.1, 0.1)).finish("#fff", true, now).is_none());

            let mut draft = DraftDrawing::new(kind, p(0.1, 0.1));
            draft.update(p(0.3, 0.3));
            draft.update(p(0.4, 0.5));
            let drawing = draft.finish("#fff", true, now).unwrap();
            assert_eq!(drawing.points, vec![p(0.1, 0.1), p(0.4, 0.5)]);
            assert!(drawing.is_temporary);
        }
    }

    #[test]
    fn test_mark_update_replaces_point() {
        let mut draft = DraftDrawing::new(DrawingKind::Mark, p(0.1, 0.1));
        draft.update(p(0.7, 0.2));
        assert_eq!(draft.points(), &[p(0.7, 0.2)]);
    }

    #[test]
    fn test_state_machine_clears_on_finish() {
        let mut draft = Draft::new();
        assert!(draft.finish("#fff", false, Utc::now()).is_none());

        draft.begin(DrawingKind::Arrow, p(0.2, 0.2));
        assert!(draft.is_active());
        // Invalid (single point) but still returns to idle
        assert!(draft.finish("#fff", false, Utc::now()).is_none());
        assert!(!draft.is_active());

        draft.begin(DrawingKind::Line, p(0.2, 0.2));
        draft.update(p(0.5, 0.5));
        draft.cancel();
        assert!(!draft.is_active());
        draft.update(p(0.9, 0.9));
        assert!(draft.current().is_none());
    }

    #[test]
    fn test_fade_opacity() {
        let created = Utc::now();
        let drawing = Drawing {
            id: DrawingId::new(),
            kind: DrawingKind::Arrow,
            points: vec![p(0.1, 0.1), p(0.2, 0.2)],
            color: "#fff".into(),
            is_temporary: true,
            created_at: created,
        };
        let lifetime = Duration::from_secs(3);

        assert!((drawing.fade_opacity(created, lifetime) - 1.0).abs() < 1e-9);
        let half = created + chrono::Duration::milliseconds(1500);
        assert!((drawing.fade_opacity(half, lifetime) - 0.5).abs() < 1e-9);
        let late = created + chrono::Duration::seconds(10);
        assert_eq!(drawing.fade_opacity(late, lifetime), 0.0);
        assert!(drawing.is_expired(late, lifetime));
        assert!(!drawing.is_expired(half, lifetime));

        let persistent = Drawing { is_temporary: false, ..drawing };
        assert_eq!(persistent.fade_opacity(late, lifetime), 1.0);
        assert!(!persistent.is_expired(late, lifetime));
    }
}
