// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalized pitch coordinates
//!
//! All board geometry lives in the unit square `[0,1]×[0,1]`. The view layer
//! converts pointer positions with [`NormalizedPoint::from_surface`] and back
//! with [`NormalizedPoint::to_surface`].

use serde::{Deserialize, Serialize};

/// A point on the pitch, always inside the unit square
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPoint")]
pub struct NormalizedPoint {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct RawPoint {
    x: f64,
    y: f64,
}

impl From<RawPoint> for NormalizedPoint {
    fn from(raw: RawPoint) -> Self {
        Self::new(raw.x, raw.y)
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl NormalizedPoint {
    /// Create a point, clamping both components into `[0,1]`
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// Centre spot
    pub fn center() -> Self {
        Self { x: 0.5, y: 0.5 }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Euclidean distance in normalized space
    pub fn distance(&self, other: &NormalizedPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// A new point shifted by `(dx, dy)`, clamped back into the unit square
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Convert a position on a rendering surface of `size` into normalized space
    pub fn from_surface(x: f64, y: f64, size: SurfaceSize) -> Self {
        let nx = if size.width > 0.0 { x / size.width } else { 0.0 };
        let ny = if size.height > 0.0 { y / size.height } else { 0.0 };
        Self::new(nx, ny)
    }

    /// Project this point onto a rendering surface of `size`
    pub fn to_surface(&self, size: SurfaceSize) -> (f64, f64) {
        (self.x * size.width, self.y * size.height)
    }
}

impl Default for NormalizedPoint {
    fn default() -> Self {
        Self::center()
    }
}

/// Size of the surface the pitch is drawn onto, in arbitrary units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamps_out_of_range_components() {
        let p = NormalizedPoint::new(-0.4, 1.7);
        assert_eq!(p.x(), 0.0);
        assert_eq!(p.y(), 1.0);

        let nan = NormalizedPoint::new(f64::NAN, 0.3);
        assert_eq!(nan.x(), 0.0);
        assert_eq!(nan.y(), 0.3);
    }

    #[test]
    fn test_surface_conversion() {
        let size = SurfaceSize::new(800.0, 400.0);
        let p = NormalizedPoint::from_surface(200.0, 100.0, size);
        assert!((p.x() - 0.25).abs() < 1e-9);
        assert!((p.y() - 0.25).abs() < 1e-9);

        let (sx, sy) = p.to_surface(size);
        assert!((sx - 200.0).abs() < 1e-9);
        assert!((sy - 100.0).abs() < 1e-9);

        // Pointer dragged outside the surface
        let outside = NormalizedPoint::from_surface(-50.0, 900.0, size);
        assert_eq!((outside.x(), outside.y()), (0.0, 1.0));

        // Degenerate surface
        let zero = NormalizedPoint::from_surface(10.0, 10.0, SurfaceSize::new(0.0, 0.0));
        assert_eq!((zero.x(), zero.y()), (0.0, 0.0));
    }

    #[test]
    fn test_deserialize_clamps() {
        let p: NormalizedPoint = serde_json::from_str(r#"{"x": 3.0, "y": -1.0}"#).unwrap();
        assert_eq!((p.x(), p.y()), (1.0, 0.0));
    }

    proptest! {
        #[test]
        fn prop_always_inside_unit_square(x in proptest::num::f64::ANY, y in proptest::num::f64::ANY) {
            let p = NormalizedPoint::new(x, y);
            prop_assert!((0.0..=1.0).contains(&p.x()));
            prop_assert!((0.0..=1.0).contains(&p.y()));
        }

        #[test]
        fn prop_offset_stays_inside(x in 0.0f64..=1.0, y in 0.0f64..=1.0, dx in -2.0f64..2.0, dy in -2.0f64..2.0) {
            let p = NormalizedPoint::new(x, y).offset(dx, dy);
            prop_assert!((0.0..=1.0).contains(&p.x()));
            prop_assert!((0.0..=1.0).contains(&p.y()));
        }
    }
}
