//! Pure crop geometry: bounds clamping, viewport rescaling and edge snapping.
//!
//! All functions operate on [`Square`] values expressed in display
//! coordinates (the same space as the current viewport bounds). They never
//! fail: degenerate bounds are treated as "nothing to do" and the input is
//! returned unchanged.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner of the displayed image
//! - `x`/`y` are the top-left corner of the square
//! - `size` is the side length

use serde::{Deserialize, Serialize};

/// Minimum side length of a crop square, in display units.
pub const MIN_SIZE: f64 = 50.0;

/// Maximum edge distance at which a moving square snaps to a sibling edge.
pub const SNAP_THRESHOLD: f64 = 12.0;

/// Position and side length of a square region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Square {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Side length
    pub size: f64,
}

impl Square {
    pub fn new(x: f64, y: f64, size: f64) -> Self {
        Self { x, y, size }
    }

    /// Right edge (`x + size`).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.size
    }

    /// Bottom edge (`y + size`).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.size
    }
}

/// Available display area the crops live in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero or negative.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A pointer or canvas position in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Shrink and move a square so it lies entirely inside `bounds`.
///
/// The size is reduced to fit (never grown), then the top-left corner is
/// clamped to `[0, bound - size]` on each axis. Applying it twice yields the
/// same result as applying it once.
///
/// Degenerate bounds leave the square untouched.
pub fn clamp_to_bounds(square: Square, bounds: Bounds) -> Square {
    if bounds.is_degenerate() {
        return square;
    }

    let size = square.size.min(bounds.width).min(bounds.height).max(1.0);
    let x = square.x.min(bounds.width - size).max(0.0);
    let y = square.y.min(bounds.height - size).max(0.0);

    Square { x, y, size }
}

/// Map a square from one viewport size to another.
///
/// Position scales per axis while the side length scales by the smaller of
/// the two axis factors, so the square stays square. The result is clamped
/// into the new bounds.
///
/// Degenerate `from` or `to` bounds leave the square untouched.
pub fn rescale_to_bounds(square: Square, from: Bounds, to: Bounds) -> Square {
    if from.is_degenerate() || to.is_degenerate() {
        return square;
    }

    let scale_x = to.width / from.width;
    let scale_y = to.height / from.height;
    let size_scale = scale_x.min(scale_y);

    let scaled = Square {
        x: square.x * scale_x,
        y: square.y * scale_y,
        size: square.size * size_scale,
    };

    clamp_to_bounds(scaled, to)
}

/// Best alignment found so far on one axis.
#[derive(Clone, Copy)]
struct AxisSnap {
    distance: f64,
    position: f64,
}

impl AxisSnap {
    /// Accept `position` if its edge distance is within the threshold and
    /// strictly closer than the current best. Ties keep the earlier candidate.
    #[inline]
    fn consider(best: &mut Option<AxisSnap>, distance: f64, position: f64) {
        if distance > SNAP_THRESHOLD {
            return;
        }
        match best {
            Some(current) if distance >= current.distance => {}
            _ => *best = Some(AxisSnap { distance, position }),
        }
    }
}

/// Snap a candidate top-left position to nearby edges of `targets`.
///
/// Each axis is handled independently: the moving square's two edges on that
/// axis are compared against both edges of every target, and the closest
/// alignment within [`SNAP_THRESHOLD`] wins. An axis with no qualifying edge
/// keeps its input coordinate exactly.
///
/// Ties go to the first target (and the first comparison within a target),
/// so callers must pass `targets` in a stable order.
pub fn apply_snap(x: f64, y: f64, size: f64, targets: &[Square]) -> (f64, f64) {
    let mut best_x: Option<AxisSnap> = None;
    let mut best_y: Option<AxisSnap> = None;

    let (left, right) = (x, x + size);
    let (top, bottom) = (y, y + size);

    for target in targets {
        let (t_left, t_right) = (target.x, target.right());
        let (t_top, t_bottom) = (target.y, target.bottom());

        AxisSnap::consider(&mut best_x, (left - t_left).abs(), t_left);
        AxisSnap::consider(&mut best_x, (left - t_right).abs(), t_right);
        AxisSnap::consider(&mut best_x, (right - t_left).abs(), t_left - size);
        AxisSnap::consider(&mut best_x, (right - t_right).abs(), t_right - size);

        AxisSnap::consider(&mut best_y, (top - t_top).abs(), t_top);
        AxisSnap::consider(&mut best_y, (top - t_bottom).abs(), t_bottom);
        AxisSnap::consider(&mut best_y, (bottom - t_top).abs(), t_top - size);
        AxisSnap::consider(&mut best_y, (bottom - t_bottom).abs(), t_bottom - size);
    }

    (
        best_x.map_or(x, |snap| snap.position),
        best_y.map_or(y, |snap| snap.position),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_inside_bounds_is_identity() {
        let sq = Square::new(10.0, 20.0, 100.0);
        assert_eq!(clamp_to_bounds(sq, Bounds::new(500.0, 300.0)), sq);
    }

    #[test]
    fn test_clamp_moves_square_back_inside() {
        let sq = Square::new(450.0, 250.0, 100.0);
        let clamped = clamp_to_bounds(sq, Bounds::new(500.0, 300.0));
        assert_eq!(clamped, Square::new(400.0, 200.0, 100.0));
    }

    #[test]
    fn test_clamp_shrinks_oversized_square() {
        let sq = Square::new(0.0, 0.0, 400.0);
        let clamped = clamp_to_bounds(sq, Bounds::new(500.0, 300.0));
        assert_eq!(clamped.size, 300.0);
        assert_eq!(clamped.y, 0.0);
    }

    #[test]
    fn test_clamp_negative_position() {
        let clamped = clamp_to_bounds(Square::new(-30.0, -5.0, 80.0), Bounds::new(200.0, 200.0));
        assert_eq!(clamped, Square::new(0.0, 0.0, 80.0));
    }

    #[test]
    fn test_clamp_degenerate_bounds_is_noop() {
        let sq = Square::new(900.0, 900.0, 100.0);
        assert_eq!(clamp_to_bounds(sq, Bounds::new(0.0, 300.0)), sq);
        assert_eq!(clamp_to_bounds(sq, Bounds::new(300.0, -1.0)), sq);
    }

    #[test]
    fn test_rescale_halves_everything() {
        let sq = Square::new(100.0, 50.0, 200.0);
        let out = rescale_to_bounds(sq, Bounds::new(800.0, 400.0), Bounds::new(400.0, 200.0));
        assert_eq!(out, Square::new(50.0, 25.0, 100.0));
    }

    #[test]
    fn test_rescale_uses_smaller_axis_for_size() {
        let sq = Square::new(100.0, 100.0, 100.0);
        let out = rescale_to_bounds(sq, Bounds::new(400.0, 400.0), Bounds::new(800.0, 600.0));
        assert_eq!(out.x, 200.0);
        assert_eq!(out.y, 150.0);
        assert_eq!(out.size, 150.0);
    }

    #[test]
    fn test_rescale_degenerate_is_noop() {
        let sq = Square::new(1.0, 2.0, 60.0);
        assert_eq!(rescale_to_bounds(sq, Bounds::new(0.0, 10.0), Bounds::new(10.0, 10.0)), sq);
        assert_eq!(rescale_to_bounds(sq, Bounds::new(10.0, 10.0), Bounds::new(10.0, 0.0)), sq);
    }

    #[test]
    fn test_snap_left_to_right_edge() {
        let target = Square::new(0.0, 0.0, 100.0);
        // Left edge at 105 is 5 away from the target's right edge (100).
        let (x, y) = apply_snap(105.0, 300.0, 50.0, &[target]);
        assert_eq!(x, 100.0);
        assert_eq!(y, 300.0);
    }

    #[test]
    fn test_snap_right_to_left_edge() {
        let target = Square::new(200.0, 0.0, 100.0);
        // Right edge at 195 is 5 away from the target's left edge (200).
        let (x, _) = apply_snap(145.0, 500.0, 50.0, &[target]);
        assert_eq!(x, 150.0);
    }

    #[test]
    fn test_snap_vertical_axis_independent() {
        let target = Square::new(1000.0, 100.0, 100.0);
        // Top at 108 is 8 away from the target top; x is far from everything.
        let (x, y) = apply_snap(0.0, 108.0, 60.0, &[target]);
        assert_eq!(x, 0.0);
        assert_eq!(y, 100.0);
    }

    #[test]
    fn test_snap_picks_closest_edge() {
        let far = Square::new(110.0, 0.0, 50.0); // left edge 10 away
        let near = Square::new(103.0, 0.0, 50.0); // left edge 3 away
        let (x, _) = apply_snap(100.0, 500.0, 50.0, &[far, near]);
        assert_eq!(x, 103.0);
    }

    #[test]
    fn test_snap_tie_goes_to_first_target() {
        let a = Square::new(105.0, 0.0, 50.0);
        let b = Square::new(95.0, 0.0, 50.0);
        let (x, _) = apply_snap(100.0, 500.0, 50.0, &[a, b]);
        assert_eq!(x, 105.0);
        let (x, _) = apply_snap(100.0, 500.0, 50.0, &[b, a]);
        assert_eq!(x, 95.0);
    }

    #[test]
    fn test_snap_threshold_is_inclusive() {
        let target = Square::new(112.0, 0.0, 50.0);
        let (x, _) = apply_snap(100.0, 500.0, 50.0, &[target]);
        assert_eq!(x, 112.0);

        let target = Square::new(112.5, 0.0, 50.0);
        let (x, _) = apply_snap(100.0, 500.0, 50.0, &[target]);
        assert_eq!(x, 100.0);
    }

    #[test]
    fn test_snap_without_targets() {
        assert_eq!(apply_snap(12.3, 45.6, 50.0, &[]), (12.3, 45.6));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
