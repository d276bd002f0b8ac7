//! Pointer-driven drag and resize of crop squares.
//!
//! [`InteractionController`] turns press/move/release pointer signals into
//! [`CropStore`] updates. Only one crop is manipulated by the pointer at a
//! time; when that crop is part of a multi-crop selection the same
//! translation or proportional scale is replayed onto every other selected
//! crop.
//!
//! # Gesture lifetime
//!
//! ```text
//!            begin_drag                 pointer_up / pointer_cancel
//!   Idle ───────────────► Dragging ───────────────────────────────► Idle
//!     │      begin_resize                                           ▲
//!     └───────────────► Resizing ───────────────────────────────────┘
//! ```
//!
//! The pre-gesture geometry of every participating crop is captured on press
//! and each move is computed from that capture, never from the previous
//! frame's output. The store's gesture window is opened on press and closed
//! on release, so a whole drag is a single undo step.

use serde::Serialize;

use crate::geometry::{self, Bounds, Point, Square, MIN_SIZE};
use crate::store::{CropId, CropPatch, CropStore, IdSource};

/// Resize handle grabbed by the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    /// Parse a handle name (`"nw"`, `"ne"`, `"sw"`, `"se"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nw" => Some(Corner::Nw),
            "ne" => Some(Corner::Ne),
            "sw" => Some(Corner::Sw),
            "se" => Some(Corner::Se),
            _ => None,
        }
    }

    /// Growth along the corner's outward diagonal for a pointer delta.
    fn growth(self, dx: f64, dy: f64) -> f64 {
        match self {
            Corner::Se => dx.max(dy),
            Corner::Sw => (-dx).max(dy),
            Corner::Ne => dx.max(-dy),
            Corner::Nw => (-dx).max(-dy),
        }
    }

    fn moves_left_edge(self) -> bool {
        matches!(self, Corner::Nw | Corner::Sw)
    }

    fn moves_top_edge(self) -> bool {
        matches!(self, Corner::Nw | Corner::Ne)
    }
}

/// What the pointer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InteractionState {
    Idle,
    Dragging { id: CropId },
    Resizing { id: CropId, corner: Corner },
}

/// Pre-gesture geometry of one participating crop.
#[derive(Debug, Clone, Copy)]
struct Origin {
    id: CropId,
    square: Square,
}

#[derive(Debug, Clone)]
struct DragGesture {
    primary: Origin,
    pointer_start: Point,
    followers: Vec<Origin>,
    /// Crops outside the selection, ascending by id.
    snap_targets: Vec<Square>,
}

#[derive(Debug, Clone)]
struct ResizeGesture {
    primary: Origin,
    corner: Corner,
    pointer_start: Point,
    followers: Vec<Origin>,
    /// Selection bounding-box corner opposite the grabbed handle.
    anchor: Point,
}

#[derive(Debug, Clone)]
enum Gesture {
    Drag(DragGesture),
    Resize(ResizeGesture),
}

/// Drag/resize state machine bound to a display area.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    bounds: Bounds,
    gesture: Option<Gesture>,
}

impl InteractionController {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            gesture: None,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Update the display area used for clamping subsequent moves.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn state(&self) -> InteractionState {
        match &self.gesture {
            None => InteractionState::Idle,
            Some(Gesture::Drag(drag)) => InteractionState::Dragging {
                id: drag.primary.id,
            },
            Some(Gesture::Resize(resize)) => InteractionState::Resizing {
                id: resize.primary.id,
                corner: resize.corner,
            },
        }
    }

    pub fn is_idle(&self) -> bool {
        self.gesture.is_none()
    }

    /// Press on the body of crop `id`.
    ///
    /// `selection` is the current multi-selection; if it contains `id` the
    /// other selected crops move along. Returns false if `id` is unknown.
    pub fn begin_drag<I: IdSource>(
        &mut self,
        store: &mut CropStore<I>,
        id: CropId,
        pointer: Point,
        selection: &[CropId],
    ) -> bool {
        self.finish(store);
        let Some((primary, followers)) = capture(store, id, selection) else {
            return false;
        };

        let mut snap_targets: Vec<(CropId, Square)> = store
            .squares()
            .iter()
            .filter(|sq| sq.id != id && !followers.iter().any(|f| f.id == sq.id))
            .map(|sq| (sq.id, sq.square()))
            .collect();
        snap_targets.sort_by_key(|(target_id, _)| *target_id);

        store.begin_gesture();
        self.gesture = Some(Gesture::Drag(DragGesture {
            primary,
            pointer_start: pointer,
            followers,
            snap_targets: snap_targets.into_iter().map(|(_, sq)| sq).collect(),
        }));
        true
    }

    /// Press on a resize handle of crop `id`.
    pub fn begin_resize<I: IdSource>(
        &mut self,
        store: &mut CropStore<I>,
        id: CropId,
        corner: Corner,
        pointer: Point,
        selection: &[CropId],
    ) -> bool {
        self.finish(store);
        let Some((primary, followers)) = capture(store, id, selection) else {
            return false;
        };

        let anchor = selection_anchor(primary.square, &followers, corner);

        store.begin_gesture();
        self.gesture = Some(Gesture::Resize(ResizeGesture {
            primary,
            corner,
            pointer_start: pointer,
            followers,
            anchor,
        }));
        true
    }

    /// Pointer moved. Returns true if any crop changed.
    ///
    /// Moves are ignored while the display area is degenerate. If the store's
    /// gesture window was closed underneath the controller (undo or redo
    /// mid-gesture), the gesture is dropped and the controller goes idle.
    pub fn pointer_move<I: IdSource>(&mut self, store: &mut CropStore<I>, pointer: Point) -> bool {
        if self.gesture.is_some() && !store.is_gesture_active() {
            self.gesture = None;
            return false;
        }
        if self.bounds.is_degenerate() {
            return false;
        }
        match &self.gesture {
            None => false,
            Some(Gesture::Drag(drag)) => apply_drag(store, drag, pointer, self.bounds),
            Some(Gesture::Resize(resize)) => apply_resize(store, resize, pointer, self.bounds),
        }
    }

    /// Pointer released. Always returns the controller to idle.
    pub fn pointer_up<I: IdSource>(&mut self, store: &mut CropStore<I>) {
        self.finish(store);
    }

    /// Pointer capture lost (focus change, touch cancel). Same as release.
    pub fn pointer_cancel<I: IdSource>(&mut self, store: &mut CropStore<I>) {
        self.finish(store);
    }

    fn finish<I: IdSource>(&mut self, store: &mut CropStore<I>) {
        if self.gesture.take().is_some() {
            store.end_gesture();
        }
    }
}

/// Snapshot the primary crop and any other selected crops that still exist.
fn capture<I: IdSource>(
    store: &CropStore<I>,
    id: CropId,
    selection: &[CropId],
) -> Option<(Origin, Vec<Origin>)> {
    let primary = store.get(id).map(|sq| Origin {
        id,
        square: sq.square(),
    })?;

    let followers = if selection.contains(&id) {
        selection
            .iter()
            .filter(|&&other| other != id)
            .filter_map(|&other| {
                store.get(other).map(|sq| Origin {
                    id: other,
                    square: sq.square(),
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    Some((primary, followers))
}

fn selection_anchor(primary: Square, followers: &[Origin], corner: Corner) -> Point {
    let all = std::iter::once(primary).chain(followers.iter().map(|f| f.square));
    let (mut left, mut top) = (f64::INFINITY, f64::INFINITY);
    let (mut right, mut bottom) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for sq in all {
        left = left.min(sq.x);
        top = top.min(sq.y);
        right = right.max(sq.right());
        bottom = bottom.max(sq.bottom());
    }

    Point::new(
        if corner.moves_left_edge() { right } else { left },
        if corner.moves_top_edge() { bottom } else { top },
    )
}

fn apply_drag<I: IdSource>(
    store: &mut CropStore<I>,
    drag: &DragGesture,
    pointer: Point,
    bounds: Bounds,
) -> bool {
    let origin = drag.primary.square;
    let max_x = bounds.width - origin.size;
    let max_y = bounds.height - origin.size;

    let dx = pointer.x - drag.pointer_start.x;
    let dy = pointer.y - drag.pointer_start.y;
    let mut x = (origin.x + dx).min(max_x).max(0.0);
    let mut y = (origin.y + dy).min(max_y).max(0.0);

    if !drag.snap_targets.is_empty() {
        let (snapped_x, snapped_y) = geometry::apply_snap(x, y, origin.size, &drag.snap_targets);
        x = snapped_x.min(max_x).max(0.0);
        y = snapped_y.min(max_y).max(0.0);
    }

    let mut changed = store.update(drag.primary.id, CropPatch::position(x, y));

    let (moved_x, moved_y) = (x - origin.x, y - origin.y);
    for follower in &drag.followers {
        let moved = geometry::clamp_to_bounds(
            Square::new(
                follower.square.x + moved_x,
                follower.square.y + moved_y,
                follower.square.size,
            ),
            bounds,
        );
        changed |= store.update(follower.id, CropPatch::square(moved));
    }
    changed
}

fn apply_resize<I: IdSource>(
    store: &mut CropStore<I>,
    resize: &ResizeGesture,
    pointer: Point,
    bounds: Bounds,
) -> bool {
    let origin = resize.primary.square;
    let corner = resize.corner;
    let dx = pointer.x - resize.pointer_start.x;
    let dy = pointer.y - resize.pointer_start.y;

    // Room available while keeping the opposite corner fixed.
    let max_w = if corner.moves_left_edge() {
        origin.right()
    } else {
        bounds.width - origin.x
    };
    let max_h = if corner.moves_top_edge() {
        origin.bottom()
    } else {
        bounds.height - origin.y
    };

    let size = (origin.size + corner.growth(dx, dy))
        .max(MIN_SIZE)
        .min(max_w)
        .min(max_h);
    let x = if corner.moves_left_edge() {
        origin.right() - size
    } else {
        origin.x
    };
    let y = if corner.moves_top_edge() {
        origin.bottom() - size
    } else {
        origin.y
    };

    let mut changed = store.update(resize.primary.id, CropPatch::square(Square::new(x, y, size)));

    if origin.size > 0.0 && !resize.followers.is_empty() {
        let factor = size / origin.size;
        let anchor = resize.anchor;
        for follower in &resize.followers {
            let sq = follower.square;
            let scaled = geometry::clamp_to_bounds(
                Square::new(
                    anchor.x + (sq.x - anchor.x) * factor,
                    anchor.y + (sq.y - anchor.y) * factor,
                    (sq.size * factor).max(MIN_SIZE),
                ),
                bounds,
            );
            changed |= store.update(follower.id, CropPatch::square(scaled));
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Bounds = Bounds {
        width: 1000.0,
        height: 600.0,
    };

    fn square_of(store: &CropStore, id: CropId) -> Square {
        store.get(id).unwrap().square()
    }

    #[test]
    fn test_drag_moves_by_pointer_delta() {
        let mut store = CropStore::new();
        let id = store.add(100.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        assert!(ctl.begin_drag(&mut store, id, Point::new(150.0, 150.0), &[]));
        assert_eq!(ctl.state(), InteractionState::Dragging { id });
        ctl.pointer_move(&mut store, Point::new(180.0, 120.0));
        assert_eq!(square_of(&store, id), Square::new(130.0, 70.0, 100.0));

        ctl.pointer_up(&mut store);
        assert!(ctl.is_idle());
    }

    #[test]
    fn test_drag_clamps_to_bounds() {
        let mut store = CropStore::new();
        let id = store.add(100.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_drag(&mut store, id, Point::new(0.0, 0.0), &[]);
        ctl.pointer_move(&mut store, Point::new(5000.0, -5000.0));
        assert_eq!(square_of(&store, id), Square::new(900.0, 0.0, 100.0));
    }

    #[test]
    fn test_drag_computes_from_origin_not_previous_frame() {
        let mut store = CropStore::new();
        let id = store.add(100.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_drag(&mut store, id, Point::new(0.0, 0.0), &[]);
        for _ in 0..5 {
            ctl.pointer_move(&mut store, Point::new(10.0, 10.0));
        }
        assert_eq!(square_of(&store, id), Square::new(110.0, 110.0, 100.0));
    }

    #[test]
    fn test_drag_snaps_to_sibling() {
        let mut store = CropStore::new();
        let target = store.add(300.0, 100.0, 100.0);
        let id = store.add(100.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_drag(&mut store, id, Point::new(0.0, 0.0), &[]);
        // Right edge lands at 295, five short of the target's left edge.
        ctl.pointer_move(&mut store, Point::new(95.0, 3.0));
        let sq = square_of(&store, id);
        assert_eq!(sq.x, 200.0);
        assert_eq!(sq.y, 100.0);
        assert_eq!(square_of(&store, target).x, 300.0);
    }

    #[test]
    fn test_selection_does_not_snap_to_itself() {
        let mut store = CropStore::new();
        let a = store.add(100.0, 100.0, 100.0);
        let b = store.add(205.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_drag(&mut store, a, Point::new(0.0, 0.0), &[a, b]);
        ctl.pointer_move(&mut store, Point::new(3.0, 0.0));
        assert_eq!(square_of(&store, a).x, 103.0);
        assert_eq!(square_of(&store, b).x, 208.0);
    }

    #[test]
    fn test_group_drag_moves_followers_and_clamps_each() {
        let mut store = CropStore::new();
        let a = store.add(100.0, 100.0, 100.0);
        let b = store.add(850.0, 100.0, 100.0);
        let loner = store.add(400.0, 400.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_drag(&mut store, a, Point::new(0.0, 0.0), &[a, b]);
        ctl.pointer_move(&mut store, Point::new(100.0, 40.0));

        assert_eq!(square_of(&store, a), Square::new(200.0, 140.0, 100.0));
        assert_eq!(square_of(&store, b), Square::new(900.0, 140.0, 100.0));
        assert_eq!(square_of(&store, loner), Square::new(400.0, 400.0, 100.0));
    }

    #[test]
    fn test_drag_unselected_crop_moves_alone() {
        let mut store = CropStore::new();
        let a = store.add(100.0, 100.0, 100.0);
        let b = store.add(500.0, 300.0, 100.0);
        let c = store.add(700.0, 300.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_drag(&mut store, a, Point::new(0.0, 0.0), &[b, c]);
        ctl.pointer_move(&mut store, Point::new(50.0, 0.0));
        assert_eq!(square_of(&store, a).x, 150.0);
        assert_eq!(square_of(&store, b).x, 500.0);
    }

    #[test]
    fn test_whole_drag_is_one_undo_step() {
        let mut store = CropStore::new();
        let id = store.add(100.0, 100.0, 100.0);
        let depth = store.history().undo_depth();
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_drag(&mut store, id, Point::new(0.0, 0.0), &[]);
        for step in 1..=30 {
            ctl.pointer_move(&mut store, Point::new(step as f64, step as f64 / 2.0));
        }
        ctl.pointer_up(&mut store);

        assert_eq!(store.history().undo_depth(), depth + 1);
        store.undo();
        assert_eq!(square_of(&store, id), Square::new(100.0, 100.0, 100.0));
    }

    #[test]
    fn test_resize_se_grows_by_max_delta() {
        let mut store = CropStore::new();
        let id = store.add(100.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_resize(&mut store, id, Corner::Se, Point::new(200.0, 200.0), &[]);
        ctl.pointer_move(&mut store, Point::new(230.0, 210.0));
        assert_eq!(square_of(&store, id), Square::new(100.0, 100.0, 130.0));
    }

    #[test]
    fn test_resize_nw_keeps_se_corner_fixed() {
        let mut store = CropStore::new();
        let id = store.add(200.0, 200.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_resize(&mut store, id, Corner::Nw, Point::new(200.0, 200.0), &[]);
        ctl.pointer_move(&mut store, Point::new(180.0, 150.0));
        let sq = square_of(&store, id);
        assert_eq!(sq.size, 150.0);
        assert_eq!(sq.right(), 300.0);
        assert_eq!(sq.bottom(), 300.0);
    }

    #[test]
    fn test_resize_ne_and_sw_anchor_opposite_corner() {
        let mut store = CropStore::new();
        let id = store.add(200.0, 200.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_resize(&mut store, id, Corner::Ne, Point::new(300.0, 200.0), &[]);
        ctl.pointer_move(&mut store, Point::new(320.0, 200.0));
        let sq = square_of(&store, id);
        assert_eq!((sq.x, sq.bottom(), sq.size), (200.0, 300.0, 120.0));
        ctl.pointer_up(&mut store);

        ctl.begin_resize(&mut store, id, Corner::Sw, Point::new(200.0, 300.0), &[]);
        ctl.pointer_move(&mut store, Point::new(190.0, 300.0));
        let sq2 = square_of(&store, id);
        assert_eq!((sq2.right(), sq2.y, sq2.size), (sq.right(), sq.y, 130.0));
    }

    #[test]
    fn test_resize_enforces_min_size() {
        let mut store = CropStore::new();
        let id = store.add(100.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_resize(&mut store, id, Corner::Se, Point::new(0.0, 0.0), &[]);
        ctl.pointer_move(&mut store, Point::new(-500.0, -500.0));
        assert_eq!(square_of(&store, id).size, MIN_SIZE);
    }

    #[test]
    fn test_resize_clamped_by_bounds() {
        let mut store = CropStore::new();
        let id = store.add(850.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_resize(&mut store, id, Corner::Se, Point::new(0.0, 0.0), &[]);
        ctl.pointer_move(&mut store, Point::new(300.0, 300.0));
        assert_eq!(square_of(&store, id), Square::new(850.0, 100.0, 150.0));
    }

    #[test]
    fn test_group_resize_scales_from_anchor() {
        let mut store = CropStore::new();
        let a = store.add(100.0, 100.0, 100.0);
        let b = store.add(300.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        // Grab the SE handle of `a`; anchor is the selection's NW corner (100, 100).
        ctl.begin_resize(&mut store, a, Corner::Se, Point::new(0.0, 0.0), &[a, b]);
        ctl.pointer_move(&mut store, Point::new(50.0, 50.0));

        assert_eq!(square_of(&store, a), Square::new(100.0, 100.0, 150.0));
        assert_eq!(square_of(&store, b), Square::new(400.0, 100.0, 150.0));
    }

    #[test]
    fn test_group_resize_does_not_compound() {
        let mut store = CropStore::new();
        let a = store.add(100.0, 100.0, 100.0);
        let b = store.add(300.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_resize(&mut store, a, Corner::Se, Point::new(0.0, 0.0), &[a, b]);
        for _ in 0..10 {
            ctl.pointer_move(&mut store, Point::new(20.0, 20.0));
        }
        assert_eq!(square_of(&store, b), Square::new(340.0, 100.0, 120.0));
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut store = CropStore::new();
        let id = store.add(100.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_resize(&mut store, id, Corner::Nw, Point::new(0.0, 0.0), &[]);
        ctl.pointer_cancel(&mut store);
        assert_eq!(ctl.state(), InteractionState::Idle);
        assert!(!store.is_gesture_active());
        assert!(!ctl.pointer_move(&mut store, Point::new(40.0, 40.0)));
    }

    #[test]
    fn test_press_without_release_is_closed_by_next_press() {
        let mut store = CropStore::new();
        let a = store.add(100.0, 100.0, 100.0);
        let b = store.add(400.0, 100.0, 100.0);
        let depth = store.history().undo_depth();
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_drag(&mut store, a, Point::new(0.0, 0.0), &[]);
        ctl.pointer_move(&mut store, Point::new(10.0, 0.0));
        ctl.begin_drag(&mut store, b, Point::new(0.0, 0.0), &[]);
        assert_eq!(ctl.state(), InteractionState::Dragging { id: b });
        assert_eq!(store.history().undo_depth(), depth + 1);
    }

    #[test]
    fn test_moves_ignored_on_degenerate_bounds() {
        let mut store = CropStore::new();
        let id = store.add(100.0, 100.0, 100.0);
        let mut ctl = InteractionController::default();

        assert!(ctl.begin_resize(&mut store, id, Corner::Se, Point::new(0.0, 0.0), &[]));
        assert!(!ctl.pointer_move(&mut store, Point::new(10.0, 10.0)));
        ctl.pointer_up(&mut store);
        assert_eq!(square_of(&store, id), Square::new(100.0, 100.0, 100.0));

        assert!(ctl.begin_drag(&mut store, id, Point::new(0.0, 0.0), &[]));
        assert!(!ctl.pointer_move(&mut store, Point::new(-40.0, 25.0)));
        ctl.pointer_up(&mut store);
        assert_eq!(square_of(&store, id), Square::new(100.0, 100.0, 100.0));
        assert_eq!(store.history().undo_depth(), 1);
    }

    #[test]
    fn test_undo_mid_drag_ends_gesture() {
        let mut store = CropStore::new();
        let id = store.add(100.0, 100.0, 100.0);
        store.add(400.0, 100.0, 100.0);
        let mut ctl = InteractionController::new(BOUNDS);

        ctl.begin_drag(&mut store, id, Point::new(0.0, 0.0), &[]);
        ctl.pointer_move(&mut store, Point::new(20.0, 0.0));
        // Rolls back the second add and the in-flight move.
        assert!(store.undo());
        assert_eq!(store.len(), 1);
        assert_eq!(store.history().undo_depth(), 1);

        for step in 1..=5 {
            assert!(!ctl.pointer_move(&mut store, Point::new(step as f64 * 10.0, 0.0)));
        }
        assert!(ctl.is_idle());
        ctl.pointer_up(&mut store);

        assert_eq!(store.history().undo_depth(), 1);
        assert!(store.can_redo());
        assert_eq!(square_of(&store, id), Square::new(100.0, 100.0, 100.0));
    }

    #[test]
    fn test_begin_on_unknown_crop() {
        let mut store = CropStore::new();
        let mut ctl = InteractionController::new(BOUNDS);
        assert!(!ctl.begin_drag(&mut store, CropId::new(9), Point::default(), &[]));
        assert!(ctl.is_idle());
        assert!(!store.is_gesture_active());
    }

    #[test]
    fn test_corner_from_name() {
        assert_eq!(Corner::from_name("se"), Some(Corner::Se));
        assert_eq!(Corner::from_name("nw"), Some(Corner::Nw));
        assert_eq!(Corner::from_name("north"), None);
    }
}
