//! Ordered crop collection with bounded undo/redo.
//!
//! [`CropStore`] owns the live list of [`CropSquare`]s. Every mutation keeps
//! the ordering invariant: `order` is a dense `1..=N` sequence matching list
//! position. User edits snapshot the prior list into a [`History`]; viewport
//! corrections (`clamp_to_bounds`, `rescale_to_bounds`) do not.
//!
//! # Gestures
//!
//! A drag or resize produces one `update` per pointer move. Between
//! [`CropStore::begin_gesture`] and [`CropStore::end_gesture`] those updates
//! are applied without snapshots; `end_gesture` records the pre-gesture list
//! once, if anything changed. Undoing then reverts the whole gesture.
//!
//! # Invalid input
//!
//! Unknown ids and out-of-range indices are ignored. Operations report
//! whether they changed anything instead of failing.

mod history;
mod ids;

pub use history::{History, DEFAULT_HISTORY_DEPTH};
pub use ids::{CropId, IdSource, SequentialIds};

use serde::Serialize;

use crate::geometry::{self, Bounds, Point, Square, MIN_SIZE};

/// Fraction of the shorter viewport side used for a click-placed square.
const CLICK_SIZE_FRACTION: f64 = 0.2;

/// One carousel slide: a square region plus its export position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSquare {
    pub id: CropId,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    /// 1-based export position
    pub order: usize,
}

impl CropSquare {
    /// Geometry of this crop.
    pub fn square(&self) -> Square {
        Square::new(self.x, self.y, self.size)
    }

    fn with_square(&self, square: Square) -> Self {
        Self {
            x: square.x,
            y: square.y,
            size: square.size,
            ..self.clone()
        }
    }
}

/// Partial update of a crop's geometry. `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CropPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub size: Option<f64>,
}

impl CropPatch {
    /// Patch only the position.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            size: None,
        }
    }

    /// Patch position and size.
    pub fn square(square: Square) -> Self {
        Self {
            x: Some(square.x),
            y: Some(square.y),
            size: Some(square.size),
        }
    }

    fn apply(&self, crop: &CropSquare) -> Option<CropSquare> {
        let x = self.x.unwrap_or(crop.x);
        let y = self.y.unwrap_or(crop.y);
        let size = self.size.unwrap_or(crop.size);

        if x == crop.x && y == crop.y && size == crop.size {
            return None;
        }
        Some(crop.with_square(Square::new(x, y, size)))
    }
}

/// The ordered crop list and its edit history.
#[derive(Debug, Clone)]
pub struct CropStore<I = SequentialIds> {
    squares: Vec<CropSquare>,
    history: History<Vec<CropSquare>>,
    /// List captured at `begin_gesture`, present while a gesture is active.
    gesture_origin: Option<Vec<CropSquare>>,
    ids: I,
}

impl Default for CropStore<SequentialIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl CropStore<SequentialIds> {
    /// Empty store with sequential ids and the default history depth.
    pub fn new() -> Self {
        Self::with_ids(SequentialIds::default())
    }

    /// Empty store keeping at most `depth` undo and redo snapshots.
    pub fn with_history_depth(depth: usize) -> Self {
        Self::with_ids_and_depth(SequentialIds::default(), depth)
    }
}

impl<I: IdSource> CropStore<I> {
    /// Empty store drawing ids from `ids`.
    pub fn with_ids(ids: I) -> Self {
        Self::with_ids_and_depth(ids, DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_ids_and_depth(ids: I, depth: usize) -> Self {
        Self {
            squares: Vec::new(),
            history: History::new(depth),
            gesture_origin: None,
            ids,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Crops in export order.
    pub fn squares(&self) -> &[CropSquare] {
        &self.squares
    }

    pub fn get(&self, id: CropId) -> Option<&CropSquare> {
        self.squares.iter().find(|sq| sq.id == id)
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture_origin.is_some()
    }

    pub fn history(&self) -> &History<Vec<CropSquare>> {
        &self.history
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Append a new crop at the end of the export sequence.
    pub fn add(&mut self, x: f64, y: f64, size: f64) -> CropId {
        let id = self.ids.next_id();
        let mut next = self.squares.clone();
        next.push(CropSquare {
            id,
            x,
            y,
            size,
            order: next.len() + 1,
        });
        self.commit(next);
        id
    }

    /// Add a crop centered on a canvas click, sized relative to the viewport.
    ///
    /// Returns `None` when the bounds are degenerate.
    pub fn add_at_point(&mut self, point: Point, bounds: Bounds) -> Option<CropId> {
        if bounds.is_degenerate() {
            return None;
        }
        let size = (bounds.width.min(bounds.height) * CLICK_SIZE_FRACTION).max(MIN_SIZE);
        let placed = geometry::clamp_to_bounds(
            Square::new(point.x - size / 2.0, point.y - size / 2.0, size),
            bounds,
        );
        Some(self.add(placed.x, placed.y, placed.size))
    }

    /// Replace all crops with `count` equal squares spanning the full width.
    ///
    /// Squares are laid left to right and centered vertically. The whole
    /// replacement is a single undo step.
    pub fn auto_fill(&mut self, count: usize, bounds: Bounds) -> Vec<CropId> {
        if count == 0 || bounds.is_degenerate() {
            return Vec::new();
        }

        let size = (bounds.width / count as f64).min(bounds.height);
        let y = (bounds.height - size) / 2.0;

        let next: Vec<CropSquare> = (0..count)
            .map(|i| CropSquare {
                id: self.ids.next_id(),
                x: i as f64 * size,
                y,
                size,
                order: i + 1,
            })
            .collect();
        let ids = next.iter().map(|sq| sq.id).collect();
        self.commit(next);
        ids
    }

    /// Merge `patch` into the crop with `id`.
    ///
    /// Returns false (and records nothing) for unknown ids or when no field
    /// actually changes.
    pub fn update(&mut self, id: CropId, patch: CropPatch) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let Some(updated) = patch.apply(&self.squares[index]) else {
            return false;
        };

        let mut next = self.squares.clone();
        next[index] = updated;
        self.commit(next);
        true
    }

    /// Remove the crop with `id` and renumber the rest.
    pub fn remove(&mut self, id: CropId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        let mut next: Vec<CropSquare> = self.squares.iter().filter(|sq| sq.id != id).cloned().collect();
        renumber(&mut next);
        self.commit(next);
        true
    }

    /// Move the crop at `from` to position `to` in the export sequence.
    pub fn move_square(&mut self, from: usize, to: usize) -> bool {
        let len = self.squares.len();
        if from == to || from >= len || to >= len {
            return false;
        }
        let mut next = self.squares.clone();
        let moved = next.remove(from);
        next.insert(to, moved);
        renumber(&mut next);
        self.commit(next);
        true
    }

    /// Remove every crop.
    pub fn clear(&mut self) -> bool {
        if self.squares.is_empty() {
            return false;
        }
        self.commit(Vec::new());
        true
    }

    // ========================================================================
    // Gestures and history
    // ========================================================================

    /// Start suppressing snapshots for a continuous drag or resize.
    ///
    /// Calling it again while a gesture is active keeps the original capture.
    pub fn begin_gesture(&mut self) {
        if self.gesture_origin.is_none() {
            self.gesture_origin = Some(self.squares.clone());
        }
    }

    /// Finish the active gesture, recording one undo step if the list changed.
    pub fn end_gesture(&mut self) {
        if let Some(origin) = self.gesture_origin.take() {
            if origin != self.squares {
                self.history.record(origin);
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        self.gesture_origin = None;
        let current = self.squares.clone();
        match self.history.undo(current) {
            Some(previous) => {
                self.squares = previous;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.gesture_origin = None;
        let current = self.squares.clone();
        match self.history.redo(current) {
            Some(next) => {
                self.squares = next;
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Viewport corrections (never recorded in history)
    // ========================================================================

    /// Pull every crop inside `bounds`.
    pub fn clamp_to_bounds(&mut self, bounds: Bounds) -> bool {
        if bounds.is_degenerate() {
            return false;
        }
        self.map_geometry(|sq| geometry::clamp_to_bounds(sq, bounds))
    }

    /// Rescale every crop from the old viewport size to the new one.
    pub fn rescale_to_bounds(&mut self, from: Bounds, to: Bounds) -> bool {
        if from.is_degenerate() || to.is_degenerate() {
            return false;
        }
        self.map_geometry(|sq| geometry::rescale_to_bounds(sq, from, to))
    }

    fn map_geometry(&mut self, f: impl Fn(Square) -> Square) -> bool {
        let mut changed = false;
        for crop in &mut self.squares {
            let mapped = f(crop.square());
            if mapped != crop.square() {
                *crop = crop.with_square(mapped);
                changed = true;
            }
        }
        changed
    }

    fn index_of(&self, id: CropId) -> Option<usize> {
        self.squares.iter().position(|sq| sq.id == id)
    }

    /// Install `next` as the live list, snapshotting the old one unless a
    /// gesture is active.
    fn commit(&mut self, next: Vec<CropSquare>) {
        let prior = std::mem::replace(&mut self.squares, next);
        if self.gesture_origin.is_none() {
            self.history.record(prior);
        }
    }
}

fn renumber(squares: &mut [CropSquare]) {
    for (i, sq) in squares.iter_mut().enumerate() {
        sq.order = i + 1;
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
