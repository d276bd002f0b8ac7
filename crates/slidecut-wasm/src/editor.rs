//! Crop editing WASM bindings.
//!
//! [`JsCropEditor`] bundles the crop store, the pointer interaction
//! controller and the current viewport bounds. Crop ids cross the boundary
//! as strings; unknown or malformed ids are ignored like any other stale
//! reference from the UI.

use crate::types::{js_error, parse_id, to_js};
use slidecut_core::geometry::{self, Bounds, Point, Square, MIN_SIZE};
use slidecut_core::interaction::{Corner, InteractionController};
use slidecut_core::store::{CropId, CropPatch, CropStore};
use wasm_bindgen::prelude::*;

/// Interactive crop editor for one loaded image.
///
/// # Example
///
/// ```typescript
/// const editor = new JsCropEditor(viewport.width, viewport.height);
/// const id = editor.add_at_point(event.offsetX, event.offsetY);
///
/// editor.begin_drag(id, event.clientX, event.clientY, selection);
/// editor.pointer_move(event.clientX, event.clientY);
/// editor.pointer_up();
///
/// render(editor.squares());
/// ```
#[wasm_bindgen]
pub struct JsCropEditor {
    store: CropStore,
    controller: InteractionController,
}

#[wasm_bindgen]
impl JsCropEditor {
    /// Create an empty editor for a display area of `width` x `height`.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> JsCropEditor {
        JsCropEditor {
            store: CropStore::new(),
            controller: InteractionController::new(Bounds::new(width, height)),
        }
    }

    /// Resize the display area. Existing crops scale proportionally.
    ///
    /// Returns true if any crop moved or resized.
    pub fn set_bounds(&mut self, width: f64, height: f64) -> bool {
        let from = self.controller.bounds();
        let to = Bounds::new(width, height);
        if from == to {
            return false;
        }
        self.controller.set_bounds(to);
        if from.is_degenerate() {
            self.store.clamp_to_bounds(to)
        } else {
            self.store.rescale_to_bounds(from, to)
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f64 {
        self.controller.bounds().width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> f64 {
        self.controller.bounds().height
    }

    /// Number of crops.
    #[wasm_bindgen(getter)]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The ordered crop list as `{ id, x, y, size, order }[]`.
    pub fn squares(&self) -> Result<JsValue, JsValue> {
        to_js(self.store.squares())
    }

    /// Append a crop and return its id.
    ///
    /// The side is raised to the minimum crop size and the square is clamped
    /// into the current display area.
    pub fn add(&mut self, x: f64, y: f64, size: f64) -> String {
        let placed = geometry::clamp_to_bounds(
            Square::new(x, y, size.max(MIN_SIZE)),
            self.controller.bounds(),
        );
        self.store.add(placed.x, placed.y, placed.size).to_string()
    }

    /// Add a crop centered on a canvas click.
    pub fn add_at_point(&mut self, x: f64, y: f64) -> Option<String> {
        self.store
            .add_at_point(Point::new(x, y), self.controller.bounds())
            .map(|id| id.to_string())
    }

    /// Replace all crops with `count` squares spanning the width. Returns the new ids.
    pub fn auto_fill(&mut self, count: usize) -> Vec<String> {
        self.store
            .auto_fill(count, self.controller.bounds())
            .into_iter()
            .map(|id| id.to_string())
            .collect()
    }

    /// Change any of `x`, `y`, `size` of one crop.
    pub fn update(&mut self, id: &str, x: Option<f64>, y: Option<f64>, size: Option<f64>) -> bool {
        let Some(id) = parse_id(id) else {
            return false;
        };
        self.store.update(id, CropPatch { x, y, size })
    }

    pub fn remove(&mut self, id: &str) -> bool {
        parse_id(id).is_some_and(|id| self.store.remove(id))
    }

    /// Move the crop at `from` to position `to` (0-based).
    pub fn move_square(&mut self, from: usize, to: usize) -> bool {
        self.store.move_square(from, to)
    }

    pub fn clear(&mut self) -> bool {
        self.store.clear()
    }

    /// Undo the last edit. An in-flight gesture is closed first, so it is
    /// the step being undone.
    pub fn undo(&mut self) -> bool {
        self.controller.pointer_cancel(&mut self.store);
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.controller.pointer_cancel(&mut self.store);
        self.store.redo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// Press on the body of a crop. `selection` is the current multi-selection.
    pub fn begin_drag(&mut self, id: &str, x: f64, y: f64, selection: Vec<String>) -> bool {
        let Some(id) = parse_id(id) else {
            return false;
        };
        let selection = parse_selection(&selection);
        self.controller
            .begin_drag(&mut self.store, id, Point::new(x, y), &selection)
    }

    /// Press on a resize handle (`"nw"`, `"ne"`, `"sw"` or `"se"`).
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown corner name.
    pub fn begin_resize(
        &mut self,
        id: &str,
        corner: &str,
        x: f64,
        y: f64,
        selection: Vec<String>,
    ) -> Result<bool, JsValue> {
        let corner = resize_corner(corner).map_err(js_error)?;
        let Some(id) = parse_id(id) else {
            return Ok(false);
        };
        let selection = parse_selection(&selection);
        Ok(self
            .controller
            .begin_resize(&mut self.store, id, corner, Point::new(x, y), &selection))
    }

    /// Pointer moved. Returns true if any crop changed.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.controller.pointer_move(&mut self.store, Point::new(x, y))
    }

    pub fn pointer_up(&mut self) {
        self.controller.pointer_up(&mut self.store);
    }

    /// Pointer capture was lost; ends any gesture like a release.
    pub fn pointer_cancel(&mut self) {
        self.controller.pointer_cancel(&mut self.store);
    }

    /// `{ kind: "idle" }`, `{ kind: "dragging", id }` or `{ kind: "resizing", id, corner }`.
    pub fn interaction_state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.state())
    }

    #[wasm_bindgen(getter)]
    pub fn is_idle(&self) -> bool {
        self.controller.is_idle()
    }
}

impl JsCropEditor {
    pub(crate) fn store(&self) -> &CropStore {
        &self.store
    }
}

fn parse_selection(selection: &[String]) -> Vec<CropId> {
    selection.iter().filter_map(|id| parse_id(id)).collect()
}

fn resize_corner(name: &str) -> Result<Corner, String> {
    Corner::from_name(name).ok_or_else(|| format!("Unknown resize corner: {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut editor = JsCropEditor::new(800.0, 400.0);
        let id = editor.add(10.0, 10.0, 100.0);
        assert_eq!(editor.len(), 1);
        assert!(editor.can_undo());
        assert!(!editor.remove("not-an-id"));
        assert!(editor.remove(&id));
        assert!(editor.is_empty());
    }

    #[test]
    fn test_add_is_clamped_to_viewport() {
        let mut editor = JsCropEditor::new(800.0, 400.0);
        editor.add(780.0, -20.0, 10.0);
        let sq = &editor.store().squares()[0];
        assert_eq!((sq.x, sq.y, sq.size), (750.0, 0.0, MIN_SIZE));

        editor.add(0.0, 0.0, 1000.0);
        let sq = &editor.store().squares()[1];
        assert_eq!((sq.x, sq.y, sq.size), (0.0, 0.0, 400.0));
    }

    #[test]
    fn test_update_partial_fields() {
        let mut editor = JsCropEditor::new(800.0, 400.0);
        let id = editor.add(10.0, 10.0, 100.0);
        assert!(editor.update(&id, Some(50.0), None, None));
        let sq = &editor.store().squares()[0];
        assert_eq!((sq.x, sq.y, sq.size), (50.0, 10.0, 100.0));
        assert!(!editor.update(&id, Some(50.0), None, None));
        assert!(!editor.update("99", Some(1.0), None, None));
    }

    #[test]
    fn test_auto_fill_returns_ids() {
        let mut editor = JsCropEditor::new(900.0, 300.0);
        let ids = editor.auto_fill(3);
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(editor.store().squares()[2].x, 600.0);
    }

    #[test]
    fn test_drag_gesture_is_one_undo_step() {
        let mut editor = JsCropEditor::new(800.0, 400.0);
        let id = editor.add(100.0, 100.0, 100.0);
        assert!(editor.begin_drag(&id, 0.0, 0.0, vec![]));
        assert!(!editor.is_idle());
        editor.pointer_move(10.0, 0.0);
        editor.pointer_move(40.0, 0.0);
        editor.pointer_up();
        assert!(editor.is_idle());
        assert_eq!(editor.store().squares()[0].x, 140.0);

        assert!(editor.undo());
        assert_eq!(editor.store().squares()[0].x, 100.0);
        assert!(editor.redo());
        assert_eq!(editor.store().squares()[0].x, 140.0);
    }

    #[test]
    fn test_undo_mid_drag_reverts_the_drag() {
        let mut editor = JsCropEditor::new(800.0, 400.0);
        let id = editor.add(100.0, 100.0, 100.0);
        editor.begin_drag(&id, 0.0, 0.0, vec![]);
        editor.pointer_move(30.0, 0.0);

        assert!(editor.undo());
        assert!(editor.is_idle());
        assert_eq!(editor.store().squares()[0].x, 100.0);
        assert_eq!(editor.store().history().undo_depth(), 1);

        for step in 1..=5 {
            assert!(!editor.pointer_move(step as f64 * 10.0, 0.0));
        }
        editor.pointer_up();
        assert_eq!(editor.store().history().undo_depth(), 1);
        assert!(editor.can_redo());
    }

    #[test]
    fn test_resize_with_selection() {
        let mut editor = JsCropEditor::new(800.0, 400.0);
        let a = editor.add(100.0, 100.0, 100.0);
        let b = editor.add(300.0, 100.0, 100.0);
        let selection = vec![a.clone(), b.clone()];
        assert_eq!(editor.begin_resize(&a, "se", 0.0, 0.0, selection), Ok(true));
        editor.pointer_move(50.0, 50.0);
        editor.pointer_cancel();
        assert!(editor.is_idle());

        let squares = editor.store().squares();
        assert_eq!(squares[0].size, 150.0);
        assert_eq!((squares[1].x, squares[1].y, squares[1].size), (400.0, 100.0, 150.0));
    }

    #[test]
    fn test_resize_corner_names() {
        assert_eq!(resize_corner("nw"), Ok(Corner::Nw));
        assert!(resize_corner("middle").is_err());
    }

    #[test]
    fn test_set_bounds_rescales() {
        let mut editor = JsCropEditor::new(800.0, 400.0);
        editor.add(400.0, 200.0, 100.0);
        assert!(editor.set_bounds(400.0, 200.0));
        let sq = &editor.store().squares()[0];
        assert_eq!((sq.x, sq.y, sq.size), (200.0, 100.0, 50.0));
        // Viewport changes are not undoable edits.
        assert!(editor.undo());
        assert!(editor.is_empty());
        assert!(!editor.set_bounds(400.0, 200.0));
    }

    #[test]
    fn test_set_bounds_from_empty_viewport_clamps() {
        let mut editor = JsCropEditor::new(0.0, 0.0);
        editor.add(700.0, 0.0, 100.0);
        editor.set_bounds(500.0, 300.0);
        let sq = &editor.store().squares()[0];
        assert_eq!((sq.x, sq.size), (400.0, 100.0));
    }
}
