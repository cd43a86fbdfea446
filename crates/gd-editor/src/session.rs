//! The editing session driven by a UI.
//!
//! A `Session` holds everything one drawing window needs:
//!
//! - the **canvas** (drawn and snapshotted),
//! - the **selection**, a detached group that temporarily takes nodes off
//!   the canvas while a command is applied to them,
//! - the **palette** and the **shape templates**, detached groups in the
//!   same arena that are shown or copied but never edited,
//! - the undo **history** and the **event bus** observers listen on.
//!
//! Grid coordinates in and out of the session are integers; positions in
//! the scene stay unrounded.

use crate::commands::{Command, Operation};
use crate::events::EventBus;
use crate::presets;
use gd_core::{Canvas, Glyph, History, NodeIndex, Point, PositionChanged, SceneError, SceneNode};

#[derive(Debug)]
pub struct Session {
    pub canvas: Canvas,
    pub history: History,
    pub bus: EventBus,
    selection: NodeIndex,
    palette: NodeIndex,
    /// Name → template group, in registration order.
    shapes: Vec<(String, NodeIndex)>,
    /// Pivot for the next command.
    reference: Option<Point>,
    /// Symbol placed by `place`, chosen from the palette.
    brush: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// An empty session: blank canvas, empty palette, no shapes.
    pub fn new() -> Self {
        Self::with_history(History::new())
    }

    /// An empty session using `history` (e.g. `History::with_max_depth`).
    pub fn with_history(history: History) -> Self {
        let mut canvas = Canvas::new();
        let selection = canvas.scene.insert(SceneNode::group());
        let palette = canvas.scene.insert(SceneNode::group());
        Self {
            canvas,
            history,
            bus: EventBus::new(),
            selection,
            palette,
            shapes: Vec::new(),
            reference: None,
            brush: None,
        }
    }

    /// A session with the built-in palette and shapes.
    pub fn with_presets() -> Self {
        let mut session = Self::new();
        if let Err(err) = session.load_presets() {
            log::warn!("presets not loaded: {err}");
        }
        session
    }

    fn load_presets(&mut self) -> Result<(), SceneError> {
        presets::fill_palette(&mut self.canvas.scene, self.palette)?;
        for preset in &presets::SHAPES {
            let template = presets::build_shape(&mut self.canvas.scene, preset)?;
            self.add_shape(preset.name, template);
        }
        Ok(())
    }

    // ─── Groups ──────────────────────────────────────────────────────────

    pub fn selection(&self) -> NodeIndex {
        self.selection
    }

    pub fn palette(&self) -> NodeIndex {
        self.palette
    }

    /// Register a template under `name`. A name already taken keeps its
    /// first template.
    pub fn add_shape(&mut self, name: &str, template: NodeIndex) -> bool {
        if self.shape(name).is_some() {
            log::debug!("shape {name:?} already registered");
            return false;
        }
        self.shapes.push((name.to_string(), template));
        true
    }

    pub fn shape(&self, name: &str) -> Option<NodeIndex> {
        self.shapes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, idx)| *idx)
    }

    pub fn shape_names(&self) -> Vec<&str> {
        self.shapes.iter().map(|(n, _)| n.as_str()).collect()
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Move every top-level canvas node at the cell into the selection.
    /// Returns how many were taken.
    pub fn select_at(&mut self, x: i64, y: i64) -> Result<usize, SceneError> {
        let hits = self.canvas.scene.nodes_at(self.canvas.root, x, y);
        for &idx in &hits {
            self.canvas.remove(idx);
            self.canvas.scene.add(self.selection, idx)?;
        }
        log::debug!("selected {} node(s) at ({x}, {y})", hits.len());
        Ok(hits.len())
    }

    /// Put every selected node back on the canvas and empty the selection.
    pub fn release_selection(&mut self) -> Result<usize, SceneError> {
        let members = self.canvas.scene.clear(self.selection)?;
        for &idx in &members {
            self.canvas.add(idx)?;
        }
        Ok(members.len())
    }

    /// Drop the selection without returning it to the canvas.
    pub fn delete_selection(&mut self) -> Result<Vec<NodeIndex>, SceneError> {
        let dropped = self.canvas.scene.clear(self.selection)?;
        log::debug!("deleted {} node(s)", dropped.len());
        Ok(dropped)
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Pivot for the next `apply`.
    pub fn set_reference(&mut self, x: f64, y: f64) {
        self.reference = Some(Point::new(x, y));
    }

    pub fn reference(&self) -> Option<Point> {
        self.reference
    }

    /// Run `operation` on the selection about the pending reference point
    /// (the origin when none was set), then release the selection and
    /// forget the reference point.
    pub fn apply(&mut self, operation: Operation) -> Result<Vec<PositionChanged>, SceneError> {
        let command = Command::new(self.selection, operation)
            .with_reference(self.reference.take().unwrap_or(Point::ZERO));
        let result = command.execute(&mut self.canvas.scene, &mut self.bus);
        self.release_selection()?;
        result
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// Choose the palette symbol at the cell as the brush.
    pub fn pick_palette(&mut self, x: i64, y: i64) -> Option<&str> {
        let hit = self
            .canvas
            .scene
            .nodes_at(self.palette, x, y)
            .into_iter()
            .next()?;
        let symbol = self.canvas.scene.get(hit)?.symbol().to_string();
        log::debug!("brush {symbol:?}");
        self.brush = Some(symbol);
        self.brush.as_deref()
    }

    pub fn brush(&self) -> Option<&str> {
        self.brush.as_deref()
    }

    /// Draw one element with the brush symbol. `None` when no brush was
    /// picked yet.
    pub fn place(&mut self, x: i64, y: i64) -> Option<NodeIndex> {
        let Some(symbol) = self.brush.as_deref() else {
            log::debug!("place at ({x}, {y}) without a brush");
            return None;
        };
        let node = SceneNode::element(x as f64, y as f64).with_symbol(symbol);
        Some(self.canvas.insert(node))
    }

    /// Put a fresh copy of the named shape on the canvas. Unknown names
    /// change nothing.
    pub fn insert_shape(&mut self, name: &str) -> Result<Option<NodeIndex>, SceneError> {
        let Some(template) = self.shape(name) else {
            log::warn!("no shape named {name:?}");
            return Ok(None);
        };
        let copy = self.canvas.scene.deep_copy(template)?;
        self.canvas.add(copy)?;
        Ok(Some(copy))
    }

    pub fn clear_canvas(&mut self) -> Vec<NodeIndex> {
        self.canvas.clear()
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Snapshot the canvas as the new current history state.
    pub fn save(&mut self) {
        self.history.save_state(self.canvas.create_memento());
    }

    /// Restore the previous snapshot. False when there is none.
    pub fn undo(&mut self) -> bool {
        let Some(memento) = self.history.undo() else {
            return false;
        };
        // The snapshot decides what is on the canvas; a pending selection
        // would otherwise end up in two places.
        if let Err(err) = self.canvas.scene.clear(self.selection) {
            log::warn!("{err}");
        }
        self.canvas.restore_from_memento(memento);
        self.reference = None;
        true
    }

    /// Restore the next snapshot. False when there is none.
    pub fn redo(&mut self) -> bool {
        let Some(memento) = self.history.redo() else {
            return false;
        };
        if let Err(err) = self.canvas.scene.clear(self.selection) {
            log::warn!("{err}");
        }
        self.canvas.restore_from_memento(memento);
        self.reference = None;
        true
    }

    // ─── Display ─────────────────────────────────────────────────────────

    pub fn canvas_glyphs(&self) -> Vec<Glyph> {
        self.canvas.glyphs()
    }

    pub fn palette_glyphs(&self) -> Vec<Glyph> {
        self.canvas.scene.glyphs(self.palette)
    }

    /// Nodes currently taken off the canvas by `select_at`.
    pub fn selection_glyphs(&self) -> Vec<Glyph> {
        self.canvas.scene.glyphs(self.selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cells(glyphs: &[Glyph]) -> Vec<(i64, i64, &str)> {
        glyphs
            .iter()
            .map(|g| (g.col, g.row, g.symbol.as_str()))
            .collect()
    }

    #[test]
    fn new_session_is_blank() {
        let session = Session::new();
        assert!(session.canvas_glyphs().is_empty());
        assert!(session.palette_glyphs().is_empty());
        assert!(session.shape_names().is_empty());
        assert_eq!(session.brush(), None);
    }

    #[test]
    fn presets_are_loaded() {
        let session = Session::with_presets();
        assert_eq!(session.shape_names(), vec!["square", "z", "smiley"]);
        assert_eq!(
            cells(&session.palette_glyphs()),
            vec![
                (2, 0, "&"),
                (4, 0, "#"),
                (6, 0, "@"),
                (2, 1, "%"),
                (4, 1, "X"),
                (6, 1, "0"),
            ]
        );
        assert!(session.canvas_glyphs().is_empty());
    }

    #[test]
    fn pick_then_place() {
        let mut session = Session::with_presets();
        assert_eq!(session.place(1, 1), None);
        assert_eq!(session.pick_palette(6, 0), Some("@"));
        assert_eq!(session.pick_palette(3, 0), None);
        assert_eq!(session.brush(), Some("@"));

        session.place(10, 5).unwrap();
        assert_eq!(cells(&session.canvas_glyphs()), vec![(10, 5, "@")]);
    }

    #[test]
    fn select_moves_nodes_off_canvas_and_back() {
        let mut session = Session::with_presets();
        session.pick_palette(2, 0);
        let a = session.place(1, 1).unwrap();
        let b = session.place(2, 2).unwrap();

        assert_eq!(session.select_at(1, 1), Ok(1));
        assert_eq!(session.canvas.members(), &[b]);
        assert_eq!(session.canvas.scene.children(session.selection()), &[a]);

        assert_eq!(session.release_selection(), Ok(1));
        assert_eq!(session.canvas.members(), &[b, a]);
        assert!(session.canvas.scene.children(session.selection()).is_empty());
    }

    #[test]
    fn apply_uses_and_clears_reference() {
        let mut session = Session::with_presets();
        session.pick_palette(4, 1);
        let el = session.place(10, 10).unwrap();

        session.select_at(10, 10).unwrap();
        session.set_reference(8.0, 8.0);
        session.apply(Operation::Rotate { degrees: 90.0 }).unwrap();

        let p = session.canvas.scene.position(el).unwrap();
        assert!(p.abs_diff_eq(Point::new(6.0, 10.0), 1e-9));
        assert_eq!(session.reference(), None);
        assert_eq!(session.canvas.members(), &[el]);
    }

    #[test]
    fn delete_selection_drops_nodes() {
        let mut session = Session::with_presets();
        session.pick_palette(2, 0);
        let el = session.place(3, 3).unwrap();
        session.select_at(3, 3).unwrap();

        assert_eq!(session.delete_selection(), Ok(vec![el]));
        assert!(session.canvas_glyphs().is_empty());
        assert_eq!(session.release_selection(), Ok(0));
    }

    #[test]
    fn insert_shape_copies_template() {
        let mut session = Session::with_presets();
        let template = session.shape("square").unwrap();
        let copy = session.insert_shape("square").unwrap().unwrap();
        assert_ne!(copy, template);

        session.select_at(52, 12).unwrap();
        session.apply(Operation::Move { dx: 5.0, dy: 0.0 }).unwrap();

        assert_eq!(session.canvas.scene.position(copy), Some(Point::new(57.0, 12.0)));
        assert_eq!(session.canvas.scene.position(template), Some(Point::new(52.0, 12.0)));
        assert_eq!(session.insert_shape("circle"), Ok(None));
    }

    #[test]
    fn undo_with_empty_history_is_noop() {
        let mut session = Session::new();
        assert!(!session.undo());
        assert!(!session.redo());
        session.save();
        assert!(!session.undo());
    }
}
