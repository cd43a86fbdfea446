//! The canvas: root group of everything on the drawing surface.
//!
//! The canvas owns the scene arena. Other groups the editor needs (palette,
//! selection, shape templates) live in the same arena but outside the
//! canvas, so only canvas members are drawn and snapshotted.

use crate::error::SceneError;
use crate::history::Memento;
use crate::model::{NodeKind, Scene, SceneNode};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One cell for the presenter: row (y) and column (x) on the display grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    pub row: i64,
    pub col: i64,
    pub symbol: String,
    /// Group anchor with members: draw in reverse video.
    pub reverse: bool,
}

#[derive(Debug, Clone)]
pub struct Canvas {
    pub scene: Scene,
    pub root: NodeIndex,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    #[must_use]
    pub fn new() -> Self {
        let mut scene = Scene::new();
        let root = scene.insert(SceneNode::group());
        Self { scene, root }
    }

    /// Top-level members in drawing order.
    pub fn members(&self) -> &[NodeIndex] {
        self.scene.children(self.root)
    }

    /// Put an existing node on the canvas.
    pub fn add(&mut self, idx: NodeIndex) -> Result<(), SceneError> {
        self.scene.add(self.root, idx)
    }

    /// Create a node directly on the canvas.
    pub fn insert(&mut self, node: SceneNode) -> NodeIndex {
        let idx = self.scene.insert(node);
        if let Err(err) = self.scene.add(self.root, idx) {
            log::warn!("{err}");
        }
        idx
    }

    /// Take a node off the canvas. False when it was not a member.
    pub fn remove(&mut self, idx: NodeIndex) -> bool {
        self.scene.remove(self.root, idx).unwrap_or(false)
    }

    pub fn clear(&mut self) -> Vec<NodeIndex> {
        self.scene.clear(self.root).unwrap_or_default()
    }

    /// Capture the members and the full state of everything below them.
    pub fn create_memento(&self) -> Memento {
        let members = self.members().to_vec();
        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        let mut stack: Vec<NodeIndex> = members.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            if !seen.insert(idx) {
                continue;
            }
            if let Some(node) = self.scene.get(idx) {
                stack.extend(node.children().iter().rev().copied());
                nodes.push((idx, node.clone()));
            }
        }
        log::debug!("memento: {} members, {} nodes", members.len(), nodes.len());
        Memento::new(members, nodes)
    }

    /// Replace the canvas contents (and the state of every captured node)
    /// with the snapshot.
    pub fn restore_from_memento(&mut self, memento: &Memento) {
        for (idx, state) in memento.nodes() {
            match self.scene.get_mut(*idx) {
                Some(node) => *node = state.clone(),
                None => log::warn!("memento refers to {idx:?}, which is gone"),
            }
        }
        for (idx, state) in memento.nodes() {
            if state.is_group() {
                self.scene.sync_edges(*idx);
            }
        }
        if let Some(SceneNode {
            kind: NodeKind::Group { children },
            ..
        }) = self.scene.get_mut(self.root)
        {
            memento.members().clone_into(children);
        }
        self.scene.sync_edges(self.root);
    }

    /// Flatten the canvas into display cells. Positions are rounded here
    /// and nowhere else.
    pub fn glyphs(&self) -> Vec<Glyph> {
        self.scene.glyphs(self.root)
    }

    /// `glyphs` limited to a `width` × `height` grid anchored at (0, 0).
    pub fn glyphs_within(&self, width: i64, height: i64) -> Vec<Glyph> {
        self.glyphs()
            .into_iter()
            .filter(|g| (0..width).contains(&g.col) && (0..height).contains(&g.row))
            .collect()
    }
}

impl Scene {
    /// Display cells for every member of `group`: each member in order, a
    /// nested group's members before its anchor.
    pub fn glyphs(&self, group: NodeIndex) -> Vec<Glyph> {
        let mut out = Vec::new();
        for &idx in self.children(group) {
            self.collect_glyphs(idx, &mut out);
        }
        out
    }

    fn collect_glyphs(&self, idx: NodeIndex, out: &mut Vec<Glyph>) {
        let Some(node) = self.get(idx) else {
            return;
        };
        for &child in node.children() {
            self.collect_glyphs(child, out);
        }
        out.push(Glyph {
            row: node.position.y.round() as i64,
            col: node.position.x.round() as i64,
            symbol: node.symbol().to_string(),
            reverse: !node.children().is_empty(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Cartesian;
    use crate::history::History;
    use glam::DVec2;
    use pretty_assertions::assert_eq;

    fn positions(canvas: &Canvas) -> Vec<(f64, f64)> {
        canvas
            .members()
            .iter()
            .map(|m| {
                let p = canvas.scene.position(*m).unwrap();
                (p.x, p.y)
            })
            .collect()
    }

    #[test]
    fn undo_redo_scenario() {
        let mut canvas = Canvas::new();
        let mut history = History::new();
        let _a = canvas.insert(SceneNode::element(1.0, 1.0));
        let b = canvas.insert(SceneNode::element(2.0, 2.0));
        let c = canvas.insert(SceneNode::element(3.0, 3.0));

        history.save_state(canvas.create_memento());
        canvas.remove(c);
        history.save_state(canvas.create_memento());
        canvas.remove(b);
        history.save_state(canvas.create_memento());
        assert_eq!(positions(&canvas), vec![(1.0, 1.0)]);

        let m = history.undo().unwrap();
        canvas.restore_from_memento(m);
        assert_eq!(positions(&canvas), vec![(1.0, 1.0), (2.0, 2.0)]);

        let m = history.undo().unwrap();
        canvas.restore_from_memento(m);
        assert_eq!(positions(&canvas), vec![(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);

        let m = history.redo().unwrap();
        canvas.restore_from_memento(m);
        assert_eq!(positions(&canvas), vec![(1.0, 1.0), (2.0, 2.0)]);
    }

    #[test]
    fn memento_is_not_changed_by_later_edits() {
        let mut canvas = Canvas::new();
        let el = canvas.insert(SceneNode::element(1.0, 1.0).with_symbol("X"));
        let snapshot = canvas.create_memento();

        canvas
            .scene
            .move_node(el, &Cartesian::new(), 5.0, 5.0)
            .unwrap();
        canvas.scene.fill_named(el, "symbol", "@").unwrap();
        assert_eq!(snapshot.position_of(el), Some(DVec2::new(1.0, 1.0)));
        assert_eq!(snapshot.node(el).unwrap().symbol(), "X");

        canvas.restore_from_memento(&snapshot);
        assert_eq!(canvas.scene.position(el), Some(DVec2::new(1.0, 1.0)));
        assert_eq!(canvas.scene.get(el).unwrap().symbol(), "X");
    }

    #[test]
    fn restore_brings_back_nested_groups() {
        let mut canvas = Canvas::new();
        let group = canvas.insert(SceneNode::group().at(4.0, 4.0));
        let inner = canvas.scene.insert(SceneNode::element(3.0, 4.0));
        canvas.scene.add(group, inner).unwrap();
        let snapshot = canvas.create_memento();

        canvas.scene.remove(group, inner).unwrap();
        canvas.clear();
        assert!(canvas.scene.is_detached(inner));

        canvas.restore_from_memento(&snapshot);
        assert_eq!(canvas.members(), &[group]);
        assert_eq!(canvas.scene.children(group), &[inner]);
        assert_eq!(canvas.scene.parents(inner), vec![group]);
        assert_eq!(canvas.scene.parents(group), vec![canvas.root]);
    }

    #[test]
    fn glyphs_flatten_groups_with_reverse_anchor() {
        let mut canvas = Canvas::new();
        canvas.insert(SceneNode::element(1.4, 2.6).with_symbol("&"));
        let group = canvas.insert(SceneNode::group().at(5.0, 5.0));
        let a = canvas.scene.insert(SceneNode::element(4.0, 5.0).with_symbol("X"));
        canvas.scene.add(group, a).unwrap();
        canvas.insert(SceneNode::group().at(8.0, 8.0));

        let glyph = |row, col, symbol: &str, reverse| Glyph {
            row,
            col,
            symbol: symbol.to_string(),
            reverse,
        };
        assert_eq!(
            canvas.glyphs(),
            vec![
                glyph(3, 1, "&", false),
                glyph(5, 4, "X", false),
                glyph(5, 5, "+", true),
                glyph(8, 8, "+", false),
            ]
        );
    }

    #[test]
    fn glyphs_within_drops_offscreen_cells() {
        let mut canvas = Canvas::new();
        canvas.insert(SceneNode::element(-1.0, 0.0).with_symbol("a"));
        canvas.insert(SceneNode::element(0.0, 0.0).with_symbol("b"));
        canvas.insert(SceneNode::element(10.0, 3.0).with_symbol("c"));
        let visible: Vec<_> = canvas
            .glyphs_within(10, 5)
            .into_iter()
            .map(|g| g.symbol)
            .collect();
        assert_eq!(visible, vec!["b".to_string()]);
    }
}
