//! Canvas snapshots and the past/current/future undo history.
//!
//! A `Memento` deep-copies the state of every node reachable from the
//! canvas at capture time, so later in-place edits to an element never
//! leak into an older snapshot.

use crate::geometry::Point;
use crate::model::SceneNode;
use petgraph::graph::NodeIndex;

/// Immutable snapshot of the canvas contents.
#[derive(Debug, PartialEq)]
pub struct Memento {
    members: Vec<NodeIndex>,
    nodes: Vec<(NodeIndex, SceneNode)>,
}

impl Memento {
    pub(crate) fn new(members: Vec<NodeIndex>, nodes: Vec<(NodeIndex, SceneNode)>) -> Self {
        Self { members, nodes }
    }

    /// Top-level canvas members, in order.
    pub fn members(&self) -> &[NodeIndex] {
        &self.members
    }

    /// Captured state of every reachable node.
    pub fn nodes(&self) -> &[(NodeIndex, SceneNode)] {
        &self.nodes
    }

    /// Captured state of one node, if it was on the canvas.
    pub fn node(&self, idx: NodeIndex) -> Option<&SceneNode> {
        self.nodes.iter().find(|(i, _)| *i == idx).map(|(_, n)| n)
    }

    pub fn position_of(&self, idx: NodeIndex) -> Option<Point> {
        self.node(idx).map(|n| n.position)
    }
}

/// Undo/redo over canvas snapshots.
///
/// Exactly one snapshot is current once anything has been saved. Saving
/// pushes the old current onto `past` and discards `future`.
#[derive(Debug, Default)]
pub struct History {
    past: Vec<Memento>,
    current: Option<Memento>,
    future: Vec<Memento>,
    /// Maximum number of past snapshots kept (`None` = unbounded).
    max_depth: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// A history that forgets the oldest past snapshot beyond `max_depth`.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
            ..Self::default()
        }
    }

    /// Record a new current snapshot.
    pub fn save_state(&mut self, memento: Memento) {
        if let Some(previous) = self.current.replace(memento) {
            self.past.push(previous);
            if let Some(max) = self.max_depth
                && self.past.len() > max
            {
                self.past.remove(0);
            }
        }
        if !self.future.is_empty() {
            log::debug!("new snapshot discards {} redo step(s)", self.future.len());
        }
        self.future.clear();
    }

    /// Step back. Returns the snapshot to restore, or `None` when there is
    /// nothing to undo (state unchanged).
    pub fn undo(&mut self) -> Option<&Memento> {
        let popped = self.past.pop()?;
        if let Some(current) = self.current.replace(popped) {
            self.future.push(current);
        }
        log::debug!("undo: {} past, {} future", self.past.len(), self.future.len());
        self.current.as_ref()
    }

    /// Step forward. Returns the snapshot to restore, or `None` when there
    /// is nothing to redo (state unchanged).
    pub fn redo(&mut self) -> Option<&Memento> {
        let popped = self.future.pop()?;
        if let Some(current) = self.current.replace(popped) {
            self.past.push(current);
        }
        log::debug!("redo: {} past, {} future", self.past.len(), self.future.len());
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&Memento> {
        self.current.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(tag: u32) -> Memento {
        Memento::new(vec![NodeIndex::new(tag as usize)], Vec::new())
    }

    fn tag(m: Option<&Memento>) -> Option<usize> {
        m.map(|m| m.members()[0].index())
    }

    #[test]
    fn empty_history_has_nothing_to_do() {
        let mut history = History::new();
        assert!(history.current().is_none());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn single_save_cannot_undo() {
        let mut history = History::new();
        history.save_state(snapshot(1));
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert_eq!(tag(history.current()), Some(1));
    }

    #[test]
    fn undo_then_redo() {
        let mut history = History::new();
        history.save_state(snapshot(1));
        history.save_state(snapshot(2));

        assert_eq!(tag(history.undo()), Some(1));
        assert_eq!(tag(history.current()), Some(1));
        assert_eq!(history.future_len(), 1);

        assert_eq!(tag(history.redo()), Some(2));
        assert_eq!(tag(history.current()), Some(2));
        assert_eq!(history.past_len(), 1);
        assert!(history.redo().is_none());
    }

    #[test]
    fn save_after_undo_discards_future() {
        let mut history = History::new();
        history.save_state(snapshot(1));
        history.save_state(snapshot(2));
        history.undo();
        assert!(history.can_redo());

        history.save_state(snapshot(3));
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(tag(history.undo()), Some(1));
    }

    #[test]
    fn max_depth_trims_oldest() {
        let mut history = History::with_max_depth(2);
        for i in 0..5 {
            history.save_state(snapshot(i));
        }
        assert_eq!(history.past_len(), 2);
        assert_eq!(tag(history.undo()), Some(3));
        assert_eq!(tag(history.undo()), Some(2));
        assert!(history.undo().is_none());
    }
}
