//! Passes that apply geometry and attribute edits across the composite.
//!
//! A group pass visits every member first (recursively, with the same
//! engine) and then the group's own anchor, so a group and its members
//! always finish a pass in the same reference frame. A member listed twice
//! in a group is visited twice.
//!
//! Geometry passes return one `PositionChanged` per visited node, in visit
//! order. The scene never notifies anyone itself; the command layer hands
//! these events to whoever is listening.

use crate::error::SceneError;
use crate::geometry::{Axis, Point, Transformer};
use crate::model::{Attribute, NodeKind, Scene};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// A node finished a geometric mutation at `position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionChanged {
    pub node: NodeIndex,
    pub position: Point,
}

impl Scene {
    /// Translate a node (and, for a group, all members) by (dx, dy).
    pub fn move_node<T: Transformer + ?Sized>(
        &mut self,
        idx: NodeIndex,
        engine: &T,
        dx: f64,
        dy: f64,
    ) -> Result<Vec<PositionChanged>, SceneError> {
        self.apply_pass(idx, &|p| engine.translate(p, dx, dy))
    }

    /// Rotate about the engine's reference point; counterclockwise-positive.
    pub fn rotate_node<T: Transformer + ?Sized>(
        &mut self,
        idx: NodeIndex,
        engine: &T,
        degrees: f64,
    ) -> Result<Vec<PositionChanged>, SceneError> {
        self.apply_pass(idx, &|p| engine.rotate(p, degrees))
    }

    pub fn mirror_node<T: Transformer + ?Sized>(
        &mut self,
        idx: NodeIndex,
        engine: &T,
        axis: Axis,
    ) -> Result<Vec<PositionChanged>, SceneError> {
        self.apply_pass(idx, &|p| engine.mirror(p, axis))
    }

    pub fn scale_node<T: Transformer + ?Sized>(
        &mut self,
        idx: NodeIndex,
        engine: &T,
        fx: f64,
        fy: f64,
    ) -> Result<Vec<PositionChanged>, SceneError> {
        self.apply_pass(idx, &|p| engine.scale(p, fx, fy))
    }

    /// Set one attribute on an element, or on every element below a group.
    /// The group itself carries no attributes. Returns how many elements
    /// were written.
    pub fn fill(
        &mut self,
        idx: NodeIndex,
        attribute: Attribute,
        value: &str,
    ) -> Result<usize, SceneError> {
        let node = self.get_mut(idx).ok_or(SceneError::MissingNode(idx))?;
        match &mut node.kind {
            NodeKind::Element(attrs) => {
                attrs.set(attribute, value);
                Ok(1)
            }
            NodeKind::Group { children } => {
                let children = children.clone();
                let mut written = 0;
                for child in children {
                    written += self.fill(child, attribute, value)?;
                }
                Ok(written)
            }
        }
    }

    /// Like `fill`, with the attribute given by its user-facing name.
    /// Unknown names change nothing.
    pub fn fill_named(&mut self, idx: NodeIndex, name: &str, value: &str) -> Result<usize, SceneError> {
        match Attribute::from_name(name) {
            Some(attribute) => self.fill(idx, attribute, value),
            None => {
                log::warn!("unknown attribute {name:?}; fill ignored");
                self.node(idx)?;
                Ok(0)
            }
        }
    }

    fn apply_pass(
        &mut self,
        idx: NodeIndex,
        step: &dyn Fn(Point) -> Point,
    ) -> Result<Vec<PositionChanged>, SceneError> {
        let mut events = Vec::new();
        self.apply_step(idx, step, &mut events)?;
        Ok(events)
    }

    fn apply_step(
        &mut self,
        idx: NodeIndex,
        step: &dyn Fn(Point) -> Point,
        events: &mut Vec<PositionChanged>,
    ) -> Result<(), SceneError> {
        let children = self.node(idx)?.children().to_vec();
        for child in children {
            self.apply_step(child, step, events)?;
        }

        let node = self.get_mut(idx).ok_or(SceneError::MissingNode(idx))?;
        node.position = step(node.position);
        log::trace!("{idx:?} -> ({}, {})", node.position.x, node.position.y);
        events.push(PositionChanged {
            node: idx,
            position: node.position,
        });
        Ok(())
    }
}
