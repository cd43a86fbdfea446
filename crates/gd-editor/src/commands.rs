//! One-shot edit commands.
//!
//! A `Command` binds a target node, an `Operation` and the pivot the
//! operation is computed about. `execute` runs the matching scene pass and
//! publishes the resulting position changes, so the caller does not care
//! whether the target is a single element or a whole group.

use crate::events::EventBus;
use gd_core::{Attribute, Axis, Cartesian, NodeIndex, Point, PositionChanged, Scene, SceneError};
use serde::{Deserialize, Serialize};

/// What a command does to its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    Move { dx: f64, dy: f64 },
    /// Degrees, counterclockwise-positive in a y-up frame.
    Rotate { degrees: f64 },
    /// `None` is an unrecognized axis and leaves positions unchanged.
    Mirror(Option<Axis>),
    Scale { fx: f64, fy: f64 },
    Fill { attribute: Attribute, value: String },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Move { .. } => "move",
            Operation::Rotate { .. } => "rotate",
            Operation::Mirror(_) => "mirror",
            Operation::Scale { .. } => "scale",
            Operation::Fill { .. } => "fill",
        }
    }

    /// Human-readable label for logs and menus.
    pub fn description(&self) -> String {
        match self {
            Operation::Move { dx, dy } => format!("Move by ({dx}, {dy})"),
            Operation::Rotate { degrees } => format!("Rotate {degrees}°"),
            Operation::Mirror(Some(axis)) => format!("Mirror {}", axis.name()),
            Operation::Mirror(None) => "Mirror (no axis)".to_string(),
            Operation::Scale { fx, fy } => format!("Scale ×({fx}, {fy})"),
            Operation::Fill { attribute, value } => format!("Fill {} = {value}", attribute.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub target: NodeIndex,
    pub operation: Operation,
    /// Pivot for rotate, mirror and scale. Move ignores it.
    pub reference: Point,
}

impl Command {
    /// A command pivoting about the origin.
    pub fn new(target: NodeIndex, operation: Operation) -> Self {
        Self {
            target,
            operation,
            reference: Point::ZERO,
        }
    }

    pub fn with_reference(mut self, reference: Point) -> Self {
        self.reference = reference;
        self
    }

    /// Apply the operation and publish every position written, children
    /// before their group. Fill writes no positions and publishes nothing.
    pub fn execute(
        &self,
        scene: &mut Scene,
        bus: &mut EventBus,
    ) -> Result<Vec<PositionChanged>, SceneError> {
        let engine = Cartesian::with_reference(self.reference);
        let events = match &self.operation {
            Operation::Move { dx, dy } => scene.move_node(self.target, &engine, *dx, *dy)?,
            Operation::Rotate { degrees } => scene.rotate_node(self.target, &engine, *degrees)?,
            Operation::Mirror(Some(axis)) => scene.mirror_node(self.target, &engine, *axis)?,
            Operation::Mirror(None) => {
                log::warn!("mirror without a known axis leaves {:?} in place", self.target);
                // Zero translation: positions stay exact, observers still hear.
                scene.move_node(self.target, &engine, 0.0, 0.0)?
            }
            Operation::Scale { fx, fy } => scene.scale_node(self.target, &engine, *fx, *fy)?,
            Operation::Fill { attribute, value } => {
                let written = scene.fill(self.target, *attribute, value)?;
                log::debug!("{}: {written} element(s)", self.operation.description());
                return Ok(Vec::new());
            }
        };
        log::debug!(
            "{} on {:?} about ({}, {}): {} node(s)",
            self.operation.description(),
            self.target,
            self.reference.x,
            self.reference.y,
            events.len()
        );
        bus.publish(&events);
        Ok(events)
    }
}
