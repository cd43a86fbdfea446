//! Homogeneous-coordinate transform engine.
//!
//! Every operation is a 3×3 matrix applied through one pipeline:
//! shift the point so the reference point becomes the origin, apply the
//! matrix, shift back. Only the matrices differ between operations.
//!
//! ## Conventions
//!
//! - Angles are in degrees; positive values rotate counterclockwise in a
//!   y-up Cartesian frame. On a y-down display grid the same rotation looks
//!   clockwise.
//! - Results are never rounded. Snapping to a display grid belongs to the
//!   presentation boundary (`Canvas::glyphs`).

use glam::{DMat3, DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// A position in the plane.
pub type Point = DVec2;

/// Reflection line (or point) through the reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal line: y flips.
    X,
    /// Vertical line: x flips.
    Y,
    /// Point reflection: both flip.
    Both,
}

impl Axis {
    /// Parse the user-facing names `"x"`, `"y"` and `"xy"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "xy" => Some(Axis::Both),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Both => "xy",
        }
    }

    fn matrix(&self) -> DMat3 {
        match self {
            Axis::X => DMat3::from_diagonal(DVec3::new(1.0, -1.0, 1.0)),
            Axis::Y => DMat3::from_diagonal(DVec3::new(-1.0, 1.0, 1.0)),
            Axis::Both => DMat3::from_diagonal(DVec3::new(-1.0, -1.0, 1.0)),
        }
    }
}

/// Coordinate transformation rules for one coordinate system.
///
/// Scene passes take any `Transformer`, so another coordinate system only
/// needs a new implementation of this trait.
pub trait Transformer {
    /// The pivot for rotate, mirror and scale.
    fn reference(&self) -> Point;

    /// Replace the pivot. No validation.
    fn set_reference(&mut self, x: f64, y: f64);

    /// Apply an arbitrary homogeneous matrix around the reference point.
    fn transform(&self, point: Point, matrix: &DMat3) -> Point;

    fn translate(&self, point: Point, dx: f64, dy: f64) -> Point;

    fn rotate(&self, point: Point, degrees: f64) -> Point;

    fn mirror(&self, point: Point, axis: Axis) -> Point;

    /// Independent x/y factors. Zero and negative factors are accepted.
    fn scale(&self, point: Point, fx: f64, fy: f64) -> Point;
}

/// Transformer for the rectangular coordinate system.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cartesian {
    reference: Point,
}

impl Cartesian {
    /// An engine pivoting around the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine pivoting around `reference`.
    pub fn with_reference(reference: Point) -> Self {
        Self { reference }
    }
}

impl Transformer for Cartesian {
    fn reference(&self) -> Point {
        self.reference
    }

    fn set_reference(&mut self, x: f64, y: f64) {
        self.reference = DVec2::new(x, y);
    }

    fn transform(&self, point: Point, matrix: &DMat3) -> Point {
        // The reference carries w = 0 so translation terms of the matrix
        // see the point's own w = 1 exactly once.
        let reference = self.reference.extend(0.0);
        let centered = point.extend(1.0) - reference;
        (*matrix * centered + reference).truncate()
    }

    fn translate(&self, point: Point, dx: f64, dy: f64) -> Point {
        self.transform(point, &DMat3::from_translation(DVec2::new(dx, dy)))
    }

    fn rotate(&self, point: Point, degrees: f64) -> Point {
        // from_angle is counterclockwise: [[c, -s], [s, c]]
        self.transform(point, &DMat3::from_angle(degrees.to_radians()))
    }

    fn mirror(&self, point: Point, axis: Axis) -> Point {
        self.transform(point, &axis.matrix())
    }

    fn scale(&self, point: Point, fx: f64, fy: f64) -> Point {
        self.transform(point, &DMat3::from_diagonal(DVec3::new(fx, fy, 1.0)))
    }
}
