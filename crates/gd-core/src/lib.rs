pub mod canvas;
pub mod error;
pub mod geometry;
pub mod history;
pub mod model;
pub mod transform;

pub use canvas::{Canvas, Glyph};
pub use error::SceneError;
pub use geometry::{Axis, Cartesian, Point, Transformer};
pub use history::{History, Memento};
pub use model::*;
pub use transform::PositionChanged;

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
