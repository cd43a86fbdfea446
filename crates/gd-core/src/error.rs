use petgraph::graph::NodeIndex;
use thiserror::Error;

/// Structural misuse of the scene arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The handle does not name a node in this arena.
    #[error("no node {0:?} in the scene")]
    MissingNode(NodeIndex),

    /// A group-only operation was called on an element.
    #[error("node {0:?} is not a group")]
    NotAGroup(NodeIndex),

    /// The child is the group itself or one of its ancestors.
    #[error("adding {child:?} to {group:?} would create a cycle")]
    Cycle { group: NodeIndex, child: NodeIndex },
}
