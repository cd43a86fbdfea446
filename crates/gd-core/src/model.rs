//! Composite scene model stored in an arena.
//!
//! Every `SceneNode` lives in one `StableDiGraph`; a `NodeIndex` is the
//! handle used everywhere else. A node is either an `Element` (a point with
//! display attributes) or a `Group` (an anchor point plus an ordered child
//! list). Membership edges run group → child, one edge per distinct pair,
//! and mirror the child lists so ancestry queries and cycle checks are graph
//! walks. Child order and duplicates live only in the group's own list.
//!
//! `remove` detaches; it never frees the arena slot. Snapshots taken by
//! `Canvas::create_memento` can therefore always refer back to a node.

use crate::error::SceneError;
use crate::geometry::Point;
use glam::DVec2;
use petgraph::Direction;
use petgraph::algo::has_path_connecting;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Symbol a group anchor is displayed with.
pub const GROUP_SYMBOL: &str = "+";

// ─── Attributes ──────────────────────────────────────────────────────────

/// One settable display attribute of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Name,
    Symbol,
    SymbolColor,
    Background,
}

impl Attribute {
    /// Parse the user-facing names: `name`, `symbol`, `symbol color`, `background`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Attribute::Name),
            "symbol" => Some(Attribute::Symbol),
            "symbol color" => Some(Attribute::SymbolColor),
            "background" => Some(Attribute::Background),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Symbol => "symbol",
            Attribute::SymbolColor => "symbol color",
            Attribute::Background => "background",
        }
    }
}

/// Display attributes of an element. Colors are presenter-defined names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub name: String,
    pub symbol: String,
    pub symbol_color: String,
    pub background_color: String,
}

impl Attributes {
    pub fn get(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Name => &self.name,
            Attribute::Symbol => &self.symbol,
            Attribute::SymbolColor => &self.symbol_color,
            Attribute::Background => &self.background_color,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: &str) {
        let slot = match attribute {
            Attribute::Name => &mut self.name,
            Attribute::Symbol => &mut self.symbol,
            Attribute::SymbolColor => &mut self.symbol_color,
            Attribute::Background => &mut self.background_color,
        };
        value.clone_into(slot);
    }
}

// ─── Scene nodes ─────────────────────────────────────────────────────────

/// The two variants of the composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Leaf: a single point with display attributes.
    Element(Attributes),

    /// Composite: ordered members, transformed together with the anchor.
    /// The same member may appear more than once after `union`.
    Group { children: Vec<NodeIndex> },
}

/// A single node in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Element position, or the group's own anchor.
    pub position: Point,
    pub kind: NodeKind,
}

impl SceneNode {
    /// An element at (x, y) with empty attributes.
    pub fn element(x: f64, y: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
            kind: NodeKind::Element(Attributes::default()),
        }
    }

    /// An empty group anchored at the origin.
    pub fn group() -> Self {
        Self {
            position: DVec2::ZERO,
            kind: NodeKind::Group {
                children: Vec::new(),
            },
        }
    }

    /// Move the anchor/position. Builder form for construction.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = DVec2::new(x, y);
        self
    }

    /// Set one attribute. Groups have no attributes of their own, so this is
    /// a no-op on a group; use `Scene::fill` to broadcast to members.
    pub fn with(mut self, attribute: Attribute, value: &str) -> Self {
        if let NodeKind::Element(attrs) = &mut self.kind {
            attrs.set(attribute, value);
        }
        self
    }

    pub fn with_name(self, name: &str) -> Self {
        self.with(Attribute::Name, name)
    }

    pub fn with_symbol(self, symbol: &str) -> Self {
        self.with(Attribute::Symbol, symbol)
    }

    pub fn with_symbol_color(self, color: &str) -> Self {
        self.with(Attribute::SymbolColor, color)
    }

    pub fn with_background_color(self, color: &str) -> Self {
        self.with(Attribute::Background, color)
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    /// Element attributes; `None` for a group.
    pub fn attributes(&self) -> Option<&Attributes> {
        match &self.kind {
            NodeKind::Element(attrs) => Some(attrs),
            NodeKind::Group { .. } => None,
        }
    }

    /// What the presenter draws at this node's position.
    pub fn symbol(&self) -> &str {
        match &self.kind {
            NodeKind::Element(attrs) => &attrs.symbol,
            NodeKind::Group { .. } => GROUP_SYMBOL,
        }
    }

    /// Members of a group; empty for an element.
    pub fn children(&self) -> &[NodeIndex] {
        match &self.kind {
            NodeKind::Group { children } => children,
            NodeKind::Element(_) => &[],
        }
    }
}

/// Three-way partition produced by `Scene::split`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    /// Members of the first group that the second does not contain.
    pub only_first: Vec<NodeIndex>,
    /// Members of the first group that the second also contains.
    pub both: Vec<NodeIndex>,
    /// Members of the second group that the first does not contain.
    pub only_second: Vec<NodeIndex>,
}

// ─── Scene arena ─────────────────────────────────────────────────────────

/// Arena holding every node on the surface, palette and selection alike.
///
/// Precondition for `add`: a node should be detached (have no group) before
/// it is added, so that it belongs to exactly one group. This is not
/// enforced; only cycles are rejected.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// The underlying arena. Edges are group → member.
    pub graph: StableDiGraph<SceneNode, ()>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a detached node and return its handle.
    pub fn insert(&mut self, node: SceneNode) -> NodeIndex {
        self.graph.add_node(node)
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&SceneNode> {
        self.graph.node_weight(idx)
    }

    pub fn get_mut(&mut self, idx: NodeIndex) -> Option<&mut SceneNode> {
        self.graph.node_weight_mut(idx)
    }

    /// Look up a node, failing with `MissingNode`.
    pub fn node(&self, idx: NodeIndex) -> Result<&SceneNode, SceneError> {
        self.get(idx).ok_or(SceneError::MissingNode(idx))
    }

    pub fn position(&self, idx: NodeIndex) -> Option<Point> {
        self.get(idx).map(|n| n.position)
    }

    /// Place a node (or a group's anchor) without transforming members.
    pub fn set_position(&mut self, idx: NodeIndex, x: f64, y: f64) -> Result<(), SceneError> {
        let node = self.get_mut(idx).ok_or(SceneError::MissingNode(idx))?;
        node.position = DVec2::new(x, y);
        Ok(())
    }

    /// Members of a group in order. Empty for elements and unknown handles.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.get(idx).map(SceneNode::children).unwrap_or(&[])
    }

    pub fn is_group(&self, idx: NodeIndex) -> bool {
        self.get(idx).is_some_and(SceneNode::is_group)
    }

    /// Groups that currently list `idx` as a member.
    pub fn parents(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect()
    }

    /// True when no group lists this node.
    pub fn is_detached(&self, idx: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .is_none()
    }

    /// Append `child` to `group`.
    pub fn add(&mut self, group: NodeIndex, child: NodeIndex) -> Result<(), SceneError> {
        self.group_children(group)?;
        self.node(child)?;
        self.check_cycle(group, child)?;
        if !self.is_detached(child) {
            log::debug!("{child:?} added to {group:?} while still a member elsewhere");
        }
        self.group_children_mut(group)?.push(child);
        self.graph.update_edge(group, child, ());
        Ok(())
    }

    /// Remove the first occurrence of `child`. Returns false (and changes
    /// nothing) when `child` is not a member.
    pub fn remove(&mut self, group: NodeIndex, child: NodeIndex) -> Result<bool, SceneError> {
        let children = self.group_children_mut(group)?;
        let Some(pos) = children.iter().position(|&c| c == child) else {
            return Ok(false);
        };
        children.remove(pos);
        self.sync_edges(group);
        Ok(true)
    }

    /// Empty a group, returning the former members.
    pub fn clear(&mut self, group: NodeIndex) -> Result<Vec<NodeIndex>, SceneError> {
        let removed = std::mem::take(self.group_children_mut(group)?);
        self.sync_edges(group);
        Ok(removed)
    }

    /// Append every member of `other` to `group`.
    ///
    /// This is a multiset append: members already in `group` end up listed
    /// twice. Returns the resulting member list.
    pub fn union(&mut self, group: NodeIndex, other: NodeIndex) -> Result<&[NodeIndex], SceneError> {
        let incoming = self.group_children(other)?.clone();
        self.group_children(group)?;
        for &child in &incoming {
            self.check_cycle(group, child)?;
        }
        self.group_children_mut(group)?.extend(incoming);
        self.sync_edges(group);
        Ok(self.children(group))
    }

    /// Drop every member of `group` that `other` also lists (by identity),
    /// keeping the order of the rest. Returns the resulting member list.
    pub fn difference(
        &mut self,
        group: NodeIndex,
        other: NodeIndex,
    ) -> Result<&[NodeIndex], SceneError> {
        let excluded = self.group_children(other)?.clone();
        self.group_children_mut(group)?
            .retain(|child| !excluded.contains(child));
        self.sync_edges(group);
        Ok(self.children(group))
    }

    /// Partition the members of two groups without mutating either.
    pub fn split(&self, first: NodeIndex, second: NodeIndex) -> Result<Split, SceneError> {
        let a = self.group_children(first)?;
        let b = self.group_children(second)?;

        let mut split = Split::default();
        for &child in a {
            if b.contains(&child) {
                split.both.push(child);
            } else {
                split.only_first.push(child);
            }
        }
        split.only_second = b.iter().copied().filter(|c| !a.contains(c)).collect();
        Ok(split)
    }

    /// Members of `group` whose position rounds to the grid cell (x, y).
    pub fn nodes_at(&self, group: NodeIndex, x: i64, y: i64) -> Vec<NodeIndex> {
        self.children(group)
            .iter()
            .copied()
            .filter(|&idx| {
                self.position(idx)
                    .is_some_and(|p| p.x.round() as i64 == x && p.y.round() as i64 == y)
            })
            .collect()
    }

    /// Clone a node into a fresh, detached arena entry. Groups are copied
    /// with fresh copies of their whole subtree, so the copy shares nothing
    /// with the original.
    pub fn deep_copy(&mut self, idx: NodeIndex) -> Result<NodeIndex, SceneError> {
        let mut memo = HashMap::new();
        self.deep_copy_inner(idx, &mut memo)
    }

    fn deep_copy_inner(
        &mut self,
        idx: NodeIndex,
        memo: &mut HashMap<NodeIndex, NodeIndex>,
    ) -> Result<NodeIndex, SceneError> {
        // A member listed twice stays one shared node in the copy.
        if let Some(&copied) = memo.get(&idx) {
            return Ok(copied);
        }
        let original = self.node(idx)?.clone();
        let kind = match original.kind {
            NodeKind::Element(attrs) => NodeKind::Element(attrs),
            NodeKind::Group { children } => {
                let mut copied = Vec::with_capacity(children.len());
                for child in children {
                    copied.push(self.deep_copy_inner(child, memo)?);
                }
                NodeKind::Group { children: copied }
            }
        };
        let new_idx = self.insert(SceneNode {
            position: original.position,
            kind,
        });
        self.sync_edges(new_idx);
        memo.insert(idx, new_idx);
        Ok(new_idx)
    }

    /// Rebuild the membership edges of `group` from its child list.
    pub(crate) fn sync_edges(&mut self, group: NodeIndex) {
        let stale: Vec<_> = self
            .graph
            .edges_directed(group, Direction::Outgoing)
            .map(|e| e.id())
            .collect();
        for edge in stale {
            self.graph.remove_edge(edge);
        }
        let children = self.children(group).to_vec();
        for child in children {
            if self.graph.contains_node(child) {
                self.graph.update_edge(group, child, ());
            }
        }
    }

    fn check_cycle(&self, group: NodeIndex, child: NodeIndex) -> Result<(), SceneError> {
        if child == group || has_path_connecting(&self.graph, child, group, None) {
            return Err(SceneError::Cycle { group, child });
        }
        Ok(())
    }

    fn group_children(&self, group: NodeIndex) -> Result<&Vec<NodeIndex>, SceneError> {
        match self.get(group) {
            None => Err(SceneError::MissingNode(group)),
            Some(SceneNode {
                kind: NodeKind::Group { children },
                ..
            }) => Ok(children),
            Some(_) => Err(SceneError::NotAGroup(group)),
        }
    }

    fn group_children_mut(&mut self, group: NodeIndex) -> Result<&mut Vec<NodeIndex>, SceneError> {
        match self.graph.node_weight_mut(group) {
            None => Err(SceneError::MissingNode(group)),
            Some(SceneNode {
                kind: NodeKind::Group { children },
                ..
            }) => Ok(children),
            Some(_) => Err(SceneError::NotAGroup(group)),
        }
    }
}
