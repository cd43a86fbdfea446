//! Position-change notification bus.
//!
//! Scene passes return the positions they wrote; the bus fans them out to
//! subscribers. A subscriber either listens to everything or to a fixed set
//! of nodes. Subscribers run in the order they were attached, and one
//! subscriber failing never stops the rest from hearing about the change.

use gd_core::{NodeIndex, PositionChanged};
use smallvec::SmallVec;
use thiserror::Error;

/// A subscriber reported that it could not handle an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("observer failed: {0}")]
pub struct ObserverError(pub String);

/// Receives position changes.
pub trait Observer {
    fn update(&mut self, event: &PositionChanged) -> Result<(), ObserverError>;
}

impl<F> Observer for F
where
    F: FnMut(&PositionChanged) -> Result<(), ObserverError>,
{
    fn update(&mut self, event: &PositionChanged) -> Result<(), ObserverError> {
        self(event)
    }
}

/// Handle returned by `attach`, used to `detach` later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// Empty = every node.
    nodes: SmallVec<[NodeIndex; 2]>,
    observer: Box<dyn Observer>,
}

impl Subscription {
    fn wants(&self, node: NodeIndex) -> bool {
        self.nodes.is_empty() || self.nodes.contains(&node)
    }
}

#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to changes of one node.
    pub fn attach(&mut self, node: NodeIndex, observer: impl Observer + 'static) -> SubscriptionId {
        self.subscribe(SmallVec::from_elem(node, 1), Box::new(observer))
    }

    /// Subscribe to changes of any of `nodes`.
    pub fn attach_many(
        &mut self,
        nodes: impl IntoIterator<Item = NodeIndex>,
        observer: impl Observer + 'static,
    ) -> SubscriptionId {
        let nodes: SmallVec<[NodeIndex; 2]> = nodes.into_iter().collect();
        if nodes.is_empty() {
            log::debug!("attach_many with no nodes listens to nothing");
        }
        self.subscribe(nodes, Box::new(observer))
    }

    /// Subscribe to changes of every node.
    pub fn attach_all(&mut self, observer: impl Observer + 'static) -> SubscriptionId {
        self.subscribe(SmallVec::new(), Box::new(observer))
    }

    /// Drop a subscription. False when the handle is unknown (already
    /// detached).
    pub fn detach(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        before != self.subscriptions.len()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Deliver events in order. For each event, interested subscribers run
    /// in attach order. Returns how many deliveries failed.
    pub fn publish(&mut self, events: &[PositionChanged]) -> usize {
        let mut failures = 0;
        for event in events {
            for sub in self.subscriptions.iter_mut().filter(|s| s.wants(event.node)) {
                if let Err(err) = sub.observer.update(event) {
                    log::warn!("{:?} on {:?}: {err}", sub.id, event.node);
                    failures += 1;
                }
            }
        }
        failures
    }

    fn subscribe(
        &mut self,
        nodes: SmallVec<[NodeIndex; 2]>,
        observer: Box<dyn Observer>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            nodes,
            observer,
        });
        id
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
