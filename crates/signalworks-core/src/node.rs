//! Node kinds and their routing roles.
//!
//! Node behavior is a closed set of tagged variants dispatched by the
//! propagation engine, not an open trait hierarchy. A kind answers two
//! questions: does receipt deliver locally, and does receipt forward to
//! the node's other Out ports.

use serde::{Deserialize, Serialize};

use crate::grid::GridPosition;
use crate::port::PortLayout;

/// The closed set of node behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Terminal sink: accepts signals, takes no local action.
    Receiver,
    /// Terminal sink that additionally fans out to registered adapter
    /// bindings, in registration order.
    Mediator,
    /// Forwards received signals to every other enabled Out port.
    Transmitter,
    /// A transmitter whose directional Out ports are individually
    /// toggleable, realizing selective routing.
    Splitter,
}

impl NodeKind {
    /// Whether receipt counts as a terminal delivery on this node.
    pub fn delivers_locally(&self) -> bool {
        matches!(self, NodeKind::Receiver | NodeKind::Mediator)
    }

    /// Whether receipt forwards through the node's other Out ports.
    pub fn forwards(&self) -> bool {
        matches!(self, NodeKind::Transmitter | NodeKind::Splitter)
    }

    /// The initial port layout for this kind. Called once at placement,
    /// before any connection resolution.
    pub fn default_layout(&self) -> PortLayout {
        match self {
            NodeKind::Receiver | NodeKind::Mediator => PortLayout::single_input(),
            NodeKind::Transmitter | NodeKind::Splitter => PortLayout::wire(),
        }
    }
}

/// Per-node data stored in the signal graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    pub kind: NodeKind,
    pub position: GridPosition,
}
