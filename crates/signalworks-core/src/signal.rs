//! The signal value type routed through the graph.

use serde::{Deserialize, Serialize};

use crate::fixed::Fixed64;
use crate::id::NodeId;

/// The payload carried by a signal: a plain boolean pulse or a typed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalPayload {
    /// A boolean pulse (on/off).
    Bool(bool),
    /// A typed level; reads as `true` when non-zero.
    Level(Fixed64),
}

/// An immutable value propagated through the node graph. Every node along
/// the path reads it; none mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub payload: SignalPayload,
    /// The node that originated this signal, when known. Diagnostic only;
    /// routing never consults it.
    pub origin: Option<NodeId>,
}

impl Signal {
    /// A boolean pulse with no recorded origin.
    pub fn pulse(on: bool) -> Self {
        Self {
            payload: SignalPayload::Bool(on),
            origin: None,
        }
    }

    /// A typed level with no recorded origin.
    pub fn level(value: Fixed64) -> Self {
        Self {
            payload: SignalPayload::Level(value),
            origin: None,
        }
    }

    /// Tag the signal with its originating node.
    pub fn from_node(mut self, node: NodeId) -> Self {
        self.origin = Some(node);
        self
    }

    /// The boolean reading of the payload.
    pub fn as_bool(&self) -> bool {
        match self.payload {
            SignalPayload::Bool(b) => b,
            SignalPayload::Level(v) => v != Fixed64::from_num(0),
        }
    }
}
