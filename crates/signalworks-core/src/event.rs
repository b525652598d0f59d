//! Typed events emitted by the signal network.
//!
//! Events are buffered in the [`EventBus`] as they occur and delivered in
//! batch when the host drains the bus. Event kinds can be suppressed, which
//! prevents any recording for that kind at zero cost. All events carry the
//! tick at which they occurred.

use std::collections::VecDeque;

use crate::fixed::Ticks;
use crate::grid::GridPosition;
use crate::id::{NodeId, PortId};

/// Maximum buffered events before the oldest are discarded. A host that
/// never drains must not grow the buffer without bound.
const MAX_BUFFERED: usize = 4096;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A signal network event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalEvent {
    // -- Propagation --
    SignalInjected {
        node: NodeId,
        port: PortId,
        tick: Ticks,
    },
    SignalDelivered {
        node: NodeId,
        port: PortId,
        tick: Ticks,
    },
    /// A forwarding node had nowhere to send, or the entry port was
    /// disabled; the signal dropped there.
    SignalDropped {
        node: NodeId,
        tick: Ticks,
    },
    /// The hop ceiling stopped a pass -- cyclic or runaway wiring.
    PropagationTruncated {
        node: NodeId,
        max_hops: u32,
        tick: Ticks,
    },

    // -- Topology --
    NodePlaced {
        node: NodeId,
        position: GridPosition,
        tick: Ticks,
    },
    NodeRemoved {
        node: NodeId,
        position: GridPosition,
        tick: Ticks,
    },
    PortToggled {
        node: NodeId,
        port: PortId,
        enabled: bool,
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalEventKind {
    SignalInjected,
    SignalDelivered,
    SignalDropped,
    PropagationTruncated,
    NodePlaced,
    NodeRemoved,
    PortToggled,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 7;

impl SignalEvent {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> SignalEventKind {
        match self {
            SignalEvent::SignalInjected { .. } => SignalEventKind::SignalInjected,
            SignalEvent::SignalDelivered { .. } => SignalEventKind::SignalDelivered,
            SignalEvent::SignalDropped { .. } => SignalEventKind::SignalDropped,
            SignalEvent::PropagationTruncated { .. } => SignalEventKind::PropagationTruncated,
            SignalEvent::NodePlaced { .. } => SignalEventKind::NodePlaced,
            SignalEvent::NodeRemoved { .. } => SignalEventKind::NodeRemoved,
            SignalEvent::PortToggled { .. } => SignalEventKind::PortToggled,
        }
    }
}

impl SignalEventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Buffered event delivery with per-kind suppression.
#[derive(Debug, Default)]
pub struct EventBus {
    buffer: VecDeque<SignalEvent>,
    suppressed: [bool; EVENT_KIND_COUNT],
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event unless its kind is suppressed. Discards the oldest
    /// buffered event when full.
    pub fn emit(&mut self, event: SignalEvent) {
        if self.suppressed[event.kind().index()] {
            return;
        }
        if self.buffer.len() == MAX_BUFFERED {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    /// Suppress an event kind. Suppressed kinds cost nothing to emit.
    pub fn suppress(&mut self, kind: SignalEventKind) {
        self.suppressed[kind.index()] = true;
    }

    /// Re-enable a suppressed event kind.
    pub fn unsuppress(&mut self, kind: SignalEventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: SignalEventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Read buffered events without consuming them.
    pub fn peek(&self) -> impl Iterator<Item = &SignalEvent> {
        self.buffer.iter()
    }

    /// Take all buffered events, oldest first.
    pub fn drain(&mut self) -> Vec<SignalEvent> {
        self.buffer.drain(..).collect()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
