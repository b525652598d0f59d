//! The lifecycle orchestrator: placement, activation, injection, events.
//!
//! [`SignalNetwork`] wraps a [`SignalGraph`] with the host-facing contract:
//! activation hooks that (re)resolve connections, deactivation that unlinks
//! safely, injection that runs one synchronous propagation pass, and an
//! [`EventBus`] recording what happened. Connection resolution is
//! event-driven -- it runs on topology changes and activation, never on a
//! per-tick schedule.

use crate::event::{EventBus, SignalEvent};
use crate::fixed::Ticks;
use crate::graph::{GraphError, SignalGraph};
use crate::grid::GridPosition;
use crate::id::{NodeId, PortId};
use crate::node::NodeKind;
use crate::propagate::{self, PropagationLimits, PropagationOutcome};
use crate::save::{self, LoadError, SaveError};
use crate::signal::Signal;

/// A signal network: the graph plus lifecycle, limits, and events.
#[derive(Debug, Default)]
pub struct SignalNetwork {
    graph: SignalGraph,
    bus: EventBus,
    limits: PropagationLimits,
    tick: Ticks,
}

impl SignalNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: PropagationLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    // -- Accessors --

    pub fn graph(&self) -> &SignalGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SignalGraph {
        &mut self.graph
    }

    pub fn events(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn limits(&self) -> PropagationLimits {
        self.limits
    }

    pub fn tick(&self) -> Ticks {
        self.tick
    }

    /// Advance the network clock. The host calls this once per update pass;
    /// events carry the current value.
    pub fn set_tick(&mut self, tick: Ticks) {
        self.tick = tick;
    }

    // -- Topology --

    /// Place a node with its default layout and resolve its connections.
    pub fn place(&mut self, kind: NodeKind, position: GridPosition) -> Result<NodeId, GraphError> {
        let node = self.graph.place(kind, position)?;
        self.graph.resolve_node(node)?;
        self.bus.emit(SignalEvent::NodePlaced {
            node,
            position,
            tick: self.tick,
        });
        Ok(node)
    }

    /// Remove a node; neighbors are unlinked symmetrically.
    pub fn remove(&mut self, node: NodeId) -> Result<(), GraphError> {
        let position = self.graph.remove(node)?;
        self.bus.emit(SignalEvent::NodeRemoved {
            node,
            position,
            tick: self.tick,
        });
        Ok(())
    }

    /// Toggle a port's enabled flag, reporting the new state.
    pub fn toggle_port(&mut self, port: PortId) -> Result<bool, GraphError> {
        let enabled = self.graph.toggle_port(port)?;
        let node = self
            .graph
            .port(port)
            .map(|p| p.owner)
            .ok_or(GraphError::PortNotFound(port))?;
        self.bus.emit(SignalEvent::PortToggled {
            node,
            port,
            enabled,
            tick: self.tick,
        });
        Ok(enabled)
    }

    // -- Lifecycle hooks --

    /// Called once when a node becomes live, whether freshly placed or
    /// restored from persisted state. Re-resolves the node's connections;
    /// idempotent when nothing changed.
    pub fn activate_node(&mut self, node: NodeId, _restoring: bool) -> Result<(), GraphError> {
        self.graph.resolve_node(node)
    }

    /// Called once when a node is removed from play. Unlinks its ports;
    /// safe on a node that never resolved.
    pub fn deactivate_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.graph.disconnect_node(node)
    }

    // -- Injection --

    /// Inject a signal at a specific port and run one propagation pass.
    /// The pass completes synchronously before this returns.
    pub fn inject(&mut self, entry: PortId, signal: Signal) -> PropagationOutcome {
        let entry_node = self.graph.port(entry).map(|p| p.owner);
        let outcome = propagate::propagate(&self.graph, entry, &signal, self.limits);

        if let Some(node) = entry_node {
            self.bus.emit(SignalEvent::SignalInjected {
                node,
                port: entry,
                tick: self.tick,
            });
            if outcome.truncated {
                self.bus.emit(SignalEvent::PropagationTruncated {
                    node,
                    max_hops: self.limits.max_hops,
                    tick: self.tick,
                });
            }
            if outcome.deliveries.is_empty() && outcome.dropped > 0 {
                self.bus.emit(SignalEvent::SignalDropped {
                    node,
                    tick: self.tick,
                });
            }
        }
        for delivery in &outcome.deliveries {
            self.bus.emit(SignalEvent::SignalDelivered {
                node: delivery.node,
                port: delivery.port,
                tick: self.tick,
            });
        }
        outcome
    }

    /// Inject at a node's first enabled In port. Returns `None` when the
    /// node has no such port (every entry disabled or the node is gone).
    pub fn inject_at(&mut self, node: NodeId, signal: Signal) -> Option<PropagationOutcome> {
        let entry = self.graph.entry_port(node)?;
        Some(self.inject(entry, signal))
    }

    // -- Snapshots --

    /// Serialize the graph into a binary snapshot.
    pub fn snapshot(&self) -> Result<Vec<u8>, SaveError> {
        save::encode(&self.graph, self.tick)
    }

    /// Restore a network from a snapshot, keeping the given limits.
    /// Connection resolution has already run when this returns.
    pub fn restore(data: &[u8], limits: PropagationLimits) -> Result<Self, LoadError> {
        let (graph, tick) = save::restore(data)?;
        Ok(Self {
            graph,
            bus: EventBus::new(),
            limits,
            tick,
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================
