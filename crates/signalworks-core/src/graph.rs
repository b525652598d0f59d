//! The signal graph: arena-backed nodes and ports with spatial lookup and
//! connection resolution.
//!
//! Nodes and ports live in `SlotMap` arenas; every cross-reference is a
//! stable key into an arena, never a raw pointer. Connections are symmetric
//! key pairs rebuilt by a resolution pass, so save/restore only persists
//! values and re-derives topology.
//!
//! Co-located nodes are allowed (a wire under a building), but placement
//! rejects any node whose ports would collide with a co-located node's
//! ports of the same offset and kind -- that is the one configuration that
//! would make resolution ambiguous.

use slotmap::{SecondaryMap, SlotMap};
use std::collections::BTreeMap;

use crate::grid::{Direction, GridOffset, GridPosition};
use crate::id::{NodeId, PortId};
use crate::node::{NodeData, NodeKind};
use crate::port::{LayoutError, Port, PortKind, PortLayout};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    #[error("port not found: {0:?}")]
    PortNotFound(PortId),
    /// A co-located node already exposes a port with this offset and kind.
    #[error("port conflict at {position:?}: {kind:?} port at offset {offset:?} already declared")]
    PortConflict {
        position: GridPosition,
        offset: GridOffset,
        kind: PortKind,
    },
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

// ---------------------------------------------------------------------------
// Interactive controls
// ---------------------------------------------------------------------------

/// A user-facing toggle for one directional Out port. The host UI surfaces
/// these as discrete commands; toggling enablement is the only legal
/// external mutation of routing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortCommand {
    pub port: PortId,
    pub direction: Direction,
    /// Current state, reported so the UI can render the toggle.
    pub enabled: bool,
}

impl PortCommand {
    /// Stable label for the command ("toggle north", ...).
    pub fn label(&self) -> String {
        format!("toggle {}", self.direction.label())
    }
}

// ---------------------------------------------------------------------------
// SignalGraph
// ---------------------------------------------------------------------------

/// The port/node graph. Owns all nodes and ports; a port's peer is a
/// non-owning key resolved through this arena.
#[derive(Debug, Default)]
pub struct SignalGraph {
    nodes: SlotMap<NodeId, NodeData>,
    ports: SlotMap<PortId, Port>,
    node_ports: SecondaryMap<NodeId, Vec<PortId>>,
    cells: BTreeMap<GridPosition, Vec<NodeId>>,
}

impl SignalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Placement --

    /// Place a node with its kind's default port layout.
    pub fn place(&mut self, kind: NodeKind, position: GridPosition) -> Result<NodeId, GraphError> {
        self.place_with_layout(kind, position, kind.default_layout())
    }

    /// Place a node with an explicit layout. Rejects layouts that would
    /// collide with a co-located node's ports.
    pub fn place_with_layout(
        &mut self,
        kind: NodeKind,
        position: GridPosition,
        layout: PortLayout,
    ) -> Result<NodeId, GraphError> {
        // Overlap check against nodes already in this cell.
        if let Some(residents) = self.cells.get(&position) {
            for &resident in residents {
                for &pid in self.node_ports.get(resident).map(Vec::as_slice).unwrap_or(&[]) {
                    let existing = &self.ports[pid];
                    for spec in layout.specs() {
                        if existing.offset == spec.offset && existing.kind == spec.kind {
                            return Err(GraphError::PortConflict {
                                position,
                                offset: spec.offset,
                                kind: spec.kind,
                            });
                        }
                    }
                }
            }
        }

        let node = self.nodes.insert(NodeData { kind, position });
        let mut port_ids = Vec::with_capacity(layout.specs().len());
        for spec in layout.specs() {
            port_ids.push(self.ports.insert(Port::new(node, *spec)));
        }
        self.node_ports.insert(node, port_ids);
        self.cells.entry(position).or_default().push(node);
        Ok(node)
    }

    /// Remove a node, unlinking every peer that pointed at it.
    /// Returns the position it occupied.
    pub fn remove(&mut self, node: NodeId) -> Result<GridPosition, GraphError> {
        let data = self.nodes.get(node).ok_or(GraphError::NodeNotFound(node))?;
        let position = data.position;

        self.disconnect_node(node)?;

        if let Some(port_ids) = self.node_ports.remove(node) {
            for pid in port_ids {
                self.ports.remove(pid);
            }
        }
        if let Some(residents) = self.cells.get_mut(&position) {
            residents.retain(|n| *n != node);
            if residents.is_empty() {
                self.cells.remove(&position);
            }
        }
        self.nodes.remove(node);
        Ok(position)
    }

    // -- Queries --

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(node).map(|n| n.kind)
    }

    pub fn position(&self, node: NodeId) -> Option<GridPosition> {
        self.nodes.get(node).map(|n| n.position)
    }

    /// Nodes occupying a cell, in placement order.
    pub fn nodes_at(&self, position: GridPosition) -> &[NodeId] {
        self.cells.get(&position).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A node's ports, in layout declaration order.
    pub fn ports(&self, node: NodeId) -> &[PortId] {
        self.node_ports.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn port(&self, port: PortId) -> Option<&Port> {
        self.ports.get(port)
    }

    /// Iterate all nodes.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.nodes.iter()
    }

    /// The first enabled In port of a node, the natural injection entry.
    pub fn entry_port(&self, node: NodeId) -> Option<PortId> {
        self.ports(node)
            .iter()
            .copied()
            .find(|&pid| {
                let p = &self.ports[pid];
                p.kind == PortKind::In && p.enabled
            })
    }

    // -- Enablement --

    /// Set a port's enabled flag. Returns whether the flag changed. Has no
    /// effect on signals already in flight.
    pub fn set_port_enabled(&mut self, port: PortId, enabled: bool) -> Result<bool, GraphError> {
        let p = self
            .ports
            .get_mut(port)
            .ok_or(GraphError::PortNotFound(port))?;
        let changed = p.enabled != enabled;
        p.enabled = enabled;
        Ok(changed)
    }

    /// Flip a port's enabled flag. Returns the new state.
    pub fn toggle_port(&mut self, port: PortId) -> Result<bool, GraphError> {
        let p = self
            .ports
            .get_mut(port)
            .ok_or(GraphError::PortNotFound(port))?;
        p.enabled = !p.enabled;
        Ok(p.enabled)
    }

    /// One toggle command per directional Out port, in layout order.
    /// Receivers and mediators expose none.
    pub fn port_commands(&self, node: NodeId) -> Vec<PortCommand> {
        self.ports(node)
            .iter()
            .filter_map(|&pid| {
                let p = &self.ports[pid];
                if p.kind != PortKind::Out {
                    return None;
                }
                Direction::from_offset(p.offset).map(|direction| PortCommand {
                    port: pid,
                    direction,
                    enabled: p.enabled,
                })
            })
            .collect()
    }

    // -- Connection resolution --

    /// Re-resolve every port in the graph. Idempotent: resolving twice with
    /// no topology change in between yields identical links. Ports with no
    /// compatible peer are left unlinked, never faulted.
    pub fn resolve_connections(&mut self) {
        let all_ports: Vec<PortId> = self.ports.keys().collect();
        for pid in all_ports {
            let desired = self.find_peer(pid);
            self.link(pid, desired);
        }
    }

    /// Re-resolve only one node's ports (and, symmetrically, whatever they
    /// used to point at). Resolution runs on topology events, not per tick.
    pub fn resolve_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(node) {
            return Err(GraphError::NodeNotFound(node));
        }
        let port_ids: Vec<PortId> = self.ports(node).to_vec();
        for pid in port_ids {
            let desired = self.find_peer(pid);
            self.link(pid, desired);
        }
        Ok(())
    }

    /// Unlink all of a node's ports, symmetrically. Safe to call on a node
    /// that was never resolved.
    pub fn disconnect_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(node) {
            return Err(GraphError::NodeNotFound(node));
        }
        let port_ids: Vec<PortId> = self.ports(node).to_vec();
        for pid in port_ids {
            self.link(pid, None);
        }
        Ok(())
    }

    /// The unique compatible peer for a port, if one exists: a port on a
    /// node occupying the target cell, exposing the reciprocal offset with
    /// the opposite kind. Placement invariants make the match unique.
    fn find_peer(&self, pid: PortId) -> Option<PortId> {
        let port = self.ports.get(pid)?;
        let owner = self.nodes.get(port.owner)?;
        let target = owner.position.offset_by(port.offset);
        let want_offset = port.offset.reciprocal();
        let want_kind = port.kind.opposite();

        for &candidate_node in self.nodes_at(target) {
            if candidate_node == port.owner {
                continue; // no self-loops
            }
            for &qid in self.node_ports.get(candidate_node).map(Vec::as_slice).unwrap_or(&[]) {
                let q = &self.ports[qid];
                if q.offset == want_offset && q.kind == want_kind {
                    return Some(qid);
                }
            }
        }
        None
    }

    /// Point `pid` at `peer` (or nothing), keeping the symmetry invariant:
    /// the old peer's back-reference is cleared, the new peer's is set.
    fn link(&mut self, pid: PortId, peer: Option<PortId>) {
        let old = match self.ports.get(pid) {
            Some(p) => p.peer,
            None => return,
        };
        if old == peer {
            return;
        }
        if let Some(old_pid) = old {
            if let Some(old_port) = self.ports.get_mut(old_pid) {
                old_port.peer = None;
            }
        }
        if let Some(new_pid) = peer {
            // Detach whatever the new peer pointed at before.
            if let Some(prev) = self.ports.get(new_pid).and_then(|q| q.peer) {
                if prev != pid {
                    if let Some(prev_port) = self.ports.get_mut(prev) {
                        prev_port.peer = None;
                    }
                }
            }
            if let Some(new_port) = self.ports.get_mut(new_pid) {
                new_port.peer = Some(pid);
            }
        }
        if let Some(p) = self.ports.get_mut(pid) {
            p.peer = peer;
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
