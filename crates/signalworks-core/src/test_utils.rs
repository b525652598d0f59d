//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::graph::SignalGraph;
use crate::grid::{Direction, GridPosition};
use crate::id::NodeId;
use crate::network::SignalNetwork;
use crate::node::NodeKind;
use crate::propagate::PropagationOutcome;
use crate::signal::Signal;

/// A true boolean pulse.
pub fn pulse() -> Signal {
    Signal::pulse(true)
}

/// Place a horizontal run of transmitters starting at `start`, `len` cells
/// east. Connections are resolved as each node lands.
pub fn wire_line(net: &mut SignalNetwork, start: GridPosition, len: u32) -> Vec<NodeId> {
    let mut nodes = Vec::with_capacity(len as usize);
    for i in 0..len as i32 {
        let cell = GridPosition::new(start.x + i, start.y);
        nodes.push(
            net.place(NodeKind::Transmitter, cell)
                .expect("test grid cells are free"),
        );
    }
    nodes
}

/// Stack a receiver on top of an existing wire cell.
pub fn receiver_on(net: &mut SignalNetwork, cell: GridPosition) -> NodeId {
    net.place(NodeKind::Receiver, cell)
        .expect("receiver stacks on a wire")
}

/// Stack a mediator on top of an existing wire cell.
pub fn mediator_on(net: &mut SignalNetwork, cell: GridPosition) -> NodeId {
    net.place(NodeKind::Mediator, cell)
        .expect("mediator stacks on a wire")
}

/// A splitter with a wire-and-receiver neighbor in each given direction.
/// Returns the splitter and the receivers in direction order.
pub fn splitter_with_neighbors(
    net: &mut SignalNetwork,
    at: GridPosition,
    dirs: &[Direction],
) -> (NodeId, Vec<NodeId>) {
    let splitter = net
        .place(NodeKind::Splitter, at)
        .expect("splitter cell is free");
    let mut receivers = Vec::new();
    for dir in dirs {
        let cell = at.offset_by(dir.offset());
        net.place(NodeKind::Transmitter, cell)
            .expect("neighbor cell is free");
        receivers.push(receiver_on(net, cell));
    }
    (splitter, receivers)
}

/// The distinct nodes an outcome delivered to, in arrival order.
pub fn delivered_nodes(outcome: &PropagationOutcome) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    for d in &outcome.deliveries {
        if !nodes.contains(&d.node) {
            nodes.push(d.node);
        }
    }
    nodes
}

/// Count of enabled Out ports on a node.
pub fn enabled_out_count(graph: &SignalGraph, node: NodeId) -> usize {
    graph
        .ports(node)
        .iter()
        .filter(|&&pid| {
            let p = graph.port(pid).expect("port list in sync");
            p.kind == crate::port::PortKind::Out && p.enabled
        })
        .count()
}
