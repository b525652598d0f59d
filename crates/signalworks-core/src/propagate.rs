//! Breadth-first signal propagation over the port graph.
//!
//! Propagation is an explicit work queue, not a recursive call chain: each
//! queue entry is an arrival port plus its hop count. A visited-port set
//! refuses to re-enqueue a port within one pass, and a hop ceiling converts
//! runaway topologies into a reported `truncated` outcome. The full pass
//! completes synchronously before the call returns.

use std::collections::{BTreeSet, VecDeque};

use crate::graph::SignalGraph;
use crate::id::{NodeId, PortId};
use crate::port::PortKind;
use crate::signal::Signal;

/// Hop ceiling applied when the caller does not override it. Generously
/// above any sane colony wire run; a pass that hits it is misconfigured.
pub const DEFAULT_MAX_HOPS: u32 = 512;

/// Bounds applied to a single propagation pass.
#[derive(Debug, Clone, Copy)]
pub struct PropagationLimits {
    /// Maximum hops from the entry port before the pass truncates.
    pub max_hops: u32,
}

impl Default for PropagationLimits {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}

/// One terminal delivery: a receiver or mediator accepted the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub node: NodeId,
    /// The port the signal arrived on.
    pub port: PortId,
}

/// The result of one propagation pass.
#[derive(Debug, Clone, Default)]
pub struct PropagationOutcome {
    /// Terminal deliveries, in arrival order.
    pub deliveries: Vec<Delivery>,
    /// Count of port-to-port sends performed.
    pub forwarded: usize,
    /// Count of forwarding nodes that had no enabled, connected Out port
    /// to continue through (stub state; the signal dropped there).
    pub dropped: usize,
    /// True when the hop ceiling stopped the pass before exhaustion.
    /// Cyclic wiring and runaway chains surface here instead of crashing.
    pub truncated: bool,
}

/// Run one propagation pass from an entry port.
///
/// The entry port must be enabled; a disabled entry drops the signal and
/// yields an empty outcome with `dropped = 1`. The signal itself is
/// immutable and shared by every delivery.
pub fn propagate(
    graph: &SignalGraph,
    entry: PortId,
    _signal: &Signal,
    limits: PropagationLimits,
) -> PropagationOutcome {
    let mut outcome = PropagationOutcome::default();

    let Some(entry_port) = graph.port(entry) else {
        outcome.dropped = 1;
        return outcome;
    };
    if !entry_port.enabled {
        outcome.dropped = 1;
        return outcome;
    }

    let mut visited: BTreeSet<PortId> = BTreeSet::new();
    let mut queue: VecDeque<(PortId, u32)> = VecDeque::new();
    visited.insert(entry);
    queue.push_back((entry, 0));

    while let Some((pid, hops)) = queue.pop_front() {
        let Some(port) = graph.port(pid) else { continue };
        let Some(kind) = graph.kind(port.owner) else {
            continue;
        };

        if kind.delivers_locally() {
            outcome.deliveries.push(Delivery {
                node: port.owner,
                port: pid,
            });
        }

        if !kind.forwards() {
            continue;
        }

        let mut sent_any = false;
        let mut ceiling_hit = false;
        for &out_id in graph.ports(port.owner) {
            if out_id == pid {
                continue; // never back through the arrival port
            }
            let out = match graph.port(out_id) {
                Some(p) => p,
                None => continue,
            };
            if out.kind != PortKind::Out || !out.enabled {
                continue;
            }
            let Some(peer_id) = out.peer else { continue };
            let Some(peer) = graph.port(peer_id) else {
                continue;
            };
            if !peer.enabled {
                continue; // disabled ports do not propagate, either side
            }
            if visited.contains(&peer_id) {
                continue; // refuse re-enqueueing within one pass
            }
            if hops + 1 > limits.max_hops {
                outcome.truncated = true;
                ceiling_hit = true;
                continue;
            }
            visited.insert(peer_id);
            queue.push_back((peer_id, hops + 1));
            outcome.forwarded += 1;
            sent_any = true;
        }

        if !sent_any && !ceiling_hit {
            outcome.dropped += 1;
        }
    }

    outcome
}

// ===========================================================================
// Tests
// ===========================================================================
