//! Property tests for topology resolution, persistence, and propagation.

use proptest::prelude::*;

use signalworks_core::graph::SignalGraph;
use signalworks_core::grid::GridPosition;
use signalworks_core::node::NodeKind;
use signalworks_core::port::PortKind;
use signalworks_core::propagate::{PropagationLimits, propagate};
use signalworks_core::save;
use signalworks_core::signal::Signal;

fn arb_kind() -> impl Strategy<Value = NodeKind> {
    prop_oneof![
        Just(NodeKind::Receiver),
        Just(NodeKind::Mediator),
        Just(NodeKind::Transmitter),
        Just(NodeKind::Splitter),
    ]
}

/// Random placements on a small board. Conflicting placements are skipped,
/// mirroring how a host rejects them.
fn build_graph(placements: &[(NodeKind, i32, i32)]) -> SignalGraph {
    let mut graph = SignalGraph::new();
    for &(kind, x, y) in placements {
        let _ = graph.place(kind, GridPosition::new(x, y));
    }
    graph.resolve_connections();
    graph
}

fn peer_pairs(graph: &SignalGraph) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    let ids: Vec<_> = graph
        .iter_nodes()
        .flat_map(|(node, _)| graph.ports(node).iter().copied())
        .collect();
    for (i, &pid) in ids.iter().enumerate() {
        if let Some(peer) = graph.port(pid).unwrap().peer {
            let j = ids.iter().position(|&q| q == peer).unwrap();
            pairs.push((i, j));
        }
    }
    pairs
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Resolution is symmetric: every link is mirrored by its peer.
    #[test]
    fn resolution_is_symmetric(
        placements in prop::collection::vec((arb_kind(), 0i32..6, 0i32..6), 1..20)
    ) {
        let graph = build_graph(&placements);
        for (node, _) in graph.iter_nodes() {
            for &pid in graph.ports(node) {
                if let Some(peer) = graph.port(pid).unwrap().peer {
                    let back = graph.port(peer).unwrap().peer;
                    prop_assert_eq!(back, Some(pid));
                }
            }
        }
    }

    /// Resolving twice without topology changes yields identical links.
    #[test]
    fn resolution_is_idempotent(
        placements in prop::collection::vec((arb_kind(), 0i32..6, 0i32..6), 1..20)
    ) {
        let mut graph = build_graph(&placements);
        let before = peer_pairs(&graph);
        graph.resolve_connections();
        prop_assert_eq!(before, peer_pairs(&graph));
    }

    /// Save/restore preserves the enabled Out set of every node, by value.
    #[test]
    fn save_restore_preserves_enablement(
        placements in prop::collection::vec((arb_kind(), 0i32..6, 0i32..6), 1..16,),
        toggles in prop::collection::vec(any::<prop::sample::Index>(), 0..8)
    ) {
        let mut graph = build_graph(&placements);

        // Flip a few Out ports.
        let all_out: Vec<_> = graph
            .iter_nodes()
            .flat_map(|(node, _)| graph.ports(node).iter().copied())
            .filter(|&pid| graph.port(pid).unwrap().kind == PortKind::Out)
            .collect();
        for idx in &toggles {
            if !all_out.is_empty() {
                let pid = all_out[idx.index(all_out.len())];
                graph.toggle_port(pid).unwrap();
            }
        }

        let state = save::capture(&graph, 0);
        let restored = save::rebuild(&state).unwrap();

        // Compare by value: (kind, position, sorted enabled Out offsets).
        let summarize = |g: &SignalGraph| {
            let mut rows: Vec<_> = g
                .iter_nodes()
                .map(|(node, data)| {
                    let mut offsets: Vec<_> = g
                        .ports(node)
                        .iter()
                        .filter_map(|&pid| {
                            let p = g.port(pid).unwrap();
                            (p.kind == PortKind::Out && p.enabled).then_some(p.offset)
                        })
                        .collect();
                    offsets.sort();
                    (data.kind, data.position, offsets)
                })
                .collect();
            rows.sort();
            rows
        };
        prop_assert_eq!(summarize(&graph), summarize(&restored));
    }

    /// Propagation terminates on arbitrary (possibly cyclic) boards and
    /// never delivers to a node more often than it has In ports.
    #[test]
    fn propagation_terminates(
        placements in prop::collection::vec((arb_kind(), 0i32..5, 0i32..5), 1..24)
    ) {
        let graph = build_graph(&placements);
        for (node, _) in graph.iter_nodes() {
            if let Some(entry) = graph.entry_port(node) {
                let outcome = propagate(
                    &graph,
                    entry,
                    &Signal::pulse(true),
                    PropagationLimits::default(),
                );
                // Visited-port set bounds deliveries by total In port count.
                let in_ports: usize = graph
                    .iter_nodes()
                    .map(|(n, _)| {
                        graph
                            .ports(n)
                            .iter()
                            .filter(|&&pid| graph.port(pid).unwrap().kind == PortKind::In)
                            .count()
                    })
                    .sum();
                prop_assert!(outcome.deliveries.len() <= in_ports);
            }
        }
    }
}
