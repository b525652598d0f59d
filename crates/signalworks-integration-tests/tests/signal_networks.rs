//! End-to-end signal network scenarios: fan-out, selective routing,
//! stub states, cycles, and long runs.

use signalworks_core::event::SignalEventKind;
use signalworks_core::grid::{Direction, GridPosition};
use signalworks_core::network::SignalNetwork;
use signalworks_core::node::NodeKind;
use signalworks_core::propagate::PropagationLimits;
use signalworks_core::test_utils::*;

fn pos(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

// ============================================================================
// Fan-out
// ============================================================================

/// A splitter with three enabled directions forwards one pulse to exactly
/// three neighboring receivers.
#[test]
fn splitter_fans_out_to_exactly_three_neighbors() {
    let mut net = SignalNetwork::new();
    let dirs = [Direction::North, Direction::East, Direction::South];
    let (splitter, receivers) = splitter_with_neighbors(&mut net, pos(0, 0), &dirs);

    let outcome = net.inject_at(splitter, pulse()).unwrap();
    let delivered = delivered_nodes(&outcome);
    assert_eq!(delivered.len(), 3);
    for r in &receivers {
        assert!(delivered.contains(r));
    }
}

/// Disabling one direction then resending reaches only the other two.
#[test]
fn toggling_one_direction_narrows_the_fan_out() {
    let mut net = SignalNetwork::new();
    let dirs = [Direction::North, Direction::East, Direction::South];
    let (splitter, receivers) = splitter_with_neighbors(&mut net, pos(0, 0), &dirs);

    let east = net
        .graph()
        .port_commands(splitter)
        .into_iter()
        .find(|c| c.direction == Direction::East)
        .unwrap();
    net.toggle_port(east.port).unwrap();

    let outcome = net.inject_at(splitter, pulse()).unwrap();
    let delivered = delivered_nodes(&outcome);
    assert_eq!(delivered.len(), 2);
    assert!(delivered.contains(&receivers[0]));
    assert!(!delivered.contains(&receivers[1])); // east went dark
    assert!(delivered.contains(&receivers[2]));

    // Toggling back restores all three.
    net.toggle_port(east.port).unwrap();
    let outcome = net.inject_at(splitter, pulse()).unwrap();
    assert_eq!(delivered_nodes(&outcome).len(), 3);
}

// ============================================================================
// Stub states and drops
// ============================================================================

/// A splitter with every direction disabled is a legal stub: the signal
/// drops, nothing faults.
#[test]
fn fully_disabled_splitter_is_a_stub() {
    let mut net = SignalNetwork::new();
    let (splitter, _) = splitter_with_neighbors(&mut net, pos(0, 0), &[Direction::North]);
    for cmd in net.graph().port_commands(splitter) {
        net.graph_mut().set_port_enabled(cmd.port, false).unwrap();
    }
    // The zero-offset tap stays enabled but has no peer here.

    let outcome = net.inject_at(splitter, pulse()).unwrap();
    assert!(delivered_nodes(&outcome).is_empty());
    assert!(outcome.dropped > 0);

    let events = net.events().drain();
    assert!(events
        .iter()
        .any(|e| e.kind() == SignalEventKind::SignalDropped));
}

/// An unattached wire segment simply stops propagation at its edge.
#[test]
fn disconnected_wire_is_a_steady_state() {
    let mut net = SignalNetwork::new();
    let lone = net.place(NodeKind::Transmitter, pos(50, 50)).unwrap();
    let outcome = net.inject_at(lone, pulse()).unwrap();
    assert!(outcome.deliveries.is_empty());
    assert_eq!(outcome.forwarded, 0);
}

// ============================================================================
// Cycles
// ============================================================================

/// A ring of wire with tapped receivers: propagation terminates and every
/// receiver still hears the pulse exactly once.
#[test]
fn cyclic_topology_terminates_and_delivers_once() {
    let mut net = SignalNetwork::new();
    let ring = [pos(0, 0), pos(1, 0), pos(1, 1), pos(0, 1)];
    let mut receivers = Vec::new();
    for cell in ring {
        net.place(NodeKind::Transmitter, cell).unwrap();
        receivers.push(receiver_on(&mut net, cell));
    }

    let origin = net.graph().nodes_at(pos(0, 0))[0];
    let outcome = net.inject_at(origin, pulse()).unwrap();
    assert!(!outcome.truncated);

    let delivered = delivered_nodes(&outcome);
    for r in &receivers {
        assert!(delivered.contains(r));
    }
    // Once each: delivered_nodes dedupes, so compare raw delivery count.
    assert_eq!(outcome.deliveries.len(), receivers.len());
}

/// With a tiny hop budget the same ring reports truncation instead of
/// hanging or crashing.
#[test]
fn hop_ceiling_reports_runaway_wiring() {
    let mut net = SignalNetwork::with_limits(PropagationLimits { max_hops: 2 });
    for cell in [pos(0, 0), pos(1, 0), pos(1, 1), pos(0, 1)] {
        net.place(NodeKind::Transmitter, cell).unwrap();
    }
    let origin = net.graph().nodes_at(pos(0, 0))[0];
    let outcome = net.inject_at(origin, pulse()).unwrap();
    assert!(outcome.truncated);

    let events = net.events().drain();
    assert!(events
        .iter()
        .any(|e| e.kind() == SignalEventKind::PropagationTruncated));
}

// ============================================================================
// Long runs and branches
// ============================================================================

/// A signal crosses a long wire run and still branches at a far splitter.
#[test]
fn long_run_then_branch() {
    let mut net = SignalNetwork::new();
    let line = wire_line(&mut net, pos(0, 0), 30);
    // Splitter continues the line eastward, branching north and south.
    let (_splitter, receivers) = splitter_with_neighbors(
        &mut net,
        pos(30, 0),
        &[Direction::North, Direction::South],
    );

    let outcome = net.inject_at(line[0], pulse()).unwrap();
    let delivered = delivered_nodes(&outcome);
    for r in &receivers {
        assert!(delivered.contains(r));
    }
}

/// Two parallel paths to one receiver deliver once per In port, bounded by
/// the visited-port guard.
#[test]
fn diamond_paths_stay_bounded() {
    let mut net = SignalNetwork::new();
    // Two disjoint wire paths from (0,0) merging at (2,0).
    for cell in [
        pos(0, 0),
        pos(0, -1),
        pos(1, -1),
        pos(2, -1),
        pos(0, 1),
        pos(1, 1),
        pos(2, 1),
        pos(2, 0),
    ] {
        net.place(NodeKind::Transmitter, cell).unwrap();
    }
    let receiver = receiver_on(&mut net, pos(2, 0));

    let origin = net.graph().nodes_at(pos(0, 0))[0];
    let outcome = net.inject_at(origin, pulse()).unwrap();
    // The receiver has one In port, so it hears the pulse at most once.
    let hits = outcome
        .deliveries
        .iter()
        .filter(|d| d.node == receiver)
        .count();
    assert_eq!(hits, 1);
}
