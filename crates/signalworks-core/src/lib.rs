//! Signalworks Core -- the signal-propagation network for colony simulations.
//!
//! This crate provides the port/node graph, connection resolution,
//! deterministic breadth-first signal propagation, typed events, versioned
//! save/restore, and the fixed-point and PRNG primitives the device layer
//! depends on.
//!
//! # Propagation Pipeline
//!
//! A stimulus enters the network through [`network::SignalNetwork::inject`]:
//!
//! 1. **Entry** -- the signal arrives at a port; a disabled entry port drops
//!    it immediately.
//! 2. **Routing** -- the owning node's kind decides what happens: receivers
//!    and mediators deliver locally, transmitters and splitters forward to
//!    every other enabled, connected Out port.
//! 3. **Fan-out** -- forwarded signals enqueue the peer port on a work
//!    queue. A visited-port set and a hop ceiling bound every pass, so
//!    cyclic wiring terminates with a reported `truncated` outcome instead
//!    of recursing.
//! 4. **Delivery** -- the pass completes synchronously; the caller receives
//!    a [`propagate::PropagationOutcome`] listing every terminal delivery.
//!
//! # Topology Rules
//!
//! Ports are positioned by a relative [`grid::GridOffset`] from their owning
//! node. Two ports connect when they are reciprocal: the peer occupies the
//! target cell, exposes the negated offset, and has the opposite kind.
//! Placement rejects layouts that would make resolution ambiguous, so a
//! resolution pass is deterministic and idempotent.
//!
//! # Key Types
//!
//! - [`graph::SignalGraph`] -- arena-backed port/node graph with spatial
//!   lookup and connection resolution.
//! - [`network::SignalNetwork`] -- lifecycle orchestrator: activation,
//!   injection, event emission, snapshots.
//! - [`propagate`] -- the breadth-first propagation engine.
//! - [`signal::Signal`] -- the immutable value routed through the graph.
//! - [`event::EventBus`] -- buffered typed events with per-kind suppression.
//! - [`save`] -- by-value snapshot format behind a magic/version header.
//! - [`rng::SimRng`] -- SplitMix64 PRNG for deterministic damage rolls.

pub mod event;
pub mod fixed;
pub mod graph;
pub mod grid;
pub mod id;
pub mod network;
pub mod node;
pub mod port;
pub mod propagate;
pub mod rng;
pub mod save;
pub mod signal;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
