//! Versioned save/restore for the signal graph.
//!
//! Snapshots persist node state *by value* -- kind, position, and the
//! enable/disable sets keyed by port offset -- never port identities, since
//! ports are reconstructed from each kind's default layout on restore.
//! Topology is not stored at all: a resolution pass rebuilds it, and ports
//! whose neighbors did not survive the save simply stay unlinked.
//!
//! The binary payload is `bitcode` behind a magic/version header so format
//! mismatches are detected before decoding the body.

use serde::{Deserialize, Serialize};

use crate::fixed::Ticks;
use crate::graph::{GraphError, SignalGraph};
use crate::grid::{GridOffset, GridPosition};
use crate::node::NodeKind;
use crate::port::PortKind;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a signal network snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x5167_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during snapshot encoding.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur during snapshot decoding and rebuild.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("snapshot rebuild failed: {0}")]
    Rebuild(#[from] GraphError),
}

// ---------------------------------------------------------------------------
// Snapshot format
// ---------------------------------------------------------------------------

/// Header prepended to every snapshot. Enables format detection and version
/// checking before the body is trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Tick count at the time the snapshot was taken.
    pub tick: Ticks,
}

impl SnapshotHeader {
    pub fn new(tick: Ticks) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(LoadError::InvalidMagic(self.magic));
        }
        if self.version != FORMAT_VERSION {
            return Err(LoadError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// One node, by value. Enable state is keyed by offset, not port identity.
///
/// Both sets default to empty when absent from older payloads: a missing
/// `enabled_out` restores with every Out port disabled (the safe stub
/// state), a missing `disabled_in` restores with every In port at its
/// default (enabled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub kind: NodeKind,
    pub position: GridPosition,
    #[serde(default)]
    pub enabled_out: Vec<GridOffset>,
    #[serde(default)]
    pub disabled_in: Vec<GridOffset>,
}

/// A complete snapshot payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    pub header: SnapshotHeader,
    pub nodes: Vec<NodeRecord>,
}

// ---------------------------------------------------------------------------
// Capture / encode
// ---------------------------------------------------------------------------

/// Capture the graph into a value-only save state.
pub fn capture(graph: &SignalGraph, tick: Ticks) -> SaveState {
    let mut nodes = Vec::with_capacity(graph.node_count());
    for (node_id, data) in graph.iter_nodes() {
        let mut enabled_out = Vec::new();
        let mut disabled_in = Vec::new();
        for &pid in graph.ports(node_id) {
            let port = graph.port(pid).expect("node port list is in sync");
            match (port.kind, port.enabled) {
                (PortKind::Out, true) => enabled_out.push(port.offset),
                (PortKind::In, false) => disabled_in.push(port.offset),
                _ => {}
            }
        }
        enabled_out.sort();
        disabled_in.sort();
        nodes.push(NodeRecord {
            kind: data.kind,
            position: data.position,
            enabled_out,
            disabled_in,
        });
    }
    SaveState {
        header: SnapshotHeader::new(tick),
        nodes,
    }
}

/// Serialize the graph into a binary snapshot.
pub fn encode(graph: &SignalGraph, tick: Ticks) -> Result<Vec<u8>, SaveError> {
    bitcode::serialize(&capture(graph, tick)).map_err(|e| SaveError::Encode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Decode / restore
// ---------------------------------------------------------------------------

/// Decode and validate a snapshot payload without rebuilding the graph.
pub fn decode(data: &[u8]) -> Result<SaveState, LoadError> {
    let state: SaveState =
        bitcode::deserialize(data).map_err(|e| LoadError::Decode(e.to_string()))?;
    state.header.validate()?;
    Ok(state)
}

/// Rebuild a graph from a save state: default layouts, then the persisted
/// enable sets, then a full resolution pass.
pub fn rebuild(state: &SaveState) -> Result<SignalGraph, LoadError> {
    let mut graph = SignalGraph::new();
    for record in &state.nodes {
        let node = graph.place(record.kind, record.position)?;
        let port_ids: Vec<_> = graph.ports(node).to_vec();
        for pid in port_ids {
            let port = graph.port(pid).expect("freshly placed port");
            let (kind, offset) = (port.kind, port.offset);
            let enabled = match kind {
                PortKind::Out => record.enabled_out.contains(&offset),
                PortKind::In => !record.disabled_in.contains(&offset),
            };
            graph
                .set_port_enabled(pid, enabled)
                .expect("freshly placed port");
        }
    }
    graph.resolve_connections();
    Ok(graph)
}

/// Decode a binary snapshot and rebuild the graph it describes.
pub fn restore(data: &[u8]) -> Result<(SignalGraph, Ticks), LoadError> {
    let state = decode(data)?;
    let tick = state.header.tick;
    let graph = rebuild(&state)?;
    Ok((graph, tick))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction;

    fn pos(x: i32, y: i32) -> GridPosition {
        GridPosition::new(x, y)
    }

    fn enabled_out_offsets(graph: &SignalGraph, node: crate::id::NodeId) -> Vec<GridOffset> {
        let mut offsets: Vec<GridOffset> = graph
            .ports(node)
            .iter()
            .filter_map(|&pid| {
                let p = graph.port(pid).unwrap();
                (p.kind == PortKind::Out && p.enabled).then_some(p.offset)
            })
            .collect();
        offsets.sort();
        offsets
    }

    #[test]
    fn round_trip_preserves_enabled_set() {
        let mut graph = SignalGraph::new();
        let splitter = graph.place(NodeKind::Splitter, pos(0, 0)).unwrap();
        graph.place(NodeKind::Transmitter, pos(1, 0)).unwrap();

        // Disable two directions.
        for cmd in graph.port_commands(splitter) {
            if matches!(cmd.direction, Direction::North | Direction::West) {
                graph.set_port_enabled(cmd.port, false).unwrap();
            }
        }
        graph.resolve_connections();
        let before = enabled_out_offsets(&graph, splitter);

        let data = encode(&graph, 42).unwrap();
        let (restored, tick) = restore(&data).unwrap();
        assert_eq!(tick, 42);
        assert_eq!(restored.node_count(), 2);

        // Find the restored splitter by kind.
        let restored_splitter = restored
            .iter_nodes()
            .find(|(_, d)| d.kind == NodeKind::Splitter)
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(enabled_out_offsets(&restored, restored_splitter), before);
    }

    #[test]
    fn restore_reconnects_surviving_neighbors() {
        let mut graph = SignalGraph::new();
        graph.place(NodeKind::Transmitter, pos(0, 0)).unwrap();
        graph.place(NodeKind::Transmitter, pos(1, 0)).unwrap();
        graph.resolve_connections();

        let data = encode(&graph, 0).unwrap();
        let (restored, _) = restore(&data).unwrap();

        let a = restored.nodes_at(pos(0, 0))[0];
        let east_out = restored
            .ports(a)
            .iter()
            .copied()
            .find(|&pid| {
                let p = restored.port(pid).unwrap();
                p.kind == PortKind::Out && p.offset == GridOffset::new(1, 0)
            })
            .unwrap();
        assert!(restored.port(east_out).unwrap().peer.is_some());
    }

    #[test]
    fn absent_enabled_set_restores_all_out_disabled() {
        let state = SaveState {
            header: SnapshotHeader::new(7),
            nodes: vec![NodeRecord {
                kind: NodeKind::Splitter,
                position: pos(0, 0),
                enabled_out: Vec::new(),
                disabled_in: Vec::new(),
            }],
        };
        let graph = rebuild(&state).unwrap();
        let splitter = graph.iter_nodes().next().map(|(id, _)| id).unwrap();
        assert!(enabled_out_offsets(&graph, splitter).is_empty());
        // In ports keep their default (enabled).
        assert!(graph.entry_port(splitter).is_some());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let state = SaveState {
            header: SnapshotHeader {
                magic: 0xDEAD_BEEF,
                version: FORMAT_VERSION,
                tick: 0,
            },
            nodes: Vec::new(),
        };
        let data = bitcode::serialize(&state).unwrap();
        assert!(matches!(decode(&data), Err(LoadError::InvalidMagic(_))));
    }

    #[test]
    fn future_version_is_rejected() {
        let state = SaveState {
            header: SnapshotHeader {
                magic: SNAPSHOT_MAGIC,
                version: FORMAT_VERSION + 1,
                tick: 0,
            },
            nodes: Vec::new(),
        };
        let data = bitcode::serialize(&state).unwrap();
        assert!(matches!(
            decode(&data),
            Err(LoadError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn garbage_payload_is_rejected() {
        assert!(matches!(
            decode(&[0xFF, 0x00, 0x12]),
            Err(LoadError::Decode(_))
        ));
    }
}
