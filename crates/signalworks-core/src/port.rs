//! Ports: directional, positioned, enable-gated connection points.
//!
//! A port belongs to exactly one node. Its peer link is a non-owning arena
//! handle established by connection resolution and nulled whenever the
//! other side disappears; a disconnected port is a steady state, not an
//! error.

use serde::{Deserialize, Serialize};

use crate::grid::{Direction, GridOffset};
use crate::id::{NodeId, PortId};

// ---------------------------------------------------------------------------
// PortKind
// ---------------------------------------------------------------------------

/// The direction of a port. In ports accept signals; Out ports send them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PortKind {
    In,
    Out,
}

impl PortKind {
    /// The kind a peer port must have to connect to this one.
    pub fn opposite(&self) -> PortKind {
        match self {
            PortKind::In => PortKind::Out,
            PortKind::Out => PortKind::In,
        }
    }
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// A connection point owned by a node.
#[derive(Debug, Clone)]
pub struct Port {
    /// The node this port belongs to.
    pub owner: NodeId,
    pub kind: PortKind,
    /// Relative position of the cell this port connects through.
    pub offset: GridOffset,
    /// Disabled ports do not propagate, in either direction.
    pub enabled: bool,
    /// The port on the opposite side of the connection, when resolved.
    /// Non-owning; cleared when the peer is removed or resolution fails.
    pub peer: Option<PortId>,
}

impl Port {
    pub fn new(owner: NodeId, spec: PortSpec) -> Self {
        Self {
            owner,
            kind: spec.kind,
            offset: spec.offset,
            enabled: spec.enabled,
            peer: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// One port in a layout, before the owning node exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub kind: PortKind,
    pub offset: GridOffset,
    pub enabled: bool,
}

impl PortSpec {
    pub fn input(offset: GridOffset) -> Self {
        Self {
            kind: PortKind::In,
            offset,
            enabled: true,
        }
    }

    pub fn output(offset: GridOffset) -> Self {
        Self {
            kind: PortKind::Out,
            offset,
            enabled: true,
        }
    }
}

/// Errors raised while declaring a port layout.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayoutError {
    /// Two ports with the same offset and kind would make connection
    /// resolution ambiguous; declared layouts must be unambiguous.
    #[error("duplicate {kind:?} port declaration at offset {offset:?}")]
    DuplicatePort { offset: GridOffset, kind: PortKind },
}

/// An ordered set of port declarations. Order is insertion order; it is
/// irrelevant for routing but fixes gizmo display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortLayout {
    specs: Vec<PortSpec>,
}

impl PortLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a port declaration, rejecting duplicates of (offset, kind).
    pub fn push(&mut self, spec: PortSpec) -> Result<(), LayoutError> {
        if self
            .specs
            .iter()
            .any(|s| s.offset == spec.offset && s.kind == spec.kind)
        {
            return Err(LayoutError::DuplicatePort {
                offset: spec.offset,
                kind: spec.kind,
            });
        }
        self.specs.push(spec);
        Ok(())
    }

    pub fn specs(&self) -> &[PortSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// A single In port at the owner's own cell.
    pub fn single_input() -> Self {
        let mut layout = Self::new();
        layout
            .push(PortSpec::input(GridOffset::ZERO))
            .expect("empty layout cannot collide");
        layout
    }

    /// The wire layout: an In and an Out per cardinal direction, plus an
    /// Out tap at the owner's own cell that feeds a co-located receiver.
    pub fn wire() -> Self {
        let mut layout = Self::new();
        for dir in Direction::all() {
            layout
                .push(PortSpec::input(dir.offset()))
                .expect("cardinal offsets are distinct");
            layout
                .push(PortSpec::output(dir.offset()))
                .expect("cardinal offsets are distinct");
        }
        layout
            .push(PortSpec::output(GridOffset::ZERO))
            .expect("zero offset distinct from cardinals");
        layout
    }
}

// ===========================================================================
// Tests
// ===========================================================================
