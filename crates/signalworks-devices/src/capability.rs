//! Capability kinds, the keys of the per-entity capability registry.

use serde::{Deserialize, Serialize};

/// The closed set of device capabilities an entity can own. Adapters query
/// these by kind at activation time; absence is a valid, non-error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CapabilityKind {
    Power,
    Flicker,
    Emitter,
}

impl CapabilityKind {
    /// All capability kinds, in adapter registration order.
    pub fn all() -> [CapabilityKind; 3] {
        [
            CapabilityKind::Power,
            CapabilityKind::Flicker,
            CapabilityKind::Emitter,
        ]
    }
}
