use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a node in the signal graph.
    pub struct NodeId;

    /// Identifies a port in the signal graph.
    pub struct PortId;
}

/// Identifies a host-world entity that owns capabilities (and, optionally,
/// one graph node). Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Identifies an effecter (visual/audio effect descriptor) by interned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffecterId(pub u32);

/// Identifies a damage kind by interned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DamageKindId(pub u32);

/// Identifies a living target in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

/// Identifies an adapter subscription on a mediator node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_equality() {
        assert_eq!(EntityId(3), EntityId(3));
        assert_ne!(EntityId(3), EntityId(4));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(EffecterId(0), "spark");
        map.insert(EffecterId(1), "siren");
        assert_eq!(map[&EffecterId(0)], "spark");
    }
}
