//! Adapter bindings: the glue between delivered signals and capabilities.
//!
//! A binding is a closed tagged variant, not a boxed callback: the rig
//! dispatches every variant through one routing function, in registration
//! order, isolating failures per binding. Registration hands back a
//! [`Subscription`] whose release removes the binding -- nothing stays
//! registered past its entity's deactivation.

use signalworks_core::id::{EntityId, NodeId, SubscriptionId};

use crate::capability::CapabilityKind;

/// One registered adapter on a mediator: maps a delivered signal's boolean
/// payload onto a capability of the named entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterBinding {
    /// Set the entity's power switch to the signal's boolean payload.
    Power(EntityId),
    /// Set the entity's flicker switch to the signal's boolean payload.
    Flicker(EntityId),
    /// Trigger the entity's emitter when the payload reads true.
    Emitter(EntityId),
}

impl AdapterBinding {
    pub fn entity(&self) -> EntityId {
        match self {
            AdapterBinding::Power(e) | AdapterBinding::Flicker(e) | AdapterBinding::Emitter(e) => {
                *e
            }
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        match self {
            AdapterBinding::Power(_) => CapabilityKind::Power,
            AdapterBinding::Flicker(_) => CapabilityKind::Flicker,
            AdapterBinding::Emitter(_) => CapabilityKind::Emitter,
        }
    }
}

/// A handle to a registered binding. Pass it back to the rig to release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub id: SubscriptionId,
    /// The mediator node the binding is registered on.
    pub node: NodeId,
}

/// Why a binding failed to apply. Failures are isolated: the rig records
/// them and continues with the remaining bindings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AdapterError {
    /// The binding's target capability no longer exists on the entity.
    #[error("entity {0:?} lacks capability {1:?}")]
    CapabilityMissing(EntityId, CapabilityKind),
    /// The entity itself is no longer registered.
    #[error("entity not registered: {0:?}")]
    EntityMissing(EntityId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_reports_its_capability_kind() {
        let entity = EntityId(1);
        assert_eq!(AdapterBinding::Power(entity).kind(), CapabilityKind::Power);
        assert_eq!(
            AdapterBinding::Flicker(entity).kind(),
            CapabilityKind::Flicker
        );
        assert_eq!(
            AdapterBinding::Emitter(entity).kind(),
            CapabilityKind::Emitter
        );
        assert_eq!(AdapterBinding::Emitter(entity).entity(), entity);
    }
}
