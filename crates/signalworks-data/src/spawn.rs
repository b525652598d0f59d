//! Materializing resolved definitions onto a rig.

use signalworks_core::graph::GraphError;
use signalworks_core::grid::GridPosition;
use signalworks_core::id::{EntityId, NodeId};

use signalworks_devices::emitter::Emitter;
use signalworks_devices::flicker::FlickerSwitch;
use signalworks_devices::power::PowerSwitch;
use signalworks_devices::rig::{DeviceError, SignalRig};

use crate::loader::DeviceDef;

/// Errors from spawning a device definition.
#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Spawn one device at a world position: place its node (if it has one),
/// register the entity, attach its declared capabilities, and activate.
/// Returns the placed node, if any.
pub fn spawn_device(
    rig: &mut SignalRig,
    def: &DeviceDef,
    entity: EntityId,
    position: GridPosition,
) -> Result<Option<NodeId>, SpawnError> {
    let node = match def.node {
        Some(kind) => Some(rig.network_mut().place(kind, position)?),
        None => None,
    };
    rig.register_entity(entity, node)?;

    if let Some(draw) = def.power_draw {
        rig.add_power(entity, PowerSwitch::new(draw))?;
    }
    if def.flicker {
        rig.add_flicker(entity, FlickerSwitch::new(true))?;
    }
    if let Some(spec) = &def.emitter {
        rig.add_emitter(entity, Emitter::new(spec.effecter, spec.kind.clone(), position))?;
    }

    rig.activate_entity(entity, false)?;
    Ok(node)
}

// ===========================================================================
// Tests
// ===========================================================================
