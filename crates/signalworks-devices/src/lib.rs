//! Device layer for the Signalworks network.
//!
//! Bridges delivered signals into stateful device capabilities: power
//! switches, flicker switches, and effect emitters (including radial damage
//! emitters with spawn-time cached geometry).
//!
//! # Design
//!
//! - Entities are host-world objects identified by [`EntityId`]; each may
//!   own one graph node and any subset of capabilities, looked up by kind
//!   at activation time. Absent capabilities are a valid state, never an
//!   error.
//! - Adapter bindings are a closed set of tagged variants dispatched by one
//!   routing function. A mediator's bindings run in registration order;
//!   a failing binding is isolated and later bindings still run.
//! - Registration returns a [`adapter::Subscription`] whose release (at
//!   entity deactivation, or manually) removes it from the mediator's
//!   list, so nothing dangles after a capability is destroyed.
//! - The host world sits behind the [`host::WorldHost`] trait: effect
//!   spawning, target queries, and damage application.
//!
//! [`EntityId`]: signalworks_core::id::EntityId

pub mod adapter;
pub mod capability;
pub mod emitter;
pub mod flicker;
pub mod host;
pub mod power;
pub mod rig;

pub use adapter::{AdapterBinding, AdapterError, Subscription};
pub use capability::CapabilityKind;
pub use emitter::{EmitOutcome, Emitter, EmitterKind};
pub use flicker::FlickerSwitch;
pub use host::WorldHost;
pub use power::PowerSwitch;
pub use rig::{DeviceError, DeviceEvent, SignalRig};
