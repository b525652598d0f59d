//! Data-driven device definitions for Signalworks.
//!
//! Hosts declare devices in TOML -- node kind, power draw, flicker,
//! emitter payload -- and this crate resolves them into engine types:
//! effecter and damage-kind names are interned into ids, ranges are
//! validated, and [`spawn::spawn_device`] materializes a definition onto a
//! rig at a world position.

pub mod loader;
pub mod schema;
pub mod spawn;

pub use loader::{DataLoadError, DeviceDef, DeviceSet, EmitterSpec, NameTable, load_path, load_str};
pub use spawn::{SpawnError, spawn_device};
