//! Serde data file structs for device definitions.
//!
//! These structs define the on-disk TOML format. They are deserialized
//! as-is and then resolved into engine types by the loader, which also
//! performs validation and name interning.

use serde::Deserialize;

/// Top-level device data file: a list of `[[device]]` tables.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceFile {
    #[serde(default)]
    pub device: Vec<DeviceData>,
}

/// One device definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceData {
    pub name: String,
    /// Which graph node this device places, if any.
    #[serde(default)]
    pub node: Option<NodeKindData>,
    #[serde(default)]
    pub power: Option<PowerData>,
    /// Whether the device carries a flicker switch.
    #[serde(default)]
    pub flicker: Option<bool>,
    #[serde(default)]
    pub emitter: Option<EmitterData>,
}

/// Node kind names accepted in data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKindData {
    Receiver,
    Mediator,
    Transmitter,
    Splitter,
}

/// Power capability declaration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PowerData {
    /// Nominal draw in watts.
    pub draw: f64,
}

/// Emitter declaration. A `radius` makes it radial, which then requires
/// `damage`, `armour_pen`, and `damage_kind`; without a radius the emitter
/// is effect-only.
#[derive(Debug, Clone, Deserialize)]
pub struct EmitterData {
    pub effecter: String,
    #[serde(default)]
    pub radius: Option<u32>,
    /// `[min, max]`, inclusive.
    #[serde(default)]
    pub damage: Option<[u32; 2]>,
    /// `[min, max]` armour penetration fractions in `[0, 1]`.
    #[serde(default)]
    pub armour_pen: Option<[f64; 2]>,
    #[serde(default)]
    pub damage_kind: Option<String>,
}
