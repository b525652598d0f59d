//! Resolution pipeline: parses data files, validates, interns names,
//! builds resolved device definitions.

use std::path::Path;

use signalworks_core::fixed::{Fixed64, f64_to_fixed64};
use signalworks_core::id::{DamageKindId, EffecterId};
use signalworks_core::node::NodeKind;
use signalworks_devices::emitter::EmitterKind;

use crate::schema::{DeviceData, DeviceFile, EmitterData, NodeKindData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A deserialization error occurred.
    #[error("parse error: {0}")]
    Parse(String),

    /// Two devices share a name.
    #[error("duplicate device name '{0}'")]
    DuplicateName(String),

    /// A radial emitter is missing one of its required fields.
    #[error("device '{device}': missing field '{field}'")]
    MissingField { device: String, field: &'static str },

    /// A numeric range is inverted or out of bounds.
    #[error("device '{device}': invalid range for '{field}'")]
    InvalidRange { device: String, field: &'static str },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Name interning
// ===========================================================================

/// Interns strings (effecter names, damage kinds) into dense u32 ids, so
/// resolved definitions never carry dangling name references.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: Vec<String>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a name, returning its id. Re-interning returns the same id.
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(idx) = self.names.iter().position(|n| n == name) {
            return idx as u32;
        }
        self.names.push(name.to_string());
        (self.names.len() - 1) as u32
    }

    /// Look up a name by id.
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ===========================================================================
// Resolved definitions
// ===========================================================================

/// A resolved emitter: interned effecter plus engine-level kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterSpec {
    pub effecter: EffecterId,
    pub kind: EmitterKind,
}

/// A resolved device definition, ready to materialize onto a rig.
#[derive(Debug, Clone)]
pub struct DeviceDef {
    pub name: String,
    pub node: Option<NodeKind>,
    pub power_draw: Option<Fixed64>,
    pub flicker: bool,
    pub emitter: Option<EmitterSpec>,
}

/// Every definition from one data file, plus the name tables its ids
/// resolve through.
#[derive(Debug, Clone, Default)]
pub struct DeviceSet {
    pub devices: Vec<DeviceDef>,
    pub effecters: NameTable,
    pub damage_kinds: NameTable,
}

impl DeviceSet {
    /// Find a definition by name.
    pub fn device(&self, name: &str) -> Option<&DeviceDef> {
        self.devices.iter().find(|d| d.name == name)
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Parse and resolve a TOML device file from a string.
pub fn load_str(text: &str) -> Result<DeviceSet, DataLoadError> {
    let file: DeviceFile = toml::from_str(text).map_err(|e| DataLoadError::Parse(e.to_string()))?;
    resolve(file)
}

/// Parse and resolve a TOML device file from disk.
pub fn load_path(path: &Path) -> Result<DeviceSet, DataLoadError> {
    let text = std::fs::read_to_string(path)?;
    load_str(&text)
}

fn resolve(file: DeviceFile) -> Result<DeviceSet, DataLoadError> {
    let mut set = DeviceSet::default();
    for data in file.device {
        if set.device(&data.name).is_some() {
            return Err(DataLoadError::DuplicateName(data.name));
        }
        let def = resolve_device(data, &mut set.effecters, &mut set.damage_kinds)?;
        set.devices.push(def);
    }
    Ok(set)
}

fn resolve_device(
    data: DeviceData,
    effecters: &mut NameTable,
    damage_kinds: &mut NameTable,
) -> Result<DeviceDef, DataLoadError> {
    let emitter = match &data.emitter {
        Some(raw) => Some(resolve_emitter(&data.name, raw, effecters, damage_kinds)?),
        None => None,
    };
    Ok(DeviceDef {
        node: data.node.map(|n| match n {
            NodeKindData::Receiver => NodeKind::Receiver,
            NodeKindData::Mediator => NodeKind::Mediator,
            NodeKindData::Transmitter => NodeKind::Transmitter,
            NodeKindData::Splitter => NodeKind::Splitter,
        }),
        power_draw: data.power.map(|p| f64_to_fixed64(p.draw)),
        flicker: data.flicker.unwrap_or(false),
        emitter,
        name: data.name,
    })
}

fn resolve_emitter(
    device: &str,
    raw: &EmitterData,
    effecters: &mut NameTable,
    damage_kinds: &mut NameTable,
) -> Result<EmitterSpec, DataLoadError> {
    let effecter = EffecterId(effecters.intern(&raw.effecter));

    let Some(radius) = raw.radius else {
        return Ok(EmitterSpec {
            effecter,
            kind: EmitterKind::Simple,
        });
    };
    if radius == 0 {
        return Err(DataLoadError::InvalidRange {
            device: device.to_string(),
            field: "radius",
        });
    }

    let missing = |field| DataLoadError::MissingField {
        device: device.to_string(),
        field,
    };
    let [damage_min, damage_max] = raw.damage.ok_or_else(|| missing("damage"))?;
    let [pen_min, pen_max] = raw.armour_pen.ok_or_else(|| missing("armour_pen"))?;
    let kind_name = raw.damage_kind.as_deref().ok_or_else(|| missing("damage_kind"))?;

    if damage_min > damage_max {
        return Err(DataLoadError::InvalidRange {
            device: device.to_string(),
            field: "damage",
        });
    }
    if !(0.0..=1.0).contains(&pen_min) || !(0.0..=1.0).contains(&pen_max) || pen_min > pen_max {
        return Err(DataLoadError::InvalidRange {
            device: device.to_string(),
            field: "armour_pen",
        });
    }

    Ok(EmitterSpec {
        effecter,
        kind: EmitterKind::RadialDamage {
            radius,
            damage_min,
            damage_max,
            pen_min: f64_to_fixed64(pen_min),
            pen_max: f64_to_fixed64(pen_max),
            damage_kind: DamageKindId(damage_kinds.intern(kind_name)),
        },
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
        [[device]]
        name = "alarm-lamp"
        node = "mediator"
        power = { draw = 15.0 }

        [[device]]
        name = "tox-vent"
        node = "mediator"
        flicker = true

        [device.emitter]
        effecter = "tox_cloud"
        radius = 3
        damage = [3, 7]
        armour_pen = [0.05, 0.2]
        damage_kind = "toxic"

        [[device]]
        name = "chime"

        [device.emitter]
        effecter = "chime_ring"
    "#;

    #[test]
    fn valid_file_resolves() {
        let set = load_str(VALID).unwrap();
        assert_eq!(set.devices.len(), 3);

        let lamp = set.device("alarm-lamp").unwrap();
        assert_eq!(lamp.node, Some(NodeKind::Mediator));
        assert!(lamp.power_draw.is_some());
        assert!(!lamp.flicker);
        assert!(lamp.emitter.is_none());

        let vent = set.device("tox-vent").unwrap();
        assert!(vent.flicker);
        let spec = vent.emitter.as_ref().unwrap();
        assert!(matches!(spec.kind, EmitterKind::RadialDamage { radius: 3, .. }));

        let chime = set.device("chime").unwrap();
        assert_eq!(chime.emitter.as_ref().unwrap().kind, EmitterKind::Simple);
    }

    #[test]
    fn names_intern_through_the_tables() {
        let set = load_str(VALID).unwrap();
        let spec = set.device("tox-vent").unwrap().emitter.as_ref().unwrap();
        assert_eq!(set.effecters.name(spec.effecter.0), Some("tox_cloud"));
        if let EmitterKind::RadialDamage { damage_kind, .. } = spec.kind {
            assert_eq!(set.damage_kinds.name(damage_kind.0), Some("toxic"));
        } else {
            panic!("expected radial kind");
        }
    }

    #[test]
    fn interning_is_stable() {
        let mut table = NameTable::new();
        let a = table.intern("spark");
        let b = table.intern("siren");
        assert_ne!(a, b);
        assert_eq!(table.intern("spark"), a);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = load_str(
            r#"
            [[device]]
            name = "x"
            [[device]]
            name = "x"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DataLoadError::DuplicateName(name) if name == "x"));
    }

    #[test]
    fn inverted_damage_range_rejected() {
        let err = load_str(
            r#"
            [[device]]
            name = "bad"
            [device.emitter]
            effecter = "boom"
            radius = 2
            damage = [9, 3]
            armour_pen = [0.0, 0.5]
            damage_kind = "blunt"
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::InvalidRange { field: "damage", .. }
        ));
    }

    #[test]
    fn pen_outside_unit_interval_rejected() {
        let err = load_str(
            r#"
            [[device]]
            name = "bad"
            [device.emitter]
            effecter = "boom"
            radius = 2
            damage = [1, 2]
            armour_pen = [0.5, 1.5]
            damage_kind = "blunt"
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::InvalidRange {
                field: "armour_pen",
                ..
            }
        ));
    }

    #[test]
    fn radial_missing_damage_kind_rejected() {
        let err = load_str(
            r#"
            [[device]]
            name = "bad"
            [device.emitter]
            effecter = "boom"
            radius = 2
            damage = [1, 2]
            armour_pen = [0.0, 0.5]
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::MissingField {
                field: "damage_kind",
                ..
            }
        ));
    }

    #[test]
    fn zero_radius_rejected() {
        let err = load_str(
            r#"
            [[device]]
            name = "bad"
            [device.emitter]
            effecter = "boom"
            radius = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::InvalidRange { field: "radius", .. }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            load_str("this is not toml ["),
            Err(DataLoadError::Parse(_))
        ));
    }
}
