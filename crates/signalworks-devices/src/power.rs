//! Power switch capability: an on/off powered state with a nominal draw.

use serde::{Deserialize, Serialize};
use signalworks_core::fixed::Fixed64;

/// A powered device's switch state. Adapters map a delivered signal's
/// boolean payload directly onto `on`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSwitch {
    on: bool,
    /// Nominal power draw in watts while on. Informational for the host's
    /// own grid accounting; the rig never balances power itself.
    draw: Fixed64,
}

impl PowerSwitch {
    /// A switch that starts on.
    pub fn new(draw: Fixed64) -> Self {
        Self { on: true, draw }
    }

    /// A switch that starts off.
    pub fn new_off(draw: Fixed64) -> Self {
        Self { on: false, draw }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn draw(&self) -> Fixed64 {
        self.draw
    }

    /// Current draw: the nominal draw while on, zero otherwise.
    pub fn current_draw(&self) -> Fixed64 {
        if self.on {
            self.draw
        } else {
            Fixed64::from_num(0)
        }
    }

    /// Set the powered state. Returns whether it changed.
    pub fn set_on(&mut self, on: bool) -> bool {
        let changed = self.on != on;
        self.on = on;
        changed
    }
}
