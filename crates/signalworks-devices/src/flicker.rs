//! Flicker switch capability: a settable switch with a manual-flick queue.
//!
//! Signal adapters set the switch directly. Colonist-style manual control
//! goes through `request_flick` / `apply_flick`, so a host can model the
//! delay between designating a flick and a worker performing it.

use serde::{Deserialize, Serialize};

/// A flickable switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlickerSwitch {
    switch_on: bool,
    wants_switch_on: bool,
}

impl FlickerSwitch {
    pub fn new(on: bool) -> Self {
        Self {
            switch_on: on,
            wants_switch_on: on,
        }
    }

    pub fn is_on(&self) -> bool {
        self.switch_on
    }

    /// Set the switch immediately (signal-driven path). Returns whether the
    /// state changed. Clears any pending manual flick.
    pub fn set_switch_on(&mut self, on: bool) -> bool {
        let changed = self.switch_on != on;
        self.switch_on = on;
        self.wants_switch_on = on;
        changed
    }

    /// Designate a manual flick to the desired state.
    pub fn request_flick(&mut self, on: bool) {
        self.wants_switch_on = on;
    }

    /// Whether a designated flick is still pending.
    pub fn needs_flick(&self) -> bool {
        self.wants_switch_on != self.switch_on
    }

    /// Perform the pending flick. Returns whether the state changed.
    pub fn apply_flick(&mut self) -> bool {
        let changed = self.needs_flick();
        self.switch_on = self.wants_switch_on;
        changed
    }
}
