//! The host-world boundary: effects, targets, damage.
//!
//! The rig never touches the host game directly; everything outward goes
//! through [`WorldHost`]. Tests use [`RecordingHost`] to observe calls.

use signalworks_core::fixed::Fixed64;
use signalworks_core::grid::GridPosition;
use signalworks_core::id::{DamageKindId, EffecterId, TargetId};

/// Host-world services the device layer calls into.
pub trait WorldHost {
    /// Play a visual/audio effecter at a cell.
    fn spawn_effect(&mut self, effecter: EffecterId, at: GridPosition);

    /// Living targets occupying any of the given cells. May contain
    /// duplicates when a target spans several cells; callers dedupe.
    fn living_targets_in(&self, cells: &[GridPosition]) -> Vec<TargetId>;

    /// Apply one damage application to a target.
    fn apply_damage(&mut self, target: TargetId, amount: u32, armour_pen: Fixed64, kind: DamageKindId);
}

/// A host that ignores every call. Useful for headless runs where only the
/// signal-side outcome matters.
#[derive(Debug, Default)]
pub struct NullHost;

impl WorldHost for NullHost {
    fn spawn_effect(&mut self, _effecter: EffecterId, _at: GridPosition) {}

    fn living_targets_in(&self, _cells: &[GridPosition]) -> Vec<TargetId> {
        Vec::new()
    }

    fn apply_damage(
        &mut self,
        _target: TargetId,
        _amount: u32,
        _armour_pen: Fixed64,
        _kind: DamageKindId,
    ) {
    }
}

// ---------------------------------------------------------------------------
// Recording host (test support)
// ---------------------------------------------------------------------------

/// One recorded damage application.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageRecord {
    pub target: TargetId,
    pub amount: u32,
    pub armour_pen: Fixed64,
    pub kind: DamageKindId,
}

/// A host that records every call and serves targets from a fixed board.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct RecordingHost {
    targets: Vec<(GridPosition, TargetId)>,
    pub effects: Vec<(EffecterId, GridPosition)>,
    pub damage: Vec<DamageRecord>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a living target at a cell. A target listed under several cells
    /// models a multi-cell creature.
    pub fn add_target(&mut self, at: GridPosition, target: TargetId) {
        self.targets.push((at, target));
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl WorldHost for RecordingHost {
    fn spawn_effect(&mut self, effecter: EffecterId, at: GridPosition) {
        self.effects.push((effecter, at));
    }

    fn living_targets_in(&self, cells: &[GridPosition]) -> Vec<TargetId> {
        self.targets
            .iter()
            .filter(|(pos, _)| cells.contains(pos))
            .map(|(_, target)| *target)
            .collect()
    }

    fn apply_damage(
        &mut self,
        target: TargetId,
        amount: u32,
        armour_pen: Fixed64,
        kind: DamageKindId,
    ) {
        self.damage.push(DamageRecord {
            target,
            amount,
            armour_pen,
            kind,
        });
    }
}
