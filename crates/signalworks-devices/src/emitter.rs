//! Effect emitters: powered contraptions that perform a world effect.
//!
//! An emitter is gated by its entity's power and flicker capabilities;
//! `emit` while inactive is a no-op outcome, not an error. Radial emitters
//! compute their affected cell set once at spawn and reuse it for every
//! emission -- targeting is idempotent across calls even though the effect
//! is not. Changing the radius recomputes the cache explicitly.

use serde::{Deserialize, Serialize};

use signalworks_core::fixed::Fixed64;
use signalworks_core::grid::{GridPosition, cells_in_radius};
use signalworks_core::id::{DamageKindId, EffecterId, TargetId};
use signalworks_core::rng::SimRng;

use crate::host::WorldHost;

// ---------------------------------------------------------------------------
// Emitter kinds
// ---------------------------------------------------------------------------

/// The closed set of emission payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmitterKind {
    /// Effect only: the effecter plays, nothing else happens.
    Simple,
    /// Area damage: every distinct living target within the cached radius
    /// takes one randomized damage application per emission.
    RadialDamage {
        radius: u32,
        damage_min: u32,
        damage_max: u32,
        pen_min: Fixed64,
        pen_max: Fixed64,
        damage_kind: DamageKindId,
    },
}

/// The result of one `emit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// The entity was unpowered or switched off; nothing happened.
    Inactive,
    /// The effecter played and the payload ran.
    Emitted { targets_hit: usize },
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// An effect emitter placed at a fixed origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emitter {
    effecter: EffecterId,
    kind: EmitterKind,
    origin: GridPosition,
    /// Cells affected by radial payloads. Computed at construction and on
    /// explicit radius changes, reused by every emission.
    cached_cells: Vec<GridPosition>,
}

impl Emitter {
    /// Create an emitter and cache its affected cells.
    pub fn new(effecter: EffecterId, kind: EmitterKind, origin: GridPosition) -> Self {
        let cached_cells = Self::compute_cells(&kind, origin);
        Self {
            effecter,
            kind,
            origin,
            cached_cells,
        }
    }

    fn compute_cells(kind: &EmitterKind, origin: GridPosition) -> Vec<GridPosition> {
        match kind {
            EmitterKind::Simple => vec![origin],
            EmitterKind::RadialDamage { radius, .. } => cells_in_radius(origin, *radius),
        }
    }

    pub fn effecter(&self) -> EffecterId {
        self.effecter
    }

    pub fn kind(&self) -> &EmitterKind {
        &self.kind
    }

    pub fn origin(&self) -> GridPosition {
        self.origin
    }

    /// The cell set the next emission will target.
    pub fn cached_cells(&self) -> &[GridPosition] {
        &self.cached_cells
    }

    /// Change a radial emitter's radius and recompute the cached cells.
    /// Returns whether anything changed; no-op for simple emitters.
    pub fn set_radius(&mut self, new_radius: u32) -> bool {
        match &mut self.kind {
            EmitterKind::Simple => false,
            EmitterKind::RadialDamage { radius, .. } => {
                if *radius == new_radius {
                    return false;
                }
                *radius = new_radius;
                self.cached_cells = Self::compute_cells(&self.kind, self.origin);
                true
            }
        }
    }

    /// Perform one emission. Inactive emitters do nothing. Active ones play
    /// the effecter, then run the payload: radial damage rolls a damage
    /// amount and armour penetration per distinct target, once per call.
    pub fn emit(&self, active: bool, host: &mut dyn WorldHost, rng: &mut SimRng) -> EmitOutcome {
        if !active {
            return EmitOutcome::Inactive;
        }
        host.spawn_effect(self.effecter, self.origin);

        match &self.kind {
            EmitterKind::Simple => EmitOutcome::Emitted { targets_hit: 0 },
            EmitterKind::RadialDamage {
                damage_min,
                damage_max,
                pen_min,
                pen_max,
                damage_kind,
                ..
            } => {
                let raw = host.living_targets_in(&self.cached_cells);
                let targets = dedupe(raw);
                for &target in &targets {
                    let amount = rng.range_u32(*damage_min, *damage_max);
                    let pen = rng.fixed_in_range(*pen_min, *pen_max);
                    host.apply_damage(target, amount, pen, *damage_kind);
                }
                EmitOutcome::Emitted {
                    targets_hit: targets.len(),
                }
            }
        }
    }
}

/// Distinct targets, first occurrence order preserved.
fn dedupe(raw: Vec<TargetId>) -> Vec<TargetId> {
    let mut seen = std::collections::BTreeSet::new();
    raw.into_iter().filter(|t| seen.insert(*t)).collect()
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use signalworks_core::fixed::f64_to_fixed64;

    fn radial(radius: u32) -> Emitter {
        Emitter::new(
            EffecterId(1),
            EmitterKind::RadialDamage {
                radius,
                damage_min: 10,
                damage_max: 20,
                pen_min: f64_to_fixed64(0.1),
                pen_max: f64_to_fixed64(0.3),
                damage_kind: DamageKindId(0),
            },
            GridPosition::new(0, 0),
        )
    }

    #[test]
    fn inactive_emit_is_a_no_op() {
        let emitter = radial(2);
        let mut host = RecordingHost::new();
        let mut rng = SimRng::new(1);
        host.add_target(GridPosition::new(1, 0), TargetId(7));

        assert_eq!(
            emitter.emit(false, &mut host, &mut rng),
            EmitOutcome::Inactive
        );
        assert!(host.effects.is_empty());
        assert!(host.damage.is_empty());
    }

    #[test]
    fn active_emit_plays_effect_and_damages_targets_in_radius() {
        let emitter = radial(2);
        let mut host = RecordingHost::new();
        let mut rng = SimRng::new(1);
        host.add_target(GridPosition::new(1, 0), TargetId(7));
        host.add_target(GridPosition::new(0, -2), TargetId(8));
        host.add_target(GridPosition::new(5, 5), TargetId(9)); // out of range

        let outcome = emitter.emit(true, &mut host, &mut rng);
        assert_eq!(outcome, EmitOutcome::Emitted { targets_hit: 2 });
        assert_eq!(host.effects.len(), 1);
        assert_eq!(host.damage.len(), 2);
        for record in &host.damage {
            assert!((10..=20).contains(&record.amount));
            assert!(record.armour_pen >= f64_to_fixed64(0.1));
            assert!(record.armour_pen < f64_to_fixed64(0.3));
        }
    }

    #[test]
    fn multi_cell_target_hit_once() {
        let emitter = radial(2);
        let mut host = RecordingHost::new();
        let mut rng = SimRng::new(1);
        host.add_target(GridPosition::new(1, 0), TargetId(7));
        host.add_target(GridPosition::new(0, 1), TargetId(7));

        let outcome = emitter.emit(true, &mut host, &mut rng);
        assert_eq!(outcome, EmitOutcome::Emitted { targets_hit: 1 });
        assert_eq!(host.damage.len(), 1);
    }

    #[test]
    fn cached_cells_stable_across_emissions() {
        let emitter = radial(3);
        let before = emitter.cached_cells().to_vec();
        let mut host = RecordingHost::new();
        let mut rng = SimRng::new(1);
        emitter.emit(true, &mut host, &mut rng);
        emitter.emit(true, &mut host, &mut rng);
        assert_eq!(emitter.cached_cells(), before.as_slice());
    }

    #[test]
    fn set_radius_recaches() {
        let mut emitter = radial(1);
        let small = emitter.cached_cells().len();
        assert!(emitter.set_radius(3));
        assert!(emitter.cached_cells().len() > small);
        assert!(!emitter.set_radius(3)); // unchanged
    }

    #[test]
    fn simple_emitter_only_plays_effect() {
        let emitter = Emitter::new(EffecterId(2), EmitterKind::Simple, GridPosition::new(4, 4));
        let mut host = RecordingHost::new();
        let mut rng = SimRng::new(1);
        host.add_target(GridPosition::new(4, 4), TargetId(1));

        let outcome = emitter.emit(true, &mut host, &mut rng);
        assert_eq!(outcome, EmitOutcome::Emitted { targets_hit: 0 });
        assert_eq!(host.effects, vec![(EffecterId(2), GridPosition::new(4, 4))]);
        assert!(host.damage.is_empty());
    }
}
