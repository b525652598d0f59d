//! The rig: a signal network coupled to entities, capabilities, and
//! adapter bindings.
//!
//! [`SignalRig`] owns the capability registry (per-entity power, flicker,
//! and emitter state), the per-mediator binding lists, and the PRNG used by
//! damage rolls. Injecting a signal runs the core propagation pass and then
//! dispatches every mediator delivery through the registered bindings, in
//! registration order, on the same call stack.
//!
//! Device state serializes separately from the graph snapshot: capability
//! state and the PRNG persist by entity id, while bindings are rebuilt by
//! `activate_entity` on load, exactly like a fresh spawn.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use signalworks_core::fixed::Ticks;
use signalworks_core::graph::GraphError;
use signalworks_core::id::{EntityId, NodeId, PortId, SubscriptionId};
use signalworks_core::network::SignalNetwork;
use signalworks_core::node::NodeKind;
use signalworks_core::propagate::PropagationOutcome;
use signalworks_core::rng::SimRng;
use signalworks_core::signal::Signal;

use crate::adapter::{AdapterBinding, AdapterError, Subscription};
use crate::capability::CapabilityKind;
use crate::emitter::{EmitOutcome, Emitter};
use crate::flicker::FlickerSwitch;
use crate::host::WorldHost;
use crate::power::PowerSwitch;

// ---------------------------------------------------------------------------
// Errors and events
// ---------------------------------------------------------------------------

/// Errors from rig operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("unknown entity: {0:?}")]
    UnknownEntity(EntityId),
    #[error("entity already registered: {0:?}")]
    DuplicateEntity(EntityId),
    #[error("node {0:?} is not a mediator")]
    NotAMediator(NodeId),
    #[error("entity {0:?} has no emitter")]
    NoEmitter(EntityId),
    #[error("device state decode failed: {0}")]
    Deserialize(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Events emitted by the device layer. State-bearing events fire on
/// transitions only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    PowerSwitched {
        entity: EntityId,
        on: bool,
        tick: Ticks,
    },
    FlickerSet {
        entity: EntityId,
        switch_on: bool,
        tick: Ticks,
    },
    EmissionTriggered {
        entity: EntityId,
        targets_hit: usize,
        tick: Ticks,
    },
    AdapterBound {
        entity: EntityId,
        node: NodeId,
        subscription: SubscriptionId,
        kind: CapabilityKind,
        tick: Ticks,
    },
    AdapterReleased {
        node: NodeId,
        subscription: SubscriptionId,
        tick: Ticks,
    },
    /// A binding failed to apply; later bindings still ran.
    AdapterFailed {
        node: NodeId,
        subscription: SubscriptionId,
        reason: String,
        tick: Ticks,
    },
}

// ---------------------------------------------------------------------------
// Internal records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct EntityRecord {
    node: Option<NodeId>,
    /// Subscriptions auto-registered at activation, released at deactivation.
    subscriptions: Vec<SubscriptionId>,
}

#[derive(Debug, Clone, Copy)]
struct BindingEntry {
    id: SubscriptionId,
    binding: AdapterBinding,
}

/// Capability state persisted alongside (but separate from) the graph
/// snapshot. Bindings are intentionally absent: activation re-registers.
#[derive(Debug, Serialize, Deserialize)]
struct DeviceSaveState {
    powers: BTreeMap<EntityId, PowerSwitch>,
    flickers: BTreeMap<EntityId, FlickerSwitch>,
    emitters: BTreeMap<EntityId, Emitter>,
    rng: SimRng,
}

// ---------------------------------------------------------------------------
// SignalRig
// ---------------------------------------------------------------------------

/// A signal network plus the device layer riding on it.
#[derive(Debug)]
pub struct SignalRig {
    network: SignalNetwork,
    entities: BTreeMap<EntityId, EntityRecord>,
    powers: BTreeMap<EntityId, PowerSwitch>,
    flickers: BTreeMap<EntityId, FlickerSwitch>,
    emitters: BTreeMap<EntityId, Emitter>,
    bindings: BTreeMap<NodeId, Vec<BindingEntry>>,
    next_subscription: u64,
    rng: SimRng,
    events: Vec<DeviceEvent>,
}

impl SignalRig {
    /// A rig over a fresh network, seeding the damage-roll PRNG.
    pub fn new(seed: u64) -> Self {
        Self::over(SignalNetwork::new(), seed)
    }

    /// A rig over an existing network (e.g. one restored from a snapshot).
    pub fn over(network: SignalNetwork, seed: u64) -> Self {
        Self {
            network,
            entities: BTreeMap::new(),
            powers: BTreeMap::new(),
            flickers: BTreeMap::new(),
            emitters: BTreeMap::new(),
            bindings: BTreeMap::new(),
            next_subscription: 0,
            rng: SimRng::new(seed),
            events: Vec::new(),
        }
    }

    pub fn network(&self) -> &SignalNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut SignalNetwork {
        &mut self.network
    }

    // -- Entities and capabilities --

    /// Register a host entity, optionally owning one graph node.
    pub fn register_entity(
        &mut self,
        entity: EntityId,
        node: Option<NodeId>,
    ) -> Result<(), DeviceError> {
        if self.entities.contains_key(&entity) {
            return Err(DeviceError::DuplicateEntity(entity));
        }
        self.entities.insert(
            entity,
            EntityRecord {
                node,
                subscriptions: Vec::new(),
            },
        );
        Ok(())
    }

    /// The graph node an entity owns, if any.
    pub fn entity_node(&self, entity: EntityId) -> Option<NodeId> {
        self.entities.get(&entity).and_then(|r| r.node)
    }

    pub fn add_power(&mut self, entity: EntityId, power: PowerSwitch) -> Result<(), DeviceError> {
        self.ensure_registered(entity)?;
        self.powers.insert(entity, power);
        Ok(())
    }

    pub fn add_flicker(
        &mut self,
        entity: EntityId,
        flicker: FlickerSwitch,
    ) -> Result<(), DeviceError> {
        self.ensure_registered(entity)?;
        self.flickers.insert(entity, flicker);
        Ok(())
    }

    pub fn add_emitter(&mut self, entity: EntityId, emitter: Emitter) -> Result<(), DeviceError> {
        self.ensure_registered(entity)?;
        self.emitters.insert(entity, emitter);
        Ok(())
    }

    /// Destroy a capability mid-life. Existing bindings targeting it start
    /// failing (isolated, reported) until released.
    pub fn remove_power(&mut self, entity: EntityId) -> Option<PowerSwitch> {
        self.powers.remove(&entity)
    }

    pub fn remove_flicker(&mut self, entity: EntityId) -> Option<FlickerSwitch> {
        self.flickers.remove(&entity)
    }

    pub fn remove_emitter(&mut self, entity: EntityId) -> Option<Emitter> {
        self.emitters.remove(&entity)
    }

    pub fn power(&self, entity: EntityId) -> Option<&PowerSwitch> {
        self.powers.get(&entity)
    }

    pub fn power_mut(&mut self, entity: EntityId) -> Option<&mut PowerSwitch> {
        self.powers.get_mut(&entity)
    }

    pub fn flicker(&self, entity: EntityId) -> Option<&FlickerSwitch> {
        self.flickers.get(&entity)
    }

    pub fn flicker_mut(&mut self, entity: EntityId) -> Option<&mut FlickerSwitch> {
        self.flickers.get_mut(&entity)
    }

    pub fn emitter(&self, entity: EntityId) -> Option<&Emitter> {
        self.emitters.get(&entity)
    }

    pub fn emitter_mut(&mut self, entity: EntityId) -> Option<&mut Emitter> {
        self.emitters.get_mut(&entity)
    }

    /// Query the capability registry by kind.
    pub fn has_capability(&self, entity: EntityId, kind: CapabilityKind) -> bool {
        match kind {
            CapabilityKind::Power => self.powers.contains_key(&entity),
            CapabilityKind::Flicker => self.flickers.contains_key(&entity),
            CapabilityKind::Emitter => self.emitters.contains_key(&entity),
        }
    }

    fn ensure_registered(&self, entity: EntityId) -> Result<(), DeviceError> {
        if self.entities.contains_key(&entity) {
            Ok(())
        } else {
            Err(DeviceError::UnknownEntity(entity))
        }
    }

    // -- Subscriptions --

    /// Register a binding on a mediator. Bindings run in registration order.
    pub fn subscribe(
        &mut self,
        node: NodeId,
        binding: AdapterBinding,
    ) -> Result<Subscription, DeviceError> {
        if self.network.graph().kind(node) != Some(NodeKind::Mediator) {
            return Err(DeviceError::NotAMediator(node));
        }
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.bindings
            .entry(node)
            .or_default()
            .push(BindingEntry { id, binding });
        let tick = self.network.tick();
        self.events.push(DeviceEvent::AdapterBound {
            entity: binding.entity(),
            node,
            subscription: id,
            kind: binding.kind(),
            tick,
        });
        Ok(Subscription { id, node })
    }

    /// Remove a binding. Releasing twice is a no-op.
    pub fn release(&mut self, sub: Subscription) {
        let mut removed = false;
        if let Some(entries) = self.bindings.get_mut(&sub.node) {
            let before = entries.len();
            entries.retain(|e| e.id != sub.id);
            removed = entries.len() != before;
            if entries.is_empty() {
                self.bindings.remove(&sub.node);
            }
        }
        for record in self.entities.values_mut() {
            record.subscriptions.retain(|id| *id != sub.id);
        }
        if removed {
            let tick = self.network.tick();
            self.events.push(DeviceEvent::AdapterReleased {
                node: sub.node,
                subscription: sub.id,
                tick,
            });
        }
    }

    /// Number of bindings registered on a node.
    pub fn binding_count(&self, node: NodeId) -> usize {
        self.bindings.get(&node).map(Vec::len).unwrap_or(0)
    }

    // -- Lifecycle --

    /// Activate an entity: resolve its node's connections and register one
    /// binding per present capability, in capability order. Both a missing
    /// mediator and a missing capability are silent no-ops. Idempotent
    /// while the entity stays active.
    pub fn activate_entity(&mut self, entity: EntityId, restoring: bool) -> Result<(), DeviceError> {
        let record = self
            .entities
            .get(&entity)
            .ok_or(DeviceError::UnknownEntity(entity))?;
        let node = record.node;
        let already_bound = !record.subscriptions.is_empty();

        let Some(node) = node else { return Ok(()) };
        self.network.activate_node(node, restoring)?;

        if already_bound || self.network.graph().kind(node) != Some(NodeKind::Mediator) {
            return Ok(());
        }

        let mut subs = Vec::new();
        for kind in CapabilityKind::all() {
            if !self.has_capability(entity, kind) {
                continue;
            }
            let binding = match kind {
                CapabilityKind::Power => AdapterBinding::Power(entity),
                CapabilityKind::Flicker => AdapterBinding::Flicker(entity),
                CapabilityKind::Emitter => AdapterBinding::Emitter(entity),
            };
            subs.push(self.subscribe(node, binding)?.id);
        }
        if let Some(record) = self.entities.get_mut(&entity) {
            record.subscriptions = subs;
        }
        Ok(())
    }

    /// Deactivate an entity: release its subscriptions, then unlink its
    /// node. Safe on an entity that never activated.
    pub fn deactivate_entity(&mut self, entity: EntityId) -> Result<(), DeviceError> {
        let record = self
            .entities
            .get(&entity)
            .ok_or(DeviceError::UnknownEntity(entity))?;
        let node = record.node;
        let subs = record.subscriptions.clone();

        if let Some(node) = node {
            for id in subs {
                self.release(Subscription { id, node });
            }
            self.network.deactivate_node(node)?;
        }
        if let Some(record) = self.entities.get_mut(&entity) {
            record.subscriptions.clear();
        }
        Ok(())
    }

    // -- Gating and emission --

    /// Whether an entity's gates pass: any present power switch must be on,
    /// any present flicker switch must be on. Entities with neither gate
    /// are always active.
    pub fn is_active(&self, entity: EntityId) -> bool {
        if let Some(power) = self.powers.get(&entity) {
            if !power.is_on() {
                return false;
            }
        }
        if let Some(flicker) = self.flickers.get(&entity) {
            if !flicker.is_on() {
                return false;
            }
        }
        true
    }

    /// The manual emission command for an entity's emitter: a label plus
    /// the current availability, for the host UI. `None` without an emitter.
    pub fn emit_command(&self, entity: EntityId) -> Option<(&'static str, bool)> {
        self.emitters
            .get(&entity)
            .map(|_| ("trigger emission", self.is_active(entity)))
    }

    /// Fire an entity's emitter once. Emitting while gated off is a no-op
    /// outcome, not an error.
    pub fn trigger_emit(
        &mut self,
        entity: EntityId,
        host: &mut dyn WorldHost,
    ) -> Result<EmitOutcome, DeviceError> {
        if !self.entities.contains_key(&entity) {
            return Err(DeviceError::UnknownEntity(entity));
        }
        let active = self.is_active(entity);
        let rng = &mut self.rng;
        let emitter = self
            .emitters
            .get(&entity)
            .ok_or(DeviceError::NoEmitter(entity))?;
        let outcome = emitter.emit(active, host, rng);
        if let EmitOutcome::Emitted { targets_hit } = outcome {
            let tick = self.network.tick();
            self.events.push(DeviceEvent::EmissionTriggered {
                entity,
                targets_hit,
                tick,
            });
        }
        Ok(outcome)
    }

    // -- Injection and dispatch --

    /// Inject a signal at a port; mediator deliveries dispatch through
    /// their bindings before this returns.
    pub fn inject(
        &mut self,
        entry: PortId,
        signal: Signal,
        host: &mut dyn WorldHost,
    ) -> PropagationOutcome {
        let outcome = self.network.inject(entry, signal);
        self.dispatch(&outcome, signal, host);
        outcome
    }

    /// Inject at a node's first enabled In port.
    pub fn inject_at(
        &mut self,
        node: NodeId,
        signal: Signal,
        host: &mut dyn WorldHost,
    ) -> Option<PropagationOutcome> {
        let outcome = self.network.inject_at(node, signal)?;
        self.dispatch(&outcome, signal, host);
        Some(outcome)
    }

    fn dispatch(&mut self, outcome: &PropagationOutcome, signal: Signal, host: &mut dyn WorldHost) {
        for delivery in &outcome.deliveries {
            let Some(entries) = self.bindings.get(&delivery.node) else {
                continue;
            };
            let entries: Vec<BindingEntry> = entries.clone();
            for entry in entries {
                if let Err(err) = self.apply_binding(entry.binding, signal, host) {
                    let tick = self.network.tick();
                    self.events.push(DeviceEvent::AdapterFailed {
                        node: delivery.node,
                        subscription: entry.id,
                        reason: err.to_string(),
                        tick,
                    });
                }
            }
        }
    }

    /// The single routing function for all binding variants.
    fn apply_binding(
        &mut self,
        binding: AdapterBinding,
        signal: Signal,
        host: &mut dyn WorldHost,
    ) -> Result<(), AdapterError> {
        let tick = self.network.tick();
        match binding {
            AdapterBinding::Power(entity) => {
                let on = signal.as_bool();
                let sw = self
                    .powers
                    .get_mut(&entity)
                    .ok_or(AdapterError::CapabilityMissing(entity, CapabilityKind::Power))?;
                if sw.set_on(on) {
                    self.events
                        .push(DeviceEvent::PowerSwitched { entity, on, tick });
                }
                Ok(())
            }
            AdapterBinding::Flicker(entity) => {
                let on = signal.as_bool();
                let sw = self.flickers.get_mut(&entity).ok_or(
                    AdapterError::CapabilityMissing(entity, CapabilityKind::Flicker),
                )?;
                if sw.set_switch_on(on) {
                    self.events.push(DeviceEvent::FlickerSet {
                        entity,
                        switch_on: on,
                        tick,
                    });
                }
                Ok(())
            }
            AdapterBinding::Emitter(entity) => {
                if !signal.as_bool() {
                    return Ok(());
                }
                self.trigger_emit(entity, host).map(|_| ()).map_err(|_| {
                    AdapterError::CapabilityMissing(entity, CapabilityKind::Emitter)
                })
            }
        }
    }

    // -- Events --

    /// Take all buffered device events, oldest first.
    pub fn drain_events(&mut self) -> Vec<DeviceEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Persistence --

    /// Serialize capability state and the PRNG. Bindings and the entity
    /// table are rebuilt by registration + activation on load.
    pub fn device_state(&self) -> Vec<u8> {
        let state = DeviceSaveState {
            powers: self.powers.clone(),
            flickers: self.flickers.clone(),
            emitters: self.emitters.clone(),
            rng: self.rng.clone(),
        };
        bitcode::serialize(&state).unwrap_or_default()
    }

    /// Load previously serialized capability state. Call after registering
    /// entities and before `activate_entity(.., true)`.
    pub fn load_device_state(&mut self, data: &[u8]) -> Result<(), DeviceError> {
        let state: DeviceSaveState =
            bitcode::deserialize(data).map_err(|e| DeviceError::Deserialize(e.to_string()))?;
        self.powers = state.powers;
        self.flickers = state.flickers;
        self.emitters = state.emitters;
        self.rng = state.rng;
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
