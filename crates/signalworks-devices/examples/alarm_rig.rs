//! A small alarm installation: a tripwire line feeding a splitter that
//! routes to two mediators -- one powers a lamp, one fires a siren emitter.
//!
//! Run with: cargo run -p signalworks-devices --example alarm_rig

use signalworks_core::fixed::f64_to_fixed64;
use signalworks_core::grid::{Direction, GridPosition};
use signalworks_core::id::{DamageKindId, EffecterId, EntityId};
use signalworks_core::node::NodeKind;
use signalworks_core::signal::Signal;

use signalworks_devices::emitter::{Emitter, EmitterKind};
use signalworks_devices::flicker::FlickerSwitch;
use signalworks_devices::host::NullHost;
use signalworks_devices::power::PowerSwitch;
use signalworks_devices::rig::SignalRig;

fn main() {
    let mut rig = SignalRig::new(0xA1A3);
    let mut host = NullHost;

    // A three-cell tripwire run ending in a splitter.
    for x in 0..3 {
        rig.network_mut()
            .place(NodeKind::Transmitter, GridPosition::new(x, 0))
            .expect("free cell");
    }
    let splitter = rig
        .network_mut()
        .place(NodeKind::Splitter, GridPosition::new(3, 0))
        .expect("free cell");

    // North branch: lamp (power adapter). South branch: siren (emitter).
    let lamp_cell = GridPosition::new(3, -1);
    let siren_cell = GridPosition::new(3, 1);
    for cell in [lamp_cell, siren_cell] {
        rig.network_mut()
            .place(NodeKind::Transmitter, cell)
            .expect("free cell");
    }
    let lamp_node = rig
        .network_mut()
        .place(NodeKind::Mediator, lamp_cell)
        .expect("stacks on wire");
    let siren_node = rig
        .network_mut()
        .place(NodeKind::Mediator, siren_cell)
        .expect("stacks on wire");

    let lamp = EntityId(1);
    rig.register_entity(lamp, Some(lamp_node)).expect("fresh id");
    rig.add_power(lamp, PowerSwitch::new_off(f64_to_fixed64(15.0)))
        .expect("registered");
    rig.activate_entity(lamp, false).expect("activates");

    let siren = EntityId(2);
    rig.register_entity(siren, Some(siren_node)).expect("fresh id");
    rig.add_flicker(siren, FlickerSwitch::new(true)).expect("registered");
    rig.add_emitter(
        siren,
        Emitter::new(
            EffecterId(0),
            EmitterKind::RadialDamage {
                radius: 3,
                damage_min: 1,
                damage_max: 4,
                pen_min: f64_to_fixed64(0.0),
                pen_max: f64_to_fixed64(0.1),
                damage_kind: DamageKindId(0),
            },
            siren_cell,
        ),
    )
    .expect("registered");
    rig.activate_entity(siren, false).expect("activates");

    // Trip the wire at the west end.
    let tripwire = rig.network().graph().nodes_at(GridPosition::new(0, 0))[0];
    let outcome = rig
        .inject_at(tripwire, Signal::pulse(true), &mut host)
        .expect("wire has an entry port");
    println!(
        "tripped: {} deliveries, {} forwards",
        outcome.deliveries.len(),
        outcome.forwarded
    );
    println!("lamp on: {}", rig.power(lamp).expect("lamp power").is_on());

    // Cut the south branch and trip again: the siren stays quiet.
    let south = rig
        .network()
        .graph()
        .port_commands(splitter)
        .into_iter()
        .find(|c| c.direction == Direction::South)
        .expect("splitter has a south toggle");
    rig.network_mut().toggle_port(south.port).expect("port exists");

    rig.inject_at(tripwire, Signal::pulse(false), &mut host)
        .expect("wire has an entry port");
    println!("lamp on after reset: {}", rig.power(lamp).expect("lamp power").is_on());

    for event in rig.drain_events() {
        println!("device event: {event:?}");
    }
}
