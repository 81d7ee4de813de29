//! End-to-end patch tests wiring several objects through a real engine.

use std::cell::RefCell;
use std::rc::Rc;

use parche_core::{
    AudioConfig, BuiltNode, Engine, Message, NodeBehavior, NodeCtx, NodeError, Patch, PortKind,
    PortLayout, SignalCtx,
};
use parche_objects::{Add, Dac, Del, FloatBox, Loadbang, Metro, Osc, Sig};

/// Signal endpoint capturing its summed inlet block.
struct Capture(Rc<RefCell<Vec<f32>>>);

impl NodeBehavior for Capture {
    fn pulls_signal(&self) -> bool {
        true
    }
    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        self.0.borrow_mut().extend_from_slice(&ctx.ins[0]);
        Ok(())
    }
}

fn capture(cell: &Rc<RefCell<Vec<f32>>>) -> BuiltNode {
    BuiltNode {
        behavior: Box::new(Capture(Rc::clone(cell))),
        layout: PortLayout::new(vec![PortKind::Signal], vec![]),
    }
}

/// Message sink collecting everything it is handed.
struct Collect(Rc<RefCell<Vec<Message>>>);

impl NodeBehavior for Collect {
    fn message(
        &mut self,
        _inlet: usize,
        message: &Message,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        self.0.borrow_mut().push(message.clone());
        Ok(())
    }
}

fn collector(cell: &Rc<RefCell<Vec<Message>>>) -> BuiltNode {
    BuiltNode {
        behavior: Box::new(Collect(Rc::clone(cell))),
        layout: PortLayout::new(vec![PortKind::Message], vec![]),
    }
}

/// loadbang → metro → f → + 1, looped back into f's cold inlet and held as
/// a constant signal. After N blocks of B frames with a metro period of R
/// frames (R dividing N·B), the held value is N·B / R.
#[test]
fn periodic_counter_held_as_signal() {
    let captured = Rc::new(RefCell::new(Vec::new()));
    let mut patch = Patch::new();
    let load = patch.add_node(Loadbang::new().into_node());
    // 16 ms at 1 kHz = every 16 frames.
    let metro = patch.add_node(Metro::new(16.0).into_node());
    let f = patch.add_node(FloatBox::new(0.0).into_node());
    let add = patch.add_node(Add::new(1.0).into_node());
    let sig = patch.add_node(Sig::new(0.0).into_node());
    let sink = patch.add_node(capture(&captured));

    patch.connect(load, 0, metro, 0).unwrap();
    patch.connect(metro, 0, f, 0).unwrap();
    patch.connect(f, 0, add, 0).unwrap();
    // The increment loops back into the cold inlet; the counter survives
    // because the cold write emits nothing.
    patch.connect(add, 0, f, 1).unwrap();
    patch.connect(add, 0, sig, 0).unwrap();
    patch.connect(sig, 0, sink, 0).unwrap();

    let mut engine = Engine::new(patch);
    engine.configure(AudioConfig::new(1000.0, 16));
    for _ in 0..5 {
        engine.produce_next_block(&[]);
    }

    // Bangs at frames 0, 16, 32, 48, 64: the staircase climbs one per block.
    let captured = captured.borrow();
    assert_eq!(captured.len(), 80);
    for block in 0..5 {
        let expected = (block + 1) as f32;
        assert!(
            captured[block * 16..(block + 1) * 16]
                .iter()
                .all(|&v| v == expected),
            "block {block} should hold {expected}"
        );
    }
    // floor(N*B / R) with N*B = 80, R = 16.
    assert_eq!(captured[79], 5.0);
}

#[test]
fn cold_frequency_inlet_message_vs_signal() {
    let reference: Vec<f32> = {
        // What osc~ produces at a constant 440 Hz from phase 0.
        let mut phase = 0.0f32;
        (0..64)
            .map(|_| {
                let v = libm::sinf(core::f32::consts::TAU * phase);
                phase += 440.0 / 48000.0;
                phase -= libm::floorf(phase);
                v
            })
            .collect()
    };

    // Unconnected cold inlet: the float message is audible.
    let captured = Rc::new(RefCell::new(Vec::new()));
    let mut patch = Patch::new();
    let osc = patch.add_node(Osc::new(0.0).into_node());
    let sink = patch.add_node(capture(&captured));
    patch.connect(osc, 0, sink, 0).unwrap();
    let mut engine = Engine::new(patch);
    engine.configure(AudioConfig::new(48000.0, 64));
    engine.send(osc, 0, &Message::float(440.0));
    engine.produce_next_block(&[]);
    assert_eq!(*captured.borrow(), reference);

    // Signal-connected: the live signal drives, the message is inaudible.
    let captured = Rc::new(RefCell::new(Vec::new()));
    let mut patch = Patch::new();
    let freq = patch.add_node(Sig::new(440.0).into_node());
    let osc = patch.add_node(Osc::new(0.0).into_node());
    let sink = patch.add_node(capture(&captured));
    patch.connect(freq, 0, osc, 0).unwrap();
    patch.connect(osc, 0, sink, 0).unwrap();
    let mut engine = Engine::new(patch);
    engine.configure(AudioConfig::new(48000.0, 64));
    engine.send(osc, 0, &Message::float(9999.0));
    engine.produce_next_block(&[]);
    assert_eq!(*captured.borrow(), reference);
}

#[test]
fn dac_sums_fan_in_per_channel() {
    let mut patch = Patch::new();
    let a = patch.add_node(Sig::new(0.25).into_node());
    let b = patch.add_node(Sig::new(0.5).into_node());
    let dac = patch.add_node(Dac::new(2).into_node());
    patch.connect(a, 0, dac, 0).unwrap();
    patch.connect(b, 0, dac, 0).unwrap();
    patch.connect(b, 0, dac, 1).unwrap();

    let mut engine = Engine::new(patch);
    engine.configure(AudioConfig::new(48000.0, 8));
    let out = engine.produce_next_block(&[]);

    assert!(out[0].iter().all(|&v| (v - 0.75).abs() < 1e-6));
    assert!(out[1].iter().all(|&v| (v - 0.5).abs() < 1e-6));
}

#[test]
fn metro_stop_halts_the_tick() {
    let got = Rc::new(RefCell::new(Vec::new()));
    let mut patch = Patch::new();
    let metro = patch.add_node(Metro::new(4.0).into_node());
    let sink = patch.add_node(collector(&got));
    patch.connect(metro, 0, sink, 0).unwrap();

    let mut engine = Engine::new(patch);
    engine.configure(AudioConfig::new(1000.0, 8));
    engine.send(metro, 0, &Message::bang());
    engine.produce_next_block(&[]);
    // Bangs at frames 0 and 4.
    assert_eq!(got.borrow().len(), 2);

    engine.send(metro, 0, &Message::symbol("stop"));
    engine.produce_next_block(&[]);
    engine.produce_next_block(&[]);
    assert_eq!(got.borrow().len(), 2);
}

#[test]
fn del_fires_once_and_stop_cancels() {
    let got = Rc::new(RefCell::new(Vec::new()));
    let mut patch = Patch::new();
    let del = patch.add_node(Del::new(8.0).into_node());
    let sink = patch.add_node(collector(&got));
    patch.connect(del, 0, sink, 0).unwrap();

    let mut engine = Engine::new(patch);
    engine.configure(AudioConfig::new(1000.0, 16));

    engine.send(del, 0, &Message::bang());
    engine.produce_next_block(&[]);
    assert_eq!(got.borrow().len(), 1);
    engine.produce_next_block(&[]);
    assert_eq!(got.borrow().len(), 1);

    // Re-arm, then cancel before the alarm lands.
    engine.send(del, 0, &Message::bang());
    engine.send(del, 0, &Message::symbol("stop"));
    engine.produce_next_block(&[]);
    assert_eq!(got.borrow().len(), 1);
}

#[test]
fn loadbang_fires_exactly_once() {
    let got = Rc::new(RefCell::new(Vec::new()));
    let mut patch = Patch::new();
    let load = patch.add_node(Loadbang::new().into_node());
    let sink = patch.add_node(collector(&got));
    patch.connect(load, 0, sink, 0).unwrap();

    let mut engine = Engine::new(patch);
    assert!(got.borrow().is_empty());
    engine.configure(AudioConfig::new(48000.0, 64));
    assert_eq!(got.borrow().len(), 1);

    // Reconfiguration republishes the barrier but must not re-fire.
    engine.configure(AudioConfig::new(44100.0, 64));
    assert_eq!(got.borrow().len(), 1);
}
