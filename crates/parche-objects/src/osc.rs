//! Sine and ramp oscillators.

use core::f32::consts::TAU;

use parche_core::{
    BuiltNode, ColdInlet, Connectivity, Message, NodeBehavior, NodeCtx, NodeError, PortKind,
    PortLayout, SignalCtx, TokenPattern,
};

/// `osc~` — sine oscillator.
///
/// Inlet 0 is the cold frequency inlet: a connected signal drives it per
/// sample, otherwise a float message sets the held frequency. Inlet 1 takes
/// a float message setting the phase (0..1). One signal outlet.
pub struct Osc {
    freq: ColdInlet,
    phase: f32,
}

impl Osc {
    /// An oscillator starting at `freq` Hz, phase 0.
    pub fn new(freq: f32) -> Self {
        Self {
            freq: ColdInlet::new(0, freq),
            phase: 0.0,
        }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(
                vec![PortKind::Signal, PortKind::Message],
                vec![PortKind::Signal],
            ),
        }
    }
}

impl NodeBehavior for Osc {
    fn bind(&mut self, conn: &Connectivity) {
        self.freq.bind(conn);
    }

    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        let sr = ctx.config.sample_rate;
        for i in 0..ctx.block_size() {
            let freq = self.freq.sample(ctx, i);
            ctx.outs[0][i] = libm::sinf(TAU * self.phase);
            self.phase += freq / sr;
            self.phase -= libm::floorf(self.phase);
        }
        Ok(())
    }

    fn message(
        &mut self,
        inlet: usize,
        message: &Message,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        match inlet {
            0 => {
                self.freq.accept(message)?;
            }
            1 => {
                if message.matches(&[TokenPattern::Float]) {
                    let phase = message.float_at(0)? as f32;
                    self.phase = phase - libm::floorf(phase);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// `phasor~` — sawtooth ramp from 0 to 1 at the given frequency.
///
/// Same inlets as [`Osc`]: cold frequency, message phase.
pub struct Phasor {
    freq: ColdInlet,
    phase: f32,
}

impl Phasor {
    /// A ramp oscillator starting at `freq` Hz, phase 0.
    pub fn new(freq: f32) -> Self {
        Self {
            freq: ColdInlet::new(0, freq),
            phase: 0.0,
        }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(
                vec![PortKind::Signal, PortKind::Message],
                vec![PortKind::Signal],
            ),
        }
    }
}

impl NodeBehavior for Phasor {
    fn bind(&mut self, conn: &Connectivity) {
        self.freq.bind(conn);
    }

    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        let sr = ctx.config.sample_rate;
        for i in 0..ctx.block_size() {
            let freq = self.freq.sample(ctx, i);
            ctx.outs[0][i] = self.phase;
            self.phase += freq / sr;
            self.phase -= libm::floorf(self.phase);
        }
        Ok(())
    }

    fn message(
        &mut self,
        inlet: usize,
        message: &Message,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        match inlet {
            0 => {
                self.freq.accept(message)?;
            }
            1 => {
                if message.matches(&[TokenPattern::Float]) {
                    let phase = message.float_at(0)? as f32;
                    self.phase = phase - libm::floorf(phase);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parche_core::{AudioConfig, Engine, Patch};

    /// Capture one outlet's block via a probing sink.
    struct Capture(std::rc::Rc<std::cell::RefCell<Vec<f32>>>);

    impl NodeBehavior for Capture {
        fn pulls_signal(&self) -> bool {
            true
        }
        fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
            self.0.borrow_mut().extend_from_slice(&ctx.ins[0]);
            Ok(())
        }
    }

    fn capture_node(cell: &std::rc::Rc<std::cell::RefCell<Vec<f32>>>) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(Capture(std::rc::Rc::clone(cell))),
            layout: PortLayout::new(vec![PortKind::Signal], vec![]),
        }
    }

    #[test]
    fn phasor_ramps_at_frequency() {
        let captured = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut patch = Patch::new();
        let phasor = patch.add_node(Phasor::new(100.0).into_node());
        let sink = patch.add_node(capture_node(&captured));
        patch.connect(phasor, 0, sink, 0).unwrap();

        let mut engine = Engine::new(patch);
        engine.configure(AudioConfig::new(1000.0, 10));
        engine.produce_next_block(&[]);

        // 100 Hz at 1 kHz: phase advances 0.1 per sample.
        let captured = captured.borrow();
        for (i, &v) in captured.iter().enumerate() {
            let expected = (i as f32 * 0.1).fract();
            assert!((v - expected).abs() < 1e-5, "sample {i}: {v} vs {expected}");
        }
    }

    #[test]
    fn osc_first_sample_is_sin_of_phase() {
        let captured = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut patch = Patch::new();
        let osc = patch.add_node(Osc::new(0.0).into_node());
        let sink = patch.add_node(capture_node(&captured));
        patch.connect(osc, 0, sink, 0).unwrap();

        let mut engine = Engine::new(patch);
        engine.configure(AudioConfig::new(48000.0, 4));
        engine.send(osc, 1, &Message::float(0.25));
        engine.produce_next_block(&[]);

        // Zero frequency holds the phase: sin(TAU * 0.25) = 1.
        for &v in captured.borrow().iter() {
            assert!((v - 1.0).abs() < 1e-6);
        }
    }
}
