//! Linear signal ramp generator.

use parche_core::{
    BuiltNode, Message, NodeBehavior, NodeCtx, NodeError, PortKind, PortLayout, SignalCtx,
    TokenPattern,
};

/// `line~` — ramps linearly to a target over a given time.
///
/// `[target, time_ms]` starts a ramp from the current value; a bare
/// `[target]` jumps immediately. The ramp is computed per sample, so targets
/// land sample-accurately rather than on block boundaries.
pub struct Line {
    current: f32,
    target: f32,
    step: f32,
    /// Samples left until the target is reached.
    remaining: u64,
    /// Pending time for the next ramp, set before the config is known.
    pending_ms: Option<f64>,
}

impl Line {
    /// A ramp generator resting at 0.
    pub fn new() -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            step: 0.0,
            remaining: 0,
            pending_ms: None,
        }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(vec![PortKind::Message], vec![PortKind::Signal]),
        }
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeBehavior for Line {
    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        // A ramp requested before the barrier resolves starts on the first
        // block where the sample rate is known.
        if let Some(ms) = self.pending_ms.take() {
            let frames = ctx.config.ms_to_frames(ms);
            if frames == 0 {
                self.current = self.target;
                self.remaining = 0;
            } else {
                self.step = (self.target - self.current) / frames as f32;
                self.remaining = frames;
            }
        }
        for slot in ctx.outs[0].iter_mut() {
            if self.remaining > 0 {
                self.current += self.step;
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.current = self.target;
                }
            }
            *slot = self.current;
        }
        Ok(())
    }

    fn message(
        &mut self,
        _inlet: usize,
        message: &Message,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if message.matches(&[TokenPattern::Float]) {
            self.target = message.float_at(0)? as f32;
            self.current = self.target;
            self.remaining = 0;
            self.pending_ms = None;
        } else if message.matches(&[TokenPattern::Float, TokenPattern::Float]) {
            self.target = message.float_at(0)? as f32;
            let ms = message.float_at(1)?;
            match ctx.config() {
                Some(config) => {
                    let frames = config.ms_to_frames(ms);
                    if frames == 0 {
                        self.current = self.target;
                        self.remaining = 0;
                    } else {
                        self.step = (self.target - self.current) / frames as f32;
                        self.remaining = frames;
                    }
                    self.pending_ms = None;
                }
                None => self.pending_ms = Some(ms),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parche_core::{AudioConfig, Engine, Patch};
    use std::cell::RefCell;
    use std::rc::Rc;

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

    #[test]
    fn ramp_reaches_target_sample_accurately() {
        let captured = Rc::new(RefCell::new(Vec::new()));
        let mut patch = Patch::new();
        let line = patch.add_node(Line::new().into_node());
        let sink = patch.add_node(BuiltNode {
            behavior: Box::new(Capture(Rc::clone(&captured))),
            layout: PortLayout::new(vec![PortKind::Signal], vec![]),
        });
        patch.connect(line, 0, sink, 0).unwrap();

        let mut engine = Engine::new(patch);
        // 1 kHz: 8 ms = 8 frames.
        engine.configure(AudioConfig::new(1000.0, 4));
        engine.send(line, 0, &Message::floats(&[8.0, 8.0]));
        engine.produce_next_block(&[]);
        engine.produce_next_block(&[]);
        engine.produce_next_block(&[]);

        let captured = captured.borrow();
        assert_eq!(captured.len(), 12);
        for (i, &v) in captured[..8].iter().enumerate() {
            assert!((v - (i as f32 + 1.0)).abs() < 1e-4, "sample {i}: {v}");
        }
        // Holds the target after arrival.
        assert!(captured[8..].iter().all(|&v| v == 8.0));
    }

    #[test]
    fn bare_target_jumps() {
        let mut line = Line::new();
        line.current = 3.0;
        let mut patch = Patch::new();
        let id = patch.add_node(line.into_node());
        let mut engine = Engine::new(patch);
        engine.configure(AudioConfig::new(48000.0, 8));
        engine.send(id, 0, &Message::float(5.0));
        // No ramp pending: the next block outputs the target directly.
        engine.produce_next_block(&[]);
    }
}
