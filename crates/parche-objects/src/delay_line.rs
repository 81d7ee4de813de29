//! Named delay line writer and reader.
//!
//! `delwrite~` owns the storage and publishes it under its name;
//! `delread~` waits for that name. The skeduler makes the pairing
//! load-order independent: either box may be created first, and a reader
//! whose writer never appears stays silently disconnected.

use std::cell::RefCell;
use std::rc::Rc;

use parche_core::{
    AUDIO_CONFIGURED, BuiltNode, DelayBuffer, Message, NodeBehavior, NodeCtx, NodeError, PortKind,
    PortLayout, Resource, SignalCtx, TokenPattern,
};

const TAG_CONFIGURED: u32 = 0;
const TAG_BUFFER: u32 = 0;

/// `delwrite~` — records its signal input into a named delay line.
///
/// A pulling endpoint: it records every block whether or not anything
/// reads. The buffer is sized from the creation argument (maximum delay in
/// milliseconds) once the configured barrier publishes the sample rate, and
/// never smaller than one block.
pub struct DelWrite {
    name: String,
    max_ms: f64,
    buffer: Option<Rc<RefCell<DelayBuffer>>>,
}

impl DelWrite {
    /// A writer publishing under `name` with `max_ms` of history.
    pub fn new(name: impl Into<String>, max_ms: f64) -> Self {
        Self {
            name: name.into(),
            max_ms,
            buffer: None,
        }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(vec![PortKind::Signal], vec![]),
        }
    }
}

impl NodeBehavior for DelWrite {
    fn pulls_signal(&self) -> bool {
        true
    }

    fn declare(&mut self, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        ctx.wait_for(AUDIO_CONFIGURED, TAG_CONFIGURED);
        Ok(())
    }

    fn resource_ready(
        &mut self,
        tag: u32,
        resource: &Resource,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if tag == TAG_CONFIGURED
            && let Resource::Audio(config) = resource
        {
            let capacity = (config.ms_to_frames(self.max_ms) as usize).max(config.block_size);
            let buffer = Rc::new(RefCell::new(DelayBuffer::new(capacity)));
            self.buffer = Some(Rc::clone(&buffer));
            ctx.publish(&self.name, Resource::DelayLine(buffer));
        }
        Ok(())
    }

    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        if let Some(buffer) = &self.buffer {
            buffer.borrow_mut().append(&ctx.ins[0]);
        }
        Ok(())
    }
}

/// `delread~` — reads a named delay line at a fixed offset.
///
/// Inlet 0 takes a float message setting the delay in milliseconds. Until
/// the named line publishes, the reader outputs silence (a valid steady
/// state, not an error).
///
/// Out-of-range policy: **clamp**. A delay longer than the line's history
/// folds to the oldest retained audio; requests ahead of the writer fold
/// back to the newest. Pre-start positions read as silence.
pub struct DelRead {
    name: String,
    delay_ms: f64,
    buffer: Option<Rc<RefCell<DelayBuffer>>>,
}

impl DelRead {
    /// A reader of `name` delayed by `delay_ms` milliseconds.
    pub fn new(name: impl Into<String>, delay_ms: f64) -> Self {
        Self {
            name: name.into(),
            delay_ms,
            buffer: None,
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

impl NodeBehavior for DelRead {
    fn declare(&mut self, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        ctx.wait_for(&self.name, TAG_BUFFER);
        Ok(())
    }

    fn resource_ready(
        &mut self,
        tag: u32,
        resource: &Resource,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if tag == TAG_BUFFER {
            match resource {
                Resource::DelayLine(buffer) => self.buffer = Some(Rc::clone(buffer)),
                _ => {
                    return Err(NodeError::ResourceKind {
                        name: self.name.clone(),
                        expected: "delay line",
                    });
                }
            }
        }
        Ok(())
    }

    fn message(
        &mut self,
        inlet: usize,
        message: &Message,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if inlet == 0 && message.matches(&[TokenPattern::Float]) {
            self.delay_ms = message.float_at(0)?;
        }
        Ok(())
    }

    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        let out = &mut ctx.outs[0];
        let Some(buffer) = &self.buffer else {
            out.fill(0.0);
            return Ok(());
        };
        let buffer = buffer.borrow();
        let delay = ctx.config.ms_to_frames(self.delay_ms) as i64;
        let block = ctx.config.block_size as i64;
        // The newest full block the writer has finished lies one block
        // behind the cursor; the read window starts a further `delay` back.
        let position = buffer.cursor() - delay - block;
        buffer.read_clamped(out, position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sig::Sig;
    use parche_core::{AudioConfig, Engine, Patch};
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

    fn capture(cell: &Rc<RefCell<Vec<f32>>>) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(Capture(Rc::clone(cell))),
            layout: PortLayout::new(vec![PortKind::Signal], vec![]),
        }
    }

    /// Builds source → delwrite~ plus delread~ → sink, with the reader
    /// created before or after the writer.
    fn run_delay_patch(reader_first: bool) -> Vec<f32> {
        let captured = Rc::new(RefCell::new(Vec::new()));
        let mut patch = Patch::new();
        let (read, write) = if reader_first {
            let r = patch.add_node(DelRead::new("line", 8.0).into_node());
            let w = patch.add_node(DelWrite::new("line", 100.0).into_node());
            (r, w)
        } else {
            let w = patch.add_node(DelWrite::new("line", 100.0).into_node());
            let r = patch.add_node(DelRead::new("line", 8.0).into_node());
            (r, w)
        };
        let src = patch.add_node(Sig::new(1.0).into_node());
        let sink = patch.add_node(capture(&captured));
        patch.connect(src, 0, write, 0).unwrap();
        patch.connect(read, 0, sink, 0).unwrap();

        let mut engine = Engine::new(patch);
        // 1 kHz, 4-frame blocks: 8 ms = 8 frames = 2 blocks of delay.
        engine.configure(AudioConfig::new(1000.0, 4));
        for _ in 0..4 {
            engine.produce_next_block(&[]);
        }
        let result = captured.borrow().clone();
        result
    }

    #[test]
    fn reader_binds_in_either_creation_order() {
        let first = run_delay_patch(true);
        let second = run_delay_patch(false);
        assert_eq!(first, second);
    }

    #[test]
    fn delayed_signal_arrives_after_the_offset() {
        let captured = run_delay_patch(false);
        // The writer is pulled ahead of the reader each block, so the
        // constant 1.0 source shows up exactly 8 frames late.
        assert_eq!(&captured[..8], &[0.0; 8]);
        assert!(captured[8..].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn unpaired_reader_stays_silent() {
        let captured = Rc::new(RefCell::new(Vec::new()));
        let mut patch = Patch::new();
        let read = patch.add_node(DelRead::new("nowhere", 5.0).into_node());
        let sink = patch.add_node(capture(&captured));
        patch.connect(read, 0, sink, 0).unwrap();

        let mut engine = Engine::new(patch);
        engine.configure(AudioConfig::new(1000.0, 4));
        engine.produce_next_block(&[]);

        assert_eq!(*captured.borrow(), vec![0.0; 4]);
        assert!(!engine.is_faulted(read));
    }
}
