//! Audio output sink.

use parche_core::{BuiltNode, NodeBehavior, NodeError, PortKind, PortLayout, SignalCtx};

/// `dac~` — sums its signal inlets into the engine's output channels.
///
/// One signal inlet per channel. A pulling endpoint: the engine walks the
/// signal graph upward from here every block. Inlets beyond the configured
/// output channel count are summed nowhere and simply discarded.
pub struct Dac {
    channels: usize,
}

impl Dac {
    /// A sink feeding `channels` output channels.
    pub fn new(channels: usize) -> Self {
        Self {
            channels: channels.max(1),
        }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        let inlets = vec![PortKind::Signal; self.channels];
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(inlets, vec![]),
        }
    }
}

impl NodeBehavior for Dac {
    fn pulls_signal(&self) -> bool {
        true
    }

    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        for ch in 0..self.channels.min(ctx.audio_out.len()) {
            for (out, &sample) in ctx.audio_out[ch].iter_mut().zip(ctx.ins[ch].iter()) {
                *out += sample;
            }
        }
        Ok(())
    }
}
