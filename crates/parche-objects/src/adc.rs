//! Audio input source.

use parche_core::{BuiltNode, NodeBehavior, NodeError, PortKind, PortLayout, SignalCtx};

/// `adc~` — exposes the engine's input channels as signal outlets.
///
/// One signal outlet per channel. Outlets past the configured input channel
/// count produce silence.
pub struct Adc {
    channels: usize,
}

impl Adc {
    /// A source exposing `channels` input channels.
    pub fn new(channels: usize) -> Self {
        Self {
            channels: channels.max(1),
        }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        let outlets = vec![PortKind::Signal; self.channels];
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(vec![], outlets),
        }
    }
}

impl NodeBehavior for Adc {
    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        for ch in 0..self.channels {
            match ctx.audio_in.get(ch) {
                Some(input) => ctx.outs[ch].copy_from_slice(input),
                None => ctx.outs[ch].fill(0.0),
            }
        }
        Ok(())
    }
}
