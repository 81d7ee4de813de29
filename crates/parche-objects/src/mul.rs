//! Signal multiplier with a cold gain inlet.

use parche_core::{
    BuiltNode, ColdInlet, Connectivity, Message, NodeBehavior, NodeCtx, NodeError, PortKind,
    PortLayout, SignalCtx,
};

/// `*~` — multiplies its signal input by the right inlet.
///
/// Inlet 1 is cold: a connected signal multiplies per sample, otherwise the
/// held float (from the creation argument or a message) applies.
pub struct Mul {
    gain: ColdInlet,
}

impl Mul {
    /// A multiplier with initial right operand `gain`.
    pub fn new(gain: f32) -> Self {
        Self {
            gain: ColdInlet::new(1, gain),
        }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(
                vec![PortKind::Signal, PortKind::Signal],
                vec![PortKind::Signal],
            ),
        }
    }
}

impl NodeBehavior for Mul {
    fn bind(&mut self, conn: &Connectivity) {
        self.gain.bind(conn);
    }

    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        for i in 0..ctx.block_size() {
            let gain = self.gain.sample(ctx, i);
            ctx.outs[0][i] = ctx.ins[0][i] * gain;
        }
        Ok(())
    }

    fn message(
        &mut self,
        inlet: usize,
        message: &Message,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if inlet == 1 {
            self.gain.accept(message)?;
        }
        Ok(())
    }
}
