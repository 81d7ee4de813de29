//! Message-to-signal holder.

use parche_core::{
    BuiltNode, Message, NodeBehavior, NodeCtx, NodeError, PortKind, PortLayout, SignalCtx,
    TokenPattern,
};

/// `sig~` — holds the last float received and outputs it as a constant
/// signal.
pub struct Sig {
    value: f32,
}

impl Sig {
    /// A holder starting at `value`.
    pub fn new(value: f32) -> Self {
        Self { value }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(vec![PortKind::Message], vec![PortKind::Signal]),
        }
    }
}

impl NodeBehavior for Sig {
    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        ctx.outs[0].fill(self.value);
        Ok(())
    }

    fn message(
        &mut self,
        _inlet: usize,
        message: &Message,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if message.matches(&[TokenPattern::Float]) {
            self.value = message.float_at(0)? as f32;
        }
        Ok(())
    }
}
