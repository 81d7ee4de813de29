//! Float storage box.

use parche_core::{
    BuiltNode, Message, NodeBehavior, NodeCtx, NodeError, PortKind, PortLayout, TokenPattern,
};

/// `f` — stores a float; bang recalls it.
///
/// Inlet 0 is hot: a float stores and emits, a bang emits the stored value.
/// Inlet 1 is the cold setter: a float stores silently. The hot/cold pair is
/// what lets message feedback loops (the classic counter) terminate: the
/// cold write happens inside the cascade the hot read started.
pub struct FloatBox {
    value: f64,
}

impl FloatBox {
    /// A box holding `value`.
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(
                vec![PortKind::Message, PortKind::Message],
                vec![PortKind::Message],
            ),
        }
    }
}

impl NodeBehavior for FloatBox {
    fn message(
        &mut self,
        inlet: usize,
        message: &Message,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        match inlet {
            0 => {
                if message.is_bang() {
                    ctx.emit(0, Message::float(self.value));
                } else if message.matches(&[TokenPattern::Float]) {
                    self.value = message.float_at(0)?;
                    ctx.emit(0, Message::float(self.value));
                }
            }
            1 => {
                if message.matches(&[TokenPattern::Float]) {
                    self.value = message.float_at(0)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
