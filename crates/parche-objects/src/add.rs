//! Message-domain addition.

use parche_core::{
    BuiltNode, Message, NodeBehavior, NodeCtx, NodeError, PortKind, PortLayout, TokenPattern,
};

/// `+` — adds a stored operand to incoming floats.
///
/// Inlet 0 is hot: a float emits `value + operand`, a bang re-emits the last
/// result. Inlet 1 is the cold operand setter.
pub struct Add {
    operand: f64,
    last_input: f64,
}

impl Add {
    /// An adder with initial right operand `operand`.
    pub fn new(operand: f64) -> Self {
        Self {
            operand,
            last_input: 0.0,
        }
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

impl NodeBehavior for Add {
    fn message(
        &mut self,
        inlet: usize,
        message: &Message,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        match inlet {
            0 => {
                if message.matches(&[TokenPattern::Float]) {
                    self.last_input = message.float_at(0)?;
                    ctx.emit(0, Message::float(self.last_input + self.operand));
                } else if message.is_bang() {
                    ctx.emit(0, Message::float(self.last_input + self.operand));
                }
            }
            1 => {
                if message.matches(&[TokenPattern::Float]) {
                    self.operand = message.float_at(0)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}
