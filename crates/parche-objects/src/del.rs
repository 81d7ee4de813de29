//! Delayed message trigger.

use parche_core::{
    BuiltNode, Message, NodeBehavior, NodeCtx, NodeError, PortKind, PortLayout, TimerHandle,
    TokenPattern,
};

const TAG_FIRE: u32 = 0;

/// `del` — emits a bang a fixed time after being triggered.
///
/// Inlet 0: bang arms (re-arming cancels the previous schedule), `stop`
/// disarms. Inlet 1: float sets the delay in milliseconds. One message
/// outlet.
pub struct Del {
    delay_ms: f64,
    pending: Option<TimerHandle>,
}

impl Del {
    /// A delayed trigger with the given delay in milliseconds.
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            pending: None,
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

impl NodeBehavior for Del {
    fn message(
        &mut self,
        inlet: usize,
        message: &Message,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        match inlet {
            0 => {
                if message.is_bang() {
                    if let Some(handle) = self.pending.take() {
                        ctx.cancel(handle);
                    }
                    let frames = match ctx.config() {
                        Some(config) => config.ms_to_frames(self.delay_ms),
                        // Delay is meaningless before the clock exists; fire
                        // on the next drain instead of silently dropping.
                        None => 0,
                    };
                    self.pending = Some(ctx.schedule_in(frames, TAG_FIRE));
                } else if message.selector_is("stop") {
                    if let Some(handle) = self.pending.take() {
                        ctx.cancel(handle);
                    }
                } else if message.matches(&[TokenPattern::Float]) {
                    // A float retriggers with a one-shot delay override.
                    self.delay_ms = message.float_at(0)?;
                    return self.message(0, &Message::bang(), ctx);
                }
            }
            1 => {
                if message.matches(&[TokenPattern::Float]) {
                    self.delay_ms = message.float_at(0)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn alarm(&mut self, tag: u32, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        if tag == TAG_FIRE {
            self.pending = None;
            ctx.emit(0, Message::bang());
        }
        Ok(())
    }
}
