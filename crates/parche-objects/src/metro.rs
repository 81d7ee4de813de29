//! Periodic message trigger.

use parche_core::{
    AUDIO_CONFIGURED, AudioConfig, BuiltNode, Message, NodeBehavior, NodeCtx, NodeError, PortKind,
    PortLayout, Resource, TimerHandle, TokenPattern,
};

const TAG_CONFIGURED: u32 = 0;
const TAG_TICK: u32 = 1;

/// `metro` — emits a bang immediately on start, then every period.
///
/// Inlet 0: `bang`/`start` starts, `stop` stops. Inlet 1: float sets the
/// period in milliseconds. One message outlet. The period tick is a
/// self-rescheduling alarm, so a running metro always has exactly one
/// pending schedule; stopping cancels it.
///
/// Starting before the engine is configured is remembered: the first bang
/// fires as soon as the configured barrier publishes.
pub struct Metro {
    period_ms: f64,
    running: bool,
    pending: Option<TimerHandle>,
    config: Option<AudioConfig>,
}

impl Metro {
    /// A metro with the given period in milliseconds.
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            running: false,
            pending: None,
            config: None,
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

    /// Period in whole frames, never less than one.
    fn period_frames(&self, config: &AudioConfig) -> u64 {
        config.ms_to_frames(self.period_ms).max(1)
    }

    fn start(&mut self, ctx: &mut NodeCtx<'_>) {
        self.stop(ctx);
        self.running = true;
        let Some(config) = self.config else {
            // Not configured yet; the barrier waiter starts the ticking.
            return;
        };
        ctx.emit(0, Message::bang());
        self.pending = Some(ctx.schedule_in(self.period_frames(&config), TAG_TICK));
    }

    fn stop(&mut self, ctx: &mut NodeCtx<'_>) {
        self.running = false;
        if let Some(handle) = self.pending.take() {
            ctx.cancel(handle);
        }
    }
}

impl NodeBehavior for Metro {
    fn pushes_messages(&self) -> bool {
        true
    }

    fn declare(&mut self, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        ctx.wait_for(AUDIO_CONFIGURED, TAG_CONFIGURED);
        Ok(())
    }

    fn message(
        &mut self,
        inlet: usize,
        message: &Message,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        match inlet {
            0 => {
                if message.is_bang() || message.selector_is("start") {
                    self.start(ctx);
                } else if message.selector_is("stop") {
                    self.stop(ctx);
                }
            }
            1 => {
                if message.matches(&[TokenPattern::Float]) {
                    // Takes effect from the next tick on.
                    self.period_ms = message.float_at(0)?;
                }
            }
            _ => {}
        }
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
            self.config = Some(*config);
            if self.running && self.pending.is_none() {
                self.start(ctx);
            }
        }
        Ok(())
    }

    fn alarm(&mut self, tag: u32, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        if tag == TAG_TICK && self.running {
            ctx.emit(0, Message::bang());
            let config = self.config.ok_or_else(|| NodeError::other("tick before configure"))?;
            self.pending = Some(ctx.schedule_in(self.period_frames(&config), TAG_TICK));
        }
        Ok(())
    }
}
