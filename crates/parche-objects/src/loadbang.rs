//! Load-time trigger.

use parche_core::{
    AUDIO_CONFIGURED, BuiltNode, Message, NodeBehavior, NodeCtx, NodeError, PortKind, PortLayout,
    Resource,
};

const TAG_CONFIGURED: u32 = 0;

/// `loadbang` — emits one bang when the engine-configured barrier
/// publishes.
///
/// Patches use it to kick off message chains at startup. Reconfiguration
/// does not re-fire it.
pub struct Loadbang {
    fired: bool,
}

impl Loadbang {
    /// A fresh load-time trigger.
    pub fn new() -> Self {
        Self { fired: false }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(vec![], vec![PortKind::Message]),
        }
    }
}

impl Default for Loadbang {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeBehavior for Loadbang {
    fn pushes_messages(&self) -> bool {
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
        if tag == TAG_CONFIGURED && matches!(resource, Resource::Audio(_)) && !self.fired {
            self.fired = true;
            ctx.emit(0, Message::bang());
        }
        Ok(())
    }
}
