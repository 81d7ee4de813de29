//! Console/log message sink.

use parche_core::{BuiltNode, Message, NodeBehavior, NodeCtx, NodeError, PortKind, PortLayout};

/// `print` — logs every message it receives.
///
/// Output goes through `tracing` at info level under the
/// `parche::print` target, so hosts route or silence it like any other log.
pub struct Print {
    prefix: String,
}

impl Print {
    /// A printer tagging its output with `prefix` (may be empty).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(vec![PortKind::Message], vec![]),
        }
    }
}

impl NodeBehavior for Print {
    fn message(
        &mut self,
        _inlet: usize,
        message: &Message,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if self.prefix.is_empty() {
            tracing::info!(target: "parche::print", "{message}");
        } else {
            tracing::info!(target: "parche::print", "{}: {message}", self.prefix);
        }
        Ok(())
    }
}
