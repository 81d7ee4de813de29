//! Graph node types: identifiers, port layouts, and per-node bookkeeping.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

use crate::node::NodeBehavior;
use crate::skeduler::Frame;

use super::edge::EdgeId;

/// Unique identifier for a node in a patch.
///
/// Node IDs are assigned sequentially and never reused within a patch
/// instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// What a port carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortKind {
    /// Discrete, irregularly timed token sequences.
    Message,
    /// One sample per frame; multiple sources sum on fan-in.
    Signal,
}

/// Ordered inlet and outlet kinds of a node.
///
/// A port's identifier is its position in the respective list. A
/// signal-capable inlet that also accepts messages when unconnected (a cold
/// inlet) is declared [`PortKind::Signal`] here; the message path to it stays
/// open either way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortLayout {
    /// Inlet kinds, in inlet order.
    pub inlets: Vec<PortKind>,
    /// Outlet kinds, in outlet order.
    pub outlets: Vec<PortKind>,
}

impl PortLayout {
    /// Builds a layout from inlet and outlet kinds.
    pub fn new(inlets: Vec<PortKind>, outlets: Vec<PortKind>) -> Self {
        Self { inlets, outlets }
    }
}

/// Sentinel stamp meaning "not yet computed in any block".
pub(crate) const NEVER_COMPUTED: Frame = Frame::MAX;

/// Internal bookkeeping for one node in the arena.
pub(crate) struct NodeData {
    pub behavior: Box<dyn NodeBehavior>,
    pub layout: PortLayout,
    /// Edges arriving at this node.
    pub incoming: Vec<EdgeId>,
    /// Edges leaving this node.
    pub outgoing: Vec<EdgeId>,
    /// Per signal inlet: upstream (node, outlet) signal sources, resolved
    /// once at engine build. Empty for message inlets.
    pub signal_sources: Vec<Vec<(NodeId, usize)>>,
    /// Per outlet: downstream (node, inlet) sinks in connection order.
    pub sinks: Vec<Vec<(NodeId, usize)>>,
    /// First frame of the block this node last computed, or
    /// [`NEVER_COMPUTED`]. Revisits within one block read the cached output.
    pub computed_at: Frame,
    /// Summed input block per inlet (empty vec for message inlets).
    pub in_signals: Vec<Vec<f32>>,
    /// Output block per outlet (empty vec for message outlets). Retained
    /// across blocks so feedback revisits read one-block-stale data.
    pub out_signals: Vec<Vec<f32>>,
    /// Set when the node's own logic errored; a faulted node is silent and
    /// ignores further deliveries, but the rest of the patch keeps running.
    pub faulted: bool,
}

impl NodeData {
    pub fn new(behavior: Box<dyn NodeBehavior>, layout: PortLayout) -> Self {
        let n_in = layout.inlets.len();
        let n_out = layout.outlets.len();
        Self {
            behavior,
            layout,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            signal_sources: Vec::new(),
            sinks: Vec::new(),
            computed_at: NEVER_COMPUTED,
            in_signals: (0..n_in).map(|_| Vec::new()).collect(),
            out_signals: (0..n_out).map(|_| Vec::new()).collect(),
            faulted: false,
        }
    }
}
