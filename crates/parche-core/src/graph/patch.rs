//! Patch builder: node and edge mutation with connect-time validation.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::node::BuiltNode;

use super::edge::{Edge, EdgeId};
use super::node::{NodeData, NodeId, PortKind};

/// Errors from building a patch topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphError {
    /// The referenced node does not exist.
    NodeNotFound(NodeId),
    /// The outlet index is past the source node's layout.
    OutletOutOfRange {
        /// Source node.
        node: NodeId,
        /// Requested outlet index.
        outlet: usize,
        /// Number of outlets the node has.
        count: usize,
    },
    /// The inlet index is past the sink node's layout.
    InletOutOfRange {
        /// Sink node.
        node: NodeId,
        /// Requested inlet index.
        inlet: usize,
        /// Number of inlets the node has.
        count: usize,
    },
    /// A signal outlet can only feed a signal inlet.
    KindMismatch {
        /// Source node.
        from: NodeId,
        /// Sink node.
        to: NodeId,
    },
    /// This outlet/inlet pair is already connected.
    DuplicateEdge {
        /// Source node.
        from: NodeId,
        /// Sink node.
        to: NodeId,
    },
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::OutletOutOfRange {
                node,
                outlet,
                count,
            } => write!(f, "outlet {outlet} out of range for {node} ({count} outlets)"),
            Self::InletOutOfRange { node, inlet, count } => {
                write!(f, "inlet {inlet} out of range for {node} ({count} inlets)")
            }
            Self::KindMismatch { from, to } => {
                write!(f, "signal outlet of {from} cannot feed message inlet of {to}")
            }
            Self::DuplicateEdge { from, to } => {
                write!(f, "{from} and {to} are already connected on these ports")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

/// A patch under construction: boxes plus cables.
///
/// Topology is static for a run: build the whole graph, then hand it to
/// [`Engine::new`](crate::engine::Engine::new). Connections are validated
/// when made; cycles are allowed (signal feedback resolves to a one-block
/// delay at execution time).
#[derive(Default)]
pub struct Patch {
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) edges: Vec<Edge>,
}

impl Patch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a box to the patch. Returns the new node's ID.
    pub fn add_node(&mut self, node: BuiltNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(node.behavior, node.layout));
        #[cfg(feature = "tracing")]
        tracing::debug!("patch_add: node {id}");
        id
    }

    /// Connects `from`'s `outlet` to `to`'s `inlet`.
    ///
    /// Message outlets may feed either port kind (a message into a
    /// signal-capable inlet sets its held value); signal outlets require a
    /// signal inlet. Duplicate connections of the same port pair are
    /// rejected; self-connections are allowed (feedback).
    pub fn connect(
        &mut self,
        from: NodeId,
        outlet: usize,
        to: NodeId,
        inlet: usize,
    ) -> Result<EdgeId, GraphError> {
        let from_kind = {
            let node = self.node(from)?;
            *node
                .layout
                .outlets
                .get(outlet)
                .ok_or(GraphError::OutletOutOfRange {
                    node: from,
                    outlet,
                    count: node.layout.outlets.len(),
                })?
        };
        let to_kind = {
            let node = self.node(to)?;
            *node
                .layout
                .inlets
                .get(inlet)
                .ok_or(GraphError::InletOutOfRange {
                    node: to,
                    inlet,
                    count: node.layout.inlets.len(),
                })?
        };
        if from_kind == PortKind::Signal && to_kind == PortKind::Message {
            return Err(GraphError::KindMismatch { from, to });
        }
        if self.edges.iter().any(|e| {
            e.from == from && e.from_port == outlet && e.to == to && e.to_port == inlet
        }) {
            return Err(GraphError::DuplicateEdge { from, to });
        }

        let edge_id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge {
            from,
            from_port: outlet,
            to,
            to_port: inlet,
        });
        self.nodes[from.0 as usize].outgoing.push(edge_id);
        self.nodes[to.0 as usize].incoming.push(edge_id);
        #[cfg(feature = "tracing")]
        tracing::debug!("patch_connect: {from}[{outlet}] -> {to}[{inlet}]");
        Ok(edge_id)
    }

    /// Number of nodes in the patch.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges in the patch.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn node(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes
            .get(id.0 as usize)
            .ok_or(GraphError::NodeNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BuiltNode, NodeBehavior};
    use crate::graph::PortLayout;

    struct Dummy;
    impl NodeBehavior for Dummy {}

    fn boxed(inlets: Vec<PortKind>, outlets: Vec<PortKind>) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(Dummy),
            layout: PortLayout::new(inlets, outlets),
        }
    }

    #[test]
    fn connect_message_to_message() {
        let mut patch = Patch::new();
        let a = patch.add_node(boxed(vec![], vec![PortKind::Message]));
        let b = patch.add_node(boxed(vec![PortKind::Message], vec![]));
        patch.connect(a, 0, b, 0).unwrap();
        assert_eq!(patch.edge_count(), 1);
    }

    #[test]
    fn message_outlet_may_feed_signal_inlet() {
        let mut patch = Patch::new();
        let a = patch.add_node(boxed(vec![], vec![PortKind::Message]));
        let b = patch.add_node(boxed(vec![PortKind::Signal], vec![]));
        patch.connect(a, 0, b, 0).unwrap();
    }

    #[test]
    fn signal_outlet_rejects_message_inlet() {
        let mut patch = Patch::new();
        let a = patch.add_node(boxed(vec![], vec![PortKind::Signal]));
        let b = patch.add_node(boxed(vec![PortKind::Message], vec![]));
        assert_eq!(
            patch.connect(a, 0, b, 0),
            Err(GraphError::KindMismatch { from: a, to: b })
        );
    }

    #[test]
    fn port_ranges_checked() {
        let mut patch = Patch::new();
        let a = patch.add_node(boxed(vec![], vec![PortKind::Message]));
        let b = patch.add_node(boxed(vec![PortKind::Message], vec![]));
        assert!(matches!(
            patch.connect(a, 1, b, 0),
            Err(GraphError::OutletOutOfRange { outlet: 1, .. })
        ));
        assert!(matches!(
            patch.connect(a, 0, b, 3),
            Err(GraphError::InletOutOfRange { inlet: 3, .. })
        ));
    }

    #[test]
    fn duplicate_edges_rejected_but_fan_out_allowed() {
        let mut patch = Patch::new();
        let a = patch.add_node(boxed(vec![], vec![PortKind::Message]));
        let b = patch.add_node(boxed(vec![PortKind::Message, PortKind::Message], vec![]));
        patch.connect(a, 0, b, 0).unwrap();
        assert_eq!(
            patch.connect(a, 0, b, 0),
            Err(GraphError::DuplicateEdge { from: a, to: b })
        );
        // Same outlet to a different inlet is a new connection.
        patch.connect(a, 0, b, 1).unwrap();
    }

    #[test]
    fn signal_cycles_are_legal() {
        let mut patch = Patch::new();
        let a = patch.add_node(boxed(vec![PortKind::Signal], vec![PortKind::Signal]));
        let b = patch.add_node(boxed(vec![PortKind::Signal], vec![PortKind::Signal]));
        patch.connect(a, 0, b, 0).unwrap();
        patch.connect(b, 0, a, 0).unwrap();
        // Even a self-loop builds.
        patch.connect(a, 0, a, 0).unwrap();
    }
}
