//! Patch topology: nodes with typed ports and directed edges.
//!
//! A patch is a static graph built once before the engine starts: boxes are
//! added as [`BuiltNode`](crate::node::BuiltNode)s, cables as directed edges
//! between an outlet and an inlet. Ports are typed
//! ([`PortKind::Message`] or [`PortKind::Signal`]) and connections are
//! kind-checked when made: a signal outlet only feeds signal inlets, while a
//! message outlet may feed either kind (a message into a signal-capable
//! inlet sets its held value; see [`ColdInlet`](crate::node::ColdInlet)).
//!
//! Unlike an effect-routing DAG, *cycles are legal here*: signal feedback is
//! resolved by the engine's per-block compute stamp, where revisiting a node
//! within one block reads its previous block's output. Connecting therefore
//! performs no cycle check.
//!
//! Storage is arena-style: [`NodeId`] and [`EdgeId`] are indices into flat
//! vectors, assigned sequentially and stable for the life of the patch.

mod edge;
mod node;
mod patch;

pub use edge::EdgeId;
pub use node::{NodeId, PortKind, PortLayout};
pub use patch::{GraphError, Patch};

pub(crate) use edge::Edge;
pub(crate) use node::NodeData;
