//! The node contract: pluggable per-type behavior and its contexts.
//!
//! Every object type implements [`NodeBehavior`]. The engine owns all nodes
//! in an arena and calls into them through this trait:
//!
//! - [`bind`](NodeBehavior::bind) — once at build time, with the node's
//!   static connectivity, so hybrid inlets resolve their mode;
//! - [`declare`](NodeBehavior::declare) — once after the graph is sealed,
//!   for state init and named-resource publish/wait;
//! - [`process`](NodeBehavior::process) — per block, pure signal
//!   computation (the context offers no way to emit messages);
//! - [`message`](NodeBehavior::message) — per delivered message, per inlet;
//! - [`resource_ready`](NodeBehavior::resource_ready) /
//!   [`alarm`](NodeBehavior::alarm) — deliveries of resolved waits and fired
//!   schedules.
//!
//! Handlers do not call other nodes directly: everything outgoing (message
//! emissions, waiter notifications, bus broadcasts) is recorded on the
//! context and propagated depth-first by the engine after the handler
//! returns, before the original send completes. An unrecognized message
//! shape is a silent no-op; a typed read failing *after* a shape check is a
//! node bug and surfaces as [`NodeError`], which faults that node only.
//!
//! Shared inlet behaviors compose as plain values rather than inheriting:
//! [`ColdInlet`] covers the float-settable hybrid inlet; bus subscription
//! helpers live on [`NodeCtx`].

#[cfg(not(feature = "std"))]
use alloc::{
    boxed::Box,
    rc::Rc,
    string::{String, ToString},
    vec::Vec,
};
#[cfg(feature = "std")]
use std::rc::Rc;

use core::cell::RefCell;

use crate::delay::RangeError;
use crate::engine::AudioConfig;
use crate::graph::{NodeId, PortLayout};
use crate::message::{Message, MessageError, TokenPattern};
use crate::skeduler::{Alarm, Frame, MessageBus, Resource, Skeduler, TimerHandle, Waiter};

/// A fault in one node's own logic.
///
/// Faults never halt the engine: the offending node is logged and degraded
/// to silence/no-op while the rest of the patch keeps running.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeError {
    /// A typed token read failed after the shape should have been checked.
    Message(MessageError),
    /// A strict-policy buffer or table access left the valid range.
    Range(RangeError),
    /// A named resource resolved to an unexpected kind.
    ResourceKind {
        /// The resource name.
        name: String,
        /// What the node needed it to be.
        expected: &'static str,
    },
    /// Any other node-specific failure.
    Other(String),
}

impl NodeError {
    /// Builds an [`NodeError::Other`] from anything displayable.
    pub fn other(message: impl core::fmt::Display) -> Self {
        NodeError::Other(message.to_string())
    }
}

impl From<MessageError> for NodeError {
    fn from(err: MessageError) -> Self {
        NodeError::Message(err)
    }
}

impl From<RangeError> for NodeError {
    fn from(err: RangeError) -> Self {
        NodeError::Range(err)
    }
}

impl core::fmt::Display for NodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NodeError::Message(err) => write!(f, "message read: {err}"),
            NodeError::Range(err) => write!(f, "buffer range: {err}"),
            NodeError::ResourceKind { name, expected } => {
                write!(f, "resource '{name}' is not a {expected}")
            }
            NodeError::Other(msg) => f.write_str(msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NodeError {}

/// A behavior plus its port layout, ready to be added to a patch.
pub struct BuiltNode {
    /// The node's behavior implementation.
    pub behavior: Box<dyn NodeBehavior>,
    /// Inlet/outlet kinds.
    pub layout: PortLayout,
}

/// Static connectivity of one node, resolved at engine build.
#[derive(Clone, Debug, Default)]
pub struct Connectivity {
    pub(crate) signal_sources: Vec<bool>,
}

impl Connectivity {
    /// True if at least one *signal* edge arrives at `inlet`.
    pub fn has_signal_source(&self, inlet: usize) -> bool {
        self.signal_sources.get(inlet).copied().unwrap_or(false)
    }
}

/// Pluggable per-object-type behavior.
///
/// All methods default to no-ops so simple objects implement only what they
/// use.
pub trait NodeBehavior {
    /// True for signal sinks pulled unconditionally each block (audio
    /// output, stream/table writers).
    fn pulls_signal(&self) -> bool {
        false
    }

    /// True for unconditional message sources (load-time triggers).
    fn pushes_messages(&self) -> bool {
        false
    }

    /// Called once at build time with the node's static connectivity.
    ///
    /// Hybrid inlets resolve their mode here; see [`ColdInlet::bind`].
    fn bind(&mut self, conn: &Connectivity) {
        let _ = conn;
    }

    /// One-time state init after the graph is sealed.
    ///
    /// May publish and wait for named resources (including the
    /// engine-configured barrier) and schedule alarms.
    fn declare(&mut self, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        let _ = ctx;
        Ok(())
    }

    /// Per-block signal computation.
    ///
    /// Reads summed inlet blocks, writes outlet blocks. Must have no message
    /// side effects; [`SignalCtx`] offers none.
    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        let _ = ctx;
        Ok(())
    }

    /// Handles one message delivered to `inlet`.
    ///
    /// May mutate state and emit messages on any outlet via
    /// [`NodeCtx::emit`]. Unrecognized shapes are silent no-ops.
    fn message(
        &mut self,
        inlet: usize,
        message: &Message,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        let _ = (inlet, message, ctx);
        Ok(())
    }

    /// Delivery of a resolved named-resource wait registered with
    /// [`NodeCtx::wait_for`].
    fn resource_ready(
        &mut self,
        tag: u32,
        resource: &Resource,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        let _ = (tag, resource, ctx);
        Ok(())
    }

    /// Delivery of a fired alarm registered with [`NodeCtx::schedule_at`].
    fn alarm(&mut self, tag: u32, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        let _ = (tag, ctx);
        Ok(())
    }
}

/// Outgoing work recorded by a handler, applied by the engine after the
/// handler returns.
pub(crate) enum SideEffect {
    /// Emit a message from this node's outlet.
    Emit { outlet: usize, message: Message },
    /// Deliver a resource to a (possibly other) node's waiter.
    Notify { waiter: Waiter, resource: Resource },
    /// Deliver a message straight to a node's inlet (bus broadcast).
    SendTo {
        node: NodeId,
        inlet: usize,
        message: Message,
    },
}

/// Context handed to declare/message/resource/alarm handlers.
///
/// Owns no state itself: it borrows the engine's skeduler and records the
/// handler's outgoing work for depth-first propagation.
pub struct NodeCtx<'a> {
    pub(crate) node: NodeId,
    pub(crate) frame: Frame,
    pub(crate) config: Option<AudioConfig>,
    pub(crate) skeduler: &'a mut Skeduler,
    pub(crate) effects: &'a mut Vec<SideEffect>,
}

impl NodeCtx<'_> {
    /// This node's id.
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// Current absolute frame.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Audio configuration, once the engine-configured barrier has
    /// published. `None` during [`declare`](NodeBehavior::declare).
    pub fn config(&self) -> Option<AudioConfig> {
        self.config
    }

    /// Queues a message for emission on `outlet`.
    ///
    /// The engine propagates it depth-first after this handler returns and
    /// before the delivery that invoked it completes: each sink in
    /// connection order, each sink's cascade completing before the next.
    pub fn emit(&mut self, outlet: usize, message: Message) {
        self.effects.push(SideEffect::Emit { outlet, message });
    }

    /// Publishes `resource` under `name`, releasing all pending waiters.
    pub fn publish(&mut self, name: &str, resource: Resource) {
        for waiter in self.skeduler.publish(name, resource.clone()) {
            self.effects.push(SideEffect::Notify {
                waiter,
                resource: resource.clone(),
            });
        }
    }

    /// Waits for `name`; delivery arrives via
    /// [`resource_ready`](NodeBehavior::resource_ready) with `tag`:
    /// immediately (before the enclosing dispatch completes) if the name is
    /// already published, otherwise whenever it is.
    pub fn wait_for(&mut self, name: &str, tag: u32) {
        let waiter = Waiter {
            node: self.node,
            tag,
        };
        if let Some(resource) = self.skeduler.wait_for(name, waiter) {
            self.effects.push(SideEffect::Notify { waiter, resource });
        }
    }

    /// Cancels every pending wait this node has registered. Idempotent.
    pub fn forget_waits(&mut self) {
        self.skeduler.forget_waits(self.node);
    }

    /// Looks up or lazily creates the message bus named `name`.
    ///
    /// Either end (sender or receiver) may arrive first; both alias the
    /// same bus.
    pub fn join_bus(&mut self, name: &str) -> Result<Rc<RefCell<MessageBus>>, NodeError> {
        match self.skeduler.resource(name) {
            Some(Resource::Bus(bus)) => Ok(bus),
            Some(_) => Err(NodeError::ResourceKind {
                name: name.to_string(),
                expected: "bus",
            }),
            None => {
                let bus = Rc::new(RefCell::new(MessageBus::default()));
                self.publish(name, Resource::Bus(Rc::clone(&bus)));
                Ok(bus)
            }
        }
    }

    /// Queues `message` for every current subscriber of `bus`, in
    /// subscription order.
    pub fn broadcast(&mut self, bus: &Rc<RefCell<MessageBus>>, message: &Message) {
        for &(node, inlet) in &bus.borrow().subscribers {
            self.effects.push(SideEffect::SendTo {
                node,
                inlet,
                message: message.clone(),
            });
        }
    }

    /// Schedules this node's [`alarm`](NodeBehavior::alarm) at an absolute
    /// frame.
    pub fn schedule_at(&mut self, frame: Frame, tag: u32) -> TimerHandle {
        self.skeduler.schedule_at(
            frame,
            Alarm {
                node: self.node,
                tag,
            },
        )
    }

    /// Schedules this node's [`alarm`](NodeBehavior::alarm) `frames` ahead
    /// of now.
    pub fn schedule_in(&mut self, frames: Frame, tag: u32) -> TimerHandle {
        let target = self.frame.saturating_add(frames);
        self.schedule_at(target, tag)
    }

    /// Cancels a scheduled alarm. Safe on fired or unknown handles.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.skeduler.cancel(handle);
    }
}

/// Context handed to [`NodeBehavior::process`].
///
/// Plain borrowed buffers; object code indexes them directly. There is
/// deliberately no way to emit messages from here.
pub struct SignalCtx<'a> {
    /// Summed input block per inlet (empty for message inlets).
    pub ins: &'a [Vec<f32>],
    /// Output block per outlet (empty for message outlets).
    pub outs: &'a mut [Vec<f32>],
    /// Engine input channels for this block.
    pub audio_in: &'a [Vec<f32>],
    /// Engine output channels for this block; sinks accumulate into these.
    pub audio_out: &'a mut [Vec<f32>],
    /// Audio configuration.
    pub config: AudioConfig,
    /// First absolute frame of this block.
    pub frame: Frame,
}

impl SignalCtx<'_> {
    /// Frames in this block.
    pub fn block_size(&self) -> usize {
        self.config.block_size
    }
}

/// A hybrid ("cold") inlet: signal inlet when a signal source is connected,
/// message-settable held value otherwise.
///
/// The mode is resolved once, at build time, from static connectivity
/// ([`bind`](Self::bind)) and dispatched by a branch in
/// [`sample`](Self::sample), never by swapping methods at run time. In
/// signal mode a message still updates the held value, but it has no audible
/// effect until a build without the signal connection.
#[derive(Clone, Copy, Debug)]
pub struct ColdInlet {
    inlet: usize,
    held: f32,
    live: bool,
}

impl ColdInlet {
    /// A cold inlet at `inlet` holding `initial` until set or connected.
    pub fn new(inlet: usize, initial: f32) -> Self {
        Self {
            inlet,
            held: initial,
            live: false,
        }
    }

    /// Resolves the mode from static connectivity. Call from
    /// [`NodeBehavior::bind`].
    pub fn bind(&mut self, conn: &Connectivity) {
        self.live = conn.has_signal_source(self.inlet);
    }

    /// Sets the held value (always stored, audible only in message mode).
    pub fn set(&mut self, value: f32) {
        self.held = value;
    }

    /// The held value.
    pub fn held(&self) -> f32 {
        self.held
    }

    /// True when a signal source drives this inlet.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// The inlet's value at `offset` within the current block: the live
    /// per-sample signal, or the held value.
    #[inline]
    pub fn sample(&self, ctx: &SignalCtx<'_>, offset: usize) -> f32 {
        if self.live {
            ctx.ins[self.inlet][offset]
        } else {
            self.held
        }
    }

    /// The shared cold-float-setter handler: accepts a single-float message,
    /// stores it, and reports whether the message was consumed.
    pub fn accept(&mut self, message: &Message) -> Result<bool, MessageError> {
        if message.matches(&[TokenPattern::Float]) {
            self.set(message.float_at(0)? as f32);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_inlet_defaults_to_held_value() {
        let cold = ColdInlet::new(0, 440.0);
        assert!(!cold.is_live());
        assert_eq!(cold.held(), 440.0);
    }

    #[test]
    fn cold_inlet_goes_live_from_connectivity() {
        let mut cold = ColdInlet::new(1, 0.0);
        let conn = Connectivity {
            signal_sources: [false, true].to_vec(),
        };
        cold.bind(&conn);
        assert!(cold.is_live());

        // Messages still update the stored value in signal mode.
        cold.accept(&Message::float(3.0)).unwrap();
        assert_eq!(cold.held(), 3.0);
    }

    #[test]
    fn cold_inlet_accepts_only_single_floats() {
        let mut cold = ColdInlet::new(0, 1.0);
        assert_eq!(cold.accept(&Message::float(2.0)), Ok(true));
        assert_eq!(cold.held(), 2.0);
        assert_eq!(cold.accept(&Message::bang()), Ok(false));
        assert_eq!(cold.accept(&Message::floats(&[1.0, 2.0])), Ok(false));
        assert_eq!(cold.held(), 2.0);
    }
}
