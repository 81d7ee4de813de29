//! Block-tick orchestration: signal pull, alarm drains, message cascades.
//!
//! The [`Engine`] owns a sealed patch and executes it one block at a time.
//! Each [`produce_next_block`](Engine::produce_next_block) call:
//!
//! 1. stages the backend's input channels;
//! 2. walks every frame of the block, draining due alarms (each firing may
//!    spawn a synchronous message cascade);
//! 3. pulls every endpoint (signal sink or unconditional message source)
//!    depth-first through its signal inlets' upstream edges, computing an
//!    upstream node fully before its dependent.
//!
//! A per-node compute stamp deduplicates shared fan-in (a diamond computes
//! its shared ancestor exactly once per block) and terminates feedback
//! cycles: the stamp is written *before* recursing upstream, so a revisit
//! within the same block returns the node's retained, one-block-stale outlet
//! buffer. That stale read is the defined behavior of signal feedback, not an
//! error.
//!
//! Message delivery is immediate and depth-first: a handler's recorded
//! emissions are propagated after it returns and before the delivery that
//! invoked it completes; an outlet fanning out to sinks [A, B] finishes all
//! of A's cascading effects strictly before B runs. A depth guard drops
//! runaway cascades with a warning instead of overflowing the stack.
//!
//! Everything is single-threaded and cooperative: one block tick runs to
//! completion before the next starts, and no node ever observes a partially
//! updated block from another node. A fault in one node's logic never halts
//! the engine: the node is logged and degraded to silence.

#[cfg(not(feature = "std"))]
use alloc::{format, vec, vec::Vec};

use core::mem;

use crate::graph::{NodeId, Patch, PortKind};
use crate::message::Message;
use crate::node::{Connectivity, NodeBehavior, NodeCtx, NodeError, SideEffect, SignalCtx};
use crate::skeduler::{Alarm, Frame, Resource, Skeduler, Waiter};

/// Name of the engine-configured barrier resource.
///
/// Published with [`Resource::Audio`] once the driver-dependent sample rate
/// and block size are known; nodes that need either wait for it in
/// `declare`.
pub const AUDIO_CONFIGURED: &str = "audio:configured";

/// Message cascades deeper than this are dropped with a warning.
const MAX_CASCADE_DEPTH: usize = 128;

/// Driver-supplied audio parameters, unavailable at build time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Frames per block.
    pub block_size: usize,
    /// Engine input channel count.
    pub input_channels: usize,
    /// Engine output channel count.
    pub output_channels: usize,
}

impl AudioConfig {
    /// A config with no inputs and stereo output.
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        Self {
            sample_rate,
            block_size,
            input_channels: 0,
            output_channels: 2,
        }
    }

    /// Overrides the channel counts.
    pub fn with_channels(mut self, input: usize, output: usize) -> Self {
        self.input_channels = input;
        self.output_channels = output;
        self
    }

    /// Converts milliseconds to whole frames (rounded, floored at zero).
    pub fn ms_to_frames(&self, ms: f64) -> Frame {
        let frames = (ms / 1000.0) * f64::from(self.sample_rate);
        if frames <= 0.0 {
            0
        } else {
            libm::round(frames) as Frame
        }
    }
}

/// The execution core: a sealed patch plus its skeduler, driven per block.
pub struct Engine {
    nodes: Vec<crate::graph::NodeData>,
    edges: Vec<crate::graph::Edge>,
    skeduler: Skeduler,
    config: Option<AudioConfig>,
    /// Next frame to be produced; advances during the control walk.
    frame: Frame,
    /// First frame of the block currently being produced (compute stamp).
    block_start: Frame,
    endpoints: Vec<NodeId>,
    audio_in: Vec<Vec<f32>>,
    audio_out: Vec<Vec<f32>>,
    depth: usize,
}

impl Engine {
    /// Seals `patch` into a runnable engine.
    ///
    /// Resolves static connectivity (`bind`), then runs every node's
    /// `declare` in id order. Thanks to the skeduler's wait/notify, declare
    /// order never matters for named-resource binding.
    pub fn new(patch: Patch) -> Self {
        let Patch { mut nodes, edges } = patch;

        // Resolve per-node adjacency once; topology is static for the run.
        for idx in 0..nodes.len() {
            let incoming = nodes[idx].incoming.clone();
            let mut signal_sources = vec![Vec::new(); nodes[idx].layout.inlets.len()];
            for &eid in &incoming {
                let edge = &edges[eid.index() as usize];
                let from_kind =
                    nodes[edge.from.index() as usize].layout.outlets[edge.from_port];
                if from_kind == PortKind::Signal {
                    signal_sources[edge.to_port].push((edge.from, edge.from_port));
                }
            }
            nodes[idx].signal_sources = signal_sources;

            let outgoing = nodes[idx].outgoing.clone();
            let mut sinks = vec![Vec::new(); nodes[idx].layout.outlets.len()];
            for &eid in &outgoing {
                let edge = &edges[eid.index() as usize];
                sinks[edge.from_port].push((edge.to, edge.to_port));
            }
            nodes[idx].sinks = sinks;
        }

        for slot in &mut nodes {
            let conn = Connectivity {
                signal_sources: slot.signal_sources.iter().map(|s| !s.is_empty()).collect(),
            };
            slot.behavior.bind(&conn);
        }

        let endpoints: Vec<NodeId> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.behavior.pulls_signal() || n.behavior.pushes_messages())
            .map(|(i, _)| NodeId(i as u32))
            .collect();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "engine_build: {} nodes, {} edges, {} endpoints",
            nodes.len(),
            edges.len(),
            endpoints.len()
        );

        let mut engine = Self {
            nodes,
            edges,
            skeduler: Skeduler::new(),
            config: None,
            frame: 0,
            block_start: 0,
            endpoints,
            audio_in: Vec::new(),
            audio_out: Vec::new(),
            depth: 0,
        };
        for i in 0..engine.nodes.len() {
            let id = NodeId(i as u32);
            let effects = engine.run_handler(id, |behavior, ctx| behavior.declare(ctx));
            engine.apply_effects(id, effects);
        }
        engine
    }

    /// Applies the driver's audio parameters and publishes the
    /// [`AUDIO_CONFIGURED`] barrier, releasing every node waiting on it.
    ///
    /// Sizes all block buffers; may be called again on a device change.
    pub fn configure(&mut self, config: AudioConfig) {
        self.config = Some(config);
        let block = config.block_size;
        self.audio_in = (0..config.input_channels).map(|_| vec![0.0; block]).collect();
        self.audio_out = (0..config.output_channels)
            .map(|_| vec![0.0; block])
            .collect();
        for slot in &mut self.nodes {
            for (i, kind) in slot.layout.inlets.iter().enumerate() {
                if *kind == PortKind::Signal {
                    slot.in_signals[i] = vec![0.0; block];
                }
            }
            for (i, kind) in slot.layout.outlets.iter().enumerate() {
                if *kind == PortKind::Signal {
                    slot.out_signals[i] = vec![0.0; block];
                }
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "engine_configure: {} Hz, {} frames/block, {} in / {} out",
            config.sample_rate,
            config.block_size,
            config.input_channels,
            config.output_channels
        );
        let resource = Resource::Audio(config);
        let waiters = self.skeduler.publish(AUDIO_CONFIGURED, resource.clone());
        for waiter in waiters {
            self.dispatch_resource(waiter, &resource);
        }
    }

    /// Advances exactly one block: drains due alarms frame by frame, then
    /// pulls every endpoint. Returns the produced output channels.
    ///
    /// # Panics
    ///
    /// Panics if [`configure`](Self::configure) has not been called.
    pub fn produce_next_block(&mut self, inputs: &[&[f32]]) -> &[Vec<f32>] {
        let config = self
            .config
            .expect("configure() must be called before producing blocks");
        let block = config.block_size;

        for (ch, buf) in self.audio_in.iter_mut().enumerate() {
            let src = inputs.get(ch).copied().unwrap_or(&[]);
            for (i, slot) in buf.iter_mut().enumerate() {
                *slot = src.get(i).copied().unwrap_or(0.0);
            }
        }
        for buf in &mut self.audio_out {
            buf.fill(0.0);
        }

        self.block_start = self.frame;
        for _ in 0..block {
            let mark = self.skeduler.begin_drain();
            while let Some(alarm) = self.skeduler.next_due(self.frame, mark) {
                self.dispatch_alarm(alarm);
            }
            self.frame += 1;
        }

        for i in 0..self.endpoints.len() {
            let endpoint = self.endpoints[i];
            self.pull(endpoint);
        }

        &self.audio_out
    }

    /// Delivers `message` to a node's inlet, running its full synchronous
    /// cascade before returning.
    ///
    /// Hosts use this to inject control messages between blocks; it is also
    /// the path every internal delivery takes.
    pub fn send(&mut self, node: NodeId, inlet: usize, message: &Message) {
        self.dispatch_message(node, inlet, message);
    }

    /// Resolves a completed asynchronous host operation.
    ///
    /// Publishes the payload under `io:{op}`, releasing whichever node
    /// registered for it. Call between blocks, never from the audio
    /// callback's hot path.
    pub fn complete_io(&mut self, op: u64, payload: Message) {
        let name = format!("io:{op}");
        let resource = Resource::Payload(payload);
        let waiters = self.skeduler.publish(&name, resource.clone());
        #[cfg(feature = "tracing")]
        tracing::debug!("engine_io: op {op} complete, {} waiter(s)", waiters.len());
        for waiter in waiters {
            self.dispatch_resource(waiter, &resource);
        }
    }

    // --- Introspection ---

    /// Number of nodes in the sealed patch.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges in the sealed patch.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Current absolute frame (frames produced so far).
    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// The applied audio configuration, if any.
    pub fn config(&self) -> Option<AudioConfig> {
        self.config
    }

    /// The resource published under `name`, if any.
    pub fn resource(&self, name: &str) -> Option<Resource> {
        self.skeduler.resource(name)
    }

    /// True if `node` has faulted and been degraded to silence.
    pub fn is_faulted(&self, node: NodeId) -> bool {
        self.nodes
            .get(node.index() as usize)
            .is_some_and(|n| n.faulted)
    }

    /// The produced output channels of the last block.
    pub fn outputs(&self) -> &[Vec<f32>] {
        &self.audio_out
    }

    // --- Signal pull ---

    /// Depth-first pull with a per-block compute stamp.
    ///
    /// The stamp is written before recursing, so feedback revisits return
    /// the retained previous-block output instead of recursing forever.
    fn pull(&mut self, id: NodeId) {
        let stamp = self.block_start;
        let idx = id.index() as usize;
        if self.nodes[idx].computed_at == stamp {
            return;
        }
        self.nodes[idx].computed_at = stamp;
        if self.nodes[idx].faulted {
            return;
        }

        let sources = mem::take(&mut self.nodes[idx].signal_sources);
        for inlet_sources in &sources {
            for &(src, _) in inlet_sources {
                self.pull(src);
            }
        }
        for (inlet, inlet_sources) in sources.iter().enumerate() {
            if inlet_sources.is_empty() {
                continue;
            }
            let mut acc = mem::take(&mut self.nodes[idx].in_signals[inlet]);
            acc.fill(0.0);
            for &(src, port) in inlet_sources {
                let out = &self.nodes[src.index() as usize].out_signals[port];
                for (a, &s) in acc.iter_mut().zip(out.iter()) {
                    *a += s;
                }
            }
            self.nodes[idx].in_signals[inlet] = acc;
        }
        self.nodes[idx].signal_sources = sources;

        let Some(config) = self.config else { return };
        let frame = self.block_start;
        let result = {
            let Self {
                nodes,
                audio_in,
                audio_out,
                ..
            } = self;
            let slot = &mut nodes[idx];
            let mut ctx = SignalCtx {
                ins: &slot.in_signals,
                outs: &mut slot.out_signals,
                audio_in,
                audio_out,
                config,
                frame,
            };
            slot.behavior.process(&mut ctx)
        };
        if let Err(err) = result {
            self.fault(id, &err);
        }
    }

    // --- Message dispatch ---

    fn dispatch_message(&mut self, node: NodeId, inlet: usize, message: &Message) {
        if self.depth >= MAX_CASCADE_DEPTH {
            #[cfg(feature = "tracing")]
            tracing::warn!("message cascade exceeded depth {MAX_CASCADE_DEPTH} at {node}; dropping");
            return;
        }
        self.depth += 1;
        let effects = self.run_handler(node, |behavior, ctx| behavior.message(inlet, message, ctx));
        self.apply_effects(node, effects);
        self.depth -= 1;
    }

    fn dispatch_resource(&mut self, waiter: Waiter, resource: &Resource) {
        let effects = self.run_handler(waiter.node, |behavior, ctx| {
            behavior.resource_ready(waiter.tag, resource, ctx)
        });
        self.apply_effects(waiter.node, effects);
    }

    fn dispatch_alarm(&mut self, alarm: Alarm) {
        let effects = self.run_handler(alarm.node, |behavior, ctx| behavior.alarm(alarm.tag, ctx));
        self.apply_effects(alarm.node, effects);
    }

    /// Runs one handler with a fresh context, returning its recorded
    /// effects. A faulted or missing node yields nothing; a handler error
    /// faults the node, keeping only its notify commitments (resources it
    /// published are already stored, so their waiters must still hear).
    fn run_handler<F>(&mut self, node: NodeId, f: F) -> Vec<SideEffect>
    where
        F: FnOnce(&mut dyn NodeBehavior, &mut NodeCtx<'_>) -> Result<(), NodeError>,
    {
        let idx = node.index() as usize;
        if idx >= self.nodes.len() {
            return Vec::new();
        }
        let frame = self.frame;
        let config = self.config;
        let mut effects = Vec::new();
        let result = {
            let Self {
                nodes, skeduler, ..
            } = self;
            let slot = &mut nodes[idx];
            if slot.faulted {
                return Vec::new();
            }
            let mut ctx = NodeCtx {
                node,
                frame,
                config,
                skeduler,
                effects: &mut effects,
            };
            f(slot.behavior.as_mut(), &mut ctx)
        };
        if let Err(err) = result {
            self.fault(node, &err);
            effects.retain(|fx| matches!(fx, SideEffect::Notify { .. }));
        }
        effects
    }

    /// Propagates recorded effects depth-first, in the order the handler
    /// recorded them.
    fn apply_effects(&mut self, source: NodeId, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                SideEffect::Emit { outlet, message } => self.fan_out(source, outlet, &message),
                SideEffect::Notify { waiter, resource } => {
                    self.dispatch_resource(waiter, &resource);
                }
                SideEffect::SendTo {
                    node,
                    inlet,
                    message,
                } => self.dispatch_message(node, inlet, &message),
            }
        }
    }

    /// Delivers `message` to every sink of `outlet`, in connection order.
    /// Sink A's entire cascade completes before sink B is invoked.
    fn fan_out(&mut self, source: NodeId, outlet: usize, message: &Message) {
        let slot = &self.nodes[source.index() as usize];
        debug_assert!(
            slot.layout.outlets.get(outlet) == Some(&PortKind::Message),
            "emit on a non-message outlet"
        );
        let sinks = slot.sinks.get(outlet).cloned().unwrap_or_default();
        for (node, inlet) in sinks {
            self.dispatch_message(node, inlet, message);
        }
    }

    fn fault(&mut self, node: NodeId, err: &NodeError) {
        #[cfg(feature = "tracing")]
        tracing::warn!("node {node} faulted, degrading to silence: {err}");
        #[cfg(not(feature = "tracing"))]
        let _ = err;
        let slot = &mut self.nodes[node.index() as usize];
        slot.faulted = true;
        for buf in &mut slot.out_signals {
            buf.fill(0.0);
        }
        for buf in &mut slot.in_signals {
            buf.fill(0.0);
        }
    }
}
