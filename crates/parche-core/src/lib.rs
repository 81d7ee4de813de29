//! Parche Core - execution core for a patch-based audio dataflow language.
//!
//! A patch is a graph of boxes exchanging discrete control [`Message`]s and
//! continuous sample-rate signals. This crate executes such a graph per
//! audio block: it resolves signal dependency order with shared-upstream
//! deduplication, interleaves sample-accurate scheduled events with
//! immediate synchronous message propagation, and binds named dynamic
//! resources (delay lines, tables, buses) whose producer and consumer may be
//! wired in either order.
//!
//! # Core Abstractions
//!
//! ## Messages
//!
//! - [`Message`] / [`Token`] - immutable typed token sequences
//! - [`TokenPattern`] - positional shape matching with wildcards
//!
//! ## The Skeduler
//!
//! - [`Skeduler`] - named-resource wait/notify plus frame-indexed one-shot
//!   callbacks, unified in one registry
//! - [`Resource`] - the `Rc`-shared objects addressed by name
//!
//! ## Storage
//!
//! - [`DelayBuffer`] - fixed-capacity circular sample store with a
//!   monotonic absolute write cursor
//!
//! ## Graph
//!
//! - [`Patch`] - static topology builder (typed ports, many-to-many edges,
//!   cycles allowed)
//! - [`Engine`] - block-tick orchestration: endpoint pull, alarm drains,
//!   depth-first message cascades, per-node fault isolation
//!
//! ## Node contract
//!
//! - [`NodeBehavior`] - pluggable per-object-type behavior
//!   (declare / process / message handlers / routed callbacks)
//! - [`ColdInlet`] - the reusable hybrid signal-or-held-value inlet
//!
//! # Example
//!
//! ```rust,ignore
//! use parche_core::{AudioConfig, Engine, Patch};
//!
//! let mut patch = Patch::new();
//! let osc = patch.add_node(osc_tilde(440.0));
//! let dac = patch.add_node(dac_tilde(2));
//! patch.connect(osc, 0, dac, 0)?;
//!
//! let mut engine = Engine::new(patch);
//! engine.configure(AudioConfig::new(48000.0, 64));
//! let out = engine.produce_next_block(&[]);
//! ```
//!
//! # Design Principles
//!
//! - **Single-threaded, cooperative**: one block tick runs to completion
//!   before the next; handlers and `process` share one call stack
//! - **No blocking I/O in the hot path**: async host operations resolve via
//!   [`Engine::complete_io`] between blocks
//! - **Fault isolation**: one node's bug degrades that node to silence, the
//!   patch keeps running
//! - **No process-global registries**: the skeduler is owned by the engine
//!   and passed into every node context
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible with `alloc`. Disable the default
//! `std` feature:
//!
//! ```toml
//! [dependencies]
//! parche-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod delay;
pub mod engine;
pub mod graph;
pub mod message;
pub mod node;
pub mod skeduler;

// Re-export main types at crate root
pub use delay::{DelayBuffer, RangeError};
pub use engine::{AUDIO_CONFIGURED, AudioConfig, Engine};
pub use graph::{EdgeId, GraphError, NodeId, Patch, PortKind, PortLayout};
pub use message::{Message, MessageError, Token, TokenKind, TokenPattern};
pub use node::{BuiltNode, ColdInlet, Connectivity, NodeBehavior, NodeCtx, NodeError, SignalCtx};
pub use skeduler::{
    Alarm, DrainMark, Frame, MessageBus, Resource, Skeduler, TimerHandle, Waiter,
};
