//! The skeduler: named-resource wait/notify plus frame-indexed callbacks.
//!
//! Patches address some state by *name* rather than by cable: delay lines,
//! tables, message buses, and the engine-configured barrier. Producer and
//! consumer may be wired in either order, so binding works by wait/notify:
//! [`publish`](Skeduler::publish) stores a [`Resource`] and releases every
//! pending waiter; [`wait_for`](Skeduler::wait_for) on an already-published
//! name resolves immediately. A name nobody ever publishes is a valid steady
//! "disconnected" state, not an error.
//!
//! The same structure keys one-shot callbacks by absolute frame index:
//! [`schedule_at`](Skeduler::schedule_at) registers an [`Alarm`],
//! [`cancel`](Skeduler::cancel) removes a not-yet-fired one (idempotently),
//! and the engine drains everything due once per frame, in insertion order.
//!
//! The runtime is single-threaded and arena-based, so waiters and alarms are
//! routed *subscriptions* (a node id plus a node-chosen numeric tag) rather
//! than stored closures. The skeduler only decides *what* is due; the engine
//! performs the synchronous dispatch through the node contract
//! ([`resource_ready`](crate::node::NodeBehavior::resource_ready) /
//! [`alarm`](crate::node::NodeBehavior::alarm)).

#[cfg(not(feature = "std"))]
use alloc::{
    collections::BTreeMap,
    rc::Rc,
    string::{String, ToString},
    vec::Vec,
};
#[cfg(feature = "std")]
use std::{collections::BTreeMap, rc::Rc};

use core::cell::RefCell;

use crate::delay::DelayBuffer;
use crate::engine::AudioConfig;
use crate::graph::NodeId;
use crate::message::Message;

/// Absolute frame index since engine start.
pub type Frame = u64;

/// A pending named-resource subscription: delivery target plus a
/// node-chosen tag distinguishing multiple waits by one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Waiter {
    /// Node to notify.
    pub node: NodeId,
    /// Tag handed back to the node on delivery.
    pub tag: u32,
}

/// A scheduled one-shot callback subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alarm {
    /// Node to notify.
    pub node: NodeId,
    /// Tag handed back to the node on firing.
    pub tag: u32,
}

/// Handle for cancelling a scheduled alarm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Watermark taken at the start of a drain pass.
///
/// Entries scheduled after the mark join the running pass only when their
/// target equals the current frame; anything aimed earlier waits for the
/// next frame's drain.
#[derive(Clone, Copy, Debug)]
pub struct DrainMark(u64);

/// Subscribers of a named message bus.
///
/// Receivers subscribe an inlet at declare time; a sender broadcasts by
/// delivering to every subscribed inlet in subscription order.
#[derive(Debug, Default)]
pub struct MessageBus {
    /// Subscribed delivery points, in subscription order.
    pub subscribers: Vec<(NodeId, usize)>,
}

impl MessageBus {
    /// Adds a delivery point. Duplicate subscriptions are kept (each gets a
    /// delivery).
    pub fn subscribe(&mut self, node: NodeId, inlet: usize) {
        self.subscribers.push((node, inlet));
    }

    /// Removes every subscription of `node`. Idempotent.
    pub fn unsubscribe(&mut self, node: NodeId) {
        self.subscribers.retain(|&(n, _)| n != node);
    }
}

/// An engine-wide object addressed by name.
///
/// All variants that carry state are `Rc`-shared so that producer and
/// consumer alias the same underlying object.
#[derive(Clone, Debug)]
pub enum Resource {
    /// A named delay line.
    DelayLine(Rc<RefCell<DelayBuffer>>),
    /// A named sample array.
    Table(Rc<RefCell<Vec<f32>>>),
    /// A named message bus.
    Bus(Rc<RefCell<MessageBus>>),
    /// The engine-configured barrier payload.
    Audio(AudioConfig),
    /// Completion payload of an asynchronous host operation.
    Payload(Message),
}

struct NamedSlot {
    resource: Option<Resource>,
    waiters: Vec<Waiter>,
}

struct TimerEntry {
    seq: u64,
    frame: Frame,
    alarm: Alarm,
}

/// Named-resource registry and frame-indexed one-shot scheduler.
///
/// One instance is owned by the engine and passed explicitly into every node
/// context; never a process-global.
#[derive(Default)]
pub struct Skeduler {
    names: BTreeMap<String, NamedSlot>,
    timers: Vec<TimerEntry>,
    next_seq: u64,
}

impl Skeduler {
    /// Creates an empty skeduler.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Named resources ---

    /// Stores `resource` under `name` and takes out every pending waiter.
    ///
    /// The caller must dispatch the returned waiters immediately (same call
    /// stack) to preserve the synchronous notify contract. Republishing
    /// replaces the stored resource; consumers bound earlier keep their
    /// original shared reference.
    #[must_use = "returned waiters must be dispatched"]
    pub fn publish(&mut self, name: &str, resource: Resource) -> Vec<Waiter> {
        let slot = self.slot(name);
        slot.resource = Some(resource);
        core::mem::take(&mut slot.waiters)
    }

    /// Resolves `name` now if published, otherwise queues `waiter`.
    ///
    /// `Some` means the caller must dispatch the resource to the waiter
    /// immediately; `None` means the waiter is parked until a future
    /// [`publish`](Self::publish). Waiting N times on a published name
    /// yields N deliveries of the same shared resource.
    pub fn wait_for(&mut self, name: &str, waiter: Waiter) -> Option<Resource> {
        let slot = self.slot(name);
        match &slot.resource {
            Some(resource) => Some(resource.clone()),
            None => {
                slot.waiters.push(waiter);
                None
            }
        }
    }

    /// Drops every pending wait registered by `node`. Idempotent.
    pub fn forget_waits(&mut self, node: NodeId) {
        for slot in self.names.values_mut() {
            slot.waiters.retain(|w| w.node != node);
        }
    }

    /// The resource published under `name`, if any.
    pub fn resource(&self, name: &str) -> Option<Resource> {
        self.names
            .get(name)
            .and_then(|slot| slot.resource.clone())
    }

    fn slot(&mut self, name: &str) -> &mut NamedSlot {
        self.names
            .entry(name.to_string())
            .or_insert_with(|| NamedSlot {
                resource: None,
                waiters: Vec::new(),
            })
    }

    // --- Frame-indexed callbacks ---

    /// Registers `alarm` to fire when the drain reaches `frame`.
    ///
    /// Scheduling at or before the current frame is not an error: the alarm
    /// fires exactly once, on the next drain, never retroactively skipped
    /// and never twice.
    pub fn schedule_at(&mut self, frame: Frame, alarm: Alarm) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(TimerEntry { seq, frame, alarm });
        TimerHandle(seq)
    }

    /// Removes a not-yet-fired alarm. Safe no-op on fired or unknown handles.
    pub fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|entry| entry.seq != handle.0);
    }

    /// Number of alarms not yet fired or cancelled.
    pub fn pending_alarms(&self) -> usize {
        self.timers.len()
    }

    /// Marks the start of a drain pass at the current frame.
    pub fn begin_drain(&self) -> DrainMark {
        DrainMark(self.next_seq)
    }

    /// Takes the next due alarm of the pass, in insertion order.
    ///
    /// Due means: scheduled before the pass began with a target at or before
    /// `frame` (late entries fire now rather than being skipped), or
    /// scheduled *during* the pass with a target exactly at `frame`
    /// (self-rescheduling ticks are observed within the same pass).
    pub fn next_due(&mut self, frame: Frame, mark: DrainMark) -> Option<Alarm> {
        let idx = self.timers.iter().position(|entry| {
            if entry.seq < mark.0 {
                entry.frame <= frame
            } else {
                entry.frame == frame
            }
        })?;
        Some(self.timers.remove(idx).alarm)
    }

    /// Drops all registrations. Used at engine teardown.
    pub fn clear(&mut self) {
        self.names.clear();
        self.timers.clear();
    }
}
