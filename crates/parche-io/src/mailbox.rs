//! Host notification channel for asynchronous operations.
//!
//! The hot path never blocks on I/O: anything slow (file loads, stream
//! opens) runs elsewhere, identified by an opaque operation id. Completions
//! are posted to a [`HostMailbox`] from any thread and pumped into the
//! engine *between* blocks, where they resolve the matching pending
//! registration (see [`Engine::complete_io`](parche_core::Engine::complete_io)).

use std::sync::mpsc::{Receiver, Sender, channel};

use parche_core::{Engine, Message};

/// Cloneable, thread-safe sending half of a [`HostMailbox`].
#[derive(Clone)]
pub struct MailboxSender {
    tx: Sender<(u64, Message)>,
}

impl MailboxSender {
    /// Posts the completion of operation `op` with `payload`.
    ///
    /// Never blocks. Posting after the mailbox is gone is a no-op.
    pub fn post(&self, op: u64, payload: Message) {
        let _ = self.tx.send((op, payload));
    }
}

/// Receiving side, owned by the thread driving the engine.
pub struct HostMailbox {
    tx: Sender<(u64, Message)>,
    rx: Receiver<(u64, Message)>,
}

impl HostMailbox {
    /// Creates an empty mailbox.
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// A new sending handle for other threads.
    pub fn sender(&self) -> MailboxSender {
        MailboxSender {
            tx: self.tx.clone(),
        }
    }

    /// Drains every pending completion into the engine.
    ///
    /// Call between blocks. Returns the number of completions delivered.
    pub fn pump(&self, engine: &mut Engine) -> usize {
        let mut delivered = 0;
        while let Ok((op, payload)) = self.rx.try_recv() {
            engine.complete_io(op, payload);
            delivered += 1;
        }
        delivered
    }
}

impl Default for HostMailbox {
    fn default() -> Self {
        Self::new()
    }
}
