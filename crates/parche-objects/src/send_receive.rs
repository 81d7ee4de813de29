//! Named message buses.
//!
//! `send` and `receive` move messages without cables. Both ends join the
//! same named bus through the skeduler, so creation order never matters;
//! subscription and unsubscription are explicit bus operations rather than
//! anything inherited from a shared base class.

use std::cell::RefCell;
use std::rc::Rc;

use parche_core::{
    BuiltNode, Message, MessageBus, NodeBehavior, NodeCtx, NodeError, PortKind, PortLayout,
};

/// `send` — forwards any message it receives to every `receive` of the same
/// name.
pub struct Send {
    name: String,
    bus: Option<Rc<RefCell<MessageBus>>>,
}

impl Send {
    /// A sender on the bus named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bus: None,
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

impl NodeBehavior for Send {
    fn declare(&mut self, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        self.bus = Some(ctx.join_bus(&self.name)?);
        Ok(())
    }

    fn message(
        &mut self,
        _inlet: usize,
        message: &Message,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if let Some(bus) = &self.bus {
            ctx.broadcast(bus, message);
        }
        Ok(())
    }
}

/// `receive` — re-emits everything sent on its named bus.
///
/// Subscribes its inlet to the bus at declare time; deliveries arrive as
/// ordinary messages and leave on the single outlet.
pub struct Receive {
    name: String,
}

impl Receive {
    /// A receiver on the bus named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(vec![PortKind::Message], vec![PortKind::Message]),
        }
    }
}

impl NodeBehavior for Receive {
    fn declare(&mut self, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        let bus = ctx.join_bus(&self.name)?;
        bus.borrow_mut().subscribe(ctx.node_id(), 0);
        Ok(())
    }

    fn message(
        &mut self,
        _inlet: usize,
        message: &Message,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        ctx.emit(0, message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parche_core::{Engine, NodeId, Patch};

    /// Collects every message it is handed.
    struct Collect(Rc<RefCell<Vec<Message>>>);

    impl NodeBehavior for Collect {
        fn message(
            &mut self,
            _inlet: usize,
            message: &Message,
            _ctx: &mut NodeCtx<'_>,
        ) -> Result<(), NodeError> {
            self.0.borrow_mut().push(message.clone());
            Ok(())
        }
    }

    fn collector(cell: &Rc<RefCell<Vec<Message>>>) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(Collect(Rc::clone(cell))),
            layout: PortLayout::new(vec![PortKind::Message], vec![]),
        }
    }

    fn wire(patch: &mut Patch, from: NodeId, to: NodeId) {
        patch.connect(from, 0, to, 0).unwrap();
    }

    #[test]
    fn bus_delivers_regardless_of_creation_order() {
        let got = Rc::new(RefCell::new(Vec::new()));
        let mut patch = Patch::new();
        // Receiver first, sender last.
        let rx = patch.add_node(Receive::new("ctl").into_node());
        let sink = patch.add_node(collector(&got));
        let tx = patch.add_node(Send::new("ctl").into_node());
        wire(&mut patch, rx, sink);

        let mut engine = Engine::new(patch);
        engine.send(tx, 0, &Message::floats(&[7.0]));

        assert_eq!(*got.borrow(), vec![Message::floats(&[7.0])]);
    }

    #[test]
    fn every_receiver_hears_in_subscription_order() {
        let got_a = Rc::new(RefCell::new(Vec::new()));
        let got_b = Rc::new(RefCell::new(Vec::new()));
        let mut patch = Patch::new();
        let tx = patch.add_node(Send::new("ctl").into_node());
        let rx_a = patch.add_node(Receive::new("ctl").into_node());
        let rx_b = patch.add_node(Receive::new("ctl").into_node());
        let sink_a = patch.add_node(collector(&got_a));
        let sink_b = patch.add_node(collector(&got_b));
        wire(&mut patch, rx_a, sink_a);
        wire(&mut patch, rx_b, sink_b);

        let mut engine = Engine::new(patch);
        engine.send(tx, 0, &Message::bang());

        assert_eq!(got_a.borrow().len(), 1);
        assert_eq!(got_b.borrow().len(), 1);
    }

    #[test]
    fn unsubscribed_bus_drops_messages() {
        let mut patch = Patch::new();
        let tx = patch.add_node(Send::new("void").into_node());
        let mut engine = Engine::new(patch);
        // No receivers: a valid disconnected state, not an error.
        engine.send(tx, 0, &Message::bang());
        assert!(!engine.is_faulted(tx));
    }
}
