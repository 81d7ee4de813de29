//! Named sample arrays and their readers/writers.

use std::cell::RefCell;
use std::rc::Rc;

use parche_core::{
    BuiltNode, Message, NodeBehavior, NodeCtx, NodeError, PortKind, PortLayout, Resource,
    SignalCtx, TokenPattern,
};

const TAG_TABLE: u32 = 0;

type TableRef = Rc<RefCell<Vec<f32>>>;

fn expect_table(name: &str, resource: &Resource) -> Result<TableRef, NodeError> {
    match resource {
        Resource::Table(table) => Ok(Rc::clone(table)),
        _ => Err(NodeError::ResourceKind {
            name: name.to_string(),
            expected: "table",
        }),
    }
}

/// `table` — owns a named sample array.
///
/// Publishes a zeroed array of the given size at declare time. Accepts
/// `[set index value]` messages to poke single samples and
/// `[const value]` to fill.
///
/// Out-of-range policy: **strict**. A `set` outside the array is a node
/// fault, not a clamp.
pub struct Table {
    name: String,
    size: usize,
    data: TableRef,
}

impl Table {
    /// A table named `name` holding `size` zeroed samples.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        let size = size.max(1);
        Self {
            name: name.into(),
            size,
            data: Rc::new(RefCell::new(vec![0.0; size])),
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

impl NodeBehavior for Table {
    fn declare(&mut self, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        ctx.publish(&self.name, Resource::Table(Rc::clone(&self.data)));
        Ok(())
    }

    fn message(
        &mut self,
        _inlet: usize,
        message: &Message,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if message.matches(&[TokenPattern::Symbol, TokenPattern::Float, TokenPattern::Float])
            && message.selector_is("set")
        {
            let index = message.float_at(1)?;
            let value = message.float_at(2)? as f32;
            let idx = index as i64;
            if idx < 0 || idx >= self.size as i64 {
                return Err(NodeError::other(format!(
                    "table '{}': set index {idx} out of range 0..{}",
                    self.name, self.size
                )));
            }
            self.data.borrow_mut()[idx as usize] = value;
        } else if message.matches(&[TokenPattern::Symbol, TokenPattern::Float])
            && message.selector_is("const")
        {
            let value = message.float_at(1)? as f32;
            self.data.borrow_mut().fill(value);
        }
        Ok(())
    }
}

/// `tabread` — message-driven table lookup.
///
/// A float index in emits the sample at that index. Until the named table
/// publishes, lookups are silently dropped (disconnected state).
///
/// Out-of-range policy: **strict**. An index outside the table is a node
/// fault: this reader raises where [`DelRead`](crate::DelRead) clamps.
pub struct TabRead {
    name: String,
    table: Option<TableRef>,
}

impl TabRead {
    /// A reader of the table named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
        }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(vec![PortKind::Message], vec![PortKind::Message]),
        }
    }
}

impl NodeBehavior for TabRead {
    fn declare(&mut self, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        ctx.wait_for(&self.name, TAG_TABLE);
        Ok(())
    }

    fn resource_ready(
        &mut self,
        tag: u32,
        resource: &Resource,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if tag == TAG_TABLE {
            self.table = Some(expect_table(&self.name, resource)?);
        }
        Ok(())
    }

    fn message(
        &mut self,
        _inlet: usize,
        message: &Message,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if !message.matches(&[TokenPattern::Float]) {
            return Ok(());
        }
        let Some(table) = &self.table else {
            return Ok(());
        };
        let index = message.float_at(0)? as i64;
        let table = table.borrow();
        if index < 0 || index >= table.len() as i64 {
            return Err(NodeError::other(format!(
                "tabread '{}': index {index} out of range 0..{}",
                self.name,
                table.len()
            )));
        }
        let value = f64::from(table[index as usize]);
        drop(table);
        ctx.emit(0, Message::float(value));
        Ok(())
    }
}

/// `tabwrite~` — captures a window of its signal input into a named table.
///
/// A bang arms the capture; recording then proceeds block by block from the
/// start of the table and disarms itself when the table is full. `stop`
/// disarms early. A pulling endpoint, so it records even with no
/// downstream consumer.
pub struct TabWrite {
    name: String,
    table: Option<TableRef>,
    write_pos: Option<usize>,
}

impl TabWrite {
    /// A writer into the table named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            write_pos: None,
        }
    }

    /// Wraps the behavior with its port layout.
    pub fn into_node(self) -> BuiltNode {
        BuiltNode {
            behavior: Box::new(self),
            layout: PortLayout::new(vec![PortKind::Signal], vec![]),
        }
    }
}

impl NodeBehavior for TabWrite {
    fn pulls_signal(&self) -> bool {
        true
    }

    fn declare(&mut self, ctx: &mut NodeCtx<'_>) -> Result<(), NodeError> {
        ctx.wait_for(&self.name, TAG_TABLE);
        Ok(())
    }

    fn resource_ready(
        &mut self,
        tag: u32,
        resource: &Resource,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if tag == TAG_TABLE {
            self.table = Some(expect_table(&self.name, resource)?);
        }
        Ok(())
    }

    fn message(
        &mut self,
        _inlet: usize,
        message: &Message,
        _ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        if message.is_bang() {
            self.write_pos = Some(0);
        } else if message.selector_is("stop") {
            self.write_pos = None;
        }
        Ok(())
    }

    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        let (Some(table), Some(pos)) = (&self.table, self.write_pos) else {
            return Ok(());
        };
        let mut table = table.borrow_mut();
        let len = table.len();
        let take = ctx.block_size().min(len - pos);
        table[pos..pos + take].copy_from_slice(&ctx.ins[0][..take]);
        drop(table);
        let next = pos + take;
        self.write_pos = if next >= len { None } else { Some(next) };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parche_core::{AudioConfig, Engine, Patch};

    #[test]
    fn tabread_strict_faults_on_out_of_range() {
        let mut patch = Patch::new();
        let table = patch.add_node(Table::new("wave", 4).into_node());
        let read = patch.add_node(TabRead::new("wave").into_node());

        let mut engine = Engine::new(patch);
        engine.configure(AudioConfig::new(48000.0, 8));

        engine.send(table, 0, &Message::from_tokens([
            parche_core::Token::Symbol("set".into()),
            parche_core::Token::Float(2.0),
            parche_core::Token::Float(0.5),
        ]));

        engine.send(read, 0, &Message::float(2.0));
        assert!(!engine.is_faulted(read));

        engine.send(read, 0, &Message::float(7.0));
        assert!(engine.is_faulted(read));
        // The producing table is untouched by the reader's fault.
        assert!(!engine.is_faulted(table));
    }

    #[test]
    fn table_set_strict_faults_on_out_of_range() {
        let mut patch = Patch::new();
        let table = patch.add_node(Table::new("wave", 4).into_node());
        let mut engine = Engine::new(patch);
        engine.send(table, 0, &Message::from_tokens([
            parche_core::Token::Symbol("set".into()),
            parche_core::Token::Float(9.0),
            parche_core::Token::Float(0.5),
        ]));
        assert!(engine.is_faulted(table));
    }

    #[test]
    fn tabwrite_captures_until_full_then_disarms() {
        use crate::sig::Sig;

        let mut patch = Patch::new();
        let table = patch.add_node(Table::new("cap", 6).into_node());
        let src = patch.add_node(Sig::new(2.0).into_node());
        let write = patch.add_node(TabWrite::new("cap").into_node());
        patch.connect(src, 0, write, 0).unwrap();

        let mut engine = Engine::new(patch);
        engine.configure(AudioConfig::new(1000.0, 4));
        engine.send(write, 0, &Message::bang());
        engine.produce_next_block(&[]);
        engine.produce_next_block(&[]);
        engine.produce_next_block(&[]);

        let Some(Resource::Table(data)) = engine.resource("cap") else {
            panic!("table not published");
        };
        // 6 slots filled across two blocks, then the writer disarmed.
        assert_eq!(*data.borrow(), vec![2.0; 6]);
        let _ = table;
    }
}
