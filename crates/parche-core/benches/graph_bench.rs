//! Criterion benchmarks for the parche execution core.
//!
//! Measures engine overhead independently of DSP cost using trivial
//! pass-through nodes. Two axes:
//!
//! - **Pull** — `produce_next_block()` throughput over chain and diamond
//!   topologies at varying block sizes
//! - **Messages** — depth-first cascade dispatch through a relay chain
//!
//! Run with: `cargo bench -p parche-core -- engine/`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use parche_core::{
    AudioConfig, BuiltNode, Engine, Message, NodeBehavior, NodeCtx, NodeError, Patch, PortKind,
    PortLayout, SignalCtx,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

// ---------------------------------------------------------------------------
// Trivial nodes: isolate engine overhead from DSP cost
// ---------------------------------------------------------------------------

/// Constant signal source.
struct Source;

impl NodeBehavior for Source {
    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        ctx.outs[0].fill(0.5);
        Ok(())
    }
}

/// Signal pass-through.
struct Pass;

impl NodeBehavior for Pass {
    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        ctx.outs[0].copy_from_slice(&ctx.ins[0]);
        Ok(())
    }
}

/// Signal sink pulled each block.
struct Sink;

impl NodeBehavior for Sink {
    fn pulls_signal(&self) -> bool {
        true
    }
    fn process(&mut self, ctx: &mut SignalCtx<'_>) -> Result<(), NodeError> {
        black_box(ctx.ins[0].first());
        Ok(())
    }
}

/// Message relay forwarding every delivery.
struct Relay;

impl NodeBehavior for Relay {
    fn message(
        &mut self,
        _inlet: usize,
        _message: &Message,
        ctx: &mut NodeCtx<'_>,
    ) -> Result<(), NodeError> {
        ctx.emit(0, Message::bang());
        Ok(())
    }
}

/// Message terminator.
struct Swallow;

impl NodeBehavior for Swallow {}

fn source() -> BuiltNode {
    BuiltNode {
        behavior: Box::new(Source),
        layout: PortLayout::new(vec![], vec![PortKind::Signal]),
    }
}

fn pass() -> BuiltNode {
    BuiltNode {
        behavior: Box::new(Pass),
        layout: PortLayout::new(vec![PortKind::Signal], vec![PortKind::Signal]),
    }
}

fn sink() -> BuiltNode {
    BuiltNode {
        behavior: Box::new(Sink),
        layout: PortLayout::new(vec![PortKind::Signal], vec![]),
    }
}

// ---------------------------------------------------------------------------
// Topologies
// ---------------------------------------------------------------------------

/// Source → Pass × n → Sink.
fn chain_engine(length: usize, block_size: usize) -> Engine {
    let mut patch = Patch::new();
    let src = patch.add_node(source());
    let mut prev = src;
    for _ in 0..length {
        let node = patch.add_node(pass());
        patch.connect(prev, 0, node, 0).unwrap();
        prev = node;
    }
    let out = patch.add_node(sink());
    patch.connect(prev, 0, out, 0).unwrap();

    let mut engine = Engine::new(patch);
    engine.configure(AudioConfig::new(SAMPLE_RATE, block_size));
    engine
}

/// Source fanning out to `width` parallel passes, all summing at one sink.
fn diamond_engine(width: usize, block_size: usize) -> Engine {
    let mut patch = Patch::new();
    let src = patch.add_node(source());
    let out = patch.add_node(sink());
    for _ in 0..width {
        let node = patch.add_node(pass());
        patch.connect(src, 0, node, 0).unwrap();
        patch.connect(node, 0, out, 0).unwrap();
    }

    let mut engine = Engine::new(patch);
    engine.configure(AudioConfig::new(SAMPLE_RATE, block_size));
    engine
}

fn bench_pull(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/pull");
    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("chain16", block_size),
            &block_size,
            |b, &bs| {
                let mut engine = chain_engine(16, bs);
                b.iter(|| {
                    black_box(engine.produce_next_block(&[]).len());
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("diamond8", block_size),
            &block_size,
            |b, &bs| {
                let mut engine = diamond_engine(8, bs);
                b.iter(|| {
                    black_box(engine.produce_next_block(&[]).len());
                });
            },
        );
    }
    group.finish();
}

fn bench_messages(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/messages");
    for &length in &[4usize, 16, 64] {
        group.bench_with_input(
            BenchmarkId::new("relay_chain", length),
            &length,
            |b, &len| {
                let mut patch = Patch::new();
                let first = patch.add_node(BuiltNode {
                    behavior: Box::new(Relay),
                    layout: PortLayout::new(vec![PortKind::Message], vec![PortKind::Message]),
                });
                let mut prev = first;
                for _ in 1..len {
                    let node = patch.add_node(BuiltNode {
                        behavior: Box::new(Relay),
                        layout: PortLayout::new(
                            vec![PortKind::Message],
                            vec![PortKind::Message],
                        ),
                    });
                    patch.connect(prev, 0, node, 0).unwrap();
                    prev = node;
                }
                let last = patch.add_node(BuiltNode {
                    behavior: Box::new(Swallow),
                    layout: PortLayout::new(vec![PortKind::Message], vec![]),
                });
                patch.connect(prev, 0, last, 0).unwrap();

                let mut engine = Engine::new(patch);
                engine.configure(AudioConfig::new(SAMPLE_RATE, 64));
                let bang = Message::bang();
                b.iter(|| {
                    engine.send(first, 0, &bang);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_pull, bench_messages);
criterion_main!(benches);
