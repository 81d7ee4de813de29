//! Real-time patch playback command.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Args;
use parche_config::{PatchDoc, build_engine};
use parche_core::AudioConfig;
use parche_io::{AudioBackend, BackendStreamConfig, CpalBackend, HostMailbox, RingBridge};
use parche_registry::ObjectRegistry;

#[derive(Args)]
pub struct PlayArgs {
    /// Patch file (.toml or .json)
    #[arg(value_name = "PATCH")]
    patch: PathBuf,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Frames per engine block
    #[arg(long, default_value = "64")]
    block_size: usize,

    /// Backend buffer size in frames
    #[arg(long, default_value = "256")]
    buffer_size: u32,

    /// Output device name fragment (uses the default device if omitted)
    #[arg(long)]
    device: Option<String>,
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let doc = PatchDoc::load(&args.patch)?;
    let registry = ObjectRegistry::new();
    let mut built = build_engine(&doc, &registry)?;

    built
        .engine
        .configure(AudioConfig::new(args.sample_rate as f32, args.block_size));

    let backend = CpalBackend::new();
    // Four backend buffers of slack between the engine thread and the
    // callback.
    let mut bridge = RingBridge::new(args.buffer_size as usize * 4, 2);
    let _stream = bridge.build_output_stream(
        &backend,
        &BackendStreamConfig {
            sample_rate: args.sample_rate,
            buffer_size: args.buffer_size,
            channels: 2,
            device_name: args.device,
        },
    )?;

    println!("Playing {}, press Ctrl+C to stop...", args.patch.display());

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    // The engine never leaves this thread: produce ahead of the callback,
    // deliver host notifications between blocks, sleep when the ring is
    // full.
    let mailbox = HostMailbox::new();
    while running.load(Ordering::SeqCst) {
        mailbox.pump(&mut built.engine);
        if !bridge.pump_block(&mut built.engine) {
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    Ok(())
}
