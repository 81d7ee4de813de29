//! Offline patch rendering command.

use std::path::PathBuf;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use parche_config::{PatchDoc, build_engine};
use parche_core::AudioConfig;
use parche_io::{HostMailbox, WavSpec, write_wav};
use parche_registry::ObjectRegistry;

#[derive(Args)]
pub struct RenderArgs {
    /// Patch file (.toml or .json)
    #[arg(value_name = "PATCH")]
    patch: PathBuf,

    /// Output WAV file
    #[arg(short, long, default_value = "out.wav")]
    output: PathBuf,

    /// Render length in seconds
    #[arg(short, long, default_value = "5.0")]
    seconds: f64,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Frames per block
    #[arg(long, default_value = "64")]
    block_size: usize,

    /// Output channels
    #[arg(long, default_value = "2")]
    channels: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let doc = PatchDoc::load(&args.patch)?;
    let registry = ObjectRegistry::new();
    let mut built = build_engine(&doc, &registry)?;

    println!(
        "Rendering {} ({} nodes, {} edges)...",
        args.patch.display(),
        built.engine.node_count(),
        built.engine.edge_count()
    );

    built.engine.configure(
        AudioConfig::new(args.sample_rate as f32, args.block_size)
            .with_channels(0, args.channels),
    );

    let total_frames = (args.seconds * f64::from(args.sample_rate)) as usize;
    let mailbox = HostMailbox::new();
    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); args.channels];

    let pb = ProgressBar::new(total_frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut produced = 0;
    while produced < total_frames {
        mailbox.pump(&mut built.engine);
        let outputs = built.engine.produce_next_block(&[]);
        for (dst, src) in channels.iter_mut().zip(outputs.iter()) {
            dst.extend_from_slice(src);
        }
        produced += args.block_size;
        pb.set_position(produced.min(total_frames) as u64);
    }
    pb.finish_with_message("done");

    write_wav(
        &args.output,
        &channels,
        WavSpec {
            channels: args.channels as u16,
            sample_rate: args.sample_rate,
            bits_per_sample: args.bit_depth,
        },
    )?;

    println!(
        "Wrote {} ({} frames, {} Hz)",
        args.output.display(),
        channels.first().map_or(0, |c| c.len()),
        args.sample_rate
    );
    Ok(())
}
