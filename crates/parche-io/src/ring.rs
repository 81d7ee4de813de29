//! Lock-free bridge between the engine's thread and the audio callback.
//!
//! The execution core is single-threaded and its resources are `Rc`-shared,
//! so an [`Engine`](parche_core::Engine) never crosses threads. Real-time
//! playback therefore splits in two: the thread that built the engine pushes
//! produced blocks into a ring buffer, and the audio callback pops
//! interleaved samples out, filling underruns with silence.

use parche_core::Engine;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::backend::{AudioBackend, BackendStreamConfig, StreamHandle};
use crate::{Error, Result};

/// Producer half plus stream construction for ring-buffered playback.
pub struct RingBridge {
    producer: Producer<f32>,
    consumer: Option<Consumer<f32>>,
    channels: usize,
}

impl RingBridge {
    /// A bridge buffering `frames` frames of `channels`-channel audio.
    ///
    /// Size the buffer to a few engine blocks: big enough to ride out
    /// scheduling jitter, small enough to keep latency audible-parameter
    /// changes snappy.
    pub fn new(frames: usize, channels: usize) -> Self {
        let (producer, consumer) = RingBuffer::new(frames * channels);
        Self {
            producer,
            consumer: Some(consumer),
            channels,
        }
    }

    /// Frames currently free in the buffer.
    pub fn free_frames(&self) -> usize {
        self.producer.slots() / self.channels
    }

    /// Produces one engine block and pushes it interleaved.
    ///
    /// Returns `false` without producing when the buffer lacks room for a
    /// full block; call again after the callback has drained some audio.
    pub fn pump_block(&mut self, engine: &mut Engine) -> bool {
        let Some(config) = engine.config() else {
            return false;
        };
        if self.free_frames() < config.block_size {
            return false;
        }
        let outputs = engine.produce_next_block(&[]);
        for frame in 0..config.block_size {
            for ch in 0..self.channels {
                let sample = outputs.get(ch).map_or(0.0, |c| c[frame]);
                // Room was checked above; a failed push would be a logic bug.
                let _ = self.producer.push(sample);
            }
        }
        true
    }

    /// Builds the output stream that drains this bridge.
    ///
    /// Call once; the consumer half moves into the audio callback. Underruns
    /// play silence rather than stale audio.
    pub fn build_output_stream(
        &mut self,
        backend: &dyn AudioBackend,
        config: &BackendStreamConfig,
    ) -> Result<StreamHandle> {
        let Some(mut consumer) = self.consumer.take() else {
            return Err(Error::Stream("output stream already built".into()));
        };
        backend.build_output_stream(
            config,
            Box::new(move |data: &mut [f32]| {
                for slot in data.iter_mut() {
                    *slot = consumer.pop().unwrap_or(0.0);
                }
            }),
            Box::new(|err| {
                tracing::error!("audio stream error: {err}");
            }),
        )
    }
}
