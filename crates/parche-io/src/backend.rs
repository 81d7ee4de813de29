//! Pluggable audio backend abstraction.
//!
//! [`AudioBackend`] decouples the runtime from any specific platform audio
//! API. The default implementation wraps cpal
//! ([`CpalBackend`](crate::CpalBackend)); alternative backends (host-provided
//! plugin buffers, WebAudio worklets, a deterministic mock for CI) implement
//! the same trait.
//!
//! The trait uses boxed closures for callbacks rather than generic
//! parameters, keeping it object-safe for runtime backend selection.
//! Streams are returned as [`StreamHandle`], a type-erased RAII wrapper
//! that stops playback on drop, so platform-specific types never leak into
//! application code.

use crate::{AudioDevice, Result};

/// Configuration for building an audio stream.
#[derive(Debug, Clone)]
pub struct BackendStreamConfig {
    /// Requested sample rate in Hz.
    pub sample_rate: u32,
    /// Preferred buffer size in frames.
    pub buffer_size: u32,
    /// Number of audio channels.
    pub channels: u16,
    /// Optional device name (uses system default if `None`).
    pub device_name: Option<String>,
}

impl Default for BackendStreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 256,
            channels: 2,
            device_name: None,
        }
    }
}

/// Type-erased audio stream handle.
///
/// The stream is active while this handle exists; dropping it stops
/// playback.
pub struct StreamHandle {
    /// The backend-specific stream object, kept alive via RAII.
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wraps a backend-specific stream object, keeping it alive until this
    /// handle is dropped.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Audio output callback.
///
/// Runs on the real-time audio thread with a buffer of interleaved f32
/// samples to fill (`[L0, R0, L1, R1, ...]`). Must not allocate, lock, or
/// perform I/O; communicate through lock-free structures like
/// [`RingBridge`](crate::RingBridge).
pub type OutputCallback = Box<dyn FnMut(&mut [f32]) + Send>;

/// Error callback, invoked with a human-readable message when the backend
/// hits a streaming error.
pub type ErrorCallback = Box<dyn FnMut(&str) + Send>;

/// Pluggable audio backend trait.
pub trait AudioBackend: Send {
    /// Human-readable name of this backend (e.g. `"cpal"`, `"mock"`).
    fn name(&self) -> &str;

    /// Lists all available audio devices.
    fn list_devices(&self) -> Result<Vec<AudioDevice>>;

    /// The default output device, if any.
    fn default_output_device(&self) -> Result<Option<AudioDevice>>;

    /// Builds an output stream.
    ///
    /// `callback` is invoked on the audio thread with an interleaved buffer
    /// to fill. The returned handle keeps the stream alive.
    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        callback: OutputCallback,
        error_callback: ErrorCallback,
    ) -> Result<StreamHandle>;
}
