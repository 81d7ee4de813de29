//! Audio I/O layer for the parche patch runtime.
//!
//! This crate connects the single-threaded execution core to the outside
//! world:
//!
//! - **Offline rendering**: [`render_channels`] drives an engine block by
//!   block; [`write_wav`] / [`read_wav`] move audio to and from disk
//! - **Real-time streaming**: [`AudioBackend`] abstracts the platform audio
//!   API (default implementation: [`CpalBackend`]); [`RingBridge`] carries
//!   samples from the engine's thread to the audio callback, since the
//!   engine itself never leaves the thread that built it
//! - **Host notifications**: [`HostMailbox`] delivers asynchronous
//!   operation completions into the engine between blocks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parche_core::{AudioConfig, Engine};
//! use parche_io::{render_channels, write_wav, WavSpec};
//!
//! let mut engine = /* build from a patch */;
//! engine.configure(AudioConfig::new(48000.0, 64));
//! let channels = render_channels(&mut engine, 48000);
//! write_wav("out.wav", &channels, WavSpec::default())?;
//! ```

mod backend;
mod cpal_backend;
mod devices;
mod mailbox;
mod render;
mod ring;
mod wav;

pub use backend::{
    AudioBackend, BackendStreamConfig, ErrorCallback, OutputCallback, StreamHandle,
};
pub use cpal_backend::CpalBackend;
pub use devices::{AudioDevice, default_output_device, list_devices};
pub use mailbox::{HostMailbox, MailboxSender};
pub use render::render_channels;
pub use ring::RingBridge;
pub use wav::{WavSpec, read_wav, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("no audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("audio device not found: {0}")]
    DeviceNotFound(String),
}

/// Result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
