//! Parche Config - patch documents and engine building.
//!
//! The patch source is declarative data, not code: a [`PatchDoc`] lists
//! boxes (type tag plus creation arguments) and cables, loads from TOML or
//! JSON, and builds into a runnable [`Engine`](parche_core::Engine) through
//! the object registry. Every build error (unknown tag, malformed
//! argument, dangling or invalid connection) surfaces before any audio
//! runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use parche_config::{PatchDoc, build_engine};
//! use parche_core::AudioConfig;
//! use parche_registry::ObjectRegistry;
//!
//! let doc = PatchDoc::load("patch.toml")?;
//! let registry = ObjectRegistry::new();
//! let mut built = build_engine(&doc, &registry)?;
//! built.engine.configure(AudioConfig::new(48000.0, 64));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod build;
mod doc;
mod error;

pub use build::{BuiltPatch, build_engine, validate};
pub use doc::{ArgDoc, EdgeDoc, NodeDoc, PatchDoc};
pub use error::PatchError;
