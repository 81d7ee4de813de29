//! Error types for patch loading and building.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading, validating, or building a patch document.
#[derive(Debug, Error)]
pub enum PatchError {
    /// Failed to read the patch file.
    #[error("failed to read patch '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension names no supported format.
    #[error("unsupported patch format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),

    /// Failed to parse TOML.
    #[error("failed to parse TOML patch: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to parse JSON.
    #[error("failed to parse JSON patch: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Two nodes share one document id.
    #[error("duplicate node id '{0}'")]
    DuplicateNodeId(String),

    /// An edge references a node id the document never declares.
    #[error("edge references unknown node id '{0}'")]
    UnknownNodeId(String),

    /// Creating a node failed (unknown tag, bad arguments).
    #[error(transparent)]
    Build(#[from] parche_registry::BuildError),

    /// Connecting an edge failed (port range, kind mismatch, duplicate).
    #[error("edge '{from}' -> '{to}': {source}")]
    Connect {
        /// Document id of the source node.
        from: String,
        /// Document id of the sink node.
        to: String,
        /// Underlying graph error.
        #[source]
        source: parche_core::GraphError,
    },
}

impl PatchError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PatchError::ReadFile {
            path: path.into(),
            source,
        }
    }
}
