//! The serializable patch document.
//!
//! A patch document is the static node/edge list the builder consumes;
//! the core never re-parses text at run time. Documents are plain data,
//! loadable from TOML or JSON:
//!
//! ```toml
//! [[nodes]]
//! id = "osc1"
//! type = "osc~"
//! args = [440.0]
//!
//! [[nodes]]
//! id = "out"
//! type = "dac~"
//!
//! [[edges]]
//! from = "osc1"
//! to = "out"
//! ```
//!
//! `outlet` and `inlet` default to 0, matching the overwhelmingly common
//! single-port connection.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PatchError;

/// One creation argument: a number or a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgDoc {
    /// A numeric argument.
    Float(f64),
    /// A textual argument (resource names, prefixes).
    Str(String),
}

/// One box in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDoc {
    /// Document-unique identifier, referenced by edges.
    pub id: String,
    /// Registry type tag (e.g. `"osc~"`).
    #[serde(rename = "type")]
    pub object: String,
    /// Positional creation arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgDoc>,
}

/// One cable in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDoc {
    /// Source node id.
    pub from: String,
    /// Source outlet index.
    #[serde(default)]
    pub outlet: usize,
    /// Sink node id.
    pub to: String,
    /// Sink inlet index.
    #[serde(default)]
    pub inlet: usize,
}

/// A complete patch: boxes plus cables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchDoc {
    /// All boxes, in creation order.
    #[serde(default)]
    pub nodes: Vec<NodeDoc>,
    /// All cables; order defines message fan-out order.
    #[serde(default)]
    pub edges: Vec<EdgeDoc>,
}

impl PatchDoc {
    /// Parses a document from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, PatchError> {
        Ok(toml::from_str(text)?)
    }

    /// Parses a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, PatchError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a document from a `.toml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PatchError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| PatchError::read_file(path, e))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&text),
            Some("json") => Self::from_json(&text),
            other => Err(PatchError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
