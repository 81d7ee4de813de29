//! Object registry and factory for the parche patch runtime.
//!
//! This crate provides the type-tag behavior table: every object type the
//! runtime knows is registered here with a descriptor (for discovery and
//! UIs) and a factory that translates raw creation arguments into a typed
//! behavior plus port layout. An unknown tag is a build-time error: it is
//! the one failure a patch cannot recover from at run time.
//!
//! # Example
//!
//! ```rust
//! use parche_registry::ObjectRegistry;
//!
//! let registry = ObjectRegistry::new();
//!
//! // List all objects
//! for object in registry.all_objects() {
//!     println!("{}: {}", object.tag, object.description);
//! }
//!
//! // Create an object by tag
//! let args = parche_registry::ObjectArgs::from_floats(&[440.0]);
//! let node = registry.create("osc~", &args).unwrap();
//! assert_eq!(node.layout.outlets.len(), 1);
//! ```

use parche_core::{BuiltNode, Token};
use parche_objects::{
    Adc, Add, Dac, Del, DelRead, DelWrite, FloatBox, Line, Loadbang, Metro, Mul, Osc, Phasor,
    Print, Receive, Send, Sig, TabRead, TabWrite, Table,
};
use thiserror::Error;

/// Category of an object for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectCategory {
    /// Signal generators (oscillators, ramps, holders).
    Generators,
    /// Message and signal arithmetic.
    Math,
    /// Audio and log I/O.
    Io,
    /// Clocks and delayed triggers.
    Timing,
    /// Named resources: delay lines, tables, buses.
    Resources,
}

impl ObjectCategory {
    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            ObjectCategory::Generators => "Generators",
            ObjectCategory::Math => "Math",
            ObjectCategory::Io => "I/O",
            ObjectCategory::Timing => "Timing",
            ObjectCategory::Resources => "Resources",
        }
    }
}

/// Errors from translating creation arguments or resolving a tag.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    /// The type tag names no registered object.
    #[error("unknown object type: {0}")]
    UnknownObject(String),

    /// A required creation argument is missing.
    #[error("object '{tag}': missing argument {index} ({expected})")]
    MissingArg {
        /// The object's type tag.
        tag: String,
        /// Zero-based argument position.
        index: usize,
        /// What the argument should have been.
        expected: &'static str,
    },

    /// A creation argument has the wrong type.
    #[error("object '{tag}': argument {index} must be a {expected}")]
    WrongArg {
        /// The object's type tag.
        tag: String,
        /// Zero-based argument position.
        index: usize,
        /// What the argument should have been.
        expected: &'static str,
    },
}

/// Raw creation arguments from a patch document: floats and strings,
/// positionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectArgs {
    tokens: Vec<Token>,
}

impl ObjectArgs {
    /// Arguments from explicit tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// All-float arguments.
    pub fn from_floats(values: &[f64]) -> Self {
        Self {
            tokens: values.iter().map(|&v| Token::Float(v)).collect(),
        }
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when no arguments were given.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The float at `index`.
    pub fn float(&self, tag: &str, index: usize) -> Result<f64, BuildError> {
        match self.tokens.get(index) {
            Some(Token::Float(v)) => Ok(*v),
            Some(_) => Err(BuildError::WrongArg {
                tag: tag.into(),
                index,
                expected: "number",
            }),
            None => Err(BuildError::MissingArg {
                tag: tag.into(),
                index,
                expected: "number",
            }),
        }
    }

    /// The float at `index`, or `default` when absent.
    pub fn float_or(&self, tag: &str, index: usize, default: f64) -> Result<f64, BuildError> {
        match self.tokens.get(index) {
            None => Ok(default),
            Some(_) => self.float(tag, index),
        }
    }

    /// The symbol at `index`.
    pub fn symbol(&self, tag: &str, index: usize) -> Result<&str, BuildError> {
        match self.tokens.get(index) {
            Some(Token::Symbol(s)) => Ok(s),
            Some(_) => Err(BuildError::WrongArg {
                tag: tag.into(),
                index,
                expected: "name",
            }),
            None => Err(BuildError::MissingArg {
                tag: tag.into(),
                index,
                expected: "name",
            }),
        }
    }

    /// The symbol at `index`, or `default` when absent.
    pub fn symbol_or<'a>(
        &'a self,
        tag: &str,
        index: usize,
        default: &'a str,
    ) -> Result<&'a str, BuildError> {
        match self.tokens.get(index) {
            None => Ok(default),
            Some(_) => self.symbol(tag, index),
        }
    }
}

/// Describes an object type in the registry.
#[derive(Debug, Clone)]
pub struct ObjectDescriptor {
    /// The type tag patches use (e.g. `"osc~"`).
    pub tag: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description of the object.
    pub description: &'static str,
    /// Category for organization.
    pub category: ObjectCategory,
}

/// Factory function translating raw arguments into a built node.
type ObjectFactory = fn(&ObjectArgs) -> Result<BuiltNode, BuildError>;

/// Internal entry in the registry.
struct RegistryEntry {
    descriptor: ObjectDescriptor,
    factory: ObjectFactory,
}

/// Registry of all available object types.
///
/// All built-in objects are registered by [`new`](Self::new); hosts may
/// [`register`](Self::register) additional types before building patches.
pub struct ObjectRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    /// Creates a registry with all built-in objects registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
        };
        registry.register_builtin_objects();
        registry
    }

    /// Registers an object type. A duplicate tag replaces the earlier
    /// entry.
    pub fn register(&mut self, descriptor: ObjectDescriptor, factory: ObjectFactory) {
        self.entries.retain(|e| e.descriptor.tag != descriptor.tag);
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// Builds an object by tag, translating its raw arguments.
    pub fn create(&self, tag: &str, args: &ObjectArgs) -> Result<BuiltNode, BuildError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.descriptor.tag == tag)
            .ok_or_else(|| BuildError::UnknownObject(tag.into()))?;
        (entry.factory)(args)
    }

    /// True if `tag` is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.iter().any(|e| e.descriptor.tag == tag)
    }

    /// The descriptor for `tag`, if registered.
    pub fn get(&self, tag: &str) -> Option<&ObjectDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.tag == tag)
            .map(|e| &e.descriptor)
    }

    /// All registered descriptors, in registration order.
    pub fn all_objects(&self) -> Vec<&ObjectDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Descriptors in the given category.
    pub fn objects_in_category(&self, category: ObjectCategory) -> Vec<&ObjectDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    fn register_builtin_objects(&mut self) {
        self.register(
            ObjectDescriptor {
                tag: "osc~",
                name: "Sine Oscillator",
                description: "Sine wave with a cold frequency inlet",
                category: ObjectCategory::Generators,
            },
            |args| Ok(Osc::new(args.float_or("osc~", 0, 0.0)? as f32).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "phasor~",
                name: "Ramp Oscillator",
                description: "0..1 sawtooth ramp with a cold frequency inlet",
                category: ObjectCategory::Generators,
            },
            |args| Ok(Phasor::new(args.float_or("phasor~", 0, 0.0)? as f32).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "sig~",
                name: "Signal Holder",
                description: "Holds the last float as a constant signal",
                category: ObjectCategory::Generators,
            },
            |args| Ok(Sig::new(args.float_or("sig~", 0, 0.0)? as f32).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "line~",
                name: "Ramp Generator",
                description: "Linear ramp to [target, time_ms] messages",
                category: ObjectCategory::Generators,
            },
            |_args| Ok(Line::new().into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "*~",
                name: "Signal Multiply",
                description: "Multiplies a signal by a cold right operand",
                category: ObjectCategory::Math,
            },
            |args| Ok(Mul::new(args.float_or("*~", 0, 1.0)? as f32).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "+",
                name: "Add",
                description: "Adds a stored operand to incoming floats",
                category: ObjectCategory::Math,
            },
            |args| Ok(Add::new(args.float_or("+", 0, 0.0)?).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "f",
                name: "Float Box",
                description: "Stores a float; bang recalls it",
                category: ObjectCategory::Math,
            },
            |args| Ok(FloatBox::new(args.float_or("f", 0, 0.0)?).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "dac~",
                name: "Audio Output",
                description: "Sums signal inlets into the output channels",
                category: ObjectCategory::Io,
            },
            |args| Ok(Dac::new(args.float_or("dac~", 0, 2.0)? as usize).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "adc~",
                name: "Audio Input",
                description: "Exposes input channels as signal outlets",
                category: ObjectCategory::Io,
            },
            |args| Ok(Adc::new(args.float_or("adc~", 0, 2.0)? as usize).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "print",
                name: "Print",
                description: "Logs every message through tracing",
                category: ObjectCategory::Io,
            },
            |args| Ok(Print::new(args.symbol_or("print", 0, "")?).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "metro",
                name: "Metronome",
                description: "Bangs on start and then every period",
                category: ObjectCategory::Timing,
            },
            |args| Ok(Metro::new(args.float_or("metro", 0, 1000.0)?).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "del",
                name: "Delayed Bang",
                description: "Bangs a fixed time after being triggered",
                category: ObjectCategory::Timing,
            },
            |args| Ok(Del::new(args.float_or("del", 0, 0.0)?).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "loadbang",
                name: "Load Bang",
                description: "Bangs once when the engine is configured",
                category: ObjectCategory::Timing,
            },
            |_args| Ok(Loadbang::new().into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "delwrite~",
                name: "Delay Line Writer",
                description: "Records a signal into a named delay line",
                category: ObjectCategory::Resources,
            },
            |args| {
                let name = args.symbol("delwrite~", 0)?.to_string();
                let max_ms = args.float_or("delwrite~", 1, 1000.0)?;
                Ok(DelWrite::new(name, max_ms).into_node())
            },
        );

        self.register(
            ObjectDescriptor {
                tag: "delread~",
                name: "Delay Line Reader",
                description: "Reads a named delay line (clamps out-of-range)",
                category: ObjectCategory::Resources,
            },
            |args| {
                let name = args.symbol("delread~", 0)?.to_string();
                let delay_ms = args.float_or("delread~", 1, 0.0)?;
                Ok(DelRead::new(name, delay_ms).into_node())
            },
        );

        self.register(
            ObjectDescriptor {
                tag: "table",
                name: "Table",
                description: "Owns a named sample array (strict bounds)",
                category: ObjectCategory::Resources,
            },
            |args| {
                let name = args.symbol("table", 0)?.to_string();
                let size = args.float_or("table", 1, 64.0)? as usize;
                Ok(Table::new(name, size).into_node())
            },
        );

        self.register(
            ObjectDescriptor {
                tag: "tabread",
                name: "Table Reader",
                description: "Indexes a named table (strict bounds)",
                category: ObjectCategory::Resources,
            },
            |args| Ok(TabRead::new(args.symbol("tabread", 0)?.to_string()).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "tabwrite~",
                name: "Table Writer",
                description: "Captures a signal window into a named table",
                category: ObjectCategory::Resources,
            },
            |args| Ok(TabWrite::new(args.symbol("tabwrite~", 0)?.to_string()).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "send",
                name: "Bus Sender",
                description: "Forwards messages to a named bus",
                category: ObjectCategory::Resources,
            },
            |args| Ok(Send::new(args.symbol("send", 0)?.to_string()).into_node()),
        );

        self.register(
            ObjectDescriptor {
                tag: "receive",
                name: "Bus Receiver",
                description: "Re-emits messages from a named bus",
                category: ObjectCategory::Resources,
            },
            |args| Ok(Receive::new(args.symbol("receive", 0)?.to_string()).into_node()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tag_is_a_build_error() {
        let registry = ObjectRegistry::new();
        let result = registry.create("widget~", &ObjectArgs::default());
        assert_eq!(
            result.err(),
            Some(BuildError::UnknownObject("widget~".into()))
        );
    }

    #[test]
    fn every_builtin_is_creatable_with_defaults() {
        let registry = ObjectRegistry::new();
        let named = ObjectArgs::new(vec![Token::Symbol("x".into())]);
        for descriptor in registry.all_objects() {
            // Resource objects need a name argument; the rest build bare.
            let args = if registry
                .create(descriptor.tag, &ObjectArgs::default())
                .is_ok()
            {
                ObjectArgs::default()
            } else {
                named.clone()
            };
            let node = registry
                .create(descriptor.tag, &args)
                .unwrap_or_else(|e| panic!("{}: {e}", descriptor.tag));
            let _ = node.layout;
        }
    }

    #[test]
    fn missing_name_argument_reports_position() {
        let registry = ObjectRegistry::new();
        let result = registry.create("delwrite~", &ObjectArgs::default());
        assert_eq!(
            result.err(),
            Some(BuildError::MissingArg {
                tag: "delwrite~".into(),
                index: 0,
                expected: "name",
            })
        );
    }

    #[test]
    fn wrong_argument_type_reports_position() {
        let registry = ObjectRegistry::new();
        let args = ObjectArgs::new(vec![Token::Symbol("fast".into())]);
        let result = registry.create("metro", &args);
        assert_eq!(
            result.err(),
            Some(BuildError::WrongArg {
                tag: "metro".into(),
                index: 0,
                expected: "number",
            })
        );
    }

    #[test]
    fn categories_partition_the_builtins() {
        let registry = ObjectRegistry::new();
        let total: usize = [
            ObjectCategory::Generators,
            ObjectCategory::Math,
            ObjectCategory::Io,
            ObjectCategory::Timing,
            ObjectCategory::Resources,
        ]
        .into_iter()
        .map(|c| registry.objects_in_category(c).len())
        .sum();
        assert_eq!(total, registry.all_objects().len());
    }

    #[test]
    fn duplicate_registration_replaces() {
        let mut registry = ObjectRegistry::new();
        let before = registry.all_objects().len();
        registry.register(
            ObjectDescriptor {
                tag: "osc~",
                name: "Custom Osc",
                description: "replacement",
                category: ObjectCategory::Generators,
            },
            |_args| Ok(Osc::new(1.0).into_node()),
        );
        assert_eq!(registry.all_objects().len(), before);
        assert_eq!(registry.get("osc~").unwrap().name, "Custom Osc");
    }
}
