//! Parche Objects - built-in object library for the patch runtime.
//!
//! Each object type implements
//! [`NodeBehavior`](parche_core::NodeBehavior) and wraps itself into a
//! [`BuiltNode`](parche_core::BuiltNode) via `into_node()`. The set is
//! deliberately small (enough to wire real patches) and every object's
//! numeric behavior is illustrative rather than normative:
//!
//! - **Generators**: [`Osc`] (`osc~`), [`Phasor`] (`phasor~`), [`Sig`]
//!   (`sig~`), [`Line`] (`line~`)
//! - **Math**: [`Mul`] (`*~`), [`Add`] (`+`), [`FloatBox`] (`f`)
//! - **I/O**: [`Dac`] (`dac~`), [`Adc`] (`adc~`), [`Print`] (`print`)
//! - **Timing**: [`Metro`] (`metro`), [`Del`] (`del`), [`Loadbang`]
//!   (`loadbang`)
//! - **Named resources**: [`DelWrite`]/[`DelRead`] (`delwrite~`/`delread~`),
//!   [`Table`]/[`TabRead`]/[`TabWrite`] (`table`/`tabread`/`tabwrite~`),
//!   [`Send`]/[`Receive`] (`send`/`receive`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use parche_core::{AudioConfig, Engine, Patch};
//! use parche_objects::{Dac, Osc};
//!
//! let mut patch = Patch::new();
//! let osc = patch.add_node(Osc::new(440.0).into_node());
//! let dac = patch.add_node(Dac::new(2).into_node());
//! patch.connect(osc, 0, dac, 0)?;
//! patch.connect(osc, 0, dac, 1)?;
//!
//! let mut engine = Engine::new(patch);
//! engine.configure(AudioConfig::new(48000.0, 64));
//! ```

pub mod adc;
pub mod add;
pub mod dac;
pub mod del;
pub mod delay_line;
pub mod float_box;
pub mod line;
pub mod loadbang;
pub mod metro;
pub mod mul;
pub mod osc;
pub mod print;
pub mod send_receive;
pub mod sig;
pub mod table;

// Re-export main types at crate root
pub use adc::Adc;
pub use add::Add;
pub use dac::Dac;
pub use del::Del;
pub use delay_line::{DelRead, DelWrite};
pub use float_box::FloatBox;
pub use line::Line;
pub use loadbang::Loadbang;
pub use metro::Metro;
pub use mul::Mul;
pub use osc::{Osc, Phasor};
pub use print::Print;
pub use send_receive::{Receive, Send};
pub use sig::Sig;
pub use table::{TabRead, TabWrite, Table};
