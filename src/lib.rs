//! An Intcode processor and the amplifier networks built from it.
//!
//! A [`Process`] owns a private copy of a [`Program`] plus its own input and
//! output queues, and can be stepped one instruction at a time or resumed up
//! to its next suspension point. [`Network`] chains processes into a feedback
//! ring and [`find_max_signal`] searches phase orderings for the strongest
//! signal.

mod amplifier;
mod error;
mod process;
mod program;
mod search;

pub use amplifier::{serial_signal, Network, Turn};
pub use error::{Error, Result};
pub use process::{Process, State, Step};
pub use program::Program;
pub use search::{find_max_signal, find_noun_verb, run_with_noun_verb, Best, Wiring};
