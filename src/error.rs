use std::io;
use std::num::ParseIntError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown opcode {opcode} at address {address}")]
    UnknownOpcode { opcode: i64, address: usize },

    #[error("unknown parameter mode {mode} at address {address}")]
    UnknownMode { mode: i64, address: usize },

    /// A write-target parameter was encoded in immediate mode.
    #[error("immediate mode write target in instruction at address {address}")]
    ImmediateWrite { address: usize },

    #[error("address {address} outside memory of size {size}")]
    OutOfBounds { address: i64, size: usize },

    #[error("arithmetic overflow in instruction at address {address}")]
    Overflow { address: usize },

    #[error("{0} has already halted")]
    Halted(String),

    #[error("deadlock: all {0} active amplifiers are blocked on input")]
    Deadlock(usize),

    /// Input was requested but nothing will ever supply it.
    #[error("{0} requested input but none is available")]
    InputExhausted(String),

    #[error("{0} finished without producing a signal")]
    NoSignal(String),

    #[error("no phase settings given")]
    NoPhases,

    #[error("phase setting {0} appears more than once")]
    DuplicatePhase(i64),

    #[error("invalid program: {0}")]
    Parse(#[from] ParseIntError),

    #[error("failed to read program: {0}")]
    Io(#[from] io::Error),
}
