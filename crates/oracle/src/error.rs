//! Defines the error types of the oracle.

use std::io;
use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;
use tribit_vm::{Register, Word};

/// Oracle result type.
pub type Result<T, E = OracleError> = std::result::Result<T, E>;

/// An error that occurs while reading a listing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The listing could not be read from disk.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The path of the listing.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A line is neither blank, a register definition, nor the program.
    #[error("line {line}: unrecognized line {text:?}")]
    UnknownLine {
        /// The 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },
    /// A register or the program is defined more than once.
    #[error("line {line}: {name} is defined twice")]
    Duplicate {
        /// The 1-based line number of the second definition.
        line: usize,
        /// What was defined twice.
        name: &'static str,
    },
    /// A register or the program is never defined.
    #[error("missing {0}")]
    Missing(&'static str),
    /// A value is not a valid non-negative integer.
    #[error("line {line}: invalid integer {text:?}: {source}")]
    BadInteger {
        /// The 1-based line number.
        line: usize,
        /// The text that failed to parse.
        text: String,
        /// The underlying parse error.
        #[source]
        source: ParseIntError,
    },
    /// A program word does not fit in three bits.
    #[error("line {line}: word {value} does not fit in 3 bits")]
    WordOutOfRange {
        /// The 1-based line number.
        line: usize,
        /// The offending word.
        value: Word,
    },
    /// The program words do not form a valid program.
    #[error("line {line}: {source}")]
    Program {
        /// The 1-based line number of the program.
        line: usize,
        /// Why the program was rejected.
        #[source]
        source: tribit_vm::error::Error,
    },
}

/// An error that occurs while computing the reference outputs or checking a device against them.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The listing could not be read.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The reference interpreter failed.
    #[error("reference run failed: {0}")]
    Vm(#[from] tribit_vm::error::Error),
    /// The configured register width cannot be driven.
    #[error("unsupported register width of {bits} bits (expected 3 to 64)")]
    InvalidRegisterWidth {
        /// The configured width.
        bits: u32,
    },
    /// An initial register value does not fit in the device's registers.
    #[error("register {register} = {value} does not fit in {bits} bits")]
    RegisterTooWide {
        /// The name of the register.
        register: char,
        /// Its initial value.
        value: Register,
        /// The width of the device's registers.
        bits: u32,
    },
    /// The device emitted a value that differs from the reference.
    #[error("output {index}: expected {expected}, device emitted {actual}")]
    OutputMismatch {
        /// The position of the value in the output stream.
        index: usize,
        /// The reference value.
        expected: Word,
        /// The value emitted by the device.
        actual: Word,
    },
    /// The device emitted more values than the reference.
    #[error("output {index}: device emitted {actual} past the end of the reference stream")]
    UnexpectedOutput {
        /// The position of the value in the output stream.
        index: usize,
        /// The value emitted by the device.
        actual: Word,
    },
    /// The device halted before emitting every reference value.
    #[error("device halted after {actual} outputs, expected {expected}")]
    MissingOutputs {
        /// The length of the reference stream.
        expected: usize,
        /// The number of values emitted by the device.
        actual: usize,
    },
    /// The device did not halt within the cycle budget.
    #[error("device did not halt within {cycles} cycles")]
    Timeout {
        /// The exhausted cycle budget.
        cycles: u64,
    },
}
