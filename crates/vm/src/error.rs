//! Defines the [`Error`] type of the crate.

use thiserror::Error;

/// An error that might occur when loading or running a tribit program.
///
/// Note that executing an instruction never fails: undefined opcodes are no-ops and reserved
/// combo operands resolve to zero.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The program does not hold a whole number of (opcode, operand) pairs.
    #[error("invalid program: expected an even number of words, got {len}")]
    InvalidProgram {
        /// The number of words in the rejected program.
        len: usize,
    },
    /// The machine was still running after the requested number of steps.
    ///
    /// Only returned by [`Machine::run_with_limit`](crate::Machine::run_with_limit).
    #[error("program did not halt within {limit} steps")]
    StepLimitExceeded {
        /// The step budget that was exhausted.
        limit: u64,
    },
}
