//! # Tribit oracle
//!
//! Verification harness for hardware implementations of the tribit machine.
//!
//! The reference outputs of a program are computed with [`tribit_vm`], then a [`Device`] is
//! clocked one instruction at a time and every value it emits is compared with the reference
//! stream, in emission order.
//!
//! - [`Listing`]: the textual description of the initial registers and the program.
//!
//! - [`Device`]: the clocked interface of an implementation under test. [`ModelDevice`] is a
//!   software implementation of it.
//!
//! - [`Oracle`]: computes reference outputs and checks devices against them.

#![warn(missing_docs, missing_debug_implementations)]
#![forbid(unsafe_code)]

use tracing_subscriber::{fmt, EnvFilter};
use tribit_vm::Word;

pub mod config;
pub mod device;
pub mod error;
pub mod harness;
pub mod listing;

pub use config::OracleConfig;
pub use device::{Device, DeviceStatus, ModelDevice};
pub use error::{OracleError, ParseError};
pub use harness::{Oracle, Report};
pub use listing::Listing;

/// Initialize logging to standard error.
///
/// Use the `RUST_LOG` environment variable to override the default `info` filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Formats an output stream as comma-separated values.
pub fn format_outputs(outputs: &[Word]) -> String {
    outputs
        .iter()
        .map(Word::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
