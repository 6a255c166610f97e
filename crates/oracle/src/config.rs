//! Configuration of the oracle.

use tribit_vm::Register;

use crate::error::{OracleError, Result};

/// Default number of instructions the reference interpreter may execute.
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;
/// Default number of clock cycles a device may take to halt.
pub const DEFAULT_MAX_CYCLES: u64 = 1_000_000;
/// Width of the hardware registers, as shifted in bit by bit at reset.
pub const DEFAULT_REGISTER_BITS: u32 = 48;

/// Limits applied when computing reference outputs and driving devices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OracleConfig {
    /// Step budget of the reference interpreter.
    pub max_steps: u64,
    /// Cycle budget of the device under test.
    pub max_cycles: u64,
    /// Width of the device's **A**, **B** and **C** registers.
    pub register_bits: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_cycles: DEFAULT_MAX_CYCLES,
            register_bits: DEFAULT_REGISTER_BITS,
        }
    }
}

impl OracleConfig {
    /// Checks that the register width can hold every 3-bit literal and fits in a [`Register`].
    pub fn validate(&self) -> Result<()> {
        if (3..=Register::BITS).contains(&self.register_bits) {
            Ok(())
        } else {
            Err(OracleError::InvalidRegisterWidth {
                bits: self.register_bits,
            })
        }
    }

    /// Returns the mask selecting the bits a device register can hold.
    pub fn register_mask(&self) -> Register {
        register_mask(self.register_bits)
    }
}

/// Returns the mask selecting the low `bits` bits of a register.
pub(crate) fn register_mask(bits: u32) -> Register {
    Register::MAX
        .checked_shr(Register::BITS.saturating_sub(bits))
        .unwrap_or(0)
}
