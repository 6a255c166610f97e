//! Defines the [`Cpu`] type, responsible for describing the register file of the machine.
//!
//! More information in the documentation for [`Cpu`].

use crate::instr::ComboOperand;
use crate::{Register, Word};

/// The register file of the tribit machine.
///
/// There is no other addressable state: no memory, no stack, no flags. The **Instruction
/// Pointer** is the only control-flow cursor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cpu {
    /// Register **A**. The dividend of `adv`, `bdv` and `cdv`, and the condition of `jnz`.
    pub a: Register,
    /// Register **B**.
    pub b: Register,
    /// Register **C**.
    pub c: Register,
    /// The Instruction Pointer, indexing the OP code word of the next instruction to execute.
    ///
    /// The machine halts as soon as it points past the end of the program.
    pub ip: usize,
}

impl Cpu {
    /// Creates a register file with the provided initial register values, pointing at the entry
    /// of the program.
    #[inline]
    pub const fn new(a: Register, b: Register, c: Register) -> Self {
        Self { a, b, c, ip: 0 }
    }

    /// Resolves `operand` under the combo addressing mode.
    ///
    /// Operands `0..=3` are literals, `4`, `5` and `6` read registers **A**, **B** and **C**.
    /// Anything else resolves to zero.
    #[inline]
    pub const fn combo(&self, operand: Word) -> Register {
        match ComboOperand::decode(operand) {
            ComboOperand::Literal(value) => value as Register,
            ComboOperand::A => self.a,
            ComboOperand::B => self.b,
            ComboOperand::C => self.c,
            ComboOperand::Reserved(_) => 0,
        }
    }
}
