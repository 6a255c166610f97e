//! Defines the [`Instruction`] type, responsible for representing a single (opcode, operand)
//! pair of a tribit program.

use std::fmt;

use crate::Word;

/// The OP code of an instruction.
///
/// All eight 3-bit values are assigned by the instruction set. Words that do not fit in three bits
/// decode to [`OpCode::Undefined`], which executes as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// `A <- A / 2^combo`.
    Adv,
    /// `B <- B ^ literal`.
    Bxl,
    /// `B <- combo % 8`.
    Bst,
    /// Jumps to the literal operand when `A` is not zero.
    Jnz,
    /// `B <- B ^ C`. The operand is ignored.
    Bxc,
    /// Outputs `combo % 8`.
    Out,
    /// `B <- A / 2^combo`.
    Bdv,
    /// `C <- A / 2^combo`.
    Cdv,
    /// A word outside of the instruction set.
    Undefined(Word),
}

impl OpCode {
    /// Decodes an opcode word.
    pub const fn decode(word: Word) -> Self {
        match word {
            0 => Self::Adv,
            1 => Self::Bxl,
            2 => Self::Bst,
            3 => Self::Jnz,
            4 => Self::Bxc,
            5 => Self::Out,
            6 => Self::Bdv,
            7 => Self::Cdv,
            other => Self::Undefined(other),
        }
    }

    /// Returns the assembly mnemonic of the OP code.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Adv => "adv",
            Self::Bxl => "bxl",
            Self::Bst => "bst",
            Self::Jnz => "jnz",
            Self::Bxc => "bxc",
            Self::Out => "out",
            Self::Bdv => "bdv",
            Self::Cdv => "cdv",
            Self::Undefined(_) => "???",
        }
    }

    /// Returns whether the operand of this OP code goes through the combo addressing mode.
    pub const fn uses_combo(self) -> bool {
        matches!(
            self,
            Self::Adv | Self::Bst | Self::Out | Self::Bdv | Self::Cdv
        )
    }
}

/// The decoded form of a combo operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComboOperand {
    /// Operands `0..=3` stand for themselves.
    Literal(Word),
    /// Operand `4` reads register **A**.
    A,
    /// Operand `5` reads register **B**.
    B,
    /// Operand `6` reads register **C**.
    C,
    /// Operand `7` is reserved and never appears in well-formed programs. It resolves to zero,
    /// as does every word outside of the 3-bit range.
    Reserved(Word),
}

impl ComboOperand {
    /// Decodes an operand word under the combo addressing mode.
    pub const fn decode(word: Word) -> Self {
        match word {
            0..=3 => Self::Literal(word),
            4 => Self::A,
            5 => Self::B,
            6 => Self::C,
            other => Self::Reserved(other),
        }
    }
}

impl fmt::Display for ComboOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::A => f.write_str("a"),
            Self::B => f.write_str("b"),
            Self::C => f.write_str("c"),
            Self::Reserved(word) => write!(f, "<reserved {word}>"),
        }
    }
}

/// A single tribit instruction: an OP code word followed by its operand word.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// The raw OP code word.
    pub opcode: Word,
    /// The raw operand word.
    pub operand: Word,
}

impl Instruction {
    /// Creates a new [`Instruction`] from its two words.
    #[inline(always)]
    pub const fn new(opcode: Word, operand: Word) -> Self {
        Self { opcode, operand }
    }

    /// Returns the decoded OP code of the instruction.
    #[inline(always)]
    pub const fn op_code(&self) -> OpCode {
        OpCode::decode(self.opcode)
    }

    /// Returns the operand decoded under the combo addressing mode.
    ///
    /// Whether this is meaningful depends on the OP code, see [`OpCode::uses_combo`].
    #[inline(always)]
    pub const fn combo(&self) -> ComboOperand {
        ComboOperand::decode(self.operand)
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("op_code", &self.op_code())
            .field("operand", &self.operand)
            .finish()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_code = self.op_code();
        match op_code {
            OpCode::Undefined(word) => write!(f, ".word {word}, {}", self.operand),
            OpCode::Bxc => f.write_str(op_code.mnemonic()),
            _ if op_code.uses_combo() => write!(f, "{} {}", op_code.mnemonic(), self.combo()),
            _ => write!(f, "{} {}", op_code.mnemonic(), self.operand),
        }
    }
}
