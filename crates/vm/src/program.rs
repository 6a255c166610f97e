//! Defines the [`Program`] type, the read-only instruction stream of the machine.

use std::fmt;

use crate::error::Error;
use crate::instr::Instruction;
use crate::Word;

/// A validated tribit program.
///
/// A program is a flat sequence of words, read two at a time as (opcode, operand) pairs starting
/// at even offsets. The only structural requirement is that it holds a whole number of pairs.
/// Individual words are not range-checked: the executor gives a meaning to every value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Program {
    words: Box<[Word]>,
}

impl Program {
    /// Creates a new [`Program`] from its words.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidProgram`] if the number of words is odd.
    pub fn new(words: impl Into<Box<[Word]>>) -> Result<Self, Error> {
        let words = words.into();
        if words.len() % 2 != 0 {
            return Err(Error::InvalidProgram { len: words.len() });
        }
        Ok(Self { words })
    }

    /// Returns the number of words in the program.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns whether the program holds no instructions at all.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the words of the program.
    #[inline(always)]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Fetches the instruction whose OP code lives at offset `ip`.
    ///
    /// Returns `None` when `ip` is past the end of the program. A jump can land on the last
    /// word of the program (an odd offset); the missing operand then reads as zero.
    #[inline]
    pub fn fetch(&self, ip: usize) -> Option<Instruction> {
        let opcode = *self.words.get(ip)?;
        let operand = ip
            .checked_add(1)
            .and_then(|index| self.words.get(index))
            .copied()
            .unwrap_or(0);
        Some(Instruction::new(opcode, operand))
    }

    /// Returns an iterator over the instructions at even offsets, as laid out in the program.
    pub fn instructions(&self) -> impl Iterator<Item = Instruction> + '_ {
        self.words
            .chunks_exact(2)
            .map(|pair| Instruction::new(pair[0], pair[1]))
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.instructions()).finish()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.instructions().enumerate() {
            writeln!(f, "{:>4}: {instruction}", index * 2)?;
        }
        Ok(())
    }
}
