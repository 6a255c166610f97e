//! Parsing of the textual program listings fed to the oracle.
//!
//! A listing gives the initial value of each register and the program words:
//!
//! ```text
//! Register A: 729
//! Register B: 0
//! Register C: 0
//!
//! Program: 0,1,5,4,3,0
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tribit_vm::cpu::Cpu;
use tribit_vm::program::Program;
use tribit_vm::{Machine, Register, Word};

use crate::error::ParseError;

/// The initial state of a tribit machine, as described by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Initial value of register **A**.
    pub a: Register,
    /// Initial value of register **B**.
    pub b: Register,
    /// Initial value of register **C**.
    pub c: Register,
    /// The program to run.
    pub program: Program,
}

impl Listing {
    /// Reads and parses the listing stored at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    /// Returns the register file the program starts with.
    pub fn registers(&self) -> Cpu {
        Cpu::new(self.a, self.b, self.c)
    }

    /// Creates a fresh [`Machine`] ready to run the listing.
    pub fn machine(&self) -> Machine {
        Machine::new(self.program.clone(), self.registers())
    }
}

impl FromStr for Listing {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut registers: [Option<Register>; 3] = [None; 3];
        let mut program = None;

        for (index, text) in s.lines().enumerate() {
            let line = index + 1;
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            let Some((key, value)) = text.split_once(':') else {
                return Err(unknown_line(line, text));
            };
            let value = value.trim();

            let slot = match key.trim() {
                "Register A" => 0,
                "Register B" => 1,
                "Register C" => 2,
                "Program" => {
                    if program.is_some() {
                        return Err(ParseError::Duplicate {
                            line,
                            name: "program",
                        });
                    }
                    program = Some(parse_program(line, value)?);
                    continue;
                }
                _ => return Err(unknown_line(line, text)),
            };

            if registers[slot].is_some() {
                return Err(ParseError::Duplicate {
                    line,
                    name: REGISTER_NAMES[slot],
                });
            }
            registers[slot] = Some(parse_integer(line, value)?);
        }

        let [a, b, c] = registers;
        Ok(Self {
            a: a.ok_or(ParseError::Missing(REGISTER_NAMES[0]))?,
            b: b.ok_or(ParseError::Missing(REGISTER_NAMES[1]))?,
            c: c.ok_or(ParseError::Missing(REGISTER_NAMES[2]))?,
            program: program.ok_or(ParseError::Missing("program"))?,
        })
    }
}

const REGISTER_NAMES: [&str; 3] = ["register A", "register B", "register C"];

fn unknown_line(line: usize, text: &str) -> ParseError {
    ParseError::UnknownLine {
        line,
        text: text.to_owned(),
    }
}

fn parse_integer<T: FromStr<Err = std::num::ParseIntError>>(
    line: usize,
    text: &str,
) -> Result<T, ParseError> {
    text.parse().map_err(|source| ParseError::BadInteger {
        line,
        text: text.to_owned(),
        source,
    })
}

fn parse_program(line: usize, value: &str) -> Result<Program, ParseError> {
    let words = if value.is_empty() {
        Vec::new()
    } else {
        value
            .split(',')
            .map(|word| {
                let word: Word = parse_integer(line, word.trim())?;
                if word > 7 {
                    Err(ParseError::WordOutOfRange { line, value: word })
                } else {
                    Ok(word)
                }
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    Program::new(words).map_err(|source| ParseError::Program { line, source })
}
