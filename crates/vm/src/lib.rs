//! # Tribit
//!
//! A reference interpreter for the tribit machine, a tiny 3-bit processor with three registers
//! and eight instructions.
//!
//! The interpreter is used as an oracle: hardware implementations of the machine are expected
//! to produce exactly the output stream computed here, in the same order.
//!
//! # Instruction set
//!
//! | OP code | Mnemonic | Operand | Effect                               |
//! |---------|----------|---------|--------------------------------------|
//! | 0       | `adv`    | combo   | `A <- A / 2^combo`                   |
//! | 1       | `bxl`    | literal | `B <- B ^ literal`                   |
//! | 2       | `bst`    | combo   | `B <- combo % 8`                     |
//! | 3       | `jnz`    | literal | `IP <- literal` if `A != 0`          |
//! | 4       | `bxc`    | ignored | `B <- B ^ C`                         |
//! | 5       | `out`    | combo   | outputs `combo % 8`                  |
//! | 6       | `bdv`    | combo   | `B <- A / 2^combo`                   |
//! | 7       | `cdv`    | combo   | `C <- A / 2^combo`                   |
//!
//! Divisions truncate. Every instruction except a taken `jnz` advances the **Instruction
//! Pointer** by two words, and the machine halts once it points past the end of the program.

#![warn(missing_docs, missing_debug_implementations)]
#![forbid(unsafe_code)]

use std::iter::FusedIterator;

use bitflags::bitflags;
use num_traits::ToPrimitive;

use cpu::Cpu;
use error::Error;
use instr::{Instruction, OpCode};
use program::Program;
use trace::{NoopTrace, Trace};

pub mod cpu;
pub mod error;
pub mod instr;
pub mod program;
pub mod trace;

/// A single word of a tribit program.
///
/// Well-formed programs only hold values in `0..=7`.
pub type Word = u8;

/// The value held by one of the **A**, **B** or **C** registers.
///
/// Registers are not limited to three bits, only literal operands and outputs are.
pub type Register = u64;

/// Contains the full state of a tribit machine running a program.
///
/// # Components
///
/// - [`Program`]: the read-only instruction stream.
///
/// - [`Cpu`]: the register file, owned exclusively by this machine.
///
/// - The output stream, which only ever grows while the machine runs.
///
/// A [`Machine`] cannot be rewound. Running the same program again requires loading a fresh
/// instance.
#[derive(Debug, Clone)]
pub struct Machine {
    /// The program being executed.
    program: Program,
    /// The current state of the registers.
    cpu: Cpu,
    /// Every value emitted so far, in order.
    output: Vec<Word>,
    /// The number of instructions executed so far.
    steps: u64,
    /// Whether the Instruction Pointer has left the program.
    halted: bool,
}

impl Machine {
    /// Creates a new [`Machine`] that will execute `program` from the provided register file.
    pub fn new(program: Program, cpu: Cpu) -> Self {
        tracing::debug!(
            words = program.len(),
            a = cpu.a,
            b = cpu.b,
            c = cpu.c,
            "program loaded"
        );

        let halted = cpu.ip >= program.len();
        Self {
            program,
            cpu,
            output: Vec::new(),
            steps: 0,
            halted,
        }
    }

    /// Validates `words` as a program and prepares a machine to run it from its entry point with
    /// the provided initial register values.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidProgram`] if `words` has an odd length.
    pub fn load(words: &[Word], a: Register, b: Register, c: Register) -> Result<Self, Error> {
        let program = Program::new(words)?;
        Ok(Self::new(program, Cpu::new(a, b, c)))
    }

    /// Returns the current state of the [`Cpu`].
    #[inline(always)]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Returns the [`Program`] being executed.
    #[inline(always)]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Returns the values emitted so far.
    #[inline(always)]
    pub fn output(&self) -> &[Word] {
        &self.output
    }

    /// Returns the number of instructions executed so far.
    #[inline(always)]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Returns whether the machine has halted.
    #[inline(always)]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Advances the machine by a single instruction, tracing events using the provided [`Trace`]
    /// implementation.
    ///
    /// Stepping a halted machine does nothing and reports [`StepFlags::HALTED`].
    pub fn step<T>(&mut self, trace: &mut T) -> StepResult
    where
        T: ?Sized + Trace,
    {
        let Some(instruction) = self.fetch() else {
            return StepResult::HALTED;
        };

        let transition = execute(instruction, &self.cpu);
        self.cpu = transition.registers;
        trace.instruction(self.steps, instruction, &self.cpu);
        self.steps += 1;

        let mut result = StepResult::default();

        if transition.jumped {
            result.flags.insert(StepFlags::JUMPED);
        }

        if let Some(value) = transition.output {
            trace.output(self.output.len(), value);
            self.output.push(value);
            result.output = value;
            result.flags.insert(StepFlags::OUTPUT_VALID);
        }

        if self.cpu.ip >= self.program.len() {
            self.halted = true;
            result.flags.insert(StepFlags::HALTED);
            trace.halt(self.steps, &self.cpu);
        }

        result
    }

    /// Runs the program until it halts and returns the final state of the machine.
    ///
    /// This never returns if the program loops forever. Use [`Machine::run_with_limit`] when
    /// running untrusted programs.
    pub fn run(self) -> Outcome {
        self.run_traced(&mut NoopTrace)
    }

    /// Like [`Machine::run`], tracing events with the provided [`Trace`] implementation.
    pub fn run_traced<T>(mut self, trace: &mut T) -> Outcome
    where
        T: ?Sized + Trace,
    {
        while !self.halted {
            self.step(trace);
        }

        self.into_outcome()
    }

    /// Runs the program until it halts, giving up once `limit` instructions have been executed
    /// in total.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::StepLimitExceeded`] if the machine is still running after `limit`
    /// steps.
    pub fn run_with_limit(self, limit: u64) -> Result<Outcome, Error> {
        self.run_with_limit_traced(limit, &mut NoopTrace)
    }

    /// Like [`Machine::run_with_limit`], tracing events with the provided [`Trace`]
    /// implementation.
    pub fn run_with_limit_traced<T>(mut self, limit: u64, trace: &mut T) -> Result<Outcome, Error>
    where
        T: ?Sized + Trace,
    {
        while !self.halted {
            if self.steps >= limit {
                tracing::debug!(limit, ip = self.cpu.ip, "step limit exceeded");
                return Err(Error::StepLimitExceeded { limit });
            }
            self.step(trace);
        }

        Ok(self.into_outcome())
    }

    /// Returns an iterator that lazily runs the machine, yielding values as they are emitted.
    ///
    /// The iterator ends when the machine halts. Values yielded through it are also recorded
    /// in [`Machine::output`].
    pub fn outputs(&mut self) -> Outputs<'_> {
        Outputs { machine: self }
    }

    /// Fetches the instruction referenced by the Instruction Pointer, unless the machine has
    /// halted.
    #[inline]
    fn fetch(&self) -> Option<Instruction> {
        if self.halted {
            None
        } else {
            self.program.fetch(self.cpu.ip)
        }
    }

    fn into_outcome(self) -> Outcome {
        Outcome {
            registers: self.cpu,
            outputs: self.output,
            steps: self.steps,
        }
    }
}

/// The final state of a machine that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The register file at the time the machine halted.
    pub registers: Cpu,
    /// Every value emitted during the run, in order.
    pub outputs: Vec<Word>,
    /// The number of instructions executed.
    pub steps: u64,
}

bitflags! {
    /// What happened during a single step of the machine.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StepFlags: u8 {
        /// A value was emitted by an `out` instruction.
        const OUTPUT_VALID = 1 << 0;
        /// A `jnz` instruction was taken.
        const JUMPED = 1 << 1;
        /// The Instruction Pointer is past the end of the program.
        const HALTED = 1 << 2;
    }
}

/// The result of a single [`Machine::step`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// The emitted value.
    ///
    /// Only holds a meaningful value if the `OUTPUT_VALID` flag is set.
    pub output: Word,
    /// Some flags describing the step.
    pub flags: StepFlags,
}

impl StepResult {
    /// The result reported by a machine that has already halted.
    pub const HALTED: Self = Self {
        output: 0,
        flags: StepFlags::HALTED,
    };

    /// Returns the emitted value, if any.
    #[inline(always)]
    pub fn output(&self) -> Option<Word> {
        if self.flags.contains(StepFlags::OUTPUT_VALID) {
            Some(self.output)
        } else {
            None
        }
    }

    /// Returns whether the machine halted.
    #[inline(always)]
    pub fn is_halted(&self) -> bool {
        self.flags.contains(StepFlags::HALTED)
    }
}

/// The effect of executing a single instruction on a register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// The register file after the instruction, including the updated Instruction Pointer.
    pub registers: Cpu,
    /// The value emitted by the instruction, if any.
    pub output: Option<Word>,
    /// Whether the instruction was a taken `jnz`.
    pub jumped: bool,
}

/// Computes the effect of `instruction` on the register file `cpu`.
///
/// This function is total: OP codes outside of the instruction set leave the registers untouched,
/// and reserved combo operands resolve to zero. In every case the Instruction Pointer is updated
/// exactly once, either by a taken `jnz` or by advancing past the instruction.
pub fn execute(instruction: Instruction, cpu: &Cpu) -> Transition {
    let operand = instruction.operand;
    let mut next = *cpu;
    let mut output = None;

    match instruction.op_code() {
        OpCode::Adv => next.a = divide(cpu.a, cpu.combo(operand)),
        OpCode::Bxl => next.b = cpu.b ^ Register::from(operand),
        OpCode::Bst => next.b = cpu.combo(operand) % 8,
        OpCode::Jnz => (),
        OpCode::Bxc => next.b = cpu.b ^ cpu.c,
        OpCode::Out => output = Some((cpu.combo(operand) % 8) as Word),
        OpCode::Bdv => next.b = divide(cpu.a, cpu.combo(operand)),
        OpCode::Cdv => next.c = divide(cpu.a, cpu.combo(operand)),
        OpCode::Undefined(_) => (),
    }

    // `jnz` does not touch registers, so checking `A` after the instruction is the same as
    // checking it before.
    let jumped = instruction.op_code() == OpCode::Jnz && next.a != 0;
    next.ip = if jumped {
        usize::from(operand)
    } else {
        cpu.ip.saturating_add(2)
    };

    Transition {
        registers: next,
        output,
        jumped,
    }
}

/// Computes `dividend / 2^exponent`, truncating the result.
///
/// Exponents of 64 and above shift every bit out of the register.
#[inline]
fn divide(dividend: Register, exponent: Register) -> Register {
    exponent
        .to_u32()
        .and_then(|shift| dividend.checked_shr(shift))
        .unwrap_or(0)
}

/// An iterator over the values emitted by a running [`Machine`].
///
/// Created by [`Machine::outputs`].
#[derive(Debug)]
pub struct Outputs<'a> {
    machine: &'a mut Machine,
}

impl Iterator for Outputs<'_> {
    type Item = Word;

    fn next(&mut self) -> Option<Word> {
        while !self.machine.is_halted() {
            if let Some(value) = self.machine.step(&mut NoopTrace).output() {
                return Some(value);
            }
        }

        None
    }
}

impl FusedIterator for Outputs<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::RecordingTrace;

    fn run(words: &[Word], a: Register, b: Register, c: Register) -> Outcome {
        Machine::load(words, a, b, c).unwrap().run()
    }

    #[test]
    fn odd_program_fails_to_load() {
        assert_eq!(
            Machine::load(&[0, 1, 5], 0, 0, 0).unwrap_err(),
            Error::InvalidProgram { len: 3 }
        );
    }

    #[test]
    fn adv_with_literal_operand() {
        let outcome = run(&[0, 1], 10, 0, 0);
        assert_eq!(outcome.registers, Cpu { a: 5, b: 0, c: 0, ip: 2 });
        assert!(outcome.outputs.is_empty());
        assert_eq!(outcome.steps, 1);
    }

    #[test]
    fn out_reads_register_a() {
        let outcome = run(&[5, 4], 2, 1, 0);
        assert_eq!(outcome.outputs, [2]);
        assert_eq!(outcome.registers.ip, 2);
    }

    #[test]
    fn bxl_out_and_untaken_jump() {
        let outcome = run(&[1, 5, 5, 0, 3, 0], 0, 9, 0);
        assert_eq!(outcome.registers, Cpu { a: 0, b: 12, c: 0, ip: 6 });
        assert_eq!(outcome.outputs, [0]);
        assert_eq!(outcome.steps, 3);
    }

    #[test]
    fn reserved_combo_operand_is_zero() {
        assert_eq!(run(&[5, 7], 13, 14, 15).outputs, [0]);
        assert_eq!(run(&[0, 7], 10, 0, 0).registers.a, 10);
        assert_eq!(run(&[2, 7], 0, 9, 0).registers.b, 0);
        assert_eq!(run(&[7, 7], 10, 0, 3).registers.c, 10);
    }

    #[test]
    fn golden_trace() {
        let outcome = run(&[0, 1, 5, 4, 3, 0], 729, 0, 0);
        assert_eq!(outcome.outputs, [4, 6, 3, 5, 6, 3, 5, 2, 1, 0]);
        assert_eq!(outcome.registers, Cpu { a: 0, b: 0, c: 0, ip: 6 });
        assert_eq!(outcome.steps, 30);
    }

    #[test]
    fn division_by_one_copies_a() {
        let cpu = Cpu::new(12345, 1, 2);
        assert_eq!(execute(Instruction::new(0, 0), &cpu).registers.a, 12345);
        assert_eq!(execute(Instruction::new(6, 0), &cpu).registers.b, 12345);
        assert_eq!(execute(Instruction::new(7, 0), &cpu).registers.c, 12345);
    }

    #[test]
    fn division_truncates() {
        let cpu = Cpu::new(0b1011_0111, 3, 0);
        assert_eq!(execute(Instruction::new(0, 3), &cpu).registers.a, 0b1_0110);
        assert_eq!(execute(Instruction::new(6, 5), &cpu).registers.b, 0b1_0110);
        assert_eq!(execute(Instruction::new(7, 2), &cpu).registers.c, 0b10_1101);
    }

    #[test]
    fn division_by_huge_power_is_zero() {
        let cpu = Cpu::new(Register::MAX, 64, Register::MAX);
        assert_eq!(execute(Instruction::new(0, 5), &cpu).registers.a, 0);
        assert_eq!(execute(Instruction::new(6, 6), &cpu).registers.b, 0);

        let cpu = Cpu::new(Register::MAX, 63, 0);
        assert_eq!(execute(Instruction::new(7, 5), &cpu).registers.c, 1);
    }

    #[test]
    fn bst_keeps_low_bits_of_combo() {
        let cpu = Cpu::new(29, 0, 0);
        assert_eq!(execute(Instruction::new(2, 4), &cpu).registers.b, 5);
        assert_eq!(execute(Instruction::new(2, 3), &cpu).registers.b, 3);
    }

    #[test]
    fn bxl_uses_raw_operand() {
        // Operand 4 would be register A under combo addressing.
        let cpu = Cpu::new(1000, 0b110, 0);
        assert_eq!(execute(Instruction::new(1, 4), &cpu).registers.b, 0b010);
    }

    #[test]
    fn bxc_ignores_operand() {
        let cpu = Cpu::new(0, 2024, 43690);
        for operand in 0..8 {
            let transition = execute(Instruction::new(4, operand), &cpu);
            assert_eq!(transition.registers.b, 2024 ^ 43690);
            assert_eq!(transition.output, None);
        }
    }

    #[test]
    fn out_emits_low_bits() {
        let cpu = Cpu::new(0, 0, 0o1234567);
        let transition = execute(Instruction::new(5, 6), &cpu);
        assert_eq!(transition.output, Some(7));
        assert_eq!(transition.registers, Cpu { ip: 2, ..cpu });
    }

    #[test]
    fn jnz_with_zero_a_advances() {
        let cpu = Cpu { a: 0, b: 0, c: 0, ip: 4 };
        let transition = execute(Instruction::new(3, 0), &cpu);
        assert!(!transition.jumped);
        assert_eq!(transition.registers.ip, 6);
    }

    #[test]
    fn jnz_jumps_to_any_operand() {
        for operand in 0..8 {
            let cpu = Cpu { a: 1, b: 0, c: 0, ip: 4 };
            let transition = execute(Instruction::new(3, operand), &cpu);
            assert!(transition.jumped);
            assert_eq!(transition.registers.ip, usize::from(operand));
        }
    }

    #[test]
    fn undefined_opcode_only_advances() {
        let cpu = Cpu { a: 7, b: 8, c: 9, ip: 2 };
        let transition = execute(Instruction::new(12, 4), &cpu);
        assert_eq!(transition.registers, Cpu { ip: 4, ..cpu });
        assert_eq!(transition.output, None);
        assert!(!transition.jumped);
    }

    #[test]
    fn jump_to_last_word_reads_zero_operand() {
        // jnz 1 lands on `1, 5` (bxl 5), then on the lone `4` (bxc).
        let mut trace = RecordingTrace::default();
        let outcome = Machine::load(&[3, 1, 5, 4], 1, 0, 0)
            .unwrap()
            .run_traced(&mut trace);

        assert_eq!(outcome.registers, Cpu { a: 1, b: 5, c: 0, ip: 5 });
        assert_eq!(
            trace
                .instructions
                .iter()
                .map(|(instruction, _)| *instruction)
                .collect::<Vec<_>>(),
            [
                Instruction::new(3, 1),
                Instruction::new(1, 5),
                Instruction::new(4, 0)
            ]
        );
        assert_eq!(trace.halted_after, Some(3));
    }

    #[test]
    fn jump_past_end_halts() {
        let mut machine = Machine::load(&[3, 7], 5, 0, 0).unwrap();
        let result = machine.step(&mut NoopTrace);
        assert_eq!(result.flags, StepFlags::JUMPED | StepFlags::HALTED);
        assert_eq!(machine.cpu().ip, 7);
    }

    #[test]
    fn step_reports_output_and_halt() {
        let mut machine = Machine::load(&[5, 4], 2, 1, 0).unwrap();

        let result = machine.step(&mut NoopTrace);
        assert_eq!(result.output(), Some(2));
        assert!(result.is_halted());

        let result = machine.step(&mut NoopTrace);
        assert_eq!(result, StepResult::HALTED);
        assert_eq!(result.output(), None);
        assert_eq!(machine.steps(), 1);
        assert_eq!(machine.output(), [2]);
    }

    #[test]
    fn empty_program_is_halted() {
        let machine = Machine::load(&[], 1, 2, 3).unwrap();
        assert!(machine.is_halted());
        let outcome = machine.run();
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.registers, Cpu::new(1, 2, 3));
    }

    #[test]
    fn step_limit_stops_infinite_loops() {
        let machine = Machine::load(&[3, 0], 1, 0, 0).unwrap();
        assert_eq!(
            machine.run_with_limit(100).unwrap_err(),
            Error::StepLimitExceeded { limit: 100 }
        );
    }

    #[test]
    fn step_limit_allows_exact_budget() {
        let machine = Machine::load(&[0, 1, 5, 4, 3, 0], 729, 0, 0).unwrap();
        assert_eq!(machine.run_with_limit(30).unwrap().steps, 30);

        let machine = Machine::load(&[0, 1, 5, 4, 3, 0], 729, 0, 0).unwrap();
        assert!(machine.run_with_limit(29).is_err());
    }

    #[test]
    fn lazy_outputs_match_run() {
        let words = [0, 1, 5, 4, 3, 0];
        let mut machine = Machine::load(&words, 729, 0, 0).unwrap();

        let mut outputs = machine.outputs();
        assert_eq!(outputs.next(), Some(4));
        assert_eq!(outputs.next(), Some(6));
        let rest: Vec<_> = outputs.collect();

        assert_eq!(rest, [3, 5, 6, 3, 5, 2, 1, 0]);
        assert!(machine.is_halted());
        assert_eq!(machine.output(), run(&words, 729, 0, 0).outputs);
    }

    #[test]
    fn trace_sees_every_event() {
        let mut trace = RecordingTrace::default();
        let outcome = Machine::load(&[0, 1, 5, 4, 3, 0], 729, 0, 0)
            .unwrap()
            .run_traced(&mut trace);

        assert_eq!(trace.outputs, outcome.outputs);
        assert_eq!(trace.instructions.len() as u64, outcome.steps);
        assert_eq!(trace.halted_after, Some(outcome.steps));
        assert_eq!(trace.instructions.last().map(|(_, cpu)| *cpu), Some(outcome.registers));
    }

    #[test]
    fn runs_are_reproducible() {
        let words = [2, 4, 1, 3, 7, 5, 4, 0, 1, 3, 0, 3, 5, 5, 3, 0];
        assert_eq!(run(&words, 51064159, 0, 0), run(&words, 51064159, 0, 0));
    }
}
