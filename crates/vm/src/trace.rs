//! Defines the [`Trace`] trait, used to gather information about the execution of a tribit
//! program within the virtual machine.

use crate::cpu::Cpu;
use crate::instr::Instruction;
use crate::Word;

/// A collection of callbacks to be called during the execution of a tribit program.
#[allow(unused_variables)]
pub trait Trace {
    /// Called after an instruction has been executed.
    ///
    /// `step` is the zero-based index of the instruction in the run, and `cpu` is the state of
    /// the register file once the instruction has been applied.
    fn instruction(&mut self, step: u64, instruction: Instruction, cpu: &Cpu) {}

    /// Called when the machine emits a value. `index` is its position in the output stream.
    fn output(&mut self, index: usize, value: Word) {}

    /// Called once, when the Instruction Pointer leaves the program.
    fn halt(&mut self, steps: u64, cpu: &Cpu) {}
}

/// An implementation of [`Trace`] that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrace;
impl Trace for NoopTrace {}

/// An implementation of [`Trace`] that forwards every event to [`tracing`].
///
/// Instructions are reported at the `TRACE` level, outputs and halts at `DEBUG`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTrace;

impl Trace for TracingTrace {
    fn instruction(&mut self, step: u64, instruction: Instruction, cpu: &Cpu) {
        tracing::trace!(
            step,
            %instruction,
            a = cpu.a,
            b = cpu.b,
            c = cpu.c,
            ip = cpu.ip,
            "executed"
        );
    }

    fn output(&mut self, index: usize, value: Word) {
        tracing::debug!(index, value, "output");
    }

    fn halt(&mut self, steps: u64, cpu: &Cpu) {
        tracing::debug!(steps, a = cpu.a, b = cpu.b, c = cpu.c, ip = cpu.ip, "halted");
    }
}

/// An implementation of [`Trace`] that records every event, mostly useful in tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingTrace {
    /// Every executed instruction, with the register file it produced.
    pub instructions: Vec<(Instruction, Cpu)>,
    /// Every emitted value, in order.
    pub outputs: Vec<Word>,
    /// The number of steps the machine halted after, if it did.
    pub halted_after: Option<u64>,
}

impl Trace for RecordingTrace {
    fn instruction(&mut self, _step: u64, instruction: Instruction, cpu: &Cpu) {
        self.instructions.push((instruction, *cpu));
    }

    fn output(&mut self, _index: usize, value: Word) {
        self.outputs.push(value);
    }

    fn halt(&mut self, steps: u64, _cpu: &Cpu) {
        self.halted_after = Some(steps);
    }
}
