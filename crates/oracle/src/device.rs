//! Defines the [`Device`] trait, the clocked interface of a tribit hardware implementation.
//!
//! A device does not hold the program. Instead, it reports its **Instruction Pointer** and the
//! harness feeds it one (opcode, operand) pair per clock cycle, reading back an output-valid flag,
//! an output word and a halt flag after each edge.

use tribit_vm::cpu::Cpu;
use tribit_vm::instr::Instruction;
use tribit_vm::{execute, Register, StepFlags, Word};

use crate::config::register_mask;

/// The outputs of a device, as sampled after a clock edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    /// The Instruction Pointer reported by the device.
    pub ip: usize,
    /// The output word.
    ///
    /// Only holds a meaningful value if the `OUTPUT_VALID` flag is set.
    pub output: Word,
    /// The output-valid and halt flags. `JUMPED` is not reported by devices.
    pub flags: StepFlags,
}

impl DeviceStatus {
    /// Returns whether the device has halted.
    #[inline(always)]
    pub fn is_halted(&self) -> bool {
        self.flags.contains(StepFlags::HALTED)
    }

    /// Returns the output word, if the device flagged it as valid.
    #[inline(always)]
    pub fn output(&self) -> Option<Word> {
        if self.flags.contains(StepFlags::OUTPUT_VALID) {
            Some(self.output)
        } else {
            None
        }
    }
}

/// A clocked implementation of the tribit machine.
pub trait Device {
    /// Puts the device back in its reset state, with every register cleared.
    fn reset(&mut self);

    /// Loads the initial register values. Only called right after [`Device::reset`].
    fn load_registers(&mut self, a: Register, b: Register, c: Register);

    /// Samples the device's outputs without clocking it.
    fn status(&self) -> DeviceStatus;

    /// Presents `instruction` to the device and triggers a single clock edge.
    fn clock(&mut self, instruction: Instruction) -> DeviceStatus;
}

/// A software [`Device`] built on the reference executor.
///
/// It behaves like the hardware: registers are truncated to a fixed width, and it only knows the
/// length of the program it runs, not its content. It halts as soon as its Instruction Pointer
/// reaches that length.
#[derive(Debug, Clone)]
pub struct ModelDevice {
    /// The number of words in the program this device runs.
    program_len: usize,
    /// The mask applied to every register.
    mask: Register,
    /// The current state of the registers.
    cpu: Cpu,
    /// The outputs sampled after the last clock edge.
    status: DeviceStatus,
}

impl ModelDevice {
    /// Creates a device with `register_bits` wide registers, running a program of `program_len`
    /// words.
    pub fn new(program_len: usize, register_bits: u32) -> Self {
        let mut device = Self {
            program_len,
            mask: register_mask(register_bits),
            cpu: Cpu::default(),
            status: DeviceStatus::default(),
        };
        device.reset();
        device
    }

    /// Returns the current state of the device's registers.
    #[inline(always)]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    fn halt_flag(&self) -> StepFlags {
        if self.cpu.ip >= self.program_len {
            StepFlags::HALTED
        } else {
            StepFlags::empty()
        }
    }
}

impl Device for ModelDevice {
    fn reset(&mut self) {
        self.cpu = Cpu::default();
        self.status = DeviceStatus {
            ip: 0,
            output: 0,
            flags: self.halt_flag(),
        };
    }

    fn load_registers(&mut self, a: Register, b: Register, c: Register) {
        self.cpu.a = a & self.mask;
        self.cpu.b = b & self.mask;
        self.cpu.c = c & self.mask;
    }

    fn status(&self) -> DeviceStatus {
        self.status
    }

    fn clock(&mut self, instruction: Instruction) -> DeviceStatus {
        if self.status.is_halted() {
            return self.status;
        }

        let transition = execute(instruction, &self.cpu);
        self.cpu = Cpu {
            a: transition.registers.a & self.mask,
            b: transition.registers.b & self.mask,
            c: transition.registers.c & self.mask,
            ip: transition.registers.ip,
        };

        let mut flags = self.halt_flag();
        if transition.output.is_some() {
            flags.insert(StepFlags::OUTPUT_VALID);
        }

        self.status = DeviceStatus {
            ip: self.cpu.ip,
            output: transition.output.unwrap_or(0),
            flags,
        };
        self.status
    }
}
