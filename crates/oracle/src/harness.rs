//! Drives a [`Device`] against the reference interpreter.

use tracing::{debug, info, trace};
use tribit_vm::trace::TracingTrace;
use tribit_vm::{Outcome, Register, Word};

use crate::config::OracleConfig;
use crate::device::Device;
use crate::error::{OracleError, Result};
use crate::listing::Listing;

/// Summary of a device run that matched the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The values emitted by the device, identical to the reference stream.
    pub outputs: Vec<Word>,
    /// The number of clock cycles the device took to halt.
    pub cycles: u64,
    /// The number of instructions the reference interpreter executed.
    pub steps: u64,
}

/// Computes reference outputs and checks devices against them.
#[derive(Debug, Clone, Default)]
pub struct Oracle {
    config: OracleConfig,
}

impl Oracle {
    /// Creates a new [`Oracle`] with the provided limits.
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    /// Returns the limits used by this oracle.
    #[inline(always)]
    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Runs the reference interpreter on `listing`.
    ///
    /// # Errors
    ///
    /// Fails if an initial register does not fit in the configured register width, or if the
    /// program does not halt within the step budget.
    pub fn expected(&self, listing: &Listing) -> Result<Outcome> {
        self.config.validate()?;
        for (register, value) in [('A', listing.a), ('B', listing.b), ('C', listing.c)] {
            self.check_width(register, value)?;
        }

        let outcome = listing
            .machine()
            .run_with_limit_traced(self.config.max_steps, &mut TracingTrace)?;
        debug!(
            steps = outcome.steps,
            outputs = outcome.outputs.len(),
            "reference run complete"
        );
        Ok(outcome)
    }

    /// Runs `device` on `listing`, feeding it one instruction per clock cycle, and compares every
    /// value it emits with the reference stream, in order.
    ///
    /// Each cycle, the instruction fed to the device is the one at the Instruction Pointer it
    /// reports. When that pointer is outside of the program, `(0, 0)` is fed instead.
    ///
    /// # Errors
    ///
    /// Besides the errors of [`Oracle::expected`], fails on the first divergence between the
    /// device and the reference, or if the device does not halt within the cycle budget.
    pub fn check<D>(&self, listing: &Listing, device: &mut D) -> Result<Report>
    where
        D: ?Sized + Device,
    {
        let expected = self.expected(listing)?;

        device.reset();
        device.load_registers(listing.a, listing.b, listing.c);

        let mut status = device.status();
        let mut cycles = 0;
        let mut seen = 0;

        while !status.is_halted() {
            if cycles >= self.config.max_cycles {
                return Err(OracleError::Timeout { cycles });
            }

            let instruction = listing.program.fetch(status.ip).unwrap_or_default();
            status = device.clock(instruction);
            cycles += 1;
            trace!(cycle = cycles, %instruction, ip = status.ip, "clocked device");

            let Some(actual) = status.output() else {
                continue;
            };

            match expected.outputs.get(seen) {
                Some(&want) if want == actual => {}
                Some(&want) => {
                    return Err(OracleError::OutputMismatch {
                        index: seen,
                        expected: want,
                        actual,
                    })
                }
                None => {
                    return Err(OracleError::UnexpectedOutput {
                        index: seen,
                        actual,
                    })
                }
            }
            seen += 1;
        }

        if seen != expected.outputs.len() {
            return Err(OracleError::MissingOutputs {
                expected: expected.outputs.len(),
                actual: seen,
            });
        }

        info!(cycles, outputs = seen, "device matched the reference");
        Ok(Report {
            outputs: expected.outputs,
            cycles,
            steps: expected.steps,
        })
    }

    fn check_width(&self, register: char, value: Register) -> Result<()> {
        if value & !self.config.register_mask() != 0 {
            return Err(OracleError::RegisterTooWide {
                register,
                value,
                bits: self.config.register_bits,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tribit_vm::instr::Instruction;
    use tribit_vm::StepFlags;

    use super::*;
    use crate::device::{DeviceStatus, ModelDevice};

    fn golden() -> Listing {
        "Register A: 729\nRegister B: 0\nRegister C: 0\n\nProgram: 0,1,5,4,3,0"
            .parse()
            .unwrap()
    }

    fn model(listing: &Listing) -> ModelDevice {
        ModelDevice::new(listing.program.len(), OracleConfig::default().register_bits)
    }

    /// Wraps a [`ModelDevice`], tampering with what it reports.
    struct Faulty<F> {
        inner: ModelDevice,
        tamper: F,
    }

    impl<F: FnMut(DeviceStatus) -> DeviceStatus> Device for Faulty<F> {
        fn reset(&mut self) {
            self.inner.reset();
        }

        fn load_registers(&mut self, a: Register, b: Register, c: Register) {
            self.inner.load_registers(a, b, c);
        }

        fn status(&self) -> DeviceStatus {
            self.inner.status()
        }

        fn clock(&mut self, instruction: Instruction) -> DeviceStatus {
            let status = self.inner.clock(instruction);
            (self.tamper)(status)
        }
    }

    #[test]
    fn model_matches_golden_trace() {
        let listing = golden();
        let report = Oracle::default()
            .check(&listing, &mut model(&listing))
            .unwrap();
        assert_eq!(report.outputs, [4, 6, 3, 5, 6, 3, 5, 2, 1, 0]);
        assert_eq!(report.cycles, 30);
        assert_eq!(report.steps, 30);
    }

    #[test]
    fn wrong_output_is_reported() {
        let listing = golden();
        let mut device = Faulty {
            inner: model(&listing),
            tamper: |mut status: DeviceStatus| {
                if status.output == 3 {
                    status.output = 2;
                }
                status
            },
        };
        assert!(matches!(
            Oracle::default().check(&listing, &mut device),
            Err(OracleError::OutputMismatch {
                index: 2,
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn surplus_output_is_reported() {
        let listing = golden();
        let mut device = Faulty {
            inner: model(&listing),
            tamper: |mut status: DeviceStatus| {
                if status.is_halted() {
                    status.flags.insert(StepFlags::OUTPUT_VALID);
                    status.output = 7;
                }
                status
            },
        };
        assert!(matches!(
            Oracle::default().check(&listing, &mut device),
            Err(OracleError::UnexpectedOutput {
                index: 10,
                actual: 7
            })
        ));
    }

    #[test]
    fn missing_outputs_are_reported() {
        let listing = golden();
        let mut outputs = 0;
        let mut device = Faulty {
            inner: model(&listing),
            tamper: move |mut status: DeviceStatus| {
                if status.output().is_some() {
                    outputs += 1;
                    if outputs > 4 {
                        status.flags.remove(StepFlags::OUTPUT_VALID);
                    }
                }
                status
            },
        };
        assert!(matches!(
            Oracle::default().check(&listing, &mut device),
            Err(OracleError::MissingOutputs {
                expected: 10,
                actual: 4
            })
        ));
    }

    #[test]
    fn device_that_never_halts_times_out() {
        let listing = golden();
        let mut device = Faulty {
            inner: model(&listing),
            tamper: |mut status: DeviceStatus| {
                status.flags.remove(StepFlags::HALTED);
                status
            },
        };
        let oracle = Oracle::new(OracleConfig {
            max_cycles: 100,
            ..OracleConfig::default()
        });
        assert!(matches!(
            oracle.check(&listing, &mut device),
            Err(OracleError::Timeout { cycles: 100 })
        ));
    }

    #[test]
    fn out_of_range_ip_feeds_zero_instruction() {
        // A device that lost track of its program: once its ip is past the end, it keeps being
        // fed `adv 0`, which changes nothing.
        let listing = golden();
        let mut fed = Vec::new();
        let mut device = Faulty {
            inner: model(&listing),
            tamper: |mut status: DeviceStatus| {
                status.flags.remove(StepFlags::HALTED);
                status
            },
        };
        struct Recorder<'a, D> {
            inner: &'a mut D,
            fed: &'a mut Vec<Instruction>,
        }
        impl<D: Device> Device for Recorder<'_, D> {
            fn reset(&mut self) {
                self.inner.reset();
            }
            fn load_registers(&mut self, a: Register, b: Register, c: Register) {
                self.inner.load_registers(a, b, c);
            }
            fn status(&self) -> DeviceStatus {
                self.inner.status()
            }
            fn clock(&mut self, instruction: Instruction) -> DeviceStatus {
                self.fed.push(instruction);
                self.inner.clock(instruction)
            }
        }

        let oracle = Oracle::new(OracleConfig {
            max_cycles: 32,
            ..OracleConfig::default()
        });
        let result = oracle.check(
            &listing,
            &mut Recorder {
                inner: &mut device,
                fed: &mut fed,
            },
        );

        assert!(matches!(result, Err(OracleError::Timeout { cycles: 32 })));
        assert_eq!(fed[30], Instruction::new(0, 0));
        assert_eq!(fed[31], Instruction::new(0, 0));
    }

    #[test]
    fn register_wider_than_device_is_rejected() {
        let mut listing = golden();
        listing.b = 1 << 48;
        assert!(matches!(
            Oracle::default().expected(&listing),
            Err(OracleError::RegisterTooWide {
                register: 'B',
                bits: 48,
                ..
            })
        ));
    }

    #[test]
    fn reference_step_budget() {
        let listing: Listing = "Register A: 1\nRegister B: 0\nRegister C: 0\nProgram: 3,0"
            .parse()
            .unwrap();
        let oracle = Oracle::new(OracleConfig {
            max_steps: 10,
            ..OracleConfig::default()
        });
        assert!(matches!(
            oracle.expected(&listing),
            Err(OracleError::Vm(
                tribit_vm::error::Error::StepLimitExceeded { limit: 10 }
            ))
        ));
    }
}
