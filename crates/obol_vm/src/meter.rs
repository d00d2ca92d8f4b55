//! The metering hook consulted by the dispatch loop.
//!
//! The engine charges a flat unit of gas and one step after every
//! dispatched opcode, at a fixed point between opcodes, never mid-opcode.
//! Opcode pricing tables are host policy: a meter that wants weighted
//! costs keys them off the step sequence it observes.

use obol_foundation::Result;

/// Gas and step accounting for one invocation.
///
/// Either method returning an error aborts execution with a terminal
/// fault before the next opcode is fetched.
pub trait Meter {
    /// Charges `cost` units of gas; errors with
    /// [`obol_foundation::ErrorKind::GasExhausted`] when the budget is spent.
    fn charge_gas(&mut self, cost: u64) -> Result<()>;

    /// Counts one dispatched opcode; errors with
    /// [`obol_foundation::ErrorKind::StepLimitExceeded`] at the limit.
    fn count_step(&mut self) -> Result<()>;
}

/// The default meter: unlimited gas and steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMeter;

impl Meter for NoMeter {
    fn charge_gas(&mut self, _cost: u64) -> Result<()> {
        Ok(())
    }

    fn count_step(&mut self) -> Result<()> {
        Ok(())
    }
}
