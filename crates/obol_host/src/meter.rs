//! Concrete execution budgets.
//!
//! The engine consults its meter at one fixed point between opcodes; these
//! implementations turn that hook into hard gas and step ceilings. Pricing
//! policy stays here, outside consensus dispatch.

use obol_foundation::{Error, ErrorKind, Result};
use obol_vm::Meter;

/// Meter that faults once a gas budget is spent.
#[derive(Clone, Copy, Debug)]
pub struct GasMeter {
    remaining: u64,
}

impl GasMeter {
    /// Creates a meter with `limit` units of gas.
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self { remaining: limit }
    }

    /// Gas not yet spent.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Meter for GasMeter {
    fn charge_gas(&mut self, cost: u64) -> Result<()> {
        if cost > self.remaining {
            self.remaining = 0;
            return Err(Error::new(ErrorKind::GasExhausted));
        }
        self.remaining -= cost;
        Ok(())
    }

    fn count_step(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Meter that faults once an opcode count is reached.
#[derive(Clone, Copy, Debug)]
pub struct StepMeter {
    remaining: u64,
}

impl StepMeter {
    /// Creates a meter allowing `limit` further opcodes.
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self { remaining: limit }
    }

    /// Steps not yet taken.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl Meter for StepMeter {
    fn charge_gas(&mut self, _cost: u64) -> Result<()> {
        Ok(())
    }

    fn count_step(&mut self) -> Result<()> {
        if self.remaining == 0 {
            return Err(Error::new(ErrorKind::StepLimitExceeded));
        }
        self.remaining -= 1;
        Ok(())
    }
}
