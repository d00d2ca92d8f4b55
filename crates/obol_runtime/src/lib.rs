//! Invocation driver and receipt production for Obol.
//!
//! This crate provides:
//! - [`Executor`] - Builds a metered engine per invocation and runs it to
//!   a terminal state
//! - [`Receipt`] - The durable record of one invocation
//! - [`Session`] - Executor plus transactional storage: overlay writes
//!   commit on halt and are discarded on fault
//!
//! The driver owns policy (budgets, depth limits, storage transactions);
//! the engine underneath owns nothing but opcode semantics.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use obol_foundation::{Error, Result, StackItem};
use obol_host::{GasMeter, OverlayCache, StepMeter, Storage};
use obol_vm::{Engine, EngineConfig, Meter, VmState};

/// Both budget dimensions behind the engine's single meter hook.
struct BudgetMeter {
    gas: Option<GasMeter>,
    steps: Option<StepMeter>,
}

impl Meter for BudgetMeter {
    fn charge_gas(&mut self, cost: u64) -> Result<()> {
        match &mut self.gas {
            Some(meter) => meter.charge_gas(cost),
            None => Ok(()),
        }
    }

    fn count_step(&mut self) -> Result<()> {
        match &mut self.steps {
            Some(meter) => meter.count_step(),
            None => Ok(()),
        }
    }
}

/// The durable record of one invocation.
#[derive(Clone, Debug)]
pub struct Receipt {
    /// Terminal engine state, `Halted` or `Faulted`.
    pub state: VmState,
    /// Opcodes dispatched before termination.
    pub steps: u64,
    /// Evaluation stack at termination, bottom first.
    pub stack: Vec<StackItem>,
    /// The fault reason when `state` is `Faulted`.
    pub fault: Option<Error>,
}

impl Receipt {
    /// Whether the invocation ran to completion.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == VmState::Halted
    }

    /// The top of the result stack, if anything was left on it.
    #[must_use]
    pub fn top(&self) -> Option<&StackItem> {
        self.stack.last()
    }
}

/// Per-invocation engine driver with configurable budgets.
#[derive(Clone, Copy, Debug, Default)]
pub struct Executor {
    config: EngineConfig,
    gas_limit: Option<u64>,
    step_limit: Option<u64>,
}

impl Executor {
    /// Creates a driver with default limits and unbounded budgets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps total gas for each invocation.
    #[must_use]
    pub fn with_gas_limit(mut self, limit: u64) -> Self {
        self.gas_limit = Some(limit);
        self
    }

    /// Caps dispatched opcodes for each invocation.
    #[must_use]
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Caps the context call stack for each invocation.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    /// Runs `code` to a terminal state and records the outcome.
    ///
    /// A fault is an outcome, not an error: it comes back inside the
    /// receipt so the caller can persist it alongside successes.
    #[must_use]
    pub fn execute(&self, code: Vec<u8>) -> Receipt {
        let meter = BudgetMeter {
            gas: self.gas_limit.map(GasMeter::new),
            steps: self.step_limit.map(StepMeter::new),
        };
        let mut engine = Engine::with_config(code, self.config).with_meter(Box::new(meter));
        let _ = engine.run();
        Receipt {
            state: engine.state(),
            steps: engine.steps(),
            stack: engine.evaluation_stack().items().to_vec(),
            fault: engine.fault().cloned(),
        }
    }
}

/// An executor bound to transactional contract storage.
pub struct Session<S: Storage> {
    executor: Executor,
    storage: S,
}

impl<S: Storage> Session<S> {
    /// Creates a session driving invocations against `storage`.
    pub fn new(executor: Executor, storage: S) -> Self {
        Self { executor, storage }
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the session, returning its storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Runs `code` with storage effects staged by `stage` on an overlay.
    ///
    /// The overlay commits only when the invocation halts; a fault leaves
    /// storage exactly as it was. Commit failures surface as errors.
    pub fn execute_staged<F>(&mut self, code: Vec<u8>, stage: F) -> Result<Receipt>
    where
        F: FnOnce(&mut OverlayCache<'_, S>),
    {
        let mut overlay = OverlayCache::new(&mut self.storage);
        stage(&mut overlay);
        let receipt = self.executor.execute(code);
        if receipt.succeeded() {
            overlay.commit()?;
        }
        Ok(receipt)
    }

    /// Runs `code` with no storage effects.
    #[must_use]
    pub fn execute(&self, code: Vec<u8>) -> Receipt {
        self.executor.execute(code)
    }
}
