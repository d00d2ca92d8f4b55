//! The execution engine: context stack, shared operand stacks, and the
//! fetch/decode/dispatch loop.
//!
//! One engine is one logical thread of control. It repeatedly asks the
//! current context for the next opcode, dispatches it, and applies the
//! result: continue, halt with success, or fault. Handlers mutate the
//! shared evaluation/alt stacks and, for flow control, the context stack;
//! the loop itself never inspects stack contents.
//!
//! Faults are typed results, never panics or unwinding. Both the
//! evaluation and alt stacks are shared across all call frames of one
//! invocation: a callee sees what the caller pushed, and anything it
//! leaves behind survives `RET`. That is how contracts pass arguments and
//! return values.

#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]


use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use obol_foundation::{Error, ErrorContext, Result, StackItem};

use crate::context::ExecutionContext;
use crate::meter::{Meter, NoMeter};
use crate::opcode::OpCode;
use crate::stack::RandomAccessStack;

/// Flat gas charged per opcode through the metering hook. Weighted
/// pricing tables are host policy, outside the engine.
const UNIT_GAS_COST: u64 = 1;

const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// The engine state machine. `Halted` and `Faulted` are terminal: no
/// further opcodes are dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmState {
    /// Dispatching opcodes.
    Running,
    /// The outermost context returned; the evaluation stack holds the result.
    Halted,
    /// A handler or the meter reported a fault; nothing is usable.
    Faulted,
}

/// What a dispatched opcode asks the loop to do next.
enum Control {
    Continue,
    Halt,
}

/// Engine limits.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Maximum number of simultaneously pushed execution contexts.
    /// The call that would exceed it faults; calls up to it succeed.
    pub max_call_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// The bytecode execution engine.
///
/// Owns the context stack (call stack), the shared evaluation stack, and
/// the shared alt stack for one top-level invocation. Independent engines
/// share nothing.
pub struct Engine {
    /// Call stack; the last element is the current context.
    contexts: Vec<ExecutionContext>,
    evaluation_stack: RandomAccessStack,
    alt_stack: RandomAccessStack,
    state: VmState,
    fault: Option<Error>,
    meter: Box<dyn Meter>,
    config: EngineConfig,
    steps: u64,
}

impl Engine {
    /// Creates an engine over `code` with default limits and no metering.
    #[must_use]
    pub fn new(code: Vec<u8>) -> Self {
        Self::with_config(code, EngineConfig::default())
    }

    /// Creates an engine over `code` with explicit limits.
    #[must_use]
    pub fn with_config(code: Vec<u8>, config: EngineConfig) -> Self {
        Self {
            contexts: vec![ExecutionContext::new(Rc::from(code))],
            evaluation_stack: RandomAccessStack::new(),
            alt_stack: RandomAccessStack::new(),
            state: VmState::Running,
            fault: None,
            meter: Box::new(NoMeter),
            config,
            steps: 0,
        }
    }

    /// Replaces the metering hook.
    #[must_use]
    pub fn with_meter(mut self, meter: Box<dyn Meter>) -> Self {
        self.meter = meter;
        self
    }

    /// The current engine state.
    #[must_use]
    pub fn state(&self) -> VmState {
        self.state
    }

    /// The fault that terminated execution, if any.
    #[must_use]
    pub fn fault(&self) -> Option<&Error> {
        self.fault.as_ref()
    }

    /// Opcodes dispatched so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The shared evaluation stack.
    #[must_use]
    pub fn evaluation_stack(&self) -> &RandomAccessStack {
        &self.evaluation_stack
    }

    /// The shared alt stack.
    #[must_use]
    pub fn alt_stack(&self) -> &RandomAccessStack {
        &self.alt_stack
    }

    /// Number of contexts currently on the call stack.
    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.contexts.len()
    }

    /// The context opcodes are currently fetched from, if any.
    #[must_use]
    pub fn current_context(&self) -> Option<&ExecutionContext> {
        self.contexts.last()
    }

    /// Pushes an item onto the evaluation stack.
    pub fn push(&mut self, item: StackItem) {
        self.evaluation_stack.push(item);
    }

    /// Pops the top of the evaluation stack, faulting on underflow.
    pub fn pop(&mut self) -> Result<StackItem> {
        self.evaluation_stack
            .pop()
            .ok_or_else(Error::stack_underflow)
    }

    /// Runs until a terminal state, returning it on halt and the fault
    /// reason otherwise.
    pub fn run(&mut self) -> Result<VmState> {
        while self.state == VmState::Running {
            self.step()?;
        }
        Ok(self.state)
    }

    /// Dispatches a single opcode.
    ///
    /// On fault the error is recorded on the engine (with the bytecode
    /// position it occurred at) and also returned.
    pub fn step(&mut self) -> Result<()> {
        if self.state != VmState::Running {
            return Ok(());
        }
        let Some(fetch_ip) = self
            .contexts
            .last()
            .map(ExecutionContext::instruction_pointer)
        else {
            self.state = VmState::Halted;
            return Ok(());
        };
        let mut fetched = None;
        match self.step_inner(&mut fetched) {
            Ok(Control::Continue) => Ok(()),
            Ok(Control::Halt) => {
                self.state = VmState::Halted;
                Ok(())
            }
            Err(err) => {
                let err = err.with_context(ErrorContext {
                    ip: fetch_ip,
                    opcode: fetched,
                });
                self.fault = Some(err.clone());
                self.state = VmState::Faulted;
                Err(err)
            }
        }
    }

    fn step_inner(&mut self, fetched: &mut Option<u8>) -> Result<Control> {
        let byte = {
            let ctx = self.context_mut();
            if ctx.instruction_pointer() >= ctx.code_len() {
                // Falling off the end of the code behaves as RET.
                OpCode::Ret.byte()
            } else {
                ctx.read_byte()?
            }
        };
        *fetched = Some(byte);
        let control = self.dispatch(byte)?;
        self.steps += 1;
        if matches!(control, Control::Continue) {
            // The only externally-triggered abort point: after opcode N,
            // before opcode N+1, never mid-opcode.
            self.meter.count_step()?;
            self.meter.charge_gas(UNIT_GAS_COST)?;
        }
        Ok(control)
    }

    fn dispatch(&mut self, byte: u8) -> Result<Control> {
        let op = OpCode::from_byte(byte).ok_or_else(|| Error::unknown_opcode(byte))?;
        match op {
            OpCode::PushBytes(count) => self.op_push_bytes(usize::from(count)),
            OpCode::PushData1 => {
                let count = usize::from(self.context_mut().read_byte()?);
                self.op_push_bytes(count)
            }
            OpCode::PushData2 => {
                let count = usize::from(self.context_mut().read_u16_le()?);
                self.op_push_bytes(count)
            }
            OpCode::PushData4 => {
                let count = self.context_mut().read_u32_le()? as usize;
                self.op_push_bytes(count)
            }
            OpCode::PushInt(value) => {
                self.push(StackItem::integer(value));
                Ok(Control::Continue)
            }

            OpCode::Nop => Ok(Control::Continue),
            OpCode::Jmp | OpCode::JmpIf | OpCode::JmpIfNot => self.op_jmp(op),
            OpCode::Call => self.op_call(),
            OpCode::DynCall => self.op_dyncall(),
            OpCode::Ret => self.op_ret(),

            OpCode::DupFromAltStack => self.op_dup_from_alt_stack(),
            OpCode::ToAltStack => self.op_to_alt_stack(),
            OpCode::FromAltStack => self.op_from_alt_stack(),
            OpCode::XDrop => self.op_xdrop(),
            OpCode::XSwap => self.op_xswap(),
            OpCode::XTuck => self.op_xtuck(),
            OpCode::Depth => self.op_depth(),
            OpCode::Drop => self.op_drop(),
            OpCode::Dup => self.op_dup(),
            OpCode::Nip => self.op_nip(),
            OpCode::Over => self.op_over(),
            OpCode::Pick => self.op_pick(),
            OpCode::Roll => self.op_roll(),
            OpCode::Rot => self.op_rot(),
            OpCode::Swap => self.op_swap(),
            OpCode::Tuck => self.op_tuck(),

            OpCode::Inc => self.op_unary(|a| a + 1),
            OpCode::Dec => self.op_unary(|a| a - 1),
            OpCode::Add => self.op_binary(|a, b| a + b),
            OpCode::Sub => self.op_binary(|a, b| a - b),
        }
    }

    // === Flow control ===

    fn op_jmp(&mut self, op: OpCode) -> Result<Control> {
        let target = {
            let ctx = self.context_mut();
            let offset = i64::from(ctx.read_i16_le()?);
            // The offset is relative to the opcode byte itself; the
            // pointer has already moved 3 bytes past it (1 opcode +
            // 2 operand).
            let target = ctx.instruction_pointer() + offset - 3;
            // target == len(code) is legal: fall-off-the-end halt on the
            // next fetch.
            if target < 0 || target > ctx.code_len() {
                return Err(Error::invalid_jump_target(target));
            }
            target
        };
        let taken = if op == OpCode::Jmp {
            true
        } else {
            let condition = self.pop()?.as_bool();
            if op == OpCode::JmpIfNot {
                !condition
            } else {
                condition
            }
        };
        if taken {
            self.context_mut().set_instruction_pointer(target);
        }
        Ok(Control::Continue)
    }

    fn op_call(&mut self) -> Result<Control> {
        // Snapshot the callee context while the pointer still sits on the
        // jump operand, then advance the caller past the operand so the
        // frame left on the context stack resumes after the full 3-byte
        // CALL instruction.
        let callee = self.context_mut().clone();
        {
            let caller = self.context_mut();
            let resume = caller.instruction_pointer() + 2;
            caller.set_instruction_pointer(resume);
        }
        self.push_context(callee)?;
        self.op_jmp(OpCode::Jmp)
    }

    fn op_dyncall(&mut self) -> Result<Control> {
        let callee = self.context_mut().clone();
        self.push_context(callee)?;
        let dest = self
            .pop()
            .and_then(|item| item.as_bigint())
            .map_err(|_| Error::invalid_call_target(-1))?;
        let target = dest.to_i64().unwrap_or(i64::MAX);
        // Strictly less-than, unlike JMP: a dynamic call must land on an
        // executable instruction, not at end-of-code.
        if target < 0 || target >= self.context_mut().code_len() {
            return Err(Error::invalid_call_target(target));
        }
        self.context_mut().set_instruction_pointer(target);
        Ok(Control::Continue)
    }

    fn op_ret(&mut self) -> Result<Control> {
        self.contexts.pop();
        if self.contexts.is_empty() {
            Ok(Control::Halt)
        } else {
            Ok(Control::Continue)
        }
    }

    // === Push family ===

    fn op_push_bytes(&mut self, count: usize) -> Result<Control> {
        let data = self.context_mut().read_bytes(count)?;
        self.push(StackItem::bytes(data));
        Ok(Control::Continue)
    }

    // === Stack manipulation ===

    fn op_to_alt_stack(&mut self) -> Result<Control> {
        let item = self.pop()?;
        self.alt_stack.push(item);
        Ok(Control::Continue)
    }

    fn op_from_alt_stack(&mut self) -> Result<Control> {
        let item = self.alt_stack.pop().ok_or_else(Error::stack_underflow)?;
        self.push(item);
        Ok(Control::Continue)
    }

    fn op_dup_from_alt_stack(&mut self) -> Result<Control> {
        let item = self
            .alt_stack
            .peek(0)
            .map(StackItem::duplicate)
            .ok_or_else(Error::stack_underflow)?;
        self.push(item);
        Ok(Control::Continue)
    }

    fn op_xdrop(&mut self) -> Result<Control> {
        let n = self.pop_index()?;
        self.evaluation_stack
            .remove(n)
            .ok_or_else(Error::stack_underflow)?;
        Ok(Control::Continue)
    }

    fn op_xswap(&mut self) -> Result<Control> {
        let n = self.pop_index()?;
        if n == 0 {
            return Ok(Control::Continue);
        }
        if !self.evaluation_stack.swap(0, n) {
            return Err(Error::stack_underflow());
        }
        Ok(Control::Continue)
    }

    fn op_xtuck(&mut self) -> Result<Control> {
        let n = self.pop_index()?;
        let top = self.peek_item(0)?.duplicate();
        self.evaluation_stack.insert(n, top);
        Ok(Control::Continue)
    }

    fn op_depth(&mut self) -> Result<Control> {
        let depth = self.evaluation_stack.len();
        self.push(StackItem::integer(BigInt::from(depth)));
        Ok(Control::Continue)
    }

    fn op_drop(&mut self) -> Result<Control> {
        self.pop()?;
        Ok(Control::Continue)
    }

    fn op_dup(&mut self) -> Result<Control> {
        let item = self.peek_item(0)?.duplicate();
        self.push(item);
        Ok(Control::Continue)
    }

    fn op_nip(&mut self) -> Result<Control> {
        let x2 = self.pop()?;
        self.pop()?;
        self.push(x2);
        Ok(Control::Continue)
    }

    fn op_over(&mut self) -> Result<Control> {
        let x2 = self.pop()?;
        let x1 = self.peek_item(0)?.duplicate();
        self.push(x2);
        self.push(x1);
        Ok(Control::Continue)
    }

    fn op_pick(&mut self) -> Result<Control> {
        let n = self.pop_index()?;
        let item = self
            .evaluation_stack
            .peek(n)
            .map(StackItem::duplicate)
            .ok_or_else(Error::stack_underflow)?;
        self.push(item);
        Ok(Control::Continue)
    }

    fn op_roll(&mut self) -> Result<Control> {
        let n = self.pop_index()?;
        if n == 0 {
            return Ok(Control::Continue);
        }
        let item = self
            .evaluation_stack
            .remove(n)
            .ok_or_else(Error::stack_underflow)?;
        self.push(item);
        Ok(Control::Continue)
    }

    fn op_rot(&mut self) -> Result<Control> {
        let x3 = self.pop()?;
        let x2 = self.pop()?;
        let x1 = self.pop()?;
        self.push(x2);
        self.push(x3);
        self.push(x1);
        Ok(Control::Continue)
    }

    fn op_swap(&mut self) -> Result<Control> {
        let x2 = self.pop()?;
        let x1 = self.pop()?;
        self.push(x2);
        self.push(x1);
        Ok(Control::Continue)
    }

    fn op_tuck(&mut self) -> Result<Control> {
        let x2 = self.pop()?;
        let x1 = self.pop()?;
        self.push(x2.duplicate());
        self.push(x1);
        self.push(x2);
        Ok(Control::Continue)
    }

    // === Arithmetic ===

    fn op_unary(&mut self, f: impl FnOnce(BigInt) -> BigInt) -> Result<Control> {
        let a = self.pop_bigint()?;
        self.push(StackItem::integer(f(a)));
        Ok(Control::Continue)
    }

    fn op_binary(&mut self, f: impl FnOnce(BigInt, BigInt) -> BigInt) -> Result<Control> {
        let b = self.pop_bigint()?;
        let a = self.pop_bigint()?;
        self.push(StackItem::integer(f(a, b)));
        Ok(Control::Continue)
    }

    // === Helpers ===

    fn context_mut(&mut self) -> &mut ExecutionContext {
        self.contexts
            .last_mut()
            .expect("a running engine always has a current context")
    }

    fn push_context(&mut self, context: ExecutionContext) -> Result<()> {
        if self.contexts.len() >= self.config.max_call_depth {
            return Err(Error::call_depth_exceeded(self.config.max_call_depth));
        }
        self.contexts.push(context);
        Ok(())
    }

    fn pop_bigint(&mut self) -> Result<BigInt> {
        self.pop()?.as_bigint()
    }

    /// Pops a top-relative stack index. A value that is negative or does
    /// not fit an index names an operand that cannot exist, which is the
    /// same fault as an absent operand.
    fn pop_index(&mut self) -> Result<usize> {
        self.pop_bigint()?
            .to_usize()
            .ok_or_else(Error::stack_underflow)
    }

    fn peek_item(&self, index: usize) -> Result<StackItem> {
        self.evaluation_stack
            .peek(index)
            .cloned()
            .ok_or_else(Error::stack_underflow)
    }
}
