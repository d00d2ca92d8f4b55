//! Execution contexts, operand stacks, and the bytecode dispatch loop.
//!
//! This crate provides:
//! - [`RandomAccessStack`] - The indexable operand stack
//! - [`ExecutionContext`] - One activation record (code buffer + instruction pointer)
//! - [`Engine`] - The fetch/decode/dispatch loop and its state machine
//! - [`OpCode`] - The consensus opcode set with its wire byte values
//! - [`Meter`] - The gas/step metering hook consulted after every opcode
//! - [`ScriptBuilder`] - Little-endian bytecode assembly for tests and tools
//!
//! Execution is strictly sequential and deterministic; any divergence in
//! stack ordering, jump arithmetic, or overflow behavior between nodes is
//! a consensus fork, so the semantics here are treated as wire-exact.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod builder;
mod context;
mod engine;
mod meter;
mod opcode;
mod stack;

pub use builder::ScriptBuilder;
pub use context::ExecutionContext;
pub use engine::{Engine, EngineConfig, VmState};
pub use meter::{Meter, NoMeter};
pub use opcode::OpCode;
pub use stack::RandomAccessStack;
