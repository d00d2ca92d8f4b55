//! Error types for the Obol engine.
//!
//! Uses `thiserror` for ergonomic error definition. Every variant is a
//! FAULT reason: faults are terminal and non-retryable, so there is no
//! recovery machinery here, only precise diagnostics for the caller.

use std::fmt;

use thiserror::Error;

use crate::types::ItemType;

/// Convenient result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Obol operations.
#[derive(Clone, Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of fault that occurred.
    pub kind: ErrorKind,
    /// Optional context about where in the bytecode the fault occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds execution context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a stack underflow error.
    #[must_use]
    pub fn stack_underflow() -> Self {
        Self::new(ErrorKind::StackUnderflow)
    }

    /// Creates a conversion failure error.
    #[must_use]
    pub fn conversion_failure(expected: ItemType, actual: ItemType) -> Self {
        Self::new(ErrorKind::ConversionFailure { expected, actual })
    }

    /// Creates an invalid jump target error.
    #[must_use]
    pub fn invalid_jump_target(target: i64) -> Self {
        Self::new(ErrorKind::InvalidJumpTarget(target))
    }

    /// Creates an invalid dynamic-call target error.
    #[must_use]
    pub fn invalid_call_target(target: i64) -> Self {
        Self::new(ErrorKind::InvalidCallTarget(target))
    }

    /// Creates an unknown opcode error.
    #[must_use]
    pub fn unknown_opcode(byte: u8) -> Self {
        Self::new(ErrorKind::UnknownOpcode(byte))
    }

    /// Creates a call-depth exceeded error.
    #[must_use]
    pub fn call_depth_exceeded(limit: usize) -> Self {
        Self::new(ErrorKind::CallDepthExceeded(limit))
    }
}

/// Categorized fault kinds for pattern matching.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required operand was absent from the evaluation or alt stack.
    #[error("stack underflow: required operand absent")]
    StackUnderflow,

    /// An item could not convert to the type an opcode requires.
    #[error("conversion failure: expected {expected}, got {actual}")]
    ConversionFailure {
        /// The type the opcode required.
        expected: ItemType,
        /// The type actually present.
        actual: ItemType,
    },

    /// A static jump landed outside `[0, len(code)]`.
    #[error("invalid jump target: {0}")]
    InvalidJumpTarget(i64),

    /// A dynamic call landed outside `[0, len(code))` or the target
    /// could not be popped as an integer.
    #[error("invalid dynamic call target: {0}")]
    InvalidCallTarget(i64),

    /// The context stack exceeded the configured depth limit.
    #[error("call depth limit exceeded: {0}")]
    CallDepthExceeded(usize),

    /// The metering hook denied further gas.
    #[error("gas exhausted")]
    GasExhausted,

    /// The metering hook denied further steps.
    #[error("step limit exceeded")]
    StepLimitExceeded,

    /// No handler exists for the fetched byte.
    #[error("unknown opcode: 0x{0:02x}")]
    UnknownOpcode(u8),

    /// An immediate operand extended past the end of the code buffer.
    #[error("truncated code: operand past end of buffer")]
    TruncatedCode,

    /// The host-call boundary rejected or failed an invocation.
    #[error("host call failed: {0}")]
    HostCallFailed(String),

    /// A storage key was not resolvable by the host layer.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Where in the bytecode a fault occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorContext {
    /// Instruction pointer at the time of the fault (position of the
    /// opcode byte, before its operands were consumed).
    pub ip: i64,
    /// The opcode byte being dispatched, if one was fetched.
    pub opcode: Option<u8>,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Some(op) => write!(f, "at ip {} (opcode 0x{op:02x})", self.ip),
            None => write!(f, "at ip {}", self.ip),
        }
    }
}
