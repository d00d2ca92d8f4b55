//! The cross-contract invocation boundary.
//!
//! A contract may call into another contract that runs under a different
//! engine entirely. The bytecode engine never embeds those engines; it
//! hands a [`CallTarget`] to a [`CallBridge`] and receives an opaque
//! result buffer. Hosts decide how addresses resolve and what each VM
//! kind actually executes.

use std::fmt;

use obol_foundation::{Error, ErrorKind, Result};

/// Which engine a resolved contract runs under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmKind {
    /// Host-provided builtin, no bytecode involved.
    Native,
    /// The stack-based bytecode engine in this workspace.
    Bytecode,
    /// An external WASM engine behind the host boundary.
    Wasm,
}

impl fmt::Display for VmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Bytecode => write!(f, "bytecode"),
            Self::Wasm => write!(f, "wasm"),
        }
    }
}

/// One cross-contract invocation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallTarget {
    /// Address of the contract being invoked.
    pub address: Vec<u8>,
    /// Method name within the contract.
    pub method: String,
    /// Serialized arguments, outermost first.
    pub args: Vec<Vec<u8>>,
}

impl CallTarget {
    /// Creates a target for `method` on the contract at `address`.
    #[must_use]
    pub fn new(address: Vec<u8>, method: impl Into<String>) -> Self {
        Self {
            address,
            method: method.into(),
            args: Vec::new(),
        }
    }

    /// Appends a serialized argument.
    #[must_use]
    pub fn with_arg(mut self, arg: Vec<u8>) -> Self {
        self.args.push(arg);
        self
    }
}

/// Resolves and executes cross-contract calls.
pub trait CallBridge {
    /// The VM kind the contract at `address` runs under.
    fn resolve(&self, address: &[u8]) -> Result<VmKind>;

    /// Invokes `target` and returns its serialized result.
    fn invoke(&mut self, target: &CallTarget) -> Result<Vec<u8>>;
}

/// Builds the fault a bridge reports when an address resolves to nothing.
#[must_use]
pub fn unknown_contract(address: &[u8]) -> Error {
    Error::new(ErrorKind::HostCallFailed(format!(
        "no contract at address {address:02x?}"
    )))
}
