//! Obol - Deterministic stack-based bytecode engine
//!
//! This crate re-exports all layers of the Obol engine for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: obol_runtime    — Invocation driver, receipts, sessions
//! Layer 2: obol_host       — Contract storage, overlays, call bridge, meters
//! Layer 1: obol_vm         — Contexts, operand stacks, dispatch loop
//! Layer 0: obol_foundation — Core types (StackItem, Error)
//! ```

pub use obol_foundation as foundation;
pub use obol_host as host;
pub use obol_runtime as runtime;
pub use obol_vm as vm;
