//! Contract storage, overlay caching, and host-boundary interfaces for Obol.
//!
//! This crate provides:
//! - [`Storage`] - The key-value contract storage trait
//! - [`MemoryStorage`] - Ordered in-memory storage for tests and tools
//! - [`OverlayCache`] - Transactional write buffer committed on halt
//! - [`CallBridge`] - The cross-contract/cross-VM invocation boundary
//! - [`GasMeter`] / [`StepMeter`] - Concrete execution budgets
//!
//! Everything here sits outside consensus-critical dispatch: the engine
//! only sees these collaborators through narrow traits, so hosts can swap
//! persistence and pricing policy without touching opcode semantics.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bridge;
mod meter;
mod overlay;
mod storage;

pub use bridge::{CallBridge, CallTarget, VmKind, unknown_contract};
pub use meter::{GasMeter, StepMeter};
pub use overlay::OverlayCache;
pub use storage::{MemoryStorage, Storage};
