//! Stack-item value model and error types for Obol.
//!
//! This crate provides:
//! - [`StackItem`] - The tagged value type that flows through the engine
//! - [`ItemType`] - Type descriptors for conversion diagnostics
//! - [`Error`] - Typed fault reasons with execution context
//!
//! Everything here is deterministic: conversions, equality, and byte
//! encodings are bit-exact so that every node agrees on contract results.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod item;
mod types;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use item::{InteropItem, StackItem};
pub use types::ItemType;
