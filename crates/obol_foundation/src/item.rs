//! The tagged value type that flows through the engine.
//!
//! Items are cheap to clone: scalars copy, compound items share their
//! backing store through `Rc`. The engine is a single logical thread of
//! control, so interior mutability is `RefCell`, not a lock.
//!
//! Conversion rules are consensus-critical and match the original wire
//! behavior exactly: integers view as little-endian two's complement, an
//! empty byte array is false/zero, and any non-zero byte makes a buffer
//! truthy.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::{Error, Result};
use crate::types::ItemType;

/// An opaque host handle carried on the stack.
///
/// Interop items compare by identity, never by content; the engine only
/// moves them around and hands them back to the host.
pub trait InteropItem: fmt::Debug {
    /// A short label for diagnostics.
    fn kind(&self) -> &'static str;
}

/// A value on the evaluation or alt stack.
#[derive(Clone)]
pub enum StackItem {
    /// Arbitrary-precision signed integer.
    Integer(BigInt),
    /// Raw byte buffer.
    ByteArray(Rc<Vec<u8>>),
    /// Boolean value.
    Boolean(bool),
    /// Ordered sequence, shared on duplication.
    Array(Rc<RefCell<Vec<StackItem>>>),
    /// Ordered sequence, deep-copied on duplication.
    Struct(Rc<RefCell<Vec<StackItem>>>),
    /// Insertion-ordered key/value pairs.
    Map(Rc<RefCell<Vec<(StackItem, StackItem)>>>),
    /// Opaque host handle with identity equality.
    Interop(Rc<dyn InteropItem>),
}

impl StackItem {
    /// Creates an integer item.
    #[must_use]
    pub fn integer(value: impl Into<BigInt>) -> Self {
        Self::Integer(value.into())
    }

    /// Creates a byte-array item.
    #[must_use]
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::ByteArray(Rc::new(value.into()))
    }

    /// Creates a boolean item.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::Boolean(value)
    }

    /// Creates an array item (reference semantics).
    #[must_use]
    pub fn array(items: Vec<StackItem>) -> Self {
        Self::Array(Rc::new(RefCell::new(items)))
    }

    /// Creates a struct item (value semantics on duplication).
    #[must_use]
    pub fn structured(fields: Vec<StackItem>) -> Self {
        Self::Struct(Rc::new(RefCell::new(fields)))
    }

    /// Creates an insertion-ordered map item.
    #[must_use]
    pub fn map(entries: Vec<(StackItem, StackItem)>) -> Self {
        Self::Map(Rc::new(RefCell::new(entries)))
    }

    /// Wraps a host handle.
    #[must_use]
    pub fn interop(handle: Rc<dyn InteropItem>) -> Self {
        Self::Interop(handle)
    }

    /// Returns the type of this item.
    #[must_use]
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Integer(_) => ItemType::Integer,
            Self::ByteArray(_) => ItemType::ByteArray,
            Self::Boolean(_) => ItemType::Boolean,
            Self::Array(_) => ItemType::Array,
            Self::Struct(_) => ItemType::Struct,
            Self::Map(_) => ItemType::Map,
            Self::Interop(_) => ItemType::Interop,
        }
    }

    /// Duplicates this item for a `DUP`-family opcode.
    ///
    /// Arrays and maps share their backing store (the duplicate aliases
    /// the original); structs deep-copy their fields. Nested structs copy
    /// recursively, nested arrays inside a struct stay shared.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        match self {
            Self::Struct(fields) => {
                let copied = fields.borrow().iter().map(StackItem::duplicate).collect();
                Self::Struct(Rc::new(RefCell::new(copied)))
            }
            other => other.clone(),
        }
    }

    /// Converts this item to a boolean.
    ///
    /// Integers are true when non-zero, buffers when any byte is non-zero;
    /// compound items and host handles are always truthy.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Integer(n) => !n.is_zero(),
            Self::ByteArray(bytes) => bytes.iter().any(|&b| b != 0),
            Self::Boolean(b) => *b,
            Self::Array(_) | Self::Struct(_) | Self::Map(_) | Self::Interop(_) => true,
        }
    }

    /// Converts this item to an arbitrary-precision integer.
    ///
    /// Byte buffers decode as little-endian two's complement (the
    /// consensus encoding); booleans decode as 0 or 1. Compound items and
    /// host handles do not convert.
    pub fn as_bigint(&self) -> Result<BigInt> {
        match self {
            Self::Integer(n) => Ok(n.clone()),
            Self::ByteArray(bytes) => Ok(BigInt::from_signed_bytes_le(bytes)),
            Self::Boolean(b) => Ok(BigInt::from(i32::from(*b))),
            other => Err(Error::conversion_failure(
                ItemType::Integer,
                other.item_type(),
            )),
        }
    }

    /// Converts this item to its byte representation.
    ///
    /// Integers encode little-endian two's complement with zero as the
    /// empty buffer; `false` is the empty buffer, `true` is `[1]`.
    pub fn as_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Integer(n) => {
                if n.is_zero() {
                    Ok(Vec::new())
                } else {
                    Ok(n.to_signed_bytes_le())
                }
            }
            Self::ByteArray(bytes) => Ok(bytes.as_ref().clone()),
            Self::Boolean(b) => Ok(if *b { vec![1] } else { Vec::new() }),
            other => Err(Error::conversion_failure(
                ItemType::ByteArray,
                other.item_type(),
            )),
        }
    }

    /// Structural equality for value variants, identity for host handles.
    ///
    /// Scalars compare through their integer or byte view so that
    /// `Integer(1)`, `ByteArray([1])`, and `Boolean(true)` are mutually
    /// equal, as the original engine defines. Compound items compare
    /// element-wise with an `Rc` identity fast path.
    #[must_use]
    pub fn equals(&self, other: &StackItem) -> bool {
        match (self, other) {
            (Self::Interop(a), Self::Interop(b)) => Rc::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) | (Self::Struct(a), Self::Struct(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Self::Map(a), Self::Map(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka.equals(kb) && va.equals(vb))
            }
            (a, b) => match (a.as_bytes(), b.as_bytes()) {
                (Ok(x), Ok(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl fmt::Debug for StackItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "Integer({n})"),
            Self::ByteArray(bytes) => {
                write!(f, "ByteArray(0x")?;
                for b in bytes.iter() {
                    write!(f, "{b:02x}")?;
                }
                write!(f, ")")
            }
            Self::Boolean(b) => write!(f, "Boolean({b})"),
            Self::Array(items) => write!(f, "Array({:?})", items.borrow()),
            Self::Struct(fields) => write!(f, "Struct({:?})", fields.borrow()),
            Self::Map(entries) => write!(f, "Map({:?})", entries.borrow()),
            Self::Interop(handle) => write!(f, "Interop({})", handle.kind()),
        }
    }
}

impl From<i64> for StackItem {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

impl From<bool> for StackItem {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Vec<u8>> for StackItem {
    fn from(value: Vec<u8>) -> Self {
        Self::bytes(value)
    }
}
