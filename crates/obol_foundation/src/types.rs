//! Type descriptors for stack items.

use std::fmt;

/// The type of a [`crate::StackItem`], used in conversion diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// Arbitrary-precision signed integer.
    Integer,
    /// Raw byte buffer.
    ByteArray,
    /// Boolean value.
    Boolean,
    /// Ordered sequence with reference semantics.
    Array,
    /// Ordered sequence with value semantics on duplication.
    Struct,
    /// Insertion-ordered key/value mapping.
    Map,
    /// Opaque host handle.
    Interop,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::ByteArray => "byte-array",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Struct => "struct",
            Self::Map => "map",
            Self::Interop => "interop",
        };
        write!(f, "{name}")
    }
}
