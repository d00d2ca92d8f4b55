//! The consensus opcode set.
//!
//! One byte selects an operation; multi-byte immediates that follow it are
//! little-endian. The byte values are wire-exact: every node must decode
//! the same byte to the same operation or consensus forks.

/// A decoded bytecode operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpCode {
    /// Push the next `n` code bytes as a byte array (`0x00..=0x4B`;
    /// `n == 0` pushes the empty buffer).
    PushBytes(u8),
    /// Push data with a 1-byte length prefix.
    PushData1,
    /// Push data with a 2-byte little-endian length prefix.
    PushData2,
    /// Push data with a 4-byte little-endian length prefix.
    PushData4,
    /// Push a small integer constant (`-1` and `1..=16` have dedicated
    /// opcode bytes).
    PushInt(i8),

    /// No effect.
    Nop,
    /// Unconditional jump, signed 16-bit offset relative to the opcode byte.
    Jmp,
    /// Jump when the popped condition is true.
    JmpIf,
    /// Jump when the popped condition is false.
    JmpIfNot,
    /// Push a return context, then jump; offset operand as `JMP`.
    Call,
    /// Pop the current context; halt when it was the last one.
    Ret,
    /// Push a return context, then jump to a target popped from the
    /// evaluation stack.
    DynCall,

    /// Duplicate the top of the alt stack onto the evaluation stack.
    DupFromAltStack,
    /// Move the top of the evaluation stack onto the alt stack.
    ToAltStack,
    /// Move the top of the alt stack onto the evaluation stack.
    FromAltStack,
    /// Pop `n`; remove the item at depth `n`.
    XDrop,
    /// Pop `n`; swap the top with the item at depth `n`.
    XSwap,
    /// Pop `n`; insert a duplicate of the top at depth `n`.
    XTuck,
    /// Push the evaluation stack item count.
    Depth,
    /// Pop and discard the top item.
    Drop,
    /// Duplicate the top item: `[x] -> [x, x]`
    Dup,
    /// Remove the item below the top: `[x1, x2] -> [x2]`
    Nip,
    /// Copy the item below the top: `[x1, x2] -> [x1, x2, x1]`
    Over,
    /// Pop `n`; push a duplicate of the item at depth `n`.
    Pick,
    /// Pop `n`; move the item at depth `n` to the top.
    Roll,
    /// Rotate the top three items: `[x1, x2, x3] -> [x2, x3, x1]`
    Rot,
    /// Exchange the top two items: `[x1, x2] -> [x2, x1]`
    Swap,
    /// Duplicate the top below the second item: `[x1, x2] -> [x2, x1, x2]`
    Tuck,

    /// Increment: `[a] -> [a + 1]`
    Inc,
    /// Decrement: `[a] -> [a - 1]`
    Dec,
    /// Add: `[a, b] -> [a + b]`
    Add,
    /// Subtract: `[a, b] -> [a - b]`
    Sub,
}

impl OpCode {
    /// Decodes a wire byte, or `None` when no operation is assigned to it.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        #[allow(clippy::cast_possible_wrap)]
        let op = match byte {
            0x00..=0x4B => Self::PushBytes(byte),
            0x4C => Self::PushData1,
            0x4D => Self::PushData2,
            0x4E => Self::PushData4,
            0x4F => Self::PushInt(-1),
            0x51..=0x60 => Self::PushInt((byte - 0x50) as i8),
            0x61 => Self::Nop,
            0x62 => Self::Jmp,
            0x63 => Self::JmpIf,
            0x64 => Self::JmpIfNot,
            0x65 => Self::Call,
            0x66 => Self::Ret,
            0x6A => Self::DupFromAltStack,
            0x6B => Self::ToAltStack,
            0x6C => Self::FromAltStack,
            0x6D => Self::XDrop,
            0x72 => Self::XSwap,
            0x73 => Self::XTuck,
            0x74 => Self::Depth,
            0x75 => Self::Drop,
            0x76 => Self::Dup,
            0x77 => Self::Nip,
            0x78 => Self::Over,
            0x79 => Self::Pick,
            0x7A => Self::Roll,
            0x7B => Self::Rot,
            0x7C => Self::Swap,
            0x7D => Self::Tuck,
            0x8B => Self::Inc,
            0x8C => Self::Dec,
            0x93 => Self::Add,
            0x94 => Self::Sub,
            0xE8 => Self::DynCall,
            _ => return None,
        };
        Some(op)
    }

    /// The wire byte for this operation.
    #[must_use]
    pub fn byte(self) -> u8 {
        #[allow(clippy::cast_sign_loss)]
        match self {
            Self::PushBytes(n) => n,
            Self::PushData1 => 0x4C,
            Self::PushData2 => 0x4D,
            Self::PushData4 => 0x4E,
            Self::PushInt(-1) => 0x4F,
            Self::PushInt(n) => 0x50 + n as u8,
            Self::Nop => 0x61,
            Self::Jmp => 0x62,
            Self::JmpIf => 0x63,
            Self::JmpIfNot => 0x64,
            Self::Call => 0x65,
            Self::Ret => 0x66,
            Self::DupFromAltStack => 0x6A,
            Self::ToAltStack => 0x6B,
            Self::FromAltStack => 0x6C,
            Self::XDrop => 0x6D,
            Self::XSwap => 0x72,
            Self::XTuck => 0x73,
            Self::Depth => 0x74,
            Self::Drop => 0x75,
            Self::Dup => 0x76,
            Self::Nip => 0x77,
            Self::Over => 0x78,
            Self::Pick => 0x79,
            Self::Roll => 0x7A,
            Self::Rot => 0x7B,
            Self::Swap => 0x7C,
            Self::Tuck => 0x7D,
            Self::Inc => 0x8B,
            Self::Dec => 0x8C,
            Self::Add => 0x93,
            Self::Sub => 0x94,
            Self::DynCall => 0xE8,
        }
    }
}
