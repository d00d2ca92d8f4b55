//! Little-endian bytecode assembly.
//!
//! Emits the exact wire encoding the engine decodes: one opcode byte,
//! little-endian immediates, and the shortest push encoding for data and
//! integer constants. Used by tests, benchmarks, and host tooling that
//! needs to synthesize invocation scripts.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::opcode::OpCode;

/// Assembles a bytecode buffer opcode by opcode.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    code: Vec<u8>,
}

impl ScriptBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a single opcode with no immediate operand.
    pub fn emit(&mut self, op: OpCode) -> &mut Self {
        self.code.push(op.byte());
        self
    }

    /// Emits a jump-family opcode (`JMP`, `JMPIF`, `JMPIFNOT`, `CALL`)
    /// with its signed 16-bit offset, relative to the opcode byte.
    pub fn emit_jump(&mut self, op: OpCode, offset: i16) -> &mut Self {
        self.code.push(op.byte());
        self.code.extend_from_slice(&offset.to_le_bytes());
        self
    }

    /// Emits the shortest push encoding for an integer constant.
    pub fn emit_push_int(&mut self, value: impl Into<BigInt>) -> &mut Self {
        let value = value.into();
        if value.is_zero() {
            return self.emit(OpCode::PushBytes(0));
        }
        if value == BigInt::from(-1) {
            return self.emit(OpCode::PushInt(-1));
        }
        if value >= BigInt::from(1) && value <= BigInt::from(16) {
            let small = value.to_i8().unwrap_or(0);
            return self.emit(OpCode::PushInt(small));
        }
        let bytes = value.to_signed_bytes_le();
        self.emit_push_bytes(&bytes)
    }

    /// Emits the shortest push encoding for a data buffer.
    pub fn emit_push_bytes(&mut self, data: &[u8]) -> &mut Self {
        let len = data.len();
        if let Ok(small) = u8::try_from(len) {
            if small <= 0x4B {
                self.code.push(OpCode::PushBytes(small).byte());
                self.code.extend_from_slice(data);
                return self;
            }
            self.code.push(OpCode::PushData1.byte());
            self.code.push(small);
        } else if let Ok(medium) = u16::try_from(len) {
            self.code.push(OpCode::PushData2.byte());
            self.code.extend_from_slice(&medium.to_le_bytes());
        } else {
            self.code.push(OpCode::PushData4.byte());
            let wide = u32::try_from(len).unwrap_or(u32::MAX);
            self.code.extend_from_slice(&wide.to_le_bytes());
        }
        self.code.extend_from_slice(data);
        self
    }

    /// Emits a raw byte, for building deliberately malformed scripts.
    pub fn emit_raw(&mut self, byte: u8) -> &mut Self {
        self.code.push(byte);
        self
    }

    /// Current length of the assembled buffer, the offset of whatever is
    /// emitted next.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.code.len()
    }

    /// Consumes the builder and returns the bytecode.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.code
    }
}
