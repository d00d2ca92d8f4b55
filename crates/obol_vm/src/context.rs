//! Execution contexts: one activation record in the call stack.
//!
//! A context is a small value type (shared code handle plus instruction
//! pointer) that is cheap to copy; `CALL` snapshots the return address by
//! cloning the current context before the caller's pointer advances past
//! the call instruction. Operand state never lives here; it belongs to
//! the stacks the engine owns.

use std::rc::Rc;

use obol_foundation::{Error, ErrorKind, Result};

/// One activation record: an immutable code buffer and an instruction
/// pointer into it.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    /// The bytecode being executed. Shared, never mutated.
    code: Rc<[u8]>,
    /// Byte offset of the next fetch. Signed so jump arithmetic can
    /// produce (and then reject) negative targets without wrapping.
    ip: i64,
}

impl ExecutionContext {
    /// Creates a context at the start of `code`.
    #[must_use]
    pub fn new(code: Rc<[u8]>) -> Self {
        Self { code, ip: 0 }
    }

    /// Returns the current instruction pointer. No bounds checking at
    /// this layer; the engine validates every read it derives from it.
    #[must_use]
    pub fn instruction_pointer(&self) -> i64 {
        self.ip
    }

    /// Sets the instruction pointer.
    pub fn set_instruction_pointer(&mut self, ip: i64) {
        self.ip = ip;
    }

    /// Read-only view of the code buffer.
    #[must_use]
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Length of the code buffer as pointer-typed arithmetic expects it.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn code_len(&self) -> i64 {
        self.code.len() as i64
    }

    /// Reads the byte at the instruction pointer and advances past it.
    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = self
            .byte_at(self.ip)
            .ok_or_else(|| Error::new(ErrorKind::TruncatedCode))?;
        self.ip += 1;
        Ok(byte)
    }

    /// Reads a signed 16-bit little-endian immediate and advances past it.
    pub fn read_i16_le(&mut self) -> Result<i16> {
        let lo = self.read_byte()?;
        let hi = self.read_byte()?;
        Ok(i16::from_le_bytes([lo, hi]))
    }

    /// Reads an unsigned 16-bit little-endian immediate and advances past it.
    pub fn read_u16_le(&mut self) -> Result<u16> {
        let lo = self.read_byte()?;
        let hi = self.read_byte()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Reads an unsigned 32-bit little-endian immediate and advances past it.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let mut bytes = [0u8; 4];
        for b in &mut bytes {
            *b = self.read_byte()?;
        }
        Ok(u32::from_le_bytes(bytes))
    }

    /// Reads `count` raw bytes and advances past them.
    ///
    /// The length comes from an untrusted length prefix, so it is checked
    /// against the remaining code before any buffer is allocated.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        if self.ip < 0 {
            return Err(Error::new(ErrorKind::TruncatedCode));
        }
        let start = self.ip as usize;
        let end = start
            .checked_add(count)
            .filter(|&end| end <= self.code.len())
            .ok_or_else(|| Error::new(ErrorKind::TruncatedCode))?;
        let out = self.code[start..end].to_vec();
        self.ip += count as i64;
        Ok(out)
    }

    #[allow(clippy::cast_sign_loss)]
    fn byte_at(&self, offset: i64) -> Option<u8> {
        if offset < 0 {
            return None;
        }
        self.code.get(offset as usize).copied()
    }
}
