//! Growable code buffer used while emitting.
//!
//! Capacity is grown in fixed increments, always before the write that
//! would need it: before an instruction is written the buffer makes room
//! for its opcode byte plus every operand in its signature.

use tracing::debug;

use super::{BytecodeChunk, OpCode};

/// Byte buffer with an explicit capacity and write cursor.
#[derive(Debug, Clone)]
pub struct CodeBuffer {
    /// Allocated bytes; `code.len()` is the capacity.
    code: Vec<u8>,
    /// Source line per allocated byte.
    lines: Vec<u32>,
    /// Write cursor.
    pos: usize,
    /// Growth step.
    increment: usize,
    /// Number of times the buffer grew.
    grows: usize,
}

impl CodeBuffer {
    /// Buffer with `initial_capacity` bytes growing by `increment`.
    pub fn new(initial_capacity: usize, increment: usize) -> Self {
        Self {
            code: vec![0; initial_capacity],
            lines: vec![0; initial_capacity],
            pos: 0,
            increment: increment.max(1),
            grows: 0,
        }
    }

    /// Make room for `bytes` more bytes at the cursor.
    fn reserve(&mut self, bytes: usize) {
        let needed = self.pos + bytes;
        if needed <= self.code.len() {
            return;
        }

        let mut capacity = self.code.len();
        while capacity < needed {
            capacity += self.increment;
        }
        debug!(from = self.code.len(), to = capacity, "growing code buffer");
        self.code.resize(capacity, 0);
        self.lines.resize(capacity, 0);
        self.grows += 1;
    }

    fn put(&mut self, byte: u8, line: u32) {
        self.code[self.pos] = byte;
        self.lines[self.pos] = line;
        self.pos += 1;
    }

    /// Write one instruction.
    ///
    /// The caller has already checked `operands` against the signature.
    pub(crate) fn write_instruction(&mut self, op: OpCode, operands: &[u16], line: u32) {
        self.reserve(op.encoded_size());
        self.put(op.byte(), line);
        for &operand in operands {
            let [high, low] = operand.to_be_bytes();
            self.put(high, line);
            self.put(low, line);
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.pos
    }

    /// Check if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Allocated bytes.
    pub fn capacity(&self) -> usize {
        self.code.len()
    }

    /// Number of growth steps taken.
    pub fn grow_count(&self) -> usize {
        self.grows
    }

    /// The written bytes.
    pub fn code(&self) -> &[u8] {
        &self.code[..self.pos]
    }

    /// Freeze the written bytes into a chunk.
    pub fn finish(mut self) -> BytecodeChunk {
        self.code.truncate(self.pos);
        self.lines.truncate(self.pos);
        BytecodeChunk::from_parts(self.code, self.lines)
    }
}
