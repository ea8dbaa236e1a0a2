//! Bytecode emitter for the Quill compiler.
//!
//! The [`BytecodeEmitter`] writes instructions for one code body into a
//! [`CodeBuffer`], adding literals to the shared constant pool and pairing
//! conditional jumps through the shared [`LabelStack`]. Every instruction is
//! checked against its opcode signature before any byte is written.
//!
//! # Example
//!
//! ```
//! use quill_compiler::bytecode::{CodeBuffer, ConstantPool, OpCode};
//! use quill_compiler::emit::{BytecodeEmitter, LabelStack};
//!
//! let mut constants = ConstantPool::new();
//! let mut labels = LabelStack::default();
//! let mut emitter = BytecodeEmitter::new(&mut constants, &mut labels, CodeBuffer::new(0, 10));
//!
//! emitter.set_line(1);
//! emitter.emit_int(1).unwrap();
//! emitter.emit_int(2).unwrap();
//! emitter.emit(OpCode::AddInt).unwrap();
//!
//! let chunk = emitter.finish();
//! chunk.assert_opcodes(&[OpCode::PushInt, OpCode::PushInt, OpCode::AddInt]);
//! ```

mod labels;

pub use labels::{DEFAULT_MAX_LABEL_DEPTH, LabelStack};

use quill_core::InternalError;
use tracing::trace;

use crate::bytecode::{BytecodeChunk, CodeBuffer, ConstantPool, OpCode};

/// Emits bytecode instructions for a single code body.
pub struct BytecodeEmitter<'a> {
    /// Bytes of the body being built
    buffer: CodeBuffer,

    /// Constant pool shared by every body
    constants: &'a mut ConstantPool,

    /// Label ids shared by every body
    labels: &'a mut LabelStack,

    /// Current source line for debug info
    current_line: u32,
}

impl<'a> BytecodeEmitter<'a> {
    /// Create an emitter writing into `buffer`.
    pub fn new(
        constants: &'a mut ConstantPool,
        labels: &'a mut LabelStack,
        buffer: CodeBuffer,
    ) -> Self {
        Self {
            buffer,
            constants,
            labels,
            current_line: 1,
        }
    }

    /// Set current source line for debug info.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    /// Get current source line.
    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Emit an opcode with no operands.
    pub fn emit(&mut self, op: OpCode) -> Result<(), InternalError> {
        self.emit_with(op, &[])
    }

    /// Emit an opcode with its operands.
    pub fn emit_with(&mut self, op: OpCode, operands: &[u16]) -> Result<(), InternalError> {
        let expected = op.signature().len();
        if operands.len() != expected {
            return Err(InternalError::OperandMismatch {
                opcode: op.name(),
                expected,
                found: operands.len(),
            });
        }

        trace!(
            offset = self.buffer.len(),
            op = op.name(),
            ?operands,
            line = self.current_line,
            "emit"
        );
        self.buffer.write_instruction(op, operands, self.current_line);
        Ok(())
    }

    /// Emit an opcode whose single operand is `index`.
    ///
    /// `what` names the indexed table in the error when the index does not
    /// fit in two bytes.
    pub fn emit_index(
        &mut self,
        op: OpCode,
        index: usize,
        what: &'static str,
    ) -> Result<(), InternalError> {
        let operand =
            u16::try_from(index).map_err(|_| InternalError::IndexOverflow { what, index })?;
        self.emit_with(op, &[operand])
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    /// Push an int literal through the constant pool.
    pub fn emit_int(&mut self, value: i32) -> Result<(), InternalError> {
        let index = self.constants.push_int(value);
        self.emit_index(OpCode::PushInt, index, "constant")
    }

    /// Push a double literal through the constant pool.
    pub fn emit_double(&mut self, value: f64) -> Result<(), InternalError> {
        let index = self.constants.push_double(value);
        self.emit_index(OpCode::PushDouble, index, "constant")
    }

    /// Push a boolean literal as the int 0 or 1.
    pub fn emit_bool(&mut self, value: bool) -> Result<(), InternalError> {
        self.emit_int(i32::from(value))
    }

    // ==========================================================================
    // Conditionals
    // ==========================================================================

    /// Issue a label and emit the forward `GOTO` to it.
    pub fn begin_conditional(&mut self) -> Result<u16, InternalError> {
        let id = self.labels.issue()?;
        self.emit_with(OpCode::Goto, &[id])?;
        Ok(id)
    }

    /// Resolve the innermost pending label and emit its `LABEL`.
    pub fn end_conditional(&mut self) -> Result<u16, InternalError> {
        let id = self.labels.resolve()?;
        self.emit_with(OpCode::Label, &[id])?;
        Ok(id)
    }

    // ==========================================================================
    // Finalization
    // ==========================================================================

    /// Bytes emitted so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Finish emission and return the chunk.
    pub fn finish(self) -> BytecodeChunk {
        self.buffer.finish()
    }
}
