//! Bytecode types for the Quill compiler.
//!
//! - [`OpCode`] - The instruction set and its operand signatures
//! - [`CodeBuffer`] - Growable buffer the emitter writes into
//! - [`BytecodeChunk`] - Finished bytecode for one code body
//! - [`Constant`] and [`ConstantPool`] - Literal storage
//! - [`Executable`] - The artifact handed to the VM

mod buffer;
mod chunk;
mod constant;
mod executable;
mod opcode;

pub use buffer::CodeBuffer;
pub use chunk::BytecodeChunk;
pub use constant::{Constant, ConstantPool};
pub use executable::{CompiledFunction, Executable, Listing, Variable};
pub use opcode::{OpCode, OperandKind};
