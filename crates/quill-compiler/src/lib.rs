//! Quill Compiler
//!
//! Turns a parsed [`CompilationUnit`](quill_core::ast::CompilationUnit) into
//! stack-machine bytecode.
//!
//! ## Architecture
//!
//! - **Pass 1 (Analysis)**: Resolve names through the scope ledger, type
//!   every expression and splice in implicit conversions
//! - **Pass 2 (Generation)**: Walk the annotated tree and emit bytecode
//!
//! Both passes are driven by the same traversal engine.
//!
//! ## Modules
//!
//! - [`bytecode`]: Opcodes, chunks, the constant pool and the executable
//! - [`codegen`]: Code generation visitor
//! - [`context`]: Compilation context owning the scope ledger
//! - [`disasm`]: Bytecode decoder
//! - [`emit`]: Low-level bytecode emitter and label allocation
//! - [`scope`]: Checkpointed declaration history
//! - [`semantic`]: Semantic analysis visitor
//! - [`visit`]: Traversal engine

pub mod bytecode;
pub mod codegen;
pub mod context;
pub mod disasm;
pub mod emit;
pub mod scope;
pub mod semantic;
pub mod visit;

pub use bytecode::{BytecodeChunk, Constant, ConstantPool, Executable, OpCode};
pub use codegen::{CodeGenerator, CodegenOptions, generate};
pub use context::CompilationContext;
pub use disasm::{Instruction, disassemble};
pub use emit::{BytecodeEmitter, LabelStack};
pub use scope::{Border, ScopeLedger};
pub use semantic::{SemanticAnalyzer, analyze};
pub use visit::{Visitor, VisitorMut};

// Re-export the error types from core for convenience
pub use quill_core::{CompilationError, Diagnostics, InternalError};
