//! Quill: compiler front/middle-end for a small statically typed language.
//!
//! The parser lives elsewhere; this crate takes its tree, checks it and
//! produces bytecode for a stack machine.
//!
//! ```
//! use quill::prelude::*;
//!
//! let mut unit = CompilationUnit::new()
//!     .statement(Stmt::declaration(Declaration::new("x", DataType::Int), 1))
//!     .statement(Stmt::expr(Expr::assign(
//!         AssignOp::Assign,
//!         Expr::ident("x", 2),
//!         Expr::int(7, 2),
//!         2,
//!     )));
//!
//! let exe = Compiler::new().compile(&mut unit).unwrap();
//! assert_eq!(exe.opcodes(), vec![OpCode::PushInt, OpCode::PopStaticInt]);
//! ```

use tracing::debug;

pub use quill_compiler;
pub use quill_core;
pub use quill_core::ast;

use quill_compiler::scope::DEFAULT_MAX_DEPTH;
use quill_compiler::{CodegenOptions, CompilationContext, Executable};
use quill_core::QuillError;
use quill_core::ast::CompilationUnit;

// Re-export main types
pub mod prelude {
    pub use crate::Compiler;
    pub use quill_compiler::bytecode::{
        BytecodeChunk, CompiledFunction, Constant, ConstantPool, Executable, OpCode, Variable,
    };
    pub use quill_compiler::{CodegenOptions, Instruction, disassemble};
    pub use quill_core::ast::{
        AssignOp, BinaryOp, CompilationUnit, Declaration, Expr, FunctionDecl, Stmt, UnaryOp,
    };
    pub use quill_core::{
        CompilationError, DataType, DecodeError, Diagnostics, InternalError, QuillError,
    };
}

/// Runs semantic analysis then code generation over one unit.
#[derive(Debug, Clone)]
pub struct Compiler {
    options: CodegenOptions,
    max_depth: usize,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            options: CodegenOptions::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: CodegenOptions) -> Self {
        self.options = options;
        self
    }

    /// Limit block nesting to `max_depth`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    /// Compile `unit`, annotating it in place.
    ///
    /// Any diagnostic stops the pipeline before code generation and is
    /// returned as [`QuillError::Diagnostics`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&self, unit: &mut CompilationUnit) -> Result<Executable, QuillError> {
        let mut ctx = CompilationContext::with_max_depth(self.max_depth);

        let diagnostics = quill_compiler::analyze(&mut ctx, unit)?;
        if !diagnostics.is_empty() {
            debug!(count = diagnostics.len(), "compilation failed");
            return Err(diagnostics.into());
        }

        let exe = quill_compiler::generate(unit, &self.options)?;
        debug!(
            code = exe.code.len(),
            functions = exe.functions.len(),
            "compilation finished"
        );
        Ok(exe)
    }
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn diagnostics_skip_codegen() {
        let mut unit = CompilationUnit::new().statement(Stmt::expr(Expr::ident("nope", 4)));
        let err = Compiler::new().compile(&mut unit).unwrap_err();
        assert!(err.is_diagnostics());
        assert_eq!(err.to_string(), "line 4: cannot find identifier 'nope'");
    }

    #[test]
    fn depth_limit_is_internal_error() {
        let mut unit = CompilationUnit::new().statements([
            Stmt::begin(1),
            Stmt::begin(2),
            Stmt::end(3),
            Stmt::end(4),
        ]);
        let err = Compiler::new().with_max_depth(1).compile(&mut unit).unwrap_err();
        assert!(matches!(
            err,
            QuillError::Internal(InternalError::CheckpointOverflow { limit: 1 })
        ));
    }
}
