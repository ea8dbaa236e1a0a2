//! Builders for hand-written compilation units.
//!
//! Each statement goes on its own line, starting at line 1, so tests can
//! predict the line numbers that end up in diagnostics and line tables.

#![allow(dead_code)]

use quill::prelude::*;
use tracing_subscriber::EnvFilter;

/// Route compiler logs to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A compilation unit under construction.
#[derive(Debug, Default)]
pub struct Program {
    unit: CompilationUnit,
    line: u32,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line the last statement was placed on.
    pub fn line(&self) -> u32 {
        self.line
    }

    fn next_line(&mut self) -> u32 {
        self.line += 1;
        self.line
    }

    pub fn declare(mut self, name: &str, ty: DataType) -> Self {
        let line = self.next_line();
        self.push(Stmt::declaration(Declaration::new(name, ty), line))
    }

    pub fn declare_init(mut self, name: &str, ty: DataType, init: impl FnOnce(u32) -> Expr) -> Self {
        let line = self.next_line();
        let decl = Declaration::new(name, ty).with_initializer(init(line));
        self.push(Stmt::declaration(decl, line))
    }

    pub fn expr(mut self, build: impl FnOnce(u32) -> Expr) -> Self {
        let line = self.next_line();
        self.push(Stmt::expr(build(line)))
    }

    pub fn begin(mut self) -> Self {
        let line = self.next_line();
        self.push(Stmt::begin(line))
    }

    pub fn end(mut self) -> Self {
        let line = self.next_line();
        self.push(Stmt::end(line))
    }

    pub fn enter_if(mut self, condition: impl FnOnce(u32) -> Expr) -> Self {
        let line = self.next_line();
        self.push(Stmt::enter_if(condition(line)))
    }

    pub fn leave_if(mut self) -> Self {
        let line = self.next_line();
        self.push(Stmt::leave_if(line))
    }

    /// Add a function; `build` receives the declaration line.
    pub fn function(mut self, build: impl FnOnce(u32) -> FunctionDecl) -> Self {
        let line = self.next_line();
        self.unit = self.unit.function(build(line));
        self
    }

    pub fn build(self) -> CompilationUnit {
        self.unit
    }

    fn push(mut self, stmt: Stmt) -> Self {
        self.unit = self.unit.statement(stmt);
        self
    }
}

pub fn ident(name: &str, line: u32) -> Expr {
    Expr::ident(name, line)
}

pub fn assign(target: &str, value: Expr, line: u32) -> Expr {
    Expr::assign(AssignOp::Assign, Expr::ident(target, line), value, line)
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr, line: u32) -> Expr {
    Expr::binary(op, left, right, line)
}

pub fn call(name: &str, args: Vec<Expr>, line: u32) -> Expr {
    Expr::call(Expr::ident(name, line), args, line)
}

/// Compile and expect success.
pub fn compile(unit: &mut CompilationUnit) -> Executable {
    init_tracing();
    match Compiler::new().compile(unit) {
        Ok(exe) => exe,
        Err(err) => panic!("compilation failed:\n{}", err),
    }
}

/// Compile and expect user diagnostics.
pub fn diagnostics(unit: &mut CompilationUnit) -> Vec<CompilationError> {
    match Compiler::new().compile(unit) {
        Err(QuillError::Diagnostics(diags)) => diags.into_vec(),
        Err(other) => panic!("expected diagnostics, got internal error: {}", other),
        Ok(_) => panic!("expected diagnostics, compilation succeeded"),
    }
}
