//! Abstract syntax tree consumed by the compiler passes.
//!
//! The parser is external: it hands over a [`CompilationUnit`] whose
//! expressions are untyped and whose identifiers are unbound. Semantic
//! analysis mutates the tree in place, and code generation only reads it.
//!
//! All nodes are owned (`Box`/`Vec`) so the analyzer can splice cast nodes
//! into a parent's child slot.

mod decl;
mod expr;
mod ops;
mod stmt;

pub use decl::{Declaration, FunctionDecl, Param};
pub use expr::{
    AssignExpr, BinaryExpr, Binding, CallExpr, CastExpr, Expr, ExprKind, IdentExpr, UnaryExpr,
};
pub use ops::{AssignOp, BinaryOp, OpCategory, UnaryOp};
pub use stmt::{BlockMarker, ConditionalMarker, Stmt, StmtKind};

/// A top-level item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Function declaration
    Function(FunctionDecl),
    /// Top-level statement
    Statement(Stmt),
}

/// One compilation unit: the whole program handed to the compiler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompilationUnit {
    /// Items in source order
    pub items: Vec<Item>,
}

impl CompilationUnit {
    /// Create an empty unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a function.
    pub fn function(mut self, func: FunctionDecl) -> Self {
        self.items.push(Item::Function(func));
        self
    }

    /// Append a top-level statement.
    pub fn statement(mut self, stmt: Stmt) -> Self {
        self.items.push(Item::Statement(stmt));
        self
    }

    /// Append several top-level statements.
    pub fn statements(mut self, stmts: impl IntoIterator<Item = Stmt>) -> Self {
        self.items.extend(stmts.into_iter().map(Item::Statement));
        self
    }

    /// Iterate over the declared functions.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(f) => Some(f),
            Item::Statement(_) => None,
        })
    }
}
