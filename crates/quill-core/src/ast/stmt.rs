//! Statement AST nodes.
//!
//! Blocks and conditionals are flattened into marker statements so a pass
//! can react to a block boundary or a conditional edge from its ordinary
//! enter/leave hooks, without the statement list being nested.

use crate::ast::{Declaration, Expr};

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// The statement kind
    pub kind: StmtKind,
    /// Source line
    pub line: u32,
}

/// The kind of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Expression evaluated for its effect
    Expr(Expr),
    /// Variable declaration
    Declaration(Declaration),
    /// Lexical block boundary
    Block(BlockMarker),
    /// Conditional edge
    Conditional(ConditionalMarker),
}

/// Which side of a lexical block a marker sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockMarker {
    /// Block entry
    Begin,
    /// Block exit
    End,
}

/// Which side of a conditional a marker sits on.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalMarker {
    /// Start of a guarded region; holds the condition
    Enter(Expr),
    /// End of the guarded region
    Leave,
}

impl Stmt {
    /// Expression statement, at the expression's line.
    pub fn expr(expr: Expr) -> Self {
        let line = expr.line;
        Self {
            kind: StmtKind::Expr(expr),
            line,
        }
    }

    /// Declaration statement.
    pub fn declaration(decl: Declaration, line: u32) -> Self {
        Self {
            kind: StmtKind::Declaration(decl),
            line,
        }
    }

    /// Block BEGIN marker.
    pub fn begin(line: u32) -> Self {
        Self {
            kind: StmtKind::Block(BlockMarker::Begin),
            line,
        }
    }

    /// Block END marker.
    pub fn end(line: u32) -> Self {
        Self {
            kind: StmtKind::Block(BlockMarker::End),
            line,
        }
    }

    /// Conditional ENTER marker guarding the following statements.
    pub fn enter_if(condition: Expr) -> Self {
        let line = condition.line;
        Self {
            kind: StmtKind::Conditional(ConditionalMarker::Enter(condition)),
            line,
        }
    }

    /// Conditional LEAVE marker.
    pub fn leave_if(line: u32) -> Self {
        Self {
            kind: StmtKind::Conditional(ConditionalMarker::Leave),
            line,
        }
    }
}
