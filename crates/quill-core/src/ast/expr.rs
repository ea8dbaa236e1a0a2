//! Expression AST nodes.
//!
//! Every expression carries its source line and a resolved type slot that
//! stays `None` until semantic analysis assigns it. Cast nodes never come
//! from the parser; the analyzer splices them in around operands that need
//! an implicit int/double conversion.

use std::mem;

use crate::ast::{AssignOp, BinaryOp, UnaryOp};
use crate::{CastKind, DataType, DeclId, FuncId};

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// The node kind and its operands
    pub kind: ExprKind,
    /// Source line
    pub line: u32,
    /// Resolved type, filled in by the analyzer
    pub ty: Option<DataType>,
}

/// The kind of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i32),
    /// Double literal
    Double(f64),
    /// Identifier reference
    Ident(IdentExpr),
    /// Binary operation
    Binary(Box<BinaryExpr>),
    /// Prefix unary operation
    Unary(Box<UnaryExpr>),
    /// Plain or compound assignment
    Assign(Box<AssignExpr>),
    /// Function call
    Call(Box<CallExpr>),
    /// Implicit conversion inserted by the analyzer
    Cast(Box<CastExpr>),
}

/// An identifier reference.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentExpr {
    /// The referenced name
    pub name: String,
    /// What the name resolved to
    pub binding: Option<Binding>,
}

/// The target of a resolved identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// A variable or parameter declaration
    Variable(DeclId),
    /// A function
    Function(FuncId),
}

impl Binding {
    /// Check if the identifier names a function.
    pub fn is_function(self) -> bool {
        matches!(self, Binding::Function(_))
    }
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    /// The operator
    pub op: BinaryOp,
    /// Left operand
    pub left: Expr,
    /// Right operand
    pub right: Expr,
}

/// A prefix unary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    /// The operator
    pub op: UnaryOp,
    /// The operand
    pub operand: Expr,
}

/// An assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    /// Plain or compound operator
    pub op: AssignOp,
    /// Storage target
    pub target: Expr,
    /// Assigned value
    pub value: Expr,
}

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// The called expression, an identifier in well-formed programs
    pub callee: Expr,
    /// Arguments in source order
    pub args: Vec<Expr>,
}

/// A synthetic int/double conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    /// Conversion direction
    pub kind: CastKind,
    /// The converted expression
    pub expr: Expr,
}

impl Expr {
    /// Create an untyped expression.
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Self {
            kind,
            line,
            ty: None,
        }
    }

    /// Boolean literal.
    pub fn bool(value: bool, line: u32) -> Self {
        Self::new(ExprKind::Bool(value), line)
    }

    /// Integer literal.
    pub fn int(value: i32, line: u32) -> Self {
        Self::new(ExprKind::Int(value), line)
    }

    /// Double literal.
    pub fn double(value: f64, line: u32) -> Self {
        Self::new(ExprKind::Double(value), line)
    }

    /// Unresolved identifier.
    pub fn ident(name: impl Into<String>, line: u32) -> Self {
        Self::new(
            ExprKind::Ident(IdentExpr {
                name: name.into(),
                binding: None,
            }),
            line,
        )
    }

    /// Binary operation.
    pub fn binary(op: BinaryOp, left: Expr, right: Expr, line: u32) -> Self {
        Self::new(
            ExprKind::Binary(Box::new(BinaryExpr { op, left, right })),
            line,
        )
    }

    /// Prefix unary operation.
    pub fn unary(op: UnaryOp, operand: Expr, line: u32) -> Self {
        Self::new(ExprKind::Unary(Box::new(UnaryExpr { op, operand })), line)
    }

    /// Assignment of `value` into `target`.
    pub fn assign(op: AssignOp, target: Expr, value: Expr, line: u32) -> Self {
        Self::new(
            ExprKind::Assign(Box::new(AssignExpr { op, target, value })),
            line,
        )
    }

    /// Call of `callee` with `args`.
    pub fn call(callee: Expr, args: Vec<Expr>, line: u32) -> Self {
        Self::new(ExprKind::Call(Box::new(CallExpr { callee, args })), line)
    }

    /// Wrap this expression in a cast node typed by the cast's target.
    pub fn into_cast(self, kind: CastKind) -> Self {
        let line = self.line;
        Self {
            kind: ExprKind::Cast(Box::new(CastExpr { kind, expr: self })),
            line,
            ty: Some(kind.target()),
        }
    }

    /// Replace this expression in place with a cast around it.
    pub fn wrap_in_cast(&mut self, kind: CastKind) {
        let placeholder = Expr::bool(false, self.line);
        let inner = mem::replace(self, placeholder);
        *self = inner.into_cast(kind);
    }

    /// The identifier node, if this is one.
    pub fn as_ident(&self) -> Option<&IdentExpr> {
        match &self.kind {
            ExprKind::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    /// Check if this is a literal.
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Double(_)
        )
    }

    /// Short human-readable name of the node kind.
    pub fn describe(&self) -> &'static str {
        match self.kind {
            ExprKind::Bool(_) => "boolean literal",
            ExprKind::Int(_) => "integer literal",
            ExprKind::Double(_) => "double literal",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Binary(_) => "binary expression",
            ExprKind::Unary(_) => "unary expression",
            ExprKind::Assign(_) => "assignment",
            ExprKind::Call(_) => "function call",
            ExprKind::Cast(_) => "cast",
        }
    }
}
