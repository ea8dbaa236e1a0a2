//! Operator definitions for Quill expressions.
//!
//! Provides enums for binary, unary, and assignment operators along with
//! the category each binary operator belongs to for type checking.

use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,

    // Relational
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,

    // Equality
    /// `==`
    Equal,
    /// `!=`
    NotEqual,

    // Logical
    /// `&&`
    LogicalAnd,
    /// `||`
    LogicalOr,
}

/// Type-checking category of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCategory {
    /// `+ - * / %`: numeric operands, numeric result.
    Arithmetic,
    /// `> >= < <=`: numeric operands, boolean result.
    Relational,
    /// `== !=`: matching operands, boolean result.
    Equality,
    /// `&& ||`: boolean operands, boolean result.
    Logical,
}

impl BinaryOp {
    /// Category used by the analyzer and code generator.
    pub fn category(self) -> OpCategory {
        use BinaryOp::*;
        match self {
            Add | Sub | Mul | Div | Mod => OpCategory::Arithmetic,
            Greater | GreaterEqual | Less | LessEqual => OpCategory::Relational,
            Equal | NotEqual => OpCategory::Equality,
            LogicalAnd | LogicalOr => OpCategory::Logical,
        }
    }

    /// Source symbol.
    pub fn symbol(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Greater => ">",
            GreaterEqual => ">=",
            Less => "<",
            LessEqual => "<=",
            Equal => "==",
            NotEqual => "!=",
            LogicalAnd => "&&",
            LogicalOr => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `!`
    LogicalNot,
    /// `++`
    PreInc,
    /// `--`
    PreDec,
}

impl UnaryOp {
    /// Source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::LogicalNot => "!",
            UnaryOp::PreInc => "++",
            UnaryOp::PreDec => "--",
        }
    }

    /// Whether the operator stores back into its operand.
    pub fn is_mutating(self) -> bool {
        matches!(self, UnaryOp::PreInc | UnaryOp::PreDec)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `%=`
    ModAssign,
}

impl AssignOp {
    /// The arithmetic operator a compound assignment applies, if any.
    pub fn arithmetic(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinaryOp::Add),
            AssignOp::SubAssign => Some(BinaryOp::Sub),
            AssignOp::MulAssign => Some(BinaryOp::Mul),
            AssignOp::DivAssign => Some(BinaryOp::Div),
            AssignOp::ModAssign => Some(BinaryOp::Mod),
        }
    }

    /// Check if this is a compound operator.
    pub fn is_compound(self) -> bool {
        self != AssignOp::Assign
    }

    /// Source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
        }
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
