//! Variable and function declarations.

use crate::ast::{Expr, Stmt};
use crate::{DataType, DeclId, FuncId};

/// A variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Variable name
    pub name: String,
    /// Declared type
    pub ty: DataType,
    /// Optional initializer
    pub initializer: Option<Expr>,
    /// Ledger index, assigned by the analyzer; also the storage slot
    pub id: Option<DeclId>,
}

impl Declaration {
    /// Declaration without an initializer.
    pub fn new(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: name.into(),
            ty,
            initializer: None,
            id: None,
        }
    }

    /// Attach an initializer.
    pub fn with_initializer(mut self, init: Expr) -> Self {
        self.initializer = Some(init);
        self
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: DataType,
    /// Ledger index, assigned when the body is analyzed
    pub id: Option<DeclId>,
}

impl Param {
    /// Create an unresolved parameter.
    pub fn new(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: name.into(),
            ty,
            id: None,
        }
    }
}

/// A function declaration.
///
/// Functions without a body are provided by the host VM.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// Function name
    pub name: String,
    /// Declared return type
    pub return_type: DataType,
    /// Parameters in order
    pub params: Vec<Param>,
    /// Body statements, `None` for host functions
    pub body: Option<Vec<Stmt>>,
    /// Source line
    pub line: u32,
    /// Function table slot, assigned at registration
    pub id: Option<FuncId>,
}

impl FunctionDecl {
    /// Host function signature.
    pub fn new(name: impl Into<String>, return_type: DataType, line: u32) -> Self {
        Self {
            name: name.into(),
            return_type,
            params: Vec::new(),
            body: None,
            line,
            id: None,
        }
    }

    /// Add a parameter.
    pub fn param(mut self, name: impl Into<String>, ty: DataType) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    /// Attach a body.
    pub fn with_body(mut self, body: Vec<Stmt>) -> Self {
        self.body = Some(body);
        self
    }

    /// Parameter types in order.
    pub fn param_types(&self) -> Vec<DataType> {
        self.params.iter().map(|p| p.ty).collect()
    }

    /// Check if the function is provided by the host.
    pub fn is_host(&self) -> bool {
        self.body.is_none()
    }
}
