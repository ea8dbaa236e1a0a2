//! Error types for every phase of Quill compilation.
//!
//! ## Error Hierarchy
//!
//! ```text
//! QuillError (top-level wrapper)
//! ├── Diagnostics      - user mistakes collected by semantic analysis
//! │   └── CompilationError (one per problem)
//! ├── InternalError    - broken invariants between passes (compiler bugs)
//! └── DecodeError      - bytecode that violates the opcode table
//! ```
//!
//! User diagnostics never stop a pass; they are collected in order and
//! code generation is skipped when any were recorded. Internal errors
//! abort the compilation immediately.

use std::fmt;

use thiserror::Error;

use crate::DataType;

// ============================================================================
// User Diagnostics
// ============================================================================

/// A problem in the user's program, found during semantic analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// An identifier did not resolve to a visible variable or function.
    #[error("line {line}: cannot find identifier '{name}'")]
    UnknownIdentifier {
        /// The name that was looked up.
        name: String,
        /// Line of the reference.
        line: u32,
    },

    /// Operand or value types are incompatible.
    #[error("line {line}: {message}")]
    TypeMismatch {
        /// Description of the mismatch.
        message: String,
        /// Line of the offending expression.
        line: u32,
    },

    /// A name was declared twice in the same block, or a function twice.
    #[error("line {line}: identifier '{name}' is already defined")]
    DuplicateDefinition {
        /// The duplicated name.
        name: String,
        /// Line of the second declaration.
        line: u32,
    },

    /// A call passed the wrong number of arguments.
    #[error(
        "line {line}: argument count mismatch in call to '{name}': requires {expected}, passed {found}"
    )]
    ArgumentCountMismatch {
        /// Name of the called function.
        name: String,
        /// Number of declared parameters.
        expected: usize,
        /// Number of arguments passed.
        found: usize,
        /// Line of the call.
        line: u32,
    },

    /// An operator was applied to an operand it does not accept.
    #[error("line {line}: {message}")]
    InvalidOperand {
        /// Description of what's invalid.
        message: String,
        /// Line of the operator.
        line: u32,
    },

    /// The left-hand side of an assignment cannot be stored to.
    #[error("line {line}: left-hand side of assignment is not assignable")]
    NotAssignable {
        /// Line of the assignment.
        line: u32,
    },

    /// Something other than a function was called.
    #[error("line {line}: '{name}' is not a function")]
    NotCallable {
        /// Text of the callee.
        name: String,
        /// Line of the call.
        line: u32,
    },
}

impl CompilationError {
    /// Source line the diagnostic points at.
    pub fn line(&self) -> u32 {
        match self {
            CompilationError::UnknownIdentifier { line, .. } => *line,
            CompilationError::TypeMismatch { line, .. } => *line,
            CompilationError::DuplicateDefinition { line, .. } => *line,
            CompilationError::ArgumentCountMismatch { line, .. } => *line,
            CompilationError::InvalidOperand { line, .. } => *line,
            CompilationError::NotAssignable { line } => *line,
            CompilationError::NotCallable { line, .. } => *line,
        }
    }
}

/// Ordered log of diagnostics produced by one analysis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics(Vec<CompilationError>);

impl Diagnostics {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn push(&mut self, error: CompilationError) {
        self.0.push(error);
    }

    /// Whether no problems were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded problems.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, CompilationError> {
        self.0.iter()
    }

    /// View as a slice.
    pub fn as_slice(&self) -> &[CompilationError] {
        &self.0
    }

    /// Consume into the underlying list.
    pub fn into_vec(self) -> Vec<CompilationError> {
        self.0
    }
}

impl From<Vec<CompilationError>> for Diagnostics {
    fn from(errors: Vec<CompilationError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for Diagnostics {
    type Item = CompilationError;
    type IntoIter = std::vec::IntoIter<CompilationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a CompilationError;
    type IntoIter = std::slice::Iter<'a, CompilationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

// ============================================================================
// Internal Errors
// ============================================================================

/// A broken invariant between compiler passes.
///
/// These never describe a user mistake: either the parser produced a
/// malformed tree or a previous pass failed to annotate it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InternalError {
    /// A node reached code generation without a resolved type.
    #[error("line {line}: {node} reached code generation without a resolved type")]
    UnresolvedType {
        /// Kind of node.
        node: &'static str,
        /// Line of the node.
        line: u32,
    },

    /// An identifier or declaration reached code generation unbound.
    #[error("line {line}: '{name}' reached code generation without a binding")]
    UnresolvedBinding {
        /// The unbound name.
        name: String,
        /// Line of the node.
        line: u32,
    },

    /// No instruction exists for an operator on the given operand type.
    #[error("line {line}: no instruction for '{operator}' on {ty}")]
    UnknownOperator {
        /// Operator symbol.
        operator: &'static str,
        /// Operand type that selected the variant.
        ty: DataType,
        /// Line of the node.
        line: u32,
    },

    /// A store was generated for something that is not a variable.
    #[error("line {line}: expression is not assignable")]
    InvalidAssignmentTarget {
        /// Line of the node.
        line: u32,
    },

    /// A block END was recorded with no open BEGIN.
    #[error("block END recorded without a matching BEGIN")]
    CheckpointUnderflow,

    /// Blocks nested deeper than the ledger allows.
    #[error("blocks nested deeper than {limit}")]
    CheckpointOverflow {
        /// Maximum nesting depth.
        limit: usize,
    },

    /// The unit ended with blocks still open.
    #[error("{depth} block(s) left open at end of compilation unit")]
    UnclosedBlocks {
        /// Number of BEGIN markers without an END.
        depth: usize,
    },

    /// A conditional LEAVE marker had no pending label.
    #[error("conditional LEAVE marker without a matching ENTER")]
    LabelUnderflow,

    /// Conditionals nested deeper than the label stack allows.
    #[error("conditionals nested deeper than {limit}")]
    LabelOverflow {
        /// Maximum nesting depth.
        limit: usize,
    },

    /// A code body ended with conditional ENTER markers still pending.
    #[error("{depth} conditional(s) left open at end of code body")]
    UnclosedConditionals {
        /// Number of ENTER markers without a LEAVE.
        depth: usize,
    },

    /// An instruction was emitted with the wrong number of operands.
    #[error("{opcode} takes {expected} operand(s), {found} given")]
    OperandMismatch {
        /// Mnemonic of the instruction.
        opcode: &'static str,
        /// Operands in the opcode signature.
        expected: usize,
        /// Operands supplied.
        found: usize,
    },

    /// An index does not fit the 2-byte operand encoding.
    #[error("{what} index {index} does not fit in a 2-byte operand")]
    IndexOverflow {
        /// What the index refers to.
        what: &'static str,
        /// The offending index.
        index: usize,
    },
}

// ============================================================================
// Decode Errors
// ============================================================================

/// Bytecode that does not match the opcode table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A byte is not a registered opcode.
    #[error("unknown opcode {byte:#04x} at offset {offset:#06x}")]
    UnknownOpcode {
        /// Offset of the byte.
        offset: usize,
        /// The byte value.
        byte: u8,
    },

    /// The stream ended inside an instruction's operands.
    #[error("truncated operand for {opcode} at offset {offset:#06x}")]
    TruncatedOperand {
        /// Offset of the opcode byte.
        offset: usize,
        /// Mnemonic of the instruction.
        opcode: &'static str,
    },
}

// ============================================================================
// Top-level
// ============================================================================

/// Any error produced while compiling a unit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuillError {
    /// The program has user-level errors.
    #[error(transparent)]
    Diagnostics(#[from] Diagnostics),

    /// A compiler invariant was broken.
    #[error("internal compiler error: {0}")]
    Internal(#[from] InternalError),

    /// Emitted bytecode failed to decode.
    #[error("bytecode decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl QuillError {
    /// Check if this wraps user diagnostics.
    pub fn is_diagnostics(&self) -> bool {
        matches!(self, QuillError::Diagnostics(_))
    }

    /// Check if this is an internal error.
    pub fn is_internal(&self) -> bool {
        matches!(self, QuillError::Internal(_))
    }

    /// The diagnostics, if this wraps any.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            QuillError::Diagnostics(d) => Some(d),
            _ => None,
        }
    }
}
