//! The scope ledger: block scoping over flat, append-only histories.
//!
//! Declarations and functions are never removed. Instead every block
//! BEGIN and END records a [`Checkpoint`] holding the tail of both
//! histories at that moment. A backward name search starting from some
//! [`Border`] uses the checkpoints below it to jump over every block that
//! was already closed, while names from blocks still open on the enclosing
//! path stay visible. The innermost match wins, which gives shadowing.
//!
//! Ids handed out by the ledger are history indices, stable for the whole
//! compilation unit.

use std::ops::Range;

use quill_core::ast::BlockMarker;
use quill_core::{DataType, DeclId, FuncId, InternalError};
use tracing::debug;

/// Default limit on block nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

// ============================================================================
// Types
// ============================================================================

/// A variable or parameter in the declaration history.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationEntry {
    /// Variable name
    pub name: String,
    /// Declared type
    pub ty: DataType,
    /// Line of the declaration
    pub line: u32,
}

/// A function in the function history.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEntry {
    /// Function name
    pub name: String,
    /// Declared return type
    pub return_type: DataType,
    /// Parameter types in order
    pub params: Vec<DataType>,
    /// Line of the declaration
    pub line: u32,
}

/// Snapshot of both history tails at a block boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    /// BEGIN or END
    pub kind: BlockMarker,
    /// Declaration history length when recorded
    pub declarations: usize,
    /// Function history length when recorded
    pub functions: usize,
}

/// Position in the ledger a search starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    /// Declaration history tail
    pub declarations: usize,
    /// Function history tail
    pub functions: usize,
    /// Number of checkpoints recorded
    pub checkpoints: usize,
}

trait Named {
    fn name(&self) -> &str;
}

impl Named for DeclarationEntry {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for FunctionEntry {
    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// ScopeLedger
// ============================================================================

/// Declaration and function histories plus the checkpoint stack.
///
/// Lives for exactly one compilation unit.
#[derive(Debug)]
pub struct ScopeLedger {
    declarations: Vec<DeclarationEntry>,
    functions: Vec<FunctionEntry>,
    checkpoints: Vec<Checkpoint>,
    /// Currently open blocks
    depth: usize,
    max_depth: usize,
}

impl ScopeLedger {
    /// Create an empty ledger with the default nesting limit.
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    /// Create an empty ledger allowing `max_depth` nested blocks.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            declarations: Vec::new(),
            functions: Vec::new(),
            checkpoints: Vec::new(),
            depth: 0,
            max_depth,
        }
    }

    // ==========================================================================
    // Recording
    // ==========================================================================

    /// Append a variable declaration.
    pub fn declare(&mut self, name: impl Into<String>, ty: DataType, line: u32) -> DeclId {
        let id = DeclId::new(self.declarations.len() as u32);
        self.declarations.push(DeclarationEntry {
            name: name.into(),
            ty,
            line,
        });
        id
    }

    /// Append a function declaration.
    pub fn declare_function(
        &mut self,
        name: impl Into<String>,
        return_type: DataType,
        params: Vec<DataType>,
        line: u32,
    ) -> FuncId {
        let id = FuncId::new(self.functions.len() as u32);
        self.functions.push(FunctionEntry {
            name: name.into(),
            return_type,
            params,
            line,
        });
        id
    }

    /// Record a block boundary.
    ///
    /// BEGIN/END must nest like parentheses; an END with nothing open or a
    /// BEGIN past the nesting limit is an internal error.
    pub fn record_checkpoint(&mut self, kind: BlockMarker) -> Result<(), InternalError> {
        match kind {
            BlockMarker::Begin => {
                if self.depth >= self.max_depth {
                    return Err(InternalError::CheckpointOverflow {
                        limit: self.max_depth,
                    });
                }
                self.depth += 1;
            }
            BlockMarker::End => {
                if self.depth == 0 {
                    return Err(InternalError::CheckpointUnderflow);
                }
                self.depth -= 1;
            }
        }

        let checkpoint = Checkpoint {
            kind,
            declarations: self.declarations.len(),
            functions: self.functions.len(),
        };
        debug!(?checkpoint, depth = self.depth, "recorded checkpoint");
        self.checkpoints.push(checkpoint);
        Ok(())
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// The current tails of all three histories.
    pub fn border(&self) -> Border {
        Border {
            declarations: self.declarations.len(),
            functions: self.functions.len(),
            checkpoints: self.checkpoints.len(),
        }
    }

    /// Find the innermost visible declaration of `name`.
    pub fn search(&self, name: &str) -> Option<DeclId> {
        self.search_from(name, self.border())
    }

    /// Find the innermost declaration of `name` visible from `border`.
    pub fn search_from(&self, name: &str, border: Border) -> Option<DeclId> {
        let closed = self.closed_blocks(border.checkpoints, |cp| cp.declarations);
        scan(&self.declarations, name, border.declarations, 0, closed)
            .map(|index| DeclId::new(index as u32))
    }

    /// Find the innermost visible function named `name`.
    pub fn search_function(&self, name: &str) -> Option<FuncId> {
        self.search_function_from(name, self.border())
    }

    /// Find the innermost function named `name` visible from `border`.
    pub fn search_function_from(&self, name: &str, border: Border) -> Option<FuncId> {
        let closed = self.closed_blocks(border.checkpoints, |cp| cp.functions);
        scan(&self.functions, name, border.functions, 0, closed)
            .map(|index| FuncId::new(index as u32))
    }

    /// Find `name` among declarations of the innermost open block only.
    ///
    /// Used for duplicate detection: a name from an enclosing block may be
    /// shadowed, one from the same block may not.
    pub fn search_current_block(&self, name: &str) -> Option<DeclId> {
        let border = self.border();
        let floor = self.open_block_start(|cp| cp.declarations);
        let closed = self.closed_blocks(border.checkpoints, |cp| cp.declarations);
        scan(&self.declarations, name, border.declarations, floor, closed)
            .map(|index| DeclId::new(index as u32))
    }

    /// Find a function named `name` in the innermost open block only.
    pub fn search_function_current_block(&self, name: &str) -> Option<FuncId> {
        let border = self.border();
        let floor = self.open_block_start(|cp| cp.functions);
        let closed = self.closed_blocks(border.checkpoints, |cp| cp.functions);
        scan(&self.functions, name, border.functions, floor, closed)
            .map(|index| FuncId::new(index as u32))
    }

    /// Outermost closed BEGIN/END ranges below `checkpoints`, newest first.
    fn closed_blocks(
        &self,
        checkpoints: usize,
        tail: impl Fn(&Checkpoint) -> usize,
    ) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut depth = 0usize;
        let mut end = 0;

        let recorded = &self.checkpoints[..checkpoints.min(self.checkpoints.len())];
        for checkpoint in recorded.iter().rev() {
            match checkpoint.kind {
                BlockMarker::End => {
                    if depth == 0 {
                        end = tail(checkpoint);
                    }
                    depth += 1;
                }
                // An unmatched BEGIN is a block still open on our path.
                BlockMarker::Begin if depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        ranges.push(tail(checkpoint)..end);
                    }
                }
                BlockMarker::Begin => {}
            }
        }

        ranges
    }

    /// History tail at the innermost unmatched BEGIN, or 0 at global scope.
    fn open_block_start(&self, tail: impl Fn(&Checkpoint) -> usize) -> usize {
        let mut depth = 0usize;
        for checkpoint in self.checkpoints.iter().rev() {
            match checkpoint.kind {
                BlockMarker::End => depth += 1,
                BlockMarker::Begin if depth == 0 => return tail(checkpoint),
                BlockMarker::Begin => depth -= 1,
            }
        }
        0
    }

    // ==========================================================================
    // Accessors
    // ==========================================================================

    /// Get a declaration by id.
    pub fn declaration(&self, id: DeclId) -> Option<&DeclarationEntry> {
        self.declarations.get(id.index() as usize)
    }

    /// Get a function by id.
    pub fn function(&self, id: FuncId) -> Option<&FunctionEntry> {
        self.functions.get(id.index() as usize)
    }

    /// All declarations in history order.
    pub fn declarations(&self) -> &[DeclarationEntry] {
        &self.declarations
    }

    /// All functions in history order.
    pub fn functions(&self) -> &[FunctionEntry] {
        &self.functions
    }

    /// All recorded checkpoints.
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Number of currently open blocks.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for ScopeLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Backward scan over `entries[floor..tail]`, jumping over `closed` ranges.
fn scan<T: Named>(
    entries: &[T],
    name: &str,
    tail: usize,
    floor: usize,
    closed: Vec<Range<usize>>,
) -> Option<usize> {
    let mut closed = closed.into_iter().peekable();
    let mut index = tail.min(entries.len());

    while index > floor {
        let candidate = index - 1;

        if let Some(range) = closed.peek() {
            if candidate < range.start {
                closed.next();
                continue;
            }
            if candidate < range.end {
                debug!(name, skip = ?range, "skipping closed block");
                index = range.start;
                closed.next();
                continue;
            }
        }

        if entries[candidate].name() == name {
            return Some(candidate);
        }
        index = candidate;
    }

    None
}

// ============================================================================
// Tests
// ============================================================================
