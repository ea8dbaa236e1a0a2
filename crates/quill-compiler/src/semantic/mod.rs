//! Semantic analysis pass.
//!
//! Walks the unit with the mutable traversal engine and, in place:
//! - assigns a type to every expression it can check
//! - binds identifiers to declarations or functions through the ledger
//! - splices int/double cast nodes where operands need converting
//! - assigns ledger ids to declarations, parameters and functions
//!
//! User mistakes are collected as diagnostics and never stop the walk; the
//! offending node simply stays untyped, and checks on a parent with an
//! untyped child are skipped so one mistake yields one diagnostic. Only
//! broken invariants (unbalanced block markers) abort with an
//! [`InternalError`].
//!
//! ## Passes
//!
//! 1. **Registration**: every function signature is added to the ledger at
//!    global scope, in source order, so calls may precede definitions.
//! 2. **Checking**: items are visited in source order; a function body is
//!    checked inside its own block with the parameters declared first.

pub mod conversion;
mod expr;
mod stmt;

use quill_core::ast::{BlockMarker, CompilationUnit, Expr, FunctionDecl, Item, Stmt};
use quill_core::{CompilationError, Diagnostics, InternalError};
use tracing::debug;

use crate::context::CompilationContext;
use crate::scope::ScopeLedger;
use crate::visit::{VisitorMut, walk_stmt_mut, walk_stmts_mut};

/// Analyze `unit` against a fresh ledger in `ctx`.
///
/// Returns the diagnostics in the order they were found; an empty list
/// means the tree is fully typed and bound.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn analyze(
    ctx: &mut CompilationContext,
    unit: &mut CompilationUnit,
) -> Result<Diagnostics, InternalError> {
    SemanticAnalyzer::new(ctx).analyze(unit)
}

/// The semantic analysis visitor.
pub struct SemanticAnalyzer<'ctx> {
    ctx: &'ctx mut CompilationContext,
    diagnostics: Diagnostics,
}

impl<'ctx> SemanticAnalyzer<'ctx> {
    pub fn new(ctx: &'ctx mut CompilationContext) -> Self {
        Self {
            ctx,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Run both passes over `unit`.
    pub fn analyze(mut self, unit: &mut CompilationUnit) -> Result<Diagnostics, InternalError> {
        self.register_functions(unit);

        for item in &mut unit.items {
            match item {
                Item::Function(func) => self.analyze_function(func)?,
                Item::Statement(stmt) => walk_stmt_mut(&mut self, stmt)?,
            }
        }

        let open = self.ledger().depth();
        if open > 0 {
            return Err(InternalError::UnclosedBlocks { depth: open });
        }

        debug!(count = self.diagnostics.len(), "semantic analysis finished");
        Ok(self.diagnostics)
    }

    fn ledger(&self) -> &ScopeLedger {
        self.ctx.ledger()
    }

    fn ledger_mut(&mut self) -> &mut ScopeLedger {
        self.ctx.ledger_mut()
    }

    fn report(&mut self, error: CompilationError) {
        debug!(%error, "diagnostic");
        self.diagnostics.push(error);
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    fn register_functions(&mut self, unit: &mut CompilationUnit) {
        for item in &mut unit.items {
            let Item::Function(func) = item else {
                continue;
            };

            if self.ledger().search_function_current_block(&func.name).is_some() {
                self.report(CompilationError::DuplicateDefinition {
                    name: func.name.clone(),
                    line: func.line,
                });
                continue;
            }

            let id = self.ledger_mut().declare_function(
                func.name.clone(),
                func.return_type,
                func.param_types(),
                func.line,
            );
            debug!(name = %func.name, %id, "registered function");
            func.id = Some(id);
        }
    }

    /// Check a function body inside its own block.
    ///
    /// Host functions and duplicates that failed registration are skipped.
    fn analyze_function(&mut self, func: &mut FunctionDecl) -> Result<(), InternalError> {
        let FunctionDecl {
            params,
            body,
            id,
            line,
            ..
        } = func;
        let (Some(body), Some(_)) = (body.as_mut(), id) else {
            return Ok(());
        };

        let depth = self.ledger().depth();
        self.ledger_mut().record_checkpoint(BlockMarker::Begin)?;

        for param in params.iter_mut() {
            if self.ledger().search_current_block(&param.name).is_some() {
                self.report(CompilationError::DuplicateDefinition {
                    name: param.name.clone(),
                    line: *line,
                });
                continue;
            }
            param.id = Some(self.ledger_mut().declare(param.name.clone(), param.ty, *line));
        }

        walk_stmts_mut(self, body)?;

        let inner = self.ledger().depth();
        if inner > depth + 1 {
            return Err(InternalError::UnclosedBlocks {
                depth: inner - depth - 1,
            });
        }
        if inner < depth + 1 {
            return Err(InternalError::CheckpointUnderflow);
        }
        self.ledger_mut().record_checkpoint(BlockMarker::End)
    }
}

impl VisitorMut for SemanticAnalyzer<'_> {
    type Error = InternalError;

    fn enter_expr(&mut self, _expr: &mut Expr) -> Result<(), InternalError> {
        Ok(())
    }

    fn leave_expr(&mut self, expr: &mut Expr) -> Result<(), InternalError> {
        self.type_expr(expr);
        Ok(())
    }

    fn enter_stmt(&mut self, stmt: &mut Stmt) -> Result<(), InternalError> {
        self.enter_statement(stmt)
    }

    fn leave_stmt(&mut self, stmt: &mut Stmt) -> Result<(), InternalError> {
        self.leave_statement(stmt);
        Ok(())
    }
}
