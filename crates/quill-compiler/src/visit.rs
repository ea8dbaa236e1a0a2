//! Traversal engine shared by the compiler passes.
//!
//! A pass implements [`Visitor`] (read-only) or [`VisitorMut`] (may rewrite
//! the tree) and the `walk_*` functions drive it. For every node the engine
//! calls `enter`, visits the children, then calls `leave`. Binary and
//! assignment nodes additionally get exactly one `notify` between their two
//! children.
//!
//! # Child order
//!
//! | Node        | Order                                   |
//! |-------------|-----------------------------------------|
//! | binary      | left, `notify`, right                   |
//! | assignment  | value, `notify`, target                 |
//! | call        | arguments left to right, then callee    |
//! | unary, cast | operand                                 |
//! | declaration | initializer                             |
//! | conditional | condition (ENTER only)                  |
//!
//! `enter`/`leave` have no default bodies, so a pass that forgets a node
//! kind fails to compile instead of skipping the node at runtime.
//!
//! The engine holds no state. Errors returned from a hook abort the walk.

use quill_core::ast::{ConditionalMarker, Expr, ExprKind, Stmt, StmtKind};

/// Read-only pass over the tree.
pub trait Visitor {
    /// Error that aborts the walk.
    type Error;

    /// Called before a node's children.
    fn enter_expr(&mut self, expr: &Expr) -> Result<(), Self::Error>;

    /// Called between the two children of a binary or assignment node.
    fn notify_expr(&mut self, _expr: &Expr) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called after a node's children.
    fn leave_expr(&mut self, expr: &Expr) -> Result<(), Self::Error>;

    /// Called before a statement's child expression.
    fn enter_stmt(&mut self, stmt: &Stmt) -> Result<(), Self::Error>;

    /// Called after a statement's child expression.
    fn leave_stmt(&mut self, stmt: &Stmt) -> Result<(), Self::Error>;
}

/// Pass that may annotate and rewrite the tree.
///
/// `leave_expr` sees children that were already visited, so it can type
/// the node and replace a child slot (for example with a cast around it).
pub trait VisitorMut {
    /// Error that aborts the walk.
    type Error;

    /// Called before a node's children.
    fn enter_expr(&mut self, expr: &mut Expr) -> Result<(), Self::Error>;

    /// Called between the two children of a binary or assignment node.
    fn notify_expr(&mut self, _expr: &mut Expr) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called after a node's children.
    fn leave_expr(&mut self, expr: &mut Expr) -> Result<(), Self::Error>;

    /// Called before a statement's child expression.
    fn enter_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Self::Error>;

    /// Called after a statement's child expression.
    fn leave_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Self::Error>;
}

#[inline]
fn has_notify(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Binary(_) | ExprKind::Assign(_))
}

// ============================================================================
// Read-only walk
// ============================================================================

/// Visit an expression tree.
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) -> Result<(), V::Error> {
    visitor.enter_expr(expr)?;

    match &expr.kind {
        ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Double(_) | ExprKind::Ident(_) => {}
        ExprKind::Binary(binary) => {
            walk_expr(visitor, &binary.left)?;
            visitor.notify_expr(expr)?;
            walk_expr(visitor, &binary.right)?;
        }
        ExprKind::Assign(assign) => {
            walk_expr(visitor, &assign.value)?;
            visitor.notify_expr(expr)?;
            walk_expr(visitor, &assign.target)?;
        }
        ExprKind::Unary(unary) => walk_expr(visitor, &unary.operand)?,
        ExprKind::Cast(cast) => walk_expr(visitor, &cast.expr)?,
        ExprKind::Call(call) => {
            for arg in &call.args {
                walk_expr(visitor, arg)?;
            }
            walk_expr(visitor, &call.callee)?;
        }
    }

    visitor.leave_expr(expr)
}

/// Visit a statement and its child expression.
pub fn walk_stmt<V: Visitor + ?Sized>(visitor: &mut V, stmt: &Stmt) -> Result<(), V::Error> {
    visitor.enter_stmt(stmt)?;

    match &stmt.kind {
        StmtKind::Expr(expr) => walk_expr(visitor, expr)?,
        StmtKind::Declaration(decl) => {
            if let Some(init) = &decl.initializer {
                walk_expr(visitor, init)?;
            }
        }
        StmtKind::Conditional(ConditionalMarker::Enter(condition)) => {
            walk_expr(visitor, condition)?
        }
        StmtKind::Conditional(ConditionalMarker::Leave) | StmtKind::Block(_) => {}
    }

    visitor.leave_stmt(stmt)
}

/// Visit a statement list in order.
pub fn walk_stmts<V: Visitor + ?Sized>(visitor: &mut V, stmts: &[Stmt]) -> Result<(), V::Error> {
    for stmt in stmts {
        walk_stmt(visitor, stmt)?;
    }
    Ok(())
}

// ============================================================================
// Mutable walk
// ============================================================================

/// Visit an expression tree, allowing the visitor to rewrite it.
pub fn walk_expr_mut<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    expr: &mut Expr,
) -> Result<(), V::Error> {
    visitor.enter_expr(expr)?;

    match &mut expr.kind {
        ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Double(_) | ExprKind::Ident(_) => {}
        ExprKind::Binary(binary) => walk_expr_mut(visitor, &mut binary.left)?,
        ExprKind::Assign(assign) => walk_expr_mut(visitor, &mut assign.value)?,
        ExprKind::Unary(unary) => walk_expr_mut(visitor, &mut unary.operand)?,
        ExprKind::Cast(cast) => walk_expr_mut(visitor, &mut cast.expr)?,
        ExprKind::Call(call) => {
            for arg in &mut call.args {
                walk_expr_mut(visitor, arg)?;
            }
            walk_expr_mut(visitor, &mut call.callee)?;
        }
    }

    // The first child borrow has ended, so notify can see the whole node.
    if has_notify(expr) {
        visitor.notify_expr(expr)?;
        match &mut expr.kind {
            ExprKind::Binary(binary) => walk_expr_mut(visitor, &mut binary.right)?,
            ExprKind::Assign(assign) => walk_expr_mut(visitor, &mut assign.target)?,
            _ => {}
        }
    }

    visitor.leave_expr(expr)
}

/// Visit a statement, allowing the visitor to rewrite it.
pub fn walk_stmt_mut<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    stmt: &mut Stmt,
) -> Result<(), V::Error> {
    visitor.enter_stmt(stmt)?;

    match &mut stmt.kind {
        StmtKind::Expr(expr) => walk_expr_mut(visitor, expr)?,
        StmtKind::Declaration(decl) => {
            if let Some(init) = &mut decl.initializer {
                walk_expr_mut(visitor, init)?;
            }
        }
        StmtKind::Conditional(ConditionalMarker::Enter(condition)) => {
            walk_expr_mut(visitor, condition)?
        }
        StmtKind::Conditional(ConditionalMarker::Leave) | StmtKind::Block(_) => {}
    }

    visitor.leave_stmt(stmt)
}

/// Visit a statement list in order, allowing rewrites.
pub fn walk_stmts_mut<V: VisitorMut + ?Sized>(
    visitor: &mut V,
    stmts: &mut [Stmt],
) -> Result<(), V::Error> {
    for stmt in stmts {
        walk_stmt_mut(visitor, stmt)?;
    }
    Ok(())
}
