//! Statement rules: block checkpoints, declarations and conditions.

use quill_core::ast::{ConditionalMarker, Declaration, Stmt, StmtKind};
use quill_core::{CompilationError, DataType, InternalError};
use tracing::debug;

use super::SemanticAnalyzer;
use super::conversion::{Coercion, find_coercion};

impl SemanticAnalyzer<'_> {
    pub(super) fn enter_statement(&mut self, stmt: &mut Stmt) -> Result<(), InternalError> {
        if let StmtKind::Block(marker) = stmt.kind {
            self.ledger_mut().record_checkpoint(marker)?;
        }
        Ok(())
    }

    pub(super) fn leave_statement(&mut self, stmt: &mut Stmt) {
        let line = stmt.line;
        match &mut stmt.kind {
            StmtKind::Declaration(decl) => self.declare(decl, line),
            StmtKind::Conditional(ConditionalMarker::Enter(condition)) => {
                if let Some(ty) = condition.ty
                    && ty != DataType::Boolean
                {
                    self.report(CompilationError::TypeMismatch {
                        message: format!("condition must be boolean, found {}", ty),
                        line,
                    });
                }
            }
            StmtKind::Expr(_)
            | StmtKind::Block(_)
            | StmtKind::Conditional(ConditionalMarker::Leave) => {}
        }
    }

    /// Register a declaration after its initializer was typed.
    ///
    /// The initializer cannot see the variable it initializes.
    fn declare(&mut self, decl: &mut Declaration, line: u32) {
        if self.ledger().search_current_block(&decl.name).is_some() {
            self.report(CompilationError::DuplicateDefinition {
                name: decl.name.clone(),
                line,
            });
            return;
        }

        let id = self.ledger_mut().declare(decl.name.clone(), decl.ty, line);
        debug!(name = %decl.name, %id, ty = %decl.ty, "declared variable");
        decl.id = Some(id);

        let Some(init) = &mut decl.initializer else {
            return;
        };
        let Some(source) = init.ty else {
            return;
        };
        match find_coercion(source, decl.ty) {
            Some(Coercion::Identity) => {}
            Some(Coercion::Cast(kind)) => {
                debug!(line, ?kind, "inserting cast on initializer");
                init.wrap_in_cast(kind);
            }
            None => self.report(CompilationError::TypeMismatch {
                message: format!("initializer type error {} = {}", decl.ty, source),
                line,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::context::CompilationContext;
    use crate::semantic::analyze;
    use quill_core::ast::{
        AssignOp, BinaryOp, CompilationUnit, Declaration, Expr, ExprKind, Item, Stmt, StmtKind,
    };
    use quill_core::{CastKind, CompilationError, DataType, Diagnostics};

    fn analyze_stmts(stmts: Vec<Stmt>) -> (CompilationUnit, Diagnostics) {
        let mut unit = CompilationUnit::new().statements(stmts);
        let mut ctx = CompilationContext::new();
        let diags = analyze(&mut ctx, &mut unit).unwrap();
        (unit, diags)
    }

    fn decl(name: &str, ty: DataType, line: u32) -> Stmt {
        Stmt::declaration(Declaration::new(name, ty), line)
    }

    fn assign(name: &str, value: Expr, line: u32) -> Stmt {
        Stmt::expr(Expr::assign(AssignOp::Assign, Expr::ident(name, line), value, line))
    }

    #[test]
    fn duplicate_in_same_block_keeps_original() {
        let mut unit = CompilationUnit::new().statements([
            decl("x", DataType::Int, 1),
            decl("x", DataType::Double, 2),
        ]);
        let mut ctx = CompilationContext::new();
        let diags = analyze(&mut ctx, &mut unit).unwrap();

        assert_eq!(
            diags.as_slice(),
            &[CompilationError::DuplicateDefinition {
                name: "x".into(),
                line: 2
            }]
        );
        let Item::Statement(Stmt {
            kind: StmtKind::Declaration(second),
            ..
        }) = &unit.items[1]
        else {
            panic!()
        };
        assert_eq!(second.id, None);

        let entries: Vec<_> = ctx
            .ledger()
            .declarations()
            .iter()
            .filter(|entry| entry.name == "x")
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ty, DataType::Int);
        assert_eq!(entries[0].line, 1);
    }

    #[test]
    fn shadowing_in_nested_block() {
        let (unit, diags) = analyze_stmts(vec![
            decl("x", DataType::Int, 1),
            Stmt::begin(2),
            decl("x", DataType::Double, 3),
            assign("x", Expr::double(1.5, 4), 4),
            Stmt::end(5),
            assign("x", Expr::int(2, 6), 6),
        ]);
        assert!(diags.is_empty(), "{}", diags);

        // The inner assignment stores a double without a cast, the outer an int.
        for (index, expected) in [(3, DataType::Double), (5, DataType::Int)] {
            let Item::Statement(Stmt {
                kind: StmtKind::Expr(expr),
                ..
            }) = &unit.items[index]
            else {
                panic!()
            };
            assert_eq!(expr.ty, Some(expected));
            let ExprKind::Assign(a) = &expr.kind else {
                panic!()
            };
            assert!(!matches!(a.value.kind, ExprKind::Cast(_)));
        }
    }

    #[test]
    fn block_local_invisible_after_end() {
        let (_, diags) = analyze_stmts(vec![
            Stmt::begin(1),
            decl("t", DataType::Int, 2),
            Stmt::end(3),
            assign("t", Expr::int(1, 4), 4),
        ]);
        assert_eq!(
            diags.as_slice(),
            &[CompilationError::UnknownIdentifier {
                name: "t".into(),
                line: 4
            }]
        );
    }

    #[test]
    fn initializer_is_coerced() {
        let (unit, diags) = analyze_stmts(vec![Stmt::declaration(
            Declaration::new("y", DataType::Double).with_initializer(Expr::int(3, 1)),
            1,
        )]);
        assert!(diags.is_empty());

        let Item::Statement(Stmt {
            kind: StmtKind::Declaration(d),
            ..
        }) = &unit.items[0]
        else {
            panic!()
        };
        let init = d.initializer.as_ref().unwrap();
        assert!(matches!(&init.kind, ExprKind::Cast(c) if c.kind == CastKind::IntToDouble));
    }

    #[test]
    fn initializer_cannot_see_own_name() {
        let (_, diags) = analyze_stmts(vec![Stmt::declaration(
            Declaration::new("z", DataType::Int).with_initializer(Expr::ident("z", 1)),
            1,
        )]);
        assert_eq!(diags.len(), 1);
        assert!(matches!(
            diags.as_slice()[0],
            CompilationError::UnknownIdentifier { .. }
        ));
    }

    #[test]
    fn bad_initializer_diagnosed() {
        let (_, diags) = analyze_stmts(vec![Stmt::declaration(
            Declaration::new("b", DataType::Boolean).with_initializer(Expr::int(1, 1)),
            1,
        )]);
        assert_eq!(diags.len(), 1);
        assert!(diags.to_string().contains("initializer type error boolean = int"));
    }

    #[test]
    fn condition_must_be_boolean() {
        let (_, diags) = analyze_stmts(vec![
            decl("i", DataType::Int, 1),
            Stmt::enter_if(Expr::binary(
                BinaryOp::Greater,
                Expr::ident("i", 2),
                Expr::int(0, 2),
                2,
            )),
            Stmt::leave_if(3),
        ]);
        assert!(diags.is_empty());

        let (_, diags) = analyze_stmts(vec![
            decl("i", DataType::Int, 1),
            Stmt::enter_if(Expr::ident("i", 2)),
            Stmt::leave_if(3),
        ]);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.as_slice()[0].line(), 2);
    }
}
