//! Expression typing rules.

use quill_core::ast::{
    AssignExpr, BinaryExpr, Binding, CallExpr, Expr, ExprKind, IdentExpr, OpCategory, UnaryExpr,
    UnaryOp,
};
use quill_core::{CastKind, CompilationError, DataType};
use tracing::debug;

use super::SemanticAnalyzer;
use super::conversion::{Coercion, find_coercion, promote};

impl SemanticAnalyzer<'_> {
    /// Type `expr`, whose children were already typed.
    pub(super) fn type_expr(&mut self, expr: &mut Expr) {
        let line = expr.line;
        let ty = match &mut expr.kind {
            ExprKind::Bool(_) => Some(DataType::Boolean),
            ExprKind::Int(_) => Some(DataType::Int),
            ExprKind::Double(_) => Some(DataType::Double),
            ExprKind::Ident(ident) => self.resolve_ident(ident, line),
            ExprKind::Binary(binary) => self.check_binary(binary, line),
            ExprKind::Unary(unary) => self.check_unary(unary, line),
            ExprKind::Assign(assign) => self.check_assign(assign, line),
            ExprKind::Call(call) => self.check_call(call, line),
            ExprKind::Cast(cast) => cast.expr.ty.map(|_| cast.kind.target()),
        };
        expr.ty = ty;
    }

    // ==========================================================================
    // Identifiers
    // ==========================================================================

    fn resolve_ident(&mut self, ident: &mut IdentExpr, line: u32) -> Option<DataType> {
        let ledger = self.ledger();

        if let Some(id) = ledger.search(&ident.name) {
            let ty = ledger.declaration(id).map(|d| d.ty);
            ident.binding = Some(Binding::Variable(id));
            return ty;
        }

        if let Some(id) = ledger.search_function(&ident.name) {
            let ty = ledger.function(id).map(|f| f.return_type);
            ident.binding = Some(Binding::Function(id));
            return ty;
        }

        self.report(CompilationError::UnknownIdentifier {
            name: ident.name.clone(),
            line,
        });
        None
    }

    // ==========================================================================
    // Operators
    // ==========================================================================

    fn check_binary(&mut self, binary: &mut BinaryExpr, line: u32) -> Option<DataType> {
        let (left, right) = (binary.left.ty?, binary.right.ty?);
        let op = binary.op;

        let (result, message) = match op.category() {
            OpCategory::Arithmetic => (None, "arithmetic"),
            OpCategory::Relational => (Some(DataType::Boolean), "relational"),
            OpCategory::Equality => {
                if left == DataType::Boolean || right == DataType::Boolean {
                    if left == right {
                        return Some(DataType::Boolean);
                    }
                    self.report(mismatch("equality", left, right, line));
                    return None;
                }
                (Some(DataType::Boolean), "equality")
            }
            OpCategory::Logical => {
                if left == DataType::Boolean && right == DataType::Boolean {
                    return Some(DataType::Boolean);
                }
                self.report(CompilationError::TypeMismatch {
                    message: format!(
                        "{} accepts only boolean operands, left: {}, right: {}",
                        op, left, right
                    ),
                    line,
                });
                return None;
            }
        };

        let Some(promotion) = promote(left, right) else {
            self.report(mismatch(message, left, right, line));
            return None;
        };

        if promotion.cast_left {
            splice_cast(&mut binary.left, CastKind::IntToDouble);
        }
        if promotion.cast_right {
            splice_cast(&mut binary.right, CastKind::IntToDouble);
        }

        Some(result.unwrap_or(promotion.operand_type))
    }

    fn check_unary(&mut self, unary: &mut UnaryExpr, line: u32) -> Option<DataType> {
        let op = unary.op;

        if op.is_mutating() {
            return self.check_inc_dec(unary, line);
        }

        let ty = unary.operand.ty?;
        match op {
            UnaryOp::Neg if ty.is_numeric() => Some(ty),
            UnaryOp::LogicalNot if ty == DataType::Boolean => Some(ty),
            _ => {
                let expected = if op == UnaryOp::Neg {
                    "int or double"
                } else {
                    "boolean"
                };
                self.report(CompilationError::InvalidOperand {
                    message: format!("operand of {} must be {}, found {}", op, expected, ty),
                    line,
                });
                None
            }
        }
    }

    /// `++`/`--` need an int variable.
    fn check_inc_dec(&mut self, unary: &mut UnaryExpr, line: u32) -> Option<DataType> {
        let op = unary.op;
        let operand = &unary.operand;

        let problem = if operand.is_literal() {
            Some(format!("operand of {} is immediate data", op))
        } else {
            match operand.as_ident() {
                None => Some(format!("operand of {} must be a variable", op)),
                Some(IdentExpr {
                    binding: Some(Binding::Function(_)),
                    ..
                }) => Some(format!(
                    "operand of {} should be a variable, not a function",
                    op
                )),
                Some(_) => None,
            }
        };
        if let Some(message) = problem {
            self.report(CompilationError::InvalidOperand { message, line });
            return None;
        }

        match operand.ty? {
            DataType::Int => Some(DataType::Int),
            other => {
                self.report(CompilationError::InvalidOperand {
                    message: format!("operand of {} must be int, found {}", op, other),
                    line,
                });
                None
            }
        }
    }

    // ==========================================================================
    // Assignment
    // ==========================================================================

    fn check_assign(&mut self, assign: &mut AssignExpr, line: u32) -> Option<DataType> {
        match assign.target.as_ident() {
            Some(IdentExpr {
                binding: Some(Binding::Variable(_)),
                ..
            }) => {}
            // Unresolved name, already diagnosed.
            Some(IdentExpr { binding: None, .. }) => return None,
            _ => {
                self.report(CompilationError::NotAssignable { line });
                return None;
            }
        }

        let target = assign.target.ty?;
        let value = assign.value.ty?;

        if assign.op.is_compound() && !target.is_numeric() {
            self.report(CompilationError::InvalidOperand {
                message: format!(
                    "compound assignment {} requires a numeric target, found {}",
                    assign.op, target
                ),
                line,
            });
            return None;
        }

        match find_coercion(value, target) {
            Some(coercion) => {
                apply(&mut assign.value, coercion);
                Some(target)
            }
            None => {
                self.report(CompilationError::TypeMismatch {
                    message: format!("assignment type error {} = {}", target, value),
                    line,
                });
                None
            }
        }
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    fn check_call(&mut self, call: &mut CallExpr, line: u32) -> Option<DataType> {
        let callee = &call.callee;
        let func_id = match callee.as_ident() {
            Some(IdentExpr {
                binding: Some(Binding::Function(id)),
                ..
            }) => *id,
            Some(IdentExpr { binding: None, .. }) => return None,
            Some(IdentExpr { name, .. }) => {
                self.report(CompilationError::NotCallable {
                    name: name.clone(),
                    line,
                });
                return None;
            }
            None => {
                self.report(CompilationError::NotCallable {
                    name: callee.describe().to_string(),
                    line,
                });
                return None;
            }
        };

        let (name, params, return_type) = {
            let func = self.ledger().function(func_id)?;
            (func.name.clone(), func.params.clone(), func.return_type)
        };

        if call.args.len() != params.len() {
            self.report(CompilationError::ArgumentCountMismatch {
                name,
                expected: params.len(),
                found: call.args.len(),
                line,
            });
            return None;
        }

        let mut ok = true;
        for (index, (arg, &param)) in call.args.iter_mut().zip(&params).enumerate() {
            let Some(ty) = arg.ty else {
                ok = false;
                continue;
            };
            match find_coercion(ty, param) {
                Some(coercion) => apply(arg, coercion),
                None => {
                    self.report(CompilationError::TypeMismatch {
                        message: format!(
                            "type mismatch in argument {} of call to '{}': requires {}, passed {}",
                            index + 1,
                            name,
                            param,
                            ty
                        ),
                        line,
                    });
                    ok = false;
                }
            }
        }

        ok.then_some(return_type)
    }
}

fn mismatch(kind: &str, left: DataType, right: DataType, line: u32) -> CompilationError {
    CompilationError::TypeMismatch {
        message: format!(
            "type mismatch in {} binary expression, left: {}, right: {}",
            kind, left, right
        ),
        line,
    }
}

fn apply(expr: &mut Expr, coercion: Coercion) {
    if let Coercion::Cast(kind) = coercion {
        splice_cast(expr, kind);
    }
}

fn splice_cast(expr: &mut Expr, kind: CastKind) {
    debug!(line = expr.line, ?kind, node = expr.describe(), "inserting cast");
    expr.wrap_in_cast(kind);
}

#[cfg(test)]
mod tests {
    use crate::context::CompilationContext;
    use crate::semantic::analyze;
    use quill_core::ast::{
        AssignOp, BinaryOp, CompilationUnit, Declaration, Expr, ExprKind, FunctionDecl, Stmt,
        StmtKind, UnaryOp,
    };
    use quill_core::{CastKind, CompilationError, DataType, Diagnostics};

    /// Analyze `expr` as a statement after `int i; double d; boolean b;`
    /// and `double f(int x, double y)`.
    fn check(expr: Expr) -> (Expr, Diagnostics) {
        let mut unit = CompilationUnit::new()
            .statement(Stmt::declaration(Declaration::new("i", DataType::Int), 1))
            .statement(Stmt::declaration(Declaration::new("d", DataType::Double), 1))
            .statement(Stmt::declaration(Declaration::new("b", DataType::Boolean), 1))
            .function(
                FunctionDecl::new("f", DataType::Double, 1)
                    .param("x", DataType::Int)
                    .param("y", DataType::Double),
            )
            .statement(Stmt::expr(expr));

        let mut ctx = CompilationContext::new();
        let diags = analyze(&mut ctx, &mut unit).unwrap();
        let Some(quill_core::ast::Item::Statement(Stmt {
            kind: StmtKind::Expr(expr),
            ..
        })) = unit.items.pop()
        else {
            panic!("expected trailing expression statement");
        };
        (expr, diags)
    }

    fn id(name: &str) -> Expr {
        Expr::ident(name, 2)
    }

    fn binary(op: BinaryOp, l: Expr, r: Expr) -> Expr {
        Expr::binary(op, l, r, 2)
    }

    fn count_casts(expr: &Expr) -> usize {
        match &expr.kind {
            ExprKind::Cast(c) => 1 + count_casts(&c.expr),
            ExprKind::Binary(b) => count_casts(&b.left) + count_casts(&b.right),
            ExprKind::Unary(u) => count_casts(&u.operand),
            ExprKind::Assign(a) => count_casts(&a.target) + count_casts(&a.value),
            ExprKind::Call(c) => {
                count_casts(&c.callee) + c.args.iter().map(count_casts).sum::<usize>()
            }
            _ => 0,
        }
    }

    #[test]
    fn arithmetic_result_is_double_iff_any_double() {
        let numeric = [("i", DataType::Int), ("d", DataType::Double)];
        let ops = [
            BinaryOp::Add,
            BinaryOp::Sub,
            BinaryOp::Mul,
            BinaryOp::Div,
            BinaryOp::Mod,
        ];

        for op in ops {
            for (l, lt) in numeric {
                for (r, rt) in numeric {
                    let (expr, diags) = check(binary(op, id(l), id(r)));
                    assert!(diags.is_empty());
                    let expected = if lt == DataType::Double || rt == DataType::Double {
                        DataType::Double
                    } else {
                        DataType::Int
                    };
                    assert_eq!(expr.ty, Some(expected), "{} {} {}", l, op, r);
                    assert_eq!(count_casts(&expr), usize::from(lt != rt));
                }
            }
        }
    }

    #[test]
    fn cast_lands_on_narrower_side() {
        let (expr, _) = check(binary(BinaryOp::Add, id("d"), id("i")));
        let ExprKind::Binary(b) = &expr.kind else {
            panic!()
        };
        assert!(matches!(&b.right.kind, ExprKind::Cast(c) if c.kind == CastKind::IntToDouble));
        assert_eq!(b.right.ty, Some(DataType::Double));
        assert!(matches!(&b.left.kind, ExprKind::Ident(i) if i.name == "d"));
    }

    #[test]
    fn comparisons_are_boolean() {
        for op in [
            BinaryOp::Greater,
            BinaryOp::GreaterEqual,
            BinaryOp::Less,
            BinaryOp::LessEqual,
            BinaryOp::Equal,
            BinaryOp::NotEqual,
        ] {
            let (expr, diags) = check(binary(op, id("i"), id("d")));
            assert!(diags.is_empty());
            assert_eq!(expr.ty, Some(DataType::Boolean));
            assert_eq!(count_casts(&expr), 1);
        }
    }

    #[test]
    fn boolean_rejected_by_arithmetic_and_relational() {
        let (expr, diags) = check(binary(BinaryOp::Add, id("b"), id("i")));
        assert_eq!(expr.ty, None);
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags.as_slice()[0], CompilationError::TypeMismatch { .. }));

        let (_, diags) = check(binary(BinaryOp::Less, id("b"), id("b")));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn boolean_equality_only_with_boolean() {
        let (expr, diags) = check(binary(BinaryOp::Equal, id("b"), Expr::bool(true, 2)));
        assert!(diags.is_empty());
        assert_eq!(expr.ty, Some(DataType::Boolean));

        let (expr, diags) = check(binary(BinaryOp::NotEqual, id("b"), id("i")));
        assert_eq!(expr.ty, None);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn logical_requires_booleans() {
        let (expr, diags) = check(binary(BinaryOp::LogicalAnd, id("b"), Expr::bool(false, 2)));
        assert!(diags.is_empty());
        assert_eq!(expr.ty, Some(DataType::Boolean));

        let (_, diags) = check(binary(BinaryOp::LogicalOr, id("b"), id("i")));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn untyped_child_yields_single_diagnostic() {
        let (expr, diags) = check(binary(
            BinaryOp::Add,
            binary(BinaryOp::Mul, id("missing"), id("i")),
            id("d"),
        ));
        assert_eq!(expr.ty, None);
        assert_eq!(diags.len(), 1);
        assert!(matches!(
            diags.as_slice()[0],
            CompilationError::UnknownIdentifier { .. }
        ));
    }

    #[test]
    fn assignment_casts_toward_target() {
        let (expr, diags) = check(Expr::assign(AssignOp::Assign, id("i"), id("d"), 2));
        assert!(diags.is_empty());
        assert_eq!(expr.ty, Some(DataType::Int));
        let ExprKind::Assign(a) = &expr.kind else {
            panic!()
        };
        assert!(matches!(&a.value.kind, ExprKind::Cast(c) if c.kind == CastKind::DoubleToInt));

        let (expr, _) = check(Expr::assign(AssignOp::Assign, id("d"), id("d"), 2));
        assert_eq!(count_casts(&expr), 0);
    }

    #[test]
    fn assignment_errors() {
        let (_, diags) = check(Expr::assign(AssignOp::Assign, id("i"), id("b"), 2));
        assert!(matches!(diags.as_slice()[0], CompilationError::TypeMismatch { .. }));

        let (_, diags) = check(Expr::assign(AssignOp::Assign, Expr::int(1, 2), id("i"), 2));
        assert_eq!(diags.as_slice(), &[CompilationError::NotAssignable { line: 2 }]);

        let (_, diags) = check(Expr::assign(AssignOp::Assign, id("f"), id("d"), 2));
        assert_eq!(diags.as_slice(), &[CompilationError::NotAssignable { line: 2 }]);

        let (_, diags) = check(Expr::assign(AssignOp::AddAssign, id("b"), id("b"), 2));
        assert!(matches!(diags.as_slice()[0], CompilationError::InvalidOperand { .. }));
    }

    #[test]
    fn increment_rules() {
        let (expr, diags) = check(Expr::unary(UnaryOp::PreInc, id("i"), 2));
        assert!(diags.is_empty());
        assert_eq!(expr.ty, Some(DataType::Int));

        for operand in [Expr::int(1, 2), id("f"), id("d")] {
            let (expr, diags) = check(Expr::unary(UnaryOp::PreDec, operand, 2));
            assert_eq!(expr.ty, None);
            assert_eq!(diags.len(), 1);
            assert!(matches!(diags.as_slice()[0], CompilationError::InvalidOperand { .. }));
        }
    }

    #[test]
    fn unary_minus_and_not() {
        let (expr, diags) = check(Expr::unary(UnaryOp::Neg, id("d"), 2));
        assert!(diags.is_empty());
        assert_eq!(expr.ty, Some(DataType::Double));

        let (_, diags) = check(Expr::unary(UnaryOp::Neg, id("b"), 2));
        assert_eq!(diags.len(), 1);

        let (expr, diags) = check(Expr::unary(UnaryOp::LogicalNot, id("b"), 2));
        assert!(diags.is_empty());
        assert_eq!(expr.ty, Some(DataType::Boolean));

        let (_, diags) = check(Expr::unary(UnaryOp::LogicalNot, id("i"), 2));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn call_checks_arity_and_coerces_arguments() {
        let (expr, diags) = check(Expr::call(id("f"), vec![id("d"), id("i")], 2));
        assert!(diags.is_empty(), "{}", diags);
        assert_eq!(expr.ty, Some(DataType::Double));
        assert_eq!(count_casts(&expr), 2);

        let (expr, diags) = check(Expr::call(id("f"), vec![id("i"), id("d"), id("i")], 2));
        assert_eq!(expr.ty, None);
        assert_eq!(
            diags.as_slice(),
            &[CompilationError::ArgumentCountMismatch {
                name: "f".into(),
                expected: 2,
                found: 3,
                line: 2,
            }]
        );

        let (_, diags) = check(Expr::call(id("f"), vec![id("b"), id("d")], 2));
        assert_eq!(diags.len(), 1);
        assert!(diags.as_slice()[0].to_string().contains("argument 1"));
    }

    #[test]
    fn calling_a_variable_is_diagnosed() {
        let (_, diags) = check(Expr::call(id("i"), vec![], 2));
        assert_eq!(
            diags.as_slice(),
            &[CompilationError::NotCallable {
                name: "i".into(),
                line: 2
            }]
        );
    }
}
