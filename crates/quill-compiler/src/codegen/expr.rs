//! Expression emission.

use quill_core::ast::{
    BinaryExpr, BinaryOp, Binding, Expr, ExprKind, OpCategory, UnaryExpr, UnaryOp,
};
use quill_core::{CastKind, DataType, InternalError};

use super::{CodeGenerator, VisitMode};
use crate::bytecode::OpCode;

impl CodeGenerator<'_> {
    pub(super) fn enter_expression(&mut self, expr: &Expr) -> Result<(), InternalError> {
        self.emitter.set_line(expr.line);

        if self.mode == VisitMode::Assign && !matches!(expr.kind, ExprKind::Ident(_)) {
            return Err(InternalError::InvalidAssignmentTarget { line: expr.line });
        }

        match &expr.kind {
            ExprKind::Binary(_) | ExprKind::Unary(_) | ExprKind::Cast(_) => {
                self.value_depth += 1;
            }
            ExprKind::Assign(assign) => {
                if assign.op.is_compound() {
                    let (ty, id) = variable_target(&assign.target)?;
                    self.load(ty, id)?;
                }
                self.assign_depth += 1;
            }
            ExprKind::Call(_) => self.call_depth += 1,
            ExprKind::Bool(_) | ExprKind::Int(_) | ExprKind::Double(_) | ExprKind::Ident(_) => {}
        }
        Ok(())
    }

    pub(super) fn notify_expression(&mut self, expr: &Expr) -> Result<(), InternalError> {
        if let ExprKind::Assign(assign) = &expr.kind {
            if let Some(op) = assign.op.arithmetic() {
                let ty = typed(&assign.value)?;
                let opcode = arithmetic_opcode(op, ty, expr.line)?;
                self.emitter.emit(opcode)?;
            }
            self.mode = VisitMode::Assign;
        }
        Ok(())
    }

    pub(super) fn leave_expression(&mut self, expr: &Expr) -> Result<(), InternalError> {
        self.emitter.set_line(expr.line);

        match &expr.kind {
            ExprKind::Bool(value) => self.emitter.emit_bool(*value),
            ExprKind::Int(value) => self.emitter.emit_int(*value),
            ExprKind::Double(value) => self.emitter.emit_double(*value),
            ExprKind::Ident(_) => self.leave_ident(expr),
            ExprKind::Binary(binary) => {
                self.value_depth -= 1;
                self.leave_binary(expr, binary)
            }
            ExprKind::Unary(unary) => {
                self.value_depth -= 1;
                self.leave_unary(expr, unary)
            }
            ExprKind::Cast(cast) => {
                self.value_depth -= 1;
                self.emitter.emit(match cast.kind {
                    CastKind::IntToDouble => OpCode::CastIntToDouble,
                    CastKind::DoubleToInt => OpCode::CastDoubleToInt,
                })
            }
            ExprKind::Assign(_) => {
                self.leave_assign();
                Ok(())
            }
            ExprKind::Call(_) => {
                self.call_depth -= 1;
                self.emitter.emit(OpCode::Invoke)
            }
        }
    }

    fn leave_ident(&mut self, expr: &Expr) -> Result<(), InternalError> {
        let ExprKind::Ident(ident) = &expr.kind else {
            return Ok(());
        };
        let binding = ident.binding.ok_or_else(|| InternalError::UnresolvedBinding {
            name: ident.name.clone(),
            line: expr.line,
        })?;

        match (self.mode, binding) {
            (VisitMode::Normal, Binding::Function(id)) => {
                self.emitter
                    .emit_index(OpCode::PushFunction, id.index() as usize, "function")
            }
            (VisitMode::Normal, Binding::Variable(id)) => self.load(typed(expr)?, id),
            (VisitMode::Assign, Binding::Variable(id)) => {
                let ty = typed(expr)?;
                self.store(ty, id)?;
                if self.value_needed() {
                    self.load(ty, id)?;
                }
                Ok(())
            }
            (VisitMode::Assign, Binding::Function(_)) => {
                Err(InternalError::InvalidAssignmentTarget { line: expr.line })
            }
        }
    }

    fn leave_binary(&mut self, expr: &Expr, binary: &BinaryExpr) -> Result<(), InternalError> {
        let op = binary.op;
        let opcode = match op.category() {
            OpCategory::Arithmetic => arithmetic_opcode(op, typed(expr)?, expr.line)?,
            // The result is always boolean, so the operand type picks the variant.
            OpCategory::Relational | OpCategory::Equality => {
                comparison_opcode(op, typed(&binary.left)?, expr.line)?
            }
            OpCategory::Logical => match op {
                BinaryOp::LogicalAnd => OpCode::LogicalAnd,
                _ => OpCode::LogicalOr,
            },
        };
        self.emitter.emit(opcode)
    }

    fn leave_unary(&mut self, expr: &Expr, unary: &UnaryExpr) -> Result<(), InternalError> {
        match unary.op {
            UnaryOp::Neg => {
                let opcode = match typed(expr)? {
                    DataType::Int => OpCode::MinusInt,
                    DataType::Double => OpCode::MinusDouble,
                    ty => {
                        return Err(InternalError::UnknownOperator {
                            operator: unary.op.symbol(),
                            ty,
                            line: expr.line,
                        });
                    }
                };
                self.emitter.emit(opcode)
            }
            UnaryOp::LogicalNot => self.emitter.emit(OpCode::LogicalNot),
            UnaryOp::PreInc | UnaryOp::PreDec => {
                let (_, id) = variable_target(&unary.operand)?;
                let opcode = if unary.op == UnaryOp::PreInc {
                    OpCode::Increment
                } else {
                    OpCode::Decrement
                };
                self.emitter.emit(opcode)?;
                self.store(DataType::Int, id)?;
                self.load(DataType::Int, id)
            }
        }
    }

    /// Close an assignment; nested ones hand the stored value back to
    /// their enclosing expression in normal mode.
    fn leave_assign(&mut self) {
        self.assign_depth -= 1;
        if self.assign_depth > 0 || self.call_depth > 0 || self.value_depth > 0 {
            self.mode = VisitMode::Normal;
        }
    }
}

/// The resolved type of `expr`, which must exist after analysis.
fn typed(expr: &Expr) -> Result<DataType, InternalError> {
    expr.ty.ok_or(InternalError::UnresolvedType {
        node: expr.describe(),
        line: expr.line,
    })
}

/// Type and slot of an assignable variable expression.
fn variable_target(expr: &Expr) -> Result<(DataType, quill_core::DeclId), InternalError> {
    let ident = expr
        .as_ident()
        .ok_or(InternalError::InvalidAssignmentTarget { line: expr.line })?;
    match ident.binding {
        Some(Binding::Variable(id)) => Ok((typed(expr)?, id)),
        Some(Binding::Function(_)) => Err(InternalError::InvalidAssignmentTarget { line: expr.line }),
        None => Err(InternalError::UnresolvedBinding {
            name: ident.name.clone(),
            line: expr.line,
        }),
    }
}

fn arithmetic_opcode(op: BinaryOp, ty: DataType, line: u32) -> Result<OpCode, InternalError> {
    let opcode = match (op, ty) {
        (BinaryOp::Add, DataType::Int) => OpCode::AddInt,
        (BinaryOp::Add, DataType::Double) => OpCode::AddDouble,
        (BinaryOp::Sub, DataType::Int) => OpCode::SubInt,
        (BinaryOp::Sub, DataType::Double) => OpCode::SubDouble,
        (BinaryOp::Mul, DataType::Int) => OpCode::MulInt,
        (BinaryOp::Mul, DataType::Double) => OpCode::MulDouble,
        (BinaryOp::Div, DataType::Int) => OpCode::DivInt,
        (BinaryOp::Div, DataType::Double) => OpCode::DivDouble,
        (BinaryOp::Mod, DataType::Int) => OpCode::ModInt,
        (BinaryOp::Mod, DataType::Double) => OpCode::ModDouble,
        _ => {
            return Err(InternalError::UnknownOperator {
                operator: op.symbol(),
                ty,
                line,
            });
        }
    };
    Ok(opcode)
}

/// Comparison opcode selected by the left operand's type.
///
/// Booleans travel as ints, so `==`/`!=` on booleans use the int variant.
fn comparison_opcode(op: BinaryOp, left: DataType, line: u32) -> Result<OpCode, InternalError> {
    let double = match left {
        DataType::Double => true,
        DataType::Int => false,
        DataType::Boolean if op.category() == OpCategory::Equality => false,
        DataType::Boolean => {
            return Err(InternalError::UnknownOperator {
                operator: op.symbol(),
                ty: left,
                line,
            });
        }
    };

    let opcode = match (op, double) {
        (BinaryOp::Greater, false) => OpCode::GtInt,
        (BinaryOp::Greater, true) => OpCode::GtDouble,
        (BinaryOp::GreaterEqual, false) => OpCode::GeInt,
        (BinaryOp::GreaterEqual, true) => OpCode::GeDouble,
        (BinaryOp::Less, false) => OpCode::LtInt,
        (BinaryOp::Less, true) => OpCode::LtDouble,
        (BinaryOp::LessEqual, false) => OpCode::LeInt,
        (BinaryOp::LessEqual, true) => OpCode::LeDouble,
        (BinaryOp::Equal, false) => OpCode::EqInt,
        (BinaryOp::Equal, true) => OpCode::EqDouble,
        (BinaryOp::NotEqual, false) => OpCode::NeInt,
        (BinaryOp::NotEqual, true) => OpCode::NeDouble,
        _ => {
            return Err(InternalError::UnknownOperator {
                operator: op.symbol(),
                ty: left,
                line,
            });
        }
    };
    Ok(opcode)
}
