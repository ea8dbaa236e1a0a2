//! Statement emission.

use quill_core::InternalError;
use quill_core::ast::{BlockMarker, ConditionalMarker, Stmt, StmtKind};
use tracing::trace;

use super::{CodeGenerator, VisitMode};
use crate::bytecode::OpCode;

impl CodeGenerator<'_> {
    pub(super) fn enter_statement(&mut self, stmt: &Stmt) -> Result<(), InternalError> {
        self.emitter.set_line(stmt.line);
        if matches!(
            stmt.kind,
            StmtKind::Declaration(_) | StmtKind::Conditional(ConditionalMarker::Enter(_))
        ) {
            self.value_depth += 1;
        }
        Ok(())
    }

    pub(super) fn leave_statement(&mut self, stmt: &Stmt) -> Result<(), InternalError> {
        self.emitter.set_line(stmt.line);

        match &stmt.kind {
            StmtKind::Expr(_) => match self.mode {
                VisitMode::Normal => self.emitter.emit(OpCode::Pop),
                // The assignment already consumed its value.
                VisitMode::Assign => {
                    self.mode = VisitMode::Normal;
                    self.assign_depth = 0;
                    Ok(())
                }
            },
            StmtKind::Declaration(decl) => {
                self.value_depth -= 1;
                let id = decl.id.ok_or_else(|| InternalError::UnresolvedBinding {
                    name: decl.name.clone(),
                    line: stmt.line,
                })?;
                if decl.initializer.is_some() {
                    self.store(decl.ty, id)?;
                }
                trace!(name = %decl.name, %id, "allocated static slot");
                self.record_variable(&decl.name, decl.ty, id)
            }
            StmtKind::Block(BlockMarker::Begin) => self.emitter.emit(OpCode::PushStackPointer),
            StmtKind::Block(BlockMarker::End) => self.emitter.emit(OpCode::PopStackPointer),
            StmtKind::Conditional(ConditionalMarker::Enter(_)) => {
                self.value_depth -= 1;
                self.emitter.begin_conditional().map(drop)
            }
            StmtKind::Conditional(ConditionalMarker::Leave) => {
                self.emitter.end_conditional().map(drop)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::compile;
    use crate::bytecode::{Constant, OpCode};
    use crate::disasm::disassemble;
    use quill_core::DataType;
    use quill_core::ast::{
        AssignOp, BinaryOp, CompilationUnit, Declaration, Expr, FunctionDecl, Stmt,
    };

    fn declare(name: &str, ty: DataType, line: u32) -> Stmt {
        Stmt::declaration(Declaration::new(name, ty), line)
    }

    #[test]
    fn declaration_without_initializer_emits_nothing() {
        let exe = compile(CompilationUnit::new().statement(declare("x", DataType::Int, 1)));
        assert!(exe.code.is_empty());
        assert_eq!(exe.variable("x").map(|v| v.slot), Some(0));
    }

    #[test]
    fn declaration_initializer_is_converted_and_stored() {
        let exe = compile(CompilationUnit::new().statement(Stmt::declaration(
            Declaration::new("y", DataType::Double).with_initializer(Expr::int(3, 1)),
            1,
        )));
        exe.assert_opcodes(&[OpCode::PushInt, OpCode::CastIntToDouble, OpCode::PopStaticDouble]);
        assert_eq!(exe.constants.get(0), Some(&Constant::Int(3)));
    }

    #[test]
    fn assignment_inside_initializer_keeps_value() {
        // int a; int b = a = 4;
        let exe = compile(
            CompilationUnit::new()
                .statement(declare("a", DataType::Int, 1))
                .statement(Stmt::declaration(
                    Declaration::new("b", DataType::Int).with_initializer(Expr::assign(
                        AssignOp::Assign,
                        Expr::ident("a", 2),
                        Expr::int(4, 2),
                        2,
                    )),
                    2,
                )),
        );
        exe.assert_opcodes(&[
            OpCode::PushInt,
            OpCode::PopStaticInt,
            OpCode::PushStaticInt,
            OpCode::PopStaticInt,
        ]);
        assert_eq!(exe.code.read_u16(10), Some(1));
    }

    #[test]
    fn statement_after_assignment_is_popped_again() {
        let exe = compile(
            CompilationUnit::new()
                .statement(declare("x", DataType::Int, 1))
                .statement(Stmt::expr(Expr::assign(
                    AssignOp::Assign,
                    Expr::ident("x", 2),
                    Expr::int(1, 2),
                    2,
                )))
                .statement(Stmt::expr(Expr::ident("x", 3))),
        );
        exe.assert_opcodes(&[
            OpCode::PushInt,
            OpCode::PopStaticInt,
            OpCode::PushStaticInt,
            OpCode::Pop,
        ]);
    }

    #[test]
    fn blocks_save_and_restore_stack_pointer() {
        let exe = compile(CompilationUnit::new().statements([
            Stmt::begin(1),
            declare("x", DataType::Int, 2),
            Stmt::end(3),
        ]));
        exe.assert_opcodes(&[OpCode::PushStackPointer, OpCode::PopStackPointer]);
    }

    #[test]
    fn conditional_jumps_after_condition() {
        let exe = compile(CompilationUnit::new().statements([
            declare("x", DataType::Int, 1),
            Stmt::enter_if(Expr::binary(
                BinaryOp::Greater,
                Expr::ident("x", 2),
                Expr::int(0, 2),
                2,
            )),
            Stmt::begin(2),
            Stmt::expr(Expr::assign(
                AssignOp::Assign,
                Expr::ident("x", 3),
                Expr::int(0, 3),
                3,
            )),
            Stmt::end(4),
            Stmt::leave_if(4),
        ]));
        exe.assert_opcodes(&[
            OpCode::PushStaticInt,
            OpCode::PushInt,
            OpCode::GtInt,
            OpCode::Goto,
            OpCode::PushStackPointer,
            OpCode::PushInt,
            OpCode::PopStaticInt,
            OpCode::PopStackPointer,
            OpCode::Label,
        ]);

        let instructions = disassemble(exe.code.code()).unwrap();
        let goto = instructions.iter().find(|i| i.opcode == OpCode::Goto).unwrap();
        let label = instructions.iter().find(|i| i.opcode == OpCode::Label).unwrap();
        assert_eq!(goto.operands, label.operands);
    }

    #[test]
    fn nested_conditionals_close_innermost_first() {
        let cond = |line| Stmt::enter_if(Expr::bool(true, line));
        let exe = compile(CompilationUnit::new().statements([
            cond(1),
            cond(2),
            Stmt::leave_if(3),
            Stmt::leave_if(4),
        ]));

        let labels: Vec<_> = disassemble(exe.code.code())
            .unwrap()
            .into_iter()
            .filter(|i| matches!(i.opcode, OpCode::Goto | OpCode::Label))
            .map(|i| (i.opcode, i.operands[0]))
            .collect();
        assert_eq!(
            labels,
            vec![
                (OpCode::Goto, 0),
                (OpCode::Goto, 1),
                (OpCode::Label, 1),
                (OpCode::Label, 0),
            ]
        );
    }

    #[test]
    fn labels_are_unique_across_function_bodies() {
        let body = || {
            vec![
                Stmt::enter_if(Expr::bool(true, 2)),
                Stmt::leave_if(2),
            ]
        };
        let exe = compile(
            CompilationUnit::new()
                .function(FunctionDecl::new("f", DataType::Int, 1).with_body(body()))
                .function(FunctionDecl::new("g", DataType::Int, 1).with_body(body())),
        );

        let first = exe.function("f").and_then(|f| f.code.as_ref()).unwrap();
        let second = exe.function("g").and_then(|f| f.code.as_ref()).unwrap();
        // PUSH_INT (3 bytes), then GOTO's operand at offset 4.
        assert_eq!(first.read_u16(4), Some(0));
        assert_eq!(second.read_u16(4), Some(1));
    }

    #[test]
    fn lines_follow_statements() {
        let exe = compile(CompilationUnit::new().statements([
            Stmt::expr(Expr::int(1, 5)),
            Stmt::expr(Expr::int(2, 9)),
        ]));
        assert_eq!(exe.code.line_at(0), Some(5));
        assert_eq!(exe.code.line_at(3), Some(5));
        assert_eq!(exe.code.line_at(4), Some(9));
    }
}
