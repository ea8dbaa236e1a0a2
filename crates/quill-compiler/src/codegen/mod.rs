//! Code generation pass.
//!
//! Reads the analyzed tree through the read-only traversal engine and
//! writes one [`BytecodeChunk`](crate::bytecode::BytecodeChunk) for the
//! top-level statements plus one per function body. All chunks share the
//! constant pool and the label id sequence.
//!
//! ## Value bookkeeping
//!
//! Identifiers are loads in normal mode and stores in assignment mode. The
//! mode flips to assignment at an assignment's `notify` (after its value,
//! before its target). Whether a store must also leave the stored value on
//! the stack depends on what encloses the assignment:
//!
//! - `assign_depth > 1`: nested in another assignment (`a = b = c`)
//! - `call_depth > 0`: inside a call's argument list
//! - `value_depth > 0`: operand of an operator or cast, a declaration
//!   initializer, or a condition
//!
//! A top-level assignment statement leaves nothing behind, so the statement
//! emits no `POP` for it.

mod expr;
mod stmt;

use quill_core::ast::{CompilationUnit, Expr, FunctionDecl, Item, Stmt};
use quill_core::{DataType, DeclId, InternalError};
use tracing::debug;

use crate::bytecode::{
    BytecodeChunk, CodeBuffer, CompiledFunction, ConstantPool, Executable, OpCode, Variable,
};
use crate::emit::{BytecodeEmitter, DEFAULT_MAX_LABEL_DEPTH, LabelStack};
use crate::visit::{Visitor, walk_stmt, walk_stmts};

/// Code generation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Bytes allocated before the first instruction.
    pub initial_capacity: usize,
    /// Bytes added each time the code buffer is full.
    pub alloc_increment: usize,
    /// Maximum number of nested conditionals.
    pub max_label_depth: usize,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            alloc_increment: 10,
            max_label_depth: DEFAULT_MAX_LABEL_DEPTH,
        }
    }
}

/// Generate the executable for an analyzed unit.
///
/// The unit must have passed semantic analysis without diagnostics; a
/// missing type or binding is reported as an [`InternalError`].
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn generate(
    unit: &CompilationUnit,
    options: &CodegenOptions,
) -> Result<Executable, InternalError> {
    let mut constants = ConstantPool::new();
    let mut labels = LabelStack::new(options.max_label_depth);
    let mut variables = Vec::new();

    let code = {
        let mut generator =
            CodeGenerator::new(&mut constants, &mut labels, &mut variables, options);
        for item in &unit.items {
            if let Item::Statement(stmt) = item {
                walk_stmt(&mut generator, stmt)?;
            }
        }
        generator.finish()
    };
    ensure_labels_closed(&labels)?;

    let mut functions = Vec::new();
    for func in unit.functions() {
        let id = func.id.ok_or_else(|| InternalError::UnresolvedBinding {
            name: func.name.clone(),
            line: func.line,
        })?;

        let code = match &func.body {
            Some(body) => {
                let mut generator =
                    CodeGenerator::new(&mut constants, &mut labels, &mut variables, options);
                generator.prologue(func)?;
                walk_stmts(&mut generator, body)?;
                let chunk = generator.finish();
                ensure_labels_closed(&labels)?;
                Some(chunk)
            }
            None => None,
        };

        functions.push(CompiledFunction {
            name: func.name.clone(),
            return_type: func.return_type,
            params: func.param_types(),
            slot: slot(id.index() as usize, "function")?,
            code,
        });
    }

    variables.sort_by_key(|v| v.slot);
    debug!(
        code = code.len(),
        constants = constants.len(),
        functions = functions.len(),
        "code generation finished"
    );

    Ok(Executable {
        code,
        constants,
        variables,
        functions,
    })
}

/// Whether identifiers load or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitMode {
    Normal,
    Assign,
}

/// The code generation visitor for one code body.
pub struct CodeGenerator<'a> {
    emitter: BytecodeEmitter<'a>,
    variables: &'a mut Vec<Variable>,
    mode: VisitMode,
    assign_depth: u32,
    call_depth: u32,
    value_depth: u32,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(
        constants: &'a mut ConstantPool,
        labels: &'a mut LabelStack,
        variables: &'a mut Vec<Variable>,
        options: &CodegenOptions,
    ) -> Self {
        let buffer = CodeBuffer::new(options.initial_capacity, options.alloc_increment);
        Self {
            emitter: BytecodeEmitter::new(constants, labels, buffer),
            variables,
            mode: VisitMode::Normal,
            assign_depth: 0,
            call_depth: 0,
            value_depth: 0,
        }
    }

    /// Store the incoming arguments into the parameter slots.
    ///
    /// Arguments were pushed left to right, so the last one is popped first.
    pub fn prologue(&mut self, func: &FunctionDecl) -> Result<(), InternalError> {
        self.emitter.set_line(func.line);
        for param in func.params.iter().rev() {
            let id = param.id.ok_or_else(|| InternalError::UnresolvedBinding {
                name: param.name.clone(),
                line: func.line,
            })?;
            self.store(param.ty, id)?;
            self.record_variable(&param.name, param.ty, id)?;
        }
        Ok(())
    }

    /// Finish and return the chunk.
    pub fn finish(self) -> BytecodeChunk {
        self.emitter.finish()
    }

    /// Whether a store must leave its value on the stack.
    fn value_needed(&self) -> bool {
        self.assign_depth > 1 || self.call_depth > 0 || self.value_depth > 0
    }

    fn load(&mut self, ty: DataType, id: DeclId) -> Result<(), InternalError> {
        let op = match ty {
            DataType::Double => OpCode::PushStaticDouble,
            DataType::Int | DataType::Boolean => OpCode::PushStaticInt,
        };
        self.emitter.emit_index(op, id.index() as usize, "static")
    }

    fn store(&mut self, ty: DataType, id: DeclId) -> Result<(), InternalError> {
        let op = match ty {
            DataType::Double => OpCode::PopStaticDouble,
            DataType::Int | DataType::Boolean => OpCode::PopStaticInt,
        };
        self.emitter.emit_index(op, id.index() as usize, "static")
    }

    fn record_variable(
        &mut self,
        name: &str,
        ty: DataType,
        id: DeclId,
    ) -> Result<(), InternalError> {
        self.variables.push(Variable {
            name: name.to_string(),
            ty,
            slot: slot(id.index() as usize, "static")?,
        });
        Ok(())
    }
}

impl Visitor for CodeGenerator<'_> {
    type Error = InternalError;

    fn enter_expr(&mut self, expr: &Expr) -> Result<(), InternalError> {
        self.enter_expression(expr)
    }

    fn notify_expr(&mut self, expr: &Expr) -> Result<(), InternalError> {
        self.notify_expression(expr)
    }

    fn leave_expr(&mut self, expr: &Expr) -> Result<(), InternalError> {
        self.leave_expression(expr)
    }

    fn enter_stmt(&mut self, stmt: &Stmt) -> Result<(), InternalError> {
        self.enter_statement(stmt)
    }

    fn leave_stmt(&mut self, stmt: &Stmt) -> Result<(), InternalError> {
        self.leave_statement(stmt)
    }
}

/// Every GOTO of a code body must find its LABEL in the same body.
fn ensure_labels_closed(labels: &LabelStack) -> Result<(), InternalError> {
    match labels.depth() {
        0 => Ok(()),
        depth => Err(InternalError::UnclosedConditionals { depth }),
    }
}

fn slot(index: usize, what: &'static str) -> Result<u16, InternalError> {
    u16::try_from(index).map_err(|_| InternalError::IndexOverflow { what, index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompilationContext;
    use crate::semantic::analyze;
    use quill_core::ast::{AssignOp, BinaryOp};

    pub(super) fn compile(mut unit: CompilationUnit) -> Executable {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let mut ctx = CompilationContext::new();
        let diags = analyze(&mut ctx, &mut unit).unwrap();
        assert!(diags.is_empty(), "unexpected diagnostics:\n{}", diags);
        generate(&unit, &CodegenOptions::default()).unwrap()
    }

    #[test]
    fn function_body_gets_own_chunk_with_prologue() {
        let body = vec![Stmt::expr(Expr::assign(
            AssignOp::Assign,
            Expr::ident("a", 2),
            Expr::ident("b", 2),
            2,
        ))];
        let exe = compile(
            CompilationUnit::new().function(
                FunctionDecl::new("f", DataType::Int, 1)
                    .param("a", DataType::Int)
                    .param("b", DataType::Double)
                    .with_body(body),
            ),
        );

        assert!(exe.code.is_empty());
        let f = exe.function("f").unwrap();
        assert_eq!(f.slot, 0);
        assert_eq!(f.params, vec![DataType::Int, DataType::Double]);
        let code = f.code.as_ref().unwrap();
        code.assert_opcodes(&[
            OpCode::PopStaticDouble,
            OpCode::PopStaticInt,
            OpCode::PushStaticDouble,
            OpCode::CastDoubleToInt,
            OpCode::PopStaticInt,
        ]);
        // b (slot 1) is popped first.
        assert_eq!(code.read_u16(1), Some(1));
        assert_eq!(code.read_u16(4), Some(0));

        let names: Vec<_> = exe.variables.iter().map(|v| (v.name.as_str(), v.slot)).collect();
        assert_eq!(names, vec![("a", 0), ("b", 1)]);
    }

    #[test]
    fn host_function_has_no_code() {
        let exe = compile(
            CompilationUnit::new().function(FunctionDecl::new("print", DataType::Int, 1)),
        );
        assert_eq!(exe.function("print").map(|f| f.code.is_none()), Some(true));
    }

    #[test]
    fn unanalyzed_tree_is_internal_error() {
        let unit = CompilationUnit::new().statement(Stmt::expr(Expr::ident("x", 2)));
        assert_eq!(
            generate(&unit, &CodegenOptions::default()),
            Err(InternalError::UnresolvedBinding {
                name: "x".into(),
                line: 2
            })
        );

        let unit = CompilationUnit::new().statement(Stmt::expr(Expr::binary(
            BinaryOp::Add,
            Expr::int(1, 3),
            Expr::int(2, 3),
            3,
        )));
        assert_eq!(
            generate(&unit, &CodegenOptions::default()),
            Err(InternalError::UnresolvedType {
                node: "binary expression",
                line: 3
            })
        );
    }

    #[test]
    fn conditional_left_open_is_internal_error() {
        let mut unit = CompilationUnit::new().statement(Stmt::enter_if(Expr::bool(true, 1)));
        let mut ctx = CompilationContext::new();
        assert!(analyze(&mut ctx, &mut unit).unwrap().is_empty());

        assert_eq!(
            generate(&unit, &CodegenOptions::default()),
            Err(InternalError::UnclosedConditionals { depth: 1 })
        );
    }

    #[test]
    fn conditional_cannot_span_function_bodies() {
        let mut unit = CompilationUnit::new()
            .function(
                FunctionDecl::new("f", DataType::Int, 1)
                    .with_body(vec![Stmt::enter_if(Expr::bool(true, 2))]),
            )
            .function(FunctionDecl::new("g", DataType::Int, 3).with_body(vec![Stmt::leave_if(4)]));
        let mut ctx = CompilationContext::new();
        assert!(analyze(&mut ctx, &mut unit).unwrap().is_empty());

        assert_eq!(
            generate(&unit, &CodegenOptions::default()),
            Err(InternalError::UnclosedConditionals { depth: 1 })
        );
    }

    #[test]
    fn stray_leave_is_internal_error() {
        let mut unit = CompilationUnit::new().statement(Stmt::leave_if(1));
        let mut ctx = CompilationContext::new();
        assert!(analyze(&mut ctx, &mut unit).unwrap().is_empty());

        assert_eq!(
            generate(&unit, &CodegenOptions::default()),
            Err(InternalError::LabelUnderflow)
        );
    }

    #[test]
    fn small_increment_still_fits() {
        let mut unit = CompilationUnit::new();
        for i in 0..40 {
            unit = unit.statement(Stmt::expr(Expr::int(i, 1)));
        }
        let mut ctx = CompilationContext::new();
        assert!(analyze(&mut ctx, &mut unit).unwrap().is_empty());

        let options = CodegenOptions {
            initial_capacity: 2,
            alloc_increment: 1,
            ..CodegenOptions::default()
        };
        let exe = generate(&unit, &options).unwrap();
        assert_eq!(exe.code.len(), 40 * 4);
        assert_eq!(exe.constants.len(), 40);
    }
}
