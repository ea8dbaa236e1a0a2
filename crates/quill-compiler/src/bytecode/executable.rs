//! The compiled artifact handed to the VM.

use std::fmt;

use quill_core::{DataType, DecodeError};

use super::{BytecodeChunk, ConstantPool, OpCode};
use crate::disasm::{self, Instruction};

/// A global variable slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Source name
    pub name: String,
    /// Declared type
    pub ty: DataType,
    /// Static slot used by the push/pop static instructions
    pub slot: u16,
}

/// An entry of the function table.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    /// Source name
    pub name: String,
    /// Declared return type
    pub return_type: DataType,
    /// Parameter types in order
    pub params: Vec<DataType>,
    /// Index used by `PUSH_FUNCTION`
    pub slot: u16,
    /// Body, or `None` for host functions
    pub code: Option<BytecodeChunk>,
}

/// Instruction bytes, constant pool and symbol tables of one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Executable {
    /// Top-level code
    pub code: BytecodeChunk,
    /// Constants shared by all code bodies
    pub constants: ConstantPool,
    /// Static variables (globals, locals and parameters) by slot order
    pub variables: Vec<Variable>,
    /// Function table by slot
    pub functions: Vec<CompiledFunction>,
}

impl Executable {
    /// Opcodes of the top-level code.
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.code.opcodes()
    }

    /// Assert the exact opcode sequence of the top-level code.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        self.code.assert_opcodes(expected);
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Option<&CompiledFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Look up the last variable declared with `name`.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().rev().find(|v| v.name == name)
    }

    /// Decode every code body; host functions are left out.
    pub fn listing(&self) -> Result<Listing, DecodeError> {
        let mut sections = vec![Section {
            title: "code".to_string(),
            len: self.code.len(),
            instructions: disasm::disassemble(self.code.code())?,
        }];

        for function in &self.functions {
            let Some(code) = &function.code else {
                continue;
            };
            sections.push(Section {
                title: format!("function {}", function.name),
                len: code.len(),
                instructions: disasm::disassemble(code.code())?,
            });
        }

        Ok(Listing { sections })
    }

    /// Render every code body as a disassembly listing.
    pub fn disassemble(&self) -> Result<String, DecodeError> {
        self.listing().map(|listing| listing.to_string())
    }
}

/// Decoded instructions of every code body in an [`Executable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    title: String,
    len: usize,
    instructions: Vec<Instruction>,
}

impl Listing {
    /// Total number of decoded instructions.
    pub fn instruction_count(&self) -> usize {
        self.sections.iter().map(|s| s.instructions.len()).sum()
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "-- {} len({}) --", section.title, section.len)?;
            for instruction in &section.instructions {
                writeln!(f, "{}", instruction)?;
            }
        }
        Ok(())
    }
}
