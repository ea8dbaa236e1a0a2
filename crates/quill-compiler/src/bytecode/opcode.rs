//! Bytecode operation codes.
//!
//! This module defines the instruction set of the Quill VM. Each opcode is
//! a single byte followed by the operands named in its signature. The only
//! operand kind is a 2-byte big-endian index.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Kind of an inline operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// 2-byte big-endian unsigned index (signature tag `i`).
    Index,
}

impl OperandKind {
    /// Encoded width in bytes.
    pub const fn width(self) -> usize {
        match self {
            OperandKind::Index => 2,
        }
    }

    /// Signature tag.
    pub const fn tag(self) -> char {
        match self {
            OperandKind::Index => 'i',
        }
    }
}

const NONE: &[OperandKind] = &[];
const INDEX: &[OperandKind] = &[OperandKind::Index];

/// Bytecode operation codes.
///
/// The VM is a stack machine: operations pop their operands and push the
/// result. Booleans travel as ints, so they share the `*_INT` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum OpCode {
    // =========================================================================
    // Constants and statics
    // =========================================================================
    /// Push an int constant.
    /// Operand: constant pool index
    PushInt = 0,
    /// Push a double constant.
    /// Operand: constant pool index
    PushDouble,
    /// Push an int static variable.
    /// Operand: static slot
    PushStaticInt,
    /// Push a double static variable.
    /// Operand: static slot
    PushStaticDouble,
    /// Pop into an int static variable.
    /// Operand: static slot
    PopStaticInt,
    /// Pop into a double static variable.
    /// Operand: static slot
    PopStaticDouble,

    // =========================================================================
    // Functions
    // =========================================================================
    /// Push a function reference.
    /// Operand: function table index
    PushFunction,
    /// Call the function on top of the stack with the arguments below it.
    Invoke,

    // =========================================================================
    // Arithmetic
    // =========================================================================
    AddInt,
    AddDouble,
    SubInt,
    SubDouble,
    MulInt,
    MulDouble,
    DivInt,
    DivDouble,
    ModInt,
    ModDouble,
    MinusInt,
    MinusDouble,
    /// Add one to the int on top of the stack.
    Increment,
    /// Subtract one from the int on top of the stack.
    Decrement,

    // =========================================================================
    // Comparison
    // =========================================================================
    GtInt,
    GtDouble,
    GeInt,
    GeDouble,
    LtInt,
    LtDouble,
    LeInt,
    LeDouble,
    EqInt,
    EqDouble,
    NeInt,
    NeDouble,

    // =========================================================================
    // Logical
    // =========================================================================
    LogicalAnd,
    LogicalOr,
    LogicalNot,

    // =========================================================================
    // Conversions
    // =========================================================================
    CastIntToDouble,
    CastDoubleToInt,

    // =========================================================================
    // Stack and control
    // =========================================================================
    /// Discard the top of stack.
    Pop,
    /// Save the local frame base on block entry.
    PushStackPointer,
    /// Restore the local frame base on block exit.
    PopStackPointer,
    /// Pop a condition and jump to a label when it is false.
    /// Operand: label id
    Goto,
    /// Jump target marker.
    /// Operand: label id
    Label,
}

impl OpCode {
    /// Decode a byte, returning None for unregistered values.
    pub fn from_u8(value: u8) -> Option<Self> {
        OpCode::try_from(value).ok()
    }

    /// The byte this opcode encodes to.
    #[inline]
    pub fn byte(self) -> u8 {
        self.into()
    }

    /// Operands following the opcode byte, in order.
    pub fn signature(&self) -> &'static [OperandKind] {
        match self {
            OpCode::PushInt
            | OpCode::PushDouble
            | OpCode::PushStaticInt
            | OpCode::PushStaticDouble
            | OpCode::PopStaticInt
            | OpCode::PopStaticDouble
            | OpCode::PushFunction
            | OpCode::Goto
            | OpCode::Label => INDEX,
            _ => NONE,
        }
    }

    /// Signature as its tag string, e.g. `"i"`.
    pub fn signature_tags(&self) -> String {
        self.signature().iter().map(|k| k.tag()).collect()
    }

    /// Size of the operands in bytes, not counting the opcode byte.
    pub fn operand_size(&self) -> usize {
        self.signature().iter().map(|k| k.width()).sum()
    }

    /// Full encoded size of the instruction.
    #[inline]
    pub fn encoded_size(&self) -> usize {
        1 + self.operand_size()
    }

    /// Mnemonic used by the disassembler.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::PushInt => "PUSH_INT",
            OpCode::PushDouble => "PUSH_DOUBLE",
            OpCode::PushStaticInt => "PUSH_STATIC_INT",
            OpCode::PushStaticDouble => "PUSH_STATIC_DOUBLE",
            OpCode::PopStaticInt => "POP_STATIC_INT",
            OpCode::PopStaticDouble => "POP_STATIC_DOUBLE",
            OpCode::PushFunction => "PUSH_FUNCTION",
            OpCode::Invoke => "INVOKE",
            OpCode::AddInt => "ADD_INT",
            OpCode::AddDouble => "ADD_DOUBLE",
            OpCode::SubInt => "SUB_INT",
            OpCode::SubDouble => "SUB_DOUBLE",
            OpCode::MulInt => "MUL_INT",
            OpCode::MulDouble => "MUL_DOUBLE",
            OpCode::DivInt => "DIV_INT",
            OpCode::DivDouble => "DIV_DOUBLE",
            OpCode::ModInt => "MOD_INT",
            OpCode::ModDouble => "MOD_DOUBLE",
            OpCode::MinusInt => "MINUS_INT",
            OpCode::MinusDouble => "MINUS_DOUBLE",
            OpCode::Increment => "INCREMENT",
            OpCode::Decrement => "DECREMENT",
            OpCode::GtInt => "GT_INT",
            OpCode::GtDouble => "GT_DOUBLE",
            OpCode::GeInt => "GE_INT",
            OpCode::GeDouble => "GE_DOUBLE",
            OpCode::LtInt => "LT_INT",
            OpCode::LtDouble => "LT_DOUBLE",
            OpCode::LeInt => "LE_INT",
            OpCode::LeDouble => "LE_DOUBLE",
            OpCode::EqInt => "EQ_INT",
            OpCode::EqDouble => "EQ_DOUBLE",
            OpCode::NeInt => "NE_INT",
            OpCode::NeDouble => "NE_DOUBLE",
            OpCode::LogicalAnd => "LOGICAL_AND",
            OpCode::LogicalOr => "LOGICAL_OR",
            OpCode::LogicalNot => "LOGICAL_NOT",
            OpCode::CastIntToDouble => "CAST_INT_TO_DOUBLE",
            OpCode::CastDoubleToInt => "CAST_DOUBLE_TO_INT",
            OpCode::Pop => "POP",
            OpCode::PushStackPointer => "PUSH_STACK_POINTER",
            OpCode::PopStackPointer => "POP_STACK_POINTER",
            OpCode::Goto => "GOTO",
            OpCode::Label => "LABEL",
        }
    }
}
