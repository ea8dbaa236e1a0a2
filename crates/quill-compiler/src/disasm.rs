//! Disassembler for the instruction stream.
//!
//! A pure reader that decodes bytes with the same signature table the
//! emitter uses. It checks the format's self-consistency: any byte that is
//! not a registered opcode, or an instruction cut short, is a decode error.

use std::fmt;

use quill_core::DecodeError;
use rustc_hash::FxHashMap;

use crate::bytecode::{OpCode, OperandKind};

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Offset of the opcode byte
    pub offset: usize,
    /// The opcode
    pub opcode: OpCode,
    /// Decoded operands in signature order
    pub operands: Vec<u16>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}: {}", self.offset, self.opcode.name())?;
        for operand in &self.operands {
            write!(f, " {:04x}", operand)?;
        }
        Ok(())
    }
}

/// Decode the whole stream.
pub fn disassemble(code: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
    let mut instructions = Vec::new();
    let mut offset = 0;

    while offset < code.len() {
        let instruction = decode_at(code, offset)?;
        offset += instruction.opcode.encoded_size();
        instructions.push(instruction);
    }

    Ok(instructions)
}

/// Decode the instruction starting at `offset`.
fn decode_at(code: &[u8], offset: usize) -> Result<Instruction, DecodeError> {
    let byte = code[offset];
    let opcode = OpCode::try_from(byte).map_err(|_| DecodeError::UnknownOpcode { offset, byte })?;

    let mut cursor = offset + 1;
    let mut operands = Vec::with_capacity(opcode.signature().len());
    for kind in opcode.signature() {
        match kind {
            OperandKind::Index => {
                let bytes = code
                    .get(cursor..cursor + kind.width())
                    .ok_or(DecodeError::TruncatedOperand {
                        offset,
                        opcode: opcode.name(),
                    })?;
                operands.push(u16::from_be_bytes([bytes[0], bytes[1]]));
            }
        }
        cursor += kind.width();
    }

    Ok(Instruction {
        offset,
        opcode,
        operands,
    })
}

/// Map every `LABEL` id to the offset of its instruction.
///
/// This is the fix-up table a loader needs to turn `GOTO` ids into
/// addresses. A repeated id keeps its first offset.
pub fn label_offsets(code: &[u8]) -> Result<FxHashMap<u16, usize>, DecodeError> {
    let mut labels = FxHashMap::default();
    for instruction in disassemble(code)? {
        if instruction.opcode == OpCode::Label {
            labels.entry(instruction.operands[0]).or_insert(instruction.offset);
        }
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_operands_big_endian() {
        let code = [
            OpCode::PushInt.byte(),
            0x01,
            0x02,
            OpCode::AddInt.byte(),
            OpCode::PopStaticInt.byte(),
            0x00,
            0x03,
        ];
        let instructions = disassemble(&code).unwrap();

        assert_eq!(instructions.len(), 3);
        assert_eq!(instructions[0].operands, vec![0x0102]);
        assert_eq!(instructions[1].offset, 3);
        assert!(instructions[1].operands.is_empty());
        assert_eq!(instructions[2].to_string(), "0004: POP_STATIC_INT 0003");
    }

    #[test]
    fn unknown_opcode_is_fatal() {
        let code = [OpCode::Pop.byte(), 0xee];
        assert_eq!(
            disassemble(&code),
            Err(DecodeError::UnknownOpcode {
                offset: 1,
                byte: 0xee
            })
        );
    }

    #[test]
    fn truncated_operand() {
        let code = [OpCode::Goto.byte(), 0x00];
        assert_eq!(
            disassemble(&code),
            Err(DecodeError::TruncatedOperand {
                offset: 0,
                opcode: "GOTO"
            })
        );
    }

    #[test]
    fn label_table() {
        let code = [
            OpCode::Goto.byte(),
            0,
            5,
            OpCode::Pop.byte(),
            OpCode::Label.byte(),
            0,
            5,
        ];
        let labels = label_offsets(&code).unwrap();
        assert_eq!(labels.get(&5), Some(&4));
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn empty_stream() {
        assert!(disassemble(&[]).unwrap().is_empty());
    }
}
