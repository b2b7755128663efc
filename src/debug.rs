//! Bytecode disassembler (spec.md §4.6, collaborator).
//!
//! Decodes one instruction at a given offset and returns the next
//! offset, mirroring the teacher's `compiler::disassemble` free function.

use crate::chunk::{op, Chunk};

/// Pretty-print every instruction in `chunk`, prefixed with `name`.
#[must_use]
pub fn disassemble_chunk(chunk: &Chunk, name: &str) -> String {
    let mut out = format!("== {name} ==\n");
    let mut offset = 0;
    while offset < chunk.len() {
        let (line, next) = disassemble_instruction(chunk, offset);
        out.push_str(&line);
        out.push('\n');
        offset = next;
    }
    out
}

/// Decode the instruction at `offset`; returns its text and the offset
/// of the following instruction.
#[must_use]
pub fn disassemble_instruction(chunk: &Chunk, offset: usize) -> (String, usize) {
    let line = chunk.line_for(offset);
    let line_marker = if offset > 0 && chunk.line_for(offset - 1) == line {
        "   |".to_string()
    } else {
        format!("{line:4}")
    };
    let prefix = format!("{offset:04} {line_marker} ");

    let opcode = chunk.code[offset];
    match opcode {
        op::CONSTANT => constant_instruction("CONSTANT", chunk, offset, prefix, false),
        op::CONSTANT_LONG => constant_instruction("CONSTANT_LONG", chunk, offset, prefix, true),
        op::NIL => simple_instruction("NIL", offset, prefix),
        op::TRUE => simple_instruction("TRUE", offset, prefix),
        op::FALSE => simple_instruction("FALSE", offset, prefix),
        op::POP => simple_instruction("POP", offset, prefix),
        op::POPN => byte_instruction("POPN", chunk, offset, prefix),
        op::NEGATE => simple_instruction("NEGATE", offset, prefix),
        op::NOT => simple_instruction("NOT", offset, prefix),
        op::EQUAL => simple_instruction("EQUAL", offset, prefix),
        op::NOT_EQUAL => simple_instruction("NOT_EQUAL", offset, prefix),
        op::EQUAL_SWITCH => simple_instruction("EQUAL_SWITCH", offset, prefix),
        op::GREATER => simple_instruction("GREATER", offset, prefix),
        op::GREATER_EQUAL => simple_instruction("GREATER_EQUAL", offset, prefix),
        op::LESS => simple_instruction("LESS", offset, prefix),
        op::LESS_EQUAL => simple_instruction("LESS_EQUAL", offset, prefix),
        op::ADD => simple_instruction("ADD", offset, prefix),
        op::SUBTRACT => simple_instruction("SUBTRACT", offset, prefix),
        op::MULTIPLY => simple_instruction("MULTIPLY", offset, prefix),
        op::DIVIDE => simple_instruction("DIVIDE", offset, prefix),
        op::PRINT => simple_instruction("PRINT", offset, prefix),
        op::DEFINE_GLOBAL => constant_instruction("DEFINE_GLOBAL", chunk, offset, prefix, false),
        op::DEFINE_GLOBAL_LONG => constant_instruction("DEFINE_GLOBAL_LONG", chunk, offset, prefix, true),
        op::GET_GLOBAL => constant_instruction("GET_GLOBAL", chunk, offset, prefix, false),
        op::GET_GLOBAL_LONG => constant_instruction("GET_GLOBAL_LONG", chunk, offset, prefix, true),
        op::SET_GLOBAL => constant_instruction("SET_GLOBAL", chunk, offset, prefix, false),
        op::SET_GLOBAL_LONG => constant_instruction("SET_GLOBAL_LONG", chunk, offset, prefix, true),
        op::GET_LOCAL => byte_instruction("GET_LOCAL", chunk, offset, prefix),
        op::GET_LOCAL_LONG => index_long_instruction("GET_LOCAL_LONG", chunk, offset, prefix),
        op::SET_LOCAL => byte_instruction("SET_LOCAL", chunk, offset, prefix),
        op::SET_LOCAL_LONG => index_long_instruction("SET_LOCAL_LONG", chunk, offset, prefix),
        op::JUMP => jump_instruction("JUMP", 1, chunk, offset, prefix),
        op::JUMP_IF_FALSE => jump_instruction("JUMP_IF_FALSE", 1, chunk, offset, prefix),
        op::JUMP_IF_TRUE => jump_instruction("JUMP_IF_TRUE", 1, chunk, offset, prefix),
        op::JUMP_BACK => jump_instruction("JUMP_BACK", -1, chunk, offset, prefix),
        op::CALL => byte_instruction("CALL", chunk, offset, prefix),
        op::RETURN => simple_instruction("RETURN", offset, prefix),
        _ => (format!("{prefix}Unknown opcode {opcode}"), offset + 1),
    }
}

fn simple_instruction(name: &str, offset: usize, prefix: String) -> (String, usize) {
    (format!("{prefix}{name}"), offset + 1)
}

fn byte_instruction(name: &str, chunk: &Chunk, offset: usize, prefix: String) -> (String, usize) {
    let slot = chunk.code[offset + 1];
    (format!("{prefix}{name:<18} {slot:4}"), offset + 2)
}

fn read_u24(chunk: &Chunk, offset: usize) -> u32 {
    u32::from(chunk.code[offset]) | (u32::from(chunk.code[offset + 1]) << 8) | (u32::from(chunk.code[offset + 2]) << 16)
}

fn index_long_instruction(name: &str, chunk: &Chunk, offset: usize, prefix: String) -> (String, usize) {
    let index = read_u24(chunk, offset + 1);
    (format!("{prefix}{name:<18} {index:4}"), offset + 4)
}

fn constant_instruction(name: &str, chunk: &Chunk, offset: usize, prefix: String, long: bool) -> (String, usize) {
    let (index, len) = if long {
        (read_u24(chunk, offset + 1) as usize, 4)
    } else {
        (chunk.code[offset + 1] as usize, 2)
    };
    let value = chunk.constants.get(index).map_or_else(|| "?".to_string(), ToString::to_string);
    (format!("{prefix}{name:<18} {index:4} '{value}'"), offset + len)
}

fn jump_instruction(name: &str, sign: i64, chunk: &Chunk, offset: usize, prefix: String) -> (String, usize) {
    let distance = i64::from(read_u24(chunk, offset + 1));
    let target = offset as i64 + 4 + sign * distance;
    (format!("{prefix}{name:<18} {offset:4} -> {target}"), offset + 4)
}
