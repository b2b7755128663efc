use super::*;

#[test]
fn write_byte_extends_last_line_run() {
    let mut chunk = Chunk::new();
    chunk.write_byte(op::NIL, 1);
    chunk.write_byte(op::POP, 1);
    chunk.write_byte(op::NIL, 2);

    assert_eq!(chunk.line_for(0), 1);
    assert_eq!(chunk.line_for(1), 1);
    assert_eq!(chunk.line_for(2), 2);
}

#[test]
fn write_constant_uses_short_form_under_256() {
    let mut chunk = Chunk::new();
    chunk.write_constant(Value::Number(1.0), 1);
    assert_eq!(chunk.code[0], op::CONSTANT);
    assert_eq!(chunk.code[1], 0);
}

#[test]
fn write_constant_uses_long_form_past_256() {
    let mut chunk = Chunk::new();
    for i in 0..300 {
        chunk.add_constant(Value::Number(f64::from(i)));
    }
    chunk.write_constant(Value::Number(999.0), 1);
    let long_op_offset = chunk.code.len() - 4;
    assert_eq!(chunk.code[long_op_offset], op::CONSTANT_LONG);
    let idx_bytes = [
        chunk.code[long_op_offset + 1],
        chunk.code[long_op_offset + 2],
        chunk.code[long_op_offset + 3],
        0,
    ];
    assert_eq!(u32::from_le_bytes(idx_bytes), 300);
}

#[test]
fn line_for_out_of_range_returns_last_known_line() {
    let mut chunk = Chunk::new();
    chunk.write_byte(op::NIL, 7);
    assert_eq!(chunk.line_for(50), 7);
}
