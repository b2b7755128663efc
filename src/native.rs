//! Native (Rust-implemented) builtins (spec.md §6: "Builtins registered
//! at init").
//!
//! Table-driven registration, mirroring the teacher's
//! `intrinsics::lookup_intrinsic` name-to-implementation dispatch, scaled
//! down to the single builtin this revision needs.

use std::sync::OnceLock;
use std::time::Instant;

use crate::value::Value;

/// Process start time, lazily set on first read.
static CLOCK_START: OnceLock<Instant> = OnceLock::new();

/// `clock()` returns seconds elapsed since VM start as a `Number`.
///
/// The start instant lives in a process-global (see [`CLOCK_START`])
/// because a `NativeFn`'s function pointer takes no captured state
/// (spec.md §3: "`NativeFn`: function pointer `(argc, argv) -> Value`").
pub fn clock(_args: &[Value]) -> Value {
    let start = CLOCK_START.get_or_init(Instant::now);
    Value::Number(start.elapsed().as_secs_f64())
}

/// All builtins registered into a fresh VM's globals, `(name, arity, fn)`.
pub const BUILTINS: &[(&str, u8, fn(&[Value]) -> Value)] = &[("clock", 0, clock)];
