// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 The Ember Authors

//! # Ember
//!
//! Bytecode compiler and stack-based virtual machine for the Ember
//! scripting language.
//!
//! This crate provides:
//! - A hand-rolled scanner and single-pass Pratt-parsing compiler
//! - A flat-byte bytecode format with short/long operand encoding
//! - A stack-based VM with function calls, closures-free local scoping,
//!   and a handful of native builtins
//! - A disassembler for `--dump`/`--trace` diagnostics
//! - A line-buffered REPL

pub mod chunk;
pub mod compiler;
pub mod debug;
pub mod error;
pub mod native;
pub mod object;
pub mod repl;
pub mod scanner;
pub mod table;
pub mod value;
pub mod vm;

pub use error::{EmberError, Result};
pub use vm::{InterpretResult, Vm};

/// Crate version, surfaced by `ember --version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
