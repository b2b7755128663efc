// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 The Ember Authors

//! Interactive REPL (spec.md §1 "out of scope" collaborator, interface
//! only): read a line, compile it as a standalone script, run it, repeat.
//!
//! Unlike an expression-evaluating REPL, Ember's REPL lines are whole
//! programs (`print`, `var`, `if`, ...) rather than a single expression
//! whose value gets echoed — the language has no REPL-only "last value"
//! binding, so each line's own `print` statements are its only output.

#[cfg(test)]
mod repl_test;

use std::io::{self, BufRead, Write};

use crate::vm::Vm;

/// Run the REPL loop against stdin/stdout until EOF (Ctrl-D).
///
/// Globals and the intern table persist across lines, since they all
/// share one [`Vm`] (spec.md §5).
pub fn run() {
    let stdin = io::stdin();
    let mut vm = Vm::new();
    run_with(&mut vm, &mut stdin.lock(), &mut io::stdout());
}

/// The loop body, generalized over any reader/writer so it can be driven
/// by tests without touching the real stdin/stdout.
pub(crate) fn run_with<R: BufRead, W: Write>(vm: &mut Vm, input: &mut R, output: &mut W) {
    let mut line = String::new();
    loop {
        let _ = write!(output, "> ");
        let _ = output.flush();

        line.clear();
        let bytes_read = match input.read_line(&mut line) {
            Ok(n) => n,
            Err(err) => {
                eprintln!("ember: {err}");
                continue;
            }
        };
        if bytes_read == 0 {
            let _ = writeln!(output);
            return;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        vm.interpret(trimmed);
    }
}
