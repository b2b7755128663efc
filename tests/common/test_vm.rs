// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 The Ember Authors

//! Test VM for integration testing.
//!
//! Wraps [`Vm`] so tests can drive multiple `interpret` calls against the
//! same globals/intern table/heap, the same way the REPL does (spec.md §5).

#![expect(dead_code, reason = "test infrastructure used selectively across test files")]

use ember::vm::{InterpretResult, Vm};

/// A stateful VM for testing language features end to end.
///
/// Each test should create its own `TestVm` to keep globals/heap isolated
/// from other tests, since a single process-wide `Vm` is otherwise meant
/// to persist across `Interpret` calls (spec.md §5).
pub struct TestVm {
    vm: Vm,
}

impl Default for TestVm {
    fn default() -> Self {
        Self::new()
    }
}

impl TestVm {
    #[must_use]
    pub fn new() -> Self {
        Self { vm: Vm::new() }
    }

    /// Compile and run one program against this VM's persistent state.
    pub fn interpret(&mut self, source: &str) -> InterpretResult {
        self.vm.interpret(source)
    }

    /// Number of heap objects allocated so far (strings, functions, natives).
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.vm.object_count()
    }
}
