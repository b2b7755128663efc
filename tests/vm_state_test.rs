// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 The Ember Authors

//! VM state management tests.
//!
//! Verifies the stateful behavior promised by spec.md §5: globals, the
//! intern table, and the object heap persist across `interpret` calls on
//! the same VM, while separate VM instances are fully isolated from
//! each other.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

mod common;

use common::TestVm;
use ember::vm::InterpretResult;

#[test]
fn vm_instances_are_isolated() {
    let mut vm1 = TestVm::new();
    let mut vm2 = TestVm::new();

    assert_eq!(vm1.interpret("var a = 1;"), InterpretResult::Ok);

    // vm2 never declared `a`; reading it is a runtime error precisely
    // because globals do not leak between VM instances.
    assert_eq!(vm2.interpret("print a;"), InterpretResult::RuntimeError);
}

#[test]
fn fresh_vm_starts_with_only_its_builtins_allocated() {
    let vm = TestVm::new();
    // `clock` is the only builtin (spec.md §6); its name string and the
    // NativeFn object itself are the only two objects at startup.
    assert_eq!(vm.object_count(), 2);
}

#[test]
fn globals_persist_across_interpret_calls() {
    let mut vm = TestVm::new();
    assert_eq!(vm.interpret("var counter = 0;"), InterpretResult::Ok);
    assert_eq!(vm.interpret("counter = counter + 1;"), InterpretResult::Ok);
    assert_eq!(vm.interpret("counter = counter + 1; print counter;"), InterpretResult::Ok);
}

#[test]
fn interning_deduplicates_equal_string_literals_across_calls() {
    // Re-using a literal already interned in an earlier call must allocate
    // one fewer object than interning a never-seen literal (spec.md §3:
    // "equal-content strings yield the same `String` reference").
    let mut reused = TestVm::new();
    assert_eq!(reused.interpret(r#"var a = "hello";"#), InterpretResult::Ok);
    let before_reused = reused.object_count();
    assert_eq!(reused.interpret(r#"var b = "hello"; print a == b;"#), InterpretResult::Ok);
    let growth_reused = reused.object_count() - before_reused;

    let mut fresh = TestVm::new();
    assert_eq!(fresh.interpret(r#"var a = "hello";"#), InterpretResult::Ok);
    let before_fresh = fresh.object_count();
    assert_eq!(fresh.interpret(r#"var c = "world"; print a == c;"#), InterpretResult::Ok);
    let growth_fresh = fresh.object_count() - before_fresh;

    assert_eq!(
        growth_reused + 1,
        growth_fresh,
        "reusing an already-interned literal should allocate exactly one fewer object \
         than interning a brand-new one (the compiled function and the new global's \
         name constant still allocate either way)"
    );
}

#[test]
fn a_runtime_error_resets_the_vm_but_leaves_it_usable() {
    let mut vm = TestVm::new();
    assert_eq!(vm.interpret("print nope;"), InterpretResult::RuntimeError);
    // The VM must remain usable after a runtime error (spec.md §6:
    // "VM remains usable after FreeVM/InitVM" — here, after an error
    // without a fresh `Vm`).
    assert_eq!(vm.interpret("print 1 + 1;"), InterpretResult::Ok);
}

#[test]
fn compile_error_does_not_disturb_prior_state() {
    let mut vm = TestVm::new();
    assert_eq!(vm.interpret("var a = 1;"), InterpretResult::Ok);
    assert_eq!(vm.interpret("var b = ;"), InterpretResult::CompileError);
    assert_eq!(vm.interpret("print a;"), InterpretResult::Ok);
}
