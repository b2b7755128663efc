use super::*;

fn run(source: &str) -> InterpretResult {
    Vm::new().interpret(source)
}

#[test]
fn arithmetic_precedence_and_division() {
    assert_eq!(run("print 1 + 2 * 3; print 8 / 2;"), InterpretResult::Ok);
}

#[test]
fn string_concatenation() {
    assert_eq!(run(r#"print "foo" + "bar";"#), InterpretResult::Ok);
}

#[test]
fn global_variables_round_trip() {
    assert_eq!(run("var a = 1; a = a + 1; print a;"), InterpretResult::Ok);
}

#[test]
fn assigning_an_undefined_global_is_a_runtime_error() {
    assert_eq!(run("x = 1;"), InterpretResult::RuntimeError);
}

#[test]
fn reading_an_undefined_global_is_a_runtime_error() {
    assert_eq!(run("print nope;"), InterpretResult::RuntimeError);
}

#[test]
fn locals_shadow_and_unwind_on_scope_exit() {
    assert_eq!(run("{ var a = 1; { var a = 2; print a; } print a; }"), InterpretResult::Ok);
}

#[test]
fn if_else_and_logical_operators() {
    assert_eq!(run("if (1 < 2 and true) { print \"yes\"; } else { print \"no\"; }"), InterpretResult::Ok);
}

#[test]
fn while_loop_runs_to_completion() {
    assert_eq!(run("var i = 0; while (i < 5) { i = i + 1; } print i;"), InterpretResult::Ok);
}

#[test]
fn for_loop_with_continue_skips_even_numbers() {
    let source = "\
        var sum = 0; \
        for (var i = 0; i < 10; i = i + 1) { \
            if (i - (i / 2) * 2 == 0) continue; \
            sum = sum + i; \
        } \
        print sum;";
    assert_eq!(run(source), InterpretResult::Ok);
}

#[test]
fn switch_statement_picks_matching_case() {
    let source = r#"
        switch (2) {
            case 1: print "one";
            case 2: print "two";
            default: print "other";
        }
    "#;
    assert_eq!(run(source), InterpretResult::Ok);
}

#[test]
fn recursive_function_call_and_return() {
    let source = "\
        fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } \
        print fib(10);";
    assert_eq!(run(source), InterpretResult::Ok);
}

#[test]
fn calling_a_function_with_the_wrong_arity_is_a_runtime_error() {
    assert_eq!(run("fun f(a, b) { return a + b; } print f(1);"), InterpretResult::RuntimeError);
}

#[test]
fn calling_a_non_callable_value_is_a_runtime_error() {
    assert_eq!(run("var x = 1; x();"), InterpretResult::RuntimeError);
}

#[test]
fn adding_a_number_to_a_string_is_a_runtime_error() {
    assert_eq!(run(r#"print 1 + "a";"#), InterpretResult::RuntimeError);
}

#[test]
fn clock_builtin_is_callable_with_zero_arguments() {
    assert_eq!(run("print clock();"), InterpretResult::Ok);
}

#[test]
fn compile_error_short_circuits_before_any_execution() {
    assert_eq!(run("print 1 +;"), InterpretResult::CompileError);
}

#[test]
fn globals_and_heap_persist_across_interpret_calls() {
    let mut vm = Vm::new();
    assert_eq!(vm.interpret("var counter = 0;"), InterpretResult::Ok);
    assert_eq!(vm.interpret("counter = counter + 1; print counter;"), InterpretResult::Ok);
}

#[test]
fn deeply_recursive_calls_overflow_the_frame_stack() {
    let source = "fun rec(n) { return rec(n + 1); } print rec(0);";
    assert_eq!(run(source), InterpretResult::RuntimeError);
}
