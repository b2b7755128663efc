use super::*;
use crate::object::Heap;

#[test]
fn falsey_values_are_nil_and_false_only() {
    assert!(!Value::Nil.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(Value::Bool(true).is_truthy());
    assert!(Value::Number(0.0).is_truthy());
}

#[test]
fn numbers_equal_by_ieee_rules() {
    assert_eq!(Value::Number(1.0), Value::Number(1.0));
    assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
}

#[test]
fn different_variants_never_equal() {
    assert_ne!(Value::Nil, Value::Bool(false));
    assert_ne!(Value::Number(0.0), Value::Bool(false));
}

#[test]
fn interned_strings_are_identity_equal() {
    let mut heap = Heap::new();
    let a = Value::Obj(heap.copy_string("hi"));
    let b = Value::Obj(heap.copy_string("hi"));
    assert_eq!(a, b);
}

#[test]
fn display_formats_match_print_contract() {
    assert_eq!(Value::Nil.to_string(), "nil");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::Number(7.0).to_string(), "7");
}

// Property-based checks for the equality invariants spec.md §8 calls out:
// reflexive (except NaN), symmetric, and transitive on non-NaN values.
mod equality_properties {
    use super::Value;
    use proptest::prelude::*;

    fn finite_number() -> impl Strategy<Value = f64> {
        any::<f64>().prop_filter("no NaN", |n| !n.is_nan())
    }

    proptest! {
        #[test]
        fn reflexive(n in finite_number()) {
            let v = Value::Number(n);
            prop_assert!(v == v);
        }

        #[test]
        fn symmetric(a in finite_number(), b in finite_number()) {
            let (va, vb) = (Value::Number(a), Value::Number(b));
            prop_assert_eq!(va == vb, vb == va);
        }

        #[test]
        fn transitive(a in finite_number(), b in finite_number(), c in finite_number()) {
            let (va, vb, vc) = (Value::Number(a), Value::Number(b), Value::Number(c));
            if va == vb && vb == vc {
                prop_assert_eq!(va, vc);
            }
        }
    }
}
