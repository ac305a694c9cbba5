//! Programs that must be rejected, each at its proper stage.

mod common;

use common::{compile, compile_err};

#[test]
fn operand_mismatch_fails_type_checking() {
    let err = compile_err("func f() -> Integer { return 1 + true\n }\n");
    assert!(err.message.contains("'+' cannot be applied to Integer and Boolean"));
}

#[test]
fn assigning_to_a_let_binding_fails() {
    let err = compile_err("func f() { let a = 5\n a = 6\n }\n");
    assert!(err.message.contains("immutable"));
}

#[test]
fn out_of_range_tuple_index_fails() {
    let err = compile_err(
        "func f() -> Integer { let t: (Integer, Integer) = (3, 4)\n return t[2]\n }\n",
    );
    assert!(err.message.contains("member index 2 is out of range"));
}

#[test]
fn bare_integer_literals_infer_integer() {
    // `let a = 5` is legal: the initializer's type is inferred.
    compile("func f() -> Integer { let a = 5\n return a\n }\n");
}

#[test]
fn unresolved_names_fail_resolution() {
    let err = compile_err("func f() -> Integer { return missing\n }\n");
    assert!(err.message.contains("unresolved name 'missing'"));
}

#[test]
fn calling_a_variable_fails() {
    let err = compile_err("func f() -> Integer { let g = 1\n return g()\n }\n");
    assert!(err.message.contains("'g' is not a function"));
}

#[test]
fn argument_type_mismatch_fails_overload_resolution() {
    let err = compile_err(
        "func g(x: Integer) -> Integer { return x\n }\nfunc f() -> Integer { return g(true)\n }\n",
    );
    assert!(err.message.contains("no function 'g' matches"));
}

#[test]
fn return_type_mismatch_fails() {
    let err = compile_err("func f() -> Integer { return 1.5\n }\n");
    assert!(err.message.contains("return type mismatch"));
}

#[test]
fn missing_return_coverage_fails() {
    let err = compile_err("func f(x: Integer) -> Integer { if x > 0 { return 1\n }\n }\n");
    assert!(err.message.contains("does not return on every path"));
}

#[test]
fn non_boolean_conditions_fail() {
    let err = compile_err("func f() { if 1 { }\n }\n");
    assert!(err.message.contains("if condition must be a Boolean"));
}

#[test]
fn undeclared_type_names_fail() {
    let err = compile_err("func f(x: Mystery) { }\n");
    assert!(err.message.contains("undeclared type 'Mystery'"));
}

#[test]
fn conflicting_type_aliases_fail() {
    let err = compile_err("typealias T = Integer\ntypealias T = Double\n");
    assert!(err.message.contains("conflicting type alias"));
}

#[test]
fn nested_functions_fail_at_lowering() {
    let err = compile_err("func outer() { func inner() { }\n }\n");
    assert!(err.message.contains("nested function declarations are not supported"));
}

#[test]
fn global_variables_fail_at_lowering() {
    let err = compile_err("let a: Integer = 5\n");
    assert!(err.message.contains("global variables are not supported"));
}

#[test]
fn duplicate_function_names_fail_at_lowering() {
    let err = compile_err(
        "func f() -> Integer { return 1\n }\nfunc f(x: Integer) -> Integer { return x\n }\n",
    );
    assert!(err.message.contains("function 'f' is already defined"));
}

#[test]
fn taking_the_address_of_a_temporary_fails() {
    let err = compile_err("func f() { let p = &(1 + 2)\n }\n");
    assert!(err.message.contains("cannot take the address"));
}

#[test]
fn chained_comparisons_fail_to_parse() {
    let err = compile_err("func f() -> Boolean { return 1 < 2 < 3\n }\n");
    assert!(err.message.contains("cannot be chained"));
}

#[test]
fn list_elements_must_unify() {
    let err = compile_err("func f() { let xs = [1, 2.0]\n }\n");
    assert!(err.message.contains("same type"));
}
