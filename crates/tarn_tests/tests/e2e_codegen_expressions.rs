//! Expression lowering: operator dispatch, memory addressing, calls.

mod common;

use common::{assert_blocks_terminated, compile, count_ops, function, instructions};
use tarn_ir::{BinOp, CastOp, CmpOp, Constant, Op, UnOp, Value};

#[test]
fn integer_arithmetic_uses_signed_instructions() {
    let module = compile(
        "func f(a: Integer, b: Integer) -> Integer { return a / b + a % b\n }\n",
    );
    let func = function(&module, "f");
    assert_eq!(count_ops(func, |op| matches!(op, Op::Binary { op: BinOp::SDiv, .. })), 1);
    assert_eq!(count_ops(func, |op| matches!(op, Op::Binary { op: BinOp::SRem, .. })), 1);
}

#[test]
fn double_arithmetic_uses_float_instructions() {
    let module = compile("func f(a: Double, b: Double) -> Double { return a * b - a / b\n }\n");
    let func = function(&module, "f");
    assert_eq!(count_ops(func, |op| matches!(op, Op::Binary { op: BinOp::FMul, .. })), 1);
    assert_eq!(count_ops(func, |op| matches!(op, Op::Binary { op: BinOp::FDiv, .. })), 1);
    assert_eq!(count_ops(func, |op| matches!(op, Op::Binary { op: BinOp::FSub, .. })), 1);
}

#[test]
fn comparisons_dispatch_on_operand_type() {
    let module = compile(
        "func f(a: Integer, x: Double) -> Boolean { return a <= 3 && x < 2.0\n }\n",
    );
    let func = function(&module, "f");
    assert_eq!(count_ops(func, |op| matches!(op, Op::Cmp { op: CmpOp::ISle, .. })), 1);
    assert_eq!(count_ops(func, |op| matches!(op, Op::Cmp { op: CmpOp::FOlt, .. })), 1);
    assert_eq!(count_ops(func, |op| matches!(op, Op::Binary { op: BinOp::And, .. })), 1);
}

#[test]
fn logical_or_is_bitwise_on_i1() {
    let module = compile("func f(a: Boolean, b: Boolean) -> Boolean { return a || b\n }\n");
    let func = function(&module, "f");
    assert_eq!(count_ops(func, |op| matches!(op, Op::Binary { op: BinOp::Or, .. })), 1);
}

#[test]
fn unary_operators_lower_to_neg_fneg_not() {
    let module = compile(
        "func f(a: Integer, x: Double, p: Boolean) -> Integer { let b = -a\n let y = -x\n let q = !p\n return b\n }\n",
    );
    let func = function(&module, "f");
    assert_eq!(count_ops(func, |op| matches!(op, Op::Unary { op: UnOp::Neg, .. })), 1);
    assert_eq!(count_ops(func, |op| matches!(op, Op::Unary { op: UnOp::FNeg, .. })), 1);
    assert_eq!(count_ops(func, |op| matches!(op, Op::Unary { op: UnOp::Not, .. })), 1);
}

#[test]
fn shifts_lower_to_shl_and_ashr() {
    // Shifts do not associate, so chaining needs explicit grouping.
    let module = compile("func f(a: Integer) -> Integer { return (a << 2) >> 1\n }\n");
    let func = function(&module, "f");
    assert_eq!(count_ops(func, |op| matches!(op, Op::Binary { op: BinOp::Shl, .. })), 1);
    assert_eq!(count_ops(func, |op| matches!(op, Op::Binary { op: BinOp::AShr, .. })), 1);
}

#[test]
fn tuple_accessor_reads_through_a_static_gep() {
    let module = compile(
        "func f() -> Integer { let t: (Integer, Integer) = (3, 4)\n return t[1]\n }\n",
    );
    let func = function(&module, "f");
    let gep_indices = instructions(func)
        .into_iter()
        .find_map(|inst| match &inst.op {
            Op::Gep { indices, .. } => Some(indices.clone()),
            _ => None,
        })
        .expect("expected a gep for the accessor");
    assert_eq!(gep_indices.len(), 2);
    // `[0, 1]`: aggregate step then the static member index.
    let as_int = |value: &Value| match value {
        Value::Const(id) => match func.constant(*id) {
            Constant::Int { value, .. } => *value,
            other => panic!("expected an integer index, got {other:?}"),
        },
        other => panic!("expected a constant index, got {other:?}"),
    };
    assert_eq!(as_int(&gep_indices[0]), 0);
    assert_eq!(as_int(&gep_indices[1]), 1);
}

#[test]
fn constant_tuple_initializers_store_one_aggregate() {
    let module = compile(
        "func f() -> Integer { let t: (Integer, Integer) = (3, 4)\n return t[0]\n }\n",
    );
    let func = function(&module, "f");
    let stored_aggregate = instructions(func).into_iter().any(|inst| {
        matches!(
            &inst.op,
            Op::Store { value: Value::Const(id), .. }
                if matches!(func.constant(*id), Constant::Aggregate { .. })
        )
    });
    assert!(stored_aggregate);
}

#[test]
fn mixed_tuple_initializers_store_element_by_element() {
    let module = compile(
        "func f(x: Integer) -> Integer { let t: (Integer, Integer) = (x, 4)\n return t[0]\n }\n",
    );
    let func = function(&module, "f");
    // One GEP per element plus one for the accessor read.
    assert_eq!(count_ops(func, |op| matches!(op, Op::Gep { .. })), 3);
    assert_eq!(count_ops(func, |op| matches!(op, Op::Store { .. })), 2);
}

#[test]
fn list_indexing_extends_the_dynamic_index_to_i32() {
    let module = compile(
        "func f(i: Integer) -> Integer { let xs: [Integer; 3] = [1, 2, 3]\n return xs[i]\n }\n",
    );
    let func = function(&module, "f");
    assert_eq!(
        count_ops(func, |op| matches!(op, Op::Cast { op: CastOp::SextOrTrunc, .. })),
        1
    );
}

#[test]
fn slice_indexing_uses_a_single_gep_index() {
    let module = compile("func f(xs: [Integer], i: Integer) -> Integer { return xs[i]\n }\n");
    let func = function(&module, "f");
    let gep_indices = instructions(func)
        .into_iter()
        .find_map(|inst| match &inst.op {
            Op::Gep { indices, .. } => Some(indices.len()),
            _ => None,
        })
        .expect("expected a gep for the slice accessor");
    assert_eq!(gep_indices, 1);
}

#[test]
fn assignment_through_a_pointer_parameter() {
    let module = compile("func f(p: *Integer) -> Integer { *p = 3\n return *p\n }\n");
    let func = function(&module, "f");
    // The store goes through the parameter's pointer value directly.
    let stores_through_param = instructions(func).into_iter().any(|inst| {
        matches!(inst.op, Op::Store { ptr: Value::Param(0), .. })
    });
    assert!(stores_through_param);
    assert_eq!(count_ops(func, |op| matches!(op, Op::Load { .. })), 1);
}

#[test]
fn address_of_a_local_passes_its_alloca() {
    let module = compile(
        "func f() -> Integer { var x = 1\n let r: &Integer = &x\n return x\n }\n",
    );
    let func = function(&module, "f");
    assert_blocks_terminated(func);
    // `&x` stores the alloca pointer itself into `r`.
    let stores_an_alloca = instructions(func).into_iter().any(|inst| {
        matches!(
            &inst.op,
            Op::Store { value: Value::Inst(id), .. }
                if matches!(func.inst(*id).op, Op::Alloca { .. })
        )
    });
    assert!(stores_an_alloca);
}

#[test]
fn compound_assignment_loads_applies_and_stores() {
    let module = compile("func f() -> Integer { var i = 1\n i += 2\n return i\n }\n");
    let func = function(&module, "f");
    assert_eq!(count_ops(func, |op| matches!(op, Op::Binary { op: BinOp::Add, .. })), 1);
    // Initializer store plus the compound assignment's write-back.
    assert_eq!(count_ops(func, |op| matches!(op, Op::Store { .. })), 2);
}

#[test]
fn string_literals_lower_to_byte_constants() {
    let module = compile("func f() { let s: [Character; 2] = \"hi\"\n }\n");
    let text = module.to_string();
    assert!(text.contains("c\"hi\""));
}

#[test]
fn calls_pass_arguments_in_order() {
    let module = compile(
        "extern func putchar(c: Integer) -> Integer\nfunc f() -> Integer { return putchar(65)\n }\n",
    );
    let func = function(&module, "f");
    let call = instructions(func)
        .into_iter()
        .find_map(|inst| match &inst.op {
            Op::Call { callee, args } => Some((callee.clone(), args.len())),
            _ => None,
        })
        .expect("expected a call");
    assert_eq!(call, ("putchar".to_string(), 1));
}

#[test]
fn omitted_defaulted_arguments_are_materialized() {
    let module = compile(
        "func f(x: Integer, y: Integer = 10) -> Integer { return x + y\n }\nfunc g() -> Integer { return f(1)\n }\n",
    );
    let func = function(&module, "g");
    let arg_count = instructions(func)
        .into_iter()
        .find_map(|inst| match &inst.op {
            Op::Call { args, .. } => Some(args.len()),
            _ => None,
        })
        .expect("expected a call");
    assert_eq!(arg_count, 2);
}

#[test]
fn var_arg_externs_accept_extra_arguments() {
    let module = compile(
        "extern func printf(fmt: *Character, ...) -> Integer\nfunc f(s: *Character) -> Integer { return printf(s, 1, 2)\n }\n",
    );
    let func = function(&module, "f");
    let arg_count = instructions(func)
        .into_iter()
        .find_map(|inst| match &inst.op {
            Op::Call { args, .. } => Some(args.len()),
            _ => None,
        })
        .expect("expected a call");
    assert_eq!(arg_count, 3);
    assert!(function(&module, "printf").is_var_arg);
}

#[test]
fn named_tuple_aliases_become_named_struct_types() {
    let module = compile(
        "typealias Point = (Integer, Integer)\nfunc f() -> Integer { let p: Point = (1, 2)\n return p[0]\n }\n",
    );
    assert!(module.struct_body("Point").is_some());
    assert!(module.to_string().contains("%Point = type { i64, i64 }"));
}

#[test]
fn forward_calls_lower_against_the_signature() {
    let module = compile(
        "func f() -> Integer { return g(2)\n }\nfunc g(x: Integer) -> Integer { return x\n }\n",
    );
    let func = function(&module, "f");
    assert_eq!(count_ops(func, |op| matches!(op, Op::Call { .. })), 1);
    assert!(module.function("g").is_some());
}
