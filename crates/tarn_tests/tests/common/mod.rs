//! Shared helpers for the end-to-end suites.
#![allow(dead_code)]

use tarn_base::CompileError;
use tarn_ir::{Function, Inst, Module, Op};

/// Compiles a program that is expected to succeed.
pub fn compile(source: &str) -> Module {
    tarn_compile::compile(source, "e2e").expect("program should compile")
}

/// Compiles a program that is expected to fail, returning the error.
pub fn compile_err(source: &str) -> CompileError {
    tarn_compile::compile(source, "e2e").expect_err("program should be rejected")
}

/// Fetches a function that must exist in the module.
pub fn function<'m>(module: &'m Module, name: &str) -> &'m Function {
    module
        .function(name)
        .unwrap_or_else(|| panic!("module should contain function '{name}'"))
}

/// Every live block of a lowered function ends in exactly one terminator.
pub fn assert_blocks_terminated(func: &Function) {
    for (_, block) in func.blocks() {
        assert!(
            block.is_terminated(),
            "block '{}' of '{}' lacks a terminator",
            block.name,
            func.name
        );
    }
}

/// All instructions of a function, in block order.
pub fn instructions(func: &Function) -> Vec<&Inst> {
    func.blocks()
        .flat_map(|(_, block)| block.insts.iter().map(|id| func.inst(*id)))
        .collect()
}

/// Counts instructions matching a predicate across all live blocks.
pub fn count_ops(func: &Function, pred: impl Fn(&Op) -> bool) -> usize {
    instructions(func).iter().filter(|inst| pred(&inst.op)).count()
}

/// Whether any live block carries the given label.
pub fn has_block(func: &Function, name: &str) -> bool {
    func.blocks().any(|(_, block)| block.name == name)
}
