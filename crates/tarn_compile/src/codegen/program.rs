//! Program assembly: functions and extern declarations into a module.

use std::collections::HashMap;

use tarn_base::{CompileError, Result};
use tarn_ir::{Builder, Function, IrType, Module, Param, Value};
use tarn_syntax::ast::{Decl, DeclNode, Program};
use tarn_syntax::CompilationContext;

use super::context::FuncLowering;
use super::types::transform_type;

/// Lowers a resolved, typed program to an IR module.
///
/// Functions and extern declarations lower in source order; `typealias`
/// declarations contribute nothing here (their names were bound during
/// checking). Top-level `let`/`var` bindings are not lowered — the code
/// generator is function-only.
pub fn lower_program<'a>(
    program: &Program<'a>,
    comp: &mut CompilationContext,
    module_name: &str,
) -> Result<Module> {
    let mut module = Module::new(module_name);
    for decl in program.decls {
        match &decl.node {
            DeclNode::Func { .. } => lower_function(decl, comp, &mut module)?,
            DeclNode::ExternFunc { .. } => declare_extern(decl, comp, &mut module)?,
            DeclNode::Let { .. } | DeclNode::Var { .. } | DeclNode::UninitializedVar { .. } => {
                return Err(CompileError::new(
                    "global variables are not supported",
                    decl.span,
                ));
            }
            DeclNode::TypeAlias { .. } | DeclNode::Param { .. } => {}
        }
    }
    Ok(module)
}

fn unique_name(module: &Module, name: &str, decl: &Decl<'_>) -> Result<()> {
    if module.function(name).is_some() {
        return Err(CompileError::new(
            format!("function '{name}' is already defined"),
            decl.span,
        ));
    }
    Ok(())
}

fn ir_params<'a>(
    params: &'a [&'a Decl<'a>],
    comp: &mut CompilationContext,
    module: &mut Module,
) -> Result<Vec<Param>> {
    let mut lowered = Vec::with_capacity(params.len());
    for param in params {
        let DeclNode::Param { name, ty, .. } = &param.node else {
            continue;
        };
        let ir_ty = transform_type(comp, module, *ty, param.span)?;
        lowered.push(Param::new(comp.interner.resolve(*name), ir_ty));
    }
    Ok(lowered)
}

fn declare_extern<'a>(
    decl: &'a Decl<'a>,
    comp: &mut CompilationContext,
    module: &mut Module,
) -> Result<()> {
    let DeclNode::ExternFunc { name, params, return_ty, is_var_arg } = &decl.node else {
        return Ok(());
    };
    let name_str = comp.interner.resolve(*name).to_string();
    unique_name(module, &name_str, decl)?;
    let params = ir_params(params, comp, module)?;
    let ret = transform_type(comp, module, *return_ty, decl.span)?;
    module.add_function(Function::new(name_str, params, ret, *is_var_arg));
    Ok(())
}

/// Lowers one function: external linkage, named parameters, an `entry`
/// block, then the body. Parameters bind to SSA argument values; a `Void`
/// function that falls off its end gets an implicit `ret void`.
fn lower_function<'a>(
    decl: &'a Decl<'a>,
    comp: &mut CompilationContext,
    module: &mut Module,
) -> Result<()> {
    let DeclNode::Func { name, params, return_ty, body, .. } = &decl.node else {
        return Ok(());
    };
    let name_str = comp.interner.resolve(*name).to_string();
    unique_name(module, &name_str, decl)?;

    let lowered_params = ir_params(params, comp, module)?;
    let ret_ir = transform_type(comp, module, *return_ty, decl.span)?;
    let mut func = Function::new(name_str.clone(), lowered_params, ret_ir.clone(), false);
    let entry = func.append_block("entry");

    let mut locals = HashMap::new();
    for (index, param) in params.iter().enumerate() {
        if let Some(id) = param.id() {
            locals.insert(id, Value::Param(index as u32));
        }
    }

    let mut lowering = FuncLowering {
        comp,
        module,
        func,
        locals,
        current: entry,
    };
    lowering.lower_block(body)?;

    if lowering.current_is_open() {
        if ret_ir == IrType::Void {
            let current = lowering.current;
            let mut b = Builder::new(&mut lowering.func, current);
            b.build_ret(None);
        } else {
            // The checker proves return coverage for non-void functions.
            return Err(CompileError::new(
                format!("internal: function '{name_str}' fell off its end"),
                decl.span,
            ));
        }
    }

    let FuncLowering { func, .. } = lowering;
    module.add_function(func);
    Ok(())
}
