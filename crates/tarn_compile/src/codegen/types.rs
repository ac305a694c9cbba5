//! AST type to IR type mapping.

use tarn_base::{CompileError, Result, Span};
use tarn_ir::{IrType, Module};
use tarn_syntax::{CompilationContext, Type, TypeId};

/// Maps a tarn type to its IR representation.
///
/// | tarn | IR |
/// |------|----|
/// | Integer | `i64` |
/// | Boolean | `i1` |
/// | Character | `i8` |
/// | Double | `double` |
/// | `[T; n]` | `[n x T]` |
/// | `[T]`, `*T`, `&T` | `T*` |
/// | tuple / struct | literal struct of the mapped members |
/// | named type | its canonical mapping; struct-shaped targets are registered in the module under the name, once |
pub fn transform_type(
    comp: &mut CompilationContext,
    module: &mut Module,
    ty: TypeId,
    span: Span,
) -> Result<IrType> {
    match comp.types.get(ty).clone() {
        Type::Integer => Ok(IrType::Int(64)),
        Type::Boolean => Ok(IrType::Int(1)),
        Type::Character => Ok(IrType::Int(8)),
        Type::Double => Ok(IrType::Double),
        Type::Void => Ok(IrType::Void),
        Type::List { element, length } => {
            let element = transform_type(comp, module, element, span)?;
            Ok(IrType::Array(Box::new(element), length))
        }
        Type::Slice { element } => Ok(transform_type(comp, module, element, span)?.ptr_to()),
        Type::Pointer { referent } | Type::Reference { referent } => {
            Ok(transform_type(comp, module, referent, span)?.ptr_to())
        }
        Type::Tuple(elements) => {
            let mut fields = Vec::with_capacity(elements.len());
            for element in elements {
                fields.push(transform_type(comp, module, element, span)?);
            }
            Ok(IrType::Struct(fields))
        }
        Type::Struct(members) => {
            let mut fields = Vec::with_capacity(members.len());
            for (_, member) in members {
                fields.push(transform_type(comp, module, member, span)?);
            }
            Ok(IrType::Struct(fields))
        }
        Type::Function { params, ret, is_var_arg } => {
            let mut ir_params = Vec::with_capacity(params.len());
            for param in params {
                ir_params.push(transform_type(comp, module, param, span)?);
            }
            let ret = transform_type(comp, module, ret, span)?;
            Ok(IrType::Func {
                params: ir_params,
                ret: Box::new(ret),
                var_arg: is_var_arg,
            })
        }
        Type::Named(name) => {
            let name_str = comp.interner.resolve(name).to_string();
            if module.struct_body(&name_str).is_some() {
                return Ok(IrType::Named(name_str));
            }
            let target = comp.types.named_binding(name).ok_or_else(|| {
                CompileError::new(
                    format!("reference to undeclared type '{name_str}'"),
                    span,
                )
            })?;
            let body = transform_type(comp, module, target, span)?;
            match body {
                IrType::Struct(fields) => Ok(module.add_struct(name_str, fields)),
                other => Ok(other),
            }
        }
    }
}
