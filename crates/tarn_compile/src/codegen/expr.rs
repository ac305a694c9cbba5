//! Expression lowering.
//!
//! Every expression lowers into the current block and yields a [`Value`].
//! Two entry points matter:
//!
//! - [`FuncLowering::lower_expr`] produces the expression's *value*;
//! - [`FuncLowering::lower_reference`] produces a *location* (a pointer
//!   suitable for load and store), used for assignment targets, `&`, and
//!   accessor chains.
//!
//! Expressions of reference or slice type already are pointers, so their
//! value doubles as their location.

use tarn_base::{CompileError, Result, Span, Symbol};
use tarn_ir::{BinOp, Builder, CmpOp, IrType, Value};
use tarn_syntax::ast::{Expr, ExprKind};
use tarn_syntax::decls::LiteralValue;
use tarn_syntax::operator;
use tarn_syntax::types::{Type, TypeId};

use super::context::FuncLowering;
use super::types::transform_type;

impl<'c, 'm> FuncLowering<'c, 'm> {
    fn expr_ty<'a>(&self, expr: &'a Expr<'a>) -> Result<TypeId> {
        expr.ty().ok_or_else(|| {
            CompileError::new("internal: expression was not typed before lowering", expr.span)
        })
    }

    fn op_str(&self, op: Symbol) -> String {
        self.comp.interner.resolve(op).to_string()
    }

    pub fn lower_expr<'a>(&mut self, expr: &'a Expr<'a>) -> Result<Value> {
        let ty = self.expr_ty(expr)?;
        match &expr.kind {
            ExprKind::IntegerLit(value) => {
                let mut b = Builder::new(&mut self.func, self.current);
                Ok(b.const_int(IrType::Int(64), *value))
            }
            ExprKind::DoubleLit(value) => {
                let mut b = Builder::new(&mut self.func, self.current);
                Ok(b.const_float(*value))
            }
            ExprKind::CharacterLit(byte) => {
                let mut b = Builder::new(&mut self.func, self.current);
                Ok(b.const_int(IrType::Int(8), *byte as i64))
            }
            ExprKind::BoolLit(value) => {
                let mut b = Builder::new(&mut self.func, self.current);
                Ok(b.const_int(IrType::Int(1), i64::from(*value)))
            }
            ExprKind::StringLit(content) => {
                let data = self.comp.interner.resolve(*content).as_bytes().to_vec();
                let mut b = Builder::new(&mut self.func, self.current);
                Ok(b.const_bytes(data))
            }
            ExprKind::Identifier { name, decl } => {
                let id = decl.get().ok_or_else(|| {
                    CompileError::new("internal: identifier was not bound", expr.span)
                })?;
                let name_str = self.comp.interner.resolve(*name).to_string();
                let value = self.local(id, &name_str, expr.span)?;
                match value {
                    // Parameters are SSA arguments and are used directly.
                    Value::Param(_) => Ok(value),
                    // Locals live in stack slots; a value use loads them.
                    _ => {
                        let mut b = Builder::new(&mut self.func, self.current);
                        Ok(b.build_load(value))
                    }
                }
            }
            ExprKind::Unary { op, operand } => self.lower_unary(*op, operand, expr.span),
            ExprKind::Binary { left, op, right } => {
                self.lower_binary(left, *op, right, expr.span)
            }
            ExprKind::Accessor { .. } => {
                let location = self.lower_reference(expr)?;
                let mut b = Builder::new(&mut self.func, self.current);
                Ok(b.build_load(location))
            }
            ExprKind::Call { callee, callee_decl, args } => {
                self.lower_call(*callee, callee_decl.get(), args, ty, expr.span)
            }
            ExprKind::Tuple { .. } | ExprKind::List { .. } => self.lower_constant(expr),
        }
    }

    // ---- constants ----

    /// Whether the expression can lower to a constant without emitting
    /// instructions.
    pub fn is_constant_expr<'a>(expr: &'a Expr<'a>) -> bool {
        match &expr.kind {
            ExprKind::IntegerLit(_)
            | ExprKind::DoubleLit(_)
            | ExprKind::CharacterLit(_)
            | ExprKind::BoolLit(_)
            | ExprKind::StringLit(_) => true,
            ExprKind::Tuple { elements } | ExprKind::List { elements } => {
                elements.iter().all(|e| Self::is_constant_expr(e))
            }
            _ => false,
        }
    }

    /// Lowers a literal or an aggregate of literals to a constant.
    pub fn lower_constant<'a>(&mut self, expr: &'a Expr<'a>) -> Result<Value> {
        match &expr.kind {
            ExprKind::Tuple { elements } | ExprKind::List { elements } => {
                let mut lowered = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    lowered.push(self.lower_constant(element)?);
                }
                let ty = self.expr_ty(expr)?;
                let ir_ty = transform_type(self.comp, self.module, ty, expr.span)?;
                let mut b = Builder::new(&mut self.func, self.current);
                Ok(b.const_aggregate(ir_ty, lowered))
            }
            ExprKind::IntegerLit(_)
            | ExprKind::DoubleLit(_)
            | ExprKind::CharacterLit(_)
            | ExprKind::BoolLit(_)
            | ExprKind::StringLit(_) => self.lower_expr(expr),
            _ => Err(CompileError::new(
                "aggregate initializers must be built from literals",
                expr.span,
            )),
        }
    }

    pub fn const_literal(&mut self, value: LiteralValue) -> Value {
        let string_data = match value {
            LiteralValue::Str(s) => Some(self.comp.interner.resolve(s).as_bytes().to_vec()),
            _ => None,
        };
        let mut b = Builder::new(&mut self.func, self.current);
        match value {
            LiteralValue::Integer(v) => b.const_int(IrType::Int(64), v),
            LiteralValue::Double(v) => b.const_float(v),
            LiteralValue::Boolean(v) => b.const_int(IrType::Int(1), i64::from(v)),
            LiteralValue::Character(v) => b.const_int(IrType::Int(8), v as i64),
            LiteralValue::Str(_) => b.const_bytes(string_data.unwrap_or_default()),
        }
    }

    // ---- operators ----

    fn lower_unary<'a>(&mut self, op: Symbol, operand: &'a Expr<'a>, span: Span) -> Result<Value> {
        let op_str = self.op_str(op);
        match op_str.as_str() {
            "&" => self.lower_reference(operand),
            "*" => {
                let pointer = self.lower_expr(operand)?;
                let mut b = Builder::new(&mut self.func, self.current);
                Ok(b.build_load(pointer))
            }
            "+" => self.lower_expr(operand),
            "-" => {
                let value = self.lower_expr(operand)?;
                let is_int = self.func.value_type(value).is_integer();
                let mut b = Builder::new(&mut self.func, self.current);
                if is_int {
                    Ok(b.build_neg(value))
                } else {
                    Ok(b.build_fneg(value))
                }
            }
            "!" => {
                let value = self.lower_expr(operand)?;
                let mut b = Builder::new(&mut self.func, self.current);
                Ok(b.build_not(value))
            }
            _ => Err(CompileError::new(
                format!("not implemented: unary operator '{op_str}'"),
                span,
            )),
        }
    }

    fn lower_binary<'a>(
        &mut self,
        left: &'a Expr<'a>,
        op: Symbol,
        right: &'a Expr<'a>,
        span: Span,
    ) -> Result<Value> {
        let op_str = self.op_str(op);
        if operator::is_assignment(&op_str) {
            return self.lower_assignment(left, &op_str, right, span);
        }
        let lhs = self.lower_expr(left)?;
        let rhs = self.lower_expr(right)?;
        self.lower_binary_values(&op_str, lhs, rhs, span)
    }

    /// Dispatches an already-lowered binary operation on the operand's IR
    /// type: integers use signed arithmetic and signed compares, doubles
    /// use float arithmetic and ordered compares, `&&`/`||` are bitwise on
    /// `i1`.
    fn lower_binary_values(
        &mut self,
        op_str: &str,
        lhs: Value,
        rhs: Value,
        span: Span,
    ) -> Result<Value> {
        let operand_ty = self.func.value_type(lhs);
        let mut b = Builder::new(&mut self.func, self.current);
        match op_str {
            "&&" => return Ok(b.build_binary(BinOp::And, lhs, rhs)),
            "||" => return Ok(b.build_binary(BinOp::Or, lhs, rhs)),
            _ => {}
        }
        if operand_ty.is_integer() {
            let value = match op_str {
                "+" => b.build_binary(BinOp::Add, lhs, rhs),
                "-" => b.build_binary(BinOp::Sub, lhs, rhs),
                "*" => b.build_binary(BinOp::Mul, lhs, rhs),
                "/" => b.build_binary(BinOp::SDiv, lhs, rhs),
                "%" => b.build_binary(BinOp::SRem, lhs, rhs),
                "<<" => b.build_binary(BinOp::Shl, lhs, rhs),
                ">>" => b.build_binary(BinOp::AShr, lhs, rhs),
                "==" => b.build_cmp(CmpOp::IEq, lhs, rhs),
                "!=" => b.build_cmp(CmpOp::INe, lhs, rhs),
                ">" => b.build_cmp(CmpOp::ISgt, lhs, rhs),
                "<" => b.build_cmp(CmpOp::ISlt, lhs, rhs),
                ">=" => b.build_cmp(CmpOp::ISge, lhs, rhs),
                "<=" => b.build_cmp(CmpOp::ISle, lhs, rhs),
                _ => {
                    return Err(CompileError::new(
                        format!("not implemented: binary operator '{op_str}' on integers"),
                        span,
                    ));
                }
            };
            Ok(value)
        } else if operand_ty.is_double() {
            let value = match op_str {
                "+" => b.build_binary(BinOp::FAdd, lhs, rhs),
                "-" => b.build_binary(BinOp::FSub, lhs, rhs),
                "*" => b.build_binary(BinOp::FMul, lhs, rhs),
                "/" => b.build_binary(BinOp::FDiv, lhs, rhs),
                "==" => b.build_cmp(CmpOp::FOeq, lhs, rhs),
                "!=" => b.build_cmp(CmpOp::FOne, lhs, rhs),
                ">" => b.build_cmp(CmpOp::FOgt, lhs, rhs),
                "<" => b.build_cmp(CmpOp::FOlt, lhs, rhs),
                ">=" => b.build_cmp(CmpOp::FOge, lhs, rhs),
                "<=" => b.build_cmp(CmpOp::FOle, lhs, rhs),
                _ => {
                    return Err(CompileError::new(
                        format!("not implemented: binary operator '{op_str}' on doubles"),
                        span,
                    ));
                }
            };
            Ok(value)
        } else {
            Err(CompileError::new(
                format!("not implemented: binary operator '{op_str}' for this operand type"),
                span,
            ))
        }
    }

    fn lower_assignment<'a>(
        &mut self,
        left: &'a Expr<'a>,
        op_str: &str,
        right: &'a Expr<'a>,
        span: Span,
    ) -> Result<Value> {
        let location = self.lower_reference(left)?;
        if op_str == "=" {
            let value = self.lower_expr(right)?;
            let mut b = Builder::new(&mut self.func, self.current);
            b.build_store(value, location);
            return Ok(value);
        }
        let base = operator::compound_base(op_str).ok_or_else(|| {
            CompileError::new(
                format!("not implemented: assignment operator '{op_str}'"),
                span,
            )
        })?;
        let loaded = {
            let mut b = Builder::new(&mut self.func, self.current);
            b.build_load(location)
        };
        let rhs = self.lower_expr(right)?;
        let value = self.lower_binary_values(base, loaded, rhs, span)?;
        let mut b = Builder::new(&mut self.func, self.current);
        b.build_store(value, location);
        Ok(value)
    }

    // ---- calls ----

    fn lower_call<'a>(
        &mut self,
        callee: Symbol,
        callee_decl: Option<tarn_syntax::DeclId>,
        args: &'a [&'a Expr<'a>],
        result_ty: TypeId,
        span: Span,
    ) -> Result<Value> {
        let name = self.comp.interner.resolve(callee).to_string();
        match name.as_str() {
            // Built-in numeric conversions are direct cast instructions.
            "Double" => {
                let value = self.lower_expr(args[0])?;
                let mut b = Builder::new(&mut self.func, self.current);
                return Ok(b.build_si_to_fp(value));
            }
            "Int" => {
                let value = self.lower_expr(args[0])?;
                let mut b = Builder::new(&mut self.func, self.current);
                return Ok(b.build_fp_to_si(value, IrType::Int(64)));
            }
            _ => {}
        }

        let decl_id = callee_decl.ok_or_else(|| {
            CompileError::new(format!("unknown function referenced '{name}'"), span)
        })?;
        let sig = self
            .comp
            .decls
            .get(decl_id)
            .sig()
            .cloned()
            .ok_or_else(|| {
                CompileError::new(format!("unknown function referenced '{name}'"), span)
            })?;

        let mut lowered = Vec::with_capacity(sig.param_tys.len().max(args.len()));
        for arg in args {
            lowered.push(self.lower_expr(arg)?);
        }
        // Omitted trailing arguments take their declared literal defaults.
        for index in args.len()..sig.param_tys.len() {
            if let Some(default) = sig.defaults[index] {
                lowered.push(self.const_literal(default));
            }
        }

        let ret_ir = transform_type(self.comp, self.module, result_ty, span)?;
        let mut b = Builder::new(&mut self.func, self.current);
        Ok(b.build_call(name, lowered, ret_ir))
    }

    // ---- locations ----

    /// Produces a pointer to the storage the expression denotes.
    pub fn lower_reference<'a>(&mut self, expr: &'a Expr<'a>) -> Result<Value> {
        let ty = self.expr_ty(expr)?;
        let canonical = self.comp.types.canonical(ty);

        // An `&` expression computes an address; its value is the location.
        if let ExprKind::Unary { op, .. } = &expr.kind {
            if self.comp.interner.resolve(*op) == "&"
                && matches!(self.comp.types.get(canonical), Type::Reference { .. })
            {
                return self.lower_expr(expr);
            }
        }
        // Slice-typed expressions are already pointers.
        if matches!(self.comp.types.get(canonical), Type::Slice { .. }) {
            return self.lower_expr(expr);
        }

        match &expr.kind {
            ExprKind::Identifier { name, decl } => {
                let id = decl.get().ok_or_else(|| {
                    CompileError::new("internal: identifier was not bound", expr.span)
                })?;
                let name_str = self.comp.interner.resolve(*name).to_string();
                let value = self.local(id, &name_str, expr.span)?;
                match value {
                    Value::Param(_) => Err(CompileError::new(
                        format!("cannot take the address of parameter '{name_str}'"),
                        expr.span,
                    )),
                    _ => Ok(value),
                }
            }
            ExprKind::Accessor { aggregate, index, member_index } => {
                self.lower_accessor_reference(aggregate, index, member_index.get(), ty, expr.span)
            }
            // `*p` as a location is just the pointer value `p`.
            ExprKind::Unary { op, operand }
                if self.comp.interner.resolve(*op) == "*" =>
            {
                self.lower_expr(operand)
            }
            _ => Err(CompileError::new(
                "unable to take the address of this expression",
                expr.span,
            )),
        }
    }

    /// GEP addressing for accessor expressions. Indices are `i32`: a static
    /// member index becomes a constant, a dynamic list/slice index is
    /// sign-extended or truncated. Slices take a single index; every other
    /// aggregate is `[0, index]` through its leading pointer.
    fn lower_accessor_reference<'a>(
        &mut self,
        aggregate: &'a Expr<'a>,
        index: &'a Expr<'a>,
        member_index: Option<usize>,
        element_ty: TypeId,
        span: Span,
    ) -> Result<Value> {
        let aggregate_location = self.lower_reference(aggregate)?;
        let index_value = match member_index {
            Some(position) => {
                let mut b = Builder::new(&mut self.func, self.current);
                b.const_int(IrType::Int(32), position as i64)
            }
            None => {
                let dynamic = self.lower_expr(index)?;
                let mut b = Builder::new(&mut self.func, self.current);
                b.build_sext_or_trunc(dynamic, IrType::Int(32))
            }
        };

        let aggregate_ty = self.expr_ty(aggregate)?;
        let aggregate_canonical = self.comp.types.canonical(aggregate_ty);
        let is_slice = matches!(
            self.comp.types.get(aggregate_canonical),
            Type::Slice { .. }
        );
        let element_ir = transform_type(self.comp, self.module, element_ty, span)?;
        let mut b = Builder::new(&mut self.func, self.current);
        if is_slice {
            Ok(b.build_gep(aggregate_location, vec![index_value], element_ir))
        } else {
            let zero = b.const_int(IrType::Int(32), 0);
            Ok(b.build_gep(aggregate_location, vec![zero, index_value], element_ir))
        }
    }
}
