//! Pass 2: type checking and identifier binding.
//!
//! Runs in three phases over a resolved program:
//!
//! 1. **Aliases** — every `typealias` (including nested ones) binds its name
//!    in the type table; conflicting rebinds and cycles are errors.
//! 2. **Signatures** — every top-level function and extern gets a
//!    [`FuncSig`]: canonical parameter types for call matching, literal
//!    defaults, the return type, and the interned function type.
//! 3. **Bodies** — global bindings first, then function bodies. Every
//!    expression is typed in post-order; identifiers and callees bind
//!    through candidate filtering. Non-void functions must return on every
//!    control path.
//!
//! Written types (annotations, parameter and return types) are kept as
//! written — a `Point` stays `Point` — and compared through
//! [`TypeTable::equal`], so the lowering pass can still name struct types
//! after their aliases.

use tarn_base::{CompileError, Result, Span, Symbol};

use crate::ast::{Block, Decl, DeclNode, Expr, ExprKind, Program, Stmt, StmtKind};
use crate::context::CompilationContext;
use crate::decls::{DeclId, DeclKind, FuncSig, LiteralValue};
use crate::operator;
use crate::scope::{AmbiguousDecl, ContextId};
use crate::types::{Type, TypeId};

/// Types the whole program in place. Idempotent on a typed AST.
pub fn typecheck<'a>(program: &Program<'a>, comp: &mut CompilationContext) -> Result<()> {
    let mut checker = Checker { comp };
    checker.check_program(program)
}

struct Checker<'c> {
    comp: &'c mut CompilationContext,
}

impl<'c> Checker<'c> {
    fn check_program<'a>(&mut self, program: &Program<'a>) -> Result<()> {
        // Phase 1: alias bindings, program-wide.
        for decl in program.decls {
            self.bind_aliases_in_decl(decl)?;
        }
        // Phase 2: callable signatures, so bodies may call in any order.
        for decl in program.decls {
            match &decl.node {
                DeclNode::Func { .. } | DeclNode::ExternFunc { .. } => {
                    self.check_signature(decl)?;
                }
                _ => {}
            }
        }
        // Phase 3: globals first, then function bodies.
        for decl in program.decls {
            if let DeclNode::Let { .. } | DeclNode::Var { .. } | DeclNode::UninitializedVar { .. } =
                decl.node
            {
                self.check_local_decl(decl, self.comp.contexts.root())?;
            }
        }
        for decl in program.decls {
            if let DeclNode::Func { .. } = decl.node {
                self.check_func_body(decl)?;
            }
        }
        Ok(())
    }

    // ---- phase 1: aliases ----

    fn bind_aliases_in_decl<'a>(&mut self, decl: &'a Decl<'a>) -> Result<()> {
        match &decl.node {
            DeclNode::TypeAlias { name, target } => self.bind_alias(*name, *target, decl.span),
            DeclNode::Func { body, .. } => self.bind_aliases_in_block(body),
            _ => Ok(()),
        }
    }

    fn bind_aliases_in_block<'a>(&mut self, block: &'a Block<'a>) -> Result<()> {
        for stmt in block.stmts {
            match &stmt.kind {
                StmtKind::Decl(decl) => self.bind_aliases_in_decl(decl)?,
                StmtKind::While { body, .. } => self.bind_aliases_in_block(body)?,
                StmtKind::Conditional { clauses } => {
                    for clause in clauses.iter() {
                        self.bind_aliases_in_block(clause.body)?;
                    }
                }
                StmtKind::Compound(inner) => self.bind_aliases_in_block(inner)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn bind_alias(&mut self, name: Symbol, target: TypeId, span: Span) -> Result<()> {
        let name_str = self.name_str(name);
        if !self.comp.types.bind_named(name, target) {
            return Err(CompileError::new(
                format!("conflicting type alias for '{name_str}'"),
                span,
            ));
        }
        if self.comp.types.alias_is_cyclic(name) {
            return Err(CompileError::new(
                format!("cyclic type alias '{name_str}'"),
                span,
            ));
        }
        Ok(())
    }

    // ---- phase 2: signatures ----

    fn check_signature<'a>(&mut self, decl: &'a Decl<'a>) -> Result<()> {
        let (params, return_ty, is_var_arg) = match &decl.node {
            DeclNode::Func { params, return_ty, .. } => (*params, *return_ty, false),
            DeclNode::ExternFunc { params, return_ty, is_var_arg, .. } => {
                (*params, *return_ty, *is_var_arg)
            }
            _ => return Ok(()),
        };
        let id = self.decl_id(decl)?;

        let mut param_ids = Vec::new();
        let mut param_tys = Vec::new();
        let mut defaults = Vec::new();
        for param in params {
            let DeclNode::Param { ty, default, .. } = &param.node else {
                continue;
            };
            self.ensure_resolved(*ty, param.span)?;
            let canonical = self.comp.types.canonical(*ty);
            param_tys.push(canonical);
            if let Some(param_id) = param.id() {
                self.comp.decls.get_mut(param_id).ty = Some(*ty);
                param_ids.push(param_id);
            }
            match default {
                Some(expr) => {
                    let value = self.literal_default(expr)?;
                    let value_ty = self.literal_type(value);
                    if !self.comp.types.equal(value_ty, *ty) {
                        return Err(self.type_mismatch(
                            "default value type mismatch",
                            *ty,
                            value_ty,
                            expr.span,
                        ));
                    }
                    expr.set_ty(value_ty);
                    defaults.push(Some(value));
                }
                None => {
                    if defaults.iter().any(|d: &Option<LiteralValue>| d.is_some()) {
                        return Err(CompileError::new(
                            "parameters with defaults must be trailing",
                            param.span,
                        ));
                    }
                    defaults.push(None);
                }
            }
        }
        self.ensure_resolved(return_ty, decl.span)?;

        let sig = FuncSig {
            params: param_ids,
            param_tys: param_tys.clone(),
            defaults,
            ret: return_ty,
            is_var_arg,
        };
        let fn_ty = self.comp.types.function(param_tys, return_ty, is_var_arg);
        let info = self.comp.decls.get_mut(id);
        info.ty = Some(fn_ty);
        match &mut info.kind {
            DeclKind::Func { sig: slot } | DeclKind::ExternFunc { sig: slot } => {
                *slot = Some(sig);
            }
            _ => {}
        }
        Ok(())
    }

    fn literal_default<'a>(&mut self, expr: &'a Expr<'a>) -> Result<LiteralValue> {
        match &expr.kind {
            ExprKind::IntegerLit(v) => Ok(LiteralValue::Integer(*v)),
            ExprKind::DoubleLit(v) => Ok(LiteralValue::Double(*v)),
            ExprKind::BoolLit(v) => Ok(LiteralValue::Boolean(*v)),
            ExprKind::CharacterLit(b) => Ok(LiteralValue::Character(*b)),
            ExprKind::StringLit(s) => Ok(LiteralValue::Str(*s)),
            _ => Err(CompileError::new(
                "default values must be literals",
                expr.span,
            )),
        }
    }

    fn literal_type(&mut self, value: LiteralValue) -> TypeId {
        match value {
            LiteralValue::Integer(_) => self.comp.types.integer(),
            LiteralValue::Double(_) => self.comp.types.double(),
            LiteralValue::Boolean(_) => self.comp.types.boolean(),
            LiteralValue::Character(_) => self.comp.types.character(),
            LiteralValue::Str(s) => {
                let len = self.comp.interner.resolve(s).len() as u64;
                let character = self.comp.types.character();
                self.comp.types.list(character, len)
            }
        }
    }

    // ---- phase 3: bodies ----

    fn check_func_body<'a>(&mut self, decl: &'a Decl<'a>) -> Result<()> {
        let DeclNode::Func { name, body, return_ty, .. } = &decl.node else {
            return Ok(());
        };
        self.check_block(body, *return_ty)?;
        let void = self.comp.types.void();
        if !self.comp.types.equal(*return_ty, void) && !block_always_returns(body) {
            return Err(CompileError::new(
                format!(
                    "function '{}' does not return on every path",
                    self.name_str(*name)
                ),
                decl.span,
            ));
        }
        Ok(())
    }

    fn check_block<'a>(&mut self, block: &'a Block<'a>, return_ty: TypeId) -> Result<()> {
        let ctx = block
            .context()
            .ok_or_else(|| CompileError::new("name resolution has not run", block.span))?;
        for stmt in block.stmts {
            self.check_stmt(stmt, ctx, return_ty)?;
        }
        Ok(())
    }

    fn check_stmt<'a>(&mut self, stmt: &'a Stmt<'a>, ctx: ContextId, return_ty: TypeId) -> Result<()> {
        match &stmt.kind {
            StmtKind::Decl(decl) => match &decl.node {
                DeclNode::Let { .. } | DeclNode::Var { .. } | DeclNode::UninitializedVar { .. } => {
                    self.check_local_decl(decl, ctx)
                }
                DeclNode::Func { .. } | DeclNode::ExternFunc { .. } => {
                    self.check_signature(decl)?;
                    self.check_func_body(decl)
                }
                DeclNode::TypeAlias { .. } | DeclNode::Param { .. } => Ok(()),
            },
            StmtKind::Expr(expr) => self.check_expr(expr, ctx).map(|_| ()),
            StmtKind::Return(value) => {
                let found = match value {
                    Some(expr) => self.check_expr(expr, ctx)?,
                    None => self.comp.types.void(),
                };
                if !self.comp.types.equal(found, return_ty) {
                    let span = value.map(|e| e.span).unwrap_or(stmt.span);
                    return Err(self.type_mismatch(
                        "return type mismatch",
                        return_ty,
                        found,
                        span,
                    ));
                }
                Ok(())
            }
            StmtKind::While { cond, body } => {
                self.check_condition(cond, ctx, "while")?;
                self.check_block(body, return_ty)
            }
            StmtKind::Conditional { clauses } => {
                for clause in clauses.iter() {
                    if let Some(cond) = clause.cond {
                        self.check_condition(cond, ctx, "if")?;
                    }
                    self.check_block(clause.body, return_ty)?;
                }
                Ok(())
            }
            StmtKind::Compound(block) => self.check_block(block, return_ty),
        }
    }

    fn check_condition<'a>(&mut self, cond: &'a Expr<'a>, ctx: ContextId, what: &str) -> Result<()> {
        let ty = self.check_expr(cond, ctx)?;
        let boolean = self.comp.types.boolean();
        if !self.comp.types.equal(ty, boolean) {
            return Err(CompileError::new(
                format!(
                    "{what} condition must be a Boolean, found {}",
                    self.comp.type_name(ty)
                ),
                cond.span,
            ));
        }
        Ok(())
    }

    fn check_local_decl<'a>(&mut self, decl: &'a Decl<'a>, ctx: ContextId) -> Result<()> {
        let id = self.decl_id(decl)?;
        match &decl.node {
            DeclNode::Let { ty, init, .. } | DeclNode::Var { ty, init, .. } => {
                let init_ty = self.check_expr(init, ctx)?;
                let final_ty = match ty {
                    Some(declared) => {
                        self.ensure_resolved(*declared, decl.span)?;
                        if !self.comp.types.equal(*declared, init_ty) {
                            return Err(self.type_mismatch(
                                "mismatched types in initialization",
                                *declared,
                                init_ty,
                                init.span,
                            ));
                        }
                        *declared
                    }
                    // No annotation: the initializer's type is inferred, so a
                    // bare `5` makes an Integer and a bare `5.0` a Double.
                    None => init_ty,
                };
                self.comp.decls.get_mut(id).ty = Some(final_ty);
                Ok(())
            }
            DeclNode::UninitializedVar { ty, .. } => {
                self.ensure_resolved(*ty, decl.span)?;
                self.comp.decls.get_mut(id).ty = Some(*ty);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    // ---- expressions ----

    fn check_expr<'a>(&mut self, expr: &'a Expr<'a>, ctx: ContextId) -> Result<TypeId> {
        if let Some(ty) = expr.ty() {
            return Ok(ty);
        }
        let ty = match &expr.kind {
            ExprKind::IntegerLit(_) => self.comp.types.integer(),
            ExprKind::DoubleLit(_) => self.comp.types.double(),
            ExprKind::CharacterLit(_) => self.comp.types.character(),
            ExprKind::BoolLit(_) => self.comp.types.boolean(),
            ExprKind::StringLit(s) => {
                let len = self.comp.interner.resolve(*s).len() as u64;
                let character = self.comp.types.character();
                self.comp.types.list(character, len)
            }
            ExprKind::Identifier { name, decl } => self.check_identifier(*name, decl, expr, ctx)?,
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand, expr, ctx)?,
            ExprKind::Binary { left, op, right } => self.check_binary(left, *op, right, ctx)?,
            ExprKind::Tuple { elements } => {
                let mut tys = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    tys.push(self.check_expr(element, ctx)?);
                }
                self.comp.types.tuple(tys)
            }
            ExprKind::List { elements } => self.check_list(elements, expr.span, ctx)?,
            ExprKind::Accessor { aggregate, index, member_index } => {
                self.check_accessor(aggregate, index, member_index, expr.span, ctx)?
            }
            ExprKind::Call { callee, callee_decl, args } => {
                self.check_call(*callee, callee_decl, args, expr.span, ctx)?
            }
        };
        expr.set_ty(ty);
        Ok(ty)
    }

    fn check_identifier<'a>(
        &mut self,
        name: Symbol,
        slot: &std::cell::Cell<Option<DeclId>>,
        expr: &'a Expr<'a>,
        ctx: ContextId,
    ) -> Result<TypeId> {
        let name_str = self.name_str(name);
        let found = self.comp.contexts.lookup(ctx, name);
        if found.is_empty() {
            return Err(CompileError::new(
                format!("unresolved name '{name_str}'"),
                expr.span,
            ));
        }
        let values = found.filter(&self.comp.decls, |d| d.is_value());
        if values.is_empty() {
            let message = if !found.filter(&self.comp.decls, |d| d.is_type()).is_empty() {
                format!("'{name_str}' is a type, not a value")
            } else {
                format!("'{name_str}' cannot be used as a value")
            };
            return Err(CompileError::new(message, expr.span));
        }
        if values.is_ambiguous() {
            return Err(CompileError::new(
                format!("ambiguous reference to '{name_str}'"),
                expr.span,
            ));
        }
        let id = values.unique().ok_or_else(|| {
            CompileError::new(format!("unresolved name '{name_str}'"), expr.span)
        })?;
        let ty = self.comp.decls.get(id).ty.ok_or_else(|| {
            CompileError::new(
                format!("'{name_str}' is used before its declaration"),
                expr.span,
            )
        })?;
        slot.set(Some(id));
        Ok(ty)
    }

    fn check_unary<'a>(
        &mut self,
        op: Symbol,
        operand: &'a Expr<'a>,
        expr: &'a Expr<'a>,
        ctx: ContextId,
    ) -> Result<TypeId> {
        let op_str = self.name_str(op);
        let operand_ty = self.check_expr(operand, ctx)?;
        let canonical = self.comp.types.canonical(operand_ty);
        match op_str.as_str() {
            "+" | "-" => match self.comp.types.get(canonical) {
                Type::Integer | Type::Double => Ok(canonical),
                _ => Err(CompileError::new(
                    format!(
                        "unary '{op_str}' requires an Integer or Double operand, found {}",
                        self.comp.type_name(operand_ty)
                    ),
                    expr.span,
                )),
            },
            "!" => {
                if matches!(self.comp.types.get(canonical), Type::Boolean) {
                    Ok(canonical)
                } else {
                    Err(CompileError::new(
                        format!(
                            "unary '!' requires a Boolean operand, found {}",
                            self.comp.type_name(operand_ty)
                        ),
                        expr.span,
                    ))
                }
            }
            "&" => {
                if !operand.is_addressable(&self.comp.interner, &self.comp.decls, &self.comp.types)
                {
                    return Err(CompileError::new(
                        "cannot take the address of this expression",
                        expr.span,
                    ));
                }
                Ok(self.comp.types.reference(operand_ty))
            }
            "*" => match self.comp.types.get(canonical) {
                Type::Pointer { referent } => Ok(*referent),
                _ => Err(CompileError::new(
                    format!(
                        "cannot dereference a value of type {}",
                        self.comp.type_name(operand_ty)
                    ),
                    expr.span,
                )),
            },
            _ => Err(CompileError::new(
                format!("unknown unary operator '{op_str}'"),
                expr.span,
            )),
        }
    }

    fn check_binary<'a>(
        &mut self,
        left: &'a Expr<'a>,
        op: Symbol,
        right: &'a Expr<'a>,
        ctx: ContextId,
    ) -> Result<TypeId> {
        let op_str = self.name_str(op);
        if operator::is_assignment(&op_str) {
            return self.check_assignment(left, &op_str, right, ctx);
        }
        let left_ty = self.check_expr(left, ctx)?;
        let right_ty = self.check_expr(right, ctx)?;
        self.binary_result(&op_str, left_ty, right_ty, left.span.merge(right.span))
    }

    fn check_assignment<'a>(
        &mut self,
        left: &'a Expr<'a>,
        op_str: &str,
        right: &'a Expr<'a>,
        ctx: ContextId,
    ) -> Result<TypeId> {
        let left_ty = self.check_expr(left, ctx)?;
        if !left.is_lvalue(&self.comp.interner, &self.comp.decls, &self.comp.types) {
            let message = match &left.kind {
                ExprKind::Identifier { name, decl } => {
                    let immutable_let = decl
                        .get()
                        .map(|id| matches!(self.comp.decls.get(id).kind, DeclKind::Let))
                        .unwrap_or(false);
                    if immutable_let {
                        format!(
                            "cannot assign to '{}': 'let' bindings are immutable",
                            self.name_str(*name)
                        )
                    } else {
                        format!("cannot assign to '{}'", self.name_str(*name))
                    }
                }
                _ => "cannot assign to a value that is not an lvalue".to_string(),
            };
            return Err(CompileError::new(message, left.span));
        }
        let right_ty = self.check_expr(right, ctx)?;
        if op_str == "=" {
            if !self.comp.types.equal(left_ty, right_ty) {
                return Err(self.type_mismatch(
                    "mismatched types in assignment",
                    left_ty,
                    right_ty,
                    right.span,
                ));
            }
        } else if let Some(base) = operator::compound_base(op_str) {
            let result =
                self.binary_result(base, left_ty, right_ty, left.span.merge(right.span))?;
            if !self.comp.types.equal(result, left_ty) {
                return Err(self.type_mismatch(
                    "mismatched types in assignment",
                    left_ty,
                    result,
                    right.span,
                ));
            }
        }
        Ok(left_ty)
    }

    fn binary_result(&mut self, op: &str, left: TypeId, right: TypeId, span: Span) -> Result<TypeId> {
        let a = self.comp.types.canonical(left);
        let b = self.comp.types.canonical(right);
        let both = (
            self.comp.types.get(a).clone(),
            self.comp.types.get(b).clone(),
        );
        let result = match op {
            "+" | "-" | "*" | "/" => match both {
                (Type::Integer, Type::Integer) => Some(self.comp.types.integer()),
                (Type::Double, Type::Double) => Some(self.comp.types.double()),
                _ => None,
            },
            "%" | "<<" | ">>" => match both {
                (Type::Integer, Type::Integer) => Some(self.comp.types.integer()),
                _ => None,
            },
            "==" | "!=" | "<" | ">" | "<=" | ">=" => match both {
                (Type::Integer, Type::Integer) | (Type::Double, Type::Double) => {
                    Some(self.comp.types.boolean())
                }
                _ => None,
            },
            "&&" | "||" => match both {
                (Type::Boolean, Type::Boolean) => Some(self.comp.types.boolean()),
                _ => None,
            },
            _ => {
                return Err(CompileError::new(
                    format!("unknown operator '{op}'"),
                    span,
                ));
            }
        };
        result.ok_or_else(|| {
            CompileError::new(
                format!(
                    "binary operator '{op}' cannot be applied to {} and {}",
                    self.comp.type_name(left),
                    self.comp.type_name(right)
                ),
                span,
            )
        })
    }

    fn check_list<'a>(
        &mut self,
        elements: &'a [&'a Expr<'a>],
        span: Span,
        ctx: ContextId,
    ) -> Result<TypeId> {
        let mut unified: Option<TypeId> = None;
        for element in elements {
            let ty = self.check_expr(element, ctx)?;
            match unified {
                None => unified = Some(self.comp.types.canonical(ty)),
                Some(expected) => {
                    if !self.comp.types.equal(expected, ty) {
                        return Err(self.type_mismatch(
                            "list elements must all have the same type",
                            expected,
                            ty,
                            element.span,
                        ));
                    }
                }
            }
        }
        let element = unified
            .ok_or_else(|| CompileError::new("list literals cannot be empty", span))?;
        Ok(self.comp.types.list(element, elements.len() as u64))
    }

    fn check_accessor<'a>(
        &mut self,
        aggregate: &'a Expr<'a>,
        index: &'a Expr<'a>,
        member_index: &std::cell::Cell<Option<usize>>,
        span: Span,
        ctx: ContextId,
    ) -> Result<TypeId> {
        let aggregate_ty = self.check_expr(aggregate, ctx)?;
        let canonical = self.comp.types.canonical(aggregate_ty);
        match self.comp.types.get(canonical).clone() {
            Type::Tuple(elements) => {
                let position = self.static_index(index, elements.len(), aggregate_ty)?;
                member_index.set(Some(position));
                self.check_expr(index, ctx)?;
                Ok(elements[position])
            }
            Type::Struct(fields) => {
                let position = self.static_index(index, fields.len(), aggregate_ty)?;
                member_index.set(Some(position));
                self.check_expr(index, ctx)?;
                Ok(fields[position].1)
            }
            Type::List { element, .. } | Type::Slice { element } => {
                let index_ty = self.check_expr(index, ctx)?;
                let integer = self.comp.types.integer();
                if !self.comp.types.equal(index_ty, integer) {
                    return Err(CompileError::new(
                        format!(
                            "list and slice indices must be Integers, found {}",
                            self.comp.type_name(index_ty)
                        ),
                        index.span,
                    ));
                }
                Ok(element)
            }
            _ => Err(CompileError::new(
                format!(
                    "a value of type {} cannot be indexed",
                    self.comp.type_name(aggregate_ty)
                ),
                span,
            )),
        }
    }

    /// Tuple and struct members are selected by a compile-time integer: an
    /// integer literal in `[0, len)`.
    fn static_index<'a>(
        &mut self,
        index: &'a Expr<'a>,
        len: usize,
        aggregate_ty: TypeId,
    ) -> Result<usize> {
        let ExprKind::IntegerLit(value) = index.kind else {
            return Err(CompileError::new(
                "tuple and struct members must be selected with an integer literal",
                index.span,
            ));
        };
        if value < 0 || value as usize >= len {
            return Err(CompileError::new(
                format!(
                    "member index {value} is out of range for type {}",
                    self.comp.type_name(aggregate_ty)
                ),
                index.span,
            ));
        }
        Ok(value as usize)
    }

    fn check_call<'a>(
        &mut self,
        callee: Symbol,
        slot: &std::cell::Cell<Option<DeclId>>,
        args: &'a [&'a Expr<'a>],
        span: Span,
        ctx: ContextId,
    ) -> Result<TypeId> {
        let name_str = self.name_str(callee);
        let mut arg_tys = Vec::with_capacity(args.len());
        for arg in args {
            arg_tys.push(self.check_expr(arg, ctx)?);
        }

        // `Double(x)` and `Int(x)` are direct numeric conversions.
        match name_str.as_str() {
            "Double" => return self.check_conversion(&arg_tys, Type::Integer, span, "Double"),
            "Int" => return self.check_conversion(&arg_tys, Type::Double, span, "Int"),
            _ => {}
        }

        let found = self.comp.contexts.lookup(ctx, callee);
        if found.is_empty() {
            return Err(CompileError::new(
                format!("unresolved function '{name_str}'"),
                span,
            ));
        }
        let callables = found.filter(&self.comp.decls, |d| d.is_callable());
        if callables.is_empty() {
            return Err(CompileError::new(
                format!("'{name_str}' is not a function"),
                span,
            ));
        }
        let canonical_args: Vec<TypeId> = arg_tys
            .iter()
            .map(|t| self.comp.types.canonical(*t))
            .collect();
        let matching = self.matching_candidates(&callables, &canonical_args);
        if matching.is_empty() {
            return Err(CompileError::new(
                format!("no function '{name_str}' matches these argument types"),
                span,
            ));
        }
        if matching.is_ambiguous() {
            return Err(CompileError::new(
                format!("ambiguous call to '{name_str}'"),
                span,
            ));
        }
        let id = matching.unique().ok_or_else(|| {
            CompileError::new(format!("unresolved function '{name_str}'"), span)
        })?;
        slot.set(Some(id));
        let ret = self
            .comp
            .decls
            .get(id)
            .sig()
            .map(|sig| sig.ret)
            .ok_or_else(|| {
                CompileError::new(
                    format!("'{name_str}' is used before its declaration"),
                    span,
                )
            })?;
        Ok(ret)
    }

    fn matching_candidates(&self, callables: &AmbiguousDecl, args: &[TypeId]) -> AmbiguousDecl {
        callables.filter(&self.comp.decls, |info| {
            info.sig().map(|sig| sig.accepts(args)).unwrap_or(false)
        })
    }

    fn check_conversion(
        &mut self,
        args: &[TypeId],
        expected: Type,
        span: Span,
        name: &str,
    ) -> Result<TypeId> {
        let ok = args.len() == 1 && {
            let canonical = self.comp.types.canonical(args[0]);
            *self.comp.types.get(canonical) == expected
        };
        if !ok {
            let expected_name = match expected {
                Type::Integer => "Integer",
                _ => "Double",
            };
            return Err(CompileError::new(
                format!("{name}() requires one {expected_name} argument"),
                span,
            ));
        }
        Ok(match expected {
            Type::Integer => self.comp.types.double(),
            _ => self.comp.types.integer(),
        })
    }

    // ---- shared helpers ----

    fn decl_id<'a>(&self, decl: &'a Decl<'a>) -> Result<DeclId> {
        decl.id()
            .ok_or_else(|| CompileError::new("name resolution has not run", decl.span))
    }

    fn name_str(&self, sym: Symbol) -> String {
        self.comp.interner.resolve(sym).to_string()
    }

    /// Errors on any written type that mentions a name with no binding.
    fn ensure_resolved(&mut self, ty: TypeId, span: Span) -> Result<()> {
        let mut work = vec![ty];
        while let Some(id) = work.pop() {
            match self.comp.types.get(id) {
                Type::Named(name) => {
                    if self.comp.types.named_binding(*name).is_none() {
                        return Err(CompileError::new(
                            format!(
                                "reference to undeclared type '{}'",
                                self.comp.interner.resolve(*name)
                            ),
                            span,
                        ));
                    }
                }
                Type::Tuple(elements) => work.extend(elements.iter().copied()),
                Type::Struct(fields) => work.extend(fields.iter().map(|(_, t)| *t)),
                Type::List { element, .. } | Type::Slice { element } => work.push(*element),
                Type::Pointer { referent } | Type::Reference { referent } => work.push(*referent),
                Type::Function { params, ret, .. } => {
                    work.extend(params.iter().copied());
                    work.push(*ret);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn type_mismatch(
        &self,
        what: &str,
        expected: TypeId,
        found: TypeId,
        span: Span,
    ) -> CompileError {
        CompileError::new(
            format!(
                "{what}: expected {}, found {}",
                self.comp.type_name(expected),
                self.comp.type_name(found)
            ),
            span,
        )
    }
}

// ---- return coverage ----

/// Whether every control path through the block reaches a `return`.
fn block_always_returns(block: &Block<'_>) -> bool {
    block.stmts.iter().any(|stmt| stmt_always_returns(stmt))
}

fn stmt_always_returns(stmt: &Stmt<'_>) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::Compound(block) => block_always_returns(block),
        StmtKind::Conditional { clauses } => {
            clauses.iter().any(|c| c.cond.is_none())
                && clauses.iter().all(|c| block_always_returns(c.body))
        }
        // A while body may never run.
        StmtKind::While { .. } => false,
        StmtKind::Decl(_) | StmtKind::Expr(_) => false,
    }
}
