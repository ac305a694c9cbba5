//! Statement and control-flow lowering.

use tarn_base::{CompileError, Result};
use tarn_ir::{Builder, IrType, Value};
use tarn_syntax::ast::{Block, Clause, Decl, DeclNode, Expr, ExprKind, Stmt, StmtKind};

use super::context::FuncLowering;
use super::types::transform_type;

impl<'c, 'm> FuncLowering<'c, 'm> {
    /// Lowers a statement list into the current block, following the
    /// current block through any control flow the statements open.
    /// Statements after a terminator are unreachable and are not emitted.
    pub fn lower_block<'a>(&mut self, block: &'a Block<'a>) -> Result<()> {
        for stmt in block.stmts {
            if !self.current_is_open() {
                break;
            }
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt<'a>(&mut self, stmt: &'a Stmt<'a>) -> Result<()> {
        match &stmt.kind {
            StmtKind::Decl(decl) => self.lower_decl_stmt(decl),
            StmtKind::Expr(expr) => self.lower_expr(expr).map(|_| ()),
            StmtKind::Return(value) => {
                let lowered = match value {
                    Some(expr) => Some(self.lower_expr(expr)?),
                    None => None,
                };
                let mut b = Builder::new(&mut self.func, self.current);
                b.build_ret(lowered);
                Ok(())
            }
            StmtKind::Conditional { clauses } => self.lower_conditional(clauses),
            StmtKind::While { cond, body } => self.lower_while(cond, body),
            StmtKind::Compound(block) => self.lower_block(block),
        }
    }

    fn lower_decl_stmt<'a>(&mut self, decl: &'a Decl<'a>) -> Result<()> {
        match &decl.node {
            DeclNode::Let { init, .. } | DeclNode::Var { init, .. } => {
                self.lower_local_decl(decl, Some(*init))
            }
            DeclNode::UninitializedVar { .. } => self.lower_local_decl(decl, None),
            DeclNode::Func { .. } | DeclNode::ExternFunc { .. } => Err(CompileError::new(
                "nested function declarations are not supported",
                decl.span,
            )),
            DeclNode::TypeAlias { .. } | DeclNode::Param { .. } => Ok(()),
        }
    }

    /// A `let`/`var` gets an alloca in the current block; the initializer
    /// stores into it. Aggregate initializers of literals store one
    /// constant; mixed aggregates store element by element through GEPs.
    fn lower_local_decl<'a>(
        &mut self,
        decl: &'a Decl<'a>,
        init: Option<&'a Expr<'a>>,
    ) -> Result<()> {
        let id = decl
            .id()
            .ok_or_else(|| CompileError::new("internal: declaration was not resolved", decl.span))?;
        let ty = self
            .comp
            .decls
            .get(id)
            .ty
            .ok_or_else(|| CompileError::new("internal: declaration was not typed", decl.span))?;
        let ir_ty = transform_type(self.comp, self.module, ty, decl.span)?;
        let slot = {
            let mut b = Builder::new(&mut self.func, self.current);
            b.build_alloca(ir_ty)
        };
        self.locals.insert(id, slot);

        let Some(init) = init else {
            return Ok(());
        };
        match &init.kind {
            ExprKind::Tuple { .. } | ExprKind::List { .. } => self.store_aggregate(slot, init),
            _ => {
                let value = self.lower_expr(init)?;
                let mut b = Builder::new(&mut self.func, self.current);
                b.build_store(value, slot);
                Ok(())
            }
        }
    }

    fn store_aggregate<'a>(&mut self, destination: Value, init: &'a Expr<'a>) -> Result<()> {
        if Self::is_constant_expr(init) {
            let constant = self.lower_constant(init)?;
            let mut b = Builder::new(&mut self.func, self.current);
            b.build_store(constant, destination);
            return Ok(());
        }
        let (ExprKind::Tuple { elements } | ExprKind::List { elements }) = &init.kind else {
            let value = self.lower_expr(init)?;
            let mut b = Builder::new(&mut self.func, self.current);
            b.build_store(value, destination);
            return Ok(());
        };
        for (position, element) in elements.iter().enumerate() {
            let element_ty = element.ty().ok_or_else(|| {
                CompileError::new("internal: expression was not typed before lowering", element.span)
            })?;
            let element_ir = transform_type(self.comp, self.module, element_ty, element.span)?;
            let element_ptr = {
                let mut b = Builder::new(&mut self.func, self.current);
                let zero = b.const_int(IrType::Int(32), 0);
                let index = b.const_int(IrType::Int(32), position as i64);
                b.build_gep(destination, vec![zero, index], element_ir)
            };
            match &element.kind {
                ExprKind::Tuple { .. } | ExprKind::List { .. } => {
                    self.store_aggregate(element_ptr, element)?;
                }
                _ => {
                    let value = self.lower_expr(element)?;
                    let mut b = Builder::new(&mut self.func, self.current);
                    b.build_store(value, element_ptr);
                }
            }
        }
        Ok(())
    }

    /// Lowers an `if / else if / else` chain.
    ///
    /// A shared `if_exit` block collects every fallthrough edge. Each
    /// conditional clause evaluates in its own test block and branches to a
    /// fresh body entry or onward — to the next clause's test block, or to
    /// `if_exit` when it is the last test and there is no `else`. If no
    /// body falls through, the exit block has no predecessors and is
    /// pruned.
    fn lower_conditional<'a>(&mut self, clauses: &'a [Clause<'a>]) -> Result<()> {
        let if_exit = self.func.append_block("if_exit");
        let mut test_block = self.func.append_block("if_cond");
        {
            let mut b = Builder::new(&mut self.func, self.current);
            b.build_br(test_block);
        }

        for (position, clause) in clauses.iter().enumerate() {
            let is_last = position + 1 == clauses.len();
            match clause.cond {
                Some(cond) => {
                    let next_block = if is_last {
                        None
                    } else {
                        Some(self.func.append_block("else_if_cond"))
                    };
                    self.current = test_block;
                    let condition = self.lower_expr(cond)?;
                    let body_entry = self.func.append_block("if_body_entry");
                    {
                        let mut b = Builder::new(&mut self.func, self.current);
                        b.build_cond_br(condition, body_entry, next_block.unwrap_or(if_exit));
                    }
                    self.current = body_entry;
                    self.lower_block(clause.body)?;
                    if self.current_is_open() {
                        let mut b = Builder::new(&mut self.func, self.current);
                        b.build_br(if_exit);
                    }
                    if let Some(next) = next_block {
                        test_block = next;
                    }
                }
                None => {
                    // The trailing else body starts in the block the last
                    // test would have fallen to.
                    self.func.set_block_name(test_block, "else");
                    self.current = test_block;
                    self.lower_block(clause.body)?;
                    if self.current_is_open() {
                        let mut b = Builder::new(&mut self.func, self.current);
                        b.build_br(if_exit);
                    }
                }
            }
        }

        if self.func.predecessor_count(if_exit) == 0 {
            self.func.remove_block(if_exit);
        }
        self.current = if_exit;
        Ok(())
    }

    /// Lowers a `while` loop: branch to `loop_cond`, test there, run the
    /// body from `loop_body_entry`, and loop back unless the body returned.
    fn lower_while<'a>(&mut self, cond: &'a Expr<'a>, body: &'a Block<'a>) -> Result<()> {
        let loop_cond = self.func.append_block("loop_cond");
        {
            let mut b = Builder::new(&mut self.func, self.current);
            b.build_br(loop_cond);
        }
        self.current = loop_cond;
        let condition = self.lower_expr(cond)?;

        let loop_body_entry = self.func.append_block("loop_body_entry");
        let loop_exit = self.func.append_block("loop_exit");
        {
            let mut b = Builder::new(&mut self.func, self.current);
            b.build_cond_br(condition, loop_body_entry, loop_exit);
        }

        self.current = loop_body_entry;
        self.lower_block(body)?;
        if self.current_is_open() {
            let mut b = Builder::new(&mut self.func, self.current);
            b.build_br(loop_cond);
        }

        self.current = loop_exit;
        Ok(())
    }
}
