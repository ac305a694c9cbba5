//! Arena bundle for AST allocation.
//!
//! The parser allocates every node through an [`AstContext`]: one typed
//! arena per node kind plus arenas for the reference slices that give nodes
//! their children. The context is a bundle of borrows and is `Copy`, so it
//! threads through the recursive descent without ceremony.

use tarn_base::Arena;

use crate::ast::decl::Decl;
use crate::ast::expr::Expr;
use crate::ast::stmt::{Clause, Stmt};
use crate::ast::Block;

/// Borrowed arenas for one compilation unit's AST.
#[derive(Clone, Copy)]
pub struct AstContext<'a> {
    pub exprs: &'a Arena<Expr<'a>>,
    pub stmts: &'a Arena<Stmt<'a>>,
    pub decls: &'a Arena<Decl<'a>>,
    pub blocks: &'a Arena<Block<'a>>,
    pub clauses: &'a Arena<Clause<'a>>,
    pub expr_refs: &'a Arena<&'a Expr<'a>>,
    pub stmt_refs: &'a Arena<&'a Stmt<'a>>,
    pub decl_refs: &'a Arena<&'a Decl<'a>>,
}

impl<'a> AstContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        exprs: &'a Arena<Expr<'a>>,
        stmts: &'a Arena<Stmt<'a>>,
        decls: &'a Arena<Decl<'a>>,
        blocks: &'a Arena<Block<'a>>,
        clauses: &'a Arena<Clause<'a>>,
        expr_refs: &'a Arena<&'a Expr<'a>>,
        stmt_refs: &'a Arena<&'a Stmt<'a>>,
        decl_refs: &'a Arena<&'a Decl<'a>>,
    ) -> Self {
        AstContext {
            exprs,
            stmts,
            decls,
            blocks,
            clauses,
            expr_refs,
            stmt_refs,
            decl_refs,
        }
    }

    pub fn alloc_expr(&self, expr: Expr<'a>) -> &'a Expr<'a> {
        self.exprs.alloc(expr)
    }

    pub fn alloc_stmt(&self, stmt: Stmt<'a>) -> &'a Stmt<'a> {
        self.stmts.alloc(stmt)
    }

    pub fn alloc_decl(&self, decl: Decl<'a>) -> &'a Decl<'a> {
        self.decls.alloc(decl)
    }

    pub fn alloc_block(&self, block: Block<'a>) -> &'a Block<'a> {
        self.blocks.alloc(block)
    }

    pub fn alloc_expr_list(&self, exprs: Vec<&'a Expr<'a>>) -> &'a [&'a Expr<'a>] {
        self.expr_refs.alloc_slice(exprs)
    }

    pub fn alloc_stmt_list(&self, stmts: Vec<&'a Stmt<'a>>) -> &'a [&'a Stmt<'a>] {
        self.stmt_refs.alloc_slice(stmts)
    }

    pub fn alloc_decl_list(&self, decls: Vec<&'a Decl<'a>>) -> &'a [&'a Decl<'a>] {
        self.decl_refs.alloc_slice(decls)
    }

    pub fn alloc_clauses(&self, clauses: Vec<Clause<'a>>) -> &'a [Clause<'a>] {
        self.clauses.alloc_slice(clauses)
    }
}

/// Declares the arenas an [`AstContext`] borrows from and builds the
/// context, in one statement at the call site.
#[macro_export]
macro_rules! ast_arenas {
    ($ctx:ident) => {
        let exprs = tarn_base::Arena::new();
        let stmts = tarn_base::Arena::new();
        let decls = tarn_base::Arena::new();
        let blocks = tarn_base::Arena::new();
        let clauses = tarn_base::Arena::new();
        let expr_refs = tarn_base::Arena::new();
        let stmt_refs = tarn_base::Arena::new();
        let decl_refs = tarn_base::Arena::new();
        let $ctx = $crate::ast::AstContext::new(
            &exprs, &stmts, &decls, &blocks, &clauses, &expr_refs, &stmt_refs, &decl_refs,
        );
    };
}
