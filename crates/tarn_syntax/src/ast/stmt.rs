//! Statement nodes.

use std::cell::Cell;

use tarn_base::Span;

use crate::ast::decl::Decl;
use crate::ast::expr::Expr;
use crate::scope::ContextId;

/// A statement.
#[derive(Debug)]
pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub span: Span,
}

#[derive(Debug)]
pub enum StmtKind<'a> {
    Decl(&'a Decl<'a>),
    Expr(&'a Expr<'a>),
    Return(Option<&'a Expr<'a>>),
    While {
        cond: &'a Expr<'a>,
        body: &'a Block<'a>,
    },
    /// An `if / else if / else` chain as one node. At most one clause has no
    /// condition, and it is the last.
    Conditional {
        clauses: &'a [Clause<'a>],
    },
    Compound(&'a Block<'a>),
}

impl<'a> Stmt<'a> {
    pub fn new(kind: StmtKind<'a>, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// One clause of a conditional chain; `cond: None` is the trailing `else`.
#[derive(Debug)]
pub struct Clause<'a> {
    pub cond: Option<&'a Expr<'a>>,
    pub body: &'a Block<'a>,
}

/// A braced statement list. Opens a child declaration context, recorded
/// here during resolution.
#[derive(Debug)]
pub struct Block<'a> {
    pub stmts: &'a [&'a Stmt<'a>],
    pub span: Span,
    context: Cell<Option<ContextId>>,
}

impl<'a> Block<'a> {
    pub fn new(stmts: &'a [&'a Stmt<'a>], span: Span) -> Self {
        Block {
            stmts,
            span,
            context: Cell::new(None),
        }
    }

    pub fn context(&self) -> Option<ContextId> {
        self.context.get()
    }

    pub fn set_context(&self, ctx: ContextId) {
        self.context.set(Some(ctx));
    }
}
