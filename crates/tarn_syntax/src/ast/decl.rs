//! Declaration nodes and the program root.

use std::cell::Cell;

use tarn_base::{Span, Symbol};

use crate::ast::expr::Expr;
use crate::ast::stmt::Block;
use crate::decls::DeclId;
use crate::scope::ContextId;
use crate::types::TypeId;

/// A declaration: a node payload plus the side-table id assigned during
/// resolution.
#[derive(Debug)]
pub struct Decl<'a> {
    pub node: DeclNode<'a>,
    pub span: Span,
    id: Cell<Option<DeclId>>,
}

/// The declaration forms of the language.
///
/// Types written in source are interned directly by the parser, so
/// annotations are [`TypeId`]s here; named types stay unresolved until the
/// checker binds them.
#[derive(Debug)]
pub enum DeclNode<'a> {
    Let {
        name: Symbol,
        ty: Option<TypeId>,
        init: &'a Expr<'a>,
    },
    Var {
        name: Symbol,
        ty: Option<TypeId>,
        init: &'a Expr<'a>,
    },
    /// `var x: T` with no initializer; the annotation is mandatory.
    UninitializedVar {
        name: Symbol,
        ty: TypeId,
    },
    Param {
        name: Symbol,
        ty: TypeId,
        default: Option<&'a Expr<'a>>,
    },
    Func {
        name: Symbol,
        params: &'a [&'a Decl<'a>],
        /// `Void` when the arrow clause is absent.
        return_ty: TypeId,
        body: &'a Block<'a>,
        /// The function's own scope, holding its parameters.
        context: Cell<Option<ContextId>>,
    },
    ExternFunc {
        name: Symbol,
        params: &'a [&'a Decl<'a>],
        return_ty: TypeId,
        is_var_arg: bool,
    },
    TypeAlias {
        name: Symbol,
        target: TypeId,
    },
}

impl<'a> Decl<'a> {
    pub fn new(node: DeclNode<'a>, span: Span) -> Self {
        Decl {
            node,
            span,
            id: Cell::new(None),
        }
    }

    pub fn id(&self) -> Option<DeclId> {
        self.id.get()
    }

    pub fn set_id(&self, id: DeclId) {
        self.id.set(Some(id));
    }

    pub fn name(&self) -> Symbol {
        match &self.node {
            DeclNode::Let { name, .. }
            | DeclNode::Var { name, .. }
            | DeclNode::UninitializedVar { name, .. }
            | DeclNode::Param { name, .. }
            | DeclNode::Func { name, .. }
            | DeclNode::ExternFunc { name, .. }
            | DeclNode::TypeAlias { name, .. } => *name,
        }
    }
}

/// A parsed compilation unit: the ordered top-level declarations.
#[derive(Debug)]
pub struct Program<'a> {
    pub decls: &'a [&'a Decl<'a>],
}
