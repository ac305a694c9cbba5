//! Expression nodes.

use std::cell::Cell;

use tarn_base::{Interner, Span, Symbol};

use crate::decls::{DeclKind, DeclTable};
use crate::types::{Type, TypeId, TypeTable};

/// An expression: a kind, a source span, and a type slot the checker fills.
#[derive(Debug)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub span: Span,
    ty: Cell<Option<TypeId>>,
}

#[derive(Debug)]
pub enum ExprKind<'a> {
    IntegerLit(i64),
    DoubleLit(f64),
    CharacterLit(u8),
    BoolLit(bool),
    /// Interned unescaped content.
    StringLit(Symbol),
    Identifier {
        name: Symbol,
        /// Bound declaration, set during type checking.
        decl: Cell<Option<crate::decls::DeclId>>,
    },
    Unary {
        /// Operator lexeme, e.g. `-` or `&`.
        op: Symbol,
        operand: &'a Expr<'a>,
    },
    Binary {
        left: &'a Expr<'a>,
        op: Symbol,
        right: &'a Expr<'a>,
    },
    Tuple {
        elements: &'a [&'a Expr<'a>],
    },
    List {
        elements: &'a [&'a Expr<'a>],
    },
    Accessor {
        aggregate: &'a Expr<'a>,
        index: &'a Expr<'a>,
        /// Static member index for tuple/struct accessors, set by the
        /// checker after range-checking the literal index.
        member_index: Cell<Option<usize>>,
    },
    Call {
        callee: Symbol,
        /// Resolved callee declaration; stays empty for the `Double`/`Int`
        /// conversion intrinsics.
        callee_decl: Cell<Option<crate::decls::DeclId>>,
        args: &'a [&'a Expr<'a>],
    },
}

impl<'a> Expr<'a> {
    pub fn new(kind: ExprKind<'a>, span: Span) -> Self {
        Expr {
            kind,
            span,
            ty: Cell::new(None),
        }
    }

    /// The expression's type, once the checker has run.
    pub fn ty(&self) -> Option<TypeId> {
        self.ty.get()
    }

    pub fn set_ty(&self, ty: TypeId) {
        self.ty.set(Some(ty));
    }

    /// Whether this expression denotes an assignable memory location.
    ///
    /// Identifiers depend on their binding (`var` yes, `let` and parameters
    /// no), accessors always qualify, and so does dereferencing a pointer.
    pub fn is_lvalue(&self, interner: &Interner, decls: &DeclTable, types: &TypeTable) -> bool {
        match &self.kind {
            ExprKind::Identifier { decl, .. } => decl
                .get()
                .map(|id| decls.get(id).is_mutable())
                .unwrap_or(false),
            ExprKind::Accessor { .. } => true,
            ExprKind::Unary { op, operand } => {
                interner.resolve(*op) == "*"
                    && operand
                        .ty()
                        .map(|t| matches!(types.get(t), Type::Pointer { .. }))
                        .unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Whether the expression has a stable address `&` can take. Strictly
    /// wider than lvalue-ness: `let` bindings live in stack slots too.
    pub fn is_addressable(&self, interner: &Interner, decls: &DeclTable, types: &TypeTable) -> bool {
        if self.is_lvalue(interner, decls, types) {
            return true;
        }
        match &self.kind {
            ExprKind::Identifier { decl, .. } => decl
                .get()
                .map(|id| !matches!(decls.get(id).kind, DeclKind::Param { .. }) && decls.get(id).is_value())
                .unwrap_or(false),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decls::{DeclInfo, DeclKind};
    use crate::scope::ContextTree;

    fn ident<'a>(name: Symbol) -> Expr<'a> {
        Expr::new(
            ExprKind::Identifier {
                name,
                decl: Cell::new(None),
            },
            Span::default(),
        )
    }

    fn bind(expr: &Expr<'_>, id: crate::decls::DeclId) {
        if let ExprKind::Identifier { decl, .. } = &expr.kind {
            decl.set(Some(id));
        }
    }

    #[test]
    fn type_slot_starts_empty_and_sticks() {
        let table = TypeTable::new();
        let expr = Expr::new(ExprKind::IntegerLit(3), Span::default());
        assert_eq!(expr.ty(), None);
        expr.set_ty(table.integer());
        assert_eq!(expr.ty(), Some(table.integer()));
    }

    #[test]
    fn var_identifiers_are_lvalues_let_identifiers_are_not() {
        let mut interner = Interner::new();
        let types = TypeTable::new();
        let tree = ContextTree::new();
        let mut decls = DeclTable::new();
        let name = interner.intern("x");

        let var_id = decls.add(DeclInfo {
            name,
            kind: DeclKind::Var,
            context: tree.root(),
            ty: None,
            span: Span::default(),
        });
        let let_id = decls.add(DeclInfo {
            name,
            kind: DeclKind::Let,
            context: tree.root(),
            ty: None,
            span: Span::default(),
        });

        let var_use = ident(name);
        bind(&var_use, var_id);
        assert!(var_use.is_lvalue(&interner, &decls, &types));

        let let_use = ident(name);
        bind(&let_use, let_id);
        assert!(!let_use.is_lvalue(&interner, &decls, &types));
        assert!(let_use.is_addressable(&interner, &decls, &types));
    }

    #[test]
    fn parameters_are_neither_lvalues_nor_addressable() {
        let mut interner = Interner::new();
        let types = TypeTable::new();
        let tree = ContextTree::new();
        let mut decls = DeclTable::new();
        let name = interner.intern("p");
        let param = decls.add(DeclInfo {
            name,
            kind: DeclKind::Param { index: 0 },
            context: tree.root(),
            ty: None,
            span: Span::default(),
        });
        let use_site = ident(name);
        bind(&use_site, param);
        assert!(!use_site.is_lvalue(&interner, &decls, &types));
        assert!(!use_site.is_addressable(&interner, &decls, &types));
    }

    #[test]
    fn literals_are_not_lvalues() {
        let interner = Interner::new();
        let types = TypeTable::new();
        let decls = DeclTable::new();
        let lit = Expr::new(ExprKind::IntegerLit(1), Span::default());
        assert!(!lit.is_lvalue(&interner, &decls, &types));
    }
}
