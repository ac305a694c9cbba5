//! Lexical scopes and name lookup.
//!
//! Scopes form a tree of [`DeclarationContext`]s: globals at the root, a
//! child per function, a child per compound statement. A name may map to
//! several declarations (overloaded functions, a shadowing candidate set);
//! lookup therefore returns an [`AmbiguousDecl`] — a candidate set with
//! explicit predicates — and the caller narrows it by use-context before
//! committing to a single binding.

use std::collections::HashMap;

use tarn_base::Symbol;

use crate::decls::{DeclId, DeclTable};
use crate::types::TypeId;

/// Handle to a [`DeclarationContext`] in the [`ContextTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextId(u32);

impl ContextId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One lexical scope: a weak parent edge and the names declared here.
#[derive(Debug, Default)]
pub struct DeclarationContext {
    parent: Option<ContextId>,
    names: HashMap<Symbol, Vec<DeclId>>,
}

/// The scope tree of a compilation; index 0 is the global root.
#[derive(Debug)]
pub struct ContextTree {
    contexts: Vec<DeclarationContext>,
}

impl ContextTree {
    pub fn new() -> Self {
        ContextTree {
            contexts: vec![DeclarationContext::default()],
        }
    }

    pub fn root(&self) -> ContextId {
        ContextId(0)
    }

    pub fn push_child(&mut self, parent: ContextId) -> ContextId {
        let id = ContextId(self.contexts.len() as u32);
        self.contexts.push(DeclarationContext {
            parent: Some(parent),
            names: HashMap::new(),
        });
        id
    }

    pub fn parent(&self, ctx: ContextId) -> Option<ContextId> {
        self.contexts[ctx.index()].parent
    }

    /// Registers a declaration under `name` in `ctx`. Duplicates accumulate
    /// as candidates; they only become errors if an ambiguous use survives
    /// filtering.
    pub fn declare(&mut self, ctx: ContextId, name: Symbol, decl: DeclId) {
        self.contexts[ctx.index()]
            .names
            .entry(name)
            .or_default()
            .push(decl);
    }

    /// Candidates declared directly in `ctx`.
    pub fn lookup_local(&self, ctx: ContextId, name: Symbol) -> AmbiguousDecl {
        AmbiguousDecl::new(
            self.contexts[ctx.index()]
                .names
                .get(&name)
                .cloned()
                .unwrap_or_default(),
        )
    }

    /// Walks from `ctx` to the root; the nearest scope with any candidate
    /// for `name` wins (inner declarations shadow outer ones).
    pub fn lookup(&self, ctx: ContextId, name: Symbol) -> AmbiguousDecl {
        let mut current = Some(ctx);
        while let Some(c) = current {
            let found = self.lookup_local(c, name);
            if !found.is_empty() {
                return found;
            }
            current = self.parent(c);
        }
        AmbiguousDecl::empty()
    }
}

impl Default for ContextTree {
    fn default() -> Self {
        Self::new()
    }
}

/// A set of candidate declarations for one name.
///
/// The single funnel through which name lookup returns results: callers
/// narrow with [`filter`](AmbiguousDecl::filter) and then demand a unique
/// answer with [`unique`](AmbiguousDecl::unique).
#[derive(Debug, Clone, PartialEq)]
pub struct AmbiguousDecl {
    candidates: Vec<DeclId>,
}

impl AmbiguousDecl {
    pub fn empty() -> Self {
        AmbiguousDecl { candidates: Vec::new() }
    }

    pub fn new(candidates: Vec<DeclId>) -> Self {
        AmbiguousDecl { candidates }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// The unique candidate, or `None` when empty or still ambiguous.
    pub fn unique(&self) -> Option<DeclId> {
        match self.candidates.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.candidates.iter().copied()
    }

    /// A new candidate set keeping only declarations satisfying `pred`.
    pub fn filter(&self, decls: &DeclTable, pred: impl Fn(&crate::decls::DeclInfo) -> bool) -> Self {
        AmbiguousDecl {
            candidates: self
                .candidates
                .iter()
                .copied()
                .filter(|id| pred(decls.get(*id)))
                .collect(),
        }
    }

    /// The declared types of the candidates, where already known.
    pub fn types(&self, decls: &DeclTable) -> Vec<TypeId> {
        self.candidates
            .iter()
            .filter_map(|id| decls.get(*id).ty)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decls::{DeclInfo, DeclKind};
    use tarn_base::{Interner, Span};

    fn value_decl(decls: &mut DeclTable, tree: &ContextTree, name: Symbol) -> DeclId {
        decls.add(DeclInfo {
            name,
            kind: DeclKind::Let,
            context: tree.root(),
            ty: None,
            span: Span::default(),
        })
    }

    #[test]
    fn lookup_finds_declarations_in_scope() {
        let mut interner = Interner::new();
        let mut tree = ContextTree::new();
        let mut decls = DeclTable::new();
        let name = interner.intern("x");
        let id = value_decl(&mut decls, &tree, name);
        tree.declare(tree.root(), name, id);
        assert_eq!(tree.lookup(tree.root(), name).unique(), Some(id));
    }

    #[test]
    fn lookup_walks_parent_contexts() {
        let mut interner = Interner::new();
        let mut tree = ContextTree::new();
        let mut decls = DeclTable::new();
        let name = interner.intern("x");
        let id = value_decl(&mut decls, &tree, name);
        tree.declare(tree.root(), name, id);
        let inner = tree.push_child(tree.root());
        let innermost = tree.push_child(inner);
        assert_eq!(tree.lookup(innermost, name).unique(), Some(id));
    }

    #[test]
    fn inner_declarations_shadow_outer_ones() {
        let mut interner = Interner::new();
        let mut tree = ContextTree::new();
        let mut decls = DeclTable::new();
        let name = interner.intern("x");
        let outer = value_decl(&mut decls, &tree, name);
        tree.declare(tree.root(), name, outer);
        let inner_ctx = tree.push_child(tree.root());
        let inner = value_decl(&mut decls, &tree, name);
        tree.declare(inner_ctx, name, inner);
        assert_eq!(tree.lookup(inner_ctx, name).unique(), Some(inner));
    }

    #[test]
    fn missing_names_come_back_empty() {
        let mut interner = Interner::new();
        let tree = ContextTree::new();
        let name = interner.intern("ghost");
        assert!(tree.lookup(tree.root(), name).is_empty());
    }

    #[test]
    fn types_reports_the_known_candidate_types() {
        let mut interner = Interner::new();
        let mut tree = ContextTree::new();
        let mut decls = DeclTable::new();
        let types = crate::types::TypeTable::new();
        let name = interner.intern("x");
        let id = value_decl(&mut decls, &tree, name);
        tree.declare(tree.root(), name, id);

        let found = tree.lookup(tree.root(), name);
        assert!(found.types(&decls).is_empty());
        decls.get_mut(id).ty = Some(types.integer());
        assert_eq!(found.types(&decls), vec![types.integer()]);
    }

    #[test]
    fn duplicate_declarations_are_ambiguous_until_filtered() {
        let mut interner = Interner::new();
        let mut tree = ContextTree::new();
        let mut decls = DeclTable::new();
        let name = interner.intern("f");
        let first = value_decl(&mut decls, &tree, name);
        let second = decls.add(DeclInfo {
            name,
            kind: DeclKind::Func { sig: None },
            context: tree.root(),
            ty: None,
            span: Span::default(),
        });
        tree.declare(tree.root(), name, first);
        tree.declare(tree.root(), name, second);
        let found = tree.lookup(tree.root(), name);
        assert!(found.is_ambiguous());
        let callables = found.filter(&decls, |d| d.is_callable());
        assert_eq!(callables.unique(), Some(second));
    }
}
