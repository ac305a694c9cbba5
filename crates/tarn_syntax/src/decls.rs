//! The declaration side table.
//!
//! AST declaration nodes stay tree-shaped; everything that must be shared
//! (binding targets for identifiers, resolved types, function signatures)
//! lives here, addressed by [`DeclId`]. The AST carries the id back-edge,
//! never a pointer.

use tarn_base::{Span, Symbol};

use crate::scope::ContextId;
use crate::types::TypeId;

/// Handle to a [`DeclInfo`] in the [`DeclTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclId(u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A literal parameter default, recorded at type checking so that call
/// sites can materialize omitted trailing arguments without walking back
/// into the defining function's AST.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Character(u8),
    /// Interned unescaped string content.
    Str(Symbol),
}

/// The signature of a function or extern function, canonicalized.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncSig {
    /// Parameter declarations, in order. Empty for extern declarations that
    /// were registered through the type table only.
    pub params: Vec<DeclId>,
    pub param_tys: Vec<TypeId>,
    /// Literal default per parameter; `None` means required.
    pub defaults: Vec<Option<LiteralValue>>,
    pub ret: TypeId,
    pub is_var_arg: bool,
}

impl FuncSig {
    /// Number of arguments a call must supply at minimum.
    pub fn required(&self) -> usize {
        self.defaults
            .iter()
            .position(|d| d.is_some())
            .unwrap_or(self.defaults.len())
    }

    /// Whether `args` can call this signature: arity within bounds and the
    /// supplied prefix matching the parameter types exactly.
    pub fn accepts(&self, args: &[TypeId]) -> bool {
        let arity_ok = if self.is_var_arg {
            args.len() >= self.param_tys.len()
        } else {
            args.len() >= self.required() && args.len() <= self.param_tys.len()
        };
        arity_ok
            && self
                .param_tys
                .iter()
                .zip(args.iter())
                .all(|(param, arg)| param == arg)
    }
}

/// What kind of entity a declaration introduces.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclKind {
    Let,
    Var,
    UninitializedVar,
    Param { index: usize },
    /// `sig` is filled by the type checker's signature pass.
    Func { sig: Option<FuncSig> },
    ExternFunc { sig: Option<FuncSig> },
    TypeAlias { target: TypeId },
}

/// One declaration's shared record.
#[derive(Debug, Clone)]
pub struct DeclInfo {
    pub name: Symbol,
    pub kind: DeclKind,
    /// The context the declaration was registered in.
    pub context: ContextId,
    /// Resolved type: the value type for bindings and parameters, the
    /// function type for callables. Set by the type checker.
    pub ty: Option<TypeId>,
    pub span: Span,
}

impl DeclInfo {
    /// Declarations an identifier in expression position may bind to.
    pub fn is_value(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Let | DeclKind::Var | DeclKind::UninitializedVar | DeclKind::Param { .. }
        )
    }

    /// Declarations a call's callee may bind to.
    pub fn is_callable(&self) -> bool {
        matches!(self.kind, DeclKind::Func { .. } | DeclKind::ExternFunc { .. })
    }

    pub fn is_type(&self) -> bool {
        matches!(self.kind, DeclKind::TypeAlias { .. })
    }

    /// Whether an identifier bound to this declaration is assignable.
    pub fn is_mutable(&self) -> bool {
        matches!(self.kind, DeclKind::Var | DeclKind::UninitializedVar)
    }

    pub fn sig(&self) -> Option<&FuncSig> {
        match &self.kind {
            DeclKind::Func { sig } | DeclKind::ExternFunc { sig } => sig.as_ref(),
            _ => None,
        }
    }
}

/// Append-only table of all declarations in a compilation.
#[derive(Debug, Default)]
pub struct DeclTable {
    infos: Vec<DeclInfo>,
}

impl DeclTable {
    pub fn new() -> Self {
        DeclTable { infos: Vec::new() }
    }

    pub fn add(&mut self, info: DeclInfo) -> DeclId {
        let id = DeclId(self.infos.len() as u32);
        self.infos.push(info);
        id
    }

    pub fn get(&self, id: DeclId) -> &DeclInfo {
        &self.infos[id.index()]
    }

    pub fn get_mut(&mut self, id: DeclId) -> &mut DeclInfo {
        &mut self.infos[id.index()]
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(param_tys: Vec<TypeId>, defaults: Vec<Option<LiteralValue>>, var_arg: bool) -> FuncSig {
        FuncSig {
            params: vec![],
            param_tys,
            defaults,
            ret: crate::types::TypeTable::new().void(),
            is_var_arg: var_arg,
        }
    }

    #[test]
    fn required_counts_up_to_first_default() {
        let table = crate::types::TypeTable::new();
        let int = table.integer();
        let s = sig(
            vec![int, int, int],
            vec![None, Some(LiteralValue::Integer(1)), Some(LiteralValue::Integer(2))],
            false,
        );
        assert_eq!(s.required(), 1);
    }

    #[test]
    fn accepts_allows_omitting_trailing_defaults() {
        let table = crate::types::TypeTable::new();
        let int = table.integer();
        let s = sig(vec![int, int], vec![None, Some(LiteralValue::Integer(0))], false);
        assert!(s.accepts(&[int]));
        assert!(s.accepts(&[int, int]));
        assert!(!s.accepts(&[]));
    }

    #[test]
    fn accepts_rejects_wrong_types() {
        let table = crate::types::TypeTable::new();
        let int = table.integer();
        let dbl = table.double();
        let s = sig(vec![int], vec![None], false);
        assert!(!s.accepts(&[dbl]));
    }

    #[test]
    fn var_arg_accepts_extra_arguments() {
        let table = crate::types::TypeTable::new();
        let int = table.integer();
        let dbl = table.double();
        let s = sig(vec![int], vec![None], true);
        assert!(s.accepts(&[int, dbl, dbl]));
        assert!(!s.accepts(&[]));
    }
}
