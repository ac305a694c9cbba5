//! The type model and its interning table.
//!
//! Types are immutable values interned in a [`TypeTable`]: structurally
//! equal types always share one [`TypeId`], so type equality after
//! canonicalization is an integer compare. Builtins are interned once at
//! table construction and behave as singletons.
//!
//! [`Type::Named`] is the one non-structural case: a name introduced by
//! `typealias` (or registered by an embedder). Each name binds to exactly
//! one target per compilation; [`TypeTable::canonical`] chases bindings and
//! rebuilds composites out of canonical parts.

use std::collections::HashMap;

use tarn_base::{Interner, Symbol};

/// Interned handle to a [`Type`]. Equality of canonical ids is structural
/// type equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A tarn type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Integer,
    Double,
    Boolean,
    Character,
    /// The return "type" of functions declared without `->`.
    Void,
    /// Ordered, unnamed members.
    Tuple(Vec<TypeId>),
    /// Ordered, named members.
    Struct(Vec<(Symbol, TypeId)>),
    /// Fixed-length homogeneous sequence.
    List { element: TypeId, length: u64 },
    /// Pointer-plus-convention view of a homogeneous sequence.
    Slice { element: TypeId },
    Pointer { referent: TypeId },
    Reference { referent: TypeId },
    Function {
        params: Vec<TypeId>,
        ret: TypeId,
        is_var_arg: bool,
    },
    /// A type referred to by name; resolves through the table's bindings.
    Named(Symbol),
}

/// Interning table for types.
pub struct TypeTable {
    types: Vec<Type>,
    map: HashMap<Type, TypeId>,
    bindings: HashMap<Symbol, TypeId>,
    integer: TypeId,
    double: TypeId,
    boolean: TypeId,
    character: TypeId,
    void: TypeId,
}

impl TypeTable {
    pub fn new() -> Self {
        let mut table = TypeTable {
            types: Vec::new(),
            map: HashMap::new(),
            bindings: HashMap::new(),
            integer: TypeId(0),
            double: TypeId(0),
            boolean: TypeId(0),
            character: TypeId(0),
            void: TypeId(0),
        };
        table.integer = table.intern(Type::Integer);
        table.double = table.intern(Type::Double);
        table.boolean = table.intern(Type::Boolean);
        table.character = table.intern(Type::Character);
        table.void = table.intern(Type::Void);
        table
    }

    /// Interns a type, returning the existing id for structural duplicates.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.map.get(&ty) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.map.insert(ty, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    // ---- builtin singletons ----

    pub fn integer(&self) -> TypeId {
        self.integer
    }

    pub fn double(&self) -> TypeId {
        self.double
    }

    pub fn boolean(&self) -> TypeId {
        self.boolean
    }

    pub fn character(&self) -> TypeId {
        self.character
    }

    pub fn void(&self) -> TypeId {
        self.void
    }

    // ---- composite constructors ----

    pub fn tuple(&mut self, elements: Vec<TypeId>) -> TypeId {
        self.intern(Type::Tuple(elements))
    }

    pub fn struct_type(&mut self, fields: Vec<(Symbol, TypeId)>) -> TypeId {
        self.intern(Type::Struct(fields))
    }

    pub fn list(&mut self, element: TypeId, length: u64) -> TypeId {
        self.intern(Type::List { element, length })
    }

    pub fn slice(&mut self, element: TypeId) -> TypeId {
        self.intern(Type::Slice { element })
    }

    pub fn pointer(&mut self, referent: TypeId) -> TypeId {
        self.intern(Type::Pointer { referent })
    }

    pub fn reference(&mut self, referent: TypeId) -> TypeId {
        self.intern(Type::Reference { referent })
    }

    pub fn function(&mut self, params: Vec<TypeId>, ret: TypeId, is_var_arg: bool) -> TypeId {
        self.intern(Type::Function { params, ret, is_var_arg })
    }

    pub fn named(&mut self, name: Symbol) -> TypeId {
        self.intern(Type::Named(name))
    }

    // ---- named-type bindings ----

    /// Binds `name` to `target`. Returns `false` on an attempt to rebind the
    /// name to a different target; a name has one meaning per compilation.
    pub fn bind_named(&mut self, name: Symbol, target: TypeId) -> bool {
        match self.bindings.get(&name) {
            Some(&existing) => existing == target,
            None => {
                self.bindings.insert(name, target);
                true
            }
        }
    }

    pub fn named_binding(&self, name: Symbol) -> Option<TypeId> {
        self.bindings.get(&name).copied()
    }

    /// Whether resolving `name` eventually reaches `name` again.
    pub fn alias_is_cyclic(&self, name: Symbol) -> bool {
        let Some(target) = self.named_binding(name) else {
            return false;
        };
        let mut work = vec![target];
        let mut seen = vec![name];
        while let Some(id) = work.pop() {
            match self.get(id) {
                Type::Named(n) => {
                    if *n == name {
                        return true;
                    }
                    if !seen.contains(n) {
                        seen.push(*n);
                        if let Some(t) = self.named_binding(*n) {
                            work.push(t);
                        }
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
        false
    }

    // ---- canonicalization ----

    /// The canonical representative of `id`: named types resolve through
    /// their bindings, composites are rebuilt from canonical parts. Unbound
    /// names canonicalize to themselves.
    pub fn canonical(&mut self, id: TypeId) -> TypeId {
        self.canonical_guarded(id, &mut Vec::new())
    }

    fn canonical_guarded(&mut self, id: TypeId, in_progress: &mut Vec<Symbol>) -> TypeId {
        match self.get(id).clone() {
            Type::Integer | Type::Double | Type::Boolean | Type::Character | Type::Void => id,
            Type::Named(name) => {
                if in_progress.contains(&name) {
                    return id;
                }
                match self.named_binding(name) {
                    Some(target) => {
                        in_progress.push(name);
                        let canon = self.canonical_guarded(target, in_progress);
                        in_progress.pop();
                        canon
                    }
                    None => id,
                }
            }
            Type::Tuple(elements) => {
                let elements = elements
                    .into_iter()
                    .map(|e| self.canonical_guarded(e, in_progress))
                    .collect();
                self.tuple(elements)
            }
            Type::Struct(fields) => {
                let fields = fields
                    .into_iter()
                    .map(|(n, t)| (n, self.canonical_guarded(t, in_progress)))
                    .collect();
                self.struct_type(fields)
            }
            Type::List { element, length } => {
                let element = self.canonical_guarded(element, in_progress);
                self.list(element, length)
            }
            Type::Slice { element } => {
                let element = self.canonical_guarded(element, in_progress);
                self.slice(element)
            }
            Type::Pointer { referent } => {
                let referent = self.canonical_guarded(referent, in_progress);
                self.pointer(referent)
            }
            Type::Reference { referent } => {
                let referent = self.canonical_guarded(referent, in_progress);
                self.reference(referent)
            }
            Type::Function { params, ret, is_var_arg } => {
                let params = params
                    .into_iter()
                    .map(|p| self.canonical_guarded(p, in_progress))
                    .collect();
                let ret = self.canonical_guarded(ret, in_progress);
                self.function(params, ret, is_var_arg)
            }
        }
    }

    /// Structural equality after canonicalization.
    pub fn equal(&mut self, a: TypeId, b: TypeId) -> bool {
        self.canonical(a) == self.canonical(b)
    }

    // ---- presentation ----

    /// Human-readable form for error messages.
    pub fn display(&self, id: TypeId, interner: &Interner) -> String {
        match self.get(id) {
            Type::Integer => "Integer".to_string(),
            Type::Double => "Double".to_string(),
            Type::Boolean => "Boolean".to_string(),
            Type::Character => "Character".to_string(),
            Type::Void => "Void".to_string(),
            Type::Named(name) => interner.resolve(*name).to_string(),
            Type::Tuple(elements) => {
                let inner: Vec<_> = elements.iter().map(|e| self.display(*e, interner)).collect();
                format!("({})", inner.join(", "))
            }
            Type::Struct(fields) => {
                let inner: Vec<_> = fields
                    .iter()
                    .map(|(n, t)| format!("{}: {}", interner.resolve(*n), self.display(*t, interner)))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
            Type::List { element, length } => {
                format!("[{}; {}]", self.display(*element, interner), length)
            }
            Type::Slice { element } => format!("[{}]", self.display(*element, interner)),
            Type::Pointer { referent } => format!("*{}", self.display(*referent, interner)),
            Type::Reference { referent } => format!("&{}", self.display(*referent, interner)),
            Type::Function { params, ret, is_var_arg } => {
                let mut inner: Vec<_> = params.iter().map(|p| self.display(*p, interner)).collect();
                if *is_var_arg {
                    inner.push("...".to_string());
                }
                format!("({}) -> {}", inner.join(", "), self.display(*ret, interner))
            }
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}
