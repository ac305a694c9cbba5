//! Front end of the tarn compiler.
//!
//! tarn is a small, statically typed, curly-brace language with `let`/`var`
//! bindings, named and extern functions, `if`/`else if`/`else` chains, and
//! `while` loops. This crate takes source text to a fully typed AST:
//!
//! ```text
//! source text
//!     │  Lexer          (token.rs, lexer.rs)
//!     ▼
//! token stream
//!     │  Parser         (parser/, operator.rs)
//!     ▼
//! arena AST
//!     │  resolve        (sema/resolve.rs, scope.rs)
//!     ▼
//! AST + declaration contexts
//!     │  typecheck      (sema/typecheck.rs, types.rs)
//!     ▼
//! typed AST (every expression carries a type, every identifier a declaration)
//! ```
//!
//! Newlines are significant statement terminators. Operator parsing is
//! precedence climbing over a fixed eight-level table ([`operator`]). Types
//! are interned in a [`TypeTable`]; structurally equal types share one
//! canonical [`TypeId`].
//!
//! All state threads through a [`CompilationContext`] value: the interner,
//! the type table, the declaration-context tree, and the declaration table.
//! There is no global mutable state.

pub mod ast;
pub mod context;
pub mod decls;
pub mod lexer;
pub mod operator;
pub mod parser;
pub mod scope;
pub mod sema;
pub mod token;
pub mod types;

pub use context::CompilationContext;
pub use decls::{DeclId, DeclInfo, DeclKind, DeclTable, FuncSig, LiteralValue};
pub use lexer::Lexer;
pub use parser::Parser;
pub use scope::{AmbiguousDecl, ContextId, ContextTree};
pub use token::{Token, TokenKind};
pub use types::{Type, TypeId, TypeTable};
