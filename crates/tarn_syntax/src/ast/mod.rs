//! The abstract syntax tree.
//!
//! Nodes are bump-allocated and immutable after parsing except for their
//! decoration slots: the type of every expression, the bound declaration of
//! every identifier and call, the member index of static accessors, and the
//! context of every block. Those slots are `Cell`s filled by semantic
//! analysis, so the tree can be shared freely while still ending up fully
//! typed in place.

pub mod context;
pub mod decl;
pub mod expr;
pub mod stmt;

pub use context::AstContext;
pub use decl::{Decl, DeclNode, Program};
pub use expr::{Expr, ExprKind};
pub use stmt::{Block, Clause, Stmt, StmtKind};
