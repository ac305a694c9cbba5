//! Semantic analysis: two passes over the parsed AST.
//!
//! 1. [`resolve`] builds the declaration-context tree and registers every
//!    declaration in the scope it appears in. Names may collect several
//!    candidates; nothing is disambiguated yet.
//! 2. [`typecheck`] binds type aliases, computes function signatures, then
//!    types every expression in post-order, binding identifiers and callees
//!    through [`AmbiguousDecl`](crate::scope::AmbiguousDecl) filtering.
//!
//! Both passes are idempotent on an already-analyzed AST. After a
//! successful [`typecheck`], every expression carries a type and every
//! identifier a declaration — the contract the lowering pass relies on.

mod resolve;
mod typecheck;

pub use resolve::resolve;
pub use typecheck::typecheck;
