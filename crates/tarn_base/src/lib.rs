//! Structural atoms shared by every stage of the tarn compiler.
//!
//! This crate has no knowledge of the tarn language itself. It provides the
//! small, stable vocabulary the rest of the pipeline is written in:
//!
//! - [`Span`]: byte-offset ranges into source text
//! - [`SourceBuffer`]: an immutable source file with line/column mapping
//! - [`CompileError`] and [`Diagnostic`]: located, renderable failures
//! - [`Interner`] and [`Symbol`]: O(1) name equality
//! - [`Arena`]: bump allocation for AST nodes

pub mod arena;
pub mod error;
pub mod intern;
pub mod source;
pub mod span;

pub use arena::Arena;
pub use error::{CompileError, Diagnostic, Result};
pub use intern::{Interner, Symbol};
pub use source::SourceBuffer;
pub use span::Span;
