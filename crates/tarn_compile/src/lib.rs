//! Back half of the tarn compiler: typed AST to SSA IR.
//!
//! The [`compile`] entry point runs the whole pipeline — lex, parse,
//! resolve, type check, lower — and hands back a [`tarn_ir::Module`] ready
//! for a backend. The [`codegen`] module holds the lowering pass itself,
//! split the same way the work splits: type mapping, per-function state,
//! expressions, statements, and program assembly.
//!
//! ```
//! let module = tarn_compile::compile(
//!     "func answer() -> Integer { return 42\n }\n",
//!     "demo",
//! )
//! .unwrap();
//! assert!(module.function("answer").is_some());
//! ```

pub mod codegen;
pub mod compile;

pub use compile::compile;
