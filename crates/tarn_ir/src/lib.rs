//! SSA intermediate representation for the tarn compiler.
//!
//! This crate is the target of the lowering pass and deliberately knows
//! nothing about the tarn surface language: it models a conventional
//! SSA-form module the way a standard backend expects one.
//!
//! ## Shape
//!
//! - A [`Module`] holds functions and a table of named struct types.
//! - A [`Function`] holds parameters, a constant pool, an instruction arena,
//!   and basic [`Block`]s. Extern functions are declarations with no blocks.
//! - A [`Block`] is a straight-line instruction sequence ending in exactly
//!   one [`Terminator`] (branch, conditional branch, or return).
//! - A [`Value`] is a `Copy` handle: a parameter, a constant, or an
//!   instruction result.
//!
//! ## Building
//!
//! Instructions are appended through a positioned [`Builder`]:
//!
//! ```
//! use tarn_ir::{Builder, Function, IrType, Module};
//!
//! let mut func = Function::new("answer", vec![], IrType::Int(64), false);
//! let entry = func.append_block("entry");
//! let mut b = Builder::new(&mut func, entry);
//! let forty_two = b.const_int(IrType::Int(64), 42);
//! b.build_ret(Some(forty_two));
//!
//! let mut module = Module::new("demo");
//! module.add_function(func);
//! assert!(module.function("answer").is_some());
//! ```
//!
//! Integers are signed: division and remainder lower as `sdiv`/`srem`,
//! comparisons as signed predicates. Floating point comparisons are ordered.
//! GEP indices are 32-bit signed integers.

pub mod builder;
pub mod display;
pub mod function;
pub mod inst;
pub mod module;
pub mod types;
pub mod value;

pub use builder::Builder;
pub use function::{Block, Function, Param};
pub use inst::{BinOp, CastOp, CmpOp, Inst, Op, Terminator, UnOp};
pub use module::Module;
pub use types::IrType;
pub use value::{BlockId, ConstId, Constant, InstId, Value};
