//! Per-function lowering state.

use std::collections::HashMap;

use tarn_base::{CompileError, Result, Span};
use tarn_ir::{BlockId, Function, Module, Value};
use tarn_syntax::{CompilationContext, DeclId};

/// State carried while one function body is lowered.
///
/// `locals` is the symbol table of the function: each in-scope declaration
/// maps to either its SSA argument (parameters) or the alloca holding it
/// (`let`/`var`). `current` is the block instructions are appended to; the
/// statement walk moves it forward through the control-flow graph.
pub(crate) struct FuncLowering<'c, 'm> {
    pub comp: &'c mut CompilationContext,
    pub module: &'m mut Module,
    pub func: Function,
    pub locals: HashMap<DeclId, Value>,
    pub current: BlockId,
}

impl<'c, 'm> FuncLowering<'c, 'm> {
    /// Looks up the value backing a declaration.
    pub fn local(&self, id: DeclId, name: &str, span: Span) -> Result<Value> {
        self.locals.get(&id).copied().ok_or_else(|| {
            CompileError::new(
                format!("unable to access '{name}' during lowering"),
                span,
            )
        })
    }

    /// Whether the current block can still accept instructions.
    pub fn current_is_open(&self) -> bool {
        let block = self.func.block(self.current);
        !block.is_terminated() && !block.is_removed()
    }
}
