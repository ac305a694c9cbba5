//! The compilation pipeline.
//!
//! Each stage runs to completion on the calling thread and hands its output
//! to the next; the first error aborts the unit and later stages never see
//! a failed AST. The AST arenas live on this function's stack — the
//! returned module owns no AST references.

use tarn_base::Result;
use tarn_ir::Module;
use tarn_syntax::ast_arenas;
use tarn_syntax::sema;
use tarn_syntax::{CompilationContext, Lexer, Parser};

use crate::codegen;

/// Compiles tarn source text into an IR module.
pub fn compile(source: &str, module_name: &str) -> Result<Module> {
    let mut comp = CompilationContext::new();
    let tokens = Lexer::new(source, &mut comp.interner).tokenize()?;
    ast_arenas!(ctx);
    let mut parser = Parser::new(tokens, ctx, &mut comp);
    let program = parser.parse_program()?;
    sema::resolve(&program, &mut comp)?;
    sema::typecheck(&program, &mut comp)?;
    codegen::lower_program(&program, &mut comp, module_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_pipeline_produces_a_module() {
        let module = compile("func five() -> Integer { return 5\n }\n", "unit").unwrap();
        assert_eq!(module.name, "unit");
        assert!(module.function("five").is_some());
    }

    #[test]
    fn lexical_errors_surface_from_compile() {
        let err = compile("let a = ~\n", "unit").unwrap_err();
        assert!(err.message.contains("invalid character"));
    }

    #[test]
    fn type_errors_surface_from_compile() {
        let err = compile("func f() -> Integer { return 1 + true\n }\n", "unit").unwrap_err();
        assert!(err.message.contains("cannot be applied"));
    }

    #[test]
    fn later_stages_are_skipped_after_an_error() {
        // The body would also fail lowering (nested function), but the
        // parse error on the malformed let wins first.
        let err = compile("func f() { let = 5\n }\n", "unit").unwrap_err();
        assert!(err.message.contains("expected identifier"));
    }
}
