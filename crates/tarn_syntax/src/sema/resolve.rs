//! Pass 1: declaration contexts.
//!
//! Globals live in the root context; each function and each compound
//! statement opens a child. Declarations register in the context they
//! appear in and receive their [`DeclId`](crate::decls::DeclId); blocks and
//! functions record their context on the node for the later passes.

use tarn_base::Result;

use crate::ast::{Block, Decl, DeclNode, Program, StmtKind};
use crate::context::CompilationContext;
use crate::decls::{DeclInfo, DeclKind};
use crate::scope::ContextId;

/// Assigns every declaration its context and table entry.
///
/// Running this on an already-resolved program is a no-op.
pub fn resolve<'a>(program: &Program<'a>, comp: &mut CompilationContext) -> Result<()> {
    if program.decls.iter().any(|d| d.id().is_some()) {
        return Ok(());
    }
    let root = comp.contexts.root();
    for decl in program.decls {
        declare(decl, root, comp)?;
    }
    Ok(())
}

fn declare<'a>(decl: &'a Decl<'a>, ctx: ContextId, comp: &mut CompilationContext) -> Result<()> {
    let kind = match &decl.node {
        DeclNode::Let { .. } => DeclKind::Let,
        DeclNode::Var { .. } => DeclKind::Var,
        DeclNode::UninitializedVar { .. } => DeclKind::UninitializedVar,
        DeclNode::Func { .. } => DeclKind::Func { sig: None },
        DeclNode::ExternFunc { .. } => DeclKind::ExternFunc { sig: None },
        DeclNode::TypeAlias { target, .. } => DeclKind::TypeAlias { target: *target },
        // Parameters are registered by their owning function below.
        DeclNode::Param { .. } => return Ok(()),
    };
    let id = comp.decls.add(DeclInfo {
        name: decl.name(),
        kind,
        context: ctx,
        ty: None,
        span: decl.span,
    });
    decl.set_id(id);
    comp.contexts.declare(ctx, decl.name(), id);

    if let DeclNode::Func { params, body, context, .. } = &decl.node {
        let func_ctx = comp.contexts.push_child(ctx);
        context.set(Some(func_ctx));
        for (index, param) in params.iter().enumerate() {
            if let DeclNode::Param { name, .. } = &param.node {
                let param_id = comp.decls.add(DeclInfo {
                    name: *name,
                    kind: DeclKind::Param { index },
                    context: func_ctx,
                    ty: None,
                    span: param.span,
                });
                param.set_id(param_id);
                comp.contexts.declare(func_ctx, *name, param_id);
            }
        }
        resolve_block(body, func_ctx, comp)?;
    }
    Ok(())
}

fn resolve_block<'a>(
    block: &'a Block<'a>,
    parent: ContextId,
    comp: &mut CompilationContext,
) -> Result<()> {
    let ctx = comp.contexts.push_child(parent);
    block.set_context(ctx);
    for stmt in block.stmts {
        match &stmt.kind {
            StmtKind::Decl(decl) => declare(decl, ctx, comp)?,
            StmtKind::While { body, .. } => resolve_block(body, ctx, comp)?,
            StmtKind::Conditional { clauses } => {
                for clause in clauses.iter() {
                    resolve_block(clause.body, ctx, comp)?;
                }
            }
            StmtKind::Compound(inner) => resolve_block(inner, ctx, comp)?,
            StmtKind::Expr(_) | StmtKind::Return(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast_arenas;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn analyzed<R>(source: &str, f: impl FnOnce(&Program<'_>, &CompilationContext) -> R) -> R {
        let mut comp = CompilationContext::new();
        let tokens = Lexer::new(source, &mut comp.interner).tokenize().unwrap();
        ast_arenas!(ctx);
        let mut parser = Parser::new(tokens, ctx, &mut comp);
        let program = parser.parse_program().unwrap();
        resolve(&program, &mut comp).unwrap();
        f(&program, &comp)
    }

    #[test]
    fn top_level_declarations_land_in_the_root_context() {
        analyzed("let a: Integer = 5\n", |program, comp| {
            let id = program.decls[0].id().unwrap();
            assert_eq!(comp.decls.get(id).context, comp.contexts.root());
        });
    }

    #[test]
    fn functions_open_a_scope_holding_their_parameters() {
        analyzed("func f(x: Integer) -> Integer { return x\n }\n", |program, comp| {
            let DeclNode::Func { params, context, .. } = &program.decls[0].node else {
                panic!("expected func");
            };
            let func_ctx = context.get().unwrap();
            assert_ne!(func_ctx, comp.contexts.root());
            let param_id = params[0].id().unwrap();
            assert_eq!(comp.decls.get(param_id).context, func_ctx);
            assert!(matches!(
                comp.decls.get(param_id).kind,
                DeclKind::Param { index: 0 }
            ));
        });
    }

    #[test]
    fn blocks_record_their_own_child_context() {
        analyzed("func f() { let a = 1\n }\n", |program, comp| {
            let DeclNode::Func { body, context, .. } = &program.decls[0].node else {
                panic!("expected func");
            };
            let block_ctx = body.context().unwrap();
            assert_eq!(comp.contexts.parent(block_ctx), Some(context.get().unwrap()));
        });
    }

    #[test]
    fn body_declarations_register_in_the_block_context() {
        analyzed("func f() { let a = 1\n }\n", |program, comp| {
            let DeclNode::Func { body, .. } = &program.decls[0].node else {
                panic!("expected func");
            };
            let block_ctx = body.context().unwrap();
            let name = comp.interner.lookup("a").unwrap();
            assert!(!comp.contexts.lookup(block_ctx, name).is_empty());
        });
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut comp = CompilationContext::new();
        let tokens = Lexer::new("let a = 1\n", &mut comp.interner)
            .tokenize()
            .unwrap();
        ast_arenas!(ctx);
        let mut parser = Parser::new(tokens, ctx, &mut comp);
        let program = parser.parse_program().unwrap();
        resolve(&program, &mut comp).unwrap();
        let decl_count = comp.decls.len();
        resolve(&program, &mut comp).unwrap();
        assert_eq!(comp.decls.len(), decl_count);
    }

    #[test]
    fn overloaded_names_accumulate_candidates() {
        analyzed(
            "func f() { }\nfunc f(x: Integer) { }\n",
            |_, comp| {
                let name = comp.interner.lookup("f").unwrap();
                let found = comp.contexts.lookup(comp.contexts.root(), name);
                assert_eq!(found.len(), 2);
                assert!(found.is_ambiguous());
            },
        );
    }
}
