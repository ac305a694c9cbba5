//! Functions and basic blocks.
//!
//! A [`Function`] owns all of its storage: parameters, a constant pool, an
//! instruction arena, and basic blocks that reference instructions by id.
//! Blocks are append-only except for [`Function::remove_block`], which the
//! lowering pass uses to prune an unreachable merge block.

use crate::inst::{Inst, Terminator};
use crate::types::IrType;
use crate::value::{BlockId, ConstId, Constant, InstId, Value};

/// A named, typed function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: IrType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: IrType) -> Self {
        Param { name: name.into(), ty }
    }
}

/// A basic block: a label, a straight-line instruction list, and at most one
/// terminator. A finished function has a terminator in every live block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    pub insts: Vec<InstId>,
    pub terminator: Option<Terminator>,
    removed: bool,
}

impl Block {
    fn new(name: impl Into<String>) -> Self {
        Block {
            name: name.into(),
            insts: Vec::new(),
            terminator: None,
            removed: false,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }

    /// Whether the block was pruned with [`Function::remove_block`].
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// A function definition, or a declaration if it has no blocks.
///
/// All functions have external linkage.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub ret_ty: IrType,
    pub is_var_arg: bool,
    blocks: Vec<Block>,
    insts: Vec<Inst>,
    consts: Vec<Constant>,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        ret_ty: IrType,
        is_var_arg: bool,
    ) -> Self {
        Function {
            name: name.into(),
            params,
            ret_ty,
            is_var_arg,
            blocks: Vec::new(),
            insts: Vec::new(),
            consts: Vec::new(),
        }
    }

    /// A declaration has a signature but no body.
    pub fn is_declaration(&self) -> bool {
        self.blocks.iter().all(|b| b.removed)
    }

    /// The function type of this function.
    pub fn fn_ty(&self) -> IrType {
        IrType::Func {
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
            ret: Box::new(self.ret_ty.clone()),
            var_arg: self.is_var_arg,
        }
    }

    // ---- blocks ----

    pub fn append_block(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::new(name));
        id
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0 as usize]
    }

    /// Live blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.removed)
            .map(|(i, b)| (BlockId(i as u32), b))
    }

    /// Renames a block label.
    pub fn set_block_name(&mut self, id: BlockId, name: impl Into<String>) {
        self.block_mut(id).name = name.into();
    }

    /// Number of live blocks whose terminator targets `id`.
    pub fn predecessor_count(&self, id: BlockId) -> usize {
        self.blocks()
            .filter_map(|(_, b)| b.terminator.as_ref())
            .flat_map(|t| t.successors())
            .filter(|succ| *succ == id)
            .count()
    }

    /// Unlinks an unreachable block from the function.
    ///
    /// # Panics
    ///
    /// Panics if the block still has predecessors.
    pub fn remove_block(&mut self, id: BlockId) {
        assert_eq!(
            self.predecessor_count(id),
            0,
            "cannot remove a block that still has predecessors"
        );
        self.blocks[id.0 as usize].removed = true;
    }

    // ---- instructions ----

    pub(crate) fn push_inst(&mut self, block: BlockId, inst: Inst) -> InstId {
        let id = InstId(self.insts.len() as u32);
        self.insts.push(inst);
        self.block_mut(block).insts.push(id);
        id
    }

    pub fn inst(&self, id: InstId) -> &Inst {
        &self.insts[id.0 as usize]
    }

    // ---- constants ----

    pub fn add_const(&mut self, constant: Constant) -> ConstId {
        let id = ConstId(self.consts.len() as u32);
        self.consts.push(constant);
        id
    }

    pub fn constant(&self, id: ConstId) -> &Constant {
        &self.consts[id.0 as usize]
    }

    /// The type of any value defined in this function.
    pub fn value_type(&self, value: Value) -> IrType {
        match value {
            Value::Param(index) => self.params[index as usize].ty.clone(),
            Value::Const(id) => self.constant(id).ty(),
            Value::Inst(id) => self.inst(id).ty.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inst::Terminator;

    fn sample() -> Function {
        Function::new(
            "f",
            vec![Param::new("x", IrType::Int(64))],
            IrType::Int(64),
            false,
        )
    }

    #[test]
    fn new_function_is_a_declaration() {
        assert!(sample().is_declaration());
    }

    #[test]
    fn appending_a_block_makes_it_a_definition() {
        let mut f = sample();
        f.append_block("entry");
        assert!(!f.is_declaration());
    }

    #[test]
    fn param_values_have_param_types() {
        let f = sample();
        assert_eq!(f.value_type(Value::Param(0)), IrType::Int(64));
    }

    #[test]
    fn predecessor_count_follows_terminators() {
        let mut f = sample();
        let entry = f.append_block("entry");
        let exit = f.append_block("exit");
        f.block_mut(entry).terminator = Some(Terminator::Br(exit));
        assert_eq!(f.predecessor_count(exit), 1);
        assert_eq!(f.predecessor_count(entry), 0);
    }

    #[test]
    fn remove_block_hides_it_from_iteration() {
        let mut f = sample();
        let entry = f.append_block("entry");
        let dead = f.append_block("dead");
        f.block_mut(entry).terminator = Some(Terminator::Ret(None));
        f.remove_block(dead);
        let live: Vec<_> = f.blocks().map(|(id, _)| id).collect();
        assert_eq!(live, vec![entry]);
    }

    #[test]
    #[should_panic(expected = "predecessors")]
    fn remove_block_refuses_reachable_blocks() {
        let mut f = sample();
        let entry = f.append_block("entry");
        let target = f.append_block("target");
        f.block_mut(entry).terminator = Some(Terminator::Br(target));
        f.remove_block(target);
    }

    #[test]
    fn fn_ty_reflects_signature() {
        let f = sample();
        assert_eq!(
            f.fn_ty(),
            IrType::Func {
                params: vec![IrType::Int(64)],
                ret: Box::new(IrType::Int(64)),
                var_arg: false,
            }
        );
    }
}
