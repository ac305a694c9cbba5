//! Positioned instruction builder.
//!
//! A [`Builder`] appends instructions to one block of one function at a
//! time. Misuse (building past a terminator, loading through a non-pointer)
//! is a bug in the caller, not a user error, and panics with an assertion.

use crate::function::Function;
use crate::inst::{BinOp, CastOp, CmpOp, Inst, Op, Terminator, UnOp};
use crate::types::IrType;
use crate::value::{BlockId, Constant, Value};

/// Appends instructions at the end of a current block.
pub struct Builder<'f> {
    func: &'f mut Function,
    block: BlockId,
}

impl<'f> Builder<'f> {
    pub fn new(func: &'f mut Function, block: BlockId) -> Self {
        Builder { func, block }
    }

    /// The block new instructions are appended to.
    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.block = block;
    }

    pub fn func(&self) -> &Function {
        self.func
    }

    /// Creates a block without repositioning.
    pub fn append_block(&mut self, name: &str) -> BlockId {
        self.func.append_block(name)
    }

    fn push(&mut self, op: Op, ty: IrType) -> Value {
        assert!(
            !self.func.block(self.block).is_terminated(),
            "cannot append an instruction to a terminated block"
        );
        Value::Inst(self.func.push_inst(self.block, Inst { op, ty }))
    }

    fn terminate(&mut self, terminator: Terminator) {
        let block = self.func.block_mut(self.block);
        assert!(
            block.terminator.is_none(),
            "block already has a terminator"
        );
        block.terminator = Some(terminator);
    }

    // ---- constants ----

    pub fn const_int(&mut self, ty: IrType, value: i64) -> Value {
        Value::Const(self.func.add_const(Constant::Int { ty, value }))
    }

    pub fn const_float(&mut self, value: f64) -> Value {
        Value::Const(self.func.add_const(Constant::Float { value }))
    }

    pub fn const_bytes(&mut self, data: Vec<u8>) -> Value {
        Value::Const(self.func.add_const(Constant::Bytes { data }))
    }

    /// A constant aggregate (struct or array) from constant elements.
    ///
    /// # Panics
    ///
    /// Panics if any element is not itself a constant.
    pub fn const_aggregate(&mut self, ty: IrType, elements: Vec<Value>) -> Value {
        let ids = elements
            .into_iter()
            .map(|v| match v {
                Value::Const(id) => id,
                _ => panic!("aggregate constants require constant elements"),
            })
            .collect();
        Value::Const(self.func.add_const(Constant::Aggregate { ty, elements: ids }))
    }

    // ---- memory ----

    pub fn build_alloca(&mut self, allocated: IrType) -> Value {
        let ptr_ty = allocated.clone().ptr_to();
        self.push(Op::Alloca { allocated }, ptr_ty)
    }

    pub fn build_load(&mut self, ptr: Value) -> Value {
        let pointee = self
            .func
            .value_type(ptr)
            .pointee()
            .cloned()
            .expect("load requires a pointer operand");
        self.push(Op::Load { ptr }, pointee)
    }

    pub fn build_store(&mut self, value: Value, ptr: Value) {
        assert!(
            self.func.value_type(ptr).is_pointer(),
            "store requires a pointer destination"
        );
        self.push(Op::Store { value, ptr }, IrType::Void);
    }

    /// Address computation into an aggregate. The caller supplies the
    /// element type the resulting pointer points at; indices must be `i32`
    /// values.
    pub fn build_gep(&mut self, ptr: Value, indices: Vec<Value>, pointee: IrType) -> Value {
        assert!(
            self.func.value_type(ptr).is_pointer(),
            "gep requires a pointer operand"
        );
        self.push(Op::Gep { ptr, indices }, pointee.ptr_to())
    }

    // ---- arithmetic ----

    pub fn build_binary(&mut self, op: BinOp, lhs: Value, rhs: Value) -> Value {
        let ty = self.func.value_type(lhs);
        self.push(Op::Binary { op, lhs, rhs }, ty)
    }

    pub fn build_cmp(&mut self, op: CmpOp, lhs: Value, rhs: Value) -> Value {
        self.push(Op::Cmp { op, lhs, rhs }, IrType::Int(1))
    }

    pub fn build_neg(&mut self, operand: Value) -> Value {
        let ty = self.func.value_type(operand);
        self.push(Op::Unary { op: UnOp::Neg, operand }, ty)
    }

    pub fn build_fneg(&mut self, operand: Value) -> Value {
        self.push(Op::Unary { op: UnOp::FNeg, operand }, IrType::Double)
    }

    pub fn build_not(&mut self, operand: Value) -> Value {
        let ty = self.func.value_type(operand);
        self.push(Op::Unary { op: UnOp::Not, operand }, ty)
    }

    // ---- conversions ----

    pub fn build_si_to_fp(&mut self, operand: Value) -> Value {
        self.push(Op::Cast { op: CastOp::SiToFp, operand }, IrType::Double)
    }

    pub fn build_fp_to_si(&mut self, operand: Value, ty: IrType) -> Value {
        self.push(Op::Cast { op: CastOp::FpToSi, operand }, ty)
    }

    pub fn build_sext_or_trunc(&mut self, operand: Value, ty: IrType) -> Value {
        self.push(Op::Cast { op: CastOp::SextOrTrunc, operand }, ty)
    }

    // ---- calls ----

    pub fn build_call(&mut self, callee: impl Into<String>, args: Vec<Value>, ret_ty: IrType) -> Value {
        self.push(Op::Call { callee: callee.into(), args }, ret_ty)
    }

    // ---- terminators ----

    pub fn build_br(&mut self, dest: BlockId) {
        self.terminate(Terminator::Br(dest));
    }

    pub fn build_cond_br(&mut self, cond: Value, then_dest: BlockId, else_dest: BlockId) {
        self.terminate(Terminator::CondBr { cond, then_dest, else_dest });
    }

    pub fn build_ret(&mut self, value: Option<Value>) {
        self.terminate(Terminator::Ret(value));
    }
}
