//! Textual dump of IR modules.
//!
//! The format is LLVM-flavored and meant for debugging and test assertions,
//! not for round-tripping. Instruction results print as `%vN` (N is the
//! function-wide instruction index) and block labels as `nameN` (N is the
//! block index), which keeps labels unique without a renaming pass.

use std::fmt;

use crate::function::Function;
use crate::inst::{BinOp, CastOp, CmpOp, Op, Terminator, UnOp};
use crate::module::Module;
use crate::types::IrType;
use crate::value::{BlockId, ConstId, Value};

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::Int(bits) => write!(f, "i{bits}"),
            IrType::Double => write!(f, "double"),
            IrType::Ptr(inner) => write!(f, "{inner}*"),
            IrType::Array(elem, len) => write!(f, "[{len} x {elem}]"),
            IrType::Struct(fields) => {
                write!(f, "{{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, " }}")
            }
            IrType::Named(name) => write!(f, "%{name}"),
            IrType::Func { params, ret, var_arg } => {
                write!(f, "{ret} (")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                if *var_arg {
                    if !params.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn write_const(f: &mut fmt::Formatter<'_>, func: &Function, id: ConstId) -> fmt::Result {
    match func.constant(id) {
        crate::value::Constant::Int { value, .. } => write!(f, "{value}"),
        crate::value::Constant::Float { value } => write!(f, "{value:?}"),
        crate::value::Constant::Aggregate { ty, elements } => {
            let (open, close) = match ty {
                IrType::Array(..) => ('[', ']'),
                _ => ('{', '}'),
            };
            write!(f, "{open} ")?;
            for (i, elem) in elements.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_const(f, func, *elem)?;
            }
            write!(f, " {close}")
        }
        crate::value::Constant::Bytes { data } => {
            write!(f, "c\"")?;
            for byte in data {
                match byte {
                    b'"' | b'\\' => write!(f, "\\{}", *byte as char)?,
                    0x20..=0x7e => write!(f, "{}", *byte as char)?,
                    _ => write!(f, "\\{byte:02x}")?,
                }
            }
            write!(f, "\"")
        }
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, func: &Function, value: Value) -> fmt::Result {
    match value {
        Value::Param(index) => write!(f, "%{}", func.params[index as usize].name),
        Value::Inst(id) => write!(f, "%v{}", id.0),
        Value::Const(id) => write_const(f, func, id),
    }
}

fn write_typed_value(f: &mut fmt::Formatter<'_>, func: &Function, value: Value) -> fmt::Result {
    write!(f, "{} ", func.value_type(value))?;
    write_value(f, func, value)
}

fn label(func: &Function, id: BlockId) -> String {
    format!("{}{}", func.block(id).name, id.0)
}

fn bin_op_name(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "add",
        BinOp::Sub => "sub",
        BinOp::Mul => "mul",
        BinOp::SDiv => "sdiv",
        BinOp::SRem => "srem",
        BinOp::Shl => "shl",
        BinOp::AShr => "ashr",
        BinOp::And => "and",
        BinOp::Or => "or",
        BinOp::FAdd => "fadd",
        BinOp::FSub => "fsub",
        BinOp::FMul => "fmul",
        BinOp::FDiv => "fdiv",
    }
}

fn cmp_op_name(op: CmpOp) -> (&'static str, &'static str) {
    match op {
        CmpOp::IEq => ("icmp", "eq"),
        CmpOp::INe => ("icmp", "ne"),
        CmpOp::ISgt => ("icmp", "sgt"),
        CmpOp::ISge => ("icmp", "sge"),
        CmpOp::ISlt => ("icmp", "slt"),
        CmpOp::ISle => ("icmp", "sle"),
        CmpOp::FOeq => ("fcmp", "oeq"),
        CmpOp::FOne => ("fcmp", "one"),
        CmpOp::FOgt => ("fcmp", "ogt"),
        CmpOp::FOge => ("fcmp", "oge"),
        CmpOp::FOlt => ("fcmp", "olt"),
        CmpOp::FOle => ("fcmp", "ole"),
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.is_declaration() { "declare" } else { "define" };
        write!(f, "{keyword} {} @{}(", self.ret_ty, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} %{}", param.ty, param.name)?;
        }
        if self.is_var_arg {
            if !self.params.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "...")?;
        }
        write!(f, ")")?;
        if self.is_declaration() {
            return writeln!(f);
        }
        writeln!(f, " {{")?;
        for (id, block) in self.blocks() {
            writeln!(f, "{}:", label(self, id))?;
            for inst_id in &block.insts {
                let inst = self.inst(*inst_id);
                write!(f, "  ")?;
                if inst.ty != IrType::Void {
                    write!(f, "%v{} = ", inst_id.0)?;
                }
                match &inst.op {
                    Op::Alloca { allocated } => write!(f, "alloca {allocated}")?,
                    Op::Load { ptr } => {
                        write!(f, "load ")?;
                        write_typed_value(f, self, *ptr)?;
                    }
                    Op::Store { value, ptr } => {
                        write!(f, "store ")?;
                        write_typed_value(f, self, *value)?;
                        write!(f, ", ")?;
                        write_typed_value(f, self, *ptr)?;
                    }
                    Op::Gep { ptr, indices } => {
                        write!(f, "getelementptr ")?;
                        write_typed_value(f, self, *ptr)?;
                        for index in indices {
                            write!(f, ", ")?;
                            write_typed_value(f, self, *index)?;
                        }
                    }
                    Op::Binary { op, lhs, rhs } => {
                        write!(f, "{} ", bin_op_name(*op))?;
                        write_typed_value(f, self, *lhs)?;
                        write!(f, ", ")?;
                        write_value(f, self, *rhs)?;
                    }
                    Op::Cmp { op, lhs, rhs } => {
                        let (inst_name, pred) = cmp_op_name(*op);
                        write!(f, "{inst_name} {pred} ")?;
                        write_typed_value(f, self, *lhs)?;
                        write!(f, ", ")?;
                        write_value(f, self, *rhs)?;
                    }
                    Op::Unary { op, operand } => {
                        let name = match op {
                            UnOp::Neg => "neg",
                            UnOp::FNeg => "fneg",
                            UnOp::Not => "not",
                        };
                        write!(f, "{name} ")?;
                        write_typed_value(f, self, *operand)?;
                    }
                    Op::Cast { op, operand } => {
                        let name = match op {
                            CastOp::SiToFp => "sitofp",
                            CastOp::FpToSi => "fptosi",
                            CastOp::SextOrTrunc => "sexttrunc",
                        };
                        write!(f, "{name} ")?;
                        write_typed_value(f, self, *operand)?;
                        write!(f, " to {}", inst.ty)?;
                    }
                    Op::Call { callee, args } => {
                        write!(f, "call {} @{}(", inst.ty, callee)?;
                        for (i, arg) in args.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write_typed_value(f, self, *arg)?;
                        }
                        write!(f, ")")?;
                    }
                }
                writeln!(f)?;
            }
            match &block.terminator {
                Some(Terminator::Ret(None)) => writeln!(f, "  ret void")?,
                Some(Terminator::Ret(Some(value))) => {
                    write!(f, "  ret ")?;
                    write_typed_value(f, self, *value)?;
                    writeln!(f)?;
                }
                Some(Terminator::Br(dest)) => {
                    writeln!(f, "  br label %{}", label(self, *dest))?;
                }
                Some(Terminator::CondBr { cond, then_dest, else_dest }) => {
                    write!(f, "  br ")?;
                    write_typed_value(f, self, *cond)?;
                    writeln!(
                        f,
                        ", label %{}, label %{}",
                        label(self, *then_dest),
                        label(self, *else_dest)
                    )?;
                }
                None => writeln!(f, "  ; <missing terminator>")?,
            }
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; module {}", self.name)?;
        for (name, fields) in self.structs() {
            write!(f, "%{name} = type {{ ")?;
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{field}")?;
            }
            writeln!(f, " }}")?;
        }
        for func in self.functions() {
            writeln!(f)?;
            write!(f, "{func}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::Builder;
    use crate::function::{Function, Param};
    use crate::inst::CmpOp;
    use crate::module::Module;
    use crate::types::IrType;
    use crate::value::Value;

    #[test]
    fn dump_contains_blocks_and_instructions() {
        let mut func = Function::new(
            "max0",
            vec![Param::new("x", IrType::Int(64))],
            IrType::Int(64),
            false,
        );
        let entry = func.append_block("entry");
        let positive = func.append_block("positive");
        let exit = func.append_block("exit");
        let mut b = Builder::new(&mut func, entry);
        let zero = b.const_int(IrType::Int(64), 0);
        let cond = b.build_cmp(CmpOp::ISgt, Value::Param(0), zero);
        b.build_cond_br(cond, positive, exit);
        b.position_at_end(positive);
        b.build_ret(Some(Value::Param(0)));
        b.position_at_end(exit);
        let zero_again = b.const_int(IrType::Int(64), 0);
        b.build_ret(Some(zero_again));

        let mut module = Module::new("demo");
        module.add_function(func);
        let text = module.to_string();
        assert!(text.contains("define i64 @max0(i64 %x)"));
        assert!(text.contains("icmp sgt i64 %x, 0"));
        assert!(text.contains("br i1"));
        assert!(text.contains("ret i64 %x"));
    }

    #[test]
    fn declarations_print_without_a_body() {
        let mut module = Module::new("demo");
        module.add_function(Function::new(
            "putchar",
            vec![Param::new("c", IrType::Int(64))],
            IrType::Int(64),
            false,
        ));
        let text = module.to_string();
        assert!(text.contains("declare i64 @putchar(i64 %c)"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn named_structs_print_in_the_header() {
        let mut module = Module::new("demo");
        module.add_struct("Point", vec![IrType::Int(64), IrType::Int(64)]);
        assert!(module.to_string().contains("%Point = type { i64, i64 }"));
    }
}
