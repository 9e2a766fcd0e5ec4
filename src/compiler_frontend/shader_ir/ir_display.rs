//! IR Display
//!
//! Renders lowered IR as indented pseudo-source for dev logging and test failure output.
//! Locals print as `l<index>` since names don't survive lowering.

use crate::compiler_frontend::shader_ir::ir_nodes::{
    BlockLocal, ConstType, IrBlock, IrExpression, IrStatement,
};
use std::fmt::{Display, Formatter, Result as FmtResult};

const INDENT: &str = "    ";

impl Display for IrExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            IrExpression::Number { value, const_type } => match const_type {
                ConstType::Untyped => write!(f, "{value}"),
                ConstType::Int => write!(f, "int({value})"),
                ConstType::Float => write!(f, "float({value})"),
            },
            IrExpression::Bool(value) => write!(f, "{value}"),
            IrExpression::LocalVariable(index) => write!(f, "l{index}"),
            IrExpression::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            IrExpression::Unary { op, operand } => write!(f, "{op}{operand}"),
            IrExpression::Call { function, args } => {
                write!(f, "F{}(", function.0)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Display for IrBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write_block(f, self, 0)
    }
}

impl Display for IrStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write_statement(f, self, 0)
    }
}

fn write_block(f: &mut Formatter<'_>, block: &IrBlock, depth: usize) -> FmtResult {
    for (i, local) in block.local_vars.iter().enumerate() {
        write_local(f, local, block.local_var_index_offset + i, depth)?;
    }

    for statement in &block.statements {
        write_statement(f, statement, depth)?;
    }

    Ok(())
}

fn write_local(f: &mut Formatter<'_>, local: &BlockLocal, index: usize, depth: usize) -> FmtResult {
    // Counters are printed by their for header
    if local.is_loop_counter {
        return Ok(());
    }

    indent(f, depth)?;
    match local.ty {
        Some(ty) => writeln!(f, "var l{index} {ty}"),
        None => writeln!(f, "var l{index} <unset>"),
    }
}

fn write_statement(f: &mut Formatter<'_>, statement: &IrStatement, depth: usize) -> FmtResult {
    indent(f, depth)?;

    match statement {
        IrStatement::Assign { target, value } => writeln!(f, "{target} = {value}"),

        IrStatement::If {
            condition,
            then_block,
            else_block,
        } => {
            writeln!(f, "if {condition} {{")?;
            write_block(f, then_block, depth + 1)?;

            if let Some(else_block) = else_block {
                indent(f, depth)?;
                writeln!(f, "}} else {{")?;
                write_block(f, else_block, depth + 1)?;
            }

            indent(f, depth)?;
            writeln!(f, "}}")
        }

        IrStatement::For(for_loop) => {
            writeln!(
                f,
                "for {ty} l{i} := {init}; l{i} {op} {end}; l{i} += {delta} {{",
                ty = for_loop.counter_type,
                i = for_loop.counter_index,
                init = for_loop.init,
                op = for_loop.op,
                end = for_loop.end,
                delta = for_loop.delta,
            )?;
            write_block(f, &for_loop.body, depth + 1)?;
            indent(f, depth)?;
            writeln!(f, "}}")
        }

        IrStatement::Return => writeln!(f, "return"),

        IrStatement::ExprStmt(expression) => writeln!(f, "{expression}"),

        IrStatement::Block(block) => {
            writeln!(f, "{{")?;
            write_block(f, block, depth + 1)?;
            indent(f, depth)?;
            writeln!(f, "}}")
        }
    }
}

fn indent(f: &mut Formatter<'_>, depth: usize) -> FmtResult {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}
