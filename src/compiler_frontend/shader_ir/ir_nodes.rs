//! ============================================================
//!                     Shader IR Nodes
//! ============================================================
//! A flat, strongly typed statement IR consumed by the shader code generator.
//!  - Locals are referenced by index. Indices are continuous across nested blocks.
//!  - Loops only exist in the canonical counted form (see ForLoop)
//!  - Numeric constants carry a ConstType tag that lowering resolves from context
//!
//! Statement and expression kinds are closed enums, so every consumer
//! matches them exhaustively.

use crate::compiler_frontend::shader_ir::ir_datatypes::ShaderType;
use serde::Serialize;
use std::fmt;

// ============================================================
// Stable IDs
// ============================================================
/// Position of a function in the module's function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FunctionIndex(pub u32);

// ============================================================
// Blocks
// ============================================================
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IrBlock {
    /// Locals owned by this block, in declaration order.
    pub local_vars: Vec<BlockLocal>,

    /// Index of this block's first local. Outer blocks own everything below it.
    pub local_var_index_offset: usize,

    pub statements: Vec<IrStatement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlockLocal {
    /// Only unset after a reported error.
    pub ty: Option<ShaderType>,

    /// Counters are declared by their `For` header, not by the block.
    pub is_loop_counter: bool,
}

// ============================================================
// Statements
// ============================================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IrStatement {
    Assign {
        target: IrExpression,
        value: IrExpression,
    },

    If {
        condition: IrExpression,
        then_block: IrBlock,
        else_block: Option<IrBlock>,
    },

    For(ForLoop),

    /// Leaves the function. Output slots have already been assigned.
    Return,

    /// Only ever holds a call.
    ExprStmt(IrExpression),

    Block(IrBlock),
}

/// The only loop shape shader backends accept:
/// `for counter := init; counter op end; counter += delta`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForLoop {
    pub body: IrBlock,
    pub counter_type: ShaderType,
    pub counter_index: usize,
    pub init: ConstValue,
    pub end: ConstValue,
    pub op: ComparisonOp,

    /// Always additive. `counter -= 2` is stored as -2.
    pub delta: ConstValue,
}

// ============================================================
// Expressions
// ============================================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum IrExpression {
    Number {
        value: ConstValue,
        const_type: ConstType,
    },

    Bool(bool),

    LocalVariable(usize),

    Binary {
        op: BinOp,
        left: Box<IrExpression>,
        right: Box<IrExpression>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<IrExpression>,
    },

    Call {
        function: FunctionIndex,
        args: Vec<IrExpression>,
    },
}

impl IrExpression {
    pub fn number(value: ConstValue, const_type: ConstType) -> Self {
        IrExpression::Number { value, const_type }
    }

    pub fn binary(op: BinOp, left: IrExpression, right: IrExpression) -> Self {
        IrExpression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, IrExpression::Call { .. })
    }

    pub fn as_local_variable(&self) -> Option<usize> {
        match self {
            IrExpression::LocalVariable(index) => Some(*index),
            _ => None,
        }
    }

    /// Second phase of building a numeric constant: fixes its ConstType from
    /// the type of the place it's stored into. Non-constants pass through.
    pub fn with_resolved_const_type(self, target_type: ShaderType) -> Self {
        match self {
            IrExpression::Number { value, const_type } => {
                let const_type = match target_type {
                    ShaderType::Int => ConstType::Int,
                    ShaderType::Float => ConstType::Float,
                    _ => const_type,
                };
                IrExpression::Number { value, const_type }
            }
            other => other,
        }
    }

    /// Whether evaluating this expression reads the given local.
    pub fn reads_local(&self, index: usize) -> bool {
        match self {
            IrExpression::LocalVariable(local) => *local == index,
            IrExpression::Number { .. } | IrExpression::Bool(_) => false,
            IrExpression::Binary { left, right, .. } => {
                left.reads_local(index) || right.reads_local(index)
            }
            IrExpression::Unary { operand, .. } => operand.reads_local(index),
            IrExpression::Call { args, .. } => args.iter().any(|arg| arg.reads_local(index)),
        }
    }
}

// ============================================================
// Constants
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
}

impl ConstValue {
    /// None when the negation overflows.
    pub fn negated(self) -> Option<ConstValue> {
        match self {
            ConstValue::Int(value) => value.checked_neg().map(ConstValue::Int),
            ConstValue::Float(value) => Some(ConstValue::Float(-value)),
        }
    }

    /// The same constant spelled as `ty`. Only int and float change anything.
    pub fn converted_to(self, ty: ShaderType) -> ConstValue {
        match (self, ty) {
            (ConstValue::Float(value), ShaderType::Int) => ConstValue::Int(value as i64),
            (ConstValue::Int(value), ShaderType::Float) => ConstValue::Float(value as f64),
            (value, _) => value,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            ConstValue::Int(value) => value as f64,
            ConstValue::Float(value) => value,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(value) => write!(f, "{value}"),
            ConstValue::Float(value) => write!(f, "{value:?}"),
        }
    }
}

/// How the code generator should spell a numeric constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstType {
    Untyped,
    Int,
    Float,
}

// ============================================================
// Operators
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        ComparisonOp::try_from(self).is_ok()
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => f.write_str("-"),
            UnaryOp::Not => f.write_str("!"),
        }
    }
}

/// Relational operators allowed in a loop condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComparisonOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl TryFrom<BinOp> for ComparisonOp {
    type Error = BinOp;

    fn try_from(op: BinOp) -> Result<Self, Self::Error> {
        match op {
            BinOp::Lt => Ok(ComparisonOp::Lt),
            BinOp::Le => Ok(ComparisonOp::Le),
            BinOp::Gt => Ok(ComparisonOp::Gt),
            BinOp::Ge => Ok(ComparisonOp::Ge),
            BinOp::Eq => Ok(ComparisonOp::Eq),
            BinOp::Ne => Ok(ComparisonOp::Ne),
            other => Err(other),
        }
    }
}

impl From<ComparisonOp> for BinOp {
    fn from(op: ComparisonOp) -> Self {
        match op {
            ComparisonOp::Lt => BinOp::Lt,
            ComparisonOp::Le => BinOp::Le,
            ComparisonOp::Gt => BinOp::Gt,
            ComparisonOp::Ge => BinOp::Ge,
            ComparisonOp::Eq => BinOp::Eq,
            ComparisonOp::Ne => BinOp::Ne,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        BinOp::from(*self).fmt(f)
    }
}
