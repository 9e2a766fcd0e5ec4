//! Syntax Nodes
//!
//! The already-parsed statement and expression tree handed to lowering.
//! Parsing source text into these nodes happens before this crate is involved.

use crate::compiler_frontend::shader_ir::ir_datatypes::ShaderType;
use crate::compiler_frontend::shader_ir::ir_nodes::{BinOp, UnaryOp};
use crate::compiler_frontend::string_interning::StringId;
use std::fmt;

// ============================================================
// Locations
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharPosition {
    pub line_number: i32,
    pub char_column: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextLocation {
    pub start_pos: CharPosition,
    pub end_pos: CharPosition,
}

impl TextLocation {
    pub fn new(start: CharPosition, end: CharPosition) -> Self {
        Self {
            start_pos: start,
            end_pos: end,
        }
    }

    pub fn new_just_line(line: i32) -> Self {
        Self {
            start_pos: CharPosition {
                line_number: line,
                char_column: 0,
            },
            end_pos: CharPosition {
                line_number: line,
                char_column: 120, // Arbitrary number
            },
        }
    }
}

// ============================================================
// Functions
// ============================================================
#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub name: StringId,
    pub params: Vec<Parameter>,

    /// Output slots. These are stored as locals right after the params.
    pub outputs: Vec<Parameter>,

    pub body: Vec<Statement>,
    pub location: TextLocation,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Option<StringId>,
    pub data_type: ShaderType,
}

// ============================================================
// Statements
// ============================================================
#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub location: TextLocation,
}

impl Statement {
    pub fn new(kind: StatementKind, location: TextLocation) -> Self {
        Statement { kind, location }
    }
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    /// `a, b := x, y` / `a = x` / `a += x`
    Assign {
        targets: Vec<Expression>,
        token: AssignToken,
        values: Vec<Expression>,
    },

    /// `a++` / `a--`
    IncDec {
        target: Expression,
        token: IncDecToken,
    },

    Block(Vec<Statement>),

    Declaration(Declaration),

    For(ForStatement),

    If(IfStatement),

    Return(Vec<Expression>),

    Expression(Expression),

    /// Anything the parser accepts that shaders can't express (switch, range loops, goto...).
    /// Holds a short description for the diagnostic.
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignToken {
    Define,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,
}

impl AssignToken {
    /// The binary operator a compound assignment desugars to.
    /// Bitwise compound assignments have no shader IR counterpart.
    pub fn compound_operator(self) -> Option<BinOp> {
        match self {
            AssignToken::AddAssign => Some(BinOp::Add),
            AssignToken::SubAssign => Some(BinOp::Sub),
            AssignToken::MulAssign => Some(BinOp::Mul),
            AssignToken::QuoAssign => Some(BinOp::Div),
            AssignToken::RemAssign => Some(BinOp::Mod),
            _ => None,
        }
    }
}

impl fmt::Display for AssignToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            AssignToken::Define => ":=",
            AssignToken::Assign => "=",
            AssignToken::AddAssign => "+=",
            AssignToken::SubAssign => "-=",
            AssignToken::MulAssign => "*=",
            AssignToken::QuoAssign => "/=",
            AssignToken::RemAssign => "%=",
            AssignToken::AndAssign => "&=",
            AssignToken::OrAssign => "|=",
            AssignToken::XorAssign => "^=",
            AssignToken::ShlAssign => "<<=",
            AssignToken::ShrAssign => ">>=",
            AssignToken::AndNotAssign => "&^=",
        };
        f.write_str(token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDecToken {
    Inc,
    Dec,
}

#[derive(Debug, Clone)]
pub struct ForStatement {
    pub init: Option<Box<Statement>>,
    pub condition: Option<Expression>,
    pub post: Option<Box<Statement>>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub init: Option<Box<Statement>>,
    pub condition: Expression,
    pub then_body: Vec<Statement>,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone)]
pub enum ElseBranch {
    Block(Vec<Statement>),

    /// `else if ...`, always a statement of kind `If`
    If(Box<Statement>),
}

// ============================================================
// Declarations
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Var,
    Const,
}

#[derive(Debug, Clone)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub names: Vec<StringId>,
    pub data_type: Option<ShaderType>,
    pub values: Vec<Expression>,
}

// ============================================================
// Expressions
// ============================================================
#[derive(Debug, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub location: TextLocation,
}

impl Expression {
    pub fn new(kind: ExpressionKind, location: TextLocation) -> Self {
        Expression { kind, location }
    }

    /// The identifier this expression names, looking through parentheses.
    pub fn as_identifier(&self) -> Option<StringId> {
        match &self.kind {
            ExpressionKind::Identifier(name) => Some(*name),
            ExpressionKind::Paren(inner) => inner.as_identifier(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Identifier(StringId),
    IntLiteral(i64),
    FloatLiteral(f64),
    BoolLiteral(bool),

    Binary {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    Call {
        function: StringId,
        args: Vec<Expression>,
    },

    Paren(Box<Expression>),
}
