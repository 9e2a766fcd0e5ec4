//! Expression Lowering
//!
//! Statement lowering only talks to expressions through the `ExpressionLowerer`
//! and `ReturnTypeResolver` traits. `ShaderExpressionLowerer` is the implementation
//! used by `lower_module`; tests can swap in their own.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lowering::scope::{Scope, Variable};
use crate::compiler_frontend::shader_ir::ir_datatypes::ShaderType;
use crate::compiler_frontend::shader_ir::ir_nodes::{
    BinOp, ConstType, ConstValue, FunctionIndex, IrExpression, IrStatement, UnaryOp,
};
use crate::compiler_frontend::string_interning::{StringId, StringTable};
use crate::compiler_frontend::syntax::syntax_nodes::{
    Expression, ExpressionKind, FunctionDefinition, TextLocation,
};
use crate::{return_compiler_error, return_rule_error, return_type_error};
use rustc_hash::FxHashMap;

/// One source expression after lowering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoweredExpression {
    /// Usually one. Zero for calls without outputs, several for multi-output calls.
    pub values: Vec<IrExpression>,

    /// Index-aligned with `values`.
    pub types: Vec<ShaderType>,

    /// Statements that must run before any of the values are used.
    pub prelude: Vec<IrStatement>,
}

pub trait ExpressionLowerer {
    fn lower_expression(
        &self,
        scope: &mut Scope<'_>,
        expression: &Expression,
    ) -> Result<LoweredExpression, CompilerError>;
}

pub trait ReturnTypeResolver {
    /// Declared output types when `expression` is a call to a known function.
    /// None means "use the lowered expression's own types".
    fn function_return_types(
        &self,
        scope: &Scope<'_>,
        expression: &Expression,
    ) -> Option<Vec<ShaderType>>;
}

// ============================================================
// Function Table
// ============================================================
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: StringId,
    pub params: Vec<ShaderType>,
    pub outputs: Vec<ShaderType>,
}

impl FunctionSignature {
    pub fn from_definition(definition: &FunctionDefinition) -> Self {
        FunctionSignature {
            name: definition.name,
            params: definition.params.iter().map(|p| p.data_type).collect(),
            outputs: definition.outputs.iter().map(|p| p.data_type).collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FunctionTable {
    signatures: Vec<FunctionSignature>,
    by_name: FxHashMap<StringId, FunctionIndex>,
}

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable::default()
    }

    pub fn from_definitions(
        definitions: &[FunctionDefinition],
        string_table: &StringTable,
    ) -> Result<Self, CompilerError> {
        let mut table = FunctionTable::new();
        for definition in definitions {
            table.register(
                FunctionSignature::from_definition(definition),
                definition.location,
                string_table,
            )?;
        }
        Ok(table)
    }

    pub fn register(
        &mut self,
        signature: FunctionSignature,
        location: TextLocation,
        string_table: &StringTable,
    ) -> Result<FunctionIndex, CompilerError> {
        if self.by_name.contains_key(&signature.name) {
            return_rule_error!(
                format!(
                    "function {} is already declared",
                    string_table.resolve(signature.name)
                ),
                location
            );
        }

        let index = FunctionIndex(self.signatures.len() as u32);
        self.by_name.insert(signature.name, index);
        self.signatures.push(signature);
        Ok(index)
    }

    pub fn lookup(&self, name: StringId) -> Option<(FunctionIndex, &FunctionSignature)> {
        let index = *self.by_name.get(&name)?;
        self.signatures
            .get(index.0 as usize)
            .map(|signature| (index, signature))
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl ReturnTypeResolver for FunctionTable {
    fn function_return_types(
        &self,
        scope: &Scope<'_>,
        expression: &Expression,
    ) -> Option<Vec<ShaderType>> {
        match &expression.kind {
            ExpressionKind::Paren(inner) => self.function_return_types(scope, inner),
            ExpressionKind::Call { function, .. } => self
                .lookup(*function)
                .map(|(_, signature)| signature.outputs.clone()),
            _ => None,
        }
    }
}

// ============================================================
// Shader Expression Lowerer
// ============================================================
pub struct ShaderExpressionLowerer<'a> {
    functions: &'a FunctionTable,
    string_table: &'a StringTable,
}

impl<'a> ShaderExpressionLowerer<'a> {
    pub fn new(functions: &'a FunctionTable, string_table: &'a StringTable) -> Self {
        ShaderExpressionLowerer {
            functions,
            string_table,
        }
    }

    fn lower_single_value(
        &self,
        scope: &mut Scope<'_>,
        expression: &Expression,
        prelude: &mut Vec<IrStatement>,
    ) -> Result<(IrExpression, ShaderType), CompilerError> {
        let lowered = self.lower_expression(scope, expression)?;
        prelude.extend(lowered.prelude);

        if lowered.values.len() != 1 || lowered.types.len() != 1 {
            return_rule_error!(
                "single-value context and multiple-value context cannot be mixed",
                expression.location
            );
        }

        let value = lowered.values.into_iter().next();
        let ty = lowered.types.into_iter().next();
        match (value, ty) {
            (Some(value), Some(ty)) => Ok((value, ty)),
            _ => return_compiler_error!(
                "expression lowered to an empty value list",
                expression.location
            ),
        }
    }

    fn lower_identifier(
        &self,
        scope: &Scope<'_>,
        name: StringId,
        location: TextLocation,
    ) -> Result<LoweredExpression, CompilerError> {
        if let Some(constant) = scope.find_constant(name) {
            let const_type = match constant.ty {
                Some(ShaderType::Int) => ConstType::Int,
                Some(ShaderType::Float) => ConstType::Float,
                _ => ConstType::Untyped,
            };
            let ty = constant
                .ty
                .unwrap_or_else(|| natural_type(constant.value));

            return Ok(single(
                IrExpression::number(constant.value, const_type),
                ty,
            ));
        }

        let Some((index, variable)) = scope.find_local_variable(name) else {
            return_rule_error!(
                format!("undefined: {}", self.string_table.resolve(name)),
                location
            );
        };

        let Some(ty) = variable.ty else {
            return_compiler_error!(
                format!(
                    "variable {} has no resolved type",
                    self.string_table.resolve(name)
                ),
                location
            );
        };

        Ok(single(IrExpression::LocalVariable(index), ty))
    }

    fn lower_unary(
        &self,
        scope: &mut Scope<'_>,
        op: UnaryOp,
        operand: &Expression,
        location: TextLocation,
    ) -> Result<LoweredExpression, CompilerError> {
        let mut prelude = Vec::new();
        let (value, ty) = self.lower_single_value(scope, operand, &mut prelude)?;

        let value = match op {
            UnaryOp::Neg => {
                if ty == ShaderType::Bool {
                    return_type_error!("operator - not defined on bool", location, {
                        ExpectedType => "numeric",
                        FoundType => "bool",
                    });
                }

                match value {
                    IrExpression::Number {
                        value: constant,
                        const_type,
                    } => {
                        let Some(negated) = constant.negated() else {
                            return_rule_error!(
                                format!("constant -{constant} overflows"),
                                location
                            );
                        };
                        IrExpression::number(negated, const_type)
                    }
                    other => IrExpression::Unary {
                        op,
                        operand: Box::new(other),
                    },
                }
            }

            UnaryOp::Not => {
                if ty != ShaderType::Bool {
                    return_type_error!(format!("operator ! not defined on {ty}"), location, {
                        ExpectedType => "bool",
                    });
                }

                match value {
                    IrExpression::Bool(b) => IrExpression::Bool(!b),
                    other => IrExpression::Unary {
                        op,
                        operand: Box::new(other),
                    },
                }
            }
        };

        Ok(LoweredExpression {
            values: vec![value],
            types: vec![ty],
            prelude,
        })
    }

    fn lower_binary(
        &self,
        scope: &mut Scope<'_>,
        op: BinOp,
        left: &Expression,
        right: &Expression,
        location: TextLocation,
    ) -> Result<LoweredExpression, CompilerError> {
        let mut prelude = Vec::new();
        let (left_value, left_type) = self.lower_single_value(scope, left, &mut prelude)?;
        let (right_value, right_type) = self.lower_single_value(scope, right, &mut prelude)?;

        if op.is_logical() {
            if left_type != ShaderType::Bool || right_type != ShaderType::Bool {
                return_type_error!(
                    format!("operator {op} not defined on {left_type} and {right_type}"),
                    location,
                    { ExpectedType => "bool" }
                );
            }

            return Ok(LoweredExpression {
                values: vec![IrExpression::binary(op, left_value, right_value)],
                types: vec![ShaderType::Bool],
                prelude,
            });
        }

        let operand_type =
            reconcile_operand_types(op, &left_value, left_type, &right_value, right_type)
                .ok_or_else(|| {
                    CompilerError::new_type_error(
                        format!("mismatched types {left_type} and {right_type} for operator {op}"),
                        location,
                    )
                })?;

        check_operator(op, operand_type, location)?;

        let result_type = if op.is_comparison() {
            ShaderType::Bool
        } else {
            operand_type
        };

        let value = match (&left_value, &right_value) {
            (
                IrExpression::Number {
                    value: l,
                    const_type: lt,
                },
                IrExpression::Number {
                    value: r,
                    const_type: rt,
                },
            ) => fold_constants(op, *l, *lt, *r, *rt, location)?,
            _ => IrExpression::binary(op, left_value, right_value),
        };

        Ok(LoweredExpression {
            values: vec![value],
            types: vec![result_type],
            prelude,
        })
    }

    fn lower_call(
        &self,
        scope: &mut Scope<'_>,
        function: StringId,
        args: &[Expression],
        location: TextLocation,
    ) -> Result<LoweredExpression, CompilerError> {
        let Some((function_index, signature)) = self.functions.lookup(function) else {
            return_rule_error!(
                format!(
                    "undefined function: {}",
                    self.string_table.resolve(function)
                ),
                location
            );
        };

        let mut prelude = Vec::new();
        let mut arg_values = Vec::with_capacity(args.len() + signature.outputs.len());
        let mut arg_types = Vec::with_capacity(args.len());
        for arg in args {
            let (value, ty) = self.lower_single_value(scope, arg, &mut prelude)?;
            arg_values.push(value);
            arg_types.push(ty);
        }

        if arg_values.len() != signature.params.len() {
            return_rule_error!(
                format!(
                    "wrong number of arguments in call to {}: expected {}, found {}",
                    self.string_table.resolve(function),
                    signature.params.len(),
                    arg_values.len()
                ),
                location
            );
        }

        let mut resolved_args = Vec::with_capacity(arg_values.len());
        for ((value, found), expected) in arg_values
            .into_iter()
            .zip(arg_types.iter())
            .zip(signature.params.iter())
        {
            let untyped_fits = is_untyped_constant(&value) && constant_fits(&value, *expected);
            if found != expected && !untyped_fits {
                return_type_error!(
                    format!(
                        "cannot use {} as {} value in argument to {}",
                        found,
                        expected,
                        self.string_table.resolve(function)
                    ),
                    location
                );
            }
            resolved_args.push(value.with_resolved_const_type(*expected));
        }

        match signature.outputs.as_slice() {
            [] => {
                // Calls are evaluated where they appear so side effects keep their order
                prelude.push(IrStatement::ExprStmt(IrExpression::Call {
                    function: function_index,
                    args: resolved_args,
                }));
                Ok(LoweredExpression {
                    values: Vec::new(),
                    types: Vec::new(),
                    prelude,
                })
            }

            [output] => Ok(LoweredExpression {
                values: vec![IrExpression::Call {
                    function: function_index,
                    args: resolved_args,
                }],
                types: vec![*output],
                prelude,
            }),

            outputs => {
                // Multiple outputs are written through trailing out-arguments into fresh temporaries
                let mut values = Vec::with_capacity(outputs.len());
                for output in outputs {
                    let index = scope.declare(Variable::temporary(*output));
                    resolved_args.push(IrExpression::LocalVariable(index));
                    values.push(IrExpression::LocalVariable(index));
                }

                prelude.push(IrStatement::ExprStmt(IrExpression::Call {
                    function: function_index,
                    args: resolved_args,
                }));

                Ok(LoweredExpression {
                    values,
                    types: outputs.to_vec(),
                    prelude,
                })
            }
        }
    }
}

impl ExpressionLowerer for ShaderExpressionLowerer<'_> {
    fn lower_expression(
        &self,
        scope: &mut Scope<'_>,
        expression: &Expression,
    ) -> Result<LoweredExpression, CompilerError> {
        let location = expression.location;
        match &expression.kind {
            ExpressionKind::Paren(inner) => self.lower_expression(scope, inner),

            ExpressionKind::IntLiteral(value) => Ok(single(
                IrExpression::number(ConstValue::Int(*value), ConstType::Untyped),
                ShaderType::Int,
            )),

            ExpressionKind::FloatLiteral(value) => Ok(single(
                IrExpression::number(ConstValue::Float(*value), ConstType::Untyped),
                ShaderType::Float,
            )),

            ExpressionKind::BoolLiteral(value) => {
                Ok(single(IrExpression::Bool(*value), ShaderType::Bool))
            }

            ExpressionKind::Identifier(name) => self.lower_identifier(scope, *name, location),

            ExpressionKind::Unary { op, operand } => self.lower_unary(scope, *op, operand, location),

            ExpressionKind::Binary { op, left, right } => {
                self.lower_binary(scope, *op, left, right, location)
            }

            ExpressionKind::Call { function, args } => {
                self.lower_call(scope, *function, args, location)
            }
        }
    }
}

// ============================================================
// Helpers
// ============================================================
fn single(value: IrExpression, ty: ShaderType) -> LoweredExpression {
    LoweredExpression {
        values: vec![value],
        types: vec![ty],
        prelude: Vec::new(),
    }
}

fn natural_type(value: ConstValue) -> ShaderType {
    match value {
        ConstValue::Int(_) => ShaderType::Int,
        ConstValue::Float(_) => ShaderType::Float,
    }
}

fn is_untyped_constant(value: &IrExpression) -> bool {
    matches!(
        value,
        IrExpression::Number {
            const_type: ConstType::Untyped,
            ..
        }
    )
}

/// The type both operands are treated as, or None if they can't be combined.
/// Untyped constants take the other operand's scalar type; a float scalar
/// scales vectors and matrices for arithmetic.
pub(crate) fn reconcile_operand_types(
    op: BinOp,
    left_value: &IrExpression,
    left_type: ShaderType,
    right_value: &IrExpression,
    right_type: ShaderType,
) -> Option<ShaderType> {
    if left_type == right_type {
        return Some(left_type);
    }

    let left_untyped = is_untyped_constant(left_value);
    let right_untyped = is_untyped_constant(right_value);

    if left_untyped && right_untyped {
        // Untyped int and float constants combine as float
        return Some(ShaderType::Float);
    }

    if left_untyped && constant_fits(left_value, right_type) {
        return Some(right_type);
    }

    if right_untyped && constant_fits(right_value, left_type) {
        return Some(left_type);
    }

    let scales = !op.is_comparison() && op != BinOp::Mod;
    match (left_type, right_type) {
        (ShaderType::Float, vector) | (vector, ShaderType::Float) if scales && is_float_vector(vector) => {
            Some(vector)
        }
        _ => None,
    }
}

/// Rejects operators that aren't defined on the reconciled operand type.
/// Shared by binary expressions and compound assignment.
pub(crate) fn check_operator(
    op: BinOp,
    operand_type: ShaderType,
    location: TextLocation,
) -> Result<(), CompilerError> {
    if op == BinOp::Mod && operand_type != ShaderType::Int {
        return_type_error!(
            format!("operator % not defined on {operand_type}"),
            location,
            { ExpectedType => "int" }
        );
    }

    if operand_type == ShaderType::Bool && !matches!(op, BinOp::Eq | BinOp::Ne) {
        return_type_error!(
            format!("operator {op} not defined on bool"),
            location,
            { ExpectedType => "int or float" }
        );
    }

    Ok(())
}

/// Whether a value of `value_type` can be stored in a place of `target_type`.
pub fn is_assignable(target_type: ShaderType, value: &IrExpression, value_type: ShaderType) -> bool {
    target_type == value_type || (is_untyped_constant(value) && constant_fits(value, target_type))
}

fn is_float_vector(ty: ShaderType) -> bool {
    !ty.is_numeric_scalar() && ty != ShaderType::Bool
}

pub(crate) fn constant_fits(value: &IrExpression, target: ShaderType) -> bool {
    let IrExpression::Number { value, .. } = value else {
        return false;
    };

    match (value, target) {
        (ConstValue::Int(_), ShaderType::Int | ShaderType::Float) => true,
        (ConstValue::Float(f), ShaderType::Int) => {
            // i64::MAX rounds up to 2^63 as a float, which itself is out of range
            f.is_finite() && f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64
        }
        (ConstValue::Float(_), ShaderType::Float) => true,
        _ => false,
    }
}

fn fold_constants(
    op: BinOp,
    left: ConstValue,
    left_type: ConstType,
    right: ConstValue,
    right_type: ConstType,
    location: TextLocation,
) -> Result<IrExpression, CompilerError> {
    let const_type = match (left_type, right_type) {
        (ConstType::Untyped, other) | (other, ConstType::Untyped) => other,
        (left_type, _) => left_type,
    };

    if let Some(comparison) = fold_comparison(op, left, right) {
        return Ok(IrExpression::Bool(comparison));
    }

    let folded = match (left, right) {
        (ConstValue::Int(l), ConstValue::Int(r)) if const_type != ConstType::Float => {
            if matches!(op, BinOp::Div | BinOp::Mod) && r == 0 {
                return_rule_error!("invalid operation: division by zero", location);
            }

            let result = match op {
                BinOp::Add => l.checked_add(r),
                BinOp::Sub => l.checked_sub(r),
                BinOp::Mul => l.checked_mul(r),
                BinOp::Div => l.checked_div(r),
                BinOp::Mod => l.checked_rem(r),
                _ => None,
            };

            match result {
                Some(value) => ConstValue::Int(value),
                None => return_rule_error!(
                    format!("constant {l} {op} {r} overflows"),
                    location
                ),
            }
        }

        (l, r) => {
            let (l, r) = (l.as_f64(), r.as_f64());
            if op == BinOp::Div && r == 0.0 {
                return_rule_error!("invalid operation: division by zero", location);
            }

            let value = match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
                _ => {
                    return_type_error!(format!("operator {op} not defined on float"), location)
                }
            };
            ConstValue::Float(value)
        }
    };

    Ok(IrExpression::number(folded, const_type))
}

fn fold_comparison(op: BinOp, left: ConstValue, right: ConstValue) -> Option<bool> {
    if !op.is_comparison() {
        return None;
    }

    let ordering = match (left, right) {
        (ConstValue::Int(l), ConstValue::Int(r)) => l.cmp(&r),
        (l, r) => match l.as_f64().partial_cmp(&r.as_f64()) {
            Some(ordering) => ordering,
            // NaN compares unequal to everything
            None => return Some(op == BinOp::Ne),
        },
    };

    let result = match op {
        BinOp::Eq => ordering.is_eq(),
        BinOp::Ne => ordering.is_ne(),
        BinOp::Lt => ordering.is_lt(),
        BinOp::Le => ordering.is_le(),
        BinOp::Gt => ordering.is_gt(),
        BinOp::Ge => ordering.is_ge(),
        _ => return None,
    };
    Some(result)
}
