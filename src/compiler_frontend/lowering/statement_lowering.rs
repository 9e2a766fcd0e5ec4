//! Statement dispatch.
//!
//! Each source statement lowers to zero or more IR statements in the current scope.
//! Loops and ifs live in their own files since most of their code is shape validation.

mod for_loop_lowering;
mod if_lowering;

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lowering::expression_lowering::{
    check_operator, is_assignable, reconcile_operand_types,
};
use crate::compiler_frontend::lowering::scope::Scope;
use crate::compiler_frontend::lowering::statement_lowerer::StatementLowerer;
use crate::compiler_frontend::shader_ir::ir_datatypes::ShaderType;
use crate::compiler_frontend::shader_ir::ir_nodes::{
    BinOp, ConstType, ConstValue, IrExpression, IrStatement,
};
use crate::compiler_frontend::syntax::syntax_nodes::{
    AssignToken, Expression, IncDecToken, Statement, StatementKind, TextLocation,
};
use crate::{return_rule_error, return_syntax_error, return_type_error};

pub(super) const MIXED_VALUE_CONTEXT: &str =
    "single-value context and multiple-value context cannot be mixed";

impl StatementLowerer<'_> {
    /// Lowers one statement into `scope`.
    ///
    /// `in_params` are the enclosing function's input parameter types. Output slot `i`
    /// is the local right after them.
    ///
    /// On Err the caller must drop anything it already collected for this function.
    pub fn lower_statement(
        &mut self,
        scope: &mut Scope<'_>,
        statement: &Statement,
        in_params: &[ShaderType],
    ) -> Result<Vec<IrStatement>, CompilerError> {
        let location = statement.location;

        match &statement.kind {
            StatementKind::Assign {
                targets,
                token,
                values,
            } => self.lower_assign_statement(scope, targets, *token, values, location),

            StatementKind::IncDec { target, token } => {
                self.lower_inc_dec(scope, target, *token, location)
            }

            StatementKind::Block(statements) => {
                let block = self.lower_block(scope, statements, in_params, location)?;
                Ok(vec![IrStatement::Block(block.ir)])
            }

            StatementKind::Declaration(declaration) => {
                self.lower_declaration(scope, declaration, location)
            }

            StatementKind::For(for_statement) => {
                self.lower_for_statement(scope, for_statement, in_params, location)
            }

            StatementKind::If(if_statement) => {
                self.lower_if_statement(scope, if_statement, in_params, location)
            }

            StatementKind::Return(results) => {
                self.lower_return(scope, results, in_params, location)
            }

            StatementKind::Expression(expression) => {
                self.lower_expression_statement(scope, expression)
            }

            StatementKind::Unsupported(description) => {
                return_syntax_error!(format!("unexpected statement: {description}"), location)
            }
        }
    }

    fn lower_assign_statement(
        &mut self,
        scope: &mut Scope<'_>,
        targets: &[Expression],
        token: AssignToken,
        values: &[Expression],
        location: TextLocation,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        match token {
            AssignToken::Define | AssignToken::Assign => {
                if targets.len() != values.len() && values.len() != 1 {
                    return_rule_error!(MIXED_VALUE_CONTEXT, location);
                }

                self.assign(
                    scope,
                    location,
                    targets,
                    values,
                    token == AssignToken::Define,
                )
            }

            _ => {
                let Some(op) = token.compound_operator() else {
                    return_syntax_error!(format!("unexpected token: {token}"), location);
                };

                self.lower_compound_assign(scope, targets, op, values, location)
            }
        }
    }

    /// `x op= y` becomes `x = x op y`.
    /// The right side is lowered first so its hoisted statements come first.
    fn lower_compound_assign(
        &mut self,
        scope: &mut Scope<'_>,
        targets: &[Expression],
        op: BinOp,
        values: &[Expression],
        location: TextLocation,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        let ([target], [value]) = (targets, values) else {
            return_rule_error!(MIXED_VALUE_CONTEXT, location);
        };

        let rhs = self.expressions.lower_expression(scope, value)?;
        let mut statements = rhs.prelude;

        let lhs = self.expressions.lower_expression(scope, target)?;
        statements.extend(lhs.prelude);

        let (target_index, target_type) = self.assignment_target(scope, &lhs.values, target.location)?;

        let ([rhs_value], [rhs_type]) = (rhs.values.as_slice(), rhs.types.as_slice()) else {
            return_rule_error!(MIXED_VALUE_CONTEXT, value.location);
        };

        // Same operator rules as `target op value`, and the result has to fit back in the target
        if let Some(target_type) = target_type {
            let operand_type = reconcile_operand_types(
                op,
                &IrExpression::LocalVariable(target_index),
                target_type,
                rhs_value,
                *rhs_type,
            );

            if operand_type != Some(target_type) {
                return_type_error!(
                    format!("invalid operation: mismatched types {target_type} and {rhs_type}"),
                    location
                );
            }

            check_operator(op, target_type, location)?;
        }

        let rhs_value = match target_type {
            Some(ty) => rhs_value.clone().with_resolved_const_type(ty),
            None => rhs_value.clone(),
        };

        statements.push(IrStatement::Assign {
            target: IrExpression::LocalVariable(target_index),
            value: IrExpression::binary(op, IrExpression::LocalVariable(target_index), rhs_value),
        });

        Ok(statements)
    }

    fn lower_inc_dec(
        &mut self,
        scope: &mut Scope<'_>,
        target: &Expression,
        token: IncDecToken,
        location: TextLocation,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        let lhs = self.expressions.lower_expression(scope, target)?;
        let mut statements = lhs.prelude;

        let (target_index, target_type) = self.assignment_target(scope, &lhs.values, target.location)?;

        if target_type == Some(ShaderType::Bool) {
            return_type_error!("invalid operation: ++ and -- are not defined on bool", location, {
                ExpectedType => "int or float",
                FoundType => "bool",
            });
        }

        let op = match token {
            IncDecToken::Inc => BinOp::Add,
            IncDecToken::Dec => BinOp::Sub,
        };

        let mut one = IrExpression::number(ConstValue::Int(1), ConstType::Untyped);
        if let Some(ty) = target_type {
            one = one.with_resolved_const_type(ty);
        }

        statements.push(IrStatement::Assign {
            target: IrExpression::LocalVariable(target_index),
            value: IrExpression::binary(op, IrExpression::LocalVariable(target_index), one),
        });

        Ok(statements)
    }

    /// Assigns each result to its output slot, then leaves the function.
    fn lower_return(
        &mut self,
        scope: &mut Scope<'_>,
        results: &[Expression],
        in_params: &[ShaderType],
        location: TextLocation,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        // A lone multi-value result is handled below, so only plain count mismatches fail here
        if let Some(outputs) = &self.function_outputs {
            let single_multi_value = results.len() == 1 && outputs.len() > 1;
            if !results.is_empty() && results.len() != outputs.len() && !single_multi_value {
                return_rule_error!(
                    format!(
                        "wrong number of return values: expected {}, found {}",
                        outputs.len(),
                        results.len()
                    ),
                    location
                );
            }
        }

        let mut statements = Vec::with_capacity(results.len() + 1);

        for (i, result) in results.iter().enumerate() {
            let lowered = self.expressions.lower_expression(scope, result)?;
            statements.extend(lowered.prelude);

            let value = match lowered.values.len() {
                0 => continue,
                1 => {
                    if let Some(outputs) = &self.function_outputs {
                        if results.len() == 1 && outputs.len() > 1 {
                            return_rule_error!(
                                format!(
                                    "wrong number of return values: expected {}, found 1",
                                    outputs.len()
                                ),
                                location
                            );
                        }
                    }
                    &lowered.values[0]
                }
                _ => {
                    // Reported but not fatal, so later results still get checked
                    self.report(CompilerError::new_unimplemented_error(
                        "multiple-context with return is not implemented yet",
                        result.location,
                    ));
                    continue;
                }
            };

            let slot = in_params.len() + i;
            let slot_type = scope.find_local_variable_by_index(slot).and_then(|v| v.ty);

            let value = match (slot_type, lowered.types.first()) {
                (Some(expected), Some(found)) => {
                    if !is_assignable(expected, value, *found) {
                        return_type_error!(
                            format!("cannot use {found} as {expected} value in return statement"),
                            result.location
                        );
                    }
                    value.clone().with_resolved_const_type(expected)
                }
                _ => value.clone(),
            };

            statements.push(IrStatement::Assign {
                target: IrExpression::LocalVariable(slot),
                value,
            });
        }

        statements.push(IrStatement::Return);
        Ok(statements)
    }

    /// Only calls have an effect, so anything else the expression produces is dropped.
    fn lower_expression_statement(
        &mut self,
        scope: &mut Scope<'_>,
        expression: &Expression,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        let lowered = self.expressions.lower_expression(scope, expression)?;
        let mut statements = lowered.prelude;

        statements.extend(
            lowered
                .values
                .into_iter()
                .filter(IrExpression::is_call)
                .map(IrStatement::ExprStmt),
        );

        Ok(statements)
    }
}
