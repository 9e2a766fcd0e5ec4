//! Assignment Resolver
//!
//! Turns `targets = values` and `targets := values` into IR `Assign` statements.
//!
//! Two shapes are accepted:
//! - one value per target (`a, b = x, y`)
//! - one multi-value expression feeding every target (`a, b := f()`)
//!
//! Untyped numeric constants are tagged int or float from the type of the
//! variable they end up in.

use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lowering::expression_lowering::is_assignable;
use crate::compiler_frontend::lowering::scope::{Scope, Variable};
use crate::compiler_frontend::lowering::statement_lowerer::StatementLowerer;
use crate::compiler_frontend::lowering::statement_lowering::MIXED_VALUE_CONTEXT;
use crate::compiler_frontend::shader_ir::ir_datatypes::ShaderType;
use crate::compiler_frontend::shader_ir::ir_nodes::{IrExpression, IrStatement};
use crate::compiler_frontend::syntax::syntax_nodes::{Expression, TextLocation};
use crate::{return_compiler_error, return_rule_error, return_syntax_error, return_type_error};

/// How assignment targets come into existence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum TargetDeclaration {
    /// `=`: targets already exist.
    Existing,

    /// `:=` and untyped `var`: each target is declared with its value's type.
    Inferred,

    /// `var a, b T = ...`
    Typed(ShaderType),
}

/// A resolved `target = value` waiting to be emitted.
struct PendingAssign {
    target: usize,
    target_type: Option<ShaderType>,
    value: IrExpression,
}

impl StatementLowerer<'_> {
    /// Lowers `targets = values`, declaring the targets first when `is_declaration` is set.
    ///
    /// Callers have already checked that the arity is either equal or a single value.
    pub fn assign(
        &mut self,
        scope: &mut Scope<'_>,
        location: TextLocation,
        targets: &[Expression],
        values: &[Expression],
        is_declaration: bool,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        let declaration = if is_declaration {
            TargetDeclaration::Inferred
        } else {
            TargetDeclaration::Existing
        };

        self.assign_targets(scope, location, targets, values, declaration)
    }

    pub(super) fn assign_targets(
        &mut self,
        scope: &mut Scope<'_>,
        location: TextLocation,
        targets: &[Expression],
        values: &[Expression],
        declaration: TargetDeclaration,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        if targets.len() == values.len() {
            return self.assign_each(scope, targets, values, declaration);
        }

        match values {
            [value] => self.assign_from_multi_value(scope, location, targets, value, declaration),
            _ => return_rule_error!(MIXED_VALUE_CONTEXT, location),
        }
    }

    /// `a, b = x, y`
    ///
    /// Every value is evaluated before any target is written. A value that reads a
    /// target written earlier in the same statement is staged through a temporary,
    /// so `a, b = b, a` swaps.
    fn assign_each(
        &mut self,
        scope: &mut Scope<'_>,
        targets: &[Expression],
        values: &[Expression],
        declaration: TargetDeclaration,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        let mut statements = Vec::new();
        let mut lowered_values = Vec::with_capacity(values.len());

        // Values are lowered before any target is declared, so `a, b := 1, a` reads the outer `a`
        for value in values {
            let rhs = self.expressions.lower_expression(scope, value)?;
            statements.extend(rhs.prelude);

            let (rhs_value, rhs_type) = match (rhs.values.as_slice(), rhs.types.as_slice()) {
                ([rhs_value], [rhs_type]) => (rhs_value.clone(), *rhs_type),
                ([], _) => return_rule_error!(
                    "expression has no value and cannot be assigned",
                    value.location
                ),
                _ => return_rule_error!(MIXED_VALUE_CONTEXT, value.location),
            };

            let declared_type = match declaration {
                TargetDeclaration::Existing => None,
                TargetDeclaration::Inferred => {
                    let types = self
                        .return_types
                        .function_return_types(scope, value)
                        .unwrap_or_else(|| vec![rhs_type]);

                    let [declared_type] = types.as_slice() else {
                        return_rule_error!(MIXED_VALUE_CONTEXT, value.location);
                    };
                    Some(*declared_type)
                }
                TargetDeclaration::Typed(ty) => Some(ty),
            };

            lowered_values.push((rhs_value, rhs_type, declared_type));
        }

        if declaration != TargetDeclaration::Existing {
            for (target, (_, _, declared_type)) in targets.iter().zip(&lowered_values) {
                self.declare_target(scope, target, *declared_type)?;
            }
        }

        let mut pending = Vec::with_capacity(targets.len());

        for ((target, value), (rhs_value, rhs_type, _)) in
            targets.iter().zip(values).zip(lowered_values)
        {
            let lhs = self.expressions.lower_expression(scope, target)?;
            statements.extend(lhs.prelude);

            let (target_index, target_type) =
                self.assignment_target(scope, &lhs.values, target.location)?;

            if let Some(target_type) = target_type {
                if !is_assignable(target_type, &rhs_value, rhs_type) {
                    return_type_error!(
                        format!("cannot use {rhs_type} as {target_type} value in assignment"),
                        value.location
                    );
                }
            }

            pending.push(PendingAssign {
                target: target_index,
                target_type,
                value: resolve_constant_type(rhs_value, target_type),
            });
        }

        let written: Vec<usize> = pending.iter().map(|assign| assign.target).collect();
        let mut assignments = Vec::with_capacity(pending.len());

        for (i, assign) in pending.into_iter().enumerate() {
            let clobbered = written[..i].iter().any(|&index| assign.value.reads_local(index));

            if !clobbered {
                assignments.push(IrStatement::Assign {
                    target: IrExpression::LocalVariable(assign.target),
                    value: assign.value,
                });
                continue;
            }

            let Some(temp_type) = assign.target_type else {
                return_compiler_error!(
                    format!("local {} has no type to stage a value through", assign.target),
                    TextLocation::default()
                );
            };

            let temp = scope.declare(Variable::temporary(temp_type));
            statements.push(IrStatement::Assign {
                target: IrExpression::LocalVariable(temp),
                value: assign.value,
            });
            assignments.push(IrStatement::Assign {
                target: IrExpression::LocalVariable(assign.target),
                value: IrExpression::LocalVariable(temp),
            });
        }

        statements.extend(assignments);
        Ok(statements)
    }

    /// `a, b := f()`
    ///
    /// The value is lowered once. A count mismatch between its results and the
    /// targets is reported without stopping, and unmatched targets get no assignment.
    fn assign_from_multi_value(
        &mut self,
        scope: &mut Scope<'_>,
        location: TextLocation,
        targets: &[Expression],
        value: &Expression,
        declaration: TargetDeclaration,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        let rhs = self.expressions.lower_expression(scope, value)?;
        let mut statements = rhs.prelude;

        if rhs.values.len() != targets.len() {
            self.report(CompilerError::new_rule_error(MIXED_VALUE_CONTEXT, location));
        }

        for (i, target) in targets.iter().enumerate() {
            match declaration {
                TargetDeclaration::Existing => {}
                TargetDeclaration::Inferred => {
                    self.declare_target(scope, target, rhs.types.get(i).copied())?;
                }
                TargetDeclaration::Typed(ty) => {
                    self.declare_target(scope, target, Some(ty))?;
                }
            }

            // Already reported above. The target stays declared so later uses resolve.
            let Some(rhs_value) = rhs.values.get(i) else {
                continue;
            };

            let lhs = self.expressions.lower_expression(scope, target)?;
            statements.extend(lhs.prelude);

            let (target_index, target_type) =
                self.assignment_target(scope, &lhs.values, target.location)?;

            if let (Some(target_type), Some(rhs_type)) = (target_type, rhs.types.get(i)) {
                if !is_assignable(target_type, rhs_value, *rhs_type) {
                    return_type_error!(
                        format!("cannot use {rhs_type} as {target_type} value in assignment"),
                        value.location
                    );
                }
            }

            statements.push(IrStatement::Assign {
                target: IrExpression::LocalVariable(target_index),
                value: resolve_constant_type(rhs_value.clone(), target_type),
            });
        }

        Ok(statements)
    }

    fn declare_target(
        &mut self,
        scope: &mut Scope<'_>,
        target: &Expression,
        ty: Option<ShaderType>,
    ) -> Result<usize, CompilerError> {
        let Some(name) = target.as_identifier() else {
            return_syntax_error!("non-name on left side of :=", target.location);
        };

        Ok(scope.declare(Variable::named(name, ty)))
    }

    /// The local a lowered assignment target refers to, and that local's type.
    pub(super) fn assignment_target(
        &self,
        scope: &Scope<'_>,
        lowered: &[IrExpression],
        location: TextLocation,
    ) -> Result<(usize, Option<ShaderType>), CompilerError> {
        let [IrExpression::LocalVariable(index)] = lowered else {
            return_rule_error!("cannot assign to non-variable expression", location);
        };

        let Some(variable) = scope.find_local_variable_by_index(*index) else {
            return_compiler_error!(format!("unexpected local variable index: {index}"), location);
        };

        Ok((*index, variable.ty))
    }
}

/// Untyped constants would be ambiguous to the code generator, so they take the target's type.
fn resolve_constant_type(value: IrExpression, target_type: Option<ShaderType>) -> IrExpression {
    match target_type {
        Some(ty) => value.with_resolved_const_type(ty),
        None => value,
    }
}
