use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lowering::assignment_lowering::TargetDeclaration;
use crate::compiler_frontend::lowering::expression_lowering::constant_fits;
use crate::compiler_frontend::lowering::scope::{Constant, Scope, Variable};
use crate::compiler_frontend::lowering::statement_lowerer::StatementLowerer;
use crate::compiler_frontend::lowering::statement_lowering::MIXED_VALUE_CONTEXT;
use crate::compiler_frontend::shader_ir::ir_nodes::{IrExpression, IrStatement};
use crate::compiler_frontend::syntax::syntax_nodes::{
    Declaration, DeclarationKind, Expression, ExpressionKind, TextLocation,
};
use crate::{return_rule_error, return_type_error};

impl StatementLowerer<'_> {
    pub(super) fn lower_declaration(
        &mut self,
        scope: &mut Scope<'_>,
        declaration: &Declaration,
        location: TextLocation,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        match declaration.kind {
            DeclarationKind::Var => self.lower_var_declaration(scope, declaration, location),
            DeclarationKind::Const => {
                self.lower_const_declaration(scope, declaration, location)?;
                Ok(Vec::new())
            }
        }
    }

    fn lower_var_declaration(
        &mut self,
        scope: &mut Scope<'_>,
        declaration: &Declaration,
        location: TextLocation,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        // `var a, b T` only declares. Shader locals start zeroed.
        if declaration.values.is_empty() {
            let Some(ty) = declaration.data_type else {
                return_rule_error!("missing type or initializer in var declaration", location);
            };

            for name in &declaration.names {
                scope.declare(Variable::named(*name, Some(ty)));
            }

            return Ok(Vec::new());
        }

        if declaration.names.len() != declaration.values.len() && declaration.values.len() != 1 {
            return_rule_error!(MIXED_VALUE_CONTEXT, location);
        }

        let targets: Vec<Expression> = declaration
            .names
            .iter()
            .map(|name| Expression::new(ExpressionKind::Identifier(*name), location))
            .collect();

        let target_declaration = match declaration.data_type {
            Some(ty) => TargetDeclaration::Typed(ty),
            None => TargetDeclaration::Inferred,
        };

        self.assign_targets(
            scope,
            location,
            &targets,
            &declaration.values,
            target_declaration,
        )
    }

    /// Constants never reach the IR. They're folded wherever they're read.
    fn lower_const_declaration(
        &mut self,
        scope: &mut Scope<'_>,
        declaration: &Declaration,
        location: TextLocation,
    ) -> Result<(), CompilerError> {
        if declaration.names.len() != declaration.values.len() {
            return_rule_error!(
                format!(
                    "const declaration has {} names but {} values",
                    declaration.names.len(),
                    declaration.values.len()
                ),
                location
            );
        }

        if let Some(ty) = declaration.data_type {
            if !ty.is_numeric_scalar() {
                return_type_error!(format!("invalid constant type {ty}"), location, {
                    ExpectedType => "int or float",
                });
            }
        }

        for (name, value) in declaration.names.iter().zip(&declaration.values) {
            let lowered = self.expressions.lower_expression(scope, value)?;

            let ([number], true) = (lowered.values.as_slice(), lowered.prelude.is_empty()) else {
                return_rule_error!("const initializer is not a constant", value.location);
            };
            let IrExpression::Number { value: constant, .. } = number else {
                return_rule_error!("const initializer is not a constant", value.location);
            };

            let constant = match declaration.data_type {
                Some(ty) => {
                    if !constant_fits(number, ty) {
                        return_type_error!(
                            format!("constant {constant} does not fit in {ty}"),
                            value.location
                        );
                    }
                    constant.converted_to(ty)
                }
                None => *constant,
            };

            scope.declare_constant(Constant {
                name: *name,
                ty: declaration.data_type,
                value: constant,
            });
        }

        Ok(())
    }
}
