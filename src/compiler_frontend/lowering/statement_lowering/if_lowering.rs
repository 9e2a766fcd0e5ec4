use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lowering::scope::Scope;
use crate::compiler_frontend::lowering::statement_lowerer::StatementLowerer;
use crate::compiler_frontend::shader_ir::ir_datatypes::{ShaderType, join_types};
use crate::compiler_frontend::shader_ir::ir_nodes::IrStatement;
use crate::compiler_frontend::syntax::syntax_nodes::{
    ElseBranch, IfStatement, Statement, StatementKind, TextLocation,
};
use crate::return_type_error;

impl StatementLowerer<'_> {
    pub(super) fn lower_if_statement(
        &mut self,
        scope: &mut Scope<'_>,
        if_statement: &IfStatement,
        in_params: &[ShaderType],
        location: TextLocation,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        // `if init; cond { ... }` is lowered as `{ init; if cond { ... } }`
        if let Some(init) = &if_statement.init {
            let without_init = Statement::new(
                StatementKind::If(IfStatement {
                    init: None,
                    ..if_statement.clone()
                }),
                location,
            );

            let statements = [init.as_ref().clone(), without_init];
            let block = self.lower_block(scope, &statements, in_params, location)?;
            return Ok(vec![IrStatement::Block(block.ir)]);
        }

        let condition = self
            .expressions
            .lower_expression(scope, &if_statement.condition)?;

        let ([value], [ShaderType::Bool]) = (condition.values.as_slice(), condition.types.as_slice())
        else {
            return_type_error!(
                format!(
                    "if-condition must be bool but: {}",
                    join_types(&condition.types)
                ),
                if_statement.condition.location,
                { ExpectedType => "bool" }
            );
        };
        let condition_value = value.clone();
        let mut statements = condition.prelude;

        let then_block = self.lower_block(scope, &if_statement.then_body, in_params, location)?;

        // `else if` is a block holding just that if
        let else_block = match &if_statement.else_branch {
            None => None,
            Some(ElseBranch::Block(body)) => {
                Some(self.lower_block(scope, body, in_params, location)?.ir)
            }
            Some(ElseBranch::If(nested)) => Some(
                self.lower_block(scope, std::slice::from_ref(nested.as_ref()), in_params, location)?
                    .ir,
            ),
        };

        statements.push(IrStatement::If {
            condition: condition_value,
            then_block: then_block.ir,
            else_block,
        });

        Ok(statements)
    }
}
