use crate::compiler_frontend::compiler_errors::CompilerError;
use crate::compiler_frontend::lowering::scope::Scope;
use crate::compiler_frontend::lowering::statement_lowerer::StatementLowerer;
use crate::compiler_frontend::shader_ir::ir_datatypes::ShaderType;
use crate::compiler_frontend::shader_ir::ir_nodes::{
    BinOp, ComparisonOp, ConstValue, ForLoop, IrBlock, IrExpression, IrStatement,
};
use crate::compiler_frontend::syntax::syntax_nodes::{
    Expression, ForStatement, Statement, TextLocation,
};
use crate::{return_compiler_error, return_rule_error, return_syntax_error, return_type_error};

const FOR_STATEMENT_FORMAT: &str = "for-statement must follow this format: for (varname) := (constant); (varname) (op) (constant); (varname) (op) (constant) { ...";

/// The validated `for` header: `counter := init; counter op end; counter += delta`
struct LoopHeader {
    counter_index: usize,
    counter_type: ShaderType,
    init: ConstValue,
    end: ConstValue,
    op: ComparisonOp,
    delta: ConstValue,
}

impl StatementLowerer<'_> {
    /// Shader backends need loop trip counts known at compile time, so only the
    /// constant counted form is accepted. Each check below rejects with its own
    /// diagnostic, in order, and the first failure wins.
    pub(super) fn lower_for_statement(
        &mut self,
        scope: &mut Scope<'_>,
        for_statement: &ForStatement,
        in_params: &[ShaderType],
        location: TextLocation,
    ) -> Result<Vec<IrStatement>, CompilerError> {
        let (Some(init), Some(condition), Some(post)) = (
            for_statement.init.as_deref(),
            for_statement.condition.as_ref(),
            for_statement.post.as_deref(),
        ) else {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        };

        // The counter is resolved in a pseudo-scope so sibling loops can reuse its name.
        // Only the counter itself survives, promoted once everything is validated.
        let (header, body, counter) = {
            let mut pseudo = Scope::child_of(scope);

            let (counter_index, counter_type, init) =
                self.canonical_init(&mut pseudo, init, in_params, location)?;
            let (op, end) =
                self.canonical_condition(&mut pseudo, condition, counter_index, location)?;
            let delta = self.canonical_post(&mut pseudo, post, counter_index, in_params, location)?;

            let body = self.lower_block(&pseudo, &for_statement.body, in_params, location)?;

            let Some(counter) = pseudo.into_variables().into_iter().next() else {
                return_compiler_error!("loop counter disappeared from its pseudo-scope", location);
            };

            let header = LoopHeader {
                counter_index,
                counter_type,
                init: init.converted_to(counter_type),
                end: end.converted_to(counter_type),
                op,
                delta: delta.converted_to(counter_type),
            };

            (header, body.ir, counter)
        };

        let promoted_index = scope.promote_loop_counter(counter);
        if promoted_index != header.counter_index {
            return_compiler_error!(
                format!(
                    "loop counter moved from local {} to {} when promoted",
                    header.counter_index, promoted_index
                ),
                location
            );
        }

        Ok(vec![IrStatement::For(ForLoop {
            body: unwrap_nested_blocks(body),
            counter_type: header.counter_type,
            counter_index: header.counter_index,
            init: header.init,
            end: header.end,
            op: header.op,
            delta: header.delta,
        })])
    }

    /// `counter := constant`, declaring the pseudo-scope's only variable.
    fn canonical_init(
        &mut self,
        pseudo: &mut Scope<'_>,
        init: &Statement,
        in_params: &[ShaderType],
        location: TextLocation,
    ) -> Result<(usize, ShaderType, ConstValue), CompilerError> {
        let statements = self.lower_statement(pseudo, init, in_params)?;

        let [IrStatement::Assign { target, value }] = statements.as_slice() else {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        };

        // A plain `=` would reuse an outer variable and declare nothing here
        let Some(counter_index) = target.as_local_variable() else {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        };
        if pseudo.vars().len() != 1 || counter_index != pseudo.index_offset() {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        }

        let IrExpression::Number { value: init, .. } = value else {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        };

        let Some(counter_type) = pseudo.vars()[0].ty else {
            return_compiler_error!("loop counter was declared without a type", location);
        };

        Ok((counter_index, counter_type, *init))
    }

    /// `counter op constant`
    fn canonical_condition(
        &mut self,
        pseudo: &mut Scope<'_>,
        condition: &Expression,
        counter_index: usize,
        location: TextLocation,
    ) -> Result<(ComparisonOp, ConstValue), CompilerError> {
        let lowered = self.expressions.lower_expression(pseudo, condition)?;

        let [value] = lowered.values.as_slice() else {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        };

        if lowered.types != [ShaderType::Bool] {
            return_type_error!("for-statement's condition must be bool", condition.location, {
                ExpectedType => "bool",
            });
        }

        if !lowered.prelude.is_empty() {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        }

        let IrExpression::Binary { op, left, right } = value else {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        };

        let Ok(op) = ComparisonOp::try_from(*op) else {
            return_syntax_error!(
                "for-statement's condition must have one of these operators: <, <=, >, >=, ==, !=",
                condition.location
            );
        };

        if left.as_local_variable() != Some(counter_index) {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        }

        let IrExpression::Number { value: end, .. } = **right else {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        };

        Ok((op, end))
    }

    /// `counter += constant` or `counter -= constant` (including ++ and --).
    /// Returns the additive step, so subtraction comes back negated.
    fn canonical_post(
        &mut self,
        pseudo: &mut Scope<'_>,
        post: &Statement,
        counter_index: usize,
        in_params: &[ShaderType],
        location: TextLocation,
    ) -> Result<ConstValue, CompilerError> {
        let statements = self.lower_statement(pseudo, post, in_params)?;

        let [IrStatement::Assign { target, value }] = statements.as_slice() else {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        };

        if target.as_local_variable() != Some(counter_index) {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        }

        let IrExpression::Binary { op, left, right } = value else {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        };

        if left.as_local_variable() != Some(counter_index) {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        }

        let IrExpression::Number { value: step, .. } = **right else {
            return_syntax_error!(FOR_STATEMENT_FORMAT, location);
        };

        match op {
            BinOp::Add => Ok(step),
            BinOp::Sub => match step.negated() {
                Some(delta) => Ok(delta),
                None => return_rule_error!(format!("loop step -{step} overflows"), post.location),
            },
            _ => return_syntax_error!(
                "for-statement's post statement must have one of these operators: +=, -=, ++, --",
                post.location
            ),
        }
    }
}

/// Collapses `{ { ... } }` bodies down to the innermost block.
fn unwrap_nested_blocks(mut body: IrBlock) -> IrBlock {
    loop {
        if body.statements.len() != 1 || !body.local_vars.is_empty() {
            return body;
        }

        match body.statements.pop() {
            Some(IrStatement::Block(inner)) => body = inner,
            Some(other) => {
                body.statements.push(other);
                return body;
            }
            None => return body,
        }
    }
}
