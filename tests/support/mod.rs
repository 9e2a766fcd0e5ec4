//! Builds parsed shader functions for the integration tests.

#![allow(dead_code)]

use glint::compiler_frontend::shader_ir::ir_datatypes::ShaderType;
use glint::compiler_frontend::shader_ir::ir_nodes::BinOp;
use glint::compiler_frontend::string_interning::StringTable;
use glint::compiler_frontend::syntax::syntax_nodes::{
    AssignToken, Expression, ExpressionKind, ForStatement, FunctionDefinition, IncDecToken,
    Parameter, Statement, StatementKind, TextLocation,
};

pub struct SyntaxBuilder {
    pub string_table: StringTable,
    line: i32,
}

impl SyntaxBuilder {
    pub fn new() -> Self {
        SyntaxBuilder {
            string_table: StringTable::new(),
            line: 0,
        }
    }

    fn next_location(&mut self) -> TextLocation {
        self.line += 1;
        TextLocation::new_just_line(self.line)
    }

    pub fn ident(&mut self, name: &str) -> Expression {
        let id = self.string_table.intern(name);
        let location = self.next_location();
        Expression::new(ExpressionKind::Identifier(id), location)
    }

    pub fn int(&mut self, value: i64) -> Expression {
        let location = self.next_location();
        Expression::new(ExpressionKind::IntLiteral(value), location)
    }

    pub fn float(&mut self, value: f64) -> Expression {
        let location = self.next_location();
        Expression::new(ExpressionKind::FloatLiteral(value), location)
    }

    pub fn binary(&mut self, op: BinOp, left: Expression, right: Expression) -> Expression {
        let location = self.next_location();
        Expression::new(
            ExpressionKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            location,
        )
    }

    pub fn call(&mut self, name: &str, args: Vec<Expression>) -> Expression {
        let function = self.string_table.intern(name);
        let location = self.next_location();
        Expression::new(ExpressionKind::Call { function, args }, location)
    }

    pub fn statement(&mut self, kind: StatementKind) -> Statement {
        let location = self.next_location();
        Statement::new(kind, location)
    }

    pub fn assign(
        &mut self,
        token: AssignToken,
        targets: Vec<Expression>,
        values: Vec<Expression>,
    ) -> Statement {
        self.statement(StatementKind::Assign {
            targets,
            token,
            values,
        })
    }

    pub fn define(&mut self, name: &str, value: Expression) -> Statement {
        let target = self.ident(name);
        self.assign(AssignToken::Define, vec![target], vec![value])
    }

    pub fn increment(&mut self, name: &str) -> Statement {
        let target = self.ident(name);
        self.statement(StatementKind::IncDec {
            target,
            token: IncDecToken::Inc,
        })
    }

    pub fn ret(&mut self, results: Vec<Expression>) -> Statement {
        self.statement(StatementKind::Return(results))
    }

    /// `for counter := init; counter op end; counter += step { body }`
    pub fn counted_loop(
        &mut self,
        counter: &str,
        init: i64,
        op: BinOp,
        end: i64,
        step: AssignToken,
        step_size: i64,
        body: Vec<Statement>,
    ) -> Statement {
        let init_value = self.int(init);
        let init = self.define(counter, init_value);

        let counter_read = self.ident(counter);
        let end = self.int(end);
        let condition = self.binary(op, counter_read, end);

        let post_target = self.ident(counter);
        let step_size = self.int(step_size);
        let post = self.assign(step, vec![post_target], vec![step_size]);

        self.statement(StatementKind::For(ForStatement {
            init: Some(Box::new(init)),
            condition: Some(condition),
            post: Some(Box::new(post)),
            body,
        }))
    }

    pub fn param(&mut self, name: &str, data_type: ShaderType) -> Parameter {
        Parameter {
            name: Some(self.string_table.intern(name)),
            data_type,
        }
    }

    pub fn function(
        &mut self,
        name: &str,
        params: Vec<Parameter>,
        outputs: Vec<Parameter>,
        body: Vec<Statement>,
    ) -> FunctionDefinition {
        let name = self.string_table.intern(name);
        let location = self.next_location();
        FunctionDefinition {
            name,
            params,
            outputs,
            body,
            location,
        }
    }
}
