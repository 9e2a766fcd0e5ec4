//! Statement Lowerer
//!
//! Lowers the parsed statement tree of each shader function into the flat shader IR.
//!
//! This stage:
//! - Validates for-loops and ifs against the canonical shapes shader backends accept
//! - Resolves single and multi-value assignments
//! - Resolves untyped numeric constants against their targets
//! - Desugars compound assignment and ++/--
//!
//! This stage does NOT:
//! - Parse source text
//! - Generate shader source from the IR

use crate::compiler_frontend::compiler_errors::{CompilerError, CompilerMessages};
use crate::compiler_frontend::lowering::expression_lowering::{
    ExpressionLowerer, FunctionTable, ReturnTypeResolver, ShaderExpressionLowerer,
};
use crate::compiler_frontend::lowering::scope::{Scope, Variable};
use crate::compiler_frontend::shader_ir::ir_datatypes::ShaderType;
use crate::compiler_frontend::shader_ir::ir_nodes::{BlockLocal, IrBlock};
use crate::compiler_frontend::string_interning::{StringId, StringTable};
use crate::compiler_frontend::syntax::syntax_nodes::{
    FunctionDefinition, Statement, TextLocation,
};
use crate::settings::{Config, LoweringSettings, STATEMENTS_PER_BLOCK_CAPACITY};
use crate::{ir_log, return_rule_error, timer_log};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;

// -----------
// Entry Point
// -----------
/// Lowers every function in the module.
/// Functions are independent, so they're lowered in parallel unless the config says otherwise.
pub fn lower_module(
    functions: &[FunctionDefinition],
    string_table: &StringTable,
    config: &Config,
) -> Result<LoweredModule, CompilerMessages> {
    let time = Instant::now();

    let function_table = match FunctionTable::from_definitions(functions, string_table) {
        Ok(table) => table,
        Err(error) => {
            return Err(CompilerMessages {
                errors: vec![error],
            });
        }
    };
    let expressions = ShaderExpressionLowerer::new(&function_table, string_table);

    let lower_one = |definition: &FunctionDefinition| {
        StatementLowerer::new(&expressions, &function_table, string_table, &config.lowering)
            .lower_function(definition)
    };

    let results: Vec<Result<LoweredFunction, CompilerMessages>> = if config.lowering.parallel {
        functions.par_iter().map(lower_one).collect()
    } else {
        functions.iter().map(lower_one).collect()
    };

    let mut messages = CompilerMessages::new();
    let mut lowered = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(function) => lowered.push(function),
            Err(function_messages) => messages.extend(function_messages),
        }
    }

    timer_log!(time, "Shader IR lowered in: ");

    if messages.has_errors() {
        return Err(messages);
    }

    Ok(LoweredModule { functions: lowered })
}

// ------------
// Lowered Output
// ------------
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoweredModule {
    pub functions: Vec<LoweredFunction>,
}

impl LoweredModule {
    /// The module as pretty printed JSON for the code generator or for debugging.
    pub fn to_json(&self) -> Result<String, CompilerError> {
        serde_json::to_string_pretty(self).map_err(|error| {
            CompilerError::compiler_error(
                format!("failed to serialize shader IR: {error}"),
                TextLocation::default(),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoweredFunction {
    pub name: StringId,

    /// Input parameters followed by output slots. Body locals start after these.
    pub signature_locals: Vec<BlockLocal>,

    pub body: IrBlock,
}

/// A lowered block together with the variables its scope declared.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredBlock {
    pub ir: IrBlock,
    pub vars: Vec<Variable>,
}

// -----------------------
// Statement Lowerer Context
// -----------------------
//
// One lowerer handles one function at a time.
// Hard failures come back as Err, report-and-continue diagnostics collect in `messages`.
pub struct StatementLowerer<'a> {
    pub(super) expressions: &'a dyn ExpressionLowerer,
    pub(super) return_types: &'a dyn ReturnTypeResolver,
    pub(super) string_table: &'a StringTable,
    pub(super) settings: &'a LoweringSettings,

    pub(super) messages: CompilerMessages,
    block_depth: usize,

    /// Output types of the function being lowered. None when lowering loose statements.
    pub(super) function_outputs: Option<Vec<ShaderType>>,
}

impl<'a> StatementLowerer<'a> {
    pub fn new(
        expressions: &'a dyn ExpressionLowerer,
        return_types: &'a dyn ReturnTypeResolver,
        string_table: &'a StringTable,
        settings: &'a LoweringSettings,
    ) -> StatementLowerer<'a> {
        StatementLowerer {
            expressions,
            return_types,
            string_table,
            settings,
            messages: CompilerMessages::new(),
            block_depth: 0,
            function_outputs: None,
        }
    }

    /// Lowers one function body.
    ///
    /// The root scope holds the input parameters then the output slots, so `return`
    /// can assign output `i` to local `params.len() + i`.
    pub fn lower_function(
        &mut self,
        definition: &FunctionDefinition,
    ) -> Result<LoweredFunction, CompilerMessages> {
        let mut root = Scope::new_root();
        for parameter in definition.params.iter().chain(definition.outputs.iter()) {
            root.declare(Variable {
                name: parameter.name,
                ty: Some(parameter.data_type),
                is_loop_counter: false,
            });
        }

        let in_params: Vec<ShaderType> = definition.params.iter().map(|p| p.data_type).collect();
        self.function_outputs = Some(definition.outputs.iter().map(|p| p.data_type).collect());

        let result = self.lower_block(&root, &definition.body, &in_params, definition.location);
        self.function_outputs = None;

        // Anything reported along the way invalidates the function, even if the body lowered
        let mut messages = std::mem::take(&mut self.messages);
        let block = match result {
            Ok(block) => block,
            Err(error) => {
                messages.report(error);
                return Err(messages);
            }
        };

        if messages.has_errors() {
            return Err(messages);
        }

        ir_log!(
            "[IR] ",
            Blue {self.string_table.resolve(definition.name)},
            "\n",
            {block.ir.to_string()}
        );

        Ok(LoweredFunction {
            name: definition.name,
            signature_locals: root.vars().iter().map(Variable::as_block_local).collect(),
            body: block.ir,
        })
    }

    /// Lowers a statement list in a new child scope of `outer`.
    pub fn lower_block(
        &mut self,
        outer: &Scope<'_>,
        statements: &[Statement],
        in_params: &[ShaderType],
        location: TextLocation,
    ) -> Result<LoweredBlock, CompilerError> {
        if self.block_depth >= self.settings.max_nesting_depth {
            return_rule_error!(
                format!(
                    "blocks are nested more than {} levels deep",
                    self.settings.max_nesting_depth
                ),
                location,
                {
                    PrimarySuggestion => "Move some of this logic into a separate function",
                }
            );
        }

        self.block_depth += 1;
        let result = self.lower_block_statements(outer, statements, in_params);
        self.block_depth -= 1;

        result
    }

    fn lower_block_statements(
        &mut self,
        outer: &Scope<'_>,
        statements: &[Statement],
        in_params: &[ShaderType],
    ) -> Result<LoweredBlock, CompilerError> {
        let mut scope = Scope::child_of(outer);
        let local_var_index_offset = scope.index_offset();

        let mut ir_statements = Vec::with_capacity(STATEMENTS_PER_BLOCK_CAPACITY);
        for statement in statements {
            let lowered = self.lower_statement(&mut scope, statement, in_params)?;
            ir_statements.extend(lowered);
        }

        let vars = scope.into_variables();
        Ok(LoweredBlock {
            ir: IrBlock {
                local_vars: vars.iter().map(Variable::as_block_local).collect(),
                local_var_index_offset,
                statements: ir_statements,
            },
            vars,
        })
    }

    /// Records a diagnostic without stopping the current statement.
    pub(super) fn report(&mut self, error: CompilerError) {
        self.messages.report(error);
    }

    /// Diagnostics reported so far for the function being lowered.
    pub fn messages(&self) -> &CompilerMessages {
        &self.messages
    }
}
