pub mod compiler_messages {
    pub mod compiler_dev_logging;
    pub mod compiler_errors;
    pub mod display_messages;
}
pub use compiler_messages::compiler_errors;
pub use compiler_messages::display_messages;

pub mod string_interning;

pub mod syntax {
    pub mod syntax_nodes;
}

pub mod shader_ir {
    pub mod ir_datatypes;
    pub mod ir_display;
    pub mod ir_nodes;
}

pub mod lowering;

use crate::compiler_frontend::compiler_errors::CompilerMessages;
use crate::compiler_frontend::lowering::statement_lowerer::{LoweredModule, lower_module};
use crate::compiler_frontend::string_interning::StringTable;
use crate::compiler_frontend::syntax::syntax_nodes::FunctionDefinition;
use crate::settings::Config;

/// Owns the string table for one shader module and runs its lowering.
pub struct ShaderFrontend<'a> {
    pub(crate) project_config: &'a Config,
    pub string_table: StringTable,
}

impl<'a> ShaderFrontend<'a> {
    pub fn new(project_config: &'a Config, string_table: StringTable) -> Self {
        Self {
            project_config,
            string_table,
        }
    }

    /// -----------------------------
    /// SHADER IR LOWERING
    /// -----------------------------
    /// Every function is validated against the shapes shader backends can express
    /// and lowered to the flat shader IR. Diagnostics from all functions are returned together.
    pub fn lower_functions(
        &self,
        functions: &[FunctionDefinition],
    ) -> Result<LoweredModule, CompilerMessages> {
        lower_module(functions, &self.string_table, self.project_config)
    }
}
