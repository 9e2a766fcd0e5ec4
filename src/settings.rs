use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorMetaDataKey, ErrorType};
use crate::compiler_frontend::syntax::syntax_nodes::TextLocation;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "glint.toml";

// Rough guesses to avoid a few early reallocations.
// Shader sources are small, so these stay low.
pub const MINIMUM_STRING_TABLE_CAPACITY: usize = 32;
pub const STATEMENTS_PER_BLOCK_CAPACITY: usize = 8;

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project_name: String,
    pub lowering: LoweringSettings,
}

/// Knobs for the statement lowering stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoweringSettings {
    /// Deepest allowed block nesting. Lowering is recursive, so this bounds the stack.
    pub max_nesting_depth: usize,

    /// Lower the functions of a module on the rayon thread pool.
    pub parallel: bool,
}

impl Default for LoweringSettings {
    fn default() -> Self {
        LoweringSettings {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            parallel: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            project_name: String::from("shader"),
            lowering: LoweringSettings::default(),
        }
    }
}

impl Config {
    /// Reads a `glint.toml` file. Every key is optional.
    pub fn load(path: &Path) -> Result<Config, CompilerError> {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                let mut error = CompilerError::new(
                    format!("Can't read config file '{}': {e}", path.display()),
                    TextLocation::default(),
                    ErrorType::File,
                );
                error.new_metadata_entry(ErrorMetaDataKey::CompilationStage, "Config Loading");
                return Err(error);
            }
        };

        Self::from_toml_str(&source)
    }

    pub fn from_toml_str(source: &str) -> Result<Config, CompilerError> {
        let config: Config = match toml::from_str(source) {
            Ok(config) => config,
            Err(e) => {
                let mut error = CompilerError::new(
                    format!("Malformed {CONFIG_FILE_NAME}: {e}"),
                    TextLocation::default(),
                    ErrorType::Config,
                );
                error.new_metadata_entry(ErrorMetaDataKey::CompilationStage, "Config Loading");
                return Err(error);
            }
        };

        if config.lowering.max_nesting_depth == 0 {
            let mut error = CompilerError::new(
                "lowering.max_nesting_depth must be at least 1",
                TextLocation::default(),
                ErrorType::Config,
            );
            error.new_metadata_entry(
                ErrorMetaDataKey::PrimarySuggestion,
                "Remove the key to use the default depth",
            );
            return Err(error);
        }

        Ok(config)
    }
}
