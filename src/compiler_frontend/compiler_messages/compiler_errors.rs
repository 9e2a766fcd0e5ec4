use crate::compiler_frontend::syntax::syntax_nodes::TextLocation;
use std::collections::HashMap;
use std::fmt;

// The final set of errors emitted from lowering.
// Any error in here means the lowered IR must be thrown away.
#[derive(Debug, Default)]
pub struct CompilerMessages {
    pub errors: Vec<CompilerError>,
}

impl CompilerMessages {
    pub fn new() -> Self {
        CompilerMessages { errors: Vec::new() }
    }

    /// Records a diagnostic. Once this is called for a function, that function's
    /// lowering result is invalid even if later statements lower cleanly.
    pub fn report(&mut self, error: CompilerError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn extend(&mut self, other: CompilerMessages) {
        self.errors.extend(other.errors);
    }
}

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum ErrorMetaDataKey {
    CompilationStage,

    // Optional suggestions
    PrimarySuggestion,

    // Data type information
    ExpectedType,
    FoundType,
}

#[derive(Debug, Clone)]
pub struct CompilerError {
    pub msg: String,
    pub location: TextLocation,
    pub error_type: ErrorType,

    // For more structured error output
    pub metadata: HashMap<ErrorMetaDataKey, &'static str>,
}

impl CompilerError {
    pub fn new(
        msg: impl Into<String>,
        location: TextLocation,
        error_type: ErrorType,
    ) -> CompilerError {
        CompilerError {
            msg: msg.into(),
            location,
            error_type,
            metadata: HashMap::new(),
        }
    }

    pub fn new_metadata_entry(&mut self, key: ErrorMetaDataKey, value: &'static str) {
        self.metadata.insert(key, value);
    }

    /// A statement that doesn't fit one of the supported shapes
    pub fn new_syntax_error(msg: impl Into<String>, location: TextLocation) -> Self {
        Self::new(msg, location, ErrorType::Syntax)
    }

    /// Arity and other language rule violations
    pub fn new_rule_error(msg: impl Into<String>, location: TextLocation) -> Self {
        Self::new(msg, location, ErrorType::Rule)
    }

    pub fn new_type_error(msg: impl Into<String>, location: TextLocation) -> Self {
        Self::new(msg, location, ErrorType::Type)
    }

    /// Features the lowering stage knows about but can't handle yet
    pub fn new_unimplemented_error(msg: impl Into<String>, location: TextLocation) -> Self {
        Self::new(msg, location, ErrorType::Unimplemented)
    }

    /// Internal consistency problem (not the user's fault)
    pub fn compiler_error(msg: impl Into<String>, location: TextLocation) -> Self {
        Self::new(msg, location, ErrorType::Compiler)
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error at line {}: {}",
            self.error_type,
            self.location.start_pos.line_number + 1,
            self.msg
        )
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ErrorType {
    Syntax,
    Type,
    Rule,
    Compiler,
    Unimplemented,
    Config,
    File,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorType::Syntax => "Syntax",
            ErrorType::Type => "Type",
            ErrorType::Rule => "Rule",
            ErrorType::Compiler => "Compiler",
            ErrorType::Unimplemented => "Unimplemented",
            ErrorType::Config => "Config",
            ErrorType::File => "File",
        };
        f.write_str(name)
    }
}

/// Returns a new CompilerError for statements that don't match a supported shape.
///
/// Usage:
/// `return_syntax_error!("message", location)`
/// `return_syntax_error!("message", location, { PrimarySuggestion => "..." })`
#[macro_export]
macro_rules! return_syntax_error {
    ($msg:expr, $loc:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $loc,
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Syntax,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $(
                    map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value);
                )*
                map
            },
        })
    };
    ($msg:expr, $loc:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::new_syntax_error(
            $msg, $loc,
        ))
    };
}

/// Returns a new CompilerError for type system violations.
/// Should mention both expected and found types.
#[macro_export]
macro_rules! return_type_error {
    ($msg:expr, $location:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $location,
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Type,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    ($msg:expr, $location:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::new_type_error(
            $msg, $location,
        ))
    };
}

/// Returns a new CompilerError for language rule violations (arity, undefined names, etc).
#[macro_export]
macro_rules! return_rule_error {
    ($msg:expr, $location:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError {
            msg: $msg.into(),
            location: $location,
            error_type: $crate::compiler_frontend::compiler_errors::ErrorType::Rule,
            metadata: {
                let mut map = std::collections::HashMap::new();
                $( map.insert($crate::compiler_frontend::compiler_errors::ErrorMetaDataKey::$key, $value); )*
                map
            },
        })
    };
    ($msg:expr, $location:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::new_rule_error(
            $msg, $location,
        ))
    };
}

/// Returns a new CompilerError for internal consistency failures.
#[macro_export]
macro_rules! return_compiler_error {
    ($msg:expr, $location:expr) => {
        return Err($crate::compiler_frontend::compiler_errors::CompilerError::compiler_error(
            $msg, $location,
        ))
    };
}
