//! Statement lowering for a Go-like shading language.
//!
//! Takes already-parsed shader functions and lowers them to a flat, typed IR that
//! a shader code generator can consume. Loops must be in the constant counted form
//! shader backends accept, and anything else is rejected with a diagnostic.

pub mod compiler_frontend;
pub mod settings;

pub use compiler_frontend::ShaderFrontend;
pub use compiler_frontend::compiler_errors::{CompilerError, CompilerMessages, ErrorType};
pub use compiler_frontend::lowering::statement_lowerer::{
    LoweredFunction, LoweredModule, StatementLowerer, lower_module,
};
pub use settings::{Config, LoweringSettings};
