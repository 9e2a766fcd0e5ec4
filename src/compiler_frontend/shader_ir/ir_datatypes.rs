// ============================================================
// Shader IR Type System
// ============================================================
//
// Every value the code generator sees has one of these types.
// Untyped numeric constants are not a type here; they carry
// a ConstType tag on the expression node instead.
//
// ============================================================

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShaderType {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ShaderType {
    pub fn is_numeric_scalar(self) -> bool {
        matches!(self, ShaderType::Int | ShaderType::Float)
    }
}

impl fmt::Display for ShaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderType::Bool => "bool",
            ShaderType::Int => "int",
            ShaderType::Float => "float",
            ShaderType::Vec2 => "vec2",
            ShaderType::Vec3 => "vec3",
            ShaderType::Vec4 => "vec4",
            ShaderType::Mat2 => "mat2",
            ShaderType::Mat3 => "mat3",
            ShaderType::Mat4 => "mat4",
        };
        f.write_str(name)
    }
}

/// Joins types the way diagnostics print them: `int, float`
pub fn join_types(types: &[ShaderType]) -> String {
    types
        .iter()
        .map(|ty| ty.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
