//! Lexical scopes for statement lowering.
//!
//! A scope owns the variables and constants declared directly in it and can read
//! every outer scope through a shared reference. Only the innermost scope is ever
//! mutated, so outer scopes stay borrowed immutably while a child exists.
//!
//! Local variable indices are continuous across nesting: the first variable of a
//! scope has an index equal to the number of variables in all of its outer scopes.

use crate::compiler_frontend::shader_ir::ir_datatypes::ShaderType;
use crate::compiler_frontend::shader_ir::ir_nodes::{BlockLocal, ConstValue};
use crate::compiler_frontend::string_interning::StringId;
use crate::scope_log;

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// None for temporaries introduced by expression lowering.
    pub name: Option<StringId>,

    /// Back-filled once the initializer's type is known.
    pub ty: Option<ShaderType>,

    pub is_loop_counter: bool,
}

impl Variable {
    pub fn named(name: StringId, ty: Option<ShaderType>) -> Self {
        Variable {
            name: Some(name),
            ty,
            is_loop_counter: false,
        }
    }

    pub fn temporary(ty: ShaderType) -> Self {
        Variable {
            name: None,
            ty: Some(ty),
            is_loop_counter: false,
        }
    }

    pub fn as_block_local(&self) -> BlockLocal {
        BlockLocal {
            ty: self.ty,
            is_loop_counter: self.is_loop_counter,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: StringId,

    /// None for untyped constants (`const n = 3`).
    pub ty: Option<ShaderType>,
    pub value: ConstValue,
}

#[derive(Debug)]
pub struct Scope<'outer> {
    outer: Option<&'outer Scope<'outer>>,
    vars: Vec<Variable>,
    consts: Vec<Constant>,
}

impl<'outer> Scope<'outer> {
    pub fn new_root() -> Scope<'static> {
        Scope {
            outer: None,
            vars: Vec::new(),
            consts: Vec::new(),
        }
    }

    /// A fresh scope nested inside `outer`.
    pub fn child_of(outer: &'outer Scope<'outer>) -> Scope<'outer> {
        Scope {
            outer: Some(outer),
            vars: Vec::new(),
            consts: Vec::new(),
        }
    }

    /// Index of the first variable owned by this scope.
    pub fn index_offset(&self) -> usize {
        self.outer.map_or(0, |outer| outer.total_variable_count())
    }

    /// Every variable visible from this scope, including outer ones.
    pub fn total_variable_count(&self) -> usize {
        self.index_offset() + self.vars.len()
    }

    /// Variables owned by this scope only.
    pub fn vars(&self) -> &[Variable] {
        &self.vars
    }

    /// Appends a variable and returns its local index.
    pub fn declare(&mut self, variable: Variable) -> usize {
        let index = self.total_variable_count();
        scope_log!("[Scope] Declared local ", index, " ", #variable);
        self.vars.push(variable);
        index
    }

    pub fn declare_constant(&mut self, constant: Constant) {
        scope_log!("[Scope] Declared constant ", #constant);
        self.consts.push(constant);
    }

    /// Moves a loop counter out of a discarded pseudo-scope into this scope.
    ///
    /// Must run after the loop is fully validated. The counter keeps the index it
    /// had inside the pseudo-scope because that scope was a direct child of this one
    /// and held nothing before the counter.
    ///
    /// The name is dropped so the counter can't be referenced after its loop.
    pub fn promote_loop_counter(&mut self, mut counter: Variable) -> usize {
        counter.is_loop_counter = true;
        counter.name = None;
        self.declare(counter)
    }

    /// Finds a named variable, innermost scope first.
    /// Later declarations shadow earlier ones within the same scope.
    pub fn find_local_variable(&self, name: StringId) -> Option<(usize, &Variable)> {
        let offset = self.index_offset();
        for (i, variable) in self.vars.iter().enumerate().rev() {
            if variable.name == Some(name) {
                return Some((offset + i, variable));
            }
        }

        // A constant declared in this scope hides outer variables of the same name
        if self.consts.iter().any(|constant| constant.name == name) {
            return None;
        }

        self.outer.and_then(|outer| outer.find_local_variable(name))
    }

    pub fn find_constant(&self, name: StringId) -> Option<&Constant> {
        if let Some(constant) = self.consts.iter().rev().find(|c| c.name == name) {
            return Some(constant);
        }

        if self.vars.iter().any(|variable| variable.name == Some(name)) {
            return None;
        }

        self.outer.and_then(|outer| outer.find_constant(name))
    }

    pub fn find_local_variable_by_index(&self, index: usize) -> Option<&Variable> {
        let offset = self.index_offset();
        if index >= offset {
            return self.vars.get(index - offset);
        }

        self.outer
            .and_then(|outer| outer.find_local_variable_by_index(index))
    }

    /// Ends the scope, handing back the variables it owned.
    pub fn into_variables(self) -> Vec<Variable> {
        self.vars
    }
}
