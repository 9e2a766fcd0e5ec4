#![cfg(test)]

use super::lowering_test_support::*;
use crate::compiler_frontend::compiler_errors::{CompilerError, ErrorType};
use crate::compiler_frontend::lowering::expression_lowering::{
    ExpressionLowerer, FunctionSignature, LoweredExpression, ReturnTypeResolver,
    ShaderExpressionLowerer,
};
use crate::compiler_frontend::lowering::scope::{Constant, Scope, Variable};
use crate::compiler_frontend::shader_ir::ir_datatypes::ShaderType;
use crate::compiler_frontend::shader_ir::ir_nodes::{
    BinOp, ConstType, ConstValue, IrExpression, IrStatement, UnaryOp,
};
use crate::compiler_frontend::syntax::syntax_nodes::{Expression, ExpressionKind};

fn lower(
    harness: &LoweringHarness,
    scope: &mut Scope<'_>,
    expression: &Expression,
) -> Result<LoweredExpression, CompilerError> {
    ShaderExpressionLowerer::new(&harness.functions, &harness.string_table)
        .lower_expression(scope, expression)
}

fn lower_error(
    harness: &LoweringHarness,
    scope: &mut Scope<'_>,
    expression: &Expression,
) -> CompilerError {
    match lower(harness, scope, expression) {
        Ok(lowered) => panic!("lowering should fail but produced {lowered:?}"),
        Err(error) => error,
    }
}

fn unary(op: UnaryOp, operand: Expression) -> Expression {
    Expression::new(
        ExpressionKind::Unary {
            op,
            operand: Box::new(operand),
        },
        test_location(0),
    )
}

fn paren(inner: Expression) -> Expression {
    Expression::new(ExpressionKind::Paren(Box::new(inner)), test_location(0))
}

fn untyped(value: ConstValue) -> IrExpression {
    IrExpression::number(value, ConstType::Untyped)
}

// ------------------
// Constant folding
// ------------------
#[test]
fn integer_arithmetic_folds_to_an_untyped_constant() {
    let harness = LoweringHarness::new();
    let mut scope = Scope::new_root();

    let expression = binary(BinOp::Add, binary(BinOp::Mul, int(2), int(3)), int(1));
    let lowered = lower(&harness, &mut scope, &expression).expect("should fold");

    assert_eq!(lowered.values, vec![untyped(ConstValue::Int(7))]);
    assert_eq!(lowered.types, vec![ShaderType::Int]);
    assert!(lowered.prelude.is_empty());
}

#[test]
fn mixing_untyped_int_and_float_folds_as_float() {
    let harness = LoweringHarness::new();
    let mut scope = Scope::new_root();

    let lowered = lower(&harness, &mut scope, &binary(BinOp::Add, int(1), float(0.5)))
        .expect("should fold");

    assert_eq!(lowered.values, vec![untyped(ConstValue::Float(1.5))]);
    assert_eq!(lowered.types, vec![ShaderType::Float]);
}

#[test]
fn constant_comparisons_fold_to_bool() {
    let harness = LoweringHarness::new();
    let mut scope = Scope::new_root();

    let lowered = lower(&harness, &mut scope, &binary(BinOp::Lt, int(3), float(3.5)))
        .expect("should fold");

    assert_eq!(lowered.values, vec![IrExpression::Bool(true)]);
    assert_eq!(lowered.types, vec![ShaderType::Bool]);
}

#[test]
fn negation_and_not_fold_constants() {
    let harness = LoweringHarness::new();
    let mut scope = Scope::new_root();

    let negated = lower(&harness, &mut scope, &unary(UnaryOp::Neg, paren(int(4))))
        .expect("negation should fold");
    let inverted = lower(&harness, &mut scope, &unary(UnaryOp::Not, boolean(false)))
        .expect("not should fold");

    assert_eq!(negated.values, vec![untyped(ConstValue::Int(-4))]);
    assert_eq!(inverted.values, vec![IrExpression::Bool(true)]);
}

#[test]
fn integer_division_by_zero_is_rejected() {
    let harness = LoweringHarness::new();
    let mut scope = Scope::new_root();

    let error = lower_error(&harness, &mut scope, &binary(BinOp::Div, int(1), int(0)));
    assert_error(&error, ErrorType::Rule, "invalid operation: division by zero");
}

#[test]
fn integer_overflow_is_rejected() {
    let harness = LoweringHarness::new();
    let mut scope = Scope::new_root();

    let error = lower_error(&harness, &mut scope, &binary(BinOp::Add, int(i64::MAX), int(1)));
    assert_error(&error, ErrorType::Rule, "constant 9223372036854775807 + 1 overflows");
}

#[test]
fn remainder_is_only_defined_on_int() {
    let harness = LoweringHarness::new();
    let mut scope = Scope::new_root();

    let error = lower_error(&harness, &mut scope, &binary(BinOp::Mod, float(1.5), int(2)));
    assert_error(&error, ErrorType::Type, "operator % not defined on float");
}

// ------------------
// Names
// ------------------
#[test]
fn locals_lower_to_their_index() {
    let mut harness = LoweringHarness::new();
    let a = harness.name("a");
    let b = harness.name("b");
    let expression = harness.ident("b");

    let mut scope = Scope::new_root();
    scope.declare(Variable::named(a, Some(ShaderType::Int)));
    scope.declare(Variable::named(b, Some(ShaderType::Vec2)));

    let lowered = lower(&harness, &mut scope, &expression).expect("local should lower");

    assert_eq!(lowered.values, vec![local(1)]);
    assert_eq!(lowered.types, vec![ShaderType::Vec2]);
}

#[test]
fn typed_constants_keep_their_type_tag() {
    let mut harness = LoweringHarness::new();
    let scale = harness.name("scale");
    let expression = harness.ident("scale");

    let mut scope = Scope::new_root();
    scope.declare_constant(Constant {
        name: scale,
        ty: Some(ShaderType::Float),
        value: ConstValue::Float(0.25),
    });

    let lowered = lower(&harness, &mut scope, &expression).expect("constant should lower");

    assert_eq!(
        lowered.values,
        vec![IrExpression::number(ConstValue::Float(0.25), ConstType::Float)]
    );
    assert_eq!(lowered.types, vec![ShaderType::Float]);
}

#[test]
fn undefined_names_are_reported() {
    let mut harness = LoweringHarness::new();
    let expression = harness.ident("nope");
    let mut scope = Scope::new_root();

    let error = lower_error(&harness, &mut scope, &expression);
    assert_error(&error, ErrorType::Rule, "undefined: nope");
}

// ------------------
// Operand types
// ------------------
#[test]
fn untyped_constant_adopts_the_other_operand_type() {
    let mut harness = LoweringHarness::new();
    let f = harness.name("f");
    let expression = binary(BinOp::Mul, harness.ident("f"), int(2));

    let mut scope = Scope::new_root();
    scope.declare(Variable::named(f, Some(ShaderType::Float)));

    let lowered = lower(&harness, &mut scope, &expression).expect("should lower");

    assert_eq!(
        lowered.values,
        vec![IrExpression::binary(BinOp::Mul, local(0), untyped(ConstValue::Int(2)))]
    );
    assert_eq!(lowered.types, vec![ShaderType::Float]);
}

#[test]
fn float_scalar_scales_a_vector() {
    let mut harness = LoweringHarness::new();
    let v = harness.name("v");
    let s = harness.name("s");
    let expression = binary(BinOp::Mul, harness.ident("s"), harness.ident("v"));

    let mut scope = Scope::new_root();
    scope.declare(Variable::named(v, Some(ShaderType::Vec4)));
    scope.declare(Variable::named(s, Some(ShaderType::Float)));

    let lowered = lower(&harness, &mut scope, &expression).expect("should lower");
    assert_eq!(lowered.types, vec![ShaderType::Vec4]);
}

#[test]
fn mismatched_operand_types_are_rejected() {
    let mut harness = LoweringHarness::new();
    let i = harness.name("i");
    let f = harness.name("f");
    let expression = binary(BinOp::Add, harness.ident("i"), harness.ident("f"));

    let mut scope = Scope::new_root();
    scope.declare(Variable::named(i, Some(ShaderType::Int)));
    scope.declare(Variable::named(f, Some(ShaderType::Float)));

    let error = lower_error(&harness, &mut scope, &expression);
    assert_error(&error, ErrorType::Type, "mismatched types int and float for operator +");
}

#[test]
fn logical_operators_need_bool_operands() {
    let harness = LoweringHarness::new();
    let mut scope = Scope::new_root();

    let error = lower_error(&harness, &mut scope, &binary(BinOp::And, int(1), boolean(true)));
    assert_error(&error, ErrorType::Type, "operator && not defined on int and bool");
}

#[test]
fn not_needs_a_bool_operand() {
    let harness = LoweringHarness::new();
    let mut scope = Scope::new_root();

    let error = lower_error(&harness, &mut scope, &unary(UnaryOp::Not, int(1)));
    assert_error(&error, ErrorType::Type, "operator ! not defined on int");
}

// ------------------
// Calls
// ------------------
#[test]
fn single_output_call_is_a_value() {
    let mut harness = LoweringHarness::new();
    let sqrt = harness.declare_function("sqrt", vec![ShaderType::Float], vec![ShaderType::Float]);
    let expression = harness.call("sqrt", vec![int(2)]);
    let mut scope = Scope::new_root();

    let lowered = lower(&harness, &mut scope, &expression).expect("call should lower");

    assert_eq!(
        lowered.values,
        vec![IrExpression::Call {
            function: sqrt,
            args: vec![IrExpression::number(ConstValue::Int(2), ConstType::Float)],
        }]
    );
    assert_eq!(lowered.types, vec![ShaderType::Float]);
    assert!(lowered.prelude.is_empty());
}

#[test]
fn call_without_outputs_moves_into_the_prelude() {
    let mut harness = LoweringHarness::new();
    let discard = harness.declare_function("discard", vec![], vec![]);
    let expression = harness.call("discard", vec![]);
    let mut scope = Scope::new_root();

    let lowered = lower(&harness, &mut scope, &expression).expect("call should lower");

    assert!(lowered.values.is_empty());
    assert_eq!(
        lowered.prelude,
        vec![IrStatement::ExprStmt(IrExpression::Call {
            function: discard,
            args: Vec::new(),
        })]
    );
}

#[test]
fn multi_output_call_declares_temporaries_in_the_current_scope() {
    let mut harness = LoweringHarness::new();
    harness.declare_function(
        "split",
        vec![ShaderType::Vec2],
        vec![ShaderType::Float, ShaderType::Float],
    );
    let v = harness.name("v");
    let argument = harness.ident("v");
    let expression = harness.call("split", vec![argument]);

    let mut scope = Scope::new_root();
    scope.declare(Variable::named(v, Some(ShaderType::Vec2)));

    let lowered = lower(&harness, &mut scope, &expression).expect("call should lower");

    assert_eq!(lowered.values, vec![local(1), local(2)]);
    assert_eq!(lowered.types, vec![ShaderType::Float, ShaderType::Float]);
    assert_eq!(scope.vars().len(), 3);
    assert!(scope.vars()[1].name.is_none());
}

#[test]
fn call_argument_count_is_checked() {
    let mut harness = LoweringHarness::new();
    harness.declare_function("sqrt", vec![ShaderType::Float], vec![ShaderType::Float]);
    let expression = harness.call("sqrt", vec![]);
    let mut scope = Scope::new_root();

    let error = lower_error(&harness, &mut scope, &expression);
    assert_error(
        &error,
        ErrorType::Rule,
        "wrong number of arguments in call to sqrt: expected 1, found 0",
    );
}

#[test]
fn call_argument_types_are_checked() {
    let mut harness = LoweringHarness::new();
    harness.declare_function("index", vec![ShaderType::Int], vec![ShaderType::Float]);
    let expression = harness.call("index", vec![float(1.5)]);
    let mut scope = Scope::new_root();

    let error = lower_error(&harness, &mut scope, &expression);
    assert_error(&error, ErrorType::Type, "cannot use float as int value in argument to index");
}

#[test]
fn unknown_functions_are_reported() {
    let mut harness = LoweringHarness::new();
    let expression = harness.call("mystery", vec![]);
    let mut scope = Scope::new_root();

    let error = lower_error(&harness, &mut scope, &expression);
    assert_error(&error, ErrorType::Rule, "undefined function: mystery");
}

// ------------------
// Function table
// ------------------
#[test]
fn function_table_rejects_duplicate_names() {
    let mut harness = LoweringHarness::new();
    harness.declare_function("shade", vec![], vec![ShaderType::Vec4]);

    let name = harness.name("shade");
    let result = harness.functions.register(
        FunctionSignature {
            name,
            params: Vec::new(),
            outputs: Vec::new(),
        },
        test_location(3),
        &harness.string_table,
    );

    match result {
        Ok(index) => panic!("duplicate registration returned {index:?}"),
        Err(error) => assert_error(&error, ErrorType::Rule, "function shade is already declared"),
    }
    assert_eq!(harness.functions.len(), 1);
}

#[test]
fn return_types_look_through_parentheses() {
    let mut harness = LoweringHarness::new();
    harness.declare_function("pair", vec![], vec![ShaderType::Int, ShaderType::Bool]);
    let call = paren(harness.call("pair", vec![]));
    let scope = Scope::new_root();

    assert_eq!(
        harness.functions.function_return_types(&scope, &call),
        Some(vec![ShaderType::Int, ShaderType::Bool])
    );
    assert_eq!(harness.functions.function_return_types(&scope, &int(1)), None);
}
