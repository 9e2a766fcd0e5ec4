//! Property tests for counted loop lowering.
//!
//! Any header in the canonical form should come through with its constants intact,
//! and the step should always be stored as an additive delta.

mod support;

use glint::compiler_frontend::shader_ir::ir_datatypes::ShaderType;
use glint::compiler_frontend::shader_ir::ir_nodes::{
    BinOp, ComparisonOp, ConstValue, IrStatement,
};
use glint::compiler_frontend::syntax::syntax_nodes::AssignToken;
use glint::{Config, lower_module};
use proptest::prelude::*;
use support::SyntaxBuilder;

fn comparison() -> impl Strategy<Value = BinOp> {
    prop_oneof![
        Just(BinOp::Lt),
        Just(BinOp::Le),
        Just(BinOp::Gt),
        Just(BinOp::Ge),
        Just(BinOp::Eq),
        Just(BinOp::Ne),
    ]
}

fn lowering_failure(messages: glint::CompilerMessages) -> TestCaseError {
    let errors: Vec<String> = messages.errors.iter().map(ToString::to_string).collect();
    TestCaseError::fail(format!("lowering failed: {}", errors.join("; ")))
}

proptest! {
    #[test]
    fn counted_loop_keeps_its_constants(
        init in -1000i64..1000,
        end in -1000i64..1000,
        step in 1i64..16,
        op in comparison(),
        counts_down in any::<bool>(),
    ) {
        let mut syntax = SyntaxBuilder::new();
        let step_token = if counts_down {
            AssignToken::SubAssign
        } else {
            AssignToken::AddAssign
        };
        let counted = syntax.counted_loop("i", init, op, end, step_token, step, Vec::new());
        let functions = vec![syntax.function("loop", vec![], vec![], vec![counted])];

        let module = lower_module(&functions, &syntax.string_table, &Config::default())
            .map_err(lowering_failure)?;

        let [IrStatement::For(for_loop)] = module.functions[0].body.statements.as_slice() else {
            return Err(TestCaseError::fail("expected a single for-loop"));
        };

        let expected_delta = if counts_down { -step } else { step };
        prop_assert_eq!(for_loop.counter_index, 0);
        prop_assert_eq!(for_loop.counter_type, ShaderType::Int);
        prop_assert_eq!(for_loop.init, ConstValue::Int(init));
        prop_assert_eq!(for_loop.end, ConstValue::Int(end));
        prop_assert_eq!(Some(for_loop.op), ComparisonOp::try_from(op).ok());
        prop_assert_eq!(for_loop.delta, ConstValue::Int(expected_delta));
    }

    #[test]
    fn sibling_loops_get_consecutive_counters(count in 1usize..6) {
        let mut syntax = SyntaxBuilder::new();
        let loops: Vec<_> = (0..count)
            .map(|_| {
                syntax.counted_loop("i", 0, BinOp::Lt, 8, AssignToken::AddAssign, 1, Vec::new())
            })
            .collect();
        let functions = vec![syntax.function("loops", vec![], vec![], loops)];

        let module = lower_module(&functions, &syntax.string_table, &Config::default())
            .map_err(lowering_failure)?;

        let counters: Vec<usize> = module.functions[0]
            .body
            .statements
            .iter()
            .filter_map(|statement| match statement {
                IrStatement::For(for_loop) => Some(for_loop.counter_index),
                _ => None,
            })
            .collect();

        prop_assert_eq!(counters, (0..count).collect::<Vec<_>>());
        prop_assert!(module.functions[0].body.local_vars.iter().all(|local| local.is_loop_counter));
    }
}
