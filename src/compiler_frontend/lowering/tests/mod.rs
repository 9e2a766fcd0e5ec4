
mod expression_lowering_tests;
