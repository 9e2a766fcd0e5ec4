pub mod expression_lowering;
pub mod scope;
pub mod statement_lowerer;

// Private parts of statement lowering
mod assignment_lowering;
mod declaration_lowering;
mod statement_lowering;

#[cfg(test)]
mod tests;
