//! Functor analysis: the single query the lowering needs.

use datalog_ast::IntrinsicOp;

#[derive(Debug, Clone, Copy, Default)]
pub struct FunctorAnalysis;

impl FunctorAnalysis {
    pub const NAME: &'static str = "functor-analysis";

    /// Multi-result functors introduce a generator level during lowering
    /// instead of evaluating to a single value.
    pub fn is_multi_result(op: IntrinsicOp) -> bool {
        matches!(
            op,
            IntrinsicOp::Range | IntrinsicOp::Urange | IntrinsicOp::Frange
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_functors_are_multi_result() {
        assert!(FunctorAnalysis::is_multi_result(IntrinsicOp::Range));
        assert!(FunctorAnalysis::is_multi_result(IntrinsicOp::Urange));
        assert!(FunctorAnalysis::is_multi_result(IntrinsicOp::Frange));
        assert!(!FunctorAnalysis::is_multi_result(IntrinsicOp::Add));
        assert!(!FunctorAnalysis::is_multi_result(IntrinsicOp::Cat));
    }
}
