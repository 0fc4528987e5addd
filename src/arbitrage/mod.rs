pub mod evaluator;
pub mod types;

pub use evaluator::ArbitrageEvaluator;
pub use types::{ArbitrageConfig, Opportunity};
