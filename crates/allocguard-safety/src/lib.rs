#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod cache;
pub mod checker;
pub mod decision;
pub mod earnings;
pub mod risk;

pub use checker::SafetyChecker;
pub use decision::{DecisionEngine, DecisionInput};
pub use earnings::EarningsChecker;
pub use risk::KeywordRiskScorer;
