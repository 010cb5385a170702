//! LLM-as-a-judge evaluation framework.
//!
//! A second LLM scores the assistant's answers against a weighted criteria
//! registry:
//! - `criteria`: the registry and the weighted scorer
//! - `judge`: prompt assembly, response parsing/repair, and the evaluator
//! - `guidance`: remediation reporting for failed criteria

pub mod criteria;
pub mod guidance;
pub mod judge;

pub use criteria::{CriteriaRegistry, EvaluationCriterion};
pub use guidance::failing_criterion_guidance;
pub use judge::{DEFAULT_THRESHOLD, EvaluationResult, LlmJudge, parse_evaluation_response};
