//! Evaluation criteria for judging grounded answers.
//!
//! The registry is an explicit immutable value built once at startup and
//! passed by reference to whoever needs it; there is no global state.

use crate::error::{RagChatError, Result};
use std::collections::BTreeMap;

/// Criterion name: answer grounded exclusively in the provided context.
pub const ADHERENCE_TO_CONTEXT: &str = "adherence_to_context";
/// Criterion name: no invented or extrapolated information.
pub const HALLUCINATION_DETECTION: &str = "hallucination_detection";
/// Criterion name: assistant system-prompt rules followed strictly.
pub const RULE_FOLLOWING: &str = "rule_following";
/// Criterion name: clear, direct, complete answer.
pub const CLARITY_OBJECTIVITY: &str = "clarity_objectivity";

/// A single weighted evaluation dimension.
#[derive(Debug, Clone)]
pub struct EvaluationCriterion {
    /// Unique identifier (e.g. `adherence_to_context`).
    pub name: String,
    /// Fraction of the total score in [0, 1].
    pub weight: f64,
    /// One-line rubric statement.
    pub description: String,
    /// Short examples of answers that satisfy the criterion.
    pub examples_good: Vec<String>,
    /// Short examples of answers that violate the criterion.
    pub examples_bad: Vec<String>,
}

impl EvaluationCriterion {
    fn new(
        name: &str,
        weight: f64,
        description: &str,
        examples_good: &[&str],
        examples_bad: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            weight,
            description: description.to_string(),
            examples_good: examples_good.iter().map(|s| s.to_string()).collect(),
            examples_bad: examples_bad.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Fixed, ordered set of evaluation criteria with weights summing to 1.0.
#[derive(Debug, Clone)]
pub struct CriteriaRegistry {
    criteria: Vec<EvaluationCriterion>,
}

impl CriteriaRegistry {
    /// The standard registry for grounded RAG answers: four criteria
    /// weighted 0.30 / 0.30 / 0.25 / 0.15.
    pub fn rag_default() -> Self {
        Self {
            criteria: vec![
                EvaluationCriterion::new(
                    ADHERENCE_TO_CONTEXT,
                    0.30,
                    "Answer is based exclusively on the provided context",
                    &[
                        "States the revenue figure exactly as it appears in the context",
                        "Uses the standard refusal when the context lacks the information",
                    ],
                    &[
                        "Adds background facts that never appear in the context",
                        "Fills gaps in the context with general world knowledge",
                    ],
                ),
                EvaluationCriterion::new(
                    HALLUCINATION_DETECTION,
                    0.30,
                    "Answer does not invent or infer information beyond the context",
                    &[
                        "Every stated fact can be traced to a retrieved chunk",
                        "Leaves unstated details out instead of guessing them",
                    ],
                    &[
                        "Invents a figure that appears nowhere in the context",
                        "Extrapolates a trend the context never mentions",
                    ],
                ),
                EvaluationCriterion::new(
                    RULE_FOLLOWING,
                    0.25,
                    "Answer strictly follows the assistant's system-prompt rules",
                    &[
                        "Replies with the standard refusal to out-of-context questions",
                        "Sticks to what is written instead of offering interpretations",
                    ],
                    &[
                        "Offers an opinion when asked whether the results are good",
                        "Answers an out-of-context question from memory",
                    ],
                ),
                EvaluationCriterion::new(
                    CLARITY_OBJECTIVITY,
                    0.15,
                    "Answer is clear, direct, and complete",
                    &[
                        "Answers the question in one direct statement",
                        "Keeps the answer free of filler and hedging",
                    ],
                    &[
                        "Buries the answer in unrelated commentary",
                        "Rambles without actually addressing the question",
                    ],
                ),
            ],
        }
    }

    /// All registered criteria, in stable registration order.
    pub fn criteria(&self) -> &[EvaluationCriterion] {
        &self.criteria
    }

    /// Look up a criterion by name.
    pub fn get(&self, name: &str) -> Option<&EvaluationCriterion> {
        self.criteria.iter().find(|c| c.name == name)
    }

    /// Sum of all registered weights (should be 1.0 within tolerance).
    pub fn total_weight(&self) -> f64 {
        self.criteria.iter().map(|c| c.weight).sum()
    }

    /// Render a criterion's weight, description, and exemplars as
    /// remediation text.
    ///
    /// Fails with a criterion-not-found error for unregistered names.
    pub fn examples_text(&self, name: &str) -> Result<String> {
        let criterion = self
            .get(name)
            .ok_or_else(|| RagChatError::CriterionNotFound(name.to_string()))?;

        let mut text = String::new();
        text.push_str(&format!(
            "{} (weight: {}%)\n{}\n",
            criterion.name,
            (criterion.weight * 100.0).round() as u32,
            criterion.description
        ));

        text.push_str("\nGood examples:\n");
        for example in &criterion.examples_good {
            text.push_str(&format!("  - {}\n", example));
        }

        text.push_str("\nBad examples:\n");
        for example in &criterion.examples_bad {
            text.push_str(&format!("  - {}\n", example));
        }

        Ok(text)
    }

    /// Compute the weighted aggregate of per-criterion scores.
    ///
    /// Missing criteria default to 0. The weighted sum is rounded to the
    /// nearest integer with ties going to the even neighbor, so results are
    /// reproducible across platforms.
    pub fn weighted_score(&self, scores: &BTreeMap<String, u8>) -> u8 {
        let total: f64 = self
            .criteria
            .iter()
            .map(|c| f64::from(*scores.get(&c.name).unwrap_or(&0)) * c.weight)
            .sum();

        total.round_ties_even().clamp(0.0, 100.0) as u8
    }
}
