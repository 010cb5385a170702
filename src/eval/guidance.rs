//! Remediation guidance for failed evaluations.
//!
//! Renders the criteria a result failed, worst score first, with the
//! registry's exemplars for each, so regressions point straight at what to
//! fix.

use crate::eval::criteria::CriteriaRegistry;
use crate::eval::judge::EvaluationResult;

/// Message returned when no criterion fell below the threshold.
pub const ALL_CRITERIA_PASSED: &str = "All criteria scored at or above the threshold.";

/// Render guidance for every criterion scoring below `threshold`.
///
/// Failing criteria are listed ascending by score, worst first. A criterion
/// name missing from the registry renders a placeholder instead of failing.
/// The judge's overall feedback closes the report.
pub fn failing_criterion_guidance(
    registry: &CriteriaRegistry,
    result: &EvaluationResult,
    threshold: u8,
) -> String {
    let mut failing: Vec<(&str, u8)> = result
        .criteria_scores
        .iter()
        .filter(|(_, score)| **score < threshold)
        .map(|(name, score)| (name.as_str(), *score))
        .collect();

    if failing.is_empty() {
        return ALL_CRITERIA_PASSED.to_string();
    }

    failing.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

    let mut report = String::new();
    for (name, score) in failing {
        report.push_str(&format!("--- {} scored {}/100 ---\n", name, score));
        match registry.examples_text(name) {
            Ok(text) => report.push_str(&text),
            Err(_) => {
                report.push_str(&format!("Criterion '{}' not found in registry\n", name));
            }
        }
        report.push('\n');
    }

    report.push_str("--- Judge feedback ---\n");
    report.push_str(&result.feedback);

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::criteria::{
        ADHERENCE_TO_CONTEXT, CLARITY_OBJECTIVITY, HALLUCINATION_DETECTION, RULE_FOLLOWING,
    };
    use std::collections::BTreeMap;

    fn result_with_scores(scores: &[(&str, u8)], feedback: &str) -> EvaluationResult {
        let criteria_scores: BTreeMap<String, u8> = scores
            .iter()
            .map(|(name, score)| (name.to_string(), *score))
            .collect();

        EvaluationResult {
            score: 50,
            criteria_scores,
            feedback: feedback.to_string(),
            passed: false,
            details: BTreeMap::new(),
        }
    }

    #[test]
    fn test_failing_criteria_ordered_worst_first() {
        let registry = CriteriaRegistry::rag_default();
        let result = result_with_scores(
            &[
                (ADHERENCE_TO_CONTEXT, 60),
                (HALLUCINATION_DETECTION, 20),
                (RULE_FOLLOWING, 50),
                (CLARITY_OBJECTIVITY, 80),
            ],
            "needs work",
        );

        let guidance = failing_criterion_guidance(&registry, &result, 70);

        let hallucination = guidance.find(HALLUCINATION_DETECTION).unwrap();
        let rule = guidance.find(RULE_FOLLOWING).unwrap();
        let adherence = guidance.find(ADHERENCE_TO_CONTEXT).unwrap();

        assert!(hallucination < rule);
        assert!(rule < adherence);
        assert!(!guidance.contains(CLARITY_OBJECTIVITY));
        assert!(guidance.contains("hallucination_detection scored 20/100"));
    }

    #[test]
    fn test_guidance_includes_exemplars_and_feedback() {
        let registry = CriteriaRegistry::rag_default();
        let result = result_with_scores(&[(HALLUCINATION_DETECTION, 10)], "invented a number");

        let guidance = failing_criterion_guidance(&registry, &result, 70);

        assert!(guidance.contains("Good examples:"));
        assert!(guidance.contains("Bad examples:"));
        assert!(guidance.contains("--- Judge feedback ---\ninvented a number"));
    }

    #[test]
    fn test_no_failures_returns_fixed_message() {
        let registry = CriteriaRegistry::rag_default();
        let result = result_with_scores(
            &[
                (ADHERENCE_TO_CONTEXT, 90),
                (HALLUCINATION_DETECTION, 95),
                (RULE_FOLLOWING, 80),
                (CLARITY_OBJECTIVITY, 70),
            ],
            "great all around",
        );

        let guidance = failing_criterion_guidance(&registry, &result, 70);

        assert_eq!(guidance, ALL_CRITERIA_PASSED);
        assert!(!guidance.contains("great all around"));
    }

    #[test]
    fn test_exactly_threshold_is_not_failing() {
        let registry = CriteriaRegistry::rag_default();
        let result = result_with_scores(&[(RULE_FOLLOWING, 70)], "");

        let guidance = failing_criterion_guidance(&registry, &result, 70);
        assert_eq!(guidance, ALL_CRITERIA_PASSED);
    }

    #[test]
    fn test_unregistered_criterion_renders_placeholder() {
        let registry = CriteriaRegistry::rag_default();
        let result = result_with_scores(&[("mystery_criterion", 5)], "odd result");

        let guidance = failing_criterion_guidance(&registry, &result, 70);

        assert!(guidance.contains("mystery_criterion scored 5/100"));
        assert!(guidance.contains("Criterion 'mystery_criterion' not found in registry"));
    }
}
