//! LLM-as-a-judge evaluation of grounded answers.
//!
//! A second LLM scores the assistant's response against the criteria
//! registry: prompt assembly, a defensive parse of the judge's JSON reply,
//! and deterministic weighted aggregation into an [`EvaluationResult`].

use crate::config::LlmConfig;
use crate::error::{RagChatError, Result};
use crate::eval::criteria::CriteriaRegistry;
use crate::llm::{LlmClient, Message, Prompts};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Minimum aggregate score for a passing verdict.
pub const DEFAULT_THRESHOLD: u8 = 70;

/// Result of judging a single answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Weighted aggregate score (0-100).
    pub score: u8,
    /// Score per registered criterion (0-100 each).
    pub criteria_scores: BTreeMap<String, u8>,
    /// Free-text explanation from the judge (may be empty).
    pub feedback: String,
    /// Whether the aggregate met the threshold.
    pub passed: bool,
    /// Reserved extension map, currently always empty.
    pub details: BTreeMap<String, String>,
}

/// LLM-as-a-judge over a chat-completion client.
///
/// Holds only immutable configuration, so one judge can be shared across
/// tasks as long as the underlying HTTP client can.
pub struct LlmJudge {
    client: LlmClient,
    registry: CriteriaRegistry,
    threshold: u8,
}

impl LlmJudge {
    /// Create a new judge with the given LLM client and default threshold.
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            registry: CriteriaRegistry::rag_default(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Create from LLM config, pinning temperature to 0 so verdicts stay
    /// deterministic.
    pub fn from_config(config: LlmConfig) -> Self {
        Self::new(LlmClient::new(LlmConfig {
            temperature: 0.0,
            ..config
        }))
    }

    /// Set the pass threshold.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    /// The configured pass threshold.
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// The criteria registry this judge scores against.
    pub fn registry(&self) -> &CriteriaRegistry {
        &self.registry
    }

    /// Judge a response against its question and retrieved context.
    ///
    /// One provider call per invocation; no retries. Provider failures,
    /// unparseable judge output, and any other pipeline failure all surface
    /// as an evaluation error.
    pub async fn evaluate(
        &self,
        question: &str,
        context: &str,
        response: &str,
        system_prompt: Option<&str>,
    ) -> Result<EvaluationResult> {
        let prompt = self.build_evaluation_prompt(question, context, response, system_prompt);

        let messages = vec![
            Message::system(Prompts::judge_system()),
            Message::user(prompt),
        ];

        let reply = self
            .client
            .chat(messages)
            .await
            .map_err(|e| RagChatError::Evaluation(format!("judge request failed: {}", e)))?;

        let data = parse_evaluation_response(&reply.content)
            .map_err(|e| RagChatError::Evaluation(format!("judge returned invalid JSON: {}", e)))?;

        Ok(self.build_evaluation_result(&data))
    }

    /// Assemble the judge's input text.
    ///
    /// The three payload strings appear verbatim. The assistant's own
    /// system prompt, when supplied, gets a block labeled apart from the
    /// judge's instructions.
    pub fn build_evaluation_prompt(
        &self,
        question: &str,
        context: &str,
        response: &str,
        system_prompt: Option<&str>,
    ) -> String {
        let mut parts = Vec::new();

        if let Some(system_prompt) = system_prompt {
            if !system_prompt.is_empty() {
                parts.push(format!("ASSISTANT SYSTEM PROMPT:\n{}\n", system_prompt));
            }
        }

        parts.extend([
            "CONTEXT PROVIDED TO THE ASSISTANT:".to_string(),
            context.to_string(),
            String::new(),
            "USER QUESTION:".to_string(),
            question.to_string(),
            String::new(),
            "ASSISTANT RESPONSE:".to_string(),
            response.to_string(),
            String::new(),
            "EVALUATE THE ASSISTANT RESPONSE AGAINST THE CRITERIA.".to_string(),
        ]);

        parts.join("\n")
    }

    /// Build a structured result from the parsed judge payload.
    ///
    /// Missing criterion scores default to 0; a missing `overall_score` is
    /// recomputed from the weights; a missing `passed` is derived from the
    /// threshold. Never fails on incomplete payloads.
    pub fn build_evaluation_result(&self, data: &Map<String, Value>) -> EvaluationResult {
        let mut criteria_scores = BTreeMap::new();
        for criterion in self.registry.criteria() {
            let score = data
                .get(&criterion.name)
                .and_then(score_from_value)
                .unwrap_or(0);
            criteria_scores.insert(criterion.name.clone(), score);
        }

        let score = data
            .get("overall_score")
            .and_then(score_from_value)
            .unwrap_or_else(|| self.registry.weighted_score(&criteria_scores));

        let passed = data
            .get("passed")
            .and_then(Value::as_bool)
            .unwrap_or(score >= self.threshold);

        let feedback = data
            .get("feedback")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        EvaluationResult {
            score,
            criteria_scores,
            feedback,
            passed,
            details: BTreeMap::new(),
        }
    }

    /// Remediation text for the criteria this result failed.
    pub fn failing_criterion_guidance(&self, result: &EvaluationResult) -> String {
        crate::eval::guidance::failing_criterion_guidance(&self.registry, result, self.threshold)
    }
}

/// Coerce a judge-supplied number (integer or float) to a 0-100 score.
fn score_from_value(value: &Value) -> Option<u8> {
    value
        .as_f64()
        .map(|f| f.round_ties_even().clamp(0.0, 100.0) as u8)
}

/// Extract the JSON object from raw judge output.
///
/// Tolerates markdown code fences and raw control characters inside string
/// values. If the first parse fails, one bounded repair collapses raw
/// newlines inside the `feedback` value and retries; after that the parse
/// error surfaces with the offending text attached. No field validation
/// happens here.
pub fn parse_evaluation_response(raw: &str) -> Result<Map<String, Value>> {
    let text = strip_markdown_fences(raw.trim());

    let tolerant = escape_control_chars_in_strings(&text);
    let first_error = match parse_object(&tolerant) {
        Ok(map) => return Ok(map),
        Err(e) => e,
    };

    // Single bounded repair: the judge sometimes emits a multi-line
    // feedback value with broken escaping. Unescaped quotes inside
    // feedback are not handled and still fail the parse.
    let repaired = escape_control_chars_in_strings(&repair_feedback_newlines(&text));
    if let Ok(map) = parse_object(&repaired) {
        return Ok(map);
    }

    Err(RagChatError::LlmParse(format!(
        "Failed to parse judge response: {}. Response: {}",
        first_error, raw
    )))
}

fn parse_object(text: &str) -> std::result::Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", other)),
        Err(e) => Err(e.to_string()),
    }
}

/// Strip a leading ```json / ``` fence and a trailing ``` fence.
fn strip_markdown_fences(text: &str) -> String {
    let mut text = text;

    if let Some(stripped) = text.strip_prefix("```json") {
        text = stripped;
    } else if let Some(stripped) = text.strip_prefix("```") {
        text = stripped;
    }

    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped;
    }

    text.trim().to_string()
}

/// Escape raw control characters found inside JSON string literals so the
/// parse does not abort on them. The decoded values are unchanged.
fn escape_control_chars_in_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if !in_string {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
            continue;
        }

        if escaped {
            out.push(c);
            escaped = false;
            continue;
        }

        match c {
            '\\' => {
                out.push(c);
                escaped = true;
            }
            '"' => {
                out.push(c);
                in_string = false;
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }

    out
}

/// Collapse raw newlines inside the `"feedback": "..."` value to single
/// spaces.
fn repair_feedback_newlines(text: &str) -> String {
    let re = match Regex::new(r#""feedback"\s*:\s*"([^"]*)""#) {
        Ok(re) => re,
        Err(_) => return text.to_string(),
    };

    re.replace(text, |caps: &regex::Captures| {
        let mut collapsed = String::with_capacity(caps[1].len());
        let mut in_break = false;
        for c in caps[1].chars() {
            if c == '\n' || c == '\r' {
                if !in_break {
                    collapsed.push(' ');
                }
                in_break = true;
            } else {
                collapsed.push(c);
                in_break = false;
            }
        }
        format!("\"feedback\": \"{}\"", collapsed)
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::criteria::{
        ADHERENCE_TO_CONTEXT, CLARITY_OBJECTIVITY, HALLUCINATION_DETECTION, RULE_FOLLOWING,
    };

    fn test_judge() -> LlmJudge {
        LlmJudge::from_config(LlmConfig {
            api_base: "https://unused.example.com".to_string(),
            api_key: "test".to_string(),
            model: "judge-model".to_string(),
            ..Default::default()
        })
    }

    fn full_payload() -> &'static str {
        r#"{
            "adherence_to_context": 80,
            "hallucination_detection": 90,
            "rule_following": 85,
            "clarity_objectivity": 75,
            "overall_score": 83,
            "feedback": "Good answer",
            "passed": true
        }"#
    }

    #[test]
    fn test_parse_valid_json() {
        let data = parse_evaluation_response(full_payload()).unwrap();

        assert_eq!(data["adherence_to_context"], 80);
        assert_eq!(data["overall_score"], 83);
        assert_eq!(data["passed"], true);
        assert_eq!(data["feedback"], "Good answer");
    }

    #[test]
    fn test_parse_json_in_markdown_fence() {
        let fenced = format!("```json\n{}\n```", full_payload());
        let data = parse_evaluation_response(&fenced).unwrap();

        assert_eq!(data["adherence_to_context"], 80);
        assert_eq!(data["overall_score"], 83);
    }

    #[test]
    fn test_parse_json_in_bare_fence() {
        let fenced = format!("```\n{}\n```", full_payload());
        let data = parse_evaluation_response(&fenced).unwrap();

        assert_eq!(data["rule_following"], 85);
    }

    #[test]
    fn test_parse_invalid_json_fails_with_raw_text() {
        let err = parse_evaluation_response("{ isso não é json válido").unwrap_err();

        assert!(matches!(err, RagChatError::LlmParse(_)));
        assert!(err.to_string().contains("isso não é json válido"));
    }

    #[test]
    fn test_parse_non_object_fails() {
        let err = parse_evaluation_response("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, RagChatError::LlmParse(_)));
    }

    #[test]
    fn test_parse_tolerates_raw_newlines_in_feedback() {
        let raw = "{\"overall_score\": 60, \"feedback\": \"first line\nsecond line\", \"passed\": false}";
        let data = parse_evaluation_response(raw).unwrap();

        assert_eq!(data["overall_score"], 60);
        assert_eq!(data["feedback"], "first line\nsecond line");
    }

    #[test]
    fn test_repair_collapses_feedback_newlines() {
        let broken = "{\"feedback\": \"line one\n\nline two\rline three\"}";
        let repaired = repair_feedback_newlines(broken);

        assert_eq!(
            repaired,
            "{\"feedback\": \"line one line two line three\"}"
        );
    }

    #[test]
    fn test_escape_leaves_valid_escapes_alone() {
        let text = r#"{"feedback": "already\nescaped \"quoted\""}"#;
        assert_eq!(escape_control_chars_in_strings(text), text);
    }

    #[test]
    fn test_build_result_complete_payload_passes_through() {
        let judge = test_judge();
        let data = parse_evaluation_response(full_payload()).unwrap();

        let result = judge.build_evaluation_result(&data);

        assert_eq!(result.score, 83);
        assert!(result.passed);
        assert_eq!(result.feedback, "Good answer");
        assert_eq!(result.criteria_scores[ADHERENCE_TO_CONTEXT], 80);
        assert_eq!(result.criteria_scores[HALLUCINATION_DETECTION], 90);
        assert_eq!(result.criteria_scores[RULE_FOLLOWING], 85);
        assert_eq!(result.criteria_scores[CLARITY_OBJECTIVITY], 75);
        assert!(result.details.is_empty());
    }

    #[test]
    fn test_build_result_computes_missing_score_and_passed() {
        let judge = test_judge();
        let raw = r#"{
            "adherence_to_context": 80,
            "hallucination_detection": 90,
            "rule_following": 85,
            "clarity_objectivity": 75,
            "feedback": "Good answer"
        }"#;
        let data = parse_evaluation_response(raw).unwrap();

        let result = judge.build_evaluation_result(&data);

        let expected = judge.registry().weighted_score(&result.criteria_scores);
        assert_eq!(result.score, expected);
        assert_eq!(result.score, 84);
        assert!(result.passed);
    }

    #[test]
    fn test_build_result_missing_criteria_default_to_zero() {
        let judge = test_judge();
        let data = parse_evaluation_response(r#"{"feedback": "empty"}"#).unwrap();

        let result = judge.build_evaluation_result(&data);

        assert_eq!(result.score, 0);
        assert!(!result.passed);
        for criterion in judge.registry().criteria() {
            assert_eq!(result.criteria_scores[&criterion.name], 0);
        }
    }

    #[test]
    fn test_build_result_coerces_float_scores() {
        let judge = test_judge();
        let data =
            parse_evaluation_response(r#"{"overall_score": 72.5, "adherence_to_context": 99.9}"#)
                .unwrap();

        let result = judge.build_evaluation_result(&data);

        // 72.5 rounds ties-to-even down to 72
        assert_eq!(result.score, 72);
        assert_eq!(result.criteria_scores[ADHERENCE_TO_CONTEXT], 100);
    }

    #[test]
    fn test_build_result_null_fields_fall_back() {
        let judge = test_judge();
        let raw = r#"{
            "adherence_to_context": 100,
            "hallucination_detection": 100,
            "rule_following": 100,
            "clarity_objectivity": 100,
            "overall_score": null,
            "passed": null
        }"#;
        let data = parse_evaluation_response(raw).unwrap();

        let result = judge.build_evaluation_result(&data);
        assert_eq!(result.score, 100);
        assert!(result.passed);
        assert_eq!(result.feedback, "");
    }

    #[test]
    fn test_prompt_contains_inputs_verbatim_without_system_block() {
        let judge = test_judge();
        let prompt =
            judge.build_evaluation_prompt("The question?", "The context.", "The response.", None);

        assert!(prompt.contains("CONTEXT PROVIDED TO THE ASSISTANT:\nThe context."));
        assert!(prompt.contains("USER QUESTION:\nThe question?"));
        assert!(prompt.contains("ASSISTANT RESPONSE:\nThe response."));
        assert!(!prompt.contains("ASSISTANT SYSTEM PROMPT:"));
        assert!(prompt.ends_with("EVALUATE THE ASSISTANT RESPONSE AGAINST THE CRITERIA."));
    }

    #[test]
    fn test_prompt_includes_system_block_when_supplied() {
        let judge = test_judge();
        let prompt = judge.build_evaluation_prompt(
            "Q",
            "C",
            "R",
            Some("You are a careful assistant."),
        );

        assert!(prompt.contains("ASSISTANT SYSTEM PROMPT:\nYou are a careful assistant."));
        // The system block comes before the context block
        let system_pos = prompt.find("ASSISTANT SYSTEM PROMPT:").unwrap();
        let context_pos = prompt.find("CONTEXT PROVIDED TO THE ASSISTANT:").unwrap();
        assert!(system_pos < context_pos);
    }

    #[test]
    fn test_prompt_skips_empty_system_prompt() {
        let judge = test_judge();
        let prompt = judge.build_evaluation_prompt("Q", "C", "R", Some(""));
        assert!(!prompt.contains("ASSISTANT SYSTEM PROMPT:"));
    }

    #[tokio::test]
    async fn test_evaluate_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "choices": [{"message": {"content": format!("```json\n{}\n```", r#"{
                "adherence_to_context": 80,
                "hallucination_detection": 90,
                "rule_following": 85,
                "clarity_objectivity": 75,
                "feedback": "Solid grounding",
                "passed": null
            }"#)}}]
        });
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let judge = LlmJudge::from_config(LlmConfig {
            api_base: server.url(),
            api_key: "test".to_string(),
            model: "judge-model".to_string(),
            ..Default::default()
        });

        let result = judge
            .evaluate("What was the revenue?", "Revenue was $10M.", "It was $10M.", None)
            .await
            .unwrap();

        assert_eq!(result.score, 84);
        assert!(result.passed);
        assert_eq!(result.feedback, "Solid grounding");
    }

    #[tokio::test]
    async fn test_evaluate_wraps_provider_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let judge = LlmJudge::from_config(LlmConfig {
            api_base: server.url(),
            api_key: "test".to_string(),
            model: "judge-model".to_string(),
            ..Default::default()
        });

        let err = judge.evaluate("Q", "C", "R", None).await.unwrap_err();
        assert!(matches!(err, RagChatError::Evaluation(_)));
    }

    #[tokio::test]
    async fn test_evaluate_wraps_unparseable_output_with_raw_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices": [{"message": {"content": "I refuse to answer in JSON."}}]}"#,
            )
            .create_async()
            .await;

        let judge = LlmJudge::from_config(LlmConfig {
            api_base: server.url(),
            api_key: "test".to_string(),
            model: "judge-model".to_string(),
            ..Default::default()
        });

        let err = judge.evaluate("Q", "C", "R", None).await.unwrap_err();
        assert!(matches!(err, RagChatError::Evaluation(_)));
        assert!(err.to_string().contains("I refuse to answer in JSON."));
    }
}
