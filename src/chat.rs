//! Grounded chat over retrieved context.
//!
//! The assistant answers exclusively from the context assembled by the
//! semantic search, with the system prompt mandating a standard refusal
//! when the context does not contain the answer.

use crate::error::Result;
use crate::llm::{LlmClient, Message, Prompts};

/// Grounded assistant over a chat-completion client.
pub struct GroundedChat {
    client: LlmClient,
}

impl GroundedChat {
    /// Create a new grounded assistant.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    /// Ask a question against the given context.
    pub async fn ask(&self, question: &str, context: &str) -> Result<String> {
        let messages = vec![
            Message::system(Prompts::grounded_assistant()),
            Message::user(build_prompt(context, question)),
        ];

        let response = self.client.chat(messages).await?;
        Ok(response.content)
    }
}

/// Assemble the user prompt from retrieved context and the question.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "CONTEXT:\n{}\n\nUSER QUESTION:\n{}\n\nANSWER THE \"USER QUESTION\":",
        context, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;

    #[test]
    fn test_build_prompt_contains_inputs_verbatim() {
        let prompt = build_prompt("Revenue was $10M.", "What was the revenue?");

        assert!(prompt.contains("CONTEXT:\nRevenue was $10M."));
        assert!(prompt.contains("USER QUESTION:\nWhat was the revenue?"));
        assert!(prompt.ends_with("ANSWER THE \"USER QUESTION\":"));
    }

    #[tokio::test]
    async fn test_ask_sends_grounded_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"temperature": 0.0}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": [{"message": {"content": "The revenue is $10M."}}]}"#)
            .create_async()
            .await;

        let config = LlmConfig {
            api_base: server.url(),
            api_key: "key".to_string(),
            model: "gpt-5-mini".to_string(),
            ..Default::default()
        };
        let chat = GroundedChat::new(LlmClient::new(config));

        let answer = chat
            .ask("What was the revenue?", "Revenue was $10M.")
            .await
            .unwrap();

        assert_eq!(answer, "The revenue is $10M.");
        mock.assert_async().await;
    }
}
