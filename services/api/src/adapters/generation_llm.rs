//! services/api/src/adapters/generation_llm.rs
//!
//! This module contains the adapter for the source-generation LLM.
//! It implements the `SourceGenerationService` port from the `core` crate.
//! The model is instructed to answer in the loosely-labeled bilingual format
//! that the core webhook parser understands; the raw text is returned as-is
//! and parsing stays the caller's responsibility.

const SYSTEM_INSTRUCTIONS: &str = r#"You are a Torah study assistant that prepares a single study source.

Given a topic, a time budget in minutes, and a preferred language, produce ONE source
suitable for that time budget. Format your answer as labeled lines, exactly like this:

**English:** <short English title>
**Hebrew:** <short Hebrew title>
**Source Range:** <canonical reference range, e.g. Genesis 1:1-2:3>
**Text Excerpt:** <the core passage, a few sentences, in English>
**Reflection Prompt:** <one open question for journaling>
**Estimated Time:** <minutes, a number>
**Commentaries:**
- <first classical commentator>
- <second classical commentator>
**Working Link:** <a sefaria.org link to the passage>

Rules:
- Keep every label on its own line.
- The Working Link must point at sefaria.org.
- Do not add any sections beyond the ones listed."#;

const USER_INPUT_TEMPLATE: &str = r#"Topic: {topic}
Time available: {time} minutes
Preferred language: {language}

Prepare one study source now."#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use torah_study_core::domain::Language;
use torah_study_core::ports::{PortError, PortResult, SourceGenerationService};
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SourceGenerationService` using an
/// OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiGenerationAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiGenerationAdapter {
    /// Creates a new `OpenAiGenerationAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, timeout: Duration) -> Self {
        Self {
            client,
            model,
            timeout,
        }
    }
}

//=========================================================================================
// `SourceGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SourceGenerationService for OpenAiGenerationAdapter {
    /// Generates one raw source blob for the given request shape. The call
    /// is bounded by the configured timeout so a slow upstream degrades to
    /// "tier unavailable" instead of stalling the recommendation flow.
    async fn generate_source(
        &self,
        time_selected: u32,
        topic: &str,
        language: Language,
    ) -> PortResult<String> {
        let language_name = match language {
            Language::En => "English",
            Language::He => "Hebrew",
        };
        let user_input = USER_INPUT_TEMPLATE
            .replace("{topic}", topic)
            .replace("{time}", &time_selected.to_string())
            .replace("{language}", language_name);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::Timeout(format!(
                    "source generation exceeded {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                info!("Generation service returned {} chars", content.len());
                Ok(content)
            } else {
                Err(PortError::Unexpected(
                    "Generation LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Generation LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
