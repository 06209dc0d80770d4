use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

use super::variation_repository::{GenerationError, VariationRepository};
use crate::domain::command::Language;

const SYSTEM_PROMPT: &str = "You rewrite voice commands for a speech dataset. \
Given a command, produce natural paraphrases a person might actually say. \
Return one paraphrase per line with no numbering, bullets or commentary.";

/// OpenAI chat-completions implementation of the variation repository.
pub struct OpenAiVariationRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiVariationRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    /// Parse the model's response into clean variation lines, stripping any
    /// numbering or bullets the model added despite instructions.
    fn parse_variations(content: &str, max_variations: usize) -> Vec<String> {
        content
            .lines()
            .map(|line| {
                line.trim()
                    .trim_start_matches(|c: char| {
                        c.is_ascii_digit() || c == '.' || c == ')' || c == '-' || c == '*'
                    })
                    .trim()
                    .trim_matches('"')
                    .to_string()
            })
            .filter(|line| !line.is_empty())
            .take(max_variations)
            .collect()
    }
}

#[async_trait]
impl VariationRepository for OpenAiVariationRepository {
    async fn generate(
        &self,
        phrase: &str,
        language: Language,
        max_variations: usize,
    ) -> Result<Vec<String>, GenerationError> {
        let start_time = std::time::Instant::now();

        let user_prompt = format!(
            "Generate {max_variations} variations of the {language} voice command: \"{phrase}\". \
Keep the meaning identical."
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()
                    .map_err(|e| GenerationError::Provider(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()
                    .map_err(|e| GenerationError::Provider(e.to_string()))?
                    .into(),
            ])
            .build()
            .map_err(|e| GenerationError::Provider(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                phrase_length = phrase.len(),
                "OpenAI variation generation failed"
            );
            GenerationError::Provider(e.to_string())
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or(GenerationError::EmptyResponse)?;

        let variations = Self::parse_variations(content, max_variations);
        if variations.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        tracing::info!(
            provider = "openai",
            model = %self.model,
            language = %language,
            latency_ms = start_time.elapsed().as_millis(),
            variation_count = variations.len(),
            "Variation generation completed"
        );

        Ok(variations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_strips_numbering_and_bullets() {
        let content = "1. turn on the lights\n2) switch the lights on\n- lights on please\n";
        let variations = OpenAiVariationRepository::parse_variations(content, 10);
        assert_eq!(
            variations,
            vec![
                "turn on the lights".to_string(),
                "switch the lights on".to_string(),
                "lights on please".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_drops_blank_lines() {
        let content = "\n\nturn on the lights\n\n   \nlights on\n";
        let variations = OpenAiVariationRepository::parse_variations(content, 10);
        assert_eq!(variations.len(), 2);
    }

    #[test]
    fn test_parse_caps_at_requested_count() {
        let content = "a\nb\nc\nd\ne";
        let variations = OpenAiVariationRepository::parse_variations(content, 3);
        assert_eq!(variations, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_strips_surrounding_quotes() {
        let content = "\"turn on the lights\"";
        let variations = OpenAiVariationRepository::parse_variations(content, 10);
        assert_eq!(variations, vec!["turn on the lights"]);
    }
}
