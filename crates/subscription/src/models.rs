//! Static catalog of inference models and their plan tier.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    OpenAi,
    Anthropic,
    Google,
    Mistral,
    Perplexity,
    OpenRouter,
}

impl ModelProvider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Mistral => "mistral",
            Self::Perplexity => "perplexity",
            Self::OpenRouter => "openrouter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub model_id: &'static str,
    pub model_name: &'static str,
    pub provider: ModelProvider,
    pub paid: bool,
    pub image_input: bool,
}

const fn model(
    model_id: &'static str,
    model_name: &'static str,
    provider: ModelProvider,
    paid: bool,
    image_input: bool,
) -> ModelInfo {
    ModelInfo {
        model_id,
        model_name,
        provider,
        paid,
        image_input,
    }
}

/// Every model a caller may request.
pub static MODEL_LIST: &[ModelInfo] = &[
    model("gpt-3.5-turbo", "GPT-3.5 Turbo", ModelProvider::OpenAi, false, false),
    model("gpt-4-turbo-preview", "GPT-4 Turbo", ModelProvider::OpenAi, true, false),
    model("gpt-4-vision-preview", "GPT-4 Vision", ModelProvider::OpenAi, true, true),
    model("gpt-4o", "GPT-4o", ModelProvider::OpenAi, true, true),
    model("claude-3-haiku-20240307", "Claude 3 Haiku", ModelProvider::Anthropic, false, true),
    model("claude-3-sonnet-20240229", "Claude 3 Sonnet", ModelProvider::Anthropic, true, true),
    model("claude-3-opus-20240229", "Claude 3 Opus", ModelProvider::Anthropic, true, true),
    model("gemini-pro", "Gemini Pro", ModelProvider::Google, false, false),
    model("gemini-1.5-pro-latest", "Gemini 1.5 Pro", ModelProvider::Google, true, true),
    model("mistral-tiny", "Mistral Tiny", ModelProvider::Mistral, false, false),
    model("mistral-small", "Mistral Small", ModelProvider::Mistral, false, false),
    model("mistral-medium", "Mistral Medium", ModelProvider::Mistral, true, false),
    model("mistral-large-latest", "Mistral Large", ModelProvider::Mistral, true, false),
    model("sonar-small-online", "Sonar Small Online", ModelProvider::Perplexity, false, false),
    model("sonar-medium-online", "Sonar Medium Online", ModelProvider::Perplexity, true, false),
    model("meta-llama/llama-3-70b-instruct", "Llama 3 70B", ModelProvider::OpenRouter, false, false),
];

/// Lookup over a model list. Lookup is exact on the model id.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelInfo>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(MODEL_LIST.to_vec())
    }
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelInfo>) -> Self {
        Self { models }
    }

    #[must_use]
    pub fn get(&self, model_id: &str) -> Option<&ModelInfo> {
        self.models.iter().find(|m| m.model_id == model_id)
    }

    /// `Some(true)` for paid models, `None` when the id is not in the catalog.
    #[must_use]
    pub fn is_paid(&self, model_id: &str) -> Option<bool> {
        self.get(model_id).map(|m| m.paid)
    }

    pub fn paid_models(&self) -> impl Iterator<Item = &ModelInfo> {
        self.models.iter().filter(|m| m.paid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelInfo> {
        self.models.iter()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_ids_are_unique() {
        let mut ids: Vec<_> = MODEL_LIST.iter().map(|m| m.model_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), MODEL_LIST.len());
    }

    #[test]
    fn default_chat_model_is_free() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.is_paid("gpt-3.5-turbo"), Some(false));
        assert_eq!(catalog.is_paid("gpt-4o"), Some(true));
        assert_eq!(catalog.is_paid("not-a-model"), None);
        assert!(catalog.paid_models().all(|m| m.paid));
    }
}
