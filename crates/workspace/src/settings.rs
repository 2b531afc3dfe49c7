//! Chat settings derived from a workspace's defaults.

use {
    chatlabs_store::Workspace,
    serde::{Deserialize, Serialize},
};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_PROMPT: &str = "You are a friendly, helpful AI assistant.";
pub const DEFAULT_TEMPERATURE: f64 = 0.5;
pub const DEFAULT_CONTEXT_LENGTH: u32 = 4096;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingsProvider {
    #[default]
    Openai,
    Local,
}

impl EmbeddingsProvider {
    /// Unknown values fall back to `openai`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "local" => Self::Local,
            _ => Self::Openai,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSettings {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
    pub context_length: u32,
    pub include_profile_context: bool,
    pub include_workspace_instructions: bool,
    pub embeddings_provider: EmbeddingsProvider,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            prompt: DEFAULT_PROMPT.into(),
            temperature: DEFAULT_TEMPERATURE,
            context_length: DEFAULT_CONTEXT_LENGTH,
            include_profile_context: true,
            include_workspace_instructions: true,
            embeddings_provider: EmbeddingsProvider::Openai,
        }
    }
}

impl ChatSettings {
    /// Workspace defaults where set and non-empty, literal fallbacks otherwise.
    #[must_use]
    pub fn from_workspace(workspace: &Workspace) -> Self {
        let defaults = Self::default();
        Self {
            model: non_empty(workspace.default_model.as_deref()).unwrap_or(defaults.model),
            prompt: non_empty(workspace.default_prompt.as_deref()).unwrap_or(defaults.prompt),
            temperature: workspace.default_temperature.unwrap_or(defaults.temperature),
            context_length: workspace
                .default_context_length
                .unwrap_or(defaults.context_length),
            include_profile_context: workspace
                .include_profile_context
                .unwrap_or(defaults.include_profile_context),
            include_workspace_instructions: workspace
                .include_workspace_instructions
                .unwrap_or(defaults.include_workspace_instructions),
            embeddings_provider: workspace
                .embeddings_provider
                .as_deref()
                .map_or(defaults.embeddings_provider, EmbeddingsProvider::parse),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_workspace_uses_literal_defaults() {
        let settings = ChatSettings::from_workspace(&Workspace::default());
        assert_eq!(settings.model, "gpt-3.5-turbo");
        assert_eq!(settings.prompt, "You are a friendly, helpful AI assistant.");
        assert_eq!(settings.temperature, 0.5);
        assert_eq!(settings.context_length, 4096);
        assert!(settings.include_profile_context);
        assert!(settings.include_workspace_instructions);
        assert_eq!(settings.embeddings_provider, EmbeddingsProvider::Openai);
    }

    #[test]
    fn workspace_defaults_win() {
        let workspace = Workspace {
            default_model: Some("gpt-4o".into()),
            default_prompt: Some("Be terse.".into()),
            default_temperature: Some(0.0),
            default_context_length: Some(8192),
            include_profile_context: Some(false),
            embeddings_provider: Some("local".into()),
            ..Default::default()
        };
        let settings = ChatSettings::from_workspace(&workspace);
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.prompt, "Be terse.");
        assert_eq!(settings.temperature, 0.0);
        assert_eq!(settings.context_length, 8192);
        assert!(!settings.include_profile_context);
        assert!(settings.include_workspace_instructions);
        assert_eq!(settings.embeddings_provider, EmbeddingsProvider::Local);
    }

    #[test]
    fn empty_strings_fall_back() {
        let workspace = Workspace {
            default_model: Some(String::new()),
            embeddings_provider: Some("bogus".into()),
            ..Default::default()
        };
        let settings = ChatSettings::from_workspace(&workspace);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.embeddings_provider, EmbeddingsProvider::Openai);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(ChatSettings::default()).unwrap();
        assert_eq!(json["contextLength"], 4096);
        assert_eq!(json["embeddingsProvider"], "openai");
    }
}
