//! Provider credential catalog and the environment fallback resolver.

use std::collections::HashMap;

use chatlabs_store::{Profile, ProviderKeys};

use crate::{Error, Result};

/// Every credential or deployment identifier a profile can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKey {
    OpenAi,
    Anthropic,
    GoogleGemini,
    Mistral,
    Perplexity,
    AzureOpenAi,
    OpenRouter,
    OpenAiOrganizationId,
    AzureOpenAiEndpoint,
    AzureGpt35TurboName,
    AzureGpt45VisionName,
    AzureGpt45TurboName,
    AzureEmbeddingsName,
}

impl ProviderKey {
    pub const ALL: [Self; 13] = [
        Self::OpenAi,
        Self::Anthropic,
        Self::GoogleGemini,
        Self::Mistral,
        Self::Perplexity,
        Self::AzureOpenAi,
        Self::OpenRouter,
        Self::OpenAiOrganizationId,
        Self::AzureOpenAiEndpoint,
        Self::AzureGpt35TurboName,
        Self::AzureGpt45VisionName,
        Self::AzureGpt45TurboName,
        Self::AzureEmbeddingsName,
    ];

    /// Process environment variable supplying the shared fallback.
    #[must_use]
    pub fn env_key(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::GoogleGemini => "GOOGLE_GEMINI_API_KEY",
            Self::Mistral => "MISTRAL_API_KEY",
            Self::Perplexity => "PERPLEXITY_API_KEY",
            Self::AzureOpenAi => "AZURE_OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::OpenAiOrganizationId => "OPENAI_ORGANIZATION_ID",
            Self::AzureOpenAiEndpoint => "AZURE_OPENAI_ENDPOINT",
            Self::AzureGpt35TurboName => "AZURE_GPT_35_TURBO_NAME",
            Self::AzureGpt45VisionName => "AZURE_GPT_45_VISION_NAME",
            Self::AzureGpt45TurboName => "AZURE_GPT_45_TURBO_NAME",
            Self::AzureEmbeddingsName => "AZURE_EMBEDDINGS_NAME",
        }
    }

    /// Profile field name.
    #[must_use]
    pub fn field(self) -> &'static str {
        match self {
            Self::OpenAi => "openai_api_key",
            Self::Anthropic => "anthropic_api_key",
            Self::GoogleGemini => "google_gemini_api_key",
            Self::Mistral => "mistral_api_key",
            Self::Perplexity => "perplexity_api_key",
            Self::AzureOpenAi => "azure_openai_api_key",
            Self::OpenRouter => "openrouter_api_key",
            Self::OpenAiOrganizationId => "openai_organization_id",
            Self::AzureOpenAiEndpoint => "azure_openai_endpoint",
            Self::AzureGpt35TurboName => "azure_openai_35_turbo_id",
            Self::AzureGpt45VisionName => "azure_openai_45_vision_id",
            Self::AzureGpt45TurboName => "azure_openai_45_turbo_id",
            Self::AzureEmbeddingsName => "azure_openai_embeddings_id",
        }
    }

    fn slot(self, keys: &mut ProviderKeys) -> &mut Option<String> {
        match self {
            Self::OpenAi => &mut keys.openai_api_key,
            Self::Anthropic => &mut keys.anthropic_api_key,
            Self::GoogleGemini => &mut keys.google_gemini_api_key,
            Self::Mistral => &mut keys.mistral_api_key,
            Self::Perplexity => &mut keys.perplexity_api_key,
            Self::AzureOpenAi => &mut keys.azure_openai_api_key,
            Self::OpenRouter => &mut keys.openrouter_api_key,
            Self::OpenAiOrganizationId => &mut keys.openai_organization_id,
            Self::AzureOpenAiEndpoint => &mut keys.azure_openai_endpoint,
            Self::AzureGpt35TurboName => &mut keys.azure_openai_35_turbo_id,
            Self::AzureGpt45VisionName => &mut keys.azure_openai_45_vision_id,
            Self::AzureGpt45TurboName => &mut keys.azure_openai_45_turbo_id,
            Self::AzureEmbeddingsName => &mut keys.azure_openai_embeddings_id,
        }
    }

    /// The profile's own non-empty value for this key.
    #[must_use]
    pub fn value(self, keys: &ProviderKeys) -> Option<&str> {
        let value = match self {
            Self::OpenAi => &keys.openai_api_key,
            Self::Anthropic => &keys.anthropic_api_key,
            Self::GoogleGemini => &keys.google_gemini_api_key,
            Self::Mistral => &keys.mistral_api_key,
            Self::Perplexity => &keys.perplexity_api_key,
            Self::AzureOpenAi => &keys.azure_openai_api_key,
            Self::OpenRouter => &keys.openrouter_api_key,
            Self::OpenAiOrganizationId => &keys.openai_organization_id,
            Self::AzureOpenAiEndpoint => &keys.azure_openai_endpoint,
            Self::AzureGpt35TurboName => &keys.azure_openai_35_turbo_id,
            Self::AzureGpt45VisionName => &keys.azure_openai_45_vision_id,
            Self::AzureGpt45TurboName => &keys.azure_openai_45_turbo_id,
            Self::AzureEmbeddingsName => &keys.azure_openai_embeddings_id,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Process-wide fallback values, captured once at startup.
#[derive(Clone, Default)]
pub struct KeyFallbacks {
    values: HashMap<ProviderKey, String>,
}

impl std::fmt::Debug for KeyFallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut present: Vec<_> = self.values.keys().map(|k| k.env_key()).collect();
        present.sort_unstable();
        f.debug_struct("KeyFallbacks")
            .field("present", &present)
            .finish()
    }
}

impl KeyFallbacks {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary lookup. Empty values are skipped.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let values = ProviderKey::ALL
            .into_iter()
            .filter_map(|key| {
                lookup(key.env_key())
                    .filter(|v| !v.is_empty())
                    .map(|v| (key, v))
            })
            .collect();
        Self { values }
    }

    #[must_use]
    pub fn get(&self, key: ProviderKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Fill every empty profile key that has a fallback. Non-empty values are
/// never replaced, so applying this twice changes nothing.
#[must_use]
pub fn resolve_profile_keys(mut profile: Profile, fallbacks: &KeyFallbacks) -> Profile {
    for key in ProviderKey::ALL {
        let Some(fallback) = fallbacks.get(key) else {
            continue;
        };
        let slot = key.slot(&mut profile.keys);
        if slot.as_deref().is_none_or(str::is_empty) {
            *slot = Some(fallback.to_string());
        }
    }
    profile
}

/// Fail unless a credential is present and non-empty.
pub fn check_api_key(api_key: Option<&str>, key_name: &str) -> Result<()> {
    match api_key {
        Some(key) if !key.is_empty() => Ok(()),
        _ => Err(Error::missing_api_key(key_name)),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, chatlabs_store::Plan, rstest::rstest};

    fn profile() -> Profile {
        Profile {
            id: "p1".into(),
            user_id: "u1".into(),
            username: "ada".into(),
            display_name: String::new(),
            plan: Plan::Free,
            keys: ProviderKeys::default(),
        }
    }

    fn fallbacks(pairs: &[(&str, &str)]) -> KeyFallbacks {
        KeyFallbacks::from_lookup(|name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
        })
    }

    #[test]
    fn fills_empty_fields_from_fallbacks() {
        let mut p = profile();
        p.keys.anthropic_api_key = Some(String::new());
        let resolved = resolve_profile_keys(
            p,
            &fallbacks(&[
                ("OPENAI_API_KEY", "sk-env"),
                ("ANTHROPIC_API_KEY", "ant-env"),
                ("AZURE_GPT_45_VISION_NAME", "vision-deploy"),
            ]),
        );
        assert_eq!(resolved.keys.openai_api_key.as_deref(), Some("sk-env"));
        assert_eq!(resolved.keys.anthropic_api_key.as_deref(), Some("ant-env"));
        assert_eq!(
            resolved.keys.azure_openai_45_vision_id.as_deref(),
            Some("vision-deploy")
        );
        assert!(resolved.keys.mistral_api_key.is_none());
    }

    #[test]
    fn never_overwrites_user_values() {
        let mut p = profile();
        p.keys.openai_api_key = Some("sk-user".into());
        let resolved = resolve_profile_keys(p, &fallbacks(&[("OPENAI_API_KEY", "sk-env")]));
        assert_eq!(resolved.keys.openai_api_key.as_deref(), Some("sk-user"));
    }

    #[test]
    fn resolving_twice_is_a_no_op() {
        let fb = fallbacks(&[
            ("OPENAI_API_KEY", "sk-env"),
            ("AZURE_OPENAI_ENDPOINT", "https://azure.example.com"),
        ]);
        let once = resolve_profile_keys(profile(), &fb);
        let twice = resolve_profile_keys(once.clone(), &fb);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_env_values_are_skipped() {
        let fb = fallbacks(&[("OPENAI_API_KEY", "")]);
        assert!(fb.is_empty());
        let resolved = resolve_profile_keys(profile(), &fb);
        assert!(resolved.keys.openai_api_key.is_none());
    }

    #[test]
    fn every_key_maps_to_its_own_slot() {
        let pairs: Vec<(String, String)> = ProviderKey::ALL
            .iter()
            .map(|k| (k.env_key().to_string(), format!("v-{}", k.field())))
            .collect();
        let fb = KeyFallbacks::from_lookup(|name| {
            pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
        });
        let resolved = resolve_profile_keys(profile(), &fb);
        for key in ProviderKey::ALL {
            let expected = format!("v-{}", key.field());
            assert_eq!(key.value(&resolved.keys), Some(expected.as_str()));
        }
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    fn check_api_key_rejects_missing(#[case] key: Option<&str>) {
        let err = check_api_key(key, "OpenAI").unwrap_err();
        assert_eq!(err.to_string(), "OpenAI API Key not found");
    }

    #[test]
    fn check_api_key_accepts_present() {
        assert!(check_api_key(Some("sk-1"), "OpenAI").is_ok());
    }

    #[test]
    fn fallbacks_debug_hides_values() {
        let fb = fallbacks(&[("OPENAI_API_KEY", "sk-very-secret")]);
        let debug = format!("{fb:?}");
        assert!(debug.contains("OPENAI_API_KEY"));
        assert!(!debug.contains("sk-very-secret"));
    }
}
