//! Persisted records shared across crates.

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

/// Subscription tier of a profile.
///
/// Tiers this build does not know about are kept verbatim and count as paid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Ultimate,
    #[serde(untagged)]
    Other(String),
}

impl Plan {
    #[must_use]
    pub fn is_free(&self) -> bool {
        *self == Self::Free
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Ultimate => "ultimate",
            Self::Other(plan) => plan,
        }
    }
}

/// Credentials and deployment identifiers a user may store on their profile.
///
/// Empty strings are treated the same as `None` by consumers.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderKeys {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google_gemini_api_key: Option<String>,
    pub mistral_api_key: Option<String>,
    pub perplexity_api_key: Option<String>,
    pub azure_openai_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openai_organization_id: Option<String>,
    pub azure_openai_endpoint: Option<String>,
    pub azure_openai_35_turbo_id: Option<String>,
    pub azure_openai_45_vision_id: Option<String>,
    pub azure_openai_45_turbo_id: Option<String>,
    pub azure_openai_embeddings_id: Option<String>,
}

impl std::fmt::Debug for ProviderKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| match v.as_deref() {
            Some(s) if !s.is_empty() => "[REDACTED]",
            _ => "None",
        };
        f.debug_struct("ProviderKeys")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("google_gemini_api_key", &redact(&self.google_gemini_api_key))
            .field("mistral_api_key", &redact(&self.mistral_api_key))
            .field("perplexity_api_key", &redact(&self.perplexity_api_key))
            .field("azure_openai_api_key", &redact(&self.azure_openai_api_key))
            .field("openrouter_api_key", &redact(&self.openrouter_api_key))
            .field("openai_organization_id", &self.openai_organization_id)
            .field("azure_openai_endpoint", &self.azure_openai_endpoint)
            .field("azure_openai_35_turbo_id", &self.azure_openai_35_turbo_id)
            .field("azure_openai_45_vision_id", &self.azure_openai_45_vision_id)
            .field("azure_openai_45_turbo_id", &self.azure_openai_45_turbo_id)
            .field("azure_openai_embeddings_id", &self.azure_openai_embeddings_id)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub plan: Plan,
    #[serde(flatten)]
    pub keys: ProviderKeys,
}

/// An authenticated login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub chat_id: String,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Visibility of a shareable record.
///
/// Only `public` exposes a record; any other value is kept verbatim and
/// treated as not public.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sharing {
    #[default]
    Private,
    Public,
    #[serde(untagged)]
    Other(String),
}

impl Sharing {
    #[must_use]
    pub fn is_public(&self) -> bool {
        *self == Self::Public
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
            Self::Other(sharing) => sharing,
        }
    }
}

/// One content part of a shared document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPart {
    pub content: String,
}

/// A document published from a workspace, addressed by its public hash id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedDocument {
    pub hash_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Content type tag, e.g. `html`.
    #[serde(rename = "type")]
    pub file_type: String,
    #[serde(default)]
    pub sharing: Sharing,
    #[serde(default)]
    pub file_items: Vec<DocumentPart>,
}

/// Tenant-scoped container; the `default_*` fields seed chat settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workspace {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub instructions: String,
    pub is_home: bool,
    pub default_model: Option<String>,
    pub default_prompt: Option<String>,
    pub default_temperature: Option<f64>,
    pub default_context_length: Option<u32>,
    pub include_profile_context: Option<bool>,
    pub include_workspace_instructions: Option<bool>,
    pub embeddings_provider: Option<String>,
}

/// Kinds of workspace-scoped collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Chat,
    Collection,
    Folder,
    File,
    Preset,
    Prompt,
    Tool,
    Model,
    Assistant,
}

impl ItemKind {
    pub const ALL: [Self; 9] = [
        Self::Chat,
        Self::Collection,
        Self::Folder,
        Self::File,
        Self::Preset,
        Self::Prompt,
        Self::Tool,
        Self::Model,
        Self::Assistant,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Collection => "collection",
            Self::Folder => "folder",
            Self::File => "file",
            Self::Preset => "preset",
            Self::Prompt => "prompt",
            Self::Tool => "tool",
            Self::Model => "model",
            Self::Assistant => "assistant",
        }
    }
}

/// A row of any workspace collection. Kind-specific fields live in `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceItem {
    pub id: String,
    pub kind: ItemKind,
    /// `None` for records that are only reachable through public listing.
    pub workspace_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sharing: Sharing,
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Object storage path of the item's image (assistants).
    #[serde(default)]
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_keys_are_flattened_and_redacted() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "user_id": "u1",
            "plan": "pro",
            "openai_api_key": "sk-secret",
            "azure_openai_endpoint": "https://azure.example.com"
        }))
        .unwrap();
        assert_eq!(profile.plan, Plan::Pro);
        assert_eq!(profile.keys.openai_api_key.as_deref(), Some("sk-secret"));

        let debug = format!("{profile:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
        assert!(debug.contains("https://azure.example.com"));
    }

    #[test]
    fn unknown_plans_are_kept_and_paid() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "user_id": "u1",
            "plan": "byok"
        }))
        .unwrap();
        assert_eq!(profile.plan, Plan::Other("byok".into()));
        assert!(!profile.plan.is_free());
        assert_eq!(profile.plan.as_str(), "byok");
        assert_eq!(serde_json::to_value(&profile.plan).unwrap(), "byok");
    }

    #[test]
    fn unknown_sharing_is_not_public() {
        let sharing: Sharing = serde_json::from_value(serde_json::json!("link")).unwrap();
        assert_eq!(sharing, Sharing::Other("link".into()));
        assert!(!sharing.is_public());
        assert_eq!(sharing.as_str(), "link");

        let public: Sharing = serde_json::from_value(serde_json::json!("public")).unwrap();
        assert!(public.is_public());
    }

    #[test]
    fn plan_defaults_to_free() {
        let profile: Profile =
            serde_json::from_value(serde_json::json!({ "id": "p1", "user_id": "u1" })).unwrap();
        assert!(profile.plan.is_free());
    }

    #[test]
    fn shared_document_uses_type_field() {
        let doc: SharedDocument = serde_json::from_value(serde_json::json!({
            "hash_id": "abc",
            "name": "Landing page",
            "type": "html",
            "sharing": "public",
            "file_items": [{ "content": "<p>hi</p>" }]
        }))
        .unwrap();
        assert_eq!(doc.file_type, "html");
        assert_eq!(doc.sharing, Sharing::Public);
        assert_eq!(doc.file_items.len(), 1);
    }
}
