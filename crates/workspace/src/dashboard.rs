//! Dashboard sidebar tabs.

use {
    chatlabs_store::ItemKind,
    serde::{Deserialize, Serialize},
};

/// Sidebar width in pixels.
pub const SIDEBAR_WIDTH: u32 = 350;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Chats,
    Presets,
    Prompts,
    Files,
    Collections,
    Assistants,
    Tools,
    Models,
}

impl ContentType {
    pub const ALL: [Self; 8] = [
        Self::Chats,
        Self::Presets,
        Self::Prompts,
        Self::Files,
        Self::Collections,
        Self::Assistants,
        Self::Tools,
        Self::Models,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chats => "chats",
            Self::Presets => "presets",
            Self::Prompts => "prompts",
            Self::Files => "files",
            Self::Collections => "collections",
            Self::Assistants => "assistants",
            Self::Tools => "tools",
            Self::Models => "models",
        }
    }

    /// Tab from the `?tab=` query value. Missing or unknown values select chats.
    #[must_use]
    pub fn from_tab(tab: Option<&str>) -> Self {
        tab.and_then(|t| Self::ALL.into_iter().find(|c| c.as_str() == t))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn item_kind(self) -> ItemKind {
        match self {
            Self::Chats => ItemKind::Chat,
            Self::Presets => ItemKind::Preset,
            Self::Prompts => ItemKind::Prompt,
            Self::Files => ItemKind::File,
            Self::Collections => ItemKind::Collection,
            Self::Assistants => ItemKind::Assistant,
            Self::Tools => ItemKind::Tool,
            Self::Models => ItemKind::Model,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(None, ContentType::Chats)]
    #[case(Some("prompts"), ContentType::Prompts)]
    #[case(Some("models"), ContentType::Models)]
    #[case(Some("Models"), ContentType::Chats)]
    #[case(Some("folders"), ContentType::Chats)]
    #[case(Some(""), ContentType::Chats)]
    fn tab_parsing(#[case] tab: Option<&str>, #[case] expected: ContentType) {
        assert_eq!(ContentType::from_tab(tab), expected);
    }

    #[test]
    fn every_tab_round_trips() {
        for content in ContentType::ALL {
            assert_eq!(ContentType::from_tab(Some(content.as_str())), content);
        }
    }
}
