//! Per-client workspace state. A bootstrap hydrates it and the gateway serves
//! it as the dashboard's initial snapshot.

use {
    chatlabs_store::{ChatMessage, Workspace, WorkspaceItem},
    serde::Serialize,
    tracing::debug,
};

use crate::{
    bootstrap::{AssistantImage, WorkspaceBootstrap, WorkspaceCollections},
    dashboard::ContentType,
    settings::ChatSettings,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    selected_workspace: Option<Workspace>,
    collections: WorkspaceCollections,
    assistant_images: Vec<AssistantImage>,
    chat_settings: ChatSettings,
    content_type: ContentType,

    user_input: String,
    chat_messages: Vec<ChatMessage>,
    selected_chat: Option<WorkspaceItem>,
    is_generating: bool,
    first_token_received: bool,
    chat_files: Vec<WorkspaceItem>,
    chat_images: Vec<String>,
    new_message_files: Vec<WorkspaceItem>,
    new_message_images: Vec<String>,
    show_files_display: bool,
}

impl WorkspaceState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to a freshly bootstrapped workspace. The chat session is reset.
    pub fn hydrate(&mut self, bootstrap: WorkspaceBootstrap) {
        debug!(workspace_id = %bootstrap.workspace.id, "hydrating workspace state");
        self.reset_chat_session();
        self.selected_workspace = Some(bootstrap.workspace);
        self.collections = bootstrap.collections;
        self.assistant_images = bootstrap.assistant_images;
        self.chat_settings = bootstrap.chat_settings;
    }

    /// Clear everything tied to the current conversation.
    fn reset_chat_session(&mut self) {
        self.user_input.clear();
        self.chat_messages.clear();
        self.selected_chat = None;
        self.is_generating = false;
        self.first_token_received = false;
        self.chat_files.clear();
        self.chat_images.clear();
        self.new_message_files.clear();
        self.new_message_images.clear();
        self.show_files_display = false;
    }

    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = content_type;
    }
}
