//! Persistence traits for the records the server reads.

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
};

use crate::{
    Result,
    types::{
        ChatMessage, ItemKind, Profile, Session, SharedDocument, Workspace, WorkspaceItem,
    },
};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the user id behind a live (unexpired) session token.
    async fn user_for_session(&self, token: &str) -> Result<Option<String>>;
    async fn save_session(&self, session: &Session) -> Result<()>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile_by_user_id(&self, user_id: &str) -> Result<Option<Profile>>;
    async fn save_profile(&self, profile: &Profile) -> Result<()>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Number of messages the user created at or after `since`.
    ///
    /// `None` means the backend could not produce a count, which is not the
    /// same as zero.
    async fn count_messages_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<u64>>;
    async fn append_message(&self, message: &ChatMessage) -> Result<()>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_shared_document(&self, hash_id: &str) -> Result<Option<SharedDocument>>;
    async fn save_shared_document(&self, document: &SharedDocument) -> Result<()>;
}

#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    async fn get_workspace(&self, id: &str) -> Result<Option<Workspace>>;
    async fn save_workspace(&self, workspace: &Workspace) -> Result<()>;
    /// Items of one kind linked to a workspace, oldest first.
    async fn list_items(&self, kind: ItemKind, workspace_id: &str) -> Result<Vec<WorkspaceItem>>;
    /// Items of one kind shared publicly, across all workspaces.
    async fn list_public_items(&self, kind: ItemKind) -> Result<Vec<WorkspaceItem>>;
    async fn save_item(&self, item: &WorkspaceItem) -> Result<()>;
}

/// Bucketed blob storage for assistant images and generated images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object, replacing any existing object with the same key.
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<()>;
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;
    /// Public URL under which the object is served.
    fn public_url(&self, bucket: &str, key: &str) -> String;
}
