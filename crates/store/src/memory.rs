//! In-memory store for tests and ephemeral runs.

use std::{collections::HashMap, sync::Mutex};

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
};

use crate::{
    Result,
    store::{DocumentStore, MessageStore, ObjectStore, ProfileStore, SessionStore, WorkspaceStore},
    types::{
        ChatMessage, ItemKind, Profile, Session, Sharing, SharedDocument, Workspace,
        WorkspaceItem,
    },
};

/// `HashMap`-backed implementation of every record store. No persistence.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<String, Session>>,
    profiles: Mutex<HashMap<String, Profile>>,
    messages: Mutex<Vec<ChatMessage>>,
    documents: Mutex<HashMap<String, SharedDocument>>,
    workspaces: Mutex<HashMap<String, Workspace>>,
    items: Mutex<Vec<WorkspaceItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut items: Vec<WorkspaceItem>) -> Vec<WorkspaceItem> {
    items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    items
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn user_for_session(&self, token: &str) -> Result<Option<String>> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();
        Ok(sessions
            .get(token)
            .filter(|s| s.expires_at.is_none_or(|t| t > now))
            .map(|s| s.user_id.clone()))
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        let profiles = self.profiles.lock().unwrap_or_else(|e| e.into_inner());
        Ok(profiles.get(user_id).cloned())
    }

    async fn save_profile(&self, profile: &Profile) -> Result<()> {
        let mut profiles = self.profiles.lock().unwrap_or_else(|e| e.into_inner());
        profiles.insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn count_messages_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<u64>> {
        let messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        let count = messages
            .iter()
            .filter(|m| m.user_id == user_id && m.created_at >= since)
            .count();
        Ok(Some(count as u64))
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<()> {
        let mut messages = self.messages.lock().unwrap_or_else(|e| e.into_inner());
        messages.push(message.clone());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_shared_document(&self, hash_id: &str) -> Result<Option<SharedDocument>> {
        let documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        Ok(documents.get(hash_id).cloned())
    }

    async fn save_shared_document(&self, document: &SharedDocument) -> Result<()> {
        let mut documents = self.documents.lock().unwrap_or_else(|e| e.into_inner());
        documents.insert(document.hash_id.clone(), document.clone());
        Ok(())
    }
}

#[async_trait]
impl WorkspaceStore for MemoryStore {
    async fn get_workspace(&self, id: &str) -> Result<Option<Workspace>> {
        let workspaces = self.workspaces.lock().unwrap_or_else(|e| e.into_inner());
        Ok(workspaces.get(id).cloned())
    }

    async fn save_workspace(&self, workspace: &Workspace) -> Result<()> {
        let mut workspaces = self.workspaces.lock().unwrap_or_else(|e| e.into_inner());
        workspaces.insert(workspace.id.clone(), workspace.clone());
        Ok(())
    }

    async fn list_items(&self, kind: ItemKind, workspace_id: &str) -> Result<Vec<WorkspaceItem>> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(sorted(
            items
                .iter()
                .filter(|i| i.kind == kind && i.workspace_id.as_deref() == Some(workspace_id))
                .cloned()
                .collect(),
        ))
    }

    async fn list_public_items(&self, kind: ItemKind) -> Result<Vec<WorkspaceItem>> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(sorted(
            items
                .iter()
                .filter(|i| i.kind == kind && i.sharing == Sharing::Public)
                .cloned()
                .collect(),
        ))
    }

    async fn save_item(&self, item: &WorkspaceItem) -> Result<()> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.retain(|i| !(i.kind == item.kind && i.id == item.id));
        items.push(item.clone());
        Ok(())
    }
}

/// In-memory object store. Keys are validated like the filesystem store.
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    public_base_url: String,
}

impl MemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            public_base_url: public_base_url.into(),
        }
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new("/storage")
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> Result<()> {
        crate::objects::validate_segment(bucket)?;
        crate::objects::validate_key(key)?;
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        objects.insert((bucket.to_string(), key.to_string()), bytes);
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        crate::objects::validate_segment(bucket)?;
        crate::objects::validate_key(key)?;
        let objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        Ok(objects.get(&(bucket.to_string(), key.to_string())).cloned())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        crate::objects::join_public_url(&self.public_base_url, bucket, key)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_item_replaces_same_kind_and_id() {
        let store = MemoryStore::new();
        let mut item = WorkspaceItem {
            id: "t1".into(),
            kind: ItemKind::Tool,
            workspace_id: Some("w1".into()),
            name: "first".into(),
            description: String::new(),
            sharing: Sharing::Private,
            folder_id: None,
            image_path: None,
            created_at: Utc::now(),
            data: serde_json::Value::Null,
        };
        store.save_item(&item).await.unwrap();
        item.name = "second".into();
        store.save_item(&item).await.unwrap();

        let tools = store.list_items(ItemKind::Tool, "w1").await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "second");
    }

    #[tokio::test]
    async fn object_round_trip_and_url() {
        let store = MemoryObjectStore::default();
        store
            .put("assistant_images", "u1/a1.png", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(
            store.get("assistant_images", "u1/a1.png").await.unwrap(),
            Some(vec![1, 2, 3])
        );
        assert_eq!(
            store.public_url("assistant_images", "u1/a1.png"),
            "/storage/assistant_images/u1/a1.png"
        );
        assert!(store.put("b", "../escape", vec![]).await.is_err());
    }
}
