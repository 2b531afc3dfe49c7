//! SQLite-backed store using sqlx.
//!
//! Records are kept as JSON in a `data` column next to the few columns that
//! queries filter or sort on.

use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    serde::de::DeserializeOwned,
    sqlx::{Row, SqlitePool, sqlite::SqlitePoolOptions},
};

use crate::{
    Result,
    error::Context,
    store::{DocumentStore, MessageStore, ProfileStore, SessionStore, WorkspaceStore},
    types::{
        ChatMessage, ItemKind, Profile, Session, Sharing, SharedDocument, Workspace,
        WorkspaceItem,
    },
};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a pool for `database_url` and run migrations.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .with_context(|| format!("failed to connect to {database_url}"))?;

        crate::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Use an existing pool. Call [`crate::run_migrations`] first.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_data<T: DeserializeOwned>(
        &self,
        sql: &str,
        key: &str,
    ) -> Result<Option<T>> {
        let row = sqlx::query(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let data: String = row.get("data");
                Ok(Some(serde_json::from_str(&data)?))
            },
            None => Ok(None),
        }
    }
}

fn decode_items(rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<WorkspaceItem>> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let data: String = row.get("data");
        items.push(serde_json::from_str(&data)?);
    }
    Ok(items)
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn user_for_session(&self, token: &str) -> Result<Option<String>> {
        let now = Utc::now().timestamp_millis();
        let row = sqlx::query(
            "SELECT user_id FROM sessions
             WHERE token = ? AND (expires_at_ms IS NULL OR expires_at_ms > ?)",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.get("user_id")))
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at_ms) VALUES (?, ?, ?)
             ON CONFLICT(token) DO UPDATE SET user_id = excluded.user_id,
                                              expires_at_ms = excluded.expires_at_ms",
        )
        .bind(&session.token)
        .bind(&session.user_id)
        .bind(session.expires_at.map(|t| t.timestamp_millis()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for SqliteStore {
    async fn get_profile_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        self.fetch_data("SELECT data FROM profiles WHERE user_id = ?", user_id)
            .await
    }

    async fn save_profile(&self, profile: &Profile) -> Result<()> {
        let data = serde_json::to_string(profile)?;
        sqlx::query(
            "INSERT INTO profiles (user_id, data) VALUES (?, ?)
             ON CONFLICT(user_id) DO UPDATE SET data = excluded.data",
        )
        .bind(&profile.user_id)
        .bind(&data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn count_messages_since(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<u64>> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE user_id = ? AND created_at_ms >= ?",
        )
        .bind(user_id)
        .bind(since.timestamp_millis())
        .fetch_one(&self.pool)
        .await?;
        Ok(u64::try_from(count).ok())
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<()> {
        let data = serde_json::to_string(message)?;
        sqlx::query(
            "INSERT INTO messages (id, user_id, created_at_ms, data) VALUES (?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.user_id)
        .bind(message.created_at.timestamp_millis())
        .bind(&data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get_shared_document(&self, hash_id: &str) -> Result<Option<SharedDocument>> {
        self.fetch_data("SELECT data FROM shared_documents WHERE hash_id = ?", hash_id)
            .await
    }

    async fn save_shared_document(&self, document: &SharedDocument) -> Result<()> {
        let data = serde_json::to_string(document)?;
        sqlx::query(
            "INSERT INTO shared_documents (hash_id, data) VALUES (?, ?)
             ON CONFLICT(hash_id) DO UPDATE SET data = excluded.data",
        )
        .bind(&document.hash_id)
        .bind(&data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl WorkspaceStore for SqliteStore {
    async fn get_workspace(&self, id: &str) -> Result<Option<Workspace>> {
        self.fetch_data("SELECT data FROM workspaces WHERE id = ?", id)
            .await
    }

    async fn save_workspace(&self, workspace: &Workspace) -> Result<()> {
        let data = serde_json::to_string(workspace)?;
        sqlx::query(
            "INSERT INTO workspaces (id, data) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
        )
        .bind(&workspace.id)
        .bind(&data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_items(&self, kind: ItemKind, workspace_id: &str) -> Result<Vec<WorkspaceItem>> {
        let rows = sqlx::query(
            "SELECT data FROM workspace_items
             WHERE kind = ? AND workspace_id = ?
             ORDER BY created_at_ms ASC, id ASC",
        )
        .bind(kind.as_str())
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;
        decode_items(rows)
    }

    async fn list_public_items(&self, kind: ItemKind) -> Result<Vec<WorkspaceItem>> {
        let rows = sqlx::query(
            "SELECT data FROM workspace_items
             WHERE kind = ? AND sharing = ?
             ORDER BY created_at_ms ASC, id ASC",
        )
        .bind(kind.as_str())
        .bind(Sharing::Public.as_str())
        .fetch_all(&self.pool)
        .await?;
        decode_items(rows)
    }

    async fn save_item(&self, item: &WorkspaceItem) -> Result<()> {
        let data = serde_json::to_string(item)?;
        sqlx::query(
            "INSERT INTO workspace_items (kind, id, workspace_id, sharing, created_at_ms, data)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(kind, id) DO UPDATE SET workspace_id = excluded.workspace_id,
                                                 sharing = excluded.sharing,
                                                 created_at_ms = excluded.created_at_ms,
                                                 data = excluded.data",
        )
        .bind(item.kind.as_str())
        .bind(&item.id)
        .bind(&item.workspace_id)
        .bind(item.sharing.as_str())
        .bind(item.created_at.timestamp_millis())
        .bind(&data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, chrono::Duration};

    async fn store() -> SqliteStore {
        // One connection so every query sees the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::run_migrations(&pool).await.unwrap();
        SqliteStore::with_pool(pool)
    }

    fn message(id: &str, user_id: &str, created_at: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id: id.into(),
            user_id: user_id.into(),
            chat_id: "c1".into(),
            role: "user".into(),
            content: "hello".into(),
            created_at,
        }
    }

    #[tokio::test]
    async fn counts_messages_inside_window_per_user() {
        let store = store().await;
        let now = Utc::now();
        store
            .append_message(&message("m1", "u1", now - Duration::days(2)))
            .await
            .unwrap();
        store.append_message(&message("m2", "u1", now)).await.unwrap();
        store.append_message(&message("m3", "u1", now)).await.unwrap();
        store.append_message(&message("m4", "u2", now)).await.unwrap();

        let since = now - Duration::hours(1);
        assert_eq!(
            store.count_messages_since("u1", since).await.unwrap(),
            Some(2)
        );
        assert_eq!(
            store.count_messages_since("nobody", since).await.unwrap(),
            Some(0)
        );
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resolve() {
        let store = store().await;
        store
            .save_session(&Session {
                token: "live".into(),
                user_id: "u1".into(),
                expires_at: Some(Utc::now() + Duration::hours(1)),
            })
            .await
            .unwrap();
        store
            .save_session(&Session {
                token: "stale".into(),
                user_id: "u1".into(),
                expires_at: Some(Utc::now() - Duration::hours(1)),
            })
            .await
            .unwrap();

        assert_eq!(
            store.user_for_session("live").await.unwrap().as_deref(),
            Some("u1")
        );
        assert!(store.user_for_session("stale").await.unwrap().is_none());
        assert!(store.user_for_session("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_upsert_replaces_data() {
        let store = store().await;
        let mut profile = Profile {
            id: "p1".into(),
            user_id: "u1".into(),
            username: "ada".into(),
            display_name: "Ada".into(),
            plan: crate::types::Plan::Free,
            keys: Default::default(),
        };
        store.save_profile(&profile).await.unwrap();
        profile.plan = crate::types::Plan::Pro;
        store.save_profile(&profile).await.unwrap();

        let loaded = store.get_profile_by_user_id("u1").await.unwrap().unwrap();
        assert_eq!(loaded.plan, crate::types::Plan::Pro);
    }

    #[tokio::test]
    async fn lists_workspace_and_public_items_separately() {
        let store = store().await;
        let base = Utc::now();
        let item = |id: &str, ws: Option<&str>, sharing: Sharing, offset: i64| WorkspaceItem {
            id: id.into(),
            kind: ItemKind::Assistant,
            workspace_id: ws.map(str::to_string),
            name: id.into(),
            description: String::new(),
            sharing,
            folder_id: None,
            image_path: None,
            created_at: base + Duration::seconds(offset),
            data: serde_json::Value::Null,
        };
        store
            .save_item(&item("a2", Some("w1"), Sharing::Private, 2))
            .await
            .unwrap();
        store
            .save_item(&item("a1", Some("w1"), Sharing::Private, 1))
            .await
            .unwrap();
        store
            .save_item(&item("pub", None, Sharing::Public, 0))
            .await
            .unwrap();

        let ids: Vec<_> = store
            .list_items(ItemKind::Assistant, "w1")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, ["a1", "a2"]);

        let public = store.list_public_items(ItemKind::Assistant).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, "pub");
        assert!(store.list_items(ItemKind::Tool, "w1").await.unwrap().is_empty());
    }
}
