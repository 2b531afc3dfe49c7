//! Records and persistence for profiles, sessions, messages, shared
//! documents, workspaces and object storage.
//!
//! Every collaborator is a trait so the server can run on SQLite
//! ([`sqlite::SqliteStore`]) or entirely in memory ([`memory::MemoryStore`]).

pub mod error;
pub mod memory;
pub mod objects;
pub mod sqlite;
pub mod store;
pub mod types;

pub use {
    error::{Error, Result},
    memory::{MemoryObjectStore, MemoryStore},
    objects::FsObjectStore,
    sqlite::SqliteStore,
    store::{DocumentStore, MessageStore, ObjectStore, ProfileStore, SessionStore, WorkspaceStore},
    types::{
        ChatMessage, DocumentPart, ItemKind, Plan, Profile, ProviderKeys, Session, Sharing,
        SharedDocument, Workspace, WorkspaceItem,
    },
};

/// Run database migrations for the store tables.
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
