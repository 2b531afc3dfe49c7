//! Workspace UI state: chat settings defaults, dashboard tabs, and the
//! bootstrap that loads every workspace collection on navigation.

pub mod bootstrap;
pub mod dashboard;
pub mod error;
pub mod settings;
pub mod state;

pub use {
    bootstrap::{
        ASSISTANT_IMAGES_BUCKET, AssistantImage, WorkspaceBootstrap, WorkspaceCollections,
        bootstrap,
    },
    dashboard::{ContentType, SIDEBAR_WIDTH},
    error::{Error, Result},
    settings::{ChatSettings, EmbeddingsProvider},
    state::WorkspaceState,
};
