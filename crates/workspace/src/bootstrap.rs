//! Workspace bootstrap: every collection read in one concurrent batch, then
//! assistant thumbnails fetched and inlined.

use {
    base64::Engine as _,
    chatlabs_store::{ItemKind, ObjectStore, Workspace, WorkspaceItem, WorkspaceStore},
    futures::{StreamExt, TryStreamExt, stream},
    serde::Serialize,
    tracing::{debug, info},
};

use crate::{
    error::{Error, Result},
    settings::ChatSettings,
};

/// Bucket holding assistant avatars.
pub const ASSISTANT_IMAGES_BUCKET: &str = "assistant_images";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkspaceCollections {
    pub chats: Vec<WorkspaceItem>,
    pub collections: Vec<WorkspaceItem>,
    pub folders: Vec<WorkspaceItem>,
    pub files: Vec<WorkspaceItem>,
    pub presets: Vec<WorkspaceItem>,
    pub prompts: Vec<WorkspaceItem>,
    /// Workspace tools followed by public tools not already listed.
    pub tools: Vec<WorkspaceItem>,
    pub models: Vec<WorkspaceItem>,
    /// Workspace assistants followed by public assistants not already listed.
    pub assistants: Vec<WorkspaceItem>,
}

impl WorkspaceCollections {
    #[must_use]
    pub fn items(&self, kind: ItemKind) -> &[WorkspaceItem] {
        match kind {
            ItemKind::Chat => &self.chats,
            ItemKind::Collection => &self.collections,
            ItemKind::Folder => &self.folders,
            ItemKind::File => &self.files,
            ItemKind::Preset => &self.presets,
            ItemKind::Prompt => &self.prompts,
            ItemKind::Tool => &self.tools,
            ItemKind::Model => &self.models,
            ItemKind::Assistant => &self.assistants,
        }
    }
}

/// Inlined assistant avatar. Empty strings when the assistant has no image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantImage {
    pub assistant_id: String,
    pub path: String,
    pub base64: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceBootstrap {
    pub workspace: Workspace,
    pub collections: WorkspaceCollections,
    /// Sorted by assistant id.
    pub assistant_images: Vec<AssistantImage>,
    pub chat_settings: ChatSettings,
}

fn merge_public(mut own: Vec<WorkspaceItem>, public: Vec<WorkspaceItem>) -> Vec<WorkspaceItem> {
    for item in public {
        if !own.iter().any(|o| o.id == item.id) {
            own.push(item);
        }
    }
    own
}

fn image_mime(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "image/png",
    }
}

async fn fetch_assistant_image(
    objects: &dyn ObjectStore,
    assistant: &WorkspaceItem,
) -> Result<AssistantImage> {
    let Some(path) = assistant.image_path.as_deref().filter(|p| !p.is_empty()) else {
        return Ok(AssistantImage {
            assistant_id: assistant.id.clone(),
            path: String::new(),
            base64: String::new(),
            url: String::new(),
        });
    };

    let base64 = match objects.get(ASSISTANT_IMAGES_BUCKET, path).await? {
        Some(bytes) => format!(
            "data:{};base64,{}",
            image_mime(path),
            base64::engine::general_purpose::STANDARD.encode(bytes)
        ),
        None => {
            debug!(assistant_id = %assistant.id, path, "assistant image missing");
            String::new()
        },
    };

    Ok(AssistantImage {
        assistant_id: assistant.id.clone(),
        path: path.to_string(),
        base64,
        url: objects.public_url(ASSISTANT_IMAGES_BUCKET, path),
    })
}

/// Load a workspace and all of its collections.
///
/// Collection reads run concurrently and the first failure aborts the whole
/// bootstrap. Assistant images are then fetched with at most
/// `image_concurrency` requests in flight.
pub async fn bootstrap(
    store: &dyn WorkspaceStore,
    objects: &dyn ObjectStore,
    workspace_id: &str,
    image_concurrency: usize,
) -> Result<WorkspaceBootstrap> {
    let (
        workspace,
        chats,
        collections,
        folders,
        files,
        presets,
        prompts,
        tools,
        models,
        assistants,
        public_assistants,
        public_tools,
    ) = tokio::try_join!(
        store.get_workspace(workspace_id),
        store.list_items(ItemKind::Chat, workspace_id),
        store.list_items(ItemKind::Collection, workspace_id),
        store.list_items(ItemKind::Folder, workspace_id),
        store.list_items(ItemKind::File, workspace_id),
        store.list_items(ItemKind::Preset, workspace_id),
        store.list_items(ItemKind::Prompt, workspace_id),
        store.list_items(ItemKind::Tool, workspace_id),
        store.list_items(ItemKind::Model, workspace_id),
        store.list_items(ItemKind::Assistant, workspace_id),
        store.list_public_items(ItemKind::Assistant),
        store.list_public_items(ItemKind::Tool),
    )?;

    let workspace = workspace.ok_or_else(|| Error::WorkspaceNotFound {
        id: workspace_id.to_string(),
    })?;

    let collections = WorkspaceCollections {
        chats,
        collections,
        folders,
        files,
        presets,
        prompts,
        tools: merge_public(tools, public_tools),
        models,
        assistants: merge_public(assistants, public_assistants),
    };

    let image_fetches: Vec<_> = collections
        .assistants
        .iter()
        .map(|assistant| fetch_assistant_image(objects, assistant))
        .collect();
    let mut assistant_images: Vec<AssistantImage> = stream::iter(image_fetches)
        .buffer_unordered(image_concurrency.max(1))
        .try_collect()
        .await?;
    assistant_images.sort_by(|a, b| a.assistant_id.cmp(&b.assistant_id));

    info!(
        workspace_id,
        chats = collections.chats.len(),
        assistants = collections.assistants.len(),
        "workspace bootstrapped"
    );

    Ok(WorkspaceBootstrap {
        chat_settings: ChatSettings::from_workspace(&workspace),
        workspace,
        collections,
        assistant_images,
    })
}
