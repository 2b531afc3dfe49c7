//! Shared document lookup and page rendering.

use {
    askama::Template,
    chatlabs_store::{DocumentStore, SharedDocument},
    tracing::debug,
};

use crate::{
    Error, Result,
    sanitize::{sanitize_shared_html, strip_filename_markers},
};

/// The only document type this page renders.
pub const HTML_DOCUMENT_TYPE: &str = "html";

/// Brand shown in the share banner and page title.
#[derive(Debug, Clone)]
pub struct Branding {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareView {
    pub hash_id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    /// Sanitized markup for the isolated frame.
    pub html: String,
    pub show_banner: bool,
    pub brand_name: String,
    pub banner_url: String,
    pub remix_url: String,
}

/// Interpret `__show_banner`. Only a literal `"false"` or an empty value hides
/// the banner; absent means shown.
#[must_use]
pub fn parse_show_banner(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some("true") => true,
        Some("false") => false,
        Some(other) => !other.is_empty(),
    }
}

/// Why a document is not renderable, for logging.
fn rejection(doc: &SharedDocument) -> Option<&'static str> {
    if doc.file_type != HTML_DOCUMENT_TYPE {
        Some("not an html document")
    } else if !doc.sharing.is_public() {
        Some("not public")
    } else if doc.file_items.is_empty() {
        Some("no content")
    } else {
        None
    }
}

/// A shared document that passes every structural check, with its first part.
async fn load_renderable(
    documents: &dyn DocumentStore,
    hash_id: &str,
) -> Result<Option<(SharedDocument, String)>> {
    let Some(doc) = documents.get_shared_document(hash_id).await? else {
        debug!(hash_id, "share not found");
        return Ok(None);
    };
    if let Some(reason) = rejection(&doc) {
        debug!(hash_id, reason, "share not renderable");
        return Ok(None);
    }
    let Some(first) = doc.file_items.first().map(|part| part.content.clone()) else {
        return Ok(None);
    };
    Ok(Some((doc, first)))
}

/// Look up a shared document and build its view. `Ok(None)` is the not-found
/// outcome: missing, not html, not public, or without content.
pub async fn render_share(
    documents: &dyn DocumentStore,
    branding: &Branding,
    hash_id: &str,
    show_banner: bool,
) -> Result<Option<ShareView>> {
    let Some((doc, content)) = load_renderable(documents, hash_id).await? else {
        return Ok(None);
    };

    let id = urlencoding::encode(hash_id);
    let separator = if branding.url.contains('?') { '&' } else { '?' };
    Ok(Some(ShareView {
        hash_id: doc.hash_id.clone(),
        title: format!("{} - Created with {}", doc.name, branding.name),
        name: doc.name.clone(),
        description: doc.description.clone(),
        html: sanitize_shared_html(&content),
        show_banner,
        brand_name: branding.name.clone(),
        banner_url: format!(
            "{}{separator}utm_source=app_share&utm_medium={id}",
            branding.url
        ),
        remix_url: format!("/remix/{id}"),
    }))
}

/// Source markup offered by the banner's remix link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemixSource {
    /// Download name derived from the hash id.
    pub file_name: String,
    /// The author's markup without file name annotations or anchor rewrites.
    pub html: String,
}

/// Look up a renderable shared document and return its markup for remixing.
/// Not-found rules match [`render_share`].
pub async fn remix_source(
    documents: &dyn DocumentStore,
    hash_id: &str,
) -> Result<Option<RemixSource>> {
    let Some((doc, content)) = load_renderable(documents, hash_id).await? else {
        return Ok(None);
    };
    let stem: String = doc
        .hash_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    let stem = if stem.is_empty() { "shared".to_string() } else { stem };
    Ok(Some(RemixSource {
        file_name: format!("{stem}.html"),
        html: strip_filename_markers(&content).into_owned(),
    }))
}

#[derive(Template)]
#[template(path = "share.html", escape = "html")]
struct SharePageTemplate<'a> {
    view: &'a ShareView,
}

/// Render the full share page.
pub fn render_share_page(view: &ShareView) -> Result<String> {
    SharePageTemplate { view }
        .render()
        .map_err(|e| Error::external(format!("failed to render share page {}", view.hash_id), e))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        chatlabs_store::{DocumentPart, MemoryStore, Sharing},
        rstest::rstest,
    };

    fn branding() -> Branding {
        Branding {
            name: "ChatLabs".into(),
            url: "https://labs.writingmate.ai/".into(),
        }
    }

    fn doc(hash_id: &str) -> SharedDocument {
        SharedDocument {
            hash_id: hash_id.into(),
            name: "Pricing page".into(),
            description: "A landing page".into(),
            file_type: "html".into(),
            sharing: Sharing::Public,
            file_items: vec![DocumentPart {
                content: r##"<p><a href="#plans">Plans</a></p>"##.into(),
            }],
        }
    }

    async fn store_with(documents: Vec<SharedDocument>) -> MemoryStore {
        let store = MemoryStore::new();
        for d in documents {
            store.save_shared_document(&d).await.unwrap();
        }
        store
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some("true"), true)]
    #[case(Some("false"), false)]
    #[case(Some(""), false)]
    #[case(Some("1"), true)]
    #[case(Some("no"), true)]
    fn show_banner_flag(#[case] raw: Option<&str>, #[case] expected: bool) {
        assert_eq!(parse_show_banner(raw), expected);
    }

    #[tokio::test]
    async fn renders_public_html_documents() {
        let store = store_with(vec![doc("abc")]).await;
        let view = render_share(&store, &branding(), "abc", true)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.title, "Pricing page - Created with ChatLabs");
        assert_eq!(
            view.html,
            r##"<p><a href="about:srcdoc#plans" rel="nofollow">Plans</a></p>"##
        );
        assert_eq!(
            view.banner_url,
            "https://labs.writingmate.ai/?utm_source=app_share&utm_medium=abc"
        );
        assert_eq!(view.remix_url, "/remix/abc");
    }

    #[tokio::test]
    async fn structural_violations_are_not_found() {
        let mut wrong_type = doc("type");
        wrong_type.file_type = "markdown".into();
        let mut private = doc("private");
        private.sharing = Sharing::Private;
        let mut empty = doc("empty");
        empty.file_items.clear();
        let mut link_only = doc("link-only");
        link_only.sharing = Sharing::Other("link".into());
        let store = store_with(vec![wrong_type, private, empty, link_only]).await;

        for id in ["missing", "type", "private", "empty", "link-only"] {
            let view = render_share(&store, &branding(), id, true).await.unwrap();
            assert!(view.is_none(), "{id} should not render");
            let source = remix_source(&store, id).await.unwrap();
            assert!(source.is_none(), "{id} should not be remixable");
        }
    }

    #[tokio::test]
    async fn remix_source_is_the_unrewritten_markup() {
        let mut annotated = doc("abc/../x");
        annotated.file_items[0].content =
            "#filename=index.html#\n<a href=\"#plans\">Plans</a>".into();
        let store = store_with(vec![annotated]).await;
        let source = remix_source(&store, "abc/../x").await.unwrap().unwrap();
        assert_eq!(source.file_name, "abcx.html");
        assert_eq!(source.html, "<a href=\"#plans\">Plans</a>");
    }

    #[tokio::test]
    async fn malformed_content_is_served_unchanged() {
        let mut broken = doc("broken");
        broken.file_items[0].content = "<div><a href=\"#x\">x</span>".into();
        let store = store_with(vec![broken]).await;
        let view = render_share(&store, &branding(), "broken", false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.html, "<div><a href=\"#x\">x</span>");
        assert!(!view.show_banner);
    }

    #[tokio::test]
    async fn page_embeds_escaped_srcdoc_and_banner() {
        let store = store_with(vec![doc("abc")]).await;
        let view = render_share(&store, &branding(), "abc", true)
            .await
            .unwrap()
            .unwrap();
        let page = render_share_page(&view).unwrap();
        assert!(page.contains("<title>Pricing page - Created with ChatLabs</title>"));
        assert!(page.contains("srcdoc=\"&#60;p&#62;") || page.contains("srcdoc=\"&lt;p&gt;"));
        assert!(page.contains("allow=\"clipboard-write\""));
        assert!(page.contains("class=\"share-banner\""));
        assert!(page.contains("/remix/abc"));
    }

    #[tokio::test]
    async fn page_without_banner_omits_it() {
        let store = store_with(vec![doc("abc")]).await;
        let view = render_share(&store, &branding(), "abc", false)
            .await
            .unwrap()
            .unwrap();
        let page = render_share_page(&view).unwrap();
        assert!(!page.contains("class=\"share-banner\""));
    }
}
