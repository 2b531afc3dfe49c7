//! Public share pages for HTML documents published from a workspace.

pub mod error;
pub mod render;
pub mod sanitize;

pub use {
    error::{Error, Result},
    render::{
        Branding, HTML_DOCUMENT_TYPE, RemixSource, ShareView, parse_show_banner, remix_source,
        render_share, render_share_page,
    },
    sanitize::{SRCDOC_PREFIX, rewrite_anchors, sanitize_shared_html, strip_filename_markers},
};
