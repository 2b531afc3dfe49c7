//! Anchor rewriting for shared HTML shown inside an `<iframe srcdoc>`.
//!
//! Anchors get `rel="nofollow"`, and fragment links are re-scoped to
//! `about:srcdoc` so they scroll the frame instead of navigating the host.
//! End tags HTML lets authors omit are closed implicitly and a `<` that cannot
//! open a tag is kept as text. Markup that still fails to parse is served as-is.

use std::{borrow::Cow, sync::LazyLock};

use {
    quick_xml::{
        Reader, Writer,
        events::{BytesStart, Event},
    },
    regex::Regex,
    tracing::warn,
};

/// Prefix making a fragment link resolve against the frame document.
pub const SRCDOC_PREFIX: &str = "about:srcdoc";

/// File name annotations (`#filename=index.html#`) emitted ahead of generated
/// code. They are not part of the renderable content.
static FILENAME_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"#filename=[^#\r\n]+#[ \t]*(\r?\n)?").ok());

/// Elements that never have a closing tag in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose content is raw text rather than markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, thiserror::Error)]
pub enum SanitizeError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("unexpected closing tag </{found}>")]
    UnexpectedClose { found: String },

    #[error("unclosed element <{name}>")]
    Unclosed { name: String },
}

/// Remove file name annotations.
#[must_use]
pub fn strip_filename_markers(input: &str) -> Cow<'_, str> {
    match FILENAME_MARKER.as_ref() {
        Some(re) => re.replace_all(input, ""),
        None => Cow::Borrowed(input),
    }
}

/// Sanitize shared markup. Returns `input` unchanged when it cannot be parsed.
#[must_use]
pub fn sanitize_shared_html(input: &str) -> String {
    let stripped = strip_filename_markers(input);
    match rewrite_anchors(&stripped) {
        Ok(html) => html,
        Err(e) => {
            warn!(error = %e, "unable to parse shared html, serving it as is");
            input.to_string()
        },
    }
}

/// Parse, rewrite every `<a>` and serialize. Fails on malformed markup.
pub fn rewrite_anchors(html: &str) -> Result<String, SanitizeError> {
    let mut writer = Writer::new(Vec::with_capacity(html.len() + 64));
    let mut open: Vec<String> = Vec::new();
    // Start of the slice the current reader was created on.
    let mut offset = 0;
    let mut reader = html_reader(html);

    loop {
        let pos = offset + reader.buffer_position() as usize;
        if is_bare_lt(html, pos) {
            writer.get_mut().extend_from_slice(b"&lt;");
            offset = pos + 1;
            reader = html_reader(&html[offset..]);
            continue;
        }

        match reader.read_event()? {
            Event::Start(e) => {
                let name = tag_name(&e);
                if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                    writer.write_event(Event::Start(e))?;
                    let body_start = offset + reader.buffer_position() as usize;
                    let consumed = copy_raw_text(&html[body_start..], &name, writer.get_mut())?;
                    offset = body_start + consumed;
                    reader = html_reader(&html[offset..]);
                    continue;
                }
                let event = if name == "a" {
                    Event::Start(rewrite_anchor(&e)?)
                } else {
                    Event::Start(e)
                };
                if !VOID_ELEMENTS.contains(&name.as_str()) {
                    open.push(name);
                }
                writer.write_event(event)?;
            },
            Event::Empty(e) => {
                let event = if tag_name(&e) == "a" {
                    Event::Empty(rewrite_anchor(&e)?)
                } else {
                    Event::Empty(e)
                };
                writer.write_event(event)?;
            },
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                if !VOID_ELEMENTS.contains(&name.as_str()) {
                    // Elements opened after `name` had their end tags omitted.
                    match open.iter().rposition(|open| *open == name) {
                        Some(at) => open.truncate(at),
                        None => return Err(SanitizeError::UnexpectedClose { found: name }),
                    }
                }
                writer.write_event(Event::End(e))?;
            },
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    // Whatever is still open closes at the end of the document.
    Ok(String::from_utf8(writer.into_inner())?)
}

/// A `<` at `pos` that is not followed by a tag name, `/name`, `!` or `?`.
fn is_bare_lt(html: &str, pos: usize) -> bool {
    let bytes = html.as_bytes();
    if bytes.get(pos) != Some(&b'<') {
        return false;
    }
    match bytes.get(pos + 1) {
        Some(b) if b.is_ascii_alphabetic() || matches!(b, b'!' | b'?') => false,
        Some(b'/') => !bytes.get(pos + 2).is_some_and(u8::is_ascii_alphabetic),
        _ => true,
    }
}

fn html_reader(html: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(html);
    // Tag balance is tracked by the caller so HTML void elements are allowed.
    reader.config_mut().check_end_names = false;
    reader
}

/// Copy a raw text body and its closing tag verbatim. Returns the number of
/// bytes consumed from `rest`.
fn copy_raw_text(rest: &str, name: &str, out: &mut Vec<u8>) -> Result<usize, SanitizeError> {
    let unclosed = || SanitizeError::Unclosed {
        name: name.to_string(),
    };
    // ASCII lowercasing keeps byte offsets intact.
    let close = rest
        .to_ascii_lowercase()
        .find(&format!("</{name}"))
        .ok_or_else(unclosed)?;
    let end = rest[close..]
        .find('>')
        .map(|i| close + i + 1)
        .ok_or_else(unclosed)?;
    out.extend_from_slice(rest[..end].as_bytes());
    Ok(end)
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase()
}

/// Copy an anchor, forcing `rel="nofollow"` and re-scoping `#fragment` hrefs.
fn rewrite_anchor(e: &BytesStart<'_>) -> Result<BytesStart<'static>, SanitizeError> {
    let mut anchor = e.clone().into_owned();
    anchor.clear_attributes();

    for attr in e.html_attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if key.eq_ignore_ascii_case(b"rel") {
            continue;
        }
        let value = double_quote_safe(&attr.value);
        if key.eq_ignore_ascii_case(b"href") && value.starts_with(b"#") {
            let mut href = SRCDOC_PREFIX.as_bytes().to_vec();
            href.extend_from_slice(&value);
            anchor.push_attribute((key, href.as_slice()));
        } else {
            anchor.push_attribute((key, value.as_ref()));
        }
    }
    anchor.push_attribute((b"rel".as_slice(), b"nofollow".as_slice()));

    Ok(anchor)
}

/// Attribute values are re-emitted inside double quotes. Values that came from
/// single-quoted source may contain `"`, which must become `&quot;`. Existing
/// entity references are already escaped and pass through.
fn double_quote_safe(value: &[u8]) -> Cow<'_, [u8]> {
    if !value.contains(&b'"') {
        return Cow::Borrowed(value);
    }
    let mut out = Vec::with_capacity(value.len() + 10);
    for &b in value {
        if b == b'"' {
            out.extend_from_slice(b"&quot;");
        } else {
            out.push(b);
        }
    }
    Cow::Owned(out)
}
