//! Walking the MIME tree of a Gmail `Message.payload`.
//!
//! Two body extraction strategies coexist on purpose: `extract_plain_body`
//! only looks at the top-level parts, `extract_html_content` walks the whole
//! tree. Callers pick the one matching the tool they serve.

use super::error::GmailError;
use super::types::MessagePart;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref BR_TAG: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref P_CLOSE: Regex = Regex::new(r"(?i)</p\s*>").unwrap();
    static ref ANY_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Case-insensitive header lookup on a single part.
pub fn header<'a>(part: &'a MessagePart, name: &str) -> Option<&'a str> {
    part.headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Decodes Gmail's URL-safe base64. Padding is optional and standard
/// alphabet characters are tolerated.
pub fn decode_body_data(data: &str) -> Result<Vec<u8>, GmailError> {
    let normalized: String = data
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| GmailError::Decode(e.to_string()))
}

fn decode_text(data: &str) -> Option<String> {
    match decode_body_data(data) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            tracing::debug!("skipping undecodable body part: {}", e);
            None
        }
    }
}

/// Plain-text body: the first top-level `text/plain` part, or the payload's
/// own data when it has no parts. Nested multiparts are not searched.
pub fn extract_plain_body(payload: &MessagePart) -> Option<String> {
    if payload.parts.is_empty() {
        return payload.data().and_then(decode_text);
    }
    payload
        .parts
        .iter()
        .find(|p| p.mime_type == "text/plain")
        .and_then(|p| p.data())
        .and_then(decode_text)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlContent {
    pub html: Option<String>,
    pub text: Option<String>,
    pub attachment_count: usize,
}

impl HtmlContent {
    /// The plain part if present, otherwise an approximation derived from
    /// the HTML part.
    pub fn readable_text(&self) -> String {
        match (&self.text, &self.html) {
            (Some(text), _) => text.clone(),
            (None, Some(html)) => html_to_text(html),
            (None, None) => String::new(),
        }
    }
}

/// Depth-first walk over the whole tree: first HTML body, first plain body,
/// and the number of parts that reference an attachment.
pub fn extract_html_content(payload: &MessagePart) -> HtmlContent {
    let mut out = HtmlContent::default();
    walk_html(payload, &mut out);
    out
}

fn walk_html(part: &MessagePart, out: &mut HtmlContent) {
    match part.mime_type.as_str() {
        "text/html" if out.html.is_none() => out.html = part.data().and_then(decode_text),
        "text/plain" if out.text.is_none() => out.text = part.data().and_then(decode_text),
        _ => {}
    }
    if part.attachment_id().is_some() {
        out.attachment_count += 1;
    }
    for child in &part.parts {
        walk_html(child, out);
    }
}

/// Best-effort HTML to text. Only `&nbsp; &lt; &gt; &quot; &amp;` are
/// unescaped; any other entity is left as-is.
pub fn html_to_text(html: &str) -> String {
    let s = BR_TAG.replace_all(html, "\n");
    let s = P_CLOSE.replace_all(&s, "\n\n");
    let s = ANY_TAG.replace_all(&s, "");
    // &amp; goes last so "&amp;lt;" stays a literal "&lt;".
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentInfo {
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
    pub attachment_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
}

/// Every part (the payload itself included) with both a filename and an
/// attachment id.
pub fn collect_attachments(payload: &MessagePart) -> Vec<AttachmentInfo> {
    let mut out = Vec::new();
    walk_attachments(payload, &mut out);
    out
}

fn walk_attachments(part: &MessagePart, out: &mut Vec<AttachmentInfo>) {
    if let Some(id) = part.attachment_id() {
        if !part.filename.is_empty() {
            out.push(AttachmentInfo {
                filename: part.filename.clone(),
                mime_type: part.mime_type.clone(),
                size: part.size(),
                attachment_id: id.to_string(),
                part_id: part.part_id.clone(),
            });
        }
    }
    for child in &part.parts {
        walk_attachments(child, out);
    }
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
