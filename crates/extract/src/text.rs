//! Plain-text helpers shared by every format: markup stripping, whitespace
//! normalisation, and the "first non-empty chunk" policy.

use crate::consts::BODY_SELECTOR;
use scraper::{Html, Node};

/// Cuts `text` to at most `max_chars` characters, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Trims every line and drops the empty ones.
pub(crate) fn normalize(text: &str) -> String {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).collect::<Vec<_>>().join("\n")
}

/// Converts an (X)HTML document into plain text, one text node per line.
///
/// Text inside `<script>` and `<style>` is skipped. Malformed markup is fine,
/// html5ever recovers from pretty much anything.
pub(crate) fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let Some(body) = document.select(&BODY_SELECTOR).next() else {
        return String::new();
    };
    let mut lines = Vec::new();
    for node in body.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|el| matches!(el.name(), "script" | "style")))
            .unwrap_or(false);
        if !hidden && !text.trim().is_empty() {
            lines.push(text.trim().to_string());
        }
    }
    lines.join("\n")
}

/// Splits converter output into blank-line separated paragraphs.
pub(crate) fn paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    paragraphs
}

/// Returns the (0-based) index and normalised text of the first chunk whose
/// content isn't blank. Chunks after it are never pulled from the iterator,
/// which matters when producing a chunk is expensive (PDF pages).
pub(crate) fn first_non_empty<I>(chunks: I) -> Option<(usize, String)>
where
    I: IntoIterator<Item = String>,
{
    chunks.into_iter().map(|chunk| normalize(&chunk)).enumerate().find(|(_, chunk)| !chunk.is_empty())
}

/// Starting at the first non-empty chunk, keeps appending chunks until
/// `max_chars` characters have been collected.
pub(crate) fn lead_chunks<I>(chunks: I, max_chars: usize) -> Option<(usize, String)>
where
    I: IntoIterator<Item = String>,
{
    let mut chunks = chunks.into_iter();
    let (first, mut lead) = first_non_empty(chunks.by_ref())?;
    let mut collected = lead.chars().count();
    for chunk in chunks {
        if collected >= max_chars {
            break;
        }
        let chunk = normalize(&chunk);
        if chunk.is_empty() {
            continue;
        }
        collected += chunk.chars().count() + 1;
        lead.push('\n');
        lead.push_str(&chunk);
    }
    Some((first, truncate_chars(&lead, max_chars).to_string()))
}
