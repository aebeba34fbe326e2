//! Turns free-form model replies into a [`NamingResult`].
//!
//! Models are asked for a single `Title - AuthorFullName` line but routinely
//! wrap it in reasoning blocks, code fences, quotes or a `Title:` label.

use crate::error::{ErrorKind, Result};
use crate::models::NamingResult;
use crate::prompt::MORE;
use exn::OptionExt;
use regex::Regex;
use retitle_extract::{Format, Language};
use std::sync::LazyLock;

const SEPARATOR: &str = " - ";
const THINK_CLOSE: &str = "</think>";
/// Dashes models substitute for the requested hyphen.
const DASH_VARIANTS: [&str; 2] = [" \u{2013} ", " \u{2014} "];
/// Author placeholders treated as "no author".
const NO_AUTHOR: [&str; 4] = ["unknown", "unknown author", "n/a", "none"];
/// Opening and closing marks a whole reply may be wrapped in.
const QUOTE_PAIRS: [(char, char); 5] =
    [('"', '"'), ('\'', '\''), ('\u{201c}', '\u{201d}'), ('\u{2018}', '\u{2019}'), ('`', '`')];

static THINK_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());
static LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:title|filename|file name|answer|result)\s*:\s*").unwrap());

fn strip_reasoning(reply: &str) -> String {
    let reply = THINK_BLOCK.replace_all(reply, "");
    // Some providers drop the opening tag and only send the closing one.
    match reply.rfind(THINK_CLOSE) {
        Some(index) => reply[index + THINK_CLOSE.len()..].to_string(),
        None => reply.into_owned(),
    }
}

fn clean_line(line: &str) -> String {
    let line = line.trim().trim_matches(|c| matches!(c, '`' | '*'));
    let line = line.strip_prefix("- ").unwrap_or(line);
    let line = LABEL.replace(line.trim(), "");
    let mut line = strip_quotes(line.trim()).to_string();
    for dash in DASH_VARIANTS {
        line = line.replace(dash, SEPARATOR);
    }
    strip_extension(&line).to_string()
}

/// Unwraps matched quote pairs only, so `'Salem's Lot` keeps its apostrophe.
fn strip_quotes(mut line: &str) -> &str {
    while let Some(inner) = QUOTE_PAIRS
        .iter()
        .find_map(|&(open, close)| line.strip_prefix(open).and_then(|rest| rest.strip_suffix(close)))
    {
        line = inner.trim();
    }
    line
}

/// Removes a trailing e-book extension echoed back by the model.
fn strip_extension(line: &str) -> &str {
    match line.rsplit_once('.') {
        Some((stem, extension)) if Format::from_extension(extension).is_some() => stem.trim_end(),
        _ => line,
    }
}

fn is_more(line: &str) -> bool {
    line.trim_end_matches(['.', '!']).eq_ignore_ascii_case(MORE)
}

/// Returns `true` if the reply asks for more context instead of naming the book.
pub(crate) fn wants_more(reply: &str) -> bool {
    first_line(reply).is_some_and(|line| is_more(&line))
}

fn first_line(reply: &str) -> Option<String> {
    strip_reasoning(reply)
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .map(clean_line)
        .find(|line| !line.is_empty())
}

/// Parses a `Title - AuthorFullName` reply.
///
/// The split happens at the *last* separator, so titles like
/// `Star Wars - A New Hope - George Lucas` keep their inner dash. A reply
/// without a separator is taken as a title with no author.
pub fn parse_reply(reply: &str, language: Language) -> Result<NamingResult> {
    let line = first_line(reply).ok_or_raise(|| ErrorKind::Parse("empty reply".into()))?;
    if is_more(&line) {
        exn::bail!(ErrorKind::Parse(format!("model asked for more context: {line}")));
    }
    let (title, author) = match line.rsplit_once(SEPARATOR) {
        Some((title, author)) => (title.trim(), author.trim()),
        None => (line.trim(), ""),
    };
    if title.is_empty() {
        exn::bail!(ErrorKind::Parse(format!("reply has no title: {line}")));
    }
    let author = match NO_AUTHOR.iter().any(|placeholder| author.eq_ignore_ascii_case(placeholder)) {
        true => "",
        false => author,
    };
    Ok(NamingResult { title: title.to_string(), author: author.to_string(), language })
}
