//! ASCII, filesystem-safe filenames.
//!
//! Every name this crate produces passes through [`sanitize_stem`], which is
//! deterministic and idempotent: sanitizing an already-sanitized stem returns
//! it unchanged.

use crate::error::{ErrorKind, Result};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Longest stem (in bytes, which is also characters once sanitized).
pub const MAX_STEM_BYTES: usize = 200;

/// Characters rejected by at least one common filesystem. Dots are included
/// so that a stem never grows a second extension (`F. Scott` → `F Scott`).
const ILLEGAL: [char; 10] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*', '.'];

/// Typographic characters and letters without a compatibility decomposition.
fn transliterate(c: char) -> Option<&'static str> {
    Some(match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{00B4}' => "'",
        '\u{2010}'..='\u{2015}' | '\u{2212}' => "-",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ø' => "o",
        'Ø' => "O",
        'ł' => "l",
        'Ł' => "L",
        'đ' => "d",
        'Đ' => "D",
        'þ' => "th",
        'Þ' => "Th",
        _ => return None,
    })
}

/// Reduces arbitrary text to a printable-ASCII filename stem.
///
/// 1. NFKD decomposition with combining marks dropped (`é` → `e`, `ﬁ` → `fi`).
/// 2. Typographic punctuation mapped to ASCII.
/// 3. Remaining non-ASCII and control characters dropped.
/// 4. `< > : " / \ | ? *` and `.` removed.
/// 5. Whitespace collapsed and trimmed.
/// 6. Truncated to [`MAX_STEM_BYTES`] and trimmed again.
///
/// The result may be empty; callers decide whether that's an error.
pub fn sanitize_stem(input: impl AsRef<str>) -> String {
    let mut ascii = String::with_capacity(input.as_ref().len());
    for c in input.as_ref().nfkd().filter(|c| !is_combining_mark(*c)) {
        match transliterate(c) {
            Some(replacement) => ascii.push_str(replacement),
            None if c.is_whitespace() => ascii.push(' '),
            None if c.is_ascii() && !c.is_ascii_control() && !ILLEGAL.contains(&c) => ascii.push(c),
            None => {},
        }
    }
    let mut stem = ascii.split_whitespace().collect::<Vec<_>>().join(" ");
    if stem.len() > MAX_STEM_BYTES {
        // ASCII only at this point, so every index is a char boundary.
        stem.truncate(MAX_STEM_BYTES);
        stem.truncate(stem.trim_end().len());
    }
    stem
}

/// Appends the original extension exactly as it was (case included).
pub(crate) fn with_extension(stem: &str, extension: Option<&str>) -> String {
    match extension.map(|ext| ext.trim_start_matches('.')).filter(|ext| !ext.is_empty()) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

/// Builds `Title - Author.ext`, or `Title.ext` when the author sanitizes to
/// nothing. A title that sanitizes to nothing (an all-CJK title, for instance)
/// gives way to the author alone.
///
/// # Errors
/// [`ErrorKind::EmptyName`] when nothing of either the title or the author
/// survives sanitization.
pub fn sanitize(title: impl AsRef<str>, author: impl AsRef<str>, extension: impl AsRef<str>) -> Result<String> {
    let clean_title = sanitize_stem(title.as_ref());
    let clean_author = sanitize_stem(author.as_ref());
    let stem = match (clean_title.is_empty(), clean_author.is_empty()) {
        (false, true) => clean_title,
        (false, false) => sanitize_stem(format!("{clean_title} - {clean_author}")),
        (true, false) => clean_author,
        (true, true) => exn::bail!(ErrorKind::EmptyName(title.as_ref().to_string())),
    };
    Ok(with_extension(&stem, Some(extension.as_ref())))
}
