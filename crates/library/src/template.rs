//! Filename templating.
//!
//! Converts a [`NamingResult`] into a filename stem using a user-configured
//! [upon] template. The syntax follows upon's Mustache-like conventions
//! (`{{ variable }}`, `{{ value|formatter }}`), extended with:
//!
//! - **`ascii`**: the same sanitization applied to every final name.
//! - **`slug`**: lowercase, hyphenated slugs, stripping quotation marks first
//!   to avoid artifacts like leading/trailing hyphens.
//! - **`truncate`**: truncates strings to a maximum byte length at a character
//!   boundary, usable as either `truncate(value, n)` or `{{ value|truncate: n }}`.
//!
//! # Template Variables
//!
//! | Variable   | Type             | Description                                   |
//! |------------|------------------|-----------------------------------------------|
//! | `title`    | `String`         | Title suggested by the language model         |
//! | `author`   | `String`         | Author, empty if unknown or not ASCII-able    |
//! | `language` | `Option<String>` | ISO 639-3 code of the detected language       |
//! | `original` | `String`         | Original file stem                            |
//!
//! Whatever the template renders is sanitized again before the original
//! extension is appended, so no template can produce a path separator, a
//! non-ASCII character or a second extension.

use crate::error::{Error, ErrorKind, Result};
use crate::sanitize::{sanitize_stem, with_extension};
use exn::ResultExt;
use retitle_namer::NamingResult;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

/// `Title - Author`, or just `Title` without an author.
pub const DEFAULT_TEMPLATE: &str = "{{ title|ascii }}{% if author %} - {{ author|ascii }}{% endif %}";

/// Renders filenames from naming results.
///
/// Constructed via [`FromStr`], which compiles the template eagerly so that
/// syntax errors surface at creation time rather than at render time.
pub struct FilenameGenerator {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl Debug for FilenameGenerator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FilenameGenerator").field("template", &self.template.source()).finish()
    }
}
impl FromStr for FilenameGenerator {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}
impl FilenameGenerator {
    /// Renders the stem for `naming`, without any extension.
    ///
    /// A title that sanitizes to nothing is replaced by the author, or by the
    /// original stem when there is no usable author. The original stem is also
    /// used when the rendered result sanitizes to nothing.
    ///
    /// # Errors
    /// - [`ErrorKind::EmptyName`] if title, author and original stem are all
    ///   empty after sanitization.
    /// - [`ErrorKind::Template`] if rendering fails (unknown variable, etc.).
    #[instrument(skip_all, fields(title = %naming.title))]
    pub fn generate(&self, naming: &NamingResult, original: impl AsRef<Path>) -> Result<String> {
        let original = original.as_ref().file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default();
        let rendered = self
            .template
            .render(&self.engine, Self::parameters(naming, &original)?)
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        let stem = sanitize_stem(&rendered);
        if !stem.is_empty() {
            return Ok(stem);
        }
        let fallback = sanitize_stem(&original);
        if fallback.is_empty() {
            exn::bail!(ErrorKind::EmptyName(rendered));
        }
        tracing::warn!(rendered = %rendered, "Template rendered nothing usable, keeping the original stem");
        Ok(fallback)
    }

    /// Renders the full filename, keeping `original`'s extension verbatim.
    pub fn generate_filename(&self, naming: &NamingResult, original: impl AsRef<Path>) -> Result<String> {
        let original = original.as_ref();
        let stem = self.generate(naming, original)?;
        Ok(with_extension(&stem, original.extension().and_then(|ext| ext.to_str())))
    }

    fn parameters(naming: &NamingResult, original: &str) -> Result<upon::Value> {
        // An author that sanitizes to nothing would otherwise leave a dangling separator.
        let author = match sanitize_stem(&naming.author).is_empty() {
            true => "",
            false => naming.author.as_str(),
        };
        let (title, author) = match (sanitize_stem(&naming.title).is_empty(), author.is_empty()) {
            (false, _) => (naming.title.as_str(), author),
            (true, false) => (author, ""),
            (true, true) if !sanitize_stem(original).is_empty() => (original, ""),
            (true, true) => exn::bail!(ErrorKind::EmptyName(naming.title.clone())),
        };
        Ok(upon::value! {
            title: title,
            author: author,
            language: naming.language.code(),
            original: original,
        })
    }
}

/// Custom [`upon`] extensions for filename-safe string manipulation.
mod addons {
    use crate::sanitize::sanitize_stem;
    use rslug::slugify;
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    fn ascii_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", sanitize_stem(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Custom formatter that converts strings to slugs.
    ///
    /// Strips quotation marks before slugifying to avoid awkward slug output
    /// like `"hello"` becoming `-hello-`.
    fn slug_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => {
                let marks = [
                    '\u{0027}', '\u{0022}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201B}',
                    '\u{0060}', '\u{00AB}', '\u{00BB}', '\u{2039}', '\u{203A}',
                ];
                let stripped: String = s.chars().filter(|c| !marks.contains(c)).collect();
                write!(f, "{}", slugify!(&stripped))?
            },
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    /// Truncates a string to a maximum byte length at a character boundary.
    fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> String {
        s[..s.floor_char_boundary(max_bytes)].to_string()
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("ascii", ascii_formatter);
        engine.add_formatter("slug", slug_formatter);
        engine.add_function("truncate", truncate_to_char_boundary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retitle_extract::Language;
    use rstest::rstest;
    use std::ops::Deref;

    fn naming(title: &str, author: &str) -> NamingResult {
        NamingResult {
            title: title.to_string(),
            author: author.to_string(),
            language: Language::Detected { code: "eng", name: "English" },
        }
    }

    fn default_generator() -> FilenameGenerator {
        DEFAULT_TEMPLATE.parse().unwrap()
    }

    #[test]
    fn test_default_template_with_author() {
        let name = default_generator()
            .generate_filename(&naming("The Great Gatsby", "F. Scott Fitzgerald"), "/books/545.epub")
            .unwrap();
        assert_eq!(name, "The Great Gatsby - F Scott Fitzgerald.epub");
    }

    #[test]
    fn test_default_template_without_author() {
        let name =
            default_generator().generate_filename(&naming("Introduction to Algorithms", ""), "scan.pdf").unwrap();
        assert_eq!(name, "Introduction to Algorithms.pdf");
    }

    #[test]
    fn test_unrepresentable_author_dropped() {
        let name = default_generator().generate_filename(&naming("Dune", "弗兰克"), "x.mobi").unwrap();
        assert_eq!(name, "Dune.mobi");
    }

    #[test]
    fn test_extension_preserved_verbatim() {
        let name = default_generator().generate_filename(&naming("Dune", "Frank Herbert"), "DUNE.AZW3").unwrap();
        assert_eq!(name, "Dune - Frank Herbert.AZW3");
    }

    #[test]
    fn test_custom_template_variables() {
        let generator: FilenameGenerator = "{{ author }} ({{ language }}) {{ title }} [{{ original }}]".parse().unwrap();
        let stem = generator.generate(&naming("Dune", "Frank Herbert"), "dune_v2.pdf").unwrap();
        assert_eq!(stem, "Frank Herbert (eng) Dune [dune_v2]");
    }

    #[test]
    fn test_rendered_output_is_resanitized() {
        let generator: FilenameGenerator = "{{ author }}/{{ title }}".parse().unwrap();
        let stem = generator.generate(&naming("Les Misérables", "Victor Hugo"), "x.epub").unwrap();
        assert_eq!(stem, "Victor HugoLes Miserables");
    }

    #[test]
    fn test_slug_and_truncate() {
        let generator: FilenameGenerator = "{{ title|truncate: 10|slug }}".parse().unwrap();
        let stem = generator.generate(&naming("A Very Long Title Indeed", ""), "x.pdf").unwrap();
        assert_eq!(stem, "a-very-lon");
    }

    #[rstest]
    #[case("Liu Cixin", "/books/santi.epub", "Liu Cixin.epub")]
    #[case("刘慈欣", "/books/santi.epub", "santi.epub")]
    #[case("", "/books/B000FC0SIM.azw3", "B000FC0SIM.azw3")]
    fn test_unrepresentable_title_falls_back(#[case] author: &str, #[case] original: &str, #[case] expected: &str) {
        let name = default_generator().generate_filename(&naming("三体", author), original).unwrap();
        assert_eq!(name, expected);
    }

    #[test]
    fn test_empty_rendering_keeps_original_stem() {
        let generator: FilenameGenerator = "{{ author }}".parse().unwrap();
        let stem = generator.generate(&naming("Dune", ""), "dune_v2.pdf").unwrap();
        assert_eq!(stem, "dune_v2");
    }

    #[test]
    fn test_nothing_representable_is_an_error() {
        let error = default_generator().generate(&naming("三体", "刘慈欣"), "三体.epub").unwrap_err();
        assert!(matches!(error.deref(), ErrorKind::EmptyName(title) if title == "三体"));
    }

    #[test]
    fn test_debug_shows_template_source() {
        let debug = format!("{:?}", default_generator());
        assert!(debug.starts_with("FilenameGenerator"));
        assert!(debug.contains("{{ title|ascii }}"));
    }

    #[test]
    fn test_invalid_template() {
        let error = "{{ title".parse::<FilenameGenerator>().unwrap_err();
        assert!(matches!(error.deref(), ErrorKind::Template));
    }

    #[test]
    fn test_unknown_variable_fails_at_render() {
        let generator: FilenameGenerator = "{{ publisher }}".parse().unwrap();
        let error = generator.generate(&naming("Dune", ""), "x.pdf").unwrap_err();
        assert!(matches!(error.deref(), ErrorKind::Template));
    }
}
