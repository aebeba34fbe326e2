use retitle_extract::{Language, truncate_chars};

/// Characters of document text included in the content prompt.
pub const PROMPT_TEXT_CHARS: usize = 1000;
/// Keyword the model answers with when a filename alone isn't enough.
pub(crate) const MORE: &str = "MORE";
pub(crate) const PING: &str = "Connection test. Reply with the single word OK and nothing else.";

fn language_name(language: Language) -> &'static str {
    language.name().unwrap_or("unknown")
}

pub(crate) fn filename_prompt(filename: &str, language: Language) -> String {
    format!(
        "You are renaming an e-book file. The current filename is:\n\
         {filename}\n\
         The document appears to be written in {language}.\n\n\
         If the filename clearly identifies the book, reply with exactly one line in the form\n\
         Title - AuthorFullName\n\
         using ASCII characters only, with no explanation, quotes or file extension.\n\
         If the filename is too vague or noisy to identify the book, reply with the single word {MORE}.",
        language = language_name(language),
    )
}

pub(crate) fn content_prompt(filename: &str, language: Language, text: &str) -> String {
    format!(
        "You are renaming an e-book file. The current filename is:\n\
         {filename}\n\
         The document appears to be written in {language}. Its opening text is below.\n\n\
         Identify the book and reply with exactly one line in the form\n\
         Title - AuthorFullName\n\
         using ASCII characters only (transliterate if needed), with no explanation, quotes or file extension.\n\
         If the author cannot be determined, reply with the title alone.\n\n\
         Text:\n{text}",
        language = language_name(language),
        text = truncate_chars(text, PROMPT_TEXT_CHARS),
    )
}
