use derive_more::Display;
use std::path::Path;

/// The document formats that can be renamed.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    #[display("PDF")]
    Pdf,
    #[display("EPUB")]
    Epub,
    #[display("MOBI")]
    Mobi,
    #[display("AZW3")]
    Azw3,
}
impl Format {
    pub const ALL: [Format; 4] = [Self::Pdf, Self::Epub, Self::Mobi, Self::Azw3];

    /// Case-insensitive lookup, with or without the leading dot.
    pub fn from_extension(ext: impl AsRef<str>) -> Option<Self> {
        match ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "epub" => Some(Self::Epub),
            "mobi" => Some(Self::Mobi),
            "azw3" => Some(Self::Azw3),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref().extension().and_then(|ext| ext.to_str()).and_then(Self::from_extension)
    }

    /// Canonical (lowercase, dotless) extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Epub => "epub",
            Self::Mobi => "mobi",
            Self::Azw3 => "azw3",
        }
    }

    /// Kindle containers have no pure-Rust reader; they go through `ebook-convert`.
    pub fn needs_conversion(&self) -> bool {
        matches!(self, Self::Mobi | Self::Azw3)
    }
}
