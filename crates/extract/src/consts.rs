use scraper::Selector;
use std::sync::LazyLock;

/// Upper bound (in characters) on the amount of leading text handed downstream.
pub const MAX_LEAD_CHARS: usize = 4096;
/// Number of PDF pages scanned for the first non-empty one.
pub const DEFAULT_MAX_PAGES: usize = 10;
/// Number of characters sampled for language detection.
pub const DETECTION_SAMPLE_CHARS: usize = 500;
/// Calibre ships its converter under this name on every platform.
pub(crate) const CONVERTER_EXECUTABLES: [&str; 2] = ["ebook-convert", "ebook-convert.exe"];

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(BODY_SELECTOR, "body");
