//! Best-effort language detection.
//!
//! The detected language only ever *informs* the naming prompt, so detection
//! never fails: anything too short or too ambiguous to call resolves to
//! [`Language::Unknown`].

use crate::consts::DETECTION_SAMPLE_CHARS;
use crate::text::truncate_chars;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::LazyLock;
use whatlang::{Detector, Info, Lang};

/// Minimum `whatlang` confidence before a guess is reported.
const MIN_CONFIDENCE: f64 = 0.5;

/// Languages with a sizeable published catalogue. Close relatives outside this
/// list (Danish and Bokmål in particular) score within a hair of English on
/// short title pages, so a weak guess is retried against this list only.
const WIDELY_PUBLISHED: [Lang; 34] = [
    Lang::Eng, Lang::Fra, Lang::Deu, Lang::Spa, Lang::Ita, Lang::Por, Lang::Nld, Lang::Swe, Lang::Fin,
    Lang::Pol, Lang::Ces, Lang::Slk, Lang::Hun, Lang::Ron, Lang::Hrv, Lang::Slv, Lang::Lit, Lang::Lav,
    Lang::Est, Lang::Cat, Lang::Lat, Lang::Tur, Lang::Vie, Lang::Ind, Lang::Rus, Lang::Ukr, Lang::Bul,
    Lang::Srp, Lang::Ara, Lang::Pes, Lang::Hin, Lang::Heb, Lang::Cmn, Lang::Jpn,
];

static FALLBACK: LazyLock<Detector> = LazyLock::new(|| Detector::with_allowlist(WIDELY_PUBLISHED.to_vec()));

/// Language of a document's leading text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    Detected {
        /// ISO 639-3 code (e.g. `"eng"`).
        code: &'static str,
        /// English name of the language (e.g. `"English"`).
        name: &'static str,
    },
    #[default]
    Unknown,
}
impl Language {
    pub fn code(&self) -> Option<&'static str> {
        match *self {
            Self::Detected { code, .. } => Some(code),
            Self::Unknown => None,
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::Detected { name, .. } => Some(name),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Detected { .. })
    }
}
impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.code().unwrap_or("unknown"))
    }
}

/// Guesses the language of `text` from its first few hundred characters.
///
/// A guess below [`MIN_CONFIDENCE`] over every language is retried against the
/// widely published ones before giving up.
pub fn detect(text: impl AsRef<str>) -> Language {
    let sample = truncate_chars(text.as_ref(), DETECTION_SAMPLE_CHARS);
    let Some(info) = whatlang::detect(sample) else {
        return Language::Unknown;
    };
    if info.confidence() >= MIN_CONFIDENCE {
        return info.into();
    }
    tracing::debug!(guess = info.lang().code(), confidence = info.confidence(), "Retrying weak language guess");
    match FALLBACK.detect(sample) {
        Some(narrowed) if narrowed.confidence() >= MIN_CONFIDENCE => narrowed.into(),
        Some(narrowed) => {
            tracing::debug!(
                guess = narrowed.lang().code(),
                confidence = narrowed.confidence(),
                "Language guess too weak"
            );
            Language::Unknown
        },
        None => Language::Unknown,
    }
}

impl From<Info> for Language {
    fn from(info: Info) -> Self {
        Self::Detected { code: info.lang().code(), name: info.lang().eng_name() }
    }
}
