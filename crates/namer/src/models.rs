use retitle_extract::Language;
use serde::Deserialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::AddAssign;

/// Token accounting reported by the model provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}
impl Usage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}
impl AddAssign for Usage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

/// Everything the model gets to see about one document.
#[derive(Debug, Clone)]
pub struct NamingRequest {
    /// Leading text of the document (may be empty when only the filename is used).
    pub text: String,
    /// Original file stem, without extension.
    pub filename: String,
    pub language: Language,
}

/// A title and (possibly empty) author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingResult {
    pub title: String,
    pub author: String,
    pub language: Language,
}
impl NamingResult {
    pub fn has_author(&self) -> bool {
        !self.author.is_empty()
    }
}
impl Display for NamingResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.has_author() {
            true => write!(f, "{} - {}", self.title, self.author),
            false => write!(f, "{}", self.title),
        }
    }
}

/// Which prompt produced the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Filename,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    pub result: NamingResult,
    /// Summed over every prompt sent for this document.
    pub usage: Usage,
    pub phase: Phase,
}
