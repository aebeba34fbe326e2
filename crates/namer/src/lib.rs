mod client;
pub mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod models;
mod namer;
mod parse;
mod prompt;

pub use crate::client::{
    Completion, CompletionClient, CompletionRequest, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, OpenAiClient,
};
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MockClient;
pub use crate::models::{Naming, NamingRequest, NamingResult, Phase, Usage};
pub use crate::namer::{DEFAULT_MODEL, Namer, NamerOptions};
pub use crate::parse::parse_reply;
pub use crate::prompt::PROMPT_TEXT_CHARS;
