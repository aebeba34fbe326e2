use crate::client::{CompletionClient, CompletionRequest};
use crate::error::{ErrorKind, Result};
use crate::models::{Naming, NamingRequest, Phase, Usage};
use crate::parse::{parse_reply, wants_more};
use crate::prompt::{PING, content_prompt, filename_prompt};
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-V2.5";

#[derive(Debug, Clone)]
pub struct NamerOptions {
    pub model: String,
    /// Model used for the content prompt; falls back to `model`.
    pub fallback_model: Option<String>,
    /// Ask with the filename alone before sending any document text.
    pub filename_first: bool,
}
impl Default for NamerOptions {
    fn default() -> Self {
        Self { model: DEFAULT_MODEL.to_string(), fallback_model: None, filename_first: true }
    }
}

/// Asks a language model for a document's title and author.
///
/// Cheap to clone; clones share the underlying client.
#[derive(Clone)]
pub struct Namer {
    client: Arc<dyn CompletionClient>,
    options: NamerOptions,
}
impl Namer {
    pub fn new(client: impl CompletionClient + 'static, options: NamerOptions) -> Self {
        Self::from_shared(Arc::new(client), options)
    }

    pub fn from_shared(client: Arc<dyn CompletionClient>, options: NamerOptions) -> Self {
        Self { client, options }
    }

    pub fn options(&self) -> &NamerOptions {
        &self.options
    }

    /// Names a document, trying its filename first when enabled.
    ///
    /// The filename prompt is cheap: when the model can identify the book from
    /// it, no document text is ever sent. A `MORE` reply moves on to the
    /// content prompt, which uses the fallback model when one is configured.
    #[tracing::instrument(skip_all, fields(filename = %request.filename, language = %request.language))]
    pub async fn name(&self, request: &NamingRequest) -> Result<Naming> {
        let mut usage = Usage::default();

        if self.options.filename_first {
            let prompt = filename_prompt(&request.filename, request.language);
            let completion = self.client.complete(&CompletionRequest::new(&self.options.model, prompt)).await?;
            usage += completion.usage;
            if !wants_more(&completion.content) {
                let result = parse_reply(&completion.content, request.language)?;
                tracing::debug!(%result, "Named from filename");
                return Ok(Naming { result, usage, phase: Phase::Filename });
            }
            tracing::debug!("Filename inconclusive, sending document text");
        }

        let model = self.options.fallback_model.as_deref().unwrap_or(&self.options.model);
        let prompt = content_prompt(&request.filename, request.language, &request.text);
        let completion = self.client.complete(&CompletionRequest::new(model, prompt)).await?;
        usage += completion.usage;
        let result = parse_reply(&completion.content, request.language)?;
        tracing::debug!(%result, tokens = usage.total(), "Named from content");
        Ok(Naming { result, usage, phase: Phase::Content })
    }

    /// Connection test: the model must answer a trivial prompt with `OK`.
    #[tracing::instrument(skip(self), fields(model = %self.options.model))]
    pub async fn ping(&self) -> Result<()> {
        let completion = self.client.complete(&CompletionRequest::new(&self.options.model, PING)).await?;
        if !completion.content.to_ascii_uppercase().contains("OK") {
            exn::bail!(ErrorKind::UnexpectedReply(completion.content.trim().to_string()));
        }
        tracing::info!("Language model connection OK");
        Ok(())
    }
}
