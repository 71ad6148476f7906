use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

mod gemini;

use gemini::generate_context;

pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// AI-generated supplementary context for a single word.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeepContext {
    pub mnemonic: String,
    pub etymology: String,
    #[serde(rename = "usageTip")]
    pub usage_tip: String,
}

#[derive(Debug, Error)]
pub(crate) enum ContextFailure {
    #[error("failed to reach the generative api: {0}")]
    Fetch(reqwest::Error),
    #[error("generative api answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to deserialize the generative response: {0}")]
    Deserialize(reqwest::Error),
    #[error("generative response contained no text")]
    EmptyResponse,
    #[error("generative response payload did not match the expected shape: {0}")]
    MalformedPayload(serde_json::Error),
}

/// Client for the generative-language API.
///
/// The credential and model are fixed at construction. Fetching is
/// best-effort: a client without a credential, or any request that fails in
/// any way, resolves to `None` rather than an error.
pub struct DeepContextClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl DeepContextClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_owned(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Requests mnemonic/etymology/usage-tip context for `word`.
    ///
    /// One request per call, no retry. All failures are logged and
    /// normalized to `None` so a caller can simply offer to try again.
    pub async fn fetch_context(&self, word: &str) -> Option<DeepContext> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                debug!("no generative api credential configured, deep context disabled");
                return None;
            }
        };
        match generate_context(&self.client, api_key, &self.model, word).await {
            Ok(context) => Some(context),
            Err(failure) => {
                warn!(word, %failure, "deep context fetch failed");
                None
            }
        }
    }
}
