use dictionary_api::get_definition;
use thiserror::Error;
use tracing::debug;

mod dictionary;
mod dictionary_api;

pub use dictionary::{Definition, DictionaryEntry, Meaning, Phonetic};

/// The one message shown to the user for any failed lookup.
pub const NOT_FOUND_MESSAGE: &str = "We couldn't find that word. Try another one!";

/// A lookup that produced no usable entry.
///
/// The API does not let callers distinguish an unknown word from a rate
/// limit or a transport failure, so neither does this crate; the underlying
/// cause is only logged.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct NotFoundError {
    message: String,
}

impl NotFoundError {
    pub fn new() -> Self {
        Self {
            message: NOT_FOUND_MESSAGE.to_owned(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for NotFoundError {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub(crate) enum LookupFailure {
    #[error("invalid request url")]
    Url,
    #[error("failed to reach the dictionary api: {0}")]
    Fetch(reqwest::Error),
    #[error("dictionary api answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to deserialize the dictionary response: {0}")]
    Deserialize(reqwest::Error),
    #[error("dictionary response contained no entries")]
    EmptyResponse,
}

pub struct Dictionary {
    client: reqwest::Client,
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Issues exactly one request for `word` and returns its first entry.
    ///
    /// `word` is sent as typed (path-escaped, no trimming or case folding).
    pub async fn lookup(&self, word: &str) -> Result<DictionaryEntry, NotFoundError> {
        get_definition(&self.client, word).await.map_err(|failure| {
            debug!(word, %failure, "dictionary lookup failed");
            NotFoundError::new()
        })
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}
