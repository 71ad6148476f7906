use std::env;
use std::path::PathBuf;

/// Runtime settings, resolved once at startup.
pub struct Config {
    /// Directory holding the persisted search history.
    pub data_dir: PathBuf,
    /// Credential for the generative-language API. Absent means the deep
    /// context feature is simply unavailable.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = env::var("WORDSTOPIA_DATA_DIR")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("wordstopia")))
            .unwrap_or_else(|| PathBuf::from("."));

        // API_KEY is the name the web build deployed with.
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.is_empty());

        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| deep_context::DEFAULT_MODEL.to_owned());

        Config {
            data_dir,
            gemini_api_key,
            gemini_model,
        }
    }
}
