use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
    #[serde(default)]
    pub source_urls: Vec<String>,
}

impl DictionaryEntry {
    /// First phonetic entry that actually carries an audio URL, if any.
    pub fn pronunciation_audio(&self) -> Option<&str> {
        self.phonetics
            .iter()
            .find(|phonetic| !phonetic.audio.is_empty())
            .map(|phonetic| phonetic.audio.as_str())
    }
}


#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Phonetic {
    // The API omits either field on some entries.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub audio: String,
}


#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Definition>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}


#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Definition {
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}
