// https://dictionaryapi.dev/ - free, no credential, english entries only.
// Non-2xx covers "no definitions found" as well as rate limiting; callers
// cannot tell those apart and are not supposed to.

use crate::dictionary::DictionaryEntry;
use crate::LookupFailure;

const DICTIONARY_API_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

pub(crate) async fn get_definition(
    client: &reqwest::Client,
    word: &str,
) -> Result<DictionaryEntry, LookupFailure> {
    let url = entry_url(word).ok_or(LookupFailure::Url)?;
    let res = client.get(url).send().await.map_err(LookupFailure::Fetch)?;
    if !res.status().is_success() {
        return Err(LookupFailure::Status(res.status()));
    }
    let entries = res
        .json::<Vec<DictionaryEntry>>()
        .await
        .map_err(LookupFailure::Deserialize)?;
    // The API answers with a list of entries; only the first one is shown.
    entries.into_iter().next().ok_or(LookupFailure::EmptyResponse)
}

/// Builds the entry URL with `word` escaped as a single path segment.
fn entry_url(word: &str) -> Option<reqwest::Url> {
    let mut url = reqwest::Url::parse(DICTIONARY_API_URL).ok()?;
    url.path_segments_mut().ok()?.push(word);
    Some(url)
}
