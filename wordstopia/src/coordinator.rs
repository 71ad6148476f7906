use async_trait::async_trait;
use chrono::Utc;
use deep_context::DeepContext;
use dictionary::{DictionaryEntry, NotFoundError};
use tracing::debug;

use crate::history::{HistoryItem, HistoryStore};

pub const MAX_HISTORY: usize = 10;

/// Port for the dictionary lookup API.
#[async_trait]
pub trait LookupClient: Send + Sync {
    async fn lookup(&self, word: &str) -> Result<DictionaryEntry, NotFoundError>;
}

#[async_trait]
impl LookupClient for dictionary::Dictionary {
    async fn lookup(&self, word: &str) -> Result<DictionaryEntry, NotFoundError> {
        dictionary::Dictionary::lookup(self, word).await
    }
}

/// Port for the AI deep-context API.
#[async_trait]
pub trait ContextClient: Send + Sync {
    async fn fetch_context(&self, word: &str) -> Option<DeepContext>;
}

#[async_trait]
impl ContextClient for deep_context::DeepContextClient {
    async fn fetch_context(&self, word: &str) -> Option<DeepContext> {
        deep_context::DeepContextClient::fetch_context(self, word).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Loading,
    Success(DictionaryEntry),
    Failure(String),
}

/// Owns the current lookup state, the deep context for the displayed word,
/// and the bounded recent-searches list.
///
/// All collaborators are injected, so tests run against in-memory fakes.
/// Responses are tagged with a sequence number and a response is applied
/// only if it belongs to the most recently issued search; a slower, stale
/// response can never overwrite a newer one.
pub struct SearchCoordinator {
    lookup: Box<dyn LookupClient>,
    context: Box<dyn ContextClient>,
    store: Box<dyn HistoryStore>,
    state: SearchState,
    deep_context: Option<DeepContext>,
    history: Vec<HistoryItem>,
    latest_seq: u64,
}

impl SearchCoordinator {
    pub fn new(
        lookup: Box<dyn LookupClient>,
        context: Box<dyn ContextClient>,
        store: Box<dyn HistoryStore>,
    ) -> Self {
        let history = normalized(store.load());
        Self {
            lookup,
            context,
            store,
            state: SearchState::Idle,
            deep_context: None,
            history,
            latest_seq: 0,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    pub fn deep_context(&self) -> Option<&DeepContext> {
        self.deep_context.as_ref()
    }

    /// Looks up `term` and records it in the history on success.
    ///
    /// A term that trims to nothing is ignored. Failure keeps the history
    /// untouched and stores the user-facing message.
    pub async fn search(&mut self, term: &str) {
        let term = term.trim().to_owned();
        if term.is_empty() {
            return;
        }
        let seq = self.begin_search();
        let outcome = self.lookup.lookup(&term).await;
        self.finish_search(seq, &term, outcome);
    }

    fn begin_search(&mut self) -> u64 {
        self.latest_seq += 1;
        self.state = SearchState::Loading;
        // The displayed word is about to change.
        self.deep_context = None;
        self.latest_seq
    }

    fn finish_search(
        &mut self,
        seq: u64,
        term: &str,
        outcome: Result<DictionaryEntry, NotFoundError>,
    ) {
        if seq != self.latest_seq {
            debug!(term, "discarding response of a superseded search");
            return;
        }
        match outcome {
            Ok(entry) => {
                self.state = SearchState::Success(entry);
                self.record_search(term);
            }
            Err(error) => {
                self.state = SearchState::Failure(error.message().to_owned());
            }
        }
    }

    /// Moves `term` to the front of the history with a fresh timestamp.
    fn record_search(&mut self, term: &str) {
        let lowered = term.to_lowercase();
        self.history
            .retain(|item| item.word.to_lowercase() != lowered);
        self.history.insert(
            0,
            HistoryItem {
                word: term.to_owned(),
                timestamp: now_ms(),
            },
        );
        self.history.truncate(MAX_HISTORY);
        self.store.save(&self.history);
    }

    /// Requests deep context for the currently displayed word.
    ///
    /// Only meaningful in the success state; resolves to `None` otherwise,
    /// on any fetch failure, or when the search moved on mid-flight. The
    /// view is free to trigger it again.
    pub async fn fetch_deep_context(&mut self) -> Option<&DeepContext> {
        let word = match &self.state {
            SearchState::Success(entry) => entry.word.clone(),
            _ => return None,
        };
        let seq = self.latest_seq;
        let fetched = self.context.fetch_context(&word).await;
        if seq != self.latest_seq {
            debug!(%word, "discarding deep context of a superseded search");
            return None;
        }
        self.deep_context = fetched;
        self.deep_context.as_ref()
    }

    /// Removes every item whose word matches `word` exactly.
    pub fn remove_history_item(&mut self, word: &str) {
        self.history.retain(|item| item.word != word);
        self.store.save(&self.history);
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.store.clear();
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Re-establishes the collection invariant on data loaded from storage:
/// no case-insensitive duplicates, at most [`MAX_HISTORY`] items.
fn normalized(mut items: Vec<HistoryItem>) -> Vec<HistoryItem> {
    let mut seen: Vec<String> = Vec::new();
    items.retain(|item| {
        let lowered = item.word.to_lowercase();
        if seen.contains(&lowered) {
            false
        } else {
            seen.push(lowered);
            true
        }
    });
    items.truncate(MAX_HISTORY);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    fn entry(word: &str) -> DictionaryEntry {
        let body = format!(r#"{{ "word": "{word}" }}"#);
        serde_json::from_str(&body).unwrap()
    }

    fn context() -> DeepContext {
        serde_json::from_str(
            r#"{ "mnemonic": "m", "etymology": "e", "usageTip": "u" }"#,
        )
        .unwrap()
    }

    /// Answers every lookup with an entry for the requested word.
    struct EchoLookup;

    #[async_trait]
    impl LookupClient for EchoLookup {
        async fn lookup(&self, word: &str) -> Result<DictionaryEntry, NotFoundError> {
            Ok(entry(word))
        }
    }

    /// Answers every lookup with the canonical lowercase form.
    struct CanonicalLookup;

    #[async_trait]
    impl LookupClient for CanonicalLookup {
        async fn lookup(&self, word: &str) -> Result<DictionaryEntry, NotFoundError> {
            Ok(entry(&word.to_lowercase()))
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl LookupClient for FailingLookup {
        async fn lookup(&self, _word: &str) -> Result<DictionaryEntry, NotFoundError> {
            Err(NotFoundError::new())
        }
    }

    struct StaticContext;

    #[async_trait]
    impl ContextClient for StaticContext {
        async fn fetch_context(&self, _word: &str) -> Option<DeepContext> {
            Some(context())
        }
    }

    struct NoContext;

    #[async_trait]
    impl ContextClient for NoContext {
        async fn fetch_context(&self, _word: &str) -> Option<DeepContext> {
            None
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        items: Mutex<Vec<HistoryItem>>,
        cleared: AtomicBool,
    }

    impl MemoryStore {
        fn with_items(items: Vec<HistoryItem>) -> Arc<Self> {
            Arc::new(Self {
                items: Mutex::new(items),
                cleared: AtomicBool::new(false),
            })
        }

        fn items(&self) -> Vec<HistoryItem> {
            self.items.lock().unwrap().clone()
        }
    }

    impl HistoryStore for Arc<MemoryStore> {
        fn load(&self) -> Vec<HistoryItem> {
            self.items()
        }

        fn save(&self, items: &[HistoryItem]) {
            *self.items.lock().unwrap() = items.to_vec();
        }

        fn clear(&self) {
            self.items.lock().unwrap().clear();
            self.cleared.store(true, Ordering::SeqCst);
        }
    }

    fn item(word: &str, timestamp: i64) -> HistoryItem {
        HistoryItem {
            word: word.to_owned(),
            timestamp,
        }
    }

    fn coordinator(
        lookup: impl LookupClient + 'static,
        context: impl ContextClient + 'static,
        store: Arc<MemoryStore>,
    ) -> SearchCoordinator {
        SearchCoordinator::new(Box::new(lookup), Box::new(context), Box::new(store))
    }

    #[tokio::test]
    async fn successful_search_reaches_success_and_prepends_history() {
        let store = MemoryStore::with_items(vec![]);
        let mut coordinator = coordinator(CanonicalLookup, NoContext, store.clone());

        coordinator.search("  Hello ").await;

        // The entry carries the API's canonical form, the history the typed term.
        assert_eq!(
            coordinator.state(),
            &SearchState::Success(entry("hello"))
        );
        let history = coordinator.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].word, "Hello");
        assert!(history[0].timestamp > 0);
        assert_eq!(store.items().len(), 1);
    }

    #[tokio::test]
    async fn searching_a_known_word_moves_it_to_the_front() {
        let store = MemoryStore::with_items(vec![item("dog", 10), item("cat", 5)]);
        let mut coordinator = coordinator(EchoLookup, NoContext, store.clone());

        coordinator.search("cat").await;

        let history = coordinator.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].word, "cat");
        assert!(history[0].timestamp > 5);
        assert_eq!(history[1], item("dog", 10));
    }

    #[tokio::test]
    async fn history_dedup_is_case_insensitive() {
        let store = MemoryStore::with_items(vec![item("Cat", 5)]);
        let mut coordinator = coordinator(EchoLookup, NoContext, store.clone());

        coordinator.search("cAT").await;

        let history = coordinator.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].word, "cAT");
    }

    #[tokio::test]
    async fn history_never_grows_beyond_the_cap() {
        let store = MemoryStore::with_items(vec![]);
        let mut coordinator = coordinator(EchoLookup, NoContext, store.clone());

        for word in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"] {
            coordinator.search(word).await;
        }

        let history = coordinator.history();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].word, "l");
        assert!(!history.iter().any(|item| item.word == "a"));
        assert_eq!(store.items().len(), MAX_HISTORY);
    }

    #[tokio::test]
    async fn failed_search_reports_the_message_and_keeps_history() {
        let store = MemoryStore::with_items(vec![item("dog", 10)]);
        let mut coordinator = coordinator(FailingLookup, NoContext, store.clone());

        coordinator.search("asdfqwer123").await;

        assert_eq!(
            coordinator.state(),
            &SearchState::Failure(dictionary::NOT_FOUND_MESSAGE.to_owned())
        );
        assert_eq!(coordinator.history(), [item("dog", 10)]);
        assert_eq!(store.items(), vec![item("dog", 10)]);
    }

    #[tokio::test]
    async fn blank_terms_are_ignored() {
        let store = MemoryStore::with_items(vec![]);
        let mut coordinator = coordinator(EchoLookup, NoContext, store.clone());

        coordinator.search("   ").await;

        assert_eq!(coordinator.state(), &SearchState::Idle);
        assert!(coordinator.history().is_empty());
    }

    #[tokio::test]
    async fn stale_responses_are_discarded() {
        let store = MemoryStore::with_items(vec![]);
        let mut coordinator = coordinator(EchoLookup, NoContext, store.clone());

        // Two overlapping searches; the older one resolves last.
        let first = coordinator.begin_search();
        let second = coordinator.begin_search();
        coordinator.finish_search(second, "fast", Ok(entry("fast")));
        coordinator.finish_search(first, "slow", Ok(entry("slow")));

        assert_eq!(coordinator.state(), &SearchState::Success(entry("fast")));
        let history = coordinator.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].word, "fast");
    }

    #[tokio::test]
    async fn remove_history_item_is_exact_and_idempotent() {
        let store = MemoryStore::with_items(vec![item("Cat", 5), item("dog", 10)]);
        let mut coordinator = coordinator(EchoLookup, NoContext, store.clone());

        // Case-sensitive: "cat" does not match "Cat".
        coordinator.remove_history_item("cat");
        assert_eq!(coordinator.history().len(), 2);

        coordinator.remove_history_item("Cat");
        let after_first = coordinator.history().to_vec();
        coordinator.remove_history_item("Cat");
        assert_eq!(coordinator.history(), after_first);
        assert_eq!(after_first, vec![item("dog", 10)]);
        assert_eq!(store.items(), after_first);
    }

    #[tokio::test]
    async fn clear_history_empties_the_list_and_the_store() {
        let store = MemoryStore::with_items(vec![item("cat", 5)]);
        let mut coordinator = coordinator(EchoLookup, NoContext, store.clone());

        coordinator.clear_history();

        assert!(coordinator.history().is_empty());
        assert!(store.items().is_empty());
        assert!(store.cleared.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn stored_history_is_normalized_on_startup() {
        let mut items: Vec<HistoryItem> = (0..12).map(|i| item(&format!("w{i}"), i)).collect();
        items.insert(1, item("W0", 99));
        let store = MemoryStore::with_items(items);
        let coordinator = coordinator(EchoLookup, NoContext, store);

        let history = coordinator.history();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].word, "w0");
        assert_eq!(history[1].word, "w1");
    }

    #[tokio::test]
    async fn deep_context_follows_the_displayed_word() {
        let store = MemoryStore::with_items(vec![]);
        let mut coordinator = coordinator(EchoLookup, StaticContext, store);

        // Nothing displayed yet.
        assert_eq!(coordinator.fetch_deep_context().await, None);

        coordinator.search("serendipity").await;
        assert_eq!(coordinator.fetch_deep_context().await, Some(&context()));
        assert_eq!(coordinator.deep_context(), Some(&context()));

        // A new search discards the context of the previous word.
        coordinator.search("ethereal").await;
        assert_eq!(coordinator.deep_context(), None);
    }

    #[tokio::test]
    async fn unavailable_deep_context_can_be_retried() {
        let store = MemoryStore::with_items(vec![]);
        let mut coordinator = coordinator(EchoLookup, NoContext, store);

        coordinator.search("ethereal").await;
        assert_eq!(coordinator.fetch_deep_context().await, None);
        // Still in success state, the trigger stays available.
        assert!(matches!(coordinator.state(), SearchState::Success(_)));
        assert_eq!(coordinator.fetch_deep_context().await, None);
    }
}
