use chrono::{DateTime, Local};
use deep_context::{DeepContext, DeepContextClient};
use dictionary::{Dictionary, DictionaryEntry};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::coordinator::{SearchCoordinator, SearchState};
use crate::history::{HistoryItem, JsonFileStore};
use crate::utilities::{input, str_to_bool};

mod config;
mod coordinator;
mod history;
mod utilities;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    let dictionary = Dictionary::new();
    let deep_context =
        DeepContextClient::new(config.gemini_api_key).with_model(config.gemini_model);
    let store = JsonFileStore::new(&config.data_dir);
    let mut coordinator = SearchCoordinator::new(
        Box::new(dictionary),
        Box::new(deep_context),
        Box::new(store),
    );

    println!("Wordstopia - definitions, pronunciations and AI-powered insights.");
    println!("Type a word to look it up, or 'help' for the commands.");
    loop {
        let line = input(">> ")?;
        let line = line.trim();
        let mut command_parts = line.split_ascii_whitespace();
        if let Some(command) = command_parts.next() {
            match command {
                "exit" | "quit" | "q" => {
                    break;
                }
                "help" => {
                    print_help();
                }
                "define" | "find" | "search" => {
                    search(
                        &mut coordinator,
                        &command_parts.collect::<Vec<&str>>().join(" "),
                    )
                    .await;
                }
                "history" => {
                    print_history(coordinator.history());
                }
                "remove" => {
                    let word = command_parts.collect::<Vec<&str>>().join(" ");
                    if word.is_empty() {
                        println!("Usage: remove <word>");
                    } else {
                        coordinator.remove_history_item(&word);
                        println!("Removed '{word}' from your history.");
                    }
                }
                "clear" => {
                    let answer = input("Clear your entire search history? (y/N): ")?;
                    if str_to_bool(answer).unwrap_or(false) {
                        coordinator.clear_history();
                        println!("History cleared.");
                    }
                }
                "context" => {
                    show_deep_context(&mut coordinator).await;
                }
                "audio" => {
                    print_audio(coordinator.state());
                }
                _ => {
                    // Anything else goes straight into the search box.
                    search(&mut coordinator, line).await;
                }
            }
        }
    }
    Ok(())
}

async fn search(coordinator: &mut SearchCoordinator, term: &str) {
    let term = term.trim();
    if term.is_empty() {
        return;
    }
    println!("Scanning lexicon for '{term}'...");
    coordinator.search(term).await;
    match coordinator.state() {
        SearchState::Success(entry) => print_definition(entry),
        SearchState::Failure(message) => println!("{message}"),
        SearchState::Idle | SearchState::Loading => {}
    }
}

async fn show_deep_context(coordinator: &mut SearchCoordinator) {
    if !matches!(coordinator.state(), SearchState::Success(_)) {
        println!("Look up a word first, then ask for its deep context.");
        return;
    }
    println!("Consulting the lexicographer...");
    match coordinator.fetch_deep_context().await {
        Some(context) => print_deep_context(context),
        None => println!("Deep context is unavailable right now. Try again in a moment."),
    }
}

fn print_definition(entry: &DictionaryEntry) {
    println!("Showing definition for '{}':", entry.word);
    if let Some(phonetic) = &entry.phonetic {
        println!("    {phonetic}");
    }
    for meaning in &entry.meanings {
        println!("    {}:", meaning.part_of_speech);
        for definition in &meaning.definitions {
            println!("        {}", definition.definition);
            if let Some(example) = &definition.example {
                println!("          example: {example}");
            }
            if !definition.synonyms.is_empty() {
                println!("          synonyms: {}", definition.synonyms.join(", "));
            }
            if !definition.antonyms.is_empty() {
                println!("          antonyms: {}", definition.antonyms.join(", "));
            }
        }
        if !meaning.synonyms.is_empty() {
            println!("      synonyms: {}", meaning.synonyms.join(", "));
        }
        if !meaning.antonyms.is_empty() {
            println!("      antonyms: {}", meaning.antonyms.join(", "));
        }
    }
    if !entry.source_urls.is_empty() {
        println!("    sources: {}", entry.source_urls.join(", "));
    }
}

fn print_deep_context(context: &DeepContext) {
    println!("    mnemonic: {}", context.mnemonic);
    println!("    etymology: {}", context.etymology);
    println!("    usage tip: {}", context.usage_tip);
}

fn print_history(items: &[HistoryItem]) {
    if items.is_empty() {
        println!("No recent searches yet.");
        return;
    }
    println!("Recent searches:");
    for item in items {
        match DateTime::from_timestamp(item.timestamp / 1000, 0) {
            Some(time) => println!(
                "    {} ({})",
                item.word,
                time.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ),
            None => println!("    {}", item.word),
        }
    }
}

fn print_audio(state: &SearchState) {
    match state {
        SearchState::Success(entry) => match entry.pronunciation_audio() {
            Some(url) => println!("Pronunciation audio: {url}"),
            None => println!("No pronunciation audio for '{}'.", entry.word),
        },
        _ => println!("Look up a word first."),
    }
}

fn print_help() {
    println!("Commands:");
    println!("    <word>            look up a word (same as 'define <word>')");
    println!("    history           show your recent searches");
    println!("    remove <word>     remove a word from your history");
    println!("    clear             clear your history");
    println!("    context           AI mnemonic, etymology and usage tip for the shown word");
    println!("    audio             pronunciation audio link for the shown word");
    println!("    exit              leave");
}
