//! Reads saved share-page markup from stdin and prints the extracted
//! conversation as the JSON export envelope. Useful for parsing pages
//! saved with a browser or captured by other tooling, with no network.

use std::io::Read;

use tracing_subscriber::EnvFilter;

use convoscrape::{encoding, export, extract, Conversation, Options};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let mut raw = Vec::new();
    std::io::stdin().read_to_end(&mut raw)?;
    let html = encoding::decode(&raw);

    let options = Options::default();
    let messages = convoscrape::parse_conversation(&html, &options);
    if messages.is_empty() {
        anyhow::bail!("no conversation messages found in input");
    }

    let conversation = Conversation {
        title: extract::page_title(&html),
        source: "ChatGPT Parser".to_string(),
        messages,
    };
    println!("{}", export::json::render(&conversation)?);
    Ok(())
}
