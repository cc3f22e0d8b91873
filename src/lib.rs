//! # convoscrape
//!
//! Extraction and export of shared ChatGPT conversations.
//!
//! The library drives a two-phase pipeline over a share URL: a static fetch
//! whose markup is scanned for embedded JSON payloads and role-tagged DOM
//! structure, then (only when that yields nothing) a headless-browser
//! rendering pass running the same DOM scans plus a text-segmentation
//! heuristic. Every strategy funnels candidates through one normalization
//! pass, so ordering, role filtering, deduplication, and content
//! classification behave identically no matter which strategy produced a
//! message.
//!
//! ## Extracting from a live share URL
//!
//! ```no_run
//! use convoscrape::{HttpSource, Options, ShareUrl};
//!
//! # async fn run() -> convoscrape::Result<()> {
//! let url = ShareUrl::parse("https://chatgpt.com/share/67212ac8-0a04-8003-98b3-1e4121ba4d02")?;
//! let options = Options::default();
//! let source = HttpSource::new(&options)?;
//!
//! let conversation = convoscrape::parse_share(&source, &url, &options).await?;
//! println!("{} messages from {}", conversation.messages.len(), conversation.source);
//! # Ok(())
//! # }
//! ```
//!
//! ## Parsing saved markup offline
//!
//! ```
//! use convoscrape::Options;
//!
//! let html = r#"<script>{"messages":[
//!     {"role":"user","content":"What is a slice?"},
//!     {"role":"assistant","content":"A view into a contiguous sequence."}
//! ]}</script>"#;
//!
//! let messages = convoscrape::parse_conversation(html, &Options::default());
//! assert_eq!(messages.len(), 2);
//! assert_eq!(messages[0].content, "What is a slice?");
//! ```

mod error;
mod extractor;
mod options;

/// Headless-browser rendering and PDF printing.
pub mod browser;

/// Lexical content classification (code, links, images).
pub mod classify;

/// Per-run message deduplication.
pub mod dedup;

/// Character encoding detection and decoding for fetched bytes.
pub mod encoding;

/// Export renderers (CSV, JSON, printable HTML).
pub mod export;

/// Strategy kinds and the per-phase strategy ladders.
pub mod extract;

/// Document retrieval seam and the HTTP implementation.
pub mod fetch;

/// Canonical conversation types.
pub mod message;

/// Compiled regex patterns and CSS selector banks.
pub mod patterns;

/// The two-phase extraction pipeline.
pub mod pipeline;

/// Share URL validation and id derivation.
pub mod share_url;

// Public API - re-exports
pub use error::{Error, Result};
pub use fetch::{DocumentSource, HttpSource};
pub use message::{Conversation, Message, Role, IMAGE_ONLY_PLACEHOLDER};
pub use options::{Options, DEFAULT_USER_AGENT};
pub use pipeline::parse_share;
pub use share_url::ShareUrl;

use dedup::SeenMessages;

/// Extracts messages from saved share-page markup without any network.
///
/// Runs the static strategy ladder and falls through to heuristic
/// segmentation, so both raw saved pages and browser-saved rendered pages
/// parse. Returns an empty list when no strategy matches; callers that
/// need the error form should map that onto [`Error::NoMessages`].
#[must_use]
pub fn parse_conversation(html: &str, options: &Options) -> Vec<Message> {
    let mut seen = SeenMessages::new();
    let messages = extract::extract_messages(html, options, &mut seen);
    if messages.is_empty() {
        return extract::run_strategy(extract::StrategyKind::Heuristic, html, options, &mut seen);
    }
    messages
}
