//! Strategy ladders over one HTML document.
//!
//! The pipeline works in two phases with different evidence quality, so the
//! strategy order differs per phase. A raw static page usually carries the
//! conversation only as an embedded payload, so payload scanning leads the
//! static ladder. A browser-rendered page has hydrated turn markup, which is
//! stronger evidence than payloads that may describe an earlier revision, so
//! the DOM passes lead the rendered ladder and the text heuristic closes it.
//!
//! Each strategy run parses its own document from the source string. That
//! keeps parsed trees out of pipeline state, which must stay `Send` across
//! awaits, and gives the text heuristic a private tree to prune.

use dom_query::Document;
use tracing::debug;

use crate::dedup::SeenMessages;
use crate::extractor::{dom, heuristic, structured};
use crate::message::Message;
use crate::options::Options;
use crate::patterns::TITLE_SITE_SUFFIX;

/// One extraction strategy, as ordered by the ladders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Embedded JSON payload scan over script content.
    Structured,
    /// Primary role-tagged DOM pass.
    DomPrimary,
    /// Loose secondary DOM pass.
    DomFallback,
    /// Line segmentation of visible text.
    Heuristic,
}

impl StrategyKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::DomPrimary => "dom-primary",
            Self::DomFallback => "dom-fallback",
            Self::Heuristic => "heuristic",
        }
    }
}

/// Strategy order for raw static documents.
pub const STATIC_LADDER: &[StrategyKind] = &[
    StrategyKind::Structured,
    StrategyKind::DomPrimary,
    StrategyKind::DomFallback,
];

/// Strategy order for browser-rendered documents.
pub const RENDERED_LADDER: &[StrategyKind] = &[
    StrategyKind::DomPrimary,
    StrategyKind::DomFallback,
    StrategyKind::Structured,
    StrategyKind::Heuristic,
];

/// Runs a single strategy over `html`.
pub fn run_strategy(
    kind: StrategyKind,
    html: &str,
    options: &Options,
    seen: &mut SeenMessages,
) -> Vec<Message> {
    let doc = Document::from(html);
    match kind {
        StrategyKind::Structured => structured::extract(&doc, seen),
        StrategyKind::DomPrimary => dom::extract_turns(&doc, options, seen),
        StrategyKind::DomFallback => dom::extract_loose(&doc, options, seen),
        StrategyKind::Heuristic => heuristic::extract(&doc, options, seen),
    }
}

/// Runs a ladder over `html`, stopping at the first strategy that yields
/// messages. An empty result means every strategy came up dry.
pub fn run_ladder(
    ladder: &[StrategyKind],
    html: &str,
    options: &Options,
    seen: &mut SeenMessages,
) -> Vec<Message> {
    for kind in ladder {
        let messages = run_strategy(*kind, html, options, seen);
        if messages.is_empty() {
            debug!(strategy = kind.as_str(), "strategy produced nothing");
        } else {
            debug!(
                strategy = kind.as_str(),
                count = messages.len(),
                "strategy produced messages"
            );
            return messages;
        }
    }
    Vec::new()
}

/// Extracts messages from a raw static document.
pub fn extract_messages(html: &str, options: &Options, seen: &mut SeenMessages) -> Vec<Message> {
    run_ladder(STATIC_LADDER, html, options, seen)
}

/// Extracts messages from a browser-rendered document.
pub fn extract_rendered(html: &str, options: &Options, seen: &mut SeenMessages) -> Vec<Message> {
    run_ladder(RENDERED_LADDER, html, options, seen)
}

/// Page title with the site-name suffix stripped.
///
/// Reads `<title>`, then the og:title meta tag. Returns `None` when both
/// are empty or just the site name.
#[must_use]
pub fn page_title(html: &str) -> Option<String> {
    let doc = Document::from(html);
    let title = clean_title(&doc.select("title").text());
    title.or_else(|| {
        doc.select(r#"meta[property="og:title"]"#)
            .attr("content")
            .and_then(|content| clean_title(&content))
    })
}

fn clean_title(raw: &str) -> Option<String> {
    let cleaned = TITLE_SITE_SUFFIX.replace(raw, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("chatgpt") {
        None
    } else {
        Some(cleaned.to_string())
    }
}
