//! Compiled regex patterns and CSS selectors for conversation extraction.
//!
//! All patterns are compiled once at startup using `LazyLock` for efficiency.
//! Patterns are organized by their role in the extraction pipeline. The
//! lexical patterns are tuned against the share-page layouts observed in the
//! wild; treat them as a pattern bank, not a grammar.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Share URL Validation
// =============================================================================

/// Matches a well-formed share URL: https scheme, chatgpt.com host
/// (optionally www-prefixed), `/share/` path, opaque alphanumeric/hyphen id.
pub static SHARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(?:www\.)?chatgpt\.com/share/[A-Za-z0-9-]+$").expect("SHARE_URL regex")
});

/// Captures the canonical 36-char UUID form of a share id when present.
/// Used for export file naming; non-UUID ids fall back to a slug.
pub static SHARE_ID_UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/share/([a-f0-9-]{36})(?:[/?#]|$)").expect("SHARE_ID_UUID regex")
});

// =============================================================================
// Message Normalization Patterns
// =============================================================================

/// Matches the speaker-label boilerplate some layouts prepend to message
/// text. Stripped during normalization before classification and dedup.
pub static SPEAKER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(You said:|ChatGPT said:|Assistant said:)\s*").expect("SPEAKER_PREFIX regex")
});

/// Matches runs of whitespace for single-space collapsing in CSV output.
pub static WHITESPACE_COLLAPSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_COLLAPSE regex"));

/// Strips the site-name suffix some layouts append to the page title.
pub static TITLE_SITE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[|\-\u{2013}]\s*ChatGPT\s*$").expect("TITLE_SITE_SUFFIX regex")
});

// =============================================================================
// Content Classification Patterns
// =============================================================================

/// Matches a fenced code block (triple-backtick delimited, any language tag).
pub static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[\s\S]*?```").expect("CODE_FENCE regex"));

/// Matches an inline code span.
pub static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`]+`").expect("INLINE_CODE regex"));

/// Matches common programming-language and SQL keyword fragments.
pub static CODE_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)def\s+\w+|function\s+\w+|class\s+\w+|import\s+\w+|from\s+\w+|console\.log|print\(|SELECT\s+|INSERT\s+|UPDATE\s+|DELETE\s+",
    )
    .expect("CODE_KEYWORDS regex")
});

/// Matches a bare http(s) URL token or a markdown-style link.
pub static LINK_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^\s]+|\[([^\]]+)\]\([^)]+\)").expect("LINK_TOKEN regex")
});

/// Matches image evidence in text: markdown image tokens, image file
/// extensions, known generated-image host/path fragments, and the
/// five-part hyphenated asset ids the share pages emit.
pub static IMAGE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)!\[([^\]]*)\]\([^)]+\)|\.(jpg|jpeg|png|gif|webp|svg)(\?[^\s]*)?|oaiusercontent\.com[^\s]*/files/|generated image|group/imagegen-image|group/image-gen|image-\w+-\w+-\w+-\w+-\w+",
    )
    .expect("IMAGE_TOKEN regex")
});

// =============================================================================
// Structured Payload Anchors
// =============================================================================
// Each anchor ends at the opening bracket of its payload; the payload itself
// is sliced by the balanced-bracket scanner in extractor::structured rather
// than captured here, so nested JSON survives intact.

/// Anchors a flat `"messages": [...]` array.
pub static MESSAGES_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""messages"\s*:\s*\["#).expect("MESSAGES_ANCHOR regex"));

/// Anchors a `"conversation": {...}` object.
pub static CONVERSATION_OBJECT_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""conversation"\s*:\s*\{"#).expect("CONVERSATION_OBJECT_ANCHOR regex")
});

/// Anchors a `"conversation": [...]` array.
pub static CONVERSATION_ARRAY_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""conversation"\s*:\s*\["#).expect("CONVERSATION_ARRAY_ANCHOR regex")
});

/// Anchors a `"linear_conversation": [...]` array.
pub static LINEAR_CONVERSATION_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""linear_conversation"\s*:\s*\["#).expect("LINEAR_CONVERSATION_ANCHOR regex")
});

/// Anchors a `"mapping": {...}` node-graph object.
pub static MAPPING_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""mapping"\s*:\s*\{"#).expect("MAPPING_ANCHOR regex"));

/// Anchors the Next.js bootstrap object.
pub static NEXT_DATA_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"window\.__NEXT_DATA__\s*=\s*\{").expect("NEXT_DATA_ANCHOR regex")
});

/// Locates React-Router stream bootstrap calls whose string argument embeds
/// role/parts fragments.
pub static STREAM_ENQUEUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"window\.__reactRouterContext\.streamController\.enqueue\(""#)
        .expect("STREAM_ENQUEUE regex")
});

/// Matches a role/parts fragment inside an unescaped stream payload, up to
/// the opening bracket of the parts array.
pub static STREAM_ROLE_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""role","(assistant|user|system)"[\s\S]{0,2000}?"content_type","text","parts",\["#)
        .expect("STREAM_ROLE_PARTS regex")
});

// =============================================================================
// DOM Selectors
// =============================================================================

/// The attribute share pages use to tag a turn with its author.
pub const ROLE_ATTR: &str = "data-message-author-role";

/// Selects any element carrying the author-role attribute.
pub const ROLE_TAGGED_SELECTOR: &str = "[data-message-author-role]";

/// Primary conversation-turn selector pass.
pub const TURN_SELECTOR: &str = r#"[data-message-author-role], [data-testid*="conversation-turn"], .conversation-turn, [class*="conversation-turn"]"#;

/// Nested content-area element within a turn.
pub const CONTENT_AREA_SELECTOR: &str =
    r#"[data-message-content], .message-content, [class*="message-content"]"#;

/// Looser secondary pass used when the primary selectors match nothing.
pub const MESSAGE_SELECTOR: &str =
    r#"[data-message-author-role], [data-testid*="message"], .message"#;

/// Structural image evidence probes.
pub const IMAGE_PROBE_SELECTOR: &str = r#"img, [class*="imagegen-image"], [class*="image-gen"], [aria-label*="Generated image"], [aria-label*="generated image"], [id*="image-"]"#;

/// Structural code-container probes.
pub const CODE_PROBE_SELECTOR: &str = r#"pre, code, [class*="code"], [class*="syntax"]"#;

// =============================================================================
// Heuristic Segmentation
// =============================================================================

/// Phrases that mark a line as the start of an assistant turn, matched
/// anywhere in the line.
pub const ASSISTANT_OPENERS: &[&str] = &["I can help", "Here", "To resolve"];
