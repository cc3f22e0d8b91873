//! Conversation extraction strategies.
//!
//! # Module Structure
//!
//! - `structured`: embedded JSON payload scan over script content
//! - `dom`: role-tagged element passes over parsed or rendered markup
//! - `heuristic`: last-resort line segmentation of plain page text
//!
//! Strategies never talk to each other; the pipeline runs them in priority
//! order and stops at the first one that yields messages. What they share is
//! the normalization funnel in this module: every candidate goes through the
//! same prefix stripping, validity rule, image-only fallback, classification,
//! and deduplication, regardless of which strategy produced it.

use chrono::{DateTime, Utc};

use crate::classify::{self, ContentFlags};
use crate::dedup::{self, SeenMessages};
use crate::message::{Message, Role, IMAGE_ONLY_PLACEHOLDER};
use crate::patterns::SPEAKER_PREFIX;

pub mod dom;
pub mod heuristic;
pub mod structured;

/// A raw extraction candidate before normalization.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub role: Role,
    /// Raw text as found in the source, prefix and all.
    pub text: String,
    /// Structural flags probed from the source fragment. Only the DOM
    /// strategy sets these; payload and heuristic candidates carry none.
    pub structural: ContentFlags,
    /// Source-provided timestamp, when one was parseable.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Candidate {
    pub(crate) fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            structural: ContentFlags::default(),
            timestamp: None,
        }
    }
}

/// Normalizes a candidate and appends it unless invalid or a duplicate.
///
/// `min_chars` is the exclusive length threshold for usable text: the DOM
/// passes supply the configured validity threshold, payload entries supply 0
/// (any non-empty content counts). Candidates failing the threshold survive
/// only with structural image evidence, taking the image-only content chain
/// (recovered text, else the placeholder) and an image-keyed fingerprint.
///
/// Classification runs on the raw pre-strip text and is OR-merged with the
/// structural flags; the fingerprint and stored content use the normalized
/// text.
pub(crate) fn push_candidate(
    messages: &mut Vec<Message>,
    candidate: Candidate,
    min_chars: usize,
    seen: &mut SeenMessages,
) {
    let stripped = SPEAKER_PREFIX.replace(&candidate.text, "");
    let text = stripped.trim();

    let (content, image_only) = if text.chars().count() > min_chars {
        (text.to_string(), false)
    } else if candidate.structural.image {
        let content = if text.is_empty() {
            IMAGE_ONLY_PLACEHOLDER.to_string()
        } else {
            text.to_string()
        };
        (content, true)
    } else {
        return;
    };

    let flags = classify::classify(&candidate.text).merge(candidate.structural);

    let key = dedup::fingerprint(candidate.role, &content, image_only);
    if seen.seen(&key) {
        return;
    }
    seen.record(key);

    messages.push(Message {
        role: candidate.role,
        content,
        timestamp: candidate.timestamp.unwrap_or_else(Utc::now),
        contains_code: flags.code,
        contains_link: flags.link,
        contains_image: flags.image,
    });
}
