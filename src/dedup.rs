//! Per-run message deduplication.
//!
//! The share layouts frequently present the same turn twice (a turn
//! container and a nested role-tagged child both match the selector banks),
//! so every strategy funnels candidates through one `SeenMessages` set. The
//! set is created fresh by the orchestrator for each run and passed into
//! strategy invocations by mutable reference; no process-wide state.

use std::collections::HashSet;

use crate::message::Role;

/// Number of content characters contributing to a textual fingerprint.
const TEXT_FINGERPRINT_CHARS: usize = 100;

/// Number of content characters contributing to an image-only fingerprint.
const IMAGE_FINGERPRINT_CHARS: usize = 50;

/// Fingerprint set for one extraction run.
#[derive(Debug, Default)]
pub struct SeenMessages {
    fingerprints: HashSet<String>,
}

impl SeenMessages {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this fingerprint was already recorded in this run.
    #[must_use]
    pub fn seen(&self, fingerprint: &str) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    /// Records a fingerprint for the rest of the run.
    pub fn record(&mut self, fingerprint: String) {
        self.fingerprints.insert(fingerprint);
    }

    /// Number of distinct fingerprints recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

/// Builds the deduplication key for a candidate message.
///
/// Textual candidates key on `role:first-100-chars`; image-only candidates
/// on `role:image-first-50-chars`. Truncation counts `char`s, not bytes, so
/// multi-byte content cannot split a code point.
#[must_use]
pub fn fingerprint(role: Role, content: &str, image_only: bool) -> String {
    if image_only {
        let head: String = content.chars().take(IMAGE_FINGERPRINT_CHARS).collect();
        format!("{}:image-{head}", role.as_str())
    } else {
        let head: String = content.chars().take(TEXT_FINGERPRINT_CHARS).collect();
        format!("{}:{head}", role.as_str())
    }
}
