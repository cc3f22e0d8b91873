//! Canonical conversation types.
//!
//! `Message` is the unit every extraction strategy produces. Instances are
//! created inside a single strategy pass, classified before insertion, and
//! never mutated afterwards; nothing here persists across runs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Placeholder content for a turn that carries an image but no usable text.
pub const IMAGE_ONLY_PLACEHOLDER: &str = "[image only message]";

/// The author of a conversation turn.
///
/// Only these two values are retained; source fragments with any other
/// role marker are dropped during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Returns the lowercase wire form of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Parses a source-provided role marker.
    ///
    /// Returns `None` for anything other than `user`/`assistant` (including
    /// `system` and `tool` entries some payload shapes carry).
    #[must_use]
    pub fn from_source(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single conversation turn.
///
/// `timestamp` is best-effort: when the source payload carries no usable
/// value, the extraction time stands in as a placeholder and must not be
/// treated as authoritative.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Lexical or structural code evidence (fences, spans, keyword
    /// fragments, code-container elements).
    pub contains_code: bool,
    /// Bare URL or markdown-link evidence.
    pub contains_link: bool,
    /// Markdown image, image-extension, or generated-asset evidence.
    pub contains_image: bool,
}

/// An extracted conversation plus its page-level context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Best-effort page title, stripped of the site-name suffix.
    pub title: Option<String>,
    /// The share URL the messages were extracted from.
    pub source: String,
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_source_accepts_both_roles() {
        assert_eq!(Role::from_source("user"), Some(Role::User));
        assert_eq!(Role::from_source(" Assistant "), Some(Role::Assistant));
    }

    #[test]
    fn test_role_from_source_rejects_other_markers() {
        assert_eq!(Role::from_source("system"), None);
        assert_eq!(Role::from_source("tool"), None);
        assert_eq!(Role::from_source(""), None);
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let message = Message {
            role: Role::User,
            content: "Hi".to_string(),
            timestamp: Utc::now(),
            contains_code: false,
            contains_link: false,
            contains_image: false,
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("containsCode").is_some());
        assert!(json.get("contains_code").is_none());
    }
}
