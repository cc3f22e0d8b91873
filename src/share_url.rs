//! Share URL validation and id derivation.
//!
//! Extraction only ever runs against one page shape: a public share link on
//! the chatgpt.com host with an opaque alphanumeric/hyphen id. Everything
//! else is rejected before any network traffic happens.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};
use crate::patterns::{SHARE_ID_UUID, SHARE_URL};

/// Maximum length of a derived file id slug.
const FILE_ID_MAX_CHARS: usize = 48;

/// A validated share URL.
///
/// Construction is the validation boundary: holding a `ShareUrl` means the
/// input already matched the accepted shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareUrl {
    url: Url,
}

impl ShareUrl {
    /// Validates a share URL string.
    ///
    /// # Arguments
    ///
    /// * `input` - The raw URL string, surrounding whitespace tolerated
    ///
    /// # Returns
    ///
    /// Returns `Err(Error::InvalidUrl)` for anything that is not
    /// `https://chatgpt.com/share/<id>` (optionally `www.`-prefixed).
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidUrl("empty URL".to_string()));
        }
        if !SHARE_URL.is_match(trimmed) {
            return Err(Error::InvalidUrl(format!(
                "expected https://chatgpt.com/share/<id>, got: {trimmed}"
            )));
        }
        let url = Url::parse(trimmed).map_err(|err| Error::InvalidUrl(err.to_string()))?;
        Ok(Self { url })
    }

    /// The full validated URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// The opaque id segment of the share path.
    #[must_use]
    pub fn share_id(&self) -> &str {
        self.url
            .path_segments()
            .and_then(Iterator::last)
            .unwrap_or("")
    }

    /// A filesystem-safe id for export file naming.
    ///
    /// The canonical 36-char UUID form is used verbatim when present;
    /// other ids are lowercased, squeezed to alphanumerics and hyphens,
    /// and truncated.
    #[must_use]
    pub fn file_id(&self) -> String {
        if let Some(captures) = SHARE_ID_UUID.captures(self.url.as_str()) {
            if let Some(uuid) = captures.get(1) {
                return uuid.as_str().to_string();
            }
        }

        let mut slug = String::new();
        let mut last_was_hyphen = false;
        for ch in self.share_id().chars() {
            if slug.chars().count() >= FILE_ID_MAX_CHARS {
                break;
            }
            if ch.is_ascii_alphanumeric() {
                slug.extend(ch.to_lowercase());
                last_was_hyphen = false;
            } else if !last_was_hyphen && !slug.is_empty() {
                slug.push('-');
                last_was_hyphen = true;
            }
        }
        slug.trim_end_matches('-').to_string()
    }
}

impl fmt::Display for ShareUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parse_accepts_canonical_share_url() {
        let parsed = ShareUrl::parse("https://chatgpt.com/share/abc-123-def").unwrap();
        assert_eq!(parsed.as_str(), "https://chatgpt.com/share/abc-123-def");
        assert_eq!(parsed.share_id(), "abc-123-def");
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_www() {
        let parsed = ShareUrl::parse("  https://www.chatgpt.com/share/xyz789  ").unwrap();
        assert_eq!(parsed.share_id(), "xyz789");
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for input in [
            "",
            "not a url",
            "http://chatgpt.com/share/abc123",
            "https://chatgpt.com/share/",
            "https://chatgpt.com/c/abc123",
            "https://chatgpt.com/share/abc123?utm=x",
            "https://evil.example/share/abc123",
        ] {
            match ShareUrl::parse(input) {
                Err(Error::InvalidUrl(_)) => {}
                other => panic!("expected InvalidUrl for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_file_id_prefers_uuid_form() {
        let parsed =
            ShareUrl::parse("https://chatgpt.com/share/67212ac8-0a04-8003-98b3-1e4121ba4d02")
                .unwrap();
        assert_eq!(parsed.file_id(), "67212ac8-0a04-8003-98b3-1e4121ba4d02");
    }

    #[test]
    fn test_file_id_slugs_non_uuid_ids() {
        let parsed = ShareUrl::parse("https://chatgpt.com/share/MiXeD-Case-ID").unwrap();
        assert_eq!(parsed.file_id(), "mixed-case-id");
    }
}
