//! Character encoding handling for fetched documents.
//!
//! Share pages are UTF-8 in practice, but the static fetch path hands this
//! crate raw response bytes; decoding goes through the declared charset when
//! one is present so a mislabeled mirror or proxy response cannot corrupt
//! extraction. Invalid sequences become U+FFFD rather than errors.

use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;

/// Bytes of the document head examined for a charset declaration.
const CHARSET_SCAN_BYTES: usize = 1024;

/// Matches `<meta charset="...">`.
#[allow(clippy::expect_used)]
static CHARSET_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>]+)"#).expect("CHARSET_META regex")
});

/// Matches `<meta http-equiv="Content-Type" content="...; charset=...">`.
#[allow(clippy::expect_used)]
static CONTENT_TYPE_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#,
    )
    .expect("CONTENT_TYPE_CHARSET regex")
});

/// Picks the encoding for a fetched document body.
///
/// Probes the first KiB for a `<meta charset>` declaration, then the
/// legacy `http-equiv` form; unrecognized or absent labels fall back to
/// UTF-8, the web default.
#[must_use]
pub fn detect(body: &[u8]) -> &'static Encoding {
    let head = &body[..body.len().min(CHARSET_SCAN_BYTES)];
    let head_str = String::from_utf8_lossy(head);

    declared_charset(&head_str)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decodes a fetched document body to a UTF-8 string.
#[must_use]
pub fn decode(body: &[u8]) -> String {
    let encoding = detect(body);
    if encoding == UTF_8 {
        return String::from_utf8_lossy(body).into_owned();
    }
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

fn declared_charset(head: &str) -> Option<String> {
    CHARSET_META
        .captures(head)
        .or_else(|| CONTENT_TYPE_CHARSET.captures(head))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_reads_meta_charset() {
        let body = br#"<html><head><meta charset="utf-8"></head><body>ok</body></html>"#;
        assert_eq!(detect(body), UTF_8);
    }

    #[test]
    fn test_detect_maps_latin1_to_windows_1252() {
        // encoding_rs aliases ISO-8859-1 to windows-1252 per the WHATWG table.
        let body = br#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1">"#;
        assert_eq!(detect(body).name(), "windows-1252");
    }

    #[test]
    fn test_detect_defaults_to_utf8() {
        assert_eq!(detect(b"<html><body>no declaration</body></html>"), UTF_8);
    }

    #[test]
    fn test_decode_transcodes_declared_charset() {
        let body = b"<html><head><meta charset=\"ISO-8859-1\"></head><body>Caf\xE9</body></html>";
        assert!(decode(body).contains("Caf\u{e9}"));
    }

    #[test]
    fn test_decode_replaces_invalid_sequences() {
        let body = b"<html><body>ok \xFF\xFE still ok</body></html>";
        let decoded = decode(body);
        assert!(decoded.contains("ok"));
        assert!(decoded.contains("still ok"));
    }
}
