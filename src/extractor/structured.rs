//! Structured-data extraction from embedded script payloads.
//!
//! Share pages usually ship the conversation as JSON inside script content
//! long before the DOM renders it. This strategy scans every script for a
//! table of known payload anchors, slices the bracketed payload behind each
//! anchor with a string-aware balanced scanner, and interprets whatever
//! parses through an ordered list of shape readers. Anchors are evaluated in
//! priority order across the whole document; the first anchor that produces
//! at least one message wins and no shapes are merged. A payload that fails
//! to parse is skipped, never fatal.
//!
//! When no anchor matches, a final pass decodes React-Router stream
//! bootstrap strings, which carry role/parts fragments in an escaped JS
//! string literal.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use dom_query::{Document, Selection};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::dedup::SeenMessages;
use crate::message::{Message, Role};
use crate::patterns::{
    CONVERSATION_ARRAY_ANCHOR, CONVERSATION_OBJECT_ANCHOR, LINEAR_CONVERSATION_ANCHOR,
    MAPPING_ANCHOR, MESSAGES_ANCHOR, NEXT_DATA_ANCHOR, STREAM_ENQUEUE, STREAM_ROLE_PARTS,
};

use super::{push_candidate, Candidate};

/// One payload anchor: where a known JSON shape starts in script source.
///
/// The regex ends at the opening bracket so the payload itself can be
/// sliced with balanced scanning instead of a lazy capture, which would
/// truncate nested structures.
struct PayloadAnchor {
    name: &'static str,
    pattern: &'static LazyLock<Regex>,
    open: u8,
    close: u8,
}

/// Anchors in priority order. Flat message arrays are the most reliable
/// shape and come first; the Next.js bootstrap blob is last because its
/// entries need the deepest descent.
const PAYLOAD_ANCHORS: &[PayloadAnchor] = &[
    PayloadAnchor {
        name: "messages",
        pattern: &MESSAGES_ANCHOR,
        open: b'[',
        close: b']',
    },
    PayloadAnchor {
        name: "conversation-object",
        pattern: &CONVERSATION_OBJECT_ANCHOR,
        open: b'{',
        close: b'}',
    },
    PayloadAnchor {
        name: "conversation-array",
        pattern: &CONVERSATION_ARRAY_ANCHOR,
        open: b'[',
        close: b']',
    },
    PayloadAnchor {
        name: "linear-conversation",
        pattern: &LINEAR_CONVERSATION_ANCHOR,
        open: b'[',
        close: b']',
    },
    PayloadAnchor {
        name: "mapping",
        pattern: &MAPPING_ANCHOR,
        open: b'{',
        close: b'}',
    },
    PayloadAnchor {
        name: "next-data",
        pattern: &NEXT_DATA_ANCHOR,
        open: b'{',
        close: b'}',
    },
];

type ShapeReader = fn(&Value) -> Option<Vec<&Value>>;

/// Shape readers in priority order. The first reader whose shape matches a
/// parsed payload consumes it; a match with zero usable entries still ends
/// the payload (no second interpretation of the same value).
const SHAPE_READERS: &[(&str, ShapeReader)] = &[
    ("messages", read_messages_field),
    ("conversation.messages", read_conversation_messages),
    ("conversation", read_conversation_array),
    ("linear_conversation", read_linear_conversation),
    ("array", read_top_level_array),
    ("mapping", read_mapping_field),
    ("node-map", read_node_map),
];

/// Runs the structured strategy over a parsed document.
///
/// Candidates go through the shared normalization funnel with a zero
/// length threshold: any non-empty payload content counts, however short.
pub fn extract(doc: &Document, seen: &mut SeenMessages) -> Vec<Message> {
    let mut messages = Vec::new();

    let scripts: Vec<String> = doc
        .select("script")
        .nodes()
        .iter()
        .map(|node| Selection::from(*node).text().to_string())
        .filter(|source| !source.trim().is_empty())
        .collect();

    for anchor in PAYLOAD_ANCHORS {
        for source in &scripts {
            for found in anchor.pattern.find_iter(source) {
                let open_idx = found.end() - 1;
                let Some(payload) = balanced_slice(source, open_idx, anchor.open, anchor.close)
                else {
                    debug!(anchor = anchor.name, "unbalanced payload candidate, skipping");
                    continue;
                };
                let value: Value = match serde_json::from_str(payload) {
                    Ok(value) => value,
                    Err(err) => {
                        debug!(anchor = anchor.name, %err, "payload candidate failed to parse");
                        continue;
                    }
                };
                collect_from_value(&value, &mut messages, seen);
                if !messages.is_empty() {
                    debug!(
                        anchor = anchor.name,
                        count = messages.len(),
                        "structured payload produced messages"
                    );
                    return messages;
                }
            }
        }
    }

    extract_stream_payloads(&scripts, &mut messages, seen);
    if !messages.is_empty() {
        debug!(count = messages.len(), "stream payloads produced messages");
    }
    messages
}

/// Interprets one parsed payload through the shape-reader table.
fn collect_from_value(value: &Value, messages: &mut Vec<Message>, seen: &mut SeenMessages) {
    for (name, reader) in SHAPE_READERS {
        if let Some(entries) = reader(value) {
            debug!(shape = name, entries = entries.len(), "payload shape matched");
            for entry in entries {
                if let Some(candidate) = normalize_entry(entry) {
                    push_candidate(messages, candidate, 0, seen);
                }
            }
            return;
        }
    }
    if let Some(entries) = read_next_data(value) {
        debug!(
            shape = "next-data",
            entries = entries.len(),
            "payload shape matched"
        );
        for entry in entries {
            if let Some(candidate) = normalize_entry(entry) {
                push_candidate(messages, candidate, 0, seen);
            }
        }
    }
}

fn read_messages_field(value: &Value) -> Option<Vec<&Value>> {
    value
        .get("messages")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().collect())
}

fn read_conversation_messages(value: &Value) -> Option<Vec<&Value>> {
    value
        .pointer("/conversation/messages")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().collect())
}

fn read_conversation_array(value: &Value) -> Option<Vec<&Value>> {
    value
        .get("conversation")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().collect())
}

fn read_linear_conversation(value: &Value) -> Option<Vec<&Value>> {
    value
        .get("linear_conversation")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().collect())
}

fn read_top_level_array(value: &Value) -> Option<Vec<&Value>> {
    value.as_array().map(|entries| entries.iter().collect())
}

fn read_mapping_field(value: &Value) -> Option<Vec<&Value>> {
    value
        .get("mapping")
        .and_then(Value::as_object)
        .map(|mapping| mapping.values().collect())
}

/// Matches when the value itself is a node map: an object whose values are
/// nodes carrying a `message` object, as sliced directly behind a
/// `"mapping":` anchor.
fn read_node_map(value: &Value) -> Option<Vec<&Value>> {
    let map = value.as_object()?;
    let looks_like_nodes = map
        .values()
        .any(|node| node.get("message").is_some_and(Value::is_object));
    if looks_like_nodes {
        Some(map.values().collect())
    } else {
        None
    }
}

/// Descends into a Next.js bootstrap blob and retries the basic shapes on
/// each plausible base object.
fn read_next_data(value: &Value) -> Option<Vec<&Value>> {
    let page_props = value.pointer("/props/pageProps")?;
    let bases = [
        Some(page_props),
        page_props.pointer("/serverResponse/data"),
        page_props.get("data"),
        page_props.get("conversation"),
    ];
    for base in bases.into_iter().flatten() {
        for (_, reader) in SHAPE_READERS {
            if let Some(entries) = reader(base) {
                if !entries.is_empty() {
                    return Some(entries);
                }
            }
        }
    }
    None
}

/// Normalizes one payload entry into a candidate.
///
/// Role may live at `role`, `author.role`, or `message.author.role`;
/// entries with any other role value (or none) are dropped. Content comes
/// from `content`, `message.content`, or `text`; object content prefers a
/// joined `parts` array and falls back to re-serialization.
fn normalize_entry(entry: &Value) -> Option<Candidate> {
    let role_str = entry
        .get("role")
        .and_then(Value::as_str)
        .or_else(|| entry.pointer("/author/role").and_then(Value::as_str))
        .or_else(|| entry.pointer("/message/author/role").and_then(Value::as_str))?;
    let role = Role::from_source(role_str)?;

    let text = entry_content(entry)?;
    let mut candidate = Candidate::new(role, text);
    candidate.timestamp = entry_timestamp(entry);
    Some(candidate)
}

fn entry_content(entry: &Value) -> Option<String> {
    let sources = [
        entry.get("content"),
        entry.pointer("/message/content"),
        entry.get("text"),
    ];
    for content in sources.into_iter().flatten() {
        match content {
            Value::String(text) => return Some(text.clone()),
            Value::Null => {}
            Value::Object(fields) => {
                if let Some(parts) = fields.get("parts").and_then(Value::as_array) {
                    let joined = parts
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join("\n");
                    if !joined.trim().is_empty() {
                        return Some(joined);
                    }
                }
                if let Ok(serialized) = serde_json::to_string(content) {
                    return Some(serialized);
                }
            }
            other => {
                if let Ok(serialized) = serde_json::to_string(other) {
                    return Some(serialized);
                }
            }
        }
    }
    None
}

/// Best-effort timestamp from `create_time`/`timestamp` fields, at the
/// entry or its nested message. Epoch numbers and RFC 3339 strings are
/// accepted; anything else leaves the placeholder to the funnel.
#[allow(clippy::cast_possible_truncation)]
fn entry_timestamp(entry: &Value) -> Option<DateTime<Utc>> {
    for key in ["create_time", "timestamp"] {
        let nodes = [entry.get(key), entry.pointer(&format!("/message/{key}"))];
        for node in nodes.into_iter().flatten() {
            if let Some(epoch) = node.as_f64() {
                if let Some(parsed) = DateTime::from_timestamp(epoch as i64, 0) {
                    return Some(parsed);
                }
            }
            if let Some(text) = node.as_str() {
                if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                    return Some(parsed.with_timezone(&Utc));
                }
            }
        }
    }
    None
}

/// Slices the bracketed payload starting at `open_idx` (which must point at
/// the opening bracket), honoring JSON string and escape rules. Returns the
/// payload including both brackets, or `None` when the text ends before the
/// bracket balances.
fn balanced_slice(text: &str, open_idx: usize, open: u8, close: u8) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &byte) in bytes.iter().enumerate().skip(open_idx) {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            _ if in_string => {}
            _ if byte == open => depth += 1,
            _ if byte == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[open_idx..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Scans a JS string literal body from `start` (just past the opening
/// quote) to its closing unescaped quote.
fn js_string_slice(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut escaped = false;
    for i in start..bytes.len() {
        if escaped {
            escaped = false;
            continue;
        }
        match bytes[i] {
            b'\\' => escaped = true,
            b'"' => return Some(&text[start..i]),
            _ => {}
        }
    }
    None
}

/// Decodes role/parts fragments out of React-Router stream bootstrap calls.
fn extract_stream_payloads(scripts: &[String], messages: &mut Vec<Message>, seen: &mut SeenMessages) {
    for source in scripts {
        for found in STREAM_ENQUEUE.find_iter(source) {
            let Some(raw) = js_string_slice(source, found.end()) else {
                continue;
            };
            let Ok(decoded) = serde_json::from_str::<String>(&format!("\"{raw}\"")) else {
                debug!("stream payload failed to unescape, skipping");
                continue;
            };
            for caps in STREAM_ROLE_PARTS.captures_iter(&decoded) {
                let Some(role) = caps.get(1).and_then(|m| Role::from_source(m.as_str())) else {
                    continue;
                };
                let Some(whole) = caps.get(0) else { continue };
                let open_idx = whole.end() - 1;
                let Some(parts_json) = balanced_slice(&decoded, open_idx, b'[', b']') else {
                    continue;
                };
                let Ok(parts) = serde_json::from_str::<Value>(parts_json) else {
                    continue;
                };
                let Some(parts) = parts.as_array() else { continue };
                let text = parts
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join("");
                push_candidate(messages, Candidate::new(role, text), 0, seen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn run(html: &str) -> Vec<Message> {
        let doc = Document::from(html);
        let mut seen = SeenMessages::new();
        extract(&doc, &mut seen)
    }

    #[test]
    fn test_flat_messages_array() {
        let html = r#"<html><body><script>
            var data = {"messages":[{"role":"user","content":"Hi"},{"role":"assistant","content":"Hello there, how can I help?"}]};
        </script></body></html>"#;
        let messages = run(html);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Hi");
        assert_eq!(messages[1].role, Role::Assistant);
        assert!(!messages[0].contains_code);
        assert!(!messages[1].contains_code);
    }

    #[test]
    fn test_nested_content_survives_balanced_slicing() {
        // A lazy capture would stop at the first ']' inside the nested array.
        let html = r#"<script>{"messages":[{"role":"user","content":"pick [a] or [b]"},{"role":"assistant","content":{"parts":["take [a]"]}}]}</script>"#;
        let messages = run(html);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "pick [a] or [b]");
        assert_eq!(messages[1].content, "take [a]");
    }

    #[test]
    fn test_malformed_candidate_is_skipped_not_fatal() {
        let html = r#"<html>
            <script>var broken = {"messages":[{"role":"user","content":"unterminated};</script>
            <script>var good = {"messages":[{"role":"user","content":"still works"}]};</script>
        </html>"#;
        let messages = run(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "still works");
    }

    #[test]
    fn test_mapping_shape_reads_node_values() {
        let html = r#"<script>{"mapping":{
            "n1":{"message":{"author":{"role":"user"},"content":{"parts":["What is a trait object?"]}}},
            "n2":{"message":{"author":{"role":"assistant"},"content":{"parts":["A trait object is a fat pointer."]}}},
            "n3":{"message":null}
        }}</script>"#;
        let messages = run(html);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].content, "A trait object is a fat pointer.");
    }

    #[test]
    fn test_system_entries_are_dropped() {
        let html = r#"<script>{"messages":[
            {"role":"system","content":"You are a helpful assistant."},
            {"role":"user","content":"hello?"},
            {"role":"assistant","content":"hi!"}
        ]}</script>"#;
        let messages = run(html);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
    }

    #[test]
    fn test_first_anchor_wins_over_later_shapes() {
        let html = r#"<script>
            var a = {"messages":[{"role":"user","content":"from the messages anchor"}]};
            var b = {"conversation":[{"role":"assistant","content":"from the conversation anchor"}]};
        </script>"#;
        let messages = run(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "from the messages anchor");
    }

    #[test]
    fn test_epoch_create_time_is_parsed() {
        let html = r#"<script>{"messages":[{"role":"user","content":"dated","create_time":1700000000}]}</script>"#;
        let messages = run(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_next_data_descent() {
        let html = r#"<script>window.__NEXT_DATA__={"props":{"pageProps":{"serverResponse":{"data":{"linear_conversation":[
            {"message":{"author":{"role":"user"},"content":{"parts":["deep question"]}}},
            {"message":{"author":{"role":"assistant"},"content":{"parts":["deep answer"]}}}
        ]}}}}};</script>"#;
        let messages = run(html);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "deep answer");
    }

    #[test]
    fn test_stream_payload_fallback() {
        let html = r#"<script>window.__reactRouterContext.streamController.enqueue("[\"role\",\"user\",\"content_type\",\"text\",\"parts\",[\"streamed question\"],\"role\",\"assistant\",\"content_type\",\"text\",\"parts\",[\"streamed answer\"]]");</script>"#;
        let messages = run(html);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "streamed question");
        assert_eq!(messages[1].content, "streamed answer");
    }

    #[test]
    fn test_balanced_slice_handles_brackets_in_strings() {
        let text = r#"{"a":"tricky ] brace \" here","b":[1,2]}"#;
        let sliced = balanced_slice(text, 0, b'{', b'}').unwrap();
        assert_eq!(sliced, text);
    }

    #[test]
    fn test_balanced_slice_returns_none_when_unterminated() {
        assert!(balanced_slice(r#"[1, 2, "open"#, 0, b'[', b']').is_none());
    }

    #[test]
    fn test_no_payloads_yields_empty() {
        assert!(run("<html><body><p>nothing embedded here</p></body></html>").is_empty());
    }
}
