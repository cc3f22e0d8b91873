//! CSV rendering.
//!
//! One fully quoted row per message, RFC 4180 line endings. Content is
//! flattened to a single line (whitespace runs collapse to one space) so
//! spreadsheet imports see one record per message regardless of how many
//! paragraphs the original turn had.

use chrono::SecondsFormat;

use crate::message::{Message, Role};
use crate::patterns::WHITESPACE_COLLAPSE;

const HEADER: &str =
    r#""Message Number","Role","Content","Quote Block","Links","Images","Timestamp""#;

/// Renders messages as a CSV document, header included.
#[must_use]
pub fn render(messages: &[Message]) -> String {
    let mut out = String::with_capacity(HEADER.len() + 2 + messages.len() * 128);
    out.push_str(HEADER);
    out.push_str("\r\n");

    for (index, message) in messages.iter().enumerate() {
        let number = (index + 1).to_string();
        let content = WHITESPACE_COLLAPSE.replace_all(&message.content, " ");
        let timestamp = message
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let row = [
            number.as_str(),
            role_label(message.role),
            content.trim(),
            flag(message.contains_code),
            flag(message.contains_link),
            flag(message.contains_image),
            timestamp.as_str(),
        ];
        for (position, field) in row.iter().enumerate() {
            if position > 0 {
                out.push(',');
            }
            push_quoted(&mut out, field);
        }
        out.push_str("\r\n");
    }
    out
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "User",
        Role::Assistant => "Assistant",
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn push_quoted(out: &mut String, field: &str) {
    out.push('"');
    for ch in field.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn message(role: Role, content: &str) -> Message {
        Message {
            role,
            content: content.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).single().unwrap(),
            contains_code: false,
            contains_link: false,
            contains_image: false,
        }
    }

    #[test]
    fn test_header_row_is_exact() {
        let rendered = render(&[]);
        assert_eq!(
            rendered,
            "\"Message Number\",\"Role\",\"Content\",\"Quote Block\",\"Links\",\"Images\",\"Timestamp\"\r\n"
        );
    }

    #[test]
    fn test_row_fields_are_quoted_and_numbered() {
        let rendered = render(&[
            message(Role::User, "first question"),
            message(Role::Assistant, "first answer"),
        ]);
        let lines: Vec<&str> = rendered.split("\r\n").collect();

        assert!(lines[1].starts_with("\"1\",\"User\",\"first question\",\"No\",\"No\",\"No\","));
        assert!(lines[2].starts_with("\"2\",\"Assistant\",\"first answer\","));
        assert!(lines[1].ends_with("\"2024-05-01T12:30:00Z\""));
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let rendered = render(&[message(Role::User, r#"she said "hello" twice"#)]);
        assert!(rendered.contains(r#""she said ""hello"" twice""#));
    }

    #[test]
    fn test_multiline_content_is_flattened() {
        let rendered = render(&[message(Role::Assistant, "line one\nline two\n\n\tline three")]);
        assert!(rendered.contains("\"line one line two line three\""));
    }

    #[test]
    fn test_flags_render_yes() {
        let mut flagged = message(Role::Assistant, "with everything");
        flagged.contains_code = true;
        flagged.contains_link = true;
        flagged.contains_image = true;

        let rendered = render(&[flagged]);
        assert!(rendered.contains("\"Yes\",\"Yes\",\"Yes\""));
    }
}
