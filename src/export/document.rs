//! Printable HTML rendering.
//!
//! Produces a standalone page with role-tinted message blocks, tag badges,
//! and escaped content, styled for A4 printing. The PDF exporter feeds this
//! page to the browser printer; the HTML exporter writes it as-is.

use chrono::Utc;

use crate::message::{Conversation, Message, Role};

const FALLBACK_TITLE: &str = "ChatGPT Conversation";

/// Renders a complete standalone HTML document.
#[must_use]
pub fn render_html(conversation: &Conversation) -> String {
    let title = conversation.title.as_deref().unwrap_or(FALLBACK_TITLE);
    let mut page = String::with_capacity(2048 + conversation.messages.len() * 512);

    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str("<title>");
    page.push_str(&escape_html(title));
    page.push_str("</title>\n<style>\n");
    page.push_str(STYLE);
    page.push_str("</style>\n</head>\n<body>\n");

    page.push_str("<h1>");
    page.push_str(&escape_html(title));
    page.push_str("</h1>\n<p class=\"provenance\">Source: ");
    page.push_str(&escape_html(&conversation.source));
    page.push_str("<br>Exported ");
    page.push_str(&Utc::now().format("%Y-%m-%d %H:%M UTC").to_string());
    page.push_str("</p>\n");

    for message in &conversation.messages {
        push_message(&mut page, message);
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn push_message(page: &mut String, message: &Message) {
    let role_class = match message.role {
        Role::User => "user",
        Role::Assistant => "assistant",
    };
    let role_label = match message.role {
        Role::User => "User",
        Role::Assistant => "Assistant",
    };

    page.push_str("<div class=\"message ");
    page.push_str(role_class);
    page.push_str("\">\n<div class=\"meta\"><span class=\"role\">");
    page.push_str(role_label);
    page.push_str("</span><span class=\"timestamp\">");
    page.push_str(&message.timestamp.format("%Y-%m-%d %H:%M UTC").to_string());
    page.push_str("</span></div>\n");

    let badges = badge_row(message);
    if !badges.is_empty() {
        page.push_str("<div class=\"badges\">");
        page.push_str(&badges);
        page.push_str("</div>\n");
    }

    page.push_str("<div class=\"content\">");
    page.push_str(&escape_html(&message.content).replace('\n', "<br>\n"));
    page.push_str("</div>\n</div>\n");
}

fn badge_row(message: &Message) -> String {
    let mut badges = String::new();
    for (set, label) in [
        (message.contains_code, "code"),
        (message.contains_link, "links"),
        (message.contains_image, "images"),
    ] {
        if set {
            badges.push_str("<span class=\"badge\">");
            badges.push_str(label);
            badges.push_str("</span>");
        }
    }
    badges
}

/// Escapes text for safe interpolation into element content and
/// double-quoted attributes.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const STYLE: &str = "\
body { font-family: -apple-system, 'Segoe UI', Roboto, Helvetica, Arial, sans-serif;
       color: #1a1a1a; max-width: 760px; margin: 0 auto; padding: 24px; }
h1 { font-size: 1.4em; border-bottom: 2px solid #ddd; padding-bottom: 8px; }
.provenance { color: #666; font-size: 0.85em; margin-bottom: 24px; }
.message { border-radius: 8px; padding: 12px 16px; margin-bottom: 16px;
           page-break-inside: avoid; }
.message.user { background: #eef4fb; border-left: 4px solid #3b82c4; }
.message.assistant { background: #f4f4f2; border-left: 4px solid #8a8a84; }
.meta { display: flex; justify-content: space-between; margin-bottom: 6px; }
.role { font-weight: 600; }
.timestamp { color: #888; font-size: 0.8em; }
.badges { margin-bottom: 6px; }
.badge { display: inline-block; background: #ddd; color: #444; border-radius: 10px;
         font-size: 0.7em; padding: 1px 8px; margin-right: 4px; }
.content { white-space: normal; line-height: 1.5; overflow-wrap: break-word; }
";
