//! DOM extraction from role-tagged turn elements.
//!
//! Two selector passes share one per-node walk. The primary pass targets
//! conversation-turn markup; the loose pass runs the same walk with broader
//! message selectors and exists for layouts that dropped the turn testids.
//! The pipeline decides which pass to run when; passes never chain here.

use dom_query::{Document, Selection};
use tracing::debug;

use crate::classify::ContentFlags;
use crate::dedup::SeenMessages;
use crate::message::{Message, Role};
use crate::options::Options;
use crate::patterns::{
    CODE_PROBE_SELECTOR, CONTENT_AREA_SELECTOR, IMAGE_PROBE_SELECTOR, MESSAGE_SELECTOR, ROLE_ATTR,
    ROLE_TAGGED_SELECTOR, TURN_SELECTOR,
};

use super::{push_candidate, Candidate};

/// Primary pass over conversation-turn markup.
pub fn extract_turns(doc: &Document, options: &Options, seen: &mut SeenMessages) -> Vec<Message> {
    collect(doc, TURN_SELECTOR, "turns", options, seen)
}

/// Loose secondary pass over generic message markup.
pub fn extract_loose(doc: &Document, options: &Options, seen: &mut SeenMessages) -> Vec<Message> {
    collect(doc, MESSAGE_SELECTOR, "loose", options, seen)
}

fn collect(
    doc: &Document,
    selector: &str,
    pass: &str,
    options: &Options,
    seen: &mut SeenMessages,
) -> Vec<Message> {
    let mut messages = Vec::new();
    let nodes = doc.select(selector);

    for node in nodes.nodes() {
        let sel = Selection::from(*node);
        let Some(role) = resolve_role(&sel) else {
            continue;
        };

        let structural = probe_flags(&sel);
        let mut text = candidate_text(&sel);
        if text.trim().is_empty() && structural.image {
            text = recover_image_text(&sel).unwrap_or_default();
        }

        let mut candidate = Candidate::new(role, text);
        candidate.structural = structural;
        push_candidate(&mut messages, candidate, options.min_content_chars, seen);
    }

    debug!(pass, count = messages.len(), "dom pass finished");
    messages
}

/// Resolves the author of a candidate element.
///
/// An explicit role attribute always decides, so system or tool turns drop
/// the element outright. Without one, a tagged descendant decides; then a
/// `user` class token on the element or a descendant selects user;
/// everything else is read as assistant. The assistant default matches how
/// share layouts mark user turns explicitly and leave assistant turns bare.
fn resolve_role(sel: &Selection) -> Option<Role> {
    if let Some(attr) = sel.attr(ROLE_ATTR) {
        return Role::from_source(&attr);
    }

    let tagged = sel.select(ROLE_TAGGED_SELECTOR);
    if tagged.length() > 0 {
        if let Some(attr) = tagged.attr(ROLE_ATTR) {
            return Role::from_source(&attr);
        }
    }

    let class = sel.attr("class").unwrap_or_default().to_ascii_lowercase();
    if class.split_ascii_whitespace().any(|token| token == "user")
        || sel.select(".user").length() > 0
    {
        return Some(Role::User);
    }
    Some(Role::Assistant)
}

/// Reads message text from the first nested content area, else the whole
/// element text. Turn wrappers carry avatar labels and action buttons, so
/// the narrower read is preferred when the layout provides one.
fn candidate_text(sel: &Selection) -> String {
    let areas = sel.select(CONTENT_AREA_SELECTOR);
    if let Some(node) = areas.nodes().first() {
        return Selection::from(*node).text().to_string();
    }
    sel.text().to_string()
}

fn probe_flags(sel: &Selection) -> ContentFlags {
    ContentFlags {
        code: sel.select(CODE_PROBE_SELECTOR).length() > 0,
        link: sel.select("a[href]").length() > 0,
        image: sel.select(IMAGE_PROBE_SELECTOR).length() > 0,
    }
}

/// Recovery chain for turns whose only content is an image: alt text, then
/// an aria-label, then a figcaption. Returns `None` when all are empty so
/// the funnel can fall back to the placeholder.
fn recover_image_text(sel: &Selection) -> Option<String> {
    for node in sel.select("img[alt]").nodes() {
        let alt = Selection::from(*node).attr("alt").unwrap_or_default();
        let alt = alt.trim();
        if !alt.is_empty() {
            return Some(alt.to_string());
        }
    }

    if let Some(label) = sel.select("[aria-label]").attr("aria-label") {
        let label = label.trim();
        if !label.is_empty() {
            return Some(label.to_string());
        }
    }

    let caption = sel.select("figcaption").text();
    let caption = caption.trim();
    if caption.is_empty() {
        None
    } else {
        Some(caption.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::IMAGE_ONLY_PLACEHOLDER;

    fn run_turns(html: &str) -> Vec<Message> {
        let doc = Document::from(html);
        let options = Options::default();
        let mut seen = SeenMessages::new();
        extract_turns(&doc, &options, &mut seen)
    }

    fn run_loose(html: &str) -> Vec<Message> {
        let doc = Document::from(html);
        let options = Options::default();
        let mut seen = SeenMessages::new();
        extract_loose(&doc, &options, &mut seen)
    }

    #[test]
    fn test_role_tagged_turns_in_document_order() {
        let html = r#"<html><body>
            <div data-message-author-role="user">What is the borrow checker?</div>
            <div data-message-author-role="assistant">It enforces aliasing rules at compile time.</div>
        </body></html>"#;
        let messages = run_turns(html);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "What is the borrow checker?");
        assert_eq!(messages[1].role, Role::Assistant);
    }

    #[test]
    fn test_system_turns_are_dropped() {
        let html = r#"<div data-message-author-role="system">Internal system preamble text.</div>
            <div data-message-author-role="assistant">Visible answer for the reader.</div>"#;
        let messages = run_turns(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
    }

    #[test]
    fn test_wrapper_and_tagged_child_count_once() {
        // The turn wrapper and its tagged child both match the primary
        // selector; fingerprinting collapses them to one message.
        let html = r#"<div data-testid="conversation-turn-2">
            <div data-message-author-role="user">Why does this lifetime not compile?</div>
        </div>"#;
        let messages = run_turns(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
    }

    #[test]
    fn test_content_area_preferred_over_chrome_text() {
        let html = r#"<div data-message-author-role="assistant">
            <span>Copy code</span>
            <div class="message-content">Only this part is the reply.</div>
        </div>"#;
        let messages = run_turns(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Only this part is the reply.");
    }

    #[test]
    fn test_validity_threshold_is_exclusive() {
        // Ten characters of text: dropped. Eleven: retained.
        let html = r#"<div data-message-author-role="user">abcdefghij</div>
            <div data-message-author-role="user">abcdefghijk</div>"#;
        let messages = run_turns(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "abcdefghijk");
    }

    #[test]
    fn test_class_evidence_selects_user() {
        let html = r#"<div class="conversation-turn user">Does this class mark my turn?</div>"#;
        let messages = run_turns(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
    }

    #[test]
    fn test_styling_class_is_not_user_evidence() {
        // "user" must be a whole class token, not a substring of one.
        let html = r#"<div class="conversation-turn user-select-none">Styling classes say nothing about the author.</div>"#;
        let messages = run_turns(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
    }

    #[test]
    fn test_untagged_turn_defaults_to_assistant() {
        let html = r#"<div class="conversation-turn">An answer with no explicit author tag.</div>"#;
        let messages = run_turns(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
    }

    #[test]
    fn test_image_only_turn_gets_placeholder() {
        let html = r#"<div data-message-author-role="user"><img src="upload.png" alt=""></div>"#;
        let messages = run_turns(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, IMAGE_ONLY_PLACEHOLDER);
        assert!(messages[0].contains_image);
    }

    #[test]
    fn test_image_alt_text_is_recovered() {
        let html = r#"<div data-message-author-role="assistant">
            <img src="gen.png" alt="A watercolor fox in the snow">
        </div>"#;
        let messages = run_turns(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "A watercolor fox in the snow");
        assert!(messages[0].contains_image);
    }

    #[test]
    fn test_structural_code_probe_sets_flag() {
        let html = r#"<div data-message-author-role="assistant">
            Try this instead: <pre>fn main() {}</pre>
        </div>"#;
        let messages = run_turns(html);

        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains_code);
    }

    #[test]
    fn test_loose_pass_reads_plain_message_classes() {
        let html = r#"<div class="message user">Loose markup user question?</div>
            <div class="message">Loose markup assistant answer here.</div>"#;

        assert!(run_turns(html).is_empty());
        let messages = run_loose(html);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
    }
}
