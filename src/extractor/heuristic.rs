//! Last-resort heuristic segmentation of visible page text.
//!
//! When neither payloads nor role-tagged markup exist, the rendered page
//! text is folded line by line into alternating segments. A line containing
//! a question mark and shorter than the question bound starts a user
//! segment; a line containing a known assistant phrase, or longer than
//! the prose bound, starts an assistant segment; anything else continues
//! the current segment. Role assignment here is guesswork by construction,
//! which is why this strategy runs last and only on rendered documents.

use dom_query::Document;
use tracing::debug;

use crate::dedup::SeenMessages;
use crate::message::{Message, Role};
use crate::options::Options;
use crate::patterns::ASSISTANT_OPENERS;

use super::{push_candidate, Candidate};

/// Segments visible page text into role-guessed messages.
pub fn extract(doc: &Document, options: &Options, seen: &mut SeenMessages) -> Vec<Message> {
    let text = body_text(doc);
    let mut messages = Vec::new();
    let mut current: Option<Candidate> = None;

    for line in text.lines() {
        let line = line.trim();
        let chars = line.chars().count();
        if chars <= options.min_content_chars {
            continue;
        }

        if line.contains('?') && chars < options.user_question_chars {
            flush(&mut messages, current.take(), options, seen);
            current = Some(Candidate::new(Role::User, line));
        } else if has_assistant_opener(line) || chars > options.assistant_line_chars {
            flush(&mut messages, current.take(), options, seen);
            current = Some(Candidate::new(Role::Assistant, line));
        } else if let Some(segment) = current.as_mut() {
            segment.text.push(' ');
            segment.text.push_str(line);
        }
    }
    flush(&mut messages, current.take(), options, seen);

    debug!(count = messages.len(), "heuristic segmentation finished");
    messages
}

fn flush(
    messages: &mut Vec<Message>,
    segment: Option<Candidate>,
    options: &Options,
    seen: &mut SeenMessages,
) {
    if let Some(candidate) = segment {
        push_candidate(messages, candidate, options.min_content_chars, seen);
    }
}

fn has_assistant_opener(line: &str) -> bool {
    ASSISTANT_OPENERS
        .iter()
        .any(|opener| line.contains(opener))
}

/// Visible page text with script, style, and noscript content removed,
/// read from the main landmark when the page has one.
fn body_text(doc: &Document) -> String {
    doc.select("script, style, noscript").remove();
    let main = doc.select("main");
    if main.length() > 0 {
        main.text().to_string()
    } else {
        doc.select("body").text().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(html: &str) -> Vec<Message> {
        let doc = Document::from(html);
        let options = Options::default();
        let mut seen = SeenMessages::new();
        extract(&doc, &options, &mut seen)
    }

    #[test]
    fn test_question_and_answer_transcript() {
        let html = "<html><body><main>How do I fix a borrow checker error in Rust?\n\
             Here is what usually helps with that.\n\
             the compiler report names the borrow that lives too long.\n\
             </main></body></html>";
        let messages = run(html);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(
            messages[0].content,
            "How do I fix a borrow checker error in Rust?"
        );
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(
            messages[1].content,
            "Here is what usually helps with that. the compiler report names the borrow that lives too long."
        );
    }

    #[test]
    fn test_mid_line_opener_starts_assistant_segment() {
        // The opener phrase counts wherever it sits in the line.
        let html = "<body>Sure, Here is the command you need to run.\n</body>";
        let messages = run(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
        assert_eq!(
            messages[0].content,
            "Sure, Here is the command you need to run."
        );
    }

    #[test]
    fn test_boundary_length_line_is_skipped() {
        // Exactly at the length bound a line is not usable, question mark
        // or not, so the follow-up has no open segment to join.
        let html = "<body>Why is it?\nthe borrow ends too late\n</body>";
        assert!(run(html).is_empty());
    }

    #[test]
    fn test_long_line_starts_assistant_segment() {
        let long = "a ".repeat(60);
        let html = format!("<body>{}</body>", long.trim());
        let messages = run(&html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
    }

    #[test]
    fn test_long_question_is_read_as_prose() {
        // Past the question bound the '?' no longer marks a user turn.
        let long_question = format!("{} maybe?", "word ".repeat(50).trim());
        let html = format!("<body>{long_question}</body>");
        let messages = run(&html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
    }

    #[test]
    fn test_short_lines_are_skipped() {
        let html = "<body>ok\nyes\nno\nshort\n</body>";
        assert!(run(html).is_empty());
    }

    #[test]
    fn test_orphan_continuation_is_dropped() {
        // A mid-length line with nothing to join and no segment marker.
        let html = "<body>a plain continuation line\n</body>";
        assert!(run(html).is_empty());
    }

    #[test]
    fn test_script_text_is_not_segmented() {
        let html = "<body><script>var x = \"is this a question in a script?\";</script>\
            <p>What does the script tag change here?</p></body>";
        let messages = run(html);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "What does the script tag change here?");
    }

    #[test]
    fn test_repeated_question_is_deduplicated() {
        let html = "<body>Why does ownership move by default?\n\
            filler\n\
            Why does ownership move by default?\n</body>";
        let messages = run(html);

        assert_eq!(messages.len(), 1);
    }
}
