//! JSON rendering.
//!
//! The export envelope wraps the message list with a small metadata header
//! recording when the export ran, how many messages it holds, and where
//! they came from. Message objects serialize with their camelCase wire
//! names, identical to the library's `Message` serialization.

use chrono::Utc;
use serde::Serialize;

use crate::error::Result;
use crate::message::{Conversation, Message};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata<'a> {
    export_date: String,
    message_count: usize,
    source: &'a str,
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    metadata: Metadata<'a>,
    messages: &'a [Message],
}

/// Renders the export envelope as pretty-printed JSON.
pub fn render(conversation: &Conversation) -> Result<String> {
    let envelope = Envelope {
        metadata: Metadata {
            export_date: Utc::now().to_rfc3339(),
            message_count: conversation.messages.len(),
            source: &conversation.source,
        },
        messages: &conversation.messages,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}
