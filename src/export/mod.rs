//! Export renderers for extracted conversations.
//!
//! Each submodule renders one format and returns a string (or bytes via
//! the browser printer for PDF); writing artifacts to disk is the caller's
//! concern. Renderers never re-extract or reorder, they present the
//! message list exactly as the pipeline produced it.

pub mod csv;
pub mod document;
pub mod json;

use chrono::Utc;

/// Builds the conventional export file name:
/// `<UTC yyyymmdd_HHMMSS>_chatgpt_share_<id>.<ext>`.
#[must_use]
pub fn timestamped_name(file_id: &str, extension: &str) -> String {
    format!(
        "{}_chatgpt_share_{file_id}.{extension}",
        Utc::now().format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamped_name_shape() {
        let name = timestamped_name("abc-123", "csv");
        let mut parts = name.splitn(3, '_');

        let date = parts.next().unwrap_or_default();
        assert_eq!(date.len(), 8);
        assert!(date.chars().all(|c| c.is_ascii_digit()));

        let time = parts.next().unwrap_or_default();
        assert_eq!(time.len(), 6);
        assert!(time.chars().all(|c| c.is_ascii_digit()));

        assert_eq!(parts.next(), Some("chatgpt_share_abc-123.csv"));
    }
}
