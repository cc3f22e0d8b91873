//! Error types for convoscrape.
//!
//! This module defines the error types returned by parsing and export
//! operations. Per-candidate problems inside a strategy (a script payload
//! that fails to parse, a turn element with no usable text) are never
//! represented here; strategies skip those locally and move on.

/// Error type for conversation extraction and export operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input URL is not a valid share link.
    #[error("Invalid share URL: {0}")]
    InvalidUrl(String),

    /// The static HTTP fetch failed or returned a non-success status.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// The browser session could not launch, navigate, or print.
    #[error("Browser rendering failed: {0}")]
    Render(String),

    /// No strategy in either phase produced any message.
    ///
    /// This is the expected outcome for private, deleted, or empty share
    /// pages. Callers should present it as a condition, not a fault.
    #[error("No conversation messages found")]
    NoMessages,

    /// Serializing the export payload failed.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing an export artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for extraction and export operations.
pub type Result<T> = std::result::Result<T, Error>;
