//! Configuration options for conversation extraction.
//!
//! The `Options` struct controls fetch behavior, browser escalation, and the
//! empirically tuned extraction thresholds. Use `Default::default()` for the
//! tuned settings; the CLI maps its flags onto individual fields.

use std::time::Duration;

/// Browser-like User-Agent sent with static fetches.
///
/// The share pages serve a bot-challenge page to obvious non-browser
/// agents; a mainstream desktop UA keeps the static phase useful.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration options for conversation extraction.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use convoscrape::Options;
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     static_only: true,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// User-Agent header for static fetches and the browser session.
    ///
    /// Default: [`DEFAULT_USER_AGENT`]
    pub user_agent: String,

    /// Overall timeout for the static HTTP fetch.
    ///
    /// Default: 30 seconds
    pub fetch_timeout: Duration,

    /// Maximum redirects followed by the static fetch.
    ///
    /// Default: `5`
    pub max_redirects: usize,

    /// Never escalate to the rendered-browser phase.
    ///
    /// When the static phase yields nothing the run reports "no messages"
    /// instead of launching a browser. Useful in environments without a
    /// Chrome binary.
    ///
    /// Default: `false`
    pub static_only: bool,

    /// Hard bound on browser navigation (page load) time.
    ///
    /// Default: 30 seconds
    pub navigation_timeout: Duration,

    /// How long the rendered phase polls for a role-tagged turn element
    /// before giving up on the selector and settling for whatever the page
    /// contains.
    ///
    /// Default: 15 seconds
    pub selector_wait: Duration,

    /// Settle wait applied when the turn selector never appears, giving
    /// client-side rendering a last chance to finish.
    ///
    /// Default: 8 seconds
    pub settle_wait: Duration,

    /// Interval between selector polls.
    ///
    /// Default: 500 milliseconds
    pub poll_interval: Duration,

    /// Minimum content length (chars, exclusive) for a DOM candidate or a
    /// heuristic line to count as usable text. Candidates at or under this
    /// length survive only with structural image evidence.
    ///
    /// Default: `10`
    pub min_content_chars: usize,

    /// A heuristic line longer than this (chars) opens an assistant turn.
    ///
    /// Default: `100`
    pub assistant_line_chars: usize,

    /// A heuristic line containing `?` under this length (chars) opens a
    /// user turn.
    ///
    /// Default: `200`
    pub user_question_chars: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: Duration::from_secs(30),
            max_redirects: 5,
            static_only: false,
            navigation_timeout: Duration::from_secs(30),
            selector_wait: Duration::from_secs(15),
            settle_wait: Duration::from_secs(8),
            poll_interval: Duration::from_millis(500),
            min_content_chars: 10,
            assistant_line_chars: 100,
            user_question_chars: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_thresholds() {
        let opts = Options::default();

        assert_eq!(opts.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(opts.fetch_timeout, Duration::from_secs(30));
        assert_eq!(opts.max_redirects, 5);
        assert!(!opts.static_only);
        assert_eq!(opts.navigation_timeout, Duration::from_secs(30));
        assert_eq!(opts.selector_wait, Duration::from_secs(15));
        assert_eq!(opts.settle_wait, Duration::from_secs(8));
        assert_eq!(opts.poll_interval, Duration::from_millis(500));
        assert_eq!(opts.min_content_chars, 10);
        assert_eq!(opts.assistant_line_chars, 100);
        assert_eq!(opts.user_question_chars, 200);
    }

    #[test]
    fn test_fields_can_be_overridden_individually() {
        let opts = Options {
            static_only: true,
            min_content_chars: 3,
            ..Options::default()
        };
        assert!(opts.static_only);
        assert_eq!(opts.min_content_chars, 3);
        assert_eq!(opts.max_redirects, 5);
    }
}
